//! Projectile events

use bevy::prelude::*;

use crate::components::BodyPartKind;
use crate::projectile::components::ProjectileParams;

/// Выстрел снарядом (host → ECS)
#[derive(Event, Debug, Clone)]
pub struct FireProjectileIntent {
    pub shooter: Entity,
    /// Позиция root в момент выстрела
    pub muzzle: Vec3,
    pub direction: Vec3,
    /// Скорость оружия/стрелка в момент выстрела
    pub muzzle_velocity: Vec3,
    /// None — параметры из `CombatConfig.projectile`
    pub params: Option<ProjectileParams>,
}

impl FireProjectileIntent {
    pub fn new(shooter: Entity, muzzle: Vec3, direction: Vec3) -> Self {
        Self {
            shooter,
            muzzle,
            direction,
            muzzle_velocity: Vec3::ZERO,
            params: None,
        }
    }

    pub fn with_params(mut self, params: ProjectileParams) -> Self {
        self.params = Some(params);
        self
    }
}

/// Попадание (ECS → host: VFX/SFX)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct ImpactSpawned {
    pub projectile: Entity,
    pub owner: Entity,
    pub surface: Entity,
    pub point: Vec3,
    pub normal: Vec3,
    pub body_part: Option<BodyPartKind>,
}

/// Снаряд истёк без попадания
#[derive(Event, Debug, Clone, PartialEq)]
pub struct ProjectileExpired {
    pub projectile: Entity,
    pub owner: Entity,
}
