//! Projectile components: параметры, состояние полёта, trajectory correction

use std::collections::HashSet;

use bevy::prelude::*;

use crate::components::{BodyPartKind, LAYER_IGNORE_RAYCAST, MASK_PROJECTILES};
use crate::config::ProjectileConfig;

/// Урон по площади (radius-based multi-target)
///
/// `falloff`: 0 — полный урон по всему радиусу, 1 — линейно до нуля на границе.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageArea {
    pub radius: f32,
    pub falloff: f32,
}

impl DamageArea {
    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            falloff: 0.0,
        }
    }

    pub fn with_falloff(mut self, falloff: f32) -> Self {
        self.falloff = falloff.clamp(0.0, 1.0);
        self
    }

    /// Урон на расстоянии `distance` от центра
    pub fn damage_at(&self, amount: f32, distance: f32) -> f32 {
        if self.radius <= 0.0 {
            return amount;
        }

        let t = (distance / self.radius).clamp(0.0, 1.0);
        amount * (1.0 - self.falloff * t)
    }
}

/// Параметры снаряда (snapshot на момент выстрела)
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectileParams {
    pub radius: f32,
    pub speed: f32,
    pub max_lifetime: f32,
    pub gravity_down_acceleration: f32,
    /// < 0 — коррекции нет, 0 — мгновенная
    pub trajectory_correction_distance: f32,
    pub inherit_weapon_velocity: bool,
    pub damage: f32,
    pub broken_part_probability: f32,
    pub tip_length: f32,
    pub impact_vfx_lifetime: f32,
    pub impact_vfx_spawn_offset: f32,
    /// Маска слоёв для sweep (Ignore Raycast всегда исключён)
    pub hittable_mask: u32,
    pub area: Option<DamageArea>,
}

impl ProjectileParams {
    pub fn from_config(config: &ProjectileConfig) -> Self {
        Self {
            radius: config.radius,
            speed: config.speed,
            max_lifetime: config.max_lifetime,
            gravity_down_acceleration: config.gravity_down_acceleration,
            trajectory_correction_distance: config.trajectory_correction_distance,
            inherit_weapon_velocity: config.inherit_weapon_velocity,
            damage: config.damage,
            broken_part_probability: config.broken_part_probability,
            tip_length: config.tip_length,
            impact_vfx_lifetime: config.impact_vfx_lifetime,
            impact_vfx_spawn_offset: config.impact_vfx_spawn_offset,
            hittable_mask: MASK_PROJECTILES,
            area: None,
        }
    }

    pub fn with_area(mut self, area: DamageArea) -> Self {
        self.area = Some(area);
        self
    }

    pub fn with_mask(mut self, mask: u32) -> Self {
        self.hittable_mask = mask;
        self
    }

    pub fn effective_mask(&self) -> u32 {
        self.hittable_mask & !LAYER_IGNORE_RAYCAST
    }
}

impl Default for ProjectileParams {
    fn default() -> Self {
        Self::from_config(&ProjectileConfig::default())
    }
}

const CORRECTION_EPSILON: f32 = 1e-5;

/// Смещение визуального origin'а снаряда к линии прицела камеры
///
/// Расходуется пропорционально пройденному расстоянию.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryCorrection {
    pub vector: Vec3,
    pub consumed: Vec3,
}

impl TrajectoryCorrection {
    pub fn new(vector: Vec3) -> Self {
        Self {
            vector,
            consumed: Vec3::ZERO,
        }
    }

    pub fn remaining(&self) -> Vec3 {
        self.vector - self.consumed
    }

    pub fn is_done(&self) -> bool {
        self.remaining().length() <= CORRECTION_EPSILON
    }

    /// Порция коррекции за `travelled` метров (не больше остатка)
    pub fn consume(&mut self, travelled: f32, correction_distance: f32) -> Vec3 {
        if correction_distance <= 0.0 || self.is_done() {
            return Vec3::ZERO;
        }

        let step = (self.vector * (travelled / correction_distance))
            .clamp_length_max(self.remaining().length());
        self.consumed += step;
        step
    }
}

/// Снаряд в полёте. Transform — позиция root.
#[derive(Component, Debug, Clone)]
pub struct Projectile {
    pub owner: Entity,
    pub velocity: Vec3,
    /// Направление полёта (нормализованное)
    pub direction: Vec3,
    pub params: ProjectileParams,
    pub age: f32,
    /// Tip на прошлом тике (начало следующего sweep)
    pub previous_tip: Vec3,
    /// Surfaces владельца на момент выстрела
    pub ignored: HashSet<Entity>,
    pub correction: Option<TrajectoryCorrection>,
    /// Часть тела по имени collider'а, в который попали
    pub hit_body_part: Option<BodyPartKind>,
}

impl Projectile {
    pub fn tip(&self, root: Vec3) -> Vec3 {
        root + self.direction * self.params.tip_length
    }

    pub fn is_expired(&self) -> bool {
        self.age >= self.params.max_lifetime
    }
}

/// Визуальный эффект попадания (host рисует по Transform, forward = нормаль)
#[derive(Component, Debug, Clone, Copy)]
pub struct ImpactEffect {
    pub owner: Entity,
    pub normal: Vec3,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correction_clamped_to_remaining() {
        let mut correction = TrajectoryCorrection::new(Vec3::new(0.0, -0.2, 0.0));

        let step = correction.consume(1.0, 2.0);
        assert!((step - Vec3::new(0.0, -0.1, 0.0)).length() < 1e-5);
        assert!(!correction.is_done());

        // Прошли больше, чем осталось — берём только остаток
        let step = correction.consume(10.0, 2.0);
        assert!((step - Vec3::new(0.0, -0.1, 0.0)).length() < 1e-5);
        assert!(correction.is_done());

        assert_eq!(correction.consume(1.0, 2.0), Vec3::ZERO);
    }

    #[test]
    fn test_area_falloff() {
        let area = DamageArea::new(4.0).with_falloff(1.0);

        assert_eq!(area.damage_at(40.0, 0.0), 40.0);
        assert_eq!(area.damage_at(40.0, 2.0), 20.0);
        assert_eq!(area.damage_at(40.0, 10.0), 0.0);

        assert_eq!(DamageArea::new(4.0).damage_at(40.0, 3.0), 40.0);
    }

    #[test]
    fn test_mask_never_includes_ignore_raycast() {
        let params = ProjectileParams::default().with_mask(u32::MAX);
        assert_eq!(params.effective_mask() & LAYER_IGNORE_RAYCAST, 0);
    }
}
