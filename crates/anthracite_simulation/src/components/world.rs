//! Surfaces в мире: collider'ы, слои, damageable capability
//!
//! Surface — отдельный entity (collider часть тела, стена, подбираемое оружие).
//! `owner` — entity, которому surface принадлежит (для self-hit exclusion).

use bevy::prelude::*;

use super::body::BodyPartKind;

// ============================================================================
// Collision layers
// ============================================================================

/// Layer: actors (body part colliders)
pub const LAYER_ACTORS: u32 = 0b10;

/// Layer: environment (стены, пол, препятствия)
pub const LAYER_ENVIRONMENT: u32 = 0b100;

/// Layer: weapon pickups
pub const LAYER_PICKUPS: u32 = 0b1000;

/// Layer: "Ignore Raycast" — никогда не попадает в маски снарядов
pub const LAYER_IGNORE_RAYCAST: u32 = 0b1_0000;

/// Mask: всё, кроме Ignore Raycast
pub const MASK_ALL: u32 = !LAYER_IGNORE_RAYCAST;

/// Mask: снаряды попадают в actors + environment
pub const MASK_PROJECTILES: u32 = LAYER_ACTORS | LAYER_ENVIRONMENT;

// ============================================================================
// Surface
// ============================================================================

#[derive(Component, Debug, Clone)]
pub struct Surface {
    pub owner: Entity,
    /// Имя collider'а (для body part: "head", "leftarm", ...)
    pub name: String,
    pub layer: u32,
    /// Trigger (не solid) — пропускается снарядом, если нет Damageable
    pub is_trigger: bool,
}

impl Surface {
    pub fn solid(owner: Entity, name: impl Into<String>, layer: u32) -> Self {
        Self {
            owner,
            name: name.into(),
            layer,
            is_trigger: false,
        }
    }

    pub fn trigger(owner: Entity, name: impl Into<String>, layer: u32) -> Self {
        Self {
            is_trigger: true,
            ..Self::solid(owner, name, layer)
        }
    }

    pub fn body_part(&self) -> Option<BodyPartKind> {
        BodyPartKind::from_surface_name(&self.name)
    }
}

/// Сферический collider (world-space центр = Transform.translation)
#[derive(Component, Debug, Clone, Copy)]
pub struct SphereCollider {
    pub radius: f32,
}

/// Маркер: снаряды не регистрируют попадания в этот surface
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct IgnoreHitDetection;

/// Damageable capability на surface
///
/// Направляет урон во владельца (`target`): в его Hitbox (по `body_part`)
/// или в Health.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Damageable {
    pub target: Entity,
    pub body_part: Option<BodyPartKind>,
    /// Множитель прямого (не explosion) урона
    pub damage_multiplier: f32,
    /// Множитель урона от самого себя
    pub self_damage_sensitivity: f32,
}

impl Damageable {
    pub fn new(target: Entity) -> Self {
        Self {
            target,
            body_part: None,
            damage_multiplier: 1.0,
            self_damage_sensitivity: 0.5,
        }
    }

    pub fn body_part(target: Entity, part: BodyPartKind, damage_multiplier: f32) -> Self {
        Self {
            body_part: Some(part),
            damage_multiplier,
            ..Self::new(target)
        }
    }

    /// Итоговый урон для inflict_damage(amount, is_explosion, causer)
    pub fn compute_damage(&self, amount: f32, is_explosion: bool, causer: Option<Entity>) -> f32 {
        let mut total = amount;

        if !is_explosion {
            total *= self.damage_multiplier;
        }

        if causer == Some(self.target) {
            total *= self.self_damage_sensitivity;
        }

        total
    }
}

/// Камера оружия (для trajectory correction снарядов владельца)
#[derive(Component, Debug, Clone, Copy)]
pub struct AimCamera {
    pub position: Vec3,
    pub forward: Vec3,
}
