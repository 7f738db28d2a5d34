//! Combat events
//!
//! Intents (host/снаряды → ECS) и notifications (ECS → host: UI, звук, VFX).

use bevy::prelude::*;

use crate::components::{BleedingKind, BodyPartKind};

// ============================================================================
// Intents
// ============================================================================

/// Запрос на урон (уже после Damageable multiplier / self-damage scaling)
///
/// `body_part: Some` → урон в Hitbox (через WornArmor), иначе в Health.
#[derive(Event, Debug, Clone)]
pub struct DamageRequest {
    pub target: Entity,
    pub source: Option<Entity>,
    pub amount: f32,
    pub body_part: Option<BodyPartKind>,
    pub is_explosion: bool,
    /// Шанс сломать конечность (0 — не бросаем)
    pub break_probability: f32,
}

impl DamageRequest {
    pub fn new(target: Entity, amount: f32) -> Self {
        Self {
            target,
            source: None,
            amount,
            body_part: None,
            is_explosion: false,
            break_probability: 0.0,
        }
    }

    pub fn from_source(mut self, source: Entity) -> Self {
        self.source = Some(source);
        self
    }

    pub fn at_part(mut self, part: BodyPartKind) -> Self {
        self.body_part = Some(part);
        self
    }
}

/// Kill (игнорирует invincible)
#[derive(Event, Debug, Clone)]
pub struct KillIntent {
    pub target: Entity,
    pub killer: Option<Entity>,
}

#[derive(Event, Debug, Clone)]
pub struct HealIntent {
    pub target: Entity,
    pub amount: f32,
    /// Some → лечим часть тела, None → Health
    pub body_part: Option<BodyPartKind>,
}

#[derive(Event, Debug, Clone)]
pub struct BleedingIntent {
    pub target: Entity,
    pub body_part: BodyPartKind,
    pub kind: BleedingKind,
}

#[derive(Event, Debug, Clone)]
pub struct SetRagdollIntent {
    pub entity: Entity,
    pub active: bool,
}

// ============================================================================
// Notifications
// ============================================================================

/// Событие: урон нанесен (amount — реально снятое здоровье)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct DamageDealt {
    pub target: Entity,
    pub source: Option<Entity>,
    pub amount: f32,
    pub body_part: Option<BodyPartKind>,
}

#[derive(Event, Debug, Clone, PartialEq)]
pub struct Healed {
    pub target: Entity,
    pub amount: f32,
    pub body_part: Option<BodyPartKind>,
}

/// Событие: entity умер (ровно один раз на entity)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct EntityDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
}

#[derive(Event, Debug, Clone, PartialEq)]
pub struct BodyPartDestroyed {
    pub entity: Entity,
    pub part: BodyPartKind,
}

/// Конечность сломана броском при попадании
#[derive(Event, Debug, Clone, PartialEq)]
pub struct BodyPartBroken {
    pub entity: Entity,
    pub part: BodyPartKind,
}
