//! Базовые компоненты акторов: Health, Dead, Ragdoll

use bevy::prelude::*;

use crate::config::HealthConfig;

/// Здоровье (несегментированный damageable: ящики, турели, дроны)
///
/// Инвариант: 0 ≤ current ≤ max.
/// `dead` — latch: выставляется ровно один раз при переходе alive → current ≤ 0.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: f32,
    pub max: f32,
    pub critical_ratio: f32,
    pub invincible: bool,
    dead: bool,
}

/// Что произошло после take_damage/kill
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DamageOutcome {
    /// Реально снятое здоровье (для Damaged notification); 0 → событие не нужно
    pub dealt: f32,
    /// true ровно в том вызове, который убил
    pub died: bool,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(10.0)
    }
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self {
            current: max,
            max,
            critical_ratio: 0.3,
            invincible: false,
            dead: false,
        }
    }

    pub fn from_config(config: &HealthConfig) -> Self {
        Self {
            critical_ratio: config.critical_ratio,
            ..Self::new(config.max_health)
        }
    }

    pub fn with_critical_ratio(mut self, ratio: f32) -> Self {
        self.critical_ratio = ratio;
        self
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn is_alive(&self) -> bool {
        !self.dead
    }

    pub fn ratio(&self) -> f32 {
        self.current / self.max
    }

    /// Граница включительная: 3/10 при ratio 0.3 — critical
    pub fn is_critical(&self) -> bool {
        self.ratio() <= self.critical_ratio
    }

    pub fn can_pickup(&self) -> bool {
        self.current < self.max
    }

    /// Returns the amount actually healed (0 → no notification)
    pub fn heal(&mut self, amount: f32) -> f32 {
        let before = self.current;
        self.current = (self.current + amount).clamp(0.0, self.max);
        (self.current - before).max(0.0)
    }

    pub fn take_damage(&mut self, amount: f32) -> DamageOutcome {
        if self.invincible {
            return DamageOutcome::default();
        }

        let before = self.current;
        self.current = (self.current - amount).clamp(0.0, self.max);

        DamageOutcome {
            dealt: (before - self.current).max(0.0),
            died: self.handle_death(),
        }
    }

    /// Kill игнорирует invincible и всегда репортит damaged(max)
    pub fn kill(&mut self) -> DamageOutcome {
        self.current = 0.0;

        DamageOutcome {
            dealt: self.max,
            died: self.handle_death(),
        }
    }

    fn handle_death(&mut self) -> bool {
        if self.dead {
            return false;
        }

        if self.current <= 0.0 {
            self.dead = true;
            return true;
        }

        false
    }
}

/// Компонент-маркер: entity мертв
///
/// Деспавн не автоматический — трупы остаются на месте.
#[derive(Component, Debug)]
pub struct Dead;

/// Ragdoll toggle: physics (true) ↔ animation (false)
///
/// Host читает `Changed<Ragdoll>` и переключает kinematic/colliders/animator.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Ragdoll {
    pub active: bool,
}

impl Ragdoll {
    pub fn set_state(&mut self, active: bool) {
        self.active = active;
    }

    /// Rigidbodies kinematic когда ragdoll выключен
    pub fn bodies_kinematic(&self) -> bool {
        !self.active
    }

    pub fn colliders_enabled(&self) -> bool {
        self.active
    }

    pub fn animator_enabled(&self) -> bool {
        !self.active
    }
}
