//! Projectile module — полёт снаряда и hit resolution
//!
//! State machine: Launched → Flying → {Impacted | Expired}.
//! Terminal states уничтожают entity снаряда.
//!
//! Снаряд не наносит урон сам: попадание превращается в `DamageRequest`,
//! который обрабатывает CombatPlugin в фазе Damage того же тика.

use bevy::prelude::*;

pub mod components;
pub mod events;
pub mod systems;

#[cfg(test)]
mod systems_tests;

pub use components::*;
pub use events::*;
pub use systems::{advance_projectiles, is_hit_valid, launch_projectiles, select_impact};

use crate::SimulationSet;

/// Projectile plugin
///
/// Launch: `launch_projectiles`, Flight: `advance_projectiles`.
pub struct ProjectilePlugin;

impl Plugin for ProjectilePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<FireProjectileIntent>()
            .add_event::<ImpactSpawned>()
            .add_event::<ProjectileExpired>()
            .add_systems(
                FixedUpdate,
                (
                    launch_projectiles.in_set(SimulationSet::Launch),
                    advance_projectiles.in_set(SimulationSet::Flight),
                ),
            );
    }
}
