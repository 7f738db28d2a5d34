//! Combat module: damage resolution поверх body-part ledger
//!
//! ECS ответственность:
//! - Game state: Hitbox (части тела), Health, WornArmor, Ragdoll
//! - Combat rules: броня → региональный множитель → ledger, бросок на перелом
//! - Events: DamageDealt, Healed, BodyPartDestroyed, EntityDied
//!
//! Источники урона (снаряды, host) пишут `DamageRequest`, дальше всё здесь.

use bevy::prelude::*;

pub mod events;
pub mod spawn;
pub mod systems;

// Re-export основных типов
pub use events::*;
pub use spawn::{spawn_body_surfaces, spawn_combatant, spawn_damageable_prop, spawn_obstacle};
pub use systems::{damage_body_part, BodyHit, DespawnAfter};

use crate::SimulationSet;

/// Combat Plugin
///
/// Порядок выполнения (FixedUpdate):
/// 1. Input: bleeding / ragdoll intents
/// 2. Damage: apply_damage → apply_kill → apply_heal → tick_bleeding
/// 3. Cleanup: handle_death → despawn_after_timeout
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        // Регистрация событий
        app.add_event::<DamageRequest>()
            .add_event::<KillIntent>()
            .add_event::<HealIntent>()
            .add_event::<BleedingIntent>()
            .add_event::<SetRagdollIntent>()
            .add_event::<DamageDealt>()
            .add_event::<Healed>()
            .add_event::<EntityDied>()
            .add_event::<BodyPartDestroyed>()
            .add_event::<BodyPartBroken>();

        app.add_systems(
            FixedUpdate,
            (
                (systems::apply_bleeding_intents, systems::apply_ragdoll_intents)
                    .in_set(SimulationSet::Input),
                (
                    systems::apply_damage,
                    systems::apply_kill,
                    systems::apply_heal,
                    systems::tick_bleeding,
                )
                    .chain()
                    .in_set(SimulationSet::Damage),
                (systems::handle_death, systems::despawn_after_timeout)
                    .chain()
                    .in_set(SimulationSet::Cleanup),
            ),
        );
    }
}
