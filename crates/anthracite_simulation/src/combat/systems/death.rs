//! Death handling и ragdoll toggle

use bevy::prelude::*;

use crate::combat::events::{EntityDied, SetRagdollIntent};
use crate::components::{Dead, Ragdoll, WeaponInput};
use crate::logger::{log, log_warning};

/// Система: реакция на смерть
///
/// Добавляет маркер Dead, убирает WeaponInput (мёртвые не стреляют и не
/// переключают оружие), переводит Ragdoll в physics mode.
pub fn handle_death(
    mut commands: Commands,
    mut death_events: EventReader<EntityDied>,
    mut ragdolls: Query<&mut Ragdoll>,
) {
    for event in death_events.read() {
        if let Ok(mut ragdoll) = ragdolls.get_mut(event.entity) {
            ragdoll.set_state(true);
        }

        if let Ok(mut entity_commands) = commands.get_entity(event.entity) {
            entity_commands.remove::<WeaponInput>();
            entity_commands.insert(Dead);

            log(&format!(
                "Entity {:?} died (killer: {:?})",
                event.entity, event.killer
            ));
        }
    }
}

/// Система: SetRagdollIntent → Ragdoll::set_state
pub fn apply_ragdoll_intents(
    mut intents: EventReader<SetRagdollIntent>,
    mut ragdolls: Query<&mut Ragdoll>,
) {
    for intent in intents.read() {
        let Ok(mut ragdoll) = ragdolls.get_mut(intent.entity) else {
            log_warning(&format!("SetRagdollIntent: {:?} has no Ragdoll", intent.entity));
            continue;
        };

        if ragdoll.active != intent.active {
            ragdoll.set_state(intent.active);
        }
    }
}
