//! Кровотечения: накладываются событием, тикают каждый fixed tick

use bevy::prelude::*;

use crate::combat::events::{BleedingIntent, BodyPartDestroyed, EntityDied};
use crate::components::Hitbox;
use crate::logger::log_warning;

/// Система: BleedingIntent → Hitbox::apply_bleeding
pub fn apply_bleeding_intents(
    mut intents: EventReader<BleedingIntent>,
    mut hitboxes: Query<&mut Hitbox>,
) {
    for intent in intents.read() {
        let Ok(mut hitbox) = hitboxes.get_mut(intent.target) else {
            log_warning(&format!("BleedingIntent: {:?} has no Hitbox", intent.target));
            continue;
        };

        hitbox.apply_bleeding(intent.body_part, intent.kind);
    }
}

/// Система: тик всех кровотечений (damage × dt)
pub fn tick_bleeding(
    mut hitboxes: Query<(Entity, &mut Hitbox)>,
    time: Res<Time<Fixed>>,
    mut destroyed_events: EventWriter<BodyPartDestroyed>,
    mut died_events: EventWriter<EntityDied>,
) {
    let delta = time.delta_secs();
    if delta <= 0.0 {
        return;
    }

    for (entity, mut hitbox) in hitboxes.iter_mut() {
        if hitbox.parts().all(|part| part.bleedings.is_empty()) {
            continue;
        }

        let was_dead = hitbox.is_vital_destroyed();

        for part in hitbox.update_bleeding(delta) {
            destroyed_events.write(BodyPartDestroyed { entity, part });
        }

        if !was_dead && hitbox.is_vital_destroyed() {
            died_events.write(EntityDied { entity, killer: None });
        }
    }
}
