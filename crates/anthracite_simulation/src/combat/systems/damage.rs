//! Damage, heal и kill systems

use bevy::prelude::*;
use rand::Rng;

use crate::combat::events::*;
use crate::components::{BodyPartKind, Health, Hitbox, WornArmor};
use crate::logger::{log, log_warning};
use crate::DeterministicRng;

/// Компонент-маркер: деспавн entity после указанного времени
///
/// Используется для impact effects. Система `despawn_after_timeout` удаляет entity
/// когда `Time<Fixed>::elapsed_secs() >= despawn_time`.
#[derive(Component, Debug)]
pub struct DespawnAfter {
    /// Время деспавна (в секундах от старта симуляции)
    pub despawn_time: f32,
}

/// Что произошло с частью тела после попадания
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BodyHit {
    pub dealt: f32,
    pub destroyed_now: bool,
    pub broken_now: bool,
    /// Первое уничтожение vital части
    pub died: bool,
}

/// Урон по части тела: броня → ledger → бросок на перелом
///
/// None — регион не зарегистрирован в Hitbox.
pub fn damage_body_part(
    hitbox: &mut Hitbox,
    armor: Option<&mut WornArmor>,
    part: BodyPartKind,
    amount: f32,
    break_probability: f32,
    rng: &mut impl Rng,
) -> Option<BodyHit> {
    // Промах по региону — no-op, броня не тратится
    hitbox.part(part)?;

    let residual = match armor {
        Some(armor) => armor.intercept(part, amount),
        None => amount,
    };

    let was_dead = hitbox.is_vital_destroyed();
    let hit = hitbox.take_damage(part, residual)?;

    let mut broken_now = false;
    if break_probability > 0.0 {
        if let Some(body_part) = hitbox.part_mut(part) {
            if body_part.can_be_broken()
                && !body_part.is_broken()
                && rng.gen::<f32>() < break_probability
            {
                body_part.set_broken(true);
                broken_now = true;
            }
        }
    }

    Some(BodyHit {
        dealt: hit.dealt,
        destroyed_now: hit.destroyed_now,
        broken_now,
        died: !was_dead && hitbox.is_vital_destroyed(),
    })
}

/// Система: DamageRequest → Hitbox / Health
///
/// 1. body_part + Hitbox → WornArmor → ledger (+ бросок на перелом для прямых попаданий)
/// 2. иначе → Health (invincible, clamp, death latch)
/// 3. DamageDealt / BodyPartDestroyed / BodyPartBroken / EntityDied
pub fn apply_damage(
    mut requests: EventReader<DamageRequest>,
    mut targets: Query<(Option<&mut Hitbox>, Option<&mut Health>, Option<&mut WornArmor>)>,
    mut rng: ResMut<DeterministicRng>,
    mut dealt_events: EventWriter<DamageDealt>,
    mut destroyed_events: EventWriter<BodyPartDestroyed>,
    mut broken_events: EventWriter<BodyPartBroken>,
    mut died_events: EventWriter<EntityDied>,
) {
    for request in requests.read() {
        let Ok((hitbox, health, mut armor)) = targets.get_mut(request.target) else {
            log_warning(&format!("DamageRequest: target {:?} not found", request.target));
            continue;
        };

        if let (Some(part), Some(mut hitbox)) = (request.body_part, hitbox) {
            let break_probability = if request.is_explosion {
                0.0
            } else {
                request.break_probability
            };

            let Some(hit) = damage_body_part(
                &mut hitbox,
                armor.as_deref_mut(),
                part,
                request.amount,
                break_probability,
                &mut rng.rng,
            ) else {
                continue;
            };

            if hit.dealt > 0.0 {
                dealt_events.write(DamageDealt {
                    target: request.target,
                    source: request.source,
                    amount: hit.dealt,
                    body_part: Some(part),
                });
            }

            if hit.destroyed_now {
                destroyed_events.write(BodyPartDestroyed {
                    entity: request.target,
                    part,
                });
            }

            if hit.broken_now {
                log(&format!("Body part {:?} of {:?} broken", part, request.target));
                broken_events.write(BodyPartBroken {
                    entity: request.target,
                    part,
                });
            }

            if hit.died {
                died_events.write(EntityDied {
                    entity: request.target,
                    killer: request.source,
                });
            }

            continue;
        }

        let Some(mut health) = health else {
            log_warning(&format!(
                "DamageRequest: target {:?} has neither Hitbox region nor Health",
                request.target
            ));
            continue;
        };

        let outcome = health.take_damage(request.amount);

        if outcome.dealt > 0.0 {
            dealt_events.write(DamageDealt {
                target: request.target,
                source: request.source,
                amount: outcome.dealt,
                body_part: None,
            });
        }

        if outcome.died {
            died_events.write(EntityDied {
                entity: request.target,
                killer: request.source,
            });
        }
    }
}

/// Система: KillIntent → Health::kill
pub fn apply_kill(
    mut intents: EventReader<KillIntent>,
    mut targets: Query<&mut Health>,
    mut dealt_events: EventWriter<DamageDealt>,
    mut died_events: EventWriter<EntityDied>,
) {
    for intent in intents.read() {
        let Ok(mut health) = targets.get_mut(intent.target) else {
            log_warning(&format!("KillIntent: target {:?} has no Health", intent.target));
            continue;
        };

        let outcome = health.kill();

        dealt_events.write(DamageDealt {
            target: intent.target,
            source: intent.killer,
            amount: outcome.dealt,
            body_part: None,
        });

        if outcome.died {
            died_events.write(EntityDied {
                entity: intent.target,
                killer: intent.killer,
            });
        }
    }
}

/// Система: HealIntent → Hitbox region / Health
pub fn apply_heal(
    mut intents: EventReader<HealIntent>,
    mut targets: Query<(Option<&mut Hitbox>, Option<&mut Health>)>,
    mut healed_events: EventWriter<Healed>,
) {
    for intent in intents.read() {
        let Ok((hitbox, health)) = targets.get_mut(intent.target) else {
            log_warning(&format!("HealIntent: target {:?} not found", intent.target));
            continue;
        };

        let healed = match (intent.body_part, hitbox, health) {
            (Some(part), Some(mut hitbox), _) => hitbox.heal(part, intent.amount),
            (_, _, Some(mut health)) => Some(health.heal(intent.amount)),
            _ => {
                log_warning(&format!("HealIntent: nothing to heal on {:?}", intent.target));
                None
            }
        };

        let Some(amount) = healed.filter(|&amount| amount > 0.0) else {
            continue;
        };

        healed_events.write(Healed {
            target: intent.target,
            amount,
            body_part: intent.body_part,
        });
    }
}

/// Система: деспавн entities с истёкшим DespawnAfter timeout
pub fn despawn_after_timeout(
    mut commands: Commands,
    query: Query<(Entity, &DespawnAfter)>,
    time: Res<Time<Fixed>>,
) {
    let current_time = time.elapsed_secs();

    for (entity, despawn_after) in query.iter() {
        if current_time >= despawn_after.despawn_time {
            commands.entity(entity).despawn();
        }
    }
}
