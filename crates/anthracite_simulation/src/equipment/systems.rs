//! Weapon inventory systems
//!
//! # Systems
//!
//! **Input phase:**
//! - `spawn_starting_weapons` — стартовый набор + SwitchWeapon(ascending)
//! - `process_weapon_input` — WeaponInput → intents
//!
//! **Equipment phase:**
//! - `process_add_weapon` / `process_remove_weapon` / `process_pickup_weapon`
//! - `process_weapon_switch_intents` — scroll / hotkeys
//! - `update_weapon_switching` — тик state machine (PutDownPrevious → PutUpNew → Up)
//! - `apply_weapon_recoil` / `update_weapon_sway` — позиция socket'а
//! - `sync_weapon_visibility` — показываем только активное оружие

use bevy::prelude::*;

use crate::components::*;
use crate::config::CombatConfig;
use crate::equipment::events::*;
use crate::equipment::sway::WeaponSway;
use crate::logger::{log, log_error, log_warning};
use crate::physics::PhysicsWorld;

/// Spawn runtime экземпляра + запись в inventory
fn add_weapon_to(
    commands: &mut Commands,
    owner: Entity,
    inventory: &mut WeaponInventory,
    definition: &WeaponDefinition,
) -> Result<(usize, Entity), AddWeaponError> {
    inventory.add_weapon(definition, |_slot| {
        commands
            .spawn(WeaponInstance::new(definition.clone(), owner))
            .id()
    })
}

fn report_add_failure(owner: Entity, definition: &WeaponDefinition, reason: &AddWeaponError) {
    match reason {
        AddWeaponError::InvalidDefinition => {
            log_error(&format!("Owner {:?}: invalid weapon definition {:?}", owner, definition.name));
        }
        AddWeaponError::AlreadyHeld(_) | AddWeaponError::NoFreeSlot => {
            log(&format!("Owner {:?}: cannot add '{}': {}", owner, definition.name, reason));
        }
    }
}

fn switched_event(owner: Entity, switch: WeaponSwitch) -> WeaponSwitched {
    WeaponSwitched {
        owner,
        slot: switch.slot,
        weapon: switch.weapon,
    }
}

// ============================================================================
// Input phase
// ============================================================================

/// Стартовый набор: добавляем по порядку, затем SwitchWeapon(ascending)
pub fn spawn_starting_weapons(
    mut commands: Commands,
    mut owners: Query<(Entity, &StartingWeapons, &mut WeaponInventory)>,
    time: Res<Time<Fixed>>,
    mut added_events: EventWriter<WeaponAdded>,
    mut failed_events: EventWriter<WeaponAddFailed>,
    mut switched_events: EventWriter<WeaponSwitched>,
) {
    let now = time.elapsed_secs();

    for (owner, starting, mut inventory) in owners.iter_mut() {
        for definition in &starting.0 {
            match add_weapon_to(&mut commands, owner, &mut inventory, definition) {
                Ok((slot, weapon)) => {
                    added_events.write(WeaponAdded { owner, weapon, slot });
                }
                Err(reason) => {
                    report_add_failure(owner, definition, &reason);
                    failed_events.write(WeaponAddFailed {
                        owner,
                        name: definition.name.clone(),
                        reason,
                    });
                }
            }
        }

        if let Some(switch) = inventory.switch_weapon(true, now) {
            switched_events.write(switched_event(owner, switch));
        }

        commands.entity(owner).remove::<StartingWeapons>();
    }
}

/// WeaponInput → intents
///
/// Переключение только без прицеливания и в стабильном состоянии (Up/Down).
/// One-shot поля (scroll, hotkey, interact) сбрасываются после чтения.
pub fn process_weapon_input(
    mut owners: Query<(Entity, &mut WeaponInput, &WeaponInventory), Without<Dead>>,
    mut pickup_intents: EventWriter<PickupWeaponIntent>,
    mut switch_intents: EventWriter<SwitchWeaponIntent>,
    mut select_intents: EventWriter<SelectWeaponIntent>,
) {
    for (owner, mut input, inventory) in owners.iter_mut() {
        if input.interact {
            pickup_intents.write(PickupWeaponIntent { owner });
        }

        if !input.aiming && inventory.is_stable() {
            if input.switch_axis != 0 {
                switch_intents.write(SwitchWeaponIntent {
                    owner,
                    ascending: input.switch_axis > 0,
                });
            } else if let Some(slot) = input.select_slot {
                if inventory.weapon_at(slot).is_some() {
                    select_intents.write(SelectWeaponIntent {
                        owner,
                        slot: Some(slot),
                        force: false,
                    });
                }
            }
        }

        input.interact = false;
        input.switch_axis = 0;
        input.select_slot = None;
    }
}

// ============================================================================
// Equipment phase
// ============================================================================

pub fn process_add_weapon(
    mut commands: Commands,
    mut intents: EventReader<AddWeaponIntent>,
    mut owners: Query<&mut WeaponInventory>,
    mut added_events: EventWriter<WeaponAdded>,
    mut failed_events: EventWriter<WeaponAddFailed>,
) {
    for intent in intents.read() {
        let Ok(mut inventory) = owners.get_mut(intent.owner) else {
            log_warning(&format!("AddWeaponIntent: {:?} has no WeaponInventory", intent.owner));
            continue;
        };

        match add_weapon_to(&mut commands, intent.owner, &mut inventory, &intent.definition) {
            Ok((slot, weapon)) => {
                log(&format!("Added weapon '{}' to slot {}", intent.definition.name, slot));
                added_events.write(WeaponAdded {
                    owner: intent.owner,
                    weapon,
                    slot,
                });
            }
            Err(reason) => {
                report_add_failure(intent.owner, &intent.definition, &reason);
                failed_events.write(WeaponAddFailed {
                    owner: intent.owner,
                    name: intent.definition.name.clone(),
                    reason,
                });
            }
        }
    }
}

/// Удаление по identity экземпляра; если было активным — переключение на следующее
pub fn process_remove_weapon(
    mut commands: Commands,
    mut intents: EventReader<RemoveWeaponIntent>,
    mut owners: Query<&mut WeaponInventory>,
    time: Res<Time<Fixed>>,
    mut removed_events: EventWriter<WeaponRemoved>,
    mut switched_events: EventWriter<WeaponSwitched>,
) {
    let now = time.elapsed_secs();

    for intent in intents.read() {
        let Ok(mut inventory) = owners.get_mut(intent.owner) else {
            log_warning(&format!("RemoveWeaponIntent: {:?} has no WeaponInventory", intent.owner));
            continue;
        };

        let Some(removed) = inventory.remove_weapon(intent.weapon, now) else {
            log_warning(&format!(
                "RemoveWeaponIntent: {:?} not in inventory of {:?}",
                intent.weapon, intent.owner
            ));
            continue;
        };

        removed_events.write(WeaponRemoved {
            owner: intent.owner,
            weapon: intent.weapon,
            slot: removed.slot,
        });
        commands.entity(intent.weapon).despawn();

        if let Some(switch) = removed.switched {
            switched_events.write(switched_event(intent.owner, switch));
        }
    }
}

/// Подбор: первое активное WeaponPickup в радиусе, которое удалось добавить
///
/// Не больше одного оружия за нажатие.
#[allow(clippy::too_many_arguments)]
pub fn process_pickup_weapon(
    mut commands: Commands,
    mut intents: EventReader<PickupWeaponIntent>,
    mut owners: Query<(&Transform, &mut WeaponInventory)>,
    pickups: Query<&WeaponPickup>,
    physics: Res<PhysicsWorld>,
    config: Res<CombatConfig>,
    time: Res<Time<Fixed>>,
    mut added_events: EventWriter<WeaponAdded>,
    mut switched_events: EventWriter<WeaponSwitched>,
) {
    let now = time.elapsed_secs();
    let mut taken: Vec<Entity> = Vec::new();

    for intent in intents.read() {
        let Ok((transform, mut inventory)) = owners.get_mut(intent.owner) else {
            log_warning(&format!("PickupWeaponIntent: {:?} has no WeaponInventory", intent.owner));
            continue;
        };

        let nearby = physics.query().overlap_sphere(
            transform.translation,
            config.weapons.pickup_radius,
            LAYER_PICKUPS,
        );

        for surface in nearby {
            if taken.contains(&surface) {
                continue;
            }

            let Ok(pickup) = pickups.get(surface) else {
                continue;
            };

            if !pickup.active {
                continue;
            }

            let Ok((slot, weapon)) =
                add_weapon_to(&mut commands, intent.owner, &mut inventory, &pickup.definition)
            else {
                continue;
            };

            log(&format!("Picked up '{}' into slot {}", pickup.definition.name, slot));
            added_events.write(WeaponAdded {
                owner: intent.owner,
                weapon,
                slot,
            });

            if let Some(switch) = inventory.switch_to_index(Some(slot), false, now) {
                switched_events.write(switched_event(intent.owner, switch));
            }

            taken.push(surface);
            commands.entity(surface).despawn();
            break;
        }
    }
}

pub fn process_weapon_switch_intents(
    mut switch_intents: EventReader<SwitchWeaponIntent>,
    mut select_intents: EventReader<SelectWeaponIntent>,
    mut owners: Query<&mut WeaponInventory>,
    time: Res<Time<Fixed>>,
    mut switched_events: EventWriter<WeaponSwitched>,
) {
    let now = time.elapsed_secs();

    for intent in switch_intents.read() {
        let Ok(mut inventory) = owners.get_mut(intent.owner) else {
            log_warning(&format!("SwitchWeaponIntent: {:?} has no WeaponInventory", intent.owner));
            continue;
        };

        if let Some(switch) = inventory.switch_weapon(intent.ascending, now) {
            switched_events.write(switched_event(intent.owner, switch));
        }
    }

    for intent in select_intents.read() {
        let Ok(mut inventory) = owners.get_mut(intent.owner) else {
            log_warning(&format!("SelectWeaponIntent: {:?} has no WeaponInventory", intent.owner));
            continue;
        };

        if let Some(switch) = inventory.switch_to_index(intent.slot, intent.force, now) {
            switched_events.write(switched_event(intent.owner, switch));
        }
    }
}

/// Тик state machine + позиция socket'а во время анимации
pub fn update_weapon_switching(
    mut owners: Query<(
        Entity,
        &mut WeaponInventory,
        Option<&WeaponSockets>,
        Option<&mut WeaponSway>,
        Option<&WeaponInput>,
    )>,
    time: Res<Time<Fixed>>,
    mut switched_events: EventWriter<WeaponSwitched>,
) {
    let now = time.elapsed_secs();

    for (owner, mut inventory, sockets, sway, input) in owners.iter_mut() {
        if inventory.is_stable() {
            continue;
        }

        let progress = inventory.update_switching(now);

        if let Some(switch) = progress.switched {
            switched_events.write(switched_event(owner, switch));
        }

        let (Some(sockets), Some(mut sway)) = (sockets, sway) else {
            continue;
        };

        let crouching = input.is_some_and(|input| input.crouching);
        if let Some(position) = inventory.switching_socket_position(
            progress.time_factor,
            sockets.down,
            sockets.default_for(crouching),
        ) {
            sway.main_position = position;
        }
    }
}

/// WeaponFired → recoil (только когда оружие поднято)
pub fn apply_weapon_recoil(
    mut fired: EventReader<WeaponFired>,
    mut owners: Query<(&WeaponInventory, &mut WeaponSway)>,
    instances: Query<&WeaponInstance>,
    config: Res<CombatConfig>,
) {
    for event in fired.read() {
        let Ok((inventory, mut sway)) = owners.get_mut(event.owner) else {
            continue;
        };

        if inventory.switch_state() != WeaponSwitchState::Up {
            continue;
        }

        let Some(active) = inventory.active_weapon() else {
            continue;
        };

        let Ok(instance) = instances.get(active.entity) else {
            continue;
        };

        sway.add_recoil(instance.definition.recoil_force, config.weapons.max_recoil_distance);
    }
}

/// Aiming lerp + bob + recoil → итоговая позиция socket'а
pub fn update_weapon_sway(
    mut owners: Query<(
        &Transform,
        &WeaponInventory,
        &WeaponSockets,
        &mut WeaponSway,
        Option<&WeaponInput>,
    )>,
    instances: Query<&WeaponInstance>,
    config: Res<CombatConfig>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();
    let elapsed = time.elapsed_secs();
    let weapons = &config.weapons;

    for (transform, inventory, sockets, mut sway, input) in owners.iter_mut() {
        let aiming = input.is_some_and(|input| input.aiming);
        let crouching = input.is_some_and(|input| input.crouching);
        let grounded = input.is_some_and(|input| input.grounded);

        if inventory.switch_state() == WeaponSwitchState::Up {
            let aim_offset = inventory
                .active_weapon()
                .and_then(|active| instances.get(active.entity).ok())
                .map(|instance| instance.definition.aim_offset)
                .unwrap_or(Vec3::ZERO);

            let target = if aiming {
                sockets.aiming_for(crouching)
            } else {
                sockets.default_for(crouching)
            };

            sway.move_main_towards(target + aim_offset, weapons.aiming_animation_speed, delta);
        }

        sway.update_bob(transform.translation, grounded, aiming, elapsed, delta, weapons);
        sway.update_recoil(delta, weapons);
        sway.compose();
    }
}

/// Показано только активное оружие своего владельца
pub fn sync_weapon_visibility(
    mut instances: Query<(Entity, &mut WeaponInstance)>,
    inventories: Query<&WeaponInventory>,
) {
    for (weapon, mut instance) in instances.iter_mut() {
        let shown = inventories
            .get(instance.owner)
            .ok()
            .and_then(|inventory| inventory.active_weapon())
            .is_some_and(|active| active.entity == weapon);

        if instance.shown != shown {
            instance.show(shown);
        }
    }
}
