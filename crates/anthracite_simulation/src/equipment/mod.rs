//! Equipment module — weapon inventory lifecycle
//!
//! # Architecture
//!
//! **Events → Systems flow:**
//! - Host пишет `WeaponInput` (или сразу intent events)
//! - Systems обрабатывают intents (меняют WeaponInventory)
//! - Notifications (`WeaponAdded`, `WeaponSwitched`, ...) → host (UI, анимации)
//!
//! **Weapon lifecycle:**
//! - Add → spawn WeaponInstance (скрыт) в первый свободный слот
//! - Switch → PutDownPrevious → (смена active) → PutUpNew → Up
//! - Remove → despawn экземпляра, переключение если был активным
//! - Pickup → overlap в радиусе, первое подходящее WeaponPickup

use bevy::prelude::*;

pub mod events;
pub mod sway;
pub mod systems;


// Re-exports
pub use events::*;
pub use sway::WeaponSway;
pub use systems::*;

use crate::SimulationSet;

/// Equipment plugin (weapon inventory + switch state machine)
pub struct EquipmentPlugin;

impl Plugin for EquipmentPlugin {
    fn build(&self, app: &mut App) {
        app
            // Events
            .add_event::<AddWeaponIntent>()
            .add_event::<RemoveWeaponIntent>()
            .add_event::<SwitchWeaponIntent>()
            .add_event::<SelectWeaponIntent>()
            .add_event::<PickupWeaponIntent>()
            .add_event::<WeaponFired>()
            .add_event::<WeaponAdded>()
            .add_event::<WeaponRemoved>()
            .add_event::<WeaponSwitched>()
            .add_event::<WeaponAddFailed>()
            .add_systems(
                FixedUpdate,
                (
                    (spawn_starting_weapons, process_weapon_input)
                        .chain()
                        .in_set(SimulationSet::Input),
                    (
                        process_add_weapon,
                        process_remove_weapon,
                        process_pickup_weapon,
                        process_weapon_switch_intents,
                        update_weapon_switching,
                        apply_weapon_recoil,
                        update_weapon_sway,
                        sync_weapon_visibility,
                    )
                        .chain()
                        .in_set(SimulationSet::Equipment),
                ),
            );
    }
}
