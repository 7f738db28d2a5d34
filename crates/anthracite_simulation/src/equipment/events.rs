//! Weapon inventory events
//!
//! # Architecture
//!
//! **Intents (host / WeaponInput → ECS):**
//! - `AddWeaponIntent` → положить оружие в первый свободный слот
//! - `RemoveWeaponIntent` → убрать конкретный экземпляр
//! - `SwitchWeaponIntent` → следующее/предыдущее по кольцу слотов
//! - `SelectWeaponIntent` → конкретный слот (hotkeys 1-9)
//! - `PickupWeaponIntent` → подобрать оружие рядом
//! - `WeaponFired` → выстрел активного оружия (для recoil)
//!
//! **Notifications (ECS → host):**
//! - `WeaponAdded`, `WeaponRemoved`, `WeaponSwitched`, `WeaponAddFailed`

use bevy::prelude::*;

use crate::components::{AddWeaponError, WeaponDefinition};

// ============================================================================
// Intents
// ============================================================================

#[derive(Event, Clone, Debug)]
pub struct AddWeaponIntent {
    pub owner: Entity,
    pub definition: WeaponDefinition,
}

#[derive(Event, Clone, Debug)]
pub struct RemoveWeaponIntent {
    pub owner: Entity,
    pub weapon: Entity,
}

#[derive(Event, Clone, Debug)]
pub struct SwitchWeaponIntent {
    pub owner: Entity,
    pub ascending: bool,
}

/// Переключение на слот (0-8). `slot: None` + `force` — убрать оружие из рук.
#[derive(Event, Clone, Debug)]
pub struct SelectWeaponIntent {
    pub owner: Entity,
    pub slot: Option<usize>,
    pub force: bool,
}

#[derive(Event, Clone, Debug)]
pub struct PickupWeaponIntent {
    pub owner: Entity,
}

/// Активное оружие выстрелило (WeaponController — на стороне host'а)
#[derive(Event, Clone, Debug)]
pub struct WeaponFired {
    pub owner: Entity,
}

// ============================================================================
// Notifications
// ============================================================================

#[derive(Event, Clone, Debug, PartialEq)]
pub struct WeaponAdded {
    pub owner: Entity,
    pub weapon: Entity,
    pub slot: usize,
}

#[derive(Event, Clone, Debug, PartialEq)]
pub struct WeaponRemoved {
    pub owner: Entity,
    pub weapon: Entity,
    pub slot: usize,
}

/// Сменилось активное оружие (`weapon: None` — руки пустые)
#[derive(Event, Clone, Debug, PartialEq)]
pub struct WeaponSwitched {
    pub owner: Entity,
    pub slot: Option<usize>,
    pub weapon: Option<Entity>,
}

#[derive(Event, Clone, Debug, PartialEq)]
pub struct WeaponAddFailed {
    pub owner: Entity,
    pub name: String,
    pub reason: AddWeaponError,
}
