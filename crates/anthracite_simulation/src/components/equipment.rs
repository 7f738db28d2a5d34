//! Weapon inventory components
//!
//! # Архитектура
//!
//! **WeaponInventory** — 9 слотов (hotkeys 1-9):
//! - Слот = handle на runtime weapon entity (или пусто)
//! - `active_index` (None = ничего не в руках)
//! - Переключение — анимированная state machine:
//!   `Down → PutUpNew → Up → PutDownPrevious → PutUpNew → Up → …`
//! - Down/Up стабильные, PutDownPrevious/PutUpNew длятся `switch_delay`
//!
//! **WeaponInstance** — runtime копия оружия (child владельца, скрыта пока не активна)
//!
//! **WeaponPickup** — оружие, лежащее в мире (подбирается через interact)

use bevy::prelude::*;
use thiserror::Error;

use crate::config::WeaponsConfig;

/// Количество weapon слотов
pub const WEAPON_SLOT_COUNT: usize = 9;

// ============================================================================
// Definitions / instances
// ============================================================================

/// Описание оружия (prefab). Оружие сравнивается по имени.
#[derive(Debug, Clone, PartialEq)]
pub struct WeaponDefinition {
    pub name: String,
    /// Сила отдачи за выстрел (для WeaponSway)
    pub recoil_force: f32,
    /// Смещение позиции оружия при прицеливании
    pub aim_offset: Vec3,
}

impl WeaponDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            recoil_force: 1.0,
            aim_offset: Vec3::ZERO,
        }
    }

    pub fn with_recoil(mut self, recoil_force: f32) -> Self {
        self.recoil_force = recoil_force;
        self
    }

    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

/// Runtime экземпляр оружия, привязанный к владельцу
#[derive(Component, Debug, Clone)]
pub struct WeaponInstance {
    pub definition: WeaponDefinition,
    pub owner: Entity,
    /// Показано ли оружие (только активное)
    pub shown: bool,
}

impl WeaponInstance {
    pub fn new(definition: WeaponDefinition, owner: Entity) -> Self {
        Self {
            definition,
            owner,
            shown: false,
        }
    }

    pub fn show(&mut self, shown: bool) {
        self.shown = shown;
    }
}

/// Оружие, лежащее в мире
#[derive(Component, Debug, Clone)]
pub struct WeaponPickup {
    pub definition: WeaponDefinition,
    /// Неактивные объекты подобрать нельзя
    pub active: bool,
}

impl WeaponPickup {
    pub fn new(definition: WeaponDefinition) -> Self {
        Self {
            definition,
            active: true,
        }
    }
}

/// Стартовый набор (добавляется на первом тике, затем SwitchWeapon(ascending))
#[derive(Component, Debug, Clone, Default)]
pub struct StartingWeapons(pub Vec<WeaponDefinition>);

// ============================================================================
// Inventory
// ============================================================================

/// Слот инвентаря: handle на entity + имя для поиска дубликатов
#[derive(Debug, Clone, PartialEq)]
pub struct WeaponHandle {
    pub entity: Entity,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum WeaponSwitchState {
    Up,
    #[default]
    Down,
    PutDownPrevious,
    PutUpNew,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AddWeaponError {
    #[error("weapon definition is invalid")]
    InvalidDefinition,

    #[error("weapon '{0}' already in inventory")]
    AlreadyHeld(String),

    #[error("no free weapon slots")]
    NoFreeSlot,
}

/// Результат переключения (для WeaponSwitched notification)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponSwitch {
    pub slot: Option<usize>,
    pub weapon: Option<Entity>,
}

/// Результат тика state machine
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SwitchProgress {
    /// 0..1 прогресс текущей фазы (для lerp socket'а)
    pub time_factor: f32,
    /// Оружие, которое надо спрятать (завершён put down)
    pub hidden: Option<Entity>,
    pub switched: Option<WeaponSwitch>,
}

/// Результат удаления оружия
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemovedWeapon {
    pub slot: usize,
    pub switched: Option<WeaponSwitch>,
}

#[derive(Component, Debug, Clone)]
pub struct WeaponInventory {
    slots: [Option<WeaponHandle>; WEAPON_SLOT_COUNT],
    active_index: Option<usize>,
    switch_state: WeaponSwitchState,
    pending_index: Option<usize>,
    switch_started_at: f32,
    /// Длительность каждой фазы переключения (секунды)
    pub switch_delay: f32,
}

impl Default for WeaponInventory {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl WeaponInventory {
    pub fn new(switch_delay: f32) -> Self {
        Self {
            slots: Default::default(),
            active_index: None,
            switch_state: WeaponSwitchState::Down,
            pending_index: None,
            switch_started_at: 0.0,
            switch_delay,
        }
    }

    pub fn from_config(config: &WeaponsConfig) -> Self {
        Self::new(config.switch_delay)
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    pub fn switch_state(&self) -> WeaponSwitchState {
        self.switch_state
    }

    pub fn pending_index(&self) -> Option<usize> {
        self.pending_index
    }

    /// Можно ли принимать input на переключение (стабильное состояние)
    pub fn is_stable(&self) -> bool {
        matches!(self.switch_state, WeaponSwitchState::Up | WeaponSwitchState::Down)
    }

    pub fn weapon_at(&self, index: usize) -> Option<&WeaponHandle> {
        self.slots.get(index)?.as_ref()
    }

    pub fn active_weapon(&self) -> Option<&WeaponHandle> {
        self.weapon_at(self.active_index?)
    }

    pub fn weapons(&self) -> impl Iterator<Item = (usize, &WeaponHandle)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|handle| (i, handle)))
    }

    pub fn weapon_count(&self) -> usize {
        self.weapons().count()
    }

    /// Оружие с таким же именем (дубликаты запрещены)
    pub fn has_weapon(&self, name: &str) -> Option<&WeaponHandle> {
        self.weapons().map(|(_, h)| h).find(|h| h.name == name)
    }

    /// Индекс слота по имени (case-insensitive)
    pub fn slot_of(&self, name: &str) -> Option<usize> {
        self.weapons()
            .find(|(_, h)| h.name.eq_ignore_ascii_case(name))
            .map(|(i, _)| i)
    }

    pub fn slot_of_entity(&self, entity: Entity) -> Option<usize> {
        self.weapons().find(|(_, h)| h.entity == entity).map(|(i, _)| i)
    }

    /// Кладёт оружие в первый свободный слот. Возвращает (слот, экземпляр).
    ///
    /// `spawn` вызывается только если слот найден и получает его индекс.
    pub fn add_weapon(
        &mut self,
        definition: &WeaponDefinition,
        spawn: impl FnOnce(usize) -> Entity,
    ) -> Result<(usize, Entity), AddWeaponError> {
        if !definition.is_valid() {
            return Err(AddWeaponError::InvalidDefinition);
        }

        if self.has_weapon(&definition.name).is_some() {
            return Err(AddWeaponError::AlreadyHeld(definition.name.clone()));
        }

        let slot = self
            .slots
            .iter()
            .position(Option::is_none)
            .ok_or(AddWeaponError::NoFreeSlot)?;

        let entity = spawn(slot);
        self.slots[slot] = Some(WeaponHandle {
            entity,
            name: definition.name.clone(),
        });

        Ok((slot, entity))
    }

    /// Удаляет оружие (по identity). Если оно было активным — выбираем замену.
    pub fn remove_weapon(&mut self, weapon: Entity, now: f32) -> Option<RemovedWeapon> {
        let slot = self.slot_of_entity(weapon)?;
        self.slots[slot] = None;

        if self.active_index != Some(slot) {
            return Some(RemovedWeapon {
                slot,
                switched: None,
            });
        }

        let mut switched = self.switch_weapon(true, now);

        // Заменить нечем — руки пустые
        if switched.is_none() && self.active_weapon().is_none() {
            self.active_index = None;
            self.pending_index = None;
            self.switch_state = WeaponSwitchState::Down;
            switched = Some(WeaponSwitch {
                slot: None,
                weapon: None,
            });
        }

        Some(RemovedWeapon { slot, switched })
    }

    /// «Расстояние» между слотами по кольцу.
    ///
    /// Пример для 9 слотов: 2 → 5 = 3 по возрастанию, 6 по убыванию.
    /// Без активного оружия ascending начинает «перед» слотом 0, descending — «после» слота 8.
    pub fn slot_distance(from: Option<usize>, to: usize, ascending: bool) -> usize {
        let n = WEAPON_SLOT_COUNT as i32;
        let to = to as i32;

        let distance = match (from, ascending) {
            (Some(from), true) => to - from as i32,
            (Some(from), false) => from as i32 - to,
            (None, true) => to + 1,
            (None, false) => n - to,
        };

        if distance < 0 {
            (distance + n) as usize
        } else {
            distance as usize
        }
    }

    /// Следующий занятый слот по кольцу в заданном направлении
    pub fn next_weapon_index(&self, ascending: bool) -> Option<usize> {
        self.weapons()
            .map(|(i, _)| i)
            .filter(|&i| Some(i) != self.active_index)
            .min_by_key(|&i| Self::slot_distance(self.active_index, i, ascending))
    }

    pub fn switch_weapon(&mut self, ascending: bool, now: f32) -> Option<WeaponSwitch> {
        let next = self.next_weapon_index(ascending)?;
        self.switch_to_index(Some(next), false, now)
    }

    /// Начать переключение на слот.
    ///
    /// Без активного оружия — сразу PutUpNew (put down пропускается) и
    /// возвращается WeaponSwitch. Иначе PutDownPrevious, смена индекса — по таймеру.
    pub fn switch_to_index(
        &mut self,
        index: Option<usize>,
        force: bool,
        now: f32,
    ) -> Option<WeaponSwitch> {
        if index.is_some_and(|i| i >= WEAPON_SLOT_COUNT) {
            return None;
        }

        if !force && (index.is_none() || index == self.active_index) {
            return None;
        }

        self.pending_index = index;
        self.switch_started_at = now;

        if self.active_weapon().is_none() {
            self.switch_state = WeaponSwitchState::PutUpNew;
            self.active_index = index;

            return Some(WeaponSwitch {
                slot: index,
                weapon: self.active_weapon().map(|h| h.entity),
            });
        }

        self.switch_state = WeaponSwitchState::PutDownPrevious;
        None
    }

    pub fn time_factor(&self, now: f32) -> f32 {
        if self.switch_delay == 0.0 {
            1.0
        } else {
            ((now - self.switch_started_at) / self.switch_delay).clamp(0.0, 1.0)
        }
    }

    /// Тик анимированного переключения
    pub fn update_switching(&mut self, now: f32) -> SwitchProgress {
        let mut progress = SwitchProgress {
            time_factor: self.time_factor(now),
            ..default()
        };

        if progress.time_factor < 1.0 {
            return progress;
        }

        match self.switch_state {
            WeaponSwitchState::PutDownPrevious => {
                progress.hidden = self.active_weapon().map(|h| h.entity);

                self.active_index = self.pending_index;
                progress.time_factor = 0.0;

                let new_weapon = self.active_weapon().map(|h| h.entity);
                progress.switched = Some(WeaponSwitch {
                    slot: self.active_index,
                    weapon: new_weapon,
                });

                if new_weapon.is_some() {
                    self.switch_started_at = now;
                    self.switch_state = WeaponSwitchState::PutUpNew;
                } else {
                    // Нового оружия нет — обратно не поднимаем
                    self.switch_state = WeaponSwitchState::Down;
                }
            }
            WeaponSwitchState::PutUpNew => {
                self.switch_state = WeaponSwitchState::Up;
            }
            WeaponSwitchState::Up | WeaponSwitchState::Down => {}
        }

        progress
    }

    /// Позиция socket'а во время анимации переключения (None — стабильное состояние)
    pub fn switching_socket_position(&self, time_factor: f32, down: Vec3, default: Vec3) -> Option<Vec3> {
        match self.switch_state {
            WeaponSwitchState::PutDownPrevious => Some(default.lerp(down, time_factor)),
            WeaponSwitchState::PutUpNew => Some(down.lerp(default, time_factor)),
            WeaponSwitchState::Up | WeaponSwitchState::Down => None,
        }
    }
}

// ============================================================================
// Input / sockets
// ============================================================================

/// Per-frame input для оружия (заполняется host'ом)
#[derive(Component, Debug, Clone, Default)]
pub struct WeaponInput {
    /// >0 — следующее, <0 — предыдущее
    pub switch_axis: i32,
    /// Номер слота (0-based) с цифровых клавиш
    pub select_slot: Option<usize>,
    pub aiming: bool,
    pub crouching: bool,
    /// Персонаж на земле (bob только при движении по земле)
    pub grounded: bool,
    pub interact: bool,
}

/// Локальные позиции socket'а оружия
#[derive(Component, Debug, Clone, Copy)]
pub struct WeaponSockets {
    pub down: Vec3,
    pub standing_default: Vec3,
    pub crouching_default: Vec3,
    pub standing_aiming: Vec3,
    pub crouching_aiming: Vec3,
}

impl Default for WeaponSockets {
    fn default() -> Self {
        Self {
            down: Vec3::new(0.0, -0.5, 0.0),
            standing_default: Vec3::new(0.2, -0.2, 0.4),
            crouching_default: Vec3::new(0.2, -0.25, 0.35),
            standing_aiming: Vec3::new(0.0, -0.1, 0.3),
            crouching_aiming: Vec3::new(0.0, -0.15, 0.3),
        }
    }
}

impl WeaponSockets {
    pub fn default_for(&self, crouching: bool) -> Vec3 {
        if crouching {
            self.crouching_default
        } else {
            self.standing_default
        }
    }

    pub fn aiming_for(&self, crouching: bool) -> Vec3 {
        if crouching {
            self.crouching_aiming
        } else {
            self.standing_aiming
        }
    }
}
