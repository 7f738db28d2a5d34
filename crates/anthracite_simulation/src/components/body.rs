//! Body-part ledger: сегментированное здоровье персонажа
//!
//! Hitbox держит по одному BodyPart на регион (создаются при spawn, живут
//! вместе с entity). Урон/лечение/кровотечения адресуются регионом.
//!
//! Известные особенности (сохранены намеренно):
//! - heal не снимает `is_destroyed` (destroyed + full health достижимо)
//! - bleeding наносит `damage * dt` каждый тик, `rate` не участвует

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::HitboxConfig;
use crate::logger::log_warning;

/// Регион тела
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Reflect, Serialize, Deserialize,
)]
pub enum BodyPartKind {
    Head,
    Chest,
    Stomach,
    LeftArm,
    RightArm,
    LeftLeg,
    RightLeg,
}

impl BodyPartKind {
    pub const ALL: [BodyPartKind; 7] = [
        BodyPartKind::Head,
        BodyPartKind::Chest,
        BodyPartKind::Stomach,
        BodyPartKind::LeftArm,
        BodyPartKind::RightArm,
        BodyPartKind::LeftLeg,
        BodyPartKind::RightLeg,
    ];

    /// Имя collider'а в скелете (`"leftarm"` и т.п.)
    pub fn surface_name(self) -> &'static str {
        match self {
            BodyPartKind::Head => "head",
            BodyPartKind::Chest => "chest",
            BodyPartKind::Stomach => "stomach",
            BodyPartKind::LeftArm => "leftarm",
            BodyPartKind::RightArm => "rightarm",
            BodyPartKind::LeftLeg => "leftleg",
            BodyPartKind::RightLeg => "rightleg",
        }
    }

    /// Case-insensitive разбор имени collider'а
    pub fn from_surface_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.surface_name().eq_ignore_ascii_case(name))
    }

    /// Конечности можно сломать, торс и голову — нет
    pub fn can_be_broken(self) -> bool {
        matches!(
            self,
            BodyPartKind::LeftArm
                | BodyPartKind::RightArm
                | BodyPartKind::LeftLeg
                | BodyPartKind::RightLeg
        )
    }
}

/// Тип кровотечения (данные — константная таблица, не иерархия)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect, Serialize, Deserialize)]
pub enum BleedingKind {
    Light,
    Heavy,
}

impl BleedingKind {
    pub fn rate(self) -> f32 {
        match self {
            BleedingKind::Light => 0.5,
            BleedingKind::Heavy => 1.0,
        }
    }

    /// Урон в секунду
    pub fn damage(self) -> f32 {
        match self {
            BleedingKind::Light => 1.0,
            BleedingKind::Heavy => 2.0,
        }
    }
}

/// Одна часть тела
#[derive(Debug, Clone, PartialEq)]
pub struct BodyPart {
    pub kind: BodyPartKind,
    pub max_health: f32,
    pub current_health: f32,
    pub is_destroyed: bool,
    can_be_broken: bool,
    is_broken: bool,
    pub bleedings: Vec<BleedingKind>,
}

/// Результат изменения здоровья части тела
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PartDamage {
    pub dealt: f32,
    /// true только в вызове, который уничтожил часть
    pub destroyed_now: bool,
}

impl BodyPart {
    pub fn new(kind: BodyPartKind, max_health: f32, can_be_broken: bool) -> Self {
        Self {
            kind,
            max_health,
            current_health: max_health,
            is_destroyed: false,
            can_be_broken,
            is_broken: false,
            bleedings: Vec::new(),
        }
    }

    pub fn can_be_broken(&self) -> bool {
        self.can_be_broken
    }

    pub fn is_broken(&self) -> bool {
        self.is_broken
    }

    /// Ломается только то, что может сломаться
    pub fn set_broken(&mut self, broken: bool) {
        self.is_broken = broken && self.can_be_broken;
    }

    pub fn take_damage(&mut self, damage: f32) -> PartDamage {
        let before = self.current_health;
        self.current_health -= damage;
        self.current_health = self.current_health.min(self.max_health);

        PartDamage {
            dealt: (before - self.current_health.max(0.0)).max(0.0),
            destroyed_now: self.settle_destroyed(),
        }
    }

    pub fn heal(&mut self, amount: f32) -> f32 {
        let before = self.current_health;
        // Отрицательный heal игнорируем
        self.current_health = (self.current_health + amount.max(0.0)).min(self.max_health);
        (self.current_health - before).max(0.0)
    }

    /// Clamp в 0 и latch destroyed
    fn settle_destroyed(&mut self) -> bool {
        if self.current_health > 0.0 {
            return false;
        }

        self.current_health = 0.0;
        let destroyed_now = !self.is_destroyed;
        self.is_destroyed = true;
        destroyed_now
    }

    fn tick_bleedings(&mut self, delta: f32) -> bool {
        let mut destroyed_now = false;
        for bleeding in &self.bleedings {
            self.current_health -= bleeding.damage() * delta;
            if self.current_health <= 0.0 {
                self.current_health = 0.0;
                destroyed_now |= !self.is_destroyed;
                self.is_destroyed = true;
            }
        }
        destroyed_now
    }
}

/// Ledger всех частей тела одного entity
#[derive(Component, Debug, Clone, Default)]
pub struct Hitbox {
    parts: BTreeMap<BodyPartKind, BodyPart>,
}

impl Hitbox {
    /// Пустой ledger (части добавляются через insert_part)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Полный набор из 7 регионов с max health из конфига
    pub fn from_config(config: &HitboxConfig) -> Self {
        let mut hitbox = Self::empty();
        for kind in BodyPartKind::ALL {
            hitbox.insert_part(BodyPart::new(
                kind,
                config.max_health(kind),
                kind.can_be_broken(),
            ));
        }
        hitbox
    }

    pub fn insert_part(&mut self, part: BodyPart) {
        self.parts.insert(part.kind, part);
    }

    pub fn part(&self, kind: BodyPartKind) -> Option<&BodyPart> {
        self.parts.get(&kind)
    }

    pub fn part_mut(&mut self, kind: BodyPartKind) -> Option<&mut BodyPart> {
        self.parts.get_mut(&kind)
    }

    pub fn parts(&self) -> impl Iterator<Item = &BodyPart> {
        self.parts.values()
    }

    /// None — регион не зарегистрирован (warning, не ошибка)
    pub fn take_damage(&mut self, kind: BodyPartKind, damage: f32) -> Option<PartDamage> {
        let Some(part) = self.parts.get_mut(&kind) else {
            log_warning(&format!("Unknown body part for damage: {:?}", kind));
            return None;
        };

        Some(part.take_damage(damage))
    }

    pub fn heal(&mut self, kind: BodyPartKind, amount: f32) -> Option<f32> {
        let Some(part) = self.parts.get_mut(&kind) else {
            log_warning(&format!("Unknown body part for healing: {:?}", kind));
            return None;
        };

        Some(part.heal(amount))
    }

    pub fn apply_bleeding(&mut self, kind: BodyPartKind, bleeding: BleedingKind) -> bool {
        let Some(part) = self.parts.get_mut(&kind) else {
            log_warning(&format!("Unknown body part for bleeding: {:?}", kind));
            return false;
        };

        part.bleedings.push(bleeding);
        true
    }

    /// Тик всех кровотечений. Возвращает части, уничтоженные в этом тике.
    pub fn update_bleeding(&mut self, delta: f32) -> Vec<BodyPartKind> {
        self.parts
            .values_mut()
            .filter_map(|part| part.tick_bleedings(delta).then_some(part.kind))
            .collect()
    }

    /// Суммарное здоровье (для UI / game over)
    pub fn current_hp(&self) -> f32 {
        self.parts.values().map(|p| p.current_health).sum()
    }

    pub fn max_hp(&self) -> f32 {
        self.parts.values().map(|p| p.max_health).sum()
    }

    pub fn is_destroyed(&self, kind: BodyPartKind) -> bool {
        self.parts.get(&kind).is_some_and(|p| p.is_destroyed)
    }

    /// Уничтожение любой из них — смерть
    pub const VITAL_PARTS: [BodyPartKind; 2] = [BodyPartKind::Head, BodyPartKind::Chest];

    pub fn is_vital_destroyed(&self) -> bool {
        Self::VITAL_PARTS.iter().any(|&kind| self.is_destroyed(kind))
    }
}
