//! Броня: снижение урона + собственная durability
//!
//! Attack flow: raw damage → ArmorPiece::absorb → residual → Hitbox.
//! Durability снимается на raw урон, независимо от того, сколько прошло дальше.
//! Floor clamp нет: durability может уйти в минус.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::body::BodyPartKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect, Serialize, Deserialize)]
pub enum ArmorKind {
    Helmet,
    Vest,
}

impl ArmorKind {
    pub fn damage_reduction(self) -> f32 {
        match self {
            ArmorKind::Helmet => 0.5,
            ArmorKind::Vest => 0.7,
        }
    }

    pub fn max_durability(self) -> f32 {
        match self {
            ArmorKind::Helmet => 100.0,
            ArmorKind::Vest => 100.0,
        }
    }

    /// Какие регионы защищает
    pub fn covers(self, part: BodyPartKind) -> bool {
        match self {
            ArmorKind::Helmet => part == BodyPartKind::Head,
            ArmorKind::Vest => matches!(part, BodyPartKind::Chest | BodyPartKind::Stomach),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct ArmorPiece {
    pub kind: ArmorKind,
    pub damage_reduction: f32,
    pub durability: f32,
    pub max_durability: f32,
}

impl ArmorPiece {
    pub fn new(kind: ArmorKind) -> Self {
        Self {
            kind,
            damage_reduction: kind.damage_reduction(),
            durability: kind.max_durability(),
            max_durability: kind.max_durability(),
        }
    }

    pub fn helmet() -> Self {
        Self::new(ArmorKind::Helmet)
    }

    pub fn vest() -> Self {
        Self::new(ArmorKind::Vest)
    }

    pub fn take_damage(&mut self, damage: f32) {
        self.durability -= damage;
    }

    /// Перехватывает удар: возвращает residual для носителя
    pub fn absorb(&mut self, raw_damage: f32) -> f32 {
        self.take_damage(raw_damage);
        raw_damage * (1.0 - self.damage_reduction)
    }
}

/// Надетая броня
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct WornArmor {
    pub helmet: Option<ArmorPiece>,
    pub vest: Option<ArmorPiece>,
}

impl WornArmor {
    pub fn full() -> Self {
        Self {
            helmet: Some(ArmorPiece::helmet()),
            vest: Some(ArmorPiece::vest()),
        }
    }

    /// Броня, закрывающая регион (если есть)
    pub fn covering_mut(&mut self, part: BodyPartKind) -> Option<&mut ArmorPiece> {
        [self.helmet.as_mut(), self.vest.as_mut()]
            .into_iter()
            .flatten()
            .find(|piece| piece.kind.covers(part))
    }

    /// Residual после брони (raw, если регион не закрыт)
    pub fn intercept(&mut self, part: BodyPartKind, raw_damage: f32) -> f32 {
        match self.covering_mut(part) {
            Some(piece) => piece.absorb(raw_damage),
            None => raw_damage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vest_two_independent_depletions() {
        let mut vest = ArmorPiece::vest();
        let residual = vest.absorb(50.0);

        assert!((residual - 15.0).abs() < 1e-4, "residual = {}", residual);
        assert_eq!(vest.durability, 50.0);
    }

    #[test]
    fn test_durability_goes_negative() {
        let mut helmet = ArmorPiece::helmet();
        helmet.absorb(80.0);
        helmet.absorb(80.0);

        assert_eq!(helmet.durability, -60.0);
        // Снижение урона не зависит от durability
        assert_eq!(helmet.absorb(10.0), 5.0);
    }

    #[test]
    fn test_worn_armor_coverage() {
        let mut armor = WornArmor::full();

        assert_eq!(armor.intercept(BodyPartKind::Head, 40.0), 20.0);
        assert!((armor.intercept(BodyPartKind::Stomach, 10.0) - 3.0).abs() < 1e-4);
        assert_eq!(armor.intercept(BodyPartKind::LeftLeg, 10.0), 10.0);

        assert_eq!(armor.helmet.unwrap().durability, 60.0);
        assert_eq!(armor.vest.unwrap().durability, 90.0);
    }
}
