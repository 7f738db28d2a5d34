//! CombatConfig — tuning всей боевой симуляции
//!
//! Значения по умолчанию совпадают с настройками prefab'ов игры.
//! Можно переопределить TOML файлом (любая секция/поле опциональны):
//!
//! ```toml
//! [weapons]
//! switch_delay = 0.5
//!
//! [hitbox]
//! head_max_health = 40.0
//! ```

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::components::BodyPartKind;

/// Ошибки загрузки конфига
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CombatConfig {
    pub simulation: SimulationConfig,
    pub weapons: WeaponsConfig,
    pub projectile: ProjectileConfig,
    pub hitbox: HitboxConfig,
    pub health: HealthConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Частота FixedUpdate
    pub tick_hz: f64,
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_hz: 60.0,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponsConfig {
    /// Длительность каждой фазы переключения (put down / put up), секунды
    pub switch_delay: f32,
    /// Радиус поиска подбираемого оружия
    pub pickup_radius: f32,
    pub bob_frequency: f32,
    pub bob_sharpness: f32,
    pub default_bob_amount: f32,
    pub aiming_bob_amount: f32,
    pub recoil_sharpness: f32,
    pub max_recoil_distance: f32,
    pub recoil_restitution_sharpness: f32,
    /// Скорость lerp socket'а к aiming/default позиции
    pub aiming_animation_speed: f32,
    /// Скорость персонажа, при которой bob максимальный
    pub bob_reference_speed: f32,
}

impl Default for WeaponsConfig {
    fn default() -> Self {
        Self {
            switch_delay: 1.0,
            pickup_radius: 4.0,
            bob_frequency: 10.0,
            bob_sharpness: 10.0,
            default_bob_amount: 0.05,
            aiming_bob_amount: 0.02,
            recoil_sharpness: 50.0,
            max_recoil_distance: 0.5,
            recoil_restitution_sharpness: 10.0,
            aiming_animation_speed: 10.0,
            bob_reference_speed: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    pub radius: f32,
    pub speed: f32,
    pub max_lifetime: f32,
    pub gravity_down_acceleration: f32,
    /// < 0 — коррекция выключена, 0 — мгновенная
    pub trajectory_correction_distance: f32,
    pub inherit_weapon_velocity: bool,
    pub damage: f32,
    pub broken_part_probability: f32,
    /// Расстояние root → tip
    pub tip_length: f32,
    pub impact_vfx_lifetime: f32,
    pub impact_vfx_spawn_offset: f32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            radius: 0.01,
            speed: 20.0,
            max_lifetime: 5.0,
            gravity_down_acceleration: 0.0,
            trajectory_correction_distance: -1.0,
            inherit_weapon_velocity: false,
            damage: 40.0,
            broken_part_probability: 0.1,
            tip_length: 0.1,
            impact_vfx_lifetime: 5.0,
            impact_vfx_spawn_offset: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HitboxConfig {
    pub head_max_health: f32,
    pub chest_max_health: f32,
    pub stomach_max_health: f32,
    pub arm_max_health: f32,
    pub leg_max_health: f32,

    pub head_damage_multiplier: f32,
    pub chest_damage_multiplier: f32,
    pub stomach_damage_multiplier: f32,
    pub arm_damage_multiplier: f32,
    pub leg_damage_multiplier: f32,
}

impl Default for HitboxConfig {
    fn default() -> Self {
        Self {
            head_max_health: 35.0,
            chest_max_health: 85.0,
            stomach_max_health: 70.0,
            arm_max_health: 60.0,
            leg_max_health: 65.0,

            head_damage_multiplier: 2.0,
            chest_damage_multiplier: 1.0,
            stomach_damage_multiplier: 1.0,
            arm_damage_multiplier: 0.75,
            leg_damage_multiplier: 0.75,
        }
    }
}

impl HitboxConfig {
    pub fn max_health(&self, kind: BodyPartKind) -> f32 {
        match kind {
            BodyPartKind::Head => self.head_max_health,
            BodyPartKind::Chest => self.chest_max_health,
            BodyPartKind::Stomach => self.stomach_max_health,
            BodyPartKind::LeftArm | BodyPartKind::RightArm => self.arm_max_health,
            BodyPartKind::LeftLeg | BodyPartKind::RightLeg => self.leg_max_health,
        }
    }

    pub fn damage_multiplier(&self, kind: BodyPartKind) -> f32 {
        match kind {
            BodyPartKind::Head => self.head_damage_multiplier,
            BodyPartKind::Chest => self.chest_damage_multiplier,
            BodyPartKind::Stomach => self.stomach_damage_multiplier,
            BodyPartKind::LeftArm | BodyPartKind::RightArm => self.arm_damage_multiplier,
            BodyPartKind::LeftLeg | BodyPartKind::RightLeg => self.leg_damage_multiplier,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    pub max_health: f32,
    /// Ratio, ниже (включительно) которого health считается критическим
    pub critical_ratio: f32,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            max_health: 10.0,
            critical_ratio: 0.3,
        }
    }
}

impl CombatConfig {
    /// Load config from a TOML file
    pub fn load_from_toml(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse config from TOML string
    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        let config: CombatConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.simulation.tick_hz <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "simulation.tick_hz must be positive, got {}",
                self.simulation.tick_hz
            )));
        }

        if self.weapons.switch_delay < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "weapons.switch_delay must not be negative, got {}",
                self.weapons.switch_delay
            )));
        }

        for kind in BodyPartKind::ALL {
            let max = self.hitbox.max_health(kind);
            if max <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "hitbox max health for {:?} must be positive, got {}",
                    kind, max
                )));
            }
        }

        if self.health.max_health <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "health.max_health must be positive, got {}",
                self.health.max_health
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = CombatConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.weapons.switch_delay, 1.0);
        assert_eq!(config.hitbox.max_health(BodyPartKind::LeftLeg), 65.0);
        assert_eq!(config.hitbox.damage_multiplier(BodyPartKind::Head), 2.0);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = CombatConfig::parse_toml(
            r#"
            [weapons]
            switch_delay = 0.25

            [hitbox]
            head_max_health = 40.0
            "#,
        )
        .expect("valid toml");

        assert_eq!(config.weapons.switch_delay, 0.25);
        assert_eq!(config.weapons.pickup_radius, 4.0);
        assert_eq!(config.hitbox.head_max_health, 40.0);
        assert_eq!(config.hitbox.chest_max_health, 85.0);
        assert_eq!(config.projectile.damage, 40.0);
    }

    #[test]
    fn test_negative_switch_delay_rejected() {
        let result = CombatConfig::parse_toml("[weapons]\nswitch_delay = -1.0\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let result = CombatConfig::parse_toml("[weapons\nswitch_delay = ");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
