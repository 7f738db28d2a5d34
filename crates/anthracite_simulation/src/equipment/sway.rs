//! Weapon bob + recoil поверх позиции socket'а
//!
//! Итоговая позиция: main + bob (y ∈ [-0.05, 0.05]) + recoil (y ∈ [-0.02, 0.02]).

use bevy::prelude::*;

use crate::config::WeaponsConfig;

const BOB_Y_LIMIT: f32 = 0.05;
const RECOIL_Y_LIMIT: f32 = 0.02;

#[derive(Component, Debug, Clone, Default)]
pub struct WeaponSway {
    /// Позиция socket'а без bob/recoil (aiming/default lerp или анимация переключения)
    pub main_position: Vec3,
    pub bob_offset: Vec3,
    pub recoil_offset: Vec3,
    pub accumulated_recoil: Vec3,
    pub bob_factor: f32,
    pub last_character_position: Option<Vec3>,
    /// Итог для host'а
    pub socket_position: Vec3,
}

impl WeaponSway {
    /// Отдача за выстрел: назад по -Z, длина ограничена `max_distance`
    pub fn add_recoil(&mut self, force: f32, max_distance: f32) {
        self.accumulated_recoil += Vec3::NEG_Z * force;
        self.accumulated_recoil = self.accumulated_recoil.clamp_length_max(max_distance);
    }

    pub fn move_main_towards(&mut self, target: Vec3, speed: f32, delta: f32) {
        let t = (speed * delta).clamp(0.0, 1.0);
        self.main_position = self.main_position.lerp(target, t);
    }

    pub fn update_bob(
        &mut self,
        character_position: Vec3,
        grounded: bool,
        aiming: bool,
        elapsed: f32,
        delta: f32,
        config: &WeaponsConfig,
    ) {
        if delta <= 0.0 {
            return;
        }

        let last = self.last_character_position.unwrap_or(character_position);
        let speed = (character_position - last).length() / delta;

        let movement_factor = if grounded && config.bob_reference_speed > 0.0 {
            (speed / config.bob_reference_speed).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let t = (config.bob_sharpness * delta).clamp(0.0, 1.0);
        self.bob_factor += (movement_factor - self.bob_factor) * t;

        let amount = if aiming {
            config.aiming_bob_amount
        } else {
            config.default_bob_amount
        };
        let phase = elapsed * config.bob_frequency;

        let horizontal = phase.sin() * amount * self.bob_factor;
        let vertical = ((phase * 2.0).sin() * 0.5 + 0.5) * amount * self.bob_factor;

        self.bob_offset.x = horizontal;
        self.bob_offset.y = vertical.abs();
        self.last_character_position = Some(character_position);
    }

    /// Recoil догоняет accumulated, затем возвращается к нулю
    pub fn update_recoil(&mut self, delta: f32, config: &WeaponsConfig) {
        if self.recoil_offset.z >= self.accumulated_recoil.z * 0.99 {
            let t = (config.recoil_sharpness * delta).clamp(0.0, 1.0);
            self.recoil_offset = self.recoil_offset.lerp(self.accumulated_recoil, t);
        } else {
            let t = (config.recoil_restitution_sharpness * delta).clamp(0.0, 1.0);
            self.recoil_offset = self.recoil_offset.lerp(Vec3::ZERO, t);
            self.accumulated_recoil = self.recoil_offset;
        }
    }

    pub fn compose(&mut self) -> Vec3 {
        let mut bob = self.bob_offset;
        bob.y = bob.y.clamp(-BOB_Y_LIMIT, BOB_Y_LIMIT);

        let mut recoil = self.recoil_offset;
        recoil.y = recoil.y.clamp(-RECOIL_Y_LIMIT, RECOIL_Y_LIMIT);

        self.socket_position = self.main_position + bob + recoil;
        self.socket_position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoil_accumulates_and_clamps() {
        let mut sway = WeaponSway::default();

        sway.add_recoil(0.3, 0.5);
        assert_eq!(sway.accumulated_recoil, Vec3::new(0.0, 0.0, -0.3));

        sway.add_recoil(0.3, 0.5);
        assert!((sway.accumulated_recoil.length() - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_recoil_kicks_then_restitutes() {
        let config = WeaponsConfig::default();
        let mut sway = WeaponSway::default();
        sway.add_recoil(0.2, config.max_recoil_distance);

        // Фаза kick: 50 * 1/60 < 1 → частично догоняем
        sway.update_recoil(1.0 / 60.0, &config);
        assert!(sway.recoil_offset.z < 0.0);

        for _ in 0..600 {
            sway.update_recoil(1.0 / 60.0, &config);
        }
        assert!(sway.recoil_offset.length() < 1e-3);
        assert!(sway.accumulated_recoil.length() < 1e-3);
    }

    #[test]
    fn test_bob_needs_ground_movement() {
        let config = WeaponsConfig::default();
        let mut sway = WeaponSway::default();
        let dt = 1.0 / 60.0;

        // Стоим на месте
        for i in 0..10 {
            sway.update_bob(Vec3::ZERO, true, false, i as f32 * dt, dt, &config);
        }
        assert_eq!(sway.bob_factor, 0.0);

        // Бежим в воздухе — bob не растёт
        for i in 0..10 {
            let position = Vec3::new(i as f32 * 0.3, 0.0, 0.0);
            sway.update_bob(position, false, false, i as f32 * dt, dt, &config);
        }
        assert_eq!(sway.bob_factor, 0.0);

        // Бежим по земле
        let mut sway = WeaponSway::default();
        for i in 0..30 {
            let position = Vec3::new(i as f32 * 0.3, 0.0, 0.0);
            sway.update_bob(position, true, false, i as f32 * dt, dt, &config);
        }
        assert!(sway.bob_factor > 0.5);
        assert!(sway.bob_offset.y >= 0.0);
    }

    #[test]
    fn test_compose_clamps_vertical_offsets() {
        let mut sway = WeaponSway {
            main_position: Vec3::new(0.1, 0.2, 0.3),
            bob_offset: Vec3::new(0.01, 0.5, 0.0),
            recoil_offset: Vec3::new(0.0, -0.5, -0.1),
            ..default()
        };

        let position = sway.compose();
        assert!((position - Vec3::new(0.11, 0.2 + 0.05 - 0.02, 0.2)).length() < 1e-5);
        assert_eq!(sway.socket_position, position);
    }
}
