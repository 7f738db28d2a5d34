//! Spawn helpers для damageable entities

use bevy::prelude::*;

use crate::components::*;
use crate::config::CombatConfig;

/// Сферы частей тела относительно позиции персонажа: (регион, offset, радиус)
pub const HUMANOID_LAYOUT: [(BodyPartKind, Vec3, f32); 7] = [
    (BodyPartKind::Head, Vec3::new(0.0, 1.7, 0.0), 0.12),
    (BodyPartKind::Chest, Vec3::new(0.0, 1.35, 0.0), 0.2),
    (BodyPartKind::Stomach, Vec3::new(0.0, 1.05, 0.0), 0.18),
    (BodyPartKind::LeftArm, Vec3::new(-0.35, 1.3, 0.0), 0.1),
    (BodyPartKind::RightArm, Vec3::new(0.35, 1.3, 0.0), 0.1),
    (BodyPartKind::LeftLeg, Vec3::new(-0.12, 0.5, 0.0), 0.14),
    (BodyPartKind::RightLeg, Vec3::new(0.12, 0.5, 0.0), 0.14),
];

/// Персонаж: Hitbox (7 регионов) + Ragdoll + surfaces частей тела
pub fn spawn_combatant(commands: &mut Commands, config: &CombatConfig, position: Vec3) -> Entity {
    let owner = commands
        .spawn((
            Transform::from_translation(position),
            Hitbox::from_config(&config.hitbox),
            Ragdoll::default(),
        ))
        .id();

    spawn_body_surfaces(commands, owner, config, position);

    owner
}

/// Surface entity на каждый регион: collider с именем региона + Damageable
/// с региональным множителем урона
pub fn spawn_body_surfaces(
    commands: &mut Commands,
    owner: Entity,
    config: &CombatConfig,
    position: Vec3,
) -> Vec<Entity> {
    HUMANOID_LAYOUT
        .iter()
        .map(|&(kind, offset, radius)| {
            commands
                .spawn((
                    Transform::from_translation(position + offset),
                    Surface::solid(owner, kind.surface_name(), LAYER_ACTORS),
                    SphereCollider { radius },
                    Damageable::body_part(owner, kind, config.hitbox.damage_multiplier(kind)),
                ))
                .id()
        })
        .collect()
}

/// Несегментированный damageable (ящик, турель): Health + один collider
pub fn spawn_damageable_prop(
    commands: &mut Commands,
    config: &CombatConfig,
    position: Vec3,
    radius: f32,
) -> Entity {
    let prop = commands
        .spawn((
            Transform::from_translation(position),
            Health::from_config(&config.health),
            SphereCollider { radius },
        ))
        .id();

    commands.entity(prop).insert((
        Surface::solid(prop, "prop", LAYER_ENVIRONMENT),
        Damageable::new(prop),
    ));

    prop
}

/// Статичное препятствие без damageable capability
pub fn spawn_obstacle(commands: &mut Commands, position: Vec3, radius: f32) -> Entity {
    let obstacle = commands
        .spawn((Transform::from_translation(position), SphereCollider { radius }))
        .id();

    commands
        .entity(obstacle)
        .insert(Surface::solid(obstacle, "wall", LAYER_ENVIRONMENT));

    obstacle
}
