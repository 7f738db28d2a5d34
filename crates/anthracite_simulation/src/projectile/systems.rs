//! Projectile systems
//!
//! # Lifecycle
//!
//! `FireProjectileIntent` → `launch_projectiles` (Launch) → `advance_projectiles` (Flight)
//! → попадание (DamageRequest + ImpactEffect) или истечение `max_lifetime`.
//!
//! Hit detection: sphere sweep от tip прошлого тика до текущего tip, чтобы
//! быстрый снаряд не проскакивал тонкие collider'ы.

use std::collections::HashSet;

use bevy::prelude::*;

use crate::combat::{DamageRequest, DespawnAfter};
use crate::components::{AimCamera, Damageable, IgnoreHitDetection, Surface};
use crate::config::CombatConfig;
use crate::logger::{log, log_warning};
use crate::physics::{PhysicsQuery, PhysicsWorld, SweepHit};
use crate::projectile::components::*;
use crate::projectile::events::*;

/// Ниже этой скорости (в квадрате) не переориентируем снаряд
const MIN_ORIENT_SPEED_SQUARED: f32 = 0.1;

/// Lookup surface'ов для validity filter и damage resolution
pub type SurfaceQuery<'w, 's> = Query<
    'w,
    's,
    (
        Option<&'static Surface>,
        Option<&'static Damageable>,
        Has<IgnoreHitDetection>,
    ),
>;

/// Позиции collider'ов для falloff (снаряды исключены: их Transform пишет Flight)
pub type PositionQuery<'w, 's> = Query<'w, 's, &'static Transform, Without<Projectile>>;

/// Точка попадания
#[derive(Debug, Clone, Copy)]
struct Impact {
    projectile: Entity,
    surface: Entity,
    point: Vec3,
    normal: Vec3,
    /// Root снаряда (центр area damage)
    root: Vec3,
}

/// Может ли снаряд зарегистрировать попадание в surface
///
/// Отбрасываем: ignored snapshot, `IgnoreHitDetection`, trigger без Damageable.
/// Entity без `Surface` (collider host'а) считается solid.
pub fn is_hit_valid(surface: Entity, surfaces: &SurfaceQuery, ignored: &HashSet<Entity>) -> bool {
    if ignored.contains(&surface) {
        return false;
    }

    let Ok((info, damageable, ignore_hits)) = surfaces.get(surface) else {
        return true;
    };

    if ignore_hits {
        return false;
    }

    !(info.is_some_and(|info| info.is_trigger) && damageable.is_none())
}

/// Ближайшее валидное попадание
pub fn select_impact(hits: &[SweepHit], mut is_valid: impl FnMut(Entity) -> bool) -> Option<SweepHit> {
    hits.iter()
        .filter(|hit| is_valid(hit.surface))
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
        .copied()
}

/// Урон: area (все damageable владельцы в радиусе, по одному разу) или прямой
fn apply_impact_damage(
    impact: &Impact,
    projectile: &Projectile,
    surfaces: &SurfaceQuery,
    positions: &PositionQuery,
    physics: &dyn PhysicsQuery,
    damage_requests: &mut EventWriter<DamageRequest>,
) {
    let params = &projectile.params;
    let causer = Some(projectile.owner);

    let Some(area) = params.area else {
        let Ok((surface, Some(damageable), _)) = surfaces.get(impact.surface) else {
            return;
        };

        let body_part = damageable
            .body_part
            .or_else(|| surface.and_then(Surface::body_part));

        damage_requests.write(DamageRequest {
            target: damageable.target,
            source: causer,
            amount: damageable.compute_damage(params.damage, false, causer),
            body_part,
            is_explosion: false,
            break_probability: params.broken_part_probability,
        });
        return;
    };

    let mut damaged: Vec<Entity> = Vec::new();

    for surface in physics.overlap_sphere(impact.root, area.radius, params.effective_mask()) {
        let Ok((_, Some(damageable), _)) = surfaces.get(surface) else {
            continue;
        };

        if damaged.contains(&damageable.target) {
            continue;
        }
        damaged.push(damageable.target);

        let distance = positions
            .get(surface)
            .map(|transform| transform.translation.distance(impact.root))
            .unwrap_or(0.0);

        damage_requests.write(DamageRequest {
            target: damageable.target,
            source: causer,
            amount: damageable.compute_damage(area.damage_at(params.damage, distance), true, causer),
            body_part: damageable.body_part,
            is_explosion: true,
            break_probability: 0.0,
        });
    }
}

/// Эффект попадания: entity у точки, повёрнутая по нормали, с auto-expiry
fn spawn_impact_effect(commands: &mut Commands, impact: &Impact, projectile: &Projectile, now: f32) {
    let params = &projectile.params;
    let position = impact.point + impact.normal * params.impact_vfx_spawn_offset;

    let mut effect = commands.spawn((
        ImpactEffect {
            owner: projectile.owner,
            normal: impact.normal,
        },
        Transform::from_translation(position).looking_to(impact.normal, Vec3::Y),
    ));

    if params.impact_vfx_lifetime > 0.0 {
        effect.insert(DespawnAfter {
            despawn_time: now + params.impact_vfx_lifetime,
        });
    }
}

#[allow(clippy::too_many_arguments)]
fn resolve_impact(
    commands: &mut Commands,
    impact: &Impact,
    projectile: &mut Projectile,
    surfaces: &SurfaceQuery,
    positions: &PositionQuery,
    physics: &dyn PhysicsQuery,
    now: f32,
    damage_requests: &mut EventWriter<DamageRequest>,
    impacts: &mut EventWriter<ImpactSpawned>,
) {
    projectile.hit_body_part = surfaces
        .get(impact.surface)
        .ok()
        .and_then(|(surface, _, _)| surface)
        .and_then(Surface::body_part);

    apply_impact_damage(impact, projectile, surfaces, positions, physics, damage_requests);
    spawn_impact_effect(commands, impact, projectile, now);

    log(&format!(
        "Projectile {:?} (owner {:?}) hit {:?} at {:?}",
        impact.projectile, projectile.owner, impact.surface, impact.point
    ));

    impacts.write(ImpactSpawned {
        projectile: impact.projectile,
        owner: projectile.owner,
        surface: impact.surface,
        point: impact.point,
        normal: impact.normal,
        body_part: projectile.hit_body_part,
    });
}

/// Система: FireProjectileIntent → Projectile entity
///
/// - ignored set: все surfaces стрелка
/// - стрелок с `AimCamera`: trajectory correction + проверка, не упёрся ли ствол в стену
///   (луч камера → дуло; валидное попадание резолвится сразу)
#[allow(clippy::too_many_arguments)]
pub fn launch_projectiles(
    mut commands: Commands,
    mut intents: EventReader<FireProjectileIntent>,
    owned_surfaces: Query<(Entity, &Surface)>,
    cameras: Query<&AimCamera>,
    surfaces: SurfaceQuery,
    positions: PositionQuery,
    physics: Res<PhysicsWorld>,
    config: Res<CombatConfig>,
    time: Res<Time<Fixed>>,
    mut damage_requests: EventWriter<DamageRequest>,
    mut impacts: EventWriter<ImpactSpawned>,
) {
    let delta = time.delta_secs();
    let now = time.elapsed_secs();

    for intent in intents.read() {
        let Some(direction) = intent.direction.try_normalize() else {
            log_warning(&format!(
                "FireProjectileIntent: shooter {:?} has zero direction",
                intent.shooter
            ));
            continue;
        };

        let params = intent
            .params
            .clone()
            .unwrap_or_else(|| ProjectileParams::from_config(&config.projectile));

        let mut root = intent.muzzle + intent.muzzle_velocity * delta;
        let mut velocity = direction * params.speed;
        if params.inherit_weapon_velocity {
            velocity += intent.muzzle_velocity;
        }

        let ignored: HashSet<Entity> = owned_surfaces
            .iter()
            .filter(|(_, surface)| surface.owner == intent.shooter)
            .map(|(entity, _)| entity)
            .collect();

        let mut correction = None;
        let mut obstruction = None;

        if let Ok(camera) = cameras.get(intent.shooter) {
            let camera_to_muzzle = intent.muzzle - camera.position;
            let vector = (-camera_to_muzzle).reject_from_normalized(camera.forward.normalize_or_zero());

            if params.trajectory_correction_distance == 0.0 {
                root += vector;
            } else if params.trajectory_correction_distance > 0.0 {
                correction = Some(TrajectoryCorrection::new(vector));
            }

            let hits = physics.query().raycast(
                camera.position,
                camera_to_muzzle,
                camera_to_muzzle.length(),
                params.effective_mask(),
            );
            obstruction = select_impact(&hits, |surface| is_hit_valid(surface, &surfaces, &ignored));
        }

        let mut projectile = Projectile {
            owner: intent.shooter,
            velocity,
            direction,
            params,
            age: 0.0,
            previous_tip: root,
            ignored,
            correction,
            hit_body_part: None,
        };

        let entity = commands
            .spawn(Transform::from_translation(root).looking_to(direction, Vec3::Y))
            .id();

        if let Some(hit) = obstruction {
            let impact = Impact {
                projectile: entity,
                surface: hit.surface,
                point: hit.point,
                normal: hit.normal,
                root,
            };
            resolve_impact(
                &mut commands,
                &impact,
                &mut projectile,
                &surfaces,
                &positions,
                physics.query(),
                now,
                &mut damage_requests,
                &mut impacts,
            );
            commands.entity(entity).despawn();
            continue;
        }

        commands.entity(entity).insert(projectile);
    }
}

/// Система: полёт снаряда
///
/// age → expiry → движение + ориентация → гравитация → trajectory correction → sweep → impact.
#[allow(clippy::too_many_arguments)]
pub fn advance_projectiles(
    mut commands: Commands,
    mut projectiles: Query<(Entity, &mut Projectile, &mut Transform)>,
    surfaces: SurfaceQuery,
    positions: PositionQuery,
    physics: Res<PhysicsWorld>,
    time: Res<Time<Fixed>>,
    mut damage_requests: EventWriter<DamageRequest>,
    mut impacts: EventWriter<ImpactSpawned>,
    mut expired_events: EventWriter<ProjectileExpired>,
) {
    let delta = time.delta_secs();
    let now = time.elapsed_secs();

    for (entity, mut projectile, mut transform) in projectiles.iter_mut() {
        projectile.age += delta;

        if projectile.is_expired() {
            expired_events.write(ProjectileExpired {
                projectile: entity,
                owner: projectile.owner,
            });
            commands.entity(entity).despawn();
            continue;
        }

        let last_root = transform.translation;
        transform.translation += projectile.velocity * delta;

        // Ориентация по скорости этого тика, гравитация действует со следующего
        if projectile.velocity.length_squared() > MIN_ORIENT_SPEED_SQUARED {
            let direction = projectile.velocity.normalize();
            projectile.direction = direction;
            transform.look_to(direction, Vec3::Y);
        }

        let gravity = projectile.params.gravity_down_acceleration;
        if gravity > 0.0 {
            projectile.velocity += Vec3::NEG_Y * gravity * delta;
        }

        let travelled = transform.translation.distance(last_root);
        let correction_distance = projectile.params.trajectory_correction_distance;
        let mut correction_done = false;
        if let Some(correction) = projectile.correction.as_mut() {
            transform.translation += correction.consume(travelled, correction_distance);
            correction_done = correction.is_done();
        }
        if correction_done {
            projectile.correction = None;
        }

        let tip = projectile.tip(transform.translation);
        let displacement = tip - projectile.previous_tip;
        let hits = physics.query().sweep_sphere(
            projectile.previous_tip,
            projectile.params.radius,
            displacement,
            displacement.length(),
            projectile.params.effective_mask(),
        );
        projectile.previous_tip = tip;

        let Some(hit) = select_impact(&hits, |surface| {
            is_hit_valid(surface, &surfaces, &projectile.ignored)
        }) else {
            continue;
        };

        // Начали sweep уже внутри collider'а
        let (point, normal) = if hit.distance <= 0.0 {
            (tip, -projectile.direction)
        } else {
            (hit.point, hit.normal)
        };

        let impact = Impact {
            projectile: entity,
            surface: hit.surface,
            point,
            normal,
            root: transform.translation,
        };
        resolve_impact(
            &mut commands,
            &impact,
            &mut projectile,
            &surfaces,
            &positions,
            physics.query(),
            now,
            &mut damage_requests,
            &mut impacts,
        );
        commands.entity(entity).despawn();
    }
}
