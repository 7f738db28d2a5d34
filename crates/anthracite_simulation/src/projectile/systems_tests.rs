//! Tests for projectile flight and hit resolution.

use bevy::prelude::*;

use crate::combat::{CombatPlugin, DamageDealt};
use crate::components::*;
use crate::config::{CombatConfig, HitboxConfig};
use crate::physics::{refresh_physics_world, PhysicsWorld, SweepHit};
use crate::projectile::*;
use crate::{
    advance_fixed_tick, configure_simulation_sets, record_events, DeterministicRng, RecordedEvents,
    SimulationSet,
};

fn projectile_app() -> App {
    let mut app = App::new();
    app.insert_resource(DeterministicRng::new(7))
        .insert_resource(CombatConfig::default())
        .insert_resource(Time::<Fixed>::from_hz(60.0))
        .insert_resource(PhysicsWorld::default())
        .add_plugins((CombatPlugin, ProjectilePlugin))
        .add_systems(FixedUpdate, refresh_physics_world.before(SimulationSet::Input));
    configure_simulation_sets(&mut app);
    record_events::<DamageDealt>(&mut app);
    record_events::<ImpactSpawned>(&mut app);
    record_events::<ProjectileExpired>(&mut app);
    app
}

fn events<E: Event + Clone>(app: &App) -> Vec<E> {
    app.world()
        .resource::<RecordedEvents<E>>()
        .events
        .clone()
}

fn count<T: Component>(app: &mut App) -> usize {
    let world = app.world_mut();
    world.query::<&T>().iter(world).count()
}

fn run_ticks(app: &mut App, ticks: usize) {
    for _ in 0..ticks {
        advance_fixed_tick(app);
    }
}

/// Collider с surface; owner = None → сам себе владелец
fn spawn_surface(app: &mut App, owner: Option<Entity>, position: Vec3, radius: f32, solid: bool) -> Entity {
    let entity = app
        .world_mut()
        .spawn((Transform::from_translation(position), SphereCollider { radius }))
        .id();
    let owner = owner.unwrap_or(entity);
    let surface = if solid {
        Surface::solid(owner, "wall", LAYER_ENVIRONMENT)
    } else {
        Surface::trigger(owner, "zone", LAYER_ENVIRONMENT)
    };
    app.world_mut().entity_mut(entity).insert(surface);
    entity
}

fn spawn_prop(app: &mut App, position: Vec3, radius: f32) -> Entity {
    let prop = spawn_surface(app, None, position, radius, true);
    app.world_mut()
        .entity_mut(prop)
        .insert((Health::new(100.0), Damageable::new(prop)));
    prop
}

fn fire(app: &mut App, shooter: Entity, muzzle: Vec3, params: ProjectileParams) {
    app.world_mut()
        .send_event(FireProjectileIntent::new(shooter, muzzle, Vec3::Z).with_params(params));
}

#[test]
fn test_select_impact_skips_ignored_nearest() {
    let own = Entity::from_raw(1);
    let wall = Entity::from_raw(2);
    let hits = [
        SweepHit {
            surface: own,
            distance: 0.0,
            point: Vec3::ZERO,
            normal: Vec3::NEG_Z,
        },
        SweepHit {
            surface: wall,
            distance: 3.0,
            point: Vec3::new(0.0, 0.0, 3.0),
            normal: Vec3::NEG_Z,
        },
    ];

    let selected = select_impact(&hits, |surface| surface != own).unwrap();
    assert_eq!(selected.surface, wall);

    assert!(select_impact(&hits, |_| false).is_none());
}

#[test]
fn test_direct_hit_damages_body_part() {
    let mut app = projectile_app();
    let shooter = app.world_mut().spawn_empty().id();
    let target = app
        .world_mut()
        .spawn((Hitbox::from_config(&HitboxConfig::default()), Ragdoll::default()))
        .id();
    let chest = app
        .world_mut()
        .spawn((
            Transform::from_xyz(0.0, 0.0, 5.0),
            SphereCollider { radius: 0.3 },
            Surface::solid(target, BodyPartKind::Chest.surface_name(), LAYER_ACTORS),
            Damageable::body_part(target, BodyPartKind::Chest, 1.0),
        ))
        .id();

    let params = ProjectileParams {
        impact_vfx_lifetime: 0.05,
        ..default()
    };
    fire(&mut app, shooter, Vec3::ZERO, params);

    let mut ticks = 0;
    while events::<ImpactSpawned>(&app).is_empty() {
        advance_fixed_tick(&mut app);
        ticks += 1;
        assert!(ticks < 60, "projectile never hit");
    }

    let impact = &events::<ImpactSpawned>(&app)[0];
    assert_eq!(impact.surface, chest);
    assert_eq!(impact.owner, shooter);
    assert_eq!(impact.body_part, Some(BodyPartKind::Chest));
    assert!((impact.point.z - 4.7).abs() < 1e-3);

    let dealt = events::<DamageDealt>(&app);
    assert_eq!(dealt.len(), 1);
    assert_eq!(dealt[0].target, target);
    assert_eq!(dealt[0].source, Some(shooter));
    assert_eq!(dealt[0].body_part, Some(BodyPartKind::Chest));
    assert!((dealt[0].amount - 40.0).abs() < 1e-4);

    assert_eq!(count::<Projectile>(&mut app), 0);
    assert_eq!(count::<ImpactEffect>(&mut app), 1);

    run_ticks(&mut app, 5);
    assert_eq!(count::<ImpactEffect>(&mut app), 0);
}

#[test]
fn test_own_surfaces_are_never_hit() {
    let mut app = projectile_app();
    let shooter = app.world_mut().spawn(Health::new(100.0)).id();

    // Собственный collider вокруг дула — ближайшее пересечение
    let own = spawn_surface(&mut app, Some(shooter), Vec3::new(0.0, 0.0, 0.5), 0.5, true);
    app.world_mut().entity_mut(own).insert(Damageable::new(shooter));
    let wall = spawn_surface(&mut app, None, Vec3::new(0.0, 0.0, 5.0), 0.5, true);

    fire(&mut app, shooter, Vec3::ZERO, ProjectileParams::default());
    run_ticks(&mut app, 30);

    let impacts = events::<ImpactSpawned>(&app);
    assert_eq!(impacts.len(), 1);
    assert_eq!(impacts[0].surface, wall);
    assert!(events::<DamageDealt>(&app).is_empty());
    assert_eq!(app.world().get::<Health>(shooter).unwrap().current, 100.0);
}

#[test]
fn test_validity_filter() {
    let mut app = projectile_app();
    let shooter = app.world_mut().spawn_empty().id();

    // Trigger без Damageable и IgnoreHitDetection пролетаем насквозь
    spawn_surface(&mut app, None, Vec3::new(0.0, 0.0, 2.0), 0.5, false);
    let ignored = spawn_surface(&mut app, None, Vec3::new(0.0, 0.0, 3.0), 0.3, true);
    app.world_mut().entity_mut(ignored).insert(IgnoreHitDetection);
    let wall = spawn_surface(&mut app, None, Vec3::new(0.0, 0.0, 5.0), 0.5, true);

    fire(&mut app, shooter, Vec3::ZERO, ProjectileParams::default());
    run_ticks(&mut app, 30);

    let impacts = events::<ImpactSpawned>(&app);
    assert_eq!(impacts.len(), 1);
    assert_eq!(impacts[0].surface, wall);
    assert_eq!(impacts[0].body_part, None);
}

#[test]
fn test_damageable_trigger_is_hit() {
    let mut app = projectile_app();
    let shooter = app.world_mut().spawn_empty().id();

    let zone = spawn_surface(&mut app, None, Vec3::new(0.0, 0.0, 2.0), 0.5, false);
    app.world_mut()
        .entity_mut(zone)
        .insert((Health::new(100.0), Damageable::new(zone)));

    fire(&mut app, shooter, Vec3::ZERO, ProjectileParams::default());
    run_ticks(&mut app, 30);

    assert_eq!(events::<ImpactSpawned>(&app)[0].surface, zone);
    assert_eq!(app.world().get::<Health>(zone).unwrap().current, 60.0);
}

#[test]
fn test_expires_without_damage() {
    let mut app = projectile_app();
    let shooter = app.world_mut().spawn_empty().id();

    let params = ProjectileParams {
        max_lifetime: 0.1,
        ..default()
    };
    fire(&mut app, shooter, Vec3::ZERO, params);

    advance_fixed_tick(&mut app);
    assert_eq!(count::<Projectile>(&mut app), 1);

    run_ticks(&mut app, 10);
    assert_eq!(
        events::<ProjectileExpired>(&app).len(),
        1,
        "projectile should expire exactly once"
    );
    assert!(events::<ImpactSpawned>(&app).is_empty());
    assert_eq!(count::<Projectile>(&mut app), 0);
}

#[test]
fn test_area_damage_once_per_owner() {
    let mut app = projectile_app();
    let shooter = app.world_mut().spawn_empty().id();

    let first = spawn_prop(&mut app, Vec3::new(0.0, 0.0, 5.0), 0.5);
    let second = spawn_prop(&mut app, Vec3::new(1.5, 0.0, 5.0), 0.5);
    // Второй collider того же владельца
    let extra = spawn_surface(&mut app, Some(second), Vec3::new(1.5, 0.5, 5.0), 0.3, true);
    app.world_mut().entity_mut(extra).insert(Damageable::new(second));

    let params = ProjectileParams::default().with_area(DamageArea::new(3.0));
    fire(&mut app, shooter, Vec3::ZERO, params);
    run_ticks(&mut app, 30);

    let dealt = events::<DamageDealt>(&app);
    assert_eq!(dealt.len(), 2);
    assert!(dealt.iter().all(|event| event.amount == 40.0));
    assert_eq!(app.world().get::<Health>(first).unwrap().current, 60.0);
    assert_eq!(app.world().get::<Health>(second).unwrap().current, 60.0);
}

#[test]
fn test_gravity_bends_trajectory() {
    let mut app = projectile_app();
    let shooter = app.world_mut().spawn_empty().id();

    let params = ProjectileParams {
        gravity_down_acceleration: 9.8,
        ..default()
    };
    fire(&mut app, shooter, Vec3::ZERO, params);
    run_ticks(&mut app, 30);

    let world = app.world_mut();
    let (projectile, transform) = world
        .query::<(&Projectile, &Transform)>()
        .single(world)
        .unwrap();
    assert!(projectile.velocity.y < 0.0);
    assert!(transform.translation.y < 0.0);
    assert!(projectile.direction.y < 0.0);
}

#[test]
fn test_orientation_lags_gravity_by_one_tick() {
    let mut app = projectile_app();
    let shooter = app.world_mut().spawn_empty().id();

    let params = ProjectileParams {
        gravity_down_acceleration: 9.8,
        ..default()
    };
    fire(&mut app, shooter, Vec3::ZERO, params);
    advance_fixed_tick(&mut app);

    let world = app.world_mut();
    let projectile = world.query::<&Projectile>().single(world).unwrap();
    // Первый тик летим по направлению выстрела, гравитация уже в скорости
    assert_eq!(projectile.direction, Vec3::Z);
    assert!(projectile.velocity.y < 0.0);
}

#[test]
fn test_instant_trajectory_correction() {
    let mut app = projectile_app();
    let shooter = app
        .world_mut()
        .spawn(AimCamera {
            position: Vec3::new(0.0, 1.0, 0.0),
            forward: Vec3::Z,
        })
        .id();

    let params = ProjectileParams {
        trajectory_correction_distance: 0.0,
        ..default()
    };
    fire(&mut app, shooter, Vec3::new(0.3, 0.8, 0.0), params);
    advance_fixed_tick(&mut app);

    let world = app.world_mut();
    let (projectile, transform) = world
        .query::<(&Projectile, &Transform)>()
        .single(world)
        .unwrap();
    assert!(projectile.correction.is_none());
    assert!(transform.translation.x.abs() < 1e-4);
    assert!((transform.translation.y - 1.0).abs() < 1e-4);
}

#[test]
fn test_progressive_trajectory_correction() {
    let mut app = projectile_app();
    let shooter = app
        .world_mut()
        .spawn(AimCamera {
            position: Vec3::new(0.0, 1.0, 0.0),
            forward: Vec3::Z,
        })
        .id();

    let params = ProjectileParams {
        trajectory_correction_distance: 2.0,
        ..default()
    };
    fire(&mut app, shooter, Vec3::new(0.3, 0.8, 0.0), params);

    advance_fixed_tick(&mut app);
    {
        let world = app.world_mut();
        let (projectile, transform) = world
            .query::<(&Projectile, &Transform)>()
            .single(world)
            .unwrap();
        assert!(projectile.correction.is_some());
        // Частично: между дулом и линией камеры
        assert!(transform.translation.x < 0.3 && transform.translation.x > 0.0);
    }

    run_ticks(&mut app, 10);

    let world = app.world_mut();
    let (projectile, transform) = world
        .query::<(&Projectile, &Transform)>()
        .single(world)
        .unwrap();
    assert!(projectile.correction.is_none());
    assert!(transform.translation.x.abs() < 1e-3);
    assert!((transform.translation.y - 1.0).abs() < 1e-3);
}

#[test]
fn test_obstructed_muzzle_hits_immediately() {
    let mut app = projectile_app();
    let shooter = app
        .world_mut()
        .spawn(AimCamera {
            position: Vec3::new(0.0, 1.0, 0.0),
            forward: Vec3::Z,
        })
        .id();
    let wall = spawn_surface(&mut app, None, Vec3::new(0.0, 1.0, 0.5), 0.2, true);

    fire(&mut app, shooter, Vec3::new(0.0, 1.0, 1.0), ProjectileParams::default());
    advance_fixed_tick(&mut app);

    let impacts = events::<ImpactSpawned>(&app);
    assert_eq!(impacts.len(), 1);
    assert_eq!(impacts[0].surface, wall);
    assert!((impacts[0].point.z - 0.3).abs() < 1e-4);
    assert_eq!(count::<Projectile>(&mut app), 0);
}

#[test]
fn test_launch_inside_collider_hits_at_tip() {
    let mut app = projectile_app();
    let shooter = app.world_mut().spawn_empty().id();
    let prop = spawn_prop(&mut app, Vec3::ZERO, 2.0);

    // 0.1 м за тик, tip на 0.1 впереди root
    let params = ProjectileParams {
        speed: 6.0,
        tip_length: 0.1,
        ..default()
    };
    fire(&mut app, shooter, Vec3::ZERO, params);
    advance_fixed_tick(&mut app);

    let impacts = events::<ImpactSpawned>(&app);
    assert_eq!(impacts.len(), 1);
    assert_eq!(impacts[0].surface, prop);
    assert!(impacts[0].point.distance(Vec3::new(0.0, 0.0, 0.2)) < 1e-4);
    assert!(impacts[0].normal.distance(Vec3::NEG_Z) < 1e-4);

    let dealt = events::<DamageDealt>(&app);
    assert_eq!(dealt.len(), 1);
    assert_eq!(dealt[0].target, prop);
    assert_eq!(count::<Projectile>(&mut app), 0);
}
