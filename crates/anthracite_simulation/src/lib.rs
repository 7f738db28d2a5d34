//! Anthracite Simulation Core
//!
//! Боевая модель FPS на Bevy 0.16 (headless ECS):
//! - body-part ledger (Hitbox), Health, броня
//! - снаряды (sphere sweep, ignored surfaces, trajectory correction)
//! - инвентарь оружия на 9 слотов + анимированное переключение
//! - ragdoll toggle
//!
//! Движок-хост (рендер, анимация, звук, input) — вне crate. Он получает
//! notifications через Bevy events и подключает физику через `PhysicsQuery`.

use bevy::ecs::component::Tick;
use bevy::ecs::event::EventRegistry;
use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod combat;
pub mod components;
pub mod config;
pub mod equipment;
pub mod logger;
pub mod physics;
pub mod projectile;

// Re-export базовых типов для удобства
pub use combat::{
    spawn_combatant, spawn_damageable_prop, spawn_obstacle, BodyPartBroken, BodyPartDestroyed,
    CombatPlugin, DamageDealt, DamageRequest, DespawnAfter, EntityDied, Healed,
};
pub use components::*;
pub use config::{CombatConfig, ConfigError};
pub use equipment::EquipmentPlugin;
pub use logger::{init_logger, log, log_error, log_info, log_warning};
pub use physics::{PhysicsQuery, PhysicsWorld, SphereWorld, SweepHit};
pub use projectile::{FireProjectileIntent, Projectile, ProjectilePlugin};

/// Порядок фаз одного fixed tick
///
/// Input → Equipment → Launch → Flight → Damage → Cleanup:
/// движение снаряда и hit detection раньше урона, урон раньше уничтожения.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    Input,
    Equipment,
    Launch,
    Flight,
    Damage,
    Cleanup,
}

/// Главный plugin симуляции (объединяет все подсистемы)
///
/// `CombatConfig` берётся из world (если host вставил заранее), иначе default.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        let config = app
            .world()
            .get_resource::<CombatConfig>()
            .cloned()
            .unwrap_or_default();

        if let Err(err) = config.validate() {
            log_error(&format!("Invalid combat config, simulation may misbehave: {}", err));
        }

        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(config.simulation.seed));
        }

        if !app.world().contains_resource::<PhysicsWorld>() {
            app.insert_resource(PhysicsWorld::default());
        }

        app
            // Fixed timestep для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(config.simulation.tick_hz))
            .insert_resource(config)
            .add_systems(
                FixedUpdate,
                physics::refresh_physics_world.before(SimulationSet::Input),
            )
            // Подсистемы
            .add_plugins((CombatPlugin, ProjectilePlugin, EquipmentPlugin));

        configure_simulation_sets(app);
    }
}

/// Цепочка SimulationSet в FixedUpdate (для SimulationPlugin и тестов отдельных plugins)
pub fn configure_simulation_sets(app: &mut App) {
    app.configure_sets(
        FixedUpdate,
        (
            SimulationSet::Input,
            SimulationSet::Equipment,
            SimulationSet::Launch,
            SimulationSet::Flight,
            SimulationSet::Damage,
            SimulationSet::Cleanup,
        )
            .chain(),
    );
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(60.0)); // 60Hz FixedUpdate

    app
}

/// Один fixed tick вручную (без wall clock): сдвигаем `Time<Fixed>` на timestep
/// и прогоняем FixedUpdate. Так headless прогоны и тесты детерминированы.
///
/// Перед тиком меняем double buffer всех `Events<T>` (как `First` в `app.update()`):
/// событие живёт два тика, потом удаляется.
pub fn advance_fixed_tick(app: &mut App) {
    let world = app.world_mut();

    if world.contains_resource::<EventRegistry>() {
        world.resource_scope(|world, mut registry: Mut<EventRegistry>| {
            registry.run_updates(world, Tick::new(0));
        });
    }

    let timestep = world.resource::<Time<Fixed>>().timestep();
    world.resource_mut::<Time<Fixed>>().advance_by(timestep);
    world.run_schedule(FixedUpdate);
}

/// Все события типа `E` с момента `record_events` (для replay-дампов и тестов)
#[derive(Resource)]
pub struct RecordedEvents<E: Event> {
    pub events: Vec<E>,
}

/// Подписка: копим события `E` в `RecordedEvents<E>` после Cleanup каждого тика
pub fn record_events<E: Event + Clone>(app: &mut App) {
    app.add_event::<E>()
        .insert_resource(RecordedEvents::<E> { events: Vec::new() })
        .add_systems(
            FixedUpdate,
            collect_events::<E>.after(SimulationSet::Cleanup),
        );
}

fn collect_events<E: Event + Clone>(
    mut reader: EventReader<E>,
    mut recorded: ResMut<RecordedEvents<E>>,
) {
    recorded.events.extend(reader.read().cloned());
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
