//! Headless прогон боевой симуляции Anthracite
//!
//! Стрелок со стартовым набором оружия стреляет по манекену каждые 20 тиков.
//! Опционально: путь к TOML конфигу первым аргументом.

use std::path::Path;

use anthracite_simulation::*;
use bevy::prelude::*;

const TICKS: usize = 600;
const FIRE_EVERY: usize = 20;

fn load_config() -> CombatConfig {
    let Some(path) = std::env::args().nth(1) else {
        return CombatConfig::default();
    };

    match CombatConfig::load_from_toml(Path::new(&path)) {
        Ok(config) => config,
        Err(err) => {
            log_error(&format!("Failed to load config {}: {}, using defaults", path, err));
            CombatConfig::default()
        }
    }
}

fn main() {
    let config = load_config();
    let seed = config.simulation.seed;

    let mut app = create_headless_app(seed);
    app.insert_resource(config.clone());
    app.add_plugins(SimulationPlugin);

    log_info(&format!("Starting Anthracite headless simulation (seed: {})", seed));

    let muzzle = Vec3::new(0.3, 1.4, 0.5);
    let (shooter, dummy) = {
        let mut commands = app.world_mut().commands();

        let shooter = spawn_combatant(&mut commands, &config, Vec3::ZERO);
        commands.entity(shooter).insert((
            WeaponInventory::from_config(&config.weapons),
            WeaponInput::default(),
            WeaponSockets::default(),
            equipment::WeaponSway::default(),
            StartingWeapons(vec![
                WeaponDefinition::new("pistol").with_recoil(0.2),
                WeaponDefinition::new("rifle").with_recoil(0.35),
            ]),
            AimCamera {
                position: Vec3::new(0.0, 1.6, 0.0),
                forward: Vec3::Z,
            },
        ));

        let dummy = spawn_combatant(&mut commands, &config, Vec3::new(0.0, 0.0, 8.0));
        commands.entity(dummy).insert(WornArmor::full());

        spawn_damageable_prop(&mut commands, &config, Vec3::new(3.0, 1.0, 6.0), 0.5);
        spawn_obstacle(&mut commands, Vec3::new(-2.0, 1.0, 12.0), 1.0);

        (shooter, dummy)
    };
    app.world_mut().flush();

    for tick in 0..TICKS {
        if tick % FIRE_EVERY == 0 && app.world().get::<Dead>(shooter).is_none() {
            let world = app.world_mut();
            world.send_event(FireProjectileIntent::new(shooter, muzzle, Vec3::new(-0.02, 0.02, 1.0)));
            world.send_event(equipment::WeaponFired { owner: shooter });
        }

        advance_fixed_tick(&mut app);

        if tick % 100 == 0 {
            let world = app.world();
            let entity_count = world.entities().len();
            let chest = world
                .get::<Hitbox>(dummy)
                .and_then(|hitbox| hitbox.part(BodyPartKind::Chest))
                .map(|part| part.current_health)
                .unwrap_or(0.0);
            log_info(&format!(
                "Tick {}: {} entities, dummy chest {:.1}, dead: {}",
                tick,
                entity_count,
                chest,
                world.get::<Dead>(dummy).is_some()
            ));
        }
    }

    log_info("Simulation complete!");
}
