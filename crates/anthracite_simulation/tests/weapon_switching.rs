//! Weapon inventory через SimulationPlugin
//!
//! Стартовый набор, прокрутка по кольцу слотов, подбор с пола,
//! переполнение инвентаря, пустые руки после удаления всего оружия.

use anthracite_simulation::equipment::{RemoveWeaponIntent, WeaponAdded, WeaponSwitched};
use anthracite_simulation::*;
use bevy::prelude::*;

/// Задержка переключения: 6 тиков при 60 Hz
const SWITCH_DELAY: f32 = 0.1;
const SETTLE_TICKS: usize = 10;

fn create_app() -> App {
    let mut config = CombatConfig::default();
    config.weapons.switch_delay = SWITCH_DELAY;

    let mut app = create_headless_app(1);
    app.insert_resource(config);
    app.add_plugins(SimulationPlugin);
    record_events::<WeaponAdded>(&mut app);
    record_events::<WeaponSwitched>(&mut app);
    app
}

fn spawn_player(app: &mut App, weapons: &[&str]) -> Entity {
    app.world_mut()
        .spawn((
            Transform::default(),
            WeaponInventory::new(SWITCH_DELAY),
            WeaponInput::default(),
            WeaponSockets::default(),
            equipment::WeaponSway::default(),
            StartingWeapons(weapons.iter().map(|name| WeaponDefinition::new(*name)).collect()),
        ))
        .id()
}

fn spawn_pickup(app: &mut App, name: &str, position: Vec3) -> Entity {
    let pickup = app
        .world_mut()
        .spawn((
            Transform::from_translation(position),
            SphereCollider { radius: 0.3 },
            WeaponPickup::new(WeaponDefinition::new(name)),
        ))
        .id();
    app.world_mut()
        .entity_mut(pickup)
        .insert(Surface::trigger(pickup, format!("{}_pickup", name), LAYER_PICKUPS));
    pickup
}

fn run_ticks(app: &mut App, ticks: usize) {
    for _ in 0..ticks {
        advance_fixed_tick(app);
    }
}

/// Полный цикл переключения (put down + put up)
fn settle(app: &mut App) {
    run_ticks(app, SETTLE_TICKS * 2);
}

fn inventory(app: &App, player: Entity) -> &WeaponInventory {
    app.world().get::<WeaponInventory>(player).unwrap()
}

fn input(app: &mut App, player: Entity) -> Mut<'_, WeaponInput> {
    app.world_mut().get_mut::<WeaponInput>(player).unwrap()
}

fn events<E: Event + Clone>(app: &App) -> Vec<E> {
    app.world()
        .resource::<RecordedEvents<E>>()
        .events
        .clone()
}

#[test]
fn test_scroll_wraps_around_ring() {
    let mut app = create_app();
    let player = spawn_player(&mut app, &["pistol", "rifle", "shotgun"]);
    settle(&mut app);
    assert_eq!(inventory(&app, player).active_index(), Some(0));
    assert_eq!(inventory(&app, player).switch_state(), WeaponSwitchState::Up);

    for expected in [1, 2, 0] {
        input(&mut app, player).switch_axis = 1;
        settle(&mut app);
        assert_eq!(inventory(&app, player).active_index(), Some(expected));
        assert_eq!(inventory(&app, player).switch_state(), WeaponSwitchState::Up);
    }

    // Обратно: 0 → 2
    input(&mut app, player).switch_axis = -1;
    settle(&mut app);
    assert_eq!(inventory(&app, player).active_index(), Some(2));

    let active = inventory(&app, player).active_weapon().unwrap().entity;
    let shown: Vec<Entity> = {
        let world = app.world_mut();
        world
            .query::<(Entity, &WeaponInstance)>()
            .iter(world)
            .filter(|(_, instance)| instance.shown)
            .map(|(entity, _)| entity)
            .collect()
    };
    assert_eq!(shown, vec![active]);
}

#[test]
fn test_hotkey_selects_slot() {
    let mut app = create_app();
    let player = spawn_player(&mut app, &["pistol", "rifle", "shotgun"]);
    settle(&mut app);

    input(&mut app, player).select_slot = Some(2);
    advance_fixed_tick(&mut app);
    assert_eq!(inventory(&app, player).pending_index(), Some(2));
    assert_eq!(inventory(&app, player).switch_state(), WeaponSwitchState::PutDownPrevious);

    settle(&mut app);
    assert_eq!(inventory(&app, player).active_index(), Some(2));

    let switched = events::<WeaponSwitched>(&app);
    let last = switched.last().unwrap();
    assert_eq!(last.slot, Some(2));
    assert_eq!(last.weapon, Some(inventory(&app, player).weapon_at(2).unwrap().entity));
}

#[test]
fn test_pickup_goes_to_free_slot_and_switches() {
    let mut app = create_app();
    let player = spawn_player(&mut app, &["pistol", "rifle"]);
    settle(&mut app);

    let pickup = spawn_pickup(&mut app, "launcher", Vec3::new(1.0, 0.0, 1.0));
    input(&mut app, player).interact = true;
    advance_fixed_tick(&mut app);

    assert!(!app.world().entities().contains(pickup));
    assert_eq!(inventory(&app, player).slot_of("launcher"), Some(2));
    assert_eq!(inventory(&app, player).switch_state(), WeaponSwitchState::PutDownPrevious);

    settle(&mut app);
    assert_eq!(inventory(&app, player).active_index(), Some(2));
}

#[test]
fn test_pickup_with_full_inventory_fails() {
    let mut app = create_app();
    let names: Vec<String> = (0..WEAPON_SLOT_COUNT).map(|i| format!("weapon_{}", i)).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let player = spawn_player(&mut app, &refs);
    settle(&mut app);
    assert_eq!(inventory(&app, player).weapon_count(), WEAPON_SLOT_COUNT);

    let pickup = spawn_pickup(&mut app, "launcher", Vec3::new(0.5, 0.0, 0.0));
    input(&mut app, player).interact = true;
    advance_fixed_tick(&mut app);

    assert!(app.world().entities().contains(pickup));
    assert_eq!(events::<WeaponAdded>(&app).len(), WEAPON_SLOT_COUNT);
    assert!(inventory(&app, player).slot_of("launcher").is_none());
}

#[test]
fn test_dead_player_cannot_switch() {
    let mut app = create_app();
    let player = spawn_player(&mut app, &["pistol", "rifle"]);
    settle(&mut app);

    app.world_mut().entity_mut(player).insert(Dead);
    input(&mut app, player).switch_axis = 1;
    settle(&mut app);

    assert_eq!(inventory(&app, player).active_index(), Some(0));
    assert_eq!(inventory(&app, player).switch_state(), WeaponSwitchState::Up);
}

#[test]
fn test_removing_every_weapon_empties_hands() {
    let mut app = create_app();
    let player = spawn_player(&mut app, &["pistol", "rifle"]);
    settle(&mut app);

    for _ in 0..2 {
        let active = inventory(&app, player).active_weapon().unwrap().entity;
        app.world_mut().send_event(RemoveWeaponIntent {
            owner: player,
            weapon: active,
        });
        settle(&mut app);
    }

    let inventory = inventory(&app, player);
    assert_eq!(inventory.weapon_count(), 0);
    assert_eq!(inventory.active_index(), None);
    assert_eq!(inventory.switch_state(), WeaponSwitchState::Down);

    let last = events::<WeaponSwitched>(&app).last().cloned().unwrap();
    assert_eq!(last.slot, None);
    assert_eq!(last.weapon, None);
}
