use std::time::Duration;

use glam::Vec2;
use realm_defence_catalog::Catalog;
use realm_defence_core::{
    BuildError, CatalogError, Command, CommandError, Event, Faction, SellError, SessionState,
    TowerId, UpgradeError,
};
use realm_defence_system_movement::BreachDamage;
use realm_defence_world::{advance_frame, apply, query, Config, World};

const DEFAULT_TABLES: &str = include_str!("../../catalog/data/catalog.toml");

const PRACTICE_YARD: &str = r##"
[[enemies]]
id = "dummy"
name = "Training Dummy"
health = 10
speed = 0.01
damage = 1
coins = 7
experience = 3
size = 10.0
color = "#ffffff"

[[levels]]
id = 2
name = "Practice Yard"
hero_start = [20.0, 50.0]
starting_coins = 0
starting_lives = 3
build_spots = []

[[levels.routes]]
segments = [{ start = [0.0, 0.0], end = [400.0, 0.0] }]

[[levels.waves]]
groups = [{ enemy = "dummy", count = 2, inter_delay_ms = 500 }]
"##;

const TICK: Duration = Duration::from_millis(16);

fn first_defence() -> World {
    World::new(Catalog::builtin(), 1, Faction::Light, Config::new(11)).expect("level 1 exists")
}

fn rich_first_defence() -> World {
    let tables = DEFAULT_TABLES.replace("starting_coins = 100", "starting_coins = 1000");
    let catalog = Catalog::from_toml_str(&tables).expect("patched tables parse");
    World::new(catalog, 1, Faction::Light, Config::new(11)).expect("level 1 exists")
}

fn practice_yard(config: Config, waves: usize) -> World {
    let mut tables = PRACTICE_YARD.to_owned();
    for _ in 1..waves {
        tables.push_str(
            "\n[[levels.waves]]\ngroups = [{ enemy = \"dummy\", count = 1, inter_delay_ms = 0 }]\n",
        );
    }
    let catalog = Catalog::from_toml_str(&tables).expect("practice tables parse");
    World::new(catalog, 2, Faction::Dark, config).expect("level 2 exists")
}

fn tick(world: &mut World, events: &mut Vec<Event>) {
    apply(world, Command::Tick { dt: TICK }, events).expect("ticks are always accepted");
}

fn build(
    world: &mut World,
    x: f32,
    y: f32,
    tower: &str,
    events: &mut Vec<Event>,
) -> Result<(), CommandError> {
    apply(
        world,
        Command::BuildTower {
            position: Vec2::new(x, y),
            tower: tower.to_owned(),
        },
        events,
    )
}

#[test]
fn building_spends_coins_and_rejections_change_nothing() {
    let mut world = first_defence();
    let mut events = Vec::new();

    build(&mut world, 105.0, 195.0, "archer", &mut events).expect("spot 0 is free");
    build(&mut world, 300.0, 200.0, "archer", &mut events).expect("spot 1 is free");
    assert_eq!(query::ledger(&world).coins, 0);
    assert_eq!(query::towers(&world).len(), 2);
    assert_eq!(query::towers(&world)[0].position, Vec2::new(100.0, 200.0));

    events.clear();
    assert_eq!(
        build(&mut world, 500.0, 200.0, "archer", &mut events),
        Err(CommandError::Build(BuildError::InsufficientCoins {
            needed: 50,
            available: 0,
        }))
    );
    assert_eq!(
        build(&mut world, 200.0, 200.0, "archer", &mut events),
        Err(CommandError::Build(BuildError::NotBuildSpot))
    );
    assert_eq!(
        build(&mut world, 100.0, 200.0, "archer", &mut events),
        Err(CommandError::Build(BuildError::SpotOccupied { spot: 0 }))
    );
    assert_eq!(
        build(&mut world, 500.0, 600.0, "cannon", &mut events),
        Err(CommandError::Build(BuildError::Catalog(
            CatalogError::UnknownTower("cannon".to_owned())
        )))
    );
    assert!(events.is_empty(), "rejected commands must not emit: {events:?}");
    assert_eq!(query::towers(&world).len(), 2);
}

#[test]
fn selling_refunds_half_the_base_cost() {
    let mut world = first_defence();
    let mut events = Vec::new();
    build(&mut world, 100.0, 600.0, "warrior", &mut events).expect("spot 3 is free");
    let tower = query::towers(&world)[0].id;

    apply(&mut world, Command::SellTower { tower }, &mut events).expect("tower exists");
    assert_eq!(query::ledger(&world).coins, 25 + 37);
    assert!(events.contains(&Event::TowerSold { tower, refund: 37 }));
    assert!(query::towers(&world).is_empty());
    assert_eq!(query::open_build_spots(&world).len(), 6);

    assert_eq!(
        apply(&mut world, Command::SellTower { tower }, &mut events),
        Err(CommandError::Sell(SellError::MissingTower(tower)))
    );
}

#[test]
fn upgraded_towers_sell_for_the_catalog_refund() {
    let catalog = Catalog::builtin();
    let refund = catalog.tower("archer").expect("archer exists").sell_refund();
    let mut world = rich_first_defence();
    let mut events = Vec::new();
    build(&mut world, 500.0, 200.0, "archer", &mut events).expect("spot 2 is free");
    let tower = query::towers(&world)[0].id;
    apply(&mut world, Command::UpgradeTower { tower }, &mut events).expect("level 2 affordable");
    let before = query::ledger(&world).coins;

    events.clear();
    apply(&mut world, Command::SellTower { tower }, &mut events).expect("tower exists");
    assert!(
        events.contains(&Event::TowerSold { tower, refund }),
        "refund follows the template, not the upgrades: {events:?}"
    );
    assert_eq!(query::ledger(&world).coins, before + refund);
}

#[test]
fn upgrades_climb_the_ladder_and_stop_at_the_top() {
    let mut world = rich_first_defence();
    let mut events = Vec::new();
    build(&mut world, 500.0, 200.0, "archer", &mut events).expect("spot 2 is free");
    let tower = query::towers(&world)[0].id;

    apply(&mut world, Command::UpgradeTower { tower }, &mut events).expect("level 2 affordable");
    let upgraded = query::tower(&world, tower).expect("tower exists").clone();
    assert_eq!(upgraded.level, 2);
    assert_eq!(upgraded.damage, 25);
    assert_eq!(upgraded.range, 180.0);
    assert_eq!(upgraded.attack_interval, Duration::from_millis(800));
    assert_eq!(upgraded.invested, 125);

    apply(&mut world, Command::UpgradeTower { tower }, &mut events).expect("level 3 affordable");
    assert_eq!(query::ledger(&world).coins, 1000 - 50 - 75 - 125);

    events.clear();
    assert_eq!(
        apply(&mut world, Command::UpgradeTower { tower }, &mut events),
        Err(CommandError::Upgrade(UpgradeError::MaxLevel { level: 3 }))
    );
    assert!(events.is_empty());
    assert_eq!(
        apply(
            &mut world,
            Command::UpgradeTower {
                tower: TowerId::new(40)
            },
            &mut events
        ),
        Err(CommandError::Upgrade(UpgradeError::MissingTower(TowerId::new(40))))
    );
}

#[test]
fn upgrade_without_coins_is_rejected() {
    let mut world = first_defence();
    let mut events = Vec::new();
    build(&mut world, 500.0, 200.0, "archer", &mut events).expect("spot 2 is free");
    let tower = query::towers(&world)[0].id;

    assert_eq!(
        apply(&mut world, Command::UpgradeTower { tower }, &mut events),
        Err(CommandError::Upgrade(UpgradeError::InsufficientCoins {
            needed: 75,
            available: 50,
        }))
    );
    assert_eq!(query::tower(&world, tower).map(|t| t.level), Some(1));
}

#[test]
fn second_wave_cannot_start_while_first_is_active() {
    let mut world = first_defence();
    let mut events = Vec::new();

    apply(&mut world, Command::StartNextWave, &mut events).expect("first wave starts");
    assert!(query::is_wave_active(&world));
    assert_eq!(
        apply(&mut world, Command::StartNextWave, &mut events),
        Err(CommandError::WaveUnavailable)
    );
    assert_eq!(query::wave_index(&world), 0);
}

#[test]
fn pause_freezes_simulation_but_counts_ticks() {
    let mut world = first_defence();
    let mut events = Vec::new();
    apply(&mut world, Command::StartNextWave, &mut events).expect("first wave starts");

    assert_eq!(advance_frame(&mut world, Duration::from_millis(100), &mut events), 6);
    assert_eq!(query::elapsed(&world), Duration::from_millis(96));
    let spawned = query::enemies(&world).count();
    let positions: Vec<Vec2> = query::enemies(&world).map(|enemy| enemy.position).collect();

    apply(&mut world, Command::TogglePause, &mut events).expect("pause accepted");
    assert_eq!(query::state(&world), SessionState::Paused);
    for _ in 0..200 {
        let _ = advance_frame(&mut world, TICK, &mut events);
    }
    assert_eq!(query::ticks(&world), 206);
    assert_eq!(query::elapsed(&world), Duration::from_millis(96));
    assert_eq!(query::enemies(&world).count(), spawned);
    let paused_positions: Vec<Vec2> = query::enemies(&world).map(|enemy| enemy.position).collect();
    assert_eq!(positions, paused_positions);

    apply(&mut world, Command::TogglePause, &mut events).expect("resume accepted");
    for _ in 0..70 {
        tick(&mut world, &mut events);
    }
    assert_eq!(query::state(&world), SessionState::Running);
    assert!(query::enemies(&world).count() > spawned, "spawning resumed");
}

#[test]
fn breaches_end_the_session() {
    let config = Config::new(3).with_breach_damage(BreachDamage::Fixed(20));
    let mut world = World::new(Catalog::builtin(), 1, Faction::Light, config).expect("level 1");
    let mut events = Vec::new();
    apply(&mut world, Command::DamageHero { amount: 1_000 }, &mut events).expect("hero alive");
    assert_eq!(query::lives(&world), 15);
    apply(&mut world, Command::StartNextWave, &mut events).expect("first wave starts");

    for _ in 0..2_000 {
        tick(&mut world, &mut events);
        if query::state(&world) == SessionState::GameOver {
            break;
        }
    }

    assert_eq!(query::state(&world), SessionState::GameOver);
    assert_eq!(query::lives(&world), 0);
    assert!(events.contains(&Event::SessionStateChanged {
        state: SessionState::GameOver
    }));

    let elapsed = query::elapsed(&world);
    tick(&mut world, &mut events);
    assert_eq!(query::elapsed(&world), elapsed, "terminal sessions do not advance");
    assert_eq!(
        apply(&mut world, Command::TogglePause, &mut events),
        Err(CommandError::SessionOver)
    );
    assert_eq!(query::state(&world), SessionState::GameOver);
}

#[test]
fn final_breach_freezes_the_wave_and_the_treasury() {
    let tables = PRACTICE_YARD
        .replace("speed = 0.01", "speed = 5.0")
        .replace("hero_start = [20.0, 50.0]", "hero_start = [2000.0, 2000.0]")
        .replace("starting_lives = 3", "starting_lives = 1")
        .replace("end = [400.0, 0.0]", "end = [100.0, 0.0]")
        .replace("count = 2", "count = 1");
    let catalog = Catalog::from_toml_str(&tables).expect("patched tables parse");
    let config = Config::new(9).with_auto_start(Some(Duration::ZERO));
    let mut world = World::new(catalog, 2, Faction::Dark, config).expect("level 2 exists");
    let mut events = Vec::new();
    apply(&mut world, Command::StartNextWave, &mut events).expect("wave starts");

    for _ in 0..400 {
        tick(&mut world, &mut events);
        if query::state(&world).is_terminal() {
            break;
        }
    }
    for _ in 0..10 {
        tick(&mut world, &mut events);
    }

    assert_eq!(query::state(&world), SessionState::GameOver);
    let game_over = events
        .iter()
        .position(|event| {
            *event
                == Event::SessionStateChanged {
                    state: SessionState::GameOver,
                }
        })
        .expect("game over is announced");
    let after = &events[game_over..];
    assert!(
        !after.iter().any(|event| matches!(
            event,
            Event::WaveCompleted { .. } | Event::CoinsChanged { .. } | Event::WaveStarted { .. }
        )),
        "nothing may change after the session ends: {after:?}"
    );
    assert_eq!(query::wave_index(&world), 0, "the lost wave is not completed");
    assert_eq!(query::ledger(&world).coins, 0, "no bonus for a lost wave");
}

#[test]
fn clearing_every_wave_is_a_victory() {
    let mut world = practice_yard(Config::new(5), 1);
    let mut events = Vec::new();
    apply(&mut world, Command::StartNextWave, &mut events).expect("wave starts");

    for _ in 0..400 {
        tick(&mut world, &mut events);
        if query::state(&world) == SessionState::Victory {
            break;
        }
    }

    assert_eq!(query::state(&world), SessionState::Victory);
    assert!(events.contains(&Event::WaveCompleted { wave: 0 }));
    let kills = events
        .iter()
        .filter(|event| matches!(event, Event::EnemyKilled { .. }))
        .count();
    assert_eq!(kills, 2);
    assert_eq!(query::ledger(&world).coins, 7 + 7 + 10, "rewards plus wave bonus");
    assert_eq!(query::ledger(&world).experience, 6);
    assert_eq!(query::score(&world), 60);
    assert_eq!(query::hero(&world).experience, 6);
    assert_eq!(
        apply(&mut world, Command::StartNextWave, &mut events),
        Err(CommandError::SessionOver)
    );
}

#[test]
fn next_wave_auto_starts_after_the_configured_delay() {
    let config = Config::new(5).with_auto_start(Some(Duration::from_millis(500)));
    let mut world = practice_yard(config, 2);
    let mut events = Vec::new();
    apply(&mut world, Command::StartNextWave, &mut events).expect("wave starts");

    for _ in 0..600 {
        tick(&mut world, &mut events);
        if query::state(&world) == SessionState::Victory {
            break;
        }
    }

    assert!(events.contains(&Event::WaveStarted {
        wave: 1,
        boss: false
    }));
    assert_eq!(query::state(&world), SessionState::Victory);
    assert_eq!(query::wave_index(&world), 2);
}
