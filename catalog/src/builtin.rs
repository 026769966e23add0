use glam::Vec2;
use realm_defence_core::{BuildSpot, Faction, PathSegment, Route};

use crate::{
    Ability, EnemyTemplate, LevelDefinition, SpawnGroup, TowerClass, TowerTemplate, UpgradeStep,
    WaveDefinition,
};

pub(crate) fn enemies() -> Vec<EnemyTemplate> {
    vec![
        EnemyTemplate {
            id: "goblin".to_owned(),
            name: "Goblin".to_owned(),
            health: 50,
            armor: 0,
            speed: 1.5,
            damage: 1,
            coins: 5,
            experience: 2,
            size: 20.0,
            color: "#8B4513".to_owned(),
            abilities: Vec::new(),
            is_boss: false,
        },
        EnemyTemplate {
            id: "orc".to_owned(),
            name: "Orc".to_owned(),
            health: 120,
            armor: 5,
            speed: 1.0,
            damage: 3,
            coins: 15,
            experience: 5,
            size: 25.0,
            color: "#228B22".to_owned(),
            abilities: vec![Ability::Berserker],
            is_boss: false,
        },
        EnemyTemplate {
            id: "orc_boss".to_owned(),
            name: "Orc Warlord".to_owned(),
            health: 500,
            armor: 15,
            speed: 0.8,
            damage: 8,
            coins: 100,
            experience: 25,
            size: 40.0,
            color: "#006400".to_owned(),
            abilities: vec![Ability::Berserker, Ability::Regeneration, Ability::Rage],
            is_boss: true,
        },
    ]
}

fn step(cost: u32, damage: u32, range: f32, attack_interval_ms: Option<u64>) -> UpgradeStep {
    UpgradeStep {
        cost,
        damage: Some(damage),
        range: Some(range),
        attack_interval_ms,
    }
}

pub(crate) fn towers() -> Vec<TowerTemplate> {
    vec![
        TowerTemplate {
            id: "archer".to_owned(),
            name: "Archer Tower".to_owned(),
            cost: 50,
            damage: 15,
            range: 150.0,
            attack_interval_ms: 1_000,
            projectile_speed: Some(300.0),
            size: 30.0,
            color: "#8B4513".to_owned(),
            class: TowerClass::Ranged,
            upgrades: vec![step(75, 25, 180.0, Some(800)), step(125, 40, 200.0, Some(600))],
        },
        TowerTemplate {
            id: "warrior".to_owned(),
            name: "Warrior Barracks".to_owned(),
            cost: 75,
            damage: 25,
            range: 80.0,
            attack_interval_ms: 1_500,
            projectile_speed: None,
            size: 35.0,
            color: "#4169E1".to_owned(),
            class: TowerClass::Melee,
            upgrades: vec![step(100, 40, 100.0, None), step(150, 60, 120.0, None)],
        },
        TowerTemplate {
            id: "mage".to_owned(),
            name: "Mage Tower".to_owned(),
            cost: 100,
            damage: 30,
            range: 120.0,
            attack_interval_ms: 2_000,
            projectile_speed: Some(200.0),
            size: 25.0,
            color: "#9370DB".to_owned(),
            class: TowerClass::Magic,
            upgrades: vec![
                step(150, 50, 140.0, Some(1_500)),
                step(200, 80, 160.0, Some(1_000)),
            ],
        },
    ]
}

fn group(enemy: &str, count: u32, inter_delay_ms: u64) -> SpawnGroup {
    SpawnGroup {
        enemy: enemy.to_owned(),
        count,
        inter_delay_ms,
    }
}

pub(crate) fn first_defence() -> LevelDefinition {
    let gate = PathSegment::curved(
        Vec2::new(400.0, 400.0),
        Vec2::new(800.0, 400.0),
        Vec2::new(600.0, 350.0),
    );
    let north = Route::new(vec![
        PathSegment::curved(
            Vec2::new(0.0, 300.0),
            Vec2::new(400.0, 300.0),
            Vec2::new(200.0, 250.0),
        ),
        PathSegment::straight(Vec2::new(400.0, 300.0), Vec2::new(400.0, 400.0)),
        gate,
    ]);
    let south = Route::new(vec![
        PathSegment::curved(
            Vec2::new(0.0, 500.0),
            Vec2::new(400.0, 500.0),
            Vec2::new(200.0, 550.0),
        ),
        PathSegment::straight(Vec2::new(400.0, 500.0), Vec2::new(400.0, 400.0)),
        gate,
    ]);

    let build_spots = [
        (100.0, 200.0),
        (300.0, 200.0),
        (500.0, 200.0),
        (100.0, 600.0),
        (300.0, 600.0),
        (500.0, 600.0),
    ]
    .into_iter()
    .map(|(x, y)| BuildSpot::at(Vec2::new(x, y)))
    .collect();

    LevelDefinition {
        id: 1,
        name: "First Defence".to_owned(),
        faction: Faction::Light,
        routes: vec![north, south],
        build_spots,
        hero_start: Vec2::new(750.0, 400.0),
        starting_coins: 100,
        starting_lives: 20,
        waves: vec![
            WaveDefinition {
                groups: vec![group("goblin", 10, 1_000)],
                is_boss: false,
            },
            WaveDefinition {
                groups: vec![group("orc", 2, 2_000)],
                is_boss: false,
            },
            WaveDefinition {
                groups: vec![group("orc_boss", 1, 3_000)],
                is_boss: true,
            },
        ],
    }
}
