#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line adapter that plays a Realm Defence level to its end.
//!
//! Towers are placed on every open build spot the treasury allows, waves are
//! started as soon as the previous one clears, and the session is driven
//! through the fixed-step clock until it reaches a terminal state or the time
//! budget runs out.

use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use realm_defence_catalog::Catalog;
use realm_defence_core::{Command, Event, EventKind, Faction, SessionState};
use realm_defence_system_movement::BreachDamage;
use realm_defence_world::{advance_frame, apply, query, Config, EventBus, World};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "realm-defence")]
#[command(about = "Runs a Realm Defence level headlessly and reports the outcome")]
struct Args {
    /// Catalog tables to load instead of the built-in content
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Level identifier to play
    #[arg(long, default_value_t = 1)]
    level: u32,

    /// Side the player defends
    #[arg(long, value_enum, default_value_t = Side::Light)]
    faction: Side,

    /// Seed for spawn point selection
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Simulated seconds to run before giving up
    #[arg(long, default_value_t = 600)]
    max_seconds: u64,

    /// Length of one rendered frame in milliseconds
    #[arg(long, default_value_t = 16)]
    step_ms: u64,

    /// Tower template placed on open build spots
    #[arg(long, default_value = "archer")]
    tower: String,

    /// Lives lost per breach; the breaching enemy's damage when omitted
    #[arg(long)]
    breach_lives: Option<u32>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Side {
    Light,
    Dark,
}

impl From<Side> for Faction {
    fn from(side: Side) -> Self {
        match side {
            Side::Light => Faction::Light,
            Side::Dark => Faction::Dark,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    if args.step_ms == 0 {
        bail!("--step-ms must be positive");
    }

    let catalog = match &args.catalog {
        Some(path) => Catalog::from_toml_path(path)
            .with_context(|| format!("failed to load catalog from {}", path.display()))?,
        None => Catalog::builtin(),
    };

    let breach_damage = args
        .breach_lives
        .map_or(BreachDamage::EnemyDamage, BreachDamage::Fixed);
    let config = Config::new(args.seed).with_breach_damage(breach_damage);
    let mut world = World::new(catalog, args.level, args.faction.into(), config)
        .with_context(|| format!("failed to open level {}", args.level))?;

    let mut bus = EventBus::new();
    subscribe_reporters(&mut bus);

    let frame = Duration::from_millis(args.step_ms);
    let budget = Duration::from_secs(args.max_seconds);
    let mut events = Vec::new();

    while !query::state(&world).is_terminal() && query::elapsed(&world) < budget {
        events.clear();
        fortify(&mut world, &args.tower, &mut events);
        if !query::is_wave_active(&world) && query::wave_index(&world) < query::wave_count(&world)
        {
            let _ = apply(&mut world, Command::StartNextWave, &mut events);
        }
        let _ = advance_frame(&mut world, frame, &mut events);
        let _ = bus.publish(&events);
    }

    let ledger = query::ledger(&world);
    info!(
        state = ?query::state(&world),
        waves = query::wave_index(&world),
        of = query::wave_count(&world),
        lives = query::lives(&world),
        coins = ledger.coins,
        level = ledger.level,
        score = query::score(&world),
        elapsed_ms = query::elapsed(&world).as_millis() as u64,
        "session finished"
    );
    if query::state(&world) != SessionState::Victory {
        warn!("level was not cleared");
    }
    Ok(())
}

/// Builds `tower` on open spots until the treasury runs dry.
fn fortify(world: &mut World, tower: &str, out: &mut Vec<Event>) {
    for spot in query::open_build_spots(world) {
        let Some(position) = query::level(world).build_spots.get(spot).map(|s| s.position) else {
            continue;
        };
        let command = Command::BuildTower {
            position,
            tower: tower.to_owned(),
        };
        if apply(world, command, out).is_err() {
            break;
        }
    }
}

fn subscribe_reporters(bus: &mut EventBus) {
    bus.subscribe(EventKind::WaveStarted, |event| {
        if let Event::WaveStarted { wave, boss } = event {
            info!(wave = wave + 1, boss, "wave started");
        }
    });
    bus.subscribe(EventKind::WaveCompleted, |event| {
        if let Event::WaveCompleted { wave } = event {
            info!(wave = wave + 1, "wave cleared");
        }
    });
    bus.subscribe(EventKind::BossDefeated, |event| {
        if let Event::BossDefeated { template, .. } = event {
            info!(%template, "boss defeated");
        }
    });
    bus.subscribe(EventKind::LivesChanged, |event| {
        if let Event::LivesChanged { remaining } = event {
            warn!(remaining, "defences breached");
        }
    });
    bus.subscribe(EventKind::LevelUp, |event| {
        if let Event::LevelUp { level, .. } = event {
            info!(level, "level up");
        }
    });
    bus.subscribe(EventKind::TowerBuilt, |event| {
        if let Event::TowerBuilt {
            template, position, ..
        } = event
        {
            debug!(%template, x = position.x, y = position.y, "tower built");
        }
    });
}
