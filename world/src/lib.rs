#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state for a Realm Defence level.
//!
//! The [`World`] owns every service and roster. Adapters mutate it only
//! through [`apply`] and [`advance_frame`], and observe it through the
//! [`query`] functions and the events appended to their buffers.

mod bus;
mod clock;
mod towers;

use std::time::Duration;

use glam::Vec2;
use realm_defence_catalog::{Catalog, LevelDefinition};
use realm_defence_core::{
    BuildError, CatalogError, Command, CommandError, Event, Faction, HeroState, RouteId,
    SellError, SessionState, TowerId, UpgradeError, HERO_DEATH_LIVES,
};
use realm_defence_system_builder::Builder;
use realm_defence_system_combat::{CombatContext, CombatResolver};
use realm_defence_system_economy::{self as economy, EconomyLedger};
use realm_defence_system_movement::{self as movement, BreachDamage, EnemyMotion};
use realm_defence_system_waves::{self as waves, SpawnPoint, WaveDirector};
use tracing::{debug, info, warn};

pub use bus::EventBus;
pub use clock::SimulationClock;

use towers::TowerRegistry;

/// Session-wide tuning parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    rng_seed: u64,
    fixed_step: Duration,
    max_steps_per_frame: u32,
    breach_damage: BreachDamage,
    wave_bonus_base: u32,
    wave_bonus_growth: u32,
    auto_start_delay: Option<Duration>,
}

impl Config {
    /// Creates the default configuration seeded with `rng_seed`.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self {
            rng_seed,
            fixed_step: Duration::from_millis(16),
            max_steps_per_frame: 8,
            breach_damage: BreachDamage::Fixed(1),
            wave_bonus_base: 10,
            wave_bonus_growth: 5,
            auto_start_delay: None,
        }
    }

    /// Overrides the fixed step and per-frame step cap.
    #[must_use]
    pub const fn with_fixed_step(mut self, fixed_step: Duration, max_steps_per_frame: u32) -> Self {
        self.fixed_step = fixed_step;
        self.max_steps_per_frame = max_steps_per_frame;
        self
    }

    /// Overrides how many lives a breach costs.
    #[must_use]
    pub const fn with_breach_damage(mut self, breach_damage: BreachDamage) -> Self {
        self.breach_damage = breach_damage;
        self
    }

    /// Overrides the coins paid when a wave completes.
    #[must_use]
    pub const fn with_wave_bonus(mut self, base: u32, growth: u32) -> Self {
        self.wave_bonus_base = base;
        self.wave_bonus_growth = growth;
        self
    }

    /// Starts the next wave automatically `delay` after the previous one completes.
    #[must_use]
    pub const fn with_auto_start(mut self, delay: Option<Duration>) -> Self {
        self.auto_start_delay = delay;
        self
    }

    fn wave_bonus(&self, wave: usize) -> u32 {
        let wave = u32::try_from(wave).unwrap_or(u32::MAX);
        self.wave_bonus_base
            .saturating_add(self.wave_bonus_growth.saturating_mul(wave))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Represents the authoritative Realm Defence session state.
#[derive(Debug)]
pub struct World {
    config: Config,
    catalog: Catalog,
    level: LevelDefinition,
    ledger: EconomyLedger,
    director: WaveDirector,
    motion: EnemyMotion,
    combat: CombatResolver,
    builder: Builder,
    towers: TowerRegistry,
    hero: HeroState,
    clock: SimulationClock,
    state: SessionState,
    lives: u32,
    auto_start_elapsed: Option<Duration>,
}

impl World {
    /// Creates a running session for the requested level.
    pub fn new(
        catalog: Catalog,
        level_id: u32,
        faction: Faction,
        config: Config,
    ) -> Result<Self, CatalogError> {
        let level = catalog.level(level_id, faction)?;

        let mut director = WaveDirector::new(waves::Config::new(config.rng_seed));
        director.set_schedule(level.waves.clone());
        director.set_spawn_points(
            level
                .routes
                .iter()
                .enumerate()
                .filter_map(|(index, route)| {
                    let id = RouteId::new(u32::try_from(index).ok()?);
                    SpawnPoint::for_route(id, route)
                })
                .collect(),
        );

        let ledger = EconomyLedger::new(
            economy::Config::default().with_starting_coins(level.starting_coins),
        );

        info!(
            level = level.id,
            name = %level.name,
            faction = ?level.faction,
            waves = level.waves.len(),
            "session created"
        );

        Ok(Self {
            hero: HeroState::at(level.hero_start),
            lives: level.starting_lives,
            clock: SimulationClock::new(config.fixed_step, config.max_steps_per_frame),
            motion: EnemyMotion::new(movement::Config::new(config.breach_damage)),
            combat: CombatResolver::new(),
            builder: Builder::default(),
            towers: TowerRegistry::new(),
            state: SessionState::Running,
            auto_start_elapsed: None,
            config,
            catalog,
            level,
            ledger,
            director,
        })
    }

    fn set_state(&mut self, state: SessionState, out: &mut Vec<Event>) {
        if self.state == state {
            return;
        }
        info!(from = ?self.state, to = ?state, "session state changed");
        self.state = state;
        out.push(Event::SessionStateChanged { state });
    }

    fn lose_lives(&mut self, amount: u32, out: &mut Vec<Event>) {
        if amount == 0 {
            return;
        }
        self.lives = self.lives.saturating_sub(amount);
        out.push(Event::LivesChanged {
            remaining: self.lives,
        });
        if self.lives == 0 {
            self.set_state(SessionState::GameOver, out);
        }
    }

    fn step(&mut self, dt: Duration, out: &mut Vec<Event>) {
        let running = self.state == SessionState::Running;
        self.clock.tick(dt, running);
        if self.state.is_terminal() {
            return;
        }
        out.push(Event::TimeAdvanced { dt });
        if !running {
            return;
        }

        let now = self.clock.now();
        let completed_before = self.director.wave_index();

        let _ = self.motion.walk_hero(&mut self.hero, dt);
        self.director.update(dt, &self.catalog, out);

        let lost = self.motion.advance_all(
            self.director.enemies_mut(),
            &self.level.routes,
            dt,
            out,
        );
        self.lose_lives(lost, out);

        if !self.state.is_terminal() {
            let mut ctx = CombatContext {
                ledger: &mut self.ledger,
                out: &mut *out,
            };
            let enemies = self.director.enemies_mut();
            self.combat.resolve_tower_attacks(
                self.towers.as_mut_slice(),
                enemies,
                now,
                &mut ctx,
            );
            let _ = self
                .combat
                .resolve_hero_attack(&mut self.hero, enemies, now, &mut ctx);
            self.combat
                .update_projectiles(dt, enemies, &mut self.hero, &mut ctx);
        }

        self.director.prune_dead();
        self.combat.prune_spent();
        if self.state.is_terminal() {
            return;
        }

        self.director.check_completion(out);
        for wave in completed_before..self.director.wave_index() {
            let bonus = self.config.wave_bonus(wave);
            self.ledger.add_coins(bonus, "wave_bonus", out);
            self.auto_start_elapsed = Some(Duration::ZERO);
        }

        if self.director.all_waves_complete() && self.director.live_enemies().next().is_none() {
            self.set_state(SessionState::Victory, out);
            return;
        }
        self.tick_auto_start(dt, out);
    }

    fn tick_auto_start(&mut self, dt: Duration, out: &mut Vec<Event>) {
        let (Some(delay), Some(elapsed)) = (self.config.auto_start_delay, self.auto_start_elapsed)
        else {
            return;
        };
        let elapsed = elapsed.saturating_add(dt);
        if elapsed < delay {
            self.auto_start_elapsed = Some(elapsed);
            return;
        }
        self.auto_start_elapsed = None;
        if self.director.start_next_wave(out) {
            debug!(wave = self.director.wave_index(), "wave auto-started");
        }
    }

    fn build_tower(
        &mut self,
        position: Vec2,
        tower: &str,
        out: &mut Vec<Event>,
    ) -> Result<TowerId, BuildError> {
        let template = self.catalog.tower(tower)?;
        let placement = self.builder.validate(
            position,
            &self.level.build_spots,
            &self.level.routes,
            self.towers.as_slice(),
        )?;
        if !self.ledger.spend_coins(template.cost, "build", out) {
            return Err(BuildError::InsufficientCoins {
                needed: template.cost,
                available: self.ledger.coins(),
            });
        }

        let id = self.towers.insert(template, placement);
        info!(tower = id.get(), template = tower, spot = placement.spot, "tower built");
        out.push(Event::TowerBuilt {
            tower: id,
            template: template.id.clone(),
            position: placement.position,
        });
        Ok(id)
    }

    fn sell_tower(&mut self, id: TowerId, out: &mut Vec<Event>) -> Result<(), SellError> {
        let tower = self.towers.get(id).ok_or(SellError::MissingTower(id))?;
        let refund = self.catalog.tower(&tower.template)?.sell_refund();
        let _ = self.towers.remove(id);
        self.ledger.add_coins(refund, "sell", out);
        info!(tower = id.get(), refund, "tower sold");
        out.push(Event::TowerSold { tower: id, refund });
        Ok(())
    }

    fn upgrade_tower(&mut self, id: TowerId, out: &mut Vec<Event>) -> Result<(), UpgradeError> {
        let tower = self.towers.get(id).ok_or(UpgradeError::MissingTower(id))?;
        let template = self.catalog.tower(&tower.template)?;
        let level = tower.level;
        let step = template
            .upgrade_step(level)
            .ok_or(UpgradeError::MaxLevel { level })?;
        if !self.ledger.spend_coins(step.cost, "upgrade", out) {
            return Err(UpgradeError::InsufficientCoins {
                needed: step.cost,
                available: self.ledger.coins(),
            });
        }

        let tower = self
            .towers
            .get_mut(id)
            .ok_or(UpgradeError::MissingTower(id))?;
        tower.level += 1;
        tower.invested = tower.invested.saturating_add(step.cost);
        if let Some(damage) = step.damage {
            tower.damage = damage;
        }
        if let Some(range) = step.range {
            tower.range = range;
        }
        if let Some(interval) = step.attack_interval() {
            tower.attack_interval = interval;
        }
        info!(tower = id.get(), level = tower.level, "tower upgraded");
        out.push(Event::TowerUpgraded {
            tower: id,
            level: tower.level,
        });
        Ok(())
    }

    fn damage_hero(&mut self, amount: u32, out: &mut Vec<Event>) -> Result<(), CommandError> {
        if !self.hero.alive {
            return Err(CommandError::HeroUnavailable);
        }
        if self.hero.take_damage(amount) {
            warn!("hero died");
            out.push(Event::HeroDied);
            self.lose_lives(HERO_DEATH_LIVES, out);
        }
        Ok(())
    }

    fn toggle_pause(&mut self, out: &mut Vec<Event>) {
        match self.state {
            SessionState::Running => {
                self.director.pause();
                self.set_state(SessionState::Paused, out);
            }
            SessionState::Paused => {
                self.director.resume();
                self.set_state(SessionState::Running, out);
            }
            SessionState::GameOver | SessionState::Victory => {}
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Rejected commands leave the world untouched and emit no events.
pub fn apply(
    world: &mut World,
    command: Command,
    out: &mut Vec<Event>,
) -> Result<(), CommandError> {
    if let Command::Tick { dt } = command {
        world.step(dt, out);
        return Ok(());
    }
    if world.state.is_terminal() {
        return Err(CommandError::SessionOver);
    }

    let result = match command {
        Command::Tick { .. } => Ok(()),
        Command::BuildTower { position, tower } => world
            .build_tower(position, &tower, out)
            .map(|_| ())
            .map_err(CommandError::from),
        Command::SellTower { tower } => world.sell_tower(tower, out).map_err(CommandError::from),
        Command::UpgradeTower { tower } => {
            world.upgrade_tower(tower, out).map_err(CommandError::from)
        }
        Command::MoveHero { position } => {
            if world.hero.alive {
                world.hero.move_target = Some(position);
                Ok(())
            } else {
                Err(CommandError::HeroUnavailable)
            }
        }
        Command::DamageHero { amount } => world.damage_hero(amount, out),
        Command::StartNextWave => {
            if world.director.start_next_wave(out) {
                world.auto_start_elapsed = None;
                Ok(())
            } else {
                Err(CommandError::WaveUnavailable)
            }
        }
        Command::TogglePause => {
            world.toggle_pause(out);
            Ok(())
        }
    };

    if let Err(error) = &result {
        warn!(%error, "command rejected");
    }
    result
}

/// Feeds a rendered frame's duration into the fixed-step clock and runs every
/// step that became due. Returns the number of steps executed.
pub fn advance_frame(world: &mut World, frame_dt: Duration, out: &mut Vec<Event>) -> u32 {
    let steps = world.clock.accumulate(frame_dt);
    let fixed_step = world.clock.fixed_step();
    for _ in 0..steps {
        world.step(fixed_step, out);
    }
    steps
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use realm_defence_catalog::LevelDefinition;
    use realm_defence_core::{
        EnemyInstance, HeroState, Projectile, SessionState, TowerId, TowerInstance,
    };
    use realm_defence_system_economy::{LedgerError, LedgerSnapshot};
    use realm_defence_system_waves::WaveProgress;

    use super::World;

    /// Alive enemies in spawn order.
    pub fn enemies(world: &World) -> impl Iterator<Item = &EnemyInstance> {
        world.director.live_enemies()
    }

    /// Standing towers ordered by identifier.
    #[must_use]
    pub fn towers(world: &World) -> &[TowerInstance] {
        world.towers.as_slice()
    }

    /// Looks up a standing tower.
    #[must_use]
    pub fn tower(world: &World, id: TowerId) -> Option<&TowerInstance> {
        world.towers.get(id)
    }

    /// Projectiles in flight.
    #[must_use]
    pub fn projectiles(world: &World) -> &[Projectile] {
        world.combat.projectiles()
    }

    /// The hero.
    #[must_use]
    pub fn hero(world: &World) -> &HeroState {
        &world.hero
    }

    /// Copy of the economy counters.
    #[must_use]
    pub fn ledger(world: &World) -> LedgerSnapshot {
        world.ledger.snapshot()
    }

    /// Fraction of the next level threshold already earned.
    #[must_use]
    pub fn level_progress(world: &World) -> f32 {
        world.ledger.level_progress()
    }

    /// Encodes the economy counters for persistence.
    pub fn save_ledger(world: &World) -> Result<String, LedgerError> {
        world.ledger.save()
    }

    /// Defender lives left.
    #[must_use]
    pub fn lives(world: &World) -> u32 {
        world.lives
    }

    /// Accumulated score.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.combat.score()
    }

    /// Current session state.
    #[must_use]
    pub fn state(world: &World) -> SessionState {
        world.state
    }

    /// Number of waves completed so far.
    #[must_use]
    pub fn wave_index(world: &World) -> usize {
        world.director.wave_index()
    }

    /// Number of waves in the level.
    #[must_use]
    pub fn wave_count(world: &World) -> usize {
        world.director.wave_count()
    }

    /// Reports whether a wave is in progress.
    #[must_use]
    pub fn is_wave_active(world: &World) -> bool {
        world.director.is_wave_active()
    }

    /// Spawn counters of the active wave.
    #[must_use]
    pub fn wave_progress(world: &World) -> Option<WaveProgress> {
        world.director.wave_progress()
    }

    /// Simulated time elapsed while running.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.clock.now()
    }

    /// Ticks processed, including paused ones.
    #[must_use]
    pub fn ticks(world: &World) -> u64 {
        world.clock.ticks()
    }

    /// The level being played.
    #[must_use]
    pub fn level(world: &World) -> &LevelDefinition {
        &world.level
    }

    /// Build spots that would currently accept a tower.
    #[must_use]
    pub fn open_build_spots(world: &World) -> Vec<usize> {
        world.builder.open_spots(
            &world.level.build_spots,
            &world.level.routes,
            world.towers.as_slice(),
        )
    }
}
