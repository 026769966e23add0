#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Coin and experience ledger gating every player purchase.
//!
//! Experience is cumulative. Each time it reaches the current threshold the
//! level increments and the threshold grows by the configured factor, so the
//! threshold sequence for the default configuration is 100, 150, 225, 337...
//! Level progress is measured between the threshold that was last crossed and
//! the next one.

use realm_defence_core::Event;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Configuration parameters for the ledger.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    starting_coins: u32,
    first_threshold: u32,
    growth: f64,
}

impl Config {
    /// Creates a configuration with the provided starting balance, first
    /// level threshold and threshold growth factor.
    #[must_use]
    pub const fn new(starting_coins: u32, first_threshold: u32, growth: f64) -> Self {
        Self {
            starting_coins,
            first_threshold,
            growth,
        }
    }

    /// Returns a copy of the configuration with a different starting balance.
    #[must_use]
    pub const fn with_starting_coins(mut self, starting_coins: u32) -> Self {
        self.starting_coins = starting_coins;
        self
    }

    /// Coins held after construction or reset.
    #[must_use]
    pub const fn starting_coins(&self) -> u32 {
        self.starting_coins
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(100, 100, 1.5)
    }
}

/// Serializable copy of the ledger counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerSnapshot {
    /// Coin balance.
    pub coins: u32,
    /// Cumulative experience.
    pub experience: u32,
    /// Current level.
    pub level: u32,
    /// Experience required to reach the next level.
    pub experience_to_next_level: u32,
    /// Threshold crossed to reach the current level, zero at level 1.
    pub experience_at_current_level: u32,
}

impl Default for LedgerSnapshot {
    fn default() -> Self {
        let config = Config::default();
        Self {
            coins: config.starting_coins,
            experience: 0,
            level: 1,
            experience_to_next_level: config.first_threshold,
            experience_at_current_level: 0,
        }
    }
}

/// Failures raised while persisting or restoring the ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The counters could not be encoded.
    #[error("failed to encode ledger: {0}")]
    Encode(#[source] serde_json::Error),
    /// The saved text is not a valid ledger document.
    #[error("failed to decode ledger: {0}")]
    Decode(#[source] serde_json::Error),
    /// The saved counters describe an impossible state.
    #[error("saved ledger has level {level} with threshold {threshold}")]
    InvalidLevel {
        /// Saved level.
        level: u32,
        /// Saved threshold.
        threshold: u32,
    },
    /// The saved level start does not lie below the next threshold.
    #[error("saved ledger starts its level at {floor} but the next threshold is {threshold}")]
    InvalidProgress {
        /// Saved experience at the start of the level.
        floor: u32,
        /// Saved threshold.
        threshold: u32,
    },
}

/// Authoritative coin, experience and level counters.
#[derive(Clone, Debug)]
pub struct EconomyLedger {
    config: Config,
    coins: u32,
    experience: u32,
    level: u32,
    threshold: u32,
    floor: u32,
}

impl EconomyLedger {
    /// Creates a ledger holding the configured starting balance at level 1.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            coins: config.starting_coins,
            experience: 0,
            level: 1,
            threshold: config.first_threshold.max(1),
            floor: 0,
        }
    }

    /// Current coin balance.
    #[must_use]
    pub const fn coins(&self) -> u32 {
        self.coins
    }

    /// Cumulative experience.
    #[must_use]
    pub const fn experience(&self) -> u32 {
        self.experience
    }

    /// Current level.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Experience required to reach the next level.
    #[must_use]
    pub const fn experience_to_next_level(&self) -> u32 {
        self.threshold
    }

    /// Reports whether the balance covers `amount`.
    #[must_use]
    pub const fn has_enough_coins(&self, amount: u32) -> bool {
        self.coins >= amount
    }

    /// Fraction of the current level already earned, in `[0, 1]`.
    ///
    /// Zero right after a level up and one just before the next.
    #[must_use]
    pub fn level_progress(&self) -> f32 {
        let span = self.threshold.saturating_sub(self.floor);
        if span == 0 {
            return 1.0;
        }
        let earned = self.experience.saturating_sub(self.floor);
        (earned as f32 / span as f32).clamp(0.0, 1.0)
    }

    /// Adds coins and reports the new balance.
    pub fn add_coins(&mut self, amount: u32, source: &str, out: &mut Vec<Event>) {
        if amount == 0 {
            return;
        }
        self.coins = self.coins.saturating_add(amount);
        out.push(Event::CoinsChanged {
            total: self.coins,
            delta: i64::from(amount),
            reason: source.to_owned(),
        });
    }

    /// Deducts `amount` if the balance covers it.
    ///
    /// Returns `false` and leaves the balance untouched otherwise.
    pub fn spend_coins(&mut self, amount: u32, purpose: &str, out: &mut Vec<Event>) -> bool {
        if !self.has_enough_coins(amount) {
            warn!(
                amount,
                available = self.coins,
                purpose,
                "spend rejected: insufficient coins"
            );
            return false;
        }
        if amount == 0 {
            return true;
        }
        self.coins -= amount;
        out.push(Event::CoinsChanged {
            total: self.coins,
            delta: -i64::from(amount),
            reason: purpose.to_owned(),
        });
        true
    }

    /// Adds experience, promoting the level as many times as the new total
    /// allows. Returns the number of levels gained.
    pub fn add_experience(&mut self, amount: u32, source: &str, out: &mut Vec<Event>) -> u32 {
        if amount == 0 {
            return 0;
        }
        self.experience = self.experience.saturating_add(amount);

        let mut gained = 0;
        while self.experience >= self.threshold {
            let previous_threshold = self.threshold;
            self.floor = previous_threshold;
            self.level = self.level.saturating_add(1);
            self.threshold = self.next_threshold(previous_threshold);
            gained += 1;
            debug!(
                level = self.level,
                next_threshold = self.threshold,
                "ledger level up"
            );
            out.push(Event::LevelUp {
                level: self.level,
                previous_threshold,
                next_threshold: self.threshold,
            });
        }

        out.push(Event::ExperienceChanged {
            total: self.experience,
            delta: amount,
            source: source.to_owned(),
        });
        gained
    }

    /// Restores the counters of a fresh ledger.
    pub fn reset(&mut self) {
        *self = Self::new(self.config);
    }

    /// Copies the counters into a serializable snapshot.
    #[must_use]
    pub const fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            coins: self.coins,
            experience: self.experience,
            level: self.level,
            experience_to_next_level: self.threshold,
            experience_at_current_level: self.floor,
        }
    }

    /// Encodes the counters as JSON.
    pub fn save(&self) -> Result<String, LedgerError> {
        serde_json::to_string(&self.snapshot()).map_err(LedgerError::Encode)
    }

    /// Restores counters previously produced by [`EconomyLedger::save`].
    ///
    /// Missing fields take their default values. The ledger is untouched when
    /// the document is rejected.
    pub fn load(&mut self, saved: &str) -> Result<(), LedgerError> {
        let snapshot: LedgerSnapshot = serde_json::from_str(saved).map_err(LedgerError::Decode)?;
        if snapshot.level == 0 || snapshot.experience_to_next_level == 0 {
            return Err(LedgerError::InvalidLevel {
                level: snapshot.level,
                threshold: snapshot.experience_to_next_level,
            });
        }
        if snapshot.experience_at_current_level >= snapshot.experience_to_next_level {
            return Err(LedgerError::InvalidProgress {
                floor: snapshot.experience_at_current_level,
                threshold: snapshot.experience_to_next_level,
            });
        }
        self.coins = snapshot.coins;
        self.experience = snapshot.experience;
        self.level = snapshot.level;
        self.threshold = snapshot.experience_to_next_level;
        self.floor = snapshot.experience_at_current_level;
        Ok(())
    }

    fn next_threshold(&self, threshold: u32) -> u32 {
        let grown = (f64::from(threshold) * self.config.growth).floor() as u32;
        grown.max(threshold.saturating_add(1))
    }
}

impl Default for EconomyLedger {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
