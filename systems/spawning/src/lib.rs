#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting cube spawn commands.

use std::time::Duration;

use cube_push_core::{Command, Event};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const DEFAULT_MIN_DELAY: Duration = Duration::from_secs(2);
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(4);
const DEFAULT_SEED: u64 = 0x4d59_5df4_d0f3_3173;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    min_delay: Duration,
    max_delay: Duration,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration drawing delays from `[min_delay, max_delay]`.
    ///
    /// Bounds supplied in the wrong order are swapped.
    #[must_use]
    pub fn new(min_delay: Duration, max_delay: Duration, rng_seed: u64) -> Self {
        Self {
            min_delay: min_delay.min(max_delay),
            max_delay: max_delay.max(min_delay),
            rng_seed,
        }
    }

    /// Shortest delay between two cube spawns.
    #[must_use]
    pub const fn min_delay(&self) -> Duration {
        self.min_delay
    }

    /// Longest delay between two cube spawns.
    #[must_use]
    pub const fn max_delay(&self) -> Duration {
        self.max_delay
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_DELAY, DEFAULT_MAX_DELAY, DEFAULT_SEED)
    }
}

/// Pure system that counts down a randomized timer and requests cube spawns.
///
/// The timer only runs between a [`Event::GameLoaded`] and the following
/// [`Event::GameComplete`]. Each expiry emits [`Command::SpawnCube`] followed
/// by [`Command::CheckForLoss`] and draws a fresh delay; leftover time is not
/// carried into the next countdown.
#[derive(Debug)]
pub struct Spawning {
    min_delay: Duration,
    max_delay: Duration,
    remaining: Duration,
    active: bool,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let mut spawning = Self {
            min_delay: config.min_delay,
            max_delay: config.max_delay,
            remaining: Duration::ZERO,
            active: false,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        };
        spawning.remaining = spawning.draw_delay();
        spawning
    }

    /// Time left before the next cube spawn.
    #[must_use]
    pub const fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Reports whether the countdown is running.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Consumes world events and emits spawn commands when the timer expires.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::GameLoaded => {
                    self.active = true;
                    self.remaining = self.draw_delay();
                }
                Event::GameComplete { .. } => {
                    self.active = false;
                }
                Event::TimeAdvanced { dt } if self.active => {
                    self.remaining = self.remaining.saturating_sub(*dt);
                    if self.remaining.is_zero() {
                        self.remaining = self.draw_delay();
                        out.push(Command::SpawnCube);
                        out.push(Command::CheckForLoss);
                    }
                }
                _ => {}
            }
        }
    }

    fn draw_delay(&mut self) -> Duration {
        let min = self.min_delay.as_secs_f32();
        let max = self.max_delay.as_secs_f32();
        let seconds = self.rng.gen_range(min..=max);
        Duration::try_from_secs_f32(seconds).unwrap_or(self.max_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverted_bounds_are_swapped() {
        let config = Config::new(Duration::from_secs(5), Duration::from_secs(1), 7);
        assert_eq!(config.min_delay(), Duration::from_secs(1));
        assert_eq!(config.max_delay(), Duration::from_secs(5));
    }

    #[test]
    fn drawn_delays_stay_within_bounds() {
        let config = Config::new(Duration::from_millis(500), Duration::from_millis(900), 42);
        let mut spawning = Spawning::new(config);
        for _ in 0..64 {
            let delay = spawning.draw_delay();
            assert!(delay >= Duration::from_millis(499), "{delay:?}");
            assert!(delay <= Duration::from_millis(901), "{delay:?}");
        }
    }

    #[test]
    fn fixed_delay_draws_exact_value() {
        let config = Config::new(Duration::from_secs(1), Duration::from_secs(1), 1);
        let spawning = Spawning::new(config);
        assert_eq!(spawning.remaining(), Duration::from_secs(1));
    }
}
