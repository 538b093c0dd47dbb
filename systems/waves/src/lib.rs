#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave scheduler that paces balloon spawns for each wave.
//!
//! The scheduler is a pure system. It resolves wave content, shuffles the
//! quota with a seeded generator, and turns [`Event::TimeAdvanced`] into
//! [`Command::SpawnBalloon`] at the wave's cadence. Wave boundaries are
//! announced with [`Event::WaveStarted`] and [`Event::WaveCompleted`].

mod table;

use std::{collections::VecDeque, time::Duration};

use balloon_defence_core::{
    BalloonRegistry, BalloonTypeId, Command, Event, PlayMode, PopulationSummary, WaveNumber,
};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub use table::{Quota, Wave, AUTHORED_WAVE_COUNT};

/// Delay between the start of a wave and its first spawn.
pub const INITIAL_SPAWN_DELAY: Duration = Duration::from_millis(1000);

/// Configuration parameters required to construct the wave scheduler.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
    initial_delay: Duration,
}

impl Config {
    /// Creates a configuration with the provided shuffle seed.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self {
            rng_seed,
            initial_delay: INITIAL_SPAWN_DELAY,
        }
    }

    /// Overrides the delay before the first spawn of every wave.
    #[must_use]
    pub const fn with_initial_delay(mut self, initial_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self
    }
}

/// Spawn progress of the running wave.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct WaveProgress {
    /// Top-level balloons requested so far.
    pub spawned: u32,
    /// Top-level balloons the wave requests in total.
    pub total: u32,
    /// Balloons currently alive.
    pub remaining: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Spawning,
}

/// Pure system that sequences waves and emits their spawn commands.
#[derive(Debug)]
pub struct WaveScheduler {
    current_wave: WaveNumber,
    phase: Phase,
    queue: VecDeque<BalloonTypeId>,
    quota_total: u32,
    spawned: u32,
    spawn_delay: Duration,
    countdown: Duration,
    initial_delay: Duration,
    rng: ChaCha8Rng,
}

impl WaveScheduler {
    /// Creates an idle scheduler that has not started any wave.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            current_wave: WaveNumber::new(0),
            phase: Phase::Idle,
            queue: VecDeque::new(),
            quota_total: 0,
            spawned: 0,
            spawn_delay: Duration::ZERO,
            countdown: Duration::ZERO,
            initial_delay: config.initial_delay,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Starts the next wave unless one is already running.
    ///
    /// Returns `false` without side effects while a wave is active.
    pub fn start_next_wave(&mut self, registry: &BalloonRegistry, out: &mut Vec<Event>) -> bool {
        if self.phase == Phase::Spawning {
            return false;
        }

        let number = WaveNumber::new(self.current_wave.get().saturating_add(1));
        let wave = Wave::resolve(number, registry);
        let mut queue = wave.expand();
        queue.shuffle(&mut self.rng);

        self.current_wave = number;
        self.phase = Phase::Spawning;
        self.quota_total = wave.quota_total();
        self.spawned = 0;
        self.spawn_delay = wave.spawn_delay();
        self.countdown = self.initial_delay;
        self.queue = queue.into();

        let total_value = wave.total_value(registry);
        log::info!(
            "wave {} started: {} ({} balloons, {total_value} pops)",
            number.get(),
            wave.description(),
            self.quota_total
        );
        out.push(Event::WaveStarted {
            wave: number,
            description: wave.description().to_owned(),
            quota_total: self.quota_total,
            total_value,
        });
        true
    }

    /// Consumes time events and emits spawn commands for the running wave.
    ///
    /// Paused time neither advances nor resets the countdown.
    pub fn handle(&mut self, events: &[Event], play_mode: PlayMode, out: &mut Vec<Command>) {
        if play_mode == PlayMode::Paused || self.phase == Phase::Idle {
            return;
        }

        let mut elapsed = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                elapsed = elapsed.saturating_add(*dt);
            }
        }

        if elapsed.is_zero() {
            return;
        }

        while !self.queue.is_empty() {
            if elapsed < self.countdown {
                self.countdown -= elapsed;
                return;
            }
            elapsed -= self.countdown;

            let Some(kind) = self.queue.pop_front() else {
                break;
            };
            self.spawned += 1;
            self.countdown = self.spawn_delay;
            log::debug!(
                "wave {} spawn {}/{}: {kind}",
                self.current_wave.get(),
                self.spawned,
                self.quota_total
            );
            out.push(Command::SpawnBalloon {
                kind,
                position: None,
            });
        }
    }

    /// Completes the running wave once every balloon was requested and the
    /// arena holds no alive balloons or pending spawns.
    pub fn check_wave_complete(
        &mut self,
        population: PopulationSummary,
        out: &mut Vec<Event>,
    ) -> bool {
        if self.phase != Phase::Spawning
            || self.spawned < self.quota_total
            || !population.is_clear()
        {
            return false;
        }

        self.phase = Phase::Idle;
        log::info!("wave {} completed", self.current_wave.get());
        out.push(Event::WaveCompleted {
            wave: self.current_wave,
        });
        true
    }

    /// Reports spawn progress, or all zeroes while idle.
    #[must_use]
    pub fn progress(&self, population: PopulationSummary) -> WaveProgress {
        if self.phase == Phase::Idle {
            return WaveProgress::default();
        }

        WaveProgress {
            spawned: self.spawned,
            total: self.quota_total,
            remaining: population.active,
        }
    }

    /// Cancels the remaining spawns of the running wave and returns to idle.
    pub fn stop_wave(&mut self) {
        if self.phase == Phase::Spawning {
            log::info!(
                "wave {} stopped with {} spawns outstanding",
                self.current_wave.get(),
                self.queue.len()
            );
        }
        self.queue.clear();
        self.countdown = Duration::ZERO;
        self.phase = Phase::Idle;
    }

    /// Most recently started wave, or zero before the first wave.
    #[must_use]
    pub const fn current_wave(&self) -> WaveNumber {
        self.current_wave
    }

    /// Reports whether a wave is running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.phase == Phase::Spawning
    }

    /// Spawns still queued for the running wave.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_scheduler_ignores_time() {
        let mut scheduler = WaveScheduler::new(Config::new(1));
        let mut commands = Vec::new();
        scheduler.handle(
            &[Event::TimeAdvanced {
                dt: Duration::from_secs(60),
            }],
            PlayMode::Running,
            &mut commands,
        );
        assert!(commands.is_empty());
        assert_eq!(scheduler.current_wave(), WaveNumber::new(0));
    }

    #[test]
    fn completion_requires_an_active_wave() {
        let mut scheduler = WaveScheduler::new(Config::new(1));
        let mut events = Vec::new();
        assert!(!scheduler.check_wave_complete(PopulationSummary::default(), &mut events));
        assert!(events.is_empty());
    }
}
