//! Headless play session: drives the world and wave scheduler frame by frame
//! and keeps score the way a game front end would.

use std::time::Duration;

use balloon_defence_core::{
    BalloonRegistry, BalloonSettings, Command, Event, Lifecycle, PlayMode, WaveNumber,
};
use balloon_defence_system_waves::{Config, WaveScheduler};
use balloon_defence_world::{self as world, query, World};
use glam::Vec3;

/// Lives a session starts with.
pub(crate) const DEFAULT_LIVES: u32 = 100;

const TURRET_INTERVAL: Duration = Duration::from_millis(300);
const TURRET_DAMAGE: u32 = 1;
const TURRET_POSITION: Vec3 = Vec3::new(0.0, 1.6, 0.0);

/// Hand-gun stand-in that shoots the nearest alive balloon at a fixed cadence.
#[derive(Debug)]
struct Turret {
    cooldown: Duration,
}

impl Turret {
    fn new() -> Self {
        Self {
            cooldown: TURRET_INTERVAL,
        }
    }

    fn handle(&mut self, world: &World, dt: Duration, out: &mut Vec<Command>) {
        self.cooldown = self.cooldown.saturating_sub(dt);
        if !self.cooldown.is_zero() {
            return;
        }

        let target = query::balloon_view(world)
            .iter()
            .filter(|snapshot| snapshot.lifecycle == Lifecycle::Alive)
            .min_by(|a, b| {
                a.position
                    .distance_squared(TURRET_POSITION)
                    .total_cmp(&b.position.distance_squared(TURRET_POSITION))
            })
            .map(|snapshot| snapshot.id);

        if let Some(balloon) = target {
            self.cooldown = TURRET_INTERVAL;
            out.push(Command::DamageBalloon {
                balloon,
                amount: TURRET_DAMAGE,
            });
        }
    }
}

/// Outcome of playing a single wave.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct WaveReport {
    pub(crate) wave: WaveNumber,
    pub(crate) description: String,
    pub(crate) completed: bool,
    pub(crate) pops: u32,
    pub(crate) escapes: u32,
    pub(crate) lives_lost: u32,
}

/// Score keeping and host loop around a world and its wave scheduler.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    scheduler: WaveScheduler,
    registry: BalloonRegistry,
    turret: Option<Turret>,
    lives: u32,
    score: u64,
    pops: u32,
    escapes: u32,
}

impl Session {
    pub(crate) fn new(
        registry: BalloonRegistry,
        settings: BalloonSettings,
        seed: u64,
        lives: u32,
    ) -> Self {
        Self {
            world: World::new(registry.clone(), settings, seed),
            scheduler: WaveScheduler::new(Config::new(seed.rotate_left(17))),
            registry,
            turret: Some(Turret::new()),
            lives,
            score: 0,
            pops: 0,
            escapes: 0,
        }
    }

    /// Removes the automatic turret so balloons are never shot.
    #[cfg(test)]
    pub(crate) fn without_turret(mut self) -> Self {
        self.turret = None;
        self
    }

    pub(crate) const fn lives(&self) -> u32 {
        self.lives
    }

    pub(crate) const fn score(&self) -> u64 {
        self.score
    }

    pub(crate) const fn is_game_over(&self) -> bool {
        self.lives == 0
    }

    /// Plays the next wave until it completes, the game ends or `max_duration`
    /// of simulated time has passed.
    pub(crate) fn play_wave(&mut self, frame: Duration, max_duration: Duration) -> WaveReport {
        let pops_before = self.pops;
        let escapes_before = self.escapes;
        let lives_before = self.lives;

        let mut notices = Vec::new();
        let _ = self.scheduler.start_next_wave(&self.registry, &mut notices);
        let (wave, description) = notices
            .iter()
            .find_map(|event| match event {
                Event::WaveStarted {
                    wave, description, ..
                } => Some((*wave, description.clone())),
                _ => None,
            })
            .unwrap_or_else(|| (self.scheduler.current_wave(), String::new()));

        let mut elapsed = Duration::ZERO;
        let mut completed = false;
        while elapsed < max_duration && !self.is_game_over() {
            self.step(frame);
            elapsed += frame;
            if self
                .scheduler
                .check_wave_complete(query::population(&self.world), &mut notices)
            {
                completed = true;
                break;
            }
        }

        if !completed {
            self.scheduler.stop_wave();
            let mut events = Vec::new();
            world::apply(&mut self.world, Command::ClearBalloons, &mut events);
        }

        WaveReport {
            wave,
            description,
            completed,
            pops: self.pops - pops_before,
            escapes: self.escapes - escapes_before,
            lives_lost: lives_before - self.lives,
        }
    }

    /// Advances one frame: world tick, scheduled spawns, turret fire, scoring.
    fn step(&mut self, dt: Duration) {
        let gravity = Vec3::new(0.0, query::settings(&self.world).gravity, 0.0);
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::Tick { dt, gravity }, &mut events);

        let mut commands = Vec::new();
        self.scheduler.handle(&events, PlayMode::Running, &mut commands);
        if let Some(turret) = self.turret.as_mut() {
            turret.handle(&self.world, dt, &mut commands);
        }
        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }

        self.record(&events);
    }

    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::BalloonPopped { points, .. } => {
                    self.pops += 1;
                    self.score += u64::from(*points);
                }
                Event::BalloonEscaped { escape_value, .. } => {
                    self.escapes += 1;
                    self.lives = self.lives.saturating_sub(*escape_value);
                    if self.lives == 0 {
                        log::warn!("out of lives");
                    }
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use balloon_defence_core::{BalloonTypeId, PatternPreference, SpawnSidePreference};

    const FRAME: Duration = Duration::from_millis(16);
    const BUDGET: Duration = Duration::from_secs(120);

    #[test]
    fn turret_clears_the_first_wave() {
        let mut session = Session::new(
            BalloonRegistry::classic(),
            BalloonSettings::default(),
            3,
            DEFAULT_LIVES,
        );
        let report = session.play_wave(FRAME, BUDGET);

        assert!(report.completed);
        assert_eq!(report.wave, WaveNumber::new(1));
        assert_eq!(report.description, "Red Balloons");
        assert_eq!(report.pops + report.escapes, 10);
        assert!(report.pops > 0, "turret never hit anything");
        assert_eq!(session.score(), u64::from(report.pops) * 10);
        assert_eq!(session.lives(), DEFAULT_LIVES - report.escapes);
    }

    #[test]
    fn escapes_cost_recursive_value_and_end_the_game() {
        let settings = BalloonSettings {
            spawn_side: SpawnSidePreference::Left,
            movement_pattern: PatternPreference::Normal,
            ..BalloonSettings::default()
        };
        let mut session =
            Session::new(BalloonRegistry::classic(), settings, 9, 5).without_turret();

        let first = session.play_wave(FRAME, BUDGET);
        assert!(!first.completed, "five lives cannot absorb ten reds");
        assert_eq!(first.pops, 0);
        assert!(first.escapes >= 5);
        assert_eq!(first.lives_lost, 5);
        assert!(session.is_game_over());
        assert_eq!(session.score(), 0);
        assert!(query::population(&session.world).is_clear());
    }

    #[test]
    fn gravity_follows_reconfigured_settings() {
        let mut session = Session::new(
            BalloonRegistry::classic(),
            BalloonSettings::default(),
            4,
            DEFAULT_LIVES,
        )
        .without_turret();
        let mut events = Vec::new();
        let weightless = BalloonSettings {
            gravity: 0.0,
            ..BalloonSettings::default()
        };
        world::apply(
            &mut session.world,
            Command::ConfigureBalloons {
                settings: weightless,
            },
            &mut events,
        );
        world::apply(
            &mut session.world,
            Command::SpawnBalloon {
                kind: BalloonTypeId::RED,
                position: Some(Vec3::new(0.0, 3.0, -10.0)),
            },
            &mut events,
        );

        for _ in 0..10 {
            session.step(FRAME);
        }

        let snapshot = query::balloon_view(&session.world)
            .into_vec()
            .pop()
            .expect("balloon still in the arena");
        assert_eq!(snapshot.velocity.y, 0.1, "no gravity should accumulate");
    }
}
