#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative balloon population state for Balloon Defence.
//!
//! The world owns every balloon instance. Mutations arrive as
//! [`Command`] values through [`apply`] (or the typed [`spawn`] and [`damage`]
//! entry points it delegates to) and are reported back as [`Event`] values.
//! Read access goes through the [`query`] module. Invalid references, such as
//! unknown type ids or balloons that were removed earlier in the frame,
//! degrade to a fallback or a no-op rather than an error.

pub mod patterns;

use std::{mem, time::Duration};

use balloon_defence_core::{
    BalloonColor, BalloonId, BalloonRegistry, BalloonSettings, BalloonSnapshot, BalloonType,
    BalloonTypeId, Command, DamageOutcome, Event, Lifecycle, MovementPattern, RemovalReason,
    SpawnSide,
};
use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::patterns::{pattern_velocity, PatternState};

/// Delay between a spawn warning and the balloon entering the arena.
pub const SPAWN_WARNING_DELAY: Duration = Duration::from_millis(1500);
/// Duration of the cosmetic flash after a non-lethal hit.
pub const HIT_FLASH_DURATION: Duration = Duration::from_millis(100);
/// Balloons below this height have escaped through the floor.
pub const ESCAPE_FLOOR_Y: f32 = -0.5;
/// Balloons further than this from the arena centre along x have escaped through a wall.
pub const ESCAPE_SIDE_X: f32 = 6.0;

const DEFAULT_RNG_SEED: u64 = 0x42f0_e1eb_d4a5_3c21;

const LANE_HEIGHTS: [f32; 2] = [2.0, 4.5];
const LANE_JITTER: f32 = 0.3;
const ENTRY_X: f32 = 5.0;
const ENTRY_Z: f32 = -10.0;
const WARNING_Y_PERCENT: f32 = 50.0;

const INITIAL_LIFT: f32 = 0.1;
const GRAVITY_DAMPING: f32 = 0.05;
const BASE_RADIUS: f32 = 1.3;
const CHILD_SPACING: f32 = 0.5;

const DEATH_RISE_SPEED: f32 = 5.0;
const DEATH_SPIN_SPEED: f32 = 10.0;
const DEATH_SHRINK_PER_FRAME: f32 = 0.95;
const DEATH_REFERENCE_FPS: f32 = 60.0;
const DEATH_REMOVAL_SCALE: f32 = 0.1;

/// Represents the authoritative balloon population.
#[derive(Debug)]
pub struct World {
    registry: BalloonRegistry,
    settings: BalloonSettings,
    rng: ChaCha8Rng,
    balloons: Vec<Balloon>,
    pending: Vec<PendingSpawn>,
    next_balloon_id: u32,
}

impl World {
    /// Creates an empty world backed by the provided registry and settings.
    ///
    /// `rng_seed` drives spawn sides, lane jitter, random patterns and
    /// pattern phases.
    #[must_use]
    pub fn new(registry: BalloonRegistry, settings: BalloonSettings, rng_seed: u64) -> Self {
        Self {
            registry,
            settings,
            rng: ChaCha8Rng::seed_from_u64(rng_seed),
            balloons: Vec::new(),
            pending: Vec::new(),
            next_balloon_id: 0,
        }
    }

    fn allocate_id(&mut self) -> BalloonId {
        let id = BalloonId::new(self.next_balloon_id);
        self.next_balloon_id = self.next_balloon_id.wrapping_add(1);
        id
    }

    fn balloon_index(&self, balloon: BalloonId) -> Option<usize> {
        self.balloons.iter().position(|candidate| candidate.id == balloon)
    }

    fn choose_side(&mut self) -> SpawnSide {
        match self.settings.spawn_side.fixed() {
            Some(side) => side,
            None if self.rng.gen_bool(0.5) => SpawnSide::Left,
            None => SpawnSide::Right,
        }
    }

    fn choose_pattern(&mut self) -> MovementPattern {
        match self.settings.movement_pattern.fixed() {
            Some(pattern) => pattern,
            None => MovementPattern::ALL[self.rng.gen_range(0..MovementPattern::ALL.len())],
        }
    }

    fn choose_lane(&mut self) -> f32 {
        let lane = LANE_HEIGHTS[self.rng.gen_range(0..LANE_HEIGHTS.len())];
        lane + (self.rng.gen::<f32>() - 0.5) * LANE_JITTER
    }

    fn materialize(
        &mut self,
        kind: &BalloonTypeId,
        position: Vec3,
        side: SpawnSide,
        pattern: MovementPattern,
        out_events: &mut Vec<Event>,
    ) -> BalloonId {
        let balloon_type = self.registry.resolve(kind);
        let kind = balloon_type.id().clone();
        let color = balloon_type.color();
        let max_health = balloon_type.base_health().get();
        let speed =
            self.settings.base_speed * balloon_type.speed_multiplier() * side.direction_sign();
        let radius = BASE_RADIUS * self.settings.balloon_size;
        let pattern_state = PatternState::randomized(&mut self.rng);
        let id = self.allocate_id();

        log::debug!(
            "balloon {} ({kind}) entered at {position} with {pattern:?}",
            id.get()
        );
        out_events.push(Event::BalloonSpawned {
            balloon: id,
            kind: kind.clone(),
            position,
            pattern,
        });
        self.balloons.push(Balloon {
            id,
            kind,
            color,
            position,
            velocity: Vec3::new(speed, INITIAL_LIFT, 0.0),
            radius,
            health: i64::from(max_health),
            max_health,
            pattern,
            pattern_state,
            lifecycle: Lifecycle::Alive,
            side,
            flash_remaining: Duration::ZERO,
            scale: 1.0,
            spin: 0.0,
        });
        id
    }

    fn advance_balloons(&mut self, dt: Duration, gravity: Vec3, out_events: &mut Vec<Event>) {
        let seconds = dt.as_secs_f32();
        let shrink = DEATH_SHRINK_PER_FRAME.powf(seconds * DEATH_REFERENCE_FPS);
        let mut finished: Vec<BalloonId> = Vec::new();

        for balloon in &mut self.balloons {
            match balloon.lifecycle {
                Lifecycle::Dying => {
                    balloon.position.y += DEATH_RISE_SPEED * seconds;
                    balloon.scale *= shrink;
                    balloon.spin += DEATH_SPIN_SPEED * seconds;
                    if balloon.scale < DEATH_REMOVAL_SCALE {
                        finished.push(balloon.id);
                    }
                }
                Lifecycle::Alive => {
                    balloon.flash_remaining = balloon.flash_remaining.saturating_sub(dt);
                    balloon.velocity += gravity * GRAVITY_DAMPING * seconds;
                    balloon.pattern_state.advance(seconds);
                    let drift = pattern_velocity(balloon.pattern, &balloon.pattern_state);
                    balloon.position += (balloon.velocity + drift) * seconds;

                    if has_escaped(balloon.position) {
                        balloon.lifecycle = Lifecycle::Dying;
                        let escape_value = self.registry.recursive_value(&balloon.kind);
                        log::debug!(
                            "balloon {} ({}) escaped at {}, worth {escape_value}",
                            balloon.id.get(),
                            balloon.kind,
                            balloon.position
                        );
                        out_events.push(Event::BalloonEscaped {
                            balloon: balloon.id,
                            kind: balloon.kind.clone(),
                            escape_value,
                        });
                    }
                }
            }
        }

        if finished.is_empty() {
            return;
        }

        self.balloons.retain(|balloon| !finished.contains(&balloon.id));
        for balloon in finished {
            out_events.push(Event::BalloonRemoved {
                balloon,
                reason: RemovalReason::Escaped,
            });
        }
    }

    fn advance_pending(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if self.pending.is_empty() {
            return;
        }

        for pending in &mut self.pending {
            pending.remaining = pending.remaining.saturating_sub(dt);
        }

        let (ready, waiting): (Vec<_>, Vec<_>) = mem::take(&mut self.pending)
            .into_iter()
            .partition(|pending| pending.remaining.is_zero());
        self.pending = waiting;

        for spawn in ready {
            let pattern = self.choose_pattern();
            let position = Vec3::new(entry_x(spawn.side), spawn.height, ENTRY_Z);
            let _ = self.materialize(&spawn.kind, position, spawn.side, pattern, out_events);
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(
            BalloonRegistry::classic(),
            BalloonSettings::default(),
            DEFAULT_RNG_SEED,
        )
    }
}

/// Applies the provided command to the world.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureBalloons { settings } => {
            log::debug!("balloon settings updated: {settings:?}");
            world.settings = settings;
        }
        Command::Tick { dt, gravity } => {
            out_events.push(Event::TimeAdvanced { dt });
            world.advance_balloons(dt, gravity, out_events);
            world.advance_pending(dt, out_events);
        }
        Command::SpawnBalloon { kind, position } => {
            let _ = spawn(world, &kind, position, out_events);
        }
        Command::DamageBalloon { balloon, amount } => {
            let _ = damage(world, balloon, amount, out_events);
        }
        Command::ClearBalloons => {
            let cancelled = world.pending.len();
            world.pending.clear();
            let removed = world.balloons.len();
            for balloon in world.balloons.drain(..) {
                out_events.push(Event::BalloonRemoved {
                    balloon: balloon.id,
                    reason: RemovalReason::Cleared,
                });
            }
            log::debug!("cleared {removed} balloons and {cancelled} pending spawns");
        }
    }
}

/// Requests a balloon of type `kind` and returns the resolved type.
///
/// With an explicit `position` the balloon appears immediately, flying the
/// normal pattern. Otherwise a spawn warning is emitted and the balloon enters
/// from an arena wall once [`SPAWN_WARNING_DELAY`] of simulated time has
/// passed.
pub fn spawn(
    world: &mut World,
    kind: &BalloonTypeId,
    position: Option<Vec3>,
    out_events: &mut Vec<Event>,
) -> BalloonType {
    let balloon_type = world.registry.resolve(kind).clone();
    if !world.registry.contains(kind) {
        log::warn!(
            "unknown balloon type `{kind}`, spawning `{}` instead",
            balloon_type.id()
        );
    }

    let side = world.choose_side();
    match position {
        Some(position) => {
            let _ = world.materialize(
                balloon_type.id(),
                position,
                side,
                MovementPattern::Normal,
                out_events,
            );
        }
        None => {
            let height = world.choose_lane();
            out_events.push(Event::SpawnWarning {
                x_percent: side.warning_x_percent(),
                y_percent: WARNING_Y_PERCENT,
                kind: balloon_type.id().clone(),
            });
            world.pending.push(PendingSpawn {
                kind: balloon_type.id().clone(),
                side,
                height,
                remaining: SPAWN_WARNING_DELAY,
            });
        }
    }

    balloon_type
}

/// Subtracts `amount` health from a balloon, popping it when health runs out.
///
/// Popping removes the balloon immediately and spawns its children around
/// the pop position, travelling the same way as the parent. Hits against
/// balloons that no longer exist or are already dying report an unpopped
/// outcome and change nothing.
pub fn damage(
    world: &mut World,
    balloon: BalloonId,
    amount: u32,
    out_events: &mut Vec<Event>,
) -> DamageOutcome {
    let Some(index) = world.balloon_index(balloon) else {
        return DamageOutcome::missed();
    };

    let target = &mut world.balloons[index];
    if target.lifecycle == Lifecycle::Dying {
        return DamageOutcome::missed();
    }

    target.health -= i64::from(amount);
    if target.health > 0 {
        target.flash_remaining = HIT_FLASH_DURATION;
        out_events.push(Event::BalloonDamaged {
            balloon,
            health: target.health,
            max_health: target.max_health,
        });
        return DamageOutcome::missed();
    }

    let popped = world.balloons.remove(index);
    let balloon_type = world.registry.resolve(&popped.kind);
    let points = balloon_type.point_value();
    let children = balloon_type.children().to_vec();

    log::debug!(
        "balloon {} ({}) popped for {points} points",
        popped.id.get(),
        popped.kind
    );
    out_events.push(Event::BalloonPopped {
        balloon,
        kind: popped.kind.clone(),
        points,
        children: children.clone(),
        position: popped.position,
        color: popped.color,
    });
    out_events.push(Event::BalloonRemoved {
        balloon,
        reason: RemovalReason::Popped,
    });

    let centre = (children.len() as f32 - 1.0) / 2.0;
    for (slot, child) in children.iter().enumerate() {
        let offset = Vec3::new((slot as f32 - centre) * CHILD_SPACING, 0.0, 0.0);
        let _ = world.materialize(
            child,
            popped.position + offset,
            popped.side,
            MovementPattern::Normal,
            out_events,
        );
    }

    DamageOutcome {
        popped: true,
        points,
        spawned_children: children,
        position: Some(popped.position),
        color: Some(popped.color),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use balloon_defence_core::{
        BalloonId, BalloonRegistry, BalloonSettings, BalloonSnapshot, BalloonView, Lifecycle,
        PopulationSummary,
    };
    use glam::Vec3;

    use super::World;

    /// Counts alive balloons. Dying balloons are already accounted for.
    #[must_use]
    pub fn active_count(world: &World) -> usize {
        world
            .balloons
            .iter()
            .filter(|balloon| balloon.lifecycle == Lifecycle::Alive)
            .count()
    }

    /// Sums the recursive value of every alive balloon: the pops still needed
    /// to clear the arena, latent children included. Saturates at `u32::MAX`.
    #[must_use]
    pub fn total_remaining_value(world: &World) -> u32 {
        world
            .balloons
            .iter()
            .filter(|balloon| balloon.lifecycle == Lifecycle::Alive)
            .map(|balloon| world.registry.recursive_value(&balloon.kind))
            .fold(0, u32::saturating_add)
    }

    /// Counts spawns still waiting out their warning delay.
    #[must_use]
    pub fn pending_spawn_count(world: &World) -> usize {
        world.pending.len()
    }

    /// Aggregates the counts used by the wave scheduler and HUD.
    #[must_use]
    pub fn population(world: &World) -> PopulationSummary {
        PopulationSummary {
            active: active_count(world),
            pending: pending_spawn_count(world),
            remaining_value: total_remaining_value(world),
        }
    }

    /// Captures a read-only view of every balloon, dying ones included.
    #[must_use]
    pub fn balloon_view(world: &World) -> BalloonView {
        BalloonView::from_snapshots(
            world
                .balloons
                .iter()
                .map(|balloon| balloon.snapshot())
                .collect(),
        )
    }

    /// Captures a single balloon, if it still exists.
    #[must_use]
    pub fn balloon(world: &World, balloon: BalloonId) -> Option<BalloonSnapshot> {
        world
            .balloons
            .iter()
            .find(|candidate| candidate.id == balloon)
            .map(|candidate| candidate.snapshot())
    }

    /// Finds the nearest alive balloon overlapping a sphere at `point`.
    #[must_use]
    pub fn hit_test(world: &World, point: Vec3, radius: f32) -> Option<BalloonId> {
        world
            .balloons
            .iter()
            .filter(|balloon| balloon.lifecycle == Lifecycle::Alive)
            .map(|balloon| (balloon.id, balloon.position.distance(point), balloon.radius))
            .filter(|(_, distance, reach)| *distance < reach + radius)
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
            .map(|(id, _, _)| id)
    }

    /// Provides read-only access to the balloon type registry.
    #[must_use]
    pub fn registry(world: &World) -> &BalloonRegistry {
        &world.registry
    }

    /// Provides read-only access to the settings applied to new spawns.
    #[must_use]
    pub fn settings(world: &World) -> &BalloonSettings {
        &world.settings
    }
}

#[derive(Clone, Debug)]
struct Balloon {
    id: BalloonId,
    kind: BalloonTypeId,
    color: BalloonColor,
    position: Vec3,
    velocity: Vec3,
    radius: f32,
    health: i64,
    max_health: u32,
    pattern: MovementPattern,
    pattern_state: PatternState,
    lifecycle: Lifecycle,
    side: SpawnSide,
    flash_remaining: Duration,
    scale: f32,
    spin: f32,
}

impl Balloon {
    fn snapshot(&self) -> BalloonSnapshot {
        BalloonSnapshot {
            id: self.id,
            kind: self.kind.clone(),
            color: self.color,
            position: self.position,
            velocity: self.velocity,
            radius: self.radius,
            health: self.health,
            max_health: self.max_health,
            pattern: self.pattern,
            lifecycle: self.lifecycle,
            flashing: !self.flash_remaining.is_zero(),
            scale: self.scale,
            spin: self.spin,
        }
    }
}

#[derive(Clone, Debug)]
struct PendingSpawn {
    kind: BalloonTypeId,
    side: SpawnSide,
    height: f32,
    remaining: Duration,
}

fn entry_x(side: SpawnSide) -> f32 {
    -side.direction_sign() * ENTRY_X
}

fn has_escaped(position: Vec3) -> bool {
    position.y < ESCAPE_FLOOR_Y || position.x.abs() > ESCAPE_SIDE_X
}
