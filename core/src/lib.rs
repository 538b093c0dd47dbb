#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Balloon Defence simulation.
//!
//! This crate defines the message surface that connects the host loop, the
//! authoritative balloon world, and pure systems. Hosts and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! that systems and presentation collaborators react to. Nothing outside the
//! world ever holds a balloon directly; collaborators refer to balloons by
//! [`BalloonId`] and tolerate ids that have gone stale.

mod registry;
mod settings;

use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};

pub use registry::{BalloonRegistry, BalloonType, BalloonTypeId, RegistryError};
pub use settings::{BalloonSettings, PatternPreference, SpawnSidePreference};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Balloon Defence.";

/// Describes whether simulated time may advance for timers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PlayMode {
    /// Normal play; deferred spawns count down.
    #[default]
    Running,
    /// Game paused; deferred spawns hold their remaining time.
    Paused,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the tuning used for balloons spawned from now on.
    ConfigureBalloons {
        /// New settings; live balloons keep the values they spawned with.
        settings: BalloonSettings,
    },
    /// Advances the simulation by one frame.
    Tick {
        /// Simulated time elapsed since the previous frame.
        dt: Duration,
        /// Gravity vector for this frame, before the balloon float damping.
        gravity: Vec3,
    },
    /// Requests a new balloon.
    SpawnBalloon {
        /// Type to spawn; unknown ids fall back to the registry default.
        kind: BalloonTypeId,
        /// Explicit spawn point. When absent the balloon enters from an arena
        /// wall after a spawn warning.
        position: Option<Vec3>,
    },
    /// Applies projectile damage to a balloon.
    DamageBalloon {
        /// Balloon hit by the projectile.
        balloon: BalloonId,
        /// Hit points to subtract.
        amount: u32,
    },
    /// Removes every balloon and cancels every pending spawn.
    ClearBalloons,
}

/// Events broadcast after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that a balloon will enter the arena shortly.
    SpawnWarning {
        /// Horizontal screen position of the warning, in percent.
        x_percent: f32,
        /// Vertical screen position of the warning, in percent.
        y_percent: f32,
        /// Type of the balloon about to appear.
        kind: BalloonTypeId,
    },
    /// Confirms that a balloon entered the world.
    BalloonSpawned {
        /// Identifier allocated to the balloon.
        balloon: BalloonId,
        /// Resolved type of the balloon.
        kind: BalloonTypeId,
        /// Position the balloon appeared at.
        position: Vec3,
        /// Movement pattern the balloon follows for its whole life.
        pattern: MovementPattern,
    },
    /// Reports a hit that did not pop the balloon; drives the hit flash.
    BalloonDamaged {
        /// Balloon that was hit.
        balloon: BalloonId,
        /// Health left after the hit.
        health: i64,
        /// Health the balloon spawned with.
        max_health: u32,
    },
    /// Reports that a balloon popped and released its children.
    BalloonPopped {
        /// Balloon that popped.
        balloon: BalloonId,
        /// Type of the popped balloon.
        kind: BalloonTypeId,
        /// Score awarded for the pop.
        points: u32,
        /// Types of the child balloons spawned by the pop, in order.
        children: Vec<BalloonTypeId>,
        /// Position the balloon popped at.
        position: Vec3,
        /// Body color of the popped balloon.
        color: BalloonColor,
    },
    /// Reports that a balloon left the arena and started its death animation.
    BalloonEscaped {
        /// Balloon that escaped.
        balloon: BalloonId,
        /// Type of the escaped balloon.
        kind: BalloonTypeId,
        /// Number of pops lost: the balloon plus every latent descendant.
        escape_value: u32,
    },
    /// Confirms that a balloon no longer exists; presentation resources may be released.
    BalloonRemoved {
        /// Balloon that was removed.
        balloon: BalloonId,
        /// Path that led to the removal.
        reason: RemovalReason,
    },
    /// Announces the start of a wave.
    WaveStarted {
        /// Wave that started.
        wave: WaveNumber,
        /// Label for presentation.
        description: String,
        /// Number of top-level balloons the wave will spawn.
        quota_total: u32,
        /// Sum of recursive values over the whole quota.
        total_value: u32,
    },
    /// Announces that every balloon of a wave was spawned and dealt with.
    WaveCompleted {
        /// Wave that completed.
        wave: WaveNumber,
    },
}

/// Visual appearance applied to a balloon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct BalloonColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl BalloonColor {
    /// Creates a new balloon color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Creates a color from a `0xRRGGBB` value.
    #[must_use]
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            red: ((hex >> 16) & 0xff) as u8,
            green: ((hex >> 8) & 0xff) as u8,
            blue: (hex & 0xff) as u8,
        }
    }

    /// Packs the color into a `0xRRGGBB` value.
    #[must_use]
    pub const fn to_hex(self) -> u32 {
        ((self.red as u32) << 16) | ((self.green as u32) << 8) | self.blue as u32
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

impl From<u32> for BalloonColor {
    fn from(hex: u32) -> Self {
        Self::from_hex(hex)
    }
}

impl From<BalloonColor> for u32 {
    fn from(color: BalloonColor) -> Self {
        color.to_hex()
    }
}

/// Unique identifier assigned to a balloon. Identifiers are never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BalloonId(u32);

impl BalloonId {
    /// Creates a new balloon identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// One-based index of a wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WaveNumber(u32);

impl WaveNumber {
    /// Creates a wave number wrapper.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the underlying wave index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Flight pattern layered on top of a balloon's base velocity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MovementPattern {
    /// Gentle bob.
    Normal,
    /// Square-wave up and down steps.
    Zigzag,
    /// Smooth oscillation with per-balloon amplitude and frequency.
    Sine,
    /// Circular motion in the vertical plane along the flight axis.
    Spiral,
    /// Steady climb.
    Rise,
}

impl MovementPattern {
    /// Every pattern, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Normal,
        Self::Zigzag,
        Self::Sine,
        Self::Spiral,
        Self::Rise,
    ];
}

/// Arena wall a balloon entered from; decides its travel direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpawnSide {
    /// Entered at the left wall, travelling towards +x.
    Left,
    /// Entered at the right wall, travelling towards -x.
    Right,
}

impl SpawnSide {
    /// Sign applied to horizontal speed.
    #[must_use]
    pub const fn direction_sign(self) -> f32 {
        match self {
            Self::Left => 1.0,
            Self::Right => -1.0,
        }
    }

    /// Horizontal screen position, in percent, of the spawn warning for this side.
    #[must_use]
    pub const fn warning_x_percent(self) -> f32 {
        match self {
            Self::Left => 15.0,
            Self::Right => 85.0,
        }
    }
}

/// Lifecycle of a balloon instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// Flying and hittable.
    Alive,
    /// Escaped; playing the death animation before removal.
    Dying,
}

/// Path that removed a balloon from the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RemovalReason {
    /// Popped by damage.
    Popped,
    /// Finished the death animation after escaping.
    Escaped,
    /// Force-removed by a reset.
    Cleared,
}

/// Result of applying damage to a balloon.
#[derive(Clone, Debug, PartialEq)]
pub struct DamageOutcome {
    /// Whether the hit popped the balloon.
    pub popped: bool,
    /// Score awarded; zero unless popped.
    pub points: u32,
    /// Child types spawned by the pop, in order.
    pub spawned_children: Vec<BalloonTypeId>,
    /// Where the balloon popped.
    pub position: Option<Vec3>,
    /// Body color of the popped balloon.
    pub color: Option<BalloonColor>,
}

impl DamageOutcome {
    /// Outcome of a hit that did not pop anything.
    #[must_use]
    pub const fn missed() -> Self {
        Self {
            popped: false,
            points: 0,
            spawned_children: Vec::new(),
            position: None,
            color: None,
        }
    }
}

/// Aggregate balloon counts reported to the wave scheduler and HUD.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PopulationSummary {
    /// Balloons that are alive; dying balloons are excluded.
    pub active: usize,
    /// Spawns still waiting out their warning delay.
    pub pending: usize,
    /// Pops remaining across alive balloons, including latent children.
    pub remaining_value: u32,
}

impl PopulationSummary {
    /// Reports whether nothing is alive and nothing is about to appear.
    #[must_use]
    pub const fn is_clear(&self) -> bool {
        self.active == 0 && self.pending == 0
    }
}

/// Immutable representation of a single balloon's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct BalloonSnapshot {
    /// Unique identifier assigned to the balloon.
    pub id: BalloonId,
    /// Resolved type of the balloon.
    pub kind: BalloonTypeId,
    /// Body color of the balloon.
    pub color: BalloonColor,
    /// Current world position.
    pub position: Vec3,
    /// Current velocity, excluding the pattern contribution.
    pub velocity: Vec3,
    /// Hit radius used for broad-phase tests.
    pub radius: f32,
    /// Remaining health.
    pub health: i64,
    /// Health the balloon spawned with.
    pub max_health: u32,
    /// Movement pattern assigned at spawn.
    pub pattern: MovementPattern,
    /// Alive or dying.
    pub lifecycle: Lifecycle,
    /// Whether the hit flash is showing.
    pub flashing: bool,
    /// Render scale; shrinks during the death animation.
    pub scale: f32,
    /// Spin around the vertical axis, in radians, accumulated while dying.
    pub spin: f32,
}

impl BalloonSnapshot {
    /// Fraction of health left, for health bars.
    #[must_use]
    pub fn health_ratio(&self) -> f32 {
        if self.max_health == 0 {
            return 0.0;
        }
        (self.health.max(0) as f32 / self.max_health as f32).min(1.0)
    }
}

/// Read-only snapshot describing all balloons in the world.
#[derive(Clone, Debug, Default)]
pub struct BalloonView {
    snapshots: Vec<BalloonSnapshot>,
}

impl BalloonView {
    /// Creates a new balloon view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<BalloonSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &BalloonSnapshot> {
        self.snapshots.iter()
    }

    /// Number of captured balloons, dying ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no balloons.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<BalloonSnapshot> {
        self.snapshots
    }
}
