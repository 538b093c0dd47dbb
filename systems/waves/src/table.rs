//! Wave content: ten hand-authored waves followed by a procedural ramp.

use std::time::Duration;

use balloon_defence_core::{BalloonRegistry, BalloonTypeId, WaveNumber};

/// Number of waves with hand-authored content.
pub const AUTHORED_WAVE_COUNT: u32 = 10;

const MIN_PROCEDURAL_DELAY_MS: u64 = 400;
const BASE_PROCEDURAL_DELAY_MS: u64 = 800;
const PROCEDURAL_DELAY_STEP_MS: u64 = 30;
const PROCEDURAL_BASE_COUNT: u32 = 10;
const PROCEDURAL_COUNT_STEP: u32 = 5;
const PROCEDURAL_BASE_TYPE_INDEX: u32 = 6;

struct AuthoredWave {
    quota: &'static [(&'static str, u32)],
    spawn_delay_ms: u64,
    description: &'static str,
}

const AUTHORED_WAVES: [AuthoredWave; AUTHORED_WAVE_COUNT as usize] = [
    AuthoredWave {
        quota: &[("RED", 10)],
        spawn_delay_ms: 1500,
        description: "Red Balloons",
    },
    AuthoredWave {
        quota: &[("RED", 10), ("BLUE", 5)],
        spawn_delay_ms: 1300,
        description: "Blue Balloons",
    },
    AuthoredWave {
        quota: &[("BLUE", 7), ("GREEN", 5)],
        spawn_delay_ms: 1200,
        description: "Green Balloons",
    },
    AuthoredWave {
        quota: &[("GREEN", 10), ("YELLOW", 5)],
        spawn_delay_ms: 1000,
        description: "Yellow Balloons",
    },
    AuthoredWave {
        quota: &[("YELLOW", 10), ("PINK", 5)],
        spawn_delay_ms: 900,
        description: "Pink Balloons",
    },
    AuthoredWave {
        quota: &[("PINK", 10), ("BLACK", 3)],
        spawn_delay_ms: 1000,
        description: "Black Balloons",
    },
    AuthoredWave {
        quota: &[("GREEN", 15), ("PINK", 8), ("BLACK", 5)],
        spawn_delay_ms: 800,
        description: "Mixed Wave",
    },
    AuthoredWave {
        quota: &[("YELLOW", 15), ("BLACK", 5), ("WHITE", 5)],
        spawn_delay_ms: 800,
        description: "White Balloons",
    },
    AuthoredWave {
        quota: &[("PINK", 10), ("BLACK", 5), ("WHITE", 3)],
        spawn_delay_ms: 700,
        description: "Heavy Assault",
    },
    AuthoredWave {
        quota: &[("BLACK", 6), ("WHITE", 6), ("LEAD", 3)],
        spawn_delay_ms: 800,
        description: "Lead Balloons!",
    },
];

/// Number of balloons of one type spawned by a wave.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Quota {
    kind: BalloonTypeId,
    count: u32,
}

impl Quota {
    /// Creates a quota entry.
    #[must_use]
    pub const fn new(kind: BalloonTypeId, count: u32) -> Self {
        Self { kind, count }
    }

    /// Balloon type spawned by this entry.
    #[must_use]
    pub const fn kind(&self) -> &BalloonTypeId {
        &self.kind
    }

    /// Number of top-level balloons of the type.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }
}

/// Resolved content of a single wave.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Wave {
    number: WaveNumber,
    quota: Vec<Quota>,
    spawn_delay: Duration,
    description: String,
}

impl Wave {
    /// Resolves the content of wave `number`.
    ///
    /// Waves up to [`AUTHORED_WAVE_COUNT`] come from the authored table. Later
    /// waves grow in size and type coverage, drawing types from `registry` in
    /// definition order, and spawn faster down to a 400 ms floor.
    #[must_use]
    pub fn resolve(number: WaveNumber, registry: &BalloonRegistry) -> Self {
        match number.get() {
            index @ 1..=AUTHORED_WAVE_COUNT => {
                let authored = &AUTHORED_WAVES[(index - 1) as usize];
                Self {
                    number,
                    quota: authored
                        .quota
                        .iter()
                        .map(|&(kind, count)| Quota::new(BalloonTypeId::from_static(kind), count))
                        .collect(),
                    spawn_delay: Duration::from_millis(authored.spawn_delay_ms),
                    description: authored.description.to_owned(),
                }
            }
            index => Self::procedural(number, index.saturating_sub(AUTHORED_WAVE_COUNT), registry),
        }
    }

    fn procedural(number: WaveNumber, step: u32, registry: &BalloonRegistry) -> Self {
        let base = PROCEDURAL_BASE_COUNT.saturating_add(step.saturating_mul(PROCEDURAL_COUNT_STEP));
        let last_index = (registry.len() - 1).min((step / 2 + PROCEDURAL_BASE_TYPE_INDEX) as usize);
        let quota = registry
            .iter()
            .take(last_index + 1)
            .enumerate()
            .map(|(position, balloon_type)| {
                let count = (base / (position as u32 + 1)).max(1);
                Quota::new(balloon_type.id().clone(), count)
            })
            .collect();
        let delay_ms = BASE_PROCEDURAL_DELAY_MS
            .saturating_sub(u64::from(step) * PROCEDURAL_DELAY_STEP_MS)
            .max(MIN_PROCEDURAL_DELAY_MS);

        Self {
            number,
            quota,
            spawn_delay: Duration::from_millis(delay_ms),
            description: format!("Wave {}", number.get()),
        }
    }

    /// One-based wave number.
    #[must_use]
    pub const fn number(&self) -> WaveNumber {
        self.number
    }

    /// Per-type balloon counts.
    #[must_use]
    pub fn quota(&self) -> &[Quota] {
        &self.quota
    }

    /// Interval between consecutive spawns.
    #[must_use]
    pub const fn spawn_delay(&self) -> Duration {
        self.spawn_delay
    }

    /// Label announced when the wave starts.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Number of top-level balloons the wave spawns.
    #[must_use]
    pub fn quota_total(&self) -> u32 {
        self.quota
            .iter()
            .map(Quota::count)
            .fold(0, u32::saturating_add)
    }

    /// Pops needed to clear the wave, latent children included. Saturates at
    /// `u32::MAX`.
    #[must_use]
    pub fn total_value(&self, registry: &BalloonRegistry) -> u32 {
        self.quota
            .iter()
            .map(|entry| {
                registry
                    .recursive_value(entry.kind())
                    .saturating_mul(entry.count())
            })
            .fold(0, u32::saturating_add)
    }

    /// Expands the quota into one type id per balloon, in quota order.
    #[must_use]
    pub fn expand(&self) -> Vec<BalloonTypeId> {
        self.quota
            .iter()
            .flat_map(|entry| std::iter::repeat(entry.kind().clone()).take(entry.count() as usize))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use balloon_defence_core::{BalloonColor, BalloonType};
    use std::num::NonZeroU32;

    /// Deepest tier first, so procedural waves draw the most valuable types.
    fn doubling_registry(tiers: u32) -> BalloonRegistry {
        let types = (0..tiers)
            .rev()
            .map(|tier| {
                let balloon_type = BalloonType::new(
                    BalloonTypeId::new(format!("T{tier}")),
                    format!("Tier {tier}"),
                    NonZeroU32::MIN,
                    1.0,
                    1,
                    BalloonColor::from_hex(0x808080),
                );
                if tier == 0 {
                    balloon_type
                } else {
                    let child = BalloonTypeId::new(format!("T{}", tier - 1));
                    balloon_type.with_children(vec![child.clone(), child])
                }
            })
            .collect();
        BalloonRegistry::new(types, BalloonTypeId::new("T0")).expect("valid registry")
    }

    fn counts(wave: &Wave) -> Vec<(&str, u32)> {
        wave.quota()
            .iter()
            .map(|entry| (entry.kind().as_str(), entry.count()))
            .collect()
    }

    #[test]
    fn authored_waves_reference_classic_types() {
        let registry = BalloonRegistry::classic();
        for number in 1..=AUTHORED_WAVE_COUNT {
            let wave = Wave::resolve(WaveNumber::new(number), &registry);
            assert!(!wave.quota().is_empty());
            for entry in wave.quota() {
                assert!(registry.contains(entry.kind()), "{}", entry.kind());
            }
        }
    }

    #[test]
    fn first_wave_is_ten_reds() {
        let registry = BalloonRegistry::classic();
        let wave = Wave::resolve(WaveNumber::new(1), &registry);
        assert_eq!(counts(&wave), vec![("RED", 10)]);
        assert_eq!(wave.spawn_delay(), Duration::from_millis(1500));
        assert_eq!(wave.description(), "Red Balloons");
        assert_eq!(wave.total_value(&registry), 10);
        assert_eq!(wave.number(), WaveNumber::new(1));
    }

    #[test]
    fn lead_wave_value_counts_latent_children() {
        let registry = BalloonRegistry::classic();
        let wave = Wave::resolve(WaveNumber::new(10), &registry);
        assert_eq!(wave.quota_total(), 15);
        assert_eq!(wave.total_value(&registry), 6 * 11 + 6 * 11 + 3 * 23);
        assert_eq!(wave.description(), "Lead Balloons!");
    }

    #[test]
    fn eleventh_wave_ramps_from_the_table() {
        let registry = BalloonRegistry::classic();
        let wave = Wave::resolve(WaveNumber::new(11), &registry);
        assert_eq!(
            counts(&wave),
            vec![
                ("RED", 15),
                ("BLUE", 7),
                ("GREEN", 5),
                ("YELLOW", 3),
                ("PINK", 3),
                ("BLACK", 2),
                ("WHITE", 2),
            ]
        );
        assert_eq!(wave.spawn_delay(), Duration::from_millis(770));
        assert_eq!(wave.description(), "Wave 11");
        assert_eq!(wave.number(), WaveNumber::new(11));
    }

    #[test]
    fn total_value_saturates_for_deep_hierarchies() {
        let registry = doubling_registry(34);
        let wave = Wave::resolve(WaveNumber::new(11), &registry);
        assert_eq!(wave.quota()[0].kind(), &BalloonTypeId::new("T33"));
        assert_eq!(wave.quota()[0].count(), 15);
        assert_eq!(wave.total_value(&registry), u32::MAX);
    }

    #[test]
    fn late_waves_cover_every_type_at_the_delay_floor() {
        let registry = BalloonRegistry::classic();
        let wave = Wave::resolve(WaveNumber::new(30), &registry);
        assert_eq!(wave.quota().len(), registry.len());
        assert_eq!(wave.quota()[0].count(), 110);
        assert_eq!(wave.quota()[7].count(), 13);
        assert_eq!(wave.spawn_delay(), Duration::from_millis(400));
    }

    #[test]
    fn expansion_matches_quota_total() {
        let registry = BalloonRegistry::classic();
        let wave = Wave::resolve(WaveNumber::new(7), &registry);
        let expanded = wave.expand();
        assert_eq!(expanded.len() as u32, wave.quota_total());
        assert_eq!(
            expanded
                .iter()
                .filter(|kind| **kind == BalloonTypeId::PINK)
                .count(),
            8
        );
    }
}
