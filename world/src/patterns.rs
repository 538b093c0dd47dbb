//! Pure flight pattern functions evaluated every frame for alive balloons.
//!
//! Each pattern maps the per-balloon [`PatternState`] to a velocity
//! contribution in world units per second. The world integrates that
//! contribution alongside the balloon's own velocity, so patterns never touch
//! position directly.

use std::f32::consts::TAU;

use balloon_defence_core::MovementPattern;
use glam::Vec3;
use rand::Rng;

/// Rate at which pattern time advances relative to simulated time.
pub const PATTERN_TIME_SCALE: f32 = 2.0;
/// Rate at which the idle bob phase advances relative to simulated time.
pub const BOB_RATE: f32 = 0.8;

const BOB_AMPLITUDE: f32 = 0.3;
const ZIGZAG_FREQUENCY: f32 = 3.0;
const ZIGZAG_STEP: f32 = 2.0;
const SPIRAL_FREQUENCY: f32 = 2.0;
const SPIRAL_RADIUS: f32 = 2.0;
const RISE_SPEED: f32 = 3.0;

/// Per-balloon phase and shape parameters.
///
/// Randomised at spawn so that balloons sharing a pattern do not move in
/// lockstep.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PatternState {
    /// Pattern clock; advances at [`PATTERN_TIME_SCALE`].
    pub time: f32,
    /// Sine amplitude, in units per second.
    pub amplitude: f32,
    /// Sine angular frequency applied to the pattern clock.
    pub frequency: f32,
    /// Phase of the gentle bob used by [`MovementPattern::Normal`].
    pub bob_phase: f32,
}

impl PatternState {
    /// Draws a fresh state: time in `[0, 10)`, amplitude and frequency in `[1, 2)`.
    pub fn randomized<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            time: rng.gen::<f32>() * 10.0,
            amplitude: 1.0 + rng.gen::<f32>(),
            frequency: 1.0 + rng.gen::<f32>(),
            bob_phase: rng.gen::<f32>() * TAU,
        }
    }

    /// Advances both clocks by `seconds` of simulated time.
    pub fn advance(&mut self, seconds: f32) {
        self.time += seconds * PATTERN_TIME_SCALE;
        self.bob_phase += seconds * BOB_RATE;
    }
}

/// Velocity contribution of `pattern` for the given state.
#[must_use]
pub fn pattern_velocity(pattern: MovementPattern, state: &PatternState) -> Vec3 {
    match pattern {
        MovementPattern::Normal => Vec3::new(0.0, state.bob_phase.sin() * BOB_AMPLITUDE, 0.0),
        MovementPattern::Zigzag => {
            let step = if (state.time * ZIGZAG_FREQUENCY).sin() > 0.0 {
                ZIGZAG_STEP
            } else {
                -ZIGZAG_STEP
            };
            Vec3::new(0.0, step, 0.0)
        }
        MovementPattern::Sine => Vec3::new(
            0.0,
            (state.time * state.frequency).sin() * state.amplitude,
            0.0,
        ),
        MovementPattern::Spiral => {
            let angle = state.time * SPIRAL_FREQUENCY;
            Vec3::new(0.0, angle.cos() * SPIRAL_RADIUS, angle.sin() * SPIRAL_RADIUS)
        }
        MovementPattern::Rise => Vec3::new(0.0, RISE_SPEED, 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const FRAME: f32 = 1.0 / 60.0;

    fn fixed_state() -> PatternState {
        PatternState {
            time: 0.25,
            amplitude: 1.7,
            frequency: 1.3,
            bob_phase: 0.5,
        }
    }

    #[test]
    fn sine_offset_stays_within_amplitude() {
        let mut state = fixed_state();
        for _ in 0..10_000 {
            let velocity = pattern_velocity(MovementPattern::Sine, &state);
            assert!(velocity.y.abs() <= state.amplitude + f32::EPSILON);
            assert_eq!(velocity.z, 0.0);
            state.advance(FRAME);
        }
    }

    #[test]
    fn rise_never_loses_height_without_base_velocity() {
        let mut state = fixed_state();
        let mut height = 0.0_f32;
        for _ in 0..600 {
            state.advance(FRAME);
            let next = height + pattern_velocity(MovementPattern::Rise, &state).y * FRAME;
            assert!(next >= height, "rise lost height: {next} < {height}");
            height = next;
        }
        assert!(height > 0.0);
    }

    #[test]
    fn zigzag_is_a_square_wave() {
        let mut state = fixed_state();
        let mut saw_up = false;
        let mut saw_down = false;
        for _ in 0..600 {
            let y = pattern_velocity(MovementPattern::Zigzag, &state).y;
            assert!(y == ZIGZAG_STEP || y == -ZIGZAG_STEP);
            saw_up |= y > 0.0;
            saw_down |= y < 0.0;
            state.advance(FRAME);
        }
        assert!(saw_up && saw_down);
    }

    #[test]
    fn spiral_traces_a_circle_in_the_vertical_plane() {
        let mut state = fixed_state();
        for _ in 0..120 {
            let velocity = pattern_velocity(MovementPattern::Spiral, &state);
            assert_eq!(velocity.x, 0.0);
            let radius = (velocity.y * velocity.y + velocity.z * velocity.z).sqrt();
            assert!((radius - SPIRAL_RADIUS).abs() < 1e-4);
            state.advance(FRAME);
        }
    }

    #[test]
    fn normal_bob_is_small() {
        let mut state = fixed_state();
        for _ in 0..600 {
            let velocity = pattern_velocity(MovementPattern::Normal, &state);
            assert!(velocity.y.abs() <= BOB_AMPLITUDE);
            state.advance(FRAME);
        }
    }

    #[test]
    fn randomized_states_stay_in_range_and_differ() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let first = PatternState::randomized(&mut rng);
        let second = PatternState::randomized(&mut rng);
        assert_ne!(first, second);
        for state in [first, second] {
            assert!((0.0..10.0).contains(&state.time));
            assert!((1.0..2.0).contains(&state.amplitude));
            assert!((1.0..2.0).contains(&state.frequency));
        }
    }
}
