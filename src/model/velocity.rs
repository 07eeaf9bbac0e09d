//! Release-velocity estimation for drag gestures.
//!
//! Uses the impulse strategy: the velocity is derived from the kinetic energy
//! the finger imparted over the recent samples, which is more robust to
//! jittery touch panels than a plain least-squares fit.

use crate::sys::timer::Millis;

const HISTORY_SIZE: usize = 20;
/// Only samples this recent contribute.
const HORIZON_MS: Millis = 100;
/// A gap this long between samples means the finger had stopped.
const ASSUME_STOPPED_MS: Millis = 40;

#[derive(Debug, Clone, Copy)]
struct Sample {
    time: Millis,
    position: f32,
}

#[derive(Debug, Clone)]
struct AxisTracker {
    samples: [Option<Sample>; HISTORY_SIZE],
    index: usize,
}

impl Default for AxisTracker {
    fn default() -> Self { AxisTracker { samples: [None; HISTORY_SIZE], index: 0 } }
}

impl AxisTracker {
    fn add(&mut self, time: Millis, position: f32) {
        self.index = (self.index + 1) % HISTORY_SIZE;
        self.samples[self.index] = Some(Sample { time, position });
    }

    /// Units per millisecond.
    fn velocity_per_ms(&self) -> f32 {
        let Some(newest) = self.samples[self.index] else {
            return 0.0;
        };

        let mut positions = [0.0f32; HISTORY_SIZE];
        let mut times = [0.0f32; HISTORY_SIZE];
        let mut count = 0;
        let mut cursor = self.index;
        let mut previous = newest;

        while let Some(sample) = self.samples[cursor] {
            let age = newest.time.saturating_sub(sample.time);
            let gap = previous.time.abs_diff(sample.time);
            previous = sample;
            if age > HORIZON_MS || gap > ASSUME_STOPPED_MS {
                break;
            }
            positions[count] = sample.position;
            times[count] = -(age as f32);
            count += 1;
            if count >= HISTORY_SIZE {
                break;
            }
            cursor = if cursor == 0 { HISTORY_SIZE - 1 } else { cursor - 1 };
        }

        if count < 2 {
            return 0.0;
        }

        let mut work = 0.0f32;
        let oldest = count - 1;
        let mut next_time = times[oldest];
        for i in (1..=oldest).rev() {
            let current_time = next_time;
            next_time = times[i - 1];
            if current_time == next_time {
                continue;
            }
            let v_curr = (positions[i - 1] - positions[i]) / (next_time - current_time);
            let v_prev = energy_to_velocity(work);
            work += (v_curr - v_prev) * v_curr.abs();
            if i == oldest {
                work *= 0.5;
            }
        }
        energy_to_velocity(work)
    }
}

#[inline]
fn energy_to_velocity(energy: f32) -> f32 { energy.signum() * (2.0 * energy.abs()).sqrt() }

/// Two-axis velocity tracker fed with raw screen touch positions.
#[derive(Debug, Clone, Default)]
pub struct VelocityTracker {
    x: AxisTracker,
    y: AxisTracker,
    velocity: (f32, f32),
}

impl VelocityTracker {
    pub fn new() -> Self { Self::default() }

    pub fn add_movement(&mut self, time: Millis, x: f32, y: f32) {
        self.x.add(time, x);
        self.y.add(time, y);
    }

    /// Recomputes the cached velocity in units per `units_ms` milliseconds
    /// (1000 gives pixels per second).
    pub fn compute_current_velocity(&mut self, units_ms: u32) {
        let scale = units_ms as f32;
        self.velocity = (self.x.velocity_per_ms() * scale, self.y.velocity_per_ms() * scale);
    }

    pub fn x_velocity(&self) -> f32 { self.velocity.0 }

    pub fn y_velocity(&self) -> f32 { self.velocity.1 }

    pub fn clear(&mut self) { *self = Self::default(); }
}
