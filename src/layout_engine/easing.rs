//! Time-based easing curves.
//!
//! All curves map an elapsed-time ratio in `[0, 1]` to an interpolation factor.
//! Factors may exceed 1.0; that overshoot is what gives a captured bubble its
//! springy settle.

use std::f64::consts::FRAC_PI_2;

const MIN_EDGE_TENSION: f32 = 1.25;
const MAX_EDGE_TENSION: f32 = 4.0;
/// Fling speed (px/s) at which the edge tension has doubled.
const EDGE_TENSION_VELOCITY: f32 = 3000.0;

/// Capture curve used when a bubble changes state mid-gesture.
///
/// A sine rise for the first 40% of the run, joined to a shallow parabola that
/// settles back onto 1.0 at `t = 1`.
pub fn capture_position(t: f32) -> f32 {
    let t = t as f64;
    let position = if t <= 0.4 {
        0.55 * (8.0564 * t - FRAC_PI_2).sin() + 0.55
    } else {
        4.0 * (0.417 * t - 0.341).powi(2) - 4.0 * (0.417 - 0.341_f64).powi(2) + 1.0
    };
    position as f32
}

/// An interpolator that runs past its target and springs back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overshoot {
    pub tension: f32,
}

impl Overshoot {
    pub fn new(tension: f32) -> Self { Overshoot { tension } }

    /// Tension scaled by fling speed, used when the release velocity picks the
    /// edge.
    pub fn for_velocity(velocity_x: f32) -> Self { Overshoot::new(edge_tension(velocity_x)) }

    pub fn interpolate(&self, t: f32) -> f32 {
        let t = t - 1.0;
        t * t * ((self.tension + 1.0) * t + self.tension) + 1.0
    }
}

pub fn edge_tension(velocity_x: f32) -> f32 {
    (velocity_x.abs() / EDGE_TENSION_VELOCITY * 2.0).clamp(MIN_EDGE_TENSION, MAX_EDGE_TENSION)
}

/// Which curve drives an animation run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Curve {
    /// Lands on the target on the first frame. Used for plain finger tracking.
    Immediate,
    Capture,
    Overshoot(Overshoot),
}

impl Curve {
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Curve::Immediate => 1.0,
            Curve::Capture => capture_position(t),
            Curve::Overshoot(o) => o.interpolate(t),
        }
    }
}
