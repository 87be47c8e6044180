//! Frame-rate independent color smoothing
//!
//! Critically damped smoothing toward a moving target. Each channel keeps its
//! own velocity so a target change mid-transition bends the curve instead of
//! restarting it. Converges without overshoot and snaps onto the target once
//! within `epsilon`, so a settled color compares equal to its target.
//!
//! Call `step(current, target, dt)` once per frame with the frame delta in
//! seconds.

use garment_types::Rgb;

/// Smoothing parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DampConfig {
    /// Approximate settle time in seconds.
    pub smooth_time: f32,
    /// Distance below which a channel snaps onto its target.
    pub epsilon: f32,
}

impl Default for DampConfig {
    fn default() -> Self {
        Self {
            smooth_time: 0.25,
            epsilon: 0.001,
        }
    }
}

// =============================================================================
// SINGLE CHANNEL
// =============================================================================

/// Advance one channel toward `target`, updating `velocity` in place.
///
/// Closed-form critically damped step with a polynomial approximation of
/// `exp(-omega * dt)`. The result never passes the target.
pub fn damp_channel(
    current: f32,
    target: f32,
    velocity: &mut f32,
    config: DampConfig,
    dt: f32,
) -> f32 {
    if (current - target).abs() <= config.epsilon {
        *velocity = 0.0;
        return target;
    }

    let smooth_time = config.smooth_time.max(0.0001);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * decay;
    let mut output = target + (change + temp) * decay;

    // Clamp overshoot
    if (target - current > 0.0) == (output > target) {
        output = target;
        *velocity = 0.0;
    }

    output
}

// =============================================================================
// COLOR
// =============================================================================

/// Damps an RGB color toward a target.
#[derive(Debug, Clone, Default)]
pub struct ColorDamper {
    velocity: [f32; 3],
    config: DampConfig,
}

impl ColorDamper {
    pub fn new(config: DampConfig) -> Self {
        Self {
            velocity: [0.0; 3],
            config,
        }
    }

    /// Compute the next color. A non-positive or non-finite `dt` leaves the
    /// color untouched.
    pub fn step(&mut self, current: Rgb, target: Rgb, dt: f32) -> Rgb {
        if !dt.is_finite() || dt <= 0.0 {
            return current;
        }

        let current = current.channels();
        let target = target.channels();
        let mut next = [0.0; 3];
        for i in 0..3 {
            next[i] = damp_channel(
                current[i],
                target[i],
                &mut self.velocity[i],
                self.config,
                dt,
            );
        }
        Rgb::from_channels(next)
    }

    /// True once every channel sits on the target and is at rest.
    #[cfg(test)]
    pub(crate) fn is_settled(&self, current: Rgb, target: Rgb) -> bool {
        current == target && self.velocity.iter().all(|v| *v == 0.0)
    }
}
