//! Weight decay between ticks.
//!
//! A record's weight ages as the store clock moves past the tick the
//! record was written at. Merging projects both sides onto a common tick
//! before comparing weights, through a [`Decay`] strategy.
//!
//! Every strategy must satisfy, for `origin = 0`:
//!
//! - `decay(_, t, w, t) == w`
//! - non-increasing as `target_tick - record_tick` grows
//! - never negative, never above `w`

use userdb_codec::Tick;

/// Ticks for the weight to fall by a factor of `e` in [`ExponentialDecay`].
pub const DEFAULT_DECAY_RATE: f64 = 200.0;

/// A weight-aging strategy.
pub trait Decay: Send + Sync {
    /// Projects `weight`, last written at `record_tick`, forward to `target_tick`.
    fn decay(&self, origin: f64, target_tick: Tick, weight: f64, record_tick: Tick) -> f64;
}

impl<F> Decay for F
where
    F: Fn(f64, Tick, f64, Tick) -> f64 + Send + Sync,
{
    fn decay(&self, origin: f64, target_tick: Tick, weight: f64, record_tick: Tick) -> f64 {
        self(origin, target_tick, weight, record_tick)
    }
}

/// `origin + weight * exp(-(target_tick - record_tick) / rate)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialDecay {
    rate: f64,
}

impl ExponentialDecay {
    /// Creates a decay with the given rate. Non-positive rates fall back to the default.
    #[must_use]
    pub fn new(rate: f64) -> Self {
        let rate = if rate > 0.0 { rate } else { DEFAULT_DECAY_RATE };
        Self { rate }
    }

    /// Returns the rate.
    #[must_use]
    pub fn rate(&self) -> f64 {
        self.rate
    }
}

impl Default for ExponentialDecay {
    fn default() -> Self {
        Self::new(DEFAULT_DECAY_RATE)
    }
}

impl Decay for ExponentialDecay {
    fn decay(&self, origin: f64, target_tick: Tick, weight: f64, record_tick: Tick) -> f64 {
        let weight = weight.max(0.0);
        if target_tick <= record_tick {
            return weight;
        }
        let elapsed = (target_tick - record_tick) as f64;
        (origin + weight * (-elapsed / self.rate).exp()).clamp(0.0, weight)
    }
}

/// Leaves weights untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoDecay;

impl Decay for NoDecay {
    fn decay(&self, _origin: f64, _target_tick: Tick, weight: f64, _record_tick: Tick) -> f64 {
        weight
    }
}
