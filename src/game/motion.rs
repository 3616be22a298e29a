//! Shake / Motion Detector
//!
//! Turns a stream of 3-axis acceleration samples into discrete shake events.
//!
//! ```text
//! sample ──▶ cooldown? ──yes──▶ drop
//!               │no
//!               ▼
//!       |a| / g ≥ threshold / sensitivity ? ──no──▶ drop
//!               │yes
//!               ▼
//!       classify (vertical | horizontal | none) ──▶ fire, start cooldown
//! ```
//!
//! The detector keeps its own clock, advanced by `advance_time`. Cooldown is
//! counted in whole steps so progress reaches exactly 1.0.

use std::collections::VecDeque;

use glam::Vec3;
use serde::{Serialize, Deserialize};
use tracing::{debug, info, warn};

// =============================================================================
// CONFIG
// =============================================================================

/// Detector tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Base trigger threshold in G
    pub threshold_g: f64,
    /// Cooldown after a shake (seconds)
    pub cooldown_secs: f64,
    /// Cooldown step size (seconds)
    pub cooldown_step_secs: f64,
    /// Sensitivity multiplier; higher triggers more easily
    pub sensitivity: f64,
    /// |y| must exceed |x| by this factor for a vertical shake
    pub vertical_ratio: f64,
    /// |x| must exceed |y| by this factor for a horizontal shake
    pub horizontal_ratio: f64,
    /// Standard gravity (m/s²)
    pub gravity: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            threshold_g: 1.5,
            cooldown_secs: 2.0,
            cooldown_step_secs: 0.05,
            sensitivity: 1.0,
            vertical_ratio: 1.5,
            horizontal_ratio: 1.2,
            gravity: 9.8,
        }
    }
}

impl MotionConfig {
    /// Threshold after sensitivity, in G.
    pub fn effective_threshold(&self) -> f64 {
        self.threshold_g / self.sensitivity
    }

    /// Number of discrete cooldown steps.
    pub fn cooldown_steps(&self) -> u32 {
        if self.cooldown_step_secs <= 0.0 {
            return 1;
        }
        ((self.cooldown_secs / self.cooldown_step_secs).round() as u32).max(1)
    }
}

// =============================================================================
// SAMPLES & EVENTS
// =============================================================================

/// One accelerometer reading in m/s².
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AccelerationSample {
    /// X axis
    pub x: f64,
    /// Y axis
    pub y: f64,
    /// Z axis
    pub z: f64,
}

impl AccelerationSample {
    /// Create a sample.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean magnitude.
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// As a render-space vector.
    pub fn as_vec3(&self) -> Vec3 {
        Vec3::new(self.x as f32, self.y as f32, self.z as f32)
    }
}

/// Direction of a shake gesture. Diagnostic only; never gates firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShakeMode {
    /// No dominant axis
    #[default]
    None,
    /// Up and down
    Vertical,
    /// Side to side
    Horizontal,
}

/// A fired shake.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShakeEvent {
    /// Gesture direction
    pub mode: ShakeMode,
    /// Reading that fired it, in G (0 for manual triggers)
    pub g_force: f64,
    /// Detector clock time (seconds)
    pub at: f64,
    /// Fired from the button fallback
    pub manual: bool,
}

// =============================================================================
// SENSOR
// =============================================================================

/// Source of acceleration samples.
///
/// Pull-based: the owner polls pending samples and feeds them to the
/// detector, so tests drive the detector with synthetic sequences.
pub trait MotionSensor: Send {
    /// Whether the hardware exists. Fixed for the life of the sensor.
    fn is_available(&self) -> bool;

    /// Next pending sample, if any.
    fn poll(&mut self) -> Option<AccelerationSample>;
}

/// A device without an accelerometer.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableSensor;

impl MotionSensor for UnavailableSensor {
    fn is_available(&self) -> bool {
        false
    }

    fn poll(&mut self) -> Option<AccelerationSample> {
        None
    }
}

/// Replays a queue of pre-loaded samples.
#[derive(Debug, Default, Clone)]
pub struct ScriptedSensor {
    samples: VecDeque<AccelerationSample>,
}

impl ScriptedSensor {
    /// Sensor yielding `samples` in order.
    pub fn new(samples: impl IntoIterator<Item = AccelerationSample>) -> Self {
        Self {
            samples: samples.into_iter().collect(),
        }
    }

    /// Queue another sample.
    pub fn push(&mut self, sample: AccelerationSample) {
        self.samples.push_back(sample);
    }

    /// Samples not yet polled.
    pub fn remaining(&self) -> usize {
        self.samples.len()
    }
}

impl MotionSensor for ScriptedSensor {
    fn is_available(&self) -> bool {
        true
    }

    fn poll(&mut self) -> Option<AccelerationSample> {
        self.samples.pop_front()
    }
}

// =============================================================================
// DETECTOR
// =============================================================================

/// Shake detector with cooldown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShakeDetector {
    config: MotionConfig,
    /// False once a start attempt found no sensor; never flips back
    available: bool,
    monitoring: bool,
    /// Cooldown steps completed (== total when ready)
    cooldown_done: u32,
    cooldown_total: u32,
    /// Time carried toward the next cooldown step
    step_carry: f64,
    current_mode: ShakeMode,
    last_event_time: Option<f64>,
    /// Seconds since construction
    clock: f64,
}

impl Default for ShakeDetector {
    fn default() -> Self {
        Self::new(MotionConfig::default())
    }
}

impl ShakeDetector {
    /// Create a ready detector.
    pub fn new(config: MotionConfig) -> Self {
        let cooldown_total = config.cooldown_steps();
        Self {
            config,
            available: true,
            monitoring: false,
            cooldown_done: cooldown_total,
            cooldown_total,
            step_carry: 0.0,
            current_mode: ShakeMode::None,
            last_event_time: None,
            clock: 0.0,
        }
    }

    /// Current tuning.
    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    /// Change the sensitivity multiplier, clamped to [0.5, 2.0].
    pub fn set_sensitivity(&mut self, sensitivity: f64) {
        self.config.sensitivity = if sensitivity.is_finite() {
            sensitivity.clamp(0.5, 2.0)
        } else {
            1.0
        };
    }

    // -------------------------------------------------------------------------
    // State
    // -------------------------------------------------------------------------

    /// Cooldown progress in [0, 1]; 1 means ready.
    pub fn cooldown_progress(&self) -> f32 {
        self.cooldown_done as f32 / self.cooldown_total as f32
    }

    /// Shakes are being suppressed.
    #[inline]
    pub fn is_on_cooldown(&self) -> bool {
        self.cooldown_done < self.cooldown_total
    }

    /// Sensor present (as far as the last start attempt could tell).
    #[inline]
    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Samples are being consumed.
    #[inline]
    pub fn is_monitoring(&self) -> bool {
        self.monitoring
    }

    /// Mode of the last shake, until its cooldown ends.
    pub fn current_mode(&self) -> ShakeMode {
        self.current_mode
    }

    /// Detector time of the last fired shake.
    pub fn last_event_time(&self) -> Option<f64> {
        self.last_event_time
    }

    /// Seconds since construction.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    // -------------------------------------------------------------------------
    // Monitoring
    // -------------------------------------------------------------------------

    /// Begin consuming samples from `sensor`.
    ///
    /// Without hardware the detector marks itself unavailable for good and
    /// stays idle; callers fall back to `trigger_manual`.
    pub fn start_monitoring(&mut self, sensor: &dyn MotionSensor) -> bool {
        if !self.available || !sensor.is_available() {
            if self.available {
                warn!("Accelerometer unavailable, shake falls back to manual trigger");
            }
            self.available = false;
            self.monitoring = false;
            return false;
        }
        if !self.monitoring {
            info!(threshold_g = self.config.effective_threshold(), "Motion monitoring started");
        }
        self.monitoring = true;
        true
    }

    /// Stop consuming samples. Idempotent.
    pub fn stop_monitoring(&mut self) {
        if self.monitoring {
            debug!("Motion monitoring stopped");
        }
        self.monitoring = false;
    }

    // -------------------------------------------------------------------------
    // Detection
    // -------------------------------------------------------------------------

    /// Feed one sample. Returns the shake it fired, if any.
    pub fn process_sample(&mut self, sample: AccelerationSample) -> Option<ShakeEvent> {
        if !self.monitoring || self.is_on_cooldown() {
            return None;
        }

        let g_force = sample.magnitude() / self.config.gravity;
        let threshold = self.config.effective_threshold();

        #[cfg(feature = "debug-tracing")]
        tracing::trace!(g_force, threshold, "Motion sample");

        if g_force.is_nan() || g_force < threshold {
            return None;
        }

        let mode = self.classify(&sample);
        Some(self.fire(mode, g_force, false))
    }

    /// Drain every pending sample from `sensor`. Returns fired shakes.
    pub fn poll_sensor(&mut self, sensor: &mut dyn MotionSensor) -> Vec<ShakeEvent> {
        let mut fired = Vec::new();
        if !self.monitoring {
            return fired;
        }
        while let Some(sample) = sensor.poll() {
            if let Some(event) = self.process_sample(sample) {
                fired.push(event);
            }
        }
        fired
    }

    /// Button fallback. Honors the same cooldown as sensor shakes.
    pub fn trigger_manual(&mut self) -> Option<ShakeEvent> {
        if self.is_on_cooldown() {
            debug!(progress = self.cooldown_progress(), "Manual shake ignored, cooling down");
            return None;
        }
        Some(self.fire(ShakeMode::None, 0.0, true))
    }

    /// Gesture direction from the dominant horizontal axis.
    pub fn classify(&self, sample: &AccelerationSample) -> ShakeMode {
        let ax = sample.x.abs();
        let ay = sample.y.abs();
        if ay > ax * self.config.vertical_ratio {
            ShakeMode::Vertical
        } else if ax > ay * self.config.horizontal_ratio {
            ShakeMode::Horizontal
        } else {
            ShakeMode::None
        }
    }

    fn fire(&mut self, mode: ShakeMode, g_force: f64, manual: bool) -> ShakeEvent {
        self.current_mode = mode;
        self.last_event_time = Some(self.clock);
        self.cooldown_done = 0;
        self.step_carry = 0.0;

        debug!(?mode, g_force, manual, at = self.clock, "Shake detected");

        ShakeEvent {
            mode,
            g_force,
            at: self.clock,
            manual,
        }
    }

    // -------------------------------------------------------------------------
    // Clock
    // -------------------------------------------------------------------------

    /// Advance the detector clock, stepping any active cooldown.
    pub fn advance_time(&mut self, delta: f64) {
        if !delta.is_finite() || delta <= 0.0 {
            return;
        }
        self.clock += delta;

        if !self.is_on_cooldown() {
            return;
        }

        self.step_carry += delta;
        let step = self.config.cooldown_step_secs;
        let steps = if step > 0.0 {
            // Tolerance absorbs the representation error of the step size
            (self.step_carry / step + 1e-9).floor() as u32
        } else {
            self.cooldown_total
        };
        if steps == 0 {
            return;
        }

        self.step_carry = (self.step_carry - steps as f64 * step).max(0.0);
        self.cooldown_done = (self.cooldown_done + steps).min(self.cooldown_total);

        if !self.is_on_cooldown() {
            self.finish_cooldown();
        }
    }

    /// End any cooldown immediately.
    pub fn reset_cooldown(&mut self) {
        self.cooldown_done = self.cooldown_total;
        self.finish_cooldown();
    }

    fn finish_cooldown(&mut self) {
        self.step_carry = 0.0;
        self.current_mode = ShakeMode::None;
    }
}
