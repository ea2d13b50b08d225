//! Cancelable camera transition played when the scene mounts.
//!
//! The transition is frame-driven: the render loop calls
//! [`CameraTransition::tick`] with the current time and the transition writes
//! the interpolated position into a [`CameraSink`]. Cancellation goes through
//! a [`TransitionHandle`]; once cancelled, no further writes happen.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use web_time::Instant;

/// Easing curve applied to normalized transition progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    SineIn,
    SineOut,
    #[default]
    SineInOut,
}

impl Easing {
    /// Maps progress in [0, 1] to eased progress in [0, 1].
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::SineIn => 1.0 - (t * FRAC_PI_2).cos(),
            Easing::SineOut => (t * FRAC_PI_2).sin(),
            Easing::SineInOut => -((PI * t).cos() - 1.0) / 2.0,
        }
    }
}

/// Keyframes and timing of the mount transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTransitionConfig {
    pub from: [f64; 3],
    pub to: [f64; 3],
    pub duration_secs: f64,
    pub easing: Easing,
}

impl Default for CameraTransitionConfig {
    fn default() -> Self {
        Self {
            from: [15.0, 5.0, 5.0],
            to: [10.0, 8.0, 0.0],
            duration_secs: 1.5,
            easing: Easing::SineInOut,
        }
    }
}

/// Write path from a transition to a camera.
pub trait CameraSink {
    fn set_position(&mut self, position: DVec3);
}

/// Cancellation hook for a running transition.
#[derive(Debug, Clone)]
pub struct TransitionHandle {
    cancelled: Arc<AtomicBool>,
}

impl TransitionHandle {
    /// Stops the transition. Pending and future writes are discarded.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionStatus {
    /// No transition exists (scene not mounted).
    Idle,
    Running,
    /// The end position has been written.
    Finished,
    Cancelled,
}

/// Two-keyframe camera position interpolation.
#[derive(Debug)]
pub struct CameraTransition {
    from: DVec3,
    to: DVec3,
    duration: Duration,
    easing: Easing,
    started_at: Instant,
    cancelled: Arc<AtomicBool>,
    finished: bool,
}

impl CameraTransition {
    /// Starts a transition at `now`, returning it with its cancellation
    /// handle.
    pub fn start(config: &CameraTransitionConfig, now: Instant) -> (Self, TransitionHandle) {
        let cancelled = Arc::new(AtomicBool::new(false));
        let transition = Self {
            from: DVec3::from_array(config.from),
            to: DVec3::from_array(config.to),
            duration: Duration::try_from_secs_f64(config.duration_secs).unwrap_or(Duration::ZERO),
            easing: config.easing,
            started_at: now,
            cancelled: Arc::clone(&cancelled),
            finished: false,
        };
        (transition, TransitionHandle { cancelled })
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Interpolated position `elapsed` after the start.
    pub fn position_at(&self, elapsed: Duration) -> DVec3 {
        if self.duration.is_zero() {
            return self.to;
        }
        let t = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        self.from.lerp(self.to, self.easing.apply(t))
    }

    pub fn status(&self) -> TransitionStatus {
        if self.cancelled.load(Ordering::SeqCst) {
            TransitionStatus::Cancelled
        } else if self.finished {
            TransitionStatus::Finished
        } else {
            TransitionStatus::Running
        }
    }

    /// Advances to `now`, writing at most one position into `sink`.
    pub fn tick(&mut self, now: Instant, sink: &mut dyn CameraSink) -> TransitionStatus {
        match self.status() {
            TransitionStatus::Running => {}
            status => return status,
        }

        let elapsed = now.saturating_duration_since(self.started_at);
        if elapsed >= self.duration {
            sink.set_position(self.to);
            self.finished = true;
            TransitionStatus::Finished
        } else {
            sink.set_position(self.position_at(elapsed));
            TransitionStatus::Running
        }
    }
}
