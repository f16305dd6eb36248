//! Tuning constants for node motion and camera convergence.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{CameraPose, SlotPosition};

/// Island positions handed out round-robin to new nodes.
pub const DEFAULT_SLOT_PALETTE: [SlotPosition; 5] = [
    SlotPosition::new(-2.8, -2.0),
    SlotPosition::new(2.8, -2.0),
    SlotPosition::new(-2.8, 2.0),
    SlotPosition::new(2.2, 2.2),
    SlotPosition::new(0.0, 0.0),
];

/// Configuration faults detected before the first frame.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// A per-frame speed would stall or reverse the state machine.
    #[error("{name} must be positive (received {value})")]
    NonPositiveSpeed {
        /// Name of the offending setting.
        name: &'static str,
        /// Value that failed validation.
        value: f32,
    },
    /// The baseline or apex is not a finite number.
    #[error("{name} must be finite (received {value})")]
    NonFiniteBound {
        /// Name of the offending setting.
        name: &'static str,
        /// Value that failed validation.
        value: f32,
    },
    /// The apex does not lie above the baseline.
    #[error("apex {apex} must lie above baseline {baseline}")]
    InvertedBounds {
        /// Configured resting height.
        baseline: f32,
        /// Configured raised height.
        apex: f32,
    },
    /// The camera convergence factor is outside `(0, 1]`.
    #[error("camera convergence factor must lie in (0, 1] (received {factor})")]
    ConvergenceOutOfRange {
        /// Value that failed validation.
        factor: f32,
    },
    /// The camera settle threshold is not positive.
    #[error("camera settle epsilon must be positive (received {epsilon})")]
    NonPositiveEpsilon {
        /// Value that failed validation.
        epsilon: f32,
    },
    /// No slot positions were configured.
    #[error("slot palette must contain at least one position")]
    EmptySlotPalette,
}

/// Heights and per-frame speeds of the rise/fall animation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionTuning {
    /// Resting height of a lowered node.
    pub baseline: f32,
    /// Height a rising node converges to.
    pub apex: f32,
    /// Height gained per frame while rising.
    pub rise_speed: f32,
    /// Height lost per frame while falling.
    pub fall_speed: f32,
    /// Rotation in radians applied per frame while moving.
    pub turn_speed: f32,
}

impl Default for MotionTuning {
    fn default() -> Self {
        Self {
            baseline: 0.2,
            apex: 1.4,
            rise_speed: 0.02,
            fall_speed: 0.03,
            turn_speed: 0.03,
        }
    }
}

impl MotionTuning {
    /// Rejects tunings that would leave a node animating forever.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [("baseline", self.baseline), ("apex", self.apex)] {
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteBound { name, value });
            }
        }
        if self.apex <= self.baseline {
            return Err(ConfigError::InvertedBounds {
                baseline: self.baseline,
                apex: self.apex,
            });
        }
        for (name, value) in [
            ("rise_speed", self.rise_speed),
            ("fall_speed", self.fall_speed),
            ("turn_speed", self.turn_speed),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositiveSpeed { name, value });
            }
        }
        Ok(())
    }
}

/// Offsets, convergence law and home pose of the camera.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    /// Eye offset from a focused node: lateral, vertical and depth bias.
    pub follow_offset: Vec3,
    /// Look-at offset from a focused node.
    pub look_offset: Vec3,
    /// Fraction of the remaining distance covered per frame.
    pub convergence: f32,
    /// Distance under which a convergence counts as settled.
    pub epsilon: f32,
    /// Pose the camera relaxes to when nothing is focused.
    pub home: CameraPose,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            follow_offset: Vec3::new(1.5, 2.0, 4.0),
            look_offset: Vec3::new(0.0, 0.5, 0.0),
            convergence: 0.1,
            epsilon: 0.01,
            home: CameraPose::new(Vec3::new(5.0, 5.0, 10.0), Vec3::ZERO),
            fov_degrees: 45.0,
        }
    }
}

impl CameraTuning {
    /// Rejects convergence laws that never settle.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.convergence > 0.0 && self.convergence <= 1.0) {
            return Err(ConfigError::ConvergenceOutOfRange {
                factor: self.convergence,
            });
        }
        if !(self.epsilon > 0.0) {
            return Err(ConfigError::NonPositiveEpsilon {
                epsilon: self.epsilon,
            });
        }
        Ok(())
    }

    /// Pose the camera aims for while following a node at `anchor`.
    #[must_use]
    pub fn follow_pose(&self, anchor: Vec3) -> CameraPose {
        CameraPose::new(anchor + self.follow_offset, anchor + self.look_offset)
    }
}

/// Complete engine configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Node animation tuning.
    pub motion: MotionTuning,
    /// Camera tuning.
    pub camera: CameraTuning,
    /// Slot palette used for new nodes.
    pub slots: Vec<SlotPosition>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            motion: MotionTuning::default(),
            camera: CameraTuning::default(),
            slots: DEFAULT_SLOT_PALETTE.to_vec(),
        }
    }
}

impl EngineConfig {
    /// Validates every section of the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.motion.validate()?;
        self.camera.validate()?;
        if self.slots.is_empty() {
            return Err(ConfigError::EmptySlotPalette);
        }
        Ok(())
    }
}
