#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Sprint Grove growth visualization engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to. Systems consume event streams, query immutable
//! views such as [`NodeView`] and [`FocusView`], and respond exclusively with
//! new command batches.

mod config;
mod records;

pub use config::{CameraTuning, ConfigError, EngineConfig, MotionTuning, DEFAULT_SLOT_PALETTE};
pub use records::{
    MemberStats, SprintRecord, SprintReport, TaskColumn, TicketRecord, CLOSE_COLUMN, UNASSIGNED,
};

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Identifier of a sprint, shared by its summary and its growth node.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SprintId(String);

impl SprintId {
    /// Creates a new sprint identifier from the provider's id string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrows the textual representation of the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SprintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SprintId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Cumulative ticket counts observed on a single day of a sprint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketSample {
    /// Calendar day of the sample in `YYYY-MM-DD` form.
    pub date: String,
    /// Number of tickets opened up to and including the day.
    pub opened: u32,
    /// Number of tickets closed up to and including the day.
    pub closed: u32,
}

impl TicketSample {
    /// Creates a new ticket sample.
    #[must_use]
    pub fn new(date: impl Into<String>, opened: u32, closed: u32) -> Self {
        Self {
            date: date.into(),
            opened,
            closed,
        }
    }
}

/// Read-only sprint progress record supplied by the aggregation layer.
///
/// The engine never mutates summaries. `completion_percentage` may arrive
/// outside `0..=100` or as NaN; stage derivation clamps it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintSummary {
    /// Identifier of the sprint.
    pub id: SprintId,
    /// Display name of the sprint.
    pub name: String,
    /// Share of closed tickets expressed in percent.
    pub completion_percentage: f32,
    /// Cumulative opened/closed ticket counts ordered by date.
    #[serde(default)]
    pub ticket_series: Vec<TicketSample>,
}

impl SprintSummary {
    /// Creates a summary without ticket history.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, completion_percentage: f32) -> Self {
        Self {
            id: SprintId::new(id),
            name: name.into(),
            completion_percentage,
            ticket_series: Vec::new(),
        }
    }

    /// Attaches the provided ticket series to the summary.
    #[must_use]
    pub fn with_ticket_series(mut self, ticket_series: Vec<TicketSample>) -> Self {
        self.ticket_series = ticket_series;
        self
    }

    /// Growth stage implied by the summary's completion percentage.
    #[must_use]
    pub fn stage(&self) -> GrowthStage {
        GrowthStage::from_completion(self.completion_percentage)
    }
}

/// Discrete visual tier of a growth node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GrowthStage {
    /// Stage 1: up to a quarter of the sprint is complete.
    Seedling,
    /// Stage 2: more than 25% and at most 50% complete.
    Sapling,
    /// Stage 3: more than 50% and at most 75% complete.
    Young,
    /// Stage 4: more than 75% complete.
    Mature,
}

impl GrowthStage {
    /// Every stage in ascending order.
    pub const ALL: [GrowthStage; 4] = [Self::Seedling, Self::Sapling, Self::Young, Self::Mature];

    /// Derives the stage for a completion percentage.
    ///
    /// NaN and negative values are treated as zero and values above 100 as
    /// 100, so the result is monotonic in the input and always defined.
    #[must_use]
    pub fn from_completion(percentage: f32) -> Self {
        let clamped = if percentage.is_nan() {
            0.0
        } else {
            percentage.clamp(0.0, 100.0)
        };

        if clamped <= 25.0 {
            Self::Seedling
        } else if clamped <= 50.0 {
            Self::Sapling
        } else if clamped <= 75.0 {
            Self::Young
        } else {
            Self::Mature
        }
    }

    /// Numeric tier in `1..=4`.
    #[must_use]
    pub const fn get(self) -> u8 {
        match self {
            Self::Seedling => 1,
            Self::Sapling => 2,
            Self::Young => 3,
            Self::Mature => 4,
        }
    }

    /// Looks up the stage for a numeric tier.
    #[must_use]
    pub const fn from_number(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Seedling),
            2 => Some(Self::Sapling),
            3 => Some(Self::Young),
            4 => Some(Self::Mature),
            _ => None,
        }
    }
}

/// Animation phase of a growth node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Motion {
    /// Resting at either the baseline or the apex.
    Idle,
    /// Climbing toward the apex.
    Rising,
    /// Sinking toward the baseline.
    Falling,
}

impl Motion {
    /// Reports whether the node is at rest.
    #[must_use]
    pub const fn is_idle(self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// Animated portion of a growth node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionState {
    /// Vertical coordinate, the only animated position component.
    pub height: f32,
    /// Rotation around the vertical axis in radians.
    pub facing: f32,
    /// Current animation phase.
    pub motion: Motion,
    /// Set once a rise completes and cleared when the node leaves the apex.
    pub has_reached_apex: bool,
}

impl MotionState {
    /// Resting state at the provided baseline.
    #[must_use]
    pub const fn resting_at(baseline: f32) -> Self {
        Self {
            height: baseline,
            facing: 0.0,
            motion: Motion::Idle,
            has_reached_apex: false,
        }
    }
}

/// Fixed ground position of a growth node on the island.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlotPosition {
    /// Lateral coordinate.
    pub x: f32,
    /// Depth coordinate.
    pub z: f32,
}

impl SlotPosition {
    /// Creates a new slot position.
    #[must_use]
    pub const fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    /// World-space point of the slot lifted to the provided height.
    #[must_use]
    pub fn at_height(self, height: f32) -> Vec3 {
        Vec3::new(self.x, height, self.z)
    }
}

/// Camera placement expressed as an eye position and a look-at point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    /// Eye position in world space.
    pub position: Vec3,
    /// Point the camera aims at.
    pub look_at: Vec3,
}

impl CameraPose {
    /// Creates a new camera pose.
    #[must_use]
    pub const fn new(position: Vec3, look_at: Vec3) -> Self {
        Self { position, look_at }
    }

    /// Moves both the eye and the look-at point by `factor` of the remaining
    /// distance toward `target`.
    #[must_use]
    pub fn converge_toward(self, target: CameraPose, factor: f32) -> Self {
        Self {
            position: self.position.lerp(target.position, factor),
            look_at: self.look_at.lerp(target.look_at, factor),
        }
    }

    /// Largest of the eye and look-at distances to `other`.
    #[must_use]
    pub fn distance_to(&self, other: &CameraPose) -> f32 {
        self.position
            .distance(other.position)
            .max(self.look_at.distance(other.look_at))
    }
}

/// Destination the camera is currently converging toward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConvergenceMode {
    /// Following the focused node.
    Follow,
    /// Relaxing back to the home pose.
    Home,
}

/// Reasons the world refuses to change a node's motion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MotionRejection {
    /// The node's summary disappeared and the node awaits removal.
    PendingRemoval,
    /// No node with the provided identifier exists.
    UnknownNode,
    /// A node may only rest at its baseline or apex.
    MidFlight,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the full list of sprint summaries; the world diffs it by id.
    SyncSummaries {
        /// Ordered summaries produced by the aggregation layer.
        summaries: Vec<SprintSummary>,
    },
    /// Starts a new frame.
    Tick,
    /// Overrides the animation phase of a node.
    SetMotion {
        /// Node whose motion changes.
        node: SprintId,
        /// Phase to enter.
        motion: Motion,
    },
    /// Stores the outcome of one animation step for a node.
    ApplyMotionStep {
        /// Node that advanced.
        node: SprintId,
        /// Phase the step was computed from.
        from: Motion,
        /// State after the step.
        step: MotionState,
    },
    /// Focuses the provided node for camera follow and popup display.
    FocusNode {
        /// Node receiving focus.
        node: SprintId,
    },
    /// Clears the current focus and sends the camera home.
    ReleaseFocus,
    /// Stores one camera convergence step.
    AdvanceCamera {
        /// Convergence the step was computed for.
        mode: ConvergenceMode,
        /// Pose after the step.
        pose: CameraPose,
        /// Pose the camera is converging toward.
        target: CameraPose,
        /// Whether the step landed within the settle epsilon.
        settled: bool,
    },
    /// Places the camera manually while free camera control is active.
    PlaceCamera {
        /// Requested pose.
        pose: CameraPose,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that a new frame started.
    FrameAdvanced {
        /// Zero-based index of the frame.
        frame: u64,
    },
    /// Confirms that a node was created for a new summary.
    NodePlanted {
        /// Identifier of the node.
        node: SprintId,
        /// Slot assigned for the node's lifetime.
        slot: SlotPosition,
        /// Stage derived from the summary.
        stage: GrowthStage,
    },
    /// Reports that a sync changed a node's stage.
    NodeStageChanged {
        /// Identifier of the node.
        node: SprintId,
        /// Stage before the sync.
        from: GrowthStage,
        /// Stage after the sync.
        to: GrowthStage,
    },
    /// Reports that the summary attached to a node changed.
    NodeSummaryRefreshed {
        /// Identifier of the node.
        node: SprintId,
    },
    /// Reports that a node lost its summary but is still animating.
    NodeRemovalDeferred {
        /// Identifier of the node.
        node: SprintId,
    },
    /// Reports that a summary reappeared before its node was removed.
    NodeRestored {
        /// Identifier of the node.
        node: SprintId,
    },
    /// Confirms that a node was removed from the registry.
    NodeRemoved {
        /// Identifier of the node.
        node: SprintId,
    },
    /// Confirms that a node entered a new animation phase.
    MotionChanged {
        /// Identifier of the node.
        node: SprintId,
        /// Phase that became active.
        motion: Motion,
    },
    /// Reports that a motion change was refused.
    MotionRejected {
        /// Identifier of the node.
        node: SprintId,
        /// Reason for the refusal.
        reason: MotionRejection,
    },
    /// Fires exactly once when a rise completes.
    ApexReached {
        /// Identifier of the node.
        node: SprintId,
    },
    /// Fires when a fall completes.
    BaselineReached {
        /// Identifier of the node.
        node: SprintId,
    },
    /// Announces that focus moved to a node.
    FocusChanged {
        /// Node that gained focus.
        focused: SprintId,
        /// Node that held focus before, if any.
        previous: Option<SprintId>,
    },
    /// Announces that focus was cleared.
    FocusReleased {
        /// Node that lost focus.
        node: SprintId,
    },
    /// Signals that a camera convergence finished and free control resumed.
    CameraSettled {
        /// Convergence that finished.
        mode: ConvergenceMode,
    },
    /// Reports that a manual camera placement arrived while converging.
    CameraPlacementRejected,
}

/// Immutable representation of a single node used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeSnapshot {
    /// Identifier of the node.
    pub id: SprintId,
    /// Ground slot of the node.
    pub slot: SlotPosition,
    /// Stage shown while the node rests.
    pub stage: GrowthStage,
    /// Animated state.
    pub state: MotionState,
    /// Whether the node's summary disappeared.
    pub pending_removal: bool,
}

impl NodeSnapshot {
    /// Live world-space position of the node.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.slot.at_height(self.state.height)
    }
}

/// Read-only snapshot describing all nodes in planting order.
#[derive(Clone, Debug, Default)]
pub struct NodeView {
    snapshots: Vec<NodeSnapshot>,
}

impl NodeView {
    /// Creates a new node view from snapshots already in planting order.
    #[must_use]
    pub fn from_snapshots(snapshots: Vec<NodeSnapshot>) -> Self {
        Self { snapshots }
    }

    /// Iterator over the captured snapshots.
    pub fn iter(&self) -> impl Iterator<Item = &NodeSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a node.
    #[must_use]
    pub fn get(&self, node: &SprintId) -> Option<&NodeSnapshot> {
        self.snapshots.iter().find(|snapshot| &snapshot.id == node)
    }

    /// Number of nodes captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<NodeSnapshot> {
        self.snapshots
    }
}

/// Read-only snapshot of the focus state.
#[derive(Clone, Debug, PartialEq)]
pub struct FocusView {
    /// Node currently focused, if any.
    pub focused: Option<SprintId>,
    /// Node focused before the current one, if any.
    pub previous: Option<SprintId>,
    /// Look-at point of the most recent camera target.
    pub camera_target: Vec3,
    /// Convergence in progress, if any.
    pub convergence: Option<ConvergenceMode>,
}

impl FocusView {
    /// Whether the camera is converging toward the focused node.
    #[must_use]
    pub fn camera_converging(&self) -> bool {
        self.convergence == Some(ConvergenceMode::Follow)
    }

    /// Whether the camera is relaxing toward the home pose.
    #[must_use]
    pub fn reset_converging(&self) -> bool {
        self.convergence == Some(ConvergenceMode::Home)
    }

    /// Whether manual camera control is available.
    #[must_use]
    pub fn camera_free(&self) -> bool {
        self.convergence.is_none()
    }
}
