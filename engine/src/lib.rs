#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame orchestration for the growth visualization.
//!
//! [`GrowthEngine`] owns the authoritative world and the pure systems and
//! pumps commands between them in a fixed order. Hosts only ever call
//! [`GrowthEngine::sync`], [`GrowthEngine::activate`],
//! [`GrowthEngine::dismiss_popup`] and [`GrowthEngine::tick`], and read the
//! exposed draw state.

use glam::Vec3;
use grove_core::{
    CameraPose, Command, ConfigError, EngineConfig, Event, FocusView, GrowthStage, NodeView,
    SprintId, SprintRecord, SprintReport, SprintSummary,
};
use grove_system_analytics::Analytics;
use grove_system_animation::Animation;
use grove_system_camera::CameraController;
use grove_system_selection::{Selection, SelectionInput};
use grove_world::{self as world, query, World};

/// Most events the journal keeps between two drains; older ones are dropped.
pub const JOURNAL_LIMIT: usize = 4_096;

/// Placement of one node handed to the renderer each frame.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeDrawState {
    /// Identifier of the node.
    pub id: SprintId,
    /// Lateral coordinate of the node's slot.
    pub x: f32,
    /// Current height.
    pub y: f32,
    /// Depth coordinate of the node's slot.
    pub z: f32,
    /// Rotation around the vertical axis in radians.
    pub rotation_y: f32,
    /// Stage whose asset should be shown.
    pub stage: GrowthStage,
}

impl NodeDrawState {
    /// World-space position of the node.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

/// Owns the world and runs the systems once per frame.
///
/// Every applied command is recorded in an event journal. Hosts that care
/// about events should call [`GrowthEngine::drain_events`] once per frame;
/// an undrained journal keeps only the newest [`JOURNAL_LIMIT`] events.
#[derive(Debug)]
pub struct GrowthEngine {
    config: EngineConfig,
    world: World,
    analytics: Analytics,
    animation: Animation,
    camera: CameraController,
    selection: Selection,
    journal: Vec<Event>,
}

impl GrowthEngine {
    /// Creates an engine with no nodes.
    ///
    /// Every tuning value is validated here, before the first frame runs.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        let world = World::new(&config)?;
        let animation = Animation::new(config.motion)?;
        let camera = CameraController::new(config.camera)?;
        log::debug!(
            "growth engine ready with {} slot positions",
            config.slots.len()
        );

        Ok(Self {
            config,
            world,
            analytics: Analytics::new(),
            animation,
            camera,
            selection: Selection::new(),
            journal: Vec::new(),
        })
    }

    /// Configuration the engine was built with.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replaces the summary list and returns the resulting nodes.
    pub fn sync(&mut self, summaries: Vec<SprintSummary>) -> NodeView {
        self.execute(vec![Command::SyncSummaries { summaries }]);
        query::node_view(&self.world)
    }

    /// Queues raw board records; their summaries are synced on the next frame.
    pub fn submit_records(&mut self, records: Vec<SprintRecord>) {
        self.analytics.submit(records);
    }

    /// Reports aggregated from the last processed board records.
    #[must_use]
    pub fn reports(&self) -> &[SprintReport] {
        self.analytics.reports()
    }

    /// Report of one sprint aggregated from board records.
    #[must_use]
    pub fn report(&self, sprint: &SprintId) -> Option<&SprintReport> {
        self.analytics.report(sprint)
    }

    /// Handles a pointer activation of a node.
    pub fn activate(&mut self, node: SprintId) {
        self.handle_input(&SelectionInput::activate(node));
    }

    /// Handles the popup close control.
    pub fn dismiss_popup(&mut self) {
        self.handle_input(&SelectionInput::dismiss());
    }

    /// Applies one batch of host input immediately.
    pub fn handle_input(&mut self, input: &SelectionInput) {
        if input.is_empty() {
            return;
        }
        let mut commands = Vec::new();
        self.selection.handle(
            input,
            &query::node_view(&self.world),
            &query::focus_view(&self.world),
            &mut commands,
        );
        self.execute(commands);
    }

    /// Places the camera manually. Returns `false` while a convergence owns the camera.
    pub fn place_camera(&mut self, pose: CameraPose) -> bool {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::PlaceCamera { pose }, &mut events);
        let accepted = !events.contains(&Event::CameraPlacementRejected);
        self.journal.extend(events);
        accepted
    }

    /// Runs one frame: pending analytics, then animation, then the camera.
    pub fn tick(&mut self) {
        let mut frame_events = Vec::new();
        world::apply(&mut self.world, Command::Tick, &mut frame_events);
        self.journal.extend(frame_events.iter().cloned());

        let mut commands = Vec::new();
        self.analytics.handle(&frame_events, &mut commands);
        self.execute(commands);

        let mut commands = Vec::new();
        self.animation
            .handle(&frame_events, &query::node_view(&self.world), &mut commands);
        self.execute(commands);

        let mut commands = Vec::new();
        self.camera.handle(
            &frame_events,
            &query::focus_view(&self.world),
            &query::node_view(&self.world),
            query::camera_pose(&self.world),
            &mut commands,
        );
        self.execute(commands);
        self.trim_journal();
    }

    /// Draw state of every node in planting order.
    #[must_use]
    pub fn node_draw_states(&self) -> Vec<NodeDrawState> {
        query::node_view(&self.world)
            .iter()
            .map(|node| NodeDrawState {
                id: node.id.clone(),
                x: node.slot.x,
                y: node.state.height,
                z: node.slot.z,
                rotation_y: node.state.facing,
                stage: node.stage,
            })
            .collect()
    }

    /// Read-only view of every node.
    #[must_use]
    pub fn node_view(&self) -> NodeView {
        query::node_view(&self.world)
    }

    /// Read-only view of the focus state.
    #[must_use]
    pub fn focus_view(&self) -> FocusView {
        query::focus_view(&self.world)
    }

    /// Current camera pose.
    #[must_use]
    pub fn camera_pose(&self) -> CameraPose {
        query::camera_pose(&self.world)
    }

    /// Summary of the focused sprint, if any.
    #[must_use]
    pub fn focused_summary(&self) -> Option<&SprintSummary> {
        query::focused_summary(&self.world)
    }

    /// Whether the popup overlay should be shown.
    #[must_use]
    pub fn popup_visible(&self) -> bool {
        query::popup_visible(&self.world)
    }

    /// Index of the next frame.
    #[must_use]
    pub fn frame(&self) -> u64 {
        query::frame(&self.world)
    }

    /// Takes every event recorded since the last call, up to [`JOURNAL_LIMIT`].
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.journal)
    }

    fn trim_journal(&mut self) {
        let excess = self.journal.len().saturating_sub(JOURNAL_LIMIT);
        if excess > 0 {
            let _ = self.journal.drain(..excess);
        }
    }

    fn execute(&mut self, commands: Vec<Command>) {
        for command in commands {
            world::apply(&mut self.world, command, &mut self.journal);
        }
    }
}
