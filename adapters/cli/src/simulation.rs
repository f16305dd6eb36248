//! Drives the growth engine from frame input and mirrors it into a scene.

use anyhow::Result;
use grove_core::{Event, SprintId};
use grove_engine::GrowthEngine;
use grove_rendering::{
    CameraPresentation, FrameInput, IslandPresentation, NodePresentation, NodeVisual,
    PopupPresentation, Scene,
};

/// Owns the engine and translates between it and the rendering contracts.
#[derive(Debug)]
pub(crate) struct Simulation {
    engine: GrowthEngine,
}

impl Simulation {
    /// Wraps an engine whose data has already been loaded.
    pub(crate) fn new(engine: GrowthEngine) -> Self {
        Self { engine }
    }

    /// Engine driven by the simulation.
    pub(crate) fn engine(&self) -> &GrowthEngine {
        &self.engine
    }

    /// Scene matching the engine's current state.
    pub(crate) fn initial_scene(&self) -> Result<Scene> {
        let camera = CameraPresentation::new(
            self.engine.camera_pose(),
            self.engine.config().camera.fov_degrees,
        )?;
        let mut scene = Scene::new(IslandPresentation::default(), Vec::new(), camera, None);
        self.populate(&mut scene, None);
        Ok(scene)
    }

    /// Applies one frame of input, ticks the engine and refreshes the scene.
    ///
    /// Dismissal is applied before activation so a click that closes one
    /// popup and selects another node in the same frame ends focused on the
    /// new node.
    pub(crate) fn advance(&mut self, input: FrameInput, scene: &mut Scene) {
        let FrameInput {
            activate,
            hovered,
            dismiss_popup,
            orbit,
        } = input;

        if dismiss_popup {
            self.engine.dismiss_popup();
        }
        if let Some(node) = activate {
            self.engine.activate(node);
        }
        if let Some(pose) = orbit {
            let _ = self.engine.place_camera(pose);
        }

        self.engine.tick();
        self.log_events();
        self.populate(scene, hovered.as_ref());
    }

    fn log_events(&mut self) {
        for event in self.engine.drain_events() {
            match event {
                Event::ApexReached { node } => log::info!("sprint {node} reached its apex"),
                Event::NodeRemoved { node } => log::info!("sprint {node} left the island"),
                Event::FocusChanged { focused, previous } => match previous {
                    Some(previous) => log::debug!("focus moved from {previous} to {focused}"),
                    None => log::debug!("focus moved to {focused}"),
                },
                Event::FrameAdvanced { .. } => {}
                other => log::trace!("{other:?}"),
            }
        }
    }

    fn populate(&self, scene: &mut Scene, hovered: Option<&SprintId>) {
        scene.nodes = self
            .engine
            .node_draw_states()
            .into_iter()
            .map(|node| {
                let position = node.position();
                NodePresentation::new(
                    node.id,
                    position,
                    node.rotation_y,
                    node.stage,
                    NodeVisual::Stage(node.stage),
                )
            })
            .collect();
        scene.camera.pose = self.engine.camera_pose();

        scene.popup = self
            .engine
            .popup_visible()
            .then(|| self.engine.focused_summary())
            .flatten()
            .map(|summary| {
                let popup = PopupPresentation::from_summary(summary);
                match self.engine.report(&summary.id) {
                    Some(report) => popup.with_member_stats(report.member_stats.clone()),
                    None => popup,
                }
            });

        scene.tooltip = hovered
            .and_then(|id| scene.node(id))
            .map(tooltip_text);
    }
}

/// Hover text naming the slot of a node.
pub(crate) fn tooltip_text(node: &NodePresentation) -> String {
    format!(
        "Tree at position [{}, {}]",
        node.position.x, node.position.z
    )
}
