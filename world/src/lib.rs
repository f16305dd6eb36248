#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative state of the growth visualization: the node registry, the
//! focus record and the camera rig.

mod focus;
mod registry;

use grove_core::{
    CameraPose, Command, ConfigError, ConvergenceMode, EngineConfig, Event, Motion,
    MotionRejection, MotionState, SlotPosition, SprintId,
};

use self::{focus::FocusState, registry::Registry};

/// Represents the authoritative growth visualization state.
#[derive(Debug)]
pub struct World {
    baseline: f32,
    apex: f32,
    slots: Vec<SlotPosition>,
    registry: Registry,
    focus: FocusState,
    camera: CameraPose,
    frame: u64,
}

impl World {
    /// Creates an empty world with the camera resting at the home pose.
    ///
    /// Returns an error when the configuration would stall the animation.
    pub fn new(config: &EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let home = config.camera.home;
        Ok(Self {
            baseline: config.motion.baseline,
            apex: config.motion.apex,
            slots: config.slots.clone(),
            registry: Registry::default(),
            focus: FocusState::new(home.look_at),
            camera: home,
            frame: 0,
        })
    }

    fn release_focus_of(&mut self, node: &SprintId, out_events: &mut Vec<Event>) {
        if self.focus.focused() == Some(node) {
            self.release_focus(out_events);
        }
    }

    fn release_focus(&mut self, out_events: &mut Vec<Event>) {
        if let Some(node) = self.focus.release() {
            log::debug!("released focus of sprint {node}");
            out_events.push(Event::FocusReleased { node });
        }
    }

    fn set_motion(&mut self, id: SprintId, motion: Motion, out_events: &mut Vec<Event>) {
        let (baseline, apex) = (self.baseline, self.apex);
        let Some(node) = self.registry.get_mut(&id) else {
            out_events.push(Event::MotionRejected {
                node: id,
                reason: MotionRejection::UnknownNode,
            });
            return;
        };

        let state = &mut node.state;
        let changed = match motion {
            Motion::Rising => {
                if node.pending_removal {
                    out_events.push(Event::MotionRejected {
                        node: id,
                        reason: MotionRejection::PendingRemoval,
                    });
                    return;
                }
                let at_apex = state.motion.is_idle() && state.has_reached_apex;
                if state.motion == Motion::Rising || at_apex {
                    false
                } else {
                    state.motion = Motion::Rising;
                    true
                }
            }
            Motion::Falling => {
                let at_baseline = state.motion.is_idle() && state.height <= baseline;
                if state.motion == Motion::Falling || at_baseline {
                    false
                } else {
                    state.motion = Motion::Falling;
                    state.has_reached_apex = false;
                    true
                }
            }
            Motion::Idle => {
                if state.motion.is_idle() {
                    false
                } else if state.height <= baseline || state.height >= apex {
                    state.motion = Motion::Idle;
                    state.has_reached_apex = state.height >= apex;
                    true
                } else {
                    out_events.push(Event::MotionRejected {
                        node: id,
                        reason: MotionRejection::MidFlight,
                    });
                    return;
                }
            }
        };

        if changed {
            log::trace!("sprint {id} entered {motion:?}");
            out_events.push(Event::MotionChanged { node: id, motion });
        }
    }

    fn apply_motion_step(
        &mut self,
        id: SprintId,
        from: Motion,
        step: MotionState,
        out_events: &mut Vec<Event>,
    ) {
        let (baseline, apex) = (self.baseline, self.apex);
        let Some(node) = self.registry.get_mut(&id) else {
            return;
        };
        if node.state.motion != from || from.is_idle() {
            log::trace!("dropping stale step for sprint {id}");
            return;
        }

        let height = step.height.clamp(baseline, apex);
        let settles = match from {
            Motion::Rising => height >= apex,
            Motion::Falling => height <= baseline,
            Motion::Idle => false,
        };
        let motion = if step.motion.is_idle() && settles {
            Motion::Idle
        } else {
            from
        };

        node.state = MotionState {
            height,
            facing: step.facing,
            motion,
            has_reached_apex: false,
        };

        if motion.is_idle() {
            match from {
                Motion::Rising => {
                    node.state.height = apex;
                    node.state.has_reached_apex = true;
                    out_events.push(Event::ApexReached { node: id.clone() });
                }
                Motion::Falling => {
                    node.state.height = baseline;
                    out_events.push(Event::BaselineReached { node: id.clone() });
                }
                Motion::Idle => {}
            }

            if self.registry.reap_if_settled(&id) {
                out_events.push(Event::NodeRemoved { node: id.clone() });
                self.release_focus_of(&id, out_events);
            }
        }
    }

    fn focus_node(&mut self, id: SprintId, out_events: &mut Vec<Event>) {
        if self.focus.focused() == Some(&id) {
            return;
        }
        let Some(node) = self.registry.get(&id) else {
            return;
        };
        if node.pending_removal {
            return;
        }

        let summary = node.summary.clone();
        let previous = self.focus.focus(id.clone(), summary);
        log::debug!("focused sprint {id}");
        out_events.push(Event::FocusChanged {
            focused: id,
            previous,
        });
    }

    fn advance_camera(
        &mut self,
        mode: ConvergenceMode,
        pose: CameraPose,
        target: CameraPose,
        settled: bool,
        out_events: &mut Vec<Event>,
    ) {
        if self.focus.convergence() != Some(mode) {
            log::trace!("dropping stale {mode:?} camera step");
            return;
        }

        self.camera = pose;
        self.focus.aim(target.look_at);
        if settled && self.focus.settle(mode) {
            log::debug!("camera settled after {mode:?} convergence");
            out_events.push(Event::CameraSettled { mode });
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::SyncSummaries { summaries } => {
            let outcome =
                world
                    .registry
                    .sync(&summaries, &world.slots, world.baseline, out_events);
            for id in &outcome.refreshed {
                if let Some(node) = world.registry.get(id) {
                    world.focus.refresh_summary(&node.summary);
                }
            }
            for id in &outcome.removed {
                world.release_focus_of(id, out_events);
            }
        }
        Command::Tick => {
            out_events.push(Event::FrameAdvanced { frame: world.frame });
            world.frame = world.frame.saturating_add(1);
        }
        Command::SetMotion { node, motion } => world.set_motion(node, motion, out_events),
        Command::ApplyMotionStep { node, from, step } => {
            world.apply_motion_step(node, from, step, out_events);
        }
        Command::FocusNode { node } => world.focus_node(node, out_events),
        Command::ReleaseFocus => world.release_focus(out_events),
        Command::AdvanceCamera {
            mode,
            pose,
            target,
            settled,
        } => world.advance_camera(mode, pose, target, settled, out_events),
        Command::PlaceCamera { pose } => {
            if world.focus.convergence().is_some() {
                out_events.push(Event::CameraPlacementRejected);
            } else {
                world.camera = pose;
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use grove_core::{CameraPose, FocusView, NodeView, SprintId, SprintSummary};

    use super::World;

    /// Captures a read-only view of every node in planting order.
    #[must_use]
    pub fn node_view(world: &World) -> NodeView {
        NodeView::from_snapshots(world.registry.snapshots())
    }

    /// Number of nodes currently registered, including those awaiting removal.
    #[must_use]
    pub fn node_count(world: &World) -> usize {
        world.registry.len()
    }

    /// Captures a read-only view of the focus state.
    #[must_use]
    pub fn focus_view(world: &World) -> FocusView {
        world.focus.view()
    }

    /// Current camera pose.
    #[must_use]
    pub fn camera_pose(world: &World) -> CameraPose {
        world.camera
    }

    /// Latest summary attached to a node.
    #[must_use]
    pub fn summary<'world>(world: &'world World, node: &SprintId) -> Option<&'world SprintSummary> {
        world.registry.get(node).map(|node| &node.summary)
    }

    /// Summary of the focused sprint, exposed to the popup overlay.
    #[must_use]
    pub fn focused_summary(world: &World) -> Option<&SprintSummary> {
        world.focus.focused_summary()
    }

    /// Whether the popup overlay should be shown.
    ///
    /// Popups follow the focused node's apex flag: they appear once its rise
    /// completes and never before.
    #[must_use]
    pub fn popup_visible(world: &World) -> bool {
        world
            .focus
            .focused()
            .and_then(|id| world.registry.get(id))
            .is_some_and(|node| node.state.has_reached_apex)
    }

    /// Index of the next frame.
    #[must_use]
    pub fn frame(world: &World) -> u64 {
        world.frame
    }
}
