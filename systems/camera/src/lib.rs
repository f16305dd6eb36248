#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Camera controller that eases the view toward the focused node or home.

use grove_core::{
    CameraPose, CameraTuning, Command, ConfigError, ConvergenceMode, Event, FocusView, Motion,
    NodeView,
};

/// Pure system that proposes one camera convergence step per frame.
#[derive(Debug)]
pub struct CameraController {
    tuning: CameraTuning,
}

impl CameraController {
    /// Creates a controller, rejecting convergence laws that never settle.
    pub fn new(tuning: CameraTuning) -> Result<Self, ConfigError> {
        tuning.validate()?;
        Ok(Self { tuning })
    }

    /// Tuning the controller converges with.
    #[must_use]
    pub fn tuning(&self) -> &CameraTuning {
        &self.tuning
    }

    /// Pose the active convergence is heading for, if it has one.
    ///
    /// A follow target tracks the node's live position, so it moves every
    /// frame while the node rises.
    #[must_use]
    pub fn target(&self, focus: &FocusView, nodes: &NodeView) -> Option<CameraPose> {
        match focus.convergence? {
            ConvergenceMode::Follow => {
                let node = nodes.get(focus.focused.as_ref()?)?;
                Some(self.tuning.follow_pose(node.position()))
            }
            ConvergenceMode::Home => Some(self.tuning.home),
        }
    }

    /// Emits a convergence step when a frame starts and a convergence is active.
    ///
    /// A follow convergence never settles while the focused node is still
    /// rising, however close the camera already is.
    pub fn handle(
        &self,
        events: &[Event],
        focus: &FocusView,
        nodes: &NodeView,
        current: CameraPose,
        out: &mut Vec<Command>,
    ) {
        if !events
            .iter()
            .any(|event| matches!(event, Event::FrameAdvanced { .. }))
        {
            return;
        }
        let Some(mode) = focus.convergence else {
            return;
        };
        let Some(target) = self.target(focus, nodes) else {
            log::trace!("no {mode:?} target this frame");
            return;
        };

        let pose = current.converge_toward(target, self.tuning.convergence);
        let settled = pose.distance_to(&target) < self.tuning.epsilon
            && !(mode == ConvergenceMode::Follow && focused_rising(focus, nodes));
        out.push(Command::AdvanceCamera {
            mode,
            pose,
            target,
            settled,
        });
    }
}

fn focused_rising(focus: &FocusView, nodes: &NodeView) -> bool {
    focus
        .focused
        .as_ref()
        .and_then(|id| nodes.get(id))
        .is_some_and(|node| node.state.motion == Motion::Rising)
}
