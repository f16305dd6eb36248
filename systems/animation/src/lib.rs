#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-frame rise/fall scheduler for growth nodes.
//!
//! The scheduler is purely reactive: it advances whichever nodes the world
//! reports as `Rising` or `Falling` and never decides who moves. Mutual
//! exclusion between nodes is the selection system's concern.

use grove_core::{
    Command, ConfigError, Event, Motion, MotionState, MotionTuning, NodeView,
};

/// Pure system that advances moving nodes once per frame.
#[derive(Debug)]
pub struct Animation {
    tuning: MotionTuning,
}

impl Animation {
    /// Creates a scheduler, rejecting speeds that would never reach a bound.
    pub fn new(tuning: MotionTuning) -> Result<Self, ConfigError> {
        tuning.validate()?;
        Ok(Self { tuning })
    }

    /// Tuning the scheduler advances nodes with.
    #[must_use]
    pub fn tuning(&self) -> &MotionTuning {
        &self.tuning
    }

    /// Emits one motion step per moving node when a frame starts.
    pub fn handle(&self, events: &[Event], nodes: &NodeView, out: &mut Vec<Command>) {
        if !events
            .iter()
            .any(|event| matches!(event, Event::FrameAdvanced { .. }))
        {
            return;
        }

        for node in nodes.iter() {
            if node.state.motion.is_idle() {
                continue;
            }

            let step = advance(node.state, &self.tuning);
            log::trace!(
                "sprint {} {:?} to height {:.3}",
                node.id,
                node.state.motion,
                step.height
            );
            out.push(Command::ApplyMotionStep {
                node: node.id.clone(),
                from: node.state.motion,
                step,
            });
        }
    }
}

/// Advances a single node's motion by one frame.
///
/// Heights move by fixed increments and clamp on arrival, so the apex is
/// reached exactly once per rise.
#[must_use]
pub fn advance(state: MotionState, tuning: &MotionTuning) -> MotionState {
    let mut next = state;
    match state.motion {
        Motion::Idle => {}
        Motion::Rising => {
            next.height += tuning.rise_speed;
            next.facing += tuning.turn_speed;
            if next.height >= tuning.apex {
                next.height = tuning.apex;
                next.motion = Motion::Idle;
                next.has_reached_apex = true;
            }
        }
        Motion::Falling => {
            next.height -= tuning.fall_speed;
            next.facing -= tuning.turn_speed;
            if next.height <= tuning.baseline {
                next.height = tuning.baseline;
                next.motion = Motion::Idle;
                next.has_reached_apex = false;
            }
        }
    }
    next
}
