#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Selection coordinator translating pointer input into motion and focus commands.
//!
//! The coordinator is the only place that decides which node rises. It keeps
//! at most one node rising or at apex by lowering the previous focus before
//! raising the next one.

use grove_core::{Command, FocusView, Motion, NodeView, SprintId};

/// Host input gathered for a single frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionInput {
    /// Node the pointer activated this frame, if any.
    pub activate: Option<SprintId>,
    /// Whether the popup close control was used this frame.
    pub dismiss_popup: bool,
}

impl SelectionInput {
    /// Input activating the provided node.
    #[must_use]
    pub fn activate(node: SprintId) -> Self {
        Self {
            activate: Some(node),
            dismiss_popup: false,
        }
    }

    /// Input dismissing the popups.
    #[must_use]
    pub fn dismiss() -> Self {
        Self {
            activate: None,
            dismiss_popup: true,
        }
    }

    /// Reports whether the input carries no request.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.activate.is_none() && !self.dismiss_popup
    }
}

/// Pure system that arbitrates node activation.
#[derive(Debug, Default)]
pub struct Selection;

impl Selection {
    /// Creates a new selection coordinator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Translates one frame of input into commands.
    ///
    /// Dismissal is handled before activation so a frame carrying both ends
    /// with the activated node focused.
    pub fn handle(
        &self,
        input: &SelectionInput,
        nodes: &NodeView,
        focus: &FocusView,
        out: &mut Vec<Command>,
    ) {
        let mut focused = focus.focused.clone();

        if input.dismiss_popup {
            if let Some(node) = focused.take() {
                self.dismiss(node, out);
            }
        }

        if let Some(node) = &input.activate {
            self.activate(node, focused.as_ref(), nodes, out);
        }
    }

    fn activate(
        &self,
        node: &SprintId,
        focused: Option<&SprintId>,
        nodes: &NodeView,
        out: &mut Vec<Command>,
    ) {
        let Some(snapshot) = nodes.get(node) else {
            log::debug!("ignoring activation of unknown sprint {node}");
            return;
        };
        if snapshot.pending_removal {
            log::debug!("ignoring activation of sprint {node} awaiting removal");
            return;
        }

        let state = snapshot.state;
        if focused == Some(node) {
            let at_apex = state.motion.is_idle() && state.has_reached_apex;
            if state.motion == Motion::Rising || at_apex {
                return;
            }
        }

        if let Some(previous) = focused.filter(|previous| *previous != node) {
            let lowering = nodes
                .get(previous)
                .map_or(true, |snapshot| snapshot.state.motion == Motion::Falling);
            if !lowering {
                out.push(Command::SetMotion {
                    node: previous.clone(),
                    motion: Motion::Falling,
                });
            }
        }

        out.push(Command::SetMotion {
            node: node.clone(),
            motion: Motion::Rising,
        });
        out.push(Command::FocusNode { node: node.clone() });
    }

    fn dismiss(&self, node: SprintId, out: &mut Vec<Command>) {
        out.push(Command::SetMotion {
            node,
            motion: Motion::Falling,
        });
        out.push(Command::ReleaseFocus);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grove_core::{ConvergenceMode, GrowthStage, MotionState, NodeSnapshot, SlotPosition};

    fn node(id: &str, state: MotionState, pending_removal: bool) -> NodeSnapshot {
        NodeSnapshot {
            id: SprintId::new(id),
            slot: SlotPosition::new(0.0, 0.0),
            stage: GrowthStage::Seedling,
            state,
            pending_removal,
        }
    }

    fn focus(focused: Option<&str>) -> FocusView {
        FocusView {
            focused: focused.map(SprintId::new),
            previous: None,
            camera_target: grove_core::CameraTuning::default().home.look_at,
            convergence: focused.map(|_| ConvergenceMode::Follow),
        }
    }

    fn rising(height: f32) -> MotionState {
        MotionState {
            height,
            facing: 0.0,
            motion: Motion::Rising,
            has_reached_apex: false,
        }
    }

    #[test]
    fn activation_raises_and_focuses() {
        let nodes = NodeView::from_snapshots(vec![node("S1", MotionState::resting_at(0.2), false)]);
        let mut out = Vec::new();

        Selection::new().handle(
            &SelectionInput::activate(SprintId::new("S1")),
            &nodes,
            &focus(None),
            &mut out,
        );

        assert_eq!(
            out,
            vec![
                Command::SetMotion {
                    node: SprintId::new("S1"),
                    motion: Motion::Rising,
                },
                Command::FocusNode {
                    node: SprintId::new("S1"),
                },
            ]
        );
    }

    #[test]
    fn reactivating_rising_focus_is_idempotent() {
        let nodes = NodeView::from_snapshots(vec![node("S1", rising(0.6), false)]);
        let mut out = Vec::new();

        Selection::new().handle(
            &SelectionInput::activate(SprintId::new("S1")),
            &nodes,
            &focus(Some("S1")),
            &mut out,
        );

        assert!(out.is_empty());
    }

    #[test]
    fn switching_focus_lowers_previous_first() {
        let nodes = NodeView::from_snapshots(vec![
            node("S1", rising(0.6), false),
            node("S2", MotionState::resting_at(0.2), false),
        ]);
        let mut out = Vec::new();

        Selection::new().handle(
            &SelectionInput::activate(SprintId::new("S2")),
            &nodes,
            &focus(Some("S1")),
            &mut out,
        );

        assert_eq!(
            out,
            vec![
                Command::SetMotion {
                    node: SprintId::new("S1"),
                    motion: Motion::Falling,
                },
                Command::SetMotion {
                    node: SprintId::new("S2"),
                    motion: Motion::Rising,
                },
                Command::FocusNode {
                    node: SprintId::new("S2"),
                },
            ]
        );
    }

    #[test]
    fn pending_removal_and_unknown_nodes_are_ignored() {
        let nodes = NodeView::from_snapshots(vec![node("S1", rising(0.6), true)]);
        let mut out = Vec::new();
        let selection = Selection::new();

        selection.handle(
            &SelectionInput::activate(SprintId::new("S1")),
            &nodes,
            &focus(None),
            &mut out,
        );
        selection.handle(
            &SelectionInput::activate(SprintId::new("ghost")),
            &nodes,
            &focus(None),
            &mut out,
        );

        assert!(out.is_empty());
    }

    #[test]
    fn dismiss_lowers_focus_and_releases() {
        let nodes = NodeView::from_snapshots(vec![node("S1", rising(0.6), false)]);
        let mut out = Vec::new();

        Selection::new().handle(&SelectionInput::dismiss(), &nodes, &focus(Some("S1")), &mut out);

        assert_eq!(
            out,
            vec![
                Command::SetMotion {
                    node: SprintId::new("S1"),
                    motion: Motion::Falling,
                },
                Command::ReleaseFocus,
            ]
        );
    }

    #[test]
    fn dismiss_without_focus_is_a_no_op() {
        let mut out = Vec::new();
        Selection::new().handle(
            &SelectionInput::dismiss(),
            &NodeView::default(),
            &focus(None),
            &mut out,
        );
        assert!(out.is_empty());
        assert!(SelectionInput::default().is_empty());
    }
}
