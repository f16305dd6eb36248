//! Single owned record of which node holds focus and where the camera heads.

use glam::Vec3;
use grove_core::{ConvergenceMode, FocusView, SprintId, SprintSummary};

/// Focus state owned by the world and mutated only through commands.
///
/// The follow and home convergences share one `Option`, so at most one of
/// them is ever active.
#[derive(Clone, Debug)]
pub(crate) struct FocusState {
    focused: Option<SprintId>,
    previous: Option<SprintId>,
    camera_target: Vec3,
    convergence: Option<ConvergenceMode>,
    focused_summary: Option<SprintSummary>,
}

impl FocusState {
    pub(crate) fn new(camera_target: Vec3) -> Self {
        Self {
            focused: None,
            previous: None,
            camera_target,
            convergence: None,
            focused_summary: None,
        }
    }

    pub(crate) fn focused(&self) -> Option<&SprintId> {
        self.focused.as_ref()
    }

    pub(crate) fn focused_summary(&self) -> Option<&SprintSummary> {
        self.focused_summary.as_ref()
    }

    pub(crate) fn convergence(&self) -> Option<ConvergenceMode> {
        self.convergence
    }

    /// Moves focus to `node` and starts following it. Returns the node that
    /// held focus before.
    pub(crate) fn focus(&mut self, node: SprintId, summary: SprintSummary) -> Option<SprintId> {
        let previous = self.focused.replace(node);
        self.previous = previous.clone();
        self.focused_summary = Some(summary);
        self.convergence = Some(ConvergenceMode::Follow);
        previous
    }

    /// Clears focus and starts the home convergence. Returns the released node.
    pub(crate) fn release(&mut self) -> Option<SprintId> {
        let released = self.focused.take()?;
        self.previous = Some(released.clone());
        self.focused_summary = None;
        self.convergence = Some(ConvergenceMode::Home);
        Some(released)
    }

    pub(crate) fn refresh_summary(&mut self, summary: &SprintSummary) {
        if self.focused.as_ref() == Some(&summary.id) {
            self.focused_summary = Some(summary.clone());
        }
    }

    pub(crate) fn aim(&mut self, camera_target: Vec3) {
        self.camera_target = camera_target;
    }

    /// Ends `mode` if it is the active convergence.
    pub(crate) fn settle(&mut self, mode: ConvergenceMode) -> bool {
        if self.convergence == Some(mode) {
            self.convergence = None;
            true
        } else {
            false
        }
    }

    pub(crate) fn view(&self) -> FocusView {
        FocusView {
            focused: self.focused.clone(),
            previous: self.previous.clone(),
            camera_target: self.camera_target,
            convergence: self.convergence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_then_release_tracks_previous_node() {
        let mut focus = FocusState::new(Vec3::ZERO);
        assert_eq!(
            focus.focus(SprintId::new("A"), SprintSummary::new("A", "A", 0.0)),
            None
        );
        assert_eq!(
            focus.focus(SprintId::new("B"), SprintSummary::new("B", "B", 0.0)),
            Some(SprintId::new("A"))
        );
        assert_eq!(focus.view().previous, Some(SprintId::new("A")));
        assert_eq!(focus.convergence(), Some(ConvergenceMode::Follow));

        assert_eq!(focus.release(), Some(SprintId::new("B")));
        assert_eq!(focus.convergence(), Some(ConvergenceMode::Home));
        assert!(focus.focused_summary().is_none());
        assert_eq!(focus.release(), None);
    }

    #[test]
    fn settle_ignores_inactive_mode() {
        let mut focus = FocusState::new(Vec3::ZERO);
        let _ = focus.focus(SprintId::new("A"), SprintSummary::new("A", "A", 0.0));

        assert!(!focus.settle(ConvergenceMode::Home));
        assert_eq!(focus.convergence(), Some(ConvergenceMode::Follow));
        assert!(focus.settle(ConvergenceMode::Follow));
        assert!(focus.view().camera_free());
    }
}
