//! Tracking of drawing surface loss and restoration.

/// Change in drawing surface availability reported by a backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// The graphics context was lost, for example after a driver reset.
    Lost,
    /// The graphics context is available again.
    Restored,
}

/// Suspends drawing while the surface is lost.
///
/// Only drawing stops: the simulation keeps ticking, so the first frame after
/// restoration shows the current state without replaying missed frames.
#[derive(Clone, Copy, Debug, Default)]
pub struct SurfaceTracker {
    lost: bool,
    losses: u32,
}

impl SurfaceTracker {
    /// Creates a tracker for an available surface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a surface event. Returns `true` when availability changed.
    pub fn observe(&mut self, event: SurfaceEvent) -> bool {
        match event {
            SurfaceEvent::Lost if !self.lost => {
                self.lost = true;
                self.losses = self.losses.saturating_add(1);
                log::warn!("drawing surface lost; waiting for restoration");
                true
            }
            SurfaceEvent::Restored if self.lost => {
                self.lost = false;
                log::info!("drawing surface restored");
                true
            }
            _ => false,
        }
    }

    /// Whether frames may be drawn.
    #[must_use]
    pub fn can_draw(&self) -> bool {
        !self.lost
    }

    /// Number of losses observed so far.
    #[must_use]
    pub fn losses(&self) -> u32 {
        self.losses
    }
}
