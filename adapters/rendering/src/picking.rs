//! Screen-space projection and pointer picking of nodes.

use glam::{Mat4, Vec2, Vec3};
use grove_core::SprintId;

use crate::{CameraPresentation, RenderingError, Scene};

/// Largest cursor distance, in pixels, at which a node is still picked.
pub const PICK_RADIUS_PIXELS: f32 = 48.0;

/// Height above a node's anchor that the pointer aims at.
const PICK_CENTER_HEIGHT: f32 = 0.5;

const NEAR_PLANE: f32 = 0.1;
const FAR_PLANE: f32 = 100.0;

/// Drawable area in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    width: f32,
    height: f32,
}

impl Viewport {
    /// Creates a viewport, rejecting empty or non-finite sizes.
    pub fn new(width: f32, height: f32) -> Result<Self, RenderingError> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(RenderingError::EmptyViewport { width, height });
        }
        Ok(Self { width, height })
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.height
    }

    fn aspect(&self) -> f32 {
        self.width / self.height
    }
}

/// Combined projection and view matrix of the camera.
#[must_use]
pub fn view_projection(camera: &CameraPresentation, viewport: Viewport) -> Mat4 {
    let projection = Mat4::perspective_rh_gl(
        camera.fov_degrees.to_radians(),
        viewport.aspect(),
        NEAR_PLANE,
        FAR_PLANE,
    );
    let view = Mat4::look_at_rh(camera.pose.position, camera.pose.look_at, Vec3::Y);
    projection * view
}

/// Projects a world-space point to pixel coordinates with the origin at the
/// top-left corner. Points outside the view volume yield `None`.
#[must_use]
pub fn project_point(camera: &CameraPresentation, viewport: Viewport, point: Vec3) -> Option<Vec2> {
    let clip = view_projection(camera, viewport) * point.extend(1.0);
    if clip.w <= f32::EPSILON {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    if !(-1.0..=1.0).contains(&ndc.z) {
        return None;
    }
    Some(Vec2::new(
        (ndc.x + 1.0) * 0.5 * viewport.width,
        (1.0 - ndc.y) * 0.5 * viewport.height,
    ))
}

/// Node closest to the cursor within [`PICK_RADIUS_PIXELS`].
#[must_use]
pub fn pick_node(scene: &Scene, viewport: Viewport, cursor: Vec2) -> Option<SprintId> {
    scene
        .nodes
        .iter()
        .filter_map(|node| {
            let center = node.position + Vec3::Y * PICK_CENTER_HEIGHT;
            let screen = project_point(&scene.camera, viewport, center)?;
            let distance = screen.distance(cursor);
            (distance <= PICK_RADIUS_PIXELS).then_some((distance, &node.id))
        })
        .min_by(|left, right| left.0.total_cmp(&right.0))
        .map(|(_, id)| id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{IslandPresentation, NodePresentation, NodeVisual};
    use grove_core::{CameraPose, GrowthStage};

    fn camera() -> CameraPresentation {
        CameraPresentation::new(
            CameraPose::new(Vec3::new(5.0, 5.0, 10.0), Vec3::ZERO),
            45.0,
        )
        .expect("valid camera")
    }

    fn node(id: &str, x: f32, z: f32) -> NodePresentation {
        NodePresentation::new(
            SprintId::new(id),
            Vec3::new(x, 0.2, z),
            0.0,
            GrowthStage::Seedling,
            NodeVisual::Stage(GrowthStage::Seedling),
        )
    }

    fn scene() -> Scene {
        Scene::new(
            IslandPresentation::default(),
            vec![node("S1", -2.8, -2.0), node("S2", 2.8, -2.0)],
            camera(),
            None,
        )
    }

    #[test]
    fn look_at_point_projects_to_viewport_center() {
        let viewport = Viewport::new(800.0, 600.0).expect("valid viewport");
        let center = project_point(&camera(), viewport, Vec3::ZERO).expect("visible");
        assert!((center - Vec2::new(400.0, 300.0)).length() < 1e-2);
    }

    #[test]
    fn points_behind_camera_are_not_projected() {
        let viewport = Viewport::new(800.0, 600.0).expect("valid viewport");
        assert!(project_point(&camera(), viewport, Vec3::new(10.0, 10.0, 20.0)).is_none());
    }

    #[test]
    fn cursor_over_node_picks_it() {
        let scene = scene();
        let viewport = Viewport::new(960.0, 960.0).expect("valid viewport");
        let target = Vec3::new(2.8, 0.2 + PICK_CENTER_HEIGHT, -2.0);
        let cursor = project_point(&scene.camera, viewport, target).expect("visible");

        assert_eq!(
            pick_node(&scene, viewport, cursor + Vec2::new(3.0, -2.0)),
            Some(SprintId::new("S2"))
        );
    }

    #[test]
    fn cursor_far_from_nodes_picks_nothing() {
        let scene = scene();
        let viewport = Viewport::new(960.0, 960.0).expect("valid viewport");
        assert_eq!(pick_node(&scene, viewport, Vec2::new(2.0, 2.0)), None);
    }

    #[test]
    fn empty_viewport_is_rejected() {
        assert!(matches!(
            Viewport::new(0.0, 600.0),
            Err(RenderingError::EmptyViewport { .. })
        ));
    }
}
