#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Sprint Grove adapters.

mod assets;
mod picking;
mod surface;

pub use assets::StageAssets;
pub use picking::{pick_node, project_point, view_projection, Viewport, PICK_RADIUS_PIXELS};
pub use surface::{SurfaceEvent, SurfaceTracker};

use anyhow::Result as AnyResult;
use glam::Vec3;
use grove_core::{CameraPose, GrowthStage, MemberStats, SprintId, SprintSummary, TicketSample};
use std::{collections::BTreeMap, time::Duration};
use thiserror::Error;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Foliage color shared by every stage model.
pub const FOLIAGE_COLOR: Color = Color::from_rgb_u8(0x22, 0x8B, 0x22);

const PAD_COLORS: [Color; 6] = [
    Color::from_rgb_u8(0xE7, 0x4C, 0x3C),
    Color::from_rgb_u8(0x34, 0x98, 0xDB),
    Color::from_rgb_u8(0xF1, 0xC4, 0x0F),
    Color::from_rgb_u8(0x9B, 0x59, 0xB6),
    Color::from_rgb_u8(0x1A, 0xBC, 0x9C),
    Color::from_rgb_u8(0xE6, 0x7E, 0x22),
];

/// Stable pad color for a sprint, derived from its id.
#[must_use]
pub fn pad_color(id: &SprintId) -> Color {
    let hash = id
        .as_str()
        .bytes()
        .fold(0u32, |hash, byte| hash.wrapping_mul(31).wrapping_add(u32::from(byte)));
    PAD_COLORS[hash as usize % PAD_COLORS.len()]
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Node the pointer activated on this frame.
    pub activate: Option<SprintId>,
    /// Node under the pointer, if any.
    pub hovered: Option<SprintId>,
    /// Whether the popup close control was used on this frame.
    pub dismiss_popup: bool,
    /// Camera pose requested by free orbit control.
    pub orbit: Option<CameraPose>,
}

/// Hexagonal island the nodes are planted on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IslandPresentation {
    /// Circumradius of both hexagonal layers.
    pub radius: f32,
    /// Thickness of the soil layer centred on the origin.
    pub base_height: f32,
    /// Soil layer color.
    pub base_color: Color,
    /// Height of the grass layer's centre.
    pub grass_elevation: f32,
    /// Thickness of the grass layer.
    pub grass_height: f32,
    /// Grass layer color.
    pub grass_color: Color,
}

impl Default for IslandPresentation {
    fn default() -> Self {
        Self {
            radius: 5.0,
            base_height: 0.5,
            base_color: Color::from_rgb_u8(0x8B, 0x45, 0x13),
            grass_elevation: 0.3,
            grass_height: 0.1,
            grass_color: Color::from_rgb_u8(0x27, 0xAE, 0x60),
        }
    }
}

/// Visual used to draw a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeVisual {
    /// Model of the provided stage.
    Stage(GrowthStage),
    /// Neutral stand-in drawn when no stage model could be loaded.
    Placeholder,
}

/// Node ready to be drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct NodePresentation {
    /// Identifier of the node.
    pub id: SprintId,
    /// World-space anchor of the node.
    pub position: Vec3,
    /// Rotation around the vertical axis in radians.
    pub rotation_y: f32,
    /// Stage of the node.
    pub stage: GrowthStage,
    /// Visual chosen for the stage after asset fallbacks.
    pub visual: NodeVisual,
    /// Color of the hexagonal pad under the node.
    pub pad_color: Color,
}

impl NodePresentation {
    /// Creates a node presentation.
    #[must_use]
    pub fn new(
        id: SprintId,
        position: Vec3,
        rotation_y: f32,
        stage: GrowthStage,
        visual: NodeVisual,
    ) -> Self {
        let pad_color = pad_color(&id);
        Self {
            id,
            position,
            rotation_y,
            stage,
            visual,
            pad_color,
        }
    }
}

/// Perspective camera used to draw the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPresentation {
    /// Eye and look-at point.
    pub pose: CameraPose,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
}

impl CameraPresentation {
    /// Creates a camera presentation, rejecting degenerate fields of view.
    pub fn new(pose: CameraPose, fov_degrees: f32) -> Result<Self, RenderingError> {
        if !(fov_degrees > 0.0 && fov_degrees < 180.0) {
            return Err(RenderingError::InvalidFieldOfView { fov_degrees });
        }
        Ok(Self { pose, fov_degrees })
    }

    /// Pose reached by orbiting the eye around the look-at point.
    ///
    /// `yaw` turns around the vertical axis and `pitch` tilts toward the
    /// pole; the elevation stays clear of both poles and the distance to the
    /// look-at point is preserved.
    #[must_use]
    pub fn orbited(&self, yaw: f32, pitch: f32) -> CameraPose {
        let offset = self.pose.position - self.pose.look_at;
        let distance = offset.length();
        if distance <= f32::EPSILON {
            return self.pose;
        }

        let azimuth = offset.z.atan2(offset.x) + yaw;
        let elevation = ((offset.y / distance).clamp(-1.0, 1.0).asin() + pitch)
            .clamp(-MAX_ORBIT_ELEVATION, MAX_ORBIT_ELEVATION);
        let horizontal = distance * elevation.cos();
        let position = self.pose.look_at
            + Vec3::new(
                horizontal * azimuth.cos(),
                distance * elevation.sin(),
                horizontal * azimuth.sin(),
            );
        CameraPose::new(position, self.pose.look_at)
    }
}

/// Steepest elevation reachable by orbiting, in radians.
pub const MAX_ORBIT_ELEVATION: f32 = 1.4;

/// Content of the two popups shown next to a raised node.
#[derive(Clone, Debug, PartialEq)]
pub struct PopupPresentation {
    /// Sprint the popups describe.
    pub sprint: SprintId,
    /// Left popup heading.
    pub title: String,
    /// Completion shown in the left popup.
    pub completion_percentage: f32,
    /// Cumulative ticket counts shown in the right popup.
    pub ticket_series: Vec<TicketSample>,
    /// Per-member ticket statistics, when board records are available.
    pub member_stats: BTreeMap<String, MemberStats>,
}

impl PopupPresentation {
    /// Builds popup content from a sprint summary.
    #[must_use]
    pub fn from_summary(summary: &SprintSummary) -> Self {
        Self {
            sprint: summary.id.clone(),
            title: summary.name.clone(),
            completion_percentage: summary.completion_percentage,
            ticket_series: summary.ticket_series.clone(),
            member_stats: BTreeMap::new(),
        }
    }

    /// Attaches per-member statistics.
    #[must_use]
    pub fn with_member_stats(mut self, member_stats: BTreeMap<String, MemberStats>) -> Self {
        self.member_stats = member_stats;
        self
    }

    /// Lines of the left popup.
    #[must_use]
    pub fn left_lines(&self) -> Vec<String> {
        let mut lines = vec![
            self.title.clone(),
            format!("Completion: {:.0}%", self.completion_percentage),
        ];
        lines.extend(self.member_stats.iter().map(|(member, stats)| {
            format!("{member}: {} received, {} closed", stats.received, stats.closed)
        }));
        lines
    }

    /// Lines of the right popup.
    #[must_use]
    pub fn right_lines(&self) -> Vec<String> {
        if self.ticket_series.is_empty() {
            return vec!["No ticket history".to_owned()];
        }
        self.ticket_series
            .iter()
            .map(|sample| {
                format!(
                    "{}  opened {}  closed {}",
                    sample.date, sample.opened, sample.closed
                )
            })
            .collect()
    }
}

/// Scene description combining the island, nodes, camera and overlays.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Island under the nodes.
    pub island: IslandPresentation,
    /// Nodes in planting order.
    pub nodes: Vec<NodePresentation>,
    /// Camera the scene is drawn with.
    pub camera: CameraPresentation,
    /// Popups of the raised node, present only once it reached its apex.
    pub popup: Option<PopupPresentation>,
    /// Tooltip shown for the node under the pointer.
    pub tooltip: Option<String>,
}

impl Scene {
    /// Creates a new scene descriptor.
    #[must_use]
    pub fn new(
        island: IslandPresentation,
        nodes: Vec<NodePresentation>,
        camera: CameraPresentation,
        popup: Option<PopupPresentation>,
    ) -> Self {
        Self {
            island,
            nodes,
            camera,
            popup,
            tooltip: None,
        }
    }

    /// Looks up a node by id.
    #[must_use]
    pub fn node(&self, id: &SprintId) -> Option<&NodePresentation> {
        self.nodes.iter().find(|node| &node.id == id)
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Sprint Grove scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// input captured by the adapter, and rewrites the scene before it is
    /// drawn.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum RenderingError {
    /// The viewport has no drawable area.
    #[error("viewport must have a positive size (received {width}x{height})")]
    EmptyViewport {
        /// Provided width in pixels.
        width: f32,
        /// Provided height in pixels.
        height: f32,
    },
    /// The field of view cannot form a perspective projection.
    #[error("field of view must lie in (0, 180) degrees (received {fov_degrees})")]
    InvalidFieldOfView {
        /// Provided field of view.
        fov_degrees: f32,
    },
}
