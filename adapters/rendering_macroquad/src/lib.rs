#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Sprint Grove.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! Popups use Macroquad's immediate-mode UI module. All UI-specific calls live
//! inside the local `ui` module to avoid leaking Macroquad UI types throughout
//! the renderer.

mod textures;
mod ui;

use self::textures::StageTextures;
use self::ui::{draw_popup_ui, PopupUiContext, PopupUiResult};
use anyhow::{Context, Result};
use glam::{Vec2, Vec3};
use grove_core::GrowthStage;
use grove_rendering::{
    pick_node, project_point, Color, FrameInput, IslandPresentation, NodePresentation,
    NodeVisual, Presentation, RenderingBackend, Scene, StageAssets, SurfaceEvent, SurfaceTracker,
    Viewport, FOLIAGE_COLOR,
};
use macroquad::{
    camera::{set_camera, set_default_camera, Camera3D},
    input::{
        is_key_down, is_key_pressed, is_mouse_button_down, is_mouse_button_pressed,
        mouse_position, KeyCode, MouseButton,
    },
    math::{vec3, Vec2 as MacroquadVec2, Vec3 as MacroquadVec3},
    models::{draw_cube, draw_mesh, draw_sphere, Mesh, Vertex},
    texture::Texture2D,
};
use std::{
    f32::consts::TAU,
    path::PathBuf,
    sync::mpsc,
    time::Duration,
};

/// Orbit speed of the arrow keys in radians per second.
const KEY_ORBIT_SPEED: f32 = 1.2;
/// Orbit angle per dragged pixel in radians.
const DRAG_ORBIT_SPEED: f32 = 0.005;

const POPUP_WIDTH: f32 = 260.0;
const POPUP_HEIGHT: f32 = 220.0;
const POPUP_GAP: f32 = 40.0;
const POPUP_MARGIN: f32 = 8.0;

const PAD_RADIUS: f32 = 1.0;
const PAD_THICKNESS: f32 = 0.1;
const PAD_ELEVATION: f32 = 0.15;
const TRUNK_COLOR: Color = Color::from_rgb_u8(0x8B, 0x5A, 0x2B);
const PLACEHOLDER_COLOR: Color = Color::from_rgb_u8(0x95, 0xA5, 0xA6);
const TOOLTIP_FONT_SIZE: u16 = 20;

/// Tracks popup interactions so they can be merged with physical input on the next frame.
#[doc(hidden)]
#[derive(Clone, Copy, Debug, Default)]
pub struct PopupInputState {
    dismiss_latched: bool,
}

impl PopupInputState {
    /// Returns whether the close button was pressed and clears the latch so the
    /// dismissal fires only once.
    pub fn take_dismiss(&mut self) -> bool {
        let latched = self.dismiss_latched;
        self.dismiss_latched = false;
        latched
    }

    /// Records that the close button was pressed this frame.
    pub fn register_dismiss(&mut self) {
        self.dismiss_latched = true;
    }
}

/// Snapshot of keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Q` or `Escape` to quit the render loop.
    quit_requested: bool,
    /// `Backspace` closes the popups.
    dismiss_popup: bool,
    /// Held arrow keys as yaw and pitch directions.
    orbit_direction: Vec2,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        let quit_requested = is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q);
        let dismiss_popup = is_key_pressed(KeyCode::Backspace);
        let axis = |negative: KeyCode, positive: KeyCode| {
            f32::from(u8::from(is_key_down(positive))) - f32::from(u8::from(is_key_down(negative)))
        };
        let orbit_direction = Vec2::new(
            axis(KeyCode::Left, KeyCode::Right),
            axis(KeyCode::Down, KeyCode::Up),
        );

        Self {
            quit_requested,
            dismiss_popup,
            orbit_direction,
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    stage_manifest: Option<PathBuf>,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures a manifest of stage textures applied to the canopies.
    ///
    /// Without a manifest every stage is drawn with untextured models.
    #[must_use]
    pub fn with_stage_manifest(mut self, manifest: Option<PathBuf>) -> Self {
        self.stage_manifest = manifest;
        self
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            stage_manifest,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: 960,
            window_height: 720,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        let (init_sender, init_receiver) = mpsc::channel::<Result<()>>();

        macroquad::Window::from_config(config, async move {
            let mut init_sender = Some(init_sender);
            let mut scene = scene;

            let mut assets = StageAssets::new();
            let stage_textures = match stage_manifest {
                Some(path) => match StageTextures::from_manifest_path(&path, &mut assets)
                    .context("failed to load stage textures")
                {
                    Ok(textures) => Some(textures),
                    Err(error) => {
                        if let Some(sender) = init_sender.take() {
                            let _ = sender.send(Err(error));
                        }
                        return;
                    }
                },
                None => {
                    assets = StageAssets::all_loaded();
                    None
                }
            };

            if let Some(sender) = init_sender.take() {
                let _ = sender.send(Ok(()));
            }

            let background = to_macroquad_color(clear_color);
            let mut surface = SurfaceTracker::new();
            let mut popup_input = PopupInputState::default();
            let mut last_drag_cursor: Option<Vec2> = None;

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    break;
                }

                let viewport = Viewport::new(
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                )
                .ok();
                let surface_event = if viewport.is_some() {
                    SurfaceEvent::Restored
                } else {
                    SurfaceEvent::Lost
                };
                let _ = surface.observe(surface_event);

                let dt_seconds = macroquad::time::get_frame_time().max(0.0);
                let frame_dt = Duration::from_secs_f32(dt_seconds);

                let (cursor_x, cursor_y) = mouse_position();
                let cursor = Vec2::new(cursor_x, cursor_y);
                let drag = if is_mouse_button_down(MouseButton::Right) {
                    let delta = last_drag_cursor.map_or(Vec2::ZERO, |last| cursor - last);
                    last_drag_cursor = Some(cursor);
                    delta
                } else {
                    last_drag_cursor = None;
                    Vec2::ZERO
                };
                let orbit = keyboard.orbit_direction * KEY_ORBIT_SPEED * dt_seconds
                    + Vec2::new(drag.x, -drag.y) * DRAG_ORBIT_SPEED;
                let observations = PointerObservations {
                    cursor,
                    click: is_mouse_button_pressed(MouseButton::Left),
                    dismiss: keyboard.dismiss_popup || popup_input.take_dismiss(),
                    orbit,
                };
                let frame_input = gather_frame_input(&scene, viewport, observations);

                update_scene(frame_dt, frame_input, &mut scene);

                assets.retain_nodes(scene.nodes.iter().map(|node| &node.id));
                for node in &mut scene.nodes {
                    node.visual = assets.resolve(&node.id, node.stage);
                }

                let Some(viewport) = viewport.filter(|_| surface.can_draw()) else {
                    macroquad::window::next_frame().await;
                    continue;
                };

                macroquad::window::clear_background(background);
                draw_world(&scene, stage_textures.as_ref());

                if let Some(text) = &scene.tooltip {
                    draw_tooltip(text, cursor);
                }

                if let Some(popup) = &scene.popup {
                    let layout = popup_layout(&scene, viewport);
                    let left_lines = popup.left_lines();
                    let right_lines = popup.right_lines();
                    let mut popup_ui = macroquad::ui::root_ui();
                    let PopupUiResult { close_pressed } = draw_popup_ui(
                        &mut popup_ui,
                        PopupUiContext {
                            left_origin: to_macroquad_vec2(layout.left),
                            right_origin: to_macroquad_vec2(layout.right),
                            size: to_macroquad_vec2(layout.size),
                            background: macroquad::color::Color::from_rgba(20, 24, 28, 230),
                            left_lines: &left_lines,
                            right_lines: &right_lines,
                        },
                    );
                    if close_pressed {
                        popup_input.register_dismiss();
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        init_receiver.recv().unwrap_or_else(|_| Ok(()))?;

        Ok(())
    }
}

/// Pointer and camera observations gathered for a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct PointerObservations {
    /// Cursor position in pixels from the top-left corner.
    cursor: Vec2,
    /// Whether the primary button was pressed this frame.
    click: bool,
    /// Whether the popups were asked to close.
    dismiss: bool,
    /// Requested yaw and pitch in radians.
    orbit: Vec2,
}

fn gather_frame_input(
    scene: &Scene,
    viewport: Option<Viewport>,
    observations: PointerObservations,
) -> FrameInput {
    let mut input = FrameInput {
        dismiss_popup: observations.dismiss,
        ..FrameInput::default()
    };

    if observations.orbit != Vec2::ZERO {
        input.orbit = Some(scene.camera.orbited(observations.orbit.x, observations.orbit.y));
    }

    let Some(viewport) = viewport else {
        return input;
    };

    if scene.popup.is_some() && popup_layout(scene, viewport).contains(observations.cursor) {
        return input;
    }

    input.hovered = pick_node(scene, viewport, observations.cursor);
    if observations.click {
        input.activate = input.hovered.clone();
    }
    input
}

/// Screen placement of the two popups.
#[derive(Clone, Copy, Debug, PartialEq)]
struct PopupLayout {
    left: Vec2,
    right: Vec2,
    size: Vec2,
}

impl PopupLayout {
    fn contains(&self, point: Vec2) -> bool {
        [self.left, self.right].into_iter().any(|origin| {
            let end = origin + self.size;
            point.x >= origin.x && point.x <= end.x && point.y >= origin.y && point.y <= end.y
        })
    }
}

/// Places the popups on either side of the raised node, kept on screen.
fn popup_layout(scene: &Scene, viewport: Viewport) -> PopupLayout {
    let size = Vec2::new(POPUP_WIDTH, POPUP_HEIGHT);
    let screen = Vec2::new(viewport.width(), viewport.height());
    let anchor = scene
        .popup
        .as_ref()
        .and_then(|popup| scene.node(&popup.sprint))
        .and_then(|node| project_point(&scene.camera, viewport, node.position + Vec3::Y))
        .unwrap_or(screen * 0.5);

    let top = anchor.y - size.y * 0.5;
    let clamp = |origin: Vec2| {
        let max = (screen - size - Vec2::splat(POPUP_MARGIN)).max(Vec2::splat(POPUP_MARGIN));
        origin.clamp(Vec2::splat(POPUP_MARGIN), max)
    };

    PopupLayout {
        left: clamp(Vec2::new(anchor.x - POPUP_GAP - size.x, top)),
        right: clamp(Vec2::new(anchor.x + POPUP_GAP, top)),
        size,
    }
}

fn draw_world(scene: &Scene, textures: Option<&StageTextures>) {
    let pose = scene.camera.pose;
    set_camera(&Camera3D {
        position: to_macroquad_vec3(pose.position),
        target: to_macroquad_vec3(pose.look_at),
        up: vec3(0.0, 1.0, 0.0),
        fovy: scene.camera.fov_degrees.to_radians(),
        ..Camera3D::default()
    });

    draw_island(&scene.island);
    for node in &scene.nodes {
        draw_node(node, textures);
    }

    set_default_camera();
}

fn draw_island(island: &IslandPresentation) {
    draw_mesh(&hex_prism_mesh(
        Vec3::ZERO,
        island.radius,
        island.base_height,
        island.base_color,
    ));
    draw_mesh(&hex_prism_mesh(
        Vec3::new(0.0, island.grass_elevation, 0.0),
        island.radius,
        island.grass_height,
        island.grass_color,
    ));
}

fn draw_node(node: &NodePresentation, textures: Option<&StageTextures>) {
    let pad_center = node.position + Vec3::Y * PAD_ELEVATION;
    draw_mesh(&hex_prism_mesh(
        pad_center,
        PAD_RADIUS,
        PAD_THICKNESS,
        node.pad_color,
    ));

    let base = pad_center + Vec3::Y * (PAD_THICKNESS * 0.5);
    match node.visual {
        NodeVisual::Stage(stage) => {
            let texture = textures.and_then(|textures| textures.texture(stage));
            draw_tree(base, node.rotation_y, stage, texture);
        }
        NodeVisual::Placeholder => {
            draw_cube(
                to_macroquad_vec3(base + Vec3::Y * 0.2),
                vec3(0.4, 0.4, 0.4),
                None,
                to_macroquad_color(PLACEHOLDER_COLOR),
            );
        }
    }
}

/// Height of the trunk and radius of the canopy for a stage.
fn tree_dimensions(stage: GrowthStage) -> (f32, f32) {
    match stage {
        GrowthStage::Seedling => (0.2, 0.2),
        GrowthStage::Sapling => (0.4, 0.3),
        GrowthStage::Young => (0.6, 0.42),
        GrowthStage::Mature => (0.8, 0.55),
    }
}

fn draw_tree(base: Vec3, rotation_y: f32, stage: GrowthStage, texture: Option<Texture2D>) {
    let (trunk_height, canopy_radius) = tree_dimensions(stage);
    let trunk_width = 0.08 + canopy_radius * 0.2;
    draw_cube(
        to_macroquad_vec3(base + Vec3::Y * (trunk_height * 0.5)),
        vec3(trunk_width, trunk_height, trunk_width),
        None,
        to_macroquad_color(TRUNK_COLOR),
    );

    let canopy_center = base + Vec3::Y * (trunk_height + canopy_radius * 0.7);
    let canopy_color = if texture.is_some() {
        macroquad::color::WHITE
    } else {
        to_macroquad_color(FOLIAGE_COLOR)
    };
    draw_sphere(
        to_macroquad_vec3(canopy_center),
        canopy_radius,
        texture,
        canopy_color,
    );

    let facing = Vec3::new(rotation_y.sin(), 0.0, rotation_y.cos());
    draw_sphere(
        to_macroquad_vec3(canopy_center + facing * canopy_radius * 0.8),
        canopy_radius * 0.45,
        None,
        to_macroquad_color(FOLIAGE_COLOR.lighten(0.2)),
    );
}

fn draw_tooltip(text: &str, cursor: Vec2) {
    let dimensions = macroquad::text::measure_text(text, None, TOOLTIP_FONT_SIZE, 1.0);
    let origin = cursor + Vec2::new(16.0, -8.0);
    macroquad::shapes::draw_rectangle(
        origin.x - 4.0,
        origin.y - dimensions.height - 4.0,
        dimensions.width + 8.0,
        dimensions.height + 8.0,
        macroquad::color::Color::from_rgba(0, 0, 0, 180),
    );
    let _ = macroquad::text::draw_text(
        text,
        origin.x,
        origin.y,
        f32::from(TOOLTIP_FONT_SIZE),
        macroquad::color::WHITE,
    );
}

/// Corners of a hexagon around `center` in the horizontal plane.
fn hex_corners(center: Vec3, radius: f32) -> [Vec3; 6] {
    std::array::from_fn(|index| {
        let angle = index as f32 / 6.0 * TAU;
        center + Vec3::new(radius * angle.sin(), 0.0, radius * angle.cos())
    })
}

/// Hexagonal prism centred on `center` with its top cap and sides.
fn hex_prism_mesh(center: Vec3, radius: f32, height: f32, color: Color) -> Mesh {
    let half = Vec3::Y * (height * 0.5);
    let top = hex_corners(center + half, radius);
    let bottom = hex_corners(center - half, radius);
    let cap_color = to_macroquad_color(color);
    let side_color = to_macroquad_color(Color::new(
        color.red * 0.75,
        color.green * 0.75,
        color.blue * 0.75,
        color.alpha,
    ));

    let mut vertices = Vec::with_capacity(7 + 6 * 4);
    let mut indices = Vec::with_capacity(6 * 3 + 6 * 6);

    vertices.push(vertex(center + half, cap_color));
    vertices.extend(top.iter().map(|corner| vertex(*corner, cap_color)));
    for index in 0..6u16 {
        indices.extend([0, 1 + index, 1 + (index + 1) % 6]);
    }

    for index in 0..6 {
        let next = (index + 1) % 6;
        let first = vertices.len() as u16;
        vertices.extend([
            vertex(top[index], side_color),
            vertex(top[next], side_color),
            vertex(bottom[next], side_color),
            vertex(bottom[index], side_color),
        ]);
        indices.extend([first, first + 1, first + 2, first, first + 2, first + 3]);
    }

    Mesh {
        vertices,
        indices,
        texture: None,
    }
}

fn vertex(position: Vec3, color: macroquad::color::Color) -> Vertex {
    Vertex {
        position: to_macroquad_vec3(position),
        uv: MacroquadVec2::new(0.0, 0.0),
        color,
    }
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

fn to_macroquad_vec3(value: Vec3) -> MacroquadVec3 {
    vec3(value.x, value.y, value.z)
}

fn to_macroquad_vec2(value: Vec2) -> MacroquadVec2 {
    MacroquadVec2::new(value.x, value.y)
}
