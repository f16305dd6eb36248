//! Window-less runs that replay a script and print the resulting state.

use std::io::Write;

use anyhow::Result;
use grove_rendering::{FrameInput, Scene, SurfaceEvent, SurfaceTracker};

use crate::{
    script::{ScriptAction, ScriptStep},
    simulation::Simulation,
};

/// Outcome of a headless run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct HeadlessSummary {
    /// Frames ticked.
    pub(crate) frames: u64,
    /// Frames that would have been drawn.
    pub(crate) drawn: u64,
    /// Surface losses observed.
    pub(crate) surface_losses: u32,
}

/// Ticks `frames` frames, applying script steps before their frame, then
/// writes the final state to `out`. With `trace` every drawn frame is written
/// as well.
pub(crate) fn run_headless(
    simulation: &mut Simulation,
    frames: u64,
    script: &[ScriptStep],
    trace: bool,
    out: &mut impl Write,
) -> Result<HeadlessSummary> {
    let mut scene = simulation.initial_scene()?;
    let mut surface = SurfaceTracker::new();
    let mut drawn = 0;
    let mut pending = script.iter().peekable();

    for frame in 0..frames {
        let mut input = FrameInput::default();
        while let Some(step) = pending.next_if(|step| step.frame <= frame) {
            apply_step(&step.action, &scene, &mut surface, &mut input);
        }

        simulation.advance(input, &mut scene);

        if surface.can_draw() {
            drawn += 1;
            if trace {
                write_frame(frame, &scene, out)?;
            }
        }
    }

    let skipped = pending.count();
    if skipped > 0 {
        log::warn!("{skipped} script steps were scheduled after the last frame");
    }

    let summary = HeadlessSummary {
        frames,
        drawn,
        surface_losses: surface.losses(),
    };
    write_summary(summary, simulation, out)?;
    Ok(summary)
}

fn apply_step(
    action: &ScriptAction,
    scene: &Scene,
    surface: &mut SurfaceTracker,
    input: &mut FrameInput,
) {
    match action {
        ScriptAction::Activate(node) => input.activate = Some(node.clone()),
        ScriptAction::Dismiss => input.dismiss_popup = true,
        ScriptAction::Orbit { yaw, pitch } => {
            input.orbit = Some(scene.camera.orbited(*yaw, *pitch));
        }
        ScriptAction::LoseSurface => {
            let _ = surface.observe(SurfaceEvent::Lost);
        }
        ScriptAction::RestoreSurface => {
            let _ = surface.observe(SurfaceEvent::Restored);
        }
    }
}

fn write_frame(frame: u64, scene: &Scene, out: &mut impl Write) -> Result<()> {
    let nodes = scene
        .nodes
        .iter()
        .map(|node| format!("{}={:.2}", node.id, node.position.y))
        .collect::<Vec<_>>()
        .join(" ");
    let popup = scene
        .popup
        .as_ref()
        .map_or(String::new(), |popup| format!(" popup={}", popup.sprint));
    writeln!(out, "frame {frame}: {nodes}{popup}")?;
    Ok(())
}

fn write_summary(
    summary: HeadlessSummary,
    simulation: &Simulation,
    out: &mut impl Write,
) -> Result<()> {
    let engine = simulation.engine();
    writeln!(
        out,
        "frames: {} (drawn {}, surface losses {})",
        summary.frames, summary.drawn, summary.surface_losses
    )?;

    let pose = engine.camera_pose();
    writeln!(
        out,
        "camera: position ({:.2}, {:.2}, {:.2}) looking at ({:.2}, {:.2}, {:.2})",
        pose.position.x,
        pose.position.y,
        pose.position.z,
        pose.look_at.x,
        pose.look_at.y,
        pose.look_at.z
    )?;

    let nodes = engine.node_view();
    match engine.focus_view().focused {
        Some(focused) if engine.popup_visible() => {
            writeln!(out, "focus: {focused}, popup visible")?;
        }
        Some(focused) => {
            let motion = nodes
                .get(&focused)
                .map_or("unknown".to_owned(), |node| format!("{:?}", node.state.motion));
            writeln!(out, "focus: {focused}, {motion}")?;
        }
        None => writeln!(out, "focus: none")?,
    }

    for node in nodes.iter() {
        write!(
            out,
            "node {}: stage {}, height {:.2}, motion {:?}",
            node.id,
            node.stage.get(),
            node.state.height,
            node.state.motion
        )?;
        if node.state.has_reached_apex {
            write!(out, ", apex")?;
        }
        if node.pending_removal {
            write!(out, ", leaving")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::parse_script;
    use grove_core::{EngineConfig, SprintSummary};
    use grove_engine::GrowthEngine;

    fn simulation() -> Simulation {
        let mut engine = GrowthEngine::new(EngineConfig::default()).expect("valid configuration");
        let _ = engine.sync(vec![
            SprintSummary::new("S1", "Sprint 1", 10.0),
            SprintSummary::new("S2", "Sprint 2", 90.0),
        ]);
        Simulation::new(engine)
    }

    fn run(frames: u64, script: &str, trace: bool) -> (HeadlessSummary, String) {
        let script = parse_script(script).expect("valid script");
        let mut out = Vec::new();
        let summary = run_headless(&mut simulation(), frames, &script, trace, &mut out)
            .expect("headless run succeeds");
        (summary, String::from_utf8(out).expect("utf-8 output"))
    }

    #[test]
    fn scripted_activation_ends_with_popup() {
        let (_, output) = run(200, "0:activate:S1", false);

        assert!(output.contains("focus: S1, popup visible"), "{output}");
        assert!(output.contains("node S1: stage 1, height 1.40, motion Idle, apex"));
        assert!(output.contains("node S2: stage 4, height 0.20, motion Idle"));
    }

    #[test]
    fn lost_surface_skips_drawing_but_not_ticking() {
        let (summary, _) = run(20, "0:lose,10:restore", false);

        assert_eq!(
            summary,
            HeadlessSummary {
                frames: 20,
                drawn: 10,
                surface_losses: 1,
            }
        );
    }

    #[test]
    fn ticking_continues_while_the_surface_is_lost() {
        let (_, lost) = run(200, "0:lose,0:activate:S2", false);
        let (_, drawn) = run(200, "0:activate:S2", false);

        let state = |output: &str| {
            output
                .lines()
                .skip(1)
                .map(str::to_owned)
                .collect::<Vec<_>>()
        };
        assert_eq!(state(&lost), state(&drawn));
    }

    #[test]
    fn trace_writes_one_line_per_drawn_frame() {
        let (_, output) = run(3, "1:lose", true);

        let frame_lines: Vec<&str> = output
            .lines()
            .filter(|line| line.starts_with("frame "))
            .collect();
        assert_eq!(frame_lines, vec!["frame 0: S1=0.20 S2=0.20"]);
    }

    #[test]
    fn dismissal_returns_focus_to_none() {
        let (_, output) = run(300, "0:activate:S1,100:dismiss", false);

        assert!(output.contains("focus: none"), "{output}");
        assert!(output.contains("node S1: stage 1, height 0.20, motion Idle\n"));
    }
}
