use glam::Vec3;
use grove_core::{
    CameraPose, CameraTuning, Command, ConvergenceMode, EngineConfig, Event, SprintId,
    SprintSummary,
};
use grove_system_camera::CameraController;
use grove_world::{self as world, query, World};
use proptest::prelude::*;

fn focused_world() -> World {
    let mut world = World::new(&EngineConfig::default()).expect("valid configuration");
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SyncSummaries {
            summaries: vec![SprintSummary::new("S1", "Sprint 1", 40.0)],
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::FocusNode {
            node: SprintId::new("S1"),
        },
        &mut events,
    );
    world
}

/// Runs one frame of the camera controller and returns the emitted events.
fn camera_frame(world: &mut World, controller: &CameraController) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::Tick, &mut events);

    let mut commands = Vec::new();
    controller.handle(
        &events,
        &query::focus_view(world),
        &query::node_view(world),
        query::camera_pose(world),
        &mut commands,
    );

    let mut camera_events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut camera_events);
    }
    camera_events
}

#[test]
fn follow_convergence_settles_and_frees_camera() {
    let mut world = focused_world();
    let controller = CameraController::new(CameraTuning::default()).expect("valid tuning");

    let mut settled_at = None;
    for frame in 0..500 {
        let events = camera_frame(&mut world, &controller);
        if events.contains(&Event::CameraSettled {
            mode: ConvergenceMode::Follow,
        }) {
            settled_at = Some(frame);
            break;
        }
    }

    assert!(settled_at.is_some(), "follow convergence never settled");
    let focus = query::focus_view(&world);
    assert!(focus.camera_free());
    assert_eq!(focus.focused, Some(SprintId::new("S1")));
}

#[test]
fn release_mid_follow_switches_to_home() {
    let mut world = focused_world();
    let controller = CameraController::new(CameraTuning::default()).expect("valid tuning");
    for _ in 0..5 {
        let _ = camera_frame(&mut world, &controller);
    }

    let mut events = Vec::new();
    world::apply(&mut world, Command::ReleaseFocus, &mut events);
    assert!(query::focus_view(&world).reset_converging());

    let mut settled = Vec::new();
    for _ in 0..500 {
        settled.extend(camera_frame(&mut world, &controller));
        if query::focus_view(&world).camera_free() {
            break;
        }
    }

    assert_eq!(
        settled,
        vec![Event::CameraSettled {
            mode: ConvergenceMode::Home
        }]
    );
    let home = controller.tuning().home;
    assert!(query::camera_pose(&world).distance_to(&home) < controller.tuning().epsilon);
}

proptest! {
    #[test]
    fn home_distance_shrinks_monotonically_and_settles_in_bounded_frames(
        x in -30.0f32..30.0,
        y in -30.0f32..30.0,
        z in -30.0f32..30.0,
        factor in 0.05f32..0.9,
    ) {
        let tuning = CameraTuning {
            convergence: factor,
            ..CameraTuning::default()
        };
        let controller = CameraController::new(tuning).expect("valid tuning");
        let home = tuning.home;
        let mut pose = CameraPose::new(home.position + Vec3::new(x, y, z), home.look_at);
        let initial = pose.distance_to(&home);
        prop_assume!(initial > tuning.epsilon);

        let bound = ((tuning.epsilon / initial).ln() / (1.0 - factor).ln()).ceil() as usize + 2;
        let focus = grove_core::FocusView {
            focused: None,
            previous: None,
            camera_target: home.look_at,
            convergence: Some(ConvergenceMode::Home),
        };
        let nodes = grove_core::NodeView::default();
        let frame = [Event::FrameAdvanced { frame: 0 }];

        let mut previous = initial;
        let mut frames = 0;
        loop {
            let mut out = Vec::new();
            controller.handle(&frame, &focus, &nodes, pose, &mut out);
            let Some(Command::AdvanceCamera { pose: next, settled, .. }) = out.pop() else {
                panic!("home convergence must emit a step");
            };
            frames += 1;
            let distance = next.distance_to(&home);
            prop_assert!(distance <= previous);
            previous = distance;
            pose = next;
            if settled {
                break;
            }
            prop_assert!(frames <= bound, "took more than {} frames", bound);
        }
        prop_assert!(frames <= bound);
    }
}
