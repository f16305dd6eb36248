use grove_core::{Command, EngineConfig, Event, Motion, MotionTuning, SprintId, SprintSummary};
use grove_system_animation::{advance, Animation};
use grove_world::{self as world, query, World};
use proptest::prelude::*;

fn seeded_world(ids: &[&str]) -> World {
    let mut world = World::new(&EngineConfig::default()).expect("valid configuration");
    let summaries = ids
        .iter()
        .map(|id| SprintSummary::new(*id, *id, 10.0))
        .collect();
    let mut events = Vec::new();
    world::apply(&mut world, Command::SyncSummaries { summaries }, &mut events);
    world
}

fn set_motion(world: &mut World, id: &str, motion: Motion) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::SetMotion {
            node: SprintId::new(id),
            motion,
        },
        &mut events,
    );
    events
}

fn pump_frame(world: &mut World, animation: &Animation) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::Tick, &mut events);

    let mut commands = Vec::new();
    animation.handle(&events, &query::node_view(world), &mut commands);

    let mut step_events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut step_events);
    }
    step_events
}

#[test]
fn no_steps_without_frame() {
    let mut world = seeded_world(&["S1"]);
    let _ = set_motion(&mut world, "S1", Motion::Rising);
    let animation = Animation::new(MotionTuning::default()).expect("valid tuning");

    let mut commands = Vec::new();
    animation.handle(&[], &query::node_view(&world), &mut commands);

    assert!(commands.is_empty());
}

#[test]
fn idle_nodes_produce_no_steps() {
    let world = seeded_world(&["S1", "S2"]);
    let animation = Animation::new(MotionTuning::default()).expect("valid tuning");

    let mut commands = Vec::new();
    animation.handle(
        &[Event::FrameAdvanced { frame: 0 }],
        &query::node_view(&world),
        &mut commands,
    );

    assert!(commands.is_empty());
}

#[test]
fn apex_edge_fires_exactly_once() {
    let mut world = seeded_world(&["S1"]);
    let _ = set_motion(&mut world, "S1", Motion::Rising);
    let animation = Animation::new(MotionTuning::default()).expect("valid tuning");

    let mut apex_events = 0;
    for _ in 0..500 {
        apex_events += pump_frame(&mut world, &animation)
            .iter()
            .filter(|event| matches!(event, Event::ApexReached { .. }))
            .count();
    }

    assert_eq!(apex_events, 1);
    let view = query::node_view(&world);
    let node = view.get(&SprintId::new("S1")).expect("node present");
    assert_eq!(node.state.motion, Motion::Idle);
    assert!(node.state.has_reached_apex);
    assert_eq!(node.state.height, animation.tuning().apex);
}

#[test]
fn reversal_takes_effect_on_next_frame() {
    let mut world = seeded_world(&["S1"]);
    let _ = set_motion(&mut world, "S1", Motion::Rising);
    let animation = Animation::new(MotionTuning::default()).expect("valid tuning");
    for _ in 0..10 {
        let _ = pump_frame(&mut world, &animation);
    }
    let peak = query::node_view(&world)
        .get(&SprintId::new("S1"))
        .expect("node present")
        .state
        .height;

    let _ = set_motion(&mut world, "S1", Motion::Falling);
    let _ = pump_frame(&mut world, &animation);

    let after = query::node_view(&world)
        .get(&SprintId::new("S1"))
        .expect("node present")
        .state;
    assert_eq!(after.motion, Motion::Falling);
    assert!(after.height < peak);
}

#[derive(Clone, Copy, Debug)]
enum Flip {
    Rise,
    Fall,
    Frames(u8),
}

fn flip_strategy() -> impl Strategy<Value = Flip> {
    prop_oneof![
        Just(Flip::Rise),
        Just(Flip::Fall),
        (1u8..40).prop_map(Flip::Frames),
    ]
}

proptest! {
    #[test]
    fn heights_stay_within_bounds_and_idle_only_at_rest(
        flips in proptest::collection::vec(flip_strategy(), 1..40),
        rise_speed in 0.005f32..0.5,
        fall_speed in 0.005f32..0.5,
    ) {
        let tuning = MotionTuning {
            rise_speed,
            fall_speed,
            ..MotionTuning::default()
        };
        let mut config = EngineConfig::default();
        config.motion = tuning;
        let mut world = World::new(&config).expect("valid configuration");
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::SyncSummaries { summaries: vec![SprintSummary::new("S1", "S1", 10.0)] },
            &mut events,
        );
        let animation = Animation::new(tuning).expect("valid tuning");

        for flip in flips {
            match flip {
                Flip::Rise => { let _ = set_motion(&mut world, "S1", Motion::Rising); }
                Flip::Fall => { let _ = set_motion(&mut world, "S1", Motion::Falling); }
                Flip::Frames(count) => {
                    for _ in 0..count {
                        let _ = pump_frame(&mut world, &animation);
                        let view = query::node_view(&world);
                        let state = view.get(&SprintId::new("S1")).expect("node present").state;
                        prop_assert!(state.height >= tuning.baseline);
                        prop_assert!(state.height <= tuning.apex);
                        if state.motion == Motion::Idle {
                            prop_assert!(state.height == tuning.baseline || state.height == tuning.apex);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn advance_never_leaves_bounds(height in 0.2f32..=1.4, rising in any::<bool>()) {
        let tuning = MotionTuning::default();
        let state = grove_core::MotionState {
            height,
            facing: 0.0,
            motion: if rising { Motion::Rising } else { Motion::Falling },
            has_reached_apex: false,
        };
        let next = advance(state, &tuning);
        prop_assert!(next.height >= tuning.baseline && next.height <= tuning.apex);
    }
}
