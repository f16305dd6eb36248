use grove_rendering_macroquad::PopupInputState;

fn run_sequence(sequence: &[bool]) -> Vec<bool> {
    let mut state = PopupInputState::default();
    let mut dismissals = Vec::new();
    for &pressed in sequence {
        dismissals.push(state.take_dismiss());
        if pressed {
            state.register_dismiss();
        }
    }

    // Flush a trailing press so the harness observes the final dismissal.
    dismissals.push(state.take_dismiss());
    dismissals
}

#[test]
fn close_button_sequence_is_deterministic() {
    let button_sequence = [false, true, false, true, true, false];
    let expected = vec![false, false, true, false, true, true, false];

    let first_run = run_sequence(&button_sequence);
    let second_run = run_sequence(&button_sequence);

    assert_eq!(first_run, expected);
    assert_eq!(first_run, second_run);
}

#[test]
fn repeated_presses_in_one_frame_dismiss_once() {
    let mut state = PopupInputState::default();
    state.register_dismiss();
    state.register_dismiss();

    assert!(state.take_dismiss());
    assert!(!state.take_dismiss());
}
