use bevy::input::keyboard::KeyCode;
use bevy::utils::HashSet;
use first_person_input::prelude::*;

fn listening_tracker() -> KeyboardTracker<NavAction> {
    let mut keyboard = KeyboardTracker::<NavAction>::default();
    keyboard.start_listening();
    keyboard
}

fn replay(keyboard: &mut KeyboardTracker<NavAction>, held: &mut HashSet<NavAction>) {
    for diff in keyboard.drain_diffs() {
        diff.apply_to(held);
    }
}

#[test]
fn keys_are_ignored_until_listening() {
    let mut keyboard = KeyboardTracker::<NavAction>::default();
    assert!(!keyboard.is_listening());

    assert_eq!(keyboard.on_key_down(KeyCode::KeyW, false), None);
    assert!(keyboard.released(NavAction::MoveFwd));
    assert_eq!(keyboard.drain_diffs().count(), 0);
}

#[test]
fn diffs_reconstruct_the_held_set() {
    let mut keyboard = listening_tracker();
    let mut held = HashSet::default();

    keyboard.on_key_down(KeyCode::KeyW, false);
    keyboard.on_key_down(KeyCode::KeyW, true);
    keyboard.on_key_down(KeyCode::KeyD, false);
    // Unmapped keys are silently ignored
    keyboard.on_key_down(KeyCode::Space, false);
    keyboard.on_key_up(KeyCode::Space);
    replay(&mut keyboard, &mut held);
    assert_eq!(
        held,
        HashSet::from_iter([NavAction::MoveFwd, NavAction::MoveRight])
    );

    keyboard.on_key_up(KeyCode::KeyW);
    // Releasing a key that is not held does nothing
    keyboard.on_key_up(KeyCode::KeyW);
    keyboard.on_key_down(KeyCode::ArrowLeft, false);
    // A second physical press while held is not a new transition
    keyboard.on_key_down(KeyCode::ArrowLeft, false);
    replay(&mut keyboard, &mut held);

    let expected: HashSet<_> = keyboard.get_pressed().collect();
    assert_eq!(held, expected);
    assert_eq!(
        held,
        HashSet::from_iter([NavAction::MoveRight, NavAction::LookLeft])
    );
}

#[test]
fn every_transition_reports_exactly_once() {
    let mut keyboard = listening_tracker();

    assert_eq!(
        keyboard.on_key_down(KeyCode::KeyS, false),
        Some(ActionDiff::Pressed {
            action: NavAction::MoveBack
        })
    );
    assert_eq!(keyboard.on_key_down(KeyCode::KeyS, true), None);
    assert_eq!(
        keyboard.on_key_up(KeyCode::KeyS),
        Some(ActionDiff::Released {
            action: NavAction::MoveBack
        })
    );

    let diffs: Vec<_> = keyboard.drain_diffs().collect();
    assert_eq!(diffs.len(), 2);
    assert!(diffs[0].is_pressed());
    assert!(!diffs[1].is_pressed());
}

#[test]
fn losing_focus_releases_everything() {
    let mut keyboard = listening_tracker();
    keyboard.on_key_down(KeyCode::KeyD, false);
    keyboard.on_key_down(KeyCode::KeyW, false);
    keyboard.drain_diffs().for_each(drop);

    keyboard.stop_listening();

    assert!(!keyboard.is_listening());
    assert_eq!(keyboard.get_pressed().count(), 0);
    // Released in declaration order
    let diffs: Vec<_> = keyboard.drain_diffs().collect();
    assert_eq!(
        diffs,
        [
            ActionDiff::Released {
                action: NavAction::MoveFwd
            },
            ActionDiff::Released {
                action: NavAction::MoveRight
            },
        ]
    );

    // A key lifted while unfocused is never reported
    assert_eq!(keyboard.on_key_up(KeyCode::KeyW), None);

    // Keys still physically held are not resurrected on focus
    keyboard.start_listening();
    assert!(keyboard.released(NavAction::MoveFwd));
    assert_eq!(keyboard.drain_diffs().count(), 0);
}

#[test]
fn rebinding_releases_held_actions() {
    let mut keyboard = listening_tracker();
    keyboard.on_key_down(KeyCode::KeyW, false);
    keyboard.drain_diffs().for_each(drop);

    let mut keymap = Keymap::<NavAction>::default();
    keymap.insert(NavAction::MoveFwd, KeyCode::KeyZ);
    keyboard.set_keymap(keymap);

    assert!(keyboard.released(NavAction::MoveFwd));
    assert_eq!(keyboard.drain_diffs().count(), 1);

    assert_eq!(keyboard.on_key_down(KeyCode::KeyW, false), None);
    assert!(keyboard.on_key_down(KeyCode::KeyZ, false).is_some());
    assert!(keyboard.pressed(NavAction::MoveFwd));
}

#[test]
fn custom_keymaps() {
    let keymap = Keymap::new([
        (NavAction::LookLeft, KeyCode::KeyQ),
        (NavAction::LookRight, KeyCode::KeyE),
    ]);
    assert_eq!(keymap.len(), 2);

    let mut keyboard = KeyboardTracker::new(keymap);
    keyboard.start_listening();
    keyboard.on_key_down(KeyCode::KeyE, false);
    keyboard.on_key_down(KeyCode::ArrowRight, false);

    assert_eq!(keyboard.get_pressed().collect::<Vec<_>>(), [NavAction::LookRight]);
}
