use flow_text_core::animation::{Animator, Phase, PhaseTiming, Viewport};
use flow_text_core::library::{TextLibrary, TextSet};
use flow_text_core::mapping::ParameterSet;
use flow_text_core::stage::{Stage, TransportBindings};
use flow_text_core::surface::{
    normalize, ButtonLayout, ButtonState, ControlSurface, ControlSurfaceDecoder,
    ControlSurfaceState,
};
use flow_text_core::MappingProfile;
use proptest::prelude::*;

fn library() -> TextLibrary {
    TextLibrary::new(vec![
        TextSet::new("five", "a", vec!["abcde".into()]),
        TextSet::new("three", "b", vec!["fgh".into()]),
        TextSet::new("seven", "c", vec!["ijk".into(), "lmno".into()]),
    ])
    .unwrap()
}

fn animator() -> Animator {
    Animator::new(library(), PhaseTiming::classic(), Viewport::default()).unwrap()
}

#[test]
fn one_full_cycle_advances_to_the_next_set() {
    let (mut stage, _queue) = Stage::new(
        animator(),
        MappingProfile::classic(),
        TransportBindings::default(),
    );
    let disconnected = ControlSurfaceState::default();

    let mut seen = Vec::new();
    let mut frame = 0;
    while stage.animator().text_set_index() == 0 {
        frame += 1;
        assert!(frame < 5_000, "cycle never completed");
        let output = stage.step(frame, &disconnected);
        if seen.last() != Some(&output.phase) {
            seen.push(output.phase);
        }
    }

    assert_eq!(
        seen,
        vec![
            Phase::Typing,
            Phase::Waiting,
            Phase::Falling,
            Phase::Restarting,
            Phase::Typing
        ]
    );
    assert_eq!(stage.animator().text_set_index(), 1);
    assert_eq!(stage.animator().glyphs().len(), 3);
    assert_eq!(stage.animator().progress(), 0.0);
}

#[test]
fn never_connected_surface_keeps_defaults() {
    let mut surface = ControlSurface::new(ButtonLayout::Note);
    surface.disconnect();
    let handle = surface.handle();
    let (mut stage, queue) = Stage::new(
        animator(),
        MappingProfile::extended(),
        TransportBindings::default(),
    );

    for frame in 1..=600 {
        let output = stage.step_snapshot(frame, handle.snapshot());
        assert_eq!(*stage.parameters(), ParameterSet::DEFAULT);
        assert!(!output.inverted);
        assert!(!output.background_box);
    }
    assert!(queue.try_next().is_none());
}

#[test]
fn held_capture_button_emits_once_per_press() {
    let mut surface = ControlSurface::new(ButtonLayout::Note);
    surface.attach_virtual("scripted").unwrap();
    let handle = surface.handle();
    let (mut stage, queue) = Stage::new(
        animator(),
        MappingProfile::classic(),
        TransportBindings::default(),
    );

    // Record transport is note 45 in the note layout.
    surface.feed(&[0x90, 45, 127]).unwrap();
    for frame in 1..=100 {
        stage.step_snapshot(frame, handle.snapshot());
    }
    let first = queue.try_next().expect("one capture");
    assert!(queue.try_next().is_none());
    assert_eq!(first.event.frame, 1);
    assert_eq!(first.event.metadata.title, "five");

    // Still in flight: a second press is swallowed.
    surface.feed(&[0x80, 45, 0]).unwrap();
    stage.step_snapshot(101, handle.snapshot());
    surface.feed(&[0x90, 45, 127]).unwrap();
    stage.step_snapshot(102, handle.snapshot());
    assert!(queue.try_next().is_none());

    drop(first);
    surface.feed(&[0x80, 45, 0]).unwrap();
    stage.step_snapshot(103, handle.snapshot());
    surface.feed(&[0x90, 45, 127]).unwrap();
    stage.step_snapshot(104, handle.snapshot());
    let second = queue.try_next().expect("capture after completion");
    assert_eq!(second.event.frame, 104);
}

#[test]
fn reattaching_surface_starts_from_clean_state() {
    let mut surface = ControlSurface::new(ButtonLayout::Note);
    surface.attach_virtual("first").unwrap();
    surface.feed(&[0xB0, 0, 100]).unwrap();
    surface.feed(&[0x90, 32, 127]).unwrap();

    surface.disconnect();
    assert!(!surface.is_connected());
    surface.attach_virtual("second").unwrap();

    let state = surface.handle().snapshot().unwrap();
    assert!(state.connected);
    assert_eq!(state.faders[0], 0.0);
    assert!(state.buttons.iter().all(|strip| *strip == Default::default()));
}

#[test]
fn row_fader_at_zero_types_only_the_first_line() {
    let mut surface = ControlSurface::new(ButtonLayout::Note);
    surface.attach_virtual("scripted").unwrap();
    let handle = surface.handle();
    let mut two_lines = animator();
    assert!(two_lines.reset(2));
    let (mut stage, _queue) = Stage::new(
        two_lines,
        MappingProfile::classic(),
        TransportBindings::default(),
    );

    // Scale and speed up, rows fader left at zero.
    surface.feed(&[0xB0, 0, 127]).unwrap();
    surface.feed(&[0xB0, 5, 127]).unwrap();

    let mut frame = 0;
    while stage.animator().phase() != Phase::Waiting {
        frame += 1;
        assert!(frame < 500, "typing never finished");
        let output = stage.step_snapshot(frame, handle.snapshot());
        assert!(output.glyphs.iter().all(|pose| "ijk".contains(pose.ch)));
    }
    assert_eq!(stage.animator().text_set_index(), 2);
    assert_eq!(stage.animator().active_rows(), 1);
}

proptest! {
    #[test]
    fn latched_flips_once_per_press(levels in proptest::collection::vec(any::<bool>(), 0..64)) {
        let mut button = ButtonState::default();
        let mut previous = false;
        let mut rising = 0usize;
        for level in levels {
            if level && !previous {
                rising += 1;
            }
            previous = level;
            button.set_pressed(level);
        }
        prop_assert_eq!(button.latched, rising % 2 == 1);
    }

    #[test]
    fn fader_values_map_linearly(a in 0u8..=127, b in 0u8..=127) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(normalize(low) <= normalize(high));

        let mut decoder = ControlSurfaceDecoder::new(ButtonLayout::Note);
        decoder.handle_message(&[0xB0, 0, a]);
        let value = decoder.state().faders[0];
        prop_assert!((0.0..=1.0).contains(&value));
        prop_assert!((value - f32::from(a) / 127.0).abs() < 1e-6);
    }

    #[test]
    fn indices_wrap_into_range(index in -1_000i64..1_000) {
        let library = library();
        let wrapped = library.wrap(index);
        prop_assert!(wrapped < library.len());
        prop_assert_eq!(wrapped as i64, index.rem_euclid(library.len() as i64));
        prop_assert_eq!(library.next(library.previous(wrapped)), wrapped);
    }

    #[test]
    fn identical_inputs_give_identical_frames(
        seed in 0.0f32..1.0,
        offset in 0.0f32..1.0,
        frames in 1u64..90,
    ) {
        let parameters = ParameterSet {
            seed,
            offset,
            rotation: 0.5,
            ..ParameterSet::DEFAULT
        };
        let mut first = animator();
        let mut second = animator();
        for frame in 1..=frames {
            prop_assert_eq!(first.tick(frame, &parameters), second.tick(frame, &parameters));
        }
    }
}
