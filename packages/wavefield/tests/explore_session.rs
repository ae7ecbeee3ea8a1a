//! Drive an explore page the way a host does: ticks, slider input, shortcuts
//! and orbit gestures, checking what would be uploaded to the shaders.
//!
//! Run with: cargo test --test explore_session

use wavefield::controls::{ControlAction, ControlId, ControlOutcome};
use wavefield::input::{Command, OrbitGesture, PointerButton, PointerTracker, ShortcutKey};
use wavefield::page::Page;
use wavefield::visualiser::VisualiserState;
use wavefield::wave::{WaveParameters, WaveProfile, DEFAULT_AMPLITUDE, DEFAULT_FREQUENCY};

fn run_frames(state: &mut VisualiserState, start: f64, frames: usize, dt: f64) -> f64 {
    let mut t = start;
    for _ in 0..frames {
        t += dt;
        state.advance(t);
    }
    t
}

#[test]
fn test_slider_changes_reach_uniforms_on_next_frame() {
    let mut state = VisualiserState::new(Page::Explore);
    state.advance(0.0);

    let outcome = state.apply_control(ControlAction::Set(ControlId::Amplitude, 1.53));
    assert_eq!(outcome, ControlOutcome::Changed(Some(1.5)));
    // Uniforms only change on the next tick.
    assert_eq!(state.uniforms().amplitude, DEFAULT_AMPLITUDE);

    state.advance(0.1);
    assert_eq!(state.uniforms().amplitude, 1.5);
    assert_eq!(state.uniforms().frequency, DEFAULT_FREQUENCY);
}

#[test]
fn test_speed_scales_shader_time() {
    let mut slow = VisualiserState::new(Page::Explore);
    let mut fast = VisualiserState::new(Page::Explore);
    fast.apply_control(ControlAction::Set(ControlId::Speed, 2.0));

    slow.advance(0.0);
    fast.advance(0.0);
    run_frames(&mut slow, 0.0, 60, 1.0 / 60.0);
    run_frames(&mut fast, 0.0, 60, 1.0 / 60.0);

    assert!((slow.uniforms().time - 1.0).abs() < 1e-3);
    assert!((fast.uniforms().time - 2.0).abs() < 1e-3);
}

#[test]
fn test_pause_freezes_surface_but_not_clock() {
    let mut state = VisualiserState::new(Page::Explore);
    state.advance(0.0);
    let t = run_frames(&mut state, 0.0, 30, 1.0 / 30.0);

    let key = ShortcutKey::Space.command();
    let Command::Control(action) = key else {
        panic!("space should map to a control action");
    };
    assert_eq!(state.apply_control(action), ControlOutcome::Changed(None));
    assert!(!state.playback().is_playing);

    let frozen = *state.uniforms();
    run_frames(&mut state, t, 30, 1.0 / 30.0);
    assert_eq!(*state.uniforms(), frozen);
    assert!((state.elapsed() - 2.0).abs() < 1e-3);

    // Slider moves while paused are stored but not uploaded.
    state.apply_control(ControlAction::Set(ControlId::Frequency, 1.2));
    state.advance(t + 2.0);
    assert_eq!(state.uniforms().frequency, frozen.frequency);
}

#[test]
fn test_reset_restores_defaults_and_resumes() {
    let mut state = VisualiserState::new(Page::Explore);
    state.advance(0.0);
    state.apply_control(ControlAction::Set(ControlId::Amplitude, 2.0));
    state.apply_control(ControlAction::TogglePlaying);
    state.apply_control(ControlAction::ToggleParticles);
    assert!(state.scene().particles.is_empty());

    assert_eq!(state.apply_control(ControlAction::Reset), ControlOutcome::Reset);
    assert_eq!(*state.params(), WaveParameters::default());
    assert!(state.playback().is_playing);
    assert!(state.playback().particles_enabled);
    assert_eq!(state.scene().particle_count(), 100);
}

#[test]
fn test_nudges_stop_at_range_limits() {
    let mut state = VisualiserState::new(Page::Explore);
    for _ in 0..50 {
        state.apply_control(ControlAction::Nudge(ControlId::Amplitude, 1));
    }
    assert_eq!(state.params().amplitude, 2.0);
    assert_eq!(
        state.apply_control(ControlAction::Nudge(ControlId::Amplitude, 1)),
        ControlOutcome::Unchanged
    );
    for _ in 0..50 {
        state.apply_control(ControlAction::Nudge(ControlId::Speed, -1));
    }
    assert_eq!(state.params().speed, 0.1);
}

#[test]
fn test_non_finite_slider_values_are_rejected() {
    let mut state = VisualiserState::new(Page::Explore);
    assert_eq!(
        state.apply_control(ControlAction::Set(ControlId::Frequency, f32::NAN)),
        ControlOutcome::Rejected
    );
    assert_eq!(state.params().frequency, DEFAULT_FREQUENCY);
}

#[test]
fn test_surface_height_tracks_amplitude() {
    let mut state = VisualiserState::new(Page::Explore);
    state.apply_control(ControlAction::Set(ControlId::Amplitude, 2.0));
    state.advance(0.0);
    state.advance(0.5);

    let uniforms = state.uniforms();
    let profile = state.scene().wave.profile;
    assert_eq!(profile, WaveProfile::Parametric);
    let bound = profile.max_displacement(uniforms.amplitude);
    for i in 0..20 {
        let x = -7.5 + i as f32 * 0.75;
        let y = profile.vertical_offset(x, -x, uniforms.time, uniforms.amplitude, uniforms.frequency);
        assert!(y.abs() <= bound + 1e-5);
    }
}

#[test]
fn test_pointer_drag_orbits_camera() {
    let mut state = VisualiserState::new(Page::Explore);
    state.set_viewport_height(720);
    let before = state.orbit().eye();

    let mut pointer = PointerTracker::new();
    pointer.press(PointerButton::Primary);
    pointer.move_to(100.0, 100.0);
    let gesture = pointer.move_to(160.0, 100.0).unwrap();
    assert!(state.apply_gesture(gesture));
    assert_ne!(state.orbit().eye(), before);

    let distance = state.orbit().distance();
    assert!(state.apply_gesture(pointer.wheel(-120.0).unwrap()));
    assert!(state.orbit().distance() < distance);
}

#[test]
fn test_snapshot_exposes_panel() {
    let mut state = VisualiserState::new(Page::Explore);
    state.apply_control(ControlAction::Set(ControlId::Speed, 2.5));
    let json = serde_json::to_value(state.snapshot()).unwrap();

    let sliders = json["panel"]["sliders"].as_array().unwrap();
    assert_eq!(sliders.len(), 3);
    assert_eq!(sliders[2]["label"], "Speed");
    assert_eq!(sliders[2]["value_label"], "2.5");
    assert_eq!(json["playback"]["particles_enabled"], true);

    let landing = serde_json::to_value(VisualiserState::new(Page::Landing).snapshot()).unwrap();
    assert!(landing["panel"].is_null());
}

#[test]
fn test_landing_disables_pan_and_zoom() {
    let mut state = VisualiserState::new(Page::Landing);
    assert!(!state.apply_gesture(OrbitGesture::Zoom { steps: 1.0 }));
    assert!(!state.apply_gesture(OrbitGesture::Pan { dx: 10.0, dy: 0.0 }));
    assert!(state.apply_gesture(OrbitGesture::Rotate { dx: 10.0, dy: 0.0 }));
}
