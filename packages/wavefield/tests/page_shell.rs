//! Page routing and content, end to end through the public API.
//!
//! Run with: cargo test --test page_shell

use wavefield::config::ViewerConfig;
use wavefield::controls::{ControlAction, ControlId, ControlOutcome};
use wavefield::page::{follow_action, ActionTarget, Navigator, Page, RouteNavigator};
use wavefield::particle::SpriteStyle;
use wavefield::visualiser::{ActionOutcome, VisualiserState};
use wavefield::wave::{AlphaMode, WaveParameters};

#[test]
fn test_explore_button_then_back() {
    let mut navigator = RouteNavigator::new(Page::Landing);
    let mut state = VisualiserState::new(navigator.current());

    let landing = Page::Landing.content();
    let explore = landing.action("Explore Waves").unwrap();
    assert!(follow_action(explore, &mut navigator));
    state.navigate(navigator.current());
    assert_eq!(state.page(), Page::Explore);
    assert!(state.page().has_controls());

    let back = Page::Explore.content();
    assert!(follow_action(back.action("Back to Home").unwrap(), &mut navigator));
    state.navigate(navigator.current());
    assert_eq!(state.page(), Page::Landing);
    assert_eq!(navigator.history(), &["/", "/explore", "/"]);
}

#[test]
fn test_non_navigating_actions() {
    let mut navigator = RouteNavigator::new(Page::Landing);
    let learn_more = Page::Landing.content();
    assert!(!follow_action(learn_more.action("Learn More").unwrap(), &mut navigator));
    assert_eq!(navigator.current(), Page::Landing);

    let explore = Page::Explore.content();
    assert_eq!(explore.action("Reset").unwrap().target, ActionTarget::Reset);
    assert!(!follow_action(explore.action("Play/Pause").unwrap(), &mut navigator));
}

#[test]
fn test_explore_buttons_drive_playback() {
    let mut navigator = RouteNavigator::new(Page::Explore);
    let mut state = VisualiserState::new(Page::Explore);
    state.advance(0.0);
    state.advance(0.5);
    state.apply_control(ControlAction::Set(ControlId::Speed, 2.4));

    assert_eq!(
        state.trigger_action("Play/Pause", &mut navigator),
        ActionOutcome::Control(ControlOutcome::Changed(None))
    );
    let frozen = *state.uniforms();
    state.advance(1.0);
    state.advance(1.5);
    assert_eq!(*state.uniforms(), frozen);

    assert_eq!(
        state.trigger_action("Reset", &mut navigator),
        ActionOutcome::Control(ControlOutcome::Reset)
    );
    assert_eq!(*state.params(), WaveParameters::default());
    assert!(state.playback().is_playing);
    state.advance(2.0);
    assert!(state.uniforms().time > frozen.time);
    assert_eq!(navigator.history(), &["/explore"]);
}

#[test]
fn test_unknown_route_keeps_page() {
    let mut navigator = RouteNavigator::new(Page::Explore);
    navigator.navigate("/settings");
    assert_eq!(navigator.current(), Page::Explore);
    assert_eq!(navigator.history().len(), 1);
}

#[test]
fn test_returning_to_explore_starts_fresh() {
    let mut state = VisualiserState::new(Page::Explore);
    state.advance(0.0);
    state.advance(3.0);
    state.apply_control(ControlAction::TogglePlaying);
    state.apply_control(ControlAction::ToggleParticles);

    state.navigate(Page::Landing);
    state.navigate(Page::Explore);
    assert!(state.playback().is_playing);
    assert!(state.playback().particles_enabled);
    assert_eq!(state.elapsed(), 0.0);
    // The new clock anchors on the first tick after mounting.
    state.advance(100.0);
    assert_eq!(state.elapsed(), 0.0);
}

#[test]
fn test_landing_scene_is_decorative() {
    let state = VisualiserState::new(Page::Landing);
    let scene = state.scene();
    assert_eq!(scene.opacity, 0.4);
    assert_eq!(scene.wave.alpha_mode, AlphaMode::RestHeightFade);
    assert!(scene.orbit.auto_rotate);
    let styles: Vec<_> = scene.particles.iter().map(|layer| layer.style).collect();
    assert_eq!(styles, vec![SpriteStyle::Dot, SpriteStyle::Sparkle]);
    assert_eq!(scene.particle_count(), 350);
}

#[test]
fn test_config_selects_starting_page() {
    let config = ViewerConfig::from_json(r#"{ "page": "explore", "params": { "amplitude": 1.27 } }"#)
        .unwrap();
    let state = config.build_state();
    assert_eq!(state.page(), Page::Explore);
    assert_eq!(state.params().amplitude, 1.3);
}

#[test]
fn test_page_content_serializes_for_hosts() {
    let json = serde_json::to_value(Page::Landing.content()).unwrap();
    assert_eq!(json["heading"], "Wave Canvas Magic");
    assert_eq!(json["actions"][0]["target"]["kind"], "navigate");
    assert_eq!(json["actions"][0]["target"]["route"], "/explore");
    assert_eq!(json["cards"].as_array().unwrap().len(), 3);
}
