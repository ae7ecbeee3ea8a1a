//! Per-page visualiser state.
//!
//! [`VisualiserState`] is owned by whatever hosts a page (the native window,
//! the offline renderer or the wasm bridge) and is passed by `&mut` into the
//! per-frame tick. It holds the user-facing parameters, the frozen-while-paused
//! shader uniforms, the orbit camera and the current scene description.

use serde::{Deserialize, Serialize};

use crate::camera::{CameraUniforms, OrbitController};
use crate::controls::{ControlAction, ControlOutcome, ControlPanel, PanelSnapshot};
use crate::input::OrbitGesture;
use crate::page::{follow_action, Navigator, Page};
use crate::scene_graph::{compose_scene, SceneDescription};
use crate::wave::{WaveParameters, DEFAULT_SPEED};

/// Playback toggles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub particles_enabled: bool,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            is_playing: true,
            particles_enabled: true,
        }
    }
}

/// Monotonic elapsed-time tracker fed by the host clock.
///
/// The first observed host value becomes the origin, so a freshly mounted page
/// starts at zero. Host values that go backwards are held at the last value.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameClock {
    origin: Option<f64>,
    last: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe the host clock. Returns `(elapsed, dt)` in seconds.
    pub fn tick(&mut self, host_seconds: f64) -> (f32, f32) {
        if !host_seconds.is_finite() {
            log::warn!("Ignoring non-finite host time");
            return (self.last as f32, 0.0);
        }
        let origin = *self.origin.get_or_insert(host_seconds);
        let elapsed = (host_seconds - origin).max(self.last);
        let dt = elapsed - self.last;
        self.last = elapsed;
        (elapsed as f32, dt as f32)
    }

    pub fn elapsed(&self) -> f32 {
        self.last as f32
    }
}

/// Values uploaded to the wave shader every frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ShaderUniforms {
    pub time: f32,
    pub amplitude: f32,
    pub frequency: f32,
}

impl ShaderUniforms {
    fn from_params(params: &WaveParameters, time: f32) -> Self {
        Self {
            time,
            amplitude: params.amplitude,
            frequency: params.frequency,
        }
    }
}

/// What pressing a page button did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ActionOutcome {
    /// The button drives the control panel.
    Control(ControlOutcome),
    /// The button asked the navigator for another route.
    Navigated,
    /// No such button on this page, or the button does nothing.
    Ignored,
}

/// Serializable summary for hosts and debugging.
#[derive(Clone, Debug, Serialize)]
pub struct StateSnapshot {
    pub page: Page,
    pub elapsed: f32,
    pub params: WaveParameters,
    pub playback: PlaybackState,
    pub uniforms: ShaderUniforms,
    pub panel: Option<PanelSnapshot>,
    pub camera_eye: [f32; 3],
    pub camera_target: [f32; 3],
    pub scene_revision: u64,
}

pub struct VisualiserState {
    page: Page,
    params: WaveParameters,
    playback: PlaybackState,
    panel: ControlPanel,
    clock: FrameClock,
    uniforms: ShaderUniforms,
    orbit: OrbitController,
    scene: SceneDescription,
    /// Bumped whenever `scene` is rebuilt.
    scene_revision: u64,
    viewport_height: f32,
}

impl VisualiserState {
    pub fn new(page: Page) -> Self {
        Self::with_state(page, WaveParameters::default(), PlaybackState::default())
    }

    /// Mount `page` with initial parameters. Parameters are quantized through
    /// the control panel so they always sit on a slider position.
    pub fn with_state(page: Page, mut params: WaveParameters, playback: PlaybackState) -> Self {
        let panel = ControlPanel::new();
        panel.sanitize(&mut params);
        let scene = compose_scene(page, &playback);
        let orbit = OrbitController::new(scene.camera, scene.orbit);
        log::info!("Mounted {} page", page);
        Self {
            page,
            params,
            playback,
            panel,
            clock: FrameClock::new(),
            uniforms: ShaderUniforms::from_params(&params, 0.0),
            orbit,
            scene,
            scene_revision: 0,
            viewport_height: 600.0,
        }
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn params(&self) -> &WaveParameters {
        &self.params
    }

    pub fn playback(&self) -> &PlaybackState {
        &self.playback
    }

    pub fn uniforms(&self) -> &ShaderUniforms {
        &self.uniforms
    }

    pub fn scene(&self) -> &SceneDescription {
        &self.scene
    }

    pub fn scene_revision(&self) -> u64 {
        self.scene_revision
    }

    pub fn elapsed(&self) -> f32 {
        self.clock.elapsed()
    }

    pub fn orbit(&self) -> &OrbitController {
        &self.orbit
    }

    pub fn camera_uniforms(&self) -> CameraUniforms {
        self.orbit.uniforms()
    }

    /// Viewport height in pixels, used to scale drag gestures.
    pub fn set_viewport_height(&mut self, height: u32) {
        if height > 0 {
            self.viewport_height = height as f32;
        }
    }

    /// Per-frame tick with the host's monotonic clock in seconds.
    ///
    /// While playing, shader time advances by `dt * speed` and amplitude and
    /// frequency are refreshed from the parameters. While paused the uniforms
    /// keep their last value. Returns the frame delta.
    pub fn advance(&mut self, host_seconds: f64) -> f32 {
        let (_, dt) = self.clock.tick(host_seconds);
        if self.playback.is_playing {
            let time = self.uniforms.time + dt * self.params.speed;
            self.uniforms = ShaderUniforms::from_params(&self.params, time);
        }
        self.orbit.update(dt);
        dt
    }

    /// Apply a control panel action. The landing page has no controls, so
    /// actions there are ignored.
    pub fn apply_control(&mut self, action: ControlAction) -> ControlOutcome {
        if !self.page.has_controls() {
            log::debug!("Ignoring {:?} on {} page", action, self.page);
            return ControlOutcome::Unchanged;
        }

        let particles_before = self.playback.particles_enabled;
        let outcome = self.panel.apply(action, &mut self.params, &mut self.playback);

        if outcome == ControlOutcome::Reset {
            // Time restarts on the default-speed timeline at the current elapsed.
            let time = self.clock.elapsed() * DEFAULT_SPEED;
            self.uniforms = ShaderUniforms::from_params(&self.params, time);
            log::info!("Parameters reset");
        }
        if self.playback.particles_enabled != particles_before {
            self.recompose();
        }
        outcome
    }

    /// Press the button labelled `label` on the current page.
    ///
    /// Playback and reset buttons go through [`Self::apply_control`];
    /// navigation buttons are handed to `navigator`, which decides whether the
    /// host remounts.
    pub fn trigger_action(&mut self, label: &str, navigator: &mut dyn Navigator) -> ActionOutcome {
        let content = self.page.content();
        let Some(action) = content.action(label) else {
            log::warn!("No '{}' action on {} page", label, self.page);
            return ActionOutcome::Ignored;
        };
        if let Some(control) = action.control_action() {
            return ActionOutcome::Control(self.apply_control(control));
        }
        if follow_action(action, navigator) {
            ActionOutcome::Navigated
        } else {
            ActionOutcome::Ignored
        }
    }

    /// Feed a pointer gesture to the orbit camera. Returns false when the page
    /// disables that gesture.
    pub fn apply_gesture(&mut self, gesture: OrbitGesture) -> bool {
        let height = self.viewport_height;
        match gesture {
            OrbitGesture::Rotate { dx, dy } => {
                self.orbit.rotate(dx, dy, height);
                true
            }
            OrbitGesture::Pan { dx, dy } => self.orbit.pan(dx, dy, height),
            OrbitGesture::Zoom { steps } => self.orbit.zoom(steps),
        }
    }

    /// Unmount the current page and mount `page` from defaults.
    pub fn navigate(&mut self, page: Page) {
        let revision = self.scene_revision;
        let height = self.viewport_height;
        *self = Self::new(page);
        self.scene_revision = revision + 1;
        self.viewport_height = height;
    }

    fn recompose(&mut self) {
        self.scene = compose_scene(self.page, &self.playback);
        self.scene_revision += 1;
    }

    pub fn snapshot(&self) -> StateSnapshot {
        let camera = self.orbit.uniforms();
        let target = self.orbit.target();
        StateSnapshot {
            page: self.page,
            elapsed: self.elapsed(),
            params: self.params,
            playback: self.playback,
            uniforms: self.uniforms,
            panel: self
                .page
                .has_controls()
                .then(|| self.panel.snapshot(&self.params, &self.playback)),
            camera_eye: [camera.position[0], camera.position[1], camera.position[2]],
            camera_target: [target.x, target.y, target.z],
            scene_revision: self.scene_revision,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::ControlId;
    use crate::page::RouteNavigator;

    fn run_frames(state: &mut VisualiserState, start: f64, frames: usize, dt: f64) -> f64 {
        let mut t = start;
        for _ in 0..frames {
            t += dt;
            state.advance(t);
        }
        t
    }

    #[test]
    fn test_clock_starts_at_first_tick() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick(100.0), (0.0, 0.0));
        let (elapsed, dt) = clock.tick(100.5);
        assert!((elapsed - 0.5).abs() < 1e-6);
        assert!((dt - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_clock_never_goes_backwards() {
        let mut clock = FrameClock::new();
        clock.tick(0.0);
        clock.tick(2.0);
        let (elapsed, dt) = clock.tick(1.0);
        assert_eq!(elapsed, 2.0);
        assert_eq!(dt, 0.0);
        assert_eq!(clock.tick(f64::NAN).1, 0.0);
    }

    #[test]
    fn test_time_tracks_elapsed_times_speed() {
        let mut state = VisualiserState::new(Page::Explore);
        state.apply_control(ControlAction::Set(ControlId::Speed, 2.0));
        state.advance(0.0);
        run_frames(&mut state, 0.0, 60, 1.0 / 60.0);
        assert!((state.uniforms().time - 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_paused_uniforms_frozen() {
        let mut state = VisualiserState::new(Page::Explore);
        state.advance(0.0);
        let t = run_frames(&mut state, 0.0, 30, 1.0 / 60.0);
        state.apply_control(ControlAction::SetPlaying(false));
        let frozen = *state.uniforms();
        state.apply_control(ControlAction::Set(ControlId::Amplitude, 1.5));
        let t = run_frames(&mut state, t, 30, 1.0 / 60.0);
        assert_eq!(*state.uniforms(), frozen);

        // Resuming moves by one frame's delta, not by the paused duration.
        state.apply_control(ControlAction::SetPlaying(true));
        run_frames(&mut state, t, 1, 1.0 / 60.0);
        assert!((state.uniforms().time - frozen.time - 1.0 / 60.0).abs() < 1e-4);
        assert_eq!(state.uniforms().amplitude, 1.5);
    }

    #[test]
    fn test_reset_keeps_elapsed() {
        let mut state = VisualiserState::new(Page::Explore);
        state.advance(0.0);
        run_frames(&mut state, 0.0, 120, 1.0 / 60.0);
        state.apply_control(ControlAction::Set(ControlId::Speed, 3.0));
        state.apply_control(ControlAction::ToggleParticles);
        let elapsed = state.elapsed();

        assert_eq!(state.apply_control(ControlAction::Reset), ControlOutcome::Reset);
        assert_eq!(*state.params(), WaveParameters::default());
        assert_eq!(*state.playback(), PlaybackState::default());
        assert_eq!(state.elapsed(), elapsed);
        assert!((state.uniforms().time - elapsed).abs() < 1e-5);
        assert_eq!(state.scene().particle_count(), 100);
    }

    #[test]
    fn test_reset_twice_matches_reset_once() {
        let mut state = VisualiserState::new(Page::Explore);
        state.advance(0.0);
        run_frames(&mut state, 0.0, 60, 1.0 / 60.0);
        state.apply_control(ControlAction::Set(ControlId::Amplitude, 1.9));
        state.apply_control(ControlAction::SetParticles(false));

        assert_eq!(state.apply_control(ControlAction::Reset), ControlOutcome::Reset);
        let params = *state.params();
        let playback = *state.playback();
        let uniforms = *state.uniforms();
        let revision = state.scene_revision();

        assert_eq!(state.apply_control(ControlAction::Reset), ControlOutcome::Reset);
        assert_eq!(*state.params(), params);
        assert_eq!(*state.playback(), playback);
        assert_eq!(*state.uniforms(), uniforms);
        // Particles were already on, so the scene is not rebuilt again.
        assert_eq!(state.scene_revision(), revision);
    }

    #[test]
    fn test_reset_independent_of_mutation_order() {
        let mut first = VisualiserState::new(Page::Explore);
        let mut second = VisualiserState::new(Page::Explore);
        for state in [&mut first, &mut second] {
            state.advance(0.0);
            run_frames(state, 0.0, 30, 1.0 / 30.0);
        }

        first.apply_control(ControlAction::SetPlaying(false));
        first.apply_control(ControlAction::Set(ControlId::Speed, 3.0));
        first.apply_control(ControlAction::SetParticles(false));

        second.apply_control(ControlAction::SetParticles(false));
        second.apply_control(ControlAction::Set(ControlId::Amplitude, 2.0));
        second.apply_control(ControlAction::SetPlaying(false));

        first.apply_control(ControlAction::Reset);
        second.apply_control(ControlAction::Reset);

        assert_eq!(*first.params(), WaveParameters::default());
        assert_eq!(*first.params(), *second.params());
        assert_eq!(*first.playback(), *second.playback());
        assert_eq!(*first.uniforms(), *second.uniforms());
        assert_eq!(first.scene_revision(), second.scene_revision());
        assert_eq!(first.scene().particle_count(), second.scene().particle_count());
    }

    #[test]
    fn test_play_pause_button_freezes_uniforms() {
        let mut state = VisualiserState::new(Page::Explore);
        let mut navigator = RouteNavigator::new(Page::Explore);
        state.advance(0.0);
        let t = run_frames(&mut state, 0.0, 10, 0.1);

        let outcome = state.trigger_action("Play/Pause", &mut navigator);
        assert_eq!(outcome, ActionOutcome::Control(ControlOutcome::Changed(None)));
        assert!(!state.playback().is_playing);
        let frozen = *state.uniforms();
        run_frames(&mut state, t, 10, 0.1);
        assert_eq!(*state.uniforms(), frozen);
        assert_eq!(navigator.current(), Page::Explore);
    }

    #[test]
    fn test_reset_button_restores_defaults() {
        let mut state = VisualiserState::new(Page::Explore);
        let mut navigator = RouteNavigator::new(Page::Explore);
        state.apply_control(ControlAction::Set(ControlId::Frequency, 1.8));
        state.apply_control(ControlAction::SetPlaying(false));

        let outcome = state.trigger_action("Reset", &mut navigator);
        assert_eq!(outcome, ActionOutcome::Control(ControlOutcome::Reset));
        assert_eq!(*state.params(), WaveParameters::default());
        assert!(state.playback().is_playing);
    }

    #[test]
    fn test_navigation_buttons_go_to_navigator() {
        let mut state = VisualiserState::new(Page::Landing);
        let mut navigator = RouteNavigator::new(Page::Landing);
        assert_eq!(state.trigger_action("Learn More", &mut navigator), ActionOutcome::Ignored);
        assert_eq!(state.trigger_action("Reset", &mut navigator), ActionOutcome::Ignored);
        assert_eq!(
            state.trigger_action("Explore Waves", &mut navigator),
            ActionOutcome::Navigated
        );
        assert_eq!(navigator.current(), Page::Explore);
        // The state only changes page when the host remounts it.
        assert_eq!(state.page(), Page::Landing);
    }

    #[test]
    fn test_particle_toggle_recomposes_without_touching_uniforms() {
        let mut state = VisualiserState::new(Page::Explore);
        state.advance(0.0);
        run_frames(&mut state, 0.0, 10, 0.1);
        let uniforms = *state.uniforms();
        let revision = state.scene_revision();

        state.apply_control(ControlAction::SetParticles(false));
        assert!(state.scene().particles.is_empty());
        assert!(state.scene_revision() > revision);
        assert_eq!(*state.uniforms(), uniforms);
    }

    #[test]
    fn test_landing_ignores_controls() {
        let mut state = VisualiserState::new(Page::Landing);
        let outcome = state.apply_control(ControlAction::Set(ControlId::Amplitude, 2.0));
        assert_eq!(outcome, ControlOutcome::Unchanged);
        assert_eq!(*state.params(), WaveParameters::default());
        assert!(state.snapshot().panel.is_none());
    }

    #[test]
    fn test_navigate_remounts_with_defaults() {
        let mut state = VisualiserState::new(Page::Explore);
        state.advance(5.0);
        state.advance(6.0);
        state.apply_control(ControlAction::Set(ControlId::Frequency, 1.7));
        let revision = state.scene_revision();

        state.navigate(Page::Landing);
        state.navigate(Page::Explore);
        assert_eq!(*state.params(), WaveParameters::default());
        assert_eq!(state.elapsed(), 0.0);
        assert!(state.scene_revision() > revision);
    }

    #[test]
    fn test_landing_orbit_rejects_zoom_and_pan() {
        let mut state = VisualiserState::new(Page::Landing);
        assert!(!state.apply_gesture(OrbitGesture::Zoom { steps: 1.0 }));
        assert!(!state.apply_gesture(OrbitGesture::Pan { dx: 5.0, dy: 0.0 }));
        assert!(state.apply_gesture(OrbitGesture::Rotate { dx: 5.0, dy: 0.0 }));
    }

    #[test]
    fn test_with_state_quantizes() {
        let params = WaveParameters {
            amplitude: 7.0,
            frequency: 0.33,
            speed: -1.0,
        };
        let state = VisualiserState::with_state(Page::Explore, params, PlaybackState::default());
        assert!((state.params().amplitude - 2.0).abs() < 1e-5);
        assert!((state.params().frequency - 0.3).abs() < 1e-5);
        assert!((state.params().speed - 0.1).abs() < 1e-5);
    }
}
