//! Parameter control panel.
//!
//! Range controls for amplitude, frequency and speed, boolean toggles for
//! playback and particles, and a reset action. The panel owns no state: every
//! action is applied straight to the caller's [`WaveParameters`] and
//! [`PlaybackState`], with the range/step constraints a slider widget would
//! enforce.

use serde::Serialize;

use crate::visualiser::PlaybackState;
use crate::wave::WaveParameters;

/// Identifies one of the range controls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlId {
    Amplitude,
    Frequency,
    Speed,
}

impl ControlId {
    fn read(&self, params: &WaveParameters) -> f32 {
        match self {
            ControlId::Amplitude => params.amplitude,
            ControlId::Frequency => params.frequency,
            ControlId::Speed => params.speed,
        }
    }

    fn write(&self, params: &mut WaveParameters, value: f32) {
        match self {
            ControlId::Amplitude => params.amplitude = value,
            ControlId::Frequency => params.frequency = value,
            ControlId::Speed => params.speed = value,
        }
    }
}

/// A labelled slider with a fixed range and step.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RangeControl {
    pub id: ControlId,
    pub label: &'static str,
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl RangeControl {
    /// Clamp `value` into range and snap it to the step grid.
    ///
    /// Returns `None` for non-finite input, which a slider cannot produce.
    pub fn quantize(&self, value: f32) -> Option<f32> {
        if !value.is_finite() {
            return None;
        }
        let (min, step) = (self.min as f64, self.step as f64);
        let clamped = (value as f64).clamp(min, self.max as f64);
        let steps = ((clamped - min) / step).round();
        // Round away accumulated binary error so 0.1 + 7 * 0.1 lands on 0.8.
        let snapped = ((min + steps * step) * 1e6).round() / 1e6;
        Some((snapped as f32).clamp(self.min, self.max))
    }

    /// Move `value` by whole steps, staying in range.
    pub fn step_by(&self, value: f32, steps: i32) -> f32 {
        self.quantize(value + steps as f32 * self.step)
            .unwrap_or(self.min)
    }

    /// Value label shown under the slider.
    pub fn display(&self, value: f32) -> String {
        format!("{:.1}", value)
    }
}

/// Something the user did to the panel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ControlAction {
    Set(ControlId, f32),
    Nudge(ControlId, i32),
    SetPlaying(bool),
    TogglePlaying,
    SetParticles(bool),
    ToggleParticles,
    Reset,
}

/// What applying an action did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ControlOutcome {
    /// A value changed; carries the value actually stored for range controls.
    Changed(Option<f32>),
    /// The action left the state as it was.
    Unchanged,
    /// Input was not a usable number.
    Rejected,
    /// Defaults were restored.
    Reset,
}

/// Serializable view of one slider, for hosts that draw the widgets.
#[derive(Clone, Debug, Serialize)]
pub struct SliderSnapshot {
    #[serde(flatten)]
    pub control: RangeControl,
    pub value: f32,
    pub value_label: String,
}

/// Serializable view of the whole panel.
#[derive(Clone, Debug, Serialize)]
pub struct PanelSnapshot {
    pub sliders: Vec<SliderSnapshot>,
    pub is_playing: bool,
    pub particles_enabled: bool,
}

/// The fixed set of controls exposed by the explore page.
#[derive(Clone, Debug)]
pub struct ControlPanel {
    controls: [RangeControl; 3],
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self {
            controls: [
                RangeControl {
                    id: ControlId::Amplitude,
                    label: "Amplitude",
                    min: 0.1,
                    max: 2.0,
                    step: 0.1,
                },
                RangeControl {
                    id: ControlId::Frequency,
                    label: "Frequency",
                    min: 0.1,
                    max: 2.0,
                    step: 0.1,
                },
                RangeControl {
                    id: ControlId::Speed,
                    label: "Speed",
                    min: 0.1,
                    max: 3.0,
                    step: 0.1,
                },
            ],
        }
    }

    pub fn control(&self, id: ControlId) -> &RangeControl {
        match id {
            ControlId::Amplitude => &self.controls[0],
            ControlId::Frequency => &self.controls[1],
            ControlId::Speed => &self.controls[2],
        }
    }

    /// Restore the documented defaults.
    pub fn reset(&self, params: &mut WaveParameters, playback: &mut PlaybackState) {
        *params = WaveParameters::default();
        *playback = PlaybackState::default();
    }

    /// Bring every parameter into range, e.g. after loading a config file.
    pub fn sanitize(&self, params: &mut WaveParameters) {
        let defaults = WaveParameters::default();
        for control in &self.controls {
            let value = control
                .quantize(control.id.read(params))
                .unwrap_or_else(|| control.id.read(&defaults));
            control.id.write(params, value);
        }
    }

    /// Apply `action` to the caller's state.
    pub fn apply(
        &self,
        action: ControlAction,
        params: &mut WaveParameters,
        playback: &mut PlaybackState,
    ) -> ControlOutcome {
        match action {
            ControlAction::Set(id, raw) => {
                let control = self.control(id);
                match control.quantize(raw) {
                    Some(value) => set_range(control, params, value),
                    None => {
                        log::warn!("Rejected non-finite {} value", control.label);
                        ControlOutcome::Rejected
                    }
                }
            }
            ControlAction::Nudge(id, steps) => {
                let control = self.control(id);
                let value = control.step_by(id.read(params), steps);
                set_range(control, params, value)
            }
            ControlAction::SetPlaying(playing) => set_flag(&mut playback.is_playing, playing),
            ControlAction::TogglePlaying => {
                let toggled = !playback.is_playing;
                set_flag(&mut playback.is_playing, toggled)
            }
            ControlAction::SetParticles(enabled) => set_flag(&mut playback.particles_enabled, enabled),
            ControlAction::ToggleParticles => {
                let toggled = !playback.particles_enabled;
                set_flag(&mut playback.particles_enabled, toggled)
            }
            ControlAction::Reset => {
                self.reset(params, playback);
                ControlOutcome::Reset
            }
        }
    }

    pub fn snapshot(&self, params: &WaveParameters, playback: &PlaybackState) -> PanelSnapshot {
        PanelSnapshot {
            sliders: self
                .controls
                .iter()
                .map(|control| {
                    let value = control.id.read(params);
                    SliderSnapshot {
                        control: *control,
                        value,
                        value_label: control.display(value),
                    }
                })
                .collect(),
            is_playing: playback.is_playing,
            particles_enabled: playback.particles_enabled,
        }
    }
}

fn set_range(control: &RangeControl, params: &mut WaveParameters, value: f32) -> ControlOutcome {
    if control.id.read(params) == value {
        return ControlOutcome::Unchanged;
    }
    log::debug!("{} -> {}", control.label, control.display(value));
    control.id.write(params, value);
    ControlOutcome::Changed(Some(value))
}

fn set_flag(flag: &mut bool, value: bool) -> ControlOutcome {
    if *flag == value {
        ControlOutcome::Unchanged
    } else {
        *flag = value;
        ControlOutcome::Changed(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_quantize_clamps_to_range() {
        let panel = ControlPanel::new();
        let amplitude = panel.control(ControlId::Amplitude);
        assert!(approx(amplitude.quantize(5.0).unwrap(), 2.0));
        assert!(approx(amplitude.quantize(-1.0).unwrap(), 0.1));
        let speed = panel.control(ControlId::Speed);
        assert!(approx(speed.quantize(3.7).unwrap(), 3.0));
        assert!(approx(speed.quantize(0.0).unwrap(), 0.1));
    }

    #[test]
    fn test_quantize_snaps_to_step() {
        let panel = ControlPanel::new();
        let frequency = panel.control(ControlId::Frequency);
        assert!(approx(frequency.quantize(0.74).unwrap(), 0.7));
        assert!(approx(frequency.quantize(0.76).unwrap(), 0.8));
    }

    #[test]
    fn test_quantize_rejects_non_finite() {
        let panel = ControlPanel::new();
        let amplitude = panel.control(ControlId::Amplitude);
        assert_eq!(amplitude.quantize(f32::NAN), None);
        assert_eq!(amplitude.quantize(f32::INFINITY), None);
    }

    #[test]
    fn test_set_rejected_leaves_state() {
        let panel = ControlPanel::new();
        let mut params = WaveParameters::default();
        let mut playback = PlaybackState::default();
        let outcome = panel.apply(
            ControlAction::Set(ControlId::Amplitude, f32::NAN),
            &mut params,
            &mut playback,
        );
        assert_eq!(outcome, ControlOutcome::Rejected);
        assert_eq!(params, WaveParameters::default());
    }

    #[test]
    fn test_nudge_stays_in_range() {
        let panel = ControlPanel::new();
        let mut params = WaveParameters::default();
        let mut playback = PlaybackState::default();
        for _ in 0..50 {
            panel.apply(ControlAction::Nudge(ControlId::Speed, 1), &mut params, &mut playback);
        }
        assert!(approx(params.speed, 3.0));
        for _ in 0..50 {
            panel.apply(ControlAction::Nudge(ControlId::Speed, -1), &mut params, &mut playback);
        }
        assert!(approx(params.speed, 0.1));
    }

    #[test]
    fn test_toggles() {
        let panel = ControlPanel::new();
        let mut params = WaveParameters::default();
        let mut playback = PlaybackState::default();
        panel.apply(ControlAction::TogglePlaying, &mut params, &mut playback);
        assert!(!playback.is_playing);
        panel.apply(ControlAction::ToggleParticles, &mut params, &mut playback);
        assert!(!playback.particles_enabled);
        let outcome = panel.apply(ControlAction::SetParticles(false), &mut params, &mut playback);
        assert_eq!(outcome, ControlOutcome::Unchanged);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let panel = ControlPanel::new();
        let mut params = WaveParameters {
            amplitude: 1.9,
            frequency: 0.2,
            speed: 2.5,
        };
        let mut playback = PlaybackState {
            is_playing: false,
            particles_enabled: false,
        };
        assert_eq!(
            panel.apply(ControlAction::Reset, &mut params, &mut playback),
            ControlOutcome::Reset
        );
        assert_eq!(params.amplitude, 0.8);
        assert_eq!(params.frequency, 0.5);
        assert_eq!(params.speed, 1.0);
        assert!(playback.is_playing);
        assert!(playback.particles_enabled);
    }

    #[test]
    fn test_sanitize() {
        let panel = ControlPanel::new();
        let mut params = WaveParameters {
            amplitude: 9.0,
            frequency: f32::NAN,
            speed: 1.26,
        };
        panel.sanitize(&mut params);
        assert!(approx(params.amplitude, 2.0));
        assert_eq!(params.frequency, 0.5);
        assert!(approx(params.speed, 1.3));
    }

    #[test]
    fn test_snapshot_labels() {
        let panel = ControlPanel::new();
        let snapshot = panel.snapshot(&WaveParameters::default(), &PlaybackState::default());
        let labels: Vec<_> = snapshot.sliders.iter().map(|s| s.value_label.as_str()).collect();
        assert_eq!(labels, vec!["0.8", "0.5", "1.0"]);
        assert!(snapshot.is_playing);
    }
}
