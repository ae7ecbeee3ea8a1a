//! Parametric wave field.
//!
//! CPU mirror of the wave shader program in `gpu/shader_wave.wgsl`. The GPU
//! evaluates the same math per vertex/fragment; this module exists so the
//! scene description, the tests and the offline tooling agree with what the
//! shader draws.
//!
//! ## Displacement
//!
//! The surface is a flat grid in the XZ plane. Each vertex is lifted by the sum
//! of three sinusoids of its horizontal coordinates:
//!
//! ```text
//! offset = Σ amplitude_i · sin(x · x_freq_i + z · z_freq_i + t · time_rate_i)
//! ```
//!
//! The explore page derives the three terms from the user-controlled amplitude
//! and frequency; the landing page uses a fixed, gentler set.
//!
//! ## Colour
//!
//! Two base colours are blended by a slow horizontal sine, then an accent
//! colour is mixed in by a time pulse scaled by 0.3. Alpha is either constant
//! or faded near the plane's rest height.

use serde::{Deserialize, Serialize};

/// Default wave amplitude restored by reset.
pub const DEFAULT_AMPLITUDE: f32 = 0.8;
/// Default spatial frequency restored by reset.
pub const DEFAULT_FREQUENCY: f32 = 0.5;
/// Default time multiplier restored by reset.
pub const DEFAULT_SPEED: f32 = 1.0;

/// Alpha applied to every fragment before any fade.
pub const BASE_ALPHA: f32 = 0.8;

/// Primary surface colour.
pub const COLOR_A_HEX: &str = "#0ea5e9";
/// Secondary surface colour.
pub const COLOR_B_HEX: &str = "#06b6d4";
/// Accent colour pulsed over the surface.
pub const COLOR_C_HEX: &str = "#8b5cf6";

// ============================================================================
// Parameters
// ============================================================================

/// User-tunable wave parameters.
///
/// Mutated only through the control panel; read every frame by the scene.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveParameters {
    /// Height multiplier of the displacement (> 0).
    pub amplitude: f32,
    /// Spatial frequency multiplier (> 0).
    pub frequency: f32,
    /// Multiplier applied to elapsed time (>= 0).
    pub speed: f32,
}

impl Default for WaveParameters {
    fn default() -> Self {
        Self {
            amplitude: DEFAULT_AMPLITUDE,
            frequency: DEFAULT_FREQUENCY,
            speed: DEFAULT_SPEED,
        }
    }
}

// ============================================================================
// Wave terms and profiles
// ============================================================================

/// One sinusoid of the displacement sum.
///
/// Packed as a `vec4` (x_freq, z_freq, time_rate, amplitude) for the shader.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct WaveTerm {
    pub x_freq: f32,
    pub z_freq: f32,
    pub time_rate: f32,
    pub amplitude: f32,
}

impl WaveTerm {
    pub const fn new(x_freq: f32, z_freq: f32, time_rate: f32, amplitude: f32) -> Self {
        Self {
            x_freq,
            z_freq,
            time_rate,
            amplitude,
        }
    }

    pub fn evaluate(&self, x: f32, z: f32, t: f32) -> f32 {
        self.amplitude * (x * self.x_freq + z * self.z_freq + t * self.time_rate).sin()
    }

    pub fn to_vec4(&self) -> [f32; 4] {
        [self.x_freq, self.z_freq, self.time_rate, self.amplitude]
    }
}

/// Fixed terms of the landing background.
const LANDING_TERMS: [WaveTerm; 3] = [
    WaveTerm::new(0.5, 0.0, 0.8, 0.3),
    WaveTerm::new(0.0, 0.3, 1.2, 0.2),
    WaveTerm::new(0.8, 0.4, 1.5, 0.15),
];

/// Which set of sinusoids drives the surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveProfile {
    /// Terms derived from amplitude and frequency (explore page).
    Parametric,
    /// Fixed decorative terms (landing page); ignores amplitude and frequency.
    Landing,
}

impl WaveProfile {
    /// Resolve the three sinusoids for the given amplitude and frequency.
    pub fn terms(&self, amplitude: f32, frequency: f32) -> [WaveTerm; 3] {
        match self {
            WaveProfile::Parametric => [
                WaveTerm::new(frequency, 0.0, 1.0, amplitude),
                WaveTerm::new(0.0, frequency * 0.7, 1.3, amplitude * 0.5),
                WaveTerm::new(frequency * 1.2, frequency * 0.8, 0.8, amplitude * 0.3),
            ],
            WaveProfile::Landing => LANDING_TERMS,
        }
    }

    /// Vertical offset of the base grid point `(x, z)` at shader time `t`.
    pub fn vertical_offset(&self, x: f32, z: f32, t: f32, amplitude: f32, frequency: f32) -> f32 {
        self.terms(amplitude, frequency)
            .iter()
            .map(|term| term.evaluate(x, z, t))
            .sum()
    }

    /// Largest possible |offset|: the sum of the term amplitudes.
    pub fn max_displacement(&self, amplitude: f32) -> f32 {
        self.terms(amplitude, 1.0)
            .iter()
            .map(|term| term.amplitude.abs())
            .sum()
    }
}

// ============================================================================
// Colour and alpha
// ============================================================================

/// Parse `#rrggbb` into linear-ish 0..1 components (no gamma conversion).
pub fn hex_color(hex: &str) -> Option<[f32; 3]> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| {
        u8::from_str_radix(&digits[i..i + 2], 16)
            .ok()
            .map(|v| v as f32 / 255.0)
    };
    Some([channel(0)?, channel(2)?, channel(4)?])
}

/// The three surface colours.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Palette {
    pub color_a: [f32; 3],
    pub color_b: [f32; 3],
    pub color_c: [f32; 3],
}

impl Default for Palette {
    fn default() -> Self {
        let parse = |hex: &str| hex_color(hex).unwrap_or([1.0, 1.0, 1.0]);
        Self {
            color_a: parse(COLOR_A_HEX),
            color_b: parse(COLOR_B_HEX),
            color_c: parse(COLOR_C_HEX),
        }
    }
}

fn mix3(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}

/// GLSL-style smoothstep.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Fragment colour at base coordinate `x` and shader time `t`.
pub fn surface_color(palette: &Palette, x: f32, t: f32) -> [f32; 3] {
    let wave = (x * 0.1 + t * 0.5).sin() * 0.5 + 0.5;
    let pulse = (t * 2.0).sin() * 0.5 + 0.5;
    let color = mix3(palette.color_a, palette.color_b, wave);
    mix3(color, palette.color_c, pulse * 0.3)
}

/// How fragment alpha is derived.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlphaMode {
    /// Constant [`BASE_ALPHA`].
    Constant,
    /// Fade out as the surface dips below its rest height.
    RestHeightFade,
}

impl AlphaMode {
    /// Alpha for a fragment whose local vertical displacement is `displacement`.
    pub fn alpha(&self, displacement: f32) -> f32 {
        match self {
            AlphaMode::Constant => BASE_ALPHA,
            AlphaMode::RestHeightFade => smoothstep(0.0, 0.1, displacement + 0.5) * BASE_ALPHA,
        }
    }

    /// Flag value read by the fragment shader.
    pub fn shader_flag(&self) -> u32 {
        match self {
            AlphaMode::Constant => 0,
            AlphaMode::RestHeightFade => 1,
        }
    }
}
