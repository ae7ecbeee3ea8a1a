//! Decorative particles.
//!
//! Two kinds of point-sprite decoration, neither with any physics:
//! - **Sparkles**: glowing sprites scattered in a box, jittering on small
//!   circles over time.
//! - **Dots**: small hard-edged points scattered once and spun slowly about Y.
//!
//! Positions come from a seeded xorshift generator so a scene is reproducible.
//! Layers can sit inside a [`FloatMotion`] group that bobs and sways gently.

use serde::Serialize;

use crate::scene_graph::Transform;
use crate::wave::hex_color;

/// Pixel-size multiplier of sparkle sprites (sprite px = size · 25 / depth).
pub const SPARKLE_PIXEL_SCALE: f32 = 25.0;

/// How a layer's sprites are drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpriteStyle {
    /// Soft radial glow; size is in screen-space units.
    Sparkle,
    /// Hard round dot; size is in world units.
    Dot,
}

/// Gentle bob-and-sway applied to a group of objects.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct FloatMotion {
    pub speed: f32,
    pub rotation_intensity: f32,
    pub float_intensity: f32,
}

impl FloatMotion {
    /// Group transform at elapsed time `t` seconds.
    pub fn transform_at(&self, t: f32) -> Transform {
        let phase = t / 4.0 * self.speed;
        let mut transform = Transform::default();
        transform.rotation = [
            phase.cos() / 8.0 * self.rotation_intensity,
            phase.sin() / 8.0 * self.rotation_intensity,
            phase.sin() / 20.0 * self.rotation_intensity,
        ];
        transform.position[1] = phase.sin() / 10.0 * self.float_intensity;
        transform
    }
}

/// A box-scattered sparkle field.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SparkleConfig {
    pub count: usize,
    /// Full extent of the scatter box; positions lie within ±scale/2.
    pub scale: [f32; 3],
    pub size: f32,
    pub speed: f32,
    pub color: &'static str,
    pub opacity: f32,
    pub seed: u64,
}

/// Slowly spinning dots.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DotFieldConfig {
    pub count: usize,
    /// Horizontal half-extent; x and z lie within ±half_extent.
    pub half_extent: f32,
    /// Vertical range [min, max).
    pub height_range: [f32; 2],
    pub size: f32,
    pub color: &'static str,
    pub opacity: f32,
    /// Spin about Y in radians per second.
    pub spin_rate: f32,
    pub seed: u64,
}

/// A ready-to-draw set of sprites.
#[derive(Clone, Debug, Serialize)]
pub struct ParticleLayer {
    pub name: &'static str,
    pub style: SpriteStyle,
    pub count: usize,
    #[serde(skip)]
    pub positions: Vec<[f32; 3]>,
    pub size: f32,
    pub color: [f32; 3],
    pub opacity: f32,
    /// Jitter phase speed; zero disables jitter.
    pub speed: f32,
    /// Jitter radius in world units.
    pub jitter: f32,
    /// Spin about Y in radians per second of elapsed time.
    pub spin_rate: f32,
    pub float_motion: Option<FloatMotion>,
}

impl ParticleLayer {
    /// Model transform of the layer at elapsed time `t` seconds.
    pub fn model_matrix(&self, t: f32) -> glam::Mat4 {
        let spin = glam::Mat4::from_rotation_y(t * self.spin_rate);
        match &self.float_motion {
            Some(motion) => motion.transform_at(t).to_matrix() * spin,
            None => spin,
        }
    }

    /// Sprite edge length in world units for a camera with vertical field of
    /// view `fov_degrees` drawing into a viewport `viewport_height` pixels tall.
    ///
    /// Sparkle sprites have a constant on-screen size (`size · 25 / depth`
    /// pixels), which is a depth-independent world size. Dots are sized in
    /// world units scaled by the view frustum.
    pub fn sprite_world_size(&self, fov_degrees: f32, viewport_height: f32) -> f32 {
        let half_tan = (fov_degrees.to_radians() * 0.5).tan();
        match self.style {
            SpriteStyle::Sparkle => {
                self.size * SPARKLE_PIXEL_SCALE * 2.0 * half_tan / viewport_height.max(1.0)
            }
            SpriteStyle::Dot => self.size * half_tan,
        }
    }
}

impl SparkleConfig {
    pub fn build(&self, name: &'static str, float_motion: Option<FloatMotion>) -> ParticleLayer {
        let mut rng = Xorshift::new(self.seed);
        let positions = (0..self.count)
            .map(|_| {
                [
                    rng.spread(self.scale[0]),
                    rng.spread(self.scale[1]),
                    rng.spread(self.scale[2]),
                ]
            })
            .collect();
        ParticleLayer {
            name,
            style: SpriteStyle::Sparkle,
            count: self.count,
            positions,
            size: self.size,
            color: hex_color(self.color).unwrap_or([1.0, 1.0, 1.0]),
            opacity: self.opacity,
            speed: self.speed,
            jitter: 0.2,
            spin_rate: 0.0,
            float_motion,
        }
    }
}

impl DotFieldConfig {
    pub fn build(&self, name: &'static str) -> ParticleLayer {
        let mut rng = Xorshift::new(self.seed);
        let [low, high] = self.height_range;
        let positions = (0..self.count)
            .map(|_| {
                [
                    rng.spread(self.half_extent * 2.0),
                    low + rng.next_f32() * (high - low),
                    rng.spread(self.half_extent * 2.0),
                ]
            })
            .collect();
        ParticleLayer {
            name,
            style: SpriteStyle::Dot,
            count: self.count,
            positions,
            size: self.size,
            color: hex_color(self.color).unwrap_or([1.0, 1.0, 1.0]),
            opacity: self.opacity,
            speed: 0.0,
            jitter: 0.0,
            spin_rate: self.spin_rate,
            float_motion: None,
        }
    }
}

/// Deterministic xorshift64 generator.
struct Xorshift {
    state: u64,
}

impl Xorshift {
    fn new(seed: u64) -> Self {
        // Seed 0 is degenerate (produces all zeros).
        let state = if seed == 0 { 0x5DEECE66D } else { seed };
        Self { state }
    }

    /// Uniform in [0, 1).
    fn next_f32(&mut self) -> f32 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        // Top 24 bits give an exact f32 mantissa.
        (self.state >> 40) as f32 / (1u64 << 24) as f32
    }

    /// Uniform in [-range/2, range/2).
    fn spread(&mut self, range: f32) -> f32 {
        (self.next_f32() - 0.5) * range
    }
}
