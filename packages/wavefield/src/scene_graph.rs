//! Scene description for the wave pages.
//!
//! A [`SceneDescription`] is everything the renderer needs that does not
//! change every frame: camera, lights, the wave mesh, decorative particle
//! layers and orbit behaviour. It is rebuilt by [`compose_scene`] whenever the
//! page or the particle toggle changes. Per-frame values (shader time,
//! amplitude, frequency, camera pose) live in
//! [`VisualiserState`](crate::visualiser::VisualiserState).

use std::f32::consts::PI;

use serde::Serialize;

use crate::camera::{CameraConfig, OrbitSettings};
use crate::lighting::LightingConfig;
use crate::page::Page;
use crate::particle::{DotFieldConfig, FloatMotion, ParticleLayer, SparkleConfig};
use crate::visualiser::PlaybackState;
use crate::wave::{AlphaMode, Palette, WaveProfile, COLOR_A_HEX, COLOR_B_HEX};

/// Position, Euler rotation (XYZ, radians) and scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transform {
    pub position: [f32; 3],
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
        }
    }
}

impl Transform {
    pub fn from_position(position: [f32; 3]) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Model = Translation * Rotation * Scale
    pub fn to_matrix(&self) -> glam::Mat4 {
        let translation = glam::Mat4::from_translation(glam::Vec3::from(self.position));
        let rotation = glam::Mat4::from_euler(
            glam::EulerRot::XYZ,
            self.rotation[0],
            self.rotation[1],
            self.rotation[2],
        );
        let scale = glam::Mat4::from_scale(glam::Vec3::from(self.scale));
        translation * rotation * scale
    }
}

/// The displaced grid.
#[derive(Debug, Clone, Serialize)]
pub struct WaveMeshDescription {
    /// Edge length of the square grid in world units.
    pub size: f32,
    /// Subdivisions per edge.
    pub segments: u32,
    pub transform: Transform,
    pub profile: WaveProfile,
    pub alpha_mode: AlphaMode,
    pub palette: Palette,
    pub float_motion: Option<FloatMotion>,
}

impl WaveMeshDescription {
    /// Model matrix at elapsed time `t`, including any float motion.
    pub fn model_matrix(&self, t: f32) -> glam::Mat4 {
        let local = self.transform.to_matrix();
        match &self.float_motion {
            Some(motion) => motion.transform_at(t).to_matrix() * local,
            None => local,
        }
    }
}

/// Text drawn over the scene by the host page.
#[derive(Debug, Clone, Serialize)]
pub struct TitleOverlay {
    pub text: &'static str,
    pub position: [f32; 3],
}

#[derive(Debug, Clone, Serialize)]
pub struct SceneDescription {
    pub page: Page,
    pub camera: CameraConfig,
    pub orbit: OrbitSettings,
    pub lights: LightingConfig,
    pub wave: WaveMeshDescription,
    pub particles: Vec<ParticleLayer>,
    pub title: Option<TitleOverlay>,
    /// Opacity of the whole scene over the page background.
    pub opacity: f32,
    /// Linear RGBA the canvas is cleared to before drawing.
    pub clear_color: [f64; 4],
}

impl SceneDescription {
    pub fn particle_count(&self) -> usize {
        self.particles.iter().map(|layer| layer.count).sum()
    }
}

/// Build the scene for `page`.
pub fn compose_scene(page: Page, playback: &PlaybackState) -> SceneDescription {
    let scene = match page {
        Page::Landing => landing_scene(),
        Page::Explore => explore_scene(playback),
    };
    log::debug!(
        "Composed {:?} scene: {} particle layers, {} particles",
        page,
        scene.particles.len(),
        scene.particle_count()
    );
    scene
}

fn explore_scene(playback: &PlaybackState) -> SceneDescription {
    let mut particles = Vec::new();
    if playback.particles_enabled {
        let sparkles = SparkleConfig {
            count: 100,
            scale: [15.0, 5.0, 15.0],
            size: 3.0,
            speed: 0.6,
            color: COLOR_B_HEX,
            opacity: 1.0,
            seed: 0x5EED_0001,
        };
        particles.push(sparkles.build(
            "sparkles",
            Some(FloatMotion {
                speed: 1.0,
                rotation_intensity: 0.2,
                float_intensity: 0.5,
            }),
        ));
    }

    SceneDescription {
        page: Page::Explore,
        camera: CameraConfig::default(),
        orbit: OrbitSettings {
            enable_pan: true,
            enable_zoom: true,
            min_polar_angle: PI / 6.0,
            max_polar_angle: PI / 1.8,
            ..OrbitSettings::default()
        },
        lights: LightingConfig::explore(),
        wave: WaveMeshDescription {
            size: 15.0,
            segments: 100,
            transform: Transform::from_position([0.0, -1.0, 0.0]),
            profile: WaveProfile::Parametric,
            alpha_mode: AlphaMode::Constant,
            palette: Palette::default(),
            float_motion: None,
        },
        particles,
        title: Some(TitleOverlay {
            text: "Wave Explorer",
            position: [0.0, 4.0, 0.0],
        }),
        opacity: 1.0,
        clear_color: [0.0, 0.0, 0.0, 0.0],
    }
}

fn landing_scene() -> SceneDescription {
    let dots = DotFieldConfig {
        count: 300,
        half_extent: 10.0,
        height_range: [-2.0, 8.0],
        size: 0.05,
        color: COLOR_A_HEX,
        opacity: 0.6,
        spin_rate: 0.05,
        seed: 0x5EED_0002,
    };
    let sparkles = SparkleConfig {
        count: 50,
        scale: [20.0, 10.0, 20.0],
        size: 2.0,
        speed: 0.4,
        color: COLOR_B_HEX,
        opacity: 1.0,
        seed: 0x5EED_0003,
    };

    SceneDescription {
        page: Page::Landing,
        camera: CameraConfig::default(),
        orbit: OrbitSettings {
            enable_pan: false,
            enable_zoom: false,
            min_polar_angle: PI / 3.0,
            max_polar_angle: PI / 2.2,
            auto_rotate: true,
            auto_rotate_speed: 0.5,
            ..OrbitSettings::default()
        },
        lights: LightingConfig::landing(),
        wave: WaveMeshDescription {
            size: 20.0,
            segments: 50,
            transform: Transform::from_position([0.0, -2.0, 0.0]),
            profile: WaveProfile::Landing,
            alpha_mode: AlphaMode::RestHeightFade,
            palette: Palette::default(),
            float_motion: Some(FloatMotion {
                speed: 1.5,
                rotation_intensity: 0.5,
                float_intensity: 0.3,
            }),
        },
        particles: vec![dots.build("floating_points"), sparkles.build("sparkles", None)],
        title: None,
        opacity: 0.4,
        clear_color: [0.0, 0.0, 0.0, 0.0],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explore_scene_layout() {
        let scene = compose_scene(Page::Explore, &PlaybackState::default());
        assert_eq!(scene.wave.size, 15.0);
        assert_eq!(scene.wave.segments, 100);
        assert_eq!(scene.wave.transform.position, [0.0, -1.0, 0.0]);
        assert_eq!(scene.wave.profile, WaveProfile::Parametric);
        assert_eq!(scene.wave.alpha_mode, AlphaMode::Constant);
        assert_eq!(scene.particle_count(), 100);
        assert_eq!(scene.lights.points.len(), 3);
        assert!(scene.orbit.enable_pan && scene.orbit.enable_zoom);
        assert!(!scene.orbit.auto_rotate);
        assert_eq!(scene.title.as_ref().map(|t| t.text), Some("Wave Explorer"));
    }

    #[test]
    fn test_particles_toggle_removes_layers() {
        let playback = PlaybackState {
            is_playing: true,
            particles_enabled: false,
        };
        let scene = compose_scene(Page::Explore, &playback);
        assert!(scene.particles.is_empty());
        assert_eq!(scene.particle_count(), 0);
    }

    #[test]
    fn test_landing_scene_layout() {
        let scene = compose_scene(Page::Landing, &PlaybackState::default());
        assert_eq!(scene.wave.size, 20.0);
        assert_eq!(scene.wave.segments, 50);
        assert_eq!(scene.wave.profile, WaveProfile::Landing);
        assert_eq!(scene.wave.alpha_mode, AlphaMode::RestHeightFade);
        assert!(scene.wave.float_motion.is_some());
        assert_eq!(scene.particle_count(), 350);
        assert_eq!(scene.opacity, 0.4);
        assert!(!scene.orbit.enable_pan && !scene.orbit.enable_zoom);
        assert!(scene.orbit.auto_rotate);
        assert!(scene.title.is_none());
    }

    #[test]
    fn test_landing_ignores_particle_toggle() {
        let playback = PlaybackState {
            is_playing: false,
            particles_enabled: false,
        };
        assert_eq!(compose_scene(Page::Landing, &playback).particle_count(), 350);
    }

    #[test]
    fn test_composition_is_reproducible() {
        let a = compose_scene(Page::Landing, &PlaybackState::default());
        let b = compose_scene(Page::Landing, &PlaybackState::default());
        for (la, lb) in a.particles.iter().zip(&b.particles) {
            assert_eq!(la.positions, lb.positions);
        }
    }

    #[test]
    fn test_transform_matrix_translation() {
        let transform = Transform::from_position([1.0, -2.0, 3.0]);
        let p = transform.to_matrix().transform_point3(glam::Vec3::ZERO);
        assert!((p - glam::Vec3::new(1.0, -2.0, 3.0)).length() < 1e-6);
    }

    #[test]
    fn test_description_serializes() {
        let scene = compose_scene(Page::Explore, &PlaybackState::default());
        let json = serde_json::to_value(&scene).unwrap();
        assert_eq!(json["page"], "explore");
        assert_eq!(json["wave"]["segments"], 100);
        assert!(json["particles"][0].get("positions").is_none());
    }
}
