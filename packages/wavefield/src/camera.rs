//! Perspective camera and orbit controls.
//!
//! The camera always looks at a target point. [`OrbitController`] keeps the
//! eye on a sphere around that target (radius, polar angle from +Y, azimuth
//! around Y from +Z) and turns pointer gestures into changes of those three
//! values. Polar limits, zoom, pan and auto-rotation are per-page settings.

use std::f32::consts::{PI, TAU};

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use serde::Serialize;

/// Keeps the polar angle away from the poles, where look-at degenerates.
const POLAR_EPSILON: f32 = 1e-6;

/// Dolly factor per zoom step.
const ZOOM_SCALE: f32 = 0.95;

// ============================================================================
// Camera description
// ============================================================================

/// Static camera settings of a page.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub target: [f32; 3],
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 5.0, 8.0],
            target: [0.0, 0.0, 0.0],
            fov: 60.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

// ============================================================================
// Camera Uniforms (evaluated values)
// ============================================================================

/// Evaluated camera parameters.
///
/// Sent to the renderer for view/projection matrix computation.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct CameraUniforms {
    /// Camera position in world space (vec4, w unused).
    pub position: [f32; 4],

    /// Look-at target position (vec4, w unused).
    pub target: [f32; 4],

    /// Up vector (vec4, w unused).
    pub up: [f32; 4],

    /// Field of view in degrees.
    pub fov: f32,

    /// Near clip plane distance.
    pub near: f32,

    /// Far clip plane distance.
    pub far: f32,

    pub _padding: f32,
}

impl CameraUniforms {
    pub fn position_vec3(&self) -> Vec3 {
        Vec3::new(self.position[0], self.position[1], self.position[2])
    }

    pub fn target_vec3(&self) -> Vec3 {
        Vec3::new(self.target[0], self.target[1], self.target[2])
    }

    pub fn up_vec3(&self) -> Vec3 {
        Vec3::new(self.up[0], self.up[1], self.up[2])
    }

    pub fn view_matrix(&self) -> glam::Mat4 {
        glam::Mat4::look_at_rh(self.position_vec3(), self.target_vec3(), self.up_vec3())
    }

    pub fn projection_matrix(&self, aspect: f32) -> glam::Mat4 {
        glam::Mat4::perspective_rh(self.fov.to_radians(), aspect, self.near, self.far)
    }

    pub fn view_projection_matrix(&self, aspect: f32) -> glam::Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    /// Normalized direction from position to target.
    pub fn forward(&self) -> Vec3 {
        (self.target_vec3() - self.position_vec3()).normalize()
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(self.up_vec3()).normalize()
    }

    /// The camera's actual up vector (may differ from world up).
    pub fn camera_up(&self) -> Vec3 {
        self.right().cross(self.forward())
    }
}

// ============================================================================
// Orbit controls
// ============================================================================

/// Per-page orbit behaviour.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct OrbitSettings {
    pub enable_pan: bool,
    pub enable_zoom: bool,
    /// Polar angle limits in radians, measured from +Y.
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    pub auto_rotate: bool,
    /// 1.0 is one revolution per minute.
    pub auto_rotate_speed: f32,
    pub rotate_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            enable_pan: true,
            enable_zoom: true,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            auto_rotate: false,
            auto_rotate_speed: 2.0,
            rotate_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
        }
    }
}

/// Camera orbiting a target point.
#[derive(Clone, Debug)]
pub struct OrbitController {
    settings: OrbitSettings,
    config: CameraConfig,
    target: Vec3,
    radius: f32,
    polar: f32,
    azimuth: f32,
}

impl OrbitController {
    pub fn new(config: CameraConfig, settings: OrbitSettings) -> Self {
        let target = Vec3::from(config.target);
        let offset = Vec3::from(config.position) - target;
        let radius = offset.length();
        let polar = if radius > 0.0 {
            (offset.y / radius).clamp(-1.0, 1.0).acos()
        } else {
            0.0
        };
        let azimuth = offset.x.atan2(offset.z);

        let mut controller = Self {
            settings,
            config,
            target,
            radius,
            polar,
            azimuth,
        };
        controller.constrain();
        controller
    }

    pub fn polar_angle(&self) -> f32 {
        self.polar
    }

    pub fn distance(&self) -> f32 {
        self.radius
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Eye position in world space.
    pub fn eye(&self) -> Vec3 {
        let sin_polar = self.polar.sin();
        self.target
            + Vec3::new(
                self.radius * sin_polar * self.azimuth.sin(),
                self.radius * self.polar.cos(),
                self.radius * sin_polar * self.azimuth.cos(),
            )
    }

    /// Rotate by a pointer drag of `(dx, dy)` pixels in a viewport `height` pixels tall.
    pub fn rotate(&mut self, dx: f32, dy: f32, height: f32) {
        if height <= 0.0 {
            return;
        }
        self.azimuth -= TAU * dx / height * self.settings.rotate_speed;
        self.polar -= TAU * dy / height * self.settings.rotate_speed;
        self.constrain();
    }

    /// Dolly toward the target. Positive `steps` zoom in. Returns false when zoom is disabled.
    pub fn zoom(&mut self, steps: f32) -> bool {
        if !self.settings.enable_zoom {
            return false;
        }
        self.radius *= ZOOM_SCALE.powf(steps);
        self.constrain();
        true
    }

    /// Slide the target in the view plane. Returns false when pan is disabled.
    pub fn pan(&mut self, dx: f32, dy: f32, height: f32) -> bool {
        if !self.settings.enable_pan || height <= 0.0 {
            return false;
        }
        let camera = self.uniforms();
        let world_per_pixel = 2.0 * self.radius * (self.config.fov.to_radians() * 0.5).tan() / height;
        let shift = -camera.right() * dx * world_per_pixel + camera.camera_up() * dy * world_per_pixel;
        self.target += shift;
        true
    }

    /// Per-frame update: auto-rotation and constraints.
    pub fn update(&mut self, dt: f32) {
        if self.settings.auto_rotate && dt > 0.0 {
            self.azimuth -= TAU / 60.0 * self.settings.auto_rotate_speed * dt;
            self.azimuth = self.azimuth.rem_euclid(TAU);
        }
        self.constrain();
    }

    fn constrain(&mut self) {
        let min = self.settings.min_polar_angle.max(POLAR_EPSILON);
        let max = self.settings.max_polar_angle.min(PI - POLAR_EPSILON);
        self.polar = self.polar.clamp(min, max);
        self.radius = self
            .radius
            .clamp(self.settings.min_distance.max(POLAR_EPSILON), self.settings.max_distance);
    }

    pub fn uniforms(&self) -> CameraUniforms {
        let eye = self.eye();
        CameraUniforms {
            position: [eye.x, eye.y, eye.z, 1.0],
            target: [self.target.x, self.target.y, self.target.z, 1.0],
            up: [0.0, 1.0, 0.0, 0.0],
            fov: self.config.fov,
            near: self.config.near,
            far: self.config.far,
            _padding: 0.0,
        }
    }
}
