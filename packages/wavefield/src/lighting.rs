//! Scene lights.
//!
//! The wave material is unlit, so lights are carried only as part of the
//! scene description, for hosts that draw lit decoration on top.

use serde::Serialize;

use crate::wave::{COLOR_A_HEX, COLOR_B_HEX, COLOR_C_HEX};

/// A point light at a fixed position.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PointLight {
    pub position: [f32; 3],
    pub intensity: f32,
    pub color: &'static str,
}

/// Ambient term plus point lights.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LightingConfig {
    /// Ambient light intensity (adds to all surfaces equally).
    pub ambient: f32,
    pub points: Vec<PointLight>,
}

impl LightingConfig {
    /// Lights of the landing background.
    pub fn landing() -> Self {
        Self {
            ambient: 0.4,
            points: vec![
                PointLight {
                    position: [10.0, 10.0, 10.0],
                    intensity: 1.0,
                    color: COLOR_A_HEX,
                },
                PointLight {
                    position: [-10.0, -10.0, -10.0],
                    intensity: 0.5,
                    color: COLOR_C_HEX,
                },
            ],
        }
    }

    /// Landing lights plus an overhead cyan light.
    pub fn explore() -> Self {
        let mut config = Self::landing();
        config.points.push(PointLight {
            position: [0.0, 10.0, 0.0],
            intensity: 0.8,
            color: COLOR_B_HEX,
        });
        config
    }
}
