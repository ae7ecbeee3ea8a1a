pub mod camera;
pub mod config;
pub mod controls;
pub mod gpu;
pub mod input;
pub mod lighting;
pub mod page;
pub mod particle;
pub mod scene_graph;
pub mod visualiser;
pub mod wave;

#[cfg(not(target_arch = "wasm32"))]
pub mod cli;
#[cfg(not(target_arch = "wasm32"))]
pub mod window;

#[cfg(target_arch = "wasm32")]
pub mod wasm;
