//! Native interactive window.
//!
//! One winit event loop drives input, the per-frame tick and rendering on the
//! same thread.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::EventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowBuilder};

use crate::config::ViewerConfig;
use crate::gpu::renderer::{request_device, surface_needs_reconfigure, Renderer};
use crate::input::{Command, PointerButton, PointerTracker, ShortcutKey};
use crate::page::{Navigator, Page, RouteNavigator};
use crate::visualiser::VisualiserState;

/// Pixels per wheel "line" when the platform reports pixel deltas.
const PIXELS_PER_LINE: f32 = 40.0;

fn shortcut_for(code: KeyCode) -> Option<ShortcutKey> {
    Some(match code {
        KeyCode::Space => ShortcutKey::Space,
        KeyCode::KeyP => ShortcutKey::P,
        KeyCode::KeyR => ShortcutKey::R,
        KeyCode::KeyQ => ShortcutKey::Q,
        KeyCode::KeyA => ShortcutKey::A,
        KeyCode::KeyW => ShortcutKey::W,
        KeyCode::KeyS => ShortcutKey::S,
        KeyCode::KeyE => ShortcutKey::E,
        KeyCode::KeyD => ShortcutKey::D,
        KeyCode::Enter => ShortcutKey::Enter,
        KeyCode::Escape => ShortcutKey::Escape,
        KeyCode::Backspace => ShortcutKey::Backspace,
        _ => return None,
    })
}

fn window_title(page: Page) -> String {
    format!("{} - {}", page.content().heading, page.route())
}

/// Route a shortcut to the state or the navigator. Navigation remounts the page.
fn dispatch(command: Command, state: &mut VisualiserState, navigator: &mut RouteNavigator, window: &Window) {
    match command {
        Command::Control(action) => {
            let outcome = state.apply_control(action);
            log::debug!("{:?} -> {:?}", action, outcome);
        }
        Command::Navigate(page) => {
            navigator.navigate(page.route());
            if navigator.current() != state.page() {
                state.navigate(navigator.current());
                window.set_title(&window_title(state.page()));
            }
        }
    }
}

pub fn run_window(config: ViewerConfig) -> Result<()> {
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(window_title(config.page))
            .with_inner_size(PhysicalSize::new(config.width, config.height))
            .build(&event_loop)
            .context("Failed to create window")?,
    );

    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
    let surface = instance
        .create_surface(window.clone())
        .context("Failed to create surface")?;
    let (adapter, device, queue) = pollster::block_on(request_device(&instance, Some(&surface)))?;

    let size = window.inner_size();
    let surface_caps = surface.get_capabilities(&adapter);
    let surface_format = surface_caps
        .formats
        .iter()
        .copied()
        .find(|f| f.is_srgb())
        .or_else(|| surface_caps.formats.first().copied())
        .context("Surface reports no formats")?;
    let mut surface_config = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format: surface_format,
        width: size.width.max(1),
        height: size.height.max(1),
        present_mode: wgpu::PresentMode::AutoVsync,
        alpha_mode: surface_caps.alpha_modes[0],
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    };
    surface.configure(&device, &surface_config);

    let mut renderer = Renderer::new(device, queue, surface_format, surface_config.width, surface_config.height);
    let mut state = config.build_state();
    state.set_viewport_height(surface_config.height);
    let mut navigator = RouteNavigator::new(state.page());
    let mut pointer = PointerTracker::new();
    let start = Instant::now();

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, window_id } if window_id == window.id() => match event {
            WindowEvent::CloseRequested => elwt.exit(),
            WindowEvent::Resized(new_size) => {
                if new_size.width > 0 && new_size.height > 0 {
                    surface_config.width = new_size.width;
                    surface_config.height = new_size.height;
                    surface.configure(renderer.device(), &surface_config);
                    renderer.resize(new_size.width, new_size.height);
                    state.set_viewport_height(new_size.height);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed {
                    return;
                }
                let PhysicalKey::Code(code) = event.physical_key else {
                    return;
                };
                // Held keys repeat nudges but not toggles.
                if let Some(key) = shortcut_for(code) {
                    let command = key.command();
                    let repeatable = matches!(
                        command,
                        Command::Control(crate::controls::ControlAction::Nudge(..))
                    );
                    if !event.repeat || repeatable {
                        dispatch(command, &mut state, &mut navigator, &window);
                    }
                }
            }
            WindowEvent::MouseInput { state: button_state, button, .. } => {
                let button = match button {
                    MouseButton::Left => PointerButton::Primary,
                    MouseButton::Right => PointerButton::Secondary,
                    _ => return,
                };
                match button_state {
                    ElementState::Pressed => pointer.press(button),
                    ElementState::Released => pointer.release(button),
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(gesture) = pointer.move_to(position.x as f32, position.y as f32) {
                    state.apply_gesture(gesture);
                }
            }
            WindowEvent::CursorLeft { .. } => pointer.leave(),
            WindowEvent::MouseWheel { delta, .. } => {
                // winit reports positive y for scrolling up; flip to DOM convention.
                let delta_y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -y,
                    MouseScrollDelta::PixelDelta(p) => -(p.y as f32) / PIXELS_PER_LINE,
                };
                if let Some(gesture) = pointer.wheel(delta_y) {
                    state.apply_gesture(gesture);
                }
            }
            WindowEvent::RedrawRequested => {
                state.advance(start.elapsed().as_secs_f64());
                match surface.get_current_texture() {
                    Ok(output) => {
                        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
                        renderer.render(&view, &state);
                        output.present();
                    }
                    Err(e) if surface_needs_reconfigure(&e) => {
                        surface.configure(renderer.device(), &surface_config);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Surface out of memory");
                        elwt.exit();
                    }
                    Err(e) => log::warn!("Surface error: {:?}", e),
                }
            }
            _ => {}
        },
        Event::AboutToWait => window.request_redraw(),
        _ => {}
    })?;

    Ok(())
}
