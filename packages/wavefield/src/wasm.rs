use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

use crate::controls::{ControlAction, ControlId, ControlOutcome};
use crate::gpu::renderer::{surface_needs_reconfigure, Renderer};
use crate::input::OrbitGesture;
use crate::page::{Page, RouteNavigator};
use crate::visualiser::{ActionOutcome, VisualiserState};

#[wasm_bindgen]
pub struct WasmWaveScene {
    inner: Rc<RefCell<SceneContext>>,
}

struct SceneContext {
    renderer: Renderer,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    state: VisualiserState,
}

#[wasm_bindgen]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

/// JSON content (copy, actions, cards) of the page at `route`.
#[wasm_bindgen]
pub fn get_page_json(route: &str) -> Result<String, JsValue> {
    let page: Page = route.parse().map_err(|e| JsValue::from_str(&format!("{}", e)))?;
    serde_json::to_string(&page.content()).map_err(|e| JsValue::from_str(&e.to_string()))
}

impl WasmWaveScene {
    fn control(&self, action: ControlAction) -> bool {
        let mut inner = self.inner.borrow_mut();
        !matches!(
            inner.state.apply_control(action),
            ControlOutcome::Unchanged | ControlOutcome::Rejected
        )
    }
}

#[wasm_bindgen]
impl WasmWaveScene {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WasmWaveScene, JsValue> {
        Err(JsValue::from_str("Use create_wave_scene async constructor"))
    }

    /// Returns false if the value was rejected or already set.
    pub fn set_amplitude(&self, value: f32) -> bool {
        self.control(ControlAction::Set(ControlId::Amplitude, value))
    }

    pub fn set_frequency(&self, value: f32) -> bool {
        self.control(ControlAction::Set(ControlId::Frequency, value))
    }

    pub fn set_speed(&self, value: f32) -> bool {
        self.control(ControlAction::Set(ControlId::Speed, value))
    }

    pub fn set_playing(&self, playing: bool) -> bool {
        self.control(ControlAction::SetPlaying(playing))
    }

    pub fn set_particles(&self, enabled: bool) -> bool {
        self.control(ControlAction::SetParticles(enabled))
    }

    pub fn reset(&self) {
        self.control(ControlAction::Reset);
    }

    /// Unmount the current page and mount the page at `route` from defaults.
    pub fn navigate(&self, route: &str) -> bool {
        match Page::from_path(route) {
            Some(page) => {
                self.inner.borrow_mut().state.navigate(page);
                true
            }
            None => {
                log::warn!("Unknown route '{}'", route);
                false
            }
        }
    }

    /// Press a page button by label. Navigation buttons remount the page.
    /// Returns false if the press changed nothing.
    pub fn trigger_action(&self, label: &str) -> bool {
        let mut inner = self.inner.borrow_mut();
        let mut navigator = RouteNavigator::new(inner.state.page());
        match inner.state.trigger_action(label, &mut navigator) {
            ActionOutcome::Control(outcome) => {
                !matches!(outcome, ControlOutcome::Unchanged | ControlOutcome::Rejected)
            }
            ActionOutcome::Navigated => {
                if navigator.current() != inner.state.page() {
                    inner.state.navigate(navigator.current());
                }
                true
            }
            ActionOutcome::Ignored => false,
        }
    }

    pub fn orbit_drag(&self, dx: f32, dy: f32) -> bool {
        self.inner
            .borrow_mut()
            .state
            .apply_gesture(OrbitGesture::Rotate { dx, dy })
    }

    pub fn orbit_pan(&self, dx: f32, dy: f32) -> bool {
        self.inner.borrow_mut().state.apply_gesture(OrbitGesture::Pan { dx, dy })
    }

    /// Positive `steps` zoom in.
    pub fn orbit_zoom(&self, steps: f32) -> bool {
        if !steps.is_finite() {
            return false;
        }
        self.inner.borrow_mut().state.apply_gesture(OrbitGesture::Zoom { steps })
    }

    pub fn resize(&self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        let mut inner = self.inner.borrow_mut();
        let ctx = &mut *inner;

        ctx.renderer.resize(width, height);
        ctx.state.set_viewport_height(height);
        ctx.config.width = width;
        ctx.config.height = height;

        ctx.surface.configure(ctx.renderer.device(), &ctx.config);
    }

    /// Advance to `elapsed_secs` on the host clock and draw a frame.
    pub fn render(&self, elapsed_secs: f64) {
        let mut inner = self.inner.borrow_mut();
        let ctx = &mut *inner;

        ctx.state.advance(elapsed_secs);

        match ctx.surface.get_current_texture() {
            Ok(output) => {
                let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
                ctx.renderer.render(&view, &ctx.state);
                output.present();
            }
            Err(e) if surface_needs_reconfigure(&e) => {
                ctx.renderer.resize(ctx.config.width, ctx.config.height);
                ctx.surface.configure(ctx.renderer.device(), &ctx.config);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Surface out of memory");
            }
            Err(e) => {
                log::warn!("Surface error: {:?}", e);
            }
        }
    }

    pub fn get_state_json(&self) -> String {
        let inner = self.inner.borrow();
        serde_json::to_string(&inner.state.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn get_scene_json(&self) -> String {
        let inner = self.inner.borrow();
        serde_json::to_string(inner.state.scene()).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn get_page_json(&self) -> String {
        let inner = self.inner.borrow();
        serde_json::to_string(&inner.state.page().content()).unwrap_or_else(|_| "{}".to_string())
    }
}

#[wasm_bindgen]
pub async fn create_wave_scene(
    canvas: HtmlCanvasElement,
    route: String,
) -> Result<WasmWaveScene, JsValue> {
    init_panic_hook();

    let page: Page = route.parse().map_err(|e| JsValue::from_str(&format!("{}", e)))?;

    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        dx12_shader_compiler: Default::default(),
        flags: wgpu::InstanceFlags::default(),
        gles_minor_version: wgpu::Gles3MinorVersion::Automatic,
    });

    let target = wgpu::SurfaceTarget::Canvas(canvas.clone());
    let surface = instance
        .create_surface(target)
        .map_err(|e| JsValue::from_str(&format!("Failed to create surface: {}", e)))?;

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::None,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        })
        .await
        .ok_or_else(|| JsValue::from_str("Failed to find an appropriate adapter"))?;

    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
            },
            None,
        )
        .await
        .map_err(|e| JsValue::from_str(&format!("Failed to create device: {}", e)))?;

    let surface_caps = surface.get_capabilities(&adapter);
    let surface_format = surface_caps
        .formats
        .iter()
        .copied()
        .find(|f: &wgpu::TextureFormat| f.is_srgb())
        .or_else(|| surface_caps.formats.first().copied())
        .ok_or_else(|| JsValue::from_str("Surface reports no formats"))?;

    // The page background shows through the transparent clear colour.
    let alpha_mode = if surface_caps
        .alpha_modes
        .contains(&wgpu::CompositeAlphaMode::PreMultiplied)
    {
        wgpu::CompositeAlphaMode::PreMultiplied
    } else {
        surface_caps.alpha_modes[0]
    };

    let config = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format: surface_format,
        width: canvas.width().max(1),
        height: canvas.height().max(1),
        present_mode: surface_caps.present_modes[0],
        alpha_mode,
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    };
    surface.configure(&device, &config);

    let renderer = Renderer::new(device, queue, config.format, config.width, config.height);

    let mut state = VisualiserState::new(page);
    state.set_viewport_height(config.height);

    log::info!("Wave scene created for {}", page.route());

    Ok(WasmWaveScene {
        inner: Rc::new(RefCell::new(SceneContext {
            renderer,
            surface,
            config,
            state,
        })),
    })
}
