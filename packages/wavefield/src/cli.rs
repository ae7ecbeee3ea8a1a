use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::config::ViewerConfig;
use crate::gpu::renderer::{request_device, Renderer};
use crate::page::{Page, PageContent};
use crate::scene_graph::SceneDescription;
use crate::visualiser::StateSnapshot;
use crate::window;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open an interactive window
    Run {
        /// Starting page (landing, explore, or a route)
        #[arg(long)]
        page: Option<Page>,

        /// JSON viewer config
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Render frames to disk
    Render {
        /// Output directory for frames
        #[arg(long)]
        out: Option<PathBuf>,

        #[arg(long)]
        page: Option<Page>,

        /// Frames per second
        #[arg(long)]
        fps: Option<f32>,

        /// Duration in seconds
        #[arg(long)]
        duration: Option<f32>,

        /// Output width
        #[arg(long)]
        width: Option<u32>,

        /// Output height
        #[arg(long)]
        height: Option<u32>,

        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print page content, scene description and initial state as JSON
    Describe {
        #[arg(long)]
        page: Option<Page>,

        #[arg(long)]
        config: Option<PathBuf>,
    },
}

/// Everything `describe` prints.
#[derive(Serialize)]
pub struct Description<'a> {
    pub content: PageContent,
    pub scene: &'a SceneDescription,
    pub state: StateSnapshot,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { page, config } => {
            let mut config = ViewerConfig::load(config.as_deref())?;
            if let Some(page) = page {
                config.page = page;
            }
            window::run_window(config)?;
        }
        Commands::Render { out, page, fps, duration, width, height, config } => {
            let mut config = ViewerConfig::load(config.as_deref())?;
            if let Some(page) = page {
                config.page = page;
            }
            config.fps = fps.unwrap_or(config.fps);
            config.duration = duration.unwrap_or(config.duration);
            config.width = width.unwrap_or(config.width);
            config.height = height.unwrap_or(config.height);
            if out.is_some() {
                config.output_dir = out;
            }
            config.validate()?;
            let out_dir = config
                .output_dir
                .clone()
                .context("No output directory: pass --out or set outputDir in the config")?;
            pollster::block_on(render_offline(&config, &out_dir))?;
        }
        Commands::Describe { page, config } => {
            let mut config = ViewerConfig::load(config.as_deref())?;
            if let Some(page) = page {
                config.page = page;
            }
            println!("{}", describe(&config)?);
        }
    }
    Ok(())
}

/// JSON description of the configured page.
pub fn describe(config: &ViewerConfig) -> Result<String> {
    let state = config.build_state();
    let description = Description {
        content: state.page().content(),
        scene: state.scene(),
        state: state.snapshot(),
    };
    serde_json::to_string_pretty(&description).context("Failed to serialize description")
}

async fn render_offline(config: &ViewerConfig, out_dir: &Path) -> Result<()> {
    let (width, height) = (config.width, config.height);
    let total_frames = (config.duration * config.fps).ceil() as usize;
    let dt = 1.0 / config.fps as f64;

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;

    // WGPU Init
    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
    let (_adapter, device, queue) = request_device(&instance, None).await?; // Headless

    let texture_desc = wgpu::TextureDescriptor {
        label: Some("Target Texture"),
        size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    };

    let texture = device.create_texture(&texture_desc);
    let texture_view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    // Rows are padded to COPY_BYTES_PER_ROW_ALIGNMENT for readback
    let unpadded_bytes_per_row = 4 * width;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    let padded_bytes_per_row = unpadded_bytes_per_row.div_ceil(align) * align;

    let output_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Output Buffer"),
        size: (padded_bytes_per_row * height) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut renderer = Renderer::new(device, queue, texture_desc.format, width, height);
    let mut state = config.build_state();
    state.set_viewport_height(height);

    log::info!(
        "Rendering {} frames of the {} page to {}",
        total_frames,
        state.page(),
        out_dir.display()
    );

    for i in 0..total_frames {
        state.advance(i as f64 * dt);
        renderer.render(&texture_view, &state);

        let mut encoder = renderer
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &output_buffer,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            texture_desc.size,
        );
        renderer.queue().submit(Some(encoder.finish()));

        let frame = read_frame(&renderer, &output_buffer, width, height, padded_bytes_per_row)?;
        let frame_path = out_dir.join(format!("frame_{:05}.png", i));
        image::save_buffer(&frame_path, &frame, width, height, image::ColorType::Rgba8)
            .with_context(|| format!("Failed to write {}", frame_path.display()))?;

        if i % 60 == 0 {
            print!(".");
            std::io::stdout().flush()?;
        }
    }
    println!();
    log::info!("Rendered {} frames", total_frames);

    Ok(())
}

/// Map the readback buffer and strip row padding.
fn read_frame(
    renderer: &Renderer,
    buffer: &wgpu::Buffer,
    width: u32,
    height: u32,
    padded_bytes_per_row: u32,
) -> Result<Vec<u8>> {
    let buffer_slice = buffer.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    buffer_slice.map_async(wgpu::MapMode::Read, move |v| {
        let _ = tx.send(v);
    });
    renderer.device().poll(wgpu::Maintain::Wait);
    rx.recv().context("Readback channel closed")??;

    let data = buffer_slice.get_mapped_range();
    let row_bytes = (width * 4) as usize;
    let mut unpadded = Vec::with_capacity(row_bytes * height as usize);
    for row in 0..height as usize {
        let start = row * padded_bytes_per_row as usize;
        unpadded.extend_from_slice(&data[start..start + row_bytes]);
    }
    drop(data);
    buffer.unmap();
    Ok(unpadded)
}
