use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use glam::{Quat, Vec3};
use renderplan_assets::{PlanarMode, RenderTextureSettings, TextureStore};
use renderplan_common::{Rect, StereoMode, Transform};
use renderplan_kernel::{Camera, Scene};
use renderplan_render::{
    RenderPipeline, RendererKind, ScheduleConfig, TraceExecutor, TraceRasterizer, execute_frame,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "renderplan-cli", about = "CLI tool for renderplan frame schedules")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Build and print the frame schedule of a demo scene
    Plan {
        /// JSON schedule configuration
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Stereo mode, overrides the configuration
        #[arg(short, long)]
        stereo: Option<StereoArg>,
        /// Extra cameras with their own viewport
        #[arg(long, default_value = "0")]
        viewports: usize,
        /// Number of frames to schedule
        #[arg(short, long, default_value = "1")]
        frames: usize,
        /// Capture the mirror on request only
        #[arg(long)]
        manual_mirror: bool,
        /// Execute each frame and print the draw trace
        #[arg(short, long)]
        trace: bool,
    },
    /// Write the default configuration as JSON
    InitConfig {
        /// Output file
        path: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StereoArg {
    Mono,
    QuadBuffered,
    AboveBelow,
    SideBySide,
    TopBottom3dtv,
    Interlaced,
    VInterlace,
    Anaglyph,
}

impl From<StereoArg> for StereoMode {
    fn from(arg: StereoArg) -> Self {
        match arg {
            StereoArg::Mono => StereoMode::Mono,
            StereoArg::QuadBuffered => StereoMode::QuadBuffered,
            StereoArg::AboveBelow => StereoMode::AboveBelow,
            StereoArg::SideBySide => StereoMode::SideBySide,
            StereoArg::TopBottom3dtv => StereoMode::TopBottom3DTv,
            StereoArg::Interlaced => StereoMode::Interlaced,
            StereoArg::VInterlace => StereoMode::VInterlace,
            StereoArg::Anaglyph => StereoMode::Anaglyph,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("renderplan-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", renderplan_common::crate_info());
            println!("assets: {}", renderplan_assets::crate_info());
            println!("render: {}", renderplan_render::crate_info());
        }
        Commands::Plan {
            config,
            stereo,
            viewports,
            frames,
            manual_mirror,
            trace,
        } => {
            let mut config = match config {
                Some(path) => ScheduleConfig::load(&path)
                    .with_context(|| format!("loading {}", path.display()))?,
                None => ScheduleConfig::default(),
            };
            if let Some(stereo) = stereo {
                config.stereo_mode = stereo.into();
            }
            plan(config, viewports, frames, manual_mirror, trace)?;
        }
        Commands::InitConfig { path } => {
            ScheduleConfig::default()
                .save(&path)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
    }

    Ok(())
}

fn plan(
    config: ScheduleConfig,
    viewports: usize,
    frames: usize,
    manual_mirror: bool,
    trace: bool,
) -> anyhow::Result<()> {
    let mut scene = Scene::new("demo");
    scene.add_camera(
        "main",
        Transform::from_position(Vec3::new(0.0, 2.0, 10.0)),
        Camera::default(),
    );
    for i in 0..viewports {
        let size = 256;
        let left = i as i32 * size;
        scene.add_camera(
            format!("inset{i}"),
            Transform {
                position: Vec3::new(0.0, 12.0, 0.5 * i as f32),
                rotation: Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2),
                ..Transform::default()
            },
            Camera::default().with_viewport(Rect::new(left, 0, left + size, size)),
        );
    }
    let probe = scene.spawn("probe", Transform::from_position(Vec3::new(0.0, 1.0, 0.0)));
    let mirror = scene.spawn("mirror", Transform::from_position(Vec3::new(0.0, 0.0, -4.0)));

    let mut store = TextureStore::new();
    let env = store.register_source("env_probe", RenderTextureSettings::default());
    let water = store.register_source(
        "mirror_surface",
        RenderTextureSettings {
            auto_update: !manual_mirror,
            planar_mode: PlanarMode::Reflection,
            ..RenderTextureSettings::default()
        },
    );
    let env_slot = store.add_material_texture("chrome", env)?;
    let mirror_slot = store.add_material_texture("glass", water)?;

    let mut pipeline = RenderPipeline::new(config);
    pipeline.add_renderer(RendererKind::Cube, &scene, &mut store, env_slot, Some(probe))?;
    pipeline.add_renderer(
        RendererKind::Planar,
        &scene,
        &mut store,
        mirror_slot,
        Some(mirror),
    )?;

    let mut scenes = vec![scene];
    for frame in 0..frames {
        let schedule = pipeline.schedule_frame(&scenes);
        println!("--- frame {frame} ---");
        print!("{schedule}");

        let mut executor = TraceExecutor::new();
        let mut rasterizer = TraceRasterizer::default();
        execute_frame(schedule, &mut scenes, &pipeline, &mut rasterizer, &mut executor);
        tracing::info!(
            frame,
            draws = executor.lines().len(),
            state_changes = rasterizer.calls().len(),
            "frame executed"
        );
        if trace {
            print!("{}", executor.into_text());
        }
    }

    Ok(())
}
