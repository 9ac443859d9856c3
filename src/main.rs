//! Race HUD desktop binary.
//!
//! Fetches the bootstrap config, starts the camera and telemetry links and
//! runs the render loop into an `embedded-graphics-simulator` window (or no
//! window with `--headless`).
//!
//! # Controls
//!
//! | Input | Action |
//! |-------|--------|
//! | close window | quit |
//! | Ctrl-C | quit |
//!
//! # Startup Failure
//!
//! If the config cannot be fetched the links never start. With a window the
//! HUD keeps running, showing NO SIGNAL and `init failed` until closed;
//! headless runs exit with an error instead.

use anyhow::Context;
use clap::Parser;
use embedded_graphics::{pixelcolor::Rgb888, prelude::*};
use embedded_graphics_simulator::{OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window};
use log::{LevelFilter, error, info};
use race_hud::{
    bootstrap::{LinkEndpoints, fetch_config},
    camera::{CameraLink, http::HttpCameraSource},
    colors::BLACK,
    config::{BootstrapConfig, CONNECT_TIMEOUT, DEFAULT_FRAME_RATE, DEFAULT_SERVER, INSET_ORIGIN, MAIN_SIZE},
    render::{HeadlessPresenter, PresentOutcome, Presenter, RenderLoop},
    state::HudContext,
    surface::FrameBuffer,
    telemetry::{http::HttpEventSource, link::TelemetryLink},
};
use reqwest::Client;
use tokio::task::{JoinHandle, LocalSet};
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "race-hud", about = "Live motorsport HUD")]
struct Args {
    /// Overlay server base URL
    #[arg(long, default_value = DEFAULT_SERVER)]
    server: String,

    /// Frame clock rate in Hz
    #[arg(long, default_value_t = DEFAULT_FRAME_RATE, value_parser = clap::value_parser!(u32).range(1..=240))]
    fps: u32,

    /// Window pixel scale
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=4))]
    scale: u32,

    /// Run without a window
    #[arg(long)]
    headless: bool,
}

// =============================================================================
// Window Presenter
// =============================================================================

struct WindowPresenter {
    display: SimulatorDisplay<Rgb888>,
    window: Window,
}

impl WindowPresenter {
    fn new(scale: u32) -> Self {
        let mut display = SimulatorDisplay::new(MAIN_SIZE);
        display.clear(BLACK).ok();
        let output_settings = OutputSettingsBuilder::new().scale(scale).build();
        Self {
            display,
            window: Window::new("Race HUD", &output_settings),
        }
    }
}

impl Presenter for WindowPresenter {
    fn present(&mut self, main: &FrameBuffer, inset: &FrameBuffer) -> PresentOutcome {
        main.copy_to(&mut self.display, Point::zero()).ok();
        inset.copy_to(&mut self.display, INSET_ORIGIN).ok();
        self.window.update(&self.display);

        if self.window.events().any(|ev| matches!(ev, SimulatorEvent::Quit)) {
            PresentOutcome::Quit
        } else {
            PresentOutcome::Continue
        }
    }
}

// =============================================================================
// Startup
// =============================================================================

async fn bootstrap(client: &Client, server: &Url) -> anyhow::Result<(BootstrapConfig, LinkEndpoints)> {
    let config = fetch_config(client, server).await?;
    let endpoints = config.endpoints(server)?;
    Ok((config, endpoints))
}

fn start_links(ctx: &HudContext, client: &Client, endpoints: LinkEndpoints) -> Vec<JoinHandle<()>> {
    info!("camera: {}", endpoints.camera);
    info!("telemetry: {}", endpoints.telemetry);

    let camera = CameraLink::new(HttpCameraSource::new(client.clone()), endpoints.camera, ctx.clone());
    let telemetry = TelemetryLink::new(HttpEventSource::new(client.clone()), endpoints.telemetry, ctx.clone());
    vec![tokio::task::spawn_local(camera.run()), tokio::task::spawn_local(telemetry.run())]
}

async fn run<P: Presenter>(args: &Args, presenter: P) -> anyhow::Result<()> {
    let server = Url::parse(&args.server).with_context(|| format!("invalid --server '{}'", args.server))?;
    let client = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;
    let ctx = HudContext::new();

    let stop = ctx.stop.clone();
    tokio::task::spawn_local(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received");
            stop.stop();
        }
    });

    let mut render_loop = RenderLoop::new(ctx.clone(), presenter, args.fps);

    let links = match bootstrap(&client, &server).await {
        Ok((config, endpoints)) => {
            info!("bootstrap: source '{}', target {} fps", config.source, config.target_fps);
            ctx.state.borrow_mut().feed = Some(config);
            start_links(&ctx, &client, endpoints)
        }
        Err(e) if args.headless => return Err(e.context("bootstrap failed")),
        Err(e) => {
            error!("bootstrap failed: {e:#}");
            render_loop.renderer_mut().fail_init();
            Vec::new()
        }
    };

    let (renderer, _) = render_loop.run().await;
    info!("{} frames rendered, {}", renderer.metrics().total_frames, renderer.metrics().summary());

    for link in links {
        link.await?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    let local = LocalSet::new();

    if args.headless {
        local.block_on(&runtime, run(&args, HeadlessPresenter::new()))
    } else {
        local.block_on(&runtime, run(&args, WindowPresenter::new(args.scale)))
    }
}
