mod demo;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn, LevelFilter};
use rawdraw_core::error::DeviceError;
use rawdraw_core::input::keys::KEY_ESC;
use rawdraw_core::input::{InputHub, InputQuery, TouchDevice};
use rawdraw_core::logging::{LogConfig, LogLevel};
use rawdraw_core::renderer::{HeadlessRenderer, Renderer};
use rawdraw_core::{EngineConfig, EngineOptions, FrameBuffer, RenderEngine};

use crate::demo::DemoScene;

/// Raw extent assumed for touch devices given only on the command line.
const DEFAULT_TOUCH_EXTENT: i32 = 4095;
const HEADLESS_FRAMES: u64 = 60;

#[derive(Parser)]
#[command(name = "rawdraw", about = "Draw straight to a Linux framebuffer")]
struct Args {
    /// JSON config file (see --write-config)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Framebuffer device, e.g. /dev/fb0
    #[arg(long)]
    framebuffer: Option<PathBuf>,

    /// Keyboard event device, e.g. /dev/input/event0
    #[arg(long)]
    keyboard: Option<PathBuf>,

    /// Mouse event device
    #[arg(long)]
    mouse: Option<PathBuf>,

    /// Touchscreen event device
    #[arg(long)]
    touch: Option<PathBuf>,

    /// Stop after this many frames (headless runs default to 60)
    #[arg(long)]
    frames: Option<u64>,

    /// Render into memory instead of the framebuffer
    #[arg(long, default_value_t = false)]
    headless: bool,

    /// Core log level: off, error, warn, info, debug, trace
    #[arg(long, default_value = "off")]
    log_level: String,

    /// Send core logs to this file instead of the console
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Write the effective config to this path and exit
    #[arg(long)]
    write_config: Option<PathBuf>,
}

fn level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Off => LevelFilter::Off,
        LogLevel::Error => LevelFilter::Error,
        LogLevel::Warn => LevelFilter::Warn,
        LogLevel::Info => LevelFilter::Info,
        LogLevel::Debug => LevelFilter::Debug,
        LogLevel::Trace => LevelFilter::Trace,
    }
}

/// Hides the console caret for its lifetime.
struct CaretGuard;

impl CaretGuard {
    fn hide() -> Self {
        print!("\x1b[?25l");
        let _ = std::io::stdout().flush();
        CaretGuard
    }
}

impl Drop for CaretGuard {
    fn drop(&mut self) {
        print!("\x1b[?25h");
        let _ = std::io::stdout().flush();
    }
}

fn effective_config(args: &Args) -> Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    if let Some(path) = &args.framebuffer {
        config.framebuffer = path.clone();
    }
    if let Some(path) = &args.keyboard {
        config.input.keyboard = Some(path.clone());
    }
    if let Some(path) = &args.mouse {
        config.input.mouse = Some(path.clone());
    }
    if let Some(path) = &args.touch {
        let (max_x, max_y) = config
            .input
            .touch
            .as_ref()
            .map(|touch| (touch.max_x, touch.max_y))
            .unwrap_or((DEFAULT_TOUCH_EXTENT, DEFAULT_TOUCH_EXTENT));
        config.input.touch = Some(TouchDevice {
            path: path.clone(),
            max_x,
            max_y,
        });
    }

    Ok(config)
}

/// Drive the demo scene until ESC is held or `limit` frames have been shown.
fn run<R: Renderer>(
    renderer: R,
    input: InputHub,
    options: EngineOptions,
    limit: Option<u64>,
) -> Result<u64> {
    let mut engine = RenderEngine::new(renderer, input, options);
    let mut scene = DemoScene::new(engine.renderer().width(), engine.renderer().height());

    loop {
        if engine.input().is_key_down(KEY_ESC) {
            info!("escape pressed, exiting");
            break;
        }
        if limit.is_some_and(|limit| engine.frames() >= limit) {
            break;
        }
        engine
            .update(&mut scene)
            .context("failed to present frame")?;
    }

    let frames = engine.frames();
    let (_, mut input) = engine.into_parts();
    input.shutdown();
    Ok(frames)
}

fn start(args: Args) -> Result<()> {
    let level = LogLevel::from_str(&args.log_level)
        .with_context(|| format!("unknown log level '{}'", args.log_level))?;
    let log_config = LogConfig::global();
    log_config.set_global_level(level);
    if let Some(path) = &args.log_file {
        log_config
            .set_log_file(path.clone())
            .with_context(|| format!("opening log file {}", path.display()))?;
    }

    let config = effective_config(&args)?;

    if let Some(path) = &args.write_config {
        config
            .save(path)
            .with_context(|| format!("writing config {}", path.display()))?;
        info!("wrote config to {}", path.display());
        return Ok(());
    }

    let input = InputHub::open(&config.input).context("opening input devices")?;

    if args.headless {
        let format = config.display.pixel_format()?;
        let renderer = HeadlessRenderer::new(
            config.display.width as i32,
            config.display.height as i32,
            format,
        );
        let limit = args.frames.unwrap_or(HEADLESS_FRAMES);
        let frames = run(renderer, input, config.options, Some(limit))?;
        println!(
            "Rendered {} headless frame(s) at {}x{}",
            frames, config.display.width, config.display.height
        );
        return Ok(());
    }

    if config.input.keyboard.is_none() {
        if args.frames.is_none() {
            anyhow::bail!("no keyboard configured; pass --keyboard /dev/input/eventN or --frames N");
        }
        warn!("no keyboard configured; ESC will not stop the demo");
    }

    let framebuffer = FrameBuffer::open(&config.framebuffer, config.display.clone())
        .context("opening framebuffer")?;

    let _caret = config.options.hide_console_caret.then(CaretGuard::hide);
    let frames = run(framebuffer, input, config.options, args.frames)?;
    info!("rendered {} frame(s)", frames);
    Ok(())
}

fn main() {
    let args = Args::parse();

    let filter = LogLevel::from_str(&args.log_level)
        .map(level_filter)
        .unwrap_or(LevelFilter::Warn);
    env_logger::Builder::new()
        .filter_level(filter.max(LevelFilter::Warn))
        .parse_default_env()
        .init();

    if let Err(err) = start(args) {
        eprintln!("Error: {:#}", err);
        let hint = err
            .chain()
            .find_map(|cause| cause.downcast_ref::<DeviceError>())
            .and_then(DeviceError::hint);
        if let Some(hint) = hint {
            eprintln!("Hint: {}", hint);
        }
        std::process::exit(1);
    }
}
