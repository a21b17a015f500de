// Copyright (c) 2026 rezky_nightky

mod cell;
mod config;
mod frame;
mod palette;
mod scene;
mod terminal;

use std::env;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::thread;

use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};
use tracing_subscriber::EnvFilter;

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use heartfall::{ContentConfig, Engine, EngineConfig, Project, Variant};

use crate::config::{
    color_enabled_stdout, default_params_usage_for_help, print_list_themes, Args, ColorBg,
};
use crate::frame::Frame;
use crate::palette::{parse_theme, ColorMode, Theme};
use crate::scene::{viewport_for, Header, ImageCheck, Scene};
use crate::terminal::{restore_terminal_best_effort, Terminal};

const HELP_TEMPLATE_PLAIN: &str = "\
{before-help}{about-with-newline}
USAGE:
  {usage}

{all-args}{after-help}";

const HELP_TEMPLATE_COLOR: &str = "\
{before-help}{about-with-newline}
\x1b[1;36mUSAGE:\x1b[0m
  {usage}

{all-args}{after-help}";

const MAX_ITEMS_LIMIT: usize = 500;

fn clap_styles() -> ClapStyles {
    ClapStyles::styled()
        .header(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Magenta))),
        )
        .usage(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Green))),
        )
        .literal(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Yellow))))
        .placeholder(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Cyan))))
}

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("{}", msg);
    std::process::exit(1);
}

fn require_f64_range(name: &str, v: f64, min: f64, max: f64) -> f64 {
    if !v.is_finite() {
        fail(format_args!("failed to apply {} {} (must be a finite number)", name, v));
    }
    if v < min || v > max {
        fail(format_args!("failed to apply {} {} (min {} max {})", name, v, min, max));
    }
    v
}

fn require_usize_range(name: &str, v: usize, min: usize, max: usize) -> usize {
    if v < min || v > max {
        fail(format_args!("failed to apply {} {} (min {} max {})", name, v, min, max));
    }
    v
}

fn detect_color_mode_auto() -> ColorMode {
    let colorterm = env::var("COLORTERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorMode::TrueColor;
    }

    let term = env::var("TERM").unwrap_or_default().to_ascii_lowercase();
    if term == "dumb" {
        return ColorMode::Mono;
    }
    if term == "linux" {
        return ColorMode::Color16;
    }
    ColorMode::Color256
}

fn detect_color_mode(args: &Args) -> ColorMode {
    match args.colormode {
        None => detect_color_mode_auto(),
        Some(0) => ColorMode::Mono,
        Some(16) => ColorMode::Color16,
        Some(8 | 256) => ColorMode::Color256,
        Some(24 | 32) => ColorMode::TrueColor,
        Some(m) => fail(format_args!(
            "invalid --colormode: {} (allowed: 0,16,8/256,24/32)",
            m
        )),
    }
}

fn init_logging(log_file: Option<&Path>) -> std::io::Result<()> {
    match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)?;
            let filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("heartfall=debug"));
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => {
            let filter =
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"));
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn load_project(args: &Args) -> (Project, PathBuf) {
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let Some(path) = args.project.as_deref() else {
        return (Project::default(), cwd);
    };
    let project = Project::load(path).unwrap_or_else(|e| fail(e));
    let base = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or(cwd);
    (project, base)
}

fn content_for(args: &Args, project: &Project) -> ContentConfig {
    let mut content = project.content();
    if !args.messages.is_empty() {
        content.messages = args.messages.clone();
    }
    if !args.images.is_empty() {
        content.image_refs = args.images.clone();
    }
    if let Some(audio) = args.audio.as_deref() {
        content = content.with_audio(audio);
    }
    content
}

fn engine_config(args: &Args) -> EngineConfig {
    let spawn_ms = require_usize_range("--spawn-ms", args.spawn_ms as usize, 10, 10_000);
    let mut config = EngineConfig {
        spawn_interval: Duration::from_millis(spawn_ms as u64),
        max_live: require_usize_range("--max-items", args.max_items, 1, MAX_ITEMS_LIMIT),
        pool_capacity: require_usize_range("--pool", args.pool, 1, 10_000),
        ..EngineConfig::default()
    };
    config.prewarm = config.prewarm.min(config.pool_capacity);
    config.spawn.text_threshold = args.mix.text;
    config.spawn.heart_threshold = args.mix.heart;
    config.motion.damping = require_f64_range("--damping", args.damping as f64, 0.05, 1.0) as f32;
    config.motion.retirement_margin =
        require_f64_range("--margin", args.margin as f64, 0.0, 2000.0) as f32;
    config
}

#[derive(Default)]
struct PerfStats {
    frames: u64,
    drawn_frames: u64,
    work_sum_s: f64,
    work_max_s: f32,
    overshoot_frames: u64,
}

impl PerfStats {
    fn record(&mut self, did_draw: bool, work_s: f32, overshoot: bool) {
        self.frames = self.frames.saturating_add(1);
        if did_draw {
            self.drawn_frames = self.drawn_frames.saturating_add(1);
        }
        self.work_sum_s += work_s as f64;
        self.work_max_s = self.work_max_s.max(work_s);
        if overshoot {
            self.overshoot_frames = self.overshoot_frames.saturating_add(1);
        }
    }

    fn print(&self, elapsed: Duration, target_fps: f64, engine: &heartfall::EngineStats) {
        let elapsed_s = elapsed.as_secs_f64().max(0.000_001);
        let frames = self.frames.max(1) as f64;

        println!("PERF STATS:");
        println!("  elapsed_s: {:.3}", elapsed_s);
        println!("  target_fps: {:.3}", target_fps);
        println!("  avg_fps: {:.3}", self.frames as f64 / elapsed_s);
        println!("  frames: {}", self.frames);
        println!(
            "  drawn_frames: {} ({:.1}%)",
            self.drawn_frames,
            self.drawn_frames as f64 / frames * 100.0
        );
        println!("  avg_work_ms: {:.3}", self.work_sum_s / frames * 1000.0);
        println!("  max_work_ms: {:.3}", self.work_max_s as f64 * 1000.0);
        println!(
            "  overshoot_frames: {} ({:.1}%)",
            self.overshoot_frames,
            self.overshoot_frames as f64 / frames * 100.0
        );
        println!("ENGINE STATS:");
        println!("  live: {}", engine.live);
        println!("  reserve: {}", engine.reserve);
        println!("  records_created: {}", engine.created);
        println!("  records_dropped: {}", engine.dropped);
        println!("  spawned: {}", engine.spawned);
        println!("  retired: {}", engine.retired);
        println!("  discarded: {}", engine.discarded);
    }
}

fn main() -> std::io::Result<()> {
    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    #[cfg(unix)]
    {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            thread::spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    restore_terminal_best_effort();
                    std::process::exit(128 + sig);
                }
            });
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = ctrlc::set_handler(|| {
            restore_terminal_best_effort();
            std::process::exit(130);
        }) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }

    let mut cmd = Args::command()
        .styles(clap_styles())
        .before_help(default_params_usage_for_help())
        .help_template(if color_enabled_stdout() {
            HELP_TEMPLATE_COLOR
        } else {
            HELP_TEMPLATE_PLAIN
        });
    cmd.build();
    if cmd.get_arguments().any(|a| a.get_id().as_str() == "help") {
        cmd = cmd.mut_arg("help", |a| a.help_heading("HELP"));
    }

    let matches = cmd.get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if args.list_themes {
        print_list_themes();
        return Ok(());
    }

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if args.info {
        println!("Version: v{}", env!("CARGO_PKG_VERSION"));
        println!("Build: {}", env!("HEARTFALL_BUILD"));
        let sha = env!("HEARTFALL_GIT_SHA");
        if !sha.is_empty() {
            println!("Commit: {}", sha);
        }
        println!("Copyright: (c) 2026 {}", env!("CARGO_PKG_AUTHORS"));
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
        println!("Source: {}", env!("CARGO_PKG_REPOSITORY"));
        return Ok(());
    }

    if let Err(e) = init_logging(args.log_file.as_deref()) {
        fail(format_args!("failed to open log file: {}", e));
    }

    let target_fps = require_f64_range("--fps", args.fps, 1.0, 240.0);
    let end_after = args
        .duration
        .map(|s| {
            if !s.is_finite() {
                fail(format_args!("failed to apply --duration {} (must be a finite number)", s));
            }
            s
        })
        .filter(|&s| s > 0.0)
        .map(|s| Duration::from_secs_f64(require_f64_range("--duration", s, 0.1, 86400.0)));

    let (project, image_base) = load_project(&args);
    let content = content_for(&args, &project);

    let theme = match (args.theme.as_deref(), project.theme.as_deref()) {
        (Some(t), _) => parse_theme(t).unwrap_or_else(|e| fail(e)),
        (None, Some(t)) => parse_theme(t).unwrap_or_else(|e| {
            tracing::warn!(theme = t, "{}; using pink", e);
            Theme::Pink
        }),
        (None, None) => Theme::Pink,
    };
    let header = Header {
        title: args.title.clone().or_else(|| project.title.clone()),
        theme: (args.theme.is_some() || project.theme.is_some())
            .then(|| theme.name().to_string()),
        audio: content.audio_ref.clone(),
    };

    let config = engine_config(&args);
    let engine = match args.seed {
        Some(seed) => Engine::seeded(config, seed),
        None => Engine::new(config),
    };
    let mut engine = engine.unwrap_or_else(|e| fail(format_args!("invalid settings: {}", e)));
    tracing::info!(
        project = ?project.id,
        theme = theme.name(),
        seed = ?args.seed,
        "starting"
    );

    let color_mode = detect_color_mode(&args);
    let mut scene = Scene::new(
        theme,
        color_mode,
        matches!(
            args.color_bg,
            ColorBg::DefaultBackground | ColorBg::Transparent
        ),
        args.emoji,
        !args.no_sparkles,
        header,
    );
    let mut images = args
        .drop_missing_images
        .then(|| ImageCheck::new(image_base));
    let mut missing: Vec<u64> = Vec::new();

    let mut term = Terminal::new()?;
    let (w, h) = term.size()?;
    scene.resize(w, h);
    let mut frame = Frame::new(w, h, scene.palette.bg);
    let mut viewport = viewport_for(w, h);

    engine.start(content);

    let start_time = Instant::now();
    let end_time = end_after.map(|d| start_time + d);

    let target_period = Duration::from_secs_f64(1.0 / target_fps);
    let target_period_s = target_period.as_secs_f32().max(0.000_001);
    let mut next_frame = Instant::now();
    let mut perf = PerfStats::default();
    let mut running = true;

    while running {
        if end_time.is_some_and(|end| Instant::now() >= end) {
            break;
        }
        let mut pending_resize: Option<(u16, u16)> = None;

        loop {
            while Terminal::poll_event(Duration::from_millis(0))? {
                match Terminal::read_event()? {
                    Event::Resize(nw, nh) => {
                        pending_resize = Some((nw, nh));
                    }
                    Event::Key(k) if k.kind == KeyEventKind::Press => {
                        if args.screensaver {
                            running = false;
                            break;
                        }

                        match (k.code, k.modifiers) {
                            (KeyCode::Esc, _) | (KeyCode::Char('q'), _) => running = false,
                            (KeyCode::Char('c'), KeyModifiers::CONTROL) => running = false,
                            (KeyCode::Char('p'), _) => engine.toggle_pause(),
                            (KeyCode::Char(' '), _) => {
                                let content = engine.content().clone();
                                engine.start(content);
                                frame.clear_with_bg(scene.palette.bg);
                            }
                            (KeyCode::Char('+'), _) | (KeyCode::Char('='), _) => {
                                let n = (engine.config().max_live + 5).min(MAX_ITEMS_LIMIT);
                                engine.set_max_live(n);
                            }
                            (KeyCode::Char('-'), _) => {
                                let n = engine.config().max_live.saturating_sub(5).max(1);
                                engine.set_max_live(n);
                            }
                            (KeyCode::Char('t'), _) => {
                                scene.set_theme(scene.theme().next());
                                tracing::debug!(theme = scene.theme().name(), "theme changed");
                            }
                            _ => {}
                        }
                    }
                    _ => {}
                }
            }

            if !running || pending_resize.is_some() {
                break;
            }

            let now = Instant::now();
            if now >= next_frame {
                break;
            }

            let mut timeout = next_frame - now;
            if let Some(end) = end_time {
                if now >= end {
                    break;
                }
                timeout = timeout.min(end - now);
            }
            let _ = Terminal::poll_event(timeout)?;
        }

        if !running {
            break;
        }

        if let Some((nw, nh)) = pending_resize {
            scene.resize(nw, nh);
            frame = Frame::new(nw, nh, scene.palette.bg);
            viewport = viewport_for(nw, nh);
            tracing::debug!(cols = nw, rows = nh, "resized");
        }

        let work_start = Instant::now();
        let now = start_time.elapsed();
        engine.tick(now, viewport);

        if let Some(check) = images.as_mut() {
            missing.clear();
            missing.extend(
                engine
                    .live_items()
                    .iter()
                    .filter(|i| i.variant == Variant::Image && !check.available(&i.content))
                    .map(|i| i.id),
            );
            for &id in &missing {
                engine.discard(id);
            }
        }

        scene.draw(&mut frame, engine.live_items(), now, engine.is_paused());
        let did_draw = frame.is_dirty_all() || !frame.dirty_indices().is_empty();
        if did_draw {
            term.draw(&mut frame)?;
        }
        let work_s = work_start.elapsed().as_secs_f32();

        if args.perf_stats {
            perf.record(did_draw, work_s, work_s > target_period_s);
        }

        next_frame += target_period;
        let now = Instant::now();
        if now > next_frame {
            next_frame = now;
        }
    }

    let stats = engine.stats();
    engine.stop();
    drop(term);

    if args.perf_stats {
        perf.print(start_time.elapsed(), target_fps, &stats);
    }

    Ok(())
}
