//! Slime platformer -- headless tick loop and entry point.
//!
//! Startup is sequential: config, animation clips, TODO feed, then the level.
//! A broken animation file is fatal; every other asset has a fallback.
//!
//! Each loop iteration:
//!
//!   1. Decide how many ticks this frame is worth (one, or wall-clock paced
//!      through `TimeState` with `--realtime`)
//!   2. Per tick: poll the level watcher, apply scripted key events, step the
//!      session
//!   3. Sync sprite placements to the renderer
//!
//! Input comes from a replay file (`--replay`) or a key-event script
//! (`--keys`); a scripted `Escape` stops the run early. Level hot reload
//! (`--watch-level`) only happens between ticks.

mod animation;
mod collision;
mod config;
mod controller;
mod interaction;
mod keys;
mod level;
mod physics;
mod render;
mod replay;
mod session;
mod todo;
mod watcher;

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use slime_core::input::InputState;
use slime_core::time::TimeState;

use animation::{load_clip_set, ClipSet};
use config::{load_config, GameConfig};
use controller::FrameInput;
use keys::{load_key_script, stop_requested, KeyScript};
use level::{load_level_from_path, world_to_grid, Level};
use render::LogRenderer;
use replay::load_replay_from_path;
use session::GameSession;
use todo::{fallback_todos, load_feed_or_fallback};
use watcher::FileWatcher;

const DEFAULT_TICKS: u64 = 600;
const USAGE: &str = "usage: slime_game [--config P] [--level P] [--todos P] [--animations P] \
[--replay P] [--keys P] [--ticks N] [--realtime] [--watch-level] [--save-level P]";

#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    config: Option<PathBuf>,
    level: Option<PathBuf>,
    todos: Option<PathBuf>,
    animations: Option<PathBuf>,
    replay: Option<PathBuf>,
    keys: Option<PathBuf>,
    ticks: Option<u64>,
    realtime: bool,
    watch_level: bool,
    save_level: Option<PathBuf>,
}

fn parse_args<I: Iterator<Item = String>>(mut args: I) -> Result<CliArgs, String> {
    let mut out = CliArgs::default();
    while let Some(flag) = args.next() {
        let mut value = |name: &str| {
            args.next()
                .ok_or_else(|| format!("{name} expects a value"))
        };
        match flag.as_str() {
            "--config" => out.config = Some(PathBuf::from(value("--config")?)),
            "--level" => out.level = Some(PathBuf::from(value("--level")?)),
            "--todos" => out.todos = Some(PathBuf::from(value("--todos")?)),
            "--animations" => out.animations = Some(PathBuf::from(value("--animations")?)),
            "--replay" => out.replay = Some(PathBuf::from(value("--replay")?)),
            "--keys" => out.keys = Some(PathBuf::from(value("--keys")?)),
            "--save-level" => out.save_level = Some(PathBuf::from(value("--save-level")?)),
            "--ticks" => {
                let raw = value("--ticks")?;
                out.ticks = Some(
                    raw.parse()
                        .map_err(|e| format!("--ticks: bad value '{raw}': {e}"))?,
                );
            }
            "--realtime" => out.realtime = true,
            "--watch-level" => out.watch_level = true,
            other => return Err(format!("unknown argument '{other}'")),
        }
    }
    Ok(out)
}

fn reload_level(session: &mut GameSession, watcher: &FileWatcher) {
    let path = watcher.path();
    match fs::read_to_string(path) {
        Ok(raw) => match session.load_level(&raw) {
            Ok(()) => log::info!("Level reloaded: {}", path.display()),
            Err(err) => log::error!("Level reload failed, keeping current grid: {err}"),
        },
        Err(err) => log::error!("Level reload failed: Failed to read {}: {err}", path.display()),
    }
}

fn run(args: CliArgs) -> Result<(), String> {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GameConfig::default(),
    };
    let clips = match &args.animations {
        Some(path) => load_clip_set(path)?,
        None => ClipSet::builtin(),
    };
    let todos = match &args.todos {
        Some(path) => load_feed_or_fallback(path),
        None => {
            log::info!("No TODO feed given, using fallback list");
            fallback_todos()
        }
    };
    let level = match &args.level {
        Some(path) => load_level_from_path(path).unwrap_or_else(|err| {
            log::error!("{err}; starting with the sample level");
            Level::sample()
        }),
        None => Level::sample(),
    };
    let replay = args
        .replay
        .as_deref()
        .map(load_replay_from_path)
        .transpose()?;
    let mut key_script = KeyScript::new(match &args.keys {
        Some(path) => load_key_script(path)?,
        None => Vec::new(),
    });

    let mut watcher = match (&args.level, args.watch_level) {
        (Some(path), true) => Some(FileWatcher::new(path.clone())),
        (None, true) => {
            log::warn!("--watch-level has no effect without --level");
            None
        }
        _ => None,
    };

    let replay_inputs = replay
        .as_ref()
        .map(|r| r.expanded_inputs())
        .unwrap_or_default();
    let total_ticks = args.ticks.unwrap_or(if replay_inputs.is_empty() {
        DEFAULT_TICKS
    } else {
        replay_inputs.len() as u64
    });
    let mut time = TimeState::with_fixed_dt(replay.as_ref().map_or(1.0 / 60.0, |r| r.fixed_dt));
    let tile_size = config.world.tile_size;

    let mut session = GameSession::new(config, level, todos, clips);
    let mut renderer = LogRenderer::new();
    let mut input = InputState::new();
    session.sync(&mut renderer);

    log::info!("Running {total_ticks} ticks");
    let mut tick: u64 = 0;
    let mut last_nearby = None;
    'frames: while tick < total_ticks {
        let mut steps = 1;
        if args.realtime {
            time.begin_frame();
            steps = 0;
            while time.should_step() {
                steps += 1;
            }
            time.end_frame();
        }

        for _ in 0..steps {
            if tick >= total_ticks {
                break;
            }
            if let Some(watcher) = watcher.as_mut() {
                if watcher.should_reload() {
                    reload_level(&mut session, watcher);
                }
            }
            key_script.apply_due(tick, &mut input);
            if stop_requested(&input) {
                log::info!("Escape pressed, stopping at tick {tick}");
                break 'frames;
            }
            let frame = replay_inputs
                .get(tick as usize)
                .copied()
                .unwrap_or_else(|| FrameInput::from_keys(&input));

            let report = session.tick(&frame);
            log::trace!("tick {}: frame '{}'", report.tick, report.frame);
            if report.rebuilt {
                log::debug!("tick {}: level views rebuilt", report.tick);
            }
            if report.nearby_sign != last_nearby {
                if let Some(index) = report.nearby_sign {
                    log::debug!("tick {}: near sign for TODO #{index}", report.tick);
                }
                last_nearby = report.nearby_sign;
            }
            if report.events.player.jumped {
                log::debug!("tick {}: jump", report.tick);
            }
            if report.events.player.dodged {
                log::debug!("tick {}: dodge", report.tick);
            }
            if report.events.player.landed {
                log::debug!("tick {}: landed", report.tick);
            }
            if report.opened {
                if let Some(item) = session.overlay().message() {
                    log::info!("tick {}: sign opened '{}' ({})", report.tick, item.title, item.date);
                }
            }
            if report.closed {
                log::info!("tick {}: sign closed", report.tick);
            }
            input.end_frame();
            tick += 1;
        }

        session.sync(&mut renderer);
        if args.realtime {
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    let pos = session.player().body.pos;
    let (cell_x, cell_y) = world_to_grid(pos.x, pos.y, tile_size);
    log::info!(
        "Finished after {} ticks; player in cell ({cell_x}, {cell_y}); {} live sprites",
        session.tick_count(),
        renderer.live_count()
    );

    if let Some(path) = &args.save_level {
        let json = session.level().to_json()?;
        fs::write(path, json).map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
        log::info!("Saved level to {}", path.display());
    }

    let summary = serde_json::to_string_pretty(&session.summary())
        .map_err(|e| format!("Failed to encode session summary: {e}"))?;
    println!("{summary}");
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Slime platformer starting...");

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(err) => {
            log::error!("{err}");
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    };
    if let Err(err) = run(args) {
        log::error!("{err}");
        std::process::exit(1);
    }
}
