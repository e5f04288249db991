//! Tofu Byte runner (default binary).
//!
//! Plays a chain of maps in the terminal, or works on map files with the
//! `new`, `check` and `fmt` subcommands.

use std::fs::OpenOptions;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use tofu_byte::app::{chain_from_paths, play_chain, ChainOutcome, TerminalPresenter};
use tofu_byte::cli::{parse_args, Command, USAGE};
use tofu_byte::core::map::{create_empty_map, load_map};
use tofu_byte::core::render::NullSink;
use tofu_byte::core::{Editor, Game};
use tofu_byte::engine::{EngineConfig, GameLoop, LoopControl};
use tofu_byte::input::{ControlAction, InputCapture, KeyboardState};
use tofu_byte::term::TerminalRenderer;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = parse_args(&args)?;

    let mut config = EngineConfig::from_env();
    if let Some(debug) = cli.debug {
        config.debug = debug;
    }
    init_logging(&config)?;

    match cli.command {
        Command::Help => println!("{USAGE}"),
        Command::New { path, name } => new_map(&path, name.as_deref())?,
        Command::Check { path } => check_map(&path)?,
        Command::Fmt { path } => fmt_map(&path, &config)?,
        Command::Play { maps } => play(&maps, &config)?,
    }
    Ok(())
}

/// The terminal belongs to the game, so logs go to `TOFU_BYTE_LOG_PATH`.
fn init_logging(config: &EngineConfig) -> Result<()> {
    let Some(path) = &config.log_path else {
        return Ok(());
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {path}"))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn new_map(path: &Path, name: Option<&str>) -> Result<()> {
    let name = match name {
        Some(name) => name.to_string(),
        None => path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "new map".to_string()),
    };
    create_empty_map(&name, &[]).save(path)?;
    println!("created `{name}` at {}", path.display());
    Ok(())
}

fn check_map(path: &Path) -> Result<()> {
    let map = load_map(path)?;
    println!("name:    {}", map.metadata.name);
    println!("version: {}", map.metadata.game_version);
    println!("authors: {}", map.metadata.authors.join(", "));
    println!("objects: {}", map.spawns.len());
    println!("stars:   {}", map.config.points);
    println!("hp:      {}", map.config.hp);
    if map.config.winning_ball {
        println!("goal:    end ball");
    }
    Ok(())
}

fn fmt_map(path: &Path, config: &EngineConfig) -> Result<()> {
    let map = load_map(path)?;
    let editor = Editor::load(&map, config.seed_or_clock(), &mut NullSink)?;
    editor.save(path)?;
    println!("formatted {}", path.display());
    Ok(())
}

fn play(maps: &[std::path::PathBuf], config: &EngineConfig) -> Result<()> {
    let mut chain = chain_from_paths(maps)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;

    let keyboard = KeyboardState::new(config.key_release_timeout());
    let control = LoopControl::new();
    let remote = control.clone();
    let step_enabled = config.debug.step;

    let mut renderer = TerminalRenderer::new();
    renderer.enter("tofu-byte")?;
    let capture = InputCapture::spawn(keyboard.clone(), move |action| match action {
        ControlAction::Quit => remote.stop(),
        ControlAction::TogglePause => {
            remote.toggle_pause();
        }
        ControlAction::Step if step_enabled => remote.request_step(),
        ControlAction::Step => {}
        ControlAction::Restart => remote.request_restart(),
    })?;

    let mut presenter = TerminalPresenter::new(renderer, config.debug);
    let mut game = Game::new(config.seed_or_clock());
    let mut game_loop = GameLoop::new(config.clone(), control);
    let result = runtime.block_on(play_chain(
        &mut chain,
        &mut game,
        &mut game_loop,
        &mut presenter,
        &keyboard,
    ));

    capture.stop();
    presenter.renderer_mut().exit()?;

    match result? {
        ChainOutcome::Finished(won) => {
            for summary in &won {
                println!("{summary}");
            }
            println!("all {} maps done", won.len());
        }
        ChainOutcome::Quit(won) => {
            for summary in &won {
                println!("{summary}");
            }
            info!("quit after {} maps", won.len());
        }
    }
    Ok(())
}
