//! Terminal presenter and map chain driver used by the binary.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;

use crate::core::map::{load_map, MapChain};
use crate::core::render::RenderSink;
use crate::core::{Game, GameSummary, InputFeed};
use crate::engine::{DebugFlags, GameLoop, LoopExit, PerfReport, Presenter};
use crate::term::{Display, FrameBuffer, GameView, TerminalRenderer, Viewport};

/// Draws every frame into the real terminal.
pub struct TerminalPresenter {
    display: Display,
    view: GameView,
    renderer: TerminalRenderer,
    fb: FrameBuffer,
    last_size: (u16, u16),
}

impl TerminalPresenter {
    pub fn new(renderer: TerminalRenderer, debug: DebugFlags) -> Self {
        Self {
            display: Display::new().with_contact_dir(debug.contact_dir),
            view: GameView::new(),
            renderer,
            fb: FrameBuffer::new(0, 0),
            last_size: (0, 0),
        }
    }

    pub fn renderer_mut(&mut self) -> &mut TerminalRenderer {
        &mut self.renderer
    }
}

impl Presenter for TerminalPresenter {
    fn sink(&mut self) -> &mut dyn RenderSink {
        &mut self.display
    }

    fn present(&mut self, game: &Game, perf: Option<&PerfReport>) -> Result<()> {
        let size = crossterm::terminal::size().unwrap_or((80, 24));
        if size != self.last_size {
            self.renderer.invalidate();
            self.last_size = size;
        }
        let perf_line = perf.map(PerfReport::to_string);
        self.view.render_into(
            game,
            &self.display,
            perf_line.as_deref(),
            Viewport::new(size.0, size.1),
            &mut self.fb,
        );
        self.renderer.draw_swap(&mut self.fb)
    }
}

/// Build the chain from CLI paths. A single directory expands to its maps.
pub fn chain_from_paths(paths: &[PathBuf]) -> Result<MapChain> {
    match paths {
        [dir] if dir.is_dir() => MapChain::from_dir(dir)
            .with_context(|| format!("cannot play maps in {}", dir.display())),
        _ => Ok(MapChain::new(paths.to_vec())),
    }
}

/// How a chain run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainOutcome {
    /// Every map was won, in order.
    Finished(Vec<GameSummary>),
    /// The player quit; maps won so far.
    Quit(Vec<GameSummary>),
}

/// Play the chain from its current map. A win moves to the next map, a loss
/// or restart request replays the current one.
pub async fn play_chain<P, F>(
    chain: &mut MapChain,
    game: &mut Game,
    game_loop: &mut GameLoop,
    presenter: &mut P,
    input: &F,
) -> Result<ChainOutcome>
where
    P: Presenter + ?Sized,
    F: InputFeed + ?Sized,
{
    let mut won = Vec::new();
    while let Some(path) = chain.current_map().map(Path::to_path_buf) {
        let map = load_map(&path).with_context(|| format!("loading {}", path.display()))?;
        game.load(map, presenter.sink())?;

        loop {
            match game_loop.run(game, presenter, input).await? {
                LoopExit::Ended(summary) if summary.won => {
                    won.push(summary);
                    break;
                }
                LoopExit::Ended(summary) => {
                    info!("{summary}; replaying");
                    game.restart(presenter.sink())?;
                }
                LoopExit::Restart => game.restart(presenter.sink())?,
                LoopExit::Stopped => return Ok(ChainOutcome::Quit(won)),
            }
        }

        if !chain.next_map() {
            break;
        }
    }
    Ok(ChainOutcome::Finished(won))
}
