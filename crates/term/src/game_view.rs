//! GameView: lays out the play area and HUD in a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::core::{Editor, Game, Lifecycle};
use crate::display::{Display, PLAY_BG};
use crate::fb::{Cell, CellStyle, FrameBuffer, Rgb};
use crate::types::{DISPLAY_HEIGHT, DISPLAY_WIDTH};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Whether the whole bordered play area and both HUD rows fit.
    pub fn fits_play_area(&self) -> bool {
        let (w, h) = GameView::frame_size();
        self.width >= w && self.height >= h + 2
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnchorY {
    #[default]
    Center,
    Top,
}

/// Text shown around the play area.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Hud {
    /// Above the frame, left aligned.
    pub status: String,
    /// Above the frame, right aligned.
    pub title: String,
    /// Centered over the play area.
    pub overlay: Option<String>,
    /// Below the frame, dimmed.
    pub footer: Option<String>,
}

impl Hud {
    pub fn for_game(game: &Game, perf: Option<&str>) -> Self {
        let board = game.scoreboard();
        let status = format!(
            "★ {}/{}  ♥ {}  ⏱ {}",
            board.points.val(),
            board.points.max_val(),
            board.hp.val(),
            board.timer
        );
        let title = game
            .scene()
            .map(|scene| scene.metadata().name.clone())
            .unwrap_or_default();
        let overlay = match game.lifecycle() {
            Lifecycle::Paused => Some("PAUSED".to_string()),
            Lifecycle::Ended(summary) if summary.won => Some("YOU WIN".to_string()),
            Lifecycle::Ended(_) => Some("GAME OVER".to_string()),
            Lifecycle::Uninitialized => Some("NO MAP".to_string()),
            Lifecycle::Loaded | Lifecycle::Running => None,
        };
        Self {
            status,
            title,
            overlay,
            footer: perf.map(str::to_string),
        }
    }

    pub fn for_editor(editor: &Editor) -> Self {
        let selected = editor.selection().count();
        Self {
            status: format!("EDIT  ♥ {}  selected {selected}", editor.hp()),
            title: editor.metadata().name.clone(),
            overlay: None,
            footer: None,
        }
    }
}

/// A lightweight terminal view for the platformer.
#[derive(Debug, Clone, Default)]
pub struct GameView {
    anchor_y: AnchorY,
}

impl GameView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_anchor_y(mut self, anchor_y: AnchorY) -> Self {
        self.anchor_y = anchor_y;
        self
    }

    /// Bordered play area size in terminal cells.
    pub fn frame_size() -> (u16, u16) {
        (DISPLAY_WIDTH as u16 + 2, DISPLAY_HEIGHT as u16 + 2)
    }

    /// Top-left corner of the border for `viewport`.
    pub fn frame_origin(&self, viewport: Viewport) -> (u16, u16) {
        let (frame_w, frame_h) = Self::frame_size();
        let x = viewport.width.saturating_sub(frame_w) / 2;
        // One HUD row sits above the frame.
        let y = match self.anchor_y {
            AnchorY::Center => viewport.height.saturating_sub(frame_h + 2) / 2 + 1,
            AnchorY::Top => 1,
        };
        (x, y)
    }

    /// Render a running game into an existing framebuffer.
    pub fn render_into(
        &self,
        game: &Game,
        display: &Display,
        perf: Option<&str>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        let hud = Hud::for_game(game, perf);
        self.render_hud_into(&hud, display, &[], viewport, fb);
    }

    /// Render the editor, highlighting the selected members.
    pub fn render_editor_into(
        &self,
        editor: &Editor,
        display: &Display,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        let hud = Hud::for_editor(editor);
        let selected: Vec<_> = editor.selection().collect();
        let highlights: Vec<_> = selected
            .iter()
            .filter_map(|id| display.drawable(*id))
            .map(|d| (d.pos.x, d.pos.y, d.size.width.max(1), d.size.height.max(1)))
            .collect();
        self.render_hud_into(&hud, display, &highlights, viewport, fb);
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(
        &self,
        game: &Game,
        display: &Display,
        perf: Option<&str>,
        viewport: Viewport,
    ) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(game, display, perf, viewport, &mut fb);
        fb
    }

    fn render_hud_into(
        &self,
        hud: &Hud,
        display: &Display,
        highlights: &[(i32, i32, i32, i32)],
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(Cell::default());

        if !viewport.fits_play_area() {
            let msg = "terminal too small";
            let x = viewport.width.saturating_sub(msg.len() as u16) / 2;
            fb.put_str(x, viewport.height / 2, msg, hud_style(false));
            return;
        }

        let (frame_w, frame_h) = Self::frame_size();
        let (start_x, start_y) = self.frame_origin(viewport);
        let play = CellStyle {
            bg: PLAY_BG,
            ..CellStyle::default()
        };
        let border = CellStyle {
            fg: Rgb::new(150, 150, 170),
            ..CellStyle::default()
        };

        fb.fill_rect(start_x + 1, start_y + 1, frame_w - 2, frame_h - 2, ' ', play);
        self.draw_border(fb, start_x, start_y, frame_w, frame_h, border);
        display.compose(fb, (start_x + 1, start_y + 1));
        for rect in highlights {
            highlight(fb, (start_x + 1, start_y + 1), *rect);
        }

        let hud_y = start_y - 1;
        fb.put_str(start_x + 1, hud_y, &hud.status, hud_style(true));
        let title_w = hud.title.chars().count() as u16;
        let title_x = (start_x + frame_w - 1).saturating_sub(title_w);
        fb.put_str(title_x, hud_y, &hud.title, hud_style(false));

        if let Some(footer) = &hud.footer {
            let style = CellStyle {
                dim: true,
                ..hud_style(false)
            };
            fb.put_str(start_x + 1, start_y + frame_h, footer, style);
        }
        if let Some(text) = &hud.overlay {
            self.draw_overlay_text(fb, start_x, start_y, frame_w, frame_h, text);
        }
    }

    fn draw_border(&self, fb: &mut FrameBuffer, x: u16, y: u16, w: u16, h: u16, style: CellStyle) {
        if w < 2 || h < 2 {
            return;
        }

        fb.put_char(x, y, '┌', style);
        fb.put_char(x + w - 1, y, '┐', style);
        fb.put_char(x, y + h - 1, '└', style);
        fb.put_char(x + w - 1, y + h - 1, '┘', style);

        for dx in 1..w - 1 {
            fb.put_char(x + dx, y, '─', style);
            fb.put_char(x + dx, y + h - 1, '─', style);
        }
        for dy in 1..h - 1 {
            fb.put_char(x, y + dy, '│', style);
            fb.put_char(x + w - 1, y + dy, '│', style);
        }
    }

    fn draw_overlay_text(
        &self,
        fb: &mut FrameBuffer,
        start_x: u16,
        start_y: u16,
        frame_w: u16,
        frame_h: u16,
        text: &str,
    ) {
        let mid_y = start_y.saturating_add(frame_h / 2);
        let padded = format!(" {text} ");
        let text_w = padded.chars().count() as u16;
        let x = start_x.saturating_add(frame_w.saturating_sub(text_w) / 2);
        let style = CellStyle {
            fg: Rgb::new(255, 255, 255),
            bg: Rgb::new(60, 40, 90),
            bold: true,
            dim: false,
        };
        fb.put_str(x, mid_y, &padded, style);
    }
}

fn hud_style(bold: bool) -> CellStyle {
    CellStyle {
        fg: Rgb::new(220, 220, 220),
        bg: Rgb::new(0, 0, 0),
        bold,
        dim: false,
    }
}

/// Swap the background of a play-area rectangle for the selection color.
fn highlight(fb: &mut FrameBuffer, origin: (u16, u16), (x, y, w, h): (i32, i32, i32, i32)) {
    for ty in y.max(0)..(y + h).min(DISPLAY_HEIGHT) {
        for tx in x.max(0)..(x + w).min(DISPLAY_WIDTH) {
            let (cx, cy) = (origin.0 + tx as u16, origin.1 + ty as u16);
            if let Some(mut cell) = fb.get(cx, cy) {
                cell.style.bg = Rgb::new(70, 70, 110);
                fb.set(cx, cy, cell);
            }
        }
    }
}
