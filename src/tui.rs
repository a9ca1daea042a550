//! Terminal presentation and key input
//!
//! The scene is drawn into a pixel canvas at two vertical pixels per terminal
//! cell (the upper-half block `▀` with independent fg/bg colors), then diffed
//! onto stdout. Scene coordinates are the sim's 800x600 playfield; the canvas
//! scales them to whatever size the terminal happens to be. This module is a
//! pure sink: it reads `FrameSnapshot`s and yields `Command`s, nothing else.

use std::io::{self, Stdout, Write, stdout};
use std::time::Duration;

use crossterm::{
    cursor,
    event::{self, Event, KeyCode},
    execute, queue,
    style::{self, Color},
    terminal,
};
use glam::Vec2;

use crate::GameConfig;
use crate::sim::{FrameSnapshot, GamePhase, Obstacle, ObstacleKind};

/// Discrete player commands drained once per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    /// Begin play from the Ready screen
    Start,
    /// Start a fresh round after a crash
    Restart,
}

// ── Palette ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    const fn lerp(a: Rgb, b: Rgb, t_256: u16) -> Rgb {
        let t = t_256 as i32;
        Rgb(
            (a.0 as i32 + (b.0 as i32 - a.0 as i32) * t / 256) as u8,
            (a.1 as i32 + (b.1 as i32 - a.1 as i32) * t / 256) as u8,
            (a.2 as i32 + (b.2 as i32 - a.2 as i32) * t / 256) as u8,
        )
    }

    fn dim(self) -> Rgb {
        Rgb(self.0 / 2, self.1 / 2, self.2 / 2)
    }
}

const SKY_TOP: Rgb = Rgb(120, 190, 235);
const SKY_BOT: Rgb = Rgb(200, 230, 250);
const GROUND: Rgb = Rgb(95, 160, 60);
const DIRT: Rgb = Rgb(150, 110, 70);
const HEN_BODY: Rgb = Rgb(255, 165, 0);
const HEN_COMB: Rgb = Rgb(220, 40, 40);
const HEN_EYE: Rgb = Rgb(255, 255, 255);
const HEN_PUPIL: Rgb = Rgb(20, 20, 20);
const HEN_BEAK: Rgb = Rgb(255, 60, 30);
const HEN_LEG: Rgb = Rgb(139, 69, 19);
const CACTUS: Rgb = Rgb(0, 100, 0);
const TOWER: Rgb = Rgb(100, 100, 100);
const TOWER_LEDGE: Rgb = Rgb(150, 150, 150);
const TOWER_WINDOW: Rgb = Rgb(200, 200, 255);
const SLAB: Rgb = Rgb(145, 100, 60);
const CRACK: Rgb = Rgb(25, 25, 25);
const BALL: Rgb = Rgb(220, 50, 50);
const WHITE: Rgb = Rgb(255, 255, 255);
const SHADOW: Rgb = Rgb(30, 30, 30);
const METER_LOW: Rgb = Rgb(80, 200, 80);
const METER_HIGH: Rgb = Rgb(230, 70, 50);

// ── Canvas ──────────────────────────────────────────────────────────────────

/// Pixel buffer rendered as half-block cells
///
/// Height is terminal rows * 2. Out-of-range writes are dropped, so callers
/// never need their own clipping.
#[derive(Debug)]
pub struct Canvas {
    w: usize,
    h: usize,
    px: Vec<Rgb>,
}

impl Canvas {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            px: vec![SKY_TOP; w * h],
        }
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn height(&self) -> usize {
        self.h
    }

    pub fn resize(&mut self, w: usize, h: usize) {
        self.w = w;
        self.h = h;
        self.px.resize(w * h, SKY_TOP);
    }

    pub fn set(&mut self, x: i32, y: i32, c: Rgb) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            self.px[y as usize * self.w + x as usize] = c;
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Rgb {
        self.px[y * self.w + x]
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, c: Rgb) {
        for dy in 0..h {
            for dx in 0..w {
                self.set(x + dx, y + dy, c);
            }
        }
    }

    pub fn fill_disc(&mut self, cx: i32, cy: i32, r: i32, c: Rgb) {
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r * r {
                    self.set(cx + dx, cy + dy, c);
                }
            }
        }
    }

    /// Flush the buffer as `▀` cells, re-issuing colors only on change
    fn render(&self, out: &mut impl Write) -> io::Result<()> {
        queue!(out, cursor::MoveTo(0, 0))?;
        let rows = self.h / 2;
        let mut fg: Option<Rgb> = None;
        let mut bg: Option<Rgb> = None;

        for row in 0..rows {
            for col in 0..self.w {
                let top = self.get(col, row * 2);
                let bot = self.get(col, row * 2 + 1);

                if top == bot {
                    if bg != Some(top) {
                        queue!(out, style::SetBackgroundColor(color(top)))?;
                        bg = Some(top);
                    }
                    queue!(out, style::Print(' '))?;
                } else {
                    if fg != Some(top) {
                        queue!(out, style::SetForegroundColor(color(top)))?;
                        fg = Some(top);
                    }
                    if bg != Some(bot) {
                        queue!(out, style::SetBackgroundColor(color(bot)))?;
                        bg = Some(bot);
                    }
                    queue!(out, style::Print('\u{2580}'))?;
                }
            }
            if row < rows - 1 {
                queue!(out, style::ResetColor, style::Print("\r\n"))?;
                fg = None;
                bg = None;
            }
        }
        queue!(out, style::ResetColor)?;
        out.flush()
    }
}

fn color(c: Rgb) -> Color {
    Color::Rgb {
        r: c.0,
        g: c.1,
        b: c.2,
    }
}

// ── 3x5 bitmap digits ───────────────────────────────────────────────────────

#[rustfmt::skip]
const DIGITS: [[u8; 15]; 10] = [
    [1,1,1, 1,0,1, 1,0,1, 1,0,1, 1,1,1], // 0
    [0,1,0, 1,1,0, 0,1,0, 0,1,0, 1,1,1], // 1
    [1,1,1, 0,0,1, 1,1,1, 1,0,0, 1,1,1], // 2
    [1,1,1, 0,0,1, 0,1,1, 0,0,1, 1,1,1], // 3
    [1,0,1, 1,0,1, 1,1,1, 0,0,1, 0,0,1], // 4
    [1,1,1, 1,0,0, 1,1,1, 0,0,1, 1,1,1], // 5
    [1,1,1, 1,0,0, 1,1,1, 1,0,1, 1,1,1], // 6
    [1,1,1, 0,0,1, 0,1,0, 0,1,0, 0,1,0], // 7
    [1,1,1, 1,0,1, 1,1,1, 1,0,1, 1,1,1], // 8
    [1,1,1, 1,0,1, 1,1,1, 0,0,1, 1,1,1], // 9
];

fn draw_digit(canvas: &mut Canvas, x: i32, y: i32, d: u8, fg: Rgb) {
    let glyph = &DIGITS[d as usize];
    for row in 0..5 {
        for col in 0..3 {
            if glyph[row * 3 + col] == 1 {
                let px = x + col as i32;
                let py = y + row as i32;
                canvas.set(px + 1, py + 1, SHADOW);
                canvas.set(px, py, fg);
            }
        }
    }
}

fn draw_number(canvas: &mut Canvas, cx: i32, y: i32, n: u32, fg: Rgb) {
    let s = n.to_string();
    let total_w = s.len() as i32 * 4 - 1; // 3px per digit + 1px spacing
    let start_x = cx - total_w / 2;
    for (i, ch) in s.chars().enumerate() {
        draw_digit(canvas, start_x + i as i32 * 4, y, ch as u8 - b'0', fg);
    }
}

// ── Screen ──────────────────────────────────────────────────────────────────

/// Owns the raw-mode terminal for the lifetime of the game
///
/// `open`/`close` bracket the alternate screen; Drop closes best-effort so a
/// panic or early return never leaves the terminal raw.
pub struct Screen {
    out: Stdout,
    canvas: Canvas,
    scene: Vec2,
    ground_y: f32,
    open: bool,
}

impl Screen {
    pub fn open(cfg: &GameConfig) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = stdout();
        execute!(
            out,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::DisableLineWrap,
        )?;
        let (cols, rows) = terminal::size()?;
        Ok(Self {
            out,
            canvas: Canvas::new(cols as usize, rows as usize * 2),
            scene: Vec2::new(cfg.width, cfg.height),
            ground_y: cfg.ground_y,
            open: true,
        })
    }

    pub fn close(&mut self) -> io::Result<()> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        execute!(
            self.out,
            terminal::LeaveAlternateScreen,
            cursor::Show,
            terminal::EnableLineWrap,
        )?;
        terminal::disable_raw_mode()
    }

    /// Drain pending key events into commands; never blocks
    pub fn poll_commands(&mut self) -> io::Result<Vec<Command>> {
        let mut commands = Vec::new();
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => commands.push(Command::Quit),
                    KeyCode::Char(' ') | KeyCode::Enter => commands.push(Command::Start),
                    KeyCode::Char('r') => commands.push(Command::Restart),
                    _ => {}
                },
                Event::Resize(cols, rows) => {
                    self.canvas.resize(cols as usize, rows as usize * 2);
                }
                _ => {}
            }
        }
        Ok(commands)
    }

    /// Draw one frame from a snapshot
    pub fn present(&mut self, snapshot: &FrameSnapshot) -> io::Result<()> {
        self.draw_sky();
        self.draw_ground();
        for obstacle in &snapshot.obstacles {
            self.draw_obstacle(obstacle);
        }
        self.draw_hen(snapshot);
        self.draw_hud(snapshot);

        match snapshot.phase {
            GamePhase::Ready => self.draw_ready_banner(),
            GamePhase::GameOver => self.draw_game_over(snapshot.score),
            GamePhase::Playing => {}
        }

        self.canvas.render(&mut self.out)
    }

    // Scene (800x600) to canvas pixels.

    fn to_px(&self, p: Vec2) -> (i32, i32) {
        (
            (p.x * self.canvas.w as f32 / self.scene.x) as i32,
            (p.y * self.canvas.h as f32 / self.scene.y) as i32,
        )
    }

    /// Scene-space rectangle, at least one pixel on each axis
    fn rect_px(&self, pos: Vec2, size: Vec2) -> (i32, i32, i32, i32) {
        let (x, y) = self.to_px(pos);
        let (x2, y2) = self.to_px(pos + size);
        (x, y, (x2 - x).max(1), (y2 - y).max(1))
    }

    fn draw_sky(&mut self) {
        let h = self.canvas.h;
        let w = self.canvas.w;
        for y in 0..h {
            let t = (y * 256 / h.max(1)) as u16;
            let c = Rgb::lerp(SKY_TOP, SKY_BOT, t);
            for x in 0..w {
                self.canvas.set(x as i32, y as i32, c);
            }
        }
    }

    fn draw_ground(&mut self) {
        let (_, gy) = self.to_px(Vec2::new(0.0, self.ground_y));
        let w = self.canvas.w as i32;
        let h = self.canvas.h as i32;
        self.canvas.fill_rect(0, gy, w, 2, GROUND);
        self.canvas.fill_rect(0, gy + 2, w, h - gy - 2, DIRT);
    }

    fn draw_hen(&mut self, snapshot: &FrameSnapshot) {
        let (x, y, w, h) = self.rect_px(snapshot.hen_pos, snapshot.hen_size);

        // Body with a comb on top.
        self.canvas.fill_rect(x, y, w, h, HEN_BODY);
        self.canvas.fill_rect(x + w / 2, y - 1, (w / 3).max(1), 1, HEN_COMB);

        // Head block overhanging the leading (right) edge.
        let head = (w / 2).max(2);
        self.canvas.fill_rect(x + w - head / 2, y - 1, head, head, HEN_BODY);

        // Eye and beak on the head.
        self.canvas.set(x + w, y, HEN_EYE);
        self.canvas.set(x + w + 1, y, HEN_PUPIL);
        self.canvas
            .fill_rect(x + w + head / 2, y + 1, 2.max(w / 8), 1, HEN_BEAK);

        // Legs tuck while airborne.
        if !snapshot.airborne {
            self.canvas.fill_rect(x + w / 4, y + h, 1, 2, HEN_LEG);
            self.canvas.fill_rect(x + 3 * w / 4, y + h, 1, 2, HEN_LEG);
        }
    }

    fn draw_obstacle(&mut self, obstacle: &Obstacle) {
        let (x, y, w, h) = self.rect_px(obstacle.pos, obstacle.size);
        match obstacle.kind {
            ObstacleKind::Cactus => {
                self.canvas.fill_rect(x, y, w, h, CACTUS);
                // Spikes off the right flank.
                for i in 0..3 {
                    self.canvas.set(x + w, y + i * h / 3 + 1, CACTUS);
                }
            }
            ObstacleKind::Tower => {
                self.canvas.fill_rect(x, y, w, h, TOWER);
                self.canvas.fill_rect(x - 1, y, w + 2, 1, TOWER_LEDGE);
                // Two window rows when the tower is tall enough to hold them.
                for i in 0..2 {
                    let wy = y + 2 + i * h / 2;
                    if wy + 1 < y + h {
                        self.canvas
                            .fill_rect(x + w / 4, wy, (w / 4).max(1), 1, TOWER_WINDOW);
                    }
                }
            }
            ObstacleKind::CrackedSlab { cracks } => {
                self.canvas.fill_rect(x, y, w, h, SLAB);
                for (i, (cx, cy)) in cracks.iter().enumerate() {
                    let px = x + (cx * w as f32 / obstacle.size.x) as i32;
                    let py = y + (cy * h as f32 / obstacle.size.y) as i32;
                    self.canvas.set(px, py, CRACK);
                    // Short diagonal tail, direction hashed from the index.
                    let dx = if (i as u32).wrapping_mul(2654435761) & 1 == 0 {
                        1
                    } else {
                        -1
                    };
                    self.canvas.set(px + dx, py + 1, CRACK);
                }
            }
            ObstacleKind::Bouncer { .. } => {
                let r = (w / 2).max(1);
                let (cx, cy) = (x + w / 2, y + h / 2);
                self.canvas.fill_disc(cx, cy, r, BALL);
                // A pair of eyes, same as the original ball.
                self.canvas.set(cx - r / 2, cy - r / 2, HEN_EYE);
                self.canvas.set(cx + r / 2, cy - r / 2, HEN_EYE);
            }
        }
    }

    fn draw_hud(&mut self, snapshot: &FrameSnapshot) {
        let cx = self.canvas.w as i32 / 2;
        draw_number(&mut self.canvas, cx, 3, snapshot.score, WHITE);

        // Intensity meter along the bottom-left, clamped to [0, 1] for display.
        let level = snapshot.intensity.clamp(0.0, 1.0);
        let full = (self.canvas.w / 4) as i32;
        let lit = (level * full as f32) as i32;
        let y = self.canvas.h as i32 - 3;
        self.canvas.fill_rect(2, y, full, 2, SHADOW);
        for px in 0..lit {
            let c = Rgb::lerp(METER_LOW, METER_HIGH, (px * 256 / full.max(1)) as u16);
            self.canvas.fill_rect(2 + px, y, 1, 2, c);
        }
    }

    fn draw_ready_banner(&mut self) {
        let cx = self.canvas.w as i32 / 2;
        let cy = self.canvas.h as i32 / 4;

        // "HOLLER HEN" as blocky letter slabs; real glyphs are not worth the
        // pixels at this resolution.
        let letters = 9;
        let char_w = 4;
        let sx = cx - letters * char_w / 2;
        for i in 0..letters {
            if i == 6 {
                continue; // word gap
            }
            self.canvas.fill_rect(sx + i * char_w, cy, char_w - 1, 6, HEN_BODY);
            self.canvas.fill_rect(sx + i * char_w, cy, char_w - 1, 1, HEN_COMB);
        }

        // "MAKE NOISE TO JUMP" as a dotted subtitle strip.
        let msg = "MAKE NOISE TO JUMP";
        let msg_x = cx - msg.len() as i32 * 2;
        for (i, ch) in msg.chars().enumerate() {
            if ch != ' ' {
                self.canvas.fill_rect(msg_x + i as i32 * 4, cy + 9, 3, 3, WHITE);
            }
        }
    }

    fn draw_game_over(&mut self, score: u32) {
        // Dim the whole scene, then float a panel with the final score.
        for y in 0..self.canvas.h {
            for x in 0..self.canvas.w {
                let c = self.canvas.get(x, y);
                self.canvas.set(x as i32, y as i32, c.dim());
            }
        }

        let cx = self.canvas.w as i32 / 2;
        let cy = self.canvas.h as i32 / 2;
        let panel_w = 36;
        let panel_h = 14;
        let px = cx - panel_w / 2;
        let py = cy - panel_h / 2;
        self.canvas.fill_rect(px - 1, py - 1, panel_w + 2, panel_h + 2, SHADOW);
        self.canvas.fill_rect(px, py, panel_w, panel_h, SLAB);
        draw_number(&mut self.canvas, cx, py + 3, score, WHITE);

        // "R" hint strip under the score.
        self.canvas.fill_rect(cx - 6, py + panel_h - 4, 12, 2, WHITE);
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canvas_set_get_roundtrip() {
        let mut canvas = Canvas::new(10, 8);
        canvas.set(3, 4, WHITE);
        assert_eq!(canvas.get(3, 4), WHITE);
        assert_eq!(canvas.get(0, 0), SKY_TOP);
    }

    #[test]
    fn test_canvas_clips_out_of_range() {
        let mut canvas = Canvas::new(10, 8);
        canvas.set(-1, 0, WHITE);
        canvas.set(0, -1, WHITE);
        canvas.set(10, 0, WHITE);
        canvas.set(0, 8, WHITE);
        assert!((0..8).all(|y| (0..10).all(|x| canvas.get(x, y) == SKY_TOP)));
    }

    #[test]
    fn test_fill_rect_covers_exactly() {
        let mut canvas = Canvas::new(10, 10);
        canvas.fill_rect(2, 2, 3, 3, WHITE);
        assert_eq!(canvas.get(2, 2), WHITE);
        assert_eq!(canvas.get(4, 4), WHITE);
        assert_eq!(canvas.get(5, 5), SKY_TOP);
        assert_eq!(canvas.get(1, 2), SKY_TOP);
    }

    #[test]
    fn test_fill_disc_stays_in_radius() {
        let mut canvas = Canvas::new(20, 20);
        canvas.fill_disc(10, 10, 3, BALL);
        assert_eq!(canvas.get(10, 10), BALL);
        assert_eq!(canvas.get(13, 10), BALL);
        assert_eq!(canvas.get(13, 13), SKY_TOP);
    }

    #[test]
    fn test_resize_keeps_dimensions() {
        let mut canvas = Canvas::new(10, 8);
        canvas.resize(20, 16);
        assert_eq!(canvas.width(), 20);
        assert_eq!(canvas.height(), 16);
        canvas.set(19, 15, WHITE);
        assert_eq!(canvas.get(19, 15), WHITE);
    }

    #[test]
    fn test_digit_draws_shadowed_pixels() {
        let mut canvas = Canvas::new(10, 10);
        draw_digit(&mut canvas, 2, 2, 1, WHITE);
        // The "1" glyph lights its top-center pixel; shadow sits at +1,+1.
        assert_eq!(canvas.get(3, 2), WHITE);
        assert_eq!(canvas.get(4, 3), SHADOW);
    }

    #[test]
    fn test_lerp_endpoints() {
        assert_eq!(Rgb::lerp(SKY_TOP, SKY_BOT, 0), SKY_TOP);
        let end = Rgb::lerp(Rgb(0, 0, 0), Rgb(255, 255, 255), 256);
        assert_eq!(end, Rgb(255, 255, 255));
    }
}
