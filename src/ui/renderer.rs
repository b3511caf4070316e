/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. The map observer (`ViewObserver`) records which cells changed
///   2. Only those cells (plus the HUD) are recomposed into `front`
///   3. `front` is diffed against `back`; only changed cells hit the terminal
///   4. Swap front/back
///
/// Each map cell is two terminal columns wide.

use std::cell::RefCell;
use std::io::{self, BufWriter, Write};
use std::rc::Rc;

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use fogwalk::sim::event::MapObserver;
use fogwalk::sim::map::Map;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BASE_BG: Color = Color::Rgb { r: 18, g: 18, b: 24 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Never equal to a real cell; forces a repaint.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }
}

// ── Change tracking ──

/// Cells the map reported as changed since the last frame.
#[derive(Default)]
pub struct Damage {
    tiles: Vec<(usize, usize)>,
    actors: Vec<usize>,
}

/// Map observer owned by the map; shares `Damage` with the renderer.
pub struct ViewObserver {
    damage: Rc<RefCell<Damage>>,
}

impl MapObserver for ViewObserver {
    fn on_tile_changed(&mut self, _map: &Map, x: usize, y: usize) {
        self.damage.borrow_mut().tiles.push((x, y));
    }

    fn on_actor_changed(&mut self, _map: &Map, index: usize) {
        self.damage.borrow_mut().actors.push(index);
    }
}

// ── Renderer ──

const CELL_W: usize = 2;
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    damage: Rc<RefCell<Damage>>,
    /// Where each actor was drawn last frame, to erase it after a move.
    drawn_actors: Vec<(usize, usize)>,
    full_redraw: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            damage: Rc::new(RefCell::new(Damage::default())),
            drawn_actors: vec![],
            full_redraw: true,
        }
    }

    /// Observer to register on the map.
    pub fn observer(&self) -> ViewObserver {
        ViewObserver { damage: Rc::clone(&self.damage) }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;
        self.fit_terminal();
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    fn fit_terminal(&mut self) {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        let (tw, th) = (tw as usize, th as usize);
        if tw != self.front.width || th != self.front.height {
            self.front.resize(tw, th);
            self.back.resize(tw, th);
            self.back.cells.fill(Cell::INVALID);
            self.full_redraw = true;
        }
    }

    pub fn render(&mut self, map: &Map, status: &str) -> io::Result<()> {
        self.fit_terminal();

        let damage = std::mem::take(&mut *self.damage.borrow_mut());
        if self.full_redraw {
            for y in 0..map.height() {
                for x in 0..map.width() {
                    self.compose_tile(map, x, y);
                }
            }
            self.full_redraw = false;
        } else {
            for &(x, y) in &damage.tiles {
                self.compose_tile(map, x, y);
            }
            // Erase previous sprite spots; the redraw below repaints actors.
            for &index in &damage.actors {
                if let Some(&(x, y)) = self.drawn_actors.get(index) {
                    self.compose_tile(map, x, y);
                }
            }
        }

        self.drawn_actors.clear();
        for (i, actor) in map.actors().iter().enumerate() {
            let (x, y) = actor.position();
            self.drawn_actors.push((x, y));
            if !map.tile_at(x, y).is_some_and(|t| t.is_seen()) {
                continue;
            }
            let (ch, fg) = if i == map.player_index() {
                ('@', Color::Yellow)
            } else {
                (actor.image_name().chars().next().unwrap_or('?'), Color::Red)
            };
            self.put_map_cell(x, y, Cell::new(ch, fg, Cell::BASE_BG));
        }

        self.compose_hud(map, status);

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        // Back now holds what is on screen; keep front in sync for partial composes.
        self.front.cells.copy_from_slice(&self.back.cells);
        Ok(())
    }

    // ── Compose ──

    fn compose_tile(&mut self, map: &Map, x: usize, y: usize) {
        let Some(tile) = map.tile_at(x, y) else { return };
        let cell = if !tile.is_seen() {
            Cell::new(' ', Color::DarkGrey, Cell::BASE_BG)
        } else {
            // Fog edge: some in-bounds neighbor is still unseen.
            let in_bounds = map
                .neighbors_at(x, y)
                .iter()
                .fold(fogwalk::Directions::empty(), |acc, n| acc | n.direction.flag());
            let edge = map.seen_neighbor_flags_at(x, y) != in_bounds;
            let fg = if edge { Color::DarkGrey } else { Color::Grey };
            let ch = if tile.blocks() { '#' } else { '.' };
            Cell::new(ch, fg, Cell::BASE_BG)
        };
        self.put_map_cell(x, y, cell);
    }

    fn put_map_cell(&mut self, x: usize, y: usize, cell: Cell) {
        let col = x * CELL_W;
        let row = MAP_ROW + y;
        self.front.set(col, row, cell);
        self.front.set(col + 1, row, Cell::new(' ', cell.fg, cell.bg));
    }

    fn compose_hud(&mut self, map: &Map, status: &str) {
        let hud_bg = Color::Rgb { r: 20, g: 20, b: 60 };
        for x in 0..self.front.width {
            self.front.set(x, HUD_ROW, Cell::new(' ', Color::White, hud_bg));
        }
        let (px, py) = map.player().position();
        let hud = format!(
            " ({px},{py})  seen {}/{}  {status}",
            map.seen_count(),
            map.width() * map.height(),
        );
        self.front.put_str(0, HUD_ROW, &hud, Color::White, hud_bg);
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }
                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }
}
