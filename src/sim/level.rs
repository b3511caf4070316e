/// Map description loader and writer.
///
/// ## Format
///
/// Whitespace-separated tokens, three sections in this order:
///
///   ```text
///   <tile type count>
///   <name> <exit letters> <block marker>     (repeated)
///   <actor count>
///   <name> <x> <y>                           (repeated)
///   <width> <height>
///   <tile type name>                         (width * height, row-major)
///   ```
///
/// Exit letters are any mix of `N`, `E`, `S`, `W`; other characters are
/// ignored, so `-` means "no exits". A block marker of `X` blocks line of
/// sight, anything else does not. The first actor is the player.
///
/// Example:
///   ```text
///   2
///   floor NESW .
///   wall  -    X
///   1
///   hero 1 1
///   3 3
///   wall  floor wall
///   floor floor floor
///   wall  floor wall
///   ```

use std::path::Path;
use std::str::{FromStr, SplitWhitespace};

use crate::domain::direction::Directions;
use crate::domain::tile::TileType;
use crate::sim::error::LoadError;
use crate::sim::map::Map;

/// Block marker that makes a tile type occlude line of sight.
pub const BLOCK_MARKER: &str = "X";
const OPEN_MARKER: &str = ".";

/// Upper bound on up-front reservations; counts come from the file.
const RESERVE_LIMIT: usize = 1024;

/// Actor entry as written in the description.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ActorDef {
    pub name: String,
    pub x: usize,
    pub y: usize,
}

/// Parsed description, before any semantic checks.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct LevelDef {
    pub tile_types: Vec<TileType>,
    pub actors: Vec<ActorDef>,
    pub width: usize,
    pub height: usize,
    /// Tile type names, row-major.
    pub grid: Vec<String>,
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Read and build a map from a description file.
pub fn load_from_path(path: &Path) -> Result<Map, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let map = Map::from_description(&text)?;
    tracing::info!(
        path = %path.display(),
        width = map.width(),
        height = map.height(),
        actors = map.actor_count(),
        "map loaded"
    );
    Ok(map)
}

/// Tokenize and parse the three sections. Fails only on short or
/// malformed input; tile names are not resolved here.
pub fn parse_description(text: &str) -> Result<LevelDef, LoadError> {
    let mut tokens = Tokens::new(text);

    let type_count: usize = tokens.number("tile type count")?;
    let mut tile_types = Vec::with_capacity(type_count.min(RESERVE_LIMIT));
    for _ in 0..type_count {
        let name = tokens.word("tile type name")?;
        let exits = Directions::from_exit_letters(tokens.word("tile exits")?);
        let blocks = tokens.word("tile block marker")? == BLOCK_MARKER;
        tile_types.push(TileType::new(name, exits, blocks));
    }

    let actor_count: usize = tokens.number("actor count")?;
    let mut actors = Vec::with_capacity(actor_count.min(RESERVE_LIMIT));
    for _ in 0..actor_count {
        let name = tokens.word("actor name")?.to_string();
        let x = tokens.number("actor x")?;
        let y = tokens.number("actor y")?;
        actors.push(ActorDef { name, x, y });
    }

    let width: usize = tokens.number("map width")?;
    let height: usize = tokens.number("map height")?;
    let cell_count = width.checked_mul(height).ok_or(LoadError::InvalidNumber {
        expected: "map dimensions",
        token: format!("{width}x{height}"),
    })?;
    let mut grid = Vec::with_capacity(cell_count.min(RESERVE_LIMIT));
    for _ in 0..cell_count {
        grid.push(tokens.word("grid tile name")?.to_string());
    }

    Ok(LevelDef { tile_types, actors, width, height, grid })
}

/// Write a map back out in the description format.
/// Loading the result yields the same types, actors and grid.
pub fn write_description(map: &Map) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}\n", map.tile_types().len()));
    for t in map.tile_types() {
        let marker = if t.blocks { BLOCK_MARKER } else { OPEN_MARKER };
        out.push_str(&format!("{} {} {}\n", t.name, t.exits.to_exit_letters(), marker));
    }

    out.push_str(&format!("{}\n", map.actor_count()));
    for actor in map.actors() {
        out.push_str(&format!("{} {} {}\n", actor.image_name(), actor.x(), actor.y()));
    }

    out.push_str(&format!("{} {}\n", map.width(), map.height()));
    for y in 0..map.height() {
        let row: Vec<&str> = (0..map.width())
            .filter_map(|x| map.tile_at(x, y))
            .map(|t| t.image_name())
            .collect();
        out.push_str(&row.join(" "));
        out.push('\n');
    }

    out
}

// ══════════════════════════════════════════════════════════════
// Tokenizer
// ══════════════════════════════════════════════════════════════

struct Tokens<'a> {
    inner: SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Tokens { inner: text.split_whitespace() }
    }

    fn word(&mut self, expected: &'static str) -> Result<&'a str, LoadError> {
        self.inner.next().ok_or(LoadError::UnexpectedEnd { expected })
    }

    fn number<T: FromStr>(&mut self, expected: &'static str) -> Result<T, LoadError> {
        let token = self.word(expected)?;
        token.parse().map_err(|_| LoadError::InvalidNumber {
            expected,
            token: token.to_string(),
        })
    }
}
