/// Errors raised while loading or addressing a map.
///
/// Refused moves are not errors and never show up here.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("could not read map file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The description ran out of tokens.
    #[error("map description ended early: expected {expected}")]
    UnexpectedEnd { expected: &'static str },

    #[error("expected {expected}, found `{token}`")]
    InvalidNumber { expected: &'static str, token: String },

    /// The grid does not hold exactly `width * height` cells.
    #[error("map grid holds {found} cells, expected {expected}")]
    GridSizeMismatch { expected: usize, found: usize },

    /// The grid names a tile type missing from the tile-type table.
    #[error("unknown tile type `{name}` at ({x}, {y})")]
    UnknownTileType { name: String, x: usize, y: usize },

    #[error("map grid must be at least 1x1, got {width}x{height}")]
    EmptyGrid { width: usize, height: usize },

    #[error("map description lists no actors")]
    NoActors,

    #[error("actor `{name}` at ({x}, {y}) is outside the grid")]
    ActorOutOfBounds { name: String, x: usize, y: usize },
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    #[error("cell ({x}, {y}) is outside the grid")]
    OutOfBounds { x: usize, y: usize },

    #[error("no actor at index {0}")]
    NoSuchActor(usize),
}
