//! Tile map engine: grid of tiles with directional exits, movable actors,
//! fog of war and a line-of-sight occlusion query.
//!
//! `domain` holds the pure pieces (directions, tiles, actors, movement and
//! sight rules). `sim` owns the stateful `Map`, its loader and change
//! notification. Presentation lives in the binary and only talks to the map
//! through its accessors and the `MapObserver` hook.
pub mod config;
pub mod domain;
pub mod sim;

pub use domain::actor::{Actor, DEFAULT_SIGHT_RADIUS};
pub use domain::direction::{Direction, Directions};
pub use domain::tile::{Tile, TileType};
pub use sim::error::{LoadError, MapError};
pub use sim::event::{EventLog, MapEvent, MapObserver};
pub use sim::map::{Map, Neighbor};
