/// Tile types and per-cell tiles.
/// Terrain semantics (exits, blocking) live on the type table entry and are
/// copied into each tile at load; only the seen flag changes afterwards.

use super::direction::Directions;

/// One entry of the tile-type table in a map description.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TileType {
    pub name: String,
    pub exits: Directions,
    pub blocks: bool,
}

impl TileType {
    pub fn new(name: impl Into<String>, exits: Directions, blocks: bool) -> Self {
        TileType { name: name.into(), exits, blocks }
    }
}

/// A single grid cell. Several tiles may share a type; each has its own
/// seen flag.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Tile {
    image_name: String,
    exits: Directions,
    blocks: bool,
    is_seen: bool,
}

impl Tile {
    pub fn new(tile_type: &TileType) -> Self {
        Tile {
            image_name: tile_type.name.clone(),
            exits: tile_type.exits,
            blocks: tile_type.blocks,
            is_seen: false,
        }
    }

    pub fn image_name(&self) -> &str {
        &self.image_name
    }

    pub fn exits(&self) -> Directions {
        self.exits
    }

    /// Does this tile occlude line of sight?
    pub fn blocks(&self) -> bool {
        self.blocks
    }

    pub fn is_seen(&self) -> bool {
        self.is_seen
    }

    /// Raw state change. Notification is the map's job
    /// (see `Map::set_tile_seen`).
    pub(crate) fn set_seen(&mut self, seen: bool) {
        self.is_seen = seen;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiles_from_same_type_are_independent() {
        let grass = TileType::new("grass", Directions::all(), false);
        let mut a = Tile::new(&grass);
        let b = Tile::new(&grass);
        a.set_seen(true);
        assert!(a.is_seen());
        assert!(!b.is_seen());
        assert_eq!(a.image_name(), b.image_name());
    }

    #[test]
    fn tile_copies_type_data() {
        let wall = TileType::new("wall", Directions::empty(), true);
        let t = Tile::new(&wall);
        assert!(t.blocks());
        assert_eq!(t.exits(), Directions::empty());
        assert!(!t.is_seen());
    }
}
