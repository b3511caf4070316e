/// Map: the complete state of a loaded session.
///
/// ## Storage
///
/// Tiles live in one flat row-major arena (`tiles[y * width + x]`), actors
/// in an ordered list. Both are owned solely by the map; tiles and actors
/// are addressed by coordinates and list index, never by reference.
///
/// ## Notification
///
/// Every state change that a view cares about goes through a mutating map
/// method, which then calls the single registered `MapObserver`. The
/// observer is detached for the duration of the call and gets the map
/// read-only, so it can look back into the map without aliasing issues.

use std::fmt;
use std::path::Path;

use crate::domain::actor::Actor;
use crate::domain::direction::{Direction, Directions};
use crate::domain::rules::{self, GridView};
use crate::domain::sight;
use crate::domain::tile::{Tile, TileType};
use crate::sim::error::{LoadError, MapError};
use crate::sim::event::MapObserver;
use crate::sim::level::{self, LevelDef};

/// One neighbor of a cell and the direction it lies in.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Neighbor {
    pub x: usize,
    pub y: usize,
    pub direction: Direction,
}

pub struct Map {
    width: usize,
    height: usize,
    tile_types: Vec<TileType>,
    tiles: Vec<Tile>,
    actors: Vec<Actor>,
    /// Index into `actors`.
    player: usize,
    observer: Option<Box<dyn MapObserver>>,
}

// ── Construction ──

impl Map {
    /// Parse a description (see `sim::level`) and build the map.
    pub fn from_description(text: &str) -> Result<Map, LoadError> {
        Map::from_level(level::parse_description(text)?)
    }

    pub fn load(path: &Path) -> Result<Map, LoadError> {
        level::load_from_path(path)
    }

    /// Resolve tile names and check the map invariants. No notifications
    /// fire during construction.
    pub fn from_level(def: LevelDef) -> Result<Map, LoadError> {
        let LevelDef { tile_types, actors, width, height, grid } = def;

        if width == 0 || height == 0 {
            return Err(LoadError::EmptyGrid { width, height });
        }
        let expected = width.checked_mul(height);
        if expected != Some(grid.len()) {
            return Err(LoadError::GridSizeMismatch {
                expected: expected.unwrap_or(usize::MAX),
                found: grid.len(),
            });
        }

        let mut tiles = Vec::with_capacity(grid.len());
        for (i, name) in grid.iter().enumerate() {
            // Later table entries shadow earlier ones with the same name.
            let tile_type = tile_types
                .iter()
                .rev()
                .find(|t| t.name == *name)
                .ok_or_else(|| LoadError::UnknownTileType {
                    name: name.clone(),
                    x: i % width,
                    y: i / width,
                })?;
            tiles.push(Tile::new(tile_type));
        }

        if actors.is_empty() {
            return Err(LoadError::NoActors);
        }
        let actors = actors
            .into_iter()
            .map(|a| {
                if a.x < width && a.y < height {
                    Ok(Actor::new(a.name, a.x, a.y))
                } else {
                    Err(LoadError::ActorOutOfBounds { name: a.name, x: a.x, y: a.y })
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Map {
            width,
            height,
            tile_types,
            tiles,
            actors,
            player: 0,
            observer: None,
        })
    }

    /// Serialize back to the description format.
    pub fn to_description(&self) -> String {
        level::write_description(self)
    }
}

impl fmt::Debug for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Map")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("tile_types", &self.tile_types.len())
            .field("actors", &self.actors)
            .field("player", &self.player)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

// ── Grid queries ──

impl Map {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tile_types(&self) -> &[TileType] {
        &self.tile_types
    }

    /// Read-only view for the pure rule and sight functions.
    #[inline]
    pub fn grid(&self) -> GridView<'_> {
        GridView { tiles: &self.tiles, width: self.width, height: self.height }
    }

    #[inline]
    pub fn tile_at(&self, x: usize, y: usize) -> Option<&Tile> {
        self.grid().tile_at(x, y)
    }

    /// Like `tile_at`, but out-of-range coordinates are an error.
    pub fn try_tile_at(&self, x: usize, y: usize) -> Result<&Tile, MapError> {
        self.tile_at(x, y).ok_or(MapError::OutOfBounds { x, y })
    }

    pub fn seen_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_seen()).count()
    }

    /// In-bounds compass neighbors of `(x, y)`.
    /// Order: W, N, NW, NE, S, E, SE, SW.
    pub fn neighbors_at(&self, x: usize, y: usize) -> Vec<Neighbor> {
        let mut out = Vec::with_capacity(8);
        if x >= self.width || y >= self.height {
            return out;
        }
        let has_w = x > 0;
        let has_n = y > 0;
        let has_e = x + 1 < self.width;
        let has_s = y + 1 < self.height;

        let mut push = |ok: bool, direction: Direction| {
            if ok {
                let (dx, dy) = direction.offset();
                out.push(Neighbor {
                    x: x.wrapping_add_signed(dx as isize),
                    y: y.wrapping_add_signed(dy as isize),
                    direction,
                });
            }
        };
        push(has_w, Direction::West);
        push(has_n, Direction::North);
        push(has_w && has_n, Direction::NorthWest);
        push(has_e && has_n, Direction::NorthEast);
        push(has_s, Direction::South);
        push(has_e, Direction::East);
        push(has_e && has_s, Direction::SouthEast);
        push(has_w && has_s, Direction::SouthWest);
        out
    }

    /// Directions of the already-seen neighbors of `(x, y)`.
    /// The view picks fog-of-war edge sprites from this.
    pub fn seen_neighbor_flags_at(&self, x: usize, y: usize) -> Directions {
        self.neighbors_at(x, y)
            .into_iter()
            .filter(|n| self.tile_at(n.x, n.y).is_some_and(Tile::is_seen))
            .fold(Directions::empty(), |acc, n| acc | n.direction.flag())
    }

    /// Every in-bounds cell within Euclidean distance `radius` of `(cx, cy)`.
    pub fn neighbors_at_in_radius(&self, cx: usize, cy: usize, radius: usize) -> Vec<(usize, usize)> {
        sight::cells_in_radius(&self.grid(), cx, cy, radius)
    }

    /// Nearest blocking tile on the line from `from` to `to` that is closer
    /// to `from` than both `max_distance` and `to`. `None` means a clear view.
    pub fn tile_obscuring_view_between_tiles(
        &self,
        from: (usize, usize),
        to: (usize, usize),
        max_distance: f64,
    ) -> Option<(usize, usize)> {
        sight::obscuring_cell(&self.grid(), from, to, max_distance)
    }
}

// ── Actors ──

impl Map {
    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    pub fn actor_at_index(&self, index: usize) -> Option<&Actor> {
        self.actors.get(index)
    }

    /// Position of this exact actor in the list (identity, not equality).
    pub fn index_of_actor(&self, actor: &Actor) -> Option<usize> {
        self.actors.iter().position(|a| std::ptr::eq(a, actor))
    }

    pub fn player(&self) -> &Actor {
        &self.actors[self.player]
    }

    pub fn player_index(&self) -> usize {
        self.player
    }

    /// Try one step. A refused step is a silent no-op: the actor stays put,
    /// no notification fires, and `false` comes back.
    pub fn move_actor_in_direction(&mut self, index: usize, direction: impl Into<Directions>) -> bool {
        let direction = direction.into();
        let Some(actor) = self.actors.get(index) else {
            tracing::debug!(index, "move ignored: no such actor");
            return false;
        };
        let (x, y) = actor.position();

        let step = rules::resolve_step(&self.grid(), x, y, direction);
        match step {
            Ok((nx, ny)) => {
                let actor = &mut self.actors[index];
                actor.x = nx;
                actor.y = ny;
                tracing::debug!(index, from = ?(x, y), to = ?(nx, ny), "actor moved");
                self.notify_actor_changed(index);
                true
            }
            Err(reason) => {
                tracing::debug!(index, at = ?(x, y), ?direction, ?reason, "move refused");
                false
            }
        }
    }

    pub fn move_player(&mut self, direction: impl Into<Directions>) -> bool {
        self.move_actor_in_direction(self.player, direction)
    }

    /// Place an actor directly, bypassing exit rules.
    pub fn set_actor_position(&mut self, index: usize, x: usize, y: usize) -> Result<(), MapError> {
        if x >= self.width || y >= self.height {
            return Err(MapError::OutOfBounds { x, y });
        }
        let actor = self.actors.get_mut(index).ok_or(MapError::NoSuchActor(index))?;
        actor.x = x;
        actor.y = y;
        self.notify_actor_changed(index);
        Ok(())
    }

    pub fn set_actor_sight_radius(&mut self, index: usize, radius: usize) -> Result<(), MapError> {
        let actor = self.actors.get_mut(index).ok_or(MapError::NoSuchActor(index))?;
        actor.sight_radius = radius;
        self.notify_actor_changed(index);
        Ok(())
    }
}

// ── Fog of war ──

impl Map {
    /// Set a tile's seen flag. Notifies the tile itself, then every
    /// neighbor that is already seen so its fog edge can be redrawn.
    pub fn set_tile_seen(&mut self, x: usize, y: usize, seen: bool) -> Result<(), MapError> {
        if x >= self.width || y >= self.height {
            return Err(MapError::OutOfBounds { x, y });
        }
        let width = self.width;
        self.tiles[y * width + x].set_seen(seen);
        self.notify_tile_changed(x, y);

        for n in self.neighbors_at(x, y) {
            if self.tiles[n.y * width + n.x].is_seen() {
                self.notify_tile_changed(n.x, n.y);
            }
        }
        Ok(())
    }
}

// ── Observer plumbing ──

impl Map {
    /// Register the observer, replacing any previous one.
    pub fn set_observer(&mut self, observer: Box<dyn MapObserver>) {
        self.observer = Some(observer);
    }

    pub fn clear_observer(&mut self) -> Option<Box<dyn MapObserver>> {
        self.observer.take()
    }

    fn notify_tile_changed(&mut self, x: usize, y: usize) {
        if let Some(mut observer) = self.observer.take() {
            observer.on_tile_changed(self, x, y);
            self.observer = Some(observer);
        }
    }

    fn notify_actor_changed(&mut self, index: usize) {
        if let Some(mut observer) = self.observer.take() {
            observer.on_actor_changed(self, index);
            self.observer = Some(observer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::event::{EventLog, MapEvent};

    /// 3x3 of open floor, player in the middle.
    const OPEN_3X3: &str = "
        1
        floor NESW .
        1
        hero 1 1
        3 3
        floor floor floor
        floor floor floor
        floor floor floor
    ";

    fn watched(text: &str) -> (Map, EventLog) {
        let mut map = Map::from_description(text).unwrap();
        let log = EventLog::new();
        map.set_observer(Box::new(log.clone()));
        (map, log)
    }

    // ── Loading ──

    #[test]
    fn load_reads_back_the_description() {
        let text = "
            3
            grass NESW .
            rock  -    X
            gate  NS   .
            2
            hero 0 1
            imp  2 0
            3 2
            grass rock gate
            gate  grass rock
        ";
        let map = Map::from_description(text).unwrap();
        assert_eq!((map.width(), map.height()), (3, 2));
        let names: Vec<_> = (0..2)
            .flat_map(|y| (0..3).map(move |x| (x, y)))
            .map(|(x, y)| map.tile_at(x, y).unwrap().image_name().to_string())
            .collect();
        assert_eq!(names, ["grass", "rock", "gate", "gate", "grass", "rock"]);
        assert_eq!(map.actor_count(), 2);
        assert_eq!(map.actor_at_index(1).unwrap().position(), (2, 0));
        assert_eq!(map.player().image_name(), "hero");
        assert_eq!(map.player().position(), (0, 1));
        assert!(map.tile_at(1, 0).unwrap().blocks());
        assert_eq!(map.seen_count(), 0);
    }

    #[test]
    fn description_round_trip_keeps_actors() {
        let map = Map::from_description("1 f NESW . 2 a 0 0 b 1 0 2 1 f f").unwrap();
        let again = Map::from_description(&map.to_description()).unwrap();
        let positions: Vec<_> = again.actors().iter().map(|a| (a.image_name(), a.position())).collect();
        assert_eq!(positions, vec![("a", (0, 0)), ("b", (1, 0))]);
    }

    #[test]
    fn unknown_tile_type_fails_fast() {
        let err = Map::from_description("1 floor NESW . 1 hero 0 0 2 1 floor lava").unwrap_err();
        match err {
            LoadError::UnknownTileType { name, x, y } => {
                assert_eq!(name, "lava");
                assert_eq!((x, y), (1, 0));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn invariants_checked_at_load() {
        let err = Map::from_description("1 floor NESW . 0 1 1 floor").unwrap_err();
        assert!(matches!(err, LoadError::NoActors));

        let err = Map::from_description("1 floor NESW . 1 hero 4 0 1 1 floor").unwrap_err();
        assert!(matches!(err, LoadError::ActorOutOfBounds { x: 4, .. }));

        let err = Map::from_description("1 floor NESW . 1 hero 0 0 0 3").unwrap_err();
        assert!(matches!(err, LoadError::EmptyGrid { width: 0, height: 3 }));
    }

    #[test]
    fn grid_must_fill_every_cell() {
        let def = LevelDef {
            tile_types: vec![TileType::new("floor", Directions::from_exit_letters("NESW"), false)],
            actors: vec![level::ActorDef { name: "hero".into(), x: 0, y: 0 }],
            width: 2,
            height: 2,
            grid: vec!["floor".into()],
        };
        let err = Map::from_level(def).unwrap_err();
        assert!(matches!(err, LoadError::GridSizeMismatch { expected: 4, found: 1 }));
    }

    #[test]
    fn out_of_range_tile_query() {
        let map = Map::from_description(OPEN_3X3).unwrap();
        assert!(map.tile_at(3, 0).is_none());
        assert_eq!(map.try_tile_at(0, 3).unwrap_err(), MapError::OutOfBounds { x: 0, y: 3 });
        assert!(map.try_tile_at(2, 2).is_ok());
    }

    #[test]
    fn index_of_actor_uses_identity() {
        let map = Map::from_description("1 f NESW . 2 a 0 0 a 0 0 1 1 f").unwrap();
        let second = map.actor_at_index(1).unwrap();
        assert_eq!(map.index_of_actor(second), Some(1));
        let copy = second.clone();
        assert_eq!(map.index_of_actor(&copy), None);
    }

    // ── Neighbors ──

    #[test]
    fn neighbors_are_exactly_the_in_bounds_cells() {
        let map = Map::from_description(OPEN_3X3).unwrap();
        for y in 0..3usize {
            for x in 0..3usize {
                let ns = map.neighbors_at(x, y);
                let mut got: Vec<_> = ns.iter().map(|n| (n.x, n.y)).collect();
                got.sort();
                let mut want = vec![];
                for ny in y.saturating_sub(1)..=(y + 1).min(2) {
                    for nx in x.saturating_sub(1)..=(x + 1).min(2) {
                        if (nx, ny) != (x, y) {
                            want.push((nx, ny));
                        }
                    }
                }
                want.sort();
                assert_eq!(got, want, "neighbors of ({x},{y})");

                // Symmetry: I am my neighbor's neighbor in the opposite direction.
                for n in &ns {
                    let back = map.neighbors_at(n.x, n.y);
                    assert!(back.iter().any(|b| (b.x, b.y) == (x, y)
                        && b.direction == n.direction.opposite()));
                }
            }
        }
    }

    #[test]
    fn neighbor_order_in_the_middle() {
        let map = Map::from_description(OPEN_3X3).unwrap();
        let dirs: Vec<_> = map.neighbors_at(1, 1).iter().map(|n| n.direction).collect();
        assert_eq!(
            dirs,
            [
                Direction::West,
                Direction::North,
                Direction::NorthWest,
                Direction::NorthEast,
                Direction::South,
                Direction::East,
                Direction::SouthEast,
                Direction::SouthWest,
            ]
        );
    }

    #[test]
    fn seen_neighbor_flags() {
        let mut map = Map::from_description(OPEN_3X3).unwrap();
        map.set_tile_seen(0, 0, true).unwrap();
        map.set_tile_seen(2, 1, true).unwrap();
        assert_eq!(
            map.seen_neighbor_flags_at(1, 1),
            Directions::NORTH_WEST | Directions::EAST
        );
        assert_eq!(map.seen_neighbor_flags_at(0, 2), Directions::empty());
    }

    // ── Movement ──

    #[test]
    fn north_then_south_returns_home() {
        let (mut map, log) = watched(OPEN_3X3);
        assert!(map.move_player(Direction::North));
        assert_eq!(map.player().position(), (1, 0));
        assert!(map.move_player(Direction::South));
        assert_eq!(map.player().position(), (1, 1));
        assert_eq!(
            log.drain(),
            vec![MapEvent::ActorChanged { index: 0 }, MapEvent::ActorChanged { index: 0 }]
        );
    }

    #[test]
    fn east_edge_is_a_no_op() {
        let (mut map, log) = watched(OPEN_3X3);
        map.set_actor_position(0, 2, 1).unwrap();
        log.drain();
        assert!(!map.move_player(Direction::East));
        assert_eq!(map.player().position(), (2, 1));
        assert!(log.is_empty());
    }

    #[test]
    fn diagonal_key_steps_both_axes() {
        let (mut map, log) = watched(OPEN_3X3);
        assert!(map.move_player(Direction::NorthEast.step()));
        assert_eq!(map.player().position(), (2, 0));
        assert_eq!(log.drain(), vec![MapEvent::ActorChanged { index: 0 }]);
    }

    #[test]
    fn refused_exit_changes_nothing() {
        let text = "2 floor NESW . hall EW . 1 hero 1 1 3 3
                    floor floor floor
                    floor hall  floor
                    floor floor floor";
        let (mut map, log) = watched(text);
        for dir in [Direction::North, Direction::South] {
            assert!(!map.move_player(dir));
            assert_eq!(map.player().position(), (1, 1));
        }
        assert!(log.is_empty());
        assert!(map.move_player(Direction::West));
        assert_eq!(map.player().position(), (0, 1));
    }

    #[test]
    fn missing_reciprocal_exit_refuses() {
        // Origin opens east; its east neighbor has no west exit.
        let text = "2 floor NESW . shut NES . 1 hero 0 0 2 1 floor shut";
        let (mut map, log) = watched(text);
        assert!(map.tile_at(0, 0).unwrap().exits().contains(Directions::EAST));
        assert!(!map.move_player(Direction::East));
        assert_eq!(map.player().position(), (0, 0));
        assert!(log.is_empty());
    }

    #[test]
    fn moving_unknown_actor_is_ignored() {
        let (mut map, log) = watched(OPEN_3X3);
        assert!(!map.move_actor_in_direction(7, Direction::North));
        assert!(log.is_empty());
    }

    #[test]
    fn set_actor_position_checks_bounds() {
        let mut map = Map::from_description(OPEN_3X3).unwrap();
        assert_eq!(map.set_actor_position(0, 3, 0), Err(MapError::OutOfBounds { x: 3, y: 0 }));
        assert_eq!(map.set_actor_position(4, 0, 0), Err(MapError::NoSuchActor(4)));
        assert_eq!(map.player().position(), (1, 1));
    }

    // ── Fog of war ──

    #[test]
    fn set_seen_notifies_tile_and_seen_neighbors_only() {
        let (mut map, log) = watched(OPEN_3X3);
        map.set_tile_seen(0, 0, true).unwrap();
        map.set_tile_seen(2, 2, true).unwrap();
        log.drain();

        map.set_tile_seen(1, 1, true).unwrap();
        let events = log.drain();
        assert_eq!(events[0], MapEvent::TileChanged { x: 1, y: 1 });
        let mut rest: Vec<_> = events[1..].to_vec();
        rest.sort_by_key(|e| match e {
            MapEvent::TileChanged { x, y } => (*x, *y),
            MapEvent::ActorChanged { .. } => (usize::MAX, usize::MAX),
        });
        assert_eq!(
            rest,
            vec![MapEvent::TileChanged { x: 0, y: 0 }, MapEvent::TileChanged { x: 2, y: 2 }]
        );
    }

    #[test]
    fn set_seen_out_of_bounds() {
        let (mut map, log) = watched(OPEN_3X3);
        assert!(map.set_tile_seen(9, 9, true).is_err());
        assert!(log.is_empty());
    }

    // ── Re-entrant observer ──

    struct EdgeProbe {
        flags: std::rc::Rc<std::cell::RefCell<Vec<Directions>>>,
    }

    impl MapObserver for EdgeProbe {
        fn on_tile_changed(&mut self, map: &Map, x: usize, y: usize) {
            self.flags.borrow_mut().push(map.seen_neighbor_flags_at(x, y));
        }

        fn on_actor_changed(&mut self, _map: &Map, _index: usize) {}
    }

    #[test]
    fn observer_can_read_the_map() {
        let mut map = Map::from_description(OPEN_3X3).unwrap();
        let flags = std::rc::Rc::new(std::cell::RefCell::new(vec![]));
        map.set_observer(Box::new(EdgeProbe { flags: flags.clone() }));
        map.set_tile_seen(1, 1, true).unwrap();
        map.set_tile_seen(1, 0, true).unwrap();
        // Last two callbacks: (1,0) itself, then its seen neighbor (1,1).
        let got = flags.borrow();
        assert_eq!(got[got.len() - 2], Directions::SOUTH);
        assert_eq!(got[got.len() - 1], Directions::NORTH);
    }
}
