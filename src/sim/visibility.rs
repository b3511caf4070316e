/// Sight pass: marks the tiles an actor can currently see.
///
/// Candidates are the cells within the actor's sight radius; a candidate
/// is visible when no blocking tile sits on the line between it and the
/// actor. Tiles stay seen once revealed.

use crate::sim::error::MapError;
use crate::sim::map::Map;

/// Reveal everything actor `index` can see. Returns how many tiles were
/// newly marked seen.
pub fn reveal_from_actor(map: &mut Map, index: usize) -> Result<usize, MapError> {
    let actor = map.actor_at_index(index).ok_or(MapError::NoSuchActor(index))?;
    let origin = actor.position();
    let radius = actor.sight_radius();

    let visible: Vec<(usize, usize)> = map
        .neighbors_at_in_radius(origin.0, origin.1, radius)
        .into_iter()
        .filter(|&cell| {
            map.tile_at(cell.0, cell.1).is_some_and(|t| !t.is_seen())
                && map.tile_obscuring_view_between_tiles(origin, cell, radius as f64).is_none()
        })
        .collect();

    for &(x, y) in &visible {
        map.set_tile_seen(x, y, true)?;
    }

    tracing::debug!(index, at = ?origin, radius, revealed = visible.len(), "sight pass");
    Ok(visible.len())
}

pub fn reveal_from_player(map: &mut Map) -> usize {
    let index = map.player_index();
    // The player index always refers to a live actor.
    reveal_from_actor(map, index).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::event::{EventLog, MapEvent};

    const ROOM: &str = "
        2
        floor NESW .
        wall  -    X
        1
        hero 0 2
        5 5
        floor floor floor floor floor
        floor floor floor floor floor
        floor floor wall  floor floor
        floor floor floor floor floor
        floor floor floor floor floor
    ";

    fn seen_grid(map: &Map) -> Vec<String> {
        (0..map.height())
            .map(|y| {
                (0..map.width())
                    .map(|x| if map.tile_at(x, y).unwrap().is_seen() { 'o' } else { '.' })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn wall_hides_what_is_behind_it() {
        let mut map = Map::from_description(ROOM).unwrap();
        map.set_actor_sight_radius(0, 4).unwrap();
        reveal_from_actor(&mut map, 0).unwrap();
        let g = seen_grid(&map);
        // The wall itself is visible, the cells behind it on the row are not.
        assert_eq!(&g[2][..], "ooo..");
        assert!(map.tile_at(2, 2).unwrap().is_seen());
        assert!(!map.tile_at(3, 2).unwrap().is_seen());
    }

    #[test]
    fn default_radius_is_a_small_disc() {
        let mut map = Map::from_description(ROOM).unwrap();
        let n = reveal_from_player(&mut map);
        // Radius 2 from (0,2): column 0 rows 0..=4, column 1 rows 1..=3, (2,2).
        assert_eq!(n, 9);
        assert_eq!(
            seen_grid(&map),
            vec!["o....", "oo...", "ooo..", "oo...", "o...."]
        );
    }

    #[test]
    fn second_pass_reveals_nothing_new() {
        let mut map = Map::from_description(ROOM).unwrap();
        let log = EventLog::new();
        map.set_observer(Box::new(log.clone()));
        assert!(reveal_from_player(&mut map) > 0);
        assert!(log.drain().iter().all(|e| matches!(e, MapEvent::TileChanged { .. })));
        assert_eq!(reveal_from_player(&mut map), 0);
        assert!(log.is_empty());
    }

    #[test]
    fn unknown_actor() {
        let mut map = Map::from_description(ROOM).unwrap();
        assert_eq!(reveal_from_actor(&mut map, 3), Err(MapError::NoSuchActor(3)));
    }
}
