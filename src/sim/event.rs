/// Change notifications emitted by the map.
/// The presentation layer consumes these to redraw cells and sprites.

use std::cell::RefCell;
use std::rc::Rc;

use super::map::Map;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MapEvent {
    TileChanged { x: usize, y: usize },
    ActorChanged { index: usize },
}

/// Single subscriber for map changes.
///
/// Callbacks run synchronously inside the mutating call. The map is handed
/// back read-only, so an observer may query it (neighbor flags, actor
/// positions) while it is being notified.
pub trait MapObserver {
    fn on_tile_changed(&mut self, map: &Map, x: usize, y: usize);
    fn on_actor_changed(&mut self, map: &Map, index: usize);
}

/// Observer that queues events for the caller to drain after a mutation.
/// Clones share the same queue.
#[derive(Clone, Default, Debug)]
pub struct EventLog {
    events: Rc<RefCell<Vec<MapEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<MapEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

impl MapObserver for EventLog {
    fn on_tile_changed(&mut self, _map: &Map, x: usize, y: usize) {
        self.events.borrow_mut().push(MapEvent::TileChanged { x, y });
    }

    fn on_actor_changed(&mut self, _map: &Map, index: usize) {
        self.events.borrow_mut().push(MapEvent::ActorChanged { index });
    }
}
