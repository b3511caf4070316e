/// Actors: movable entities on the grid.
/// The player is not a separate type; the map marks one actor as the player.

pub const DEFAULT_SIGHT_RADIUS: usize = 2;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Actor {
    image_name: String,
    pub(crate) x: usize,
    pub(crate) y: usize,
    pub(crate) sight_radius: usize,
}

impl Actor {
    pub fn new(image_name: impl Into<String>, x: usize, y: usize) -> Self {
        Actor {
            image_name: image_name.into(),
            x,
            y,
            sight_radius: DEFAULT_SIGHT_RADIUS,
        }
    }

    pub fn image_name(&self) -> &str {
        &self.image_name
    }

    pub fn x(&self) -> usize {
        self.x
    }

    pub fn y(&self) -> usize {
        self.y
    }

    pub fn position(&self) -> (usize, usize) {
        (self.x, self.y)
    }

    pub fn sight_radius(&self) -> usize {
        self.sight_radius
    }
}
