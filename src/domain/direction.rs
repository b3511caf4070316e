/// Compass directions and direction sets.
///
/// A `Direction` names one of the eight compass points. `Directions` is a
/// set over them, used both for tile exits and for the neighbor flags the
/// fog-of-war renderer keys its edge sprites on.

use bitflags::bitflags;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

bitflags! {
    /// Set of compass directions. Bit layout matches `Direction` order.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Directions: u8 {
        const NORTH      = 1 << 0;
        const NORTH_EAST = 1 << 1;
        const EAST       = 1 << 2;
        const SOUTH_EAST = 1 << 3;
        const SOUTH      = 1 << 4;
        const SOUTH_WEST = 1 << 5;
        const WEST       = 1 << 6;
        const NORTH_WEST = 1 << 7;
    }
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// Movement set for this direction: a diagonal becomes its two
    /// cardinal components, since tile exits only carry N/E/S/W.
    pub fn step(self) -> Directions {
        match self {
            Direction::NorthEast => Directions::NORTH | Directions::EAST,
            Direction::SouthEast => Directions::SOUTH | Directions::EAST,
            Direction::SouthWest => Directions::SOUTH | Directions::WEST,
            Direction::NorthWest => Directions::NORTH | Directions::WEST,
            cardinal => cardinal.flag(),
        }
    }

    pub fn flag(self) -> Directions {
        match self {
            Direction::North => Directions::NORTH,
            Direction::NorthEast => Directions::NORTH_EAST,
            Direction::East => Directions::EAST,
            Direction::SouthEast => Directions::SOUTH_EAST,
            Direction::South => Directions::SOUTH,
            Direction::SouthWest => Directions::SOUTH_WEST,
            Direction::West => Directions::WEST,
            Direction::NorthWest => Directions::NORTH_WEST,
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::NorthEast => Direction::SouthWest,
            Direction::East => Direction::West,
            Direction::SouthEast => Direction::NorthWest,
            Direction::South => Direction::North,
            Direction::SouthWest => Direction::NorthEast,
            Direction::West => Direction::East,
            Direction::NorthWest => Direction::SouthEast,
        }
    }

    /// Grid offset `(dx, dy)`; y grows southward.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::NorthEast => (1, -1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, 1),
            Direction::South => (0, 1),
            Direction::SouthWest => (-1, 1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, -1),
        }
    }
}

impl From<Direction> for Directions {
    fn from(dir: Direction) -> Self {
        dir.flag()
    }
}

impl Directions {
    /// Any direction with a northward component.
    pub const NORTHWARD: Directions = Directions::NORTH
        .union(Directions::NORTH_EAST)
        .union(Directions::NORTH_WEST);
    pub const SOUTHWARD: Directions = Directions::SOUTH
        .union(Directions::SOUTH_EAST)
        .union(Directions::SOUTH_WEST);
    pub const EASTWARD: Directions = Directions::EAST
        .union(Directions::NORTH_EAST)
        .union(Directions::SOUTH_EAST);
    pub const WESTWARD: Directions = Directions::WEST
        .union(Directions::NORTH_WEST)
        .union(Directions::SOUTH_WEST);

    /// Parse an exit string such as `"NES"`. Only the letters N, E, S and W
    /// count; anything else is ignored.
    pub fn from_exit_letters(letters: &str) -> Directions {
        letters.chars().fold(Directions::empty(), |acc, ch| {
            acc | match ch {
                'N' => Directions::NORTH,
                'E' => Directions::EAST,
                'S' => Directions::SOUTH,
                'W' => Directions::WEST,
                _ => Directions::empty(),
            }
        })
    }

    /// Inverse of `from_exit_letters` for the cardinal bits. An empty set
    /// writes as `-` so the token survives whitespace splitting.
    pub fn to_exit_letters(self) -> String {
        let mut out = String::new();
        for (flag, ch) in [
            (Directions::NORTH, 'N'),
            (Directions::EAST, 'E'),
            (Directions::SOUTH, 'S'),
            (Directions::WEST, 'W'),
        ] {
            if self.contains(flag) {
                out.push(ch);
            }
        }
        if out.is_empty() {
            out.push('-');
        }
        out
    }
}
