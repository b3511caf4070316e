pub mod actor;
pub mod direction;
pub mod rules;
pub mod sight;
pub mod tile;
