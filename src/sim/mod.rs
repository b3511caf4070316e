pub mod error;
pub mod event;
pub mod level;
pub mod map;
pub mod visibility;
