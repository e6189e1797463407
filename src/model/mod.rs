//! Domain entities and their wire representations.

pub mod entity;
pub mod wire;

pub use entity::*;
pub use wire::*;
