//! Game-world value types shared by the client and server crates.
//!
//! These types carry no wire knowledge of their own; the `netmsg` crate
//! decides how they are laid out inside a message.

use serde::{Deserialize, Serialize};

/// A tile coordinate in the game world.
///
/// `x` and `y` address the tile on the map plane, `z` is the floor. Every
/// combination of values is a valid position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: u16,
    pub y: u16,
    pub z: u8,
}

impl Position {
    #[must_use]
    pub const fn new(x: u16, y: u16, z: u8) -> Self {
        Self { x, y, z }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}
