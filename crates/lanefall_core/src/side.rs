//! Side affiliation for combat entities.

use serde::{Deserialize, Serialize};

use crate::math::Vec2Fixed;

/// Which of the two opposing target pools an entity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    /// The human player, advancing toward +X.
    Player,
    /// The AI opponent, advancing toward -X.
    Enemy,
}

impl Side {
    /// Both sides, in registry scan order.
    pub const ALL: [Side; 2] = [Side::Player, Side::Enemy];

    /// The side this side fights against.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Player => Self::Enemy,
            Self::Enemy => Self::Player,
        }
    }

    /// Direction units of this side walk when they have no target.
    #[must_use]
    pub const fn default_heading(self) -> Vec2Fixed {
        match self {
            Self::Player => Vec2Fixed::RIGHT,
            Self::Enemy => Vec2Fixed::LEFT,
        }
    }

    /// Short display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Enemy => "enemy",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponent_is_involution() {
        for side in Side::ALL {
            assert_ne!(side, side.opponent());
            assert_eq!(side, side.opponent().opponent());
        }
    }

    #[test]
    fn test_default_headings_face_each_other() {
        assert_eq!(Side::Player.default_heading(), Vec2Fixed::RIGHT);
        assert_eq!(Side::Enemy.default_heading(), Vec2Fixed::LEFT);
    }
}
