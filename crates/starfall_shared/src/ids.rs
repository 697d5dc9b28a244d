//! Entity identifiers shared by the AI engine, the event bus and the pools.

use serde::{Deserialize, Serialize};

/// Identifier of an AI-controlled enemy. Never reused within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct EnemyId(pub u32);

impl std::fmt::Display for EnemyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "enemy#{}", self.0)
    }
}

/// Anything that can be damaged or destroyed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityRef {
    /// The player ship.
    Player,
    /// An AI enemy.
    Enemy(EnemyId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enemy_id_display() {
        assert_eq!(EnemyId(7).to_string(), "enemy#7");
        assert_ne!(EntityRef::Enemy(EnemyId(1)), EntityRef::Player);
    }
}
