use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::player::Player;

/// Turn phases. The graph is Draw -> Main (automatic on a successful draw),
/// Main <-> Battle, Main/Battle -> End, End -> Draw of the other player.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    Draw,
    Main,
    Battle,
    End,
}

/// One active match. Mutated exclusively through the operations in
/// `game_logic` for its entire life.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub id: String,
    pub player1: Player,
    pub player2: Player,
    pub current_turn: String,
    pub turn_count: u32,
    pub phase: Phase,
    pub game_over: bool,
    pub winner: Option<String>,
    /// Display only, never authoritative.
    pub last_action: String,
}

impl GameState {
    pub fn player(&self, player_id: &str) -> Option<&Player> {
        if self.player1.id == player_id {
            Some(&self.player1)
        } else if self.player2.id == player_id {
            Some(&self.player2)
        } else {
            None
        }
    }

    pub fn opponent(&self, player_id: &str) -> Option<&Player> {
        if self.player1.id == player_id {
            Some(&self.player2)
        } else if self.player2.id == player_id {
            Some(&self.player1)
        } else {
            None
        }
    }

    pub fn is_turn(&self, player_id: &str) -> bool {
        self.current_turn == player_id
    }

    /// Read-only copy for broadcasting. The transport layer must never feed
    /// a snapshot back into the engine.
    pub fn snapshot(&self) -> GameState {
        self.clone()
    }

    /// The acting player and their opponent, in that order.
    pub(crate) fn pair_mut(&mut self, player_id: &str) -> Option<(&mut Player, &mut Player)> {
        if self.player1.id == player_id {
            Some((&mut self.player1, &mut self.player2))
        } else if self.player2.id == player_id {
            Some((&mut self.player2, &mut self.player1))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> GameState {
        GameState {
            id: "game_1".to_string(),
            player1: Player::new("p1", "Alice", vec![]),
            player2: Player::new("p2", "Bob", vec![]),
            current_turn: "p1".to_string(),
            turn_count: 1,
            phase: Phase::Main,
            game_over: false,
            winner: None,
            last_action: String::new(),
        }
    }

    #[test]
    fn player_should_resolve_either_participant() {
        let state = state();
        assert_eq!(state.player("p1").map(|p| p.name.as_str()), Some("Alice"));
        assert_eq!(state.player("p2").map(|p| p.name.as_str()), Some("Bob"));
        assert!(state.player("p3").is_none());
    }

    #[test]
    fn opponent_should_resolve_the_other_participant() {
        let state = state();
        assert_eq!(state.opponent("p1").map(|p| p.id.as_str()), Some("p2"));
        assert_eq!(state.opponent("p2").map(|p| p.id.as_str()), Some("p1"));
        assert!(state.opponent("p3").is_none());
    }

    #[test]
    fn pair_mut_should_return_actor_first() {
        let mut state = state();
        let (actor, other) = state.pair_mut("p2").unwrap();
        assert_eq!(actor.id, "p2");
        assert_eq!(other.id, "p1");
    }
}
