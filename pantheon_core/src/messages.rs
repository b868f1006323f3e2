//! Wire protocol shared by the server and its clients: one JSON object per
//! line over a persistent connection, externally tagged as
//! `{"type": ..., "data": ...}` with camelCase names.

use serde::{Deserialize, Serialize};

use crate::deck::DeckChoice;
use crate::game_state::{GameState, Phase};

/// Direct attacks are encoded as `targetIndex: -1` on the wire.
pub const DIRECT_ATTACK: i64 = -1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ClientMessage {
    SetName { name: String },
    JoinQueue { deck: DeckChoice },
    LeaveQueue,
    PlayCard { hand_index: usize },
    Attack { attacker_index: usize, target_index: i64 },
    EndTurn,
    ChangePhase { phase: Phase },
    DrawCard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ServerMessage {
    Welcome {
        player_id: String,
    },
    NameSet {
        name: String,
    },
    QueueJoined {
        position: usize,
    },
    QueueLeft,
    GameStart {
        session_id: String,
        player_slot: u8,
        opponent_name: String,
        state: GameState,
    },
    GameUpdate {
        state: GameState,
    },
    GameOver {
        winner_id: String,
        winner_name: String,
    },
    Error {
        message: String,
    },
    OpponentDisconnected,
}

/// Out-of-band operational counters; carries no game semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub players: usize,
    pub sessions: usize,
    pub queue_length: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_messages_should_use_camel_case_tags() {
        let json = serde_json::to_string(&ClientMessage::PlayCard { hand_index: 2 }).unwrap();
        assert_eq!(json, r#"{"type":"playCard","data":{"handIndex":2}}"#);

        let json = serde_json::to_string(&ClientMessage::LeaveQueue).unwrap();
        assert_eq!(json, r#"{"type":"leaveQueue"}"#);
    }

    #[test]
    fn attack_should_accept_the_direct_attack_sentinel() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"attack","data":{"attackerIndex":0,"targetIndex":-1}}"#)
                .unwrap();
        assert_eq!(
            msg,
            ClientMessage::Attack {
                attacker_index: 0,
                target_index: DIRECT_ATTACK
            }
        );
    }

    #[test]
    fn join_queue_should_parse_deck_choice() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"joinQueue","data":{"deck":"greek"}}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::JoinQueue {
                deck: DeckChoice::Greek
            }
        );
    }

    #[test]
    fn status_report_should_use_camel_case_fields() {
        let report = StatusReport {
            players: 4,
            sessions: 1,
            queue_length: 2,
        };
        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(json, r#"{"players":4,"sessions":1,"queueLength":2}"#);
    }
}
