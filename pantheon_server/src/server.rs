//! Session registry: owns every connected client, the waiting queue and all
//! active sessions. Each session has its own exclusive region; the queue and
//! the registry maps have theirs, held only for the duration of a map or
//! list mutation and never across an engine call.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{error, info};
use tokio::sync::{mpsc, Mutex};
use tokio::time;

use pantheon_core::deck::DeckChoice;
use pantheon_core::game_logic::RuleError;
use pantheon_core::game_state::GameState;
use pantheon_core::messages::{ClientMessage, ServerMessage, StatusReport, DIRECT_ATTACK};

use crate::matchmaking::MatchQueue;

const MATCHMAKING_TICK: Duration = Duration::from_millis(100);

pub type Outbox = mpsc::UnboundedSender<ServerMessage>;

/// A connected client. The outbox feeds the connection's writer task, so
/// sending never blocks on the socket.
pub struct ClientHandle {
    pub id: String,
    name: Mutex<String>,
    deck_choice: Mutex<Option<DeckChoice>>,
    session: Mutex<Option<String>>,
    outbox: Outbox,
}

impl ClientHandle {
    pub fn send(&self, msg: ServerMessage) {
        // A failed send means the writer task is gone; the read loop will
        // notice the closed socket and run the disconnect path.
        let _ = self.outbox.send(msg);
    }

    pub async fn display_name(&self) -> String {
        let name = self.name.lock().await;
        if name.is_empty() {
            self.id.clone()
        } else {
            name.clone()
        }
    }
}

/// One active match: exactly one game state behind one exclusive region.
pub struct Session {
    pub id: String,
    state: Mutex<GameState>,
    players: [Arc<ClientHandle>; 2],
}

impl Session {
    fn other(&self, player_id: &str) -> &Arc<ClientHandle> {
        if self.players[0].id == player_id {
            &self.players[1]
        } else {
            &self.players[0]
        }
    }

    fn broadcast(&self, msg: ServerMessage) {
        for player in &self.players {
            player.send(msg.clone());
        }
    }
}

pub struct GameServer {
    clients: Mutex<HashMap<String, Arc<ClientHandle>>>,
    sessions: Mutex<HashMap<String, Arc<Session>>>,
    queue: Mutex<MatchQueue<Arc<ClientHandle>>>,
    next_id: AtomicU64,
}

impl GameServer {
    pub fn new() -> Self {
        GameServer {
            clients: Mutex::new(HashMap::new()),
            sessions: Mutex::new(HashMap::new()),
            queue: Mutex::new(MatchQueue::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Registers a fresh connection and greets it.
    pub async fn register(&self, outbox: Outbox) -> Arc<ClientHandle> {
        let id = format!("player_{}", self.next_id.fetch_add(1, Ordering::Relaxed));
        let client = Arc::new(ClientHandle {
            id: id.clone(),
            name: Mutex::new(String::new()),
            deck_choice: Mutex::new(None),
            session: Mutex::new(None),
            outbox,
        });
        self.clients.lock().await.insert(id, client.clone());
        client.send(ServerMessage::Welcome {
            player_id: client.id.clone(),
        });
        client
    }

    pub async fn handle_message(&self, client: &Arc<ClientHandle>, msg: ClientMessage) {
        match msg {
            ClientMessage::SetName { name } => {
                *client.name.lock().await = name.clone();
                client.send(ServerMessage::NameSet { name });
            }
            ClientMessage::JoinQueue { deck } => self.join_queue(client, deck).await,
            ClientMessage::LeaveQueue => self.leave_queue(client).await,
            ClientMessage::PlayCard { hand_index } => {
                self.with_session(client, |state, id| state.play_card(id, hand_index))
                    .await;
            }
            ClientMessage::Attack {
                attacker_index,
                target_index,
            } => {
                let target = match target_index {
                    DIRECT_ATTACK => None,
                    i if i >= 0 => Some(i as usize),
                    _ => {
                        client.send(ServerMessage::Error {
                            message: RuleError::InvalidTargetIndex.to_string(),
                        });
                        return;
                    }
                };
                self.with_session(client, move |state, id| {
                    state.attack(id, attacker_index, target)
                })
                .await;
            }
            ClientMessage::EndTurn => {
                self.with_session(client, |state, id| state.end_turn(id)).await;
            }
            ClientMessage::ChangePhase { phase } => {
                self.with_session(client, move |state, id| state.change_phase(id, phase))
                    .await;
            }
            ClientMessage::DrawCard => {
                self.with_session(client, |state, id| state.draw_card(id).map(|_| ()))
                    .await;
            }
        }
    }

    async fn join_queue(&self, client: &Arc<ClientHandle>, deck: DeckChoice) {
        *client.deck_choice.lock().await = Some(deck);
        let position = self.queue.lock().await.join(&client.id, client.clone());
        client.send(ServerMessage::QueueJoined { position });
    }

    async fn leave_queue(&self, client: &Arc<ClientHandle>) {
        self.queue.lock().await.leave(&client.id);
        client.send(ServerMessage::QueueLeft);
    }

    /// Recurring background task pairing waiting players.
    pub async fn run_matchmaking(self: Arc<Self>) {
        let mut interval = time::interval(MATCHMAKING_TICK);
        loop {
            interval.tick().await;
            self.try_match().await;
        }
    }

    /// Pairs the two longest-waiting players, if any. The queue lock is
    /// released before the match is created.
    pub async fn try_match(&self) {
        let pair = self.queue.lock().await.pop_pair();
        if let Some(((_, first), (_, second))) = pair {
            self.create_session(first, second).await;
        }
    }

    async fn create_session(&self, first: Arc<ClientHandle>, second: Arc<ClientHandle>) {
        let id = format!("game_{}", self.next_id.fetch_add(1, Ordering::Relaxed));
        let deck1 = (*first.deck_choice.lock().await)
            .unwrap_or(DeckChoice::Egyptian)
            .build();
        let deck2 = (*second.deck_choice.lock().await)
            .unwrap_or(DeckChoice::Egyptian)
            .build();
        let name1 = first.display_name().await;
        let name2 = second.display_name().await;

        let state = match GameState::create_match(
            &id,
            (&first.id, &name1),
            deck1,
            (&second.id, &name2),
            deck2,
            &mut rand::thread_rng(),
        ) {
            Ok(state) => state,
            Err(err) => {
                error!("failed to create session {}: {}", id, err);
                return;
            }
        };

        *first.session.lock().await = Some(id.clone());
        *second.session.lock().await = Some(id.clone());
        let session = Arc::new(Session {
            id: id.clone(),
            state: Mutex::new(state.clone()),
            players: [first.clone(), second.clone()],
        });
        self.sessions.lock().await.insert(id.clone(), session);

        first.send(ServerMessage::GameStart {
            session_id: id.clone(),
            player_slot: 1,
            opponent_name: name2.clone(),
            state: state.clone(),
        });
        second.send(ServerMessage::GameStart {
            session_id: id.clone(),
            player_slot: 2,
            opponent_name: name1.clone(),
            state,
        });
        info!("session {} started: {} vs {}", id, name1, name2);
    }

    /// Runs one engine operation under the session's exclusive region. On
    /// success both participants get the new state; on failure only the
    /// caller hears about it.
    async fn with_session<F>(&self, client: &Arc<ClientHandle>, op: F)
    where
        F: FnOnce(&mut GameState, &str) -> Result<(), RuleError>,
    {
        let session = match self.session_of(client).await {
            Some(session) => session,
            None => {
                client.send(ServerMessage::Error {
                    message: "no active game".to_string(),
                });
                return;
            }
        };

        let (snapshot, finished) = {
            let mut state = session.state.lock().await;
            match op(&mut state, &client.id) {
                Ok(()) => (state.snapshot(), state.game_over),
                Err(err) => {
                    client.send(ServerMessage::Error {
                        message: err.to_string(),
                    });
                    return;
                }
            }
        };

        session.broadcast(ServerMessage::GameUpdate {
            state: snapshot.clone(),
        });
        if finished {
            self.finish_session(&session, &snapshot).await;
        }
    }

    async fn session_of(&self, client: &Arc<ClientHandle>) -> Option<Arc<Session>> {
        let session_id = client.session.lock().await.clone()?;
        self.sessions.lock().await.get(&session_id).cloned()
    }

    /// Final notification plus registry removal once the engine has flagged
    /// the game as decided.
    async fn finish_session(&self, session: &Arc<Session>, state: &GameState) {
        let winner_id = state.winner.clone().unwrap_or_default();
        let mut winner_name = winner_id.clone();
        for player in &session.players {
            if player.id == winner_id {
                winner_name = player.display_name().await;
            }
        }
        session.broadcast(ServerMessage::GameOver {
            winner_id,
            winner_name,
        });

        self.sessions.lock().await.remove(&session.id);
        for player in &session.players {
            *player.session.lock().await = None;
        }
        info!("session {} finished", session.id);
    }

    /// Closing the connection is the only cancellation signal. The player
    /// leaves the queue, the opponent is told and the session is discarded;
    /// there is no reconnect.
    pub async fn disconnect(&self, client: &Arc<ClientHandle>) {
        self.clients.lock().await.remove(&client.id);
        self.queue.lock().await.leave(&client.id);

        let session_id = client.session.lock().await.take();
        if let Some(session_id) = session_id {
            let session = self.sessions.lock().await.remove(&session_id);
            if let Some(session) = session {
                let other = session.other(&client.id);
                *other.session.lock().await = None;
                other.send(ServerMessage::OpponentDisconnected);
                info!("session {} discarded after disconnect", session_id);
            }
        }
        info!("{} disconnected", client.id);
    }

    pub async fn status(&self) -> StatusReport {
        StatusReport {
            players: self.clients.lock().await.len(),
            sessions: self.sessions.lock().await.len(),
            queue_length: self.queue.lock().await.len(),
        }
    }
}

impl Default for GameServer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pantheon_core::card::{Archetype, Card};
    use pantheon_core::game_state::Phase;
    use tokio::sync::mpsc::UnboundedReceiver;

    async fn connect(server: &GameServer) -> (Arc<ClientHandle>, UnboundedReceiver<ServerMessage>) {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let client = server.register(tx).await;
        assert!(matches!(
            rx.recv().await,
            Some(ServerMessage::Welcome { .. })
        ));
        (client, rx)
    }

    async fn queued(
        server: &GameServer,
        deck: DeckChoice,
    ) -> (Arc<ClientHandle>, UnboundedReceiver<ServerMessage>) {
        let (client, mut rx) = connect(server).await;
        server
            .handle_message(&client, ClientMessage::JoinQueue { deck })
            .await;
        assert!(matches!(
            rx.recv().await,
            Some(ServerMessage::QueueJoined { .. })
        ));
        (client, rx)
    }

    #[tokio::test]
    async fn matchmaking_should_pair_in_arrival_order() {
        let server = GameServer::new();
        let (c1, mut rx1) = queued(&server, DeckChoice::Egyptian).await;
        let (c2, mut rx2) = queued(&server, DeckChoice::Greek).await;
        let (c3, _rx3) = queued(&server, DeckChoice::Greek).await;

        server.try_match().await;

        match rx1.recv().await {
            Some(ServerMessage::GameStart {
                player_slot, state, ..
            }) => {
                assert_eq!(player_slot, 1);
                assert_eq!(state.player1.id, c1.id);
                assert_eq!(state.player2.id, c2.id);
                assert_eq!(state.current_turn, c1.id);
            }
            other => panic!("expected gameStart, got {:?}", other),
        }
        assert!(matches!(
            rx2.recv().await,
            Some(ServerMessage::GameStart { player_slot: 2, .. })
        ));
        assert_eq!(server.queue.lock().await.position(&c3.id), Some(1));
        assert_eq!(server.status().await.sessions, 1);
    }

    #[tokio::test]
    async fn join_queue_should_be_idempotent() {
        let server = GameServer::new();
        let (c1, mut rx1) = queued(&server, DeckChoice::Egyptian).await;

        server
            .handle_message(&c1, ClientMessage::JoinQueue { deck: DeckChoice::Egyptian })
            .await;
        assert!(matches!(
            rx1.recv().await,
            Some(ServerMessage::QueueJoined { position: 1 })
        ));
        assert_eq!(server.queue.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn errors_should_only_reach_the_offending_caller() {
        let server = GameServer::new();
        let (_c1, mut rx1) = queued(&server, DeckChoice::Egyptian).await;
        let (c2, mut rx2) = queued(&server, DeckChoice::Greek).await;
        server.try_match().await;
        let _ = rx1.recv().await; // gameStart
        let _ = rx2.recv().await; // gameStart

        // player 1 holds the first turn, so this must be rejected
        server.handle_message(&c2, ClientMessage::EndTurn).await;

        match rx2.recv().await {
            Some(ServerMessage::Error { message }) => assert_eq!(message, "not your turn"),
            other => panic!("expected error, got {:?}", other),
        }
        assert!(rx1.try_recv().is_err());
    }

    #[tokio::test]
    async fn successful_operations_should_reach_both_participants() {
        let server = GameServer::new();
        let (c1, mut rx1) = queued(&server, DeckChoice::Egyptian).await;
        let (_c2, mut rx2) = queued(&server, DeckChoice::Greek).await;
        server.try_match().await;
        let _ = rx1.recv().await;
        let _ = rx2.recv().await;

        server.handle_message(&c1, ClientMessage::EndTurn).await;

        for rx in [&mut rx1, &mut rx2] {
            match rx.recv().await {
                Some(ServerMessage::GameUpdate { state }) => {
                    assert_eq!(state.turn_count, 2);
                }
                other => panic!("expected gameUpdate, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn winning_attack_should_close_the_session() {
        let server = GameServer::new();
        let (c1, mut rx1) = queued(&server, DeckChoice::Egyptian).await;
        let (_c2, mut rx2) = queued(&server, DeckChoice::Greek).await;
        server.try_match().await;
        let _ = rx1.recv().await;
        let _ = rx2.recv().await;

        let session = server.session_of(&c1).await.unwrap();
        {
            let mut state = session.state.lock().await;
            state.phase = Phase::Battle;
            state.player1.field.push(Card {
                id: "t1".to_string(),
                name: "Striker".to_string(),
                archetype: Archetype::Neutral,
                attack: 2000,
                defense: 1000,
                cost: 2,
                effect: None,
                effect_text: String::new(),
            });
            state.player2.hp = 1500;
        }

        server
            .handle_message(
                &c1,
                ClientMessage::Attack {
                    attacker_index: 0,
                    target_index: DIRECT_ATTACK,
                },
            )
            .await;

        for rx in [&mut rx1, &mut rx2] {
            assert!(matches!(
                rx.recv().await,
                Some(ServerMessage::GameUpdate { .. })
            ));
            match rx.recv().await {
                Some(ServerMessage::GameOver { winner_id, .. }) => assert_eq!(winner_id, c1.id),
                other => panic!("expected gameOver, got {:?}", other),
            }
        }
        assert_eq!(server.status().await.sessions, 0);
        assert!(server.session_of(&c1).await.is_none());

        // the finished session accepts nothing further
        server.handle_message(&c1, ClientMessage::EndTurn).await;
        match rx1.recv().await {
            Some(ServerMessage::Error { message }) => assert_eq!(message, "no active game"),
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn disconnect_should_notify_opponent_and_discard_session() {
        let server = GameServer::new();
        let (c1, mut rx1) = queued(&server, DeckChoice::Egyptian).await;
        let (_c2, mut rx2) = queued(&server, DeckChoice::Greek).await;
        server.try_match().await;
        let _ = rx1.recv().await;
        let _ = rx2.recv().await;

        server.disconnect(&c1).await;

        assert!(matches!(
            rx2.recv().await,
            Some(ServerMessage::OpponentDisconnected)
        ));
        let status = server.status().await;
        assert_eq!(status.sessions, 0);
        assert_eq!(status.players, 1);
    }

    #[tokio::test]
    async fn disconnect_should_remove_waiting_player_from_queue() {
        let server = GameServer::new();
        let (c1, _rx1) = queued(&server, DeckChoice::Egyptian).await;

        server.disconnect(&c1).await;

        let status = server.status().await;
        assert_eq!(status.queue_length, 0);
        assert_eq!(status.players, 0);
    }
}
