//! Battle rules: every legal mutation of a [`GameState`] lives here.
//!
//! Each operation validates fully before touching the state, so a failed call
//! leaves the match exactly as it was.

use std::error::Error;
use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::card::{Card, Effect};
use crate::constants::{
    EFFECT_DAMAGE, EFFECT_DRAW_COUNT, EFFECT_HEAL, EFFECT_MANA_GAIN, MANA_CEILING, MAX_FIELD_SIZE,
    STARTING_HAND_SIZE, STARTING_HP, SYNERGY_STEP,
};
use crate::game_state::{GameState, Phase};
use crate::player::Player;

/// Precondition failures. All of them are rejected before any mutation and
/// are reported to the offending caller only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleError {
    GameFinished,
    UnknownPlayer,
    NotYourTurn,
    /// Carries the phase the operation is legal in.
    WrongPhase(Phase),
    InvalidCardIndex,
    InvalidAttackerIndex,
    InvalidTargetIndex,
    InsufficientMana,
    FieldFull,
    DirectAttackBlocked,
    EmptyDeck,
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleError::GameFinished => write!(f, "game is already over"),
            RuleError::UnknownPlayer => write!(f, "player not found"),
            RuleError::NotYourTurn => write!(f, "not your turn"),
            RuleError::WrongPhase(p) => write!(f, "only legal during the {} phase", p),
            RuleError::InvalidCardIndex => write!(f, "invalid card index"),
            RuleError::InvalidAttackerIndex => write!(f, "invalid attacker index"),
            RuleError::InvalidTargetIndex => write!(f, "invalid target index"),
            RuleError::InsufficientMana => write!(f, "insufficient mana"),
            RuleError::FieldFull => write!(f, "field is full"),
            RuleError::DirectAttackBlocked => {
                write!(f, "cannot attack directly when opponent has cards")
            }
            RuleError::EmptyDeck => write!(f, "deck must not be empty"),
        }
    }
}

impl Error for RuleError {}

/// A draw from an empty deck is a defined non-event, not an error. Whether
/// "cannot draw" amounts to a loss is a policy left to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawOutcome {
    Drawn,
    DeckEmpty,
}

impl GameState {
    /// Sets up a fresh match: both decks shuffled, five cards dealt to each
    /// hand, first player to act in their main phase.
    pub fn create_match(
        id: &str,
        player1: (&str, &str),
        deck1: Vec<Card>,
        player2: (&str, &str),
        deck2: Vec<Card>,
        rng: &mut impl Rng,
    ) -> Result<GameState, RuleError> {
        if deck1.is_empty() || deck2.is_empty() {
            return Err(RuleError::EmptyDeck);
        }
        let mut p1 = Player::new(player1.0, player1.1, deck1);
        let mut p2 = Player::new(player2.0, player2.1, deck2);
        p1.deck.shuffle(rng);
        p2.deck.shuffle(rng);
        p1.draw_many(STARTING_HAND_SIZE);
        p2.draw_many(STARTING_HAND_SIZE);

        let current_turn = p1.id.clone();
        Ok(GameState {
            id: id.to_string(),
            player1: p1,
            player2: p2,
            current_turn,
            turn_count: 1,
            phase: Phase::Main,
            game_over: false,
            winner: None,
            last_action: String::new(),
        })
    }

    /// Draw phase action. On success the phase advances to Main; an empty
    /// deck leaves everything untouched, including the phase.
    pub fn draw_card(&mut self, player_id: &str) -> Result<DrawOutcome, RuleError> {
        self.ensure_running()?;
        self.ensure_turn(player_id)?;
        if self.phase != Phase::Draw {
            return Err(RuleError::WrongPhase(Phase::Draw));
        }
        let (player, _) = self.pair_mut(player_id).ok_or(RuleError::UnknownPlayer)?;
        if !player.draw() {
            return Ok(DrawOutcome::DeckEmpty);
        }
        self.phase = Phase::Main;
        self.last_action = format!("{} drew a card", player_id);
        Ok(DrawOutcome::Drawn)
    }

    /// Main phase action: pays the mana cost, bakes the archetype synergy
    /// into the card's stats, fields it and resolves its effect tag.
    pub fn play_card(&mut self, player_id: &str, hand_index: usize) -> Result<(), RuleError> {
        self.ensure_running()?;
        self.ensure_turn(player_id)?;
        if self.phase != Phase::Main {
            return Err(RuleError::WrongPhase(Phase::Main));
        }
        let (player, opponent) = self.pair_mut(player_id).ok_or(RuleError::UnknownPlayer)?;
        if hand_index >= player.hand.len() {
            return Err(RuleError::InvalidCardIndex);
        }
        if player.field.len() >= MAX_FIELD_SIZE {
            return Err(RuleError::FieldFull);
        }
        let cost = player.hand[hand_index].cost;
        if cost > player.mana {
            return Err(RuleError::InsufficientMana);
        }

        let mut card = player.hand.remove(hand_index);
        scale_for_synergy(&mut card, &player.field);
        player.mana -= cost;
        let effect = card.effect;
        let card_name = card.name.clone();
        player.field.push(card);

        match effect {
            Some(Effect::Draw) => {
                player.draw_many(EFFECT_DRAW_COUNT);
            }
            Some(Effect::Damage) => opponent.hp -= EFFECT_DAMAGE,
            Some(Effect::Heal) => player.hp = (player.hp + EFFECT_HEAL).min(STARTING_HP),
            Some(Effect::Mana) => {
                player.mana = (player.mana + EFFECT_MANA_GAIN).min(player.max_mana)
            }
            None => {}
        }

        self.last_action = format!("{} played {}", player_id, card_name);
        self.check_win(player_id);
        Ok(())
    }

    /// Battle phase action. `target = None` is a direct attack on the
    /// opponent's hit points, legal only with an empty opposing field.
    pub fn attack(
        &mut self,
        player_id: &str,
        attacker_index: usize,
        target: Option<usize>,
    ) -> Result<(), RuleError> {
        self.ensure_running()?;
        self.ensure_turn(player_id)?;
        if self.phase != Phase::Battle {
            return Err(RuleError::WrongPhase(Phase::Battle));
        }
        let (player, opponent) = self.pair_mut(player_id).ok_or(RuleError::UnknownPlayer)?;
        if attacker_index >= player.field.len() {
            return Err(RuleError::InvalidAttackerIndex);
        }

        let action = match target {
            None => {
                if !opponent.field.is_empty() {
                    return Err(RuleError::DirectAttackBlocked);
                }
                let attacker = &player.field[attacker_index];
                opponent.hp -= attacker.attack;
                format!(
                    "{} attacked directly for {} damage",
                    attacker.name, attacker.attack
                )
            }
            Some(target_index) => {
                if target_index >= opponent.field.len() {
                    return Err(RuleError::InvalidTargetIndex);
                }
                let attack = player.field[attacker_index].attack;
                let defense = opponent.field[target_index].defense;
                if attack > defense {
                    let destroyed = opponent.field.remove(target_index);
                    let action = format!(
                        "{} destroyed {}",
                        player.field[attacker_index].name, destroyed.name
                    );
                    opponent.graveyard.push(destroyed);
                    action
                } else if attack < defense {
                    let destroyed = player.field.remove(attacker_index);
                    let action = format!(
                        "{} was destroyed by {}",
                        destroyed.name, opponent.field[target_index].name
                    );
                    player.graveyard.push(destroyed);
                    action
                } else {
                    let attacker = player.field.remove(attacker_index);
                    let defender = opponent.field.remove(target_index);
                    player.graveyard.push(attacker);
                    opponent.graveyard.push(defender);
                    "Both cards destroyed".to_string()
                }
            }
        };

        self.last_action = action;
        self.check_win(player_id);
        Ok(())
    }

    /// Legal in any phase of the acting player's turn. Hands the turn to the
    /// opponent, raises their mana ceiling and refills their mana.
    pub fn end_turn(&mut self, player_id: &str) -> Result<(), RuleError> {
        self.ensure_running()?;
        self.ensure_turn(player_id)?;
        let next_id = self
            .opponent(player_id)
            .map(|p| p.id.clone())
            .ok_or(RuleError::UnknownPlayer)?;
        self.current_turn = next_id.clone();
        self.turn_count += 1;
        self.phase = Phase::Draw;

        let (next, _) = self.pair_mut(&next_id).ok_or(RuleError::UnknownPlayer)?;
        if next.max_mana < MANA_CEILING {
            next.max_mana += 1;
        }
        next.mana = next.max_mana;

        self.last_action = format!("{} ended turn", player_id);
        Ok(())
    }

    /// Trusted-client phase switch: only turn ownership is checked, any
    /// phase value is accepted. Loose on purpose.
    pub fn change_phase(&mut self, player_id: &str, phase: Phase) -> Result<(), RuleError> {
        self.ensure_running()?;
        self.ensure_turn(player_id)?;
        self.phase = phase;
        Ok(())
    }

    fn ensure_running(&self) -> Result<(), RuleError> {
        if self.game_over {
            return Err(RuleError::GameFinished);
        }
        Ok(())
    }

    fn ensure_turn(&self, player_id: &str) -> Result<(), RuleError> {
        if self.player(player_id).is_none() {
            return Err(RuleError::UnknownPlayer);
        }
        if !self.is_turn(player_id) {
            return Err(RuleError::NotYourTurn);
        }
        Ok(())
    }

    fn check_win(&mut self, attacker_id: &str) {
        let lost = self.opponent(attacker_id).map_or(false, |p| p.hp <= 0);
        if lost {
            self.game_over = true;
            self.winner = Some(attacker_id.to_string());
        }
    }
}

/// Bakes the archetype bonus into the card before it joins the field. The
/// scaling counts same-archetype cards already fielded and truncates to
/// integer stats; cards already on the field are not touched.
fn scale_for_synergy(card: &mut Card, field: &[Card]) {
    let fielded = field
        .iter()
        .filter(|c| c.archetype == card.archetype)
        .count();
    let factor = 1.0 + SYNERGY_STEP * fielded as f32;
    if card.archetype.boosts_attack() {
        card.attack = (card.attack as f32 * factor) as i32;
    } else if card.archetype.boosts_defense() {
        card.defense = (card.defense as f32 * factor) as i32;
    }
}
