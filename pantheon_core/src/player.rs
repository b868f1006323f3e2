use std::collections::HashMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::card::{Archetype, Card};
use crate::constants::{STARTING_HP, STARTING_MANA, SYNERGY_STEP};

/// One participant of a match. Every card it owns sits in exactly one of the
/// four zones; cards move between zones, they are never cloned or dropped
/// (destroyed cards go to the graveyard).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub hp: i32,
    pub mana: i32,
    pub max_mana: i32,
    pub deck: Vec<Card>,
    pub hand: Vec<Card>,
    pub field: Vec<Card>,
    pub graveyard: Vec<Card>,
}

impl Player {
    pub fn new(id: &str, name: &str, deck: Vec<Card>) -> Self {
        Player {
            id: id.to_string(),
            name: name.to_string(),
            hp: STARTING_HP,
            mana: STARTING_MANA,
            max_mana: STARTING_MANA,
            deck,
            hand: vec![],
            field: vec![],
            graveyard: vec![],
        }
    }

    /// Moves the front card of the deck to the back of the hand.
    /// Returns false if the deck is exhausted; that is not an error.
    pub fn draw(&mut self) -> bool {
        if self.deck.is_empty() {
            return false;
        }
        let card = self.deck.remove(0);
        self.hand.push(card);
        true
    }

    pub fn draw_many(&mut self, count: usize) -> bool {
        (0..count).all(|_| self.draw())
    }

    /// How many copies of each archetype are currently fielded.
    pub fn field_census(&self) -> HashMap<Archetype, usize> {
        self.field.iter().map(|c| c.archetype).counts()
    }

    /// Current synergy bonus per archetype, derived from the field. Never
    /// persisted; always recomputed from field composition.
    pub fn archetype_bonus(&self) -> HashMap<Archetype, f32> {
        self.field_census()
            .into_iter()
            .map(|(archetype, count)| (archetype, count as f32 * SYNERGY_STEP))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vanilla(id: &str, archetype: Archetype) -> Card {
        Card {
            id: id.to_string(),
            name: id.to_string(),
            archetype,
            attack: 1000,
            defense: 1000,
            cost: 2,
            effect: None,
            effect_text: String::new(),
        }
    }

    #[test]
    fn draw_should_move_front_of_deck_to_back_of_hand() {
        let deck = vec![vanilla("a", Archetype::Neutral), vanilla("b", Archetype::Neutral)];
        let mut player = Player::new("p1", "P1", deck);

        assert!(player.draw());
        assert_eq!(player.hand.len(), 1);
        assert_eq!(player.hand[0].id, "a");
        assert_eq!(player.deck.len(), 1);
        assert_eq!(player.deck[0].id, "b");
    }

    #[test]
    fn draw_should_report_exhausted_deck() {
        let mut player = Player::new("p1", "P1", vec![]);
        assert!(!player.draw());
        assert!(player.hand.is_empty());
    }

    #[test]
    fn field_census_should_count_per_archetype() {
        let mut player = Player::new("p1", "P1", vec![]);
        player.field.push(vanilla("a", Archetype::Egyptian));
        player.field.push(vanilla("b", Archetype::Egyptian));
        player.field.push(vanilla("c", Archetype::Neutral));

        let census = player.field_census();
        assert_eq!(census.get(&Archetype::Egyptian), Some(&2));
        assert_eq!(census.get(&Archetype::Neutral), Some(&1));
        assert_eq!(census.get(&Archetype::Greek), None);

        let bonus = player.archetype_bonus();
        assert!((bonus[&Archetype::Egyptian] - 0.2).abs() < f32::EPSILON);
    }
}
