//! Static deck catalogs. Card stats are data, not rules; nothing in here is
//! consulted by the battle engine beyond the fields on [`Card`].

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::card::{Archetype, Card, Effect};

/// The deck a queued player declares before matchmaking pairs them up.
#[derive(
    Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DeckChoice {
    Egyptian,
    Greek,
}

impl DeckChoice {
    pub fn build(self) -> Vec<Card> {
        match self {
            DeckChoice::Egyptian => egyptian_deck(),
            DeckChoice::Greek => greek_deck(),
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn card(
    id: &str,
    name: &str,
    archetype: Archetype,
    attack: i32,
    defense: i32,
    cost: i32,
    effect: Option<Effect>,
    effect_text: &str,
) -> Card {
    Card {
        id: id.to_string(),
        name: name.to_string(),
        archetype,
        attack,
        defense,
        cost,
        effect,
        effect_text: effect_text.to_string(),
    }
}

fn put(deck: &mut Vec<Card>, copies: usize, card: Card) {
    for _ in 0..copies {
        deck.push(card.clone());
    }
}

pub fn egyptian_deck() -> Vec<Card> {
    use Archetype::Egyptian;
    let mut deck = vec![];
    // Legendaries
    put(&mut deck, 1, card("eg001", "Ra, the Sun God", Egyptian, 3000, 2500, 8, Some(Effect::Damage), "Deal 1000 damage to opponent"));
    put(&mut deck, 1, card("eg002", "Anubis, Guardian of the Dead", Egyptian, 2200, 2800, 6, Some(Effect::Heal), "Heal 500 HP when a card is destroyed"));
    // Rares
    put(&mut deck, 2, card("eg003", "Isis, Mother of Magic", Egyptian, 1800, 2000, 4, Some(Effect::Draw), "Draw an additional card"));
    put(&mut deck, 2, card("eg004", "Horus, the Avenger", Egyptian, 2500, 2000, 5, None, ""));
    put(&mut deck, 2, card("eg005", "Thoth, God of Wisdom", Egyptian, 1500, 2200, 3, Some(Effect::Mana), "Gain 1 extra mana"));
    put(&mut deck, 1, card("eg006", "Set, God of Chaos", Egyptian, 2800, 2000, 7, None, ""));
    put(&mut deck, 2, card("eg007", "Sobek, Crocodile God", Egyptian, 2000, 2400, 5, None, ""));
    // Commons
    put(&mut deck, 3, card("eg008", "Bastet, Cat Goddess", Egyptian, 1600, 1400, 3, None, ""));
    put(&mut deck, 3, card("eg009", "Nephthys, Lady of the House", Egyptian, 1700, 2100, 4, None, ""));
    put(&mut deck, 3, card("eg010", "Khepri, Scarab God", Egyptian, 1400, 1800, 3, None, ""));
    put(&mut deck, 3, card("eg011", "Egyptian Warrior", Egyptian, 1200, 1000, 2, None, ""));
    put(&mut deck, 3, card("eg012", "Pyramid Guardian", Egyptian, 800, 2000, 2, None, ""));
    deck.extend(neutral_package());
    deck
}

pub fn greek_deck() -> Vec<Card> {
    use Archetype::Greek;
    let mut deck = vec![];
    // Legendaries
    put(&mut deck, 1, card("gr001", "Zeus, King of Olympus", Greek, 3200, 2400, 8, Some(Effect::Damage), "Deal 500 damage to all enemies"));
    put(&mut deck, 1, card("gr002", "Athena, Goddess of War", Greek, 2400, 2600, 6, None, ""));
    // Rares
    put(&mut deck, 1, card("gr003", "Poseidon, Lord of the Seas", Greek, 2800, 2200, 7, None, ""));
    put(&mut deck, 2, card("gr004", "Apollo, God of Light", Greek, 2000, 2000, 4, Some(Effect::Heal), "Heal 1000 HP"));
    put(&mut deck, 2, card("gr005", "Hermes, the Messenger", Greek, 1600, 1800, 3, Some(Effect::Draw), "Draw 2 cards"));
    put(&mut deck, 1, card("gr006", "Ares, God of War", Greek, 2600, 1800, 6, None, ""));
    put(&mut deck, 2, card("gr007", "Hera, Queen of Gods", Greek, 2000, 2500, 5, None, ""));
    put(&mut deck, 1, card("gr008", "Demeter, Goddess of Harvest", Greek, 1500, 2300, 4, Some(Effect::Mana), "Gain 2 mana"));
    // Commons
    put(&mut deck, 3, card("gr009", "Artemis, the Hunter", Greek, 2100, 1700, 4, None, ""));
    put(&mut deck, 3, card("gr010", "Hephaestus, the Forger", Greek, 1900, 2100, 4, None, ""));
    put(&mut deck, 3, card("gr011", "Greek Hoplite", Greek, 1300, 1700, 2, None, ""));
    put(&mut deck, 3, card("gr012", "Temple Guardian", Greek, 900, 2100, 2, None, ""));
    put(&mut deck, 3, card("gr013", "Oracle Priestess", Greek, 1000, 1500, 2, Some(Effect::Draw), "Draw a card"));
    deck.extend(neutral_package());
    deck
}

/// Shared spell package, identical in both decks for balance.
fn neutral_package() -> Vec<Card> {
    use Archetype::Neutral;
    let mut deck = vec![];
    put(&mut deck, 2, card("n001", "Healing Potion", Neutral, 0, 0, 1, Some(Effect::Heal), "Heal 1000 HP"));
    put(&mut deck, 2, card("n002", "Lightning Bolt", Neutral, 0, 0, 3, Some(Effect::Damage), "Deal 1500 damage"));
    put(&mut deck, 2, card("n003", "Power Crystal", Neutral, 1000, 1000, 2, Some(Effect::Mana), "Gain 2 mana"));
    put(&mut deck, 2, card("n004", "Ancient Warrior", Neutral, 1800, 1600, 3, None, ""));
    put(&mut deck, 2, card("n005", "Mystic Shield", Neutral, 0, 2500, 2, None, ""));
    put(&mut deck, 3, card("n006", "Swift Strike", Neutral, 1500, 1000, 2, None, ""));
    deck
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_choice_should_build_a_playable_deck() {
        for choice in DeckChoice::iter() {
            let deck = choice.build();
            assert!(!deck.is_empty());
            assert!(deck.iter().all(|c| c.cost > 0));
        }
    }

    #[test]
    fn decks_should_have_matching_sizes() {
        assert_eq!(egyptian_deck().len(), greek_deck().len());
    }

    #[test]
    fn decks_should_only_mix_their_own_archetype_with_neutrals() {
        assert!(egyptian_deck()
            .iter()
            .all(|c| c.archetype != Archetype::Greek));
        assert!(greek_deck()
            .iter()
            .all(|c| c.archetype != Archetype::Egyptian));
    }
}
