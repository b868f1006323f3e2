use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Closed faction tag, only ever used to compute in-play stat bonuses.
#[derive(
    Debug, PartialEq, Eq, Hash, Copy, Clone, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Archetype {
    Egyptian,
    Greek,
    Neutral,
}

impl Archetype {
    /// Egyptian synergy scales printed attack.
    pub fn boosts_attack(&self) -> bool {
        *self == Archetype::Egyptian
    }

    /// Greek synergy scales printed defense.
    pub fn boosts_defense(&self) -> bool {
        *self == Archetype::Greek
    }
}

#[derive(
    Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Effect {
    Draw,
    Damage,
    Heal,
    Mana,
}

/// An immutable card template instance. Copies in different zones are
/// independent; once dealt there is no shared identity behind the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub name: String,
    pub archetype: Archetype,
    pub attack: i32,
    pub defense: i32,
    pub cost: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<Effect>,
    #[serde(default)]
    pub effect_text: String,
}
