pub const STARTING_HP: i32 = 8000;
pub const STARTING_MANA: i32 = 1;
pub const MANA_CEILING: i32 = 10;
pub const STARTING_HAND_SIZE: usize = 5;
pub const MAX_FIELD_SIZE: usize = 5;

// Fixed effect amounts, regardless of what the card text promises.
pub const EFFECT_DRAW_COUNT: usize = 1;
pub const EFFECT_DAMAGE: i32 = 500;
pub const EFFECT_HEAL: i32 = 500;
pub const EFFECT_MANA_GAIN: i32 = 1;

/// Extra multiplier per same-archetype card already fielded.
pub const SYNERGY_STEP: f32 = 0.1;
