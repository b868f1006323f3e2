pub mod card;
pub mod constants;
pub mod deck;
pub mod game_logic;
pub mod game_state;
pub mod messages;
pub mod player;
