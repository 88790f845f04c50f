pub mod api;
pub mod card;
pub mod controller;
pub mod deck;
pub mod game;
pub mod player;
pub mod question;
pub mod recorder;
pub mod round;
pub mod rules;
pub mod session;
pub mod ui;

pub use card::{Card, CardType, Color};
pub use game::{Direction, GameError, GameState};
pub use player::Player;
pub use question::{Category, Question};
pub use recorder::{InMemoryRecorder, JsonFileRecorder, MatchRecorder, RoundRecord};
pub use round::{GameEvent, Round, TurnPhase};
