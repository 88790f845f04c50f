pub mod quiz_game;
