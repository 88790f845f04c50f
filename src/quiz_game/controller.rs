use super::recorder::MatchRecorder;
use super::round::{Round, TurnPhase};
use super::ui::ConsoleUI;
use chrono::Utc;
use log::info;
use std::error::Error;
use std::time::Duration;

/// Console game loop: one pass-the-device match of as many rounds as wanted.
pub struct GameController<R: MatchRecorder> {
    ui: ConsoleUI,
    recorder: R,
    time_limit: Duration,
}

impl<R: MatchRecorder> GameController<R> {
    pub fn new(ui: ConsoleUI, recorder: R, time_limit: Duration) -> Self {
        GameController {
            ui,
            recorder,
            time_limit,
        }
    }

    pub fn recorder(&self) -> &R {
        &self.recorder
    }

    pub fn run(&mut self, player_names: Vec<String>) -> Result<(), Box<dyn Error>> {
        self.ui.show_message("Welcome to UNO Quiz!")?;

        let mut round = Round::start(player_names)?;
        loop {
            round = self.play_round(round)?;
            if !self.ui.ask_play_again()? {
                return Ok(());
            }
            round = round.next_round()?;
        }
    }

    /// Plays `round` to the end, records it and returns the finished round.
    pub fn play_round(&mut self, mut round: Round) -> Result<Round, Box<dyn Error>> {
        info!("Starting round {}", round.state.round_number);

        while !round.is_over() {
            self.ui.display_game_state(&round.state)?;
            self.ui.display_player_hand(&round.state)?;

            match self.ui.get_player_action()?.as_str() {
                "1" => {
                    if let Some(next) = self.play_selected_card(&round)? {
                        round = next;
                    }
                }
                "2" => {
                    let (next, event) = round.draw_instead()?;
                    self.ui.handle_game_event(&event, &next.state)?;
                    round = next;
                }
                _ => self.ui.show_message("Invalid choice. Please enter 1 or 2.")?,
            }
        }

        let duration = round.elapsed_secs(Utc::now());
        if let Some(record) = round.to_record(duration) {
            self.recorder.append(record)?;
        }
        self.ui.display_scores(&round.state)?;
        Ok(round)
    }

    /// Returns `None` when the selection is rejected and the turn should repeat.
    fn play_selected_card(&mut self, round: &Round) -> Result<Option<Round>, Box<dyn Error>> {
        let index = match self.ui.get_card_index()? {
            Ok(index) => index,
            Err(message) => {
                self.ui.show_message(&message)?;
                return Ok(None);
            }
        };

        let player = round.state.current_player();
        let Some(card) = player.hand.get(index).cloned() else {
            self.ui.show_message("No card at that index.")?;
            return Ok(None);
        };

        let selected = match round.select_card(&card.id) {
            Ok((selected, _)) => selected,
            Err(e) => {
                self.ui.show_message(&format!("{}. Please try again.", e))?;
                return Ok(None);
            }
        };

        let correct =
            self.ui
                .ask_question(&player.name, &card, &card.question, self.time_limit)?;
        let (answered, event) = selected.answer(correct)?;
        self.ui.handle_game_event(&event, &answered.state)?;

        if let TurnPhase::AwaitingColor { .. } = answered.phase {
            let color = self.ui.choose_color()?;
            let (resolved, event) = answered.choose_color(color)?;
            self.ui.handle_game_event(&event, &resolved.state)?;
            return Ok(Some(resolved));
        }

        Ok(Some(answered))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz_game::card::tests::card;
    use crate::quiz_game::card::{CardType, Color};
    use crate::quiz_game::game::{Direction, GameState};
    use crate::quiz_game::player::Player;
    use crate::quiz_game::recorder::InMemoryRecorder;
    use std::io::{self, Cursor};

    fn scripted(input: &str) -> GameController<InMemoryRecorder> {
        let ui = ConsoleUI::with_streams(
            Box::new(Cursor::new(input.to_string())),
            Box::new(io::sink()),
        );
        GameController::new(ui, InMemoryRecorder::new(), Duration::from_secs(300))
    }

    /// Alice holds a wild and a red 9; Bob holds a blue 2.
    fn short_round() -> Round {
        let mut alice = Player::new(0, "Alice".to_string());
        alice.hand = vec![
            card(Color::Wild, CardType::Wild),
            card(Color::Red, CardType::Number(9)),
        ];
        let mut bob = Player::new(1, "Bob".to_string());
        bob.hand = vec![card(Color::Blue, CardType::Number(2))];

        Round::from_state(GameState {
            players: vec![alice, bob],
            current_player_index: 0,
            direction: Direction::Clockwise,
            discard_pile: vec![card(Color::Red, CardType::Number(5))],
            deck: (0..5).map(|_| card(Color::Yellow, CardType::Number(1))).collect(),
            set_aside: Vec::new(),
            active_card: None,
            winner: None,
            round_number: 1,
            message: "Alice's turn".to_string(),
        })
    }

    #[test]
    fn test_scripted_round_is_recorded() {
        // Alice: wild, correct answer (2), picks blue.
        // Bob: plays blue 2 and answers correctly, winning the round.
        let mut controller = scripted("1\n0\n2\n2\n1\n0\n2\n");

        let finished = controller.play_round(short_round()).unwrap();

        assert!(finished.is_over());
        let winner = finished.state.winner.as_ref().unwrap();
        assert_eq!(winner.name, "Bob");
        assert_eq!(winner.score, 9);

        let history = controller.recorder().list_recent(10).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].winner, "Bob");
        assert_eq!(controller.recorder().win_tally().unwrap()["Bob"], 1);
    }

    #[test]
    fn test_rejected_selection_repeats_turn() {
        // Bad index, unparsable index, unknown action, then a wrong answer and a plain draw.
        let mut controller = scripted("1\n7\n1\nx\n3\n1\n1\n1\n2\n");
        let round = short_round();

        let result = controller.play_round(round);
        // Input runs out before anybody wins.
        assert!(result.is_err());
        assert!(controller.recorder().list_recent(10).unwrap().is_empty());
    }
}
