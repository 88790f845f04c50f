use super::card::{Card, Color};
use super::game::{GameState, MAX_PLAYERS, MIN_PLAYERS};
use super::question::Question;
use super::recorder::RoundRecord;
use super::round::GameEvent;
use super::rules;
use std::collections::BTreeMap;
use std::io::{self, BufRead, BufReader, Write};
use std::time::{Duration, Instant};

pub struct ConsoleUI {
    input: Box<dyn BufRead>,
    output: Box<dyn Write>,
}

impl Default for ConsoleUI {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleUI {
    pub fn new() -> Self {
        Self {
            input: Box::new(BufReader::new(io::stdin())),
            output: Box::new(io::stdout()),
        }
    }

    pub fn with_streams(input: Box<dyn BufRead>, output: Box<dyn Write>) -> Self {
        Self { input, output }
    }

    fn read_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
        }
        Ok(line.trim().to_string())
    }

    fn prompt(&mut self, text: &str) -> io::Result<String> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;
        self.read_line()
    }

    /// Collects 2-4 names. An empty first answer reuses `remembered`.
    pub fn get_player_names(&mut self, remembered: &[String]) -> io::Result<Vec<String>> {
        let reusable = (MIN_PLAYERS..=MAX_PLAYERS).contains(&remembered.len());
        if reusable {
            writeln!(
                self.output,
                "Last players: {} (press Enter to reuse)",
                remembered.join(", ")
            )?;
        }

        let mut player_names = Vec::new();
        loop {
            let name = self.prompt("Enter player name (or '.' to finish): ")?;

            if name.is_empty() && player_names.is_empty() && reusable {
                return Ok(remembered.to_vec());
            }

            if name == "." || name.is_empty() {
                if player_names.len() < MIN_PLAYERS {
                    writeln!(
                        self.output,
                        "You need at least {} players to start the game.",
                        MIN_PLAYERS
                    )?;
                    continue;
                }
                break;
            }

            if player_names
                .iter()
                .any(|taken: &String| taken.eq_ignore_ascii_case(&name))
            {
                writeln!(self.output, "{} is already playing. Pick another name.", name)?;
                continue;
            }

            player_names.push(name);
            if player_names.len() == MAX_PLAYERS {
                break;
            }
        }
        Ok(player_names)
    }

    pub fn show_message(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "{}", message)
    }

    pub fn display_game_state(&mut self, game: &GameState) -> io::Result<()> {
        writeln!(self.output, "\n--- Round {} ---", game.round_number)?;
        writeln!(self.output, "{}", game.message)?;
        writeln!(self.output, "Direction: {:?}", game.direction)?;
        if let Some(top) = game.top_card() {
            writeln!(self.output, "Top card: {}", top)?;
        }
        writeln!(self.output, "Color in play: {}", game.current_color())?;
        writeln!(self.output, "Deck cards remaining: {}", game.deck.len())?;

        for (seat, player) in game.players.iter().enumerate() {
            let marker = if seat == game.current_player_index { ">" } else { " " };
            writeln!(
                self.output,
                "{} {} {} - {} card(s), {} pts",
                marker,
                player.avatar,
                player.name,
                player.hand.len(),
                player.score
            )?;
        }

        for player in game.players_on_last_card() {
            writeln!(self.output, "UNO! {} has one card left!", player.name)?;
        }
        Ok(())
    }

    /// Lists the hand, starring cards that can be played now.
    pub fn display_player_hand(&mut self, game: &GameState) -> io::Result<()> {
        let player = game.current_player();
        writeln!(self.output, "\n{}'s hand:", player.name)?;
        for (i, card) in player.hand.iter().enumerate() {
            let playable = game
                .top_card()
                .is_some_and(|top| rules::can_play(card, top, game.current_color()));
            let marker = if playable { "*" } else { " " };
            writeln!(self.output, "{}{}. {}", marker, i, card)?;
        }
        Ok(())
    }

    pub fn get_player_action(&mut self) -> io::Result<String> {
        writeln!(self.output, "\nWhat would you like to do?")?;
        writeln!(self.output, "1. Play a card")?;
        writeln!(self.output, "2. Draw a card")?;
        self.prompt("Enter your choice: ")
    }

    pub fn get_card_index(&mut self) -> io::Result<Result<usize, String>> {
        let index = self.prompt("Enter the index of the card you want to play: ")?;
        Ok(index
            .parse::<usize>()
            .map_err(|_| "Invalid input. Please enter a number.".to_string()))
    }

    /// Poses the gating question. Unanswered, invalid or late answers count as wrong.
    pub fn ask_question(
        &mut self,
        player_name: &str,
        card: &Card,
        question: &Question,
        time_limit: Duration,
    ) -> io::Result<bool> {
        writeln!(
            self.output,
            "\n{}, answer to play {} ({} seconds)",
            player_name,
            card,
            time_limit.as_secs()
        )?;
        writeln!(self.output, "[{}] {}", question.category, question.text)?;
        for (i, option) in question.options.iter().enumerate() {
            writeln!(self.output, "{}. {}", i + 1, option)?;
        }

        let started = Instant::now();
        let answer = self.prompt("Your answer: ")?;
        let elapsed = started.elapsed();

        if elapsed >= time_limit {
            writeln!(self.output, "Time's up! The answer was: {}", question.correct_answer())?;
            return Ok(false);
        }

        let correct = answer
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .is_some_and(|option| question.is_correct(option));

        if correct {
            writeln!(self.output, "Correct!")?;
        } else {
            writeln!(self.output, "Wrong! The answer was: {}", question.correct_answer())?;
        }
        Ok(correct)
    }

    pub fn choose_color(&mut self) -> io::Result<Color> {
        loop {
            writeln!(self.output, "Choose a color:")?;
            for (i, color) in Color::PLAYABLE.iter().enumerate() {
                writeln!(self.output, "{}. {}", i + 1, color)?;
            }
            let choice = self.prompt("Enter your choice: ")?;

            let picked = choice
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| Color::PLAYABLE.get(i).copied())
                .or_else(|| Color::parse(&choice));
            match picked {
                Some(color) => return Ok(color),
                None => writeln!(self.output, "Invalid choice. Please enter 1, 2, 3, or 4.")?,
            }
        }
    }

    pub fn handle_game_event(&mut self, event: &GameEvent, game: &GameState) -> io::Result<()> {
        match event {
            GameEvent::QuestionAsked { .. } | GameEvent::ColorRequired { .. } => {}
            GameEvent::CardPlayed {
                player_name, card, ..
            } => {
                writeln!(self.output, "{} played {}", player_name, card)?;
                writeln!(self.output, "{}", game.message)?;
            }
            GameEvent::WrongAnswer { player_name, .. } => {
                writeln!(self.output, "{} draws a card and loses the turn.", player_name)?;
            }
            GameEvent::CardDrawn { player_name, .. } => {
                writeln!(self.output, "{} drew a card.", player_name)?;
            }
            GameEvent::PlayerWins {
                player_name,
                points,
                ..
            } => {
                writeln!(
                    self.output,
                    "\n{} has won round {} and scores {} points!",
                    player_name, game.round_number, points
                )?;
            }
        }
        Ok(())
    }

    pub fn display_scores(&mut self, game: &GameState) -> io::Result<()> {
        writeln!(self.output, "\n--- Scores ---")?;
        for player in &game.players {
            writeln!(
                self.output,
                "{} {}: {} pts ({} card(s) left)",
                player.avatar,
                player.name,
                player.score,
                player.hand.len()
            )?;
        }
        Ok(())
    }

    pub fn display_history(
        &mut self,
        rounds: &[RoundRecord],
        wins: &BTreeMap<String, u32>,
    ) -> io::Result<()> {
        writeln!(self.output, "\n--- Total wins ---")?;
        if wins.is_empty() {
            writeln!(self.output, "No rounds played yet.")?;
        }
        let mut ranking: Vec<(&String, &u32)> = wins.iter().collect();
        ranking.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        for (name, count) in ranking {
            writeln!(self.output, "{}: {}", name, count)?;
        }

        if !rounds.is_empty() {
            writeln!(self.output, "\n--- Recent rounds ---")?;
        }
        for record in rounds {
            writeln!(
                self.output,
                "{} round {}: {} won in {}s",
                record.date.format("%Y-%m-%d %H:%M"),
                record.round_number,
                record.winner,
                record.duration
            )?;
        }
        Ok(())
    }

    pub fn ask_play_again(&mut self) -> io::Result<bool> {
        let answer = self.prompt("\nPlay another round? (y/n): ")?;
        Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz_game::card::CardType;
    use crate::quiz_game::card::tests::{card, sample_question};
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    /// Output sink that can be inspected after the UI has taken ownership.
    #[derive(Clone, Default)]
    struct SharedOutput(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedOutput {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedOutput {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn ui_with_input(input: &str) -> (ConsoleUI, SharedOutput) {
        let output = SharedOutput::default();
        let ui = ConsoleUI::with_streams(
            Box::new(Cursor::new(input.to_string())),
            Box::new(output.clone()),
        );
        (ui, output)
    }

    #[test]
    fn test_display_game_state_and_hand() {
        let (mut ui, output) = ui_with_input("");
        let game = GameState::deal(vec!["Alice".to_string(), "Bob".to_string()]).unwrap();

        ui.display_game_state(&game).unwrap();
        ui.display_player_hand(&game).unwrap();

        let text = output.text();
        assert!(text.contains("Round 1"));
        assert!(text.contains("Alice's turn"));
        assert!(text.contains("Alice's hand:"));
    }

    #[test]
    fn test_get_player_names() {
        let (mut ui, _) = ui_with_input("Alice\n.\nBob\n.\n");
        assert_eq!(ui.get_player_names(&[]).unwrap(), vec!["Alice", "Bob"]);

        let (mut ui, _) = ui_with_input("A\nB\nC\nD\n");
        assert_eq!(ui.get_player_names(&[]).unwrap().len(), 4);

        let remembered = vec!["Cara".to_string(), "Dan".to_string()];
        let (mut ui, _) = ui_with_input("\n");
        assert_eq!(ui.get_player_names(&remembered).unwrap(), remembered);
    }

    #[test]
    fn test_get_player_names_rejects_duplicates() {
        let (mut ui, output) = ui_with_input("Alice\nALICE\nBob\n.\n");
        assert_eq!(ui.get_player_names(&[]).unwrap(), vec!["Alice", "Bob"]);
        assert!(output.text().contains("ALICE is already playing"));
    }

    #[test]
    fn test_get_card_index() {
        let (mut ui, _) = ui_with_input("5\ninvalid\n");
        assert_eq!(ui.get_card_index().unwrap(), Ok(5));
        assert!(ui.get_card_index().unwrap().is_err());
        assert!(ui.get_card_index().is_err());
    }

    #[test]
    fn test_ask_question() {
        let question = sample_question();
        let played = card(Color::Red, CardType::Number(3));
        let limit = Duration::from_secs(60);

        let (mut ui, output) = ui_with_input("2\n1\nabc\n");
        assert!(ui.ask_question("Alice", &played, &question, limit).unwrap());
        assert!(!ui.ask_question("Alice", &played, &question, limit).unwrap());
        assert!(!ui.ask_question("Alice", &played, &question, limit).unwrap());
        assert!(output.text().contains("The answer was: 4"));
    }

    #[test]
    fn test_late_answer_counts_as_wrong() {
        let question = sample_question();
        let played = card(Color::Red, CardType::Number(3));

        let (mut ui, output) = ui_with_input("2\n");
        assert!(!ui.ask_question("Alice", &played, &question, Duration::ZERO).unwrap());
        assert!(output.text().contains("Time's up!"));
    }

    #[test]
    fn test_choose_color() {
        let (mut ui, _) = ui_with_input("1\n2\n3\n4\nyellow\n9\nred\n");
        let expected = [
            Color::Red,
            Color::Blue,
            Color::Green,
            Color::Yellow,
            Color::Yellow,
            Color::Red,
        ];
        for color in expected {
            assert_eq!(ui.choose_color().unwrap(), color);
        }
    }

    #[test]
    fn test_handle_game_event() {
        let (mut ui, output) = ui_with_input("");
        let game = GameState::deal(vec!["Alice".to_string(), "Bob".to_string()]).unwrap();

        let events = vec![
            GameEvent::CardPlayed {
                player_id: "a".to_string(),
                player_name: "Alice".to_string(),
                card: card(Color::Red, CardType::Number(1)),
            },
            GameEvent::WrongAnswer {
                player_id: "b".to_string(),
                player_name: "Bob".to_string(),
            },
            GameEvent::CardDrawn {
                player_id: "a".to_string(),
                player_name: "Alice".to_string(),
            },
            GameEvent::PlayerWins {
                player_id: "a".to_string(),
                player_name: "Alice".to_string(),
                points: 31,
            },
        ];
        for event in &events {
            ui.handle_game_event(event, &game).unwrap();
        }

        let text = output.text();
        assert!(text.contains("Alice played Red 1"));
        assert!(text.contains("Bob draws a card"));
        assert!(text.contains("scores 31 points"));
    }

    #[test]
    fn test_ask_play_again() {
        let (mut ui, _) = ui_with_input("y\nno\n");
        assert!(ui.ask_play_again().unwrap());
        assert!(!ui.ask_play_again().unwrap());
    }
}
