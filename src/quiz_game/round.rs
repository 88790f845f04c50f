use super::card::{Card, Color};
use super::game::{GameError, GameState};
use super::question::Question;
use super::recorder::{PlayerSummary, RoundRecord};
use super::rules;
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Where the current turn stands. Owned by the caller, never by `GameState`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPhase {
    Playing,
    AwaitingAnswer { card_id: String },
    AwaitingColor { card_id: String },
    RoundOver { winner_id: String },
}

impl TurnPhase {
    pub fn name(&self) -> &'static str {
        match self {
            TurnPhase::Playing => "Playing",
            TurnPhase::AwaitingAnswer { .. } => "AwaitingAnswer",
            TurnPhase::AwaitingColor { .. } => "AwaitingColor",
            TurnPhase::RoundOver { .. } => "RoundOver",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GameEvent {
    QuestionAsked {
        player_id: String,
        card_id: String,
        question: Arc<Question>,
    },
    CardPlayed {
        player_id: String,
        player_name: String,
        card: Card,
    },
    ColorRequired {
        player_id: String,
    },
    WrongAnswer {
        player_id: String,
        player_name: String,
    },
    CardDrawn {
        player_id: String,
        player_name: String,
    },
    PlayerWins {
        player_id: String,
        player_name: String,
        points: u32,
    },
}

/// One round as driven by a presentation layer: the engine state plus the
/// turn phase, enforcing select → answer → color → effect → advance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub state: GameState,
    pub phase: TurnPhase,
    pub started_at: DateTime<Utc>,
}

type Step = Result<(Round, GameEvent), GameError>;

impl Round {
    pub fn start(player_names: Vec<String>) -> Result<Self, GameError> {
        Ok(Self::from_state(GameState::deal(player_names)?))
    }

    pub fn from_state(state: GameState) -> Self {
        Self {
            state,
            phase: TurnPhase::Playing,
            started_at: Utc::now(),
        }
    }

    /// Re-deals to the same players once this round is over.
    pub fn next_round(&self) -> Result<Self, GameError> {
        match self.phase {
            TurnPhase::RoundOver { .. } => Ok(Self::from_state(self.state.next_round()?)),
            _ => Err(GameError::WrongPhase),
        }
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, TurnPhase::RoundOver { .. })
    }

    fn with(&self, state: GameState, phase: TurnPhase) -> Self {
        Self {
            state,
            phase,
            started_at: self.started_at,
        }
    }

    fn expect_playing(&self) -> Result<(), GameError> {
        match self.phase {
            TurnPhase::Playing => Ok(()),
            TurnPhase::RoundOver { .. } => Err(GameError::GameAlreadyOver),
            _ => Err(GameError::WrongPhase),
        }
    }

    /// Picks a card from the current player's hand and poses its question.
    pub fn select_card(&self, card_id: &str) -> Step {
        self.expect_playing()?;

        let player = self.state.current_player();
        let card = player.find_card(card_id).ok_or(GameError::CardNotInHand)?;
        if let Some(top) = self.state.top_card() {
            if !rules::can_play(card, top, self.state.current_color()) {
                return Err(GameError::InvalidMove);
            }
        }

        let event = GameEvent::QuestionAsked {
            player_id: player.id.clone(),
            card_id: card.id.clone(),
            question: Arc::clone(&card.question),
        };
        let mut state = self.state.clone();
        state.active_card = Some(card.clone());

        let phase = TurnPhase::AwaitingAnswer {
            card_id: card_id.to_string(),
        };
        Ok((self.with(state, phase), event))
    }

    /// Resolves the pending question. A wrong answer (or a timeout) costs a
    /// card and the turn.
    pub fn answer(&self, correct: bool) -> Step {
        let card_id = match &self.phase {
            TurnPhase::AwaitingAnswer { card_id } => card_id.clone(),
            TurnPhase::RoundOver { .. } => return Err(GameError::GameAlreadyOver),
            _ => return Err(GameError::WrongPhase),
        };
        let player = self.state.current_player();
        let player_id = player.id.clone();
        let player_name = player.name.clone();

        if !correct {
            debug!("{} answered wrong, drawing a card", player_name);
            let mut state = self.state.clone();
            state.active_card = None;
            let state = state.draw(&player_id, 1).advance_turn();
            let event = GameEvent::WrongAnswer {
                player_id,
                player_name,
            };
            return Ok((self.with(state, TurnPhase::Playing), event));
        }

        let (state, card) = self.state.take_from_hand(&player_id, &card_id)?;

        if let Some(winner) = state.check_winner().cloned() {
            let scored = state.place_on_discard(card).score_round(&winner);
            let points = scored.winner.as_ref().map_or(0, |w| w.score) - winner.score;
            let phase = TurnPhase::RoundOver {
                winner_id: winner.id.clone(),
            };
            let event = GameEvent::PlayerWins {
                player_id: winner.id,
                player_name: winner.name,
                points,
            };
            return Ok((self.with(scored, phase), event));
        }

        if card.card_type.is_wild() {
            // The wild leaves the hand only once its color is bound.
            let phase = TurnPhase::AwaitingColor { card_id };
            return Ok((
                self.with(self.state.clone(), phase),
                GameEvent::ColorRequired { player_id },
            ));
        }

        let state = state.apply_card_effect(card.clone(), None).advance_turn();
        let event = GameEvent::CardPlayed {
            player_id,
            player_name,
            card,
        };
        Ok((self.with(state, TurnPhase::Playing), event))
    }

    /// Binds the color for a wild answered correctly and resolves it.
    pub fn choose_color(&self, color: Color) -> Step {
        let card_id = match &self.phase {
            TurnPhase::AwaitingColor { card_id } => card_id,
            TurnPhase::RoundOver { .. } => return Err(GameError::GameAlreadyOver),
            _ => return Err(GameError::WrongPhase),
        };
        if color == Color::Wild {
            return Err(GameError::InvalidColor);
        }

        let player = self.state.current_player();
        let player_id = player.id.clone();
        let player_name = player.name.clone();

        let (state, card) = self.state.take_from_hand(&player_id, card_id)?;
        let state = state
            .apply_card_effect(card.clone(), Some(color))
            .advance_turn();
        let played = Card { color, ..card };
        let event = GameEvent::CardPlayed {
            player_id,
            player_name,
            card: played,
        };
        Ok((self.with(state, TurnPhase::Playing), event))
    }

    /// Draws a single card instead of playing, ending the turn.
    pub fn draw_instead(&self) -> Step {
        self.expect_playing()?;
        let player = self.state.current_player();
        let event = GameEvent::CardDrawn {
            player_id: player.id.clone(),
            player_name: player.name.clone(),
        };
        let state = self.state.draw(&player.id, 1).advance_turn();
        Ok((self.with(state, TurnPhase::Playing), event))
    }

    /// Whole seconds since the round was dealt.
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> u64 {
        (now - self.started_at).num_seconds().max(0) as u64
    }

    /// Summary for the match recorder, once a winner exists.
    pub fn to_record(&self, duration_secs: u64) -> Option<RoundRecord> {
        if !self.is_over() {
            return None;
        }
        let winner = self.state.winner.as_ref()?;
        Some(RoundRecord {
            id: uuid::Uuid::new_v4().to_string(),
            date: Utc::now(),
            round_number: self.state.round_number,
            players: self
                .state
                .players
                .iter()
                .map(|p| PlayerSummary {
                    name: p.name.clone(),
                    avatar: p.avatar.clone(),
                    score: p.score,
                    cards_left: p.hand.len(),
                })
                .collect(),
            winner: winner.name.clone(),
            duration: duration_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz_game::card::tests::card;
    use crate::quiz_game::card::CardType;
    use crate::quiz_game::deck::DECK_SIZE;
    use crate::quiz_game::game::Direction;
    use crate::quiz_game::player::Player;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn number(color: Color, n: u8) -> Card {
        card(color, CardType::Number(n))
    }

    fn round_with(hands: Vec<Vec<Card>>, top: Card, deck: Vec<Card>) -> Round {
        let players: Vec<Player> = hands
            .into_iter()
            .enumerate()
            .map(|(seat, hand)| {
                let mut p = Player::new(seat, format!("P{}", seat));
                p.hand = hand;
                p
            })
            .collect();
        let message = format!("{}'s turn", players[0].name);
        Round::from_state(GameState {
            players,
            current_player_index: 0,
            direction: Direction::Clockwise,
            discard_pile: vec![top],
            deck,
            set_aside: Vec::new(),
            active_card: None,
            winner: None,
            round_number: 1,
            message,
        })
    }

    fn filler(count: usize) -> Vec<Card> {
        (0..count).map(|_| number(Color::Yellow, 1)).collect()
    }

    #[test]
    fn test_select_rejects_illegal_play() {
        let blue = number(Color::Blue, 3);
        let round = round_with(vec![vec![blue.clone()], vec![]], number(Color::Red, 5), filler(3));

        assert_eq!(round.select_card(&blue.id).unwrap_err(), GameError::InvalidMove);
        assert_eq!(round.select_card("nope").unwrap_err(), GameError::CardNotInHand);
    }

    #[test]
    fn test_select_poses_question() {
        let red = number(Color::Red, 3);
        let round = round_with(
            vec![vec![red.clone(), number(Color::Red, 4)], vec![number(Color::Red, 1)]],
            number(Color::Red, 5),
            filler(3),
        );

        let (round, event) = round.select_card(&red.id).unwrap();
        assert_eq!(round.phase, TurnPhase::AwaitingAnswer { card_id: red.id.clone() });
        assert_eq!(round.state.active_card.as_ref(), Some(&red));
        assert!(matches!(event, GameEvent::QuestionAsked { card_id, .. } if card_id == red.id));

        // No second selection or draw while a question is pending.
        assert_eq!(round.select_card(&red.id).unwrap_err(), GameError::WrongPhase);
        assert_eq!(round.draw_instead().unwrap_err(), GameError::WrongPhase);
    }

    #[test]
    fn test_correct_answer_plays_card_and_advances() {
        let red = number(Color::Red, 3);
        let round = round_with(
            vec![vec![red.clone(), number(Color::Blue, 4)], vec![number(Color::Red, 1)]],
            number(Color::Red, 5),
            filler(3),
        );

        let (round, _) = round.select_card(&red.id).unwrap();
        let (round, event) = round.answer(true).unwrap();

        assert!(matches!(event, GameEvent::CardPlayed { .. }));
        assert_eq!(round.phase, TurnPhase::Playing);
        assert_eq!(round.state.top_card(), Some(&red));
        assert_eq!(round.state.players[0].hand.len(), 1);
        assert_eq!(round.state.current_player_index, 1);
        assert!(round.state.active_card.is_none());
    }

    #[test]
    fn test_wrong_answer_draws_and_forfeits() {
        let red = number(Color::Red, 3);
        let round = round_with(
            vec![vec![red.clone()], vec![number(Color::Red, 1)]],
            number(Color::Red, 5),
            filler(3),
        );

        let (round, _) = round.select_card(&red.id).unwrap();
        let (round, event) = round.answer(false).unwrap();

        assert!(matches!(event, GameEvent::WrongAnswer { .. }));
        assert_eq!(round.state.players[0].hand.len(), 2);
        assert_eq!(round.state.deck.len(), 2);
        assert_eq!(round.state.current_player_index, 1);
        assert!(round.state.active_card.is_none());
        assert_eq!(round.state.discard_pile.len(), 1);
    }

    #[test]
    fn test_wild_waits_for_color() {
        let wild = card(Color::Wild, CardType::WildDrawFour);
        let round = round_with(
            vec![vec![wild.clone(), number(Color::Red, 2)], vec![number(Color::Red, 1)], vec![number(Color::Blue, 1)]],
            number(Color::Red, 5),
            filler(6),
        );

        let (round, _) = round.select_card(&wild.id).unwrap();
        let (round, event) = round.answer(true).unwrap();
        assert!(matches!(event, GameEvent::ColorRequired { .. }));
        assert_eq!(round.phase, TurnPhase::AwaitingColor { card_id: wild.id.clone() });
        assert_eq!(round.state.players[0].hand.len(), 2);
        assert_eq!(round.state.active_card.as_ref(), Some(&wild));

        assert_eq!(round.choose_color(Color::Wild).unwrap_err(), GameError::InvalidColor);

        let (round, event) = round.choose_color(Color::Green).unwrap();
        assert!(matches!(event, GameEvent::CardPlayed { ref card, .. } if card.color == Color::Green));
        assert_eq!(round.state.current_color(), Color::Green);
        assert_eq!(round.state.players[0].hand.len(), 1);
        assert_eq!(round.state.players[1].hand.len(), 5);
        assert_eq!(round.state.current_player_index, 2);
        assert_eq!(round.phase, TurnPhase::Playing);
        assert!(round.state.active_card.is_none());
    }

    #[test]
    fn test_dealt_round_conserves_cards_through_wild_play() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut state =
            GameState::deal_with_rng(vec!["A".to_string(), "B".to_string()], &mut rng).unwrap();
        // Swap a wild from the deck into A's hand so the play is legal.
        let position = state
            .deck
            .iter()
            .position(|c| c.card_type == CardType::Wild)
            .unwrap();
        let wild = state.deck.remove(position);
        state.players[0].hand.push(wild.clone());
        let round = Round::from_state(state);
        assert_eq!(round.state.total_cards(), DECK_SIZE);

        let (round, _) = round.select_card(&wild.id).unwrap();
        assert_eq!(round.state.total_cards(), DECK_SIZE);

        let (round, _) = round.answer(true).unwrap();
        assert_eq!(round.phase, TurnPhase::AwaitingColor { card_id: wild.id.clone() });
        assert_eq!(round.state.total_cards(), DECK_SIZE);

        let (round, _) = round.choose_color(Color::Blue).unwrap();
        assert_eq!(round.state.total_cards(), DECK_SIZE);
        assert_eq!(round.state.current_color(), Color::Blue);

        let (round, _) = round.draw_instead().unwrap();
        assert_eq!(round.state.total_cards(), DECK_SIZE);
    }

    #[test]
    fn test_winning_wild_needs_no_color() {
        let wild = card(Color::Wild, CardType::Wild);
        let round = round_with(
            vec![vec![wild.clone()], vec![number(Color::Green, 7)]],
            number(Color::Red, 5),
            filler(3),
        );

        let (round, _) = round.select_card(&wild.id).unwrap();
        let (round, event) = round.answer(true).unwrap();

        assert!(matches!(event, GameEvent::PlayerWins { points: 7, .. }));
        assert!(round.is_over());
        assert_eq!(round.state.top_card(), Some(&wild));
        assert_eq!(round.state.current_color(), Color::FALLBACK);
        assert_eq!(round.choose_color(Color::Blue).unwrap_err(), GameError::GameAlreadyOver);
    }

    #[test]
    fn test_last_card_wins_and_scores() {
        let last = number(Color::Red, 9);
        let round = round_with(
            vec![vec![last.clone()], vec![card(Color::Blue, CardType::DrawTwo), number(Color::Green, 7)]],
            number(Color::Red, 5),
            filler(3),
        );
        let in_play = round.state.cards_in_play();

        let (round, _) = round.select_card(&last.id).unwrap();
        let (round, event) = round.answer(true).unwrap();

        match event {
            GameEvent::PlayerWins { player_name, points, .. } => {
                assert_eq!(player_name, "P0");
                assert_eq!(points, 27);
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert!(round.is_over());
        assert_eq!(round.state.players[0].score, 27);
        assert_eq!(round.state.top_card(), Some(&last));
        assert_eq!(round.state.cards_in_play(), in_play);

        assert_eq!(round.draw_instead().unwrap_err(), GameError::GameAlreadyOver);
        assert_eq!(round.answer(true).unwrap_err(), GameError::GameAlreadyOver);
    }

    #[test]
    fn test_winning_draw_two_has_no_effect() {
        let last = card(Color::Red, CardType::DrawTwo);
        let round = round_with(
            vec![vec![last.clone()], vec![number(Color::Green, 7)]],
            number(Color::Red, 5),
            filler(3),
        );

        let (round, _) = round.select_card(&last.id).unwrap();
        let (round, _) = round.answer(true).unwrap();
        assert!(round.is_over());
        assert_eq!(round.state.players[1].hand.len(), 1);
        assert_eq!(round.state.players[0].score, 7);
    }

    #[test]
    fn test_draw_instead() {
        let round = round_with(vec![vec![number(Color::Blue, 1)], vec![]], number(Color::Red, 5), filler(2));

        let (round, event) = round.draw_instead().unwrap();
        assert!(matches!(event, GameEvent::CardDrawn { ref player_name, .. } if player_name == "P0"));
        assert_eq!(round.state.players[0].hand.len(), 2);
        assert_eq!(round.state.current_player_index, 1);
    }

    #[test]
    fn test_to_record_and_next_round() {
        let last = number(Color::Red, 9);
        let round = round_with(
            vec![vec![last.clone()], vec![number(Color::Green, 7), number(Color::Green, 2)]],
            number(Color::Red, 5),
            filler(3),
        );
        assert!(round.to_record(10).is_none());
        assert_eq!(round.next_round().unwrap_err(), GameError::WrongPhase);

        let (round, _) = round.select_card(&last.id).unwrap();
        let (round, _) = round.answer(true).unwrap();

        let record = round.to_record(95).unwrap();
        assert_eq!(record.winner, "P0");
        assert_eq!(record.round_number, 1);
        assert_eq!(record.duration, 95);
        assert_eq!(record.players[0].score, 9);
        assert_eq!(record.players[0].cards_left, 0);
        assert_eq!(record.players[1].cards_left, 2);

        let next = round.next_round().unwrap();
        assert_eq!(next.state.round_number, 2);
        assert_eq!(next.phase, TurnPhase::Playing);
        assert_eq!(next.state.players[0].score, 9);
    }

    #[test]
    fn test_start_and_elapsed() {
        let round = Round::start(vec!["Alice".to_string(), "Bob".to_string()]).unwrap();
        assert_eq!(round.phase, TurnPhase::Playing);
        let later = round.started_at + chrono::Duration::seconds(42);
        assert_eq!(round.elapsed_secs(later), 42);
        assert_eq!(round.elapsed_secs(round.started_at - chrono::Duration::seconds(5)), 0);
    }
}
