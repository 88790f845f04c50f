use super::card::{Card, CardType, Color};
use super::deck::build_deck_with_rng;
use super::player::Player;
use super::rules;
use log::{debug, info, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const HAND_SIZE: usize = 7;
pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameError {
    InvalidPlayerCount(usize),
    EmptyPlayerName,
    DuplicatePlayerName(String),
    EmptyDeck,
    InvalidMove,
    CardNotInHand,
    InvalidColor,
    WrongPhase,
    GameAlreadyOver,
}

impl std::fmt::Display for GameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameError::InvalidPlayerCount(n) => write!(
                f,
                "A round needs {} to {} players, got {}",
                MIN_PLAYERS, MAX_PLAYERS, n
            ),
            GameError::EmptyPlayerName => write!(f, "Player names must not be empty"),
            GameError::DuplicatePlayerName(name) => {
                write!(f, "Player name {} is already taken", name)
            }
            GameError::EmptyDeck => write!(f, "Deck is empty"),
            GameError::InvalidMove => write!(f, "Card cannot be played on the current discard"),
            GameError::CardNotInHand => write!(f, "Card not in hand"),
            GameError::InvalidColor => write!(f, "Choose red, blue, green or yellow"),
            GameError::WrongPhase => write!(f, "Action not allowed right now"),
            GameError::GameAlreadyOver => write!(f, "Round is already over"),
        }
    }
}

impl std::error::Error for GameError {}

/// Represents the direction of play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Clockwise,
    CounterClockwise,
}

impl Direction {
    pub fn reverse(&self) -> Self {
        match self {
            Direction::Clockwise => Direction::CounterClockwise,
            Direction::CounterClockwise => Direction::Clockwise,
        }
    }

    /// Seat offset per turn: +1 or -1.
    pub fn step(&self) -> isize {
        match self {
            Direction::Clockwise => 1,
            Direction::CounterClockwise => -1,
        }
    }
}

/// Authoritative state of one round.
///
/// Every transition takes `&self` and returns a fresh state; callers hold the
/// latest value and drop the previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub players: Vec<Player>,
    pub current_player_index: usize,
    pub direction: Direction,
    /// Last element is the active card.
    pub discard_pile: Vec<Card>,
    /// Drawn from the front.
    pub deck: Vec<Card>,
    /// Action and wild cards turned over while seeding the discard pile.
    /// They take no further part in the round.
    #[serde(default)]
    pub set_aside: Vec<Card>,
    pub active_card: Option<Card>,
    pub winner: Option<Player>,
    pub round_number: u32,
    pub message: String,
}

impl GameState {
    /// Deals a fresh round 1 for the given player names.
    pub fn deal(player_names: Vec<String>) -> Result<Self, GameError> {
        Self::deal_with_rng(player_names, &mut rand::rng())
    }

    pub fn deal_with_rng<R: Rng + ?Sized>(
        player_names: Vec<String>,
        rng: &mut R,
    ) -> Result<Self, GameError> {
        let players = player_names
            .into_iter()
            .enumerate()
            .map(|(seat, name)| {
                let name = name.trim().to_string();
                if name.is_empty() {
                    Err(GameError::EmptyPlayerName)
                } else {
                    Ok(Player::new(seat, name))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        // Win tallies are keyed by name.
        let mut seen = HashSet::new();
        for player in &players {
            if !seen.insert(player.name.to_lowercase()) {
                return Err(GameError::DuplicatePlayerName(player.name.clone()));
            }
        }

        Self::from_deck(players, build_deck_with_rng(rng), 1)
    }

    /// Deals `deck` to `players` in seat order and seeds the discard pile.
    ///
    /// Hands are emptied first, so players carried over from an earlier round
    /// keep only their id, name, avatar and score.
    pub fn from_deck(
        mut players: Vec<Player>,
        deck: Vec<Card>,
        round_number: u32,
    ) -> Result<Self, GameError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&players.len()) {
            return Err(GameError::InvalidPlayerCount(players.len()));
        }
        if deck.len() < players.len() * HAND_SIZE + 1 {
            return Err(GameError::EmptyDeck);
        }

        let mut cards = deck.into_iter();
        for player in players.iter_mut() {
            player.hand.clear();
        }
        // One card per player per pass
        for _ in 0..HAND_SIZE {
            for player in players.iter_mut() {
                let card = cards.next().ok_or(GameError::EmptyDeck)?;
                player.add_card(card);
            }
        }

        let mut remaining: Vec<Card> = cards.collect();
        let top_index = remaining
            .iter()
            .position(|card| matches!(card.card_type, CardType::Number(_)))
            .ok_or(GameError::EmptyDeck)?;
        let set_aside: Vec<Card> = remaining.drain(..top_index).collect();
        let top_card = remaining.remove(0);

        if !set_aside.is_empty() {
            debug!(
                "Set aside {} non-number card(s) while seeding the discard pile",
                set_aside.len()
            );
        }

        let message = format!("{}'s turn", players[0].name);
        info!(
            "Dealt round {} to {} players, starting card {}",
            round_number,
            players.len(),
            top_card
        );

        Ok(Self {
            players,
            current_player_index: 0,
            direction: Direction::Clockwise,
            discard_pile: vec![top_card],
            deck: remaining,
            set_aside,
            active_card: None,
            winner: None,
            round_number,
            message,
        })
    }

    /// Deals the next round to the same seats, carrying cumulative scores.
    pub fn next_round(&self) -> Result<Self, GameError> {
        self.next_round_with_rng(&mut rand::rng())
    }

    pub fn next_round_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Self, GameError> {
        Self::from_deck(
            self.players.clone(),
            build_deck_with_rng(rng),
            self.round_number + 1,
        )
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn current_player(&self) -> &Player {
        &self.players[self.current_player_index]
    }

    pub fn player_index(&self, player_id: &str) -> Option<usize> {
        self.players.iter().position(|p| p.id == player_id)
    }

    pub fn top_card(&self) -> Option<&Card> {
        self.discard_pile.last()
    }

    /// Color new plays must match: the top card's (resolved) color.
    ///
    /// A wild that ended a round sits on the pile unresolved and reads as
    /// the fallback color.
    pub fn current_color(&self) -> Color {
        self.top_card()
            .map(|card| card.color)
            .filter(|color| *color != Color::Wild)
            .unwrap_or(Color::FALLBACK)
    }

    /// Cards the current player could legally play right now.
    pub fn playable_cards(&self) -> Vec<&Card> {
        match self.top_card() {
            Some(top) => {
                rules::playable_cards(&self.current_player().hand, top, self.current_color())
            }
            None => Vec::new(),
        }
    }

    /// Players holding exactly one card.
    pub fn players_on_last_card(&self) -> Vec<&Player> {
        self.players.iter().filter(|p| p.hand.len() == 1).collect()
    }

    /// Cards in the deck, the discard pile and every hand.
    pub fn cards_in_play(&self) -> usize {
        self.deck.len()
            + self.discard_pile.len()
            + self.players.iter().map(|p| p.hand.len()).sum::<usize>()
    }

    /// `cards_in_play` plus the cards set aside at deal time.
    pub fn total_cards(&self) -> usize {
        self.cards_in_play() + self.set_aside.len()
    }

    fn next_index(&self) -> usize {
        let count = self.players.len() as isize;
        (self.current_player_index as isize + self.direction.step()).rem_euclid(count) as usize
    }

    /// Moves `count` cards from the front of the deck to the player's hand,
    /// recycling the discard pile first if the deck runs short.
    pub fn draw(&self, player_id: &str, count: usize) -> Self {
        self.draw_with_rng(player_id, count, &mut rand::rng())
    }

    pub fn draw_with_rng<R: Rng + ?Sized>(&self, player_id: &str, count: usize, rng: &mut R) -> Self {
        let mut next = self.clone();
        next.draw_in_place(player_id, count, rng);
        next
    }

    fn draw_in_place<R: Rng + ?Sized>(&mut self, player_id: &str, count: usize, rng: &mut R) {
        let Some(index) = self.player_index(player_id) else {
            warn!("Ignoring draw for unknown player {}", player_id);
            return;
        };

        if self.deck.len() < count {
            self.recycle_discard_pile(rng);
        }

        let available = count.min(self.deck.len());
        if available < count {
            warn!(
                "Only {} of {} cards left to draw for {}",
                available, count, self.players[index].name
            );
        }

        let drawn: Vec<Card> = self.deck.drain(..available).collect();
        debug!("{} draws {} card(s)", self.players[index].name, drawn.len());
        self.players[index].hand.extend(drawn);
    }

    /// Shuffles everything under the top discard back into the deck.
    /// Wilds get their placeholder color back.
    fn recycle_discard_pile<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let Some(top) = self.discard_pile.pop() else {
            return;
        };

        let mut recycled: Vec<Card> = self
            .discard_pile
            .drain(..)
            .map(|mut card| {
                if card.card_type.is_wild() {
                    card.color = Color::Wild;
                }
                card
            })
            .collect();
        recycled.shuffle(rng);

        debug!("Reshuffled {} discarded card(s) into the deck", recycled.len());
        self.deck.extend(recycled);
        self.discard_pile.push(top);
    }

    /// Passes the turn to the next seat in the current direction.
    pub fn advance_turn(&self) -> Self {
        let mut next = self.clone();
        next.advance_in_place();
        next
    }

    fn advance_in_place(&mut self) {
        self.current_player_index = self.next_index();
        self.message = format!("{}'s turn", self.current_player().name);
    }

    /// Puts `card` on the discard pile and resolves its action.
    ///
    /// The caller removes the card from the hand beforehand and advances the
    /// turn afterwards; skipping effects advance once internally.
    pub fn apply_card_effect(&self, card: Card, chosen_color: Option<Color>) -> Self {
        self.apply_card_effect_with_rng(card, chosen_color, &mut rand::rng())
    }

    pub fn apply_card_effect_with_rng<R: Rng + ?Sized>(
        &self,
        mut card: Card,
        chosen_color: Option<Color>,
        rng: &mut R,
    ) -> Self {
        let mut next = self.clone();
        next.active_card = None;
        debug!("{} plays {}", next.current_player().name, card);

        match card.card_type {
            CardType::Number(_) => {
                next.discard_pile.push(card);
            }
            CardType::Skip => {
                next.discard_pile.push(card);
                let skipped = next.next_index();
                next.advance_in_place();
                next.message = format!("⊘ {} is skipped!", next.players[skipped].name);
            }
            CardType::Reverse => {
                next.discard_pile.push(card);
                next.direction = next.direction.reverse();
                // With two seats a reverse hands the turn straight back.
                if next.player_count() == 2 {
                    next.advance_in_place();
                }
                next.message = "↺ Direction reversed!".to_string();
            }
            CardType::DrawTwo => {
                next.discard_pile.push(card);
                next.force_draw_and_skip(2, rng);
            }
            CardType::Wild => {
                card.color = resolve_wild_color(chosen_color);
                next.message = format!("★ Wild! Color is now {}", card.color);
                next.discard_pile.push(card);
            }
            CardType::WildDrawFour => {
                card.color = resolve_wild_color(chosen_color);
                next.discard_pile.push(card);
                next.force_draw_and_skip(4, rng);
            }
        }

        next
    }

    fn force_draw_and_skip<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) {
        let target = self.next_index();
        let target_id = self.players[target].id.clone();
        self.draw_in_place(&target_id, count, rng);
        self.advance_in_place();
        self.message = format!("+{} {} draws {} cards!", count, self.players[target].name, count);
    }

    /// Puts a card on the discard pile without resolving its action.
    /// Used for the card that empties a hand and ends the round.
    pub fn place_on_discard(&self, card: Card) -> Self {
        let mut next = self.clone();
        next.active_card = None;
        next.discard_pile.push(card);
        next
    }

    /// Removes a card from a player's hand, returning the new state and the card.
    pub fn take_from_hand(&self, player_id: &str, card_id: &str) -> Result<(Self, Card), GameError> {
        let index = self.player_index(player_id).ok_or(GameError::CardNotInHand)?;
        let mut next = self.clone();
        let card = next.players[index].remove_card(card_id)?;
        Ok((next, card))
    }

    /// First player in seat order with an empty hand.
    pub fn check_winner(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.has_won())
    }

    /// Adds every other player's hand points to the winner's score.
    ///
    /// Must be called exactly once per round; a second call scores again.
    pub fn score_round(&self, winner: &Player) -> Self {
        let mut next = self.clone();
        let Some(index) = next.player_index(&winner.id) else {
            warn!("Ignoring score for unknown player {}", winner.id);
            return next;
        };

        let points: u32 = next
            .players
            .iter()
            .filter(|p| p.id != winner.id)
            .map(Player::hand_points)
            .sum();

        next.players[index].score += points;
        next.winner = Some(next.players[index].clone());
        next.message = format!("🏆 {} wins round {} (+{} points)", winner.name, next.round_number, points);
        info!(
            "{} wins round {} for {} points",
            winner.name, next.round_number, points
        );
        next
    }
}

fn resolve_wild_color(chosen_color: Option<Color>) -> Color {
    match chosen_color {
        Some(Color::Wild) | None => {
            warn!("Wild resolved without a color, using {}", Color::FALLBACK);
            Color::FALLBACK
        }
        Some(color) => color,
    }
}
