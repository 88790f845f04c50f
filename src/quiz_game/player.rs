use super::card::Card;
use super::game::GameError;
use serde::{Deserialize, Serialize};

pub const AVATARS: [&str; 12] = [
    "🦁", "🐯", "🦊", "🐺", "🦝", "🐻", "🐼", "🦄", "🐉", "🦋", "🦅", "🐬",
];

/// Stable avatar for a seat.
pub fn avatar_for_seat(seat: usize) -> &'static str {
    AVATARS[seat % AVATARS.len()]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub avatar: String,
    /// Acquisition order.
    pub hand: Vec<Card>,
    pub score: u32,
}

impl Player {
    pub fn new(seat: usize, name: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            avatar: avatar_for_seat(seat).to_string(),
            hand: Vec::new(),
            score: 0,
        }
    }

    /// Adds a card to the end of the player's hand.
    pub fn add_card(&mut self, card: Card) {
        self.hand.push(card);
    }

    /// Removes the card with the given id from the player's hand.
    /// Returns `Err(GameError::CardNotInHand)` if the player does not hold it.
    pub fn remove_card(&mut self, card_id: &str) -> Result<Card, GameError> {
        let index = self
            .hand
            .iter()
            .position(|card| card.id == card_id)
            .ok_or(GameError::CardNotInHand)?;
        Ok(self.hand.remove(index))
    }

    pub fn find_card(&self, card_id: &str) -> Option<&Card> {
        self.hand.iter().find(|card| card.id == card_id)
    }

    /// Checks if the player has won (i.e., their hand is empty).
    pub fn has_won(&self) -> bool {
        self.hand.is_empty()
    }

    /// Points held in hand, counted towards the winner's score.
    pub fn hand_points(&self) -> u32 {
        self.hand.iter().map(Card::points).sum()
    }
}
