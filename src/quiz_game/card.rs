use super::question::Question;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    Red,
    Blue,
    Green,
    Yellow,
    Wild,
}

impl Color {
    /// Colors a player may choose for a wild, in picker order.
    pub const PLAYABLE: [Color; 4] = [Color::Red, Color::Blue, Color::Green, Color::Yellow];

    /// Used when a wild is resolved without a choice or the discard pile is empty.
    pub const FALLBACK: Color = Color::Red;

    pub fn parse(name: &str) -> Option<Color> {
        match name.trim().to_lowercase().as_str() {
            "red" => Some(Color::Red),
            "blue" => Some(Color::Blue),
            "green" => Some(Color::Green),
            "yellow" => Some(Color::Yellow),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Color::Red => "Red",
            Color::Blue => "Blue",
            Color::Green => "Green",
            Color::Yellow => "Yellow",
            Color::Wild => "Wild",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardType {
    Number(u8),
    Skip,
    Reverse,
    DrawTwo,
    Wild,
    WildDrawFour,
}

impl CardType {
    pub fn is_wild(&self) -> bool {
        matches!(self, CardType::Wild | CardType::WildDrawFour)
    }

    /// Points this card is worth when left in a loser's hand.
    pub fn points(&self) -> u32 {
        match self {
            CardType::Number(n) => u32::from(*n),
            CardType::Wild | CardType::WildDrawFour => 50,
            CardType::Skip | CardType::Reverse | CardType::DrawTwo => 20,
        }
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardType::Number(n) => write!(f, "{}", n),
            CardType::Skip => write!(f, "Skip"),
            CardType::Reverse => write!(f, "Reverse"),
            CardType::DrawTwo => write!(f, "+2"),
            CardType::Wild => write!(f, "Wild"),
            CardType::WildDrawFour => write!(f, "Wild +4"),
        }
    }
}

/// A single card. Many cards may share the same `Question`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub color: Color,
    pub card_type: CardType,
    pub question: Arc<Question>,
}

impl Card {
    pub fn new(color: Color, card_type: CardType, question: Arc<Question>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            color,
            card_type,
            question,
        }
    }

    /// Face value, present only for number cards.
    pub fn value(&self) -> Option<u8> {
        match self.card_type {
            CardType::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn points(&self) -> u32 {
        self.card_type.points()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.color == Color::Wild {
            write!(f, "{}", self.card_type)
        } else {
            write!(f, "{} {}", self.color, self.card_type)
        }
    }
}
