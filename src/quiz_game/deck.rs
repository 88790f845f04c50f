use super::card::{Card, CardType, Color};
use super::question::{all_questions, Question};
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;

pub const DECK_SIZE: usize = 108;

/// Builds a full shuffled 108-card deck, each card bound to a trivia question.
pub fn build_deck() -> Vec<Card> {
    build_deck_with_rng(&mut rand::rng())
}

pub fn build_deck_with_rng<R: Rng + ?Sized>(rng: &mut R) -> Vec<Card> {
    let mut questions = all_questions();
    questions.shuffle(rng);
    let mut assigner = QuestionCycle::new(questions);

    let mut deck = Vec::with_capacity(DECK_SIZE);

    for color in Color::PLAYABLE {
        deck.push(Card::new(color, CardType::Number(0), assigner.next()));

        // Two copies of each of 1-9
        for number in 1..=9 {
            deck.push(Card::new(color, CardType::Number(number), assigner.next()));
            deck.push(Card::new(color, CardType::Number(number), assigner.next()));
        }

        for card_type in [CardType::Skip, CardType::Reverse, CardType::DrawTwo] {
            deck.push(Card::new(color, card_type, assigner.next()));
            deck.push(Card::new(color, card_type, assigner.next()));
        }
    }

    for _ in 0..4 {
        deck.push(Card::new(Color::Wild, CardType::Wild, assigner.next()));
    }
    for _ in 0..4 {
        deck.push(Card::new(Color::Wild, CardType::WildDrawFour, assigner.next()));
    }

    deck.shuffle(rng);
    deck
}

/// Hands out questions from a pre-shuffled catalog, wrapping around when exhausted.
struct QuestionCycle {
    questions: Vec<Arc<Question>>,
    position: usize,
}

impl QuestionCycle {
    fn new(questions: Vec<Arc<Question>>) -> Self {
        Self {
            questions,
            position: 0,
        }
    }

    fn next(&mut self) -> Arc<Question> {
        let question = Arc::clone(&self.questions[self.position % self.questions.len()]);
        self.position += 1;
        question
    }
}
