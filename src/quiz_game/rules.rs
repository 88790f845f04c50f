use super::card::{Card, CardType, Color};

/// Checks whether `card` may be played on `top_card` while `active_color` is in force.
///
/// Side-effect free; safe to call for advisory "playable" highlighting as well as
/// for validating an actual play.
pub fn can_play(card: &Card, top_card: &Card, active_color: Color) -> bool {
    if card.card_type.is_wild() {
        return true;
    }

    if card.color == active_color || card.color == top_card.color {
        return true;
    }

    match (card.card_type, top_card.card_type) {
        (CardType::Number(n), CardType::Number(m)) => n == m,
        (CardType::Number(_), _) => false,
        (action, top_action) => action == top_action,
    }
}

/// Cards in `hand` that are currently legal, in hand order.
pub fn playable_cards<'a>(hand: &'a [Card], top_card: &Card, active_color: Color) -> Vec<&'a Card> {
    hand.iter()
        .filter(|card| can_play(card, top_card, active_color))
        .collect()
}
