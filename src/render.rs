use crate::card::CardRecord;
use crate::card_list_machine::CardListState;

/// One line per card. Absent text and the numeric sentinel print as `-`.
pub fn card_line(card: &CardRecord) -> String {
    format!(
        "[{}] {} | {} | Cost: {} Power: {} HP: {} | {}",
        card.id,
        text_or_dash(&card.name),
        text_or_dash(&card.card_type),
        stat(card.cost),
        stat(card.power),
        stat(card.hp),
        text_or_dash(&card.rarity),
    )
}

pub fn state_lines(state: &CardListState) -> Vec<String> {
    match state {
        CardListState::Idle | CardListState::Loading => vec!["Loading cards...".to_string()],
        CardListState::Error { message } => {
            vec!["Failed to load cards.".to_string(), format!("Reason: {message}")]
        }
        CardListState::Ready { cards } if cards.is_empty() => vec!["No cards found.".to_string()],
        CardListState::Ready { cards } => {
            let mut lines = Vec::with_capacity(cards.len() + 1);
            lines.push(format!("Cards ({}):", cards.len()));
            lines.extend(cards.iter().map(card_line));
            lines
        }
    }
}

fn text_or_dash(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("-")
}

fn stat(value: Option<i64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}
