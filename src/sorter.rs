use crate::card::{CardRecord, SortKey};
use std::cmp::Ordering;

pub fn sort_cards(cards: &[CardRecord], key: SortKey) -> Vec<CardRecord> {
    let mut sorted = cards.to_vec();
    sort_in_place(&mut sorted, key);
    sorted
}

/// Stable: cards with equal keys keep their relative order.
pub fn sort_in_place(cards: &mut [CardRecord], key: SortKey) {
    cards.sort_by(|a, b| compare_by(a, b, key));
}

/// Ascending comparison on one field. Text compares by code point, numbers
/// numerically, `false` before `true`. Absent values, including the numeric
/// sentinel, come after every present value.
pub fn compare_by(a: &CardRecord, b: &CardRecord, key: SortKey) -> Ordering {
    match key {
        SortKey::Set => absent_last(&a.set, &b.set),
        SortKey::Number => absent_last(&a.number, &b.number),
        SortKey::Name => absent_last(&a.name, &b.name),
        SortKey::Type => absent_last(&a.card_type, &b.card_type),
        SortKey::Aspects => absent_last(&a.aspects, &b.aspects),
        SortKey::Traits => absent_last(&a.traits, &b.traits),
        SortKey::Arenas => absent_last(&a.arenas, &b.arenas),
        SortKey::Cost => absent_last(&a.cost, &b.cost),
        SortKey::Power => absent_last(&a.power, &b.power),
        SortKey::Hp => absent_last(&a.hp, &b.hp),
        SortKey::FrontText => absent_last(&a.front_text, &b.front_text),
        SortKey::DoubleSided => absent_last(&a.double_sided, &b.double_sided),
        SortKey::Rarity => absent_last(&a.rarity, &b.rarity),
        SortKey::Unique => absent_last(&a.unique, &b.unique),
        SortKey::Artist => absent_last(&a.artist, &b.artist),
        SortKey::VariantType => absent_last(&a.variant_type, &b.variant_type),
        SortKey::MarketPrice => absent_last(&a.market_price, &b.market_price),
        SortKey::FoilPrice => absent_last(&a.foil_price, &b.foil_price),
        SortKey::FrontArt => absent_last(&a.front_art, &b.front_art),
        SortKey::Id => a.id.cmp(&b.id),
    }
}

fn absent_last<T: Ord>(a: &Option<T>, b: &Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
#[path = "tests/sorter_tests.rs"]
mod tests;
