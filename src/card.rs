use crate::error::CardListError;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// A card exactly as the search endpoint delivers it. Nothing about its
/// shape is guaranteed.
pub type RawCardRecord = Map<String, Value>;

/// Body of a search response. Only `data` is read; a missing `data` key is
/// the same as `null`. The body itself must be a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPayload {
    pub data: Value,
}

impl<'de> Deserialize<'de> for SearchPayload {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut body = Map::<String, Value>::deserialize(deserializer)?;
        Ok(SearchPayload {
            data: body.remove("data").unwrap_or(Value::Null),
        })
    }
}

impl SearchPayload {
    pub fn new(data: Value) -> Self {
        SearchPayload { data }
    }
}

/// Canonical card shape used by the sorter and the surface.
///
/// `None` on a text field means the raw field was absent or not a scalar.
/// `None` on `cost`, `power` or `hp` is the not-a-number sentinel.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CardRecord {
    pub set: Option<String>,
    pub number: Option<String>,
    pub name: Option<String>,
    pub card_type: Option<String>,
    pub aspects: Option<Vec<String>>,
    pub traits: Option<Vec<String>>,
    pub arenas: Option<Vec<String>>,
    pub cost: Option<i64>,
    pub power: Option<i64>,
    pub hp: Option<i64>,
    pub front_text: Option<String>,
    pub double_sided: Option<bool>,
    pub rarity: Option<String>,
    pub unique: Option<bool>,
    pub artist: Option<String>,
    pub variant_type: Option<String>,
    pub market_price: Option<String>,
    pub foil_price: Option<String>,
    pub front_art: Option<String>,
    pub id: String,
}

/// Field a card list can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortKey {
    Set,
    Number,
    #[default]
    Name,
    Type,
    Aspects,
    Traits,
    Arenas,
    Cost,
    Power,
    Hp,
    FrontText,
    DoubleSided,
    Rarity,
    Unique,
    Artist,
    VariantType,
    MarketPrice,
    FoilPrice,
    FrontArt,
    Id,
}

impl SortKey {
    pub const ALL: [SortKey; 20] = [
        SortKey::Set,
        SortKey::Number,
        SortKey::Name,
        SortKey::Type,
        SortKey::Aspects,
        SortKey::Traits,
        SortKey::Arenas,
        SortKey::Cost,
        SortKey::Power,
        SortKey::Hp,
        SortKey::FrontText,
        SortKey::DoubleSided,
        SortKey::Rarity,
        SortKey::Unique,
        SortKey::Artist,
        SortKey::VariantType,
        SortKey::MarketPrice,
        SortKey::FoilPrice,
        SortKey::FrontArt,
        SortKey::Id,
    ];

    pub fn field_name(self) -> &'static str {
        match self {
            SortKey::Set => "set",
            SortKey::Number => "number",
            SortKey::Name => "name",
            SortKey::Type => "type",
            SortKey::Aspects => "aspects",
            SortKey::Traits => "traits",
            SortKey::Arenas => "arenas",
            SortKey::Cost => "cost",
            SortKey::Power => "power",
            SortKey::Hp => "hp",
            SortKey::FrontText => "fronttext",
            SortKey::DoubleSided => "doublesided",
            SortKey::Rarity => "rarity",
            SortKey::Unique => "unique",
            SortKey::Artist => "artist",
            SortKey::VariantType => "varianttype",
            SortKey::MarketPrice => "marketprice",
            SortKey::FoilPrice => "foilprice",
            SortKey::FrontArt => "frontArt",
            SortKey::Id => "id",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.field_name())
    }
}

impl FromStr for SortKey {
    type Err = CardListError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        SortKey::ALL
            .into_iter()
            .find(|key| key.field_name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CardListError::InvalidSortKey(s.to_string()))
    }
}
