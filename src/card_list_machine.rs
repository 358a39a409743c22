//! Fetch lifecycle of a card list as an explicit state machine.
//!
//! [`CardListMachine::handle`] takes one [`Input`] and returns the
//! [`Effect`]s it causes, in order. The machine never performs I/O; the
//! async driver in [`crate::cards_controller`] runs the fetches and
//! publishes the states.

use crate::card::{CardRecord, SearchPayload, SortKey};
use crate::error::SearchError;
use crate::normalizer::normalize_payload;
use crate::sorter::{sort_cards, sort_in_place};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Token attached to each fetch. Larger is newer.
pub type RequestToken = u64;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum CardListState {
    #[default]
    Idle,
    Loading,
    Error {
        message: String,
    },
    Ready {
        cards: Arc<Vec<CardRecord>>,
    },
}

impl CardListState {
    pub fn is_settled(&self) -> bool {
        matches!(self, CardListState::Ready { .. } | CardListState::Error { .. })
    }

    pub fn cards(&self) -> Option<&[CardRecord]> {
        match self {
            CardListState::Ready { cards } => Some(cards.as_slice()),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum Input {
    Start,
    FilterChanged(String),
    SortRequested(SortKey),
    Response {
        token: RequestToken,
        result: Result<SearchPayload, SearchError>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Publish(CardListState),
    Fetch {
        token: RequestToken,
        filter: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MachineConfig {
    pub initial_filter: String,
    pub initial_sort: SortKey,
    /// When false, every response is applied and the last one to arrive
    /// wins, whichever request it answers.
    pub discard_stale_responses: bool,
}

impl Default for MachineConfig {
    fn default() -> Self {
        MachineConfig {
            initial_filter: String::new(),
            initial_sort: SortKey::default(),
            discard_stale_responses: true,
        }
    }
}

#[derive(Debug)]
pub struct CardListMachine {
    filter: String,
    sort_key: SortKey,
    held: Arc<Vec<CardRecord>>,
    state: CardListState,
    last_issued: RequestToken,
    discard_stale: bool,
}

impl CardListMachine {
    pub fn new(config: MachineConfig) -> Self {
        CardListMachine {
            filter: config.initial_filter,
            sort_key: config.initial_sort,
            held: Arc::new(Vec::new()),
            state: CardListState::Idle,
            last_issued: 0,
            discard_stale: config.discard_stale_responses,
        }
    }

    pub fn state(&self) -> &CardListState {
        &self.state
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    // Survives loading and error states until a newer response replaces it.
    pub fn held_cards(&self) -> &[CardRecord] {
        &self.held
    }

    pub fn handle(&mut self, input: Input) -> Vec<Effect> {
        match input {
            Input::Start => self.begin_fetch(Vec::new()),
            Input::FilterChanged(filter) => {
                if filter == self.filter {
                    debug!(%filter, "filter unchanged");
                    return vec![self.publish_current()];
                }
                self.filter = filter;
                self.begin_fetch(Vec::new())
            }
            Input::SortRequested(key) => self.request_sort(key),
            Input::Response { token, result } => self.apply_response(token, result),
        }
    }

    // A sort request re-sorts what is held right away and, if the key moved,
    // also re-fetches. The fetch result usually replaces the local re-sort a
    // moment later. Both effects are intended.
    fn request_sort(&mut self, key: SortKey) -> Vec<Effect> {
        let mut effects = Vec::new();

        let mut resorted = self.held.to_vec();
        sort_in_place(&mut resorted, key);
        self.held = Arc::new(resorted);
        if matches!(self.state, CardListState::Ready { .. }) {
            self.state = CardListState::Ready {
                cards: Arc::clone(&self.held),
            };
            effects.push(Effect::Publish(self.state.clone()));
        }

        if key == self.sort_key {
            debug!(%key, "sort key unchanged, no refetch");
            if effects.is_empty() {
                effects.push(self.publish_current());
            }
            return effects;
        }

        info!(from = %self.sort_key, to = %key, "sort key changed");
        self.sort_key = key;
        self.begin_fetch(effects)
    }

    fn begin_fetch(&mut self, mut effects: Vec<Effect>) -> Vec<Effect> {
        self.last_issued += 1;
        let token = self.last_issued;
        info!(token, filter = %self.filter, "fetching cards");
        self.state = CardListState::Loading;
        effects.push(Effect::Publish(CardListState::Loading));
        effects.push(Effect::Fetch {
            token,
            filter: self.filter.clone(),
        });
        effects
    }

    fn apply_response(
        &mut self,
        token: RequestToken,
        result: Result<SearchPayload, SearchError>,
    ) -> Vec<Effect> {
        if self.discard_stale && token != self.last_issued {
            debug!(token, latest = self.last_issued, "discarding stale response");
            return Vec::new();
        }

        self.state = match result {
            Ok(payload) => {
                let cards = sort_cards(&normalize_payload(&payload), self.sort_key);
                info!(token, count = cards.len(), sort = %self.sort_key, "cards loaded");
                self.held = Arc::new(cards);
                CardListState::Ready {
                    cards: Arc::clone(&self.held),
                }
            }
            Err(err) => {
                let message = err.display_message();
                warn!(token, error = %message, "card search failed");
                CardListState::Error { message }
            }
        };
        vec![Effect::Publish(self.state.clone())]
    }

    fn publish_current(&self) -> Effect {
        Effect::Publish(self.state.clone())
    }
}

#[cfg(test)]
#[path = "tests/card_list_machine_tests.rs"]
mod tests;
