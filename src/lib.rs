//! Fetches, normalizes and sorts Star Wars: Unlimited card search results,
//! and publishes the list's loading state to whatever renders it.

pub mod api;
pub mod auth;
pub mod card;
pub mod card_list_machine;
pub mod cards_controller;
pub mod config;
pub mod error;
pub mod normalizer;
pub mod render;
pub mod sorter;

pub use api::{CardSearch, SwuDbClient};
pub use card::{CardRecord, RawCardRecord, SearchPayload, SortKey};
pub use card_list_machine::{CardListMachine, CardListState, Effect, Input, MachineConfig};
pub use cards_controller::{CardListController, CardListHandle, Command};
pub use config::Settings;
pub use error::{CardListError, SearchError};
