//! Async driver for [`CardListMachine`].
//!
//! One task owns the machine. Commands from any number of
//! [`CardListHandle`]s arrive over an mpsc channel, in-flight searches sit in
//! a `FuturesUnordered`, and every published state goes out on a watch
//! channel. Nothing here is cancelled: a superseded search still runs to
//! completion and the machine decides whether its answer counts.

use crate::api::CardSearch;
use crate::card::{SearchPayload, SortKey};
use crate::card_list_machine::{
    CardListMachine, CardListState, Effect, Input, MachineConfig, RequestToken,
};
use crate::error::{CardListError, SearchError};
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

type InFlight = BoxFuture<'static, (RequestToken, Result<SearchPayload, SearchError>)>;

/// Position of a command in the controller's queue.
pub type CommandSeq = u64;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetFilter(String),
    RequestSort(SortKey),
}

pub struct CardListController {
    search: Arc<dyn CardSearch>,
    machine: CardListMachine,
    commands: mpsc::UnboundedReceiver<(CommandSeq, Command)>,
    state_tx: watch::Sender<CardListState>,
    ack_tx: watch::Sender<CommandSeq>,
    in_flight: FuturesUnordered<InFlight>,
}

impl CardListController {
    pub fn new(search: Arc<dyn CardSearch>, config: MachineConfig) -> (Self, CardListHandle) {
        let (command_tx, commands) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(CardListState::Idle);
        let (ack_tx, ack_rx) = watch::channel(0);
        let controller = CardListController {
            search,
            machine: CardListMachine::new(config),
            commands,
            state_tx,
            ack_tx,
            in_flight: FuturesUnordered::new(),
        };
        let handle = CardListHandle {
            sender: Arc::new(Mutex::new(Sequencer {
                commands: command_tx,
                next: 1,
            })),
            state: state_rx,
            acks: ack_rx,
            last_sent: 0,
        };
        (controller, handle)
    }

    pub fn spawn(search: Arc<dyn CardSearch>, config: MachineConfig) -> CardListHandle {
        let (controller, handle) = Self::new(search, config);
        tokio::spawn(controller.run());
        handle
    }

    /// Runs until every handle is dropped. Responses still in flight at that
    /// point are dropped with the controller.
    pub async fn run(mut self) {
        self.dispatch(Input::Start);

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some((seq, command)) => {
                        let input = match command {
                            Command::SetFilter(filter) => Input::FilterChanged(filter),
                            Command::RequestSort(key) => Input::SortRequested(key),
                        };
                        self.dispatch(input);
                        // After the command's states, so an ack implies they are visible.
                        self.ack_tx.send_replace(seq);
                    }
                    None => {
                        info!(pending = self.in_flight.len(), "card list controller stopping");
                        break;
                    }
                },
                Some((token, result)) = self.in_flight.next(), if !self.in_flight.is_empty() => {
                    self.dispatch(Input::Response { token, result });
                }
            }
        }
    }

    fn dispatch(&mut self, input: Input) {
        for effect in self.machine.handle(input) {
            match effect {
                Effect::Publish(state) => {
                    self.state_tx.send_replace(state);
                }
                Effect::Fetch { token, filter } => {
                    debug!(token, in_flight = self.in_flight.len(), "issuing search");
                    let search = Arc::clone(&self.search);
                    self.in_flight.push(
                        async move {
                            let result = search.search_cards(&filter).await;
                            (token, result)
                        }
                        .boxed(),
                    );
                }
            }
        }
    }
}

// Numbering and enqueueing happen under one lock, so queue order and
// sequence order agree across cloned handles.
#[derive(Debug)]
struct Sequencer {
    commands: mpsc::UnboundedSender<(CommandSeq, Command)>,
    next: CommandSeq,
}

/// Caller side of a running [`CardListController`].
#[derive(Debug, Clone)]
pub struct CardListHandle {
    sender: Arc<Mutex<Sequencer>>,
    state: watch::Receiver<CardListState>,
    acks: watch::Receiver<CommandSeq>,
    last_sent: CommandSeq,
}

impl CardListHandle {
    pub fn set_filter(&mut self, filter: impl Into<String>) -> Result<(), CardListError> {
        self.send(Command::SetFilter(filter.into()))
    }

    pub fn request_sort(&mut self, key: SortKey) -> Result<(), CardListError> {
        self.send(Command::RequestSort(key))
    }

    pub fn current(&self) -> CardListState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CardListState> {
        self.state.clone()
    }

    /// Waits until the controller has processed the last command sent
    /// through this handle, then for the first ready or error state after it.
    /// With no command sent yet, waits for the initial fetch to settle.
    pub async fn settled(&mut self) -> Result<CardListState, CardListError> {
        let wanted = self.last_sent;
        self.acks
            .wait_for(|acked| *acked >= wanted)
            .await
            .map_err(|_| CardListError::ControllerStopped)?;
        let state = self
            .state
            .wait_for(CardListState::is_settled)
            .await
            .map_err(|_| CardListError::ControllerStopped)?;
        Ok(state.clone())
    }

    fn send(&mut self, command: Command) -> Result<(), CardListError> {
        let mut sequencer = self
            .sender
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let seq = sequencer.next;
        sequencer
            .commands
            .send((seq, command))
            .map_err(|_| CardListError::ControllerStopped)?;
        sequencer.next += 1;
        self.last_sent = seq;
        Ok(())
    }
}
