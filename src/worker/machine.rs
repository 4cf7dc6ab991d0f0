//! Per-request fetch state machine.
//!
//! The machine performs no I/O. It emits a `Command`, the driver carries it
//! out and feeds the result back as an `Event`, until a `Respond` or `Fail`
//! command ends the request.

use super::request::{ShellResponse, Strategy};
use super::WorkerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    /// Waiting for a cache lookup of the request
    Checking,
    /// Waiting for the network
    Fetching,
    /// Waiting for the response to be stored
    CachingWrite,
    /// Network failed, waiting for a fallback lookup
    FailedFallback,
    Done,
}

#[derive(Debug)]
pub enum Event {
    CacheLookup(Option<ShellResponse>),
    Network(Result<ShellResponse, WorkerError>),
    /// Outcome of a store; failures are ignored
    CacheWrite(Result<(), WorkerError>),
}

impl Event {
    fn name(&self) -> &'static str {
        match self {
            Event::CacheLookup(_) => "cache lookup",
            Event::Network(_) => "network",
            Event::CacheWrite(_) => "cache write",
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum Command {
    LookupCache { key: String },
    FetchNetwork,
    Store { key: String, response: ShellResponse },
    Respond(ShellResponse),
    Fail(WorkerError),
}

#[derive(Debug)]
pub struct FetchMachine {
    strategy: Strategy,
    navigation: bool,
    key: String,
    /// Offline shell document served to failed navigations
    fallback_key: String,
    state: FetchState,
    /// Response waiting on its cache write
    pending: Option<ShellResponse>,
    network_error: Option<WorkerError>,
    history: Vec<FetchState>,
}

impl FetchMachine {
    /// Starts handling a request and returns the first command.
    pub fn start(strategy: Strategy, navigation: bool, key: String, fallback_key: String) -> (Self, Command) {
        let (state, command) = match strategy {
            Strategy::CacheFirst => (FetchState::Checking, Command::LookupCache { key: key.clone() }),
            Strategy::NetworkFirst => (FetchState::Fetching, Command::FetchNetwork),
        };

        let machine = Self {
            strategy,
            navigation,
            key,
            fallback_key,
            state,
            pending: None,
            network_error: None,
            history: vec![state],
        };
        (machine, command)
    }

    pub fn state(&self) -> FetchState {
        self.state
    }

    /// Every state entered so far, in order.
    pub fn history(&self) -> &[FetchState] {
        &self.history
    }

    pub fn advance(&mut self, event: Event) -> Result<Command, WorkerError> {
        let event_name = event.name();

        let (next, command) = match (self.state, event) {
            (FetchState::Checking, Event::CacheLookup(Some(hit))) => (FetchState::Done, Command::Respond(hit)),
            (FetchState::Checking, Event::CacheLookup(None)) => (FetchState::Fetching, Command::FetchNetwork),

            (FetchState::Fetching, Event::Network(Ok(response))) => {
                if self.strategy == Strategy::CacheFirst && response.is_cacheable() {
                    self.pending = Some(response.clone());
                    let key = self.key.clone();
                    (FetchState::CachingWrite, Command::Store { key, response })
                } else {
                    (FetchState::Done, Command::Respond(response))
                }
            }
            (FetchState::Fetching, Event::Network(Err(e))) => match self.strategy {
                Strategy::NetworkFirst => {
                    self.network_error = Some(e);
                    let key = self.key.clone();
                    (FetchState::FailedFallback, Command::LookupCache { key })
                }
                Strategy::CacheFirst if self.navigation => {
                    self.network_error = Some(e);
                    let key = self.fallback_key.clone();
                    (FetchState::FailedFallback, Command::LookupCache { key })
                }
                Strategy::CacheFirst => (FetchState::Done, Command::Fail(e)),
            },

            (FetchState::CachingWrite, Event::CacheWrite(_)) => match self.pending.take() {
                Some(response) => (FetchState::Done, Command::Respond(response)),
                None => return Err(self.invalid(event_name)),
            },

            (FetchState::FailedFallback, Event::CacheLookup(Some(hit))) => (FetchState::Done, Command::Respond(hit)),
            (FetchState::FailedFallback, Event::CacheLookup(None)) => {
                let error = self
                    .network_error
                    .take()
                    .unwrap_or_else(|| WorkerError::Network("no cached fallback".to_string()));
                (FetchState::Done, Command::Fail(error))
            }

            _ => return Err(self.invalid(event_name)),
        };

        self.state = next;
        self.history.push(next);
        Ok(command)
    }

    fn invalid(&self, event: &'static str) -> WorkerError {
        WorkerError::InvalidTransition {
            state: self.state,
            event,
        }
    }
}
