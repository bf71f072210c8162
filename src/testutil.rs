//! Shared test fixtures: a fake connector and transport with call counting,
//! per-host failure injection, and a command recorder.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::device::DeviceDescriptor;
use crate::error::{CommandError, ConnectionError};
use crate::transport::{Connector, Transport};

/// Open/close call counts across all sessions from one connector.
#[derive(Debug, Default)]
pub struct Counters {
    pub opened: usize,
    pub closed: usize,
}

/// Per-host behavior of fake sessions.
pub enum FakeOutcome {
    /// Every command on this host is rejected with the given message.
    RejectCommands(String),
}

#[derive(Default)]
struct State {
    counters: Arc<Mutex<Counters>>,
    fail_connect: HashSet<String>,
    outcomes: HashMap<String, FakeOutcome>,
    fail_commands: HashMap<String, String>,
    responses: HashMap<String, String>,
    command_log: Vec<String>,
}

/// Fake [`Connector`] producing in-memory transports.
#[derive(Default)]
pub struct FakeConnector {
    state: Arc<Mutex<State>>,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `connect` fail for this host.
    pub fn fail_connect_for(&self, host: &str) {
        self.state
            .lock()
            .unwrap()
            .fail_connect
            .insert(host.to_string());
    }

    /// Set per-host session behavior.
    pub fn set_outcome(&self, host: &str, outcome: FakeOutcome) {
        self.state
            .lock()
            .unwrap()
            .outcomes
            .insert(host.to_string(), outcome);
    }

    /// Make one specific command fail on every host.
    pub fn fail_command(&self, command: &str, message: &str) {
        self.state
            .lock()
            .unwrap()
            .fail_commands
            .insert(command.to_string(), message.to_string());
    }

    /// Set the canned output for a command. Commands without a canned
    /// response echo a placeholder.
    pub fn set_response(&self, command: &str, output: &str) {
        self.state
            .lock()
            .unwrap()
            .responses
            .insert(command.to_string(), output.to_string());
    }

    /// Shared open/close counters.
    pub fn counters(&self) -> Arc<Mutex<Counters>> {
        self.state.lock().unwrap().counters.clone()
    }

    /// Every command and configuration statement issued, in order, across
    /// all sessions.
    pub fn command_log(&self) -> Vec<String> {
        self.state.lock().unwrap().command_log.clone()
    }
}

#[async_trait]
impl Connector for FakeConnector {
    async fn connect(
        &self,
        descriptor: &DeviceDescriptor,
    ) -> Result<Box<dyn Transport>, ConnectionError> {
        let mut state = self.state.lock().unwrap();

        if state.fail_connect.contains(&descriptor.host) {
            return Err(ConnectionError::AuthenticationFailed {
                user: descriptor.credentials.username.clone(),
            });
        }

        state.counters.lock().unwrap().opened += 1;
        Ok(Box::new(FakeTransport {
            host: descriptor.host.clone(),
            state: self.state.clone(),
        }))
    }
}

/// Fake [`Transport`] that records commands and serves canned responses.
pub struct FakeTransport {
    host: String,
    state: Arc<Mutex<State>>,
}

impl FakeTransport {
    fn dispatch(&self, command: &str) -> Result<String, CommandError> {
        let mut state = self.state.lock().unwrap();
        state.command_log.push(command.to_string());

        if let Some(message) = state.fail_commands.get(command) {
            return Err(CommandError::Rejected {
                command: command.to_string(),
                message: message.clone(),
            });
        }

        if let Some(FakeOutcome::RejectCommands(message)) = state.outcomes.get(&self.host) {
            return Err(CommandError::Rejected {
                command: command.to_string(),
                message: message.clone(),
            });
        }

        let output = state
            .responses
            .get(command)
            .cloned()
            .unwrap_or_else(|| format!("{} output for '{command}'", self.host));
        Ok(output)
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send_command(&mut self, command: &str) -> Result<String, CommandError> {
        self.dispatch(command)
    }

    async fn send_config_set(&mut self, statements: &[String]) -> Result<(), CommandError> {
        for statement in statements {
            self.dispatch(statement)?;
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ConnectionError> {
        let state = self.state.lock().unwrap();
        state.counters.lock().unwrap().closed += 1;
        Ok(())
    }
}
