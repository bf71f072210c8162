//! Transport collaborator seam.
//!
//! The orchestrator and tasks never talk SSH directly; they go through the
//! [`Transport`] and [`Connector`] traits. The production implementation is
//! [`SshConnector`]; tests substitute fakes.

mod buffer;
mod ssh;

pub use buffer::PatternBuffer;
pub use ssh::{SshConnector, SshSettings, SshTransport};

use async_trait::async_trait;

use crate::device::DeviceDescriptor;
use crate::error::{CommandError, ConnectionError};

/// One open, privileged CLI session to a device.
#[async_trait]
pub trait Transport: Send {
    /// Send one read-only command and return its raw output text.
    async fn send_command(&mut self, command: &str) -> Result<String, CommandError>;

    /// Enter configuration mode, apply the statements in order, and exit.
    ///
    /// Statement order is significant (e.g. a VLAN must be selected before
    /// it can be named).
    async fn send_config_set(&mut self, statements: &[String]) -> Result<(), CommandError>;

    /// Release the underlying connection.
    async fn close(&mut self) -> Result<(), ConnectionError>;
}

/// Opens [`Transport`] sessions from device descriptors.
///
/// `connect` covers the whole session setup: transport establishment,
/// authentication, and elevation to privileged mode. Any failure in that
/// sequence is a [`ConnectionError`].
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(
        &self,
        descriptor: &DeviceDescriptor,
    ) -> Result<Box<dyn Transport>, ConnectionError>;
}
