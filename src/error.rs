//! Error types for netfleet.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for netfleet operations.
///
/// The fleet orchestrator converts any of these into a per-device failure
/// record; none of them abort a fleet run.
#[derive(Error, Debug)]
pub enum Error {
    /// Connecting, authenticating, or reaching privileged mode failed
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// A command or configuration statement failed on an open session
    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    /// Writing a device's output to local storage failed
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Connection-phase errors (transport, authentication, privilege escalation).
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// Could not reach privileged mode after connecting
    #[error("Privilege escalation failed on {host}: {message}")]
    EnableFailed { host: String, message: String },

    /// Invalid prompt pattern for the device's transport kind
    #[error("Invalid prompt pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Connection attempt timed out
    #[error("Connection timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Connection was closed during session setup
    #[error("Connection closed during setup")]
    Closed,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Command-phase errors on an open session.
#[derive(Error, Debug)]
pub enum CommandError {
    /// The device rejected the command
    #[error("Command '{command}' rejected: {message}")]
    Rejected { command: String, message: String },

    /// No prompt seen within the command timeout
    #[error("Command '{command}' timed out after {timeout:?}")]
    Timeout {
        command: String,
        timeout: std::time::Duration,
    },

    /// Session dropped mid-command
    #[error("Session closed while running '{command}'")]
    SessionClosed { command: String },

    /// SSH protocol error on the channel
    #[error("Channel SSH error: {0}")]
    Ssh(russh::Error),
}

/// Local persistence errors (backup files, CSV report).
///
/// Kept separate from device-side failures so a full disk on the
/// operator's machine is distinguishable from a broken device.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// File or directory write failed
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// CSV serialization failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Input validation errors raised before any session is opened.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Descriptor host is empty
    #[error("Device host must not be empty")]
    EmptyHost,

    /// Descriptor username is empty
    #[error("Username must not be empty")]
    EmptyUsername,

    /// VLAN id outside the valid range
    #[error("VLAN id {id} outside valid range 1-4094")]
    VlanIdOutOfRange { id: u16 },

    /// VLAN name is empty
    #[error("VLAN {id} name must not be empty")]
    EmptyVlanName { id: u16 },
}

/// Result type alias using netfleet's Error.
pub type Result<T> = std::result::Result<T, Error>;
