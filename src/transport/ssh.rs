//! SSH transport implementation using russh.
//!
//! [`SshConnector::connect`] performs the full session setup the fleet
//! orchestrator expects from `open`: TCP + SSH handshake, password
//! authentication, PTY and shell, initial prompt sync, pagination disable,
//! and elevation to privileged mode when the device lands in user exec.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use regex::bytes::Regex;
use russh::client::{self, Handle, Msg};
use russh::keys::PublicKey;
use russh::{Channel, ChannelMsg};
use secrecy::ExposeSecret;

use super::buffer::PatternBuffer;
use super::{Connector, Transport};
use crate::device::DeviceDescriptor;
use crate::error::{CommandError, ConnectionError};

/// Tunables for SSH sessions.
///
/// Connection and command timeouts are explicit here rather than inherited
/// from transport defaults.
#[derive(Debug, Clone)]
pub struct SshSettings {
    /// Timeout for the connect + authenticate + prompt-sync sequence.
    pub connect_timeout: Duration,

    /// Timeout for a single command to return to a prompt.
    pub command_timeout: Duration,

    /// Terminal width for the PTY.
    pub terminal_width: u32,

    /// Terminal height for the PTY.
    pub terminal_height: u32,

    /// How many bytes of buffer tail to search for prompts.
    pub search_depth: usize,
}

impl Default for SshSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            command_timeout: Duration::from_secs(30),
            terminal_width: 511,
            terminal_height: 24,
            search_depth: 1000,
        }
    }
}

/// Production [`Connector`] backed by russh.
#[derive(Debug, Default)]
pub struct SshConnector {
    settings: SshSettings,
}

impl SshConnector {
    /// Create a connector with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a connector with custom settings.
    pub fn with_settings(settings: SshSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl Connector for SshConnector {
    async fn connect(
        &self,
        descriptor: &DeviceDescriptor,
    ) -> Result<Box<dyn Transport>, ConnectionError> {
        let transport = SshTransport::open(descriptor, self.settings.clone()).await?;
        Ok(Box::new(transport))
    }
}

/// How a read loop ended without matching the prompt.
enum ReadFailure {
    Timeout,
    Closed,
}

/// One privileged SSH CLI session.
pub struct SshTransport {
    session: Handle<SshHandler>,
    channel: Channel<Msg>,
    buffer: PatternBuffer,
    prompt: Regex,
    host: String,
    failure_markers: &'static [&'static str],
    config_enter: &'static str,
    config_exit: &'static str,
    command_timeout: Duration,
    closed: bool,
}

impl SshTransport {
    /// Connect, authenticate, and bring the session to privileged mode.
    pub async fn open(
        descriptor: &DeviceDescriptor,
        settings: SshSettings,
    ) -> Result<Self, ConnectionError> {
        let kind = descriptor.kind;
        let prompt = Regex::new(kind.prompt_pattern())?;
        let privileged = Regex::new(kind.privileged_pattern())?;
        let enable_auth = Regex::new(kind.enable_auth_pattern())?;

        let config = Arc::new(client::Config {
            inactivity_timeout: Some(settings.connect_timeout),
            ..Default::default()
        });

        let mut session = tokio::time::timeout(
            settings.connect_timeout,
            client::connect(
                config,
                (descriptor.host.as_str(), descriptor.port),
                SshHandler,
            ),
        )
        .await
        .map_err(|_| ConnectionError::Timeout(settings.connect_timeout))?
        .map_err(ConnectionError::Ssh)?;

        Self::authenticate(&mut session, descriptor).await?;

        let channel = Self::open_shell(&session, &settings).await?;

        let mut transport = Self {
            session,
            channel,
            buffer: PatternBuffer::new(settings.search_depth),
            prompt,
            host: descriptor.host.clone(),
            failure_markers: kind.failed_when_contains(),
            config_enter: kind.config_enter(),
            config_exit: kind.config_exit(),
            command_timeout: settings.command_timeout,
            closed: false,
        };

        // Initial prompt sync
        let any_prompt = transport.prompt.clone();
        let banner = transport
            .read_until(&any_prompt, settings.connect_timeout)
            .await
            .map_err(|f| connect_failure(f, settings.connect_timeout))?;

        if !privileged.is_match(&banner) {
            transport
                .escalate(descriptor, &privileged, &enable_auth, &settings)
                .await?;
        }

        // Privileged mode reached; turn off pagination before anyone asks
        // for a full running-config.
        transport
            .send_command(kind.disable_paging())
            .await
            .map_err(|e| ConnectionError::EnableFailed {
                host: descriptor.host.clone(),
                message: e.to_string(),
            })?;

        debug!("session to {} ready", descriptor.host);
        Ok(transport)
    }

    /// Password authentication.
    async fn authenticate(
        session: &mut Handle<SshHandler>,
        descriptor: &DeviceDescriptor,
    ) -> Result<(), ConnectionError> {
        let creds = &descriptor.credentials;
        let success = session
            .authenticate_password(&creds.username, creds.password.expose_secret())
            .await
            .map_err(ConnectionError::Ssh)?
            .success();

        if !success {
            return Err(ConnectionError::AuthenticationFailed {
                user: creds.username.clone(),
            });
        }

        Ok(())
    }

    /// Open a PTY channel with a shell.
    async fn open_shell(
        session: &Handle<SshHandler>,
        settings: &SshSettings,
    ) -> Result<Channel<Msg>, ConnectionError> {
        let channel = session
            .channel_open_session()
            .await
            .map_err(ConnectionError::Ssh)?;

        channel
            .request_pty(
                true,
                "xterm",
                settings.terminal_width,
                settings.terminal_height,
                0,
                0,
                &[],
            )
            .await
            .map_err(ConnectionError::Ssh)?;

        channel
            .request_shell(true)
            .await
            .map_err(ConnectionError::Ssh)?;

        Ok(channel)
    }

    /// Escalate from user exec to privileged mode with the enable secret.
    async fn escalate(
        &mut self,
        descriptor: &DeviceDescriptor,
        privileged: &Regex,
        enable_auth: &Regex,
        settings: &SshSettings,
    ) -> Result<(), ConnectionError> {
        let host = descriptor.host.clone();
        let timeout = settings.connect_timeout;

        self.buffer.clear();
        self.send_line(descriptor.kind.enable_command())
            .await
            .map_err(ConnectionError::Ssh)?;

        // The device answers with either a password challenge or, when no
        // enable password is set, the privileged prompt directly.
        let challenge_or_prompt =
            Regex::new(&format!("(?:{})|(?:{})", enable_auth.as_str(), self.prompt.as_str()))?;

        let output = self
            .read_until(&challenge_or_prompt, timeout)
            .await
            .map_err(|f| connect_failure(f, timeout))?;

        if enable_auth.is_match(&output) {
            let secret = descriptor.credentials.enable_secret.as_ref().ok_or_else(|| {
                ConnectionError::EnableFailed {
                    host: host.clone(),
                    message: "device asked for an enable secret but none was configured"
                        .to_string(),
                }
            })?;

            self.send_line(secret.expose_secret())
                .await
                .map_err(ConnectionError::Ssh)?;

            let prompt = self.prompt.clone();
            let output = self
                .read_until(&prompt, timeout)
                .await
                .map_err(|f| connect_failure(f, timeout))?;

            if !privileged.is_match(&output) {
                return Err(ConnectionError::EnableFailed {
                    host,
                    message: "enable secret rejected".to_string(),
                });
            }
        } else if !privileged.is_match(&output) {
            return Err(ConnectionError::EnableFailed {
                host,
                message: "device did not reach privileged mode".to_string(),
            });
        }

        Ok(())
    }

    /// Send one line to the channel.
    async fn send_line(&mut self, line: &str) -> Result<(), russh::Error> {
        let payload = format!("{line}\n");
        self.channel.data(payload.as_bytes()).await
    }

    /// Accumulate channel output until the pattern matches the buffer tail.
    ///
    /// Returns the buffer contents up to and including the match.
    async fn read_until(
        &mut self,
        pattern: &Regex,
        timeout: Duration,
    ) -> Result<Vec<u8>, ReadFailure> {
        let read_loop = async {
            loop {
                if self.buffer.tail_contains(pattern) {
                    return Ok(self.buffer.take());
                }

                match self.channel.wait().await {
                    Some(ChannelMsg::Data { ref data }) => self.buffer.extend(data),
                    Some(ChannelMsg::ExtendedData { ref data, .. }) => self.buffer.extend(data),
                    Some(ChannelMsg::Eof) | Some(ChannelMsg::Close) | None => {
                        return Err(ReadFailure::Closed);
                    }
                    Some(_) => {}
                }
            }
        };

        tokio::time::timeout(timeout, read_loop)
            .await
            .map_err(|_| ReadFailure::Timeout)?
    }

    /// Strip the command echo and the trailing prompt line from raw output.
    fn normalize_output(raw: &str, command: &str) -> String {
        let output = raw
            .strip_prefix(command)
            .unwrap_or(raw)
            .trim_start_matches(['\r', '\n']);

        if let Some(pos) = output.rfind('\n') {
            output[..pos].to_string()
        } else {
            String::new()
        }
    }

    /// Check output for the dialect's rejection markers.
    fn detect_rejection(&self, command: &str, output: &str) -> Result<(), CommandError> {
        for marker in self.failure_markers {
            if output.contains(marker) {
                let message = output
                    .lines()
                    .find(|line| line.contains(marker))
                    .unwrap_or(marker)
                    .trim()
                    .to_string();
                return Err(CommandError::Rejected {
                    command: command.to_string(),
                    message,
                });
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Transport for SshTransport {
    async fn send_command(&mut self, command: &str) -> Result<String, CommandError> {
        self.buffer.clear();
        self.send_line(command).await.map_err(CommandError::Ssh)?;

        let prompt = self.prompt.clone();
        let data = self
            .read_until(&prompt, self.command_timeout)
            .await
            .map_err(|f| match f {
                ReadFailure::Timeout => CommandError::Timeout {
                    command: command.to_string(),
                    timeout: self.command_timeout,
                },
                ReadFailure::Closed => CommandError::SessionClosed {
                    command: command.to_string(),
                },
            })?;

        let raw = String::from_utf8_lossy(&data).to_string();
        let output = Self::normalize_output(&raw, command);
        self.detect_rejection(command, &output)?;

        Ok(output)
    }

    async fn send_config_set(&mut self, statements: &[String]) -> Result<(), CommandError> {
        self.send_command(self.config_enter).await?;

        for statement in statements {
            if let Err(e) = self.send_command(statement).await {
                // Best effort: do not leave the session parked in config mode
                if let Err(exit_err) = self.send_command(self.config_exit).await {
                    warn!("{}: could not leave config mode: {exit_err}", self.host);
                }
                return Err(e);
            }
        }

        self.send_command(self.config_exit).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ConnectionError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        self.session
            .disconnect(russh::Disconnect::ByApplication, "", "en")
            .await
            .map_err(ConnectionError::Ssh)?;
        Ok(())
    }
}

fn connect_failure(failure: ReadFailure, timeout: Duration) -> ConnectionError {
    match failure {
        ReadFailure::Timeout => ConnectionError::Timeout(timeout),
        ReadFailure::Closed => ConnectionError::Closed,
    }
}

/// SSH client handler for russh.
///
/// Host keys are accepted without verification; fleet gear typically lives
/// on a management network and the original tooling (netmiko defaults) did
/// the same.
struct SshHandler;

impl client::Handler for SshHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        Ok(true)
    }
}
