//! Device descriptors and transport-kind dialects.
//!
//! A [`DeviceDescriptor`] is the caller-owned, read-only record the fleet
//! orchestrator needs to open one session: where the device is, how to
//! authenticate, and which CLI dialect it speaks.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Supported device platforms.
///
/// Each kind carries the CLI dialect constants the SSH transport needs:
/// prompt patterns, privilege escalation, config-mode bracketing, and the
/// output markers that indicate a rejected command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    CiscoIos,
    CiscoIosXe,
    AristaEos,
}

impl TransportKind {
    /// Pattern matching any prompt for this platform (exec, privileged,
    /// or configuration mode).
    ///
    /// Patterns follow scrapli's IOS/EOS drivers: `(?m)` so `^` anchors at
    /// line starts inside accumulated output.
    pub fn prompt_pattern(&self) -> &'static str {
        match self {
            TransportKind::CiscoIos | TransportKind::CiscoIosXe | TransportKind::AristaEos => {
                r"(?m)^[\w.\-@()/: ]{1,63}[>#]\s?$"
            }
        }
    }

    /// Pattern matching the privileged-exec prompt only.
    pub fn privileged_pattern(&self) -> &'static str {
        match self {
            TransportKind::CiscoIos | TransportKind::CiscoIosXe | TransportKind::AristaEos => {
                r"(?m)^[\w.\-@()/: ]{1,63}#\s?$"
            }
        }
    }

    /// Command that escalates from exec to privileged mode.
    pub fn enable_command(&self) -> &'static str {
        "enable"
    }

    /// Pattern matching the enable password prompt.
    pub fn enable_auth_pattern(&self) -> &'static str {
        r"(?mi)^password:\s?$"
    }

    /// Command that enters configuration mode.
    pub fn config_enter(&self) -> &'static str {
        "configure terminal"
    }

    /// Command that leaves configuration mode.
    pub fn config_exit(&self) -> &'static str {
        "end"
    }

    /// Command issued after connect to disable output pagination.
    pub fn disable_paging(&self) -> &'static str {
        "terminal length 0"
    }

    /// Output substrings that indicate the device rejected a command.
    pub fn failed_when_contains(&self) -> &'static [&'static str] {
        match self {
            TransportKind::CiscoIos | TransportKind::CiscoIosXe => &[
                "% Ambiguous command",
                "% Incomplete command",
                "% Invalid input detected",
                "% Unknown command",
            ],
            TransportKind::AristaEos => &[
                "% Ambiguous command",
                "% Incomplete command",
                "% Invalid input",
                "% Unavailable command",
            ],
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransportKind::CiscoIos => "cisco_ios",
            TransportKind::CiscoIosXe => "cisco_iosxe",
            TransportKind::AristaEos => "arista_eos",
        };
        write!(f, "{name}")
    }
}

impl FromStr for TransportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cisco_ios" => Ok(TransportKind::CiscoIos),
            "cisco_iosxe" => Ok(TransportKind::CiscoIosXe),
            "arista_eos" => Ok(TransportKind::AristaEos),
            other => Err(format!("unknown transport kind '{other}'")),
        }
    }
}

/// Authentication material for one device.
///
/// Secrets are held as [`SecretString`] so they stay out of `Debug` output
/// and log lines.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Username for SSH authentication.
    pub username: String,

    /// Password for SSH authentication.
    pub password: SecretString,

    /// Privileged-mode (enable) secret, if the device requires one.
    pub enable_secret: Option<SecretString>,
}

/// Connection parameters for one network device.
///
/// Immutable once built; construct via [`DeviceDescriptor::builder`].
#[derive(Debug, Clone)]
pub struct DeviceDescriptor {
    /// Target host (hostname or IP address). Also the device identifier
    /// used in result records and backup filenames.
    pub host: String,

    /// SSH port (default: 22).
    pub port: u16,

    /// CLI dialect of the device.
    pub kind: TransportKind,

    /// Authentication material.
    pub credentials: Credentials,
}

impl DeviceDescriptor {
    /// Start building a descriptor for the given host.
    pub fn builder(host: impl Into<String>) -> DeviceDescriptorBuilder {
        DeviceDescriptorBuilder {
            host: host.into(),
            port: 22,
            kind: TransportKind::CiscoIos,
            username: String::new(),
            password: SecretString::from(String::new()),
            enable_secret: None,
        }
    }
}

/// Builder for [`DeviceDescriptor`].
pub struct DeviceDescriptorBuilder {
    host: String,
    port: u16,
    kind: TransportKind,
    username: String,
    password: SecretString,
    enable_secret: Option<SecretString>,
}

impl DeviceDescriptorBuilder {
    /// Set the SSH port (default: 22).
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the transport kind (default: `cisco_ios`).
    pub fn kind(mut self, kind: TransportKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the username for authentication.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    /// Set the password for authentication.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = SecretString::from(password.into());
        self
    }

    /// Set the privileged-mode (enable) secret.
    pub fn enable_secret(mut self, secret: impl Into<String>) -> Self {
        self.enable_secret = Some(SecretString::from(secret.into()));
        self
    }

    /// Validate and build the descriptor.
    pub fn build(self) -> Result<DeviceDescriptor, ValidationError> {
        if self.host.trim().is_empty() {
            return Err(ValidationError::EmptyHost);
        }
        if self.username.trim().is_empty() {
            return Err(ValidationError::EmptyUsername);
        }

        Ok(DeviceDescriptor {
            host: self.host,
            port: self.port,
            kind: self.kind,
            credentials: Credentials {
                username: self.username,
                password: self.password,
                enable_secret: self.enable_secret,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let desc = DeviceDescriptor::builder("192.0.2.1")
            .username("admin")
            .password("secret")
            .build()
            .unwrap();

        assert_eq!(desc.host, "192.0.2.1");
        assert_eq!(desc.port, 22);
        assert_eq!(desc.kind, TransportKind::CiscoIos);
        assert_eq!(desc.credentials.username, "admin");
        assert!(desc.credentials.enable_secret.is_none());
    }

    #[test]
    fn test_builder_rejects_empty_host() {
        let err = DeviceDescriptor::builder("  ")
            .username("admin")
            .password("secret")
            .build()
            .unwrap_err();
        assert!(matches!(err, ValidationError::EmptyHost));
    }

    #[test]
    fn test_builder_rejects_empty_username() {
        let err = DeviceDescriptor::builder("192.0.2.1")
            .password("secret")
            .build()
            .unwrap_err();
        assert!(matches!(err, ValidationError::EmptyUsername));
    }

    #[test]
    fn test_transport_kind_round_trip() {
        for kind in [
            TransportKind::CiscoIos,
            TransportKind::CiscoIosXe,
            TransportKind::AristaEos,
        ] {
            let parsed: TransportKind = kind.to_string().parse().unwrap();
            assert_eq!(parsed, kind);
        }

        assert!("juniper_junos".parse::<TransportKind>().is_err());
    }

    #[test]
    fn test_prompt_patterns_match_cisco_prompts() {
        use regex::bytes::Regex;

        let kind = TransportKind::CiscoIos;
        let any = Regex::new(kind.prompt_pattern()).unwrap();
        let privileged = Regex::new(kind.privileged_pattern()).unwrap();

        assert!(any.is_match(b"router>"));
        assert!(any.is_match(b"router# "));
        assert!(any.is_match(b"router(config)#"));

        assert!(privileged.is_match(b"router#"));
        assert!(!privileged.is_match(b"router>"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let desc = DeviceDescriptor::builder("192.0.2.1")
            .username("admin")
            .password("hunter2")
            .enable_secret("hunter3")
            .build()
            .unwrap();

        let debug = format!("{desc:?}");
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("hunter3"));
    }
}
