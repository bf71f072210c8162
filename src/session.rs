//! One authenticated CLI session to a single device.

use log::{debug, info};

use crate::device::DeviceDescriptor;
use crate::error::{Error, Result};
use crate::transport::{Connector, Transport};

/// An open, privileged session to one device for the duration of a task.
///
/// `run` and `configure` propagate the first failure immediately as a typed
/// error; there is no retry at this layer. The fleet orchestrator guarantees
/// [`close`](DeviceSession::close) runs exactly once on every exit path.
pub struct DeviceSession {
    device: String,
    transport: Option<Box<dyn Transport>>,
}

impl DeviceSession {
    /// Open a session via the connector: establish transport, authenticate,
    /// and elevate to privileged mode.
    pub async fn open(connector: &dyn Connector, descriptor: &DeviceDescriptor) -> Result<Self> {
        let transport = connector.connect(descriptor).await?;
        info!("connected to {}", descriptor.host);
        Ok(Self {
            device: descriptor.host.clone(),
            transport: Some(transport),
        })
    }

    /// Wrap an already-open transport. Used by tests to drive tasks against
    /// fake transports without a connector.
    pub fn from_transport(device: impl Into<String>, transport: Box<dyn Transport>) -> Self {
        Self {
            device: device.into(),
            transport: Some(transport),
        }
    }

    /// The device identifier this session belongs to.
    pub fn device(&self) -> &str {
        &self.device
    }

    /// Send one read-only command and return its raw output text.
    ///
    /// The output is not parsed or interpreted.
    pub async fn run(&mut self, command: &str) -> Result<String> {
        debug!("{}: running '{command}'", self.device);
        let transport = self.transport_mut()?;
        let output = transport.send_command(command).await?;
        Ok(output)
    }

    /// Enter configuration mode and apply the statements in the given order.
    pub async fn configure(&mut self, statements: &[String]) -> Result<()> {
        debug!("{}: applying {} config statements", self.device, statements.len());
        let transport = self.transport_mut()?;
        transport.send_config_set(statements).await?;
        Ok(())
    }

    /// Release the transport. Further calls are no-ops.
    pub async fn close(&mut self) -> Result<()> {
        if let Some(mut transport) = self.transport.take() {
            transport.close().await?;
            debug!("{}: session closed", self.device);
        }
        Ok(())
    }

    fn transport_mut(&mut self) -> Result<&mut Box<dyn Transport>> {
        self.transport.as_mut().ok_or_else(|| {
            Error::Command(crate::error::CommandError::SessionClosed {
                command: String::new(),
            })
        })
    }
}
