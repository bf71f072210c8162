//! Fleet orchestration: run one task against every device in a list.
//!
//! The loop here carries the two guarantees the rest of the crate leans on:
//! no failure on one device prevents the remaining devices from being
//! attempted, and every session that was opened is closed exactly once,
//! whether the task body succeeded or not.

use async_trait::async_trait;
use log::{error, info, warn};

use crate::device::DeviceDescriptor;
use crate::error::{Error, Result};
use crate::session::DeviceSession;
use crate::transport::Connector;

/// A unit of work executed against one open device session.
#[async_trait]
pub trait FleetTask: Send + Sync {
    /// Value produced on success for one device.
    type Output: Send;

    /// Task name for log lines and reports.
    fn name(&self) -> &str;

    /// Run the task body against an open, privileged session.
    async fn run(&self, session: &mut DeviceSession) -> Result<Self::Output>;
}

/// Per-device outcome record.
///
/// One is produced for every input descriptor, in input order.
#[derive(Debug)]
pub struct DeviceResult<P> {
    /// Device identifier (the descriptor's host).
    pub device: String,

    /// Task payload on success, or the error that stopped this device.
    pub outcome: Result<P>,
}

impl<P> DeviceResult<P> {
    /// Whether this device completed the task.
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// The failure, if any.
    pub fn err(&self) -> Option<&Error> {
        self.outcome.as_ref().err()
    }
}

/// Runs tasks across a device fleet through an injected connector.
pub struct FleetRunner<C> {
    connector: C,
}

impl<C: Connector> FleetRunner<C> {
    /// Create a runner over the given connector.
    pub fn new(connector: C) -> Self {
        Self { connector }
    }

    /// Run `task` against every descriptor, in input order.
    ///
    /// Always returns one [`DeviceResult`] per input descriptor. An empty
    /// descriptor list yields an empty report.
    pub async fn run<T: FleetTask>(
        &self,
        descriptors: &[DeviceDescriptor],
        task: &T,
    ) -> Vec<DeviceResult<T::Output>> {
        let mut results = Vec::with_capacity(descriptors.len());

        for descriptor in descriptors {
            let outcome = self.run_one(descriptor, task).await;

            match &outcome {
                Ok(_) => info!("{} succeeded on {}", task.name(), descriptor.host),
                Err(e) => error!("{} failed on {}: {e}", task.name(), descriptor.host),
            }

            results.push(DeviceResult {
                device: descriptor.host.clone(),
                outcome,
            });
        }

        results
    }

    /// Open, run the task body, and close — close runs on every exit path.
    async fn run_one<T: FleetTask>(
        &self,
        descriptor: &DeviceDescriptor,
        task: &T,
    ) -> Result<T::Output> {
        let mut session = DeviceSession::open(&self.connector, descriptor).await?;

        let outcome = task.run(&mut session).await;

        // A close failure after a successful task body does not fail the
        // device; the work was done.
        if let Err(e) = session.close().await {
            warn!("{}: unclean session close: {e}", descriptor.host);
        }

        outcome
    }
}
