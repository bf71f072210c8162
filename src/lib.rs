//! # Netfleet
//!
//! Async SSH fleet automation toolkit for network devices.
//!
//! Netfleet opens one authenticated CLI session per device, runs a task
//! against it (configuration backup, inventory collection, VLAN push, or
//! your own), and aggregates one outcome per device. A failure on one
//! device never aborts the rest of the fleet, and every opened session is
//! closed exactly once.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use netfleet::{BackupTask, DeviceDescriptor, FleetRunner, SshConnector, TransportKind};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let devices = vec![
//!         DeviceDescriptor::builder("192.168.1.1")
//!             .kind(TransportKind::CiscoIos)
//!             .username("admin")
//!             .password("password")
//!             .enable_secret("enable_password")
//!             .build()?,
//!     ];
//!
//!     let runner = FleetRunner::new(SshConnector::new());
//!     let results = runner.run(&devices, &BackupTask::new("config_backups")).await;
//!
//!     for result in &results {
//!         match &result.outcome {
//!             Ok(path) => println!("{}: backed up to {}", result.device, path.display()),
//!             Err(e) => println!("{}: failed: {e}", result.device),
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod device;
pub mod error;
pub mod fleet;
pub mod session;
pub mod tasks;
pub mod transport;

#[cfg(test)]
mod testutil;

// Re-export main types for convenience
pub use device::{Credentials, DeviceDescriptor, DeviceDescriptorBuilder, TransportKind};
pub use error::{CommandError, ConnectionError, Error, PersistenceError, ValidationError};
pub use fleet::{DeviceResult, FleetRunner, FleetTask};
pub use session::DeviceSession;
pub use tasks::{
    BackupTask, InventoryRecord, InventoryTask, VlanConfigTask, VlanSpec, write_inventory_csv,
};
pub use transport::{Connector, SshConnector, SshSettings, Transport};
