//! Ready-made fleet tasks: configuration backup, inventory collection, and
//! VLAN configuration push.

mod backup;
mod inventory;
mod vlan;

pub use backup::BackupTask;
pub use inventory::{InventoryRecord, InventoryTask, write_inventory_csv};
pub use vlan::{VlanConfigTask, VlanSpec};
