//! Inventory collection and the CSV report.

use std::path::Path;

use async_trait::async_trait;
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{PersistenceError, Result};
use crate::fleet::FleetTask;
use crate::session::DeviceSession;

/// Inventory captured from one device: two raw command outputs keyed by the
/// device address. Cells hold multi-line text as-is; the CSV writer's
/// default quoting handles the embedded newlines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    #[serde(rename = "IP")]
    pub ip: String,

    #[serde(rename = "Inventory")]
    pub inventory: String,

    #[serde(rename = "Interfaces")]
    pub interfaces: String,
}

/// Collect `show inventory` and `show interfaces status` into one record.
///
/// Both commands must succeed; if either fails, the whole device record
/// fails rather than reporting a half-populated row.
#[derive(Debug, Default)]
pub struct InventoryTask;

impl InventoryTask {
    pub const INVENTORY_COMMAND: &'static str = "show inventory";
    pub const INTERFACES_COMMAND: &'static str = "show interfaces status";

    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FleetTask for InventoryTask {
    type Output = InventoryRecord;

    fn name(&self) -> &str {
        "inventory"
    }

    async fn run(&self, session: &mut DeviceSession) -> Result<InventoryRecord> {
        let inventory = session.run(Self::INVENTORY_COMMAND).await?;
        let interfaces = session.run(Self::INTERFACES_COMMAND).await?;

        Ok(InventoryRecord {
            ip: session.device().to_string(),
            inventory,
            interfaces,
        })
    }
}

/// Write inventory records to a CSV file with the header
/// `IP,Inventory,Interfaces`, one row per device.
pub async fn write_inventory_csv(
    path: impl AsRef<Path>,
    records: &[InventoryRecord],
) -> std::result::Result<(), PersistenceError> {
    let path = path.as_ref();

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    // Header goes out even for an empty fleet.
    writer.write_record(["IP", "Inventory", "Interfaces"])?;
    for record in records {
        writer.serialize(record)?;
    }
    let data = writer
        .into_inner()
        .map_err(|e| PersistenceError::Write {
            path: path.to_path_buf(),
            source: e.into_error(),
        })?;

    tokio::fs::write(path, data)
        .await
        .map_err(|source| PersistenceError::Write {
            path: path.to_path_buf(),
            source,
        })?;

    info!("inventory saved to {}", path.display());
    Ok(())
}
