//! End-to-end fleet run: backup, inventory to CSV, and VLAN push.
//!
//! ```bash
//! RUST_LOG=info cargo run --example fleet_demo
//! ```
//!
//! Adjust the device list and credentials for your lab before running.

use netfleet::{
    BackupTask, DeviceDescriptor, FleetRunner, InventoryTask, SshConnector, TransportKind,
    VlanConfigTask, VlanSpec, write_inventory_csv,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let devices = vec![
        DeviceDescriptor::builder("192.168.1.1")
            .kind(TransportKind::CiscoIos)
            .username("admin")
            .password("password")
            .enable_secret("enable_password")
            .build()?,
    ];

    let runner = FleetRunner::new(SshConnector::new());

    // Running-config backup, one file per device
    let backups = runner.run(&devices, &BackupTask::new("config_backups")).await;
    for result in &backups {
        match &result.outcome {
            Ok(path) => println!("{}: backed up to {}", result.device, path.display()),
            Err(e) => println!("{}: backup failed: {e}", result.device),
        }
    }

    // Inventory collection into a CSV report; failed devices are reported
    // but excluded from the CSV
    let inventory = runner.run(&devices, &InventoryTask::new()).await;
    let records: Vec<_> = inventory
        .iter()
        .filter_map(|r| r.outcome.as_ref().ok().cloned())
        .collect();
    write_inventory_csv("network_inventory.csv", &records).await?;
    for result in inventory.iter().filter(|r| !r.is_success()) {
        println!("{}: inventory failed: {:?}", result.device, result.err());
    }

    // VLAN push
    let vlans = vec![
        VlanSpec::new(10, "Management")?,
        VlanSpec::new(20, "Staff")?,
        VlanSpec::new(30, "Guest")?,
    ];
    let pushed = runner.run(&devices, &VlanConfigTask::new(vlans)).await;
    for result in &pushed {
        match &result.outcome {
            Ok(n) => println!("{}: {n} VLANs configured", result.device),
            Err(e) => println!("{}: VLAN push failed: {e}", result.device),
        }
    }

    Ok(())
}
