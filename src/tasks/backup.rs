//! Running-configuration backup.

use std::path::PathBuf;

use async_trait::async_trait;
use log::info;

use crate::error::{PersistenceError, Result};
use crate::fleet::FleetTask;
use crate::session::DeviceSession;

/// Capture `show running-config` and persist it to one text file per
/// device, `{backup_dir}/{host}_backup.txt`.
pub struct BackupTask {
    backup_dir: PathBuf,
}

impl BackupTask {
    /// Command captured from each device.
    pub const COMMAND: &'static str = "show running-config";

    /// Create a backup task writing into `backup_dir`. The directory is
    /// created on first use if it does not exist.
    pub fn new(backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            backup_dir: backup_dir.into(),
        }
    }
}

#[async_trait]
impl FleetTask for BackupTask {
    type Output = PathBuf;

    fn name(&self) -> &str {
        "backup"
    }

    async fn run(&self, session: &mut DeviceSession) -> Result<PathBuf> {
        let config = session.run(Self::COMMAND).await?;

        tokio::fs::create_dir_all(&self.backup_dir)
            .await
            .map_err(|source| PersistenceError::Write {
                path: self.backup_dir.clone(),
                source,
            })?;

        let path = self
            .backup_dir
            .join(format!("{}_backup.txt", session.device()));

        tokio::fs::write(&path, &config)
            .await
            .map_err(|source| PersistenceError::Write {
                path: path.clone(),
                source,
            })?;

        info!("backed up {} configuration to {}", session.device(), path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceDescriptor;
    use crate::error::Error;
    use crate::testutil::FakeConnector;

    fn descriptor(host: &str) -> DeviceDescriptor {
        DeviceDescriptor::builder(host)
            .username("admin")
            .password("secret")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_backup_writes_config_keyed_by_device() {
        let dir = tempfile::tempdir().unwrap();
        let connector = FakeConnector::new();
        connector.set_response(BackupTask::COMMAND, "hostname router1\ninterface Gi0/1");

        let desc = descriptor("192.0.2.10");
        let mut session = DeviceSession::open(&connector, &desc).await.unwrap();

        let task = BackupTask::new(dir.path());
        let path = task.run(&mut session).await.unwrap();
        session.close().await.unwrap();

        assert_eq!(path, dir.path().join("192.0.2.10_backup.txt"));
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "hostname router1\ninterface Gi0/1");
    }

    #[tokio::test]
    async fn test_backup_write_failure_is_persistence_error() {
        // A plain file where the backup directory should be makes
        // create_dir_all fail.
        let file = tempfile::NamedTempFile::new().unwrap();
        let connector = FakeConnector::new();

        let desc = descriptor("192.0.2.10");
        let mut session = DeviceSession::open(&connector, &desc).await.unwrap();

        let task = BackupTask::new(file.path());
        let err = task.run(&mut session).await.unwrap_err();
        session.close().await.unwrap();

        assert!(matches!(err, Error::Persistence(_)));
    }
}
