//! VLAN configuration push.

use async_trait::async_trait;
use log::info;

use crate::error::{Result, ValidationError};
use crate::fleet::FleetTask;
use crate::session::DeviceSession;

/// One VLAN to create or update: numeric id plus name.
///
/// Validated at construction; a list may contain duplicate ids, which are
/// simply re-applied in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VlanSpec {
    id: u16,
    name: String,
}

impl VlanSpec {
    /// Valid VLAN id range on IEEE 802.1Q hardware.
    pub const ID_RANGE: std::ops::RangeInclusive<u16> = 1..=4094;

    /// Create a VLAN spec, validating the id range and non-empty name.
    pub fn new(id: u16, name: impl Into<String>) -> std::result::Result<Self, ValidationError> {
        let name = name.into();

        if !Self::ID_RANGE.contains(&id) {
            return Err(ValidationError::VlanIdOutOfRange { id });
        }
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyVlanName { id });
        }

        Ok(Self { id, name })
    }

    pub fn id(&self) -> u16 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The ordered configuration statements for this VLAN. The VLAN must be
    /// selected before it can be named.
    fn statements(&self) -> [String; 2] {
        [format!("vlan {}", self.id), format!("name {}", self.name)]
    }
}

/// Apply a list of VLANs to each device, one config set per VLAN, in the
/// order the caller supplied them.
pub struct VlanConfigTask {
    vlans: Vec<VlanSpec>,
}

impl VlanConfigTask {
    pub fn new(vlans: Vec<VlanSpec>) -> Self {
        Self { vlans }
    }
}

#[async_trait]
impl FleetTask for VlanConfigTask {
    type Output = usize;

    fn name(&self) -> &str {
        "vlan_config"
    }

    async fn run(&self, session: &mut DeviceSession) -> Result<usize> {
        for vlan in &self.vlans {
            session.configure(&vlan.statements()).await?;
        }

        info!("{} VLANs configured on {}", self.vlans.len(), session.device());
        Ok(self.vlans.len())
    }
}
