// Copyright (c) 2025 Ant Group
//
// SPDX-License-Identifier: Apache-2.0 or MIT
//

pub mod error;
use std::fmt;
use std::str::FromStr;

pub use error::{Error, Result};
#[cfg(target_os = "linux")]
mod fs;
#[cfg(target_os = "linux")]
pub use fs::FsManager;
#[cfg(target_os = "linux")]
mod systemd;
#[cfg(target_os = "linux")]
pub use systemd::SystemdManager;
mod unsupported;
pub use unsupported::UnsupportedManager;
mod conv;
pub(crate) use conv::cpu_shares_to_cgroup_v2;
pub use conv::{
    milli_cpu_to_quota, milli_cpu_to_shares, MILLI_CPU_TO_CPU, MIN_QUOTA_PERIOD, MIN_SHARES,
    QUOTA_PERIOD, SHARES_PER_CPU,
};

use crate::systemd::utils::{convert_cgroup_name_to_systemd, parse_systemd_to_cgroup_name};
use crate::{CgroupConfig, CgroupName, CgroupPid, ResourceConfig};

/// How cgroup names are laid out on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CgroupDriver {
    /// Plain directories, `["a", "b"]` is "/a/b".
    Cgroupfs,
    /// systemd slices, `["a", "b"]` is "/a.slice/a-b.slice".
    Systemd,
}

impl CgroupDriver {
    /// The literal cgroupfs path of `name`.
    pub fn name(&self, name: &CgroupName) -> String {
        match self {
            CgroupDriver::Cgroupfs => name.to_cgroupfs(),
            CgroupDriver::Systemd => convert_cgroup_name_to_systemd(name, true),
        }
    }

    /// The inverse of `name()`.
    pub fn cgroup_name(&self, name: &str) -> CgroupName {
        match self {
            CgroupDriver::Cgroupfs => CgroupName::from_cgroupfs(name),
            CgroupDriver::Systemd => parse_systemd_to_cgroup_name(name),
        }
    }
}

impl fmt::Display for CgroupDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CgroupDriver::Cgroupfs => "cgroupfs",
            CgroupDriver::Systemd => "systemd",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for CgroupDriver {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cgroupfs" => Ok(CgroupDriver::Cgroupfs),
            "systemd" => Ok(CgroupDriver::Systemd),
            _ => Err(Error::InvalidArgument),
        }
    }
}

/// Manage the lifecycle of the cgroups of a node.
///
/// All operations are stateless with respect to the manager: everything
/// is read from or written to the cgroup filesystem (and systemd) on each
/// call, so a manager can be shared between threads.
pub trait CgroupManager: Send + Sync {
    /// Return the literal cgroupfs path of a name.
    fn name(&self, name: &CgroupName) -> String;

    /// Parse a literal cgroupfs path back into a name.
    fn cgroup_name(&self, name: &str) -> CgroupName;

    /// Whether the cgroup exists under every required subsystem.
    fn exists(&self, name: &CgroupName) -> bool;

    /// Create the cgroup and apply its resources. Creating a cgroup that
    /// already exists updates it.
    fn create(&self, config: &CgroupConfig) -> Result<()>;

    /// Apply the populated resources of an existing cgroup. Updating a
    /// cgroup that does not exist does nothing.
    fn update(&self, config: &CgroupConfig) -> Result<()>;

    /// Remove the cgroup. Removing a cgroup that does not exist succeeds.
    fn destroy(&self, config: &CgroupConfig) -> Result<()>;

    /// The processes in the cgroup and all its descendants, sorted and
    /// without duplicates.
    fn pids(&self, name: &CgroupName) -> Result<Vec<CgroupPid>>;

    /// Drop the CPU shares of the cgroup to the minimum, leaving every
    /// other resource as it is.
    fn reduce_cpu_limits(&self, name: &CgroupName) -> Result<()>;
}

// The update issued by `reduce_cpu_limits()`.
pub(crate) fn reduced_cpu_config(name: &CgroupName) -> CgroupConfig {
    CgroupConfig::new(
        name.clone(),
        ResourceConfig {
            cpu_shares: Some(MIN_SHARES),
            ..Default::default()
        },
    )
}

/// Create the manager for `driver`, discovering the cgroup mounts of the
/// node.
#[cfg(target_os = "linux")]
pub fn new_cgroup_manager(driver: CgroupDriver) -> Result<Box<dyn CgroupManager>> {
    let manager: Box<dyn CgroupManager> = match driver {
        CgroupDriver::Cgroupfs => Box::new(FsManager::new(driver)?),
        CgroupDriver::Systemd => Box::new(SystemdManager::new()?),
    };

    Ok(manager)
}

/// Cgroups only exist on Linux, other platforms get a manager that
/// refuses to create anything.
#[cfg(not(target_os = "linux"))]
pub fn new_cgroup_manager(_driver: CgroupDriver) -> Result<Box<dyn CgroupManager>> {
    Ok(Box::new(UnsupportedManager))
}
