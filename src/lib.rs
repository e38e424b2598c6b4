// Copyright (c) 2018 Levente Kurusa
// Copyright (c) 2020-2025 Ant Group
//
// SPDX-License-Identifier: Apache-2.0 or MIT
//

//! Node-level cgroup resource management.
//!
//! A workload's CPU/memory requests and limits are turned into a
//! [`ResourceConfig`] by the QoS policy in [`qos`], bound to a
//! [`CgroupName`] in a [`CgroupConfig`], and applied through a
//! [`CgroupManager`].

pub mod fs;
pub mod manager;
pub use manager::{new_cgroup_manager, CgroupDriver, CgroupManager, UnsupportedManager};
#[cfg(target_os = "linux")]
pub use manager::{FsManager, SystemdManager};
pub mod name;
pub use name::CgroupName;
pub mod qos;
pub use qos::{resource_config_for_pod, ContainerResources, QOSClass, ResourceList};
pub mod quantity;
pub mod resources;
pub use resources::{CgroupConfig, ResourceConfig};
pub mod systemd;

/// The maximum value for CPU shares in cgroups v1
pub const CPU_SHARES_V1_MAX: u64 = 262144;
/// The maximum value for CPU weight in cgroups v2
pub const CPU_WEIGHT_V2_MAX: u64 = 10000;

/// A structure representing a `pid`, as listed in `cgroup.procs`.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CgroupPid {
    /// The process identifier
    pub pid: u64,
}

impl From<u64> for CgroupPid {
    fn from(u: u64) -> CgroupPid {
        CgroupPid { pid: u }
    }
}

#[cfg(test)]
pub mod tests {
    use std::path::Path;
    use std::process::Command;

    /// The version of the running systemd, e.g. "255", `None` if the
    /// node was not booted with systemd.
    pub fn systemd_version() -> Option<String> {
        if !Path::new("/run/systemd/system").exists() {
            return None;
        }
        let output = Command::new("systemctl").arg("--version").output().ok()?; // Return None if command execution fails
        if !output.status.success() {
            return None;
        }
        // "systemd 255 (255.4-1ubuntu8)"
        String::from_utf8_lossy(&output.stdout)
            .split_whitespace()
            .nth(1)
            .map(|v| v.to_string())
    }

    /// Whether the tests run with enough privileges to touch the real
    /// cgroup filesystem.
    pub fn is_root() -> bool {
        nix::unistd::Uid::effective().is_root()
    }
}
