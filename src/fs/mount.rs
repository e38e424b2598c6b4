// Copyright (c) 2025 Ant Group
//
// SPDX-License-Identifier: Apache-2.0 or MIT
//

//! Discovery of the mounted cgroup subsystems.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::fs::error::ErrorKind::*;
use crate::fs::error::*;
use crate::fs::CGROUP_CONTROLLERS;

const CGROUP_PATH: &str = "/proc/self/cgroup";
const MOUNTINFO_PATH: &str = "/proc/self/mountinfo";

/// The default mountpoint of the unified hierarchy.
pub const UNIFIED_MOUNTPOINT: &str = "/sys/fs/cgroup";

/// A single cgroup mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mount {
    /// Where the hierarchy is mounted, e.g. "/sys/fs/cgroup/memory".
    pub mountpoint: String,
    /// The root of the mount within the hierarchy.
    pub root: String,
    /// Controllers attached to this hierarchy.
    pub subsystems: Vec<String>,
    /// Whether this is a `cgroup2` mount.
    pub v2: bool,
}

/// The mounted cgroup subsystems of the node.
#[derive(Debug, Clone, Default)]
pub struct CgroupSubsystems {
    /// Cgroup mounts in the order they were enumerated.
    pub mounts: Vec<Mount>,
    /// Controller name -> mountpoint. When several mounts advertise the
    /// same controller, the one enumerated last wins.
    pub mount_points: HashMap<String, String>,
}

impl CgroupSubsystems {
    /// Build the controller map from a list of mounts.
    pub fn from_mounts(mounts: Vec<Mount>) -> Self {
        let mut mount_points = HashMap::with_capacity(mounts.len());
        for mount in mounts.iter() {
            for subsystem in mount.subsystems.iter() {
                mount_points.insert(subsystem.clone(), mount.mountpoint.clone());
            }
        }

        Self {
            mounts,
            mount_points,
        }
    }

    /// Whether the node runs a pure cgroup v2 (unified) hierarchy.
    pub fn is_unified(&self) -> bool {
        !self.mounts.is_empty() && self.mounts.iter().all(|m| m.v2)
    }

    /// The distinct mountpoints a cgroup must be materialized under.
    ///
    /// For the unified hierarchy that is the cgroup2 mount itself, even if
    /// it advertises no controllers. For v1 it is every mountpoint that
    /// carries at least one controller; a hybrid node's empty cgroup2 mount
    /// is therefore skipped.
    pub fn paths(&self) -> Vec<PathBuf> {
        let paths: BTreeSet<&str> = if self.is_unified() {
            self.mounts.iter().map(|m| m.mountpoint.as_str()).collect()
        } else {
            self.mount_points.values().map(|p| p.as_str()).collect()
        };

        paths.into_iter().map(PathBuf::from).collect()
    }
}

/// Return information about the mounted cgroup subsystems.
///
/// Fails if the mount table can not be read or if no cgroup mount is
/// found at all.
pub fn get_cgroup_subsystems() -> Result<CgroupSubsystems> {
    let cgroup_data = fs::read_to_string(CGROUP_PATH)
        .map_err(|err| Error::with_cause(FsError, err))?;
    let mountinfo_data = fs::read_to_string(MOUNTINFO_PATH)
        .map_err(|err| Error::with_cause(FsError, err))?;

    let known = parse_cgroup_subsystems(&cgroup_data);
    let mut mounts = parse_cgroup_mountinfo(&mountinfo_data, &known);
    // Stray v1 mounts can not hold any controller on a unified node.
    if is_cgroup2_unified_mode() {
        mounts.retain(|m| m.v2);
    }
    if mounts.is_empty() {
        return Err(Error::new(NoCgroupMounts));
    }

    for mount in mounts.iter_mut().filter(|m| m.v2) {
        mount.subsystems = read_v2_controllers(Path::new(&mount.mountpoint));
    }

    debug!("discovered {} cgroup mounts: {:?}", mounts.len(), mounts);

    Ok(CgroupSubsystems::from_mounts(mounts))
}

/// Parse the controller names listed in `/proc/self/cgroup`.
///
/// Expected line format: `10:memory:/user.slice`. The cgroup v2 line
/// `0::/user.slice` carries no controller.
pub fn parse_cgroup_subsystems(data: &str) -> HashSet<String> {
    let mut subsystems = HashSet::new();

    for line in data.lines() {
        let parts: Vec<&str> = line.splitn(3, ':').collect();
        if parts.len() != 3 {
            // Ignore corrupt lines
            continue;
        }
        subsystems.extend(
            parts[1]
                .split(',')
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string()),
        );
    }

    subsystems
}

/// Parse the cgroup mounts listed in `/proc/self/mountinfo`.
///
/// A `cgroup` mount records the super options that name one of the
/// `known` controllers. A `cgroup2` mount is returned with an empty
/// controller list; the caller reads those from `cgroup.controllers`.
pub fn parse_cgroup_mountinfo(data: &str, known: &HashSet<String>) -> Vec<Mount> {
    let mut mounts = Vec::new();

    for line in data.lines() {
        let mut halves = line.splitn(2, " - ");
        let (part1, part2) = match (halves.next(), halves.next()) {
            (Some(p1), Some(p2)) => (p1, p2),
            _ => continue,
        };
        let part1: Vec<&str> = part1.split(' ').collect();
        let part2: Vec<&str> = part2.split(' ').collect();

        if part1.len() < 5 || part2.len() != 3 {
            continue;
        }

        let fs_type = part2[0];
        let v2 = match fs_type {
            "cgroup" => false,
            "cgroup2" => true,
            _ => continue,
        };

        let subsystems = if v2 {
            vec![]
        } else {
            let subsystems: Vec<String> = part2[2]
                .split(',')
                .filter(|opt| known.contains(*opt))
                .map(|opt| opt.to_string())
                .collect();
            if subsystems.is_empty() {
                continue;
            }
            subsystems
        };

        mounts.push(Mount {
            mountpoint: part1[4].to_string(),
            root: part1[3].to_string(),
            subsystems,
            v2,
        });
    }

    mounts
}

fn read_v2_controllers(mountpoint: &Path) -> Vec<String> {
    match fs::read_to_string(mountpoint.join(CGROUP_CONTROLLERS)) {
        Ok(data) => data.split_whitespace().map(|c| c.to_string()).collect(),
        Err(err) => {
            warn!(
                "failed to read {} under {}: {}",
                CGROUP_CONTROLLERS,
                mountpoint.display(),
                err
            );
            vec![]
        }
    }
}

/// Check whether `/sys/fs/cgroup` is a cgroup2 filesystem.
#[cfg(target_os = "linux")]
pub fn is_cgroup2_unified_mode() -> bool {
    use nix::sys::statfs::{statfs, CGROUP2_SUPER_MAGIC};

    match statfs(UNIFIED_MOUNTPOINT) {
        Ok(st) => st.filesystem_type() == CGROUP2_SUPER_MAGIC,
        Err(_) => false,
    }
}

#[cfg(not(target_os = "linux"))]
pub fn is_cgroup2_unified_mode() -> bool {
    false
}
