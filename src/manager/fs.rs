// Copyright (c) 2025 Ant Group
//
// SPDX-License-Identifier: Apache-2.0 or MIT
//

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::fs::error::{Error as FsError, ErrorKind as FsErrorKind};
use crate::fs::{
    get_cgroup_procs, get_cgroup_subsystems, write_control_file, CgroupSubsystems,
    CGROUP_SUBTREE_CONTROL, CPU_CFS_PERIOD_US, CPU_CFS_QUOTA_US, CPU_MAX, CPU_SHARES, CPU_WEIGHT,
    MEMORY_LIMIT_IN_BYTES, MEMORY_MAX,
};
use crate::manager::error::{Error, Result};
use crate::manager::{conv, reduced_cpu_config, CgroupDriver, CgroupManager};
use crate::{CgroupConfig, CgroupName, CgroupPid, ResourceConfig};

/// Controllers the manager writes to, enabled for the children of every
/// ancestor on cgroup v2.
const CONTROLLERS: [&str; 2] = ["cpu", "memory"];

/// FsManager manages cgroups by writing the cgroup filesystem (cgroupfs)
/// directly.
///
/// The on-disk layout of a name is decided by the driver, so the same
/// manager serves the systemd layout when systemd itself is not asked to
/// create anything.
#[derive(Debug, Clone)]
pub struct FsManager {
    /// Cgroup mounts of the node.
    subsystems: CgroupSubsystems,
    driver: CgroupDriver,
}

impl FsManager {
    /// Create an instance of FsManager from the cgroup mounts of the
    /// current process.
    pub fn new(driver: CgroupDriver) -> Result<Self> {
        let subsystems = get_cgroup_subsystems()?;

        Ok(Self::with_subsystems(subsystems, driver))
    }

    /// Create an instance of FsManager over already discovered mounts.
    pub fn with_subsystems(subsystems: CgroupSubsystems, driver: CgroupDriver) -> Self {
        Self { subsystems, driver }
    }

    /// Indicate whether the node runs cgroup v2.
    pub fn v2(&self) -> bool {
        self.subsystems.is_unified()
    }

    fn relative_path(&self, name: &CgroupName) -> String {
        self.driver
            .name(name)
            .trim_start_matches('/')
            .to_string()
    }

    /// Every directory the cgroup lives in, one per distinct mount.
    pub fn paths(&self, name: &CgroupName) -> Vec<PathBuf> {
        let relative = self.relative_path(name);
        self.subsystems
            .paths()
            .into_iter()
            .map(|mountpoint| mountpoint.join(&relative))
            .collect()
    }

    /// The directory holding the control files of `subsystem`. On cgroup
    /// v2 that is the directory in the unified hierarchy for every
    /// subsystem.
    pub fn subsystem_path(&self, subsystem: &str, name: &CgroupName) -> Result<PathBuf> {
        let mountpoint = if self.v2() {
            self.subsystems.mounts.first().map(|m| m.mountpoint.as_str())
        } else {
            self.subsystems
                .mount_points
                .get(subsystem)
                .map(|m| m.as_str())
        };

        let mountpoint = mountpoint.ok_or_else(|| {
            FsError::new(FsErrorKind::SubsystemNotMounted(subsystem.to_string()))
        })?;

        Ok(Path::new(mountpoint).join(self.relative_path(name)))
    }

    /// Enable the controllers for the children of every ancestor of
    /// `name`, topdown from the root of the hierarchy:
    /// -> root
    ///   -> root's child
    ///     -> ...
    ///       -> name's parent
    ///         -> name [not included]
    ///
    /// This is best effort, a controller that can not be enabled only
    /// means its files won't show up in `name`.
    fn enable_controllers_topdown(&self, name: &CgroupName) {
        let mount = match self.subsystems.mounts.first() {
            Some(mount) => mount,
            None => return,
        };

        let controllers: Vec<String> = CONTROLLERS
            .iter()
            .filter(|c| mount.subsystems.is_empty() || mount.subsystems.iter().any(|s| s == *c))
            .map(|c| format!("+{}", c))
            .collect();
        if controllers.is_empty() {
            return;
        }
        let value = controllers.join(" ");

        let mut ancestors = vec![];
        let mut parent = name.parent();
        while let Some(p) = parent {
            parent = p.parent();
            ancestors.push(p);
        }

        // Pop from the stack, root first
        while let Some(ancestor) = ancestors.pop() {
            let dir = Path::new(&mount.mountpoint).join(self.relative_path(&ancestor));
            if let Err(err) = write_control_file(&dir, CGROUP_SUBTREE_CONTROL, &value) {
                warn!(
                    "failed to enable controllers {:?} in {}: {}",
                    value,
                    dir.display(),
                    err
                );
            }
        }
    }

    fn set_resources_v1(&self, name: &CgroupName, resources: &ResourceConfig) -> Result<()> {
        let bandwidth = resources.cfs_bandwidth();

        if resources.cpu_shares.is_some() || bandwidth.is_some() {
            let dir = self.subsystem_path("cpu", name)?;

            if let Some(shares) = resources.cpu_shares {
                write_control_file(&dir, CPU_SHARES, &shares.to_string())?;
            }

            // The period goes first, the kernel validates the quota
            // against it.
            if let Some((quota, period)) = bandwidth {
                write_control_file(&dir, CPU_CFS_PERIOD_US, &period.to_string())?;
                write_control_file(&dir, CPU_CFS_QUOTA_US, &quota.to_string())?;
            }
        }

        if let Some(memory) = resources.memory {
            let dir = self.subsystem_path("memory", name)?;
            write_control_file(&dir, MEMORY_LIMIT_IN_BYTES, &memory.to_string())?;
        }

        Ok(())
    }

    fn set_resources_v2(&self, name: &CgroupName, resources: &ResourceConfig) -> Result<()> {
        if resources.is_empty() {
            return Ok(());
        }
        let dir = self.subsystem_path("cpu", name)?;

        if let Some(shares) = resources.cpu_shares {
            let weight = conv::cpu_shares_to_cgroup_v2(shares);
            if weight != 0 {
                write_control_file(&dir, CPU_WEIGHT, &weight.to_string())?;
            }
        }

        if let Some((quota, period)) = resources.cfs_bandwidth() {
            let max = if quota < 0 {
                "max".to_string()
            } else {
                quota.to_string()
            };
            write_control_file(&dir, CPU_MAX, &format!("{} {}", max, period))?;
        }

        if let Some(memory) = resources.memory {
            write_control_file(&dir, MEMORY_MAX, &memory.to_string())?;
        }

        Ok(())
    }

    pub(crate) fn set_resources(&self, name: &CgroupName, resources: &ResourceConfig) -> Result<()> {
        if self.v2() {
            self.set_resources_v2(name, resources)
        } else {
            self.set_resources_v1(name, resources)
        }
    }
}

impl CgroupManager for FsManager {
    fn name(&self, name: &CgroupName) -> String {
        self.driver.name(name)
    }

    fn cgroup_name(&self, name: &str) -> CgroupName {
        self.driver.cgroup_name(name)
    }

    fn exists(&self, name: &CgroupName) -> bool {
        let paths = self.paths(name);
        !paths.is_empty() && paths.iter().all(|p| p.is_dir())
    }

    fn create(&self, config: &CgroupConfig) -> Result<()> {
        let paths = self.paths(&config.name);
        if paths.is_empty() {
            return Err(FsError::new(FsErrorKind::NoCgroupMounts).into());
        }

        for path in paths.iter() {
            fs::create_dir_all(path).map_err(|err| {
                FsError::with_cause(
                    FsErrorKind::CreateFailed(path.to_string_lossy().to_string()),
                    err,
                )
            })?;
        }

        if self.v2() {
            self.enable_controllers_topdown(&config.name);
        }

        self.set_resources(&config.name, &config.resource_parameters)?;

        info!(
            "created cgroup {} with {:?}",
            self.name(&config.name),
            config.resource_parameters
        );

        Ok(())
    }

    fn update(&self, config: &CgroupConfig) -> Result<()> {
        if !self.exists(&config.name) {
            debug!(
                "cgroup {} does not exist, skip updating",
                self.name(&config.name)
            );
            return Ok(());
        }

        self.set_resources(&config.name, &config.resource_parameters)?;

        debug!(
            "updated cgroup {} with {:?}",
            self.name(&config.name),
            config.resource_parameters
        );

        Ok(())
    }

    fn destroy(&self, config: &CgroupConfig) -> Result<()> {
        // The root resolves to the mountpoints, which hold every cgroup of
        // the node.
        if config.name.is_root() {
            warn!("refusing to destroy the root cgroup");
            return Err(Error::InvalidArgument);
        }

        for path in self.paths(&config.name) {
            remove_cgroup_dir(&path)?;
        }

        info!("destroyed cgroup {}", self.name(&config.name));

        Ok(())
    }

    fn pids(&self, name: &CgroupName) -> Result<Vec<CgroupPid>> {
        let mut pids = BTreeSet::new();
        for path in self.paths(name) {
            collect_pids(&path, &mut pids)?;
        }

        Ok(pids.into_iter().collect())
    }

    fn reduce_cpu_limits(&self, name: &CgroupName) -> Result<()> {
        self.update(&reduced_cpu_config(name))
    }
}

/// Remove a cgroup directory and its descendants, deepest first. The
/// kernel refuses to remove a cgroup that still has children. Control
/// files go away with their directory.
fn remove_cgroup_dir(path: &Path) -> Result<()> {
    let remove_failed = |err: std::io::Error| {
        FsError::with_cause(
            FsErrorKind::RemoveFailed(path.to_string_lossy().to_string()),
            err,
        )
    };

    let entries = match fs::read_dir(path) {
        Ok(entries) => entries,
        Err(err) if err.kind() == IoErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(remove_failed(err).into()),
    };

    for entry in entries {
        let entry = entry.map_err(remove_failed)?;
        if entry.file_type().map_err(remove_failed)?.is_dir() {
            remove_cgroup_dir(&entry.path())?;
        }
    }

    match fs::remove_dir(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == IoErrorKind::NotFound => Ok(()),
        Err(err) => Err(remove_failed(err).into()),
    }
}

fn collect_pids(path: &Path, pids: &mut BTreeSet<CgroupPid>) -> Result<()> {
    pids.extend(get_cgroup_procs(path)?);

    let entries = match fs::read_dir(path) {
        Ok(entries) => entries,
        // Removed while walking.
        Err(err) if err.kind() == IoErrorKind::NotFound => return Ok(()),
        Err(err) => {
            return Err(FsError::with_cause(
                FsErrorKind::ReadFailed(path.to_string_lossy().to_string()),
                err,
            )
            .into())
        }
    };

    for entry in entries.flatten() {
        if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            collect_pids(&entry.path(), pids)?;
        }
    }

    Ok(())
}
