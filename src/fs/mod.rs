// Copyright (c) 2018 Levente Kurusa
// Copyright (c) 2020-2025 Ant Group
//
// SPDX-License-Identifier: Apache-2.0 or MIT
//

//! Primitives over the cgroup filesystem: mount discovery, process
//! enumeration and control file access.

pub mod error;
pub mod mount;
pub use mount::{get_cgroup_subsystems, CgroupSubsystems, Mount};
pub mod procs;
pub use procs::get_cgroup_procs;

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::fs::error::ErrorKind::*;
use crate::fs::error::*;

/// The membership file of a cgroup.
pub const CGROUP_PROCS: &str = "cgroup.procs";
/// Controllers enabled for the children of a cgroup (v2).
pub const CGROUP_SUBTREE_CONTROL: &str = "cgroup.subtree_control";
/// Controllers available in a cgroup (v2).
pub const CGROUP_CONTROLLERS: &str = "cgroup.controllers";

/// CPU shares (v1).
pub const CPU_SHARES: &str = "cpu.shares";
/// CFS quota in microseconds (v1).
pub const CPU_CFS_QUOTA_US: &str = "cpu.cfs_quota_us";
/// CFS period in microseconds (v1).
pub const CPU_CFS_PERIOD_US: &str = "cpu.cfs_period_us";
/// Memory limit (v1).
pub const MEMORY_LIMIT_IN_BYTES: &str = "memory.limit_in_bytes";

/// CPU weight (v2).
pub const CPU_WEIGHT: &str = "cpu.weight";
/// CPU bandwidth, "$MAX $PERIOD" (v2).
pub const CPU_MAX: &str = "cpu.max";
/// Memory limit (v2).
pub const MEMORY_MAX: &str = "memory.max";

/// Write `value` to the control file `file` of the cgroup at `dir`.
///
/// The file is opened for writing only and truncated, which is how the
/// kernel expects values to be replaced. The handle is closed before
/// returning on every path.
pub fn write_control_file(dir: &Path, file: &str, value: &str) -> Result<()> {
    let path = dir.join(file);
    let path_str = path.to_string_lossy().to_string();

    let mut f = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&path)
        .map_err(|e| Error::with_cause(WriteFailed(path_str.clone(), value.to_string()), e))?;

    f.write_all(value.as_bytes())
        .map_err(|e| Error::with_cause(WriteFailed(path_str, value.to_string()), e))
}

/// Read the trimmed content of the control file `file` of the cgroup at
/// `dir`.
pub fn read_control_file(dir: &Path, file: &str) -> Result<String> {
    let path = dir.join(file);
    fs::read_to_string(&path)
        .map(|s| s.trim().to_string())
        .map_err(|e| Error::with_cause(ReadFailed(path.to_string_lossy().to_string()), e))
}
