// Copyright (c) 2025 Ant Group
//
// SPDX-License-Identifier: Apache-2.0 or MIT
//

use crate::systemd::error::{Error, Result};
use crate::systemd::{ROOT_SLICE, SLICE_SUFFIX};
use crate::CgroupName;

/// Check if a systemd unit name is a slice unit.
pub fn is_slice_unit(name: &str) -> bool {
    name.ends_with(SLICE_SUFFIX)
}

/// Expand a slice name to a full path in the filesystem.
///
/// # Arguments
///
/// * `slice` - A string slice that holds the slice name in the format
///   "xxx-yyy-zzz.slice".
///
/// # Returns
///
/// A string that represents the full path of the slice in the filesystem.
/// In the above case, the value would be
/// "xxx.slice/xxx-yyy.slice/xxx-yyy-zzz.slice".
pub fn expand_slice(slice: &str) -> Result<String> {
    // Name has to end with ".slice", but can't be just ".slice".
    if !slice.ends_with(SLICE_SUFFIX) || slice.len() <= SLICE_SUFFIX.len() {
        return Err(Error::InvalidArgument);
    }

    // Path-separators are not allowed.
    if slice.contains('/') {
        return Err(Error::InvalidArgument);
    }

    let name = slice.trim_end_matches(SLICE_SUFFIX);

    // If input was -.slice, we should just return root now
    if name == "-" {
        return Ok("".to_string());
    }

    let mut slice_path = String::new();
    let mut prefix = String::new();
    for sub_slice in name.split('-') {
        if sub_slice.is_empty() {
            return Err(Error::InvalidArgument);
        }

        slice_path = format!("{}/{}{}{}", slice_path, prefix, sub_slice, SLICE_SUFFIX);
        prefix = format!("{}{}-", prefix, sub_slice);
    }

    // We need a relative path, so remove the first slash.
    slice_path.remove(0);

    Ok(slice_path)
}

// Dashes separate the levels of a slice name, so they can not appear in a
// component.
fn escape_systemd_cgroup_name(part: &str) -> String {
    part.replace('-', "_")
}

fn unescape_systemd_cgroup_name(part: &str) -> String {
    part.replace('_', "-")
}

/// Convert a cgroup name to its systemd representation.
///
/// `["kubepods", "burstable", "pod-1234"]` becomes the slice unit
/// "kubepods-burstable-pod_1234.slice", or, with `output_to_cgroupfs`, the
/// path of that slice in the hierarchy:
/// "/kubepods.slice/kubepods-burstable.slice/kubepods-burstable-pod_1234.slice".
///
/// The root name is "-.slice", which lives at "/".
pub fn convert_cgroup_name_to_systemd(name: &CgroupName, output_to_cgroupfs: bool) -> String {
    if name.is_root() {
        return if output_to_cgroupfs {
            "/".to_string()
        } else {
            ROOT_SLICE.to_string()
        };
    }

    let mut units = Vec::with_capacity(name.components().len());
    let mut prefix = String::new();
    for component in name.components() {
        prefix = if prefix.is_empty() {
            escape_systemd_cgroup_name(component)
        } else {
            format!("{}-{}", prefix, escape_systemd_cgroup_name(component))
        };
        units.push(format!("{}{}", prefix, SLICE_SUFFIX));
    }

    if output_to_cgroupfs {
        format!("/{}", units.join("/"))
    } else {
        units.pop().unwrap_or_default()
    }
}

/// Parse a systemd slice, or the cgroupfs path of one, back into a cgroup
/// name. Only the last path component is looked at.
pub fn parse_systemd_to_cgroup_name(name: &str) -> CgroupName {
    let base = name.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
    let base = base.trim_end_matches(SLICE_SUFFIX);
    if base.is_empty() || base == "-" {
        return CgroupName::root();
    }

    CgroupName::new(base.split('-').map(unescape_systemd_cgroup_name))
}

/// Convert the cgroupfs path of a slice into the slice unit name, e.g.
/// "/kubepods.slice/kubepods-burstable.slice" into
/// "kubepods-burstable.slice".
///
/// The path must be the one systemd lays out for that slice.
pub fn convert_cgroupfs_name_to_systemd(cgroupfs_name: &str) -> Result<String> {
    let trimmed = cgroupfs_name.trim_end_matches('/');
    if trimmed.is_empty() {
        return Ok(ROOT_SLICE.to_string());
    }

    let base = trimmed.rsplit('/').next().unwrap_or_default();
    if !is_slice_unit(base) {
        return Err(Error::InvalidArgument);
    }

    let expected = expand_slice(base)?;
    if trimmed.trim_start_matches('/') != expected {
        return Err(Error::InvalidArgument);
    }

    Ok(base.to_string())
}
