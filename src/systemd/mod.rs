// Copyright (c) 2025 Ant Group
//
// SPDX-License-Identifier: Apache-2.0 or MIT
//

//! Slice units for the systemd cgroup driver.

pub mod cpu;
#[cfg(target_os = "linux")]
pub mod dbus;
#[cfg(target_os = "linux")]
pub use dbus::SystemdClient;
mod consts;
pub use consts::*;
pub mod error;
pub mod memory;
pub mod props;
pub use props::Property;
pub mod utils;

/// The root slice, parent of every top-level slice.
pub const ROOT_SLICE: &str = "-.slice";

pub const SLICE_SUFFIX: &str = ".slice";

pub const CPU_SYSTEMD_VERSION: usize = 242;
