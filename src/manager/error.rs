// Copyright (c) 2025 Ant Group
//
// SPDX-License-Identifier: Apache-2.0 or MIT
//

use crate::fs::error::Error as CgroupfsError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("cgroup manager is not supported in this build")]
    NotSupported,

    #[error("invalid argument")]
    InvalidArgument,

    #[error("invalid resource quantity {0:?}")]
    InvalidQuantity(String),

    #[error("invalid linux resource")]
    InvalidLinuxResource,

    #[error("cgroupfs error: {0}")]
    Cgroupfs(#[from] CgroupfsError),

    #[cfg(target_os = "linux")]
    #[error("dbus error: {0}")]
    Dbus(#[from] crate::systemd::dbus::error::Error),
}
