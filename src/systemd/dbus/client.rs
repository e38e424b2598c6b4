// Copyright 2021-2023 Kata Contributors
// Copyright (c) 2025 Ant Group
//
// SPDX-License-Identifier: Apache-2.0 or MIT
//

use zbus::blocking::Connection;
use zbus::{Error as ZbusError, Result as ZbusResult};

use crate::systemd::dbus::error::{Error, Result};
use crate::systemd::dbus::systemd_manager_proxy::ManagerProxyBlocking as SystemManager;
use crate::systemd::{Property, NO_SUCH_UNIT, UNIT_MODE_REPLACE};

fn systemd_manager_proxy<'a>() -> ZbusResult<SystemManager<'a>> {
    let connection = Connection::system()?;
    let proxy = SystemManager::new(&connection)?;

    Ok(proxy)
}

/// A transient slice unit managed through the systemd D-Bus API.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SystemdClient {
    /// The name of the slice unit
    unit: String,
}

impl SystemdClient {
    pub fn new(unit: &str) -> Self {
        Self {
            unit: unit.to_string(),
        }
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Start a transient slice unit controlled by systemd.
    ///
    /// For more information, see:
    /// https://www.freedesktop.org/software/systemd/man/latest/systemd.slice.html
    pub fn start(&self, properties: &[Property]) -> Result<()> {
        let sys_proxy = systemd_manager_proxy()?;

        sys_proxy.start_transient_unit(&self.unit, UNIT_MODE_REPLACE, properties, &[])?;

        Ok(())
    }

    /// Stop the unit. A unit that does not exist is already stopped.
    pub fn stop(&self) -> Result<()> {
        let sys_proxy = systemd_manager_proxy()?;

        let ret = sys_proxy.stop_unit(&self.unit, UNIT_MODE_REPLACE);
        ignore_no_such_unit(ret)?;

        // If we stop the unit and it still exists, it may be in a failed
        // state, so we will try to reset it.
        if self.exists() {
            let ret = sys_proxy.reset_failed_unit(&self.unit);
            ignore_no_such_unit(ret)?;
        }

        Ok(())
    }

    /// Set properties for the unit through dbus `SetUnitProperties`. Does
    /// nothing if the unit does not exist.
    pub fn set_properties(&self, properties: &[Property]) -> Result<()> {
        if !self.exists() {
            return Ok(());
        }

        let sys_proxy = systemd_manager_proxy()?;

        sys_proxy.set_unit_properties(&self.unit, true, properties)?;

        Ok(())
    }

    /// Get the systemd version.
    pub fn systemd_version(&self) -> Result<usize> {
        let sys_proxy = systemd_manager_proxy()?;

        // Parse 249 from "249.11-0ubuntu3.16"
        let version = sys_proxy.version()?;
        parse_systemd_version(&version).ok_or(Error::CorruptedSystemdVersion(version))
    }

    /// Check if the unit exists.
    pub fn exists(&self) -> bool {
        let sys_proxy = match systemd_manager_proxy() {
            Ok(proxy) => proxy,
            _ => return false,
        };

        sys_proxy
            .get_unit(&self.unit)
            .map(|_| true)
            .unwrap_or_default()
    }
}

fn parse_systemd_version(version: &str) -> Option<usize> {
    version
        .trim()
        .trim_start_matches('v')
        .split(|c: char| !c.is_ascii_digit())
        .next()
        .and_then(|v| v.parse::<usize>().ok())
}

fn ignore_no_such_unit<T>(result: ZbusResult<T>) -> ZbusResult<bool> {
    if let Err(ZbusError::MethodError(err_name, _, _)) = &result {
        if err_name.as_str() == NO_SUCH_UNIT {
            return Ok(true);
        }
    }
    result.map(|_| false)
}
