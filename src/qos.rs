// Copyright (c) 2025 Ant Group
//
// SPDX-License-Identifier: Apache-2.0 or MIT
//

//! Quality-of-service aware derivation of cgroup resources for a pod.

use std::fmt;
use std::str::FromStr;

use crate::manager::error::{Error, Result};
use crate::manager::{milli_cpu_to_quota, milli_cpu_to_shares, MIN_SHARES};
use crate::quantity::{parse_cpu_millis, parse_memory_bytes};
use crate::ResourceConfig;

/// The resource guarantee tier of a pod. It is computed by the caller from
/// how the pod's requests compare to its limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum QOSClass {
    /// Every container has limits equal to its requests.
    Guaranteed,
    /// At least one container has a request or limit.
    Burstable,
    /// No container has any request or limit.
    BestEffort,
}

impl fmt::Display for QOSClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QOSClass::Guaranteed => "Guaranteed",
            QOSClass::Burstable => "Burstable",
            QOSClass::BestEffort => "BestEffort",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for QOSClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Guaranteed" => Ok(QOSClass::Guaranteed),
            "Burstable" => Ok(QOSClass::Burstable),
            "BestEffort" => Ok(QOSClass::BestEffort),
            _ => Err(Error::InvalidArgument),
        }
    }
}

/// CPU and memory quantities of a container. An absent quantity and a
/// quantity of zero are both "not declared".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceList {
    pub cpu_millis: Option<u64>,
    pub memory_bytes: Option<u64>,
}

impl ResourceList {
    pub fn new(cpu_millis: u64, memory_bytes: u64) -> Self {
        Self {
            cpu_millis: Some(cpu_millis),
            memory_bytes: Some(memory_bytes),
        }
    }

    /// Parse the list from quantity strings such as "500m" and "200Mi".
    /// `None` leaves the resource undeclared.
    pub fn parse(cpu: Option<&str>, memory: Option<&str>) -> Result<Self> {
        Ok(Self {
            cpu_millis: cpu.map(parse_cpu_millis).transpose()?,
            memory_bytes: memory.map(parse_memory_bytes).transpose()?,
        })
    }

    fn cpu(&self) -> u64 {
        self.cpu_millis.unwrap_or(0)
    }

    fn memory(&self) -> u64 {
        self.memory_bytes.unwrap_or(0)
    }
}

/// Requests and limits of a single container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContainerResources {
    pub requests: ResourceList,
    pub limits: ResourceList,
}

/// Compute the cgroup resources of a pod from the requests and limits of
/// its containers and its QoS class.
///
/// - `Guaranteed`: shares, quota, period and memory are all set.
/// - `Burstable`: shares are always set; quota and period only if every
///   container declares a CPU limit, memory only if every container
///   declares a memory limit.
/// - `BestEffort`: only the minimum shares.
pub fn resource_config_for_pod(containers: &[ContainerResources], qos: QOSClass) -> ResourceConfig {
    // sum requests and limits, track if limits were declared for each resource
    let mut cpu_requests: u64 = 0;
    let mut cpu_limits: u64 = 0;
    let mut memory_limits: u64 = 0;
    let mut cpu_limits_declared = true;
    let mut memory_limits_declared = true;

    for container in containers.iter() {
        cpu_requests = cpu_requests.saturating_add(container.requests.cpu());
        cpu_limits = cpu_limits.saturating_add(container.limits.cpu());
        if container.limits.cpu() == 0 {
            cpu_limits_declared = false;
        }
        memory_limits = memory_limits.saturating_add(container.limits.memory());
        if container.limits.memory() == 0 {
            memory_limits_declared = false;
        }
    }

    let cpu_shares = milli_cpu_to_shares(cpu_requests);
    let (cpu_quota, cpu_period) = milli_cpu_to_quota(cpu_limits);

    let mut result = ResourceConfig::default();
    match qos {
        QOSClass::Guaranteed => {
            result.cpu_shares = Some(cpu_shares);
            result.cpu_quota = Some(cpu_quota);
            result.cpu_period = Some(cpu_period);
            result.memory = Some(memory_limits);
        }
        QOSClass::Burstable => {
            result.cpu_shares = Some(cpu_shares);
            if cpu_limits_declared {
                result.cpu_quota = Some(cpu_quota);
                result.cpu_period = Some(cpu_period);
            }
            if memory_limits_declared {
                result.memory = Some(memory_limits);
            }
        }
        QOSClass::BestEffort => {
            result.cpu_shares = Some(MIN_SHARES);
        }
    }

    result
}
