// Copyright (c) 2025 Ant Group
//
// SPDX-License-Identifier: Apache-2.0 or MIT
//

use crate::CgroupName;

/// The resource parameters of a cgroup.
///
/// Every field is optional: `None` leaves the resource unconstrained and
/// the matching control file untouched, it never means zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceConfig {
    /// Relative CPU weight, at least `MIN_SHARES`.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none", default))]
    pub cpu_shares: Option<u64>,
    /// CPU time in microseconds allowed per period.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none", default))]
    pub cpu_quota: Option<i64>,
    /// CFS period in microseconds. A period of zero disables quota and
    /// period altogether.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none", default))]
    pub cpu_period: Option<u64>,
    /// Memory limit in bytes.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none", default))]
    pub memory: Option<u64>,
}

impl ResourceConfig {
    /// The (quota, period) pair to apply, `None` when no CFS bandwidth
    /// limit should be written.
    pub fn cfs_bandwidth(&self) -> Option<(i64, u64)> {
        match (self.cpu_quota, self.cpu_period) {
            (_, Some(0)) => None,
            (Some(quota), period) => Some((quota, period.unwrap_or(crate::manager::QUOTA_PERIOD))),
            (None, _) => None,
        }
    }

    /// Whether no field is populated.
    pub fn is_empty(&self) -> bool {
        self.cpu_shares.is_none()
            && self.cpu_quota.is_none()
            && self.cpu_period.is_none()
            && self.memory.is_none()
    }
}

/// The unit of work submitted to a `CgroupManager`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CgroupConfig {
    /// Fully qualified name of the cgroup.
    pub name: CgroupName,
    /// Resources to apply to the cgroup.
    pub resource_parameters: ResourceConfig,
}

impl CgroupConfig {
    pub fn new(name: CgroupName, resource_parameters: ResourceConfig) -> Self {
        Self {
            name,
            resource_parameters,
        }
    }
}

#[cfg(feature = "oci")]
mod oci {
    use oci_spec::runtime::{
        LinuxCpuBuilder, LinuxMemoryBuilder, LinuxResources, LinuxResourcesBuilder,
    };

    use super::ResourceConfig;
    use crate::manager::error::{Error, Result};

    impl ResourceConfig {
        /// Convert to the OCI runtime representation, so the same
        /// parameters can be handed to a container runtime.
        ///
        /// Absent fields stay absent in the result. A zero period drops
        /// both quota and period.
        pub fn to_linux_resources(&self) -> Result<LinuxResources> {
            let mut cpu = LinuxCpuBuilder::default();
            let mut has_cpu = false;
            if let Some(shares) = self.cpu_shares {
                cpu = cpu.shares(shares);
                has_cpu = true;
            }
            if let Some((quota, period)) = self.cfs_bandwidth() {
                cpu = cpu.quota(quota).period(period);
                has_cpu = true;
            }

            let mut resources = LinuxResourcesBuilder::default();
            if has_cpu {
                resources = resources.cpu(cpu.build().map_err(|_| Error::InvalidLinuxResource)?);
            }
            if let Some(memory) = self.memory {
                let memory = LinuxMemoryBuilder::default()
                    .limit(memory.min(i64::MAX as u64) as i64)
                    .build()
                    .map_err(|_| Error::InvalidLinuxResource)?;
                resources = resources.memory(memory);
            }

            resources.build().map_err(|_| Error::InvalidLinuxResource)
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cfs_bandwidth() {
        let mut config = ResourceConfig {
            cpu_quota: Some(50000),
            cpu_period: Some(100000),
            ..Default::default()
        };
        assert_eq!(config.cfs_bandwidth(), Some((50000, 100000)));

        // Zero period means "do not apply", as produced for zero limits.
        config.cpu_quota = Some(0);
        config.cpu_period = Some(0);
        assert_eq!(config.cfs_bandwidth(), None);

        // A quota without a period uses the default period.
        config.cpu_quota = Some(2000);
        config.cpu_period = None;
        assert_eq!(config.cfs_bandwidth(), Some((2000, 100000)));

        config.cpu_quota = None;
        config.cpu_period = Some(100000);
        assert_eq!(config.cfs_bandwidth(), None);
    }

    #[test]
    fn test_is_empty() {
        assert!(ResourceConfig::default().is_empty());
        assert!(!ResourceConfig {
            memory: Some(1),
            ..Default::default()
        }
        .is_empty());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serialize_skips_absent_fields() {
        let config = ResourceConfig {
            cpu_shares: Some(2),
            ..Default::default()
        };

        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"cpu_shares":2}"#);

        let back: ResourceConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
