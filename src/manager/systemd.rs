// Copyright (c) 2025 Ant Group
//
// SPDX-License-Identifier: Apache-2.0 or MIT
//

use log::{debug, info, warn};

use crate::fs::{get_cgroup_subsystems, CgroupSubsystems};
use crate::manager::error::{Error, Result};
use crate::manager::fs::FsManager;
use crate::manager::{reduced_cpu_config, CgroupDriver, CgroupManager};
use crate::systemd::props::PropertiesBuilder;
use crate::systemd::utils::convert_cgroup_name_to_systemd;
use crate::systemd::{cpu, memory, Property, SystemdClient, ROOT_SLICE};
use crate::{CgroupConfig, CgroupName, CgroupPid, ResourceConfig};

/// SystemdManager manages cgroups as transient systemd slices.
///
/// systemd owns the slice units, and the resources are set on both the
/// unit and, through the cgroupfs manager, the control files of the
/// slice, so the values are in effect even before systemd propagates
/// them.
#[derive(Debug, Clone)]
pub struct SystemdManager {
    /// Cgroupfs manager, laying names out as slices
    fs_manager: FsManager,
}

impl SystemdManager {
    /// Create an instance of SystemdManager from the cgroup mounts of the
    /// current process.
    pub fn new() -> Result<Self> {
        let subsystems = get_cgroup_subsystems()?;

        Ok(Self::with_subsystems(subsystems))
    }

    /// Create an instance of SystemdManager over already discovered
    /// mounts.
    pub fn with_subsystems(subsystems: CgroupSubsystems) -> Self {
        Self {
            fs_manager: FsManager::with_subsystems(subsystems, CgroupDriver::Systemd),
        }
    }

    /// Indicate whether the node runs cgroup v2.
    pub fn v2(&self) -> bool {
        self.fs_manager.v2()
    }

    /// The slice unit of a name, e.g. "kubepods-burstable.slice".
    pub fn unit(name: &CgroupName) -> String {
        convert_cgroup_name_to_systemd(name, false)
    }

    fn parent_slice(name: &CgroupName) -> String {
        match name.parent() {
            Some(parent) => Self::unit(&parent),
            None => ROOT_SLICE.to_string(),
        }
    }

    /// The unit properties carrying the populated resources.
    fn resource_properties(
        &self,
        resources: &ResourceConfig,
        systemd_version: usize,
    ) -> Vec<Property<'static>> {
        let v2 = self.v2();
        let mut props: Vec<Property<'static>> = vec![];

        if let Some(shares) = resources.cpu_shares {
            let (id, value) = cpu::shares(shares, v2);
            props.push((id, value.into()));
        }

        if let Some((quota, period)) = resources.cfs_bandwidth() {
            // Older systemd always uses the kernel default period, the
            // control file still gets the requested one.
            match cpu::period(period, systemd_version) {
                Ok((id, value)) => props.push((id, value.into())),
                Err(err) => warn!("skip setting the CPU quota period of the unit: {}", err),
            }

            let (id, value) = cpu::quota(quota, period);
            props.push((id, value.into()));
        }

        if let Some(limit) = resources.memory {
            let (id, value) = memory::limit(limit, v2);
            props.push((id, value.into()));
        }

        props
    }
}

impl CgroupManager for SystemdManager {
    fn name(&self, name: &CgroupName) -> String {
        self.fs_manager.name(name)
    }

    fn cgroup_name(&self, name: &str) -> CgroupName {
        self.fs_manager.cgroup_name(name)
    }

    fn exists(&self, name: &CgroupName) -> bool {
        self.fs_manager.exists(name)
    }

    fn create(&self, config: &CgroupConfig) -> Result<()> {
        // The root slice is owned by systemd itself.
        if config.name.is_root() {
            warn!("refusing to manage {} as a transient slice", ROOT_SLICE);
            return Err(Error::InvalidArgument);
        }

        let unit = Self::unit(&config.name);
        let client = SystemdClient::new(&unit);
        let systemd_version = client.systemd_version()?;
        let resources = self.resource_properties(&config.resource_parameters, systemd_version);

        if client.exists() {
            debug!("unit {} exists, setting its properties", unit);
            client.set_properties(&resources)?;
        } else {
            let parent = Self::parent_slice(&config.name);
            let mut props = PropertiesBuilder::default_slice(&parent, &unit).build();
            props.extend(resources);
            client.start(&props)?;
            info!("started unit {} in {}", unit, parent);
        }

        self.fs_manager.create(config)
    }

    fn update(&self, config: &CgroupConfig) -> Result<()> {
        if !self.exists(&config.name) {
            debug!(
                "cgroup {} does not exist, skip updating",
                self.name(&config.name)
            );
            return Ok(());
        }

        let client = SystemdClient::new(&Self::unit(&config.name));
        let systemd_version = client.systemd_version()?;
        let resources = self.resource_properties(&config.resource_parameters, systemd_version);
        if !resources.is_empty() {
            client.set_properties(&resources)?;
        }

        self.fs_manager.update(config)
    }

    fn destroy(&self, config: &CgroupConfig) -> Result<()> {
        if config.name.is_root() {
            warn!("refusing to stop {}", ROOT_SLICE);
            return Err(Error::InvalidArgument);
        }

        let client = SystemdClient::new(&Self::unit(&config.name));
        client.stop()?;
        info!("stopped unit {}", client.unit());

        self.fs_manager.destroy(config)
    }

    fn pids(&self, name: &CgroupName) -> Result<Vec<CgroupPid>> {
        self.fs_manager.pids(name)
    }

    fn reduce_cpu_limits(&self, name: &CgroupName) -> Result<()> {
        self.update(&reduced_cpu_config(name))
    }
}

#[cfg(test)]
mod tests {
    use rand::distributions::Alphanumeric;
    use rand::Rng;
    use zbus::zvariant::Value as ZbusValue;

    use super::*;
    use crate::fs::{read_control_file, Mount, MEMORY_LIMIT_IN_BYTES, MEMORY_MAX};
    use crate::systemd::{
        CPU_QUOTA_PERIOD_US, CPU_QUOTA_PER_SEC_US, CPU_SHARES, CPU_WEIGHT, MEMORY_LIMIT,
        MEMORY_MAX as MEMORY_MAX_PROP,
    };

    fn manager(v2: bool) -> SystemdManager {
        let subsystems = CgroupSubsystems::from_mounts(vec![Mount {
            mountpoint: "/sys/fs/cgroup".to_string(),
            root: "/".to_string(),
            subsystems: vec!["cpu".to_string(), "memory".to_string()],
            v2,
        }]);
        SystemdManager::with_subsystems(subsystems)
    }

    fn guaranteed() -> ResourceConfig {
        ResourceConfig {
            cpu_shares: Some(512),
            cpu_quota: Some(50000),
            cpu_period: Some(100000),
            memory: Some(1 << 30),
        }
    }

    fn find<'a>(props: &'a [Property<'static>], id: &str) -> Option<&'a ZbusValue<'static>> {
        props.iter().find(|(k, _)| *k == id).map(|(_, v)| v)
    }

    #[test]
    fn test_unit() {
        let name = CgroupName::new(vec!["kubepods", "burstable", "pod-1"]);

        assert_eq!(
            SystemdManager::unit(&name),
            "kubepods-burstable-pod_1.slice"
        );
        assert_eq!(
            SystemdManager::parent_slice(&name),
            "kubepods-burstable.slice"
        );
        assert_eq!(
            SystemdManager::parent_slice(&CgroupName::new(vec!["kubepods"])),
            "-.slice"
        );
    }

    #[test]
    fn test_name() {
        let manager = manager(true);
        let name = CgroupName::new(vec!["kubepods", "besteffort"]);

        assert_eq!(
            manager.name(&name),
            "/kubepods.slice/kubepods-besteffort.slice"
        );
        assert_eq!(manager.cgroup_name(&manager.name(&name)), name);
    }

    #[test]
    fn test_resource_properties_v1() {
        let props = manager(false).resource_properties(&guaranteed(), 249);

        assert_eq!(props.len(), 4);
        assert_eq!(find(&props, CPU_SHARES), Some(&ZbusValue::U64(512)));
        assert_eq!(find(&props, CPU_QUOTA_PERIOD_US), Some(&ZbusValue::U64(100000)));
        assert_eq!(find(&props, CPU_QUOTA_PER_SEC_US), Some(&ZbusValue::U64(500000)));
        assert_eq!(find(&props, MEMORY_LIMIT), Some(&ZbusValue::U64(1 << 30)));
    }

    #[test]
    fn test_resource_properties_v2() {
        let props = manager(true).resource_properties(&guaranteed(), 249);

        assert_eq!(find(&props, CPU_WEIGHT), Some(&ZbusValue::U64(20)));
        assert_eq!(find(&props, MEMORY_MAX_PROP), Some(&ZbusValue::U64(1 << 30)));
        assert_eq!(find(&props, CPU_SHARES), None);
    }

    #[test]
    fn test_resource_properties_obsolete_systemd() {
        let props = manager(true).resource_properties(&guaranteed(), 239);

        assert_eq!(find(&props, CPU_QUOTA_PERIOD_US), None);
        assert_eq!(find(&props, CPU_QUOTA_PER_SEC_US), Some(&ZbusValue::U64(500000)));
    }

    #[test]
    fn test_resource_properties_only_populated() {
        let resources = ResourceConfig {
            cpu_shares: Some(2),
            ..Default::default()
        };
        let props = manager(false).resource_properties(&resources, 249);

        assert_eq!(props.len(), 1);
        assert_eq!(find(&props, CPU_SHARES), Some(&ZbusValue::U64(2)));
        assert!(manager(false)
            .resource_properties(&ResourceConfig::default(), 249)
            .is_empty());
    }

    #[test]
    fn test_root_slice_is_not_managed() {
        // Rejected before systemd is asked anything.
        let manager = manager(true);
        let config = CgroupConfig::new(CgroupName::root(), guaranteed());

        assert!(matches!(manager.create(&config), Err(Error::InvalidArgument)));
        assert!(matches!(manager.destroy(&config), Err(Error::InvalidArgument)));
    }

    #[test]
    fn test_lifecycle() {
        crate::skip_if_no_systemd!();

        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(5)
            .map(char::from)
            .collect();
        let name = CgroupName::new(vec![format!("kubeletcgroupstest{}", suffix.to_lowercase())]);
        let manager = SystemdManager::new().unwrap();
        let config = CgroupConfig::new(name.clone(), guaranteed());

        assert!(!manager.exists(&name));
        manager.update(&config).unwrap();
        assert!(!manager.exists(&name));

        manager.create(&config).unwrap();
        assert!(manager.exists(&name));

        let dir = manager.fs_manager.subsystem_path("memory", &name).unwrap();
        let file = if manager.v2() {
            MEMORY_MAX
        } else {
            MEMORY_LIMIT_IN_BYTES
        };
        assert_eq!(read_control_file(&dir, file).unwrap(), (1u64 << 30).to_string());

        manager.reduce_cpu_limits(&name).unwrap();
        assert!(manager.pids(&name).unwrap().is_empty());

        manager.destroy(&config).unwrap();
        assert!(!manager.exists(&name));
        manager.destroy(&config).unwrap();
    }
}
