// Copyright (c) 2025 Ant Group
//
// SPDX-License-Identifier: Apache-2.0 or MIT
//

use crate::manager::error::{Error, Result};
use crate::manager::CgroupManager;
use crate::{CgroupConfig, CgroupName, CgroupPid};

/// The manager of platforms without cgroups: nothing exists and nothing
/// can be created.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedManager;

impl CgroupManager for UnsupportedManager {
    fn name(&self, _name: &CgroupName) -> String {
        String::new()
    }

    fn cgroup_name(&self, _name: &str) -> CgroupName {
        CgroupName::root()
    }

    fn exists(&self, _name: &CgroupName) -> bool {
        false
    }

    fn create(&self, _config: &CgroupConfig) -> Result<()> {
        Err(Error::NotSupported)
    }

    fn update(&self, _config: &CgroupConfig) -> Result<()> {
        Ok(())
    }

    fn destroy(&self, _config: &CgroupConfig) -> Result<()> {
        Ok(())
    }

    fn pids(&self, _name: &CgroupName) -> Result<Vec<CgroupPid>> {
        Ok(vec![])
    }

    fn reduce_cpu_limits(&self, _name: &CgroupName) -> Result<()> {
        Err(Error::NotSupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ResourceConfig;

    #[test]
    fn test_unsupported_manager() {
        let manager = UnsupportedManager;
        let name = CgroupName::new(vec!["kubepods", "pod1"]);
        let config = CgroupConfig::new(
            name.clone(),
            ResourceConfig {
                cpu_shares: Some(1024),
                ..Default::default()
            },
        );

        assert!(!manager.exists(&name));
        assert!(matches!(manager.create(&config), Err(Error::NotSupported)));
        assert!(!manager.exists(&name));
        manager.update(&config).unwrap();
        manager.destroy(&config).unwrap();
        assert!(manager.pids(&name).unwrap().is_empty());
        assert!(matches!(
            manager.reduce_cpu_limits(&name),
            Err(Error::NotSupported)
        ));
        assert_eq!(manager.name(&name), "");
        assert!(manager.cgroup_name("/kubepods/pod1").is_root());
    }

    #[test]
    fn test_unsupported_manager_as_trait_object() {
        let manager: Box<dyn CgroupManager> = Box::new(UnsupportedManager);
        let config = CgroupConfig::new(CgroupName::new(vec!["kubepods"]), Default::default());

        // Update before create is a no-op, like on a real node.
        manager.update(&config).unwrap();
        assert!(manager.create(&config).is_err());
    }
}
