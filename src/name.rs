// Copyright (c) 2025 Ant Group
//
// SPDX-License-Identifier: Apache-2.0 or MIT
//

use std::fmt;

/// The hierarchical name of a cgroup, independent of the driver used to
/// lay it out on disk.
///
/// `["kubepods", "burstable", "pod1234"]` is `/kubepods/burstable/pod1234`
/// with the cgroupfs driver. The root cgroup has no component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CgroupName(Vec<String>);

impl CgroupName {
    /// The root cgroup.
    pub fn root() -> Self {
        Self(vec![])
    }

    /// Create a name from its components, outermost first. A component
    /// holding a '/' is split in two and empty components are dropped.
    pub fn new<I, S>(components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parts = Vec::new();
        for component in components {
            parts.extend(
                component
                    .as_ref()
                    .split('/')
                    .filter(|c| !c.is_empty())
                    .map(String::from),
            );
        }
        Self(parts)
    }

    /// Return a new name with `component` appended.
    pub fn child(&self, component: &str) -> Self {
        Self::new(self.0.iter().map(String::as_str).chain(Some(component)))
    }

    pub fn components(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The parent of this name, `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// The cgroupfs literal, e.g. "/kubepods/burstable".
    pub fn to_cgroupfs(&self) -> String {
        format!("/{}", self.0.join("/"))
    }

    /// Parse a cgroupfs literal. Leading, trailing and repeated slashes are
    /// ignored, so "/", "" and "//" are all the root.
    pub fn from_cgroupfs(name: &str) -> Self {
        Self::new(name.split('/'))
    }
}

impl fmt::Display for CgroupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_cgroupfs())
    }
}
