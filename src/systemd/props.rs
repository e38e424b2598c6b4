// Copyright (c) 2025 Ant Group
//
// SPDX-License-Identifier: Apache-2.0 or MIT
//

use zbus::zvariant::Value as ZbusValue;

use crate::systemd::{
    CPU_ACCOUNTING, DEFAULT_DEPENDENCIES, DEFAULT_DESCRIPTION, DESCRIPTION, MEMORY_ACCOUNTING,
    WANTS,
};

pub type Property<'a> = (&'a str, ZbusValue<'a>);

#[derive(Debug, Clone, Default)]
pub struct PropertiesBuilder {
    cpu_accounting: Option<bool>,
    memory_accounting: Option<bool>,
    default_dependencies: Option<bool>,
    description: Option<String>,
    wants: Option<String>,
}

impl PropertiesBuilder {
    /// Properties of a transient slice `unit` placed below the slice
    /// `parent`.
    pub fn default_slice(parent: &str, unit: &str) -> Self {
        // The parent of a slice is defined via a Wants=.
        Self::default()
            .cpu_accounting(true)
            .memory_accounting(true)
            .default_dependencies(false)
            .description(format!("{} {}:{}", DEFAULT_DESCRIPTION, parent, unit))
            .wants(parent.to_string())
    }

    pub fn cpu_accounting(mut self, enabled: bool) -> Self {
        self.cpu_accounting = Some(enabled);
        self
    }

    pub fn memory_accounting(mut self, enabled: bool) -> Self {
        self.memory_accounting = Some(enabled);
        self
    }

    pub fn default_dependencies(mut self, enabled: bool) -> Self {
        self.default_dependencies = Some(enabled);
        self
    }

    pub fn description(mut self, desc: String) -> Self {
        self.description = Some(desc);
        self
    }

    pub fn wants(mut self, wants: String) -> Self {
        self.wants = Some(wants);
        self
    }

    pub fn build(self) -> Vec<Property<'static>> {
        let mut props = vec![];

        if let Some(cpu_accounting) = self.cpu_accounting {
            props.push((CPU_ACCOUNTING, ZbusValue::Bool(cpu_accounting)));
        }

        if let Some(memory_accounting) = self.memory_accounting {
            props.push((MEMORY_ACCOUNTING, ZbusValue::Bool(memory_accounting)));
        }

        if let Some(default_dependencies) = self.default_dependencies {
            props.push((DEFAULT_DEPENDENCIES, ZbusValue::Bool(default_dependencies)));
        }

        if let Some(description) = self.description {
            props.push((DESCRIPTION, ZbusValue::Str(description.into())));
        } else {
            props.push((DESCRIPTION, ZbusValue::Str(DEFAULT_DESCRIPTION.into())));
        }

        if let Some(wants) = self.wants {
            props.push((WANTS, ZbusValue::Str(wants.into())));
        }

        props
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find<'a>(props: &'a [Property<'static>], id: &str) -> Option<&'a ZbusValue<'static>> {
        props.iter().find(|(k, _)| *k == id).map(|(_, v)| v)
    }

    #[test]
    fn test_default_slice() {
        let props = PropertiesBuilder::default_slice("kubepods.slice", "kubepods-burstable.slice")
            .build();

        assert_eq!(find(&props, CPU_ACCOUNTING), Some(&ZbusValue::Bool(true)));
        assert_eq!(find(&props, MEMORY_ACCOUNTING), Some(&ZbusValue::Bool(true)));
        assert_eq!(
            find(&props, DEFAULT_DEPENDENCIES),
            Some(&ZbusValue::Bool(false))
        );
        assert_eq!(
            find(&props, WANTS),
            Some(&ZbusValue::Str("kubepods.slice".into()))
        );
    }

    #[test]
    fn test_default_description() {
        let props = PropertiesBuilder::default().build();

        assert_eq!(props.len(), 1);
        assert_eq!(
            find(&props, DESCRIPTION),
            Some(&ZbusValue::Str(DEFAULT_DESCRIPTION.into()))
        );
    }
}
