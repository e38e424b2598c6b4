// Copyright (c) 2025 Ant Group
//
// SPDX-License-Identifier: Apache-2.0 or MIT
//

use crate::manager::cpu_shares_to_cgroup_v2;
use crate::systemd::error::{Error, Result};
use crate::systemd::{
    CPU_QUOTA_PERIOD_US, CPU_QUOTA_PER_SEC_US, CPU_SHARES, CPU_SYSTEMD_VERSION, CPU_WEIGHT,
};

/// Returns the property for CPU shares. On the unified hierarchy the
/// shares are converted to a weight.
pub fn shares(shares: u64, v2: bool) -> (&'static str, u64) {
    if v2 {
        (CPU_WEIGHT, cpu_shares_to_cgroup_v2(shares))
    } else {
        (CPU_SHARES, shares)
    }
}

/// Returns the property for CPU period.
pub fn period(period: u64, systemd_version: usize) -> Result<(&'static str, u64)> {
    if systemd_version < CPU_SYSTEMD_VERSION {
        return Err(Error::ObsoleteSystemd);
    }

    Ok((CPU_QUOTA_PERIOD_US, period))
}

/// Return the property for CPU quota.
///
/// systemd expresses the quota as CPU time per second and only accepts
/// multiples of 10ms, so the value is rounded up to the next one. A
/// negative quota means unlimited.
pub fn quota(quota: i64, period: u64) -> (&'static str, u64) {
    if quota <= 0 || period == 0 {
        return (CPU_QUOTA_PER_SEC_US, u64::MAX);
    }

    let mut per_sec = (quota as u64).saturating_mul(1_000_000) / period;
    if per_sec % 10_000 != 0 {
        per_sec = (per_sec / 10_000 + 1) * 10_000;
    }

    (CPU_QUOTA_PER_SEC_US, per_sec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shares() {
        assert_eq!(shares(1024, false), (CPU_SHARES, 1024));
        assert_eq!(shares(1024, true), (CPU_WEIGHT, 39));
        assert_eq!(shares(2, true), (CPU_WEIGHT, 1));
    }

    #[test]
    fn test_period() {
        assert_eq!(period(100000, 242).unwrap(), (CPU_QUOTA_PERIOD_US, 100000));
        assert!(matches!(period(100000, 241), Err(Error::ObsoleteSystemd)));
    }

    #[test]
    fn test_quota() {
        // Half a CPU.
        assert_eq!(quota(50000, 100000), (CPU_QUOTA_PER_SEC_US, 500_000));
        // 1.1% is rounded up to 2%.
        assert_eq!(quota(1100, 100000), (CPU_QUOTA_PER_SEC_US, 20_000));
        assert_eq!(quota(1000, 100000), (CPU_QUOTA_PER_SEC_US, 10_000));
        assert_eq!(quota(-1, 100000), (CPU_QUOTA_PER_SEC_US, u64::MAX));
    }
}
