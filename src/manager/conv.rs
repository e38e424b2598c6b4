// Copyright (c) 2025 Ant Group
//
// SPDX-License-Identifier: Apache-2.0 or MIT
//

use crate::{CPU_SHARES_V1_MAX, CPU_WEIGHT_V2_MAX};

// Taken from lmctfy https://github.com/google/lmctfy/blob/master/lmctfy/controllers/cpu_controller.cc
/// The lowest CPU shares the kernel accepts.
pub const MIN_SHARES: u64 = 2;
/// CPU shares of one whole CPU.
pub const SHARES_PER_CPU: u64 = 1024;
/// Millicores in one CPU.
pub const MILLI_CPU_TO_CPU: u64 = 1000;

/// CFS period, 100000 us is 100ms.
pub const QUOTA_PERIOD: u64 = 100_000;
/// The CFS quota is never less than 1ms.
pub const MIN_QUOTA_PERIOD: i64 = 1000;

/// Convert millicores to CFS shares.
///
/// Zero millicores yields `MIN_SHARES`: an unset request would be mapped to
/// the kernel default of 1024 elsewhere, here it really means "almost
/// nothing".
pub fn milli_cpu_to_shares(milli_cpu: u64) -> u64 {
    if milli_cpu == 0 {
        return MIN_SHARES;
    }

    // Conceptually (milli_cpu / MILLI_CPU_TO_CPU) * SHARES_PER_CPU, but
    // factored to improve rounding.
    let shares = milli_cpu.saturating_mul(SHARES_PER_CPU) / MILLI_CPU_TO_CPU;
    if shares < MIN_SHARES {
        return MIN_SHARES;
    }
    shares
}

/// Convert millicores to a CFS (quota, period) pair.
///
/// CFS bandwidth is measured in two values: `cfs_period_us` (the amount of
/// time to measure usage across) and `cfs_quota_us` (the amount of CPU
/// time allowed to be used across a period). Zero millicores returns
/// `(0, 0)`, which means "do not apply quota and period at all".
pub fn milli_cpu_to_quota(milli_cpu: u64) -> (i64, u64) {
    if milli_cpu == 0 {
        return (0, 0);
    }

    let period = QUOTA_PERIOD;

    // Normalize the millicores over a period.
    let quota = milli_cpu.saturating_mul(QUOTA_PERIOD) / MILLI_CPU_TO_CPU;
    let quota = if quota > i64::MAX as u64 {
        i64::MAX
    } else {
        quota as i64
    };

    if quota < MIN_QUOTA_PERIOD {
        return (MIN_QUOTA_PERIOD, period);
    }
    (quota, period)
}

// Converts CPU shares, used by cgroup v1, to CPU weight, used by cgroup
// v2.
//
// Cgroup v1 CPU shares has a range of [2^1...2^18], i.e. [2...262144],
// and the default value is 1024.
//
// Cgroup v2 CPU weight has a range of [10^0...10^4], i.e. [1...10000],
// and the default value is 100.
pub(crate) fn cpu_shares_to_cgroup_v2(shares: u64) -> u64 {
    if shares == 0 {
        return 0;
    }
    if shares <= 2 {
        return 1;
    }
    if shares >= CPU_SHARES_V1_MAX {
        return CPU_WEIGHT_V2_MAX;
    }

    (((shares - 2) * 9999) / 262142) + 1
}
