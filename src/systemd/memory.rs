// Copyright (c) 2025 Ant Group
//
// SPDX-License-Identifier: Apache-2.0 or MIT
//

use crate::systemd::{MEMORY_LIMIT, MEMORY_MAX};

/// Returns the property for memory limit.
pub fn limit(limit: u64, v2: bool) -> (&'static str, u64) {
    let id = if v2 { MEMORY_MAX } else { MEMORY_LIMIT };

    (id, limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit() {
        assert_eq!(limit(1 << 20, false), (MEMORY_LIMIT, 1 << 20));
        assert_eq!(limit(1 << 20, true), (MEMORY_MAX, 1 << 20));
    }
}
