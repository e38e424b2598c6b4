// Copyright (c) 2025 Ant Group
//
// SPDX-License-Identifier: Apache-2.0 or MIT
//

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind as IoErrorKind};
use std::path::Path;

use crate::fs::error::ErrorKind::*;
use crate::fs::error::*;
use crate::fs::CGROUP_PROCS;
use crate::CgroupPid;

/// Read the `cgroup.procs` file of the cgroup at `dir` and return the
/// tgids attached to it.
///
/// A missing procs file means that no process is attached, so an empty
/// list is returned. Empty lines are skipped; the first other line that is
/// not exactly a pid, surrounding whitespace included, fails the whole read.
pub fn get_cgroup_procs(dir: &Path) -> Result<Vec<CgroupPid>> {
    let procs_file = dir.join(CGROUP_PROCS);
    let procs_path = procs_file.to_string_lossy().to_string();

    let f = match File::open(&procs_file) {
        Ok(f) => f,
        Err(err) if err.kind() == IoErrorKind::NotFound => return Ok(vec![]),
        Err(err) => return Err(Error::with_cause(ReadFailed(procs_path), err)),
    };

    let mut pids = vec![];
    for line in BufReader::new(f).lines() {
        let line = line.map_err(|e| Error::with_cause(ReadFailed(procs_path.clone()), e))?;
        if line.is_empty() {
            continue;
        }

        let pid = line.parse::<u64>().map_err(|e| {
            Error::with_cause(
                InvalidPid {
                    path: procs_path.clone(),
                    line: line.clone(),
                },
                e,
            )
        })?;
        pids.push(CgroupPid::from(pid));
    }

    Ok(pids)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_get_cgroup_procs_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("kubepods").join("pod1234");

        assert!(get_cgroup_procs(&missing).unwrap().is_empty());
    }

    #[test]
    fn test_get_cgroup_procs_missing_file() {
        let dir = tempfile::tempdir().unwrap();

        assert!(get_cgroup_procs(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_get_cgroup_procs() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CGROUP_PROCS), "1\n\n42\n\n1337\n").unwrap();

        let pids = get_cgroup_procs(dir.path()).unwrap();
        assert_eq!(
            pids,
            vec![
                CgroupPid::from(1),
                CgroupPid::from(42),
                CgroupPid::from(1337)
            ]
        );
    }

    #[test]
    fn test_get_cgroup_procs_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CGROUP_PROCS), "").unwrap();

        assert!(get_cgroup_procs(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_get_cgroup_procs_invalid_line() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CGROUP_PROCS), "12\nabc\n13\n").unwrap();

        let err = get_cgroup_procs(dir.path()).unwrap_err();
        match err.kind() {
            InvalidPid { path, line } => {
                assert_eq!(line, "abc");
                assert!(path.ends_with(CGROUP_PROCS));
            }
            kind => panic!("unexpected error kind: {:?}", kind),
        }
        assert!(err.to_string().contains("abc"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_get_cgroup_procs_padded_line() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CGROUP_PROCS), "12\n 13 \n").unwrap();

        let err = get_cgroup_procs(dir.path()).unwrap_err();
        assert!(matches!(err.kind(), InvalidPid { line, .. } if line == " 13 "));

        fs::write(dir.path().join(CGROUP_PROCS), "12\n  \n").unwrap();
        assert!(get_cgroup_procs(dir.path()).is_err());
    }

    #[test]
    fn test_get_cgroup_procs_not_a_file() {
        let dir = tempfile::tempdir().unwrap();
        // A directory in place of the procs file is an I/O error, not an
        // empty cgroup.
        fs::create_dir(dir.path().join(CGROUP_PROCS)).unwrap();

        let err = get_cgroup_procs(dir.path()).unwrap_err();
        assert!(matches!(err.kind(), ReadFailed(_)));
    }
}
