// Copyright (c) 2018 Levente Kurusa
// Copyright (c) 2020-2025 Ant Group
//
// SPDX-License-Identifier: Apache-2.0 or MIT
//

use std::error::Error as StdError;
use std::fmt;

/// The different types of errors that can occur while manipulating the
/// cgroup filesystem.
#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    #[error("fs error")]
    FsError,

    #[error("failed to find cgroup mounts")]
    NoCgroupMounts,

    /// A resource needs a controller that is not mounted.
    #[error("the {0} subsystem is not mounted")]
    SubsystemNotMounted(String),

    #[error("unable to create control group directory {0}")]
    CreateFailed(String),

    #[error("unable to remove control group directory {0}")]
    RemoveFailed(String),

    /// Failed to write the value to a control file.
    #[error("unable to write to a control group file {0}, value {1}")]
    WriteFailed(String, String),

    #[error("unable to read a control group file {0}")]
    ReadFailed(String),

    /// A line of a `cgroup.procs` file is not a process id.
    #[error("unexpected line {line:?} in {path}; could not convert to pid")]
    InvalidPid { path: String, line: String },
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    cause: Option<Box<dyn StdError + Send + Sync>>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(cause) = &self.cause {
            write!(f, "{}: {}", self.kind, cause)
        } else {
            write!(f, "{}", self.kind)
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self.cause {
            Some(ref x) => Some(&**x),
            None => None,
        }
    }
}

impl Error {
    pub(crate) fn new(kind: ErrorKind) -> Self {
        Self { kind, cause: None }
    }

    pub(crate) fn with_cause<E>(kind: ErrorKind, cause: E) -> Self
    where
        E: 'static + Send + Sync + StdError,
    {
        Self {
            kind,
            cause: Some(Box::new(cause)),
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

pub type Result<T> = ::std::result::Result<T, Error>;
