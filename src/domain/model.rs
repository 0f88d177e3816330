use crate::utils::error::{ProbeError, Result};
use std::fmt;

/// Status returned by `sodium_init()`. Zero is success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitStatus(pub i32);

impl InitStatus {
    pub fn code(self) -> i32 {
        self.0
    }

    pub fn is_success(self) -> bool {
        self.0 == 0
    }

    pub fn exit_code(self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

impl fmt::Display for InitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeReport {
    pub major: i32,
    pub minor: i32,
    pub init_status: InitStatus,
}

impl ProbeReport {
    pub fn exit_code(&self) -> i32 {
        self.init_status.exit_code()
    }

    pub fn into_result(self) -> Result<Self> {
        if self.init_status.is_success() {
            Ok(self)
        } else {
            Err(ProbeError::InitFailed {
                status: self.init_status.code(),
            })
        }
    }
}
