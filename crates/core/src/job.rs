//! Archive job identifiers and status.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Longest accepted job id token (fits a signed 64-bit row id).
const MAX_JOB_ID_DIGITS: usize = 19;

/// Identifier of an archive job in the job ledger.
///
/// The textual form is a plain run of ASCII decimal digits.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(i64);

impl JobId {
    pub fn new(id: i64) -> crate::Result<Self> {
        if id < 0 {
            return Err(crate::Error::InvalidJobId(format!("negative job id: {id}")));
        }
        Ok(Self(id))
    }

    /// Parse a job id token.
    pub fn parse(s: &str) -> crate::Result<Self> {
        if s.is_empty() || s.len() > MAX_JOB_ID_DIGITS {
            return Err(crate::Error::InvalidJobId(format!(
                "expected 1 to {MAX_JOB_ID_DIGITS} digits"
            )));
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(crate::Error::InvalidJobId(
                "job id must contain only digits".to_string(),
            ));
        }
        s.parse::<i64>()
            .map(Self)
            .map_err(|_| crate::Error::InvalidJobId("job id out of range".to_string()))
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl FromStr for JobId {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Debug for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JobId({})", self.0)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Archive job status as recorded in the job ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Unknown,
    Uninitialized,
    AwaitingProcessing,
    Running,
    WaitingForBackup,
    Finalizing,
    Finished,
    Failed,
    Timeout,
    Deleted,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Uninitialized => "uninitialized",
            Self::AwaitingProcessing => "awaiting_processing",
            Self::Running => "running",
            Self::WaitingForBackup => "waiting_for_backup",
            Self::Finalizing => "finalizing",
            Self::Finished => "finished",
            Self::Failed => "failed",
            Self::Timeout => "timeout",
            Self::Deleted => "deleted",
        }
    }

    pub fn parse(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "unknown" => Ok(Self::Unknown),
            "uninitialized" => Ok(Self::Uninitialized),
            "awaiting_processing" => Ok(Self::AwaitingProcessing),
            "running" => Ok(Self::Running),
            "waiting_for_backup" => Ok(Self::WaitingForBackup),
            "finalizing" => Ok(Self::Finalizing),
            "finished" => Ok(Self::Finished),
            "failed" => Ok(Self::Failed),
            "timeout" => Ok(Self::Timeout),
            "deleted" => Ok(Self::Deleted),
            other => Err(crate::Error::InvalidJobStatus(other.to_string())),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
