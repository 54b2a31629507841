//! File areas, virtual areas and temp file expiry paths.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Component owning archive artifacts and temp files.
pub const ARCHIVER_COMPONENT: &str = "quiz_archiver";

/// Component owning caller draft uploads.
pub const DRAFT_COMPONENT: &str = "user";

/// Filename of the TSP query virtual file.
pub const TSP_QUERY_FILENAME: &str = "timestampquery";

/// Filename of the TSP reply virtual file.
pub const TSP_REPLY_FILENAME: &str = "timestampreply";

/// Storage area a managed file lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileArea {
    /// Transient caller-owned holding area for fresh uploads.
    Draft,
    /// Permanent archive artifacts.
    Artifact,
    /// Extraction products tagged with an expiry.
    Temp,
}

impl FileArea {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Artifact => "artifact",
            Self::Temp => "temp",
        }
    }

    pub fn parse(s: &str) -> crate::Result<Self> {
        match s {
            "draft" => Ok(Self::Draft),
            "artifact" => Ok(Self::Artifact),
            "temp" => Ok(Self::Temp),
            other => Err(crate::Error::InvalidFileArea(other.to_string())),
        }
    }
}

impl fmt::Display for FileArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pseudo-areas served by synthesizing content from ledger data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VirtualArea {
    TspData,
}

impl VirtualArea {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TspData => "tsp_data",
        }
    }

    /// Match a caller-supplied area name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("tsp_data") {
            Some(Self::TspData)
        } else {
            None
        }
    }
}

/// Which half of a TSP record a virtual file carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TspPart {
    Query,
    Reply,
}

impl TspPart {
    pub fn from_filename(name: &str) -> Option<Self> {
        match name {
            TSP_QUERY_FILENAME => Some(Self::Query),
            TSP_REPLY_FILENAME => Some(Self::Reply),
            _ => None,
        }
    }

    pub fn filename(&self) -> &'static str {
        match self {
            Self::Query => TSP_QUERY_FILENAME,
            Self::Reply => TSP_REPLY_FILENAME,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Query => "application/timestamp-query",
            Self::Reply => "application/timestamp-reply",
        }
    }
}

/// File path of a temp file expiring at `expiry` (epoch seconds).
pub fn temp_file_path(expiry: i64) -> String {
    format!("/{expiry}/")
}

/// Parse the expiry encoded in a temp file path produced by [`temp_file_path`].
pub fn parse_temp_expiry(file_path: &str) -> crate::Result<i64> {
    let inner = file_path
        .strip_prefix('/')
        .and_then(|p| p.strip_suffix('/'))
        .ok_or_else(|| crate::Error::InvalidExpiry(file_path.to_string()))?;
    if inner.is_empty() || !inner.bytes().all(|b| b.is_ascii_digit()) {
        return Err(crate::Error::InvalidExpiry(file_path.to_string()));
    }
    inner
        .parse()
        .map_err(|_| crate::Error::InvalidExpiry(file_path.to_string()))
}
