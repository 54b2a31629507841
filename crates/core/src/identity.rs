//! Quiz identity triple and the storage paths derived from it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one quiz instance: `(course, course module, quiz)`.
///
/// A zero component means "unset". All stored data for a quiz is namespaced
/// under the path produced by [`QuizIdentity::storage_path`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuizIdentity {
    pub course_id: u64,
    pub cm_id: u64,
    pub quiz_id: u64,
}

impl QuizIdentity {
    pub fn new(course_id: u64, cm_id: u64, quiz_id: u64) -> Self {
        Self {
            course_id,
            cm_id,
            quiz_id,
        }
    }

    /// Canonical storage path for this identity.
    ///
    /// Segments are appended in course, module, quiz order and generation stops
    /// at the first zero, so a quiz id without a module id never produces a
    /// deeper path. The result always starts and ends with `/`.
    pub fn storage_path(&self) -> String {
        let mut path = String::from("/");
        for id in [self.course_id, self.cm_id, self.quiz_id] {
            if id == 0 {
                break;
            }
            path.push_str(&id.to_string());
            path.push('/');
        }
        path
    }

    /// Parse the three leading identity segments of a caller-supplied path.
    ///
    /// Only plain decimal digits are accepted; signs, whitespace and empty
    /// segments are rejected.
    pub fn from_segments(course: &str, cm: &str, quiz: &str) -> crate::Result<Self> {
        Ok(Self {
            course_id: parse_id("course", course)?,
            cm_id: parse_id("module", cm)?,
            quiz_id: parse_id("quiz", quiz)?,
        })
    }
}

/// Storage path for a raw identity triple. See [`QuizIdentity::storage_path`].
pub fn storage_path(course_id: u64, cm_id: u64, quiz_id: u64) -> String {
    QuizIdentity::new(course_id, cm_id, quiz_id).storage_path()
}

fn parse_id(field: &str, segment: &str) -> crate::Result<u64> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(crate::Error::InvalidIdentity(format!(
            "{field} id must be a non-negative integer"
        )));
    }
    segment
        .parse()
        .map_err(|_| crate::Error::InvalidIdentity(format!("{field} id out of range")))
}

impl fmt::Display for QuizIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.course_id, self.cm_id, self.quiz_id)
    }
}
