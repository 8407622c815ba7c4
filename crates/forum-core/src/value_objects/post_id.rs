//! Post identifier

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Identifier of a forum post.
///
/// Posts are owned by the external forum database, so the identifier is kept
/// opaque: any non-empty string up to [`PostId::MAX_LEN`] bytes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PostId(String);

impl PostId {
    /// Maximum length in bytes
    pub const MAX_LEN: usize = 128;

    /// Parse and validate a post identifier
    pub fn parse(s: impl Into<String>) -> Result<Self, PostIdParseError> {
        let s = s.into();
        if s.trim().is_empty() {
            return Err(PostIdParseError::Empty);
        }
        if s.len() > Self::MAX_LEN {
            return Err(PostIdParseError::TooLong { max: Self::MAX_LEN });
        }
        // Ids travel as URL path segments, where these two are rewritten
        if s == "." || s == ".." {
            return Err(PostIdParseError::DotSegment);
        }
        Ok(Self(s))
    }

    /// Borrow the raw identifier
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the raw identifier
    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Error when parsing a post identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PostIdParseError {
    #[error("post id must not be empty")]
    Empty,

    #[error("post id too long: max {max} bytes")]
    TooLong { max: usize },

    #[error("post id must not be `.` or `..`")]
    DotSegment,
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for PostId {
    type Err = PostIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PostId::parse(s)
    }
}

impl TryFrom<String> for PostId {
    type Error = PostIdParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        PostId::parse(s)
    }
}

impl AsRef<str> for PostId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for PostId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PostId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PostId::parse(s).map_err(serde::de::Error::custom)
    }
}
