//! Key paths.
//!
//! Every channel in a model is addressed by the full sequence of field names
//! leading to it from the root, so `a.name` and `b.name` never share a
//! channel.

use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;

use crate::error::BindError;

/// A dotted path of identifiers, e.g. `user.name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyPath {
    segments: SmallVec<[String; 2]>,
}

impl KeyPath {
    /// Parse a dotted path. Each segment must match `[A-Za-z_$][A-Za-z0-9_]*`.
    pub fn parse(raw: &str) -> Result<Self, BindError> {
        let segments: SmallVec<[String; 2]> = raw.split('.').map(str::to_owned).collect();

        if segments.iter().all(|s| is_identifier(s)) {
            Ok(Self { segments })
        } else {
            Err(BindError::InvalidKeyPath { raw: raw.to_owned() })
        }
    }

    /// Whether `key` can appear as one segment of a path.
    pub fn is_key(key: &str) -> bool {
        is_identifier(key)
    }

    /// A single-segment path from a key already checked with
    /// [`KeyPath::is_key`].
    pub(crate) fn root(key: &str) -> Self {
        Self {
            segments: SmallVec::from_iter([key.to_owned()]),
        }
    }

    /// Extend this path by one field.
    pub fn child(&self, key: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(key.to_owned());
        Self { segments }
    }

    /// The path one level up, or `None` for a top-level key.
    pub fn parent(&self) -> Option<Self> {
        if self.segments.len() < 2 {
            return None;
        }
        let mut segments = self.segments.clone();
        segments.pop();
        Some(Self { segments })
    }

    /// The last field name.
    pub fn leaf(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Number of fields from the root.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Iterate the field names from the root.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl FromStr for KeyPath {
    type Err = BindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
