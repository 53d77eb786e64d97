//! Content-addressed identifiers and directory tree objects.

use crate::size::ObjectSize;

use std::fmt;
use std::mem;
use std::str::FromStr;

use thiserror::Error;

/// Length of an [`ObjectId`] in bytes.
pub const OBJECT_ID_LEN: usize = 20;

/// A fixed-size identifier derived from an object's content.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ObjectId([u8; OBJECT_ID_LEN]);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseObjectIdError {
  #[error("object id must be {expected} hex digits, got {actual}")]
  Length { expected: usize, actual: usize },
  #[error("invalid hex digit {0:?} in object id")]
  Digit(char),
}

impl ObjectId {
  pub const fn from_bytes(bytes: [u8; OBJECT_ID_LEN]) -> Self {
    Self(bytes)
  }

  pub fn as_bytes(&self) -> &[u8; OBJECT_ID_LEN] {
    &self.0
  }

  pub fn to_hex(&self) -> String {
    self.to_string()
  }
}

impl From<[u8; OBJECT_ID_LEN]> for ObjectId {
  fn from(bytes: [u8; OBJECT_ID_LEN]) -> Self {
    Self(bytes)
  }
}

impl FromStr for ObjectId {
  type Err = ParseObjectIdError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    if s.len() != OBJECT_ID_LEN * 2 {
      return Err(ParseObjectIdError::Length {
        expected: OBJECT_ID_LEN * 2,
        actual: s.len(),
      });
    }

    let mut bytes = [0u8; OBJECT_ID_LEN];
    let mut chars = s.chars();
    for byte in bytes.iter_mut() {
      let mut nibble = || -> Result<u8, ParseObjectIdError> {
        let c = chars.next().unwrap_or_default();
        c.to_digit(16)
          .map(|d| d as u8)
          .ok_or(ParseObjectIdError::Digit(c))
      };
      *byte = (nibble()? << 4) | nibble()?;
    }
    Ok(Self(bytes))
  }
}

impl fmt::Display for ObjectId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for byte in &self.0 {
      write!(f, "{:02x}", byte)?;
    }
    Ok(())
  }
}

impl fmt::Debug for ObjectId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "ObjectId({})", self)
  }
}

/// What a tree entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeEntryKind {
  RegularFile,
  ExecutableFile,
  Symlink,
  Tree,
}

/// One named child of a [`Tree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
  pub name: String,
  pub id: ObjectId,
  pub kind: TreeEntryKind,
  /// File size, when the backing store supplied it.
  pub size: Option<u64>,
}

impl TreeEntry {
  pub fn new(name: impl Into<String>, id: ObjectId, kind: TreeEntryKind) -> Self {
    Self {
      name: name.into(),
      id,
      kind,
      size: None,
    }
  }

  pub fn with_size(mut self, size: u64) -> Self {
    self.size = Some(size);
    self
  }

  pub fn is_tree(&self) -> bool {
    self.kind == TreeEntryKind::Tree
  }
}

/// An immutable directory listing, identified by the hash of its content.
///
/// Entries are kept sorted by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
  id: ObjectId,
  entries: Vec<TreeEntry>,
}

impl Tree {
  pub fn new(id: ObjectId, mut entries: Vec<TreeEntry>) -> Self {
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Self { id, entries }
  }

  pub fn id(&self) -> ObjectId {
    self.id
  }

  pub fn entries(&self) -> &[TreeEntry] {
    &self.entries
  }

  /// Looks up a child by exact name.
  pub fn get(&self, name: &str) -> Option<&TreeEntry> {
    self
      .entries
      .binary_search_by(|entry| entry.name.as_str().cmp(name))
      .ok()
      .map(|index| &self.entries[index])
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

impl ObjectSize for Tree {
  fn size_in_bytes(&self) -> u64 {
    let names: usize = self.entries.iter().map(|entry| entry.name.len()).sum();
    (mem::size_of::<Self>() + self.entries.len() * mem::size_of::<TreeEntry>() + names) as u64
  }
}
