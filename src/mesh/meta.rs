//! Per-element metadata: roles and face tags.
//!
//! Roles record where an element came from relative to the most recent
//! operator, so a later operator (or the selection engine) can target "what
//! was just created" versus "what was already there". Tags are free-form
//! string labels attached to faces.

use std::collections::BTreeSet;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Provenance of a face or vertex relative to the operator that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Role {
    /// Element left alone by a per-element edit.
    Ignored,
    /// Element carried over from the input.
    #[default]
    Existing,
    /// Secondary class of carried-over element.
    ExistingAlt,
    /// Element created by the operator.
    New,
    /// Secondary class of created element.
    NewAlt,
}

impl Role {
    /// True for `New` and `NewAlt`.
    #[inline]
    pub fn is_new(self) -> bool {
        matches!(self, Role::New | Role::NewAlt)
    }
}

/// How a tag travels through later rewrites.
///
/// An `Introvert` tag stays with the faces that descend from its own face.
/// An `Extrovert` tag also spreads onto faces built around the tagged face's
/// vertices and edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TagKind {
    /// Propagates inward only.
    Introvert,
    /// Propagates outward to neighbouring derived faces.
    Extrovert,
}

/// A string label with a propagation kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Tag {
    /// The label.
    pub name: String,
    /// Propagation kind.
    pub kind: TagKind,
}

impl Tag {
    /// Create a tag.
    pub fn new(name: impl Into<String>, kind: TagKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Create an extrovert tag.
    pub fn extrovert(name: impl Into<String>) -> Self {
        Self::new(name, TagKind::Extrovert)
    }

    /// Create an introvert tag.
    pub fn introvert(name: impl Into<String>) -> Self {
        Self::new(name, TagKind::Introvert)
    }
}

/// The set of tags attached to one face.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TagSet(BTreeSet<Tag>);

impl TagSet {
    /// Create an empty tag set.
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Parse a comma-delimited tag list.
    ///
    /// Entries are trimmed and empty entries dropped. Every tag gets
    /// [`TagKind::Introvert`] when `introvert` is set, otherwise
    /// [`TagKind::Extrovert`].
    ///
    /// ```
    /// use hedra::mesh::{TagKind, TagSet};
    ///
    /// let tags = TagSet::parse("red, top,,", false);
    /// assert_eq!(tags.len(), 2);
    /// assert!(tags.contains_name("top"));
    /// assert!(tags.iter().all(|t| t.kind == TagKind::Extrovert));
    /// ```
    pub fn parse(list: &str, introvert: bool) -> Self {
        let kind = if introvert {
            TagKind::Introvert
        } else {
            TagKind::Extrovert
        };
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Tag::new(s, kind))
            .collect()
    }

    /// Add a tag. Returns true if it was not already present.
    pub fn insert(&mut self, tag: Tag) -> bool {
        self.0.insert(tag)
    }

    /// Add every tag of `other`.
    pub fn extend_from(&mut self, other: &TagSet) {
        self.0.extend(other.0.iter().cloned());
    }

    /// Add only the extrovert tags of `other`.
    pub fn extend_extrovert(&mut self, other: &TagSet) {
        self.0.extend(
            other
                .0
                .iter()
                .filter(|t| t.kind == TagKind::Extrovert)
                .cloned(),
        );
    }

    /// The subset of extrovert tags.
    pub fn extrovert(&self) -> TagSet {
        let mut out = TagSet::new();
        out.extend_extrovert(self);
        out
    }

    /// Whether any tag carries this name, regardless of kind.
    pub fn contains_name(&self, name: &str) -> bool {
        self.0.iter().any(|t| t.name == name)
    }

    /// Whether the tag is present.
    pub fn contains(&self, tag: &Tag) -> bool {
        self.0.contains(tag)
    }

    /// Number of tags.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over tags in order.
    pub fn iter(&self) -> impl Iterator<Item = &Tag> + '_ {
        self.0.iter()
    }
}

impl FromIterator<Tag> for TagSet {
    fn from_iter<T: IntoIterator<Item = Tag>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for tag in &self.0 {
            if !first {
                write!(f, ",")?;
            }
            write!(f, "{}", tag.name)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_introvert() {
        let tags = TagSet::parse(" a ,b", true);
        assert_eq!(tags.len(), 2);
        assert!(tags.contains(&Tag::introvert("a")));
        assert!(tags.contains(&Tag::introvert("b")));
        assert!(tags.extrovert().is_empty());
    }

    #[test]
    fn test_parse_empty() {
        assert!(TagSet::parse("", false).is_empty());
        assert!(TagSet::parse(" , ,", false).is_empty());
    }

    #[test]
    fn test_extend_extrovert() {
        let mut source = TagSet::new();
        source.insert(Tag::introvert("inside"));
        source.insert(Tag::extrovert("outside"));

        let mut target = TagSet::new();
        target.extend_extrovert(&source);
        assert_eq!(target.len(), 1);
        assert!(target.contains_name("outside"));
    }

    #[test]
    fn test_display() {
        let tags = TagSet::parse("b,a", false);
        assert_eq!(tags.to_string(), "a,b");
    }

    #[test]
    fn test_role_is_new() {
        assert!(Role::New.is_new());
        assert!(Role::NewAlt.is_new());
        assert!(!Role::Existing.is_new());
        assert_eq!(Role::default(), Role::Existing);
    }
}
