//! Ordered snapshot listings.

use crate::dataset::Dataset;

/// The snapshots of one dataset, newest first.
///
/// Order comes from the snapshot engine's creation order, never from the
/// names. A set for a dataset that does not exist is empty and reports
/// `exists() == false`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SnapshotSet {
    dataset: Dataset,
    names: Vec<String>,
    exists: bool,
}

impl SnapshotSet {
    /// Creates the listing of an existing dataset; `names` are newest first.
    pub fn new<I, S>(dataset: Dataset, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            dataset,
            names: names.into_iter().map(Into::into).collect(),
            exists: true,
        }
    }

    /// Creates the listing of a dataset that does not exist.
    #[must_use]
    pub const fn absent(dataset: Dataset) -> Self {
        Self {
            dataset,
            names: Vec::new(),
            exists: false,
        }
    }

    /// Returns the dataset the listing belongs to.
    #[must_use]
    pub const fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Returns `true` when the dataset exists.
    #[must_use]
    pub const fn exists(&self) -> bool {
        self.exists
    }

    /// Returns the names, newest first.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns the number of snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` when there are no snapshots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns the newest snapshot.
    #[must_use]
    pub fn newest(&self) -> Option<&str> {
        self.names.first().map(String::as_str)
    }

    /// Returns the oldest snapshot.
    #[must_use]
    pub fn oldest(&self) -> Option<&str> {
        self.names.last().map(String::as_str)
    }

    /// Returns `true` when `name` is in the listing.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|candidate| candidate == name)
    }

    /// Returns the position of `name`, counting from the newest.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|candidate| candidate == name)
    }

    /// Returns the names strictly newer than `name`, oldest first.
    ///
    /// Returns an empty iterator when `name` is not in the listing.
    pub fn newer_than(&self, name: &str) -> impl Iterator<Item = &str> {
        let end = self.position(name).unwrap_or(0);
        self.names[..end].iter().rev().map(String::as_str)
    }

    /// Returns the newest name of `self` that also appears in `other`.
    ///
    /// Called on the destination listing with the unfiltered source listing,
    /// this yields the most recent common snapshot.
    #[must_use]
    pub fn most_recent_common(&self, other: &Self) -> Option<&str> {
        self.names
            .iter()
            .map(String::as_str)
            .find(|name| other.contains(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&str]) -> SnapshotSet {
        SnapshotSet::new(Dataset::local("tank/a").expect("valid"), names.iter().copied())
    }

    #[test]
    fn newest_and_oldest_follow_listing_order() {
        let snapshots = set(&["s3", "s2", "s1"]);
        assert_eq!(snapshots.newest(), Some("s3"));
        assert_eq!(snapshots.oldest(), Some("s1"));
        assert!(snapshots.exists());
    }

    #[test]
    fn absent_sets_are_empty() {
        let snapshots = SnapshotSet::absent(Dataset::local("tank/b").expect("valid"));
        assert!(!snapshots.exists());
        assert!(snapshots.is_empty());
        assert_eq!(snapshots.newest(), None);
    }

    #[test]
    fn newer_than_yields_oldest_first() {
        let snapshots = set(&["s4", "s3", "s2", "s1"]);
        assert_eq!(snapshots.newer_than("s2").collect::<Vec<_>>(), ["s3", "s4"]);
        assert_eq!(snapshots.newer_than("s4").count(), 0);
        assert_eq!(snapshots.newer_than("missing").count(), 0);
    }

    #[test]
    fn most_recent_common_uses_destination_order() {
        let source = set(&["s3", "s2", "s1"]);
        let destination = set(&["x1", "s1", "s2"]);
        assert_eq!(destination.most_recent_common(&source), Some("s1"));
        assert_eq!(set(&["x1"]).most_recent_common(&source), None);
    }
}
