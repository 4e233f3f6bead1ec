//! Merge index: posts keyed by `documentId`, in insertion order.

use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::content::{Post, SkipReason, ingest_all};

/// What [`MergeIndex::merge`] did with a fetched post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Identity not seen before; appended.
    Inserted,
    /// `updatedAt` differs from the indexed entry; replaced in place.
    Updated,
    /// Same `updatedAt`; indexed entry kept.
    Unchanged,
}

/// Last-write-wins index of posts.
///
/// Iteration order is insertion order: snapshot entries first, then new
/// identities in the order they were fetched. Replacing an entry keeps its
/// position, so unchanged sources produce byte-identical snapshots.
#[derive(Debug, Default)]
pub struct MergeIndex {
    positions: FxHashMap<String, usize>,
    posts: Vec<Post>,
}

impl MergeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the index from raw snapshot records.
    ///
    /// Records without a usable `documentId` are dropped and reported. A
    /// repeated identity keeps its first position and its last value.
    pub fn from_snapshot(records: Vec<Value>) -> (Self, Vec<SkipReason>) {
        let batch = ingest_all(records);
        let mut index = Self::new();
        for post in batch.posts {
            index.upsert(post);
        }
        (index, batch.skipped)
    }

    /// Fold one fetched post into the index.
    ///
    /// Posts from [`Post::ingest`] always carry an identity; anything else
    /// never enters the index.
    pub fn merge(&mut self, post: Post) -> MergeOutcome {
        let Some(id) = post.document_id() else {
            return MergeOutcome::Unchanged;
        };

        match self.positions.get(id) {
            None => {
                self.upsert(post);
                MergeOutcome::Inserted
            }
            Some(&pos) if self.posts[pos].raw_updated_at() != post.raw_updated_at() => {
                self.posts[pos] = post;
                MergeOutcome::Updated
            }
            Some(_) => MergeOutcome::Unchanged,
        }
    }

    /// Insert or overwrite unconditionally.
    fn upsert(&mut self, post: Post) {
        let Some(id) = post.document_id() else {
            return;
        };
        match self.positions.get(id) {
            Some(&pos) => self.posts[pos] = post,
            None => {
                self.positions.insert(id.to_string(), self.posts.len());
                self.posts.push(post);
            }
        }
    }

    pub fn get(&self, document_id: &str) -> Option<&Post> {
        self.positions.get(document_id).map(|&pos| &self.posts[pos])
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Indexed posts in iteration order.
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn post(value: Value) -> Post {
        Post::ingest(value).unwrap()
    }

    fn ids(index: &MergeIndex) -> Vec<&str> {
        index.posts().iter().filter_map(Post::document_id).collect()
    }

    #[test]
    fn test_merge_inserts_new_identity() {
        let (mut index, _) = MergeIndex::from_snapshot(vec![json!({"documentId": "a"})]);

        let outcome = index.merge(post(json!({"documentId": "b"})));
        assert_eq!(outcome, MergeOutcome::Inserted);
        assert_eq!(ids(&index), ["a", "b"]);
    }

    #[test]
    fn test_merge_replaces_changed_entry_in_place() {
        let (mut index, _) = MergeIndex::from_snapshot(vec![
            json!({"documentId": "a", "updatedAt": "T1", "title": "old"}),
            json!({"documentId": "b", "updatedAt": "T1"}),
        ]);

        let outcome = index.merge(post(
            json!({"documentId": "a", "updatedAt": "T2", "title": "new"}),
        ));
        assert_eq!(outcome, MergeOutcome::Updated);
        assert_eq!(ids(&index), ["a", "b"]);
        assert_eq!(index.get("a").unwrap().get("title"), Some(&json!("new")));
        assert_eq!(index.get("a").unwrap().updated_at(), Some("T2"));
    }

    #[test]
    fn test_merge_same_updated_at_keeps_existing() {
        let (mut index, _) = MergeIndex::from_snapshot(vec![
            json!({"documentId": "a", "updatedAt": "T1", "title": "kept"}),
        ]);

        // Other fields differ, but only updatedAt decides staleness.
        let outcome = index.merge(post(
            json!({"documentId": "a", "updatedAt": "T1", "title": "ignored"}),
        ));
        assert_eq!(outcome, MergeOutcome::Unchanged);
        assert_eq!(index.get("a").unwrap().get("title"), Some(&json!("kept")));
    }

    #[test]
    fn test_merge_missing_updated_at_on_both_sides_is_unchanged() {
        let (mut index, _) = MergeIndex::from_snapshot(vec![json!({"documentId": "a"})]);
        let outcome = index.merge(post(json!({"documentId": "a", "slug": "x"})));
        assert_eq!(outcome, MergeOutcome::Unchanged);
    }

    #[test]
    fn test_merge_gaining_updated_at_is_a_change() {
        let (mut index, _) = MergeIndex::from_snapshot(vec![json!({"documentId": "a"})]);
        let outcome = index.merge(post(json!({"documentId": "a", "updatedAt": "T1"})));
        assert_eq!(outcome, MergeOutcome::Updated);
    }

    #[test]
    fn test_empty_snapshot_gives_empty_index() {
        let (index, skipped) = MergeIndex::from_snapshot(Vec::new());
        assert!(index.is_empty());
        assert!(skipped.is_empty());

        let (index, _) = MergeIndex::from_snapshot(vec![json!({"slug": "no-id"})]);
        assert!(index.is_empty());
    }

    #[test]
    fn test_from_snapshot_drops_unidentified_records() {
        let (index, skipped) = MergeIndex::from_snapshot(vec![
            json!({"documentId": "a"}),
            json!({"slug": "orphan"}),
            json!("garbage"),
        ]);

        assert_eq!(index.len(), 1);
        assert_eq!(
            skipped,
            [SkipReason::MissingDocumentId, SkipReason::NotAnObject]
        );
    }

    #[test]
    fn test_from_snapshot_duplicate_identity_last_value_first_position() {
        let (index, _) = MergeIndex::from_snapshot(vec![
            json!({"documentId": "a", "v": 1}),
            json!({"documentId": "b"}),
            json!({"documentId": "a", "v": 2}),
        ]);

        assert_eq!(ids(&index), ["a", "b"]);
        assert_eq!(index.get("a").unwrap().get("v"), Some(&json!(2)));
    }
}
