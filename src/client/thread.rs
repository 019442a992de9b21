//! Client-side index of a post's comment thread.
//!
//! The thread is held as a flattened pre-order walk of the comment forest,
//! the exact shape the rendering layer consumes. Each entry carries its
//! depth and whether its direct replies are currently materialized right
//! after it, so reply subtrees can be loaded and unloaded incrementally
//! without refetching the whole tree.
//!
//! Parent links are explicit arena indices recomputed after every
//! structural change; lookups never rescan the sequence.

use std::fmt;

use crate::models::comment::CommentDetail;

/// One rendered row of the flattened thread.
#[derive(Debug, Clone)]
pub struct ThreadEntry {
    pub comment: CommentDetail,
    /// Depth relative to the thread root; top-level comments sit at 0.
    pub level: usize,
    /// Whether this entry's direct replies are materialized immediately
    /// after it in the sequence.
    pub replies_loaded: bool,
    parent: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadError {
    OutOfBounds { pos: usize, len: usize },
}

impl fmt::Display for ThreadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThreadError::OutOfBounds { pos, len } => {
                write!(f, "position {} out of bounds for thread of length {}", pos, len)
            }
        }
    }
}

impl std::error::Error for ThreadError {}

/// Flattened, incrementally loaded view of one post's comment forest.
///
/// Positions shift on every insert and delete; callers must take a fresh
/// position snapshot before each operation.
#[derive(Debug, Clone)]
pub struct ThreadIndex {
    entries: Vec<ThreadEntry>,
    total_comments: i64,
    total_parent_comments: i64,
}

impl ThreadIndex {
    /// Empty thread seeded with the post's activity counters.
    pub fn new(total_comments: i64, total_parent_comments: i64) -> Self {
        Self {
            entries: Vec::new(),
            total_comments,
            total_parent_comments,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, pos: usize) -> Option<&ThreadEntry> {
        self.entries.get(pos)
    }

    /// Flattened pre-order view, in render order.
    pub fn iter(&self) -> std::slice::Iter<'_, ThreadEntry> {
        self.entries.iter()
    }

    pub fn total_comments(&self) -> i64 {
        self.total_comments
    }

    pub fn total_parent_comments(&self) -> i64 {
        self.total_parent_comments
    }

    /// How many top-level comments are materialized; the skip offset for
    /// the next top-level page.
    pub fn loaded_root_count(&self) -> usize {
        self.entries.iter().filter(|e| e.level == 0).count()
    }

    /// Position of the entry's parent, if it has one materialized.
    pub fn parent_of(&self, pos: usize) -> Option<usize> {
        self.entries.get(pos).and_then(|e| e.parent)
    }

    /// Appends the next fetched page of top-level comments.
    pub fn append_roots(&mut self, batch: Vec<CommentDetail>) {
        for comment in batch {
            self.entries.push(ThreadEntry {
                comment,
                level: 0,
                replies_loaded: false,
                parent: None,
            });
        }
        self.reindex();
    }

    /// Prepends a freshly submitted top-level comment.
    pub fn push_root(&mut self, comment: CommentDetail) {
        self.entries.insert(
            0,
            ThreadEntry {
                comment,
                level: 0,
                replies_loaded: false,
                parent: None,
            },
        );
        self.total_comments += 1;
        self.total_parent_comments += 1;
        self.reindex();
    }

    /// Splices a freshly submitted reply right after its parent and records
    /// it in the parent's children list. Returns the new entry's position.
    pub fn insert_reply(
        &mut self,
        parent: usize,
        comment: CommentDetail,
    ) -> Result<usize, ThreadError> {
        self.check(parent)?;

        let level = self.entries[parent].level + 1;
        let id = comment.id;
        self.entries.insert(
            parent + 1,
            ThreadEntry {
                comment,
                level,
                replies_loaded: false,
                parent: Some(parent),
            },
        );
        self.entries[parent].comment.children.push(id);
        self.entries[parent].replies_loaded = true;
        self.total_comments += 1;
        self.reindex();
        Ok(parent + 1)
    }

    /// Materializes a fetched batch of the entry's direct replies.
    ///
    /// `skip == 0` is a fresh (re)load: anything already materialized under
    /// the entry is collapsed first so nothing shows up twice. A non-zero
    /// `skip` is a load-more call and the batch lands after the entries
    /// already shown, at the end of the subtree span.
    pub fn expand_replies(
        &mut self,
        pos: usize,
        skip: usize,
        batch: Vec<CommentDetail>,
    ) -> Result<(), ThreadError> {
        self.check(pos)?;

        if skip == 0 {
            self.collapse_replies(pos)?;
        }

        let level = self.entries[pos].level + 1;
        let at = pos + 1 + self.subtree_span(pos);
        for (i, comment) in batch.into_iter().enumerate() {
            self.entries.insert(
                at + i,
                ThreadEntry {
                    comment,
                    level,
                    replies_loaded: false,
                    parent: Some(pos),
                },
            );
        }
        self.entries[pos].replies_loaded = true;
        self.reindex();
        Ok(())
    }

    /// Drops every materialized descendant of the entry from the sequence.
    pub fn collapse_replies(&mut self, pos: usize) -> Result<(), ThreadError> {
        self.check(pos)?;

        let span = self.subtree_span(pos);
        self.entries.drain(pos + 1..pos + 1 + span);
        self.entries[pos].replies_loaded = false;
        self.reindex();
        Ok(())
    }

    /// Removes the entry after a confirmed server-side delete.
    ///
    /// Descendants are collapsed first so none are left dangling, the id is
    /// pulled from the parent's children list, and a parent left childless
    /// flips back to the fetchable "N replies" state.
    pub fn remove(&mut self, pos: usize) -> Result<CommentDetail, ThreadError> {
        self.check(pos)?;

        self.collapse_replies(pos)?;

        let level = self.entries[pos].level;
        if let Some(parent) = self.entries[pos].parent {
            let id = self.entries[pos].comment.id;
            self.entries[parent].comment.children.retain(|c| *c != id);
            if self.entries[parent].comment.children.is_empty() {
                self.entries[parent].replies_loaded = false;
            }
        }

        let entry = self.entries.remove(pos);
        self.total_comments -= 1;
        if level == 0 {
            self.total_parent_comments -= 1;
        }
        self.reindex();
        Ok(entry.comment)
    }

    /// Whether the load-more-replies affordance shows under this entry:
    /// it must close its parent's materialized run, and the parent must
    /// have more children server-side than are currently shown.
    pub fn can_load_more_replies(&self, pos: usize) -> bool {
        self.load_more_params(pos).is_some()
    }

    /// Parent position and skip offset for the next reply fetch, when the
    /// affordance applies.
    pub fn load_more_params(&self, pos: usize) -> Option<(usize, usize)> {
        let entry = self.entries.get(pos)?;
        let parent = entry.parent?;

        let closes_run = match self.entries.get(pos + 1) {
            None => true,
            Some(next) => next.level < entry.level,
        };
        if !closes_run {
            return None;
        }

        let shown = pos - parent;
        if shown < self.entries[parent].comment.children.len() {
            Some((parent, shown))
        } else {
            None
        }
    }

    /// Count of contiguous entries after `pos` that sit strictly deeper,
    /// i.e. its materialized descendants.
    fn subtree_span(&self, pos: usize) -> usize {
        let level = self.entries[pos].level;
        self.entries[pos + 1..]
            .iter()
            .take_while(|e| e.level > level)
            .count()
    }

    fn check(&self, pos: usize) -> Result<(), ThreadError> {
        if pos >= self.entries.len() {
            return Err(ThreadError::OutOfBounds {
                pos,
                len: self.entries.len(),
            });
        }
        Ok(())
    }

    /// Recomputes every parent link in one forward pass.
    fn reindex(&mut self) {
        let mut stack: Vec<usize> = Vec::new();
        for i in 0..self.entries.len() {
            let level = self.entries[i].level;
            while let Some(&top) = stack.last() {
                if self.entries[top].level >= level {
                    stack.pop();
                } else {
                    break;
                }
            }
            self.entries[i].parent = stack.last().copied();
            stack.push(i);
        }
    }

    /// A valid flattening starts at level 0 and never jumps more than one
    /// level deeper between neighbors.
    #[allow(dead_code)]
    fn is_preorder(&self) -> bool {
        let mut prev: Option<usize> = None;
        for e in &self.entries {
            let ok = match prev {
                None => e.level == 0,
                Some(p) => e.level <= p + 1,
            };
            if !ok {
                return false;
            }
            prev = Some(e.level);
        }
        true
    }
}
