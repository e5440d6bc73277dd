//! In-memory assembly of per-page discussion threads.
//!
//! Messages are persisted flat, each carrying its parent id ([`NO_PARENT`] for
//! thread roots). The store fetches every row of a page in one query and the
//! functions here rebuild the forest from a parent -> children index.
//!
//! Siblings are ordered by ascending id, which is creation order.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::types::MessageId;

/// Parent id of a thread root.
pub const NO_PARENT: MessageId = -1;

/// A flat record that can be placed in a thread forest.
pub trait ThreadNode {
    fn id(&self) -> MessageId;
    fn parent(&self) -> MessageId;
}

/// A message together with its (recursively nested) replies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Thread<T> {
    #[serde(flatten)]
    pub message: T,
    pub replies: Vec<Thread<T>>,
}

impl<T> Thread<T> {
    /// Number of messages in this thread, the root included.
    pub fn len(&self) -> usize {
        1 + self.replies.iter().map(Thread::len).sum::<usize>()
    }

    /// A thread always contains at least its root.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Build the forest of threads rooted at [`NO_PARENT`].
///
/// Rows whose parent chain never reaches a root are not reachable and are
/// left out, exactly as a top-down traversal would leave them out.
pub fn assemble_forest<T: ThreadNode>(rows: Vec<T>) -> Vec<Thread<T>> {
    let mut children: HashMap<MessageId, Vec<T>> = HashMap::new();
    for row in rows {
        children.entry(row.parent()).or_default().push(row);
    }
    for siblings in children.values_mut() {
        siblings.sort_by_key(|message| message.id());
    }
    attach(NO_PARENT, &mut children)
}

fn attach<T: ThreadNode>(
    parent: MessageId,
    children: &mut HashMap<MessageId, Vec<T>>,
) -> Vec<Thread<T>> {
    let Some(siblings) = children.remove(&parent) else {
        return Vec::new();
    };
    siblings
        .into_iter()
        .map(|message| {
            let replies = attach(message.id(), children);
            Thread { message, replies }
        })
        .collect()
}

/// Ids of `root` and all of its descendants, deepest replies first and `root`
/// last, given the `(id, parent)` pairs of one page.
///
/// Returns an empty list when `root` is not among the pairs.
pub fn subtree_ids(pairs: &[(MessageId, MessageId)], root: MessageId) -> Vec<MessageId> {
    if !pairs.iter().any(|(id, _)| *id == root) {
        return Vec::new();
    }
    let mut index: HashMap<MessageId, Vec<MessageId>> = HashMap::new();
    for (id, parent) in pairs {
        index.entry(*parent).or_default().push(*id);
    }
    for ids in index.values_mut() {
        ids.sort_unstable();
    }

    let mut ordered = Vec::new();
    let mut seen = HashSet::from([root]);
    let mut stack = vec![(root, false)];
    while let Some((id, expanded)) = stack.pop() {
        if expanded {
            ordered.push(id);
            continue;
        }
        stack.push((id, true));
        if let Some(replies) = index.get(&id) {
            for reply in replies.iter().rev() {
                // A malformed cycle must not loop forever.
                if seen.insert(*reply) {
                    stack.push((*reply, false));
                }
            }
        }
    }
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: MessageId,
        parent: MessageId,
    }

    impl ThreadNode for Row {
        fn id(&self) -> MessageId {
            self.id
        }
        fn parent(&self) -> MessageId {
            self.parent
        }
    }

    fn row(id: MessageId, parent: MessageId) -> Row {
        Row { id, parent }
    }

    fn ids(forest: &[Thread<Row>]) -> Vec<MessageId> {
        forest.iter().map(|t| t.message.id).collect()
    }

    // -- assemble_forest ---------------------------------------------------------

    #[test]
    fn empty_input_gives_empty_forest() {
        assert!(assemble_forest::<Row>(vec![]).is_empty());
    }

    #[test]
    fn roots_and_replies_are_grouped() {
        let forest = assemble_forest(vec![row(1, -1), row(2, 1), row(3, -1), row(4, 2), row(5, 1)]);
        assert_eq!(ids(&forest), vec![1, 3]);
        assert_eq!(ids(&forest[0].replies), vec![2, 5]);
        assert_eq!(ids(&forest[0].replies[0].replies), vec![4]);
        assert!(forest[1].replies.is_empty());
        assert_eq!(forest[0].len(), 4);
    }

    #[test]
    fn siblings_are_sorted_by_id_regardless_of_input_order() {
        let forest = assemble_forest(vec![row(9, -1), row(7, 9), row(3, -1), row(5, 9)]);
        assert_eq!(ids(&forest), vec![3, 9]);
        assert_eq!(ids(&forest[1].replies), vec![5, 7]);
    }

    #[test]
    fn unreachable_rows_are_dropped() {
        let forest = assemble_forest(vec![row(1, -1), row(2, 42), row(3, 4), row(4, 3)]);
        assert_eq!(ids(&forest), vec![1]);
        assert!(forest[0].replies.is_empty());
    }

    // -- subtree_ids -------------------------------------------------------------

    #[test]
    fn subtree_lists_descendants_before_root() {
        let pairs = [(1, -1), (2, 1), (3, 2), (4, 1), (5, -1)];
        assert_eq!(subtree_ids(&pairs, 1), vec![3, 2, 4, 1]);
    }

    #[test]
    fn subtree_of_leaf_is_itself() {
        let pairs = [(1, -1), (2, 1)];
        assert_eq!(subtree_ids(&pairs, 2), vec![2]);
    }

    #[test]
    fn subtree_of_unknown_id_is_empty() {
        let pairs = [(1, -1)];
        assert!(subtree_ids(&pairs, 7).is_empty());
    }

    #[test]
    fn subtree_terminates_on_cycles() {
        let pairs = [(1, 2), (2, 1)];
        assert_eq!(subtree_ids(&pairs, 1), vec![2, 1]);
    }
}
