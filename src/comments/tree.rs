// SPDX-License-Identifier: MPL-2.0

//! Rebuilds a comment thread from the flat list the server hands out.

use crate::api::CommentRecord;
use std::collections::HashMap;

/// A comment together with its direct replies, in server order.
///
/// Threads can be arbitrarily deep, so cloning, comparing and dropping walk
/// the subtree with an explicit stack.
#[derive(Debug)]
pub struct CommentNode {
    pub record: CommentRecord,
    pub replies: Vec<CommentNode>,
}

impl CommentNode {
    fn new(record: CommentRecord) -> Self {
        Self {
            record,
            replies: Vec::new(),
        }
    }

    pub fn id(&self) -> i64 {
        self.record.id
    }
}

impl Clone for CommentNode {
    fn clone(&self) -> Self {
        // Rebuild from the pre-order listing. `open` holds the current path
        // from this node down, each entry tagged with its level.
        let mut open: Vec<(usize, CommentNode)> = vec![(0, CommentNode::new(self.record.clone()))];
        for (level, node) in flatten_with_depth(std::slice::from_ref(self))
            .into_iter()
            .skip(1)
        {
            close_to(&mut open, level);
            open.push((level, CommentNode::new(node.record.clone())));
        }
        close_to(&mut open, 1);

        match open.pop() {
            Some((_, root)) => root,
            None => CommentNode::new(self.record.clone()),
        }
    }
}

/// Fold every open node at `level` or deeper into its parent. The bottom
/// entry is never folded.
fn close_to(open: &mut Vec<(usize, CommentNode)>, level: usize) {
    while open.len() > 1 && open.last().is_some_and(|(l, _)| *l >= level) {
        if let Some((_, node)) = open.pop() {
            if let Some((_, parent)) = open.last_mut() {
                parent.replies.push(node);
            }
        }
    }
}

impl PartialEq for CommentNode {
    fn eq(&self, other: &Self) -> bool {
        // Pre-order with levels pins down the shape of a tree
        let ours = flatten_with_depth(std::slice::from_ref(self));
        let theirs = flatten_with_depth(std::slice::from_ref(other));
        ours.len() == theirs.len()
            && ours
                .iter()
                .zip(&theirs)
                .all(|((la, a), (lb, b))| la == lb && a.record == b.record)
    }
}

impl Drop for CommentNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.replies);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.replies);
        }
    }
}

/// Turn a flat comment list into a forest of root comments.
///
/// Siblings keep the order they had in `records`. A record whose parent is
/// not in the batch is left out, together with everything below it.
pub fn build_forest(records: &[CommentRecord]) -> Vec<CommentNode> {
    let mut index_of: HashMap<i64, usize> = HashMap::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        index_of.entry(record.id).or_insert(i);
    }

    let mut roots = Vec::new();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); records.len()];
    for (i, record) in records.iter().enumerate() {
        match record.parent_id {
            None => roots.push(i),
            Some(parent_id) => {
                if let Some(&parent) = index_of.get(&parent_id) {
                    children[parent].push(i);
                }
            }
        }
    }

    let mut slots: Vec<Option<CommentNode>> = records
        .iter()
        .map(|r| Some(CommentNode::new(r.clone())))
        .collect();

    // Post-order walk from the roots. Only nodes reachable from a root are
    // visited, which also leaves parent cycles out.
    let mut attached = 0usize;
    let mut stack: Vec<(usize, bool)> = roots.iter().rev().map(|&i| (i, false)).collect();
    while let Some((i, expanded)) = stack.pop() {
        if !expanded {
            stack.push((i, true));
            stack.extend(children[i].iter().rev().map(|&c| (c, false)));
            continue;
        }

        let replies: Vec<CommentNode> = children[i]
            .iter()
            .filter_map(|&c| slots[c].take())
            .collect();
        if let Some(node) = slots[i].as_mut() {
            node.replies = replies;
        }
        attached += 1;
    }

    let forest: Vec<CommentNode> = roots.iter().filter_map(|&i| slots[i].take()).collect();

    let dropped = records.len() - attached;
    if dropped > 0 {
        tracing::debug!(dropped, "comments with unknown parent left out of thread");
    }

    forest
}

/// Number of comments in the forest, replies at every depth included.
pub fn count_all(forest: &[CommentNode]) -> usize {
    let mut count = 0;
    let mut stack: Vec<&CommentNode> = forest.iter().collect();
    while let Some(node) = stack.pop() {
        count += 1;
        stack.extend(&node.replies);
    }
    count
}

/// Depth-first listing of the forest with each node's level (0 = root).
pub fn flatten_with_depth(forest: &[CommentNode]) -> Vec<(usize, &CommentNode)> {
    let mut out = Vec::new();
    let mut stack: Vec<(usize, &CommentNode)> = forest.iter().rev().map(|n| (0, n)).collect();
    while let Some((level, node)) = stack.pop() {
        out.push((level, node));
        stack.extend(node.replies.iter().rev().map(|r| (level + 1, r)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, parent_id: Option<i64>) -> CommentRecord {
        CommentRecord {
            id,
            content: format!("comment {id}"),
            post_id: 1,
            parent_id,
            author_handle: "user".to_string(),
            updated_at: "2025-03-01T12:00:00Z".to_string(),
            deleted: false,
        }
    }

    fn ids(nodes: &[CommentNode]) -> Vec<i64> {
        nodes.iter().map(CommentNode::id).collect()
    }

    #[test]
    fn test_empty_input() {
        let forest = build_forest(&[]);
        assert!(forest.is_empty());
        assert_eq!(count_all(&forest), 0);
    }

    #[test]
    fn test_nested_chain_with_orphan() {
        let records = vec![
            record(1, None),
            record(2, Some(1)),
            record(3, Some(2)),
            record(4, Some(99)),
        ];
        let forest = build_forest(&records);

        assert_eq!(ids(&forest), vec![1]);
        assert_eq!(ids(&forest[0].replies), vec![2]);
        assert_eq!(ids(&forest[0].replies[0].replies), vec![3]);
        assert!(forest[0].replies[0].replies[0].replies.is_empty());
        assert_eq!(count_all(&forest), 3);
    }

    #[test]
    fn test_count_matches_input_when_all_parents_resolve() {
        let records = vec![
            record(1, None),
            record(2, None),
            record(3, Some(1)),
            record(4, Some(2)),
            record(5, Some(3)),
            record(6, Some(1)),
            record(7, Some(5)),
        ];
        assert_eq!(count_all(&build_forest(&records)), records.len());
    }

    #[test]
    fn test_sibling_order_follows_input() {
        let records = vec![
            record(10, None),
            record(30, Some(10)),
            record(5, None),
            record(20, Some(10)),
            record(25, Some(10)),
        ];
        let forest = build_forest(&records);
        assert_eq!(ids(&forest), vec![10, 5]);
        assert_eq!(ids(&forest[0].replies), vec![30, 20, 25]);
    }

    #[test]
    fn test_child_listed_before_parent_still_attaches() {
        let records = vec![record(2, Some(1)), record(1, None)];
        let forest = build_forest(&records);
        assert_eq!(ids(&forest), vec![1]);
        assert_eq!(ids(&forest[0].replies), vec![2]);
    }

    #[test]
    fn test_orphan_subtree_is_dropped() {
        let records = vec![record(1, None), record(2, Some(42)), record(3, Some(2))];
        let forest = build_forest(&records);
        assert_eq!(ids(&forest), vec![1]);
        assert!(forest[0].replies.is_empty());
        assert_eq!(count_all(&forest), 1);
    }

    #[test]
    fn test_parent_cycle_is_dropped() {
        let records = vec![record(1, Some(2)), record(2, Some(1)), record(3, None)];
        let forest = build_forest(&records);
        assert_eq!(ids(&forest), vec![3]);
        assert_eq!(count_all(&forest), 1);
    }

    #[test]
    fn test_very_deep_reply_chain() {
        const DEPTH: i64 = 200_000;
        let mut records = vec![record(0, None)];
        records.extend((1..DEPTH).map(|i| record(i, Some(i - 1))));

        let forest = build_forest(&records);
        assert_eq!(forest.len(), 1);
        assert_eq!(count_all(&forest), DEPTH as usize);

        let flat = flatten_with_depth(&forest);
        assert_eq!(flat.len(), DEPTH as usize);
        let deepest = flat.last().map(|(level, node)| (*level, node.id()));
        assert_eq!(deepest, Some((DEPTH as usize - 1, DEPTH - 1)));

        let copy = forest.clone();
        assert!(copy == forest);
        drop(copy);
        drop(forest);
    }

    #[test]
    fn test_clone_and_eq_keep_shape() {
        let records = vec![
            record(1, None),
            record(2, Some(1)),
            record(3, Some(2)),
            record(4, Some(1)),
            record(5, None),
        ];
        let forest = build_forest(&records);
        let copy = forest.clone();
        assert!(copy == forest);
        assert_eq!(ids(&copy[0].replies), vec![2, 4]);
        assert_eq!(ids(&copy[0].replies[0].replies), vec![3]);

        // Same records, different nesting
        let flatter = build_forest(&[
            record(1, None),
            record(2, Some(1)),
            record(3, Some(1)),
            record(4, Some(1)),
            record(5, None),
        ]);
        assert!(flatter != forest);
    }

    #[test]
    fn test_flatten_with_depth_order() {
        let records = vec![
            record(1, None),
            record(2, Some(1)),
            record(3, Some(2)),
            record(4, None),
        ];
        let forest = build_forest(&records);
        let flat: Vec<(usize, i64)> = flatten_with_depth(&forest)
            .into_iter()
            .map(|(level, node)| (level, node.id()))
            .collect();
        assert_eq!(flat, vec![(0, 1), (1, 2), (2, 3), (0, 4)]);
    }
}
