//! Flat comment list to nested thread.

use std::collections::HashMap;
use uuid::Uuid;

use crate::models::comment::{CommentDetails, CommentNode};

/// Assembles comments into a forest.
///
/// Roots are comments without a parent. Replies attach under their parent at
/// any depth. A comment whose parent is not in `comments` is dropped together
/// with its own replies. Siblings keep their relative input order.
pub fn build_comment_tree(comments: Vec<CommentDetails>) -> Vec<CommentNode> {
    let mut roots = Vec::new();
    let mut children: HashMap<Uuid, Vec<CommentDetails>> = HashMap::new();

    for comment in comments {
        match comment.parent_id {
            None => roots.push(comment),
            Some(parent) => children.entry(parent).or_default().push(comment),
        }
    }

    roots
        .into_iter()
        .map(|root| attach(root, &mut children))
        .collect()
}

fn attach(comment: CommentDetails, children: &mut HashMap<Uuid, Vec<CommentDetails>>) -> CommentNode {
    let replies: Vec<CommentNode> = children
        .remove(&comment.id)
        .unwrap_or_default()
        .into_iter()
        .map(|reply| attach(reply, children))
        .collect();

    CommentNode {
        reply_count: replies.len(),
        comment,
        replies,
    }
}

/// Number of comments in a forest, replies included.
pub fn count_nodes(nodes: &[CommentNode]) -> usize {
    nodes
        .iter()
        .map(|n| 1 + count_nodes(&n.replies))
        .sum()
}
