// SPDX-License-Identifier: MPL-2.0

mod actions;
mod thread;
mod tree;

pub use actions::{
    CommentError, CommentWriter, EditOutcome, add_comment, add_reply, can_modify, can_reply,
    delete_comment, edit_comment, render_depth,
};
pub use thread::{CommentSource, CommentThread};
pub use tree::{CommentNode, build_forest, count_all, flatten_with_depth};
