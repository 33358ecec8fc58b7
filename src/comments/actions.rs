// SPDX-License-Identifier: MPL-2.0

//! Posting, editing and deleting comments, plus the rules for who may do what.
//!
//! Every successful change reloads the whole thread from the server.

use crate::api::{BoardClient, ClientError, NewComment};
use crate::comments::thread::{CommentSource, CommentThread};
use crate::comments::tree::CommentNode;
use crate::config::MAX_REPLY_DEPTH;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommentError {
    #[error("comment is empty")]
    EmptyContent,
    #[error("replies are not allowed here")]
    ReplyNotAllowed,
    #[error("only the author can change this comment")]
    NotAuthor,
    #[error(transparent)]
    Client(#[from] ClientError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Saved,
    /// The new text matched the old one, nothing was sent
    Unchanged,
}

/// Write side of the comment API
#[allow(async_fn_in_trait)]
pub trait CommentWriter {
    async fn post_comment(&self, comment: &NewComment<'_>) -> Result<(), ClientError>;
    async fn update_comment(&self, comment_id: i64, content: &str) -> Result<(), ClientError>;
    async fn remove_comment(&self, comment_id: i64) -> Result<(), ClientError>;
}

impl CommentWriter for BoardClient {
    async fn post_comment(&self, comment: &NewComment<'_>) -> Result<(), ClientError> {
        self.add_comment(comment).await
    }

    async fn update_comment(&self, comment_id: i64, content: &str) -> Result<(), ClientError> {
        self.edit_comment(comment_id, content).await
    }

    async fn remove_comment(&self, comment_id: i64) -> Result<(), ClientError> {
        self.delete_comment(comment_id).await
    }
}

/// Whether a comment at `level` (0 = root) can take a reply
pub fn can_reply(level: usize, node: &CommentNode) -> bool {
    level < MAX_REPLY_DEPTH && !node.record.deleted
}

/// Whether `viewer` may edit or delete `node`
pub fn can_modify(viewer: Option<&str>, node: &CommentNode) -> bool {
    viewer.is_some_and(|handle| handle == node.record.author_handle) && !node.record.deleted
}

/// Indentation level to draw a comment at. Deeper replies share the last level.
pub fn render_depth(level: usize) -> usize {
    level.min(MAX_REPLY_DEPTH)
}

fn non_empty(content: &str) -> Result<&str, CommentError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(CommentError::EmptyContent);
    }
    Ok(trimmed)
}

/// Post a new root comment on the thread's post.
pub async fn add_comment<C>(
    client: &C,
    thread: &mut CommentThread,
    content: &str,
) -> Result<(), CommentError>
where
    C: CommentWriter + CommentSource,
{
    let content = non_empty(content)?;
    client
        .post_comment(&NewComment {
            content,
            post_id: thread.post_id(),
            parent_id: None,
        })
        .await?;
    thread.reload(client).await?;
    Ok(())
}

/// Reply to `parent`, which sits at `level` in the thread.
pub async fn add_reply<C>(
    client: &C,
    thread: &mut CommentThread,
    parent: &CommentNode,
    level: usize,
    content: &str,
) -> Result<(), CommentError>
where
    C: CommentWriter + CommentSource,
{
    if !can_reply(level, parent) {
        return Err(CommentError::ReplyNotAllowed);
    }
    let content = non_empty(content)?;
    client
        .post_comment(&NewComment {
            content,
            post_id: thread.post_id(),
            parent_id: Some(parent.id()),
        })
        .await?;
    thread.reload(client).await?;
    Ok(())
}

pub async fn edit_comment<C>(
    client: &C,
    thread: &mut CommentThread,
    viewer: Option<&str>,
    node: &CommentNode,
    content: &str,
) -> Result<EditOutcome, CommentError>
where
    C: CommentWriter + CommentSource,
{
    if !can_modify(viewer, node) {
        return Err(CommentError::NotAuthor);
    }
    let content = non_empty(content)?;
    if content == node.record.content {
        return Ok(EditOutcome::Unchanged);
    }
    client.update_comment(node.id(), content).await?;
    thread.reload(client).await?;
    Ok(EditOutcome::Saved)
}

pub async fn delete_comment<C>(
    client: &C,
    thread: &mut CommentThread,
    viewer: Option<&str>,
    node: &CommentNode,
) -> Result<(), CommentError>
where
    C: CommentWriter + CommentSource,
{
    if !can_modify(viewer, node) {
        return Err(CommentError::NotAuthor);
    }
    client.remove_comment(node.id()).await?;
    thread.reload(client).await?;
    Ok(())
}
