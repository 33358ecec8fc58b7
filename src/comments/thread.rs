// SPDX-License-Identifier: MPL-2.0

use crate::api::{BoardClient, ClientError, CommentRecord};
use crate::comments::tree::{CommentNode, build_forest, count_all};

/// Anything that can hand out the flat comment list of a post.
#[allow(async_fn_in_trait)]
pub trait CommentSource {
    async fn fetch_comments(&self, post_id: i64) -> Result<Vec<CommentRecord>, ClientError>;
}

impl CommentSource for BoardClient {
    async fn fetch_comments(&self, post_id: i64) -> Result<Vec<CommentRecord>, ClientError> {
        self.get_comments(post_id).await
    }
}

/// The comment section of one post.
///
/// The forest is never patched in place: every reload throws the old one
/// away and rebuilds from the fresh flat list.
#[derive(Debug, Clone, Default)]
pub struct CommentThread {
    post_id: i64,
    forest: Vec<CommentNode>,
    total: usize,
    error: Option<String>,
}

impl CommentThread {
    pub fn new(post_id: i64) -> Self {
        Self {
            post_id,
            ..Self::default()
        }
    }

    pub fn post_id(&self) -> i64 {
        self.post_id
    }

    pub fn forest(&self) -> &[CommentNode] {
        &self.forest
    }

    /// Comments shown, replies included
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Replace the thread with `records`.
    pub fn replace(&mut self, records: &[CommentRecord]) {
        self.forest = build_forest(records);
        self.total = count_all(&self.forest);
        self.error = None;
    }

    /// Fetch the post's comments and rebuild.
    ///
    /// On failure the previous forest stays in place and the error is kept
    /// for display.
    pub async fn reload<S: CommentSource>(&mut self, source: &S) -> Result<(), ClientError> {
        match source.fetch_comments(self.post_id).await {
            Ok(records) => {
                self.replace(&records);
                tracing::debug!(post_id = self.post_id, total = self.total, "comments reloaded");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(post_id = self.post_id, error = %e, "failed to load comments");
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct StubComments {
        responses: Mutex<Vec<Result<Vec<CommentRecord>, ClientError>>>,
    }

    impl StubComments {
        fn new(responses: Vec<Result<Vec<CommentRecord>, ClientError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
            }
        }
    }

    impl CommentSource for StubComments {
        async fn fetch_comments(&self, post_id: i64) -> Result<Vec<CommentRecord>, ClientError> {
            assert_eq!(post_id, 12);
            self.responses.lock().unwrap().remove(0)
        }
    }

    fn record(id: i64, parent_id: Option<i64>) -> CommentRecord {
        CommentRecord {
            id,
            content: "text".to_string(),
            post_id: 12,
            parent_id,
            author_handle: "lee".to_string(),
            updated_at: String::new(),
            deleted: false,
        }
    }

    #[tokio::test]
    async fn test_reload_builds_forest() {
        let source = StubComments::new(vec![Ok(vec![
            record(1, None),
            record(2, Some(1)),
            record(3, Some(77)),
        ])]);
        let mut thread = CommentThread::new(12);

        thread.reload(&source).await.unwrap();
        assert_eq!(thread.forest().len(), 1);
        assert_eq!(thread.total(), 2);
        assert!(thread.error().is_none());
    }

    #[tokio::test]
    async fn test_reload_replaces_previous_forest() {
        let source = StubComments::new(vec![
            Ok(vec![record(1, None), record(2, None)]),
            Ok(vec![record(5, None)]),
        ]);
        let mut thread = CommentThread::new(12);

        thread.reload(&source).await.unwrap();
        assert_eq!(thread.total(), 2);
        thread.reload(&source).await.unwrap();
        assert_eq!(thread.total(), 1);
        assert_eq!(thread.forest()[0].id(), 5);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_forest() {
        let source = StubComments::new(vec![
            Ok(vec![record(1, None)]),
            Err(ClientError::Network("connection reset".to_string())),
        ]);
        let mut thread = CommentThread::new(12);

        thread.reload(&source).await.unwrap();
        assert!(thread.reload(&source).await.is_err());
        assert_eq!(thread.total(), 1);
        assert!(thread.error().unwrap().contains("connection reset"));
    }
}
