// SPDX-License-Identifier: MPL-2.0

use crate::api::{BoardClient, ClientError, FeedQuery, PostSummary};
use crate::feed::loader::PageSource;
use std::collections::HashMap;
use std::sync::Arc;

/// Post pages from the board, with vote totals filled in.
#[derive(Clone)]
pub struct PostFeedSource {
    client: Arc<BoardClient>,
}

impl PostFeedSource {
    pub fn new(client: Arc<BoardClient>) -> Self {
        Self { client }
    }
}

impl PageSource for PostFeedSource {
    type Item = PostSummary;

    async fn fetch_page(
        &self,
        query: &FeedQuery,
        page: usize,
        size: usize,
    ) -> Result<Vec<PostSummary>, ClientError> {
        let mut posts = self.client.get_posts(query, page, size).await?;
        if posts.is_empty() {
            return Ok(posts);
        }

        let counts = self.client.get_vote_counts().await;
        if let Err(e) = &counts {
            tracing::warn!(error = %e, "vote counts unavailable, showing zero");
        }
        merge_vote_counts(&mut posts, counts.ok().as_ref());
        Ok(posts)
    }
}

/// Copy vote totals onto `posts`. Posts without an entry, or every post
/// when the totals could not be fetched, get zero.
pub fn merge_vote_counts(posts: &mut [PostSummary], counts: Option<&HashMap<i64, u32>>) {
    for post in posts {
        post.vote_count = counts
            .and_then(|map| map.get(&post.id).copied())
            .unwrap_or(0);
    }
}
