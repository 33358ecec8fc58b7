// SPDX-License-Identifier: MPL-2.0

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One comment as the backend returns it: flat, with an optional parent link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRecord {
    pub id: i64,
    pub content: String,
    pub post_id: i64,
    /// `None` marks a root comment
    pub parent_id: Option<i64>,
    #[serde(rename = "username")]
    pub author_handle: String,
    pub updated_at: String,
    #[serde(default)]
    pub deleted: bool,
}

/// A post as it appears in a feed page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub comment_count: u32,
    /// Filled in client-side from the vote count endpoint
    #[serde(default)]
    pub vote_count: u32,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub vote_end_time: Option<String>,
    #[serde(default)]
    pub vote_enabled: bool,
    #[serde(default)]
    pub closed: Option<bool>,
}

impl PostSummary {
    /// Explicit thumbnail first, otherwise the video's preview frame
    pub fn thumbnail_url(&self) -> Option<String> {
        if let Some(thumb) = &self.thumbnail {
            return Some(thumb.clone());
        }
        self.video_id
            .as_ref()
            .filter(|id| !id.is_empty())
            .map(|id| format!("https://i.ytimg.com/vi/{id}/hqdefault.jpg"))
    }

    /// The server may send `closed` explicitly; otherwise a poll with voting
    /// disabled counts as closed.
    pub fn is_closed(&self) -> bool {
        self.closed.unwrap_or(!self.vote_enabled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderBy {
    #[default]
    Recent,
    Oldest,
    Popular,
}

impl OrderBy {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderBy::Recent => "recent",
            OrderBy::Oldest => "oldest",
            OrderBy::Popular => "popular",
        }
    }
}

impl std::str::FromStr for OrderBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "recent" => Ok(OrderBy::Recent),
            "oldest" => Ok(OrderBy::Oldest),
            "popular" => Ok(OrderBy::Popular),
            other => Err(format!("unknown order: {other}")),
        }
    }
}

/// Filters for a post feed. Two queries that compare equal address the same feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FeedQuery {
    pub order_by: OrderBy,
    /// Title search; switches the feed to the search endpoint
    pub title: Option<String>,
    pub category_slug: Option<String>,
}

impl FeedQuery {
    /// Endpoint path for this query. Search wins over category.
    pub fn endpoint(&self) -> String {
        if self.title.is_some() {
            "posts/search".to_string()
        } else if let Some(slug) = &self.category_slug {
            format!("posts/category/{slug}")
        } else {
            "posts".to_string()
        }
    }
}

/// A page of a list resource. A short `content` means there is nothing after it.
#[derive(Debug, Clone, Deserialize)]
pub struct Slice<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
}

/// `{ "data": ... }` wrapper used by most non-list endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteCount {
    pub post_id: i64,
    pub count: u32,
}

/// The vote count endpoint answers with either a list or a single entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum VoteCounts {
    Many(Vec<VoteCount>),
    One(VoteCount),
    Unrecognized(serde_json::Value),
}

impl VoteCounts {
    pub fn into_map(self) -> HashMap<i64, u32> {
        match self {
            VoteCounts::Many(list) => list.into_iter().map(|v| (v.post_id, v.count)).collect(),
            VoteCounts::One(v) => HashMap::from([(v.post_id, v.count)]),
            VoteCounts::Unrecognized(_) => HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment<'a> {
    pub content: &'a str,
    pub post_id: i64,
    pub parent_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub parent_id: Option<i64>,
}

/// A poll option as stored on the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteOption {
    pub id: i64,
    pub option_text: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub votes: u32,
}

/// Full post as the edit form loads it (`GET posts/{id}`, not enveloped)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetail {
    #[serde(default)]
    pub id: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub vote_end_time: Option<String>,
    #[serde(default)]
    pub vote_option_list: Vec<VoteOption>,
}

/// Poll option being written. `id` is `None` for options not yet on the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionDraft {
    pub id: Option<i64>,
    pub option_text: String,
    pub color: String,
}

/// Editable fields shared by post creation and update
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDraft {
    pub title: String,
    pub video_id: String,
    pub category_id: Option<i64>,
    /// Server wall-clock time, `YYYY-MM-DD HH:MM:SS`
    pub vote_end_time: Option<String>,
    #[serde(rename = "voteOptions")]
    pub options: Vec<OptionDraft>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost<'a> {
    #[serde(flatten)]
    pub draft: &'a PostDraft,
    pub is_secret: bool,
    pub is_deleted: bool,
    pub vote_enabled: bool,
}

impl<'a> NewPost<'a> {
    /// Public, live post with voting open
    pub fn public(draft: &'a PostDraft) -> Self {
        Self {
            draft,
            is_secret: false,
            is_deleted: false,
            vote_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostUpdate<'a> {
    #[serde(flatten)]
    pub draft: &'a PostDraft,
    pub removed_option_ids: &'a [i64],
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizOption {
    pub id: i64,
    pub option_text: String,
    #[serde(default)]
    pub is_correct: bool,
}

/// The follow-up question shown after voting on a post
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: i64,
    pub question: String,
    #[serde(default)]
    pub options: Vec<QuizOption>,
    #[serde(default)]
    pub explanation: String,
}

impl Quiz {
    pub fn option(&self, option_id: i64) -> Option<&QuizOption> {
        self.options.iter().find(|o| o.id == option_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAnswer {
    pub quiz_id: i64,
    pub option_id: i64,
    pub post_id: i64,
}

/// Category with its children, as built by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTree {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub children: Vec<CategoryTree>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory<'a> {
    pub name: &'a str,
    pub slug: String,
    pub parent_id: Option<i64>,
}

/// The signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub nickname: String,
    pub role: String,
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub provider_key: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_record_wire_names() {
        let json = r#"{
            "id": 7, "content": "hi", "postId": 3, "parentId": null,
            "username": "kim", "updatedAt": "2025-01-02T03:04:05Z", "deleted": false
        }"#;
        let record: CommentRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, 7);
        assert_eq!(record.post_id, 3);
        assert_eq!(record.parent_id, None);
        assert_eq!(record.author_handle, "kim");
    }

    #[test]
    fn test_comment_record_missing_parent_is_root() {
        let json = r#"{"id":1,"content":"x","postId":1,"username":"a","updatedAt":""}"#;
        let record: CommentRecord = serde_json::from_str(json).unwrap();
        assert!(record.parent_id.is_none());
        assert!(!record.deleted);
    }

    #[test]
    fn test_feed_query_endpoint_selection() {
        let mut query = FeedQuery::default();
        assert_eq!(query.endpoint(), "posts");

        query.category_slug = Some("politics".to_string());
        assert_eq!(query.endpoint(), "posts/category/politics");

        query.title = Some("tax".to_string());
        assert_eq!(query.endpoint(), "posts/search");
    }

    #[test]
    fn test_vote_counts_list_and_single() {
        let many: VoteCounts =
            serde_json::from_str(r#"[{"postId":1,"count":4},{"postId":2,"count":9}]"#).unwrap();
        let map = many.into_map();
        assert_eq!(map.get(&1), Some(&4));
        assert_eq!(map.get(&2), Some(&9));

        let one: VoteCounts = serde_json::from_str(r#"{"postId":5,"count":2}"#).unwrap();
        assert_eq!(one.into_map().get(&5), Some(&2));

        let junk: VoteCounts = serde_json::from_str(r#"{"total":10}"#).unwrap();
        assert!(junk.into_map().is_empty());
    }

    #[test]
    fn test_slice_without_content_is_empty() {
        let slice: Slice<PostSummary> = serde_json::from_str("{}").unwrap();
        assert!(slice.content.is_empty());
    }

    #[test]
    fn test_post_thumbnail_and_closed() {
        let mut post: PostSummary =
            serde_json::from_str(r#"{"id":1,"title":"t","videoId":"abc","voteEnabled":true}"#)
                .unwrap();
        assert_eq!(
            post.thumbnail_url().as_deref(),
            Some("https://i.ytimg.com/vi/abc/hqdefault.jpg")
        );
        assert!(!post.is_closed());

        post.thumbnail = Some("https://cdn/x.png".to_string());
        assert_eq!(post.thumbnail_url().as_deref(), Some("https://cdn/x.png"));

        post.vote_enabled = false;
        assert!(post.is_closed());
        post.closed = Some(false);
        assert!(!post.is_closed());
    }

    #[test]
    fn test_order_by_parse() {
        assert_eq!("Oldest".parse::<OrderBy>(), Ok(OrderBy::Oldest));
        assert!("sideways".parse::<OrderBy>().is_err());
    }

    #[test]
    fn test_post_detail_from_edit_endpoint() {
        let json = r##"{
            "title": "Four-day week?", "videoId": "dQw4w9WgXcQ", "categoryId": 4,
            "voteEndTime": "2025-07-01 18:00:00",
            "voteOptionList": [
                {"id": 11, "optionText": "Yes", "color": "#FBBF24", "votes": 3},
                {"id": 12, "optionText": "No"}
            ]
        }"##;
        let detail: PostDetail = serde_json::from_str(json).unwrap();
        assert_eq!(detail.category_id, Some(4));
        assert_eq!(detail.vote_option_list.len(), 2);
        assert_eq!(detail.vote_option_list[1].votes, 0);
        assert!(detail.vote_option_list[1].color.is_none());
    }

    #[test]
    fn test_new_post_body_carries_flags() {
        let draft = PostDraft {
            title: "t".to_string(),
            video_id: String::new(),
            category_id: None,
            vote_end_time: None,
            options: vec![OptionDraft {
                id: None,
                option_text: "Yes".to_string(),
                color: "#FBBF24".to_string(),
            }],
        };
        let body = serde_json::to_value(NewPost::public(&draft)).unwrap();
        assert_eq!(body["title"], "t");
        assert_eq!(body["voteEnabled"], true);
        assert_eq!(body["isSecret"], false);
        assert_eq!(body["isDeleted"], false);
        assert_eq!(body["voteOptions"][0]["optionText"], "Yes");
        assert!(body["voteOptions"][0]["id"].is_null());

        let removed = [11, 12];
        let body = serde_json::to_value(PostUpdate {
            draft: &draft,
            removed_option_ids: &removed,
        })
        .unwrap();
        assert_eq!(body["removedOptionIds"], serde_json::json!([11, 12]));
        assert!(body.get("voteEnabled").is_none());
    }

    #[test]
    fn test_quiz_wire_names() {
        let json = r#"{
            "id": 2, "question": "Which?", "explanation": "Because.",
            "options": [
                {"id": 1, "optionText": "A", "isCorrect": false},
                {"id": 2, "optionText": "B", "isCorrect": true}
            ]
        }"#;
        let quiz: Quiz = serde_json::from_str(json).unwrap();
        assert_eq!(quiz.option(2).map(|o| o.is_correct), Some(true));
        assert!(quiz.option(9).is_none());

        let answer = serde_json::to_value(QuizAnswer {
            quiz_id: 2,
            option_id: 1,
            post_id: 40,
        })
        .unwrap();
        assert_eq!(answer, serde_json::json!({"quizId": 2, "optionId": 1, "postId": 40}));
    }
}
