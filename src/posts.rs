// SPDX-License-Identifier: MPL-2.0

//! Post administration: the create/edit form and the admin-only calls
//! behind it.

use crate::api::{
    BoardClient, ClientError, NewPost, OptionDraft, PostDetail, PostDraft, PostSummary, PostUpdate,
};
use crate::config::{DEFAULT_OPTION_COLOR, SERVER_UTC_OFFSET_SECS};
use crate::feed::{Completion, FeedLoader, PageSource};
use crate::state::SessionContext;
use chrono::{DateTime, FixedOffset, TimeZone};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static VIDEO_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:youtu\.be/|youtube\.com/(?:watch\?v=|embed/|shorts/))([a-zA-Z0-9_-]{11})")
        .unwrap()
});

#[derive(Error, Debug)]
pub enum PostError {
    #[error("only admins can manage posts")]
    NotAdmin,
    #[error("post title is empty")]
    EmptyTitle,
    #[error("poll option {0} is empty")]
    EmptyOption(usize),
    #[error("post has not been created yet")]
    NotCreated,
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// The video id inside a YouTube watch, share, embed or shorts link.
pub fn extract_video_id(input: &str) -> Option<String> {
    VIDEO_ID_RE
        .captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Format a vote deadline the way the server stores it: wall-clock time at
/// the server's offset, `YYYY-MM-DD HH:MM:SS`.
pub fn format_vote_end<Tz: TimeZone>(at: &DateTime<Tz>) -> String {
    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";
    match FixedOffset::east_opt(SERVER_UTC_OFFSET_SECS) {
        Some(offset) => at.with_timezone(&offset).format(FORMAT).to_string(),
        None => at.naive_utc().format(FORMAT).to_string(),
    }
}

/// State of the post form, for a new post or an existing one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostEditor {
    post_id: Option<i64>,
    draft: PostDraft,
    removed_option_ids: Vec<i64>,
}

impl PostEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start editing a post loaded from the server.
    pub fn from_detail(post_id: i64, detail: PostDetail) -> Self {
        let options = detail
            .vote_option_list
            .into_iter()
            .map(|opt| OptionDraft {
                id: Some(opt.id),
                option_text: opt.option_text,
                color: opt.color.unwrap_or_else(|| DEFAULT_OPTION_COLOR.to_string()),
            })
            .collect();

        Self {
            post_id: Some(detail.id.unwrap_or(post_id)),
            draft: PostDraft {
                title: detail.title,
                video_id: detail.video_id.unwrap_or_default(),
                category_id: detail.category_id,
                vote_end_time: detail.vote_end_time,
                options,
            },
            removed_option_ids: Vec::new(),
        }
    }

    pub fn post_id(&self) -> Option<i64> {
        self.post_id
    }

    pub fn draft(&self) -> &PostDraft {
        &self.draft
    }

    /// Server-side options dropped from the form since it was loaded
    pub fn removed_option_ids(&self) -> &[i64] {
        &self.removed_option_ids
    }

    pub fn set_title(&mut self, title: &str) {
        self.draft.title = title.to_string();
    }

    pub fn set_category(&mut self, category_id: Option<i64>) {
        self.draft.category_id = category_id;
    }

    pub fn set_vote_end<Tz: TimeZone>(&mut self, at: Option<&DateTime<Tz>>) {
        self.draft.vote_end_time = at.map(format_vote_end);
    }

    /// Take the video id from a pasted link. An unrecognised link leaves the
    /// current video alone and returns `false`.
    pub fn set_video_link(&mut self, link: &str) -> bool {
        match extract_video_id(link) {
            Some(id) => {
                self.draft.video_id = id;
                true
            }
            None => false,
        }
    }

    pub fn clear_video(&mut self) {
        self.draft.video_id.clear();
    }

    pub fn add_option(&mut self, text: &str) {
        self.draft.options.push(OptionDraft {
            id: None,
            option_text: text.to_string(),
            color: DEFAULT_OPTION_COLOR.to_string(),
        });
    }

    pub fn rename_option(&mut self, index: usize, text: &str) -> bool {
        match self.draft.options.get_mut(index) {
            Some(option) => {
                option.option_text = text.to_string();
                true
            }
            None => false,
        }
    }

    /// Remove the option at `index`. Options already on the server are
    /// remembered so saving deletes them there too.
    pub fn remove_option(&mut self, index: usize) -> Option<OptionDraft> {
        if index >= self.draft.options.len() {
            return None;
        }
        let removed = self.draft.options.remove(index);
        if let Some(id) = removed.id {
            self.removed_option_ids.push(id);
        }
        Some(removed)
    }

    /// Trimmed copy of the draft, or the first field that blocks saving.
    fn validated(&self) -> Result<PostDraft, PostError> {
        let mut draft = self.draft.clone();
        draft.title = draft.title.trim().to_string();
        if draft.title.is_empty() {
            return Err(PostError::EmptyTitle);
        }
        for (i, option) in draft.options.iter_mut().enumerate() {
            option.option_text = option.option_text.trim().to_string();
            if option.option_text.is_empty() {
                return Err(PostError::EmptyOption(i));
            }
        }
        Ok(draft)
    }
}

/// Admin side of the post API
#[allow(async_fn_in_trait)]
pub trait PostBackend {
    async fn create_post(&self, post: &NewPost<'_>) -> Result<i64, ClientError>;
    async fn fetch_post(&self, post_id: i64) -> Result<PostDetail, ClientError>;
    async fn update_post(&self, post_id: i64, post: &PostUpdate<'_>) -> Result<(), ClientError>;
    async fn delete_post(&self, post_id: i64) -> Result<(), ClientError>;
    async fn delete_vote_option(&self, option_id: i64) -> Result<(), ClientError>;
}

impl PostBackend for BoardClient {
    async fn create_post(&self, post: &NewPost<'_>) -> Result<i64, ClientError> {
        BoardClient::create_post(self, post).await
    }

    async fn fetch_post(&self, post_id: i64) -> Result<PostDetail, ClientError> {
        self.get_post(post_id).await
    }

    async fn update_post(&self, post_id: i64, post: &PostUpdate<'_>) -> Result<(), ClientError> {
        BoardClient::update_post(self, post_id, post).await
    }

    async fn delete_post(&self, post_id: i64) -> Result<(), ClientError> {
        BoardClient::delete_post(self, post_id).await
    }

    async fn delete_vote_option(&self, option_id: i64) -> Result<(), ClientError> {
        BoardClient::delete_vote_option(self, option_id).await
    }
}

/// Proof that the current user may manage posts. Only an admin session
/// hands one out.
#[derive(Debug, Clone)]
pub struct PostAdmin {
    admin: String,
}

impl PostAdmin {
    pub fn for_session(session: &SessionContext) -> Result<Self, PostError> {
        match session.handle() {
            Some(handle) if session.is_admin() => Ok(Self {
                admin: handle.to_string(),
            }),
            _ => Err(PostError::NotAdmin),
        }
    }

    /// Create the post and return its id.
    pub async fn create<B: PostBackend>(
        &self,
        backend: &B,
        editor: &PostEditor,
    ) -> Result<i64, PostError> {
        let draft = editor.validated()?;
        let id = backend.create_post(&NewPost::public(&draft)).await?;
        tracing::debug!(admin = %self.admin, post_id = id, "post created");
        Ok(id)
    }

    pub async fn load<B: PostBackend>(
        &self,
        backend: &B,
        post_id: i64,
    ) -> Result<PostEditor, PostError> {
        let detail = backend.fetch_post(post_id).await?;
        Ok(PostEditor::from_detail(post_id, detail))
    }

    /// Save an edited post, then delete the poll options removed from it.
    pub async fn save<B: PostBackend>(
        &self,
        backend: &B,
        editor: &PostEditor,
    ) -> Result<(), PostError> {
        let post_id = editor.post_id().ok_or(PostError::NotCreated)?;
        let draft = editor.validated()?;
        backend
            .update_post(
                post_id,
                &PostUpdate {
                    draft: &draft,
                    removed_option_ids: editor.removed_option_ids(),
                },
            )
            .await?;

        for &option_id in editor.removed_option_ids() {
            backend.delete_vote_option(option_id).await?;
        }
        tracing::debug!(
            admin = %self.admin,
            post_id,
            removed_options = editor.removed_option_ids().len(),
            "post saved"
        );
        Ok(())
    }

    /// Delete a post and reload the listing it was picked from.
    pub async fn delete<B, S>(
        &self,
        backend: &B,
        post_id: i64,
        listing: &mut FeedLoader<PostSummary>,
        source: &S,
    ) -> Result<Option<Completion>, PostError>
    where
        B: PostBackend,
        S: PageSource<Item = PostSummary>,
    {
        backend.delete_post(post_id).await?;
        tracing::debug!(admin = %self.admin, post_id, "post deleted");
        Ok(listing.reset_and_reload(source).await)
    }
}
