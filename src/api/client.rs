// SPDX-License-Identifier: MPL-2.0

use crate::api::types::{
    Category, CategoryTree, CommentRecord, Envelope, FeedQuery, NewCategory, NewComment, NewPost,
    PostDetail, PostSummary, PostUpdate, Quiz, QuizAnswer, Slice, User, VoteCounts,
};
use crate::config::{
    COMMENTS_ENDPOINT, DEFAULT_API_BASE, QUIZZES_ENDPOINT, REQUEST_TIMEOUT_SECS,
    VOTE_COUNTS_ENDPOINT, VOTE_OPTIONS_ENDPOINT,
};
use reqwest::{Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("not authenticated")]
    NotAuthenticated,
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("server returned {status} for {path}")]
    Status { status: u16, path: String },
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

/// Thin wrapper over the board's REST API so the rest of the crate only sees our own types.
///
/// Session cookies live in the underlying client's cookie store, so one
/// `BoardClient` should be shared for the lifetime of a login.
pub struct BoardClient {
    http: reqwest::Client,
    base: Url,
}

impl BoardClient {
    pub fn new() -> Result<Self, ClientError> {
        Self::with_base(DEFAULT_API_BASE)
    }

    pub fn with_base(base_url: &str) -> Result<Self, ClientError> {
        // Url::join drops the last path segment unless the base ends with a slash
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base.join(path.trim_start_matches('/'))?)
    }

    fn check(response: Response, path: &str) -> Result<Response, ClientError> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(path, "request rejected: not authenticated");
            return Err(ClientError::NotAuthenticated);
        }
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let url = self.url(path)?;
        tracing::debug!(%url, "GET");

        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Self::check(response, path)?
            .json::<T>()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<Response, ClientError> {
        let url = self.url(path)?;
        tracing::debug!(%url, %method, "sending");

        let response = self
            .http
            .request(method, url)
            .json(body)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Self::check(response, path)
    }

    /// Fetch one page of posts for `query`. Page indices start at 0.
    pub async fn get_posts(
        &self,
        query: &FeedQuery,
        page: usize,
        size: usize,
    ) -> Result<Vec<PostSummary>, ClientError> {
        let mut params = vec![("orderBy", query.order_by.as_str().to_string())];
        if let Some(title) = &query.title {
            params.push(("title", title.clone()));
        }
        params.push(("page", page.to_string()));
        params.push(("size", size.to_string()));

        let slice: Slice<PostSummary> = self.get_json(&query.endpoint(), &params).await?;
        Ok(slice.content)
    }

    /// Vote totals keyed by post id
    pub async fn get_vote_counts(&self) -> Result<HashMap<i64, u32>, ClientError> {
        let counts: VoteCounts = self.get_json(VOTE_COUNTS_ENDPOINT, &[]).await?;
        Ok(counts.into_map())
    }

    /// The flat comment list for a post, in server order
    pub async fn get_comments(&self, post_id: i64) -> Result<Vec<CommentRecord>, ClientError> {
        self.get_json(&format!("{COMMENTS_ENDPOINT}/{post_id}"), &[])
            .await
    }

    pub async fn add_comment(&self, comment: &NewComment<'_>) -> Result<(), ClientError> {
        let path = format!("{COMMENTS_ENDPOINT}/add");
        let response = self
            .http
            .post(self.url(&path)?)
            .json(comment)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Self::check(response, &path)?;
        Ok(())
    }

    pub async fn edit_comment(&self, comment_id: i64, content: &str) -> Result<(), ClientError> {
        let path = format!("{COMMENTS_ENDPOINT}/{comment_id}");
        let response = self
            .http
            .put(self.url(&path)?)
            .json(&serde_json::json!({ "content": content }))
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Self::check(response, &path)?;
        Ok(())
    }

    pub async fn delete_comment(&self, comment_id: i64) -> Result<(), ClientError> {
        self.delete(&format!("{COMMENTS_ENDPOINT}/{comment_id}"))
            .await
    }

    pub async fn get_categories(&self) -> Result<Vec<Category>, ClientError> {
        let envelope: Envelope<Vec<Category>> = self.get_json("categories", &[]).await?;
        Ok(envelope.data)
    }

    pub async fn get_category_tree(&self) -> Result<Vec<CategoryTree>, ClientError> {
        let envelope: Envelope<Vec<CategoryTree>> = self.get_json("categories/tree", &[]).await?;
        Ok(envelope.data)
    }

    pub async fn create_category(
        &self,
        category: &NewCategory<'_>,
    ) -> Result<Category, ClientError> {
        let response = self
            .http
            .post(self.url("categories")?)
            .json(category)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let envelope: Envelope<Category> = Self::check(response, "categories")?
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        Ok(envelope.data)
    }

    pub async fn delete_category(&self, category_id: i64) -> Result<(), ClientError> {
        self.delete(&format!("categories/{category_id}")).await
    }

    /// Create a post and return its id
    pub async fn create_post(&self, post: &NewPost<'_>) -> Result<i64, ClientError> {
        let envelope: Envelope<i64> = self
            .send_json(Method::POST, "posts", post)
            .await?
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        Ok(envelope.data)
    }

    pub async fn get_post(&self, post_id: i64) -> Result<PostDetail, ClientError> {
        self.get_json(&format!("posts/{post_id}"), &[]).await
    }

    pub async fn update_post(&self, post_id: i64, post: &PostUpdate<'_>) -> Result<(), ClientError> {
        self.send_json(Method::PUT, &format!("posts/{post_id}"), post)
            .await?;
        Ok(())
    }

    pub async fn delete_post(&self, post_id: i64) -> Result<(), ClientError> {
        self.delete(&format!("posts/{post_id}")).await
    }

    pub async fn delete_vote_option(&self, option_id: i64) -> Result<(), ClientError> {
        self.delete(&format!("{VOTE_OPTIONS_ENDPOINT}/{option_id}"))
            .await
    }

    /// The quiz attached to a post, if it has one
    pub async fn get_quiz(&self, post_id: i64) -> Result<Option<Quiz>, ClientError> {
        let envelope: Envelope<Option<Quiz>> = self
            .get_json(&format!("{QUIZZES_ENDPOINT}/post/{post_id}"), &[])
            .await?;
        Ok(envelope.data)
    }

    pub async fn answer_quiz(&self, answer: &QuizAnswer) -> Result<(), ClientError> {
        self.send_json(Method::POST, &format!("{QUIZZES_ENDPOINT}/answer"), answer)
            .await?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), ClientError> {
        let response = self
            .http
            .delete(self.url(path)?)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Self::check(response, path)?;
        Ok(())
    }

    /// Ask the server whether the session cookie is still good.
    ///
    /// Any status below 500 is an answer; only a 200 with a truthy `data`
    /// counts as signed in.
    pub async fn login_check(&self) -> Result<bool, ClientError> {
        let path = "v1/loginCheck";
        let response = self
            .http
            .get(self.url(path)?)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }
        if status != StatusCode::OK {
            return Ok(false);
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        Ok(body.get("data").is_some_and(is_truthy))
    }

    pub async fn get_user_info(&self) -> Result<Option<User>, ClientError> {
        let envelope: Envelope<Option<User>> = self.get_json("v1/userInfo", &[]).await?;
        Ok(envelope.data)
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        let path = "v1/logout";
        let response = self
            .http
            .post(self.url(path)?)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }
        Ok(())
    }
}

fn is_truthy(value: &serde_json::Value) -> bool {
    use serde_json::Value;
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
