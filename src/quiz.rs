// SPDX-License-Identifier: MPL-2.0

//! The quiz offered after voting on a post.

use crate::api::{BoardClient, ClientError, Quiz, QuizAnswer};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuizError {
    #[error("this post has no quiz")]
    NoQuiz,
    #[error("no answer selected")]
    NothingSelected,
    #[error("answer already submitted")]
    AlreadySubmitted,
    #[error(transparent)]
    Client(#[from] ClientError),
}

#[allow(async_fn_in_trait)]
pub trait QuizBackend {
    async fn fetch_quiz(&self, post_id: i64) -> Result<Option<Quiz>, ClientError>;
    async fn submit_answer(&self, answer: &QuizAnswer) -> Result<(), ClientError>;
}

impl QuizBackend for BoardClient {
    async fn fetch_quiz(&self, post_id: i64) -> Result<Option<Quiz>, ClientError> {
        self.get_quiz(post_id).await
    }

    async fn submit_answer(&self, answer: &QuizAnswer) -> Result<(), ClientError> {
        self.answer_quiz(answer).await
    }
}

/// One sitting of a post's quiz. The question is fetched once and kept
/// across `close`; the chosen answer is not.
#[derive(Debug, Clone, Default)]
pub struct QuizSession {
    post_id: i64,
    quiz: Option<Quiz>,
    selected: Option<i64>,
    submitted: bool,
    error: Option<String>,
}

impl QuizSession {
    pub fn new(post_id: i64) -> Self {
        Self {
            post_id,
            ..Self::default()
        }
    }

    pub fn quiz(&self) -> Option<&Quiz> {
        self.quiz.as_ref()
    }

    pub fn selected(&self) -> Option<i64> {
        self.selected
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Fetch the quiz unless it is already here. Failures are kept for display.
    pub async fn open<B: QuizBackend>(&mut self, backend: &B) {
        if self.quiz.is_some() {
            return;
        }
        self.error = None;
        match backend.fetch_quiz(self.post_id).await {
            Ok(quiz) => self.quiz = quiz,
            Err(e) => {
                tracing::warn!(post_id = self.post_id, error = %e, "failed to load quiz");
                self.error = Some(e.to_string());
            }
        }
    }

    /// Pick an answer. Ignored once submitted or for an unknown option.
    pub fn select(&mut self, option_id: i64) -> bool {
        let known = self.quiz.as_ref().is_some_and(|q| q.option(option_id).is_some());
        if self.submitted || !known {
            return false;
        }
        self.selected = Some(option_id);
        true
    }

    /// Send the selected answer and report whether it was right.
    pub async fn submit<B: QuizBackend>(&mut self, backend: &B) -> Result<bool, QuizError> {
        if self.submitted {
            return Err(QuizError::AlreadySubmitted);
        }
        let quiz = self.quiz.as_ref().ok_or(QuizError::NoQuiz)?;
        let option_id = self.selected.ok_or(QuizError::NothingSelected)?;

        let answer = QuizAnswer {
            quiz_id: quiz.id,
            option_id,
            post_id: self.post_id,
        };
        if let Err(e) = backend.submit_answer(&answer).await {
            self.error = Some(e.to_string());
            return Err(e.into());
        }

        self.submitted = true;
        self.error = None;
        Ok(self.is_correct())
    }

    /// Whether the selected option is the right one
    pub fn is_correct(&self) -> bool {
        match (&self.quiz, self.selected) {
            (Some(quiz), Some(id)) => quiz.option(id).is_some_and(|o| o.is_correct),
            _ => false,
        }
    }

    /// Shown only after an answer went in
    pub fn explanation(&self) -> Option<&str> {
        self.quiz
            .as_ref()
            .filter(|_| self.submitted)
            .map(|q| q.explanation.as_str())
    }

    /// Dismiss the dialog: clear the answer, keep the question.
    pub fn close(&mut self) {
        self.selected = None;
        self.submitted = false;
        self.error = None;
    }
}
