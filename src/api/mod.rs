// SPDX-License-Identifier: MPL-2.0

mod client;
mod types;

pub use client::{BoardClient, ClientError};
pub use types::{
    Category, CategoryTree, CommentRecord, FeedQuery, NewCategory, NewComment, NewPost,
    OptionDraft, OrderBy, PostDetail, PostDraft, PostSummary, PostUpdate, Quiz, QuizAnswer,
    QuizOption, User, VoteCount, VoteCounts, VoteOption,
};
