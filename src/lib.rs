// SPDX-License-Identifier: MPL-2.0

//! Client core for a debate and vote community board: paginated post feeds,
//! threaded comments, categories, post administration, post quizzes and the
//! signed-in session.

pub mod api;
pub mod categories;
pub mod comments;
pub mod config;
pub mod feed;
pub mod posts;
pub mod quiz;
pub mod runtime;
pub mod state;
pub mod util;
