// SPDX-License-Identifier: MPL-2.0

pub const APP_ID: &str = "io.github.pollboard.PollBoard";
pub const APP_NAME: &str = "PollBoard";

pub const DEFAULT_API_BASE: &str = "http://localhost:8080";

/// Posts requested per feed page
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Deepest rendered comment level (0 = root comment); replies are allowed above it
pub const MAX_REPLY_DEPTH: usize = 2;

pub const REQUEST_TIMEOUT_SECS: u64 = 30;

pub const COMMENTS_ENDPOINT: &str = "api/comment";
pub const VOTE_COUNTS_ENDPOINT: &str = "votes/count";
pub const VOTE_OPTIONS_ENDPOINT: &str = "votes/option";
pub const QUIZZES_ENDPOINT: &str = "quizzes";

/// Colour given to new poll options
pub const DEFAULT_OPTION_COLOR: &str = "#FBBF24";

/// The server reads vote end times as wall-clock time at this UTC offset
pub const SERVER_UTC_OFFSET_SECS: i32 = 9 * 3600;
