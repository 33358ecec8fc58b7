// SPDX-License-Identifier: MPL-2.0

mod time;

pub use time::{time_ago, time_ago_at};
