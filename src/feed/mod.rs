// SPDX-License-Identifier: MPL-2.0

mod controller;
mod loader;
mod source;
mod trigger;

pub use controller::FeedController;
pub use loader::{
    Completion, FeedItem, FeedLoader, FeedState, LoaderStatus, PageSource, PageTicket, Phase,
};
pub use source::{PostFeedSource, merge_vote_counts};
pub use trigger::{Interaction, Sentinel, TriggerGate, Viewport};
