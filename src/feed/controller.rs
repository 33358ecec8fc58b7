// SPDX-License-Identifier: MPL-2.0

use crate::api::{ClientError, FeedQuery};
use crate::feed::loader::{Completion, FeedLoader, PageSource, PageTicket};
use crate::feed::trigger::{Interaction, Sentinel, TriggerGate, Viewport};

/// Infinite-scroll feed: a loader, its page source and the trigger gate.
///
/// A UI drives it with layout and input events. Fetches can either be
/// awaited in place (`load_more`) or split into `trigger` and `finish` when
/// the request runs somewhere else.
pub struct FeedController<S: PageSource> {
    source: S,
    loader: FeedLoader<S::Item>,
    gate: TriggerGate,
}

impl<S: PageSource> FeedController<S> {
    pub fn new(source: S, query: FeedQuery, page_size: usize) -> Self {
        Self {
            source,
            loader: FeedLoader::new(query, page_size),
            gate: TriggerGate::new(),
        }
    }

    pub fn items(&self) -> &[S::Item] {
        self.loader.items()
    }

    pub fn is_loading(&self) -> bool {
        self.loader.is_loading()
    }

    pub fn has_more(&self) -> bool {
        self.loader.has_more()
    }

    pub fn error(&self) -> Option<&str> {
        self.loader.error()
    }

    pub fn loader(&self) -> &FeedLoader<S::Item> {
        &self.loader
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Load the first page, as on mount
    pub async fn start(&mut self) -> Option<Completion> {
        self.loader.load_next(&self.source).await
    }

    pub fn record_interaction(&mut self, kind: Interaction) {
        self.gate.record_interaction(kind);
    }

    /// Report the sentinel's position after layout or scrolling. Returns
    /// whether it is being observed.
    pub fn sentinel_moved(&mut self, sentinel: Sentinel, viewport: Viewport) -> bool {
        self.gate.update_position(sentinel, viewport)
    }

    /// The sentinel intersected the viewport. Issues the next page request
    /// if the gate allows it and suspends observation.
    pub fn trigger(&mut self, sentinel: Sentinel, viewport: Viewport) -> Option<PageTicket> {
        if !self
            .gate
            .should_fetch(sentinel, viewport, self.loader.status())
        {
            return None;
        }
        let ticket = self.loader.begin()?;
        self.gate.suspend();
        Some(ticket)
    }

    /// Apply the answer to a ticket from `trigger`.
    pub fn finish(
        &mut self,
        ticket: PageTicket,
        result: Result<Vec<S::Item>, ClientError>,
    ) -> Completion {
        self.loader.complete(ticket, result)
    }

    /// `trigger` followed by the fetch and `finish`.
    pub async fn load_more(&mut self, sentinel: Sentinel, viewport: Viewport) -> Option<Completion> {
        let ticket = self.trigger(sentinel, viewport)?;
        let result = self
            .source
            .fetch_page(ticket.query(), ticket.page(), ticket.size())
            .await;
        Some(self.finish(ticket, result))
    }

    /// The items from the last page are on screen; observation may resume.
    pub fn content_rendered(&mut self) {
        self.gate.resume(self.loader.status());
    }

    /// Switch filters. An equal query is ignored; a different one clears the
    /// feed and loads its first page.
    pub async fn set_query(&mut self, query: FeedQuery) -> Option<Completion> {
        if !self.loader.set_query(query) {
            return None;
        }
        self.gate.reset();
        self.loader.load_next(&self.source).await
    }

    pub async fn reset_and_reload(&mut self) -> Option<Completion> {
        self.gate.reset();
        self.loader.reset_and_reload(&self.source).await
    }
}
