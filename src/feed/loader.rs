// SPDX-License-Identifier: MPL-2.0

use crate::api::{ClientError, FeedQuery, PostSummary};

/// An entry of a paginated list. Ids are unique within one feed.
pub trait FeedItem {
    fn id(&self) -> i64;
}

impl FeedItem for PostSummary {
    fn id(&self) -> i64 {
        self.id
    }
}

/// Where pages come from. Page indices start at 0.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    type Item: FeedItem;

    async fn fetch_page(
        &self,
        query: &FeedQuery,
        page: usize,
        size: usize,
    ) -> Result<Vec<Self::Item>, ClientError>;
}

/// Snapshot of a feed's pagination
#[derive(Debug, Clone, PartialEq)]
pub struct FeedState<T> {
    pub items: Vec<T>,
    /// Page index the next fetch will request
    pub next_page: usize,
    pub has_more: bool,
    pub is_loading: bool,
    /// Last fetch failure, kept for display
    pub error: Option<String>,
}

impl<T> Default for FeedState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            next_page: 0,
            has_more: true,
            is_loading: false,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Exhausted,
    Errored,
}

/// A page request that has been issued and not yet answered.
///
/// Each ticket carries the serial of the request it stands for. Only the
/// request the loader is currently waiting on can be answered, so answering
/// after a reset, or answering twice, is harmless.
#[derive(Debug, PartialEq, Eq)]
pub struct PageTicket {
    serial: u64,
    generation: u64,
    page: usize,
    size: usize,
    query: FeedQuery,
}

impl PageTicket {
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn query(&self) -> &FeedQuery {
        &self.query
    }
}

/// What applying a page result did to the feed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// A full page was appended, more may follow
    Appended(usize),
    /// A short page was appended, nothing follows
    Exhausted(usize),
    Failed,
    /// The result belonged to an older query and was dropped
    Stale,
}

/// What the trigger gate needs to know about the loader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderStatus {
    pub first_page_loaded: bool,
    pub in_flight: bool,
    pub has_more: bool,
}

/// Page-by-page loader for one feed query.
pub struct FeedLoader<T> {
    query: FeedQuery,
    page_size: usize,
    generation: u64,
    next_serial: u64,
    /// Serial of the request in flight
    outstanding: Option<u64>,
    first_page_loaded: bool,
    state: FeedState<T>,
}

impl<T> FeedLoader<T> {
    pub fn new(query: FeedQuery, page_size: usize) -> Self {
        Self {
            query,
            page_size: page_size.max(1),
            generation: 0,
            next_serial: 0,
            outstanding: None,
            first_page_loaded: false,
            state: FeedState::default(),
        }
    }

    pub fn query(&self) -> &FeedQuery {
        &self.query
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn state(&self) -> &FeedState<T> {
        &self.state
    }

    pub fn items(&self) -> &[T] {
        &self.state.items
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading
    }

    pub fn has_more(&self) -> bool {
        self.state.has_more
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    pub fn phase(&self) -> Phase {
        if self.state.is_loading {
            Phase::Loading
        } else if self.state.error.is_some() {
            Phase::Errored
        } else if !self.state.has_more {
            Phase::Exhausted
        } else {
            Phase::Idle
        }
    }

    pub fn status(&self) -> LoaderStatus {
        LoaderStatus {
            first_page_loaded: self.first_page_loaded,
            in_flight: self.state.is_loading,
            has_more: self.state.has_more,
        }
    }

    /// Issue the next page request, or `None` while one is outstanding or
    /// the feed is exhausted. Refused requests are not queued.
    pub fn begin(&mut self) -> Option<PageTicket> {
        if self.state.is_loading || !self.state.has_more {
            return None;
        }
        self.state.is_loading = true;
        let serial = self.next_serial;
        self.next_serial += 1;
        self.outstanding = Some(serial);

        tracing::debug!(
            page = self.state.next_page,
            generation = self.generation,
            serial,
            "requesting feed page"
        );

        Some(PageTicket {
            serial,
            generation: self.generation,
            page: self.state.next_page,
            size: self.page_size,
            query: self.query.clone(),
        })
    }

    /// Apply the answer to `ticket`.
    pub fn complete(
        &mut self,
        ticket: PageTicket,
        result: Result<Vec<T>, ClientError>,
    ) -> Completion {
        if ticket.generation != self.generation {
            tracing::debug!(
                page = ticket.page,
                generation = ticket.generation,
                current = self.generation,
                "dropping page for superseded query"
            );
            return Completion::Stale;
        }
        if self.outstanding != Some(ticket.serial) {
            tracing::debug!(
                page = ticket.page,
                serial = ticket.serial,
                "dropping answer to a request that is not outstanding"
            );
            return Completion::Stale;
        }

        self.outstanding = None;
        self.state.is_loading = false;

        match result {
            Ok(batch) => {
                let count = batch.len();
                self.state.items.extend(batch);
                self.state.next_page = ticket.page + 1;
                self.state.has_more = count >= ticket.size;
                if ticket.page == 0 {
                    self.first_page_loaded = true;
                }

                if self.state.has_more {
                    Completion::Appended(count)
                } else {
                    tracing::debug!(total = self.state.items.len(), "feed exhausted");
                    Completion::Exhausted(count)
                }
            }
            Err(e) => {
                tracing::warn!(page = ticket.page, error = %e, "failed to load feed page");
                self.state.error = Some(e.to_string());
                self.state.has_more = false;
                Completion::Failed
            }
        }
    }

    /// Drop everything and start over at page 0. Outstanding tickets go stale.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.outstanding = None;
        self.first_page_loaded = false;
        self.state = FeedState::default();
    }

    /// Switch to `query`. Returns `false` when it equals the current one.
    pub fn set_query(&mut self, query: FeedQuery) -> bool {
        if query == self.query {
            return false;
        }
        self.query = query;
        self.reset();
        true
    }

    /// Fetch the next page from `source` and apply it.
    pub async fn load_next<S>(&mut self, source: &S) -> Option<Completion>
    where
        S: PageSource<Item = T>,
    {
        let ticket = self.begin()?;
        let result = source
            .fetch_page(ticket.query(), ticket.page(), ticket.size())
            .await;
        Some(self.complete(ticket, result))
    }

    pub async fn reset_and_reload<S>(&mut self, source: &S) -> Option<Completion>
    where
        S: PageSource<Item = T>,
    {
        self.reset();
        self.load_next(source).await
    }
}

impl<T: FeedItem> FeedLoader<T> {
    pub fn find(&self, id: i64) -> Option<&T> {
        self.state.items.iter().find(|item| item.id() == id)
    }
}
