use std::hash::Hash;

use client::error::ApiError;
use client::models::Pagination;

use crate::cache::{FetchTicket, QueryCache};

/// Cache key of a list view: the filter state plus the page number.
pub type ListKey<F> = (F, u64);

/// One fetched page of a server-side paginated listing.
#[derive(Debug, Clone)]
pub struct PageData<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

/// What the controller wants next: nothing (current key is cached or an
/// error is on display) or a fetch for the given ticket.
pub enum Poll<F> {
    Ready,
    Fetch(FetchTicket<ListKey<F>>),
}

/// What the view should render. `Empty` is an explicit "no records"
/// affordance, distinct from `Loading`; `Error` carries a retryable message.
#[derive(Debug, PartialEq)]
pub enum ViewState<'a, T> {
    Loading,
    Empty,
    Data(&'a [T]),
    Error(&'a str),
}

/// List-filter-paginate controller shared by the Users and Attendance views.
///
/// State is `{filters, page, page_size}`; the `(filters, page)` tuple is the
/// cache key. Any filter change resets the page to 1 so a narrowed search
/// never lands on an out-of-range page. Identical keys are served from cache
/// without a loading state; any key change triggers a fresh fetch. Only the
/// response matching the current key may update visible state.
pub struct ListController<F, T>
where
    F: Clone + Eq + Hash + Default,
{
    filters: F,
    page: u64,
    page_size: u64,
    cache: QueryCache<ListKey<F>, PageData<T>>,
    pagination: Option<Pagination>,
    loading: bool,
    error: Option<String>,
}

impl<F, T> ListController<F, T>
where
    F: Clone + Eq + Hash + Default,
{
    pub fn new(page_size: u64) -> Self {
        Self {
            filters: F::default(),
            page: 1,
            page_size,
            cache: QueryCache::new(),
            pagination: None,
            loading: false,
            error: None,
        }
    }

    pub fn filters(&self) -> &F {
        &self.filters
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn pagination(&self) -> Option<&Pagination> {
        self.pagination.as_ref()
    }

    /// Applies a filter edit. The page always resets to 1: changing what is
    /// being searched invalidates the old page position. Any error displayed
    /// under the old key is dropped so the new key fetches immediately.
    pub fn update_filters(&mut self, edit: impl FnOnce(&mut F)) {
        edit(&mut self.filters);
        self.page = 1;
        self.error = None;
    }

    /// Resets all filter fields and the page in one atomic state update.
    pub fn clear_filters(&mut self) {
        self.filters = F::default();
        self.page = 1;
        self.error = None;
    }

    /// Advances one page; no-op once the last known page is reached.
    pub fn next_page(&mut self) {
        let pages = self.pagination.as_ref().map(|p| p.pages).unwrap_or(1);
        if self.page < pages {
            self.page += 1;
            self.error = None;
        }
    }

    /// Goes back one page; no-op at page 1.
    pub fn prev_page(&mut self) {
        if self.page > 1 {
            self.page -= 1;
            self.error = None;
        }
    }

    fn key(&self) -> ListKey<F> {
        (self.filters.clone(), self.page)
    }

    /// Decides whether a fetch is needed for the current `(filters, page)`
    /// key. A cached key is served without re-entering the loading state. A
    /// displayed error stays on screen until [`ListController::retry`] or a
    /// key change, whichever comes first.
    pub fn poll(&mut self) -> Poll<F> {
        if self.error.is_some() {
            self.loading = false;
            return Poll::Ready;
        }

        let key = self.key();
        if self.cache.get(&key).is_some() {
            self.loading = false;
            return Poll::Ready;
        }

        self.loading = true;
        Poll::Fetch(self.cache.begin_fetch(key))
    }

    /// Feeds a fetch outcome back in. Returns whether it was applied; a
    /// response whose ticket was superseded is discarded either way.
    pub fn apply(
        &mut self,
        ticket: FetchTicket<ListKey<F>>,
        result: Result<PageData<T>, ApiError>,
    ) -> bool {
        match result {
            Ok(data) => {
                let pagination = data.pagination.clone();
                if self.cache.complete(ticket, data) {
                    self.pagination = Some(pagination);
                    self.loading = false;
                    true
                } else {
                    false
                }
            }
            Err(e) => {
                if self.cache.is_current(&ticket) {
                    self.error = Some(e.to_string());
                    self.loading = false;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Clears a displayed error so the next poll re-issues the fetch.
    pub fn retry(&mut self) {
        self.error = None;
    }

    /// Abandons an in-flight fetch without recording an outcome, leaving no
    /// loading state behind. Used when the caller is navigating away (auth
    /// failure sends the operator back to login).
    pub fn abandon(&mut self, ticket: FetchTicket<ListKey<F>>) {
        if self.cache.is_current(&ticket) {
            self.loading = false;
        }
    }

    /// Discards every cached page for this view, forcing a re-fetch. Called
    /// exactly once per successful mutation.
    pub fn invalidate(&mut self) {
        self.cache.invalidate_all();
        self.error = None;
    }

    pub fn view(&self) -> ViewState<'_, T> {
        if let Some(message) = &self.error {
            return ViewState::Error(message);
        }
        if self.loading {
            return ViewState::Loading;
        }
        match self.cache.get(&(self.filters.clone(), self.page)) {
            Some(data) if data.items.is_empty() => ViewState::Empty,
            Some(data) => ViewState::Data(&data.items),
            None => ViewState::Loading,
        }
    }

    pub(crate) fn cache_generation(&self) -> u64 {
        self.cache.generation()
    }
}
