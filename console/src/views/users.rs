use client::ApiClient;
use client::error::ApiError;
use client::models::{User, UserPayload};
use client::params::UserListParams;

use crate::controller::{ListController, PageData, Poll, ViewState};
use crate::views::Confirmation;

pub const USERS_PAGE_SIZE: u64 = 20;

/// Filter state of the users listing. An empty search imposes no
/// constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct UserFilters {
    pub search: Option<String>,
}

/// Controller behind the Users page: searchable, paginated, with
/// create/update/delete flows that invalidate the listing exactly once on
/// success.
pub struct UsersView {
    list: ListController<UserFilters, User>,
}

impl UsersView {
    pub fn new() -> Self {
        Self {
            list: ListController::new(USERS_PAGE_SIZE),
        }
    }

    pub fn set_search(&mut self, search: &str) {
        let search = search.trim();
        let value = if search.is_empty() {
            None
        } else {
            Some(search.to_string())
        };
        self.list.update_filters(|f| f.search = value);
    }

    pub fn clear_filters(&mut self) {
        self.list.clear_filters();
    }

    pub fn next_page(&mut self) {
        self.list.next_page();
    }

    pub fn prev_page(&mut self) {
        self.list.prev_page();
    }

    pub fn page(&self) -> u64 {
        self.list.page()
    }

    pub fn pagination(&self) -> Option<&client::models::Pagination> {
        self.list.pagination()
    }

    pub fn state(&self) -> ViewState<'_, User> {
        self.list.view()
    }

    pub fn retry(&mut self) {
        self.list.retry();
    }

    /// Fetches the current `(filters, page)` key if it is not cached.
    /// Authorization failures propagate to the caller for gate handling;
    /// other failures become the view's retryable error state.
    pub async fn refresh(&mut self, api: &ApiClient) -> Result<(), ApiError> {
        let ticket = match self.list.poll() {
            Poll::Ready => return Ok(()),
            Poll::Fetch(ticket) => ticket,
        };
        let (filters, page) = ticket.key().clone();

        let mut params = UserListParams::new()
            .with_page(page)
            .with_limit(USERS_PAGE_SIZE);
        if let Some(search) = filters.search {
            params = params.with_search(search);
        }

        match api.users().list(&params).await {
            Ok(response) => {
                self.list.apply(
                    ticket,
                    Ok(PageData {
                        items: response.users,
                        pagination: response.pagination,
                    }),
                );
                Ok(())
            }
            Err(e) if e.is_auth_failure() => {
                self.list.abandon(ticket);
                Err(e)
            }
            Err(e) => {
                self.list.apply(ticket, Err(e));
                Ok(())
            }
        }
    }

    pub async fn create(
        &mut self,
        api: &ApiClient,
        payload: &UserPayload,
    ) -> Result<User, ApiError> {
        let user = api.users().create(payload).await?;
        self.list.invalidate();
        Ok(user)
    }

    pub async fn update(
        &mut self,
        api: &ApiClient,
        id: &str,
        payload: &UserPayload,
    ) -> Result<User, ApiError> {
        let user = api.users().update(id, payload).await?;
        self.list.invalidate();
        Ok(user)
    }

    /// Deletes a user after explicit operator confirmation. Returns whether
    /// a delete was actually issued; `Cancelled` aborts without any call.
    pub async fn delete(
        &mut self,
        api: &ApiClient,
        id: &str,
        confirmation: Confirmation,
    ) -> Result<bool, ApiError> {
        if confirmation == Confirmation::Cancelled {
            return Ok(false);
        }
        api.users().delete(id).await?;
        self.list.invalidate();
        Ok(true)
    }
}

impl Default for UsersView {
    fn default() -> Self {
        Self::new()
    }
}
