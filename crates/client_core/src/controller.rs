//! Owns the fetched users, derives the visible page, and reconciles confirmed mutations.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use shared::{
    domain::UserId,
    error::ValidationErrors,
    form::UserForm,
    protocol::User,
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{
    curation::{derive_view, CuratedPage, PageSize, SortKey},
    error::GatewayError,
    gateway::UsersGateway,
    session::{EditSession, SessionMode, SessionSnapshot},
    sink::{ErrorSink, TracingErrorSink},
};

pub const OP_LOAD_USERS: &str = "load users";
pub const OP_ADD_USER: &str = "add user";
pub const OP_UPDATE_USER: &str = "update user";
pub const OP_DELETE_USER: &str = "delete user";

const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    ViewChanged,
    LoadingChanged(bool),
    SessionChanged,
    OperationFailed { operation: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Created(User),
    Updated(User),
    Rejected(ValidationErrors),
    Failed,
    NoSession,
}

/// Everything a front end renders, copied out of the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSnapshot {
    pub users: Vec<User>,
    pub filtered_count: usize,
    pub total_pages: usize,
    pub current_page: usize,
    pub page_size: usize,
    pub search_term: String,
    pub sort_key: SortKey,
    pub loading: bool,
    pub session: SessionSnapshot,
}

struct ControllerState {
    users: Vec<User>,
    search_term: String,
    sort_key: SortKey,
    current_page: usize,
    view: CuratedPage,
    session: Option<EditSession>,
    session_generation: u64,
}

impl ControllerState {
    fn new() -> Self {
        Self {
            users: Vec::new(),
            search_term: String::new(),
            sort_key: SortKey::None,
            current_page: 1,
            view: CuratedPage {
                users: Vec::new(),
                filtered_count: 0,
                total_pages: 0,
                current_page: 1,
            },
            session: None,
            session_generation: 0,
        }
    }

    fn next_session_generation(&mut self) -> u64 {
        self.session_generation += 1;
        self.session_generation
    }

    fn refresh(&mut self, page_size: PageSize) {
        self.view = derive_view(
            &self.users,
            &self.search_term,
            self.sort_key,
            self.current_page,
            page_size,
        );
        self.current_page = self.view.current_page;
    }
}

pub struct UserListController {
    gateway: Arc<dyn UsersGateway>,
    sink: Arc<dyn ErrorSink>,
    page_size: PageSize,
    loading: AtomicBool,
    inner: Mutex<ControllerState>,
    events: broadcast::Sender<ControllerEvent>,
}

/// Clears the loading flag when the load completes, fails, or is dropped mid-flight.
struct LoadingGuard<'a> {
    controller: &'a UserListController,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.controller.set_loading(false);
    }
}

impl UserListController {
    pub fn new(gateway: Arc<dyn UsersGateway>) -> Self {
        Self::new_with_dependencies(gateway, Arc::new(TracingErrorSink), PageSize::default())
    }

    pub fn new_with_dependencies(
        gateway: Arc<dyn UsersGateway>,
        sink: Arc<dyn ErrorSink>,
        page_size: PageSize,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            gateway,
            sink,
            page_size,
            loading: AtomicBool::new(false),
            inner: Mutex::new(ControllerState::new()),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub async fn snapshot(&self) -> ViewSnapshot {
        let state = self.inner.lock().await;
        ViewSnapshot {
            users: state.view.users.clone(),
            filtered_count: state.view.filtered_count,
            total_pages: state.view.total_pages,
            current_page: state.current_page,
            page_size: self.page_size.get(),
            search_term: state.search_term.clone(),
            sort_key: state.sort_key,
            loading: self.is_loading(),
            session: state
                .session
                .as_ref()
                .map(EditSession::snapshot)
                .unwrap_or_default(),
        }
    }

    pub async fn authoritative_users(&self) -> Vec<User> {
        self.inner.lock().await.users.clone()
    }

    /// Fetch the full collection and replace the local copy. Returns `false` when the
    /// gateway call failed; the previous collection is kept in that case.
    pub async fn load(&self) -> bool {
        let _loading = self.begin_loading();
        match self.gateway.list().await {
            Ok(users) => {
                let count = users.len();
                {
                    let mut state = self.inner.lock().await;
                    state.users = users;
                    state.refresh(self.page_size);
                }
                info!(count, "loaded users");
                self.publish(ControllerEvent::ViewChanged);
                true
            }
            Err(err) => {
                self.report(OP_LOAD_USERS, &err);
                false
            }
        }
    }

    pub async fn set_search_term(&self, term: impl Into<String>) {
        {
            let mut state = self.inner.lock().await;
            state.search_term = term.into();
            state.current_page = 1;
            state.refresh(self.page_size);
        }
        self.publish(ControllerEvent::ViewChanged);
    }

    pub async fn sort_by(&self, key: SortKey) {
        {
            let mut state = self.inner.lock().await;
            state.sort_key = key;
            state.refresh(self.page_size);
        }
        self.publish(ControllerEvent::ViewChanged);
    }

    /// Move to `page` if it lies within `1..=total_pages`. Out-of-range targets are
    /// ignored and return `false`; the current page is accepted without re-deriving.
    pub async fn go_to_page(&self, page: usize) -> bool {
        {
            let mut state = self.inner.lock().await;
            if page < 1 || page > state.view.total_pages {
                debug!(page, total_pages = state.view.total_pages, "page out of range");
                return false;
            }
            if page == state.current_page {
                return true;
            }
            state.current_page = page;
            state.refresh(self.page_size);
        }
        self.publish(ControllerEvent::ViewChanged);
        true
    }

    pub async fn open_create_session(&self) {
        {
            let mut state = self.inner.lock().await;
            let generation = state.next_session_generation();
            state.session = Some(EditSession::create(generation));
        }
        self.publish(ControllerEvent::SessionChanged);
    }

    /// Open an edit session on a detached copy of the record. Returns `false` when the id
    /// is not in the collection.
    pub async fn open_edit_session(&self, id: UserId) -> bool {
        {
            let mut state = self.inner.lock().await;
            let Some(user) = state.users.iter().find(|user| user.id == id).cloned() else {
                return false;
            };
            let generation = state.next_session_generation();
            state.session = Some(EditSession::edit(generation, user));
        }
        self.publish(ControllerEvent::SessionChanged);
        true
    }

    pub async fn close_session(&self) {
        let closed = self.inner.lock().await.session.take().is_some();
        if closed {
            self.publish(ControllerEvent::SessionChanged);
        }
    }

    /// Validate `form` and submit it for the open session. The session stays open on
    /// validation or gateway failure so the user can retry or cancel.
    pub async fn save_session(&self, form: &UserForm) -> SaveOutcome {
        let Some(session) = self.inner.lock().await.session.clone() else {
            return SaveOutcome::NoSession;
        };

        let draft = match form.validate() {
            Ok(draft) => draft,
            Err(errors) => return SaveOutcome::Rejected(errors),
        };

        match session.mode() {
            SessionMode::Create => match self.gateway.create(draft.into()).await {
                Ok(created) => {
                    {
                        let mut state = self.inner.lock().await;
                        state.users.push(created.clone());
                        close_if_current(&mut state, &session);
                        state.refresh(self.page_size);
                    }
                    info!(id = %created.id, "user created");
                    self.publish_saved();
                    SaveOutcome::Created(created)
                }
                Err(err) => {
                    self.report(OP_ADD_USER, &err);
                    SaveOutcome::Failed
                }
            },
            SessionMode::Edit => {
                let Some(original) = session.original().cloned() else {
                    return SaveOutcome::NoSession;
                };
                let target_id = original.id;
                match self.gateway.update(draft.apply_to(original)).await {
                    Ok(updated) => {
                        {
                            let mut state = self.inner.lock().await;
                            match state.users.iter_mut().find(|user| user.id == target_id) {
                                Some(slot) => *slot = updated.clone(),
                                None => warn!(id = %target_id, "updated user no longer present"),
                            }
                            close_if_current(&mut state, &session);
                            state.refresh(self.page_size);
                        }
                        info!(id = %target_id, "user updated");
                        self.publish_saved();
                        SaveOutcome::Updated(updated)
                    }
                    Err(err) => {
                        self.report(OP_UPDATE_USER, &err);
                        SaveOutcome::Failed
                    }
                }
            }
        }
    }

    /// Delete without confirmation. Returns `false` when the gateway call failed.
    pub async fn delete_user(&self, id: UserId) -> bool {
        match self.gateway.delete(id).await {
            Ok(()) => {
                {
                    let mut state = self.inner.lock().await;
                    state.users.retain(|user| user.id != id);
                    state.refresh(self.page_size);
                }
                info!(%id, "user deleted");
                self.publish(ControllerEvent::ViewChanged);
                true
            }
            Err(err) => {
                self.report(OP_DELETE_USER, &err);
                false
            }
        }
    }

    fn begin_loading(&self) -> LoadingGuard<'_> {
        self.set_loading(true);
        LoadingGuard { controller: self }
    }

    fn set_loading(&self, loading: bool) {
        self.loading.store(loading, Ordering::SeqCst);
        self.publish(ControllerEvent::LoadingChanged(loading));
    }

    fn report(&self, operation: &'static str, err: &GatewayError) {
        self.sink.report(operation, err);
        self.publish(ControllerEvent::OperationFailed { operation });
    }

    fn publish_saved(&self) {
        self.publish(ControllerEvent::ViewChanged);
        self.publish(ControllerEvent::SessionChanged);
    }

    fn publish(&self, event: ControllerEvent) {
        // No subscribers is fine; a front end may only poll snapshots.
        let _ = self.events.send(event);
    }
}

// A different session may have been opened while the request was in flight.
fn close_if_current(state: &mut ControllerState, submitted: &EditSession) {
    let current = state.session.as_ref().map(EditSession::generation);
    if current == Some(submitted.generation()) {
        state.session = None;
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
