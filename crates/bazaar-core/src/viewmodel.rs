//! View model backing a list screen.
//!
//! Holds the latest snapshot of one remote collection. A new snapshot always
//! replaces the previous one wholesale, and every replacement goes through
//! [`CollectionViewModel::set_records`]. Mutation intents go to the remote
//! store and are reflected locally only when the next snapshot arrives.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::authorization;
use crate::decode::{decode_snapshot, RemoteDecode};
use crate::models::{Item, Record};
use crate::paths::CollectionPath;
use crate::remote::{Filter, RemoteError};
use crate::service::MarketplaceService;
use crate::subscription::SubscriptionManager;
use crate::{Error, Result};

/// Called once per snapshot replacement with the new records.
pub type RefreshHook<T> = Box<dyn FnMut(&[T]) + Send>;
/// Called for each error reported by the live subscription.
pub type ErrorHook = Box<dyn FnMut(&RemoteError) + Send>;

/// Result of [`CollectionViewModel::request_toggle_favorite`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteToggle {
    Added,
    Removed,
}

struct ViewState<T> {
    records: Vec<T>,
    revision: u64,
    last_error: Option<RemoteError>,
    on_refresh: Option<RefreshHook<T>>,
    on_error: Option<ErrorHook>,
}

impl<T> ViewState<T> {
    fn replace(&mut self, records: Vec<T>) {
        self.records = records;
        self.revision += 1;
        if let Some(hook) = self.on_refresh.as_mut() {
            hook(&self.records);
        }
    }

    fn report(&mut self, error: RemoteError) {
        if let Some(hook) = self.on_error.as_mut() {
            hook(&error);
        }
        self.last_error = Some(error);
    }
}

fn lock<T>(state: &Mutex<ViewState<T>>) -> MutexGuard<'_, ViewState<T>> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Records of one remote collection plus the intents a list screen offers.
///
/// Hooks run while the view model's state is locked and must not call back
/// into the same view model.
pub struct CollectionViewModel<T> {
    path: CollectionPath,
    service: MarketplaceService,
    state: Arc<Mutex<ViewState<T>>>,
    subscription: SubscriptionManager,
}

impl<T: Record + RemoteDecode> CollectionViewModel<T> {
    pub fn new(path: CollectionPath, service: MarketplaceService) -> Self {
        let subscription = SubscriptionManager::new(service.gateway());
        Self {
            path,
            service,
            state: Arc::new(Mutex::new(ViewState {
                records: Vec::new(),
                revision: 0,
                last_error: None,
                on_refresh: None,
                on_error: None,
            })),
            subscription,
        }
    }

    /// Install the UI refresh hook.
    #[must_use]
    pub fn with_refresh(self, hook: impl FnMut(&[T]) + Send + 'static) -> Self {
        lock(&self.state).on_refresh = Some(Box::new(hook));
        self
    }

    /// Install the hook that surfaces subscription errors to the user.
    #[must_use]
    pub fn with_error_handler(self, hook: impl FnMut(&RemoteError) + Send + 'static) -> Self {
        lock(&self.state).on_error = Some(Box::new(hook));
        self
    }

    pub const fn path(&self) -> &CollectionPath {
        &self.path
    }

    /// Screen became visible: (re)start the live subscription.
    pub fn appear(&mut self) {
        let snapshot_state = Arc::downgrade(&self.state);
        let error_state = Arc::downgrade(&self.state);
        self.subscription.start(
            self.path.clone(),
            move |records: Vec<T>| {
                if let Some(state) = snapshot_state.upgrade() {
                    lock(&state).replace(records);
                }
            },
            move |error| {
                if let Some(state) = error_state.upgrade() {
                    lock(&state).report(error);
                }
            },
        );
    }

    /// Screen went away: stop listening. Held records are kept.
    pub fn disappear(&mut self) {
        self.subscription.stop();
    }

    /// Whether the live subscription is running.
    pub const fn is_live(&self) -> bool {
        self.subscription.is_active()
    }

    /// Replace the held records and fire the refresh hook once.
    pub fn set_records(&self, records: Vec<T>) {
        lock(&self.state).replace(records);
    }

    /// One-shot query in place of a live subscription.
    ///
    /// Returns the number of records loaded.
    pub async fn load_once(&self, filter: &Filter) -> Result<usize> {
        let records = self.service.gateway().query(&self.path, filter).await?;
        let records: Vec<T> = decode_snapshot(&records);
        let count = records.len();
        self.set_records(records);
        Ok(count)
    }

    pub fn len(&self) -> usize {
        lock(&self.state).records.len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.state).records.is_empty()
    }

    /// Copy of the held records.
    pub fn records(&self) -> Vec<T> {
        lock(&self.state).records.clone()
    }

    /// Number of replacements so far.
    pub fn revision(&self) -> u64 {
        lock(&self.state).revision
    }

    /// Most recent error reported by the live subscription.
    pub fn last_error(&self) -> Option<RemoteError> {
        lock(&self.state).last_error.clone()
    }

    pub fn record_at(&self, index: usize) -> Result<T> {
        let state = lock(&self.state);
        state.records.get(index).cloned().ok_or_else(|| {
            tracing::error!(
                "Record index {} out of range ({} held) on {}",
                index,
                state.records.len(),
                self.path
            );
            Error::OutOfRange {
                index,
                len: state.records.len(),
            }
        })
    }

    /// Whether `current_user_id` may modify the record at `index`.
    pub fn can_mutate(&self, index: usize, current_user_id: &str) -> Result<bool> {
        let record = self.record_at(index)?;
        Ok(authorization::can_mutate(&record, current_user_id))
    }

    /// Ask the remote store to delete the record at `index`.
    ///
    /// Non-owners get [`Error::Unauthorized`] without any remote call. The
    /// record stays in the view model until a snapshot without it arrives.
    pub async fn request_delete(&self, index: usize, current_user_id: &str) -> Result<()> {
        let record = self.record_at(index)?;
        if !authorization::can_mutate(&record, current_user_id) {
            tracing::info!(
                "User {} may not delete {} on {}",
                current_user_id,
                record.id(),
                self.path
            );
            return Err(Error::Unauthorized {
                record_id: record.id().to_string(),
            });
        }

        self.service
            .gateway()
            .delete(&self.path, record.id())
            .await?;
        tracing::info!("Requested delete of {} on {}", record.id(), self.path);
        Ok(())
    }
}

impl CollectionViewModel<Item> {
    /// Flip the favorite state of the item at `index` for `current_user_id`.
    ///
    /// Reads the current state, then writes the opposite one. The two steps
    /// are not atomic: two toggles racing from one client can both read the
    /// same state and leave the favorite unchanged.
    pub async fn request_toggle_favorite(
        &self,
        index: usize,
        current_user_id: &str,
    ) -> Result<FavoriteToggle> {
        let item = self.record_at(index)?;
        if self
            .service
            .is_favorite(current_user_id, &item.item_id)
            .await?
        {
            self.service
                .remove_favorite(current_user_id, &item.item_id)
                .await?;
            Ok(FavoriteToggle::Removed)
        } else {
            self.service.add_favorite(current_user_id, &item).await?;
            Ok(FavoriteToggle::Added)
        }
    }
}
