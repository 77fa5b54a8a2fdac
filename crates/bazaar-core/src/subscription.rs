//! Live-query subscription lifecycle.
//!
//! A [`SubscriptionManager`] owns at most one live registration. Starting a
//! new subscription tears the previous one down first; stopping guarantees
//! that no callback fires once `stop` has returned, even for a push that
//! was already in flight.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::decode::{decode_snapshot, RemoteDecode};
use crate::paths::CollectionPath;
use crate::remote::{
    ListenerRegistration, LiveQuery, RemoteError, RemoteErrorKind, RemoteGateway,
};

struct ActiveSubscription {
    path: CollectionPath,
    registration: Box<dyn ListenerRegistration>,
    // Held while a callback runs; `false` once stopped.
    live: Arc<Mutex<bool>>,
    task: JoinHandle<()>,
}

/// Owner of a single live subscription (Idle or Active).
pub struct SubscriptionManager {
    gateway: Arc<dyn RemoteGateway>,
    active: Option<ActiveSubscription>,
}

impl SubscriptionManager {
    pub fn new(gateway: Arc<dyn RemoteGateway>) -> Self {
        Self {
            gateway,
            active: None,
        }
    }

    /// Whether a subscription is currently registered.
    pub const fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Path of the active subscription, if any.
    pub fn active_path(&self) -> Option<&CollectionPath> {
        self.active.as_ref().map(|active| &active.path)
    }

    /// Subscribe to `path`, replacing any active subscription.
    ///
    /// `on_snapshot` receives every decoded snapshot in arrival order,
    /// starting with the initial read. `on_error` receives each remote error;
    /// the subscription stays active afterwards. Callbacks must not call back
    /// into this manager.
    ///
    /// Outside a tokio runtime nothing is registered: `on_error` is called
    /// once and the manager stays idle.
    pub fn start<T, S, E>(&mut self, path: CollectionPath, mut on_snapshot: S, mut on_error: E)
    where
        T: RemoteDecode + Send + 'static,
        S: FnMut(Vec<T>) + Send + 'static,
        E: FnMut(RemoteError) + Send + 'static,
    {
        self.stop();

        let Ok(runtime) = Handle::try_current() else {
            tracing::warn!("Cannot subscribe to {} outside a tokio runtime", path);
            on_error(RemoteError::new(
                RemoteErrorKind::Unknown,
                format!("no async runtime to subscribe to {path}"),
            ));
            return;
        };

        let LiveQuery {
            registration,
            mut events,
        } = self.gateway.subscribe(&path);
        let live = Arc::new(Mutex::new(true));
        let task_live = Arc::clone(&live);
        let task_path = path.clone();

        let task = runtime.spawn(async move {
            while let Some(event) = events.recv().await {
                let delivered = match event {
                    Ok(records) => {
                        let records = decode_snapshot::<T>(&records);
                        tracing::debug!("Snapshot of {} records on {}", records.len(), task_path);
                        deliver(&task_live, || on_snapshot(records))
                    }
                    Err(error) => {
                        tracing::warn!("Subscription error on {}: {}", task_path, error);
                        deliver(&task_live, || on_error(error))
                    }
                };
                if !delivered {
                    break;
                }
            }
        });

        tracing::info!("Started subscription on {}", path);
        self.active = Some(ActiveSubscription {
            path,
            registration,
            live,
            task,
        });
    }

    /// Tear down the active subscription. No-op when idle.
    pub fn stop(&mut self) {
        let Some(mut active) = self.active.take() else {
            return;
        };

        // Waits for a callback that is already running to finish.
        *active.live.lock().unwrap_or_else(PoisonError::into_inner) = false;
        active.registration.remove();
        active.task.abort();
        tracing::info!("Stopped subscription on {}", active.path);
    }
}

impl Drop for SubscriptionManager {
    fn drop(&mut self) {
        self.stop();
    }
}

fn deliver(live: &Mutex<bool>, callback: impl FnOnce()) -> bool {
    let live = live.lock().unwrap_or_else(PoisonError::into_inner);
    if !*live {
        return false;
    }
    callback();
    true
}
