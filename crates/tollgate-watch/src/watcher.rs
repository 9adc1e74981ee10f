//! Per-connection entity watchers.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::{ServiceEvent, WatchedService};

/// Which service backs a strategy's principals, and which record field
/// identifies one.
///
/// Resolved from the registry entry of the strategy used at login, and
/// held by the connection for as long as it stays authenticated.
#[derive(Clone)]
pub struct WatcherBinding {
    service: Arc<dyn WatchedService>,
    id_field: String,
}

impl WatcherBinding {
    pub fn new(service: Arc<dyn WatchedService>, id_field: impl Into<String>) -> Self {
        Self {
            service,
            id_field: id_field.into(),
        }
    }

    /// The bound service.
    pub fn service(&self) -> &Arc<dyn WatchedService> {
        &self.service
    }

    /// The record field that identifies a principal (e.g. `"id"`).
    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    /// The bound service's mount path.
    pub fn path(&self) -> &str {
        self.service.path()
    }
}

impl fmt::Debug for WatcherBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatcherBinding")
            .field("path", &self.path())
            .field("id_field", &self.id_field)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// EntityWatcher
// ---------------------------------------------------------------------------

/// A live subscription tying one connection to one entity's changes.
///
/// Registration spawns a task that reads the bound service's feed, drops
/// everything that isn't about the watched entity, and forwards the rest
/// to the session. The task ends when the feed closes, when the session
/// side of the forward channel is gone, or when the watcher is
/// unregistered (re-login, logout, disconnect).
///
/// Dropping the watcher aborts the task, so a session that exits without
/// an explicit unregister still can't leak its subscription.
pub struct EntityWatcher {
    path: String,
    id_field: String,
    entity_id: Value,
    task: JoinHandle<()>,
}

impl EntityWatcher {
    /// Subscribes to the binding's service and starts filtering for
    /// `entity_id`. Matching events are forwarded through `forward`.
    pub fn register(
        binding: &WatcherBinding,
        entity_id: Value,
        forward: mpsc::UnboundedSender<ServiceEvent>,
    ) -> Self {
        let mut feed = binding.service().subscribe();
        let path = binding.path().to_string();
        let id_field = binding.id_field().to_string();
        let target = entity_id.clone();

        let task = tokio::spawn({
            let path = path.clone();
            let id_field = id_field.clone();
            async move {
                loop {
                    match feed.recv().await {
                        Ok(event) => {
                            if event.record.get(&id_field) != Some(&target) {
                                continue;
                            }
                            if forward.send(event).is_err() {
                                // Session task is gone.
                                break;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            tracing::warn!(
                                service = %path,
                                missed,
                                "entity feed lagged, change events dropped"
                            );
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            }
        });

        tracing::debug!(service = %path, entity = %entity_id, "entity watcher registered");

        Self {
            path,
            id_field,
            entity_id,
            task,
        }
    }

    /// The watched service's mount path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The record field the watcher matches on.
    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    /// The entity id captured at registration.
    pub fn entity_id(&self) -> &Value {
        &self.entity_id
    }

    /// Tears the subscription down. Consumes the watcher; the filter task
    /// is aborted on drop.
    pub fn unregister(self) {
        tracing::debug!(service = %self.path, entity = %self.entity_id, "entity watcher unregistered");
    }
}

impl Drop for EntityWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl fmt::Debug for EntityWatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityWatcher")
            .field("path", &self.path)
            .field("id_field", &self.id_field)
            .field("entity_id", &self.entity_id)
            .finish()
    }
}

// =========================================================================
// Tests
// =========================================================================
