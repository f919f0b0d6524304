//! Live Demo session registry.
//!
//! One session per open demo page. Sessions idle past the TTL are torn down by
//! a periodic sweep so abandoned pages don't keep previews alive.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::demo::{DemoSession, SharedSession};
use crate::error::DemoError;

/// All live demo sessions.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, SharedSession>>,
    ttl: Duration,
}

impl SessionRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Open a new session.
    pub async fn create(&self) -> SharedSession {
        let session = DemoSession::new();
        let id = session.id();
        let shared = Arc::new(Mutex::new(session));
        self.sessions.write().await.insert(id, Arc::clone(&shared));
        tracing::debug!(session = %id, "Opened demo session");
        shared
    }

    pub async fn get(&self, id: Uuid) -> Result<SharedSession, DemoError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(DemoError::SessionNotFound { id })
    }

    /// Tear down and forget a session. Returns `true` if it existed.
    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id);
        match removed {
            Some(session) => {
                session.lock().await.teardown();
                tracing::debug!(session = %id, "Closed demo session");
                true
            }
            None => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Tear down sessions idle for longer than the TTL. Sessions that are busy
    /// (locked or generating) are left for the next sweep.
    pub async fn sweep_expired(&self) -> usize {
        let expired: Vec<(Uuid, SharedSession)> = {
            let sessions = self.sessions.read().await;
            sessions
                .iter()
                .filter(|(_, session)| {
                    session
                        .try_lock()
                        .map(|s| !s.is_generating() && s.idle_for() > self.ttl)
                        .unwrap_or(false)
                })
                .map(|(id, session)| (*id, Arc::clone(session)))
                .collect()
        };

        if expired.is_empty() {
            return 0;
        }

        {
            let mut sessions = self.sessions.write().await;
            for (id, _) in &expired {
                sessions.remove(id);
            }
        }
        for (_, session) in &expired {
            session.lock().await.teardown();
        }
        tracing::info!(count = expired.len(), "Expired idle demo sessions");
        expired.len()
    }

    /// Run `sweep_expired` every `interval` until the task is aborted.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let registry = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                registry.sweep_expired().await;
            }
        })
    }
}
