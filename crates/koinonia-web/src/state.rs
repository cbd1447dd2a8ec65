//! Application state.

use koinonia_db::DbPool;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Refresh signals pushed to connected dashboards after mutations.
#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(tag = "type", content = "data")]
pub enum RefreshMessage {
    ConvertsChanged { tenant_id: String },
    AlertsChanged { tenant_id: String },
    DashboardRefresh { tenant_id: String },
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub tx: broadcast::Sender<RefreshMessage>,
}

impl AppState {
    pub fn new(db: Arc<DbPool>) -> Self {
        let (tx, _rx) = broadcast::channel(100);
        Self { db, tx }
    }

    /// Broadcast a refresh signal to all WebSocket clients.
    pub fn broadcast(&self, msg: RefreshMessage) {
        let _ = self.tx.send(msg);
    }
}
