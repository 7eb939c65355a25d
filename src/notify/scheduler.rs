use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

use crate::db::repository::EnabledPrayers;
use crate::models::Permission;
use crate::notify::worker::{Worker, WorkerStats};

/// Messages from the foreground to the notification worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerMessage {
    /// Snapshot of the state the worker needs to decide what to fire
    #[serde(rename_all = "camelCase")]
    Schedule {
        city: String,
        enabled_prayers: EnabledPrayers,
    },
}

/// Foreground half of the notification handshake. Each tick hands the
/// current city and toggles to the worker; nothing comes back.
#[derive(Debug, Clone)]
pub struct Scheduler {
    tx: Sender<WorkerMessage>,
}

impl Scheduler {
    pub fn new(tx: Sender<WorkerMessage>) -> Self {
        Self { tx }
    }

    /// Start the worker on its own thread and return the handle that feeds it.
    /// The thread is detached.
    pub fn spawn(worker: Worker) -> Self {
        Self::start(worker).0
    }

    /// Like [`Scheduler::spawn`], also returning the worker thread. It exits
    /// once every clone of the scheduler is dropped.
    pub fn start(worker: Worker) -> (Self, JoinHandle<WorkerStats>) {
        let (tx, rx) = mpsc::channel();
        let handle = thread::spawn(move || worker.run(rx));
        (Self::new(tx), handle)
    }

    /// Send a snapshot if notifications are allowed. Returns whether a
    /// message went out.
    pub fn tick(&self, permission: Permission, city: &str, enabled: &EnabledPrayers) -> bool {
        if permission != Permission::Granted {
            return false;
        }
        let message = WorkerMessage::Schedule {
            city: city.to_string(),
            enabled_prayers: enabled.clone(),
        };
        debug!("Scheduling notifications for {city}");
        if self.tx.send(message).is_err() {
            warn!("Notification worker is gone; dropping schedule");
            return false;
        }
        true
    }
}
