//! Debounced, single-flight auto-save for the request editor.
//!
//! Edits are folded into one pending [`RequestChanges`]. Once no edit has
//! arrived for the debounce window the batch is sent. At most one save per
//! record is in flight; edits made meanwhile wait for the next save.
//! [`AutoSaver::close`] flushes anything still pending before returning.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use echo_core::types::Timestamp;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::api::EchoApi;
use crate::error::ClientError;
use crate::types::RequestChanges;

/// Persists a batch of editor changes for one request.
#[async_trait]
pub trait Saver: Send + Sync + 'static {
    async fn save(&self, request_id: &str, changes: &RequestChanges) -> Result<(), ClientError>;
}

#[async_trait]
impl Saver for EchoApi {
    async fn save(&self, request_id: &str, changes: &RequestChanges) -> Result<(), ClientError> {
        self.update_request(request_id, changes).await.map(|_| ())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SaveState {
    #[default]
    Clean,
    Dirty,
    Saving,
}

/// Snapshot published after every state change.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SaveStatus {
    pub state: SaveState,
    /// Completion time of the last save attempt, successful or not.
    pub last_saved: Option<Timestamp>,
    /// Error of the last save attempt; cleared by the next success.
    pub last_error: Option<String>,
    /// Number of save attempts so far.
    pub saves: u64,
}

impl SaveStatus {
    /// Editor footer text.
    pub fn indicator(&self) -> Option<String> {
        if self.state == SaveState::Saving {
            return Some("Saving...".to_string());
        }
        self.last_saved
            .map(|at| format!("Last saved {}", at.format("%H:%M:%S")))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AutoSaveError {
    #[error("Auto-saver has shut down")]
    Closed,

    #[error("Auto-saver task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

enum Command {
    Edit(RequestChanges),
    Close,
}

/// Handle to the background save loop of one request.
pub struct AutoSaver {
    request_id: String,
    commands: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<SaveStatus>,
    task: JoinHandle<()>,
}

impl AutoSaver {
    pub fn spawn<S: Saver>(saver: Arc<S>, request_id: impl Into<String>, debounce: Duration) -> Self {
        let request_id = request_id.into();
        let (commands, commands_rx) = mpsc::unbounded_channel();
        let (status_tx, status) = watch::channel(SaveStatus::default());

        let worker = Worker {
            saver,
            request_id: request_id.clone(),
            debounce,
            commands: commands_rx,
            status: status_tx,
            pending: None,
            deadline: None,
            closing: false,
        };
        let task = tokio::spawn(worker.run());

        Self {
            request_id,
            commands,
            status,
            task,
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Record an edit. Empty change sets are ignored.
    pub fn edit(&self, changes: RequestChanges) -> Result<(), AutoSaveError> {
        if changes.is_empty() {
            return Ok(());
        }
        self.commands
            .send(Command::Edit(changes))
            .map_err(|_| AutoSaveError::Closed)
    }

    pub fn status(&self) -> SaveStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.status.clone()
    }

    /// Stop the loop. Pending changes get one save attempt first, after any
    /// in-flight save has finished.
    pub async fn close(self) -> Result<SaveStatus, AutoSaveError> {
        // A send error means the loop already exited; joining still reports
        // how it ended.
        let _ = self.commands.send(Command::Close);
        self.task.await?;
        let status = self.status.borrow().clone();
        Ok(status)
    }
}

struct Worker<S> {
    saver: Arc<S>,
    request_id: String,
    debounce: Duration,
    commands: mpsc::UnboundedReceiver<Command>,
    status: watch::Sender<SaveStatus>,
    pending: Option<RequestChanges>,
    deadline: Option<Instant>,
    closing: bool,
}

impl<S: Saver> Worker<S> {
    async fn run(mut self) {
        while !self.closing {
            let deadline = self.deadline;
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Edit(changes)) => self.queue(changes),
                    Some(Command::Close) | None => self.closing = true,
                },
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)),
                    if deadline.is_some() => self.flush().await,
            }
        }

        if self.pending.is_some() {
            self.flush().await;
        }
        tracing::debug!(request_id = %self.request_id, "Auto-saver stopped");
    }

    fn queue(&mut self, changes: RequestChanges) {
        match &mut self.pending {
            Some(pending) => pending.merge(changes),
            None => self.pending = Some(changes),
        }
        self.deadline = Some(Instant::now() + self.debounce);
        self.status.send_modify(|s| {
            if s.state != SaveState::Saving {
                s.state = SaveState::Dirty;
            }
        });
    }

    async fn flush(&mut self) {
        self.deadline = None;
        let Some(batch) = self.pending.take() else {
            return;
        };
        self.status.send_modify(|s| s.state = SaveState::Saving);

        let saver = Arc::clone(&self.saver);
        let request_id = self.request_id.clone();
        let save = async move { saver.save(&request_id, &batch).await };
        tokio::pin!(save);

        // Keep accepting edits while the save runs; they form the next batch.
        let result = loop {
            tokio::select! {
                result = &mut save => break result,
                command = self.commands.recv(), if !self.closing => match command {
                    Some(Command::Edit(changes)) => self.queue(changes),
                    Some(Command::Close) | None => self.closing = true,
                },
            }
        };

        let last_error = match result {
            Ok(()) => {
                tracing::debug!(request_id = %self.request_id, "Auto-saved request");
                None
            }
            Err(e) => {
                tracing::warn!(request_id = %self.request_id, error = %e, "Auto-save failed");
                Some(e.to_string())
            }
        };
        let queued = self.pending.is_some();
        self.status.send_modify(|s| {
            s.state = if queued {
                SaveState::Dirty
            } else {
                SaveState::Clean
            };
            s.last_saved = Some(Utc::now());
            s.last_error = last_error;
            s.saves += 1;
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use echo_core::request::{Priority, Status};
    use tokio::time::sleep;

    use super::*;

    const DEBOUNCE: Duration = Duration::from_millis(1000);

    #[derive(Default)]
    struct RecordingSaver {
        calls: Mutex<Vec<RequestChanges>>,
        delay: Duration,
        failures_left: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl RecordingSaver {
        fn slow(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                delay,
                ..Default::default()
            })
        }

        fn calls(&self) -> Vec<RequestChanges> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Saver for RecordingSaver {
        async fn save(&self, _id: &str, changes: &RequestChanges) -> Result<(), ClientError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            self.calls.lock().unwrap().push(changes.clone());
            sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            let failing = self
                .failures_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if failing {
                return Err(ClientError::Api {
                    status: 500,
                    body: "boom".into(),
                });
            }
            Ok(())
        }
    }

    fn title(t: &str) -> RequestChanges {
        RequestChanges {
            title: Some(t.into()),
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn edits_within_window_are_saved_once() {
        let saver = Arc::new(RecordingSaver::default());
        let autosaver = AutoSaver::spawn(saver.clone(), "REQ-001", DEBOUNCE);

        autosaver.edit(title("Draft")).unwrap();
        sleep(Duration::from_millis(500)).await;
        assert_eq!(autosaver.status().state, SaveState::Dirty);

        autosaver
            .edit(RequestChanges {
                priority: Some(Priority::High),
                ..Default::default()
            })
            .unwrap();
        sleep(Duration::from_millis(900)).await;
        assert!(saver.calls().is_empty(), "window restarts on every edit");

        sleep(Duration::from_millis(200)).await;
        let calls = saver.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].title.as_deref(), Some("Draft"));
        assert_eq!(calls[0].priority, Some(Priority::High));

        let status = autosaver.status();
        assert_eq!(status.state, SaveState::Clean);
        assert!(status.last_saved.is_some());
        assert_eq!(status.last_error, None);
    }

    #[tokio::test(start_paused = true)]
    async fn edit_during_save_waits_for_follow_up() {
        let saver = RecordingSaver::slow(Duration::from_millis(300));
        let autosaver = AutoSaver::spawn(saver.clone(), "REQ-001", DEBOUNCE);

        autosaver.edit(title("A")).unwrap();
        sleep(Duration::from_millis(1100)).await;
        assert_eq!(autosaver.status().state, SaveState::Saving);
        assert_eq!(autosaver.status().indicator().as_deref(), Some("Saving..."));

        autosaver
            .edit(RequestChanges {
                status: Some(Status::InReview),
                ..Default::default()
            })
            .unwrap();
        sleep(Duration::from_millis(300)).await;
        assert_eq!(saver.calls().len(), 1);
        assert_eq!(autosaver.status().state, SaveState::Dirty);

        sleep(Duration::from_secs(3)).await;
        let calls = saver.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].status, Some(Status::InReview));
        assert_eq!(calls[1].title, None);
        assert_eq!(saver.max_in_flight.load(Ordering::SeqCst), 1);
        assert_eq!(autosaver.status().state, SaveState::Clean);
        assert_eq!(autosaver.status().saves, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn close_flushes_pending_changes() {
        let saver = Arc::new(RecordingSaver::default());
        let autosaver = AutoSaver::spawn(saver.clone(), "REQ-001", DEBOUNCE);

        autosaver.edit(title("Unsaved")).unwrap();
        let status = autosaver.close().await.unwrap();

        assert_eq!(saver.calls(), vec![title("Unsaved")]);
        assert_eq!(status.state, SaveState::Clean);
    }

    #[tokio::test(start_paused = true)]
    async fn close_when_clean_does_not_save() {
        let saver = Arc::new(RecordingSaver::default());
        let autosaver = AutoSaver::spawn(saver.clone(), "REQ-001", DEBOUNCE);

        autosaver.edit(RequestChanges::default()).unwrap();
        let status = autosaver.close().await.unwrap();

        assert!(saver.calls().is_empty());
        assert_eq!(status, SaveStatus::default());
        assert_eq!(status.indicator(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn close_during_save_saves_queued_edit_afterwards() {
        let saver = RecordingSaver::slow(Duration::from_millis(300));
        let autosaver = AutoSaver::spawn(saver.clone(), "REQ-001", DEBOUNCE);

        autosaver.edit(title("A")).unwrap();
        sleep(Duration::from_millis(1100)).await;
        autosaver.edit(title("B")).unwrap();

        let started = Instant::now();
        let status = autosaver.close().await.unwrap();

        assert_eq!(saver.calls(), vec![title("A"), title("B")]);
        assert_eq!(saver.max_in_flight.load(Ordering::SeqCst), 1);
        // Remaining 200ms of the first save plus the second; no debounce wait.
        assert_eq!(started.elapsed(), Duration::from_millis(500));
        assert_eq!(status.state, SaveState::Clean);
        assert_eq!(status.saves, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_save_returns_to_clean_with_error() {
        let saver = Arc::new(RecordingSaver {
            failures_left: AtomicUsize::new(1),
            ..Default::default()
        });
        let autosaver = AutoSaver::spawn(saver.clone(), "REQ-001", DEBOUNCE);

        autosaver.edit(title("A")).unwrap();
        sleep(Duration::from_millis(1100)).await;

        let status = autosaver.status();
        assert_eq!(status.state, SaveState::Clean);
        assert!(status.last_saved.is_some());
        assert!(status.last_error.as_deref().unwrap().contains("boom"));

        autosaver.edit(title("A again")).unwrap();
        sleep(Duration::from_millis(1100)).await;

        let status = autosaver.status();
        assert_eq!(status.last_error, None);
        assert_eq!(saver.calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_see_state_changes() {
        let saver = Arc::new(RecordingSaver::default());
        let autosaver = AutoSaver::spawn(saver, "REQ-001", DEBOUNCE);
        let mut updates = autosaver.subscribe();

        autosaver.edit(title("A")).unwrap();
        updates.changed().await.unwrap();
        assert_eq!(updates.borrow_and_update().state, SaveState::Dirty);

        autosaver.close().await.unwrap();
        assert_eq!(updates.borrow().state, SaveState::Clean);
    }
}
