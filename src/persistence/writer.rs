//! Write-behind snapshot queue.
//!
//! Mutation handlers never wait on disk: they enqueue a job and move on to
//! the broadcast. A single writer task drains the queue and overwrites the
//! target file in full. If the queue is full the job is dropped with a
//! warning; every write is a full overwrite, so a later job of the same
//! kind supersedes a dropped one.

use crate::domain::entities::Account;
use crate::persistence::snapshot::{
    self, ProgramStateSnapshot, SettingsSnapshot, ACCOUNTS_FILE, INPUTS_FILE, PROGRAM_STATE_FILE,
};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

const QUEUE_CAPACITY: usize = 64;

#[derive(Debug)]
pub enum SnapshotJob {
    Accounts(Vec<Account>),
    Inputs(SettingsSnapshot),
    ProgramState(ProgramStateSnapshot),
}

impl SnapshotJob {
    fn file_name(&self) -> &'static str {
        match self {
            SnapshotJob::Accounts(_) => ACCOUNTS_FILE,
            SnapshotJob::Inputs(_) => INPUTS_FILE,
            SnapshotJob::ProgramState(_) => PROGRAM_STATE_FILE,
        }
    }
}

#[derive(Clone)]
pub struct SnapshotWriter {
    tx: mpsc::Sender<SnapshotJob>,
}

impl SnapshotWriter {
    /// Spawn the writer task for the given snapshot directory.
    pub fn spawn(dir: PathBuf) -> Self {
        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
        tokio::spawn(drain(dir, rx));
        SnapshotWriter { tx }
    }

    /// Non-blocking enqueue; a full queue drops the job.
    pub fn enqueue(&self, job: SnapshotJob) {
        let file = job.file_name();
        if self.tx.try_send(job).is_err() {
            warn!("snapshot queue full, dropping {} write", file);
        }
    }

    pub fn accounts(&self, accounts: Vec<Account>) {
        self.enqueue(SnapshotJob::Accounts(accounts));
    }

    pub fn inputs(&self, settings: SettingsSnapshot) {
        self.enqueue(SnapshotJob::Inputs(settings));
    }

    pub fn program_state(&self, running: bool) {
        self.enqueue(SnapshotJob::ProgramState(ProgramStateSnapshot { running }));
    }
}

async fn drain(dir: PathBuf, mut rx: mpsc::Receiver<SnapshotJob>) {
    while let Some(job) = rx.recv().await {
        let path = dir.join(job.file_name());
        let result = match &job {
            SnapshotJob::Accounts(accounts) => snapshot::write_json(&path, accounts).await,
            SnapshotJob::Inputs(settings) => snapshot::write_json(&path, settings).await,
            SnapshotJob::ProgramState(state) => snapshot::write_json(&path, state).await,
        };
        match result {
            Ok(()) => debug!("snapshot written: {}", path.display()),
            // The mutation already succeeded in memory; the failure stops here.
            Err(e) => error!("snapshot write failed for {}: {}", path.display(), e),
        }
    }
}
