//! Runs an [`EditSession`] on its own task and drives it through messages.
//!
//! The task loads the destination first, so any command sent while the load
//! is in flight waits in the queue until the session is `Ready` or
//! `LoadError`. While a submit is persisting, the task keeps answering
//! commands: views report `Submitting`, and edits or a second submit are
//! rejected. Dropping every [`SessionHandle`] tears the session down: an
//! operation already in flight finishes, but its result is discarded without
//! notifying or navigating.

use crate::destination::{Destination, DestinationPatch};
use crate::error::SessionError;
use crate::form::FormField;
use crate::property_list::{ConfigMap, EntryId, PropertyField};
use crate::session::{EditSession, EditorMode, SessionState, SubmissionStatus, SubmitOutcome};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

const COMMAND_BUFFER: usize = 32;

/// Read-only copy of the session for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub state: SessionState,
    pub destination: Option<Destination>,
    pub load_error: Option<String>,
    pub name: String,
    pub name_error: Option<String>,
    pub description: String,
    pub properties: Vec<(EntryId, String, String)>,
    pub editor_mode: EditorMode,
    pub status: SubmissionStatus,
    pub busy: bool,
    pub unsaved_changes: bool,
}

impl SessionView {
    fn capture(session: &EditSession) -> Self {
        let form = session.form();
        Self {
            state: session.state(),
            destination: session.destination().cloned(),
            load_error: session.load_error().map(str::to_string),
            name: form.value(FormField::Name).to_string(),
            name_error: form.error(FormField::Name).map(str::to_string),
            description: form.value(FormField::Description).to_string(),
            properties: session
                .properties()
                .entries()
                .map(|e| (e.id, e.key.to_string(), e.value.to_string()))
                .collect(),
            editor_mode: session.editor_mode(),
            status: session.submission_status(),
            busy: session.is_busy(),
            unsaved_changes: session.has_unsaved_changes(),
        }
    }
}

type Reply<T> = oneshot::Sender<Result<T, SessionError>>;

enum Command {
    View(oneshot::Sender<SessionView>),
    Mapping(oneshot::Sender<ConfigMap>),
    Patch(oneshot::Sender<DestinationPatch>),
    SetField(FormField, String, Reply<()>),
    Add(Reply<EntryId>),
    Remove(EntryId, Reply<()>),
    Update(EntryId, PropertyField, String, Reply<()>),
    SetMode(EditorMode, Reply<()>),
    Submit(Reply<SubmitOutcome>),
    Cancel(Reply<()>),
}

struct TeardownGuard(Arc<AtomicBool>);

impl Drop for TeardownGuard {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Cloneable handle to a session running on a tokio task.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<Command>,
    _guard: Arc<TeardownGuard>,
}

impl SessionHandle {
    /// Spawn `session` (expected in `Loading`) and start loading it.
    ///
    /// The join handle resolves to the session once every handle is dropped.
    pub fn spawn(session: EditSession) -> (Self, JoinHandle<EditSession>) {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let guard = Arc::new(TeardownGuard(session.teardown_flag()));
        let task = tokio::spawn(run(session, rx));
        (Self { tx, _guard: guard }, task)
    }

    async fn call<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    pub async fn view(&self) -> Result<SessionView, SessionError> {
        self.call(Command::View).await
    }

    pub async fn to_mapping(&self) -> Result<ConfigMap, SessionError> {
        self.call(Command::Mapping).await
    }

    pub async fn patch(&self) -> Result<DestinationPatch, SessionError> {
        self.call(Command::Patch).await
    }

    pub async fn set_field(&self, field: FormField, value: impl Into<String>) -> Result<(), SessionError> {
        let value = value.into();
        self.call(|r| Command::SetField(field, value, r)).await?
    }

    pub async fn add(&self) -> Result<EntryId, SessionError> {
        self.call(Command::Add).await?
    }

    pub async fn remove(&self, id: EntryId) -> Result<(), SessionError> {
        self.call(|r| Command::Remove(id, r)).await?
    }

    pub async fn update(
        &self,
        id: EntryId,
        field: PropertyField,
        value: impl Into<String>,
    ) -> Result<(), SessionError> {
        let value = value.into();
        self.call(|r| Command::Update(id, field, value, r)).await?
    }

    pub async fn set_editor_mode(&self, mode: EditorMode) -> Result<(), SessionError> {
        self.call(|r| Command::SetMode(mode, r)).await?
    }

    pub async fn submit(&self) -> Result<SubmitOutcome, SessionError> {
        self.call(Command::Submit).await?
    }

    pub async fn cancel(&self) -> Result<(), SessionError> {
        self.call(Command::Cancel).await?
    }
}

async fn run(mut session: EditSession, mut rx: mpsc::Receiver<Command>) -> EditSession {
    if session.state() == SessionState::Loading {
        if let Err(e) = session.load().await {
            debug!(destination = %session.id(), error = %e, "initial load skipped");
        }
    }

    while let Some(command) = rx.recv().await {
        if let Some(reply) = serve(&mut session, command) {
            let result = submit(&mut session, &mut rx).await;
            let _ = reply.send(result);
        }
    }

    debug!(destination = %session.id(), state = %session.state(), "edit session closed");
    session
}

/// Persist a submit while still answering commands sent in the meantime.
async fn submit(
    session: &mut EditSession,
    rx: &mut mpsc::Receiver<Command>,
) -> Result<SubmitOutcome, SessionError> {
    let Some(pending) = session.begin_submit()? else {
        return Ok(SubmitOutcome::Invalid);
    };

    let result = {
        let persist = pending.persist();
        tokio::pin!(persist);
        loop {
            tokio::select! {
                result = &mut persist => break result,
                Some(command) = rx.recv() => {
                    if let Some(reply) = serve(session, command) {
                        let _ = reply.send(Err(SessionError::InvalidState {
                            operation: "submit",
                            state: session.state(),
                        }));
                    }
                }
            }
        }
    };

    Ok(session.finish_submit(pending, result))
}

/// Answer every command that completes without waiting. A submit is handed
/// back to the caller.
fn serve(session: &mut EditSession, command: Command) -> Option<Reply<SubmitOutcome>> {
    // Send errors mean the caller went away; the result is dropped.
    match command {
        Command::View(reply) => {
            let _ = reply.send(SessionView::capture(session));
        }
        Command::Mapping(reply) => {
            let _ = reply.send(session.properties().to_mapping());
        }
        Command::Patch(reply) => {
            let _ = reply.send(session.patch());
        }
        Command::SetField(field, value, reply) => {
            let _ = reply.send(session.set_field(field, value));
        }
        Command::Add(reply) => {
            let _ = reply.send(session.add_property());
        }
        Command::Remove(id, reply) => {
            let _ = reply.send(session.remove_property(id));
        }
        Command::Update(id, field, value, reply) => {
            let _ = reply.send(session.update_property(id, field, value));
        }
        Command::SetMode(mode, reply) => {
            let _ = reply.send(session.set_editor_mode(mode));
        }
        Command::Cancel(reply) => {
            let _ = reply.send(session.cancel());
        }
        Command::Submit(reply) => return Some(reply),
    }
    None
}
