//! Edit session for a single destination.
//!
//! A session moves through `Loading -> Ready -> Submitting -> Done`, or
//! `Loading -> LoadError`. Local edits only happen in `Ready` and never touch
//! the network; the two suspension points are the initial fetch and the
//! persist call.

use crate::api::DestinationApi;
use crate::destination::{Destination, DestinationPatch};
use crate::error::{ApiError, SessionError};
use crate::form::{FormField, FormFieldSet};
use crate::navigation::{Navigator, DESTINATION_LIST_PATH};
use crate::notify::{Notification, Notifier, Severity};
use crate::property_list::{ConfigMap, EntryId, PropertyField, PropertyListStore};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Loading,
    LoadError,
    Ready,
    Submitting,
    Done,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Loading => "loading",
            SessionState::LoadError => "in load error",
            SessionState::Ready => "ready",
            SessionState::Submitting => "submitting",
            SessionState::Done => "done",
        };
        f.write_str(s)
    }
}

/// Coarse view of the save control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStatus {
    Idle,
    Submitting,
    Settled,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Required fields missing; nothing was sent.
    Invalid,
    Saved(Destination),
    Failed { message: String },
    Cancelled,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorMode {
    #[default]
    Form,
    /// YAML editor. Not wired to persistence.
    Smart,
}

/// Minimum time a submit stays visibly busy before its result is acted on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LatencyPolicy {
    min_visible: Duration,
}

impl LatencyPolicy {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn at_least(min_visible: Duration) -> Self {
        Self { min_visible }
    }

    pub fn min_visible(&self) -> Duration {
        self.min_visible
    }

    /// Await `fut`, holding its output until the floor has elapsed.
    pub async fn settle<F: Future>(&self, fut: F) -> F::Output {
        if self.min_visible.is_zero() {
            return fut.await;
        }
        let (output, ()) = tokio::join!(fut, tokio::time::sleep(self.min_visible));
        output
    }
}

/// Everything a session calls out to.
#[derive(Clone)]
pub struct Collaborators {
    pub api: Arc<dyn DestinationApi>,
    pub notifier: Arc<dyn Notifier>,
    pub navigator: Arc<dyn Navigator>,
}

impl Collaborators {
    pub fn new(
        api: Arc<dyn DestinationApi>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            api,
            notifier,
            navigator,
        }
    }
}

/// A validated submit whose persist call has not been made yet.
pub(crate) struct PendingSubmit {
    id: String,
    patch: DestinationPatch,
    api: Arc<dyn DestinationApi>,
    latency: LatencyPolicy,
}

impl PendingSubmit {
    pub(crate) async fn persist(&self) -> Result<Destination, ApiError> {
        self.latency
            .settle(self.api.update(&self.id, &self.patch))
            .await
    }
}

pub struct EditSession {
    id: String,
    state: SessionState,
    snapshot: Option<Destination>,
    baseline: ConfigMap,
    load_error: Option<String>,
    outcome: Option<SubmitOutcome>,
    form: FormFieldSet,
    properties: PropertyListStore,
    mode: EditorMode,
    deps: Collaborators,
    latency: LatencyPolicy,
    list_path: String,
    torn_down: Arc<AtomicBool>,
}

impl fmt::Debug for EditSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditSession")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("form", &self.form)
            .field("properties", &self.properties.len())
            .finish_non_exhaustive()
    }
}

impl EditSession {
    /// Create a session in `Loading`. Call [`EditSession::load`] next.
    pub fn new(id: impl Into<String>, deps: Collaborators) -> Self {
        Self {
            id: id.into(),
            state: SessionState::Loading,
            snapshot: None,
            baseline: ConfigMap::new(),
            load_error: None,
            outcome: None,
            form: FormFieldSet::default(),
            properties: PropertyListStore::new(),
            mode: EditorMode::default(),
            deps,
            latency: LatencyPolicy::none(),
            list_path: DESTINATION_LIST_PATH.to_string(),
            torn_down: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_latency(mut self, latency: LatencyPolicy) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_list_path(mut self, path: impl Into<String>) -> Self {
        self.list_path = path.into();
        self
    }

    /// Create and load in one step.
    pub async fn open(id: impl Into<String>, deps: Collaborators) -> Self {
        let mut session = Self::new(id, deps);
        if let Err(e) = session.load().await {
            debug!(destination = %session.id, error = %e, "initial load skipped");
        }
        session
    }

    pub(crate) fn teardown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.torn_down)
    }

    fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::SeqCst)
    }

    fn require(&self, expected: SessionState, operation: &'static str) -> Result<(), SessionError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SessionError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn submission_status(&self) -> SubmissionStatus {
        match self.state {
            SessionState::Submitting => SubmissionStatus::Submitting,
            SessionState::Done => SubmissionStatus::Settled,
            _ => SubmissionStatus::Idle,
        }
    }

    /// True while the save control must be disabled.
    pub fn is_busy(&self) -> bool {
        self.state == SessionState::Submitting
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn outcome(&self) -> Option<&SubmitOutcome> {
        self.outcome.as_ref()
    }

    /// The record as it was loaded.
    pub fn destination(&self) -> Option<&Destination> {
        self.snapshot.as_ref()
    }

    pub fn form(&self) -> &FormFieldSet {
        &self.form
    }

    pub fn properties(&self) -> &PropertyListStore {
        &self.properties
    }

    pub fn editor_mode(&self) -> EditorMode {
        self.mode
    }

    pub fn list_path(&self) -> &str {
        &self.list_path
    }

    pub async fn load(&mut self) -> Result<(), SessionError> {
        self.require(SessionState::Loading, "load")?;
        debug!(destination = %self.id, "loading destination");

        let fetched = self.deps.api.fetch(&self.id).await;
        if self.is_torn_down() {
            debug!(destination = %self.id, "session closed during load, discarding result");
            return Ok(());
        }

        match fetched {
            Ok(destination) => {
                self.form = FormFieldSet::new(&destination.name, &destination.description);
                self.properties.seed(&destination.config);
                self.baseline = self.properties.to_mapping();
                info!(
                    destination = %self.id,
                    properties = self.properties.len(),
                    "destination loaded"
                );
                self.snapshot = Some(destination);
                self.state = SessionState::Ready;
            }
            Err(e) => {
                warn!(destination = %self.id, error = %e, "failed to load destination");
                self.load_error = Some(e.to_string());
                self.state = SessionState::LoadError;
            }
        }
        Ok(())
    }

    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) -> Result<(), SessionError> {
        self.require(SessionState::Ready, "set_field")?;
        self.form.set(field, value);
        Ok(())
    }

    pub fn add_property(&mut self) -> Result<EntryId, SessionError> {
        self.require(SessionState::Ready, "add_property")?;
        Ok(self.properties.add())
    }

    pub fn remove_property(&mut self, id: EntryId) -> Result<(), SessionError> {
        self.require(SessionState::Ready, "remove_property")?;
        self.properties.remove(id);
        Ok(())
    }

    pub fn update_property(
        &mut self,
        id: EntryId,
        field: PropertyField,
        value: impl Into<String>,
    ) -> Result<(), SessionError> {
        self.require(SessionState::Ready, "update_property")?;
        self.properties.update(id, field, value);
        Ok(())
    }

    pub fn set_editor_mode(&mut self, mode: EditorMode) -> Result<(), SessionError> {
        self.require(SessionState::Ready, "set_editor_mode")?;
        self.mode = mode;
        Ok(())
    }

    /// Whether the form or properties differ from what was loaded.
    pub fn has_unsaved_changes(&self) -> bool {
        let Some(snapshot) = &self.snapshot else {
            return false;
        };
        self.form.value(FormField::Name) != snapshot.name
            || self.form.value(FormField::Description) != snapshot.description
            || self.properties.to_mapping() != self.baseline
    }

    /// The request body a submit would send right now.
    pub fn patch(&self) -> DestinationPatch {
        DestinationPatch {
            name: self.form.value(FormField::Name).to_string(),
            description: self.form.value(FormField::Description).to_string(),
            config: self.properties.to_mapping(),
        }
    }

    /// Validate, persist, notify, then navigate to the list view.
    ///
    /// A missing name yields [`SubmitOutcome::Invalid`] and leaves the session
    /// in `Ready`. Otherwise the session ends in `Done` whether or not the
    /// persist call succeeded.
    pub async fn submit(&mut self) -> Result<SubmitOutcome, SessionError> {
        let Some(pending) = self.begin_submit()? else {
            return Ok(SubmitOutcome::Invalid);
        };
        let result = pending.persist().await;
        Ok(self.finish_submit(pending, result))
    }

    /// Validate and move to `Submitting`.
    ///
    /// Returns `None` when validation fails. The returned call borrows nothing
    /// from the session, so the session stays readable while it runs.
    pub(crate) fn begin_submit(&mut self) -> Result<Option<PendingSubmit>, SessionError> {
        self.require(SessionState::Ready, "submit")?;
        if !self.form.validate() {
            debug!(destination = %self.id, "submit rejected by validation");
            return Ok(None);
        }

        let patch = self.patch();
        self.state = SessionState::Submitting;
        info!(destination = %self.id, properties = patch.config.len(), "submitting destination");

        Ok(Some(PendingSubmit {
            id: self.id.clone(),
            patch,
            api: Arc::clone(&self.deps.api),
            latency: self.latency,
        }))
    }

    /// Record the persist result, then notify and navigate unless torn down.
    pub(crate) fn finish_submit(
        &mut self,
        pending: PendingSubmit,
        result: Result<Destination, ApiError>,
    ) -> SubmitOutcome {
        let (outcome, notification) = match result {
            Ok(updated) => {
                info!(destination = %self.id, name = %updated.name, "destination saved");
                let notification = Notification::new(
                    Severity::Success,
                    "Edit successful",
                    format!("Destination \"{}\" edited successfully.", updated.name),
                );
                (SubmitOutcome::Saved(updated), notification)
            }
            Err(e) => {
                warn!(destination = %self.id, error = %e, code = e.code_str(), "destination save failed");
                let notification = Notification::new(
                    Severity::Danger,
                    "Edit failed",
                    format!("Failed to edit {}: {}", pending.patch.name, e),
                );
                (
                    SubmitOutcome::Failed {
                        message: e.to_string(),
                    },
                    notification,
                )
            }
        };

        self.state = SessionState::Done;
        self.outcome = Some(outcome.clone());

        if self.is_torn_down() {
            debug!(destination = %self.id, "session closed during submit, discarding result");
            return outcome;
        }

        self.deps.notifier.notify(notification);
        self.deps.navigator.go_to(&self.list_path);
        outcome
    }

    /// Leave without saving.
    pub fn cancel(&mut self) -> Result<(), SessionError> {
        if !matches!(self.state, SessionState::Ready | SessionState::LoadError) {
            return Err(SessionError::InvalidState {
                operation: "cancel",
                state: self.state,
            });
        }
        self.state = SessionState::Done;
        self.outcome = Some(SubmitOutcome::Cancelled);
        self.deps.navigator.go_to(&self.list_path);
        Ok(())
    }
}
