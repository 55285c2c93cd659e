// src/lib.rs
//! Core library for Stage: editing a destination connector's configuration.
//!
//! The pieces compose as follows: an [`EditSession`] loads a [`Destination`]
//! through a [`DestinationApi`], seeds a [`PropertyListStore`] and the form
//! fields from it, and on submit persists the edit, reports the outcome to a
//! [`Notifier`] and returns to the list view through a [`Navigator`].
//! [`SessionHandle`] runs a session on its own task for UIs that talk to it
//! by message.

pub mod actor;
pub mod api;
pub mod config;
pub mod destination;
pub mod error;
pub mod form;
pub mod navigation;
pub mod notify;
pub mod property_list;
pub mod session;

pub use actor::{SessionHandle, SessionView};
pub use api::{DestinationApi, HttpDestinationApi, MemoryDestinationApi};
pub use config::{ConfigStore, ConsoleConfig};
pub use destination::{connector_display_name, Destination, DestinationPatch};
pub use error::{ApiError, ConfigError, SessionError};
pub use form::{FormField, FormFieldSet};
pub use navigation::{Navigator, RecordingNavigator, DESTINATION_LIST_PATH};
pub use notify::{MemoryNotifier, Notification, Notifier, Severity, TracingNotifier};
pub use property_list::{ConfigMap, EntryId, PropertyEntry, PropertyField, PropertyListStore};
pub use session::{
    Collaborators, EditSession, EditorMode, LatencyPolicy, SessionState, SubmissionStatus,
    SubmitOutcome,
};
