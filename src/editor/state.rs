//! Editor state machine.

use std::sync::Arc;

use thiserror::Error;

use crate::cache::ConfigEvents;
use crate::editor::session::{EditSession, EditorEntry};
use crate::form::{DefaultFieldSet, FormConfiguration, FormName, StoredConfiguration};
use crate::store::{ConfigStore, StoreError};

/// Errors raised by editor operations.
#[derive(Debug, Error)]
pub enum EditorError {
    /// The operation needs an open editing session.
    #[error("No editing session is open")]
    NotOpen,

    /// A session for another form is still active.
    #[error("Editor is busy with {open}; cannot open {requested}")]
    OtherFormOpen { open: FormName, requested: FormName },

    /// A move referenced a row that does not exist.
    #[error("Index {index} is out of range for {len} fields")]
    IndexOutOfRange { index: usize, len: usize },

    /// The document could not be encoded.
    #[error("Failed to encode configuration: {0}")]
    Encode(#[from] serde_json::Error),

    /// Persisting the document failed; the session is kept.
    #[error("Failed to save configuration: {0}")]
    Save(#[from] StoreError),
}

/// Where the editor currently is.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorState {
    Closed,
    Open(EditSession),
    Saving(EditSession),
    /// Last save failed; the message is shown to the operator.
    SaveFailed { session: EditSession, error: String },
}

/// Interactive reordering of one form's fields.
pub struct ConfigEditor {
    store: Arc<dyn ConfigStore>,
    events: ConfigEvents,
    state: EditorState,
}

impl ConfigEditor {
    pub fn new(store: Arc<dyn ConfigStore>, events: ConfigEvents) -> Self {
        Self {
            store,
            events,
            state: EditorState::Closed,
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, EditorState::Closed)
    }

    /// Start a session from the effective order of `defaults` under `config`.
    ///
    /// Opening the same form while a session is active keeps the active
    /// session; the snapshot is never silently retaken mid-edit. Opening a
    /// different form fails until the active session is saved or cancelled.
    pub fn open(
        &mut self,
        defaults: &DefaultFieldSet,
        config: Option<&FormConfiguration>,
    ) -> Result<(), EditorError> {
        if let Some(active) = self.session() {
            if active.form() != defaults.form() {
                tracing::warn!(
                    open = %active.form(),
                    requested = %defaults.form(),
                    "Editor busy with another form"
                );
                return Err(EditorError::OtherFormOpen {
                    open: active.form().clone(),
                    requested: defaults.form().clone(),
                });
            }
            tracing::debug!(form = %defaults.form(), "Editor already open, keeping session");
            return Ok(());
        }
        let session = EditSession::snapshot(defaults, config);
        tracing::debug!(form = %session.form(), fields = session.entries().len(), "Editor opened");
        self.state = EditorState::Open(session);
        Ok(())
    }

    /// Rows in their current local order.
    pub fn entries(&self) -> Option<&[EditorEntry]> {
        self.session().map(|s| s.entries())
    }

    /// Last save error, if the editor is in the failed state.
    pub fn last_error(&self) -> Option<&str> {
        match &self.state {
            EditorState::SaveFailed { error, .. } => Some(error.as_str()),
            _ => None,
        }
    }

    pub fn move_up(&mut self, index: usize) -> Result<(), EditorError> {
        let session = self.editable_session(index)?;
        session.move_up(index);
        Ok(())
    }

    pub fn move_down(&mut self, index: usize) -> Result<(), EditorError> {
        let session = self.editable_session(index)?;
        session.move_down(index);
        Ok(())
    }

    /// Persist the current order as a full replacement document.
    ///
    /// On success the editor closes and an `Updated` event is published.
    /// On failure the session moves to `SaveFailed` and stays editable.
    pub async fn save(&mut self) -> Result<StoredConfiguration, EditorError> {
        let session = match std::mem::replace(&mut self.state, EditorState::Closed) {
            EditorState::Open(session)
            | EditorState::Saving(session)
            | EditorState::SaveFailed { session, .. } => session,
            EditorState::Closed => return Err(EditorError::NotOpen),
        };

        let form = session.form().clone();
        let document = match session.to_configuration().to_document() {
            Ok(document) => document,
            Err(e) => {
                self.state = EditorState::SaveFailed {
                    session,
                    error: e.to_string(),
                };
                return Err(e.into());
            }
        };

        self.state = EditorState::Saving(session);
        match self.store.put(&form, document).await {
            Ok(stored) => {
                self.state = EditorState::Closed;
                self.events.updated(&form);
                tracing::info!(form = %form, id = %stored.id, "Form configuration saved");
                Ok(stored)
            }
            Err(e) => {
                tracing::error!(form = %form, error = %e, "Failed to save form configuration");
                if let EditorState::Saving(session) =
                    std::mem::replace(&mut self.state, EditorState::Closed)
                {
                    self.state = EditorState::SaveFailed {
                        session,
                        error: e.to_string(),
                    };
                }
                Err(e.into())
            }
        }
    }

    /// Discard the session without persisting.
    pub fn cancel(&mut self) {
        if let Some(session) = self.session() {
            tracing::debug!(form = %session.form(), "Editor cancelled");
        }
        self.state = EditorState::Closed;
    }

    fn session(&self) -> Option<&EditSession> {
        match &self.state {
            EditorState::Closed => None,
            EditorState::Open(session)
            | EditorState::Saving(session)
            | EditorState::SaveFailed { session, .. } => Some(session),
        }
    }

    /// Session ready for a move; a failed save returns to `Open`.
    fn editable_session(&mut self, index: usize) -> Result<&mut EditSession, EditorError> {
        // A rejected move leaves the state, and any save error, untouched.
        let len = self
            .session()
            .map(|s| s.entries().len())
            .ok_or(EditorError::NotOpen)?;
        if index >= len {
            return Err(EditorError::IndexOutOfRange { index, len });
        }

        if let EditorState::SaveFailed { .. } = self.state {
            if let EditorState::SaveFailed { session, .. } =
                std::mem::replace(&mut self.state, EditorState::Closed)
            {
                self.state = EditorState::Open(session);
            }
        }

        match &mut self.state {
            EditorState::Open(session) | EditorState::Saving(session) => Ok(session),
            _ => Err(EditorError::NotOpen),
        }
    }
}
