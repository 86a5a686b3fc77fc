//! Generic list/edit/delete page controller.
//!
//! One [`ResourceController`] drives any [`Resource`]: it fetches the list,
//! opens the form dialog with mapped fields, builds the payload on submit,
//! persists through the [`ResourceClient`] and refetches the whole list after
//! every successful mutation. Failures become [`Notification`]s; the page
//! stays usable after any of them.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError, ResourceClient};
use crate::dialog::{delete_prompt, ConfirmDialog, FormDialog};
use crate::forms::FormError;
use crate::models::{Entity, Role};
use crate::session::ADMIN_ROLES;
use crate::table::{Actions, Column, Table, Tabular, DEFAULT_EMPTY_MESSAGE};

pub const SUCCESS_TITLE: &str = "Succès";
pub const ERROR_TITLE: &str = "Erreur";
pub const SAVE_FAILED: &str = "Erreur lors de la sauvegarde";
pub const DELETE_FAILED: &str = "Erreur lors de la suppression";

/// User-facing texts of one resource page.
#[derive(Debug, Clone, Copy)]
pub struct Messages {
    pub load_failed: &'static str,
    pub created: &'static str,
    pub updated: &'static str,
    pub deleted: &'static str,
}

#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error("Aucun formulaire n'est ouvert")]
    NoOpenForm,
}

impl PageError {
    /// Text for the error notification: the form error, the server's
    /// message, or `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            PageError::Form(_) | PageError::NoOpenForm => self.to_string(),
            PageError::Api(err) => err
                .server_message()
                .map(str::to_string)
                .unwrap_or_else(|| fallback.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn success(description: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            title: SUCCESS_TITLE.to_string(),
            description: description.into(),
        }
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            title: ERROR_TITLE.to_string(),
            description: description.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NotificationKind::Error
    }
}

/// A backend resource managed through the generic controller: its path, its
/// wire/form types and the mapping between them.
pub trait Resource {
    type Record: Tabular + Serialize + DeserializeOwned + Clone + Send + Sync;
    type Form: Default + Clone;
    type Payload: Serialize + Sync;

    const PATH: &'static str;
    const CREATE_TITLE: &'static str;
    const EDIT_TITLE: &'static str;
    const MESSAGES: Messages;
    const EMPTY_MESSAGE: &'static str = DEFAULT_EMPTY_MESSAGE;
    const ALLOWED_ROLES: &'static [Role] = ADMIN_ROLES;
    /// Treat 404 on the list call as "nothing yet" instead of an error.
    const SUPPRESS_NOT_FOUND: bool = false;

    fn columns() -> Vec<Column>;

    /// Short label used in the delete confirmation.
    fn label(record: &Self::Record) -> String;

    /// Wire -> form. Missing optionals become empty strings / false / zero.
    fn load_form(record: &Self::Record) -> Self::Form;

    /// Form -> wire. `editing` is the record being updated, `None` on create.
    fn build_payload(
        form: &Self::Form,
        editing: Option<&Self::Record>,
    ) -> Result<Self::Payload, FormError>;
}

pub struct ResourceController<R: Resource> {
    client: ResourceClient<R::Record>,
    records: Vec<R::Record>,
    loading: bool,
    dialog: FormDialog<R::Form>,
    editing: Option<R::Record>,
    deletion: ConfirmDialog<R::Record>,
    notifications: Vec<Notification>,
}

impl<R: Resource> ResourceController<R> {
    pub fn new(api: ApiClient) -> Self {
        Self {
            client: api.resource(R::PATH),
            records: Vec::new(),
            loading: false,
            dialog: FormDialog::default(),
            editing: None,
            deletion: ConfirmDialog::default(),
            notifications: Vec::new(),
        }
    }

    pub fn records(&self) -> &[R::Record] {
        &self.records
    }

    pub fn find(&self, id: &str) -> Option<&R::Record> {
        self.records.iter().find(|record| record.id() == id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_modal_open(&self) -> bool {
        self.dialog.is_open()
    }

    pub fn is_delete_modal_open(&self) -> bool {
        self.deletion.is_open()
    }

    pub fn is_saving(&self) -> bool {
        self.dialog.is_saving()
    }

    pub fn editing(&self) -> Option<&R::Record> {
        self.editing.as_ref()
    }

    pub fn record_to_delete(&self) -> Option<&R::Record> {
        self.deletion.target()
    }

    pub fn dialog(&self) -> &FormDialog<R::Form> {
        &self.dialog
    }

    pub fn form(&self) -> &R::Form {
        self.dialog.fields()
    }

    pub fn form_mut(&mut self) -> &mut R::Form {
        self.dialog.fields_mut()
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    pub(crate) fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    pub fn delete_prompt(&self) -> Option<String> {
        self.deletion.target().map(|record| delete_prompt(&R::label(record)))
    }

    pub fn table(&self) -> Table {
        Table::render(&self.records, &R::columns(), Actions::ALL, R::EMPTY_MESSAGE)
    }

    /// Replaces the list with the server's current one.
    pub async fn refresh(&mut self) -> Result<(), PageError> {
        self.loading = true;
        let result = self.client.list().await;
        self.loading = false;

        match result {
            Ok(records) => {
                debug!(path = R::PATH, count = records.len(), "list refreshed");
                self.records = records;
                Ok(())
            }
            Err(err) if R::SUPPRESS_NOT_FOUND && err.is_not_found() => {
                debug!(path = R::PATH, "nothing stored yet");
                self.records.clear();
                Ok(())
            }
            Err(err) => {
                warn!(path = R::PATH, error = %err, "failed to load list");
                self.notify(Notification::error(R::MESSAGES.load_failed));
                Err(err.into())
            }
        }
    }

    pub fn open_create(&mut self) {
        self.editing = None;
        self.dialog.show(R::CREATE_TITLE, R::Form::default());
    }

    pub fn open_edit(&mut self, record: &R::Record) {
        self.editing = Some(record.clone());
        self.dialog.show(R::EDIT_TITLE, R::load_form(record));
    }

    pub fn close_modal(&mut self) {
        self.editing = None;
        self.dialog.close();
    }

    pub fn request_delete(&mut self, record: &R::Record) {
        self.deletion.request(record.clone());
    }

    pub fn cancel_delete(&mut self) {
        self.deletion.cancel();
    }

    /// Creates or updates from the form, then refetches the list.
    ///
    /// Returns the record as stored by the server. Fails without a request
    /// when no form is open.
    pub async fn submit(&mut self) -> Result<R::Record, PageError> {
        if !self.dialog.can_save() {
            return Err(PageError::NoOpenForm);
        }
        self.dialog.set_saving(true);
        let result = self.persist().await;
        self.dialog.set_saving(false);

        match result {
            Ok(saved) => {
                let message = if self.editing.is_some() {
                    R::MESSAGES.updated
                } else {
                    R::MESSAGES.created
                };
                info!(path = R::PATH, id = saved.id(), "record saved");
                self.notify(Notification::success(message));
                self.close_modal();
                // refresh reports its own failure
                let _ = self.refresh().await;
                Ok(saved)
            }
            Err(err) => {
                warn!(path = R::PATH, error = %err, "save failed");
                self.notify(Notification::error(err.user_message(SAVE_FAILED)));
                Err(err)
            }
        }
    }

    async fn persist(&self) -> Result<R::Record, PageError> {
        let payload = R::build_payload(self.dialog.fields(), self.editing.as_ref())?;
        let saved = match &self.editing {
            Some(record) => self.client.update(record.id(), &payload).await?,
            None => self.client.create(&payload).await?,
        };
        Ok(saved)
    }

    /// Deletes the record awaiting confirmation. Does nothing when none is pending.
    pub async fn confirm_delete(&mut self) -> Result<(), PageError> {
        let Some(id) = self.deletion.target().map(|record| record.id().to_string()) else {
            return Ok(());
        };

        match self.client.delete(&id).await {
            Ok(()) => {
                info!(path = R::PATH, id = %id, "record deleted");
                self.notify(Notification::success(R::MESSAGES.deleted));
                self.deletion.cancel();
                let _ = self.refresh().await;
                Ok(())
            }
            Err(err) => {
                warn!(path = R::PATH, id = %id, error = %err, "delete failed");
                let err = PageError::from(err);
                self.notify(Notification::error(err.user_message(DELETE_FAILED)));
                Err(err)
            }
        }
    }
}
