//! Modal state for the edit form and the delete confirmation.

pub const SAVE_LABEL: &str = "Sauvegarder";
pub const SAVING_LABEL: &str = "Chargement...";
pub const CANCEL_LABEL: &str = "Annuler";
pub const DELETE_LABEL: &str = "Supprimer";

/// Edit/create overlay. The fields live only while the dialog is open:
/// closing it resets them, which is how Cancel discards edits.
#[derive(Debug, Clone, Default)]
pub struct FormDialog<F> {
    open: bool,
    saving: bool,
    title: String,
    fields: F,
}

impl<F: Default> FormDialog<F> {
    pub fn show(&mut self, title: impl Into<String>, fields: F) {
        self.title = title.into();
        self.fields = fields;
        self.saving = false;
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
        self.saving = false;
        self.title.clear();
        self.fields = F::default();
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn fields(&self) -> &F {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut F {
        &mut self.fields
    }

    pub fn can_save(&self) -> bool {
        self.open && !self.saving
    }

    pub fn save_label(&self) -> &'static str {
        if self.saving {
            SAVING_LABEL
        } else {
            SAVE_LABEL
        }
    }

    pub(crate) fn set_saving(&mut self, saving: bool) {
        self.saving = saving;
    }
}

/// Delete confirmation holding the record awaiting confirmation.
#[derive(Debug, Clone)]
pub struct ConfirmDialog<T> {
    target: Option<T>,
}

impl<T> Default for ConfirmDialog<T> {
    fn default() -> Self {
        Self { target: None }
    }
}

impl<T> ConfirmDialog<T> {
    pub fn request(&mut self, target: T) {
        self.target = Some(target);
    }

    pub fn cancel(&mut self) {
        self.target = None;
    }

    pub fn is_open(&self) -> bool {
        self.target.is_some()
    }

    pub fn target(&self) -> Option<&T> {
        self.target.as_ref()
    }
}

pub fn delete_prompt(label: &str) -> String {
    format!(
        "Êtes-vous sûr de vouloir supprimer « {} » ? Cette action est irréversible.",
        label
    )
}
