use crate::api::ApiClient;
use crate::controller::{Messages, PageError, Resource, ResourceController};
use crate::forms::{blank_to_none, required, FormError};
use crate::models::{Business, BusinessPayload};
use crate::table::{CellValue, Column, ColumnKind, Tabular};

/// Business info form. `city` and `zip_code` are kept for display only and
/// never sent; `opening_hours` travels as `hours`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BusinessForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub zip_code: String,
    pub opening_hours: String,
    pub description: String,
    pub logo_url: String,
    pub slogan: String,
    pub url_facebook: String,
    pub url_instagram: String,
    pub uber_eats_url: String,
}

pub struct BusinessResource;

impl Resource for BusinessResource {
    type Record = Business;
    type Form = BusinessForm;
    type Payload = BusinessPayload;

    const PATH: &'static str = "/business";
    const CREATE_TITLE: &'static str = "Informations de l'entreprise";
    const EDIT_TITLE: &'static str = "Informations de l'entreprise";
    const MESSAGES: Messages = Messages {
        load_failed: "Impossible de charger les informations de l'entreprise",
        created: "Informations de l'entreprise enregistrées avec succès",
        updated: "Informations de l'entreprise mises à jour avec succès",
        deleted: "Informations de l'entreprise supprimées avec succès",
    };
    const EMPTY_MESSAGE: &'static str = "Aucune entreprise enregistrée";
    const SUPPRESS_NOT_FOUND: bool = true;

    fn columns() -> Vec<Column> {
        vec![
            Column::new("name", "Nom", ColumnKind::Text),
            Column::new("email", "Email", ColumnKind::Text),
            Column::new("phone", "Téléphone", ColumnKind::Text),
            Column::new("address", "Adresse", ColumnKind::Text),
            Column::new("hours", "Horaires", ColumnKind::Text),
        ]
    }

    fn label(record: &Business) -> String {
        record.name.clone()
    }

    fn load_form(record: &Business) -> BusinessForm {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        BusinessForm {
            name: record.name.clone(),
            email: text(&record.email),
            phone: text(&record.phone),
            address: text(&record.address),
            city: String::new(),
            zip_code: String::new(),
            opening_hours: text(&record.hours),
            description: text(&record.description),
            logo_url: text(&record.logo_url),
            slogan: text(&record.slogan),
            url_facebook: text(&record.url_facebook),
            url_instagram: text(&record.url_instagram),
            uber_eats_url: text(&record.uber_eats_url),
        }
    }

    fn build_payload(
        form: &BusinessForm,
        _editing: Option<&Business>,
    ) -> Result<BusinessPayload, FormError> {
        Ok(BusinessPayload {
            name: required("nom", &form.name)?,
            email: blank_to_none(&form.email),
            phone: blank_to_none(&form.phone),
            address: blank_to_none(&form.address),
            description: blank_to_none(&form.description),
            hours: blank_to_none(&form.opening_hours),
            logo_url: blank_to_none(&form.logo_url),
            slogan: blank_to_none(&form.slogan),
            url_facebook: blank_to_none(&form.url_facebook),
            url_instagram: blank_to_none(&form.url_instagram),
            uber_eats_url: blank_to_none(&form.uber_eats_url),
        })
    }
}

impl Tabular for Business {
    fn cell(&self, key: &str) -> CellValue {
        match key {
            "name" => CellValue::text(&self.name),
            "email" => CellValue::optional(self.email.as_deref()),
            "phone" => CellValue::optional(self.phone.as_deref()),
            "address" => CellValue::optional(self.address.as_deref()),
            "hours" => CellValue::optional(self.hours.as_deref()),
            _ => CellValue::Text(None),
        }
    }
}

/// Single-record page: the form is always open on the stored business, or
/// on an empty one until the first save.
pub struct BusinessPage {
    controller: ResourceController<BusinessResource>,
}

impl BusinessPage {
    pub fn new(api: ApiClient) -> Self {
        Self {
            controller: ResourceController::new(api),
        }
    }

    pub fn controller(&self) -> &ResourceController<BusinessResource> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut ResourceController<BusinessResource> {
        &mut self.controller
    }

    pub fn business(&self) -> Option<&Business> {
        self.controller.editing()
    }

    pub fn form(&self) -> &BusinessForm {
        self.controller.form()
    }

    pub fn form_mut(&mut self) -> &mut BusinessForm {
        self.controller.form_mut()
    }

    pub async fn load(&mut self) -> Result<(), PageError> {
        self.controller.refresh().await?;
        match self.controller.records().first().cloned() {
            Some(business) => self.controller.open_edit(&business),
            None => self.controller.open_create(),
        }
        Ok(())
    }

    /// Saves the form. The stored id is kept so the next save is an update,
    /// and the typed fields (including the display-only ones) stay in place.
    pub async fn save(&mut self) -> Result<Business, PageError> {
        let typed = self.controller.form().clone();
        let saved = self.controller.submit().await?;
        self.controller.open_edit(&saved);
        *self.controller.form_mut() = typed;
        Ok(saved)
    }
}
