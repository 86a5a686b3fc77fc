use tracing::warn;

use crate::api::ApiClient;
use crate::controller::{Messages, Notification, PageError, Resource, ResourceController};
use crate::forms::{blank_to_none, parse_amount, required, FormError};
use crate::models::{Category, CategoryRef, Item, ItemImage, ItemOption, ItemPayload, ItemVariant};
use crate::table::{CellValue, Column, ColumnKind, Tabular};
use crate::upload::{upload_file, PendingUpload};

const UNCATEGORIZED: &str = "Non catégorisé";
const UPLOAD_FAILED: &str = "Échec du téléversement de l'image";
const CATEGORIES_FAILED: &str = "Impossible de charger les catégories";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariantForm {
    pub id: Option<String>,
    pub name: String,
    pub price: String,
    pub sku: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageForm {
    pub id: Option<String>,
    pub url: String,
    pub is_default: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionForm {
    pub id: Option<String>,
    pub name: String,
    pub value: String,
    pub kind: String,
}

/// Item form with its nested collections. Child rows keep the id they were
/// loaded with so the backend can match them on update.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemForm {
    pub name: String,
    pub description: String,
    pub price: String,
    pub category_id: String,
    pub is_available: bool,
    pub variants: Vec<VariantForm>,
    pub images: Vec<ImageForm>,
    pub options: Vec<OptionForm>,
    pub pending_uploads: Vec<PendingUpload>,
}

impl Default for ItemForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            price: String::new(),
            category_id: String::new(),
            is_available: true,
            variants: Vec::new(),
            images: Vec::new(),
            options: Vec::new(),
            pending_uploads: Vec::new(),
        }
    }
}

impl ItemForm {
    pub fn add_variant(&mut self, name: &str, price: &str) {
        self.variants.push(VariantForm {
            name: name.to_string(),
            price: price.to_string(),
            ..VariantForm::default()
        });
    }

    pub fn add_image(&mut self, url: &str) {
        let is_default = self.images.is_empty();
        self.images.push(ImageForm {
            id: None,
            url: url.to_string(),
            is_default,
        });
    }

    /// Makes `index` the only default image.
    pub fn set_default_image(&mut self, index: usize) {
        for (i, image) in self.images.iter_mut().enumerate() {
            image.is_default = i == index;
        }
    }

    pub fn add_option(&mut self, name: &str, value: &str) {
        self.options.push(OptionForm {
            name: name.to_string(),
            value: value.to_string(),
            ..OptionForm::default()
        });
    }

    pub fn queue_upload(&mut self, upload: PendingUpload) {
        self.pending_uploads.push(upload);
    }
}

pub struct ItemResource;

impl Resource for ItemResource {
    type Record = Item;
    type Form = ItemForm;
    type Payload = ItemPayload;

    const PATH: &'static str = "/items";
    const CREATE_TITLE: &'static str = "Ajouter un article";
    const EDIT_TITLE: &'static str = "Modifier l'article";
    const MESSAGES: Messages = Messages {
        load_failed: "Impossible de charger les articles",
        created: "Article créé avec succès",
        updated: "Article mis à jour avec succès",
        deleted: "Article supprimé avec succès",
    };
    const EMPTY_MESSAGE: &'static str = "Aucun article trouvé";

    fn columns() -> Vec<Column> {
        vec![
            Column::new("name", "Nom", ColumnKind::Composite { separator: " " }),
            Column::new("category", "Catégorie", ColumnKind::Text),
            Column::new("price", "Prix", ColumnKind::Currency),
            Column::new("variants", "Variantes", ColumnKind::Composite { separator: ", " }),
            Column::new(
                "isAvailable",
                "Disponibilité",
                ColumnKind::Badge {
                    on: "Disponible",
                    off: "Indisponible",
                },
            ),
        ]
    }

    fn label(record: &Item) -> String {
        record.name.clone()
    }

    fn load_form(record: &Item) -> ItemForm {
        ItemForm {
            name: record.name.clone(),
            description: record.description.clone().unwrap_or_default(),
            price: record.price.to_string(),
            category_id: record.category_id.clone().unwrap_or_default(),
            is_available: record.is_available,
            variants: record
                .variants
                .iter()
                .map(|v| VariantForm {
                    id: v.id.clone(),
                    name: v.name.clone(),
                    price: v.price.to_string(),
                    sku: v.sku.clone().unwrap_or_default(),
                })
                .collect(),
            images: record
                .images
                .iter()
                .map(|i| ImageForm {
                    id: i.id.clone(),
                    url: i.url.clone(),
                    is_default: i.is_default,
                })
                .collect(),
            options: record
                .options
                .iter()
                .map(|o| OptionForm {
                    id: o.id.clone(),
                    name: o.name.clone(),
                    value: o.value.clone(),
                    kind: o.kind.clone().unwrap_or_default(),
                })
                .collect(),
            pending_uploads: Vec::new(),
        }
    }

    fn build_payload(form: &ItemForm, _editing: Option<&Item>) -> Result<ItemPayload, FormError> {
        if !form.pending_uploads.is_empty() {
            return Err(FormError::UploadsPending);
        }

        let variants = form
            .variants
            .iter()
            .map(|v| {
                Ok(ItemVariant {
                    id: v.id.clone(),
                    name: required("nom de la variante", &v.name)?,
                    price: parse_amount("prix de la variante", &v.price)?,
                    sku: blank_to_none(&v.sku),
                })
            })
            .collect::<Result<Vec<_>, FormError>>()?;

        let images = form
            .images
            .iter()
            .map(|i| {
                Ok(ItemImage {
                    id: i.id.clone(),
                    url: required("URL de l'image", &i.url)?,
                    is_default: i.is_default,
                })
            })
            .collect::<Result<Vec<_>, FormError>>()?;
        if images.iter().filter(|i| i.is_default).count() > 1 {
            return Err(FormError::MultipleDefaultImages);
        }

        let options = form
            .options
            .iter()
            .map(|o| {
                Ok(ItemOption {
                    id: o.id.clone(),
                    name: required("nom de l'option", &o.name)?,
                    value: o.value.clone(),
                    kind: blank_to_none(&o.kind),
                })
            })
            .collect::<Result<Vec<_>, FormError>>()?;

        // With variants the base price may be left empty; it falls back to the cheapest one
        let price = match (form.price.trim().is_empty(), variants.is_empty()) {
            (true, false) => variants
                .iter()
                .map(|v| v.price)
                .fold(f64::INFINITY, f64::min),
            _ => parse_amount("prix", &form.price)?,
        };

        Ok(ItemPayload {
            name: required("nom", &form.name)?,
            description: blank_to_none(&form.description),
            price,
            category_id: blank_to_none(&form.category_id),
            is_available: form.is_available,
            variants,
            images,
            options,
        })
    }
}

impl Tabular for Item {
    fn cell(&self, key: &str) -> CellValue {
        match key {
            "name" => {
                let mut parts = Vec::with_capacity(2);
                if self.default_image().is_some() {
                    parts.push("[image]".to_string());
                }
                parts.push(self.name.clone());
                CellValue::List(parts)
            }
            "category" => CellValue::text(
                self.category
                    .as_ref()
                    .map(|c| c.name.as_str())
                    .unwrap_or(UNCATEGORIZED),
            ),
            "price" => CellValue::Money(self.display_prices()),
            "variants" => CellValue::List(self.variants.iter().map(|v| v.name.clone()).collect()),
            "isAvailable" => CellValue::Flag(self.is_available),
            _ => CellValue::Text(None),
        }
    }
}

/// Items page: the generic controller plus the category picker and image
/// uploads that must finish before the item is saved.
pub struct ItemsPage {
    api: ApiClient,
    controller: ResourceController<ItemResource>,
    categories: Vec<CategoryRef>,
}

impl ItemsPage {
    pub fn new(api: ApiClient) -> Self {
        Self {
            controller: ResourceController::new(api.clone()),
            api,
            categories: Vec::new(),
        }
    }

    pub fn controller(&self) -> &ResourceController<ItemResource> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut ResourceController<ItemResource> {
        &mut self.controller
    }

    /// Active categories offered in the picker.
    pub fn category_options(&self) -> &[CategoryRef] {
        &self.categories
    }

    pub async fn load(&mut self) -> Result<(), PageError> {
        self.controller.refresh().await?;

        match self.api.get_json::<Vec<Category>>("/categories").await {
            Ok(categories) => {
                self.categories = categories
                    .into_iter()
                    .filter(|c| c.is_active)
                    .map(|c| CategoryRef {
                        id: c.id,
                        name: c.name,
                    })
                    .collect();
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "failed to load categories");
                self.controller.notify(Notification::error(CATEGORIES_FAILED));
                Err(err.into())
            }
        }
    }

    /// Uploads queued images one after another, then saves the item.
    pub async fn submit(&mut self) -> Result<Item, PageError> {
        if !self.controller.dialog().can_save() {
            return Err(PageError::NoOpenForm);
        }
        let pending = std::mem::take(&mut self.controller.form_mut().pending_uploads);

        for (index, upload) in pending.iter().enumerate() {
            match upload_file(&self.api, upload).await {
                Ok(url) => {
                    let form = self.controller.form_mut();
                    form.add_image(&url);
                    if upload.make_default {
                        let last = form.images.len() - 1;
                        form.set_default_image(last);
                    }
                }
                Err(err) => {
                    warn!(file = %upload.file_name, error = %err, "image upload failed");
                    // keep the failed file and the ones after it for the next attempt
                    self.controller
                        .form_mut()
                        .pending_uploads
                        .extend(pending[index..].iter().cloned());
                    let err = PageError::from(err);
                    self.controller
                        .notify(Notification::error(err.user_message(UPLOAD_FAILED)));
                    return Err(err);
                }
            }
        }

        self.controller.submit().await
    }
}
