use crate::controller::{Messages, Resource};
use crate::forms::{blank_to_none, parse_integer, required, FormError};
use crate::models::{Category, CategoryPayload};
use crate::table::{CellValue, Column, ColumnKind, Tabular};

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryForm {
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub display_order: String,
    pub parent_id: String,
    pub is_active: bool,
}

impl Default for CategoryForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            image_url: String::new(),
            display_order: "0".to_string(),
            parent_id: String::new(),
            is_active: true,
        }
    }
}

pub struct CategoryResource;

impl Resource for CategoryResource {
    type Record = Category;
    type Form = CategoryForm;
    type Payload = CategoryPayload;

    const PATH: &'static str = "/categories";
    const CREATE_TITLE: &'static str = "Ajouter une catégorie";
    const EDIT_TITLE: &'static str = "Modifier la catégorie";
    const MESSAGES: Messages = Messages {
        load_failed: "Impossible de charger les catégories",
        created: "Catégorie créée avec succès",
        updated: "Catégorie mise à jour avec succès",
        deleted: "Catégorie supprimée avec succès",
    };
    const EMPTY_MESSAGE: &'static str = "Aucune catégorie trouvée";

    fn columns() -> Vec<Column> {
        vec![
            Column::new("name", "Nom", ColumnKind::Text),
            Column::new("parent", "Catégorie parente", ColumnKind::Text),
            Column::new("description", "Description", ColumnKind::Text),
            Column::new("displayOrder", "Ordre", ColumnKind::Text),
            Column::new("itemCount", "Articles", ColumnKind::Text),
            Column::new(
                "isActive",
                "Statut",
                ColumnKind::Badge {
                    on: "Active",
                    off: "Inactive",
                },
            ),
        ]
    }

    fn label(record: &Category) -> String {
        record.name.clone()
    }

    fn load_form(record: &Category) -> CategoryForm {
        CategoryForm {
            name: record.name.clone(),
            description: record.description.clone().unwrap_or_default(),
            image_url: record.image_url.clone().unwrap_or_default(),
            display_order: record.display_order.to_string(),
            parent_id: record.parent_id.clone().unwrap_or_default(),
            is_active: record.is_active,
        }
    }

    fn build_payload(
        form: &CategoryForm,
        editing: Option<&Category>,
    ) -> Result<CategoryPayload, FormError> {
        let parent_id = blank_to_none(&form.parent_id);
        if let (Some(parent), Some(current)) = (&parent_id, editing) {
            if *parent == current.id {
                return Err(FormError::SelfParent);
            }
        }

        Ok(CategoryPayload {
            name: required("nom", &form.name)?,
            description: blank_to_none(&form.description),
            image_url: blank_to_none(&form.image_url),
            display_order: parse_integer("ordre d'affichage", &form.display_order)?,
            parent_id,
            is_active: form.is_active,
        })
    }
}

impl Tabular for Category {
    fn cell(&self, key: &str) -> CellValue {
        match key {
            "name" => CellValue::text(&self.name),
            "parent" => CellValue::optional(self.parent.as_ref().map(|p| p.name.as_str())),
            "description" => CellValue::optional(self.description.as_deref()),
            "displayOrder" => CellValue::text(self.display_order.to_string()),
            "itemCount" => CellValue::Text(self.item_count.map(|n| n.to_string())),
            "isActive" => CellValue::Flag(self.is_active),
            _ => CellValue::Text(None),
        }
    }
}

/// Categories a record may be attached under: everything except itself.
pub fn parent_choices<'a>(categories: &'a [Category], editing: Option<&Category>) -> Vec<&'a Category> {
    categories
        .iter()
        .filter(|category| editing.map_or(true, |current| current.id != category.id))
        .collect()
}
