use crate::controller::{Messages, Resource};
use crate::forms::{blank_to_none, required, FormError};
use crate::models::{Role, User, UserPayload};
use crate::session::SUPERADMIN_ROLES;
use crate::table::{CellValue, Column, ColumnKind, Tabular};

#[derive(Debug, Clone, PartialEq)]
pub struct UserForm {
    pub email: String,
    /// Left empty on edit to keep the current password.
    pub password: String,
    pub name: String,
    pub role: Role,
    pub is_active: bool,
}

impl Default for UserForm {
    fn default() -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            name: String::new(),
            role: Role::Admin,
            is_active: true,
        }
    }
}

pub struct UserResource;

impl Resource for UserResource {
    type Record = User;
    type Form = UserForm;
    type Payload = UserPayload;

    const PATH: &'static str = "/users";
    const CREATE_TITLE: &'static str = "Ajouter un utilisateur";
    const EDIT_TITLE: &'static str = "Modifier l'utilisateur";
    const MESSAGES: Messages = Messages {
        load_failed: "Impossible de charger les utilisateurs",
        created: "Utilisateur créé avec succès",
        updated: "Utilisateur mis à jour avec succès",
        deleted: "Utilisateur supprimé avec succès",
    };
    const EMPTY_MESSAGE: &'static str = "Aucun utilisateur trouvé";
    const ALLOWED_ROLES: &'static [Role] = SUPERADMIN_ROLES;

    fn columns() -> Vec<Column> {
        vec![
            Column::new("email", "Email", ColumnKind::Text),
            Column::new("name", "Nom", ColumnKind::Text),
            Column::new("role", "Rôle", ColumnKind::Text),
            Column::new(
                "isActive",
                "Statut",
                ColumnKind::Badge {
                    on: "Actif",
                    off: "Inactif",
                },
            ),
            Column::new("lastLogin", "Dernière connexion", ColumnKind::Date),
        ]
    }

    fn label(record: &User) -> String {
        record.email.clone()
    }

    fn load_form(record: &User) -> UserForm {
        UserForm {
            email: record.email.clone(),
            password: String::new(),
            name: record.name.clone().unwrap_or_default(),
            role: record.role,
            is_active: record.is_active,
        }
    }

    fn build_payload(form: &UserForm, editing: Option<&User>) -> Result<UserPayload, FormError> {
        let password = match editing {
            None => Some(required("mot de passe", &form.password)?),
            // blank keeps the current password
            Some(_) if form.password.is_empty() => None,
            Some(_) => Some(form.password.clone()),
        };

        Ok(UserPayload {
            email: required("email", &form.email)?,
            password,
            name: blank_to_none(&form.name),
            role: form.role,
            is_active: form.is_active,
        })
    }
}

impl Tabular for User {
    fn cell(&self, key: &str) -> CellValue {
        match key {
            "email" => CellValue::text(&self.email),
            "name" => CellValue::optional(self.name.as_deref()),
            "role" => CellValue::text(self.role.label()),
            "isActive" => CellValue::Flag(self.is_active),
            "lastLogin" => CellValue::Date(self.last_login),
            _ => CellValue::Text(None),
        }
    }
}
