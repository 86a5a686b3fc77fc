//! Command-line surface over the admin pages.

use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use crate::auth;
use crate::controller::Resource;
use crate::pages::{
    header_events, BusinessResource, CategoryResource, EventResource, ItemResource, UserResource,
};
use crate::session::AccessDenied;
use crate::table::{Actions, Table};
use crate::{AdminApp, AppError};

#[derive(Debug, Parser)]
#[command(name = "resto-admin")]
#[command(about = "Restaurant back-office client", long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Commands {
    /// Sign in and store the credentials
    Login {
        email: String,
        password: String,
    },

    /// Forget the stored credentials
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Print the table of a resource page
    List {
        #[arg(value_enum)]
        resource: ResourceKind,
    },

    /// Print one record as JSON
    Show {
        #[arg(value_enum)]
        resource: ResourceKind,

        id: String,
    },

    /// Delete one record
    Delete {
        #[arg(value_enum)]
        resource: ResourceKind,

        id: String,
    },

    /// Print the ongoing events shown in the public header
    HeaderEvents,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResourceKind {
    Business,
    Categories,
    Events,
    Items,
    Users,
}

pub async fn execute(app: &AdminApp, command: Commands) -> Result<String, AppError> {
    match command {
        Commands::Login { email, password } => {
            let user = auth::login(app.api(), &email, &password).await?;
            Ok(format!(
                "Connecté en tant que {} ({}), accueil : {}",
                user.email,
                user.role.label(),
                auth::landing_path(user.role)
            ))
        }
        Commands::Logout => {
            auth::logout(app.api())?;
            Ok("Déconnecté".to_string())
        }
        Commands::Whoami => {
            let user = app
                .session()
                .user()
                .ok_or(AccessDenied::SignedOut)?;
            Ok(serde_json::to_string_pretty(&user)?)
        }
        Commands::List { resource } => match resource {
            ResourceKind::Business => list::<BusinessResource>(app).await,
            ResourceKind::Categories => list::<CategoryResource>(app).await,
            ResourceKind::Events => list::<EventResource>(app).await,
            ResourceKind::Items => list::<ItemResource>(app).await,
            ResourceKind::Users => list::<UserResource>(app).await,
        },
        Commands::Show { resource, id } => match resource {
            ResourceKind::Business => show::<BusinessResource>(app, &id).await,
            ResourceKind::Categories => show::<CategoryResource>(app, &id).await,
            ResourceKind::Events => show::<EventResource>(app, &id).await,
            ResourceKind::Items => show::<ItemResource>(app, &id).await,
            ResourceKind::Users => show::<UserResource>(app, &id).await,
        },
        Commands::Delete { resource, id } => match resource {
            ResourceKind::Business => delete::<BusinessResource>(app, &id).await,
            ResourceKind::Categories => delete::<CategoryResource>(app, &id).await,
            ResourceKind::Events => delete::<EventResource>(app, &id).await,
            ResourceKind::Items => delete::<ItemResource>(app, &id).await,
            ResourceKind::Users => delete::<UserResource>(app, &id).await,
        },
        Commands::HeaderEvents => {
            let events = header_events(app.api()).await?;
            let table = Table::render(
                &events,
                &EventResource::columns(),
                Actions::default(),
                EventResource::EMPTY_MESSAGE,
            );
            Ok(table.to_string())
        }
    }
}

async fn list<R: Resource>(app: &AdminApp) -> Result<String, AppError> {
    let mut controller = app.open::<R>()?;
    controller.refresh().await?;
    Ok(controller.table().to_string())
}

async fn show<R: Resource>(app: &AdminApp, id: &str) -> Result<String, AppError> {
    app.session().authorize(R::ALLOWED_ROLES)?;
    let record = app.api().resource::<R::Record>(R::PATH).get(id).await?;
    Ok(serde_json::to_string_pretty(&record)?)
}

/// The command line itself is the confirmation: the record is looked up,
/// staged for deletion and confirmed in one go.
async fn delete<R: Resource>(app: &AdminApp, id: &str) -> Result<String, AppError> {
    let mut controller = app.open::<R>()?;
    controller.refresh().await?;
    let record = controller
        .find(id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(id.to_string()))?;

    controller.request_delete(&record);
    let prompt = controller.delete_prompt().unwrap_or_default();
    info!(resource = R::PATH, %id, "deleting");
    controller.confirm_delete().await?;

    Ok(format!("{}\n{}", prompt, R::MESSAGES.deleted))
}
