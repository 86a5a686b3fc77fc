pub mod business;
pub mod categories;
pub mod events;
pub mod items;
pub mod users;

pub use business::{BusinessForm, BusinessPage, BusinessResource};
pub use categories::{parent_choices, CategoryForm, CategoryResource};
pub use events::{header_events, EventForm, EventResource};
pub use items::{ImageForm, ItemForm, ItemResource, ItemsPage, OptionForm, VariantForm};
pub use users::{UserForm, UserResource};
