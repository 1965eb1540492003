// HTTP request handlers organized by functionality

pub mod api;
pub mod download;
pub mod error;
pub mod users;

pub use api::{detect, health, info, platforms, stats, tools};
pub use download::download;
pub use error::AppError;
pub use users::{create_user, list_users};
