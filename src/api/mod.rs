pub mod auth;
pub mod catalogue;
mod error;
pub mod models;
pub mod transport;

pub use auth::AuthClient;
pub use catalogue::CatalogueClient;
pub use error::ApiError;
pub use models::*;
pub use transport::{HttpTransport, ReqwestTransport};
