mod api_error;
mod auth_service;
mod credential_provider;
mod renewal;
mod transport;

pub use api_error::*;
pub use auth_service::*;
pub use credential_provider::*;
pub use renewal::*;
pub use transport::*;
