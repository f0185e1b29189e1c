mod auth_service_impl;
mod credential_provider_fake;
mod credential_provider_google;
mod transport_fake;
mod transport_reqwest;

pub use auth_service_impl::*;
pub use credential_provider_fake::*;
pub use credential_provider_google::*;
pub use transport_fake::*;
pub use transport_reqwest::*;
