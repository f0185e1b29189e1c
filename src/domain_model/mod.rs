mod credential;
mod request;
mod session;
mod user;

pub use credential::*;
pub use request::*;
pub use session::*;
pub use user::*;
