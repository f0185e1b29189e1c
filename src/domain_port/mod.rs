// store

mod session_store;

pub use session_store::*;

// directory

mod user_directory;

pub use user_directory::*;
