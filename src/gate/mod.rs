mod backoff;
mod interceptor;
mod prompt;
mod refresh_gate;
mod renewal_signal;

pub use backoff::*;
pub use interceptor::*;
pub use prompt::*;
pub use refresh_gate::*;
pub use renewal_signal::*;
