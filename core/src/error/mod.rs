pub mod action;
#[allow(clippy::module_inception)]
pub mod error;
pub mod executor;
pub mod kind;

pub use action::ActionError;
pub use error::{CliError, ConfigError};
pub use executor::ExecutorError;
pub use kind::ErrorKind;
