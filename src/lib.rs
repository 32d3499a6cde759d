pub mod configs;
pub mod error;
mod session;

pub use error::SessionError;
pub use session::{Session, TrainingReport};

use crate::configs::Config;

/// Builds a session from the configuration and trains it to completion.
///
/// # Errors
/// Returns a `SessionError` if the configuration is invalid or the network rejects an update.
pub fn train(config: Config) -> Result<TrainingReport, SessionError> {
    log::info!("building session");
    let session = Session::new(config)?;
    session.run()
}
