use command_config::ConfigStoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    /// One or more required environment variables are unset or empty.
    ///
    /// Every missing key is listed, not only the first one found.
    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingConfiguration(Vec<String>),

    #[error(transparent)]
    Store(#[from] ConfigStoreError),
}
