pub mod env;
pub mod error;
pub mod server_config;
pub mod settings;

pub use env::Environment;
pub use error::SettingsError;
pub use server_config::{ServerConfigReader, WelcomeConfig};
pub use settings::Settings;
