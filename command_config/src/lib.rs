pub mod backup;
pub mod error;
pub mod model;
pub mod store;

pub use error::{ConfigStoreError, SnapshotError};
pub use model::GuildCommandConfig;
pub use store::CommandConfigStore;
