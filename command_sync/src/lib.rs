pub mod poise_registry;
pub mod registry;
pub mod synchronizer;

pub use poise_registry::PoiseRegistry;
pub use registry::{CommandRegistry, GuildHandle};
pub use synchronizer::{GuildCommandSynchronizer, SyncReport};
