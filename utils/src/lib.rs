pub mod error_handle;
pub mod logging;

pub use error_handle::describe_chain;
