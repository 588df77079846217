pub mod ttl;

pub use ttl::{TtlCache, DEFAULT_TTL};
