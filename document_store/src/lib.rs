pub mod error;
pub mod mongo;
pub mod path;
pub mod repository;

pub use error::StoreError;
pub use mongo::{MongoPool, MongoRepository};
pub use path::CollectionPath;
pub use repository::DocumentRepository;

pub use mongodb::bson::{doc, Document};
