use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid collection path {0:?}. It must be in 'database.collection' format.")]
    InvalidCollectionPath(String),

    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),
}
