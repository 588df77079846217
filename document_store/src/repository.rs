use crate::error::StoreError;
use async_trait::async_trait;
use mongodb::bson::Document;

/// Async document access keyed by `database.collection` paths.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Round trip to the server, failing when it is unreachable.
    async fn ping(&self) -> Result<(), StoreError>;

    async fn find_one(&self, collection: &str, query: Document)
        -> Result<Option<Document>, StoreError>;

    /// Like [`DocumentRepository::find_one`], returning only the fields
    /// selected by `projection`.
    async fn find_one_with_projection(
        &self,
        collection: &str,
        query: Document,
        projection: Option<Document>,
    ) -> Result<Option<Document>, StoreError>;

    async fn find_many(&self, collection: &str, query: Document)
        -> Result<Vec<Document>, StoreError>;

    /// Returns whether an existing document was modified.
    async fn update_one(
        &self,
        collection: &str,
        query: Document,
        update: Document,
        upsert: bool,
    ) -> Result<bool, StoreError>;

    async fn insert_one(&self, collection: &str, document: Document) -> Result<bool, StoreError>;
}
