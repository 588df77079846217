use crate::error::StoreError;
use crate::path::CollectionPath;
use crate::repository::DocumentRepository;
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::{ClientOptions, FindOneOptions, UpdateOptions};
use mongodb::{Client, Collection};
use std::time::Duration;

const MAX_POOL_SIZE: u32 = 100;
const MIN_POOL_SIZE: u32 = 10;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection pool to one MongoDB deployment. Cloning shares the pool.
#[derive(Debug, Clone)]
pub struct MongoPool {
    client: Client,
}

impl MongoPool {
    /// Builds the pool without touching the server; connections are opened on
    /// first use.
    pub async fn new(uri: &str) -> Result<Self, StoreError> {
        let mut options = ClientOptions::parse(uri).await?;
        options.max_pool_size = Some(MAX_POOL_SIZE);
        options.min_pool_size = Some(MIN_POOL_SIZE);
        options.connect_timeout = Some(CONNECT_TIMEOUT);
        options.server_selection_timeout = Some(CONNECT_TIMEOUT);
        Ok(Self {
            client: Client::with_options(options)?,
        })
    }

    /// Like [`MongoPool::new`], but pings the server before handing the pool
    /// out.
    pub async fn connect(uri: &str) -> Result<Self, StoreError> {
        let pool = Self::new(uri).await?;
        pool.ping().await?;
        tracing::info!("Connected to MongoDB");
        Ok(pool)
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB connection failed: {e}");
                StoreError::Mongo(e)
            })?;
        Ok(())
    }

    pub fn collection(&self, path: &CollectionPath) -> Collection<Document> {
        self.client
            .database(&path.database)
            .collection(&path.collection)
    }
}

/// [`DocumentRepository`] over a shared [`MongoPool`].
#[derive(Debug, Clone)]
pub struct MongoRepository {
    pool: MongoPool,
}

impl MongoRepository {
    pub fn new(pool: MongoPool) -> Self {
        Self { pool }
    }

    fn collection(&self, path: &str) -> Result<Collection<Document>, StoreError> {
        Ok(self.pool.collection(&path.parse()?))
    }
}

fn logged(operation: &'static str) -> impl FnOnce(mongodb::error::Error) -> StoreError {
    move |e| {
        tracing::error!("Database {operation} error: {e}");
        StoreError::Mongo(e)
    }
}

#[async_trait]
impl DocumentRepository for MongoRepository {
    async fn ping(&self) -> Result<(), StoreError> {
        self.pool.ping().await
    }

    async fn find_one(
        &self,
        collection: &str,
        query: Document,
    ) -> Result<Option<Document>, StoreError> {
        self.collection(collection)?
            .find_one(query, None)
            .await
            .map_err(logged("find_one"))
    }

    async fn find_one_with_projection(
        &self,
        collection: &str,
        query: Document,
        projection: Option<Document>,
    ) -> Result<Option<Document>, StoreError> {
        let mut options = FindOneOptions::default();
        options.projection = projection;
        self.collection(collection)?
            .find_one(query, options)
            .await
            .map_err(logged("find_one_with_projection"))
    }

    async fn find_many(
        &self,
        collection: &str,
        query: Document,
    ) -> Result<Vec<Document>, StoreError> {
        let cursor = self
            .collection(collection)?
            .find(query, None)
            .await
            .map_err(logged("find_many"))?;
        cursor.try_collect().await.map_err(logged("find_many"))
    }

    async fn update_one(
        &self,
        collection: &str,
        query: Document,
        update: Document,
        upsert: bool,
    ) -> Result<bool, StoreError> {
        let mut options = UpdateOptions::default();
        options.upsert = Some(upsert);
        let result = self
            .collection(collection)?
            .update_one(query, update, options)
            .await
            .map_err(logged("update_one"))?;
        Ok(result.modified_count > 0)
    }

    async fn insert_one(&self, collection: &str, document: Document) -> Result<bool, StoreError> {
        let result = self
            .collection(collection)?
            .insert_one(document, None)
            .await
            .map_err(logged("insert_one"))?;
        Ok(!matches!(result.inserted_id, Bson::Null))
    }
}
