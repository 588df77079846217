use anyhow::{Context as _, Result};
use cache::TtlCache;
use document_store::{DocumentRepository, MongoPool, MongoRepository};
use security::{SecretCipher, Validator};
use serde_json::{Map, Value};
use settings::Settings;
use std::sync::Arc;
use std::time::Duration;

const SERVER_CONFIG_TTL: Duration = Duration::from_secs(300);

/// Services shared by every command and event handler.
pub struct Data {
    pub settings: Settings,
    pub cache: TtlCache,
    /// Present only when an encryption secret is configured.
    pub cipher: Option<SecretCipher>,
    pub validator: Validator,
    pub documents: Arc<dyn DocumentRepository>,
}

impl Data {
    pub async fn build(settings: Settings) -> Result<Self> {
        let pool = MongoPool::new(settings.database_url())
            .await
            .context("configuring the database pool")?;

        let cipher = match settings.encryption_secret() {
            Some(secret) => Some(SecretCipher::from_secret(secret)?),
            None => {
                tracing::warn!("No encryption secret configured, encryption is disabled");
                None
            }
        };

        Ok(Self {
            settings,
            cache: TtlCache::new(),
            cipher,
            validator: Validator::new(),
            documents: Arc::new(MongoRepository::new(pool)),
        })
    }

    /// Self-check of the optional services, one line per service.
    pub async fn service_status(&self) -> Vec<String> {
        let database = match self.documents.ping().await {
            Ok(()) => "reachable".to_string(),
            Err(e) => format!("unreachable ({e})"),
        };
        let encryption = match &self.cipher {
            None => "disabled".to_string(),
            Some(cipher) => match cipher
                .encrypt("status")
                .and_then(|token| cipher.decrypt(&token))
            {
                Ok(plain) if plain == "status" => "enabled".to_string(),
                Ok(_) => "enabled (round trip mismatch)".to_string(),
                Err(e) => format!("enabled (self-check failed: {e})"),
            },
        };
        vec![
            format!("Database: {database}"),
            format!("Encryption: {encryption}"),
            format!("Cached entries: {}", self.cache.len().await),
        ]
    }

    /// Per-guild section of the server config, served from the cache for
    /// five minutes after each read.
    pub async fn server_config(&self, guild_id: &str) -> Map<String, Value> {
        let key = format!("server_config:{guild_id}");
        if let Some(config) = self.cache.get(&key).await {
            return config;
        }
        let config = self.settings.server_config(guild_id).await;
        self.cache.set(key, config.clone(), SERVER_CONFIG_TTL).await;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use document_store::{Document, StoreError};
    use settings::settings::{APPROVED_GUILDS, BACKUP_DIR, COMMAND_CONFIG_PATH, DB, TOKEN};
    use settings::Environment;
    use tempfile::TempDir;

    struct StaticRepository {
        reachable: bool,
    }

    #[async_trait]
    impl DocumentRepository for StaticRepository {
        async fn ping(&self) -> Result<(), StoreError> {
            if self.reachable {
                Ok(())
            } else {
                Err(StoreError::InvalidCollectionPath("offline".to_string()))
            }
        }

        async fn find_one(&self, _: &str, _: Document) -> Result<Option<Document>, StoreError> {
            Ok(None)
        }

        async fn find_one_with_projection(
            &self,
            _: &str,
            _: Document,
            _: Option<Document>,
        ) -> Result<Option<Document>, StoreError> {
            Ok(None)
        }

        async fn find_many(&self, _: &str, _: Document) -> Result<Vec<Document>, StoreError> {
            Ok(vec![])
        }

        async fn update_one(
            &self,
            _: &str,
            _: Document,
            _: Document,
            _: bool,
        ) -> Result<bool, StoreError> {
            Ok(false)
        }

        async fn insert_one(&self, _: &str, _: Document) -> Result<bool, StoreError> {
            Ok(false)
        }
    }

    async fn data(dir: &TempDir, reachable: bool, secret: Option<&str>) -> Data {
        let env = Environment::from_vars([
            (TOKEN, "token"),
            (DB, "mongodb://localhost"),
            (APPROVED_GUILDS, "111"),
            (
                COMMAND_CONFIG_PATH,
                dir.path().join("command_config.json").to_str().unwrap(),
            ),
            (BACKUP_DIR, dir.path().join("backups").to_str().unwrap()),
        ]);
        Data {
            settings: Settings::from_environment(env).await.unwrap(),
            cache: TtlCache::new(),
            cipher: secret.map(|s| SecretCipher::from_secret(s).unwrap()),
            validator: Validator::new(),
            documents: Arc::new(StaticRepository { reachable }),
        }
    }

    #[tokio::test]
    async fn status_reads_every_optional_service() {
        let dir = TempDir::new().unwrap();
        let data = data(&dir, true, Some("hunter2")).await;
        assert_eq!(
            data.service_status().await,
            [
                "Database: reachable",
                "Encryption: enabled",
                "Cached entries: 0"
            ]
        );
    }

    #[tokio::test]
    async fn status_reports_missing_services_without_failing() {
        let dir = TempDir::new().unwrap();
        let data = data(&dir, false, None).await;
        data.server_config("111").await;

        let status = data.service_status().await;
        assert!(status[0].starts_with("Database: unreachable"));
        assert_eq!(status[1], "Encryption: disabled");
        assert_eq!(status[2], "Cached entries: 1");
    }
}
