use crate::env::Environment;
use crate::error::SettingsError;
use crate::server_config::ServerConfigReader;
use command_config::{CommandConfigStore, ConfigStoreError, GuildCommandConfig};
use serde_json::{Map, Value};
use std::sync::Arc;

pub const TOKEN: &str = "TOKEN";
pub const DB: &str = "DB";
pub const APPROVED_GUILDS: &str = "APPROVED_GUILDS";
pub const ENCRYPTION_SECRET: &str = "ENCRYPTION_SECRET";
pub const ADMIN_USER_IDS: &str = "ADMIN_USER_IDS";
pub const COMMAND_CONFIG_PATH: &str = "COMMAND_CONFIG_PATH";
pub const BACKUP_DIR: &str = "BACKUP_DIR";
pub const SERVER_CONFIG_PATH: &str = "SERVER_CONFIG_PATH";
pub const LOG_FILE: &str = "LOG_FILE";
pub const COMMAND_PREFIX: &str = "COMMAND_PREFIX";

const REQUIRED: [&str; 3] = [APPROVED_GUILDS, TOKEN, DB];

/// Single access point for environment settings, the command allow-list store
/// and the per-guild server settings.
#[derive(Debug, Clone)]
pub struct Settings {
    env: Environment,
    approved_guilds: Vec<u64>,
    admin_user_ids: Vec<u64>,
    command_config: Arc<CommandConfigStore>,
    server_config: ServerConfigReader,
}

impl Settings {
    pub async fn from_env() -> Result<Self, SettingsError> {
        Self::from_environment(Environment::load()).await
    }

    pub async fn from_environment(env: Environment) -> Result<Self, SettingsError> {
        tracing::info!("Initializing configuration manager...");
        let missing = env.missing(&REQUIRED);
        if !missing.is_empty() {
            return Err(SettingsError::MissingConfiguration(
                missing.into_iter().map(str::to_string).collect(),
            ));
        }
        tracing::info!("Environment variables validated");

        let command_config = CommandConfigStore::open(
            env.get_or(COMMAND_CONFIG_PATH, "command_config.json"),
            env.get_or(BACKUP_DIR, "backups/"),
        )
        .await?;
        let server_config =
            ServerConfigReader::new(env.get_or(SERVER_CONFIG_PATH, "welcomer_config.json5"));

        tracing::info!("Configuration manager initialized successfully");
        Ok(Self {
            approved_guilds: id_list(&env, APPROVED_GUILDS),
            admin_user_ids: id_list(&env, ADMIN_USER_IDS),
            env,
            command_config: Arc::new(command_config),
            server_config,
        })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.env.get(key)
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.env.get_or(key, default)
    }

    pub fn token(&self) -> &str {
        self.env.get(TOKEN).unwrap_or_default()
    }

    pub fn database_url(&self) -> &str {
        self.env.get(DB).unwrap_or_default()
    }

    pub fn encryption_secret(&self) -> Option<&str> {
        self.env.get(ENCRYPTION_SECRET)
    }

    /// Guild ids the bot may operate in, in configured order.
    ///
    /// Tokens that are not plain decimal 64-bit integers, and zero, were
    /// dropped with a warning when the settings were loaded.
    pub fn approved_guilds(&self) -> &[u64] {
        &self.approved_guilds
    }

    pub fn is_approved(&self, guild_id: u64) -> bool {
        self.approved_guilds.contains(&guild_id)
    }

    /// Users allowed to run the maintenance commands, besides the
    /// application owner.
    pub fn admin_user_ids(&self) -> &[u64] {
        &self.admin_user_ids
    }

    pub fn log_file(&self) -> String {
        self.env.get_or(LOG_FILE, "app.log")
    }

    pub fn command_config(&self) -> &Arc<CommandConfigStore> {
        &self.command_config
    }

    pub async fn get_command_config(&self) -> Result<GuildCommandConfig, ConfigStoreError> {
        self.command_config.get_all().await
    }

    pub async fn commands_for_guild(&self, guild_id: &str) -> Result<Vec<String>, ConfigStoreError> {
        self.command_config.commands_for_guild(guild_id).await
    }

    pub async fn update_command_config(
        &self,
        guild_id: &str,
        commands: Vec<String>,
    ) -> Result<(), ConfigStoreError> {
        self.command_config
            .update_commands_for_guild(guild_id, commands)
            .await
    }

    pub async fn server_config(&self, guild_id: &str) -> Map<String, Value> {
        self.server_config.guild(guild_id).await
    }
}

/// Parses a comma separated id list. Discord ids are never zero, so zero is
/// dropped along with anything that is not a plain decimal `u64`.
fn id_list(env: &Environment, key: &str) -> Vec<u64> {
    env.list(key)
        .into_iter()
        .filter_map(|token| {
            let id = token
                .bytes()
                .all(|b| b.is_ascii_digit())
                .then(|| token.parse::<u64>().ok())
                .flatten()
                .filter(|id| *id != 0);
            if id.is_none() {
                tracing::warn!("Ignoring invalid id {token:?} in {key}");
            }
            id
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn env_in(dir: &TempDir, extra: &[(&str, &str)]) -> Environment {
        let config = dir.path().join("command_config.json");
        let backups = dir.path().join("backups");
        let mut vars = vec![
            (TOKEN.to_string(), "token".to_string()),
            (DB.to_string(), "mongodb://localhost".to_string()),
            (APPROVED_GUILDS.to_string(), "111,222".to_string()),
            (
                COMMAND_CONFIG_PATH.to_string(),
                config.display().to_string(),
            ),
            (BACKUP_DIR.to_string(), backups.display().to_string()),
        ];
        vars.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        Environment::from_vars(vars)
    }

    #[tokio::test]
    async fn reports_every_missing_variable() {
        let err = Settings::from_environment(Environment::from_vars([(TOKEN, "t")]))
            .await
            .unwrap_err();
        match &err {
            SettingsError::MissingConfiguration(keys) => {
                assert_eq!(keys, &["APPROVED_GUILDS", "DB"])
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(
            err.to_string(),
            "Missing required environment variables: APPROVED_GUILDS, DB"
        );

        let err = Settings::from_environment(Environment::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SettingsError::MissingConfiguration(keys) if keys.len() == 3));
    }

    #[tokio::test]
    async fn approved_guilds_parse_leniently() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::from_environment(env_in(
            &dir,
            &[(APPROVED_GUILDS, r#" 0, 111, "222",abc, -5, 33x ,99999999999999999999999,000,444"#)],
        ))
        .await
        .unwrap();

        assert_eq!(settings.approved_guilds(), [111, 222, 444]);
        assert!(settings.is_approved(444));
        assert!(!settings.is_approved(5));
        assert!(!settings.is_approved(0));
    }

    #[tokio::test]
    async fn admin_ids_drop_zero() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::from_environment(env_in(&dir, &[(ADMIN_USER_IDS, "0,42, x")]))
            .await
            .unwrap();

        assert_eq!(settings.admin_user_ids(), [42]);
    }

    #[tokio::test]
    async fn passes_through_to_command_store() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::from_environment(env_in(&dir, &[])).await.unwrap();

        assert!(dir.path().join("command_config.json").exists());
        assert!(settings.commands_for_guild("111").await.unwrap().is_empty());

        settings
            .update_command_config("111", vec!["ping".to_string()])
            .await
            .unwrap();
        assert_eq!(
            settings.get_command_config().await.unwrap().commands_for("111"),
            ["ping".to_string()]
        );
        assert_eq!(settings.token(), "token");
        assert_eq!(settings.encryption_secret(), None);
        assert_eq!(settings.log_file(), "app.log");
    }
}
