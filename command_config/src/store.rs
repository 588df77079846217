use crate::backup::BackupNaming;
use crate::error::ConfigStoreError;
use crate::model::GuildCommandConfig;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

type Result<T, E = ConfigStoreError> = std::result::Result<T, E>;

/// JSON file holding the per-guild command allow-lists.
///
/// Every mutation rewrites the whole file. Mutations (updates, restores and
/// backups) are serialized through one lock, so concurrent updates of
/// different guilds do not overwrite each other.
#[derive(Debug)]
pub struct CommandConfigStore {
    config_path: PathBuf,
    backup_dir: PathBuf,
    naming: BackupNaming,
    write_lock: Mutex<()>,
}

impl CommandConfigStore {
    /// Opens the store, creating an empty configuration file and the backup
    /// directory when they do not exist yet.
    pub async fn open(
        config_path: impl Into<PathBuf>,
        backup_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        let config_path = config_path.into();
        let backup_dir = backup_dir.into();
        let store = Self {
            naming: BackupNaming::for_config(&config_path),
            config_path,
            backup_dir,
            write_lock: Mutex::new(()),
        };

        let exists = tokio::fs::try_exists(&store.config_path)
            .await
            .map_err(|e| ConfigStoreError::io(&store.config_path, e))?;
        if !exists {
            tracing::info!(
                "Creating new command configuration file at {}",
                store.config_path.display()
            );
            store.write_config(&GuildCommandConfig::default()).await?;
        }
        tokio::fs::create_dir_all(&store.backup_dir)
            .await
            .map_err(|e| ConfigStoreError::io(&store.backup_dir, e))?;

        Ok(store)
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    pub async fn get_all(&self) -> Result<GuildCommandConfig> {
        let bytes = tokio::fs::read(&self.config_path)
            .await
            .map_err(|e| ConfigStoreError::io(&self.config_path, e))?;
        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::error!("Error reading command configuration: {e}");
            ConfigStoreError::corrupt(&self.config_path, e)
        })
    }

    /// Allow-list of `guild_id`; a guild without an entry gets an empty list.
    pub async fn commands_for_guild(&self, guild_id: &str) -> Result<Vec<String>> {
        Ok(self.get_all().await?.commands_for(guild_id).to_vec())
    }

    /// Replaces the allow-list of `guild_id`.
    ///
    /// A backup of the current file is attempted first; its failure is logged
    /// and does not stop the update.
    pub async fn update_commands_for_guild(
        &self,
        guild_id: &str,
        commands: Vec<String>,
    ) -> Result<()> {
        validate_guild_id(guild_id)?;
        validate_commands(guild_id, &commands)?;

        let _guard = self.write_lock.lock().await;
        self.write_backup().await;

        let mut config = self.get_all().await?;
        config.guilds.insert(guild_id.to_string(), commands);
        self.write_config(&config).await?;
        tracing::info!("Updated command configuration for guild {guild_id}");
        Ok(())
    }

    /// Writes a timestamped copy of the current configuration into the backup
    /// directory and returns its path. Failures are logged, never returned.
    pub async fn backup(&self) -> Option<PathBuf> {
        let _guard = self.write_lock.lock().await;
        self.write_backup().await
    }

    /// Replaces the configuration with the contents of `backup_path`.
    ///
    /// Returns `Ok(false)` when the backup cannot be parsed or has no `guilds`
    /// object; the current configuration is left untouched in that case.
    pub async fn restore(&self, backup_path: &Path) -> Result<bool> {
        let bytes = match tokio::fs::read(backup_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ConfigStoreError::BackupNotFound(backup_path.to_path_buf()))
            }
            Err(e) => {
                tracing::error!(
                    "Error restoring config backup from {}: {e}",
                    backup_path.display()
                );
                return Ok(false);
            }
        };

        let config = match GuildCommandConfig::from_snapshot(&bytes) {
            Ok(config) => config,
            Err(reason) => {
                tracing::error!(
                    "Invalid backup file {}: {reason}",
                    backup_path.display()
                );
                return Ok(false);
            }
        };

        let _guard = self.write_lock.lock().await;
        if let Err(e) = self.write_config(&config).await {
            tracing::error!("Error restoring config backup: {e}");
            return Ok(false);
        }
        tracing::info!("Restored configuration from {}", backup_path.display());
        Ok(true)
    }

    /// Backups of this configuration, oldest first.
    pub async fn list_backups(&self) -> Result<Vec<PathBuf>> {
        let mut dir = tokio::fs::read_dir(&self.backup_dir)
            .await
            .map_err(|e| ConfigStoreError::io(&self.backup_dir, e))?;
        let mut paths = vec![];
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| ConfigStoreError::io(&self.backup_dir, e))?
        {
            paths.push(entry.path());
        }
        Ok(self.naming.sorted(paths))
    }

    async fn write_backup(&self) -> Option<PathBuf> {
        match self.try_write_backup().await {
            Ok(path) => {
                tracing::info!("Created configuration backup at {}", path.display());
                Some(path)
            }
            Err(e) => {
                tracing::error!("Error creating config backup: {e}");
                None
            }
        }
    }

    async fn try_write_backup(&self) -> Result<PathBuf> {
        let config = self.get_all().await?;
        let now = chrono::Local::now();
        let mut generation = 0;
        let path = loop {
            let candidate = self.backup_dir.join(self.naming.file_name(&now, generation));
            let taken = tokio::fs::try_exists(&candidate)
                .await
                .map_err(|e| ConfigStoreError::io(&candidate, e))?;
            if !taken {
                break candidate;
            }
            generation += 1;
        };
        let json = serde_json::to_vec_pretty(&config)
            .map_err(|e| ConfigStoreError::corrupt(&path, e))?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| ConfigStoreError::io(&path, e))?;
        Ok(path)
    }

    /// Writes to a sibling temporary file and renames it over the target, so a
    /// reader never sees a half-written configuration.
    async fn write_config(&self, config: &GuildCommandConfig) -> Result<()> {
        let json = serde_json::to_vec_pretty(config)
            .map_err(|e| ConfigStoreError::corrupt(&self.config_path, e))?;
        let mut tmp_name = self
            .config_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        tmp_name.push(".tmp");
        let tmp_path = self.config_path.with_file_name(tmp_name);

        tokio::fs::write(&tmp_path, json)
            .await
            .map_err(|e| ConfigStoreError::io(&tmp_path, e))?;
        tokio::fs::rename(&tmp_path, &self.config_path)
            .await
            .map_err(|e| {
                tracing::error!("Error writing command configuration: {e}");
                ConfigStoreError::io(&self.config_path, e)
            })
    }
}

fn validate_guild_id(guild_id: &str) -> Result<()> {
    if guild_id.is_empty()
        || !guild_id.bytes().all(|b| b.is_ascii_digit())
        || !guild_id.parse::<u64>().is_ok_and(|id| id != 0)
    {
        return Err(ConfigStoreError::InvalidArgument(format!(
            "guild id {guild_id:?} is not a non-zero 64-bit integer"
        )));
    }
    Ok(())
}

fn validate_commands(guild_id: &str, commands: &[String]) -> Result<()> {
    if let Some(pos) = commands.iter().position(|c| c.trim().is_empty()) {
        return Err(ConfigStoreError::InvalidArgument(format!(
            "command name at position {pos} is blank"
        )));
    }
    let mut seen = HashSet::new();
    for name in commands {
        if !seen.insert(name.as_str()) {
            tracing::warn!("Command {name} is listed more than once for guild {guild_id}");
        }
    }
    Ok(())
}
