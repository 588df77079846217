use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Read-only access to per-guild settings kept in a JSON5 file keyed by guild
/// id.
#[derive(Debug, Clone)]
pub struct ServerConfigReader {
    path: PathBuf,
}

impl ServerConfigReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Settings object of `guild_id`. Empty when the file is missing,
    /// unreadable, or has no entry for the guild.
    pub async fn guild(&self, guild_id: &str) -> Map<String, Value> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Map::new(),
            Err(e) => {
                tracing::error!("Error reading server config for guild {guild_id}: {e}");
                return Map::new();
            }
        };
        match json5::from_str::<Map<String, Value>>(&content) {
            Ok(mut all) => match all.remove(guild_id) {
                Some(Value::Object(config)) => config,
                _ => Map::new(),
            },
            Err(e) => {
                tracing::error!("Error reading server config for guild {guild_id}: {e}");
                Map::new()
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Snowflake {
    Number(u64),
    Text(String),
}

impl Snowflake {
    /// The id, unless it is unparsable or zero.
    fn get(&self) -> Option<u64> {
        let id = match self {
            Snowflake::Number(n) => Some(*n),
            Snowflake::Text(s) => s.trim().parse().ok(),
        };
        id.filter(|id| *id != 0)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RawWelcome {
    #[serde(default)]
    enabled: bool,
    channel_id: Option<Snowflake>,
    #[serde(default)]
    message: String,
    embed: Option<Value>,
}

/// Welcome message settings of one guild, present only when enabled.
#[derive(Debug, Clone, PartialEq)]
pub struct WelcomeConfig {
    pub channel_id: Option<u64>,
    pub message: String,
    pub embed: Option<Value>,
}

impl WelcomeConfig {
    pub fn from_guild_config(config: &Map<String, Value>) -> Option<Self> {
        let raw = config.get("welcome")?;
        let raw: RawWelcome = match serde_json::from_value(raw.clone()) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Ignoring malformed welcome settings: {e}");
                return None;
            }
        };
        if !raw.enabled {
            return None;
        }
        Some(Self {
            channel_id: raw.channel_id.as_ref().and_then(Snowflake::get),
            message: raw.message,
            embed: raw.embed.filter(|e| !e.is_null()),
        })
    }

    /// Message text with every `{user}` placeholder replaced by `mention`.
    pub fn render(&self, mention: &str) -> String {
        self.message.replace("{user}", mention)
    }
}
