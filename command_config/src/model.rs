use crate::error::SnapshotError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Contents of the command configuration file.
///
/// `guilds` maps a guild id (decimal string) to the ordered list of command
/// names that guild may use. Any other top-level key found in the file is kept
/// in `extra` and written back untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuildCommandConfig {
    #[serde(default)]
    pub guilds: BTreeMap<String, Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GuildCommandConfig {
    pub fn commands_for(&self, guild_id: &str) -> &[String] {
        self.guilds.get(guild_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Parses a snapshot that must carry a `guilds` object of string lists.
    ///
    /// Unlike plain deserialization, a missing `guilds` key is rejected here.
    pub fn from_snapshot(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let value: Value = serde_json::from_slice(bytes)?;
        match value.get("guilds") {
            Some(Value::Object(_)) => {}
            Some(_) => return Err(SnapshotError::GuildsNotObject),
            None => return Err(SnapshotError::MissingGuilds),
        }
        Ok(serde_json::from_value(value)?)
    }
}
