use chrono::{DateTime, TimeZone};
use std::fmt::Display;
use std::path::{Path, PathBuf};

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Naming scheme for backups of one configuration file:
/// `<stem>_backup_<YYYYMMDD_HHMMSS>[_<generation>].<ext>`.
///
/// The generation suffix is only added when a backup with the same timestamp
/// already exists.
#[derive(Debug, Clone)]
pub struct BackupNaming {
    stem: String,
    extension: String,
}

impl BackupNaming {
    pub fn for_config(config_path: &Path) -> Self {
        let stem = config_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("config")
            .to_string();
        let extension = config_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("json")
            .to_string();
        Self { stem, extension }
    }

    fn prefix(&self) -> String {
        format!("{}_backup_", self.stem)
    }

    pub fn file_name<Tz: TimeZone>(&self, time: &DateTime<Tz>, generation: u32) -> String
    where
        Tz::Offset: Display,
    {
        let timestamp = time.format(TIMESTAMP_FORMAT);
        match generation {
            0 => format!("{}{timestamp}.{}", self.prefix(), self.extension),
            n => format!("{}{timestamp}_{n}.{}", self.prefix(), self.extension),
        }
    }

    /// Extracts `(timestamp, generation)` from a file name produced by
    /// [`BackupNaming::file_name`], or `None` for unrelated files.
    pub fn parse(&self, file_name: &str) -> Option<(String, u32)> {
        let body = file_name
            .strip_prefix(&self.prefix())?
            .strip_suffix(&format!(".{}", self.extension))?;
        let (timestamp, generation) = match body.split_at_checked(15)? {
            (ts, "") => (ts, 0),
            (ts, rest) => (ts, rest.strip_prefix('_')?.parse().ok()?),
        };
        if !timestamp
            .chars()
            .enumerate()
            .all(|(i, c)| if i == 8 { c == '_' } else { c.is_ascii_digit() })
        {
            return None;
        }
        Some((timestamp.to_string(), generation))
    }

    /// Sorts backup paths oldest first, dropping files that are not backups.
    pub fn sorted(&self, paths: impl IntoIterator<Item = PathBuf>) -> Vec<PathBuf> {
        let mut keyed = paths
            .into_iter()
            .filter_map(|path| {
                let key = self.parse(path.file_name()?.to_str()?)?;
                Some((key, path))
            })
            .collect::<Vec<_>>();
        keyed.sort_by(|(a, _), (b, _)| a.cmp(b));
        keyed.into_iter().map(|(_, path)| path).collect()
    }
}
