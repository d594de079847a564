// Recently opened ROMs, persisted as JSON next to the preferences file

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const RECENT_ROMS_FILE: &str = "famicore-recent.json";
const MAX_ENTRIES: usize = 10;

/// One remembered ROM
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentRom {
    pub path: PathBuf,
    /// RFC 3339 timestamp of the last launch
    pub opened_at: String,
}

/// Most-recent-first list of launched ROMs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecentRomsList {
    entries: Vec<RecentRom>,
}

impl RecentRomsList {
    pub fn load_or_default() -> Self {
        fs::read_to_string(RECENT_ROMS_FILE)
            .ok()
            .and_then(|contents| serde_json::from_str(&contents).ok())
            .unwrap_or_default()
    }

    pub fn save(&self) -> Result<(), io::Error> {
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(RECENT_ROMS_FILE, contents)
    }

    /// Record a launch, promoting an existing entry to the front
    pub fn add<P: AsRef<Path>>(&mut self, path: P) {
        let path = path.as_ref();
        self.entries.retain(|entry| entry.path != path);
        self.entries.insert(
            0,
            RecentRom {
                path: path.to_path_buf(),
                opened_at: chrono::Local::now().to_rfc3339(),
            },
        );
        self.entries.truncate(MAX_ENTRIES);
    }

    pub fn entries(&self) -> &[RecentRom] {
        &self.entries
    }

    pub fn most_recent(&self) -> Option<&Path> {
        self.entries.first().map(|entry| entry.path.as_path())
    }
}
