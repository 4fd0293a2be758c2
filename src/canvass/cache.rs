// Offline copy of the padron.

use log::{debug, info, warn};

use crate::canvass::{io_common::*, *};

/// A file-backed cache of the raw padron rows.
///
/// A missing or unreadable cache is a miss, not an error: the padron is
/// simply not available yet.
#[derive(Debug, Clone)]
pub struct RollCache {
    dir: PathBuf,
}

impl RollCache {
    pub const FILE_NAME: &'static str = "padron.json";

    pub fn new(dir: PathBuf) -> RollCache {
        RollCache { dir }
    }

    fn file(&self) -> PathBuf {
        self.dir.join(RollCache::FILE_NAME)
    }

    pub fn store_all(&self, rows: &[Row]) -> CanvassResult<()> {
        let path = self.file().display().to_string();
        fs::create_dir_all(&self.dir).context(WritingCacheSnafu {
            path: self.dir.display().to_string(),
        })?;
        let contents = serde_json::to_string(rows).context(ParsingJsonSnafu {
            path: path.as_str(),
        })?;
        fs::write(&path, contents).context(WritingCacheSnafu {
            path: path.as_str(),
        })?;
        info!("Stored {} padron rows in the cache {:?}", rows.len(), path);
        Ok(())
    }

    pub fn get_all(&self) -> Option<Vec<Row>> {
        let path = self.file();
        if !path.exists() {
            debug!("get_all: cache miss {:?}", path);
            return None;
        }
        let contents = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                warn!("Could not read the padron cache {:?}: {}", path, e);
                return None;
            }
        };
        match serde_json::from_str::<Vec<Row>>(contents.as_str()) {
            Ok(rows) => Some(rows),
            Err(e) => {
                warn!("The padron cache {:?} is corrupted: {}", path, e);
                None
            }
        }
    }

    pub fn clear(&self) -> CanvassResult<()> {
        let path = self.file();
        if path.exists() {
            fs::remove_file(&path).context(WritingCacheSnafu {
                path: path.display().to_string(),
            })?;
            info!("Cleared the padron cache {:?}", path);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_cache(name: &str) -> RollCache {
        let dir = std::env::temp_dir().join(format!(
            "padron-cache-test-{}-{}",
            std::process::id(),
            name
        ));
        let _ = fs::remove_dir_all(&dir);
        RollCache::new(dir)
    }

    fn rows() -> Vec<Row> {
        match json!([{"ci": "1.000.100", "nombre": "Ana"}, {"ci": 2000300}]) {
            JSValue::Array(l) => l
                .into_iter()
                .filter_map(|x| match x {
                    JSValue::Object(m) => Some(m),
                    _ => None,
                })
                .collect(),
            _ => vec![],
        }
    }

    #[test]
    fn round_trip_and_clear() {
        let cache = temp_cache("round_trip");
        assert_eq!(cache.get_all(), None);
        cache.store_all(&rows()).unwrap();
        assert_eq!(cache.get_all(), Some(rows()));
        cache.clear().unwrap();
        assert_eq!(cache.get_all(), None);
        // Clearing twice is fine.
        cache.clear().unwrap();
    }

    #[test]
    fn corrupted_cache_is_a_miss() {
        let cache = temp_cache("corrupted");
        fs::create_dir_all(&cache.dir).unwrap();
        fs::write(cache.file(), "{not json").unwrap();
        assert_eq!(cache.get_all(), None);
        cache.clear().unwrap();
    }

    #[test]
    fn padron_falls_back_to_cache() {
        let cache = temp_cache("fallback");
        cache.store_all(&rows()).unwrap();
        let missing = FileSource {
            provider: "csv".to_string(),
            file_path: "does_not_exist.csv".to_string(),
            worksheet_name: None,
        };
        let dir = std::env::temp_dir();
        let roll = load_tables(
            &CanvassConfig {
                output_settings: OutputSettings {
                    campaign_name: "t".to_string(),
                    output_path: None,
                },
                sources: Sources {
                    padron: missing,
                    coordinadores: None,
                    subcoordinadores: None,
                    votantes: None,
                },
                cache: None,
                search: None,
            },
            &dir,
            Some(&cache),
        )
        .roll;
        assert_eq!(roll.len(), 2);
        assert_eq!(roll[1].ci, "2000300");
        cache.clear().unwrap();
    }
}
