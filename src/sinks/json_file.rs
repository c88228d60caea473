use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Serializer, Value};
use tokio::fs;
use tracing::info;

const INDENT: &[u8] = b"    ";

/// Writes JSON documents as `<dir>/<name>.json`, sorted keys, 4-space indent.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    dir: PathBuf,
}

impl JsonFileSink {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }

    pub async fn save(&self, name: &str, data: &Value) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("cannot create '{}'", self.dir.display()))?;

        let path = self.path_for(name);
        fs::write(&path, render(data)?)
            .await
            .with_context(|| format!("cannot write '{}'", path.display()))?;
        info!("saved '{}'", path.display());
        Ok(path)
    }
}

/// Deterministic rendering: identical input gives identical bytes.
pub fn render(data: &Value) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    sort_keys(data).serialize(&mut serializer)?;
    Ok(buf)
}

/// Rebuild every object with its keys in ascending order, whatever
/// map implementation serde_json was compiled with.
fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let mut sorted = Map::new();
            for (key, value) in entries {
                sorted.insert(key.clone(), sort_keys(value));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}
