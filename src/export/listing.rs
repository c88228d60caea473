use anyhow::{anyhow, Result};
use serde_json::Value;
use tracing::warn;

const DATA_SOURCE_FIELD: &str = "dataSource";
const DATA_STREAM_ID_FIELD: &str = "dataStreamId";

/// Entries of the `dataSource` array, in listing order.
/// A listing without that array has no entries.
pub fn data_source_entries(listing: &Value) -> &[Value] {
    match listing.get(DATA_SOURCE_FIELD).and_then(Value::as_array) {
        Some(entries) => entries,
        None => {
            warn!("data source listing has no '{}' array", DATA_SOURCE_FIELD);
            &[]
        }
    }
}

/// Identifier of one listing entry: either the bare string or the
/// `dataStreamId` of a data source object.
pub fn data_source_id(entry: &Value) -> Result<&str> {
    match entry {
        Value::String(id) => Ok(id),
        Value::Object(fields) => fields
            .get(DATA_STREAM_ID_FIELD)
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("data source object has no '{}'", DATA_STREAM_ID_FIELD)),
        other => Err(anyhow!("unexpected data source entry: {}", other)),
    }
}

/// Printable name of an entry, also for entries without a usable id.
pub fn describe(entry: &Value) -> String {
    data_source_id(entry)
        .map(str::to_owned)
        .unwrap_or_else(|_| entry.to_string())
}
