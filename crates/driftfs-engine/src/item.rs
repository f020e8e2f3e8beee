use crate::error::{EngineError, Result};
use crate::time::timestamp_of;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemKind {
    Folder,
    File,
    /// Sentinel for "no such entry"; a default-constructed item is Unknown.
    #[default]
    Unknown,
}

/// A file or folder entry in the remote store, addressed by an opaque id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriveItem {
    pub id: String,
    pub name: String,
    pub kind: ItemKind,
    /// Size in bytes; meaningful for files only.
    pub size: u64,
    /// Creation time, whole seconds since the epoch.
    pub created_secs: i64,
    /// Last-modified time, whole seconds since the epoch.
    pub modified_secs: i64,
    /// Content-integrity digest supplied by the remote store (files only).
    pub sha1_hash: Option<String>,
    /// Short-lived direct-content locator (files only).
    pub download_url: Option<String>,
}

impl DriveItem {
    pub fn is_folder(&self) -> bool {
        self.kind == ItemKind::Folder
    }

    pub fn is_file(&self) -> bool {
        self.kind == ItemKind::File
    }

    /// True for the "not found" sentinel.
    pub fn is_unknown(&self) -> bool {
        self.kind == ItemKind::Unknown
    }

    /// Builds an item from one remote JSON node.
    ///
    /// The `folder`/`file` facets decide the kind; a node with neither
    /// stays Unknown. Numeric fields are parsed eagerly here so malformed
    /// input fails the ingestion instead of a later call site.
    pub fn from_json(node: &Value) -> Result<DriveItem> {
        let kind = if node.get("folder").is_some() {
            ItemKind::Folder
        } else if node.get("file").is_some() {
            ItemKind::File
        } else {
            ItemKind::Unknown
        };

        let sha1_hash = node
            .pointer("/file/hashes/sha1Hash")
            .and_then(Value::as_str)
            .map(str::to_string);
        let download_url = node
            .get("@microsoft.graph.downloadUrl")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(DriveItem {
            id: str_field(node, "id"),
            name: str_field(node, "name"),
            kind,
            size: u64_field(node, "size")?,
            created_secs: timestamp_of(&str_field(node, "createdDateTime")).0,
            modified_secs: timestamp_of(&str_field(node, "lastModifiedDateTime")).0,
            sha1_hash,
            download_url,
        })
    }

    /// Parses a listing response (`{"value": [...]}`) into items.
    pub fn list_from_json(root: &Value) -> Result<Vec<DriveItem>> {
        let nodes = root
            .get("value")
            .and_then(Value::as_array)
            .ok_or_else(|| EngineError::Malformed("listing has no value array".to_string()))?;
        nodes.iter().map(DriveItem::from_json).collect()
    }
}

pub(crate) fn str_field(node: &Value, name: &str) -> String {
    node.get(name)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Accepts a JSON number or a numeric string; absent means zero.
pub(crate) fn u64_field(node: &Value, name: &str) -> Result<u64> {
    match node.get(name) {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Number(n)) => n.as_u64().ok_or_else(|| {
            EngineError::Malformed(format!("field {} is not an unsigned integer: {}", name, n))
        }),
        Some(Value::String(s)) => s.parse::<u64>().map_err(|_| {
            EngineError::Malformed(format!("field {} is not numeric: {:?}", name, s))
        }),
        Some(other) => Err(EngineError::Malformed(format!(
            "field {} has unexpected type: {}",
            name, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_item_is_unknown_sentinel() {
        let item = DriveItem::default();
        assert!(item.is_unknown());
        assert!(item.id.is_empty());
        assert_eq!(item.size, 0);
    }

    #[test]
    fn test_folder_facet() {
        let node = json!({
            "id": "f1",
            "name": "docs",
            "folder": {"childCount": 3},
            "createdDateTime": "2024-03-01T12:00:00Z",
            "lastModifiedDateTime": "2024-03-02T08:15:00Z"
        });
        let item = DriveItem::from_json(&node).unwrap();
        assert!(item.is_folder());
        assert_eq!(item.id, "f1");
        assert_eq!(item.name, "docs");
        assert!(item.sha1_hash.is_none());
        assert!(item.created_secs > 0);
        assert!(item.modified_secs > item.created_secs);
    }

    #[test]
    fn test_file_facet_with_hash_and_download_url() {
        let node = json!({
            "id": "i1",
            "name": "report.pdf",
            "size": 123456,
            "file": {"hashes": {"sha1Hash": "ABC123"}},
            "@microsoft.graph.downloadUrl": "https://dl.example.com/i1",
            "createdDateTime": "2024-01-01T00:00:00Z",
            "lastModifiedDateTime": "2024-01-01T00:00:00Z"
        });
        let item = DriveItem::from_json(&node).unwrap();
        assert!(item.is_file());
        assert_eq!(item.size, 123456);
        assert_eq!(item.sha1_hash.as_deref(), Some("ABC123"));
        assert_eq!(item.download_url.as_deref(), Some("https://dl.example.com/i1"));
    }

    #[test]
    fn test_string_size_is_parsed_eagerly() {
        let node = json!({
            "id": "i2",
            "name": "legacy.bin",
            "size": "98765",
            "file": {}
        });
        let item = DriveItem::from_json(&node).unwrap();
        assert_eq!(item.size, 98765);
    }

    #[test]
    fn test_malformed_size_fails_ingestion() {
        let node = json!({
            "id": "i3",
            "name": "bad.bin",
            "size": "lots",
            "file": {}
        });
        let err = DriveItem::from_json(&node).unwrap_err();
        assert!(matches!(err, EngineError::Malformed(_)));
    }

    #[test]
    fn test_neither_facet_is_unknown() {
        let node = json!({"id": "x", "name": "mystery"});
        let item = DriveItem::from_json(&node).unwrap();
        assert!(item.is_unknown());
    }

    #[test]
    fn test_missing_size_defaults_to_zero() {
        let node = json!({"id": "f2", "name": "empty", "folder": {}});
        assert_eq!(DriveItem::from_json(&node).unwrap().size, 0);
    }

    #[test]
    fn test_unparsable_timestamps_fall_back_to_epoch() {
        let node = json!({
            "id": "i4",
            "name": "odd",
            "file": {},
            "createdDateTime": "yesterday-ish"
        });
        let item = DriveItem::from_json(&node).unwrap();
        assert_eq!(item.created_secs, 0);
        assert_eq!(item.modified_secs, 0);
    }

    #[test]
    fn test_list_from_json() {
        let root = json!({
            "value": [
                {"id": "a", "name": "docs", "folder": {}},
                {"id": "b", "name": "a.txt", "size": 10, "file": {}}
            ]
        });
        let items = DriveItem::list_from_json(&root).unwrap();
        assert_eq!(items.len(), 2);
        assert!(items[0].is_folder());
        assert!(items[1].is_file());
    }

    #[test]
    fn test_list_without_value_array_is_malformed() {
        let root = json!({"error": {"code": "generalException"}});
        assert!(matches!(
            DriveItem::list_from_json(&root),
            Err(EngineError::Malformed(_))
        ));
    }
}
