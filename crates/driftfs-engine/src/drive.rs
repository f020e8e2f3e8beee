use crate::error::{EngineError, Result};
use crate::item::{str_field, u64_field};
use serde_json::Value;

/// Display name and id of the drive owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Owner {
    pub display_name: String,
    pub id: String,
}

/// Storage quota figures, parsed into bytes at the API boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Quota {
    pub deleted: u64,
    pub remaining: u64,
    pub total: u64,
    pub used: u64,
    pub state: String,
}

/// Root-level container metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriveInfo {
    pub id: String,
    pub drive_type: String,
    pub owner: Owner,
    pub quota: Quota,
}

impl DriveInfo {
    pub fn from_json(node: &Value) -> Result<DriveInfo> {
        let owner = Owner {
            display_name: node
                .pointer("/owner/user/displayName")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            id: node
                .pointer("/owner/user/id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        };

        let quota_node = node.get("quota").cloned().unwrap_or(Value::Null);
        let quota = match &quota_node {
            Value::Null => Quota::default(),
            q => Quota {
                deleted: u64_field(q, "deleted")?,
                remaining: u64_field(q, "remaining")?,
                total: u64_field(q, "total")?,
                used: u64_field(q, "used")?,
                state: str_field(q, "state"),
            },
        };

        Ok(DriveInfo {
            id: str_field(node, "id"),
            drive_type: str_field(node, "driveType"),
            owner,
            quota,
        })
    }

    /// Parses a drive-listing response (`{"value": [...]}`).
    pub fn list_from_json(root: &Value) -> Result<Vec<DriveInfo>> {
        let nodes = root
            .get("value")
            .and_then(Value::as_array)
            .ok_or_else(|| EngineError::Malformed("drive listing has no value array".to_string()))?;
        nodes.iter().map(DriveInfo::from_json).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn drive_node() -> Value {
        json!({
            "id": "d1",
            "driveType": "personal",
            "owner": {"user": {"displayName": "Sam Doe", "id": "u1"}},
            "quota": {
                "deleted": 1024,
                "remaining": 5000000,
                "state": "normal",
                "total": 10000000,
                "used": 4998976
            }
        })
    }

    #[test]
    fn test_drive_from_json() {
        let drive = DriveInfo::from_json(&drive_node()).unwrap();
        assert_eq!(drive.id, "d1");
        assert_eq!(drive.drive_type, "personal");
        assert_eq!(drive.owner.display_name, "Sam Doe");
        assert_eq!(drive.owner.id, "u1");
        assert_eq!(drive.quota.total, 10000000);
        assert_eq!(drive.quota.used, 4998976);
        assert_eq!(drive.quota.state, "normal");
    }

    #[test]
    fn test_quota_accepts_string_figures() {
        let node = json!({
            "id": "d2",
            "driveType": "business",
            "quota": {"total": "2048", "used": "1024", "remaining": "1024"}
        });
        let drive = DriveInfo::from_json(&node).unwrap();
        assert_eq!(drive.quota.total, 2048);
        assert_eq!(drive.quota.used, 1024);
        assert_eq!(drive.quota.deleted, 0);
    }

    #[test]
    fn test_malformed_quota_fails_eagerly() {
        let node = json!({
            "id": "d3",
            "driveType": "personal",
            "quota": {"total": "plenty"}
        });
        assert!(matches!(
            DriveInfo::from_json(&node),
            Err(EngineError::Malformed(_))
        ));
    }

    #[test]
    fn test_missing_owner_and_quota_default() {
        let drive = DriveInfo::from_json(&json!({"id": "d4"})).unwrap();
        assert!(drive.owner.display_name.is_empty());
        assert_eq!(drive.quota, Quota::default());
    }

    #[test]
    fn test_list_from_json() {
        let root = json!({"value": [drive_node(), {"id": "d5", "driveType": "personal"}]});
        let drives = DriveInfo::list_from_json(&root).unwrap();
        assert_eq!(drives.len(), 2);
        assert_eq!(drives[0].id, "d1");
        assert_eq!(drives[1].id, "d5");
    }
}
