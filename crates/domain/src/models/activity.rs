//! Activity log domain model.
//!
//! Append-only audit rows. This subsystem only writes them (one per created
//! import lease, one per executed renewal); reading is out of scope.

use serde::Serialize;
use uuid::Uuid;

/// Input for appending one activity row.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewActivity {
    pub organization_id: Uuid,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl NewActivity {
    /// Activity for a lease created through bulk import.
    pub fn lease_imported(organization_id: Uuid, lease_id: Uuid, row: usize) -> Self {
        Self {
            organization_id,
            action: "lease.imported".into(),
            entity_type: "lease".into(),
            entity_id: lease_id,
            detail: Some(format!("Imported from spreadsheet row {}", row)),
        }
    }

    /// Activity for an executed auto-renewal.
    pub fn lease_renewed(organization_id: Uuid, original_id: Uuid, successor_id: Uuid) -> Self {
        Self {
            organization_id,
            action: "lease.renewed".into(),
            entity_type: "lease".into(),
            entity_id: original_id,
            detail: Some(format!("Renewed into lease {}", successor_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lease_imported_activity() {
        let org = Uuid::new_v4();
        let lease = Uuid::new_v4();
        let activity = NewActivity::lease_imported(org, lease, 7);
        assert_eq!(activity.action, "lease.imported");
        assert_eq!(activity.entity_id, lease);
        assert_eq!(
            activity.detail.as_deref(),
            Some("Imported from spreadsheet row 7")
        );
    }

    #[test]
    fn test_lease_renewed_activity() {
        let successor = Uuid::new_v4();
        let activity = NewActivity::lease_renewed(Uuid::new_v4(), Uuid::new_v4(), successor);
        assert_eq!(activity.action, "lease.renewed");
        assert!(activity.detail.unwrap().contains(&successor.to_string()));
    }
}
