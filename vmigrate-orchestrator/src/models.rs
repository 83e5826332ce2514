use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Credentials {
    pub id: String,
    pub username: String,
    pub password: String,
    pub domain: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MountPoint {
    pub id: String,
    pub name: String,
    pub total_size: i64,
}

/// A managed virtual machine and the mount points attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Workload {
    pub id: String,
    pub address: String,
    pub credentials: Option<String>,
    /// Mount point ids, sorted.
    pub storage: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CloudType {
    #[default]
    Aws,
    Azure,
    Vsphere,
    Vcloud,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MigrationTarget {
    pub id: String,
    pub cloud_type: CloudType,
    pub cloud_credentials: Option<String>,
    /// Workload currently bound as the provisioned destination.
    pub target_vm: Option<String>,
}

/// Lifecycle of a migration.
///
/// `NotStarted | Error -> Running -> Success | Error`. Only `NotStarted` and
/// `Error` may start a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MigrationState {
    NotStarted,
    Running,
    Error,
    Success,
}

impl MigrationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MigrationState::NotStarted => "not_started",
            MigrationState::Running => "running",
            MigrationState::Error => "error",
            MigrationState::Success => "success",
        }
    }

    pub fn can_start(&self) -> bool {
        matches!(self, MigrationState::NotStarted | MigrationState::Error)
    }
}

impl fmt::Display for MigrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Migration {
    pub id: String,
    /// Mount point ids requested for the move, sorted.
    pub selected_mount_points: Vec<String>,
    pub source: Option<String>,
    pub target: Option<String>,
    pub migration_state: MigrationState,
    pub last_error: Option<String>,

    #[serde(serialize_with = "serialize_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(serialize_with = "serialize_datetime")]
    pub updated_at: DateTime<Utc>,
}

/// Workload record to be inserted by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWorkload {
    pub address: String,
    pub credentials: Option<String>,
    pub storage: Vec<String>,
}

impl NewWorkload {
    /// A workload sharing `source`'s address and credentials but holding only `storage`.
    pub fn derived_from(source: &Workload, storage: impl IntoIterator<Item = String>) -> Self {
        Self {
            address: source.address.clone(),
            credentials: source.credentials.clone(),
            storage: storage.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateCredentialsRequest {
    pub username: String,
    pub password: String,
    pub domain: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateCredentialsRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub domain: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateMountPointRequest {
    pub name: String,
    pub total_size: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateMountPointRequest {
    pub name: Option<String>,
    pub total_size: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateWorkloadRequest {
    pub address: String,
    pub credentials: Option<String>,
    pub storage: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateWorkloadRequest {
    /// Rejected when present: a workload's address is fixed at creation.
    pub address: Option<String>,
    pub credentials: Option<String>,
    pub storage: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateMigrationTargetRequest {
    pub cloud_type: Option<CloudType>,
    pub cloud_credentials: Option<String>,
    pub target_vm: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateMigrationTargetRequest {
    pub cloud_type: Option<CloudType>,
    pub cloud_credentials: Option<String>,
    pub target_vm: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateMigrationRequest {
    pub selected_mount_points: Vec<String>,
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateMigrationRequest {
    pub selected_mount_points: Option<Vec<String>>,
    pub source: Option<String>,
    pub target: Option<String>,
}

// Serialize DateTime as RFC 3339 / ISO 8601 string
fn serialize_datetime<S>(dt: &DateTime<Utc>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&dt.to_rfc3339())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migration_state_wire_names() {
        let json = serde_json::to_string(&MigrationState::NotStarted).unwrap();
        assert_eq!(json, "\"not_started\"");

        let parsed: MigrationState = serde_json::from_str("\"success\"").unwrap();
        assert_eq!(parsed, MigrationState::Success);
        assert_eq!(MigrationState::Running.to_string(), "running");
    }

    #[test]
    fn only_not_started_and_error_can_start() {
        assert!(MigrationState::NotStarted.can_start());
        assert!(MigrationState::Error.can_start());
        assert!(!MigrationState::Running.can_start());
        assert!(!MigrationState::Success.can_start());
    }

    #[test]
    fn cloud_type_defaults_to_aws() {
        assert_eq!(CloudType::default(), CloudType::Aws);
        let parsed: CloudType = serde_json::from_str("\"vsphere\"").unwrap();
        assert_eq!(parsed, CloudType::Vsphere);
    }
}
