//! Pure construction of the in-memory (Job, JobDetail) pair for one
//! partition. No I/O happens here; everything the builder needs is
//! resolved beforehand and passed in.

use crate::entities;
use crate::naming;
use serde::{Deserialize, Serialize};

/// Lifecycle status values carried in the job's `status` column.
pub mod status {
    pub const START: &str = "start";
    pub const WAITING: &str = "waiting";
    pub const RUNNING: &str = "running";
    pub const COMPLETE: &str = "complete";
    pub const CANCELLED: &str = "cancelled";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupMode {
    Full,
    #[serde(alias = "inc")]
    Increment,
    Change,
    Update,
    Smart,
}

impl BackupMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackupMode::Full => "full",
            BackupMode::Increment => "increment",
            BackupMode::Change => "change",
            BackupMode::Update => "update",
            BackupMode::Smart => "smart",
        }
    }
}

/// Resolved inputs shared by every partition in one registration batch.
#[derive(Debug, Clone)]
pub struct BatchContext {
    pub server: entities::server::Model,
    pub center_id: i64,
    pub owner_user: i64,
    pub repository: entities::repository::Model,
    pub schedule_id: i64,
    pub schedule_id_advanced: i64,
    pub mode: BackupMode,
    pub explicit_name: Option<String>,
    pub description: Option<String>,
    pub rotation: i64,
    pub compression: bool,
    pub encryption: bool,
    pub exclude_dir: Vec<String>,
    pub network_limit: i64,
    pub auto_start: bool,
}

/// One job row as built in memory, before any identity exists.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub owner_user: i64,
    pub center_id: i64,
    pub system_name: String,
    pub job_name: String,
    pub status: String,
    pub schedule_id: i64,
    pub schedule_id_advanced: i64,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewJobDetail {
    pub backup_mode: String,
    pub rotation: i64,
    pub compression: bool,
    pub encryption: bool,
    pub partition: String,
    pub exclude_dir: Vec<String>,
    pub repository_id: i64,
    pub repository_type: String,
    pub repository_path: Option<String>,
    pub network_limit: i64,
}

/// The in-memory (Job, JobDetail) pair for one partition, plus the
/// candidate naming suffix feeding the batch naming barrier. Explicit
/// caller names carry no candidate.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub job: NewJob,
    pub detail: NewJobDetail,
    pub candidate_suffix: Option<i64>,
}

impl Dataset {
    /// Rewrite the name placeholder with the batch-wide suffix. A
    /// dataset built from an explicit name is left untouched.
    pub fn finalize_name(&mut self, batch_suffix: i64) {
        if self.candidate_suffix.is_some() {
            self.job.job_name = naming::finalize_name(&self.job.job_name, batch_suffix);
        }
    }
}

/// Combine the shared batch context with one partition into a dataset.
///
/// The self-referencing job identifier is not set here; it only exists
/// once the store assigns an identity during persistence. Defaults for
/// absent optional fields: rotation 1, compression and encryption off,
/// no exclusions, network limit 0 (unlimited).
pub fn build_dataset(
    ctx: &BatchContext,
    partition: &str,
    candidate_suffix: Option<i64>,
) -> Dataset {
    let job_name = match &ctx.explicit_name {
        Some(name) => name.clone(),
        None => naming::template_name(&ctx.server.name, partition),
    };

    let status = if ctx.auto_start {
        status::START
    } else {
        status::WAITING
    };

    Dataset {
        job: NewJob {
            owner_user: ctx.owner_user,
            center_id: ctx.center_id,
            system_name: ctx.server.name.clone(),
            job_name,
            status: status.to_string(),
            schedule_id: ctx.schedule_id,
            schedule_id_advanced: ctx.schedule_id_advanced,
            description: ctx.description.clone(),
        },
        detail: NewJobDetail {
            backup_mode: ctx.mode.as_str().to_string(),
            rotation: ctx.rotation,
            compression: ctx.compression,
            encryption: ctx.encryption,
            partition: partition.to_string(),
            exclude_dir: ctx.exclude_dir.clone(),
            repository_id: ctx.repository.id,
            repository_type: ctx.repository.repo_type.clone(),
            repository_path: ctx.repository.path.clone(),
            network_limit: ctx.network_limit,
        },
        candidate_suffix,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> BatchContext {
        BatchContext {
            server: entities::server::Model {
                id: 1,
                name: "srv01".to_string(),
                center_id: 1,
                os: None,
                created_at: 0,
            },
            center_id: 1,
            owner_user: 7,
            repository: entities::repository::Model {
                id: 5,
                center_id: 1,
                repo_type: "nfs".to_string(),
                path: Some("/exports/backups".to_string()),
                name: None,
                created_at: 0,
            },
            schedule_id: 0,
            schedule_id_advanced: 0,
            mode: BackupMode::Full,
            explicit_name: None,
            description: None,
            rotation: 1,
            compression: false,
            encryption: false,
            exclude_dir: vec![],
            network_limit: 0,
            auto_start: false,
        }
    }

    #[test]
    fn test_auto_name_carries_placeholder() {
        let dataset = build_dataset(&context(), "C", Some(1));
        assert_eq!(dataset.job.job_name, "srv01_C_%d");
        assert_eq!(dataset.candidate_suffix, Some(1));
    }

    #[test]
    fn test_explicit_name_used_unmodified() {
        let mut ctx = context();
        ctx.explicit_name = Some("weekly-fileserver".to_string());
        let mut dataset = build_dataset(&ctx, "C", None);
        assert_eq!(dataset.job.job_name, "weekly-fileserver");

        dataset.finalize_name(4);
        assert_eq!(dataset.job.job_name, "weekly-fileserver");
    }

    #[test]
    fn test_finalize_rewrites_placeholder() {
        let mut dataset = build_dataset(&context(), "D", Some(2));
        dataset.finalize_name(5);
        assert_eq!(dataset.job.job_name, "srv01_D_5");
    }

    #[test]
    fn test_auto_start_sets_initial_status() {
        let mut ctx = context();
        ctx.auto_start = true;
        assert_eq!(build_dataset(&ctx, "C", Some(1)).job.status, status::START);

        ctx.auto_start = false;
        assert_eq!(
            build_dataset(&ctx, "C", Some(1)).job.status,
            status::WAITING
        );
    }

    #[test]
    fn test_repository_fields_copied() {
        let dataset = build_dataset(&context(), "C", Some(1));
        assert_eq!(dataset.detail.repository_id, 5);
        assert_eq!(dataset.detail.repository_type, "nfs");
        assert_eq!(
            dataset.detail.repository_path.as_deref(),
            Some("/exports/backups")
        );
    }
}
