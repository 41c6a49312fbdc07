//! The backup job registration engine: turns one registration request
//! into one persisted (Job, JobDetail) pair per target partition.
//!
//! Reference resolution and partition validation run once and abort
//! the whole request on failure. Per-partition persistence runs
//! concurrently afterwards; a failing partition is rolled back and
//! reported without disturbing its siblings.

use crate::dataset::{build_dataset, BackupMode, BatchContext, Dataset};
use crate::entities::{job, job_detail};
use crate::errors::BackhaulError;
use crate::naming;
use crate::resolvers::{
    list_partitions, resolve_center, resolve_repository, resolve_server, resolve_user,
    select_partitions, EntityRef, UserRef,
};
use crate::schedule::{resolve_schedule, schedule_usage, ScheduleSpec};
use chrono::Utc;
use futures::future::join_all;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBackupRequest {
    pub center: EntityRef,
    pub server: EntityRef,
    #[serde(rename = "type")]
    pub job_type: BackupMode,
    #[serde(default)]
    pub partition: Vec<String>,
    pub repository: RepositorySpec,
    pub user: Option<UserRef>,
    pub schedule: Option<ScheduleSpec>,
    /// Explicit job name; when absent a collision-resistant name is
    /// generated per partition.
    pub name: Option<String>,
    pub description: Option<String>,
    pub rotation: Option<i64>,
    pub compression: Option<bool>,
    pub encryption: Option<bool>,
    #[serde(default)]
    pub exclude_dir: Vec<String>,
    #[serde(default)]
    pub exclude_partition: Vec<String>,
    pub network_limit: Option<i64>,
    pub auto_start: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepositorySpec {
    pub id: i64,
    #[serde(rename = "type")]
    pub repo_type: Option<String>,
    pub path: Option<String>,
}

/// One response entry per fan-out partition.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationOutcome {
    pub state: String,
    pub job_name: String,
    pub partition: String,
    pub job_type: String,
    pub auto_start: bool,
    pub use_schedule: String,
}

/// Durably write one dataset inside its own transaction.
///
/// The job identity is only assigned by the store at insert time, yet
/// the row must carry it in the `job_id` column for consumers that
/// treat a job's own identity as a foreign key on itself. Hence the
/// two-phase write: insert with `job_id` zero, then back-fill the
/// generated identity, then insert the detail row under that identity.
/// Any failure rolls the whole dataset back.
pub async fn persist_dataset(
    db: &DatabaseConnection,
    dataset: &Dataset,
) -> Result<i64, BackhaulError> {
    let txn = db.begin().await.map_err(|e| BackhaulError::Transaction {
        context: format!("beginning transaction for job {}", dataset.job.job_name),
        source: e,
    })?;

    match write_dataset(&txn, dataset).await {
        Ok(id) => {
            txn.commit().await.map_err(|e| BackhaulError::Transaction {
                context: format!("committing job {}", dataset.job.job_name),
                source: e,
            })?;
            Ok(id)
        }
        Err(err) => {
            // Rollback failure is secondary; the original cause is the
            // one worth reporting.
            let _ = txn.rollback().await;
            match err {
                BackhaulError::Db(source) => Err(BackhaulError::Transaction {
                    context: format!("registering job {}", dataset.job.job_name),
                    source,
                }),
                other => Err(other),
            }
        }
    }
}

async fn write_dataset<C: ConnectionTrait>(
    conn: &C,
    dataset: &Dataset,
) -> Result<i64, BackhaulError> {
    let now = Utc::now().timestamp();

    let new_job = job::ActiveModel {
        owner_user: Set(dataset.job.owner_user),
        center_id: Set(dataset.job.center_id),
        system_name: Set(dataset.job.system_name.clone()),
        job_name: Set(dataset.job.job_name.clone()),
        job_id: Set(0),
        status: Set(dataset.job.status.clone()),
        schedule_id: Set(dataset.job.schedule_id),
        schedule_id_advanced: Set(dataset.job.schedule_id_advanced),
        result: Set(dataset.job.description.clone()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let inserted = new_job.insert(conn).await?;
    let id = inserted.id;

    // Phase two: the row now learns its own identity.
    let mut backfill: job::ActiveModel = inserted.into();
    backfill.job_id = Set(id);
    backfill.update(conn).await?;

    let exclude_dir = if dataset.detail.exclude_dir.is_empty() {
        None
    } else {
        Some(serde_json::to_string(&dataset.detail.exclude_dir)?)
    };

    let detail = job_detail::ActiveModel {
        id: Set(id),
        backup_mode: Set(dataset.detail.backup_mode.clone()),
        rotation: Set(dataset.detail.rotation),
        compression: Set(if dataset.detail.compression { 1 } else { 0 }),
        encryption: Set(if dataset.detail.encryption { 1 } else { 0 }),
        partition: Set(dataset.detail.partition.clone()),
        exclude_dir: Set(exclude_dir),
        repository_id: Set(dataset.detail.repository_id),
        repository_type: Set(dataset.detail.repository_type.clone()),
        repository_path: Set(dataset.detail.repository_path.clone()),
        network_limit: Set(dataset.detail.network_limit),
    };

    detail.insert(conn).await?;

    Ok(id)
}

/// Register backup jobs for every eligible partition of the request.
pub async fn register_backup(
    db: &DatabaseConnection,
    req: &RegisterBackupRequest,
) -> Result<Vec<RegistrationOutcome>, BackhaulError> {
    // Resolve references once; shared across the whole fan-out.
    let center = resolve_center(db, &req.center).await?;
    let server = resolve_server(db, &req.server).await?;
    if server.center_id != center.id {
        return Err(BackhaulError::Validation(format!(
            "server {} does not belong to center {}",
            server.name, center.name
        )));
    }
    let repository = resolve_repository(
        db,
        req.repository.id,
        center.id,
        req.repository.repo_type.as_deref(),
        req.repository.path.as_deref(),
    )
    .await?;

    // Owner substitution happens here, before any job row is built.
    let owner_user = match &req.user {
        Some(reference) => resolve_user(db, reference).await?,
        None => 0,
    };

    let catalog = list_partitions(db, server.id).await?;
    let targets = select_partitions(&catalog, &req.partition, &req.exclude_partition, &server.name)?;
    if targets.is_empty() {
        return Err(BackhaulError::Validation(format!(
            "no eligible partitions for server {} after exclusions",
            server.name
        )));
    }

    let (schedule_id, schedule_id_advanced) =
        resolve_schedule(db, req.schedule.as_ref(), center.id, owner_user).await?;

    let ctx = BatchContext {
        center_id: center.id,
        owner_user,
        repository,
        schedule_id,
        schedule_id_advanced,
        mode: req.job_type,
        explicit_name: req.name.clone(),
        description: req.description.clone(),
        rotation: req.rotation.unwrap_or(1),
        compression: req.compression.unwrap_or(false),
        encryption: req.encryption.unwrap_or(false),
        exclude_dir: req.exclude_dir.clone(),
        network_limit: req.network_limit.unwrap_or(0),
        auto_start: req.auto_start.unwrap_or(false),
        server,
    };

    info!(
        server = %ctx.server.name,
        partitions = targets.len(),
        mode = ctx.mode.as_str(),
        "registering backup jobs"
    );

    // Fan out: one tentative dataset per partition, auto-generated
    // names still carrying their suffix placeholder.
    let mut datasets: Vec<Dataset> = Vec::with_capacity(targets.len());
    for partition in &targets {
        let candidate = if ctx.explicit_name.is_some() {
            None
        } else {
            Some(naming::next_suffix(db, &ctx.server.name, partition).await?)
        };
        datasets.push(build_dataset(&ctx, partition, candidate));
    }

    // Naming barrier: every dataset must have been visited before any
    // name is fixed. The batch-wide maximum candidate becomes the one
    // shared suffix, and only then may persistence begin.
    if let Some(batch_suffix) = datasets.iter().filter_map(|d| d.candidate_suffix).max() {
        for dataset in &mut datasets {
            dataset.finalize_name(batch_suffix);
        }
    }

    // Settle-all persistence: every dataset runs to a terminal outcome
    // regardless of how its siblings fare.
    let results = join_all(datasets.iter().map(|d| persist_dataset(db, d))).await;

    let mut outcomes = Vec::with_capacity(datasets.len());
    let mut failed = 0usize;
    for (dataset, result) in datasets.iter().zip(results) {
        let state = match result {
            Ok(id) => {
                info!(job_id = id, job_name = %dataset.job.job_name, "registered backup job");
                "success"
            }
            Err(err) => {
                warn!(
                    partition = %dataset.detail.partition,
                    job_name = %dataset.job.job_name,
                    error = %err,
                    "backup job registration failed"
                );
                failed += 1;
                "fail"
            }
        };

        outcomes.push(RegistrationOutcome {
            state: state.to_string(),
            job_name: dataset.job.job_name.clone(),
            partition: dataset.detail.partition.clone(),
            job_type: dataset.detail.backup_mode.clone(),
            auto_start: ctx.auto_start,
            use_schedule: schedule_usage(schedule_id, schedule_id_advanced).to_string(),
        });
    }

    if failed > 0 {
        warn!(
            failed,
            total = outcomes.len(),
            server = %ctx.server.name,
            "batch completed with failed partitions"
        );
    }

    Ok(outcomes)
}
