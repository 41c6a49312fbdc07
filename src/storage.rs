use crate::entities;
use crate::errors::BackhaulError;
use crate::settings::Database as DbCfg;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};

pub async fn init(cfg: &DbCfg) -> Result<DatabaseConnection, BackhaulError> {
    let mut opts = ConnectOptions::new(cfg.url.clone());
    opts.max_connections(cfg.max_connections).sqlx_logging(false);
    let db = Database::connect(opts).await?;
    Ok(db)
}

/// Job + detail joined into one read-side row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: i64,
    pub job_name: String,
    pub system_name: String,
    pub partition: String,
    pub backup_mode: String,
    pub status: String,
    pub owner_user: i64,
    pub repository_id: i64,
    pub schedule_id: i64,
    pub schedule_id_advanced: i64,
    pub created_at: i64,
}

/// Filtered job listing for the read-side API.
pub async fn list_jobs(
    db: &DatabaseConnection,
    server: Option<&str>,
    status: Option<&str>,
) -> Result<Vec<JobSummary>, BackhaulError> {
    use entities::job::{Column, Entity};

    let mut query = Entity::find().order_by_asc(Column::Id);
    if let Some(server) = server {
        query = query.filter(Column::SystemName.eq(server));
    }
    if let Some(status) = status {
        query = query.filter(Column::Status.eq(status));
    }

    let jobs = query.all(db).await?;

    let mut summaries = Vec::with_capacity(jobs.len());
    for job in jobs {
        let detail = entities::job_detail::Entity::find_by_id(job.id)
            .one(db)
            .await?
            .ok_or_else(|| {
                BackhaulError::DataProcessing(format!("job {} has no detail row", job.id))
            })?;

        summaries.push(JobSummary {
            id: job.id,
            job_name: job.job_name,
            system_name: job.system_name,
            partition: detail.partition,
            backup_mode: detail.backup_mode,
            status: job.status,
            owner_user: job.owner_user,
            repository_id: detail.repository_id,
            schedule_id: job.schedule_id,
            schedule_id_advanced: job.schedule_id_advanced,
            created_at: job.created_at,
        });
    }

    Ok(summaries)
}

/// Remove the Job/JobDetail pair in one transaction so neither row can
/// outlive the other.
pub async fn delete_job(db: &DatabaseConnection, id: i64) -> Result<(), BackhaulError> {
    let txn = db.begin().await.map_err(|e| BackhaulError::Transaction {
        context: format!("beginning delete of job {}", id),
        source: e,
    })?;

    let result = async {
        let deleted = entities::job::Entity::delete_by_id(id).exec(&txn).await?;
        if deleted.rows_affected == 0 {
            return Err(BackhaulError::NotFound(format!("job #{}", id)));
        }
        entities::job_detail::Entity::delete_by_id(id)
            .exec(&txn)
            .await?;
        Ok(())
    }
    .await;

    match result {
        Ok(()) => {
            txn.commit().await.map_err(|e| BackhaulError::Transaction {
                context: format!("committing delete of job {}", id),
                source: e,
            })?;
            Ok(())
        }
        Err(err) => {
            let _ = txn.rollback().await;
            Err(err)
        }
    }
}

/// Seed a demo center/server/partitions/repository/user so a fresh
/// database can take registrations right away. Idempotent; development
/// use only.
pub async fn ensure_demo_fixtures(db: &DatabaseConnection) -> Result<(), BackhaulError> {
    use entities::center::{Column as CenterColumn, Entity as CenterEntity};

    if CenterEntity::find()
        .filter(CenterColumn::Name.eq("default"))
        .one(db)
        .await?
        .is_some()
    {
        return Ok(());
    }

    let now = Utc::now().timestamp();

    let center = entities::center::ActiveModel {
        name: Set("default".to_string()),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let server = entities::server::ActiveModel {
        name: Set("srv01".to_string()),
        center_id: Set(center.id),
        os: Set(Some("windows".to_string())),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    for letter in ["C", "D"] {
        entities::server_partition::ActiveModel {
            server_id: Set(server.id),
            letter: Set(letter.to_string()),
            capacity_mb: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    entities::repository::ActiveModel {
        center_id: Set(center.id),
        repo_type: Set("nfs".to_string()),
        path: Set(Some("/exports/backups".to_string())),
        name: Set(Some("demo-repo".to_string())),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    entities::user::ActiveModel {
        email: Set("admin@example.com".to_string()),
        name: Set(Some("Admin".to_string())),
        center_id: Set(center.id),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!("Seeded demo fixtures (center \"default\", server \"srv01\")");
    Ok(())
}

/// Count the persisted Job/JobDetail pairs for a server; a pair exists
/// only when both rows do.
pub async fn count_job_pairs<C: ConnectionTrait>(
    conn: &C,
    server: &str,
) -> Result<u64, BackhaulError> {
    use entities::job::{Column, Entity};

    let jobs = Entity::find()
        .filter(Column::SystemName.eq(server))
        .all(conn)
        .await?;

    let mut pairs = 0;
    for job in jobs {
        if entities::job_detail::Entity::find_by_id(job.id)
            .one(conn)
            .await?
            .is_some()
        {
            pairs += 1;
        }
    }
    Ok(pairs)
}
