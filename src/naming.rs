//! Collision-resistant job naming.
//!
//! Auto-generated names follow `{server}_{partition}_{suffix}`. During
//! fan-out each partition gets a template carrying the literal `%d`
//! placeholder plus a candidate suffix; the orchestrator later rewrites
//! every template with the single batch-wide maximum candidate.

use crate::entities::job;
use crate::errors::BackhaulError;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

/// Literal token standing in for the numeric suffix until the batch
/// naming barrier runs.
pub const SUFFIX_PLACEHOLDER: &str = "%d";

/// Template name for one (server, partition) pair.
pub fn template_name(server_name: &str, partition: &str) -> String {
    format!("{}_{}_{}", server_name, partition, SUFFIX_PLACEHOLDER)
}

/// Replace the placeholder with the finalized suffix. Explicit
/// caller-supplied names carry no placeholder and pass through
/// unchanged.
pub fn finalize_name(name: &str, suffix: i64) -> String {
    name.replace(SUFFIX_PLACEHOLDER, &suffix.to_string())
}

/// The numeric suffix of `name` under `prefix`, if it has one.
fn parse_suffix(name: &str, prefix: &str) -> Option<i64> {
    name.strip_prefix(prefix)?.parse().ok()
}

/// Candidate suffix for one (server, partition) pair: one past the
/// highest suffix already used by jobs sharing the same name prefix on
/// that server.
pub async fn next_suffix<C: ConnectionTrait>(
    conn: &C,
    server_name: &str,
    partition: &str,
) -> Result<i64, BackhaulError> {
    use job::Column;

    let prefix = format!("{}_{}_", server_name, partition);

    let existing = job::Entity::find()
        .filter(Column::SystemName.eq(server_name))
        .filter(Column::JobName.starts_with(prefix.as_str()))
        .all(conn)
        .await?;

    let max_used = existing
        .iter()
        .filter_map(|j| parse_suffix(&j.job_name, &prefix))
        .max()
        .unwrap_or(0);

    Ok(max_used + 1)
}
