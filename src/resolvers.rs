//! Reference resolvers and the partition catalog.
//!
//! Each resolver takes an id-or-name input and returns the canonical
//! entity row, or `NotFound` when nothing matches. Resolution happens
//! once per registration request; the resolved rows are then shared
//! across every fan-out partition.

use crate::entities;
use crate::errors::BackhaulError;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::Deserialize;

/// An id-or-name reference as it appears in requests.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EntityRef {
    Id(i64),
    Name(String),
}

impl EntityRef {
    pub fn describe(&self) -> String {
        match self {
            EntityRef::Id(id) => format!("#{}", id),
            EntityRef::Name(name) => name.clone(),
        }
    }
}

/// An id-or-email user reference. Numeric input is trusted as-is and
/// never looked up.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UserRef {
    Id(i64),
    Text(String),
}

pub async fn resolve_server<C: ConnectionTrait>(
    conn: &C,
    reference: &EntityRef,
) -> Result<entities::server::Model, BackhaulError> {
    use entities::server::{Column, Entity};

    let found = match reference {
        EntityRef::Id(id) => Entity::find_by_id(*id).one(conn).await?,
        EntityRef::Name(name) => {
            Entity::find()
                .filter(Column::Name.eq(name.as_str()))
                .one(conn)
                .await?
        }
    };

    found.ok_or_else(|| BackhaulError::NotFound(format!("server {}", reference.describe())))
}

pub async fn resolve_center<C: ConnectionTrait>(
    conn: &C,
    reference: &EntityRef,
) -> Result<entities::center::Model, BackhaulError> {
    use entities::center::{Column, Entity};

    let found = match reference {
        EntityRef::Id(id) => Entity::find_by_id(*id).one(conn).await?,
        EntityRef::Name(name) => {
            Entity::find()
                .filter(Column::Name.eq(name.as_str()))
                .one(conn)
                .await?
        }
    };

    found.ok_or_else(|| BackhaulError::NotFound(format!("center {}", reference.describe())))
}

/// Resolve a repository by id within the owning center, narrowed by the
/// optional type/path filters; the first match wins.
pub async fn resolve_repository<C: ConnectionTrait>(
    conn: &C,
    id: i64,
    center_id: i64,
    repo_type: Option<&str>,
    path: Option<&str>,
) -> Result<entities::repository::Model, BackhaulError> {
    use entities::repository::{Column, Entity};

    let mut query = Entity::find()
        .filter(Column::Id.eq(id))
        .filter(Column::CenterId.eq(center_id));

    if let Some(t) = repo_type {
        query = query.filter(Column::RepoType.eq(t));
    }
    if let Some(p) = path {
        query = query.filter(Column::Path.eq(p));
    }

    query
        .one(conn)
        .await?
        .ok_or_else(|| BackhaulError::NotFound(format!("repository #{}", id)))
}

/// Resolve a user reference to its numeric identity.
///
/// A purely numeric input is trusted as-is with no lookup; anything
/// else is treated as an email address. This substitution runs before
/// any job row carries the owner field.
pub async fn resolve_user<C: ConnectionTrait>(
    conn: &C,
    reference: &UserRef,
) -> Result<i64, BackhaulError> {
    use entities::user::{Column, Entity};

    let email = match reference {
        UserRef::Id(id) => return Ok(*id),
        UserRef::Text(text) => {
            if let Ok(id) = text.parse::<i64>() {
                return Ok(id);
            }
            text
        }
    };

    let user = Entity::find()
        .filter(Column::Email.eq(email.as_str()))
        .one(conn)
        .await?
        .ok_or_else(|| BackhaulError::NotFound(format!("user {}", email)))?;

    Ok(user.id)
}

/// All partitions known for a server.
pub async fn list_partitions<C: ConnectionTrait>(
    conn: &C,
    server_id: i64,
) -> Result<Vec<entities::server_partition::Model>, BackhaulError> {
    use entities::server_partition::{Column, Entity};

    Ok(Entity::find()
        .filter(Column::ServerId.eq(server_id))
        .order_by_asc(Column::Id)
        .all(conn)
        .await?)
}

/// Compute the fan-out set from the catalog and the request's explicit
/// and excluded partition lists.
///
/// An empty explicit list targets every known partition. Every
/// explicitly named partition must exist in the catalog; an unknown one
/// fails the whole request before any persistence begins. Exclusions
/// are dropped after that validation, so an explicitly requested
/// partition may legitimately end up excluded.
pub fn select_partitions(
    catalog: &[entities::server_partition::Model],
    explicit: &[String],
    excluded: &[String],
    server_name: &str,
) -> Result<Vec<String>, BackhaulError> {
    let known: Vec<&str> = catalog.iter().map(|p| p.letter.as_str()).collect();

    let requested: Vec<String> = if explicit.is_empty() {
        known.iter().map(|s| s.to_string()).collect()
    } else {
        for partition in explicit {
            if !known.contains(&partition.as_str()) {
                return Err(BackhaulError::Validation(format!(
                    "partition {} is not known for server {}",
                    partition, server_name
                )));
            }
        }
        explicit.to_vec()
    };

    Ok(requested
        .into_iter()
        .filter(|p| !excluded.contains(p))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(letters: &[&str]) -> Vec<entities::server_partition::Model> {
        letters
            .iter()
            .enumerate()
            .map(|(i, l)| entities::server_partition::Model {
                id: i as i64 + 1,
                server_id: 1,
                letter: l.to_string(),
                capacity_mb: None,
            })
            .collect()
    }

    #[test]
    fn test_empty_explicit_list_targets_all_partitions() {
        let selected = select_partitions(&catalog(&["C", "D", "E"]), &[], &[], "srv01")
            .expect("selection failed");
        assert_eq!(selected, vec!["C", "D", "E"]);
    }

    #[test]
    fn test_unknown_partition_fails_fast() {
        let err = select_partitions(
            &catalog(&["C", "D"]),
            &["C".to_string(), "Z".to_string()],
            &[],
            "srv01",
        )
        .unwrap_err();
        assert!(matches!(err, BackhaulError::Validation(_)));
        assert!(err.to_string().contains("Z"));
        assert!(err.to_string().contains("srv01"));
    }

    #[test]
    fn test_exclusions_apply_after_validation() {
        // "D" is explicitly requested and then excluded; that is legal.
        let selected = select_partitions(
            &catalog(&["C", "D"]),
            &["C".to_string(), "D".to_string()],
            &["D".to_string()],
            "srv01",
        )
        .expect("selection failed");
        assert_eq!(selected, vec!["C"]);
    }

    #[test]
    fn test_exclusions_apply_to_full_catalog() {
        let selected = select_partitions(
            &catalog(&["C", "D", "E"]),
            &[],
            &["D".to_string()],
            "srv01",
        )
        .expect("selection failed");
        assert_eq!(selected, vec!["C", "E"]);
    }
}
