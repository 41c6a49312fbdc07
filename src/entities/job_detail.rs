use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "job_details")]
pub struct Model {
    /// Shares the owning job's identity; never auto-generated.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub backup_mode: String,
    pub rotation: i64,
    pub compression: i64,
    pub encryption: i64,
    pub partition: String,
    /// JSON array of excluded directories.
    pub exclude_dir: Option<String>,
    pub repository_id: i64,
    pub repository_type: String,
    pub repository_path: Option<String>,
    pub network_limit: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
