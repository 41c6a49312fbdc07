use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "jobs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub owner_user: i64,
    pub center_id: i64,
    pub system_name: String,
    #[sea_orm(unique)]
    pub job_name: String,
    /// Mirrors `id` once registration completes. Zero only while the row
    /// is mid-insert inside the registration transaction.
    pub job_id: i64,
    pub status: String,
    pub schedule_id: i64,
    pub schedule_id_advanced: i64,
    pub result: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
