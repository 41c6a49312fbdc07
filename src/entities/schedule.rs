use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "schedules")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// 0-6 basic cadences, 7-11 smart (coupled full+increment) cadences.
    pub schedule_type: i32,
    pub center_id: i64,
    pub owner_user: i64,
    pub time: Option<String>,
    pub date: Option<String>,
    pub weekday: Option<i32>,
    pub day: Option<i32>,
    pub week: Option<i32>,
    pub interval_value: Option<i32>,
    pub interval_unit: Option<String>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
