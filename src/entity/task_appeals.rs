//! 评分申诉实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "task_appeals")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub task_id: i64,
    pub student_id: i64,
    #[sea_orm(column_type = "Text")]
    pub reason: String,
    pub status: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub resolution: Option<String>,
    pub resolved_by: Option<i64>,
    pub created_at: i64,
    pub resolved_at: Option<i64>,
    /// 待处理时为 1，处理后为 NULL
    pub pending_slot: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tasks::Entity",
        from = "Column::TaskId",
        to = "super::tasks::Column::Id"
    )]
    Task,
}

impl Related<super::tasks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Task.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_appeal(self) -> crate::models::appeals::entities::Appeal {
        use crate::models::appeals::entities::{Appeal, AppealStatus};

        Appeal {
            id: self.id,
            task_id: self.task_id,
            student_id: self.student_id,
            reason: self.reason,
            status: self
                .status
                .parse::<AppealStatus>()
                .unwrap_or(AppealStatus::Pending),
            resolution: self.resolution,
            resolved_by: self.resolved_by,
            created_at: super::to_datetime(self.created_at),
            resolved_at: self.resolved_at.map(super::to_datetime),
        }
    }
}
