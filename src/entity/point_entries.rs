//! 基础积分流水实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "point_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub student_id: i64,
    pub source: String,
    pub label: String,
    pub points: f64,
    pub awarded_by: i64,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::StudentId",
        to = "super::users::Column::Id"
    )]
    Student,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_point_entry(self) -> crate::models::points::entities::PointEntry {
        use crate::models::points::entities::{PointEntry, PointSource};

        PointEntry {
            id: self.id,
            student_id: self.student_id,
            source: self
                .source
                .parse::<PointSource>()
                .unwrap_or(PointSource::Extra),
            label: self.label,
            points: self.points,
            awarded_by: self.awarded_by,
            created_at: super::to_datetime(self.created_at),
        }
    }
}
