//! 基础积分存储操作

use super::SeaOrmStorage;
use crate::entity::point_entries::{ActiveModel, Column, Entity as PointEntries};
use crate::errors::{GradebookError, Result};
use crate::models::points::{entities::PointEntry, requests::CreatePointEntryRequest};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    /// 记录一条积分
    pub async fn create_point_entry_impl(
        &self,
        student_id: i64,
        awarded_by: i64,
        req: CreatePointEntryRequest,
    ) -> Result<PointEntry> {
        let model = ActiveModel {
            student_id: Set(student_id),
            source: Set(req.source.to_string()),
            label: Set(req.label),
            points: Set(req.points),
            awarded_by: Set(awarded_by),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("记录积分失败: {e}")))?;

        Ok(result.into_point_entry())
    }

    /// 学生的积分流水
    pub async fn list_point_entries_by_student_impl(
        &self,
        student_id: i64,
    ) -> Result<Vec<PointEntry>> {
        let rows = PointEntries::find()
            .filter(Column::StudentId.eq(student_id))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询积分失败: {e}")))?;

        Ok(rows.into_iter().map(|m| m.into_point_entry()).collect())
    }

    /// 全部积分流水
    pub async fn list_all_point_entries_impl(&self) -> Result<Vec<PointEntry>> {
        let rows = PointEntries::find()
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询积分失败: {e}")))?;

        Ok(rows.into_iter().map(|m| m.into_point_entry()).collect())
    }
}
