//! 期末评价快照存储操作

use super::SeaOrmStorage;
use crate::entity::evaluations::{ActiveModel, Column, Entity as Evaluations};
use crate::entity::group_members::{Column as MemberColumn, Entity as GroupMembers};
use crate::errors::{GradebookError, Result};
use crate::models::final_grades::entities::{Evaluation, StudentAggregate};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::debug;

impl SeaOrmStorage {
    /// 重新汇总学生在小组内的任务得分并写入快照
    ///
    /// 成员校验、评分读取与快照写入在同一事务内完成。
    pub async fn recalculate_evaluation_impl(
        &self,
        group_id: i64,
        student_id: i64,
        feedback: Option<String>,
    ) -> Result<Evaluation> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| GradebookError::database_operation(format!("开启事务失败: {e}")))?;

        let membership = GroupMembers::find()
            .filter(MemberColumn::GroupId.eq(group_id))
            .filter(MemberColumn::UserId.eq(student_id))
            .one(&txn)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询小组成员失败: {e}")))?;
        if membership.is_none() {
            return Err(GradebookError::validation(
                "Student is not a member of this group",
            ));
        }

        let grades = self
            .list_student_grades_in_group_impl(&txn, student_id, group_id)
            .await?;
        let aggregate = StudentAggregate::from_grades(grades).ok_or_else(|| {
            GradebookError::not_found("No graded tasks found for this student in this group")
        })?;

        let now = chrono::Utc::now().timestamp();
        let existing = Evaluations::find()
            .filter(Column::GroupId.eq(group_id))
            .filter(Column::StudentId.eq(student_id))
            .one(&txn)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询评价快照失败: {e}")))?;

        let saved = match existing {
            Some(model) => {
                let mut active = model.into_active_model();
                active.total_points = Set(aggregate.total_points);
                active.graded_task_count = Set(aggregate.graded_task_count);
                if feedback.is_some() {
                    active.feedback = Set(feedback);
                }
                active.updated_at = Set(now);
                active.update(&txn).await.map_err(|e| {
                    GradebookError::database_operation(format!("更新评价快照失败: {e}"))
                })?
            }
            None => ActiveModel {
                group_id: Set(group_id),
                student_id: Set(student_id),
                total_points: Set(aggregate.total_points),
                graded_task_count: Set(aggregate.graded_task_count),
                feedback: Set(feedback),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(|e| GradebookError::database_operation(format!("创建评价快照失败: {e}")))?,
        };

        txn.commit()
            .await
            .map_err(|e| GradebookError::database_operation(format!("提交事务失败: {e}")))?;

        debug!(
            group_id,
            student_id,
            total_points = saved.total_points,
            graded_task_count = saved.graded_task_count,
            "Evaluation snapshot written"
        );

        Ok(saved.into_evaluation())
    }

    /// 获取快照
    pub async fn get_evaluation_impl(
        &self,
        group_id: i64,
        student_id: i64,
    ) -> Result<Option<Evaluation>> {
        let result = Evaluations::find()
            .filter(Column::GroupId.eq(group_id))
            .filter(Column::StudentId.eq(student_id))
            .one(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询评价快照失败: {e}")))?;

        Ok(result.map(|m| m.into_evaluation()))
    }

    /// 列出快照，可按小组过滤
    pub async fn list_evaluations_impl(&self, group_id: Option<i64>) -> Result<Vec<Evaluation>> {
        let mut select = Evaluations::find();
        if let Some(group_id) = group_id {
            select = select.filter(Column::GroupId.eq(group_id));
        }

        let rows = select
            .order_by_asc(Column::GroupId)
            .order_by_asc(Column::StudentId)
            .all(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询评价快照失败: {e}")))?;

        Ok(rows.into_iter().map(|m| m.into_evaluation()).collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::GradebookError;
    use crate::models::users::entities::UserRole;
    use crate::storage::Storage;
    use crate::storage::testing::{grade, memory_storage, seed_group, seed_task, seed_user};

    #[tokio::test]
    async fn test_snapshot_sums_grades() {
        let storage = memory_storage().await;
        let lecturer = seed_user(&storage, "lect", UserRole::Lecturer).await;
        let student = seed_user(&storage, "x", UserRole::Student).await;
        let group = seed_group(&storage, "G", lecturer.id).await;
        storage.add_group_member(group.id, student.id).await.unwrap();
        let t1 = seed_task(&storage, group.id, lecturer.id, vec![student.id]).await;
        let t2 = seed_task(&storage, group.id, lecturer.id, vec![student.id]).await;
        grade(&storage, t1.id, student.id, lecturer.id, 20.0).await;
        grade(&storage, t2.id, student.id, lecturer.id, 15.0).await;

        let snapshot = storage
            .recalculate_evaluation(group.id, student.id, Some("Solid work".to_string()))
            .await
            .unwrap();
        assert_eq!(snapshot.total_points, 35.0);
        assert_eq!(snapshot.graded_task_count, 2);

        // 再次重算且不给评语：数值不变，评语保留
        let again = storage
            .recalculate_evaluation(group.id, student.id, None)
            .await
            .unwrap();
        assert_eq!(again.id, snapshot.id);
        assert_eq!(again.total_points, 35.0);
        assert_eq!(again.feedback.as_deref(), Some("Solid work"));
        assert_eq!(storage.list_evaluations(Some(group.id)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_non_member_is_rejected() {
        let storage = memory_storage().await;
        let lecturer = seed_user(&storage, "lect", UserRole::Lecturer).await;
        let student = seed_user(&storage, "x", UserRole::Student).await;
        let group = seed_group(&storage, "G", lecturer.id).await;

        let err = storage
            .recalculate_evaluation(group.id, student.id, None)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            GradebookError::validation("Student is not a member of this group")
        );
    }

    #[tokio::test]
    async fn test_no_grades_creates_no_snapshot() {
        let storage = memory_storage().await;
        let lecturer = seed_user(&storage, "lect", UserRole::Lecturer).await;
        let student = seed_user(&storage, "x", UserRole::Student).await;
        let group = seed_group(&storage, "G", lecturer.id).await;
        storage.add_group_member(group.id, student.id).await.unwrap();

        let err = storage
            .recalculate_evaluation(group.id, student.id, None)
            .await
            .unwrap_err();
        assert!(matches!(err, GradebookError::NotFound(_)));
        assert!(storage
            .get_evaluation(group.id, student.id)
            .await
            .unwrap()
            .is_none());
    }
}
