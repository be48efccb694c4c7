//! 任务评分存储操作

use super::SeaOrmStorage;
use crate::entity::task_grades::{ActiveModel, Column, Entity as TaskGrades, Relation};
use crate::entity::tasks::Column as TaskColumn;
use crate::errors::{GradebookError, Result};
use crate::models::tasks::entities::{TaskGrade, TaskGradeInput};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, JoinType, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Set,
};

impl SeaOrmStorage {
    /// 写入评分，(任务, 学生) 已有评分时覆盖
    pub async fn upsert_task_grade_impl(&self, input: TaskGradeInput) -> Result<TaskGrade> {
        self.upsert_task_grade_on(&self.db, input).await
    }

    /// 单条 INSERT .. ON CONFLICT 写入评分，并发写同一 (任务, 学生) 时后写者覆盖
    ///
    /// 未提供评语时保留原评语；首次评分时间不随覆盖变化。
    pub(crate) async fn upsert_task_grade_on<C: ConnectionTrait>(
        &self,
        conn: &C,
        input: TaskGradeInput,
    ) -> Result<TaskGrade> {
        let now = chrono::Utc::now().timestamp();

        let mut overwrite = vec![Column::GraderId, Column::Points, Column::UpdatedAt];
        if input.feedback.is_some() {
            overwrite.push(Column::Feedback);
        }

        let model = ActiveModel {
            task_id: Set(input.task_id),
            student_id: Set(input.student_id),
            grader_id: Set(input.grader_id),
            points: Set(input.points),
            feedback: Set(input.feedback),
            graded_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        TaskGrades::insert(model)
            .on_conflict(
                OnConflict::columns([Column::TaskId, Column::StudentId])
                    .update_columns(overwrite)
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await
            .map_err(|e| GradebookError::database_operation(format!("写入评分失败: {e}")))?;

        let saved = TaskGrades::find()
            .filter(Column::TaskId.eq(input.task_id))
            .filter(Column::StudentId.eq(input.student_id))
            .one(conn)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询评分失败: {e}")))?
            .ok_or_else(|| GradebookError::database_operation("评分写入后未找到"))?;

        Ok(saved.into_task_grade())
    }

    /// 获取学生在某任务上的评分
    pub async fn get_task_grade_impl(
        &self,
        task_id: i64,
        student_id: i64,
    ) -> Result<Option<TaskGrade>> {
        let result = TaskGrades::find()
            .filter(Column::TaskId.eq(task_id))
            .filter(Column::StudentId.eq(student_id))
            .one(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询评分失败: {e}")))?;

        Ok(result.map(|m| m.into_task_grade()))
    }

    /// 列出任务的全部评分
    pub async fn list_task_grades_impl(&self, task_id: i64) -> Result<Vec<TaskGrade>> {
        let grades = TaskGrades::find()
            .filter(Column::TaskId.eq(task_id))
            .order_by_asc(Column::StudentId)
            .all(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询评分列表失败: {e}")))?;

        Ok(grades.into_iter().map(|m| m.into_task_grade()).collect())
    }

    /// 学生在某小组所有任务上的评分
    ///
    /// 接受任意连接，事务内重算快照时传入事务句柄。
    pub(crate) async fn list_student_grades_in_group_impl<C: ConnectionTrait>(
        &self,
        conn: &C,
        student_id: i64,
        group_id: i64,
    ) -> Result<Vec<TaskGrade>> {
        let grades = TaskGrades::find()
            .join(JoinType::InnerJoin, Relation::Task.def())
            .filter(TaskColumn::GroupId.eq(group_id))
            .filter(Column::StudentId.eq(student_id))
            .order_by_asc(Column::TaskId)
            .all(conn)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询学生评分失败: {e}")))?;

        Ok(grades.into_iter().map(|m| m.into_task_grade()).collect())
    }

    /// 全部评分，排行榜汇总使用
    pub async fn list_all_task_grades_impl(&self) -> Result<Vec<TaskGrade>> {
        let grades = TaskGrades::find()
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询评分列表失败: {e}")))?;

        Ok(grades.into_iter().map(|m| m.into_task_grade()).collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::models::tasks::entities::TaskGradeInput;
    use crate::models::users::entities::UserRole;
    use crate::storage::Storage;
    use crate::storage::testing::{grade, memory_storage, seed_group, seed_task, seed_user};

    #[tokio::test]
    async fn test_upsert_overwrites_same_student() {
        let storage = memory_storage().await;
        let lecturer = seed_user(&storage, "lect", UserRole::Lecturer).await;
        let student = seed_user(&storage, "stud", UserRole::Student).await;
        let group = seed_group(&storage, "Team", lecturer.id).await;
        let task = seed_task(&storage, group.id, lecturer.id, vec![student.id]).await;

        let first = grade(&storage, task.id, student.id, lecturer.id, 12.0).await;
        let second = grade(&storage, task.id, student.id, lecturer.id, 18.5).await;

        assert_eq!(first.id, second.id);
        let grades = storage.list_task_grades(task.id).await.unwrap();
        assert_eq!(grades.len(), 1);
        assert_eq!(grades[0].points, 18.5);
    }

    #[tokio::test]
    async fn test_concurrent_upserts_share_one_row() {
        let storage = memory_storage().await;
        let lecturer = seed_user(&storage, "lect", UserRole::Lecturer).await;
        let student = seed_user(&storage, "stud", UserRole::Student).await;
        let group = seed_group(&storage, "Team", lecturer.id).await;
        let task = seed_task(&storage, group.id, lecturer.id, vec![student.id]).await;

        let input = |points: f64| TaskGradeInput {
            task_id: task.id,
            student_id: student.id,
            grader_id: lecturer.id,
            points,
            feedback: None,
        };
        let (a, b) = tokio::join!(
            storage.upsert_task_grade(input(10.0)),
            storage.upsert_task_grade(input(11.0))
        );
        assert_eq!(a.unwrap().id, b.unwrap().id);
        assert_eq!(storage.list_task_grades(task.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_overwrite_keeps_feedback_when_omitted() {
        let storage = memory_storage().await;
        let lecturer = seed_user(&storage, "lect", UserRole::Lecturer).await;
        let student = seed_user(&storage, "stud", UserRole::Student).await;
        let group = seed_group(&storage, "Team", lecturer.id).await;
        let task = seed_task(&storage, group.id, lecturer.id, vec![student.id]).await;

        let first = storage
            .upsert_task_grade(TaskGradeInput {
                task_id: task.id,
                student_id: student.id,
                grader_id: lecturer.id,
                points: 8.0,
                feedback: Some("Good start".to_string()),
            })
            .await
            .unwrap();
        let second = grade(&storage, task.id, student.id, lecturer.id, 9.0).await;

        assert_eq!(second.points, 9.0);
        assert_eq!(second.feedback.as_deref(), Some("Good start"));
        assert_eq!(second.graded_at, first.graded_at);
    }

    #[tokio::test]
    async fn test_grades_scoped_to_group() {
        let storage = memory_storage().await;
        let lecturer = seed_user(&storage, "lect", UserRole::Lecturer).await;
        let student = seed_user(&storage, "stud", UserRole::Student).await;
        let team_a = seed_group(&storage, "A", lecturer.id).await;
        let team_b = seed_group(&storage, "B", lecturer.id).await;
        let task_a = seed_task(&storage, team_a.id, lecturer.id, vec![student.id]).await;
        let task_b = seed_task(&storage, team_b.id, lecturer.id, vec![student.id]).await;

        grade(&storage, task_a.id, student.id, lecturer.id, 20.0).await;
        grade(&storage, task_b.id, student.id, lecturer.id, 7.0).await;

        let in_a = storage
            .list_student_grades_in_group(student.id, team_a.id)
            .await
            .unwrap();
        assert_eq!(in_a.len(), 1);
        assert_eq!(in_a[0].task_id, task_a.id);
        assert_eq!(storage.list_all_task_grades().await.unwrap().len(), 2);
    }
}
