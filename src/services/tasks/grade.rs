use std::sync::Arc;

use tracing::info;

use super::require_task;
use crate::errors::{GradebookError, Result};
use crate::models::tasks::{
    entities::{TaskGradeInput, TaskStatus},
    requests::GradeTaskRequest,
    responses::GradeTaskResponse,
};
use crate::models::users::entities::User;
use crate::services::ensure_staff;
use crate::storage::Storage;
use crate::utils::validate::validate_task_points;

/// 为任务的某个负责人评分
///
/// 同一 (任务, 学生) 再次评分会覆盖原记录。存在待处理申诉时任务保持 `appeal` 状态。
pub async fn grade_task(
    storage: &Arc<dyn Storage>,
    principal: &User,
    task_id: i64,
    req: GradeTaskRequest,
    max_points: f64,
) -> Result<GradeTaskResponse> {
    ensure_staff(principal)?;
    let mut task = require_task(storage, task_id).await?;

    if !task.is_assignee(req.student_id) {
        return Err(GradebookError::validation(
            "Student is not an assignee of this task",
        ));
    }
    validate_task_points(req.points, max_points)?;

    let grade = storage
        .upsert_task_grade(TaskGradeInput {
            task_id,
            student_id: req.student_id,
            grader_id: principal.id,
            points: req.points,
            feedback: req.feedback,
        })
        .await?;

    if storage.count_pending_appeals_for_task(task_id).await? == 0
        && task.status != TaskStatus::Graded
    {
        storage
            .update_task_status(task_id, TaskStatus::Graded)
            .await?;
        task.status = TaskStatus::Graded;
    }

    info!(
        "Student {} graded {} on task {} by {}",
        grade.student_id, grade.points, task_id, principal.id
    );
    Ok(GradeTaskResponse { grade, task })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::storage::testing::{memory_storage, seed_group, seed_task, seed_user};

    fn body(student_id: i64, points: f64) -> GradeTaskRequest {
        GradeTaskRequest {
            student_id,
            points,
            feedback: Some("Solid work".to_string()),
        }
    }

    #[tokio::test]
    async fn test_grade_marks_task_graded() {
        let storage = memory_storage().await;
        let lecturer = seed_user(&storage, "lect", UserRole::Lecturer).await;
        let x = seed_user(&storage, "x", UserRole::Student).await;
        let group = seed_group(&storage, "G", lecturer.id).await;
        let task = seed_task(&storage, group.id, lecturer.id, vec![x.id]).await;

        let graded = grade_task(&storage, &lecturer, task.id, body(x.id, 20.0), 100.0)
            .await
            .unwrap();
        assert_eq!(graded.grade.points, 20.0);
        assert_eq!(graded.grade.grader_id, lecturer.id);
        assert_eq!(graded.task.status, TaskStatus::Graded);

        let stored = storage.get_task_by_id(task.id).await.unwrap().unwrap();
        assert_eq!(stored.status, TaskStatus::Graded);
    }

    #[tokio::test]
    async fn test_regrade_updates_same_row() {
        let storage = memory_storage().await;
        let lecturer = seed_user(&storage, "lect", UserRole::Lecturer).await;
        let x = seed_user(&storage, "x", UserRole::Student).await;
        let group = seed_group(&storage, "G", lecturer.id).await;
        let task = seed_task(&storage, group.id, lecturer.id, vec![x.id]).await;

        let first = grade_task(&storage, &lecturer, task.id, body(x.id, 10.0), 100.0)
            .await
            .unwrap();
        let second = grade_task(&storage, &lecturer, task.id, body(x.id, 18.5), 100.0)
            .await
            .unwrap();
        assert_eq!(first.grade.id, second.grade.id);
        assert_eq!(storage.list_task_grades(task.id).await.unwrap().len(), 1);
        assert_eq!(second.grade.points, 18.5);
    }

    #[tokio::test]
    async fn test_rejects_non_assignee_and_bad_points() {
        let storage = memory_storage().await;
        let lecturer = seed_user(&storage, "lect", UserRole::Lecturer).await;
        let x = seed_user(&storage, "x", UserRole::Student).await;
        let y = seed_user(&storage, "y", UserRole::Student).await;
        let group = seed_group(&storage, "G", lecturer.id).await;
        let task = seed_task(&storage, group.id, lecturer.id, vec![x.id]).await;

        for (student, points) in [(y.id, 10.0), (x.id, -1.0), (x.id, f64::NAN), (x.id, 101.0)] {
            let result =
                grade_task(&storage, &lecturer, task.id, body(student, points), 100.0).await;
            assert!(matches!(result, Err(GradebookError::Validation(_))));
        }
        assert!(storage.list_task_grades(task.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_student_cannot_grade() {
        let storage = memory_storage().await;
        let lecturer = seed_user(&storage, "lect", UserRole::Lecturer).await;
        let x = seed_user(&storage, "x", UserRole::Student).await;
        let group = seed_group(&storage, "G", lecturer.id).await;
        let task = seed_task(&storage, group.id, lecturer.id, vec![x.id]).await;

        let result = grade_task(&storage, &x, task.id, body(x.id, 100.0), 100.0).await;
        assert!(matches!(result, Err(GradebookError::Authorization(_))));
    }
}
