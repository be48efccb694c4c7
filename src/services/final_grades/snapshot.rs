use std::sync::Arc;

use tracing::info;

use crate::errors::Result;
use crate::models::final_grades::entities::Evaluation;
use crate::models::users::entities::User;
use crate::storage::Storage;

/// 重算并写入 (小组, 学生) 的评价快照
///
/// 小组不存在返回 NotFound；学生不是成员返回 Validation；
/// 没有任何评分返回 NotFound 且不写入快照。`feedback` 为 `None` 时保留原评语。
pub async fn update_student_final_grade(
    storage: &Arc<dyn Storage>,
    principal: &User,
    student_id: i64,
    group_id: i64,
    feedback: Option<String>,
) -> Result<Evaluation> {
    crate::services::ensure_staff(principal)?;
    crate::services::require_group(storage, group_id).await?;

    let evaluation = storage
        .recalculate_evaluation(group_id, student_id, feedback)
        .await?;

    info!(
        "Final grade for student {} in group {} recalculated by {}: {} points over {} task(s)",
        student_id,
        group_id,
        principal.id,
        evaluation.total_points,
        evaluation.graded_task_count
    );
    Ok(evaluation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GradebookError;
    use crate::models::users::entities::UserRole;
    use crate::storage::testing::{grade, memory_storage, seed_group, seed_task, seed_user};

    #[tokio::test]
    async fn test_writes_snapshot_of_thirty_five() {
        let storage = memory_storage().await;
        let lecturer = seed_user(&storage, "lect", UserRole::Lecturer).await;
        let x = seed_user(&storage, "x", UserRole::Student).await;
        let group = seed_group(&storage, "G", lecturer.id).await;
        storage.add_group_member(group.id, x.id).await.unwrap();
        let t1 = seed_task(&storage, group.id, lecturer.id, vec![x.id]).await;
        let t2 = seed_task(&storage, group.id, lecturer.id, vec![x.id]).await;
        grade(&storage, t1.id, x.id, lecturer.id, 20.0).await;
        grade(&storage, t2.id, x.id, lecturer.id, 15.0).await;

        let first = update_student_final_grade(&storage, &lecturer, x.id, group.id, None)
            .await
            .unwrap();
        let second = update_student_final_grade(&storage, &lecturer, x.id, group.id, None)
            .await
            .unwrap();

        assert_eq!(first.total_points, 35.0);
        assert_eq!(first.graded_task_count, 2);
        assert_eq!(second.total_points, first.total_points);
        assert_eq!(second.graded_task_count, first.graded_task_count);
        assert_eq!(second.id, first.id);
    }

    #[tokio::test]
    async fn test_non_member_message() {
        let storage = memory_storage().await;
        let lecturer = seed_user(&storage, "lect", UserRole::Lecturer).await;
        let x = seed_user(&storage, "x", UserRole::Student).await;
        let group = seed_group(&storage, "G", lecturer.id).await;

        let err = update_student_final_grade(&storage, &lecturer, x.id, group.id, None)
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Student is not a member of this group");
    }

    #[tokio::test]
    async fn test_missing_group_and_student_principal() {
        let storage = memory_storage().await;
        let lecturer = seed_user(&storage, "lect", UserRole::Lecturer).await;
        let x = seed_user(&storage, "x", UserRole::Student).await;

        let missing = update_student_final_grade(&storage, &lecturer, x.id, 999, None).await;
        assert!(matches!(missing, Err(GradebookError::NotFound(_))));

        let denied = update_student_final_grade(&storage, &x, x.id, 999, None).await;
        assert!(matches!(denied, Err(GradebookError::Authorization(_))));
    }
}
