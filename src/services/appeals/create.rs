use std::sync::Arc;

use tracing::info;

use crate::errors::{GradebookError, Result};
use crate::models::appeals::entities::Appeal;
use crate::models::users::entities::{User, UserRole};
use crate::services::tasks::require_task;
use crate::storage::Storage;

/// 学生对自己已评分的任务提出申诉
pub async fn create_appeal(
    storage: &Arc<dyn Storage>,
    principal: &User,
    task_id: i64,
    reason: String,
) -> Result<Appeal> {
    if principal.role != UserRole::Student {
        return Err(GradebookError::authorization("Only students can appeal a grade"));
    }

    let task = require_task(storage, task_id).await?;
    if !task.is_assignee(principal.id) {
        return Err(GradebookError::authorization("You are not an assignee of this task"));
    }

    let reason = reason.trim().to_string();
    if reason.is_empty() {
        return Err(GradebookError::validation("Appeal reason must not be empty"));
    }

    if storage.get_task_grade(task_id, principal.id).await?.is_none() {
        return Err(GradebookError::validation("This task has not been graded for you yet"));
    }

    // 待处理申诉的唯一性由存储层在事务内保证
    let appeal = storage.create_appeal(task_id, principal.id, reason).await?;

    info!("Appeal {} filed by student {} on task {}", appeal.id, principal.id, task_id);
    Ok(appeal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::appeals::entities::AppealStatus;
    use crate::models::tasks::entities::TaskStatus;
    use crate::storage::testing::{grade, memory_storage, seed_group, seed_task, seed_user};

    #[tokio::test]
    async fn test_appeal_moves_task_to_appeal() {
        let storage = memory_storage().await;
        let lecturer = seed_user(&storage, "lect", UserRole::Lecturer).await;
        let x = seed_user(&storage, "x", UserRole::Student).await;
        let group = seed_group(&storage, "G", lecturer.id).await;
        let task = seed_task(&storage, group.id, lecturer.id, vec![x.id]).await;
        grade(&storage, task.id, x.id, lecturer.id, 12.0).await;

        let appeal = create_appeal(&storage, &x, task.id, " Rubric item 3 ".to_string())
            .await
            .unwrap();
        assert_eq!(appeal.status, AppealStatus::Pending);
        assert_eq!(appeal.reason, "Rubric item 3");

        let stored = storage.get_task_by_id(task.id).await.unwrap().unwrap();
        assert_eq!(stored.status, TaskStatus::Appeal);

        let again = create_appeal(&storage, &x, task.id, "Once more".to_string()).await;
        assert!(matches!(again, Err(GradebookError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_concurrent_appeals_leave_one_pending() {
        let storage = memory_storage().await;
        let lecturer = seed_user(&storage, "lect", UserRole::Lecturer).await;
        let x = seed_user(&storage, "x", UserRole::Student).await;
        let group = seed_group(&storage, "G", lecturer.id).await;
        let task = seed_task(&storage, group.id, lecturer.id, vec![x.id]).await;
        grade(&storage, task.id, x.id, lecturer.id, 12.0).await;

        let (a, b) = tokio::join!(
            create_appeal(&storage, &x, task.id, "one".to_string()),
            create_appeal(&storage, &x, task.id, "two".to_string())
        );
        assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
        let loser = if a.is_ok() { b } else { a };
        assert!(matches!(loser, Err(GradebookError::Conflict(_))));
        assert_eq!(storage.count_pending_appeals_for_task(task.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_requires_grade_and_assignment() {
        let storage = memory_storage().await;
        let lecturer = seed_user(&storage, "lect", UserRole::Lecturer).await;
        let x = seed_user(&storage, "x", UserRole::Student).await;
        let y = seed_user(&storage, "y", UserRole::Student).await;
        let group = seed_group(&storage, "G", lecturer.id).await;
        let task = seed_task(&storage, group.id, lecturer.id, vec![x.id]).await;

        let ungraded = create_appeal(&storage, &x, task.id, "why".to_string()).await;
        assert!(matches!(ungraded, Err(GradebookError::Validation(_))));

        let outsider = create_appeal(&storage, &y, task.id, "why".to_string()).await;
        assert!(matches!(outsider, Err(GradebookError::Authorization(_))));

        let staff = create_appeal(&storage, &lecturer, task.id, "why".to_string()).await;
        assert!(matches!(staff, Err(GradebookError::Authorization(_))));
    }

    #[tokio::test]
    async fn test_blank_reason() {
        let storage = memory_storage().await;
        let lecturer = seed_user(&storage, "lect", UserRole::Lecturer).await;
        let x = seed_user(&storage, "x", UserRole::Student).await;
        let group = seed_group(&storage, "G", lecturer.id).await;
        let task = seed_task(&storage, group.id, lecturer.id, vec![x.id]).await;
        grade(&storage, task.id, x.id, lecturer.id, 12.0).await;

        let result = create_appeal(&storage, &x, task.id, "   ".to_string()).await;
        assert!(matches!(result, Err(GradebookError::Validation(_))));
    }
}
