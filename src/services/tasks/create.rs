use std::sync::Arc;

use tracing::info;

use crate::errors::{GradebookError, Result};
use crate::models::tasks::{entities::Task, requests::CreateTaskRequest};
use crate::models::users::entities::User;
use crate::services::{ensure_staff, require_group};
use crate::storage::Storage;

/// 在小组内创建任务，负责人必须都是该小组成员
pub async fn create_task(
    storage: &Arc<dyn Storage>,
    principal: &User,
    group_id: i64,
    mut req: CreateTaskRequest,
) -> Result<Task> {
    ensure_staff(principal)?;
    require_group(storage, group_id).await?;

    req.title = req.title.trim().to_string();
    if req.title.is_empty() {
        return Err(GradebookError::validation("Task title must not be empty"));
    }

    for &user_id in &req.assignee_ids {
        if storage.get_group_member(group_id, user_id).await?.is_none() {
            return Err(GradebookError::validation(format!(
                "User {user_id} is not a member of this group"
            )));
        }
    }

    let task = storage.create_task(group_id, principal.id, req).await?;
    info!(
        "Task {} created in group {} by {}",
        task.id, group_id, principal.id
    );
    Ok(task)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tasks::entities::TaskStatus;
    use crate::models::users::entities::UserRole;
    use crate::storage::testing::{memory_storage, seed_group, seed_user};

    fn request(title: &str, assignee_ids: Vec<i64>) -> CreateTaskRequest {
        CreateTaskRequest {
            title: title.to_string(),
            description: Some("Landing page".to_string()),
            assignee_ids,
        }
    }

    #[tokio::test]
    async fn test_create_with_member_assignees() {
        let storage = memory_storage().await;
        let lecturer = seed_user(&storage, "lect", UserRole::Lecturer).await;
        let x = seed_user(&storage, "x", UserRole::Student).await;
        let group = seed_group(&storage, "G", lecturer.id).await;
        storage.add_group_member(group.id, x.id).await.unwrap();

        let task = create_task(&storage, &lecturer, group.id, request("  UI  ", vec![x.id]))
            .await
            .unwrap();
        assert_eq!(task.title, "UI");
        assert_eq!(task.status, TaskStatus::Done);
        assert_eq!(task.assignee_ids, vec![x.id]);
    }

    #[tokio::test]
    async fn test_rejects_outside_assignee() {
        let storage = memory_storage().await;
        let lecturer = seed_user(&storage, "lect", UserRole::Lecturer).await;
        let outsider = seed_user(&storage, "out", UserRole::Student).await;
        let group = seed_group(&storage, "G", lecturer.id).await;

        let result =
            create_task(&storage, &lecturer, group.id, request("UI", vec![outsider.id])).await;
        assert!(matches!(result, Err(GradebookError::Validation(_))));
        assert!(storage.list_tasks_by_group(group.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_blank_title_and_missing_group() {
        let storage = memory_storage().await;
        let lecturer = seed_user(&storage, "lect", UserRole::Lecturer).await;
        let group = seed_group(&storage, "G", lecturer.id).await;

        let blank = create_task(&storage, &lecturer, group.id, request("   ", vec![])).await;
        assert!(matches!(blank, Err(GradebookError::Validation(_))));

        let missing = create_task(&storage, &lecturer, 404, request("UI", vec![])).await;
        assert!(matches!(missing, Err(GradebookError::NotFound(_))));
    }
}
