use std::sync::Arc;

use tracing::info;

use crate::errors::{GradebookError, Result};
use crate::models::appeals::{
    entities::AppealStatus, requests::ResolveAppealRequest, responses::ResolveAppealResponse,
};
use crate::models::tasks::entities::TaskGradeInput;
use crate::models::users::entities::User;
use crate::services::ensure_staff;
use crate::storage::Storage;
use crate::utils::validate::validate_task_points;

/// 处理待定申诉；接受且给出新分数时同时改分
pub async fn resolve_appeal(
    storage: &Arc<dyn Storage>,
    principal: &User,
    appeal_id: i64,
    req: ResolveAppealRequest,
    max_points: f64,
) -> Result<ResolveAppealResponse> {
    ensure_staff(principal)?;

    let appeal = storage
        .get_appeal_by_id(appeal_id)
        .await?
        .ok_or_else(|| GradebookError::not_found("Appeal not found"))?;
    if appeal.status != AppealStatus::Pending {
        return Err(GradebookError::conflict("Appeal has already been resolved"));
    }

    let new_points = if req.accept { req.new_points } else { None };
    if let Some(points) = new_points {
        validate_task_points(points, max_points)?;
    }

    let regrade = new_points.map(|points| TaskGradeInput {
        task_id: appeal.task_id,
        student_id: appeal.student_id,
        grader_id: principal.id,
        points,
        feedback: None,
    });

    let (appeal, grade) = storage
        .resolve_appeal(appeal_id, principal.id, &req, regrade)
        .await?;

    info!("Appeal {} {} by {}", appeal.id, appeal.status, principal.id);
    Ok(ResolveAppealResponse { appeal, grade })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tasks::entities::TaskStatus;
    use crate::models::users::entities::UserRole;
    use crate::services::appeals::create_appeal;
    use crate::storage::testing::{grade, memory_storage, seed_group, seed_task, seed_user};

    fn decision(accept: bool, new_points: Option<f64>) -> ResolveAppealRequest {
        ResolveAppealRequest {
            accept,
            new_points,
            resolution: Some("Reviewed".to_string()),
        }
    }

    #[tokio::test]
    async fn test_accept_with_new_points() {
        let storage = memory_storage().await;
        let lecturer = seed_user(&storage, "lect", UserRole::Lecturer).await;
        let x = seed_user(&storage, "x", UserRole::Student).await;
        let group = seed_group(&storage, "G", lecturer.id).await;
        let task = seed_task(&storage, group.id, lecturer.id, vec![x.id]).await;
        grade(&storage, task.id, x.id, lecturer.id, 12.0).await;
        let appeal = create_appeal(&storage, &x, task.id, "Recount".to_string())
            .await
            .unwrap();

        let accepted = decision(true, Some(15.0));
        let resolved = resolve_appeal(&storage, &lecturer, appeal.id, accepted, 100.0)
            .await
            .unwrap();
        assert_eq!(resolved.appeal.status, AppealStatus::Accepted);
        assert_eq!(resolved.appeal.resolved_by, Some(lecturer.id));
        assert_eq!(resolved.grade.map(|g| g.points), Some(15.0));

        let task = storage.get_task_by_id(task.id).await.unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::Graded);

        let rejected = decision(false, None);
        let twice = resolve_appeal(&storage, &lecturer, appeal.id, rejected, 100.0).await;
        assert!(matches!(twice, Err(GradebookError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_reject_keeps_grade() {
        let storage = memory_storage().await;
        let lecturer = seed_user(&storage, "lect", UserRole::Lecturer).await;
        let x = seed_user(&storage, "x", UserRole::Student).await;
        let group = seed_group(&storage, "G", lecturer.id).await;
        let task = seed_task(&storage, group.id, lecturer.id, vec![x.id]).await;
        grade(&storage, task.id, x.id, lecturer.id, 12.0).await;
        let appeal = create_appeal(&storage, &x, task.id, "Recount".to_string())
            .await
            .unwrap();

        let rejected = decision(false, Some(99.0));
        let resolved = resolve_appeal(&storage, &lecturer, appeal.id, rejected, 100.0)
            .await
            .unwrap();
        assert_eq!(resolved.appeal.status, AppealStatus::Rejected);
        assert!(resolved.grade.is_none());

        let kept = storage.get_task_grade(task.id, x.id).await.unwrap().unwrap();
        assert_eq!(kept.points, 12.0);
    }

    #[tokio::test]
    async fn test_concurrent_resolutions_apply_once() {
        let storage = memory_storage().await;
        let lecturer = seed_user(&storage, "lect", UserRole::Lecturer).await;
        let admin = seed_user(&storage, "admin", UserRole::Admin).await;
        let x = seed_user(&storage, "x", UserRole::Student).await;
        let group = seed_group(&storage, "G", lecturer.id).await;
        let task = seed_task(&storage, group.id, lecturer.id, vec![x.id]).await;
        grade(&storage, task.id, x.id, lecturer.id, 12.0).await;
        let appeal = create_appeal(&storage, &x, task.id, "Recount".to_string())
            .await
            .unwrap();

        let (accept, reject) = tokio::join!(
            resolve_appeal(&storage, &lecturer, appeal.id, decision(true, Some(30.0)), 100.0),
            resolve_appeal(&storage, &admin, appeal.id, decision(false, None), 100.0)
        );
        assert_eq!(accept.is_ok() as u8 + reject.is_ok() as u8, 1);

        let stored = storage.get_appeal_by_id(appeal.id).await.unwrap().unwrap();
        let points = storage.get_task_grade(task.id, x.id).await.unwrap().unwrap().points;
        match accept {
            Ok(won) => {
                assert_eq!(stored.status, AppealStatus::Accepted);
                assert_eq!(won.appeal.resolved_by, Some(lecturer.id));
                assert_eq!(points, 30.0);
                assert!(matches!(reject, Err(GradebookError::Conflict(_))));
            }
            Err(lost) => {
                assert!(matches!(lost, GradebookError::Conflict(_)));
                assert_eq!(stored.status, AppealStatus::Rejected);
                assert_eq!(points, 12.0);
            }
        }
    }

    #[tokio::test]
    async fn test_invalid_new_points_leaves_appeal_pending() {
        let storage = memory_storage().await;
        let lecturer = seed_user(&storage, "lect", UserRole::Lecturer).await;
        let x = seed_user(&storage, "x", UserRole::Student).await;
        let group = seed_group(&storage, "G", lecturer.id).await;
        let task = seed_task(&storage, group.id, lecturer.id, vec![x.id]).await;
        grade(&storage, task.id, x.id, lecturer.id, 12.0).await;
        let appeal = create_appeal(&storage, &x, task.id, "Recount".to_string())
            .await
            .unwrap();

        let negative = decision(true, Some(-3.0));
        let result = resolve_appeal(&storage, &lecturer, appeal.id, negative, 100.0).await;
        assert!(matches!(result, Err(GradebookError::Validation(_))));

        let still = storage.get_appeal_by_id(appeal.id).await.unwrap().unwrap();
        assert_eq!(still.status, AppealStatus::Pending);

        let missing = resolve_appeal(&storage, &lecturer, 999, decision(false, None), 100.0).await;
        assert!(matches!(missing, Err(GradebookError::NotFound(_))));
    }
}
