use std::sync::Arc;

use tracing::{info, warn};

use super::update_student_final_grade;
use crate::errors::Result;
use crate::models::final_grades::responses::{RecalculationFailure, RecalculationReport};
use crate::models::users::entities::User;
use crate::storage::Storage;

/// 重算所有已存在的快照；单条失败记录日志后继续
pub async fn recalculate_all_final_grades(
    storage: &Arc<dyn Storage>,
    principal: &User,
) -> Result<RecalculationReport> {
    crate::services::ensure_staff(principal)?;

    let snapshots = storage.list_evaluations(None).await?;
    let mut report = RecalculationReport {
        total: snapshots.len(),
        ..Default::default()
    };

    for snapshot in snapshots {
        match update_student_final_grade(
            storage,
            principal,
            snapshot.student_id,
            snapshot.group_id,
            None,
        )
        .await
        {
            Ok(_) => report.succeeded += 1,
            Err(err) => {
                warn!(
                    "Skipping final grade of student {} in group {}: {}",
                    snapshot.student_id, snapshot.group_id, err
                );
                report.failed.push(RecalculationFailure {
                    group_id: snapshot.group_id,
                    student_id: snapshot.student_id,
                    error: err.message().to_string(),
                });
            }
        }
    }

    info!(
        "Bulk final grade recalculation: {}/{} succeeded",
        report.succeeded, report.total
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::storage::testing::{grade, memory_storage, seed_group, seed_task, seed_user};

    #[tokio::test]
    async fn test_continues_past_failing_row() {
        let storage = memory_storage().await;
        let lecturer = seed_user(&storage, "lect", UserRole::Lecturer).await;
        let a = seed_user(&storage, "a", UserRole::Student).await;
        let b = seed_user(&storage, "b", UserRole::Student).await;
        let group = seed_group(&storage, "G", lecturer.id).await;
        storage.add_group_member(group.id, a.id).await.unwrap();
        storage.add_group_member(group.id, b.id).await.unwrap();
        let task = seed_task(&storage, group.id, lecturer.id, vec![a.id, b.id]).await;
        grade(&storage, task.id, a.id, lecturer.id, 10.0).await;
        grade(&storage, task.id, b.id, lecturer.id, 12.0).await;
        storage
            .recalculate_evaluation(group.id, a.id, Some("keep me".to_string()))
            .await
            .unwrap();
        storage
            .recalculate_evaluation(group.id, b.id, None)
            .await
            .unwrap();

        // a 的成绩变化，b 离开小组
        grade(&storage, task.id, a.id, lecturer.id, 16.0).await;
        storage.remove_group_member(group.id, b.id).await.unwrap();

        let report = recalculate_all_final_grades(&storage, &lecturer)
            .await
            .unwrap();
        assert_eq!(report.total, 2);
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].student_id, b.id);
        assert_eq!(report.failed[0].error, "Student is not a member of this group");

        let refreshed = storage.get_evaluation(group.id, a.id).await.unwrap().unwrap();
        assert_eq!(refreshed.total_points, 16.0);
        assert_eq!(refreshed.feedback.as_deref(), Some("keep me"));
    }

    #[tokio::test]
    async fn test_empty_report_without_snapshots() {
        let storage = memory_storage().await;
        let admin = seed_user(&storage, "root", UserRole::Admin).await;

        let report = recalculate_all_final_grades(&storage, &admin).await.unwrap();
        assert_eq!(report.total, 0);
        assert!(report.failed.is_empty());
    }
}
