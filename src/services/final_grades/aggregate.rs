use std::sync::Arc;

use crate::errors::Result;
use crate::models::final_grades::{entities::StudentAggregate, responses::FinalGradeResponse};
use crate::storage::Storage;

/// 汇总学生在小组内的全部任务得分，没有评分时返回 `None`
pub async fn aggregate_student_grades(
    storage: &Arc<dyn Storage>,
    student_id: i64,
    group_id: i64,
) -> Result<Option<StudentAggregate>> {
    let grades = storage
        .list_student_grades_in_group(student_id, group_id)
        .await?;
    Ok(StudentAggregate::from_grades(grades))
}

/// 实时汇总与已存快照并列，快照与汇总不一致时 `stale` 为 true
pub async fn final_grade_view(
    storage: &Arc<dyn Storage>,
    group_id: i64,
    student_id: i64,
) -> Result<FinalGradeResponse> {
    crate::services::require_group(storage, group_id).await?;

    let live = aggregate_student_grades(storage, student_id, group_id).await?;
    let snapshot = storage.get_evaluation(group_id, student_id).await?;
    let stale = snapshot
        .as_ref()
        .is_some_and(|s| !s.matches(live.as_ref()));

    Ok(FinalGradeResponse {
        group_id,
        student_id,
        live,
        snapshot,
        stale,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::storage::testing::{grade, memory_storage, seed_group, seed_task, seed_user};

    #[tokio::test]
    async fn test_aggregate_twenty_plus_fifteen() {
        let storage = memory_storage().await;
        let lecturer = seed_user(&storage, "lect", UserRole::Lecturer).await;
        let x = seed_user(&storage, "x", UserRole::Student).await;
        let group = seed_group(&storage, "G", lecturer.id).await;
        let t1 = seed_task(&storage, group.id, lecturer.id, vec![x.id]).await;
        let t2 = seed_task(&storage, group.id, lecturer.id, vec![x.id]).await;
        grade(&storage, t1.id, x.id, lecturer.id, 20.0).await;
        grade(&storage, t2.id, x.id, lecturer.id, 15.0).await;

        let aggregate = aggregate_student_grades(&storage, x.id, group.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(aggregate.total_points, 35.0);
        assert_eq!(aggregate.graded_task_count, 2);
        assert_eq!(aggregate.task_grades.len(), 2);
    }

    #[tokio::test]
    async fn test_aggregate_none_without_grades() {
        let storage = memory_storage().await;
        let lecturer = seed_user(&storage, "lect", UserRole::Lecturer).await;
        let x = seed_user(&storage, "x", UserRole::Student).await;
        let group = seed_group(&storage, "G", lecturer.id).await;
        seed_task(&storage, group.id, lecturer.id, vec![x.id]).await;

        assert!(aggregate_student_grades(&storage, x.id, group.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_view_flags_stale_snapshot() {
        let storage = memory_storage().await;
        let lecturer = seed_user(&storage, "lect", UserRole::Lecturer).await;
        let x = seed_user(&storage, "x", UserRole::Student).await;
        let group = seed_group(&storage, "G", lecturer.id).await;
        storage.add_group_member(group.id, x.id).await.unwrap();
        let t1 = seed_task(&storage, group.id, lecturer.id, vec![x.id]).await;
        let t2 = seed_task(&storage, group.id, lecturer.id, vec![x.id]).await;
        grade(&storage, t1.id, x.id, lecturer.id, 20.0).await;
        storage
            .recalculate_evaluation(group.id, x.id, None)
            .await
            .unwrap();

        let fresh = final_grade_view(&storage, group.id, x.id).await.unwrap();
        assert!(!fresh.stale);

        grade(&storage, t2.id, x.id, lecturer.id, 15.0).await;
        let view = final_grade_view(&storage, group.id, x.id).await.unwrap();
        assert!(view.stale);
        assert_eq!(view.live.map(|l| l.total_points), Some(35.0));
        assert_eq!(view.snapshot.map(|s| s.total_points), Some(20.0));
    }
}
