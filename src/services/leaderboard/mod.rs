//! 排行榜：基础积分 + 期末项目得分

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::ApiResponse;
use crate::models::leaderboard::{
    LeaderboardEntry, LeaderboardQuery, LeaderboardResponse, MAX_LEADERBOARD_SIZE,
};
use crate::models::points::entities::PointEntry;
use crate::models::tasks::entities::TaskGrade;
use crate::models::users::entities::{User, UserRole};
use crate::storage::Storage;

pub struct LeaderboardService {
    storage: Option<Arc<dyn Storage>>,
}

impl LeaderboardService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Result<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn get_leaderboard(
        &self,
        request: &HttpRequest,
        query: LeaderboardQuery,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;
        let limit = clamp_limit(query.limit, AppConfig::get().grading.leaderboard_size);
        let items = build_leaderboard(&storage, limit).await?;

        Ok(HttpResponse::Ok().json(ApiResponse::success(
            LeaderboardResponse {
                items,
                generated_at: chrono::Utc::now(),
            },
            "Leaderboard retrieved",
        )))
    }
}

/// 请求的条数限制在 1..=10 之内，缺省时使用配置值
pub fn clamp_limit(requested: Option<usize>, default: usize) -> usize {
    requested
        .unwrap_or(default)
        .clamp(1, MAX_LEADERBOARD_SIZE)
}

/// 从存储中实时计算排行榜
pub async fn build_leaderboard(
    storage: &Arc<dyn Storage>,
    limit: usize,
) -> Result<Vec<LeaderboardEntry>> {
    let students = storage.list_users_by_role(UserRole::Student).await?;
    let points = storage.list_all_point_entries().await?;
    let grades = storage.list_all_task_grades().await?;
    Ok(rank_leaderboard(students, &points, &grades, limit))
}

/// 按总分降序排列，同分按用户 ID 升序，最多返回 `min(limit, 10)` 条
pub fn rank_leaderboard(
    students: Vec<User>,
    points: &[PointEntry],
    grades: &[TaskGrade],
    limit: usize,
) -> Vec<LeaderboardEntry> {
    let mut base: HashMap<i64, f64> = HashMap::new();
    for entry in points {
        *base.entry(entry.student_id).or_default() += entry.points;
    }
    let mut project: HashMap<i64, f64> = HashMap::new();
    for grade in grades {
        *project.entry(grade.student_id).or_default() += grade.points;
    }

    let mut entries: Vec<LeaderboardEntry> = students
        .into_iter()
        .map(|student| {
            let base_points = base.get(&student.id).copied().unwrap_or_default();
            let project_points = project.get(&student.id).copied().unwrap_or_default();
            LeaderboardEntry {
                rank: 0,
                user_id: student.id,
                username: student.username,
                display_name: student.profile.display_name,
                avatar_url: student.profile.avatar_url,
                base_points,
                project_points,
                total_points: base_points + project_points,
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        b.total_points
            .total_cmp(&a.total_points)
            .then(a.user_id.cmp(&b.user_id))
    });
    entries.truncate(limit.min(MAX_LEADERBOARD_SIZE));
    for (index, entry) in entries.iter_mut().enumerate() {
        entry.rank = index + 1;
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::points::entities::PointSource;
    use crate::models::points::requests::CreatePointEntryRequest;
    use crate::storage::testing::{grade, memory_storage, seed_group, seed_task, seed_user};

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None, 10), 10);
        assert_eq!(clamp_limit(Some(3), 10), 3);
        assert_eq!(clamp_limit(Some(50), 10), 10);
        assert_eq!(clamp_limit(Some(0), 10), 1);
        assert_eq!(clamp_limit(None, 25), 10);
    }

    #[tokio::test]
    async fn test_ranks_students_only() {
        let storage = memory_storage().await;
        let lecturer = seed_user(&storage, "lect", UserRole::Lecturer).await;
        let mut students = Vec::new();
        for i in 0..12 {
            students.push(seed_user(&storage, &format!("s{i}"), UserRole::Student).await);
        }
        let group = seed_group(&storage, "G", lecturer.id).await;
        let task = seed_task(
            &storage,
            group.id,
            lecturer.id,
            students.iter().map(|s| s.id).collect(),
        )
        .await;
        for (i, student) in students.iter().enumerate() {
            grade(&storage, task.id, student.id, lecturer.id, i as f64).await;
        }
        storage
            .create_point_entry(
                students[0].id,
                lecturer.id,
                CreatePointEntryRequest {
                    source: PointSource::Quiz,
                    label: "Quiz 1".to_string(),
                    points: 100.0,
                },
            )
            .await
            .unwrap();

        let board = build_leaderboard(&storage, 50).await.unwrap();
        assert_eq!(board.len(), 10);
        assert!(board.windows(2).all(|w| w[0].total_points >= w[1].total_points));
        assert!(board.iter().all(|e| e.user_id != lecturer.id));

        let top = &board[0];
        assert_eq!(top.rank, 1);
        assert_eq!(top.user_id, students[0].id);
        assert_eq!(top.base_points, 100.0);
        assert_eq!(top.project_points, 0.0);
        assert_eq!(top.display_name.as_deref(), Some("S0"));
    }

    #[tokio::test]
    async fn test_ties_break_by_user_id() {
        let storage = memory_storage().await;
        let a = seed_user(&storage, "a", UserRole::Student).await;
        let b = seed_user(&storage, "b", UserRole::Student).await;
        let c = seed_user(&storage, "c", UserRole::Student).await;

        let board = build_leaderboard(&storage, 10).await.unwrap();
        let ids: Vec<i64> = board.iter().map(|e| e.user_id).collect();
        assert_eq!(ids, vec![a.id, b.id, c.id]);
        assert_eq!(board.iter().map(|e| e.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_rank_empty() {
        assert!(rank_leaderboard(Vec::new(), &[], &[], 10).is_empty());
    }
}
