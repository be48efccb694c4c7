use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 排行榜最多返回的条数
pub const MAX_LEADERBOARD_SIZE: usize = 10;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/leaderboard.ts")]
pub struct LeaderboardQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/leaderboard.ts")]
pub struct LeaderboardEntry {
    /// 从 1 开始的名次
    pub rank: usize,
    pub user_id: i64,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    /// 测验、作业与额外加分之和
    pub base_points: f64,
    /// 期末项目任务得分之和
    pub project_points: f64,
    pub total_points: f64,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/leaderboard.ts")]
pub struct LeaderboardResponse {
    pub items: Vec<LeaderboardEntry>,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}
