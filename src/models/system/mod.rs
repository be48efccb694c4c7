use serde::Serialize;
use ts_rs::TS;

/// 公开的系统设置（只读）
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/system.ts")]
pub struct SystemSettingsResponse {
    pub system_name: String,
    pub environment: String,
    /// 单个任务允许的最高分
    pub max_task_points: f64,
    pub leaderboard_size: usize,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
}
