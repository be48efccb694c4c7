use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/appeal.ts")]
pub enum AppealStatus {
    Pending,
    Accepted,
    Rejected,
}

impl std::fmt::Display for AppealStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppealStatus::Pending => write!(f, "pending"),
            AppealStatus::Accepted => write!(f, "accepted"),
            AppealStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for AppealStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AppealStatus::Pending),
            "accepted" => Ok(AppealStatus::Accepted),
            "rejected" => Ok(AppealStatus::Rejected),
            _ => Err(format!("Invalid appeal status: {s}")),
        }
    }
}

// 评分申诉
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/appeal.ts")]
pub struct Appeal {
    pub id: i64,
    pub task_id: i64,
    pub student_id: i64,
    pub reason: String,
    pub status: AppealStatus,
    pub resolution: Option<String>,
    pub resolved_by: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub resolved_at: Option<chrono::DateTime<chrono::Utc>>,
}
