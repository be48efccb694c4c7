use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 基础积分来源
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/points.ts")]
pub enum PointSource {
    Quiz,
    Assignment,
    Extra, // 手动加/扣分
}

impl std::fmt::Display for PointSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PointSource::Quiz => write!(f, "quiz"),
            PointSource::Assignment => write!(f, "assignment"),
            PointSource::Extra => write!(f, "extra"),
        }
    }
}

impl std::str::FromStr for PointSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quiz" => Ok(PointSource::Quiz),
            "assignment" => Ok(PointSource::Assignment),
            "extra" => Ok(PointSource::Extra),
            _ => Err(format!("Invalid point source: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/points.ts")]
pub struct PointEntry {
    pub id: i64,
    pub student_id: i64,
    pub source: PointSource,
    pub label: String,
    pub points: f64,
    pub awarded_by: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
