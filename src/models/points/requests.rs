use super::entities::PointSource;
use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/points.ts")]
pub struct CreatePointEntryRequest {
    pub source: PointSource,
    /// 例如测验或作业名称
    pub label: String,
    pub points: f64,
}
