use super::entities::PointEntry;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/points.ts")]
pub struct PointEntryListResponse {
    pub items: Vec<PointEntry>,
    pub total_points: f64,
}
