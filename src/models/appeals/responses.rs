use super::entities::Appeal;
use crate::models::common::PaginationInfo;
use crate::models::tasks::entities::TaskGrade;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/appeal.ts")]
pub struct AppealListResponse {
    pub items: Vec<Appeal>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/appeal.ts")]
pub struct ResolveAppealResponse {
    pub appeal: Appeal,
    /// 申诉被接受并改分时返回新的评分
    pub grade: Option<TaskGrade>,
}
