use super::entities::AppealStatus;
use crate::models::common::PaginationQuery;
use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/appeal.ts")]
pub struct CreateAppealRequest {
    pub reason: String,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/appeal.ts")]
pub struct ResolveAppealRequest {
    /// 是否接受申诉
    pub accept: bool,
    /// 接受时可以给出新的分数
    pub new_points: Option<f64>,
    pub resolution: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/appeal.ts")]
pub struct AppealListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub status: Option<AppealStatus>,
    pub task_id: Option<i64>,
}

// 申诉列表查询参数（用于存储层）
#[derive(Debug, Clone, Default)]
pub struct AppealListQuery {
    pub page: u64,
    pub size: u64,
    pub status: Option<AppealStatus>,
    pub task_id: Option<i64>,
}

impl From<AppealListParams> for AppealListQuery {
    fn from(params: AppealListParams) -> Self {
        let (page, size) = params.pagination.normalized();
        Self {
            page,
            size,
            status: params.status,
            task_id: params.task_id,
        }
    }
}
