use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};

use super::SystemService;
use crate::config::AppConfig;
use crate::models::{ApiResponse, AppStartTime, system::SystemSettingsResponse};

pub(crate) fn build_settings(
    config: &AppConfig,
    started: Option<&AppStartTime>,
) -> SystemSettingsResponse {
    SystemSettingsResponse {
        system_name: config.app.system_name.clone(),
        environment: config.app.environment.clone(),
        max_task_points: config.grading.max_task_points,
        leaderboard_size: config.grading.leaderboard_size,
        started_at: started.map(|s| s.start_datetime),
    }
}

/// 获取公开系统设置（只读）
pub async fn get_settings(
    service: &SystemService,
    req: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let started = req.app_data::<web::Data<AppStartTime>>();
    let response = build_settings(service.get_config(), started.map(|d| d.get_ref()));

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        response,
        "Settings retrieved successfully",
    )))
}
