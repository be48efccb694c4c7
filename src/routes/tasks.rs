use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RequireJWT};
use crate::models::appeals::requests::CreateAppealRequest;
use crate::models::tasks::requests::GradeTaskRequest;
use crate::models::users::entities::UserRole;
use crate::services::{AppealService, TaskService};
use crate::utils::SafeTaskId;

static TASK_SERVICE: Lazy<TaskService> = Lazy::new(TaskService::new_lazy);
static APPEAL_SERVICE: Lazy<AppealService> = Lazy::new(AppealService::new_lazy);

pub async fn get_task(req: HttpRequest, task_id: SafeTaskId) -> ActixResult<HttpResponse> {
    TASK_SERVICE.get_task(&req, task_id.0).await
}

pub async fn grade_task(
    req: HttpRequest,
    task_id: SafeTaskId,
    body: web::Json<GradeTaskRequest>,
) -> ActixResult<HttpResponse> {
    let principal = RequireJWT::principal(&req)?;
    TASK_SERVICE
        .grade_task(&req, &principal, task_id.0, body.into_inner())
        .await
}

pub async fn create_appeal(
    req: HttpRequest,
    task_id: SafeTaskId,
    body: web::Json<CreateAppealRequest>,
) -> ActixResult<HttpResponse> {
    let principal = RequireJWT::principal(&req)?;
    APPEAL_SERVICE
        .create_appeal(&req, &principal, task_id.0, body.into_inner())
        .await
}

// 配置路由
pub fn configure_task_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/tasks")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("/{task_id}").route(
                    web::get()
                        .to(get_task)
                        .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles())),
                ),
            )
            .service(
                web::resource("/{task_id}/grades").route(
                    web::put()
                        .to(grade_task)
                        .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles())),
                ),
            )
            .service(
                web::resource("/{task_id}/appeals").route(
                    web::post()
                        .to(create_appeal)
                        // 只有学生本人可以申诉
                        .wrap(middlewares::RequireRole::new(&UserRole::Student)),
                ),
            ),
    );
}
