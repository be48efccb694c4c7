use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RequireJWT};
use crate::models::points::requests::CreatePointEntryRequest;
use crate::models::users::entities::UserRole;
use crate::services::PointService;
use crate::utils::SafeStudentId;

static POINT_SERVICE: Lazy<PointService> = Lazy::new(PointService::new_lazy);

pub async fn list_points(req: HttpRequest, student_id: SafeStudentId) -> ActixResult<HttpResponse> {
    let principal = RequireJWT::principal(&req)?;
    POINT_SERVICE
        .list_point_entries(&req, &principal, student_id.0)
        .await
}

pub async fn create_point_entry(
    req: HttpRequest,
    student_id: SafeStudentId,
    body: web::Json<CreatePointEntryRequest>,
) -> ActixResult<HttpResponse> {
    let principal = RequireJWT::principal(&req)?;
    POINT_SERVICE
        .create_point_entry(&req, &principal, student_id.0, body.into_inner())
        .await
}

pub fn configure_point_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/students")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("/{student_id}/points")
                    // 学生只能查看自己的积分，服务层校验
                    .route(web::get().to(list_points))
                    .route(
                        web::post()
                            .to(create_point_entry)
                            .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles())),
                    ),
            ),
    );
}
