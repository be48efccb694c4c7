use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RequireJWT};
use crate::models::users::entities::UserRole;
use crate::services::FinalGradeService;

static FINAL_GRADE_SERVICE: Lazy<FinalGradeService> = Lazy::new(FinalGradeService::new_lazy);

pub async fn recalculate_all(req: HttpRequest) -> ActixResult<HttpResponse> {
    let principal = RequireJWT::principal(&req)?;
    FINAL_GRADE_SERVICE.recalculate_all(&req, &principal).await
}

// 批量重算开销大，单独限流
pub fn configure_final_grade_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/final-grades")
            .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles()))
            .wrap(middlewares::RequireJWT)
            .route(
                "/recalculate",
                web::post()
                    .to(recalculate_all)
                    .wrap(middlewares::RateLimit::recalculation()),
            ),
    );
}
