use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RequireJWT};
use crate::models::appeals::requests::{AppealListParams, ResolveAppealRequest};
use crate::models::users::entities::UserRole;
use crate::services::AppealService;
use crate::utils::SafeAppealId;

static APPEAL_SERVICE: Lazy<AppealService> = Lazy::new(AppealService::new_lazy);

pub async fn list_appeals(
    req: HttpRequest,
    query: web::Query<AppealListParams>,
) -> ActixResult<HttpResponse> {
    APPEAL_SERVICE.list_appeals(&req, query.into_inner()).await
}

pub async fn resolve_appeal(
    req: HttpRequest,
    appeal_id: SafeAppealId,
    body: web::Json<ResolveAppealRequest>,
) -> ActixResult<HttpResponse> {
    let principal = RequireJWT::principal(&req)?;
    APPEAL_SERVICE
        .resolve_appeal(&req, &principal, appeal_id.0, body.into_inner())
        .await
}

pub fn configure_appeal_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/appeals")
            .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles()))
            .wrap(middlewares::RequireJWT)
            .service(web::resource("").route(web::get().to(list_appeals)))
            .service(
                web::resource("/{appeal_id}/resolve").route(web::post().to(resolve_appeal)),
            ),
    );
}
