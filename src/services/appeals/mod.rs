pub mod create;
pub mod resolve;

pub use create::create_appeal;
pub use resolve::resolve_appeal;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::ApiResponse;
use crate::models::appeals::requests::{
    AppealListParams, CreateAppealRequest, ResolveAppealRequest,
};
use crate::models::users::entities::User;
use crate::storage::Storage;

pub struct AppealService {
    storage: Option<Arc<dyn Storage>>,
}

impl AppealService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Result<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn create_appeal(
        &self,
        request: &HttpRequest,
        principal: &User,
        task_id: i64,
        body: CreateAppealRequest,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;
        let appeal = create_appeal(&storage, principal, task_id, body.reason).await?;
        Ok(HttpResponse::Created().json(ApiResponse::success(appeal, "Appeal submitted")))
    }

    pub async fn list_appeals(
        &self,
        request: &HttpRequest,
        params: AppealListParams,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;
        let appeals = storage.list_appeals_with_pagination(params.into()).await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success(appeals, "Appeals retrieved")))
    }

    pub async fn resolve_appeal(
        &self,
        request: &HttpRequest,
        principal: &User,
        appeal_id: i64,
        body: ResolveAppealRequest,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;
        let max_points = AppConfig::get().grading.max_task_points;
        let resolved = resolve_appeal(&storage, principal, appeal_id, body, max_points).await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success(resolved, "Appeal resolved")))
    }
}
