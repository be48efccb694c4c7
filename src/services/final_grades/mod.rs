//! 期末成绩：实时汇总、快照写入与批量重算

pub mod aggregate;
pub mod recalculate;
pub mod snapshot;

pub use aggregate::{aggregate_student_grades, final_grade_view};
pub use recalculate::recalculate_all_final_grades;
pub use snapshot::update_student_final_grade;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::Result;
use crate::models::ApiResponse;
use crate::models::final_grades::{
    requests::RecalculateFinalGradeRequest, responses::EvaluationListResponse,
};
use crate::models::users::entities::User;
use crate::storage::Storage;

pub struct FinalGradeService {
    storage: Option<Arc<dyn Storage>>,
}

impl FinalGradeService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Result<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    /// 单个学生：实时汇总 + 快照 + 是否过期
    pub async fn get_final_grade(
        &self,
        request: &HttpRequest,
        group_id: i64,
        student_id: i64,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;
        let view = final_grade_view(&storage, group_id, student_id).await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success(view, "Final grade retrieved")))
    }

    pub async fn list_group_final_grades(
        &self,
        request: &HttpRequest,
        group_id: i64,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;
        super::require_group(&storage, group_id).await?;
        let items = storage.list_evaluations(Some(group_id)).await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success(
            EvaluationListResponse { items },
            "Final grades retrieved",
        )))
    }

    pub async fn recalculate_final_grade(
        &self,
        request: &HttpRequest,
        principal: &User,
        group_id: i64,
        student_id: i64,
        body: RecalculateFinalGradeRequest,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;
        let evaluation =
            update_student_final_grade(&storage, principal, student_id, group_id, body.feedback)
                .await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success(
            evaluation,
            "Final grade recalculated",
        )))
    }

    pub async fn recalculate_all(
        &self,
        request: &HttpRequest,
        principal: &User,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;
        let report = recalculate_all_final_grades(&storage, principal).await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success(
            report,
            "Final grades recalculation finished",
        )))
    }
}
