//! 基础积分流水：测验、作业与额外加分

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use tracing::info;

use crate::errors::{GradebookError, Result};
use crate::models::ApiResponse;
use crate::models::points::{
    entities::PointEntry, requests::CreatePointEntryRequest, responses::PointEntryListResponse,
};
use crate::models::users::entities::{User, UserRole};
use crate::services::{ensure_staff, require_user};
use crate::storage::Storage;
use crate::utils::validate::validate_point_entry;

pub struct PointService {
    storage: Option<Arc<dyn Storage>>,
}

impl PointService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Result<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn create_point_entry(
        &self,
        request: &HttpRequest,
        principal: &User,
        student_id: i64,
        body: CreatePointEntryRequest,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;
        let entry = create_point_entry(&storage, principal, student_id, body).await?;
        Ok(HttpResponse::Created().json(ApiResponse::success(entry, "Points recorded")))
    }

    pub async fn list_point_entries(
        &self,
        request: &HttpRequest,
        principal: &User,
        student_id: i64,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;
        let entries = list_point_entries(&storage, principal, student_id).await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success(entries, "Points retrieved")))
    }
}

pub async fn create_point_entry(
    storage: &Arc<dyn Storage>,
    principal: &User,
    student_id: i64,
    mut req: CreatePointEntryRequest,
) -> Result<PointEntry> {
    ensure_staff(principal)?;

    let student = require_user(storage, student_id).await?;
    if student.role != UserRole::Student {
        return Err(GradebookError::validation(
            "Points can only be awarded to students",
        ));
    }

    req.label = req.label.trim().to_string();
    if req.label.is_empty() {
        return Err(GradebookError::validation("Label must not be empty"));
    }
    validate_point_entry(req.source, req.points)?;

    let entry = storage
        .create_point_entry(student_id, principal.id, req)
        .await?;
    info!(
        "{} {} points ({}) recorded for student {} by {}",
        entry.source, entry.points, entry.label, student_id, principal.id
    );
    Ok(entry)
}

/// 学生本人或讲师、管理员可查看
pub async fn list_point_entries(
    storage: &Arc<dyn Storage>,
    principal: &User,
    student_id: i64,
) -> Result<PointEntryListResponse> {
    if principal.id != student_id && !principal.role.is_staff() {
        return Err(GradebookError::authorization(
            "You can only view your own points",
        ));
    }
    require_user(storage, student_id).await?;

    let items = storage.list_point_entries_by_student(student_id).await?;
    let total_points: f64 = items.iter().map(|e| e.points).sum();
    Ok(PointEntryListResponse {
        items,
        total_points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::points::entities::PointSource;
    use crate::storage::testing::{memory_storage, seed_user};

    fn entry(source: PointSource, label: &str, points: f64) -> CreatePointEntryRequest {
        CreatePointEntryRequest {
            source,
            label: label.to_string(),
            points,
        }
    }

    #[tokio::test]
    async fn test_record_and_total() {
        let storage = memory_storage().await;
        let lecturer = seed_user(&storage, "lect", UserRole::Lecturer).await;
        let x = seed_user(&storage, "x", UserRole::Student).await;

        create_point_entry(&storage, &lecturer, x.id, entry(PointSource::Quiz, "Quiz 1", 8.0))
            .await
            .unwrap();
        create_point_entry(&storage, &lecturer, x.id, entry(PointSource::Assignment, "A1", 10.0))
            .await
            .unwrap();
        create_point_entry(&storage, &lecturer, x.id, entry(PointSource::Extra, "Late", -2.5))
            .await
            .unwrap();

        let own = list_point_entries(&storage, &x, x.id).await.unwrap();
        assert_eq!(own.items.len(), 3);
        assert_eq!(own.total_points, 15.5);
    }

    #[tokio::test]
    async fn test_rejects_negative_quiz_and_non_student() {
        let storage = memory_storage().await;
        let lecturer = seed_user(&storage, "lect", UserRole::Lecturer).await;
        let x = seed_user(&storage, "x", UserRole::Student).await;

        let quiz = entry(PointSource::Quiz, "Q", -1.0);
        let negative = create_point_entry(&storage, &lecturer, x.id, quiz).await;
        assert!(matches!(negative, Err(GradebookError::Validation(_))));

        let blank =
            create_point_entry(&storage, &lecturer, x.id, entry(PointSource::Quiz, " ", 1.0)).await;
        assert!(matches!(blank, Err(GradebookError::Validation(_))));

        let to_staff = create_point_entry(
            &storage,
            &lecturer,
            lecturer.id,
            entry(PointSource::Extra, "Bonus", 1.0),
        )
        .await;
        assert!(matches!(to_staff, Err(GradebookError::Validation(_))));
    }

    #[tokio::test]
    async fn test_students_see_only_their_own() {
        let storage = memory_storage().await;
        let x = seed_user(&storage, "x", UserRole::Student).await;
        let y = seed_user(&storage, "y", UserRole::Student).await;

        let peek = list_point_entries(&storage, &y, x.id).await;
        assert!(matches!(peek, Err(GradebookError::Authorization(_))));

        let award =
            create_point_entry(&storage, &y, x.id, entry(PointSource::Extra, "Bribe", 5.0)).await;
        assert!(matches!(award, Err(GradebookError::Authorization(_))));
    }
}
