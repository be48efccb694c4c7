pub mod create;
pub mod grade;

pub use create::create_task;
pub use grade::grade_task;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::errors::{GradebookError, Result};
use crate::models::ApiResponse;
use crate::models::tasks::{
    requests::{CreateTaskRequest, GradeTaskRequest},
    responses::{TaskDetailResponse, TaskListResponse},
};
use crate::models::users::entities::User;
use crate::storage::Storage;

pub struct TaskService {
    storage: Option<Arc<dyn Storage>>,
}

impl TaskService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Result<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn create_task(
        &self,
        request: &HttpRequest,
        principal: &User,
        group_id: i64,
        body: CreateTaskRequest,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;
        let task = create_task(&storage, principal, group_id, body).await?;
        Ok(HttpResponse::Created().json(ApiResponse::success(task, "Task created")))
    }

    pub async fn list_tasks(
        &self,
        request: &HttpRequest,
        group_id: i64,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;
        super::require_group(&storage, group_id).await?;
        let items = storage.list_tasks_by_group(group_id).await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success(
            TaskListResponse { items },
            "Tasks retrieved",
        )))
    }

    // 任务详情附带全部评分
    pub async fn get_task(&self, request: &HttpRequest, task_id: i64) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;
        let task = require_task(&storage, task_id).await?;
        let grades = storage.list_task_grades(task_id).await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success(
            TaskDetailResponse { task, grades },
            "Task retrieved",
        )))
    }

    pub async fn grade_task(
        &self,
        request: &HttpRequest,
        principal: &User,
        task_id: i64,
        body: GradeTaskRequest,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;
        let max_points = AppConfig::get().grading.max_task_points;
        let graded = grade_task(&storage, principal, task_id, body, max_points).await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success(graded, "Task graded")))
    }
}

pub(crate) async fn require_task(
    storage: &Arc<dyn Storage>,
    task_id: i64,
) -> Result<crate::models::tasks::entities::Task> {
    storage
        .get_task_by_id(task_id)
        .await?
        .ok_or_else(|| GradebookError::not_found("Task not found"))
}
