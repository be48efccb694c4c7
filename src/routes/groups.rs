use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RequireJWT};
use crate::models::final_grades::requests::RecalculateFinalGradeRequest;
use crate::models::groups::requests::{
    AddGroupMemberRequest, CreateGroupRequest, GroupListParams,
};
use crate::models::tasks::requests::CreateTaskRequest;
use crate::models::users::entities::UserRole;
use crate::services::{FinalGradeService, GroupService, TaskService};
use crate::utils::{SafeGroupId, SafeStudentId, SafeUserId, parse_optional_json};

static GROUP_SERVICE: Lazy<GroupService> = Lazy::new(GroupService::new_lazy);
static TASK_SERVICE: Lazy<TaskService> = Lazy::new(TaskService::new_lazy);
static FINAL_GRADE_SERVICE: Lazy<FinalGradeService> = Lazy::new(FinalGradeService::new_lazy);

pub async fn list_groups(
    req: HttpRequest,
    query: web::Query<GroupListParams>,
) -> ActixResult<HttpResponse> {
    GROUP_SERVICE.list_groups(&req, query.into_inner()).await
}

pub async fn create_group(
    req: HttpRequest,
    body: web::Json<CreateGroupRequest>,
) -> ActixResult<HttpResponse> {
    let principal = RequireJWT::principal(&req)?;
    GROUP_SERVICE
        .create_group(&req, &principal, body.into_inner())
        .await
}

pub async fn get_group(req: HttpRequest, group_id: SafeGroupId) -> ActixResult<HttpResponse> {
    GROUP_SERVICE.get_group(&req, group_id.0).await
}

pub async fn list_members(req: HttpRequest, group_id: SafeGroupId) -> ActixResult<HttpResponse> {
    GROUP_SERVICE.list_members(&req, group_id.0).await
}

pub async fn add_member(
    req: HttpRequest,
    group_id: SafeGroupId,
    body: web::Json<AddGroupMemberRequest>,
) -> ActixResult<HttpResponse> {
    let principal = RequireJWT::principal(&req)?;
    GROUP_SERVICE
        .add_member(&req, &principal, group_id.0, body.into_inner())
        .await
}

pub async fn remove_member(
    req: HttpRequest,
    group_id: SafeGroupId,
    user_id: SafeUserId,
) -> ActixResult<HttpResponse> {
    let principal = RequireJWT::principal(&req)?;
    GROUP_SERVICE
        .remove_member(&req, &principal, group_id.0, user_id.0)
        .await
}

pub async fn list_tasks(req: HttpRequest, group_id: SafeGroupId) -> ActixResult<HttpResponse> {
    TASK_SERVICE.list_tasks(&req, group_id.0).await
}

pub async fn create_task(
    req: HttpRequest,
    group_id: SafeGroupId,
    body: web::Json<CreateTaskRequest>,
) -> ActixResult<HttpResponse> {
    let principal = RequireJWT::principal(&req)?;
    TASK_SERVICE
        .create_task(&req, &principal, group_id.0, body.into_inner())
        .await
}

pub async fn list_final_grades(
    req: HttpRequest,
    group_id: SafeGroupId,
) -> ActixResult<HttpResponse> {
    FINAL_GRADE_SERVICE
        .list_group_final_grades(&req, group_id.0)
        .await
}

pub async fn get_final_grade(
    req: HttpRequest,
    group_id: SafeGroupId,
    student_id: SafeStudentId,
) -> ActixResult<HttpResponse> {
    FINAL_GRADE_SERVICE
        .get_final_grade(&req, group_id.0, student_id.0)
        .await
}

pub async fn recalculate_final_grade(
    req: HttpRequest,
    group_id: SafeGroupId,
    student_id: SafeStudentId,
    body: web::Bytes,
) -> ActixResult<HttpResponse> {
    let principal = RequireJWT::principal(&req)?;
    // 请求体可省略，但给出时必须是合法 JSON
    let body: RecalculateFinalGradeRequest = parse_optional_json(&body)?;
    FINAL_GRADE_SERVICE
        .recalculate_final_grade(&req, &principal, group_id.0, student_id.0, body)
        .await
}

// 配置路由
pub fn configure_group_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/groups")
            .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles()))
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(list_groups))
                    .route(web::post().to(create_group)),
            )
            .service(web::resource("/{group_id}").route(web::get().to(get_group)))
            .service(
                web::resource("/{group_id}/members")
                    .route(web::get().to(list_members))
                    .route(web::post().to(add_member)),
            )
            .service(
                web::resource("/{group_id}/members/{user_id}")
                    .route(web::delete().to(remove_member)),
            )
            .service(
                web::resource("/{group_id}/tasks")
                    .route(web::get().to(list_tasks))
                    .route(web::post().to(create_task)),
            )
            .service(
                web::resource("/{group_id}/final-grades")
                    .route(web::get().to(list_final_grades)),
            )
            .service(
                web::resource("/{group_id}/final-grades/{student_id}")
                    .route(web::get().to(get_final_grade)),
            )
            .service(
                web::resource("/{group_id}/final-grades/{student_id}/recalculate")
                    .route(web::post().to(recalculate_final_grade)),
            ),
    );
}
