pub mod appeals;
pub mod auth;
pub mod final_grades;
pub mod groups;
pub mod leaderboard;
pub mod points;
pub mod system;
pub mod tasks;
pub mod users;

pub use appeals::AppealService;
pub use auth::AuthService;
pub use final_grades::FinalGradeService;
pub use groups::GroupService;
pub use leaderboard::LeaderboardService;
pub use points::PointService;
pub use system::SystemService;
pub use tasks::TaskService;
pub use users::UserService;

use actix_web::{HttpRequest, web};
use std::sync::Arc;

use crate::errors::{GradebookError, Result};
use crate::models::groups::entities::Group;
use crate::models::users::entities::User;
use crate::storage::Storage;

/// 从 app data 中取出共享的存储句柄
pub(crate) fn storage_from_request(request: &HttpRequest) -> Result<Arc<dyn Storage>> {
    request
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| GradebookError::database_config("Storage not found in app data"))
}

/// 评分、小组管理与成绩重算只允许讲师和管理员
pub(crate) fn ensure_staff(principal: &User) -> Result<()> {
    if principal.role.is_staff() {
        Ok(())
    } else {
        Err(GradebookError::authorization(
            "Only lecturers and admins can perform this action",
        ))
    }
}

pub(crate) async fn require_group(storage: &Arc<dyn Storage>, group_id: i64) -> Result<Group> {
    storage
        .get_group_by_id(group_id)
        .await?
        .ok_or_else(|| GradebookError::not_found("Group not found"))
}

pub(crate) async fn require_user(storage: &Arc<dyn Storage>, user_id: i64) -> Result<User> {
    storage
        .get_user_by_id(user_id)
        .await?
        .ok_or_else(|| GradebookError::not_found("User not found"))
}
