use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use tracing::{error, info};

use super::UserService;
use crate::config::{AppConfig, Argon2Config};
use crate::errors::{GradebookError, Result};
use crate::models::{
    ApiResponse, ErrorCode,
    users::{entities::User, requests::CreateUserRequest, responses::UserResponse},
};
use crate::storage::Storage;
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_password, validate_username};

pub async fn create_user(
    service: &UserService,
    user_data: CreateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    // 验证用户名
    if let Err(msg) = validate_username(&user_data.username) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserNameInvalid, msg)));
    }

    // 验证邮箱
    if let Err(msg) = validate_email(&user_data.email) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserEmailInvalid, msg)));
    }

    if let Err(msg) = validate_password(&user_data.password) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserPasswordInvalid, msg)));
    }

    let storage = service.get_storage(request)?;

    match register_user(&storage, user_data, &AppConfig::get().argon2).await {
        Ok(user) => Ok(HttpResponse::Created()
            .json(ApiResponse::success(UserResponse { user }, "User created"))),
        Err(GradebookError::Conflict(msg)) => Ok(HttpResponse::Conflict()
            .json(ApiResponse::error_empty(ErrorCode::UserAlreadyExists, msg))),
        Err(e) => {
            error!("User creation failed: {}", e);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::UserCreationFailed,
                e.message(),
            )))
        }
    }
}

/// 检查用户名和邮箱未被占用，哈希密码后写入
///
/// `user_data.password` 为明文。启动时创建默认管理员也走这里。
pub async fn register_user(
    storage: &Arc<dyn Storage>,
    mut user_data: CreateUserRequest,
    argon2: &Argon2Config,
) -> Result<User> {
    for identifier in [&user_data.username, &user_data.email] {
        if storage
            .get_user_by_username_or_email(identifier)
            .await?
            .is_some()
        {
            return Err(GradebookError::conflict(
                "Username or email already exists",
            ));
        }
    }

    user_data.password = hash_password(&user_data.password, argon2)?;
    let user = storage.create_user(user_data).await?;
    info!("User '{}' created with role {}", user.username, user.role);
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::{UserProfile, UserRole};
    use crate::storage::testing::memory_storage;
    use crate::utils::password::verify_password;

    fn cheap_argon2() -> Argon2Config {
        Argon2Config {
            memory_cost: 1024,
            time_cost: 1,
            parallelism: 1,
        }
    }

    fn request(username: &str, email: &str) -> CreateUserRequest {
        CreateUserRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: "Sup3rSecret!".to_string(),
            role: UserRole::Student,
            profile: UserProfile::default(),
        }
    }

    #[tokio::test]
    async fn test_register_hashes_password() {
        let storage = memory_storage().await;
        let user = register_user(&storage, request("alice", "alice@example.com"), &cheap_argon2())
            .await
            .unwrap();

        assert_ne!(user.password_hash, "Sup3rSecret!");
        assert!(verify_password("Sup3rSecret!", &user.password_hash));
    }

    #[tokio::test]
    async fn test_register_rejects_taken_username_or_email() {
        let storage = memory_storage().await;
        register_user(&storage, request("alice", "alice@example.com"), &cheap_argon2())
            .await
            .unwrap();

        let same_name =
            register_user(&storage, request("alice", "other@example.com"), &cheap_argon2()).await;
        assert!(matches!(same_name, Err(GradebookError::Conflict(_))));

        let same_mail =
            register_user(&storage, request("bob", "alice@example.com"), &cheap_argon2()).await;
        assert!(matches!(same_mail, Err(GradebookError::Conflict(_))));
    }
}
