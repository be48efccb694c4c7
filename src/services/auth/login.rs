use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::{GradebookError, Result};
use crate::models::{
    ApiResponse, ErrorCode,
    auth::{LoginRequest, LoginResponse},
    users::entities::{User, UserStatus},
};
use crate::storage::Storage;
use crate::utils::jwt;
use crate::utils::password::verify_password;

use super::AuthService;

const BAD_CREDENTIALS: &str = "Username or password is incorrect";

/// 按用户名或邮箱查找用户并校验密码，只允许 active 用户登录
pub async fn authenticate_credentials(
    storage: &Arc<dyn Storage>,
    identifier: &str,
    password: &str,
) -> Result<User> {
    let user = storage
        .get_user_by_username_or_email(identifier)
        .await?
        .ok_or_else(|| GradebookError::authentication(BAD_CREDENTIALS))?;

    if !verify_password(password, &user.password_hash) {
        return Err(GradebookError::authentication(BAD_CREDENTIALS));
    }
    if user.status != UserStatus::Active {
        return Err(GradebookError::authorization("Account is not active"));
    }
    Ok(user)
}

pub async fn handle_login(
    service: &AuthService,
    login_request: LoginRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let config = service.get_config();

    let user = match authenticate_credentials(
        &storage,
        &login_request.username,
        &login_request.password,
    )
    .await
    {
        Ok(user) => user,
        Err(GradebookError::Authentication(msg)) => {
            tracing::info!("Failed login attempt for '{}'", login_request.username);
            return Ok(HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::AuthFailed, msg)));
        }
        Err(e) => return Err(e.into()),
    };

    if let Err(e) = storage.update_last_login(user.id).await {
        tracing::warn!("Failed to update last login for {}: {}", user.id, e);
    }

    let tokens = jwt::JwtUtils::generate_access_token(user.id, user.role).and_then(|access| {
        jwt::JwtUtils::generate_refresh_token(user.id, user.role, login_request.remember_me)
            .map(|refresh| (access, refresh))
    });

    match tokens {
        Ok((access_token, refresh_token)) => {
            tracing::info!("User {} logged in successfully", user.username);

            let response = LoginResponse {
                access_token,
                expires_in: config.jwt.access_token_expiry * 60,
                user,
            };
            let refresh_cookie = jwt::JwtUtils::create_refresh_token_cookie(
                &refresh_token,
                login_request.remember_me,
            );

            Ok(HttpResponse::Ok()
                .cookie(refresh_cookie)
                .json(ApiResponse::success(response, "Login successful")))
        }
        Err(e) => {
            tracing::error!("Failed to generate JWT token: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Login failed, unable to generate token",
                )),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Argon2Config;
    use crate::models::users::{
        entities::{UserProfile, UserRole},
        requests::CreateUserRequest,
    };
    use crate::services::users::register_user;
    use crate::storage::testing::memory_storage;

    async fn storage_with_alice() -> Arc<dyn Storage> {
        let storage = memory_storage().await;
        register_user(
            &storage,
            CreateUserRequest {
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                password: "Sup3rSecret!".to_string(),
                role: UserRole::Student,
                profile: UserProfile::default(),
            },
            &Argon2Config {
                memory_cost: 1024,
                time_cost: 1,
                parallelism: 1,
            },
        )
        .await
        .unwrap();
        storage
    }

    #[tokio::test]
    async fn test_login_by_username_or_email() {
        let storage = storage_with_alice().await;

        let by_name = authenticate_credentials(&storage, "alice", "Sup3rSecret!")
            .await
            .unwrap();
        let by_mail = authenticate_credentials(&storage, "alice@example.com", "Sup3rSecret!")
            .await
            .unwrap();
        assert_eq!(by_name.id, by_mail.id);
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user_look_alike() {
        let storage = storage_with_alice().await;

        let wrong = authenticate_credentials(&storage, "alice", "nope").await.unwrap_err();
        let unknown = authenticate_credentials(&storage, "mallory", "nope").await.unwrap_err();
        assert_eq!(wrong, unknown);
        assert!(matches!(wrong, GradebookError::Authentication(_)));
    }
}
