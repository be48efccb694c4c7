use crate::cache::ObjectCache;
use crate::cache::object_cache::register_builtin_plugins;
use crate::cache::register::{create_object_cache, registered_plugin_names};
use crate::config::AppConfig;
use crate::errors::{GradebookError, Result};
use crate::models::users::entities::{UserProfile, UserRole};
use crate::models::users::requests::CreateUserRequest;
use crate::services::users::register_user;
use crate::storage::Storage;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
}

/// 生成随机密码
fn generate_random_password(length: usize) -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%";
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// 初始化默认管理员账号
/// 如果数据库中没有任何用户，则创建一个默认的 admin 账号
pub(crate) async fn seed_admin(storage: &Arc<dyn Storage>, config: &AppConfig) {
    match storage.count_users().await {
        Ok(count) if count > 0 => {
            debug!(
                "Database already has {} user(s), skipping admin seed",
                count
            );
            return;
        }
        Ok(_) => {
            info!("No users found in database, creating default admin account...");
        }
        Err(e) => {
            warn!("Failed to count users: {}, skipping admin seed", e);
            return;
        }
    }

    // 获取密码：优先从环境变量，否则生成随机密码
    let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| {
        let pwd = generate_random_password(16);
        warn!("==========================================================");
        warn!("  ADMIN PASSWORD NOT SET - USING GENERATED PASSWORD");
        warn!("  Generated admin password: {}", pwd);
        warn!("  Please save this password or set ADMIN_PASSWORD env var");
        warn!("==========================================================");
        pwd
    });

    let admin_request = CreateUserRequest {
        username: "admin".to_string(),
        email: "admin@localhost".to_string(),
        password,
        role: UserRole::Admin,
        profile: UserProfile {
            display_name: Some("Administrator".to_string()),
            avatar_url: None,
        },
    };

    match register_user(storage, admin_request, &config.argon2).await {
        Ok(user) => {
            info!(
                "Default admin account created successfully (ID: {}, username: {})",
                user.id, user.username
            );
        }
        Err(e) => {
            warn!("Failed to create admin account: {}", e);
        }
    }
}

/// 准备服务器启动的上下文：存储、默认管理员与缓存
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let config = AppConfig::get();

    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| GradebookError::database_config("Failed to install rustls crypto provider"))?;

    register_builtin_plugins();
    debug!("Cache backends registered: {:?}", registered_plugin_names());

    let storage = crate::storage::create_storage().await?;
    warn!("Storage backend initialized and migrations completed");

    seed_admin(&storage, config).await;

    let cache = create_object_cache(&config.cache.cache_type).await?;
    warn!("Cache backend initialized");

    Ok(StartupContext { storage, cache })
}
