pub mod moka;
pub mod redis;

use std::sync::Arc;

use crate::cache::ObjectCache;
use crate::cache::register::{BoxedObjectCacheFuture, register_object_cache_plugin};
use crate::config::AppConfig;

pub use self::moka::MokaObjectCache;
pub use self::redis::RedisObjectCache;

/// 注册内置的缓存后端，启动时调用一次
pub fn register_builtin_plugins() {
    register_object_cache_plugin(
        "moka",
        Arc::new(|| -> BoxedObjectCacheFuture {
            Box::pin(async {
                let cache = MokaObjectCache::from_config(&AppConfig::get().cache);
                Ok(Box::new(cache) as Box<dyn ObjectCache>)
            })
        }),
    );
    register_object_cache_plugin(
        "redis",
        Arc::new(|| -> BoxedObjectCacheFuture {
            Box::pin(async {
                let cache = RedisObjectCache::connect(&AppConfig::get().cache).await?;
                Ok(Box::new(cache) as Box<dyn ObjectCache>)
            })
        }),
    );
}
