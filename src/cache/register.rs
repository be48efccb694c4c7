use crate::cache::ObjectCache;
use crate::errors::{GradebookError, Result};
use once_cell::sync::Lazy;
use std::{
    collections::HashMap,
    future::Future,
    pin::Pin,
    sync::{Arc, RwLock},
};

pub type BoxedObjectCacheFuture =
    Pin<Box<dyn Future<Output = Result<Box<dyn ObjectCache>>> + Send>>;
pub type ObjectCacheConstructor = Arc<dyn Fn() -> BoxedObjectCacheFuture + Send + Sync>;

static OBJECT_CACHE_REGISTRY: Lazy<RwLock<HashMap<String, ObjectCacheConstructor>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

pub fn register_object_cache_plugin<S: Into<String>>(name: S, constructor: ObjectCacheConstructor) {
    // 锁中毒时仍沿用内部数据，注册表只会被整体插入
    let mut registry = OBJECT_CACHE_REGISTRY
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    registry.insert(name.into(), constructor);
}

pub fn get_object_cache_plugin(name: &str) -> Option<ObjectCacheConstructor> {
    OBJECT_CACHE_REGISTRY
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .get(name)
        .cloned()
}

pub fn registered_plugin_names() -> Vec<String> {
    let mut names: Vec<String> = OBJECT_CACHE_REGISTRY
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .keys()
        .cloned()
        .collect();
    names.sort();
    names
}

/// 按名称构建缓存后端；构建失败且名称不是 `moka` 时回退到内存缓存
pub async fn create_object_cache(name: &str) -> Result<Arc<dyn ObjectCache>> {
    let primary = match get_object_cache_plugin(name) {
        Some(constructor) => constructor().await,
        None => Err(GradebookError::cache_plugin_not_found(format!(
            "Cache backend '{name}' is not registered"
        ))),
    };

    match primary {
        Ok(cache) => Ok(Arc::from(cache)),
        Err(err) if name != "moka" => {
            tracing::warn!("{}; falling back to moka cache", err);
            let constructor = get_object_cache_plugin("moka").ok_or_else(|| {
                GradebookError::cache_plugin_not_found("Fallback cache 'moka' is not registered")
            })?;
            Ok(Arc::from(constructor().await?))
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::object_cache::register_builtin_plugins;

    #[test]
    fn test_builtin_plugins_registered() {
        register_builtin_plugins();
        let names = registered_plugin_names();
        assert!(names.contains(&"moka".to_string()));
        assert!(names.contains(&"redis".to_string()));
    }

    #[test]
    fn test_unknown_plugin_missing() {
        assert!(get_object_cache_plugin("memcached").is_none());
    }
}
