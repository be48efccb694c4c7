//! 配置管理
//!
//! 配置按以下顺序叠加：`config.toml` → `config.{APP_ENV}.toml` → `GRADEBOOK_*` 环境变量 → 常用环境变量覆盖。

mod r#impl;
mod structs;

pub use structs::*;
