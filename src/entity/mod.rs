//! SeaORM 实体定义
//!
//! 这些实体用于数据库操作，与 models 模块中的业务实体分离。
//! Storage 层使用这些实体进行 CRUD 操作，然后转换为 models 中的业务实体。

pub mod prelude;

pub mod evaluations;
pub mod group_members;
pub mod groups;
pub mod point_entries;
pub mod task_appeals;
pub mod task_assignees;
pub mod task_grades;
pub mod tasks;
pub mod users;

use chrono::{DateTime, Utc};

/// Unix 秒时间戳转换为 UTC 时间
pub(crate) fn to_datetime(ts: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()
}
