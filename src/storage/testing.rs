//! 测试用的存储构造与数据准备

use std::sync::Arc;

use super::Storage;
use super::sea_orm_storage::SeaOrmStorage;
use crate::models::groups::{entities::Group, requests::CreateGroupRequest};
use crate::models::tasks::{
    entities::{Task, TaskGrade, TaskGradeInput},
    requests::CreateTaskRequest,
};
use crate::models::users::{
    entities::{User, UserProfile, UserRole},
    requests::CreateUserRequest,
};

/// 已迁移的内存 SQLite 存储
pub(crate) async fn memory_storage() -> Arc<dyn Storage> {
    Arc::new(
        SeaOrmStorage::in_memory()
            .await
            .expect("in-memory storage should initialize"),
    )
}

pub(crate) async fn seed_user(storage: &Arc<dyn Storage>, username: &str, role: UserRole) -> User {
    storage
        .create_user(CreateUserRequest {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: "not-a-real-hash".to_string(),
            role,
            profile: UserProfile {
                display_name: Some(username.to_uppercase()),
                avatar_url: None,
            },
        })
        .await
        .expect("seed user")
}

pub(crate) async fn seed_group(storage: &Arc<dyn Storage>, name: &str, created_by: i64) -> Group {
    storage
        .create_group(
            created_by,
            CreateGroupRequest {
                name: name.to_string(),
                description: None,
            },
        )
        .await
        .expect("seed group")
}

pub(crate) async fn seed_task(
    storage: &Arc<dyn Storage>,
    group_id: i64,
    created_by: i64,
    assignee_ids: Vec<i64>,
) -> Task {
    storage
        .create_task(
            group_id,
            created_by,
            CreateTaskRequest {
                title: "Build the thing".to_string(),
                description: None,
                assignee_ids,
            },
        )
        .await
        .expect("seed task")
}

pub(crate) async fn grade(
    storage: &Arc<dyn Storage>,
    task_id: i64,
    student_id: i64,
    grader_id: i64,
    points: f64,
) -> TaskGrade {
    storage
        .upsert_task_grade(TaskGradeInput {
            task_id,
            student_id,
            grader_id,
            points,
            feedback: None,
        })
        .await
        .expect("seed grade")
}
