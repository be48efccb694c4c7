//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod appeals;
mod evaluations;
mod groups;
mod points;
mod task_grades;
mod tasks;
mod users;

use crate::config::AppConfig;
use crate::errors::{GradebookError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        let storage = Self::from_connection(db).await?;
        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(storage)
    }

    /// 基于已有连接构建存储并运行迁移
    pub async fn from_connection(db: DatabaseConnection) -> Result<Self> {
        Migrator::up(&db, None)
            .await
            .map_err(|e| GradebookError::database_operation(format!("数据库迁移失败: {e}")))?;

        Ok(Self { db })
    }

    /// 单连接内存数据库，测试使用
    #[cfg(test)]
    pub(crate) async fn in_memory() -> Result<Self> {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1).min_connections(1).sqlx_logging(false);

        let db = Database::connect(opt)
            .await
            .map_err(|e| GradebookError::database_connection(format!("内存数据库连接失败: {e}")))?;

        Self::from_connection(db).await
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| GradebookError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .foreign_keys(true)
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| GradebookError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(2)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .sqlx_logging(false);

        Database::connect(opt)
            .await
            .map_err(|e| GradebookError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{url}?mode=rwc"))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
        {
            Ok(url.to_string())
        } else {
            Err(GradebookError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
use crate::models::{
    appeals::{
        entities::Appeal,
        requests::{AppealListQuery, ResolveAppealRequest},
        responses::AppealListResponse,
    },
    final_grades::entities::Evaluation,
    groups::{
        entities::{Group, GroupMember},
        requests::{CreateGroupRequest, GroupListQuery},
        responses::GroupListResponse,
    },
    points::{entities::PointEntry, requests::CreatePointEntryRequest},
    tasks::{
        entities::{Task, TaskGrade, TaskGradeInput, TaskStatus},
        requests::CreateTaskRequest,
    },
    users::{
        entities::{User, UserRole},
        requests::{CreateUserRequest, UserListQuery},
        responses::UserListResponse,
    },
};
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>> {
        self.get_user_by_username_or_email_impl(identifier).await
    }

    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse> {
        self.list_users_with_pagination_impl(query).await
    }

    async fn list_users_by_role(&self, role: UserRole) -> Result<Vec<User>> {
        self.list_users_by_role_impl(role).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    // 小组模块
    async fn create_group(&self, created_by: i64, req: CreateGroupRequest) -> Result<Group> {
        self.create_group_impl(created_by, req).await
    }

    async fn get_group_by_id(&self, group_id: i64) -> Result<Option<Group>> {
        self.get_group_by_id_impl(group_id).await
    }

    async fn list_groups_with_pagination(
        &self,
        query: GroupListQuery,
    ) -> Result<GroupListResponse> {
        self.list_groups_with_pagination_impl(query).await
    }

    async fn add_group_member(&self, group_id: i64, user_id: i64) -> Result<GroupMember> {
        self.add_group_member_impl(group_id, user_id).await
    }

    async fn remove_group_member(&self, group_id: i64, user_id: i64) -> Result<bool> {
        self.remove_group_member_impl(group_id, user_id).await
    }

    async fn get_group_member(&self, group_id: i64, user_id: i64) -> Result<Option<GroupMember>> {
        self.get_group_member_impl(group_id, user_id).await
    }

    async fn list_group_members(&self, group_id: i64) -> Result<Vec<GroupMember>> {
        self.list_group_members_impl(group_id).await
    }

    // 任务模块
    async fn create_task(
        &self,
        group_id: i64,
        created_by: i64,
        req: CreateTaskRequest,
    ) -> Result<Task> {
        self.create_task_impl(group_id, created_by, req).await
    }

    async fn get_task_by_id(&self, task_id: i64) -> Result<Option<Task>> {
        self.get_task_by_id_impl(task_id).await
    }

    async fn list_tasks_by_group(&self, group_id: i64) -> Result<Vec<Task>> {
        self.list_tasks_by_group_impl(group_id).await
    }

    async fn update_task_status(&self, task_id: i64, status: TaskStatus) -> Result<bool> {
        self.update_task_status_impl(task_id, status).await
    }

    // 评分模块
    async fn upsert_task_grade(&self, input: TaskGradeInput) -> Result<TaskGrade> {
        self.upsert_task_grade_impl(input).await
    }

    async fn get_task_grade(&self, task_id: i64, student_id: i64) -> Result<Option<TaskGrade>> {
        self.get_task_grade_impl(task_id, student_id).await
    }

    async fn list_task_grades(&self, task_id: i64) -> Result<Vec<TaskGrade>> {
        self.list_task_grades_impl(task_id).await
    }

    async fn list_student_grades_in_group(
        &self,
        student_id: i64,
        group_id: i64,
    ) -> Result<Vec<TaskGrade>> {
        self.list_student_grades_in_group_impl(&self.db, student_id, group_id)
            .await
    }

    async fn list_all_task_grades(&self) -> Result<Vec<TaskGrade>> {
        self.list_all_task_grades_impl().await
    }

    // 申诉模块
    async fn create_appeal(
        &self,
        task_id: i64,
        student_id: i64,
        reason: String,
    ) -> Result<Appeal> {
        self.create_appeal_impl(task_id, student_id, reason).await
    }

    async fn get_appeal_by_id(&self, appeal_id: i64) -> Result<Option<Appeal>> {
        self.get_appeal_by_id_impl(appeal_id).await
    }

    async fn count_pending_appeals_for_task(&self, task_id: i64) -> Result<u64> {
        self.count_pending_appeals_for_task_impl(task_id).await
    }

    async fn list_appeals_with_pagination(
        &self,
        query: AppealListQuery,
    ) -> Result<AppealListResponse> {
        self.list_appeals_with_pagination_impl(query).await
    }

    async fn resolve_appeal(
        &self,
        appeal_id: i64,
        resolver_id: i64,
        req: &ResolveAppealRequest,
        regrade: Option<TaskGradeInput>,
    ) -> Result<(Appeal, Option<TaskGrade>)> {
        self.resolve_appeal_impl(appeal_id, resolver_id, req, regrade)
            .await
    }

    // 期末评价模块
    async fn recalculate_evaluation(
        &self,
        group_id: i64,
        student_id: i64,
        feedback: Option<String>,
    ) -> Result<Evaluation> {
        self.recalculate_evaluation_impl(group_id, student_id, feedback)
            .await
    }

    async fn get_evaluation(&self, group_id: i64, student_id: i64) -> Result<Option<Evaluation>> {
        self.get_evaluation_impl(group_id, student_id).await
    }

    async fn list_evaluations(&self, group_id: Option<i64>) -> Result<Vec<Evaluation>> {
        self.list_evaluations_impl(group_id).await
    }

    // 积分模块
    async fn create_point_entry(
        &self,
        student_id: i64,
        awarded_by: i64,
        req: CreatePointEntryRequest,
    ) -> Result<PointEntry> {
        self.create_point_entry_impl(student_id, awarded_by, req)
            .await
    }

    async fn list_point_entries_by_student(&self, student_id: i64) -> Result<Vec<PointEntry>> {
        self.list_point_entries_by_student_impl(student_id).await
    }

    async fn list_all_point_entries(&self) -> Result<Vec<PointEntry>> {
        self.list_all_point_entries_impl().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_database_url() {
        assert_eq!(
            SeaOrmStorage::build_database_url("gradebook.db").unwrap(),
            "sqlite://gradebook.db?mode=rwc"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url("postgres://localhost/grades").unwrap(),
            "postgres://localhost/grades"
        );
        assert!(SeaOrmStorage::build_database_url("ftp://nope").is_err());
    }
}
