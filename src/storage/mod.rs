use std::sync::Arc;

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

use crate::errors::Result;

pub mod sea_orm_storage;

#[cfg(test)]
pub(crate) mod testing;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户（password 字段需已是哈希值）
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过用户名或邮箱获取用户信息
    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>>;
    // 列出用户
    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse>;
    // 按角色列出全部用户
    async fn list_users_by_role(&self, role: UserRole) -> Result<Vec<User>>;
    // 用户总数
    async fn count_users(&self) -> Result<u64>;
    // 更新用户最后登录时间
    async fn update_last_login(&self, id: i64) -> Result<bool>;

    /// 小组管理方法
    async fn create_group(&self, created_by: i64, req: CreateGroupRequest) -> Result<Group>;
    async fn get_group_by_id(&self, group_id: i64) -> Result<Option<Group>>;
    async fn list_groups_with_pagination(&self, query: GroupListQuery)
    -> Result<GroupListResponse>;
    // 添加成员，已是成员时返回 Conflict
    async fn add_group_member(&self, group_id: i64, user_id: i64) -> Result<GroupMember>;
    async fn remove_group_member(&self, group_id: i64, user_id: i64) -> Result<bool>;
    async fn get_group_member(&self, group_id: i64, user_id: i64) -> Result<Option<GroupMember>>;
    async fn list_group_members(&self, group_id: i64) -> Result<Vec<GroupMember>>;

    /// 任务管理方法
    async fn create_task(
        &self,
        group_id: i64,
        created_by: i64,
        req: CreateTaskRequest,
    ) -> Result<Task>;
    async fn get_task_by_id(&self, task_id: i64) -> Result<Option<Task>>;
    async fn list_tasks_by_group(&self, group_id: i64) -> Result<Vec<Task>>;
    async fn update_task_status(&self, task_id: i64, status: TaskStatus) -> Result<bool>;

    /// 任务评分方法
    // 按 (任务, 学生) 写入或覆盖评分
    async fn upsert_task_grade(&self, input: TaskGradeInput) -> Result<TaskGrade>;
    async fn get_task_grade(&self, task_id: i64, student_id: i64) -> Result<Option<TaskGrade>>;
    async fn list_task_grades(&self, task_id: i64) -> Result<Vec<TaskGrade>>;
    // 学生在某小组所有任务上的评分
    async fn list_student_grades_in_group(
        &self,
        student_id: i64,
        group_id: i64,
    ) -> Result<Vec<TaskGrade>>;
    async fn list_all_task_grades(&self) -> Result<Vec<TaskGrade>>;

    /// 申诉方法
    // 同一 (任务, 学生) 已有待处理申诉时返回 Conflict；成功后任务进入申诉状态
    async fn create_appeal(&self, task_id: i64, student_id: i64, reason: String)
    -> Result<Appeal>;
    async fn get_appeal_by_id(&self, appeal_id: i64) -> Result<Option<Appeal>>;
    async fn count_pending_appeals_for_task(&self, task_id: i64) -> Result<u64>;
    async fn list_appeals_with_pagination(
        &self,
        query: AppealListQuery,
    ) -> Result<AppealListResponse>;
    // 仅处理仍为待定的申诉，改分与状态变更在同一事务内完成
    async fn resolve_appeal(
        &self,
        appeal_id: i64,
        resolver_id: i64,
        req: &ResolveAppealRequest,
        regrade: Option<TaskGradeInput>,
    ) -> Result<(Appeal, Option<TaskGrade>)>;

    /// 期末评价快照方法
    // 在单个事务内重新汇总并写入快照
    async fn recalculate_evaluation(
        &self,
        group_id: i64,
        student_id: i64,
        feedback: Option<String>,
    ) -> Result<Evaluation>;
    async fn get_evaluation(&self, group_id: i64, student_id: i64) -> Result<Option<Evaluation>>;
    async fn list_evaluations(&self, group_id: Option<i64>) -> Result<Vec<Evaluation>>;

    /// 基础积分方法
    async fn create_point_entry(
        &self,
        student_id: i64,
        awarded_by: i64,
        req: CreatePointEntryRequest,
    ) -> Result<PointEntry>;
    async fn list_point_entries_by_student(&self, student_id: i64) -> Result<Vec<PointEntry>>;
    async fn list_all_point_entries(&self) -> Result<Vec<PointEntry>>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
