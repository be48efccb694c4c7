//! 任务存储操作

use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::task_assignees::{
    ActiveModel as AssigneeActiveModel, Column as AssigneeColumn, Entity as TaskAssignees,
};
use crate::entity::tasks::{ActiveModel, Column, Entity as Tasks};
use crate::errors::{GradebookError, Result};
use crate::models::tasks::{
    entities::{Task, TaskStatus},
    requests::CreateTaskRequest,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建任务并写入负责人
    pub async fn create_task_impl(
        &self,
        group_id: i64,
        created_by: i64,
        req: CreateTaskRequest,
    ) -> Result<Task> {
        let now = chrono::Utc::now().timestamp();

        let mut assignee_ids = req.assignee_ids;
        assignee_ids.sort_unstable();
        assignee_ids.dedup();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| GradebookError::database_operation(format!("开启事务失败: {e}")))?;

        let model = ActiveModel {
            group_id: Set(group_id),
            title: Set(req.title),
            description: Set(req.description),
            status: Set(TaskStatus::Done.to_string()),
            created_by: Set(created_by),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let task = model
            .insert(&txn)
            .await
            .map_err(|e| GradebookError::database_operation(format!("创建任务失败: {e}")))?;

        for user_id in &assignee_ids {
            AssigneeActiveModel {
                task_id: Set(task.id),
                user_id: Set(*user_id),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(|e| GradebookError::database_operation(format!("写入任务负责人失败: {e}")))?;
        }

        txn.commit()
            .await
            .map_err(|e| GradebookError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(task.into_task(assignee_ids))
    }

    /// 通过 ID 获取任务
    pub async fn get_task_by_id_impl(&self, task_id: i64) -> Result<Option<Task>> {
        let Some(task) = Tasks::find_by_id(task_id)
            .one(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询任务失败: {e}")))?
        else {
            return Ok(None);
        };

        let mut assignees = self.load_assignees(&[task.id]).await?;
        let ids = assignees.remove(&task.id).unwrap_or_default();
        Ok(Some(task.into_task(ids)))
    }

    /// 列出小组内的任务
    pub async fn list_tasks_by_group_impl(&self, group_id: i64) -> Result<Vec<Task>> {
        let tasks = Tasks::find()
            .filter(Column::GroupId.eq(group_id))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询任务列表失败: {e}")))?;

        let task_ids: Vec<i64> = tasks.iter().map(|t| t.id).collect();
        let mut assignees = self.load_assignees(&task_ids).await?;

        Ok(tasks
            .into_iter()
            .map(|t| {
                let ids = assignees.remove(&t.id).unwrap_or_default();
                t.into_task(ids)
            })
            .collect())
    }

    /// 更新任务状态
    pub async fn update_task_status_impl(&self, task_id: i64, status: TaskStatus) -> Result<bool> {
        self.update_task_status_on(&self.db, task_id, status).await
    }

    /// 在给定连接上更新任务状态，申诉事务内复用
    pub(crate) async fn update_task_status_on<C: ConnectionTrait>(
        &self,
        conn: &C,
        task_id: i64,
        status: TaskStatus,
    ) -> Result<bool> {
        let result = Tasks::update_many()
            .col_expr(
                Column::Status,
                sea_orm::sea_query::Expr::value(status.to_string()),
            )
            .col_expr(
                Column::UpdatedAt,
                sea_orm::sea_query::Expr::value(chrono::Utc::now().timestamp()),
            )
            .filter(Column::Id.eq(task_id))
            .exec(conn)
            .await
            .map_err(|e| GradebookError::database_operation(format!("更新任务状态失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 批量读取任务负责人
    async fn load_assignees(&self, task_ids: &[i64]) -> Result<HashMap<i64, Vec<i64>>> {
        if task_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = TaskAssignees::find()
            .filter(AssigneeColumn::TaskId.is_in(task_ids.iter().copied()))
            .order_by_asc(AssigneeColumn::UserId)
            .all(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询任务负责人失败: {e}")))?;

        let mut map: HashMap<i64, Vec<i64>> = HashMap::new();
        for row in rows {
            map.entry(row.task_id).or_default().push(row.user_id);
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use crate::models::tasks::entities::TaskStatus;
    use crate::models::users::entities::UserRole;
    use crate::storage::Storage;
    use crate::storage::testing::{memory_storage, seed_group, seed_task, seed_user};

    #[tokio::test]
    async fn test_create_task_keeps_assignees() {
        let storage = memory_storage().await;
        let lecturer = seed_user(&storage, "lect", UserRole::Lecturer).await;
        let a = seed_user(&storage, "a", UserRole::Student).await;
        let b = seed_user(&storage, "b", UserRole::Student).await;
        let group = seed_group(&storage, "Team", lecturer.id).await;

        let task = seed_task(&storage, group.id, lecturer.id, vec![b.id, a.id, b.id]).await;
        assert_eq!(task.assignee_ids, vec![a.id, b.id]);
        assert_eq!(task.status, TaskStatus::Done);

        let loaded = storage.get_task_by_id(task.id).await.unwrap().unwrap();
        assert_eq!(loaded.assignee_ids, vec![a.id, b.id]);
        assert!(loaded.is_assignee(a.id));
    }

    #[tokio::test]
    async fn test_update_status_and_list() {
        let storage = memory_storage().await;
        let lecturer = seed_user(&storage, "lect", UserRole::Lecturer).await;
        let group = seed_group(&storage, "Team", lecturer.id).await;
        let first = seed_task(&storage, group.id, lecturer.id, vec![]).await;
        seed_task(&storage, group.id, lecturer.id, vec![]).await;

        assert!(storage
            .update_task_status(first.id, TaskStatus::Graded)
            .await
            .unwrap());

        let tasks = storage.list_tasks_by_group(group.id).await.unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].status, TaskStatus::Graded);
        assert!(tasks[1].assignee_ids.is_empty());
    }
}
