//! 评分申诉存储操作
//!
//! 待处理申诉由 `pending_slot` 列上的唯一索引约束：每个 (任务, 学生) 至多一条。

use super::SeaOrmStorage;
use crate::entity::task_appeals::{ActiveModel, Column, Entity as TaskAppeals};
use crate::errors::{GradebookError, Result};
use crate::models::{
    PaginationInfo,
    appeals::{
        entities::{Appeal, AppealStatus},
        requests::{AppealListQuery, ResolveAppealRequest},
        responses::AppealListResponse,
    },
    tasks::entities::{TaskGrade, TaskGradeInput, TaskStatus},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};

const PENDING_SLOT: i32 = 1;

fn duplicate_pending(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

impl SeaOrmStorage {
    /// 创建申诉并将任务置为申诉中
    pub async fn create_appeal_impl(
        &self,
        task_id: i64,
        student_id: i64,
        reason: String,
    ) -> Result<Appeal> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| GradebookError::database_operation(format!("开启事务失败: {e}")))?;

        if Self::pending_appeal_on(&txn, task_id, student_id)
            .await?
            .is_some()
        {
            return Err(GradebookError::conflict(
                "You already have a pending appeal on this task",
            ));
        }

        let model = ActiveModel {
            task_id: Set(task_id),
            student_id: Set(student_id),
            reason: Set(reason),
            status: Set(AppealStatus::Pending.to_string()),
            created_at: Set(chrono::Utc::now().timestamp()),
            pending_slot: Set(Some(PENDING_SLOT)),
            ..Default::default()
        };

        let result = model.insert(&txn).await.map_err(|e| {
            if duplicate_pending(&e) {
                GradebookError::conflict("You already have a pending appeal on this task")
            } else {
                GradebookError::database_operation(format!("创建申诉失败: {e}"))
            }
        })?;

        self.update_task_status_on(&txn, task_id, TaskStatus::Appeal)
            .await?;

        txn.commit()
            .await
            .map_err(|e| GradebookError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(result.into_appeal())
    }

    /// 通过 ID 获取申诉
    pub async fn get_appeal_by_id_impl(&self, appeal_id: i64) -> Result<Option<Appeal>> {
        let result = TaskAppeals::find_by_id(appeal_id)
            .one(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询申诉失败: {e}")))?;

        Ok(result.map(|m| m.into_appeal()))
    }

    /// 学生在某任务上尚未处理的申诉
    async fn pending_appeal_on<C: ConnectionTrait>(
        conn: &C,
        task_id: i64,
        student_id: i64,
    ) -> Result<Option<Appeal>> {
        let result = TaskAppeals::find()
            .filter(Column::TaskId.eq(task_id))
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::Status.eq(AppealStatus::Pending.to_string()))
            .one(conn)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询申诉失败: {e}")))?;

        Ok(result.map(|m| m.into_appeal()))
    }

    /// 任务上未处理的申诉数量
    pub async fn count_pending_appeals_for_task_impl(&self, task_id: i64) -> Result<u64> {
        Self::count_pending_on(&self.db, task_id).await
    }

    async fn count_pending_on<C: ConnectionTrait>(conn: &C, task_id: i64) -> Result<u64> {
        TaskAppeals::find()
            .filter(Column::TaskId.eq(task_id))
            .filter(Column::Status.eq(AppealStatus::Pending.to_string()))
            .count(conn)
            .await
            .map_err(|e| GradebookError::database_operation(format!("统计申诉失败: {e}")))
    }

    /// 分页列出申诉，最新的在前
    pub async fn list_appeals_with_pagination_impl(
        &self,
        query: AppealListQuery,
    ) -> Result<AppealListResponse> {
        let page = query.page.max(1);
        let size = query.size.max(1);

        let mut select = TaskAppeals::find();
        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }
        if let Some(task_id) = query.task_id {
            select = select.filter(Column::TaskId.eq(task_id));
        }

        let paginator = select.order_by_desc(Column::Id).paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询申诉总数失败: {e}")))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询申诉页数失败: {e}")))?;
        let appeals = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询申诉列表失败: {e}")))?;

        Ok(AppealListResponse {
            items: appeals.into_iter().map(|m| m.into_appeal()).collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    /// 处理申诉
    ///
    /// 状态更新带 `status = pending` 条件，并发处理同一申诉时只有一方生效，
    /// 另一方得到 Conflict 且其改分随事务回滚。任务上不再有待处理申诉时回到已评分。
    pub async fn resolve_appeal_impl(
        &self,
        appeal_id: i64,
        resolver_id: i64,
        req: &ResolveAppealRequest,
        regrade: Option<TaskGradeInput>,
    ) -> Result<(Appeal, Option<TaskGrade>)> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| GradebookError::database_operation(format!("开启事务失败: {e}")))?;

        let Some(current) = TaskAppeals::find_by_id(appeal_id)
            .one(&txn)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询申诉失败: {e}")))?
        else {
            return Err(GradebookError::not_found("Appeal not found"));
        };

        let status = if req.accept {
            AppealStatus::Accepted
        } else {
            AppealStatus::Rejected
        };

        let updated = TaskAppeals::update_many()
            .set(ActiveModel {
                status: Set(status.to_string()),
                resolution: Set(req.resolution.clone()),
                resolved_by: Set(Some(resolver_id)),
                resolved_at: Set(Some(chrono::Utc::now().timestamp())),
                pending_slot: Set(None),
                ..Default::default()
            })
            .filter(Column::Id.eq(appeal_id))
            .filter(Column::Status.eq(AppealStatus::Pending.to_string()))
            .exec(&txn)
            .await
            .map_err(|e| GradebookError::database_operation(format!("处理申诉失败: {e}")))?;
        if updated.rows_affected != 1 {
            return Err(GradebookError::conflict("Appeal has already been resolved"));
        }

        let grade = match regrade {
            Some(input) => Some(self.upsert_task_grade_on(&txn, input).await?),
            None => None,
        };

        if Self::count_pending_on(&txn, current.task_id).await? == 0 {
            self.update_task_status_on(&txn, current.task_id, TaskStatus::Graded)
                .await?;
        }

        let resolved = TaskAppeals::find_by_id(appeal_id)
            .one(&txn)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询申诉失败: {e}")))?
            .ok_or_else(|| GradebookError::not_found("Appeal not found"))?;

        txn.commit()
            .await
            .map_err(|e| GradebookError::database_operation(format!("提交事务失败: {e}")))?;

        Ok((resolved.into_appeal(), grade))
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::GradebookError;
    use crate::models::appeals::{entities::AppealStatus, requests::ResolveAppealRequest};
    use crate::models::tasks::entities::TaskStatus;
    use crate::models::users::entities::UserRole;
    use crate::storage::Storage;
    use crate::storage::testing::{memory_storage, seed_group, seed_task, seed_user};

    fn rejection() -> ResolveAppealRequest {
        ResolveAppealRequest {
            accept: false,
            new_points: None,
            resolution: Some("Grade stands".to_string()),
        }
    }

    #[tokio::test]
    async fn test_pending_appeal_lifecycle() {
        let storage = memory_storage().await;
        let lecturer = seed_user(&storage, "lect", UserRole::Lecturer).await;
        let student = seed_user(&storage, "stud", UserRole::Student).await;
        let group = seed_group(&storage, "Team", lecturer.id).await;
        let task = seed_task(&storage, group.id, lecturer.id, vec![student.id]).await;

        let appeal = storage
            .create_appeal(task.id, student.id, "Missed my commits".to_string())
            .await
            .unwrap();
        assert_eq!(appeal.status, AppealStatus::Pending);
        assert_eq!(storage.count_pending_appeals_for_task(task.id).await.unwrap(), 1);
        let stored = storage.get_task_by_id(task.id).await.unwrap().unwrap();
        assert_eq!(stored.status, TaskStatus::Appeal);

        let (resolved, grade) = storage
            .resolve_appeal(appeal.id, lecturer.id, &rejection(), None)
            .await
            .unwrap();
        assert_eq!(resolved.status, AppealStatus::Rejected);
        assert_eq!(resolved.resolved_by, Some(lecturer.id));
        assert!(grade.is_none());
        assert_eq!(storage.count_pending_appeals_for_task(task.id).await.unwrap(), 0);
        let stored = storage.get_task_by_id(task.id).await.unwrap().unwrap();
        assert_eq!(stored.status, TaskStatus::Graded);

        // 已处理的申诉不占用名额，可再次申诉
        let second = storage
            .create_appeal(task.id, student.id, "New evidence".to_string())
            .await
            .unwrap();
        assert_eq!(second.status, AppealStatus::Pending);
    }

    #[tokio::test]
    async fn test_second_pending_appeal_conflicts() {
        let storage = memory_storage().await;
        let lecturer = seed_user(&storage, "lect", UserRole::Lecturer).await;
        let student = seed_user(&storage, "stud", UserRole::Student).await;
        let group = seed_group(&storage, "Team", lecturer.id).await;
        let task = seed_task(&storage, group.id, lecturer.id, vec![student.id]).await;

        storage
            .create_appeal(task.id, student.id, "one".to_string())
            .await
            .unwrap();
        let again = storage
            .create_appeal(task.id, student.id, "two".to_string())
            .await;
        assert!(matches!(again, Err(GradebookError::Conflict(_))));
        assert_eq!(storage.count_pending_appeals_for_task(task.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_resolve_twice_conflicts() {
        let storage = memory_storage().await;
        let lecturer = seed_user(&storage, "lect", UserRole::Lecturer).await;
        let student = seed_user(&storage, "stud", UserRole::Student).await;
        let group = seed_group(&storage, "Team", lecturer.id).await;
        let task = seed_task(&storage, group.id, lecturer.id, vec![student.id]).await;
        let appeal = storage
            .create_appeal(task.id, student.id, "Recount".to_string())
            .await
            .unwrap();

        storage
            .resolve_appeal(appeal.id, lecturer.id, &rejection(), None)
            .await
            .unwrap();
        let again = storage
            .resolve_appeal(appeal.id, lecturer.id, &rejection(), None)
            .await;
        assert!(matches!(again, Err(GradebookError::Conflict(_))));

        let missing = storage
            .resolve_appeal(999, lecturer.id, &rejection(), None)
            .await;
        assert!(matches!(missing, Err(GradebookError::NotFound(_))));
    }
}
