//! 小组与成员存储操作

use super::SeaOrmStorage;
use crate::entity::group_members::{
    ActiveModel as MemberActiveModel, Column as MemberColumn, Entity as GroupMembers,
};
use crate::entity::groups::{ActiveModel, Column, Entity as Groups};
use crate::errors::{GradebookError, Result};
use crate::models::{
    PaginationInfo,
    groups::{
        entities::{Group, GroupMember},
        requests::{CreateGroupRequest, GroupListQuery},
        responses::GroupListResponse,
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    /// 创建小组
    pub async fn create_group_impl(
        &self,
        created_by: i64,
        req: CreateGroupRequest,
    ) -> Result<Group> {
        let exists = Groups::find()
            .filter(Column::Name.eq(&req.name))
            .one(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询小组失败: {e}")))?;
        if exists.is_some() {
            return Err(GradebookError::conflict(format!(
                "Group '{}' already exists",
                req.name
            )));
        }

        let now = chrono::Utc::now().timestamp();
        let model = ActiveModel {
            name: Set(req.name),
            description: Set(req.description),
            created_by: Set(created_by),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("创建小组失败: {e}")))?;

        Ok(result.into_group())
    }

    /// 通过 ID 获取小组
    pub async fn get_group_by_id_impl(&self, group_id: i64) -> Result<Option<Group>> {
        let result = Groups::find_by_id(group_id)
            .one(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询小组失败: {e}")))?;

        Ok(result.map(|m| m.into_group()))
    }

    /// 分页列出小组
    pub async fn list_groups_with_pagination_impl(
        &self,
        query: GroupListQuery,
    ) -> Result<GroupListResponse> {
        let page = query.page.max(1);
        let size = query.size.max(1);

        let mut select = Groups::find();
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            select = select.filter(Column::Name.contains(escape_like_pattern(search.trim())));
        }

        let paginator = select.order_by_asc(Column::Id).paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询小组总数失败: {e}")))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询小组页数失败: {e}")))?;
        let groups = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询小组列表失败: {e}")))?;

        Ok(GroupListResponse {
            items: groups.into_iter().map(|m| m.into_group()).collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    /// 添加小组成员
    pub async fn add_group_member_impl(&self, group_id: i64, user_id: i64) -> Result<GroupMember> {
        if self.get_group_member_impl(group_id, user_id).await?.is_some() {
            return Err(GradebookError::conflict(
                "User is already a member of this group",
            ));
        }

        let model = MemberActiveModel {
            group_id: Set(group_id),
            user_id: Set(user_id),
            joined_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("添加小组成员失败: {e}")))?;

        Ok(result.into_group_member())
    }

    /// 移除小组成员
    pub async fn remove_group_member_impl(&self, group_id: i64, user_id: i64) -> Result<bool> {
        let result = GroupMembers::delete_many()
            .filter(MemberColumn::GroupId.eq(group_id))
            .filter(MemberColumn::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("移除小组成员失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 查询成员关系
    pub async fn get_group_member_impl(
        &self,
        group_id: i64,
        user_id: i64,
    ) -> Result<Option<GroupMember>> {
        let result = GroupMembers::find()
            .filter(MemberColumn::GroupId.eq(group_id))
            .filter(MemberColumn::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询小组成员失败: {e}")))?;

        Ok(result.map(|m| m.into_group_member()))
    }

    /// 列出小组全部成员，按用户 ID 升序
    pub async fn list_group_members_impl(&self, group_id: i64) -> Result<Vec<GroupMember>> {
        let members = GroupMembers::find()
            .filter(MemberColumn::GroupId.eq(group_id))
            .order_by_asc(MemberColumn::UserId)
            .all(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询小组成员失败: {e}")))?;

        Ok(members.into_iter().map(|m| m.into_group_member()).collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::GradebookError;
    use crate::models::users::entities::UserRole;
    use crate::storage::Storage;
    use crate::storage::testing::{memory_storage, seed_group, seed_user};

    #[tokio::test]
    async fn test_membership_lifecycle() {
        let storage = memory_storage().await;
        let lecturer = seed_user(&storage, "lect", UserRole::Lecturer).await;
        let student = seed_user(&storage, "stud", UserRole::Student).await;
        let group = seed_group(&storage, "Team A", lecturer.id).await;

        storage.add_group_member(group.id, student.id).await.unwrap();
        let duplicate = storage.add_group_member(group.id, student.id).await;
        assert!(matches!(duplicate, Err(GradebookError::Conflict(_))));

        let members = storage.list_group_members(group.id).await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].user_id, student.id);

        assert!(storage.remove_group_member(group.id, student.id).await.unwrap());
        assert!(storage
            .get_group_member(group.id, student.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_group_name_conflicts() {
        let storage = memory_storage().await;
        let lecturer = seed_user(&storage, "lect", UserRole::Lecturer).await;
        seed_group(&storage, "Team A", lecturer.id).await;

        let result = storage
            .create_group(
                lecturer.id,
                crate::models::groups::requests::CreateGroupRequest {
                    name: "Team A".to_string(),
                    description: None,
                },
            )
            .await;
        assert!(matches!(result, Err(GradebookError::Conflict(_))));
    }
}
