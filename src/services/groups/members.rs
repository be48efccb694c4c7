use std::sync::Arc;

use tracing::info;

use crate::errors::{GradebookError, Result};
use crate::models::groups::entities::GroupMember;
use crate::models::users::entities::User;
use crate::services::{ensure_staff, require_group, require_user};
use crate::storage::Storage;

/// 将用户加入小组，已是成员时返回 Conflict
pub async fn add_group_member(
    storage: &Arc<dyn Storage>,
    principal: &User,
    group_id: i64,
    user_id: i64,
) -> Result<GroupMember> {
    ensure_staff(principal)?;
    require_group(storage, group_id).await?;
    require_user(storage, user_id).await?;

    let member = storage.add_group_member(group_id, user_id).await?;
    info!("User {} joined group {}", user_id, group_id);
    Ok(member)
}

pub async fn remove_group_member(
    storage: &Arc<dyn Storage>,
    principal: &User,
    group_id: i64,
    user_id: i64,
) -> Result<()> {
    ensure_staff(principal)?;
    require_group(storage, group_id).await?;

    if !storage.remove_group_member(group_id, user_id).await? {
        return Err(GradebookError::not_found(
            "User is not a member of this group",
        ));
    }
    info!("User {} removed from group {}", user_id, group_id);
    Ok(())
}
