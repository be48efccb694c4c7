use std::sync::Arc;

use tracing::info;

use crate::errors::{GradebookError, Result};
use crate::models::groups::{entities::Group, requests::CreateGroupRequest};
use crate::models::users::entities::User;
use crate::services::ensure_staff;
use crate::storage::Storage;

pub async fn create_group(
    storage: &Arc<dyn Storage>,
    principal: &User,
    mut req: CreateGroupRequest,
) -> Result<Group> {
    ensure_staff(principal)?;

    req.name = req.name.trim().to_string();
    if req.name.is_empty() {
        return Err(GradebookError::validation("Group name must not be empty"));
    }

    let group = storage.create_group(principal.id, req).await?;
    info!("Group '{}' ({}) created by {}", group.name, group.id, principal.id);
    Ok(group)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::storage::testing::{memory_storage, seed_user};

    fn named(name: &str) -> CreateGroupRequest {
        CreateGroupRequest {
            name: name.to_string(),
            description: Some("Final project".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_and_duplicate() {
        let storage = memory_storage().await;
        let lecturer = seed_user(&storage, "lect", UserRole::Lecturer).await;

        let group = create_group(&storage, &lecturer, named(" Team Rocket ")).await.unwrap();
        assert_eq!(group.name, "Team Rocket");
        assert_eq!(group.created_by, lecturer.id);

        let dup = create_group(&storage, &lecturer, named("Team Rocket")).await;
        assert!(matches!(dup, Err(GradebookError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_student_and_blank_name_rejected() {
        let storage = memory_storage().await;
        let lecturer = seed_user(&storage, "lect", UserRole::Lecturer).await;
        let x = seed_user(&storage, "x", UserRole::Student).await;

        let denied = create_group(&storage, &x, named("Mine")).await;
        assert!(matches!(denied, Err(GradebookError::Authorization(_))));

        let blank = create_group(&storage, &lecturer, named("  ")).await;
        assert!(matches!(blank, Err(GradebookError::Validation(_))));
    }
}
