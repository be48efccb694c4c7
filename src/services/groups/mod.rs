pub mod create;
pub mod members;

pub use create::create_group;
pub use members::{add_group_member, remove_group_member};

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::Result;
use crate::models::ApiResponse;
use crate::models::groups::{
    requests::{AddGroupMemberRequest, CreateGroupRequest, GroupListParams},
    responses::{GroupDetailResponse, GroupMemberListResponse},
};
use crate::models::users::entities::User;
use crate::storage::Storage;

pub struct GroupService {
    storage: Option<Arc<dyn Storage>>,
}

impl GroupService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Result<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn list_groups(
        &self,
        request: &HttpRequest,
        params: GroupListParams,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;
        let groups = storage.list_groups_with_pagination(params.into()).await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success(groups, "Groups retrieved")))
    }

    pub async fn create_group(
        &self,
        request: &HttpRequest,
        principal: &User,
        body: CreateGroupRequest,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;
        let group = create_group(&storage, principal, body).await?;
        Ok(HttpResponse::Created().json(ApiResponse::success(group, "Group created")))
    }

    pub async fn get_group(
        &self,
        request: &HttpRequest,
        group_id: i64,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;
        let group = super::require_group(&storage, group_id).await?;
        let members = storage.list_group_members(group_id).await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success(
            GroupDetailResponse { group, members },
            "Group retrieved",
        )))
    }

    pub async fn list_members(
        &self,
        request: &HttpRequest,
        group_id: i64,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;
        super::require_group(&storage, group_id).await?;
        let items = storage.list_group_members(group_id).await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success(
            GroupMemberListResponse { items },
            "Group members retrieved",
        )))
    }

    pub async fn add_member(
        &self,
        request: &HttpRequest,
        principal: &User,
        group_id: i64,
        body: AddGroupMemberRequest,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;
        let member = add_group_member(&storage, principal, group_id, body.user_id).await?;
        Ok(HttpResponse::Created().json(ApiResponse::success(member, "Member added")))
    }

    pub async fn remove_member(
        &self,
        request: &HttpRequest,
        principal: &User,
        group_id: i64,
        user_id: i64,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;
        remove_group_member(&storage, principal, group_id, user_id).await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Member removed")))
    }
}
