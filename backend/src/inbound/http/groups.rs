//! Group catalogue handler.

use actix_web::{HttpResponse, web};

use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{GroupView, GroupsResponse};
use crate::inbound::http::state::HttpState;

/// Every group, ordered by title.
#[utoipa::path(
    get,
    path = "/api/v1/groups",
    responses((status = 200, description = "Known groups", body = GroupsResponse)),
    tags = ["groups"],
    operation_id = "listGroups"
)]
pub async fn list(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let groups = state.feeds.groups().await?;
    Ok(HttpResponse::Ok().json(GroupsResponse {
        groups: groups.iter().map(GroupView::from).collect(),
    }))
}
