//! OpenAPI configuration.

use crate::feature::{
    info::info_api,
    item::{item_api, item_repository},
};
use utoipa::OpenApi;

/// OpenApi configuration.
#[derive(OpenApi)]
#[openapi(
    paths(
        info_api::info,
        item_api::list_items,
        item_api::create_item,
    ),
    components(
        schemas(
            info_api::AppInfo,
            item_repository::NewItem,
            item_repository::Item,
            crate::infra::error::ErrorBody
        )
    )
)]
#[derive(Clone, Copy, Debug)]
pub struct ApiDoc;
