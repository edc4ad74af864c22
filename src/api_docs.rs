use crate::api;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::auth::login,
        api::assets::list_assets,
        api::assets::create_asset,
        api::assets::update_asset,
        api::assets::delete_asset,
        api::checkouts::list_checkouts,
        api::checkouts::create_checkout,
        api::checkouts::return_checkout,
        // Add other endpoints here as we document them
    ),
    tags(
        (name = "assetdesk", description = "assetdesk asset and inventory API")
    )
)]
pub struct ApiDoc;
