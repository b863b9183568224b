use crate::api;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::products::list_products,
        api::products::create_product,
        api::inventory::list_inventory,
        api::orders::create_order,
    ),
    tags(
        (name = "bookswap", description = "BookSwap marketplace API")
    )
)]
pub struct ApiDoc;
