use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Largest accepted upload request body.
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Routes mounted at `/admin`. All require the admin role.
///
/// ```text
/// GET  PUT        /hero                        -> get_hero, save_hero
/// POST            /hero/image                  -> replace_hero_image
/// GET             /about                       -> list_about
/// PUT             /about/{id}                  -> update_about
/// GET  POST       /services                    -> list_services, create_service
/// PUT  DELETE     /services/{id}               -> update_service, delete_service
/// GET  POST       /service-details             -> list_service_details, create_service_detail
/// PUT             /service-details/{id}        -> update_service_detail
/// GET  PUT        /contact                     -> get_contact, save_contact
/// GET  POST       /galleries/{gallery}         -> list_gallery, upload_gallery
/// DELETE          /galleries/{gallery}/{name}  -> delete_gallery_image
/// POST            /uploads/{bucket}            -> upload_image
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/hero", get(admin::get_hero).put(admin::save_hero))
        .route("/hero/image", post(admin::replace_hero_image))
        .route("/about", get(admin::list_about))
        .route("/about/{id}", put(admin::update_about))
        .route(
            "/services",
            get(admin::list_services).post(admin::create_service),
        )
        .route(
            "/services/{id}",
            put(admin::update_service).delete(admin::delete_service),
        )
        .route(
            "/service-details",
            get(admin::list_service_details).post(admin::create_service_detail),
        )
        .route(
            "/service-details/{id}",
            put(admin::update_service_detail),
        )
        .route("/contact", get(admin::get_contact).put(admin::save_contact))
        .route(
            "/galleries/{gallery}",
            get(admin::list_gallery).post(admin::upload_gallery),
        )
        .route(
            "/galleries/{gallery}/{name}",
            delete(admin::delete_gallery_image),
        )
        .route("/uploads/{bucket}", post(admin::upload_image))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}
