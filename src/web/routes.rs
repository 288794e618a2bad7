use actix_web::http::Method;
use actix_web::web;

use crate::web::{cors, handlers};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(handlers::json_error_handler))
        .service(
            web::scope("/api").wrap(cors::permissive()).service(
                web::resource("/chat")
                    .route(web::post().to(handlers::chat))
                    .route(web::get().to(handlers::chat_info))
                    .route(web::method(Method::OPTIONS).to(handlers::preflight))
                    .default_service(web::to(handlers::method_not_allowed)),
            ),
        )
        .route("/", web::get().to(handlers::index))
        .route("/health", web::get().to(handlers::health_check));
}
