use actix_web::middleware::DefaultHeaders;

/// Permissive CORS headers for the voice front-end, which may be served
/// from any origin.
///
/// - Origin: `*`
/// - Methods: GET, POST, OPTIONS
/// - Headers: Content-Type
pub fn permissive() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", "*"))
        .add(("Access-Control-Allow-Methods", "GET, POST, OPTIONS"))
        .add(("Access-Control-Allow-Headers", "Content-Type"))
        .add(("Access-Control-Max-Age", "3600"))
}
