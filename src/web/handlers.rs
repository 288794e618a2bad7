use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::{error, info, warn};
use tera::Context;
use uuid::Uuid;

use crate::error::ChatError;
use crate::resolver::{ReplySource, ResolverResult};
use crate::web::models::{
    timestamp_now, ChatRequest, InfoEnvelope, ResponseEnvelope, Status, Utterance,
};
use crate::AppState;

const REPEAT_PLEASE: &str = "Nie usłyszałem Cię dobrze. Możesz powtórzyć?";
const STATIC_REPLY: &str =
    "Ojej, moje obwody się przegrzały! Odpocznijmy chwilę i spróbujmy jeszcze raz.";

// Index page handler
pub async fn index(data: web::Data<AppState>) -> impl Responder {
    let mut context = Context::new();
    context.insert("robot_name", &data.robot_name);
    context.insert("mode", if data.resolver.has_provider() { "gemini" } else { "rules" });
    match data.tera.render("index.html", &context) {
        Ok(html) => HttpResponse::Ok().content_type("text/html").body(html),
        Err(e) => {
            error!("Template error: {}", e);
            HttpResponse::InternalServerError().body("Template error")
        }
    }
}

// Health check endpoint
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(InfoEnvelope {
        status: "ok".to_string(),
        message: "Robot is running".to_string(),
        timestamp: Some(timestamp_now()),
    })
}

pub async fn chat_info(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(InfoEnvelope {
        status: "success".to_string(),
        message: format!(
            "{} is ready to chat. POST {{\"message\": \"...\"}} to talk.",
            data.robot_name
        ),
        timestamp: Some(timestamp_now()),
    })
}

pub async fn preflight() -> impl Responder {
    HttpResponse::Ok().finish()
}

pub async fn method_not_allowed(req: HttpRequest) -> impl Responder {
    warn!("Method {} not allowed on {}", req.method(), req.path());
    HttpResponse::MethodNotAllowed().json(InfoEnvelope {
        status: "error".to_string(),
        message: "Method not allowed".to_string(),
        timestamp: None,
    })
}

// Chat API endpoint
pub async fn chat(data: web::Data<AppState>, req: web::Json<ChatRequest>) -> impl Responder {
    let request_id = Uuid::new_v4();
    let ChatRequest { message, history } = req.into_inner();

    let utterance = match Utterance::parse(message.as_deref().unwrap_or_default()) {
        Ok(utterance) => utterance,
        Err(e) => {
            warn!("Chat request {} rejected: {}", request_id, e);
            return validation_response(data.strict_validation);
        }
    };

    info!(
        "Chat request {}: {} ({} history turns)",
        request_id,
        utterance.as_str(),
        history.len()
    );

    // Resolve on a separate task so a panic turns into a friendly reply.
    let resolver = data.resolver.clone();
    let handle = actix_web::rt::spawn(async move { resolver.resolve(&utterance, &history).await });
    let result = match handle.await {
        Ok(result) => result,
        Err(e) => {
            error!("Resolver crashed for request {}: {}", request_id, e);
            ResolverResult {
                reply_text: STATIC_REPLY.to_string(),
                source: ReplySource::FallbackStatic,
            }
        }
    };

    info!("Chat request {} answered via {:?}", request_id, result.source);
    HttpResponse::Ok()
        .insert_header(("X-Request-Id", request_id.to_string()))
        .json(ResponseEnvelope::new(Status::Success, result.reply_text, result.source))
}

/// Turns an unreadable chat body into the same reply as an empty message.
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    let strict = req
        .app_data::<web::Data<AppState>>()
        .map(|data| data.strict_validation)
        .unwrap_or(false);
    warn!("{}", ChatError::InvalidBody(err.to_string()));
    InternalError::from_response(err, validation_response(strict)).into()
}

fn validation_response(strict: bool) -> HttpResponse {
    if strict {
        HttpResponse::BadRequest().json(ResponseEnvelope::new(
            Status::Error,
            REPEAT_PLEASE.to_string(),
            ReplySource::Validation,
        ))
    } else {
        HttpResponse::Ok().json(ResponseEnvelope::new(
            Status::Success,
            REPEAT_PLEASE.to_string(),
            ReplySource::Validation,
        ))
    }
}
