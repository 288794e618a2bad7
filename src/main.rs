mod config;
mod error;
mod model;
mod resolver;
mod rules;
mod web;

use actix_files as fs;
use actix_web::{middleware::Logger, web::Data, App, HttpServer};
use dotenv::dotenv;
use log::{error, info, warn};
use std::sync::Arc;
use tera::Tera;

use config::Config;
use model::gemini::GeminiModel;
use model::Provider;
use resolver::ResponseResolver;
use rules::picker::RandomPicker;
use rules::RuleTable;
use web::routes;

// App state structure
struct AppState {
    tera: Tera,
    resolver: Arc<ResponseResolver>,
    robot_name: String,
    strict_validation: bool,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize environment
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting robot chat service");

    let config = Config::from_env();

    // Without an API key every reply comes from the keyword rules
    let provider: Option<Arc<dyn Provider>> = match &config.gemini {
        Some(gemini) => match GeminiModel::new(gemini.clone(), config.provider_timeout) {
            Ok(model) => Some(Arc::new(model) as Arc<dyn Provider>),
            Err(e) => {
                error!("Failed to initialize Gemini client: {}", e);
                std::process::exit(1);
            }
        },
        None => {
            warn!("GEMINI_API_KEY not set, answering from keyword rules only");
            None
        }
    };

    let rules = RuleTable::standard(&config.robot_name);
    info!("Loaded {} keyword rules", rules.rules().count());

    let resolver = ResponseResolver::new(provider, rules, Arc::new(RandomPicker))
        .with_retry(config.retry.clone())
        .with_timeout(config.provider_timeout)
        .with_min_reply_chars(config.min_reply_chars);

    // Initialize template engine
    let mut tera = match Tera::new("templates/**/*") {
        Ok(t) => t,
        Err(e) => {
            error!("Template parsing error: {}", e);
            std::process::exit(1);
        }
    };
    tera.autoescape_on(vec![".html"]);

    let app_state = Data::new(AppState {
        tera,
        resolver: Arc::new(resolver),
        robot_name: config.robot_name.clone(),
        strict_validation: config.strict_validation,
    });

    info!("Listening on http://{}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(app_state.clone())
            .configure(routes::configure)
            .service(fs::Files::new("/static", "./static"))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
