use actix_cors::Cors;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, Responder, middleware, web};
use rust_embed::RustEmbed;
use std::borrow::Cow;

use parentlens::api::handlers::AnalyzeResponse;
use parentlens::api::{AppState, configure_routes};
use parentlens::errors::AnalyzeError;
use parentlens::{banner, config};

#[derive(RustEmbed)]
#[folder = "static/"]
struct StaticAssets;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Print the startup banner
    banner::print_banner();

    if let Err(e) = dotenvy::dotenv() {
        eprintln!("⚠️  Warning: Could not load .env file: {}", e);
        eprintln!("   Make sure OPENAI_API_KEY is set in your environment");
    }

    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let app_config = config::AppConfig::from_env()
        .expect("Failed to load app configuration from environment");

    let port = app_config.port;
    let state = AppState::new(app_config).expect("Failed to build HTTP client from configuration");

    println!("🚀 Starting server on port {}...", port);
    println!("📷 Capture UI available at http://127.0.0.1:{}", port);

    HttpServer::new(move || {
        let cors = match &state.config.cors_allowed_origin {
            Some(origin) => Cors::default()
                .allowed_origin(origin)
                .allowed_methods(vec!["GET", "POST"])
                .allow_any_header()
                .max_age(3600),
            None => Cors::permissive(),
        };

        // Oversized or malformed bodies answer in the normalized shape
        // instead of actix's default error text.
        let json_config = web::JsonConfig::default()
            .limit(state.config.json_payload_limit())
            .error_handler(|err, _req| {
                let body = AnalyzeResponse::failure(&AnalyzeError::InvalidRequest(
                    "Invalid request body. Expected JSON with an `image` field.".to_string(),
                ));
                actix_web::error::InternalError::from_response(
                    err,
                    HttpResponse::BadRequest().json(body),
                )
                .into()
            });

        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(json_config)
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .configure(configure_routes)
            .route("/{_:.*}", web::get().to(static_file_handler))
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}

async fn static_file_handler(req: HttpRequest) -> impl Responder {
    let path = if req.path() == "/" {
        "index.html"
    } else {
        // trim leading '/'
        &req.path()[1..]
    };

    match StaticAssets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            HttpResponse::Ok()
                .content_type(mime.as_ref())
                .body(Cow::into_owned(content.data))
        }
        None => HttpResponse::NotFound().body("404 Not Found"),
    }
}
