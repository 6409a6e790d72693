use actix_files::Files;
use actix_web::{middleware::Logger, web, App, HttpServer};
use leptos::logging::{error, log};
use moviereviews::api;
use moviereviews::config::AppConfig;
use moviereviews::flow::Services;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Local development keeps credentials in .env
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|e| {
        error!("[CONFIG] {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    let services = web::Data::new(Services::connect(&config).await);
    let assets_dir = config.assets_dir.clone();

    log!(
        "To view your app, open this link in your browser: http://localhost:{}",
        config.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(services.clone())
            .configure(api::routes)
            // Serve the stylesheet and other assets
            .service(Files::new("/assets", assets_dir.as_str()))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
