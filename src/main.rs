mod config;
mod error;
mod handlers;
mod models;
mod services;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;

use services::{activity::ActivityService, database::DatabaseService};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = config::Config::from_env().map_err(std::io::Error::other)?;

    let database_service = DatabaseService::connect(&config.database)
        .await
        .map_err(std::io::Error::other)?;
    let activity_service = web::Data::new(ActivityService::new(
        database_service,
        config.feed.clone(),
    ));

    let bind_address = format!("0.0.0.0:{}", config.server.port);
    log::info!("Starting Circles activity server on {}", bind_address);

    let allowed_origin = config.server.cors_allowed_origin.clone();

    HttpServer::new(move || {
        let cors = match &allowed_origin {
            Some(origin) => Cors::default()
                .allowed_origin(origin)
                .allow_any_method()
                .allow_any_header()
                .supports_credentials(),
            None => Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header(),
        };

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(activity_service.clone())
            .service(web::scope("/api/v1").configure(handlers::configure))
    })
    .bind(&bind_address)?
    .run()
    .await
}
