use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use log::info;
use std::env;

use fileshare_backend::{config::AppConfig, db, routes};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://fileshare.db".to_string());
    let pool = db::create_pool(&database_url)
        .await
        .expect("Failed to connect to the database");
    db::init_schema(&pool)
        .await
        .expect("Failed to initialize the database schema");

    let config = AppConfig::from_env()?;
    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());

    info!("Starting server at {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(config.clone()))
            .configure(routes)
    })
    .bind(bind_addr)?
    .run()
    .await
}
