pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod storage;
pub mod utils;

use actix_web::web;

/// Route table, shared by the server binary and the integration tests.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/registration").route(web::post().to(handlers::auth::register)),
    )
    .service(
        web::resource("/authorization").route(web::post().to(handlers::auth::authorize)),
    )
    .service(
        web::resource("/logout")
            .route(web::post().to(handlers::auth::logout))
            .route(web::get().to(handlers::auth::logout)),
    )
    .service(
        web::resource("/files")
            .route(web::post().to(handlers::files::upload))
            .route(web::get().to(handlers::files::list)),
    )
    .service(
        web::resource("/files/{file_id}").route(web::get().to(handlers::files::retrieve)),
    )
    .service(
        web::resource("/files/{file_id}/accesses")
            .route(web::post().to(handlers::access::grant))
            .route(web::delete().to(handlers::access::revoke)),
    );
}
