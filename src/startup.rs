use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;

use crate::auth::AuthService;
use crate::error::{AppError, ValidationError};
use crate::logger::RequestLogger;
use crate::routes::{get_current_user, health_check, login, logout, refresh, register};

/// Shared state and routes, usable both by the server and by `actix_web::test`.
pub fn configure_app(auth: web::Data<AuthService>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(auth)
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                AppError::Validation(ValidationError::MalformedPayload(err.to_string())).into()
            }))
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/auth")
                    // Public
                    .route("/register", web::post().to(register))
                    .route("/login", web::post().to(login))
                    // Refresh cookie required
                    .route("/refresh", web::get().to(refresh))
                    // Access token required
                    .route("/me", web::get().to(get_current_user))
                    .route("/logout", web::post().to(logout)),
            );
    }
}

pub fn run(listener: TcpListener, auth: web::Data<AuthService>) -> Result<Server, std::io::Error> {
    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestLogger)
            .configure(configure_app(auth.clone()))
    })
    .listen(listener)?
    .run();

    Ok(server)
}
