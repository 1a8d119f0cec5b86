//! Probe target: answers every GET with a fixed greeting

use crate::errors::Result;
use actix_web::middleware::Logger;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use tracing::info;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

pub const GREETING: &str = "Hello World!";
pub const CONTENT_TYPE: &str = "text/plain; charset=utf-8";

pub async fn hello(req: HttpRequest) -> HttpResponse {
    info!("Request received: {}", req.path());

    HttpResponse::Ok().content_type(CONTENT_TYPE).body(GREETING)
}

/// Routes every path to [`hello`] for GET; other methods get actix's 405.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/{tail:.*}").route(web::get().to(hello)));
}

/// Bind and serve until SIGINT/SIGTERM. Bind failures are returned.
pub async fn serve(host: &str, port: u16) -> Result<()> {
    let server = HttpServer::new(|| {
        App::new()
            .wrap(Logger::default())
            .configure(configure)
    })
    .bind((host, port))?
    .run();

    info!("Server started on {}:{}", host, port);

    server.await?;

    info!("Server stopped");
    Ok(())
}
