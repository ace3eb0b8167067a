//! Development server for the route planner.
//!
//! Serves the built frontend and answers its route requests the way the production endpoint does,
//! so the whole submission flow can be exercised locally without the routing engine.

pub mod config;
pub mod logging;
pub mod planner;
pub mod tokens;
pub mod web_app;

use actix_files::Files;
use actix_web::{web, App, HttpServer};
use clap::Parser;

use crate::{config::ServerArgs, planner::ValidatingPlanner, web_app::AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let args = ServerArgs::parse();
    logging::init_logging();

    let static_dir = args.static_dir.clone();
    let state = web::Data::new(AppState::new(
        Box::new(ValidatingPlanner::new()),
        static_dir.join("index.html"),
    ));
    if !static_dir.is_dir() {
        log::warn!(
            "Static directory {} does not exist, run `trunk build` in route-planner-frontend first",
            static_dir.display()
        );
    }

    log::info!("Listening on {}:{}", args.host, args.port);
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(web_app::configure)
            .service(Files::new("/", static_dir.clone()).index_file("index.html"))
    })
    .bind((args.host.as_str(), args.port))?
    .run()
    .await
}
