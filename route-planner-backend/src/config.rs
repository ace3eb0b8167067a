use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about = "Development server for the route planner frontend")]
pub struct ServerArgs {
    #[arg(long, env = "ROUTE_PLANNER_HOST", default_value = "127.0.0.1")]
    pub host: String,
    #[arg(long, env = "ROUTE_PLANNER_PORT", default_value_t = 8080)]
    pub port: u16,
    /// Built frontend (the `trunk build` output).
    #[arg(
        long,
        env = "ROUTE_PLANNER_STATIC_DIR",
        default_value = "route-planner-frontend/dist"
    )]
    pub static_dir: PathBuf,
}
