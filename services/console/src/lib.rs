mod cli;
mod demo;
mod infra;
mod prompt;
mod routes;
mod server;

use finapp::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
