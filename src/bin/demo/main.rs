//! A small HTTP server showing off problem responses.
//!
//! Every route fails in a different way; try them with `curl -i`.

use {
	problem_responder::{Config, ExceptionHandler, telemetry},
	std::sync::Arc,
	tokio::net::TcpListener,
};

#[macro_use]
extern crate tracing as _;

mod cli;
mod routes;

#[tokio::main]
async fn main() -> color_eyre::Result<()>
{
	color_eyre::install()?;

	let args = cli::args();
	let config = match args.config_path.as_deref() {
		Some(path) => Config::load(path)?,
		None => Config::default(),
	};

	telemetry::init(&config.tracing)?;

	let handler = Arc::new(ExceptionHandler::from_config(&config)?);
	let router = routes::router(&config, handler)?;
	let listener = TcpListener::bind(args.listen_addr).await?;

	info!(addr = %listener.local_addr()?, "listening for requests");

	axum::serve(listener, router)
		.with_graceful_shutdown(sigint())
		.await?;

	Ok(())
}

async fn sigint()
{
	match tokio::signal::ctrl_c().await {
		Ok(()) => warn!("received SIGINT"),
		Err(error) => error!(%error, "failed to receive SIGINT"),
	}
}
