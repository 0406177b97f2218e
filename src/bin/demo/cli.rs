//! CLI argument handling.

use {
	clap::Parser,
	std::{net::SocketAddr, path::PathBuf},
};

/* NOTE:
 * We expose a free function here so callers don't need to have
 * `clap::Parser` in-scope.
 */
pub fn args() -> Args
{
	Args::parse()
}

/// Serves a handful of routes that fail on purpose.
#[derive(Debug, Parser)]
pub struct Args
{
	/// Path to the configuration file.
	///
	/// The defaults are used if this is omitted.
	#[arg(long = "config", env = "PROBLEM_RESPONDER_CONFIG")]
	pub config_path: Option<PathBuf>,

	/// The address to listen on.
	#[arg(long, env = "PROBLEM_RESPONDER_LISTEN_ADDR", default_value = "127.0.0.1:8000")]
	pub listen_addr: SocketAddr,
}
