//! Extension points that run around dispatch.
//!
//! Pre-hooks observe the request and the exception before anything else happens; they cannot
//! change either. Post-hooks receive the assembled [`ProblemResponse`] and return the one that is
//! sent, in list order.

use {
	crate::{exception::Exception, response::ProblemResponse},
	http::request,
};

mod cors;
mod strip_extras;

pub use self::{cors::CorsPostHook, strip_extras::StripExtrasPostHook};

/// Runs before dispatch.
pub trait PreHook: Send + Sync
{
	fn run(&self, request: &request::Parts, exception: &Exception);
}

impl<F> PreHook for F
where
	F: Fn(&request::Parts, &Exception) + Send + Sync,
{
	fn run(&self, request: &request::Parts, exception: &Exception)
	{
		self(request, exception);
	}
}

/// Runs after the response has been assembled.
pub trait PostHook: Send + Sync
{
	fn run(&self, request: &request::Parts, response: ProblemResponse) -> ProblemResponse;
}

impl<F> PostHook for F
where
	F: Fn(&request::Parts, ProblemResponse) -> ProblemResponse + Send + Sync,
{
	fn run(&self, request: &request::Parts, response: ProblemResponse) -> ProblemResponse
	{
		self(request, response)
	}
}
