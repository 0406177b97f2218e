//! [`axum`] integration.
//!
//! [`ProblemLayer`] runs the [`ExceptionHandler`] for every response that carries an
//! [`Exception`], and for bare error responses produced by routing or other middleware. Panics are
//! turned into exceptions by [`catch_panic::layer()`], which must be installed inside of
//! [`ProblemLayer`]:
//!
//! ```no_run
//! use {
//! 	axum::{Router, routing::get},
//! 	problem_responder::{ExceptionHandler, http::{ProblemLayer, catch_panic}},
//! 	std::sync::Arc,
//! };
//!
//! let handler = Arc::new(ExceptionHandler::builder().build());
//! let router: Router = Router::new()
//! 	.route("/", get(async || "hello"))
//! 	.layer(catch_panic::layer())
//! 	.layer(ProblemLayer::new(handler));
//! ```
//!
//! [`ExceptionHandler`]: crate::ExceptionHandler

use {
	crate::exception::{Exception, ExceptionKind, HttpException, Problem, RequestValidationError},
	axum::response::{IntoResponse, Response},
	std::sync::Arc,
};

pub mod catch_panic;
pub mod extract;
mod middleware;

pub use self::middleware::{ProblemLayer, ProblemService};

/// Response extension marking a response as "to be replaced by a problem response".
#[derive(Debug, Clone)]
pub struct PendingException(pub Arc<Exception>);

impl IntoResponse for Exception
{
	fn into_response(self) -> Response
	{
		let status = match self.kind() {
			ExceptionKind::Problem(problem) => problem.details().status(),
			ExceptionKind::Http(http) => http.status(),
			ExceptionKind::Validation(_) => http::StatusCode::UNPROCESSABLE_ENTITY,
			ExceptionKind::Other(_) => http::StatusCode::INTERNAL_SERVER_ERROR,
		};

		let mut response = status.into_response();
		response.extensions_mut().insert(PendingException(Arc::new(self)));
		response
	}
}

macro_rules! into_exception_response {
	($($ty:ty),* $(,)?) => {
		$(impl IntoResponse for $ty
		{
			fn into_response(self) -> Response
			{
				Exception::new(self).into_response()
			}
		})*
	};
}

into_exception_response!(Problem, HttpException, RequestValidationError);
