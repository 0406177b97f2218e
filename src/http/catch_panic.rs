//! A middleware to catch panics and turn them into exceptions.
//!
//! See [`tower_http::catch_panic`] for more details.

use {
	super::PendingException,
	crate::exception::Exception,
	axum::body::Body,
	std::{any::Any, sync::Arc},
	tower_http::catch_panic::{CatchPanicLayer, ResponseForPanic},
};

/// Creates a [`tower::Layer`], which produces a middleware that will catch panics in its inner
/// service and turn them into responses carrying a [`PendingException`].
///
/// Install it inside of a [`ProblemLayer`], which turns those into problem responses.
///
/// [`ProblemLayer`]: super::ProblemLayer
pub fn layer() -> CatchPanicLayer<PanicResponse>
{
	CatchPanicLayer::custom(PanicResponse)
}

/// The [`ResponseForPanic`] implementation used by [`layer()`].
#[derive(Debug, Clone, Copy)]
pub struct PanicResponse;

impl ResponseForPanic for PanicResponse
{
	type ResponseBody = Body;

	fn response_for_panic(&mut self, err: Box<dyn Any + Send + 'static>) -> http::Response<Body>
	{
		let exception = Exception::from_panic(err);

		debug!(panic_message = %exception, "http handler panicked");

		let mut response = http::Response::new(Body::empty());
		*response.status_mut() = http::StatusCode::INTERNAL_SERVER_ERROR;
		response.extensions_mut().insert(PendingException(Arc::new(exception)));
		response
	}
}
