use {
	super::PendingException,
	crate::{
		ExceptionHandler,
		exception::{BoxError, Exception, HttpException},
	},
	axum::response::{IntoResponse, Response},
	futures_util::future::BoxFuture,
	http::{header, request},
	std::{
		convert::Infallible,
		future,
		mem,
		sync::Arc,
		task::{self, Poll},
	},
};

/// A [`tower::Layer`] producing [`ProblemService`]s.
#[derive(Debug, Clone)]
pub struct ProblemLayer
{
	handler: Arc<ExceptionHandler>,
}

impl ProblemLayer
{
	/// Creates a new [`ProblemLayer`].
	pub fn new(handler: Arc<ExceptionHandler>) -> Self
	{
		Self { handler }
	}
}

impl<S> tower::Layer<S> for ProblemLayer
{
	type Service = ProblemService<S>;

	fn layer(&self, inner: S) -> Self::Service
	{
		ProblemService { inner, handler: Arc::clone(&self.handler) }
	}
}

/// Replaces error responses of the inner service with problem responses.
///
/// A response is replaced if
///
///    - it carries a [`PendingException`]
///    - it is a 4xx/5xx response without a `Content-Type`, i.e. nobody bothered to describe the
///      error; it is treated as an [`HttpException`] with that status
///
/// Errors returned by the inner service are handled as unclassified exceptions.
#[derive(Debug, Clone)]
pub struct ProblemService<S>
{
	inner: S,
	handler: Arc<ExceptionHandler>,
}

impl<S, B> tower::Service<http::Request<B>> for ProblemService<S>
where
	S: tower::Service<http::Request<B>, Response = Response> + Clone + Send + 'static,
	S::Error: Into<BoxError>,
	S::Future: Send + 'static,
	B: Send + 'static,
{
	type Response = Response;
	type Error = Infallible;
	type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

	fn poll_ready(&mut self, _: &mut task::Context<'_>) -> Poll<Result<(), Self::Error>>
	{
		Poll::Ready(Ok(()))
	}

	fn call(&mut self, req: http::Request<B>) -> Self::Future
	{
		let mut service = self.inner.clone();
		mem::swap(&mut service, &mut self.inner);

		let handler = Arc::clone(&self.handler);
		let parts = snapshot(&req);

		Box::pin(async move {
			if let Err(error) = future::poll_fn(|cx| service.poll_ready(cx)).await {
				let exception = Exception::from_boxed(error.into());
				return Ok(handler.handle(&parts, &exception).into_response());
			}

			let response = match service.call(req).await {
				Ok(response) => response,
				Err(error) => {
					let exception = Exception::from_boxed(error.into());
					return Ok(handler.handle(&parts, &exception).into_response());
				},
			};

			Ok(replace_error_response(&handler, &parts, response))
		})
	}
}

/// Copies everything hooks and handlers may look at, without the extensions.
fn snapshot<B>(req: &http::Request<B>) -> request::Parts
{
	let mut snapshot = http::Request::new(());
	*snapshot.method_mut() = req.method().clone();
	*snapshot.uri_mut() = req.uri().clone();
	*snapshot.version_mut() = req.version();
	*snapshot.headers_mut() = req.headers().clone();

	snapshot.into_parts().0
}

fn replace_error_response(
	handler: &ExceptionHandler,
	parts: &request::Parts,
	mut response: Response,
) -> Response
{
	let pending = response.extensions_mut().remove::<PendingException>();

	if let Some(PendingException(exception)) = pending {
		trace!(exception.name = exception.type_name(), "handling exception");
		return handler.handle(parts, &exception).into_response();
	}

	let status = response.status();

	if !(status.is_client_error() || status.is_server_error())
		|| response.headers().contains_key(header::CONTENT_TYPE)
	{
		return response;
	}

	trace!(%status, "handling bare error response");

	let mut headers = mem::take(response.headers_mut());
	headers.remove(header::CONTENT_LENGTH);

	let exception = Exception::new(HttpException::new(status).with_headers(headers));

	handler.handle(parts, &exception).into_response()
}
