use {
	bytes::Bytes,
	http::{HeaderMap, HeaderValue, StatusCode, header},
	problem_details::APPLICATION_PROBLEM_JSON,
	serde_json::{Map, Value},
};

/// The response assembled by the [`ExceptionHandler`].
///
/// Post-hooks receive and return this type, so headers and the body can still be changed before
/// it is turned into an [`http::Response`].
///
/// [`ExceptionHandler`]: crate::ExceptionHandler
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemResponse
{
	/// The response status, normally the problem's `status`.
	pub status: StatusCode,

	/// Headers to send with the response.
	pub headers: HeaderMap,

	/// The marshaled problem.
	pub body: Map<String, Value>,
}

impl ProblemResponse
{
	/// Creates a response with the problem media type already set.
	pub fn new(status: StatusCode, body: Map<String, Value>) -> Self
	{
		let mut headers = HeaderMap::new();
		headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(APPLICATION_PROBLEM_JSON));

		Self { status, headers, body }
	}

	/// Serializes the body.
	pub fn body_bytes(&self) -> Bytes
	{
		// a `Map<String, Value>` cannot fail to serialize
		serde_json::to_vec(&self.body)
			.map(Bytes::from)
			.unwrap_or_default()
	}
}

impl<B> From<ProblemResponse> for http::Response<B>
where
	B: From<Bytes>,
{
	fn from(problem_response: ProblemResponse) -> Self
	{
		let mut response = http::Response::new(B::from(problem_response.body_bytes()));
		*response.status_mut() = problem_response.status;
		*response.headers_mut() = problem_response.headers;
		response
	}
}

impl axum::response::IntoResponse for ProblemResponse
{
	fn into_response(self) -> axum::response::Response
	{
		http::Response::<axum::body::Body>::from(self)
	}
}
