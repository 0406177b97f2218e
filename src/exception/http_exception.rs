use {
	http::{HeaderMap, StatusCode},
	std::{borrow::Cow, error::Error, fmt},
};

/// A failure that is fully described by an HTTP status code.
///
/// These are produced by routing (`404`, `405`), by middleware, or directly by handlers that just
/// want to bail with a status. `detail` defaults to the status code's reason phrase when the
/// problem is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpException
{
	status: StatusCode,
	detail: Option<Cow<'static, str>>,
	headers: HeaderMap,
}

impl HttpException
{
	/// Creates an exception for `status` without a detail.
	pub fn new(status: StatusCode) -> Self
	{
		Self { status, detail: None, headers: HeaderMap::new() }
	}

	/// Sets the `detail` member.
	pub fn with_detail(mut self, detail: impl Into<Cow<'static, str>>) -> Self
	{
		self.detail = Some(detail.into());
		self
	}

	/// Headers to add to the error response, e.g. `Allow` for a `405`.
	pub fn with_headers(mut self, headers: HeaderMap) -> Self
	{
		self.headers.extend(headers);
		self
	}

	/// Returns the status code.
	pub fn status(&self) -> StatusCode
	{
		self.status
	}

	/// Returns the detail, if one was set.
	pub fn detail(&self) -> Option<&str>
	{
		self.detail.as_deref()
	}

	/// Returns the headers to add to the response.
	pub fn headers(&self) -> &HeaderMap
	{
		&self.headers
	}
}

impl fmt::Display for HttpException
{
	fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result
	{
		match (self.detail(), self.status.canonical_reason()) {
			(Some(detail), _) => fmt.write_str(detail),
			(None, Some(reason)) => fmt.write_str(reason),
			(None, None) => write!(fmt, "HTTP {}", self.status.as_u16()),
		}
	}
}

impl Error for HttpException {}

impl From<StatusCode> for HttpException
{
	fn from(status: StatusCode) -> Self
	{
		Self::new(status)
	}
}
