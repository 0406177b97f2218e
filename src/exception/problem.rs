use {
	super::BoxError,
	http::StatusCode,
	problem_details::{AsProblemDetails, ProblemDetails, ProblemType, type_token_from_type_name},
	std::{any, borrow::Cow, error::Error, fmt},
};

/// A domain error that already knows what its response looks like.
///
/// Problems are never re-mapped: whatever handler would otherwise match, the response carries
/// exactly these problem details.
///
/// Any [`AsProblemDetails`] implementor converts into a `Problem`, keeping the original error
/// around as its source:
///
/// ```
/// use {
/// 	problem_details::AsProblemDetails,
/// 	problem_responder::Problem,
/// 	std::borrow::Cow,
/// };
///
/// #[derive(Debug)]
/// struct UserNotFoundError;
///
/// impl std::fmt::Display for UserNotFoundError
/// {
/// 	fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
/// 	{
/// 		fmt.write_str("no such user")
/// 	}
/// }
///
/// impl std::error::Error for UserNotFoundError {}
///
/// impl AsProblemDetails for UserNotFoundError
/// {
/// 	fn title(&self) -> Cow<'static, str>
/// 	{
/// 		Cow::Borrowed("User not found.")
/// 	}
///
/// 	fn status(&self) -> http::StatusCode
/// 	{
/// 		http::StatusCode::NOT_FOUND
/// 	}
/// }
///
/// let problem = Problem::from(UserNotFoundError);
///
/// assert_eq!(problem.details().problem_type(), "user-not-found");
/// assert_eq!(problem.details().detail(), Some("no such user"));
/// ```
#[derive(Debug)]
pub struct Problem
{
	details: ProblemDetails,
	type_name: &'static str,
	domain_error: Option<BoxError>,
}

impl Problem
{
	/// Creates a problem from plain problem details.
	pub fn new(details: ProblemDetails) -> Self
	{
		Self { details, type_name: any::type_name::<Self>(), domain_error: None }
	}

	/// Creates one of the ready-made status problems.
	pub fn status(status_problem: StatusProblem) -> Self
	{
		Self::new(ProblemDetails::from_problem_type(&status_problem))
	}

	/// Sets the `detail` member.
	pub fn with_detail(mut self, detail: impl Into<Cow<'static, str>>) -> Self
	{
		self.details.set_detail(detail);
		self
	}

	/// Returns the problem details the response is built from.
	pub fn details(&self) -> &ProblemDetails
	{
		&self.details
	}

	/// Returns an exclusive reference to the problem details.
	pub fn details_mut(&mut self) -> &mut ProblemDetails
	{
		&mut self.details
	}

	/// Consumes the problem and returns its details, dropping the domain error.
	pub fn into_details(self) -> ProblemDetails
	{
		self.details
	}

	/// The name of the domain error type this problem was created from.
	pub fn type_name(&self) -> &'static str
	{
		self.type_name
	}

	/// The domain error this problem was created from, if any.
	pub fn domain_error(&self) -> Option<&(dyn Error + Send + Sync + 'static)>
	{
		self.domain_error.as_deref()
	}
}

impl fmt::Display for Problem
{
	fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result
	{
		match self.details.detail() {
			Some(detail) => write!(fmt, "{}: {detail}", self.details.title()),
			None => fmt.write_str(self.details.title()),
		}
	}
}

impl Error for Problem
{
	fn source(&self) -> Option<&(dyn Error + 'static)>
	{
		self.domain_error
			.as_deref()
			.map(|error| -> &(dyn Error + 'static) { error })
	}
}

impl<E> From<E> for Problem
where
	E: AsProblemDetails + Send + Sync + 'static,
{
	fn from(error: E) -> Self
	{
		Self {
			details: error.as_problem_details(),
			type_name: any::type_name::<E>(),
			domain_error: Some(Box::new(error)),
		}
	}
}

/// Ready-made problems for common client and server failures.
///
/// Their type token is derived from the variant name (`NotFound` becomes `not-found`) and their
/// title is the status code's reason phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusProblem
{
	/// `400 Bad Request`
	BadRequest,

	/// `401 Unauthorized`
	Unauthorised,

	/// `403 Forbidden`
	Forbidden,

	/// `404 Not Found`
	NotFound,

	/// `409 Conflict`
	Conflict,

	/// `422 Unprocessable Entity`
	Unprocessable,

	/// `500 Internal Server Error`
	Server,
}

impl StatusProblem
{
	/// Every variant, in status code order.
	pub const ALL: [Self; 7] = [
		Self::BadRequest,
		Self::Unauthorised,
		Self::Forbidden,
		Self::NotFound,
		Self::Conflict,
		Self::Unprocessable,
		Self::Server,
	];

	fn name(self) -> &'static str
	{
		match self {
			Self::BadRequest => "BadRequest",
			Self::Unauthorised => "Unauthorised",
			Self::Forbidden => "Forbidden",
			Self::NotFound => "NotFound",
			Self::Conflict => "Conflict",
			Self::Unprocessable => "Unprocessable",
			Self::Server => "Server",
		}
	}
}

impl ProblemType for StatusProblem
{
	fn type_token(&self) -> Cow<'static, str>
	{
		Cow::Owned(type_token_from_type_name(self.name()))
	}

	fn status(&self) -> StatusCode
	{
		match self {
			Self::BadRequest => StatusCode::BAD_REQUEST,
			Self::Unauthorised => StatusCode::UNAUTHORIZED,
			Self::Forbidden => StatusCode::FORBIDDEN,
			Self::NotFound => StatusCode::NOT_FOUND,
			Self::Conflict => StatusCode::CONFLICT,
			Self::Unprocessable => StatusCode::UNPROCESSABLE_ENTITY,
			Self::Server => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn title(&self) -> Cow<'static, str>
	{
		Cow::Borrowed(self.status().canonical_reason().unwrap_or("Unknown Error"))
	}
}

impl From<StatusProblem> for Problem
{
	fn from(status_problem: StatusProblem) -> Self
	{
		Self::status(status_problem)
	}
}

#[cfg(test)]
mod tests
{
	use {
		super::*,
		crate::testing::{Result, assert, assert_eq},
	};

	#[test]
	fn status_problems() -> Result
	{
		let problem = Problem::status(StatusProblem::NotFound).with_detail("no such map");

		assert_eq!(problem.details().problem_type(), "not-found");
		assert_eq!(problem.details().title(), "Not Found");
		assert_eq!(problem.details().status(), StatusCode::NOT_FOUND);
		assert_eq!(problem.to_string(), "Not Found: no such map");

		for status_problem in StatusProblem::ALL {
			let status = status_problem.status();
			assert!(status.is_client_error() || status.is_server_error());
		}

		Ok(())
	}
}
