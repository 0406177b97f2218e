//! Runtime exceptions fed into the [`ExceptionHandler`].
//!
//! An [`Exception`] is a type-erased error plus enough information to pick a conversion handler
//! for it. Three kinds of errors are recognized when an exception is created:
//!
//!    - [`Problem`]s, domain errors that already describe their own response
//!    - [`HttpException`]s, plain status code failures coming from routing or middleware
//!    - [`RequestValidationError`]s, rejected request input
//!
//! Everything else is an unclassified error and ends up with the generic fallback unless a
//! registered handler claims it.
//!
//! [`ExceptionHandler`]: crate::ExceptionHandler

use {
	std::{
		any::{self, Any},
		backtrace::Backtrace,
		error::Error,
		fmt,
	},
	thiserror::Error,
};

mod http_exception;
mod problem;
mod validation;

pub use self::{
	http_exception::HttpException,
	problem::{Problem, StatusProblem},
	validation::{RequestValidationError, ValidationIssue},
};

/// A type-erased error.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// An error raised while serving a request.
#[derive(Debug)]
pub struct Exception
{
	kind: ExceptionKind,
	type_name: &'static str,

	#[debug(ignore)]
	backtrace: Backtrace,
}

/// The classification of an [`Exception`].
#[derive(Debug)]
pub enum ExceptionKind
{
	/// A domain error carrying its own problem details.
	Problem(Problem),

	/// An HTTP status failure.
	Http(HttpException),

	/// Invalid request input.
	Validation(RequestValidationError),

	/// Anything else.
	Other(BoxError),
}

/// A panic caught while serving a request.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct Panicked
{
	message: String,
}

impl Panicked
{
	/// Extracts the panic message from a payload returned by [`std::panic::catch_unwind()`].
	pub fn from_payload(payload: Box<dyn Any + Send + 'static>) -> Self
	{
		let message = payload
			.downcast_ref::<String>()
			.map(String::as_str)
			.or_else(|| payload.downcast_ref::<&str>().copied())
			.unwrap_or("panicked")
			.to_owned();

		Self { message }
	}
}

impl Exception
{
	/// Wraps `error`, classifying it by its concrete type.
	pub fn new<E>(error: E) -> Self
	where
		E: Error + Send + Sync + 'static,
	{
		Self::classify(Box::new(error), any::type_name::<E>())
	}

	/// Wraps an already type-erased error.
	///
	/// Classification still works, but the reported type name is only as precise as the box.
	pub fn from_boxed(error: BoxError) -> Self
	{
		Self::classify(error, any::type_name::<BoxError>())
	}

	/// Turns a panic payload into an unclassified exception.
	pub fn from_panic(payload: Box<dyn Any + Send + 'static>) -> Self
	{
		Self::new(Panicked::from_payload(payload))
	}

	fn classify(error: BoxError, type_name: &'static str) -> Self
	{
		let kind = match error.downcast::<Problem>() {
			Ok(problem) => ExceptionKind::Problem(*problem),
			Err(error) => match error.downcast::<HttpException>() {
				Ok(http) => ExceptionKind::Http(*http),
				Err(error) => match error.downcast::<RequestValidationError>() {
					Ok(validation) => ExceptionKind::Validation(*validation),
					Err(error) => ExceptionKind::Other(error),
				},
			},
		};

		Self { kind, type_name, backtrace: Backtrace::capture() }
	}

	/// Returns the classification of this exception.
	pub fn kind(&self) -> &ExceptionKind
	{
		&self.kind
	}

	/// Returns the name of the error type this exception was created from.
	///
	/// For [`Problem`]s created from a domain error, this is the domain error's type.
	pub fn type_name(&self) -> &'static str
	{
		match &self.kind {
			ExceptionKind::Problem(problem) => problem.type_name(),
			ExceptionKind::Http(_) | ExceptionKind::Validation(_) | ExceptionKind::Other(_) => {
				self.type_name
			},
		}
	}

	/// The stack captured when this exception was created.
	///
	/// Whether this is actually captured depends on `RUST_BACKTRACE` / `RUST_LIB_BACKTRACE`.
	pub fn backtrace(&self) -> &Backtrace
	{
		&self.backtrace
	}

	/// Returns the domain problem, if this exception is one.
	pub fn problem(&self) -> Option<&Problem>
	{
		match &self.kind {
			ExceptionKind::Problem(problem) => Some(problem),
			ExceptionKind::Http(_) | ExceptionKind::Validation(_) | ExceptionKind::Other(_) => None,
		}
	}

	/// Returns the HTTP exception, if this exception is one.
	pub fn http(&self) -> Option<&HttpException>
	{
		match &self.kind {
			ExceptionKind::Http(http) => Some(http),
			ExceptionKind::Problem(_)
			| ExceptionKind::Validation(_)
			| ExceptionKind::Other(_) => None,
		}
	}

	/// Returns the validation error, if this exception is one.
	pub fn validation(&self) -> Option<&RequestValidationError>
	{
		match &self.kind {
			ExceptionKind::Validation(validation) => Some(validation),
			ExceptionKind::Problem(_) | ExceptionKind::Http(_) | ExceptionKind::Other(_) => None,
		}
	}

	/// Returns the underlying error as a trait object.
	pub fn as_error(&self) -> &(dyn Error + Send + Sync + 'static)
	{
		match &self.kind {
			ExceptionKind::Problem(problem) => problem,
			ExceptionKind::Http(http) => http,
			ExceptionKind::Validation(validation) => validation,
			ExceptionKind::Other(error) => &**error,
		}
	}

	/// Attempts to downcast to a concrete error type.
	///
	/// [`Problem`]s created from a domain error also downcast to that domain error.
	pub fn downcast_ref<E>(&self) -> Option<&E>
	where
		E: Error + 'static,
	{
		if let Some(source) = self.problem().and_then(Problem::domain_error) {
			if let Some(error) = source.downcast_ref::<E>() {
				return Some(error);
			}
		}

		let error: &(dyn Error + 'static) = self.as_error();
		error.downcast_ref::<E>()
	}

	/// Checks whether this exception is (or was created from) an `E`.
	pub fn is<E>(&self) -> bool
	where
		E: Error + 'static,
	{
		self.downcast_ref::<E>().is_some()
	}
}

impl fmt::Display for Exception
{
	fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result
	{
		fmt::Display::fmt(self.as_error(), fmt)
	}
}

impl<E> From<E> for Exception
where
	E: Error + Send + Sync + 'static,
{
	fn from(error: E) -> Self
	{
		Self::new(error)
	}
}

#[cfg(test)]
mod tests
{
	use {
		super::*,
		crate::testing::{Result, assert, assert_eq},
		problem_details::AsProblemDetails,
		std::borrow::Cow,
	};

	#[derive(Debug, thiserror::Error)]
	#[error("no user with ID {0}")]
	struct UserNotFoundError(u64);

	impl AsProblemDetails for UserNotFoundError
	{
		fn title(&self) -> Cow<'static, str>
		{
			Cow::Borrowed("User not found.")
		}

		fn status(&self) -> ::http::StatusCode
		{
			::http::StatusCode::NOT_FOUND
		}
	}

	#[derive(Debug, thiserror::Error)]
	#[error("something exploded")]
	struct Explosion;

	#[test]
	fn classifies_by_concrete_type() -> Result
	{
		let problem = Exception::new(Problem::from(UserNotFoundError(1)));
		let http = Exception::new(HttpException::new(::http::StatusCode::NOT_FOUND));
		let validation = Exception::new(RequestValidationError::new());
		let other = Exception::new(Explosion);

		assert!(problem.problem().is_some());
		assert!(http.http().is_some());
		assert!(validation.validation().is_some());
		assert!(matches!(other.kind(), ExceptionKind::Other(_)));

		Ok(())
	}

	#[test]
	fn boxed_errors_are_still_classified() -> Result
	{
		let boxed: BoxError = Box::new(HttpException::new(::http::StatusCode::METHOD_NOT_ALLOWED));
		let exception = Exception::from_boxed(boxed);

		assert_eq!(
			exception.http().map(HttpException::status),
			Some(::http::StatusCode::METHOD_NOT_ALLOWED)
		);

		Ok(())
	}

	#[test]
	fn domain_problems_downcast_to_their_source() -> Result
	{
		let exception = Exception::from(Problem::from(UserNotFoundError(7)));

		assert!(exception.is::<UserNotFoundError>());
		assert!(exception.is::<Problem>());
		assert!(!exception.is::<Explosion>());
		assert!(exception.type_name().ends_with("UserNotFoundError"));

		Ok(())
	}

	#[test]
	fn panics_keep_their_message() -> Result
	{
		let exception = Exception::from_panic(Box::new("oh no"));

		assert!(exception.is::<Panicked>());
		assert_eq!(exception.to_string(), "oh no");

		Ok(())
	}
}
