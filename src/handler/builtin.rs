//! The conversion handlers registered by default.

use {
	super::ExceptionHandler,
	crate::{
		exception::{BoxError, Exception},
		registry::Handled,
		wrappers::ProblemConstructor,
	},
	http::{StatusCode, request},
	problem_details::{ExtensionMembers, ProblemDetails},
	std::borrow::Cow,
};

/// The `title` of problems built from request validation errors.
pub const VALIDATION_TITLE: &str = "Request validation error.";

/// The `type` of problems built from request validation errors.
pub const VALIDATION_TYPE: &str = "request-validation-failed";

/// Converts [`HttpException`]s.
///
/// The problem is built by the wrapper registered for the exact status code, if any. Otherwise
/// its title and type come from the handler's [`StatusMapper`], and its detail defaults to the
/// reason phrase. Headers carried by the exception are added to the response.
///
/// [`HttpException`]: crate::HttpException
/// [`StatusMapper`]: problem_details::StatusMapper
pub fn http_exception_handler(
	handler: &ExceptionHandler,
	_: &request::Parts,
	exception: &Exception,
) -> Result<Handled, BoxError>
{
	let Some(http) = exception.http() else {
		return Ok(Handled::pass());
	};

	let status = http.status();
	let (title, type_token) = handler.status_mapper().map(status.as_u16())?;
	let detail = http
		.detail()
		.map_or_else(|| title.clone(), |detail| Cow::Owned(detail.to_owned()));

	let problem = match handler.unhandled_wrappers().get(status) {
		Some(wrapper) => wrapper.construct(Some(detail), ExtensionMembers::new()),
		None => ProblemDetails::new(type_token, title, status).with_detail(detail),
	};

	Ok(Handled::problem(problem).with_headers(http.headers().clone()))
}

/// Converts [`RequestValidationError`]s.
///
/// The validation issues end up in the `errors` extension member. A `422` wrapper, if registered,
/// receives them as its extension members.
///
/// [`RequestValidationError`]: crate::RequestValidationError
pub fn request_validation_handler(
	handler: &ExceptionHandler,
	_: &request::Parts,
	exception: &Exception,
) -> Result<Handled, BoxError>
{
	let Some(validation) = exception.validation() else {
		return Ok(Handled::pass());
	};

	let mut extension_members = ExtensionMembers::new();
	extension_members.add("errors", validation.errors())?;

	let status = StatusCode::UNPROCESSABLE_ENTITY;
	let problem = match handler.unhandled_wrappers().get(status) {
		Some(wrapper) => wrapper.construct(None, extension_members),
		None => ProblemDetails::new(VALIDATION_TYPE, VALIDATION_TITLE, status)
			.with_extension_members(extension_members),
	};

	Ok(Handled::problem(problem))
}
