use std::borrow::Cow;

/// A problem type.
///
/// Implement this for enums that catalogue the problems an API can report, then build
/// [`ProblemDetails`] from them with [`ProblemDetails::from_problem_type()`].
///
/// [`ProblemDetails`]: crate::ProblemDetails
/// [`ProblemDetails::from_problem_type()`]: crate::ProblemDetails::from_problem_type
#[diagnostic::on_unimplemented(
	message = "`{Self}` is not an HTTP problem type",
	note = "only types that implement `ProblemType` can be turned into `ProblemDetails`"
)]
pub trait ProblemType
{
	/// The token to encode in the response's [`type`] member.
	///
	/// This is turned into a URI by [`MarshalOptions`] if a documentation template is configured.
	///
	/// [`type`]: https://www.rfc-editor.org/rfc/rfc9457.html#section-3.1.1
	/// [`MarshalOptions`]: crate::MarshalOptions
	fn type_token(&self) -> Cow<'static, str>;

	/// The status code to use in the response.
	///
	/// This is also the status code used in the response's [`status`] member.
	///
	/// [`status`]: https://www.rfc-editor.org/rfc/rfc9457.html#section-3.1.2
	fn status(&self) -> http::StatusCode;

	/// The response's [`title`] member.
	///
	/// [`title`]: https://www.rfc-editor.org/rfc/rfc9457.html#section-3.1.3
	fn title(&self) -> Cow<'static, str>;
}

/// Derives a problem type token from a Rust type name.
///
/// Module paths and generic arguments are dropped, a single trailing `Error` is removed, and the
/// remaining `CamelCase` name is split on uppercase letters, joined with `-`, and lowercased.
///
/// ```
/// use problem_details::type_token_from_type_name;
///
/// assert_eq!(type_token_from_type_name("my_api::users::UserNotFoundError"), "user-not-found");
/// assert_eq!(type_token_from_type_name("CustomUnhandledException"), "custom-unhandled-exception");
/// ```
pub fn type_token_from_type_name(type_name: &str) -> String
{
	let name = type_name
		.split_once('<')
		.map_or(type_name, |(head, _)| head);

	let name = name.rsplit_once("::").map_or(name, |(_, tail)| tail);

	let name = name
		.strip_suffix("Error")
		.filter(|rest| !rest.is_empty())
		.unwrap_or(name);

	let mut token = String::with_capacity(name.len() + 4);

	for (idx, char) in name.char_indices() {
		if idx > 0 && char.is_uppercase() {
			token.push('-');
		}

		token.extend(char.to_lowercase());
	}

	token
}

#[cfg(test)]
mod tests
{
	use super::*;

	#[test]
	fn strips_error_suffix()
	{
		assert_eq!(type_token_from_type_name("NotFoundError"), "not-found");
		assert_eq!(type_token_from_type_name("InvalidAuthError"), "invalid-auth");
		assert_eq!(type_token_from_type_name("ServerExceptionError"), "server-exception");
	}

	#[test]
	fn keeps_other_suffixes()
	{
		assert_eq!(type_token_from_type_name("SomethingWrong"), "something-wrong");
		assert_eq!(
			type_token_from_type_name("CustomUnhandledException"),
			"custom-unhandled-exception"
		);
	}

	#[test]
	fn drops_paths_and_generics()
	{
		assert_eq!(
			type_token_from_type_name("crate::errors::WrappedError<alloc::string::String>"),
			"wrapped"
		);
	}

	#[test]
	fn bare_error_is_not_emptied()
	{
		assert_eq!(type_token_from_type_name("std::io::Error"), "error");
	}
}
