//! This module contains the [`AsProblemDetails`] trait.

use {
	crate::{ExtensionMembers, ProblemDetails, type_token_from_type_name},
	std::borrow::Cow,
};

/// A trait for errors that describe a failed HTTP request.
///
/// Only [`title()`](AsProblemDetails::title) is required; everything else has a sensible default.
pub trait AsProblemDetails: std::error::Error
{
	/// The problem type token.
	///
	/// Defaults to a token derived from the implementing type's name, so `UserNotFoundError`
	/// becomes `user-not-found`.
	fn problem_type(&self) -> Cow<'static, str>
	{
		Cow::Owned(type_token_from_type_name(std::any::type_name::<Self>()))
	}

	/// A short, human-readable summary of the problem type.
	fn title(&self) -> Cow<'static, str>;

	/// The status code to respond with.
	fn status(&self) -> http::StatusCode
	{
		http::StatusCode::INTERNAL_SERVER_ERROR
	}

	/// A human-readable explanation specific to this occurrence of the problem.
	///
	/// See: <https://www.rfc-editor.org/rfc/rfc9457.html#name-detail>
	fn detail(&self) -> Option<Cow<'static, str>>
	{
		Some(Cow::Owned(self.to_string()))
	}

	/// Adds extension members to a [`ProblemDetails`] instance being constructed.
	///
	/// This function is called by [`AsProblemDetails::as_problem_details`]. Error types can use
	/// this to hook in and register any extra information they have.
	fn add_extension_members(&self, extension_members: &mut ExtensionMembers)
	{
		let _ = extension_members;
	}

	/// Constructs a [`ProblemDetails`] from this error.
	fn as_problem_details(&self) -> ProblemDetails
	{
		let mut problem_details =
			ProblemDetails::new(self.problem_type(), self.title(), self.status())
				.with_optional_detail(self.detail());

		self.add_extension_members(problem_details.extension_members_mut());

		problem_details
	}
}

#[cfg(test)]
mod tests
{
	use {super::*, serde_json::json};

	#[derive(Debug)]
	struct UserNotFoundError
	{
		user_id: u64,
	}

	impl std::fmt::Display for UserNotFoundError
	{
		fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
		{
			write!(fmt, "no user with ID {}", self.user_id)
		}
	}

	impl std::error::Error for UserNotFoundError {}

	impl AsProblemDetails for UserNotFoundError
	{
		fn title(&self) -> Cow<'static, str>
		{
			Cow::Borrowed("User not found.")
		}

		fn status(&self) -> http::StatusCode
		{
			http::StatusCode::NOT_FOUND
		}

		fn add_extension_members(&self, extension_members: &mut ExtensionMembers)
		{
			extension_members.add("user_id", &self.user_id).unwrap();
		}
	}

	#[test]
	fn defaults_are_derived_from_the_error()
	{
		let problem = UserNotFoundError { user_id: 7 }.as_problem_details();

		assert_eq!(
			serde_json::to_value(&problem).unwrap(),
			json!({
				"type": "user-not-found",
				"title": "User not found.",
				"status": 404,
				"detail": "no user with ID 7",
				"user_id": 7,
			})
		);
	}
}
