//! # [RFC 9457][rfc] - Problem Details for HTTP APIs
//!
//! This crate provides an implementation of [RFC 9457][rfc] that can be used with the [`http`]
//! crate and compatible frameworks.
//!
//! [rfc]: https://www.rfc-editor.org/rfc/rfc9457.html

/*
 * Copyright (C) 2024  AlphaKeks <alphakeks@dawn>
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see https://www.gnu.org/licenses.
 */

pub use self::{
	as_problem_details::AsProblemDetails,
	extension_members::{ExtensionMemberError, ExtensionMembers, RESERVED_MEMBERS},
	marshal::{ABOUT_BLANK, MarshalOptions, Marshaled, TYPE_PLACEHOLDER, WireFormat},
	problem_type::{ProblemType, type_token_from_type_name},
	status::{PhraseTable, StatusMapper, UnknownStatusCode, convert_status_code},
};
use {
	serde::{
		Deserialize,
		ser::{Serialize, SerializeMap, Serializer},
	},
	serde_json::{Map, Value},
	std::{borrow::Cow, fmt, ops::RangeInclusive},
	thiserror::Error,
};

mod as_problem_details;
pub mod extension_members;
mod marshal;
mod problem_type;
pub mod status;

/// The media type of problem details responses.
pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

/// The status codes a [`ProblemDetails`] can carry.
pub const STATUS_RANGE: RangeInclusive<u16> = 100..=599;

/// The `type` of the generic problem used when nothing more specific is known.
pub const UNHANDLED_TYPE: &str = "unhandled-exception";

/// The `title` of the generic problem used when nothing more specific is known.
pub const UNHANDLED_TITLE: &str = "Unhandled exception occurred.";

/// [RFC 9457][rfc] - Problem Details
///
/// A value describing one occurrence of an error. It is built once, either by application code
/// or by an exception handler, turned into a response, and then dropped.
///
/// [rfc]: https://www.rfc-editor.org/rfc/rfc9457.html
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawProblemDetails")]
pub struct ProblemDetails
{
	/// The problem type token.
	///
	/// This is what ends up in the [`type`] member, unless [`MarshalOptions`] say otherwise.
	///
	/// [`type`]: https://www.rfc-editor.org/rfc/rfc9457.html#section-3.1.1
	problem_type: Cow<'static, str>,

	/// The response's [`title`] member.
	///
	/// [`title`]: https://www.rfc-editor.org/rfc/rfc9457.html#section-3.1.3
	title: Cow<'static, str>,

	/// The response's [`status`] member, and the status code of the response itself.
	///
	/// [`status`]: https://www.rfc-editor.org/rfc/rfc9457.html#section-3.1.2
	status: http::StatusCode,

	/// The response's [`detail`] member.
	///
	/// [`detail`]: https://www.rfc-editor.org/rfc/rfc9457.html#section-3.1.4
	detail: Option<Cow<'static, str>>,

	/// Additional fields to include in the response.
	///
	/// This corresponds to [Section 3.2] of the [RFC].
	///
	/// [Section 3.2]: https://www.rfc-editor.org/rfc/rfc9457.html#section-3.2
	/// [RFC]: https://www.rfc-editor.org/rfc/rfc9457.html
	extension_members: ExtensionMembers,
}

impl ProblemDetails
{
	/// Creates a new [`ProblemDetails`] object.
	///
	/// Problems only describe errors with a registered status class, so a `status` outside of
	/// [`STATUS_RANGE`] is replaced by `500 Internal Server Error`.
	pub fn new(
		problem_type: impl Into<Cow<'static, str>>,
		title: impl Into<Cow<'static, str>>,
		status: http::StatusCode,
	) -> Self
	{
		let status = if STATUS_RANGE.contains(&status.as_u16()) {
			status
		} else {
			http::StatusCode::INTERNAL_SERVER_ERROR
		};

		Self {
			problem_type: problem_type.into(),
			title: title.into(),
			status,
			detail: None,
			extension_members: ExtensionMembers::new(),
		}
	}

	/// Creates a new [`ProblemDetails`] object for the given [`ProblemType`].
	pub fn from_problem_type<T>(problem_type: &T) -> Self
	where
		T: ProblemType + ?Sized,
	{
		Self::new(problem_type.type_token(), problem_type.title(), problem_type.status())
	}

	/// The generic `500` problem for errors nobody anticipated.
	pub fn unhandled(detail: impl Into<Cow<'static, str>>) -> Self
	{
		Self::new(UNHANDLED_TYPE, UNHANDLED_TITLE, http::StatusCode::INTERNAL_SERVER_ERROR)
			.with_detail(detail)
	}

	/// Returns the problem type token.
	pub fn problem_type(&self) -> &str
	{
		&self.problem_type
	}

	/// Returns the value of the [`title`] field.
	///
	/// [`title`]: https://www.rfc-editor.org/rfc/rfc9457.html#section-3.1.3
	pub fn title(&self) -> &str
	{
		&self.title
	}

	/// Returns the value of the [`status`] field.
	///
	/// [`status`]: https://www.rfc-editor.org/rfc/rfc9457.html#section-3.1.2
	pub fn status(&self) -> http::StatusCode
	{
		self.status
	}

	/// Returns the value of the [`detail`] field, if any.
	///
	/// [`detail`]: https://www.rfc-editor.org/rfc/rfc9457.html#section-3.1.4
	pub fn detail(&self) -> Option<&str>
	{
		self.detail.as_deref()
	}

	/// Returns a shared reference to the [`ExtensionMembers`].
	pub fn extension_members(&self) -> &ExtensionMembers
	{
		&self.extension_members
	}

	/// Returns an exclusive reference to the [`ExtensionMembers`].
	pub fn extension_members_mut(&mut self) -> &mut ExtensionMembers
	{
		&mut self.extension_members
	}

	/// Replaces the problem type token.
	pub fn set_problem_type(&mut self, problem_type: impl Into<Cow<'static, str>>)
	{
		self.problem_type = problem_type.into();
	}

	/// Populates the [`detail`] field.
	///
	/// [`detail`]: https://www.rfc-editor.org/rfc/rfc9457.html#section-3.1.4
	pub fn set_detail(&mut self, detail: impl Into<Cow<'static, str>>)
	{
		self.detail = Some(detail.into());
	}

	/// Builder-style version of [`set_detail()`](Self::set_detail).
	pub fn with_detail(mut self, detail: impl Into<Cow<'static, str>>) -> Self
	{
		self.set_detail(detail);
		self
	}

	/// Like [`with_detail()`](Self::with_detail), but does nothing for `None`.
	pub fn with_optional_detail(self, detail: Option<impl Into<Cow<'static, str>>>) -> Self
	{
		match detail {
			Some(detail) => self.with_detail(detail),
			None => self,
		}
	}

	/// Adds an [extension member] field.
	///
	/// [extension member]: ExtensionMembers
	pub fn add_extension_member<V>(
		&mut self,
		name: impl Into<String>,
		value: &V,
	) -> Result<(), ExtensionMemberError>
	where
		V: ?Sized + Serialize,
	{
		self.extension_members.add(name, value).map(drop)
	}

	/// Merges `extension_members` into the existing ones.
	///
	/// Members with the same name are overwritten.
	pub fn with_extension_members(mut self, extension_members: ExtensionMembers) -> Self
	{
		for (name, value) in extension_members {
			// names coming out of `ExtensionMembers` were already checked
			let _ = self.extension_members.insert(name, value);
		}

		self
	}

	/// Returns the `type` member as it would be emitted with the given `options`.
	pub fn resolved_type(&self, options: &MarshalOptions) -> Cow<'_, str>
	{
		if options.is_strict() {
			return Cow::Borrowed(ABOUT_BLANK);
		}

		match options.template() {
			Some(template) => Cow::Owned(template.replace(TYPE_PLACEHOLDER, &self.problem_type)),
			None => Cow::Borrowed(&self.problem_type),
		}
	}

	/// Produces the wire-format JSON object for this problem.
	///
	/// This never mutates `self`, so repeated calls with the same options yield the same output.
	/// When debug stripping is requested, only the public members survive, and every member
	/// removed from the emitted shape is reported in [`Marshaled::stripped`].
	pub fn marshal(&self, options: &MarshalOptions) -> Marshaled
	{
		let mut body = Map::new();
		let mut stripped = Vec::new();

		match options.format() {
			WireFormat::Rfc9457 => {
				body.insert(String::from("type"), Value::from(self.resolved_type(options)));
				body.insert(String::from("title"), Value::from(self.title()));
				body.insert(String::from("status"), Value::from(self.status().as_u16()));

				let debug_members = self
					.detail()
					.map(|detail| (String::from("detail"), Value::from(detail)))
					.into_iter()
					.chain(
						self.extension_members()
							.iter()
							.filter(|(name, _)| !extension_members::is_reserved(name))
							.map(|(name, value)| (name.to_owned(), value.clone())),
					);

				if options.strips_debug() {
					stripped.extend(debug_members);
				} else {
					body.extend(debug_members);
				}
			},
			WireFormat::Legacy => {
				body.insert(String::from("code"), Value::from(self.problem_type()));
				body.insert(String::from("message"), Value::from(self.title()));

				// extension members are not part of this shape, so only the message can be stripped
				match (options.strips_debug(), self.detail()) {
					(false, detail) => {
						body.insert(String::from("debug_message"), Value::from(detail));
					},
					(true, Some(detail)) => {
						stripped.push((String::from("debug_message"), Value::from(detail)));
					},
					(true, None) => {},
				}
			},
		}

		Marshaled { body, stripped }
	}
}

impl fmt::Display for ProblemDetails
{
	fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result
	{
		fmt.write_str(self.title())
	}
}

impl std::error::Error for ProblemDetails {}

impl AsProblemDetails for ProblemDetails
{
	fn problem_type(&self) -> Cow<'static, str>
	{
		self.problem_type.clone()
	}

	fn title(&self) -> Cow<'static, str>
	{
		self.title.clone()
	}

	fn status(&self) -> http::StatusCode
	{
		self.status
	}

	fn detail(&self) -> Option<Cow<'static, str>>
	{
		self.detail.clone()
	}

	fn as_problem_details(&self) -> ProblemDetails
	{
		self.clone()
	}
}

impl Serialize for ProblemDetails
{
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let field_count = 3 // type + title + status
			+ usize::from(self.detail().is_some())
			+ self.extension_members().count();

		let mut serializer = serializer.serialize_map(Some(field_count))?;

		serializer.serialize_entry("type", self.problem_type())?;
		serializer.serialize_entry("title", self.title())?;
		serializer.serialize_entry("status", &self.status().as_u16())?;

		if let Some(detail) = self.detail() {
			serializer.serialize_entry("detail", detail)?;
		}

		for (key, value) in self.extension_members() {
			if !extension_members::is_reserved(key) {
				serializer.serialize_entry(key, value)?;
			}
		}

		serializer.end()
	}
}

/// The shape [`ProblemDetails`] are deserialized from.
#[derive(Deserialize)]
struct RawProblemDetails
{
	#[serde(rename = "type")]
	problem_type: String,
	title: String,
	status: u16,

	#[serde(default)]
	detail: Option<String>,

	#[serde(flatten)]
	extension_members: Map<String, Value>,
}

/// Error returned when deserializing [`ProblemDetails`] with a `status` outside of
/// [`STATUS_RANGE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("status `{0}` is outside of 100..=599")]
pub struct InvalidStatus(pub u16);

impl TryFrom<RawProblemDetails> for ProblemDetails
{
	type Error = InvalidStatus;

	fn try_from(raw: RawProblemDetails) -> Result<Self, Self::Error>
	{
		let status = Some(raw.status)
			.filter(|status| STATUS_RANGE.contains(status))
			.and_then(|status| http::StatusCode::from_u16(status).ok())
			.ok_or(InvalidStatus(raw.status))?;

		let mut problem_details = Self::new(raw.problem_type, raw.title, status);
		problem_details.detail = raw.detail.map(Cow::Owned);

		for (name, value) in raw.extension_members {
			let _ = problem_details.extension_members.insert(name, value);
		}

		Ok(problem_details)
	}
}

impl<B> From<ProblemDetails> for http::Response<B>
where
	Vec<u8>: Into<B>,
{
	fn from(problem_details: ProblemDetails) -> Self
	{
		(&problem_details).into()
	}
}

impl<B> From<&ProblemDetails> for http::Response<B>
where
	Vec<u8>: Into<B>,
{
	fn from(problem_details: &ProblemDetails) -> Self
	{
		let body = serde_json::to_vec(problem_details).unwrap_or_else(|err| {
			panic!("failed to serialize `ProblemDetails` into JSON: {err}");
		});

		let mut response = http::Response::new(body.into());
		*response.status_mut() = problem_details.status();
		response.headers_mut().insert(
			http::header::CONTENT_TYPE,
			http::HeaderValue::from_static(APPLICATION_PROBLEM_JSON),
		);

		response
	}
}

#[cfg(feature = "axum")]
impl axum_core::response::IntoResponse for ProblemDetails
{
	fn into_response(self) -> axum_core::response::Response
	{
		self.into()
	}
}

#[cfg(feature = "utoipa")]
mod utoipa_impls
{
	use {
		crate::ProblemDetails,
		serde_json::json,
		std::borrow::Cow,
		utoipa::{
			PartialSchema,
			ToSchema,
			openapi::{
				RefOr,
				schema::{self, AdditionalProperties, Object, Schema},
			},
		},
	};

	impl ToSchema for ProblemDetails
	{
		fn name() -> Cow<'static, str>
		{
			Cow::Borrowed("Problem")
		}
	}

	impl PartialSchema for ProblemDetails
	{
		fn schema() -> RefOr<Schema>
		{
			let example = json!({
				"type": "request-validation-failed",
				"title": "Request validation error.",
				"status": 422_u16,
				"errors": [],
			});

			Object::builder()
				.title(Some("Problem"))
				.description(Some("RFC 9457 - Problem Details for HTTP APIs"))
				.schema_type(schema::Type::Object)
				.property("type", str::schema())
				.required("type")
				.property("title", str::schema())
				.required("title")
				.property("status", u16::schema())
				.required("status")
				.property("detail", str::schema())
				.additional_properties(Some(AdditionalProperties::FreeForm(true)))
				.examples([example])
				.into()
		}
	}
}

#[cfg(test)]
mod tests
{
	use {super::*, serde_json::json};

	fn something_wrong() -> ProblemDetails
	{
		let mut problem = ProblemDetails::new(
			"something-wrong",
			"This is an error.",
			http::StatusCode::INTERNAL_SERVER_ERROR,
		)
		.with_detail("something bad");

		problem.add_extension_member("code", &42).unwrap();
		problem.add_extension_member("hint", "try again").unwrap();
		problem
	}

	#[test]
	fn marshal_is_idempotent()
	{
		let problem = something_wrong();
		let options = MarshalOptions::new().uri_template("https://docs/errors/{type}");

		assert_eq!(problem.marshal(&options), problem.marshal(&options));
		let defaults = MarshalOptions::new();

		assert_eq!(problem.marshal(&defaults), problem.marshal(&defaults));
	}

	#[test]
	fn marshal_includes_everything_by_default()
	{
		let marshaled = something_wrong().marshal(&MarshalOptions::new());

		assert_eq!(
			Value::Object(marshaled.body),
			json!({
				"type": "something-wrong",
				"title": "This is an error.",
				"status": 500,
				"detail": "something bad",
				"code": 42,
				"hint": "try again",
			})
		);
		assert!(marshaled.stripped.is_empty());
	}

	#[test]
	fn stripped_keys_are_a_subset()
	{
		let problem = something_wrong();
		let full = problem.marshal(&MarshalOptions::new());
		let stripped = problem.marshal(&MarshalOptions::new().strip_debug(true));

		assert!(stripped.body.keys().all(|key| full.body.contains_key(key)));
		assert_eq!(stripped.body.keys().collect::<Vec<_>>(), ["type", "title", "status"]);
		assert_eq!(
			stripped.stripped,
			[
				(String::from("detail"), json!("something bad")),
				(String::from("code"), json!(42)),
				(String::from("hint"), json!("try again")),
			]
		);
	}

	#[test]
	fn strict_mode_ignores_template()
	{
		let options = MarshalOptions::new()
			.strict(true)
			.uri_template("https://docs/errors/{type}");

		let marshaled = something_wrong().marshal(&options);

		assert_eq!(marshaled.body["type"], json!("about:blank"));
	}

	#[test]
	fn template_and_base_url_substitute_type()
	{
		let problem = something_wrong();
		let template = MarshalOptions::new().uri_template("https://docs/errors/{type}");
		let base_url = MarshalOptions::new().documentation_base_url("https://docs/errors/");
		let empty = MarshalOptions::new().uri_template("");

		assert_eq!(problem.resolved_type(&template), "https://docs/errors/something-wrong");
		assert_eq!(problem.resolved_type(&base_url), "https://docs/errors/something-wrong");
		assert_eq!(problem.resolved_type(&empty), "something-wrong");
	}

	#[test]
	fn legacy_format()
	{
		let options = MarshalOptions::new().wire_format(WireFormat::Legacy);
		let problem = something_wrong();

		assert_eq!(
			Value::Object(problem.marshal(&options).body),
			json!({
				"code": "something-wrong",
				"message": "This is an error.",
				"debug_message": "something bad",
			})
		);

		let stripped = problem.marshal(&options.strip_debug(true));

		assert_eq!(
			Value::Object(stripped.body),
			json!({ "code": "something-wrong", "message": "This is an error." })
		);
		assert_eq!(stripped.stripped, [(String::from("debug_message"), json!("something bad"))]);

		let without_detail = ProblemDetails::new("x", "X", http::StatusCode::BAD_REQUEST)
			.marshal(&MarshalOptions::new().wire_format(WireFormat::Legacy).strip_debug(true));

		assert!(without_detail.stripped.is_empty());
	}

	#[test]
	fn status_stays_in_range()
	{
		let status = http::StatusCode::from_u16(799).unwrap();
		let problem = ProblemDetails::new("x", "X", status);

		assert_eq!(problem.status(), http::StatusCode::INTERNAL_SERVER_ERROR);

		let deserialized = serde_json::from_value::<ProblemDetails>(json!({
			"type": "x",
			"title": "X",
			"status": 700,
		}));

		assert!(deserialized.is_err());
	}

	#[test]
	fn serialize_matches_default_marshal()
	{
		let problem = something_wrong();

		assert_eq!(
			serde_json::to_value(&problem).unwrap(),
			Value::Object(problem.marshal(&MarshalOptions::new()).body)
		);
	}

	#[test]
	fn deserialize_round_trips_extensions()
	{
		let problem = serde_json::from_value::<ProblemDetails>(json!({
			"type": "request-validation-failed",
			"title": "Request validation error.",
			"status": 422,
			"errors": [],
		}))
		.unwrap();

		assert_eq!(problem.status(), http::StatusCode::UNPROCESSABLE_ENTITY);
		assert_eq!(problem.detail(), None);
		assert_eq!(problem.extension_members().get("errors"), Some(&json!([])));
	}

	#[test]
	fn unhandled_problem()
	{
		let problem = ProblemDetails::unhandled("Something went bad");

		assert_eq!(
			serde_json::to_value(&problem).unwrap(),
			json!({
				"type": "unhandled-exception",
				"title": "Unhandled exception occurred.",
				"status": 500,
				"detail": "Something went bad",
			})
		);
	}

	#[test]
	fn into_http_response()
	{
		let response = http::Response::<Vec<u8>>::from(something_wrong());

		assert_eq!(response.status(), http::StatusCode::INTERNAL_SERVER_ERROR);
		assert_eq!(response.headers()[http::header::CONTENT_TYPE], APPLICATION_PROBLEM_JSON);
	}
}
