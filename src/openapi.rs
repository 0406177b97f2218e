//! [OpenAPI] schemas for problem responses.
//!
//! [`ProblemResponses`] is a [`Modify`] implementation that registers the `Problem` and
//! `HTTPValidationError` schemas and, optionally, documents generic `4XX` / `5XX` responses on
//! every operation.
//!
//! [OpenAPI]: https://spec.openapis.org/oas/latest.html

use {
	problem_details::{APPLICATION_PROBLEM_JSON, ProblemDetails},
	serde_json::json,
	utoipa::{
		Modify,
		PartialSchema,
		ToSchema,
		openapi::{
			ContentBuilder,
			OpenApi,
			Ref,
			RefOr,
			ResponseBuilder,
			path::{Operation, PathItem},
			schema::{AdditionalProperties, ArrayBuilder, ObjectBuilder, OneOfBuilder, Schema, Type},
		},
	},
};

/// The name of the schema for request validation problems.
pub const VALIDATION_SCHEMA: &str = "HTTPValidationError";

/// The name of the schema for a single validation issue.
pub const VALIDATION_ISSUE_SCHEMA: &str = "ValidationError";

/// Adds problem schemas and responses to an OpenAPI document.
#[derive(Debug, Clone, Copy)]
pub struct ProblemResponses
{
	/// Whether to add `4XX` and `5XX` responses to every operation.
	pub generic_defaults: bool,
}

impl Default for ProblemResponses
{
	fn default() -> Self
	{
		Self { generic_defaults: true }
	}
}

impl Modify for ProblemResponses
{
	fn modify(&self, openapi: &mut OpenApi)
	{
		let schemas = &mut openapi.components.get_or_insert_with(Default::default).schemas;

		schemas.insert(ProblemDetails::name().into_owned(), ProblemDetails::schema());
		schemas.insert(VALIDATION_ISSUE_SCHEMA.to_owned(), validation_issue_schema());
		schemas.insert(VALIDATION_SCHEMA.to_owned(), validation_error_schema());

		if !self.generic_defaults {
			return;
		}

		for operation in openapi.paths.paths.values_mut().flat_map(operations_mut) {
			let responses = &mut operation.responses.responses;

			let client_error = generic_response("Client Error", "client-error-type", 400);
			let server_error = generic_response("Server Error", "server-error-type", 500);

			responses.insert(String::from("4XX"), client_error);
			responses.insert(String::from("5XX"), server_error);
		}
	}
}

fn operations_mut(item: &mut PathItem) -> impl Iterator<Item = &mut Operation>
{
	[
		&mut item.get,
		&mut item.put,
		&mut item.post,
		&mut item.delete,
		&mut item.options,
		&mut item.head,
		&mut item.patch,
		&mut item.trace,
	]
	.into_iter()
	.filter_map(Option::as_mut)
}

fn generic_response(
	description: &str,
	problem_type: &str,
	status: u16,
) -> RefOr<utoipa::openapi::Response>
{
	let example = json!({
		"type": problem_type,
		"title": "User facing error message.",
		"status": status,
		"detail": "Additional error context.",
	});

	let content = ContentBuilder::new()
		.schema(Some(Ref::from_schema_name(ProblemDetails::name())))
		.example(Some(example))
		.build();

	ResponseBuilder::new()
		.description(description)
		.content(APPLICATION_PROBLEM_JSON, content)
		.build()
		.into()
}

fn validation_issue_schema() -> RefOr<Schema>
{
	let location = OneOfBuilder::new()
		.item(str::schema())
		.item(u64::schema());

	ObjectBuilder::new()
		.title(Some("Validation Error"))
		.schema_type(Type::Object)
		.property("type", str::schema())
		.required("type")
		.property("loc", ArrayBuilder::new().items(location))
		.required("loc")
		.property("msg", str::schema())
		.required("msg")
		.property("input", ObjectBuilder::new())
		.into()
}

fn validation_error_schema() -> RefOr<Schema>
{
	let example = json!({
		"type": crate::handler::VALIDATION_TYPE,
		"title": crate::handler::VALIDATION_TITLE,
		"status": 422,
		"errors": [{
			"type": "missing",
			"loc": ["query", "name"],
			"msg": "Field required",
			"input": null,
		}],
	});

	ObjectBuilder::new()
		.title(Some("Request Validation Problem"))
		.schema_type(Type::Object)
		.property("type", str::schema())
		.required("type")
		.property("title", str::schema())
		.required("title")
		.property("status", u16::schema())
		.required("status")
		.property(
			"errors",
			ArrayBuilder::new().items(Ref::from_schema_name(VALIDATION_ISSUE_SCHEMA)),
		)
		.additional_properties(Some(AdditionalProperties::FreeForm(true)))
		.examples([example])
		.into()
}
