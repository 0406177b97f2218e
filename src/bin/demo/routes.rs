use {
	axum::{
		Router,
		extract::Path,
		routing::{get, post},
	},
	problem_responder::{
		Config,
		Exception,
		ExceptionHandler,
		Problem,
		http::{
			ProblemLayer,
			catch_panic,
			extract::{Json, Query},
		},
		openapi::ProblemResponses,
		problem_details::{AsProblemDetails, ExtensionMembers},
	},
	serde::{Deserialize, Serialize},
	std::{borrow::Cow, io, sync::Arc},
	thiserror::Error,
	utoipa::{Modify, OpenApi, ToSchema},
};

#[derive(OpenApi)]
#[openapi(
	info(title = "problem-responder demo"),
	paths(get_user, create_user, search, unexpected_error),
)]
struct ApiDoc;

pub fn router(config: &Config, handler: Arc<ExceptionHandler>) -> serde_json::Result<Router>
{
	let mut openapi = ApiDoc::openapi();
	ProblemResponses { generic_defaults: config.generic_openapi_defaults }.modify(&mut openapi);
	let openapi = serde_json::to_value(&openapi)?;

	let mut router = Router::new()
		.route("/users/{id}", get(get_user))
		.route("/users", post(create_user))
		.route("/search", get(search))
		.route("/unexpected-error", get(unexpected_error))
		.route("/panic", get(panic))
		.route("/not-allowed", post(|| async { "you found it" }))
		.route("/openapi.json", get(move || async move { Json(openapi) }))
		.layer(catch_panic::layer());

	if let Some(cors) = &config.cors {
		router = router.layer(cors.layer());
	}

	Ok(router.layer(ProblemLayer::new(handler)))
}

#[derive(Debug, Serialize, ToSchema)]
struct User
{
	id: u64,
	name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
struct NewUser
{
	name: String,
}

#[derive(Debug, Deserialize)]
struct SearchParams
{
	name: String,
}

#[derive(Debug, Error)]
#[error("there is no user with ID {user_id}")]
struct UserNotFoundError
{
	user_id: u64,
}

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
		if let Err(error) = extension_members.add("user_id", &self.user_id) {
			warn!(%error, "failed to add extension member");
		}
	}
}

/// Only the user with ID 1 exists.
#[utoipa::path(
	get,
	path = "/users/{id}",
	params(("id" = u64, Path, description = "the user's ID")),
	responses((status = 200, body = User)),
)]
async fn get_user(Path(user_id): Path<u64>) -> Result<Json<User>, Problem>
{
	match user_id {
		1 => Ok(Json(User { id: 1, name: String::from("alice") })),
		_ => Err(Problem::from(UserNotFoundError { user_id })),
	}
}

#[utoipa::path(
	post,
	path = "/users",
	request_body = NewUser,
	responses((status = 201, body = User)),
)]
async fn create_user(Json(new_user): Json<NewUser>) -> (http::StatusCode, Json<User>)
{
	(http::StatusCode::CREATED, Json(User { id: 2, name: new_user.name }))
}

#[utoipa::path(
	get,
	path = "/search",
	params(("name" = String, Query, description = "required")),
	responses((status = 200, body = [User])),
)]
async fn search(Query(params): Query<SearchParams>) -> Json<Vec<User>>
{
	Json(vec![User { id: 1, name: params.name }])
}

#[utoipa::path(get, path = "/unexpected-error", responses((status = 200)))]
async fn unexpected_error() -> Result<&'static str, Exception>
{
	Err(Exception::new(io::Error::other("the database went away")))
}

async fn panic() -> &'static str
{
	panic!("something went very wrong");
}
