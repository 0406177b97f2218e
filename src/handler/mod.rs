//! The [`ExceptionHandler`] turns exceptions into problem responses.

use {
	crate::{
		config::{Config, ConfigError, CorsConfig},
		exception::{BoxError, Exception, Panicked},
		hooks::{CorsPostHook, PostHook, PreHook},
		logger::{self, Logger, TracingLogger},
		registry::{Handled, HandlerRegistry, TypeTag},
		response::ProblemResponse,
		wrappers::{ProblemConstructor, UnhandledWrappers},
	},
	http::{HeaderMap, HeaderValue, StatusCode, header, request},
	problem_details::{
		ExtensionMembers,
		MarshalOptions,
		Marshaled,
		ProblemDetails,
		StatusMapper,
		WireFormat,
	},
	std::{
		collections::BTreeSet,
		error::Error,
		panic::{self, AssertUnwindSafe},
		sync::Arc,
	},
};

mod builtin;

pub use self::builtin::{
	VALIDATION_TITLE,
	VALIDATION_TYPE,
	http_exception_handler,
	request_validation_handler,
};

/// Converts exceptions into [`ProblemResponse`]s.
///
/// Everything is configured once, at construction; afterwards the handler is only read, so it can
/// be shared between requests freely. Mutating methods take `&mut self` and therefore cannot run
/// while the handler is shared.
#[derive(Debug)]
pub struct ExceptionHandler
{
	logger: Arc<dyn Logger>,
	unhandled_wrappers: UnhandledWrappers,
	handlers: HandlerRegistry,

	#[debug("{}", pre_hooks.len())]
	pre_hooks: Vec<Arc<dyn PreHook>>,

	#[debug("{}", post_hooks.len())]
	post_hooks: Vec<Arc<dyn PostHook>>,

	marshal_options: MarshalOptions,
	strip_debug_codes: BTreeSet<StatusCode>,
	status_mapper: StatusMapper,
}

#[bon::bon]
impl ExceptionHandler
{
	/// Creates a new [`ExceptionHandler`].
	///
	/// The built-in handlers for [`HttpException`]s and [`RequestValidationError`]s are registered
	/// after `handlers` unless `builtin_handlers` is `false`. If `cors` is set, a
	/// [`CorsPostHook`] is inserted before all other post-hooks.
	///
	/// [`HttpException`]: crate::HttpException
	/// [`RequestValidationError`]: crate::RequestValidationError
	#[builder]
	pub fn new(
		#[builder(default = default_logger())] logger: Arc<dyn Logger>,
		#[builder(default)] unhandled_wrappers: UnhandledWrappers,
		#[builder(default)] handlers: HandlerRegistry,
		#[builder(default = true)] builtin_handlers: bool,
		#[builder(default)] pre_hooks: Vec<Arc<dyn PreHook>>,
		#[builder(default)] post_hooks: Vec<Arc<dyn PostHook>>,
		cors: Option<CorsConfig>,
		#[builder(default)] strip_debug: bool,
		#[builder(default)] strip_debug_codes: Vec<StatusCode>,
		#[builder(default)] strict_rfc9457: bool,
		#[builder(into)] documentation_uri_template: Option<String>,
		#[builder(default)] wire_format: WireFormat,
		#[builder(default)] status_mapper: StatusMapper,
	) -> Self
	{
		let mut handlers = handlers;
		let mut post_hooks = post_hooks;

		if builtin_handlers {
			handlers
				.register(TypeTag::http(), http_exception_handler)
				.register(TypeTag::validation(), request_validation_handler);
		}

		if let Some(cors) = cors {
			post_hooks.insert(0, Arc::new(CorsPostHook::new(&cors)));
		}

		let marshal_options = MarshalOptions::new()
			.strip_debug(strip_debug)
			.strict(strict_rfc9457)
			.uri_template(documentation_uri_template.unwrap_or_default())
			.wire_format(wire_format);

		Self {
			logger,
			unhandled_wrappers,
			handlers,
			pre_hooks,
			post_hooks,
			marshal_options,
			strip_debug_codes: strip_debug_codes.into_iter().collect(),
			status_mapper,
		}
	}

	/// Creates a new [`ExceptionHandler`] from configuration.
	///
	/// Fails if the configuration is invalid.
	pub fn from_config(config: &Config) -> Result<Self, ConfigError>
	{
		let unhandled_wrappers = config.unhandled_wrappers()?;
		let strip_debug_codes = config.strip_debug_codes()?;
		let strip_extras = config.strip_extras.post_hook()?;

		if let Some(cors) = &config.cors {
			cors.validate()?;
		}

		let handler = Self::builder()
			.unhandled_wrappers(unhandled_wrappers)
			.maybe_cors(config.cors.clone())
			.post_hooks(vec![Arc::new(strip_extras) as Arc<dyn PostHook>])
			.strip_debug(config.strip_debug)
			.strip_debug_codes(strip_debug_codes)
			.strict_rfc9457(config.strict_rfc9457)
			.maybe_documentation_uri_template(config.documentation_uri_template())
			.wire_format(config.wire_format)
			.status_mapper(StatusMapper::new(config.phrase_table))
			.build();

		Ok(handler)
	}
}

impl ExceptionHandler
{
	/// Returns the logger everything is reported to.
	pub fn logger(&self) -> &dyn Logger
	{
		&*self.logger
	}

	/// Returns the wrapper table.
	pub fn unhandled_wrappers(&self) -> &UnhandledWrappers
	{
		&self.unhandled_wrappers
	}

	/// Returns the registered conversion handlers, built-ins included.
	pub fn handlers(&self) -> &HandlerRegistry
	{
		&self.handlers
	}

	/// Returns the options used to serialize problems.
	pub fn marshal_options(&self) -> &MarshalOptions
	{
		&self.marshal_options
	}

	/// Returns the mapper used for HTTP exceptions.
	pub fn status_mapper(&self) -> &StatusMapper
	{
		&self.status_mapper
	}

	/// Appends a conversion handler.
	pub fn register_handler<F>(&mut self, tag: TypeTag, handler: F) -> &mut Self
	where
		F: Fn(&Self, &request::Parts, &Exception) -> Result<Handled, BoxError>
			+ Send
			+ Sync
			+ 'static,
	{
		self.handlers.register(tag, handler);
		self
	}

	/// Appends a pre-hook.
	pub fn add_pre_hook<H>(&mut self, hook: H) -> &mut Self
	where
		H: PreHook + 'static,
	{
		self.pre_hooks.push(Arc::new(hook));
		self
	}

	/// Appends a post-hook.
	pub fn add_post_hook<H>(&mut self, hook: H) -> &mut Self
	where
		H: PostHook + 'static,
	{
		self.post_hooks.push(Arc::new(hook));
		self
	}

	/// The problem used when nothing more specific applies.
	///
	/// This is built by the `default` wrapper, else the `500` wrapper, else it is the generic
	/// "Unhandled exception occurred." problem. Its detail is the exception's message.
	pub fn fallback_problem(&self, exception: &Exception) -> ProblemDetails
	{
		let detail = exception.to_string();

		let Some(wrapper) = self.unhandled_wrappers.fallback() else {
			return ProblemDetails::unhandled(detail);
		};

		self.guarded("unhandled wrapper", exception, || {
			wrapper.construct(Some(detail.clone().into()), ExtensionMembers::new())
		})
		.unwrap_or_else(|| ProblemDetails::unhandled(detail))
	}

	/// Selects a conversion handler for `exception` and runs it.
	///
	/// Only the first handler whose tag matches is run. If it passes, fails, or panics, the
	/// fallback problem is used. Domain problems always override whatever the handler produced.
	pub fn dispatch(
		&self,
		request: &request::Parts,
		exception: &Exception,
	) -> (HeaderMap, ProblemDetails)
	{
		let mut problem = self.fallback_problem(exception);
		let mut headers = HeaderMap::new();

		let found = self
			.guarded("type tag", exception, || self.handlers.find(exception))
			.flatten();

		if let Some((tag, handler)) = found {
			let stage = logger::handler_stage(tag);

			match self.guarded(&stage, exception, || (**handler)(self, request, exception)) {
				Some(Ok(Handled { headers: extra_headers, problem: handled })) => {
					headers.extend(extra_headers);

					if let Some(handled) = handled {
						problem = handled;
					}
				},
				Some(Err(error)) => {
					self.report_failure(&stage, &*error, exception);
				},
				None => {},
			}
		}

		if let Some(domain_problem) = exception.problem() {
			problem = domain_problem.details().clone();
		}

		(headers, problem)
	}

	/// Turns `exception` into the response sent to the client.
	///
	/// This never panics because of user-supplied handlers, hooks, wrappers, or loggers.
	pub fn handle(&self, request: &request::Parts, exception: &Exception) -> ProblemResponse
	{
		for pre_hook in &self.pre_hooks {
			self.guarded("pre-hook", exception, || pre_hook.run(request, exception));
		}

		let (headers, problem) = self.dispatch(request, exception);

		if problem.status().is_server_error() {
			self.log(|logger| logger.exception(problem.title(), exception));
		}

		let strip_debug = self.marshal_options.strips_debug()
			|| self.strip_debug_codes.contains(&problem.status());

		let Marshaled { body, stripped } =
			problem.marshal(&self.marshal_options.clone().strip_debug(strip_debug));

		if !stripped.is_empty() {
			self.log(|logger| logger.stripping_debug(exception));

			for (key, value) in &stripped {
				self.log(|logger| logger.removed(key, value));
			}
		}

		let mut response = ProblemResponse::new(problem.status(), body);
		response.headers = headers;
		response.headers.insert(
			header::CONTENT_TYPE,
			HeaderValue::from_static(problem_details::APPLICATION_PROBLEM_JSON),
		);

		for post_hook in &self.post_hooks {
			let previous = response.clone();

			response = self
				.guarded("post-hook", exception, || post_hook.run(request, response))
				.unwrap_or(previous);
		}

		response
	}

	/// Runs `call`, reporting a panic as a failure of `stage`.
	fn guarded<T>(&self, stage: &str, exception: &Exception, call: impl FnOnce() -> T) -> Option<T>
	{
		match panic::catch_unwind(AssertUnwindSafe(call)) {
			Ok(value) => Some(value),
			Err(payload) => {
				self.report_failure(stage, &Panicked::from_payload(payload), exception);
				None
			},
		}
	}

	fn report_failure(&self, stage: &str, failure: &(dyn Error + 'static), exception: &Exception)
	{
		self.log(|logger| logger.handler_failed(stage, failure, exception));
	}

	/// Runs a logger call, swallowing panics.
	fn log(&self, call: impl FnOnce(&dyn Logger))
	{
		let logger = &*self.logger;
		let _ = panic::catch_unwind(AssertUnwindSafe(|| call(logger)));
	}
}

fn default_logger() -> Arc<dyn Logger>
{
	Arc::new(TracingLogger)
}
