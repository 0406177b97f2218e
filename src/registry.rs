//! Conversion handlers and the tags they are registered under.
//!
//! A [`HandlerRegistry`] is an ordered list of `(TypeTag, handler)` pairs. Dispatch walks it in
//! registration order and stops at the first tag the exception satisfies, so more specific tags
//! must be registered before more general ones.

use {
	crate::{
		ExceptionHandler,
		exception::{BoxError, Exception, ExceptionKind},
	},
	http::{HeaderMap, StatusCode, request},
	problem_details::ProblemDetails,
	std::{any, borrow::Cow, error::Error, sync::Arc},
};

/// A capability check deciding whether a handler applies to an exception.
///
/// Tags replace "is an instance of" checks: [`TypeTag::http()`] matches every [`HttpException`],
/// while [`TypeTag::http_status()`] only matches those with one particular status.
///
/// [`HttpException`]: crate::HttpException
#[derive(Clone, Debug)]
pub struct TypeTag
{
	name: Cow<'static, str>,

	#[debug(ignore)]
	matches: Arc<dyn Fn(&Exception) -> bool + Send + Sync>,
}

impl TypeTag
{
	/// A tag with a custom capability check.
	pub fn matching<F>(name: impl Into<Cow<'static, str>>, matches: F) -> Self
	where
		F: Fn(&Exception) -> bool + Send + Sync + 'static,
	{
		Self { name: name.into(), matches: Arc::new(matches) }
	}

	/// Matches every exception.
	pub fn any() -> Self
	{
		Self::matching("any", |_| true)
	}

	/// Matches exceptions that are (or were created from) an `E`.
	pub fn of<E>() -> Self
	where
		E: Error + 'static,
	{
		Self::matching(any::type_name::<E>(), Exception::is::<E>)
	}

	/// Matches every HTTP exception.
	pub fn http() -> Self
	{
		Self::matching("http", |exception| exception.http().is_some())
	}

	/// Matches HTTP exceptions with the given status.
	pub fn http_status(status: StatusCode) -> Self
	{
		Self::matching(format!("http {}", status.as_u16()), move |exception| {
			exception.http().is_some_and(|http| http.status() == status)
		})
	}

	/// Matches request validation errors.
	pub fn validation() -> Self
	{
		Self::matching("validation", |exception| exception.validation().is_some())
	}

	/// Matches domain problems.
	pub fn problem() -> Self
	{
		Self::matching("problem", |exception| exception.problem().is_some())
	}

	/// Matches errors nothing else recognized.
	pub fn unclassified() -> Self
	{
		Self::matching("unclassified", |exception| {
			matches!(exception.kind(), ExceptionKind::Other(_))
		})
	}

	/// Returns the name this tag is logged under.
	pub fn name(&self) -> &str
	{
		&self.name
	}

	/// Whether `exception` satisfies this tag.
	pub fn matches(&self, exception: &Exception) -> bool
	{
		(self.matches)(exception)
	}
}

/// What a conversion handler produced.
#[derive(Debug, Default, Clone)]
pub struct Handled
{
	/// Headers to add to the response.
	pub headers: HeaderMap,

	/// The problem to respond with.
	///
	/// `None` means the handler passed, and the fallback problem is used instead.
	pub problem: Option<ProblemDetails>,
}

impl Handled
{
	/// The handler produced `problem`.
	pub fn problem(problem: ProblemDetails) -> Self
	{
		Self { headers: HeaderMap::new(), problem: Some(problem) }
	}

	/// The handler declined to produce a problem.
	pub fn pass() -> Self
	{
		Self::default()
	}

	/// Adds headers to the response.
	pub fn with_headers(mut self, headers: HeaderMap) -> Self
	{
		self.headers.extend(headers);
		self
	}
}

impl From<ProblemDetails> for Handled
{
	fn from(problem: ProblemDetails) -> Self
	{
		Self::problem(problem)
	}
}

/// A conversion handler.
///
/// Handlers receive the [`ExceptionHandler`] they run in, so they can consult its wrapper table
/// and status mapper.
pub type HandlerFn = Arc<
	dyn Fn(&ExceptionHandler, &request::Parts, &Exception) -> Result<Handled, BoxError>
		+ Send
		+ Sync,
>;

/// An ordered list of conversion handlers.
#[derive(Clone, Default, Debug)]
pub struct HandlerRegistry
{
	#[debug("{:?}", handlers.iter().map(|(tag, _)| tag.name()).collect::<Vec<_>>())]
	handlers: Vec<(TypeTag, HandlerFn)>,
}

impl HandlerRegistry
{
	/// Creates an empty registry.
	pub fn new() -> Self
	{
		Self::default()
	}

	/// Appends a handler.
	pub fn register<F>(&mut self, tag: TypeTag, handler: F) -> &mut Self
	where
		F: Fn(&ExceptionHandler, &request::Parts, &Exception) -> Result<Handled, BoxError>
			+ Send
			+ Sync
			+ 'static,
	{
		self.handlers.push((tag, Arc::new(handler)));
		self
	}

	/// Builder-style version of [`register()`](Self::register).
	pub fn with<F>(mut self, tag: TypeTag, handler: F) -> Self
	where
		F: Fn(&ExceptionHandler, &request::Parts, &Exception) -> Result<Handled, BoxError>
			+ Send
			+ Sync
			+ 'static,
	{
		self.register(tag, handler);
		self
	}

	/// Returns the first handler whose tag the exception satisfies.
	pub fn find(&self, exception: &Exception) -> Option<(&TypeTag, &HandlerFn)>
	{
		self.handlers
			.iter()
			.find(|(tag, _)| tag.matches(exception))
			.map(|(tag, handler)| (tag, handler))
	}

	/// Returns the number of registered handlers.
	pub fn len(&self) -> usize
	{
		self.handlers.len()
	}

	/// Whether no handlers are registered.
	pub fn is_empty(&self) -> bool
	{
		self.handlers.is_empty()
	}
}

#[cfg(test)]
mod tests
{
	use {
		super::*,
		crate::{
			HttpException,
			testing::{Result, assert, assert_eq},
		},
	};

	#[test]
	fn first_match_wins() -> Result
	{
		let registry = HandlerRegistry::new()
			.with(TypeTag::http_status(StatusCode::NOT_FOUND), |_, _, _| Ok(Handled::pass()))
			.with(TypeTag::http(), |_, _, _| Ok(Handled::pass()))
			.with(TypeTag::any(), |_, _, _| Ok(Handled::pass()));

		let not_found = Exception::new(HttpException::new(StatusCode::NOT_FOUND));
		let conflict = Exception::new(HttpException::new(StatusCode::CONFLICT));
		let other = Exception::new(std::fmt::Error);

		assert_eq!(registry.find(&not_found).map(|(tag, _)| tag.name()), Some("http 404"));
		assert_eq!(registry.find(&conflict).map(|(tag, _)| tag.name()), Some("http"));
		assert_eq!(registry.find(&other).map(|(tag, _)| tag.name()), Some("any"));
		assert_eq!(registry.len(), 3);

		Ok(())
	}

	#[test]
	fn concrete_type_tags() -> Result
	{
		let tag = TypeTag::of::<std::fmt::Error>();

		assert!(tag.matches(&Exception::new(std::fmt::Error)));
		assert!(!tag.matches(&Exception::new(HttpException::new(StatusCode::NOT_FOUND))));
		assert!(TypeTag::unclassified().matches(&Exception::new(std::fmt::Error)));

		Ok(())
	}
}
