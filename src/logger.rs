//! The logging handle used by the [`ExceptionHandler`].
//!
//! [`ExceptionHandler`]: crate::ExceptionHandler

use {
	crate::{exception::Exception, registry::TypeTag},
	serde_json::Value,
	std::{error::Error, fmt},
};

/// A sink for the records the engine emits.
///
/// The default is [`TracingLogger`]. Implementations must not panic; if they do anyway, the
/// response is still returned.
pub trait Logger: fmt::Debug + Send + Sync
{
	/// A server error (status >= 500) is about to be returned.
	fn exception(&self, title: &str, exception: &Exception);

	/// A conversion handler, hook, or wrapper failed while handling `exception`.
	fn handler_failed(&self, stage: &str, failure: &(dyn Error + 'static), exception: &Exception);

	/// Debug members are being removed from a response.
	fn stripping_debug(&self, exception: &Exception);

	/// One member was removed from a response.
	fn removed(&self, key: &str, value: &Value);
}

/// Emits everything through [`tracing`].
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger
{
	fn exception(&self, title: &str, exception: &Exception)
	{
		error!(
			exception.name = exception.type_name(),
			error = exception.as_error() as &dyn Error,
			backtrace = %exception.backtrace(),
			"{title}",
		);
	}

	fn handler_failed(&self, stage: &str, failure: &(dyn Error + 'static), exception: &Exception)
	{
		error!(
			%stage,
			exception.name = exception.type_name(),
			error = failure,
			"failed to handle exception",
		);
	}

	fn stripping_debug(&self, exception: &Exception)
	{
		debug!(
			exception.name = exception.type_name(),
			"Stripping debug information from exception.",
		);
	}

	fn removed(&self, key: &str, value: &Value)
	{
		debug!("Removed {key}: {value}");
	}
}

/// Describes a handler by its tag, for [`Logger::handler_failed()`].
pub(crate) fn handler_stage(tag: &TypeTag) -> String
{
	format!("handler `{}`", tag.name())
}
