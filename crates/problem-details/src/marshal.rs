//! Turning [`ProblemDetails`] into wire-format JSON objects.
//!
//! [`ProblemDetails`]: crate::ProblemDetails

use {
	serde::Deserialize,
	serde_json::{Map, Value},
	std::sync::Arc,
};

/// The placeholder replaced by the problem's type token in documentation URI templates.
pub const TYPE_PLACEHOLDER: &str = "{type}";

/// The `type` emitted in strict RFC 9457 mode.
pub const ABOUT_BLANK: &str = "about:blank";

/// The JSON shape produced by [`ProblemDetails::marshal()`].
///
/// [`ProblemDetails::marshal()`]: crate::ProblemDetails::marshal
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WireFormat
{
	/// `type`, `title`, `status`, `detail` and extension members.
	#[default]
	Rfc9457,

	/// The pre-RFC shape: `code`, `message`, `debug_message`.
	///
	/// Extension members are not part of this shape.
	Legacy,
}

/// Options for [`ProblemDetails::marshal()`].
///
/// [`ProblemDetails::marshal()`]: crate::ProblemDetails::marshal
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MarshalOptions
{
	strip_debug: bool,
	strict: bool,
	uri_template: Option<Arc<str>>,
	wire_format: WireFormat,
}

impl MarshalOptions
{
	/// Creates default options: nothing stripped, not strict, no template, RFC 9457 format.
	pub fn new() -> Self
	{
		Self::default()
	}

	/// Only keep the public members (`type`, `title`, `status`).
	pub fn strip_debug(mut self, strip_debug: bool) -> Self
	{
		self.strip_debug = strip_debug;
		self
	}

	/// Always emit `about:blank` as the `type`.
	pub fn strict(mut self, strict: bool) -> Self
	{
		self.strict = strict;
		self
	}

	/// Emit `type` as `template` with [`TYPE_PLACEHOLDER`] replaced by the type token.
	///
	/// An empty template disables substitution.
	pub fn uri_template(mut self, template: impl Into<Arc<str>>) -> Self
	{
		let template = template.into();
		self.uri_template = (!template.is_empty()).then_some(template);
		self
	}

	/// Shorthand for a [`uri_template()`](Self::uri_template) of `{base_url}{type}`.
	pub fn documentation_base_url(self, base_url: &str) -> Self
	{
		if base_url.is_empty() {
			return self;
		}

		self.uri_template(format!("{base_url}{TYPE_PLACEHOLDER}"))
	}

	/// Selects the JSON shape.
	pub fn wire_format(mut self, wire_format: WireFormat) -> Self
	{
		self.wire_format = wire_format;
		self
	}

	/// Whether debug members are stripped.
	pub fn strips_debug(&self) -> bool
	{
		self.strip_debug
	}

	/// Whether strict RFC 9457 mode is enabled.
	pub fn is_strict(&self) -> bool
	{
		self.strict
	}

	/// The documentation URI template, if any.
	pub fn template(&self) -> Option<&str>
	{
		self.uri_template.as_deref()
	}

	/// The selected JSON shape.
	pub fn format(&self) -> WireFormat
	{
		self.wire_format
	}
}

/// The output of [`ProblemDetails::marshal()`].
///
/// [`ProblemDetails::marshal()`]: crate::ProblemDetails::marshal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marshaled
{
	/// The JSON object to send.
	pub body: Map<String, Value>,

	/// Members that were removed because of debug stripping, in the order they would have been
	/// emitted.
	///
	/// Callers are expected to log these instead of dropping them silently.
	pub stripped: Vec<(String, Value)>,
}
