//! Overrides for the problems the engine builds on its own.
//!
//! Integrators can replace the generic fallback problem (key `default`) or the problem built for a
//! particular status code (key `"404"`, `"422"`, ...) without touching the handler registry.

use {
	http::StatusCode,
	problem_details::{ExtensionMembers, ProblemDetails, STATUS_RANGE},
	serde::Deserialize,
	std::{borrow::Cow, collections::BTreeMap, fmt, str::FromStr, sync::Arc},
	thiserror::Error,
};

/// Lookup key of the [`UnhandledWrappers`] table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WrapperKey
{
	/// The literal `default`.
	Default,

	/// A stringified status code.
	Status(StatusCode),
}

/// Error returned when parsing an invalid [`WrapperKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{0}` is neither `default` nor a valid HTTP status code")]
pub struct InvalidWrapperKey(pub String);

impl FromStr for WrapperKey
{
	type Err = InvalidWrapperKey;

	fn from_str(key: &str) -> Result<Self, Self::Err>
	{
		if key == "default" {
			return Ok(Self::Default);
		}

		key.parse::<u16>()
			.ok()
			.filter(|status| STATUS_RANGE.contains(status))
			.and_then(|status| StatusCode::from_u16(status).ok())
			.map(Self::Status)
			.ok_or_else(|| InvalidWrapperKey(key.to_owned()))
	}
}

impl fmt::Display for WrapperKey
{
	fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result
	{
		match self {
			Self::Default => fmt.write_str("default"),
			Self::Status(status) => write!(fmt, "{}", status.as_u16()),
		}
	}
}

impl From<StatusCode> for WrapperKey
{
	fn from(status: StatusCode) -> Self
	{
		Self::Status(status)
	}
}

/// Something that builds a [`ProblemDetails`] from a detail string and extension members.
///
/// Closures with the right signature implement this trait.
pub trait ProblemConstructor: Send + Sync
{
	/// Builds the problem. `detail` and `extension_members` come from the exception being handled.
	fn construct(
		&self,
		detail: Option<Cow<'static, str>>,
		extension_members: ExtensionMembers,
	) -> ProblemDetails;
}

impl<F> ProblemConstructor for F
where
	F: Fn(Option<Cow<'static, str>>, ExtensionMembers) -> ProblemDetails + Send + Sync,
{
	fn construct(
		&self,
		detail: Option<Cow<'static, str>>,
		extension_members: ExtensionMembers,
	) -> ProblemDetails
	{
		self(detail, extension_members)
	}
}

/// A fixed `type`, `title` and `status`, as found in configuration files.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProblemTemplate
{
	/// The problem type token.
	#[serde(rename = "type")]
	pub problem_type: Cow<'static, str>,

	/// The problem title.
	pub title: Cow<'static, str>,

	/// The response status; must be in `100..=599`.
	#[serde(with = "status_code")]
	pub status: StatusCode,
}

impl ProblemTemplate
{
	/// Creates a new [`ProblemTemplate`].
	pub fn new(
		problem_type: impl Into<Cow<'static, str>>,
		title: impl Into<Cow<'static, str>>,
		status: StatusCode,
	) -> Self
	{
		Self { problem_type: problem_type.into(), title: title.into(), status }
	}
}

impl ProblemConstructor for ProblemTemplate
{
	fn construct(
		&self,
		detail: Option<Cow<'static, str>>,
		extension_members: ExtensionMembers,
	) -> ProblemDetails
	{
		ProblemDetails::new(self.problem_type.clone(), self.title.clone(), self.status)
			.with_optional_detail(detail)
			.with_extension_members(extension_members)
	}
}

mod status_code
{
	use {
		http::StatusCode,
		problem_details::STATUS_RANGE,
		serde::{Deserialize, Deserializer, de},
	};

	pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<StatusCode, D::Error>
	where
		D: Deserializer<'de>,
	{
		let status = u16::deserialize(deserializer)?;

		if !STATUS_RANGE.contains(&status) {
			return Err(de::Error::custom(format_args!(
				"status `{status}` is outside of 100..=599"
			)));
		}

		StatusCode::from_u16(status).map_err(de::Error::custom)
	}
}

/// The table of problem constructors keyed by [`WrapperKey`].
#[derive(Clone, Default, Debug)]
pub struct UnhandledWrappers
{
	#[debug("{:?}", wrappers.keys().collect::<Vec<_>>())]
	wrappers: BTreeMap<WrapperKey, Arc<dyn ProblemConstructor>>,
}

impl UnhandledWrappers
{
	/// Creates an empty table.
	pub fn new() -> Self
	{
		Self::default()
	}

	/// Registers a constructor, replacing any previous one for the same key.
	pub fn insert<C>(&mut self, key: impl Into<WrapperKey>, constructor: C) -> &mut Self
	where
		C: ProblemConstructor + 'static,
	{
		self.wrappers.insert(key.into(), Arc::new(constructor));
		self
	}

	/// Builder-style version of [`insert()`](Self::insert).
	pub fn with<C>(mut self, key: impl Into<WrapperKey>, constructor: C) -> Self
	where
		C: ProblemConstructor + 'static,
	{
		self.insert(key, constructor);
		self
	}

	/// Removes the constructor registered for `key`, if any.
	pub fn remove(&mut self, key: impl Into<WrapperKey>) -> Option<Arc<dyn ProblemConstructor>>
	{
		self.wrappers.remove(&key.into())
	}

	/// Exact lookup.
	pub fn get(&self, key: impl Into<WrapperKey>) -> Option<&dyn ProblemConstructor>
	{
		self.wrappers.get(&key.into()).map(|constructor| &**constructor)
	}

	/// The constructor for unclassified exceptions: `default`, then `500`.
	pub fn fallback(&self) -> Option<&dyn ProblemConstructor>
	{
		self.get(WrapperKey::Default)
			.or_else(|| self.get(StatusCode::INTERNAL_SERVER_ERROR))
	}

	/// Returns the number of registered constructors.
	pub fn len(&self) -> usize
	{
		self.wrappers.len()
	}

	/// Whether the table is empty.
	pub fn is_empty(&self) -> bool
	{
		self.wrappers.is_empty()
	}
}

impl FromIterator<(WrapperKey, ProblemTemplate)> for UnhandledWrappers
{
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = (WrapperKey, ProblemTemplate)>,
	{
		iter.into_iter()
			.fold(Self::new(), |wrappers, (key, template)| wrappers.with(key, template))
	}
}

#[cfg(test)]
mod tests
{
	use {
		super::*,
		crate::testing::{Result, assert, assert_eq},
	};

	fn custom_not_found() -> ProblemTemplate
	{
		ProblemTemplate::new("custom-not-found", "Endpoint not available.", StatusCode::NOT_FOUND)
	}

	#[test]
	fn parse_keys() -> Result
	{
		assert_eq!("default".parse::<WrapperKey>()?, WrapperKey::Default);
		assert_eq!("404".parse::<WrapperKey>()?, WrapperKey::Status(StatusCode::NOT_FOUND));
		assert!("teapot".parse::<WrapperKey>().is_err());
		assert!("1000".parse::<WrapperKey>().is_err());
		assert!("700".parse::<WrapperKey>().is_err());
		assert!("99".parse::<WrapperKey>().is_err());
		assert_eq!(
			"599".parse::<WrapperKey>()?,
			WrapperKey::Status(StatusCode::from_u16(599)?)
		);
		assert_eq!(WrapperKey::Status(StatusCode::NOT_FOUND).to_string(), "404");

		Ok(())
	}

	#[test]
	fn fallback_checks_default_then_500() -> Result
	{
		let mut wrappers = UnhandledWrappers::new().with(
			StatusCode::INTERNAL_SERVER_ERROR,
			|detail: Option<Cow<'static, str>>, _: ExtensionMembers| {
				ProblemDetails::new("five-hundred", "Broken.", StatusCode::INTERNAL_SERVER_ERROR)
					.with_optional_detail(detail)
			},
		);

		let problem = wrappers
			.fallback()
			.map(|wrapper| wrapper.construct(Some("oops".into()), ExtensionMembers::new()));

		assert_eq!(problem.as_ref().and_then(ProblemDetails::detail), Some("oops"));

		wrappers.insert(WrapperKey::Default, custom_not_found());

		let problem = wrappers
			.fallback()
			.map(|wrapper| wrapper.construct(None, ExtensionMembers::new()));

		assert_eq!(problem.as_ref().map(ProblemDetails::problem_type), Some("custom-not-found"));
		assert!(wrappers.remove(WrapperKey::Default).is_some());
		assert_eq!(wrappers.len(), 1);

		Ok(())
	}

	#[test]
	fn template_status_must_be_in_range() -> Result
	{
		let ok = toml::from_str::<ProblemTemplate>(
			"type = \"custom-server\"\ntitle = \"Server failed.\"\nstatus = 500",
		)?;
		let bad = toml::from_str::<ProblemTemplate>("type = \"x\"\ntitle = \"X\"\nstatus = 700");

		assert_eq!(ok.status, StatusCode::INTERNAL_SERVER_ERROR);
		assert!(bad.is_err());

		Ok(())
	}
}
