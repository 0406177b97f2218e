//! Mapping HTTP status codes to problem titles and type tokens.
//!
//! The reason phrases registered for some status codes changed between HTTP revisions (`422` is
//! "Unprocessable Entity" in RFC 7231 and "Unprocessable Content" in RFC 9110), so the phrase set
//! is selected explicitly through [`PhraseTable`] instead of being baked in.

use {
	serde::Deserialize,
	std::{borrow::Cow, collections::BTreeMap},
	thiserror::Error,
};

/// The set of reason phrases used by a [`StatusMapper`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PhraseTable
{
	/// The phrases registered by RFC 7231, as used by the [`http`] crate.
	#[default]
	Rfc7231,

	/// The phrases registered by RFC 9110.
	Rfc9110,
}

impl PhraseTable
{
	/// Returns the reason phrase for `status`, if it is a registered status code.
	pub fn phrase(self, status: u16) -> Option<&'static str>
	{
		match (self, status) {
			(Self::Rfc9110, 413) => Some("Content Too Large"),
			(Self::Rfc9110, 422) => Some("Unprocessable Content"),
			(Self::Rfc7231 | Self::Rfc9110, _) => http::StatusCode::from_u16(status)
				.ok()
				.and_then(|status| status.canonical_reason()),
		}
	}
}

/// Error returned when a status code has no registered reason phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown HTTP status code `{0}`")]
pub struct UnknownStatusCode(pub u16);

/// Maps HTTP status codes to `(title, type token)` pairs.
///
/// The title is the reason phrase from the configured [`PhraseTable`] (or an override registered
/// with [`StatusMapper::with_phrase()`]); the type token is `http-` followed by the lowercased,
/// dash-joined words of the title.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StatusMapper
{
	table: PhraseTable,
	overrides: BTreeMap<u16, Cow<'static, str>>,
}

impl StatusMapper
{
	/// Creates a new [`StatusMapper`] using the given phrase table.
	pub fn new(table: PhraseTable) -> Self
	{
		Self { table, overrides: BTreeMap::new() }
	}

	/// Registers a custom phrase for `status`.
	///
	/// This can also be used to teach the mapper about unregistered codes such as `499`.
	pub fn with_phrase(mut self, status: u16, phrase: impl Into<Cow<'static, str>>) -> Self
	{
		self.overrides.insert(status, phrase.into());
		self
	}

	/// Returns the title for `status`.
	pub fn title(&self, status: u16) -> Result<Cow<'static, str>, UnknownStatusCode>
	{
		if let Some(phrase) = self.overrides.get(&status) {
			return Ok(phrase.clone());
		}

		self.table
			.phrase(status)
			.map(Cow::Borrowed)
			.ok_or(UnknownStatusCode(status))
	}

	/// Maps `status` to its `(title, type token)` pair.
	pub fn map(&self, status: u16) -> Result<(Cow<'static, str>, String), UnknownStatusCode>
	{
		let title = self.title(status)?;
		let type_token = type_token_for_title(&title);

		Ok((title, type_token))
	}
}

/// Maps `status` using the default [`StatusMapper`].
pub fn convert_status_code(status: u16) -> Result<(Cow<'static, str>, String), UnknownStatusCode>
{
	StatusMapper::default().map(status)
}

fn type_token_for_title(title: &str) -> String
{
	let words = title
		.split_whitespace()
		.map(str::to_lowercase)
		.collect::<Vec<_>>();

	format!("http-{}", words.join("-"))
}

#[cfg(test)]
mod tests
{
	use {super::*, std::collections::HashMap};

	#[test]
	fn maps_common_codes()
	{
		let cases = [
			(500, "Internal Server Error", "http-internal-server-error"),
			(400, "Bad Request", "http-bad-request"),
			(401, "Unauthorized", "http-unauthorized"),
			(404, "Not Found", "http-not-found"),
			(409, "Conflict", "http-conflict"),
			(422, "Unprocessable Entity", "http-unprocessable-entity"),
		];

		for (status, title, type_token) in cases {
			let (mapped_title, mapped_type) = convert_status_code(status).unwrap();

			assert_eq!(mapped_title, title);
			assert_eq!(mapped_type, type_token);
		}
	}

	#[test]
	fn rfc9110_phrases_differ()
	{
		let mapper = StatusMapper::new(PhraseTable::Rfc9110);

		assert_eq!(
			mapper.map(422).unwrap(),
			(Cow::Borrowed("Unprocessable Content"), String::from("http-unprocessable-content"))
		);
		assert_eq!(mapper.title(404).unwrap(), "Not Found");
	}

	#[test]
	fn unknown_codes_fail()
	{
		assert_eq!(convert_status_code(499), Err(UnknownStatusCode(499)));
		assert_eq!(convert_status_code(1000), Err(UnknownStatusCode(1000)));
	}

	#[test]
	fn overrides_win()
	{
		let mapper = StatusMapper::default()
			.with_phrase(499, "Client Closed Request")
			.with_phrase(404, "Nothing Here");

		assert_eq!(mapper.map(499).unwrap().1, "http-client-closed-request");
		assert_eq!(mapper.map(404).unwrap().1, "http-nothing-here");
	}

	#[test]
	fn tokens_follow_titles_and_are_distinct()
	{
		for table in [PhraseTable::Rfc7231, PhraseTable::Rfc9110] {
			let mapper = StatusMapper::new(table);
			let mut seen = HashMap::<String, (u16, Cow<'static, str>)>::new();

			for status in 100..600 {
				let Ok((title, type_token)) = mapper.map(status) else {
					continue;
				};

				let expected = format!(
					"http-{}",
					title.to_lowercase().split_whitespace().collect::<Vec<_>>().join("-")
				);
				assert_eq!(type_token, expected);

				let previous = seen.insert(type_token, (status, title.clone()));

				if let Some((other, other_title)) = previous {
					assert_eq!(other_title, title, "{other} and {status} share a token");
				}
			}

			assert!(seen.len() > 40, "phrase table looks truncated");
		}
	}
}
