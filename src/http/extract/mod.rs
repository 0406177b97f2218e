//! [Extractors] whose rejections run through the [`ExceptionHandler`].
//!
//! [Extractors]: axum::extract
//! [`ExceptionHandler`]: crate::ExceptionHandler

mod json;
mod query;

pub use self::{json::Json, query::Query};

/// Extracts the field name from serde's "missing field" messages.
///
/// This relies on the wording of [`serde::de::Error::missing_field()`]'s default implementation,
/// ``missing field `name` ``, which both `serde_json` and `serde_urlencoded` use.
fn missing_field(message: &str) -> Option<&str>
{
	let (_, rest) = message.split_once("missing field `")?;
	let (field, _) = rest.split_once('`')?;

	Some(field)
}

#[cfg(test)]
mod tests
{
	use {
		super::*,
		crate::testing::{Result, assert_eq},
	};

	#[test]
	fn missing_field_names() -> Result
	{
		assert_eq!(missing_field("missing field `name` at line 1 column 2"), Some("name"));
		assert_eq!(missing_field("missing field `name`"), Some("name"));
		assert_eq!(missing_field("invalid type: integer `1`, expected a string"), None);

		Ok(())
	}

	#[derive(Debug, serde::Deserialize)]
	#[expect(dead_code)]
	struct Search
	{
		name: String,
	}

	#[test]
	fn matches_serde_wording() -> Result
	{
		let Err(json_error) = serde_json::from_str::<Search>("{}") else {
			anyhow::bail!("deserializing `{{}}` should fail");
		};

		let Err(query_error) = serde_urlencoded::from_str::<Search>("") else {
			anyhow::bail!("deserializing an empty query should fail");
		};

		assert_eq!(missing_field(&json_error.to_string()), Some("name"));
		assert_eq!(missing_field(&query_error.to_string()), Some("name"));

		Ok(())
	}
}
