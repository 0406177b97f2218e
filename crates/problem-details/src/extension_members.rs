//! The [`ExtensionMembers`] type and its [`Iterator`]s

use {
	serde::Serialize,
	serde_json::map as base,
	std::{borrow::Borrow, fmt, hash::Hash},
	thiserror::Error,
};

type Fields = serde_json::Map<String, serde_json::Value>;

/// Member names defined by the RFC itself.
///
/// These can never be used as extension members; the core members always win.
pub const RESERVED_MEMBERS: &[&str] = &["type", "title", "status", "detail"];

/// Returns whether `name` is one of the [`RESERVED_MEMBERS`].
pub fn is_reserved(name: &str) -> bool
{
	RESERVED_MEMBERS.contains(&name)
}

/// Extra fields to include in [`ProblemDetails`].
///
/// This corresponds to [Section 3.2] of the [RFC]. Members are kept in insertion order.
///
/// [`ProblemDetails`]: crate::ProblemDetails
/// [Section 3.2]: https://www.rfc-editor.org/rfc/rfc9457.html#section-3.2
/// [RFC]: https://www.rfc-editor.org/rfc/rfc9457.html
#[derive(Default, Clone, PartialEq, Eq)]
pub struct ExtensionMembers
{
	fields: Fields,
}

/// Error returned by [`ExtensionMembers::add()`].
#[derive(Debug, Error)]
pub enum ExtensionMemberError
{
	/// The member name collides with one of the [`RESERVED_MEMBERS`].
	#[error("`{0}` is a reserved problem details member and cannot be used as an extension")]
	Reserved(String),

	/// The value could not be turned into JSON.
	#[error("failed to serialize extension member `{name}`: {source}")]
	Serialize
	{
		/// The name of the member.
		name: String,

		/// The underlying error.
		source: serde_json::Error,
	},
}

/// An iterator over shared references to the values stored in [`ExtensionMembers`]
pub struct Iter<'a>
{
	fields: base::Iter<'a>,
}

/// An iterator over mutable references to the values stored in [`ExtensionMembers`]
pub struct IterMut<'a>
{
	fields: base::IterMut<'a>,
}

/// An iterator the values stored in [`ExtensionMembers`]
pub struct IntoIter
{
	fields: base::IntoIter,
}

impl ExtensionMembers
{
	/// Creates a new empty [`ExtensionMembers`].
	pub fn new() -> Self
	{
		Self::default()
	}

	/// Returns the number of extension members
	pub fn count(&self) -> usize
	{
		self.fields.len()
	}

	/// Returns `true` if there are no extension members.
	pub fn is_empty(&self) -> bool
	{
		self.fields.is_empty()
	}

	/// Returns the value of the extension member with the given `name`, if any.
	pub fn get<Q>(&self, name: &Q) -> Option<&serde_json::Value>
	where
		String: Borrow<Q>,
		Q: Eq + Ord + Hash + ?Sized,
	{
		self.fields.get(name)
	}

	/// Returns a mutable reference to the value of the extension member with the given `name`, if
	/// any.
	pub fn get_mut<Q>(&mut self, name: &Q) -> Option<&mut serde_json::Value>
	where
		String: Borrow<Q>,
		Q: Eq + Ord + Hash + ?Sized,
	{
		self.fields.get_mut(name)
	}

	/// Adds a new extension member.
	///
	/// If there was already a member for the given `name`, its old value will be returned and the
	/// member keeps its original position.
	pub fn add<V>(
		&mut self,
		name: impl Into<String>,
		value: &V,
	) -> Result<Option<serde_json::Value>, ExtensionMemberError>
	where
		V: Serialize + ?Sized,
	{
		let name = name.into();

		match serde_json::to_value(value) {
			Ok(value) => self.insert(name, value),
			Err(source) => Err(ExtensionMemberError::Serialize { name, source }),
		}
	}

	/// Adds a new extension member from an existing JSON value.
	pub fn insert(
		&mut self,
		name: impl Into<String>,
		value: serde_json::Value,
	) -> Result<Option<serde_json::Value>, ExtensionMemberError>
	{
		let name = name.into();

		if is_reserved(&name) {
			return Err(ExtensionMemberError::Reserved(name));
		}

		Ok(self.fields.insert(name, value))
	}

	/// Removes the extension member with the given `name`, returning its value.
	pub fn remove<Q>(&mut self, name: &Q) -> Option<serde_json::Value>
	where
		String: Borrow<Q>,
		Q: Eq + Ord + Hash + ?Sized,
	{
		self.fields.shift_remove(name)
	}

	/// Returns an iterator over shared references to the values stored in `self`.
	pub fn iter(&self) -> Iter<'_>
	{
		self.into_iter()
	}

	/// Returns an iterator over mutable references to the values stored in `self`.
	pub fn iter_mut(&mut self) -> IterMut<'_>
	{
		self.into_iter()
	}
}

impl fmt::Debug for ExtensionMembers
{
	fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result
	{
		fmt.debug_map().entries(&self.fields).finish()
	}
}

impl<'a> IntoIterator for &'a ExtensionMembers
{
	type Item = (&'a str, &'a serde_json::Value);
	type IntoIter = Iter<'a>;

	fn into_iter(self) -> Self::IntoIter
	{
		Iter { fields: self.fields.iter() }
	}
}

impl<'a> IntoIterator for &'a mut ExtensionMembers
{
	type Item = (&'a str, &'a mut serde_json::Value);
	type IntoIter = IterMut<'a>;

	fn into_iter(self) -> Self::IntoIter
	{
		IterMut { fields: self.fields.iter_mut() }
	}
}

impl IntoIterator for ExtensionMembers
{
	type Item = (String, serde_json::Value);
	type IntoIter = IntoIter;

	fn into_iter(self) -> Self::IntoIter
	{
		IntoIter { fields: self.fields.into_iter() }
	}
}

macro_rules! impl_iterator {
    ($iter:ident $( < $($lt:lifetime),* $(,)? > )? yields $item:ty => |$key:ident| $map:expr) => {
        impl $(< $($lt),* >)? fmt::Debug for $iter $(< $($lt),* >)? {
            fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt.debug_struct(stringify!($iter)).finish_non_exhaustive()
            }
        }

        impl $(< $($lt),* >)? Iterator for $iter $(< $($lt),* >)? {
            type Item = $item;

            fn next(&mut self) -> Option<Self::Item> {
                self.fields.next().map(|($key, value)| ($map, value))
            }

            fn size_hint(&self) -> (usize, Option<usize>) {
                self.fields.size_hint()
            }
        }

        impl $(< $($lt),* >)? DoubleEndedIterator for $iter $(< $($lt),* >)? {
            fn next_back(&mut self) -> Option<Self::Item> {
                self.fields.next_back().map(|($key, value)| ($map, value))
            }
        }

        impl $(< $($lt),* >)? ExactSizeIterator for $iter $(< $($lt),* >)? {
            fn len(&self) -> usize {
                self.fields.len()
            }
        }

        impl $(< $($lt),* >)? std::iter::FusedIterator for $iter $(< $($lt),* >)? {}
};
}

impl_iterator!(Iter<'a> yields (&'a str, &'a serde_json::Value) => |key| key.as_str());
impl_iterator!(IterMut<'a> yields (&'a str, &'a mut serde_json::Value) => |key| key.as_str());
impl_iterator!(IntoIter yields (String, serde_json::Value) => |key| key);

#[cfg(test)]
mod tests
{
	use super::*;

	#[test]
	fn members_keep_insertion_order()
	{
		let mut members = ExtensionMembers::new();
		members.add("zeta", &1).unwrap();
		members.add("alpha", &2).unwrap();
		members.add("mid", &3).unwrap();

		let names = members.iter().map(|(name, _)| name).collect::<Vec<_>>();

		assert_eq!(names, ["zeta", "alpha", "mid"]);
	}

	#[test]
	fn reserved_names_are_rejected()
	{
		let mut members = ExtensionMembers::new();

		for name in RESERVED_MEMBERS {
			assert!(matches!(
				members.add(*name, "nope"),
				Err(ExtensionMemberError::Reserved(_))
			));
		}

		assert!(members.is_empty());
	}

	#[test]
	fn re_adding_returns_old_value()
	{
		let mut members = ExtensionMembers::new();
		members.add("errors", &[1, 2]).unwrap();

		let old = members.add("errors", &Vec::<u8>::new()).unwrap();

		assert_eq!(old, Some(serde_json::json!([1, 2])));
		assert_eq!(members.get("errors"), Some(&serde_json::json!([])));
	}
}
