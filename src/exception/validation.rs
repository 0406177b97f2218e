use {
	serde::{Serialize, Serializer},
	serde_json::Value,
	std::{error::Error, fmt},
};

/// Rejected request input.
///
/// Carries the structured list of issues that ends up in the `errors` member of the response.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RequestValidationError
{
	errors: Vec<Value>,
}

impl RequestValidationError
{
	/// Creates an error without any issues.
	pub fn new() -> Self
	{
		Self::default()
	}

	/// Records a validation issue.
	///
	/// Members of `issue` that cannot be represented as JSON are replaced by a string describing
	/// why; the rest of the issue keeps its structure. Only if `issue` itself is such a value, it
	/// is recorded as its [`Display`] output.
	///
	/// [`Display`]: fmt::Display
	pub fn push<T>(&mut self, issue: &T)
	where
		T: Serialize + fmt::Display + ?Sized,
	{
		let value = lossy::to_value(issue).unwrap_or_else(|_| Value::String(issue.to_string()));
		self.errors.push(value);
	}

	/// Builder-style version of [`push()`](Self::push).
	pub fn with<T>(mut self, issue: &T) -> Self
	where
		T: Serialize + fmt::Display + ?Sized,
	{
		self.push(issue);
		self
	}

	/// Returns the recorded issues.
	pub fn errors(&self) -> &[Value]
	{
		&self.errors
	}
}

impl fmt::Display for RequestValidationError
{
	fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result
	{
		match self.errors.len() {
			1 => fmt.write_str("request validation failed with 1 error"),
			count => write!(fmt, "request validation failed with {count} errors"),
		}
	}
}

impl Error for RequestValidationError {}

/// A single validation issue in the shape most clients expect.
///
/// ```json
/// { "type": "missing", "loc": ["query", "name"], "msg": "Field required", "input": null }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue
{
	/// What went wrong, e.g. `missing`.
	#[serde(rename = "type")]
	pub kind: String,

	/// Where the offending value was found, e.g. `["query", "name"]`.
	pub loc: Vec<Value>,

	/// A human readable message.
	pub msg: String,

	/// The offending value, serialized as `null` if unknown.
	#[serde(serialize_with = "serialize_input")]
	pub input: Option<Value>,
}

impl ValidationIssue
{
	/// Creates an issue without an `input`.
	pub fn new(
		kind: impl Into<String>,
		loc: impl IntoIterator<Item: Into<Value>>,
		msg: impl Into<String>,
	) -> Self
	{
		Self {
			kind: kind.into(),
			loc: loc.into_iter().map(Into::into).collect(),
			msg: msg.into(),
			input: None,
		}
	}

	/// Sets the offending input.
	pub fn with_input(mut self, input: Value) -> Self
	{
		self.input = Some(input);
		self
	}
}

impl fmt::Display for ValidationIssue
{
	fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result
	{
		write!(fmt, "{} ({})", self.msg, self.kind)
	}
}

fn serialize_input<S>(input: &Option<Value>, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	input.as_ref().unwrap_or(&Value::Null).serialize(serializer)
}

/// Conversion into [`Value`]s that survives members which fail to serialize.
mod lossy
{
	use {
		serde::ser::{self, Serialize, Serializer as _},
		serde_json::{Error, Map, Value, value::Serializer as ValueSerializer},
	};

	pub(super) fn to_value<T>(value: &T) -> Result<Value, Error>
	where
		T: Serialize + ?Sized,
	{
		value.serialize(Lossy)
	}

	/// Serializes a member, replacing it with the error message if it fails.
	fn member<T>(value: &T) -> Value
	where
		T: Serialize + ?Sized,
	{
		value
			.serialize(Lossy)
			.unwrap_or_else(|error| Value::String(error.to_string()))
	}

	struct Lossy;

	impl ser::Serializer for Lossy
	{
		type Ok = Value;
		type Error = Error;
		type SerializeSeq = Seq;
		type SerializeTuple = Seq;
		type SerializeTupleStruct = Seq;
		type SerializeTupleVariant = Variant<Vec<Value>>;
		type SerializeMap = Object;
		type SerializeStruct = Object;
		type SerializeStructVariant = Variant<Map<String, Value>>;

		fn serialize_bool(self, value: bool) -> Result<Value, Error>
		{
			ValueSerializer.serialize_bool(value)
		}

		fn serialize_i8(self, value: i8) -> Result<Value, Error>
		{
			ValueSerializer.serialize_i8(value)
		}

		fn serialize_i16(self, value: i16) -> Result<Value, Error>
		{
			ValueSerializer.serialize_i16(value)
		}

		fn serialize_i32(self, value: i32) -> Result<Value, Error>
		{
			ValueSerializer.serialize_i32(value)
		}

		fn serialize_i64(self, value: i64) -> Result<Value, Error>
		{
			ValueSerializer.serialize_i64(value)
		}

		fn serialize_i128(self, value: i128) -> Result<Value, Error>
		{
			ValueSerializer.serialize_i128(value)
		}

		fn serialize_u8(self, value: u8) -> Result<Value, Error>
		{
			ValueSerializer.serialize_u8(value)
		}

		fn serialize_u16(self, value: u16) -> Result<Value, Error>
		{
			ValueSerializer.serialize_u16(value)
		}

		fn serialize_u32(self, value: u32) -> Result<Value, Error>
		{
			ValueSerializer.serialize_u32(value)
		}

		fn serialize_u64(self, value: u64) -> Result<Value, Error>
		{
			ValueSerializer.serialize_u64(value)
		}

		fn serialize_u128(self, value: u128) -> Result<Value, Error>
		{
			ValueSerializer.serialize_u128(value)
		}

		fn serialize_f32(self, value: f32) -> Result<Value, Error>
		{
			ValueSerializer.serialize_f32(value)
		}

		fn serialize_f64(self, value: f64) -> Result<Value, Error>
		{
			ValueSerializer.serialize_f64(value)
		}

		fn serialize_char(self, value: char) -> Result<Value, Error>
		{
			ValueSerializer.serialize_char(value)
		}

		fn serialize_str(self, value: &str) -> Result<Value, Error>
		{
			ValueSerializer.serialize_str(value)
		}

		fn serialize_bytes(self, value: &[u8]) -> Result<Value, Error>
		{
			ValueSerializer.serialize_bytes(value)
		}

		fn serialize_none(self) -> Result<Value, Error>
		{
			Ok(Value::Null)
		}

		fn serialize_some<T>(self, value: &T) -> Result<Value, Error>
		where
			T: Serialize + ?Sized,
		{
			value.serialize(self)
		}

		fn serialize_unit(self) -> Result<Value, Error>
		{
			Ok(Value::Null)
		}

		fn serialize_unit_struct(self, _: &'static str) -> Result<Value, Error>
		{
			Ok(Value::Null)
		}

		fn serialize_unit_variant(
			self,
			_: &'static str,
			_: u32,
			variant: &'static str,
		) -> Result<Value, Error>
		{
			Ok(Value::from(variant))
		}

		fn serialize_newtype_struct<T>(self, _: &'static str, value: &T) -> Result<Value, Error>
		where
			T: Serialize + ?Sized,
		{
			value.serialize(self)
		}

		fn serialize_newtype_variant<T>(
			self,
			_: &'static str,
			_: u32,
			variant: &'static str,
			value: &T,
		) -> Result<Value, Error>
		where
			T: Serialize + ?Sized,
		{
			let mut object = Map::new();
			object.insert(variant.to_owned(), member(value));

			Ok(Value::Object(object))
		}

		fn serialize_seq(self, len: Option<usize>) -> Result<Seq, Error>
		{
			Ok(Seq(Vec::with_capacity(len.unwrap_or_default())))
		}

		fn serialize_tuple(self, len: usize) -> Result<Seq, Error>
		{
			self.serialize_seq(Some(len))
		}

		fn serialize_tuple_struct(self, _: &'static str, len: usize) -> Result<Seq, Error>
		{
			self.serialize_seq(Some(len))
		}

		fn serialize_tuple_variant(
			self,
			_: &'static str,
			_: u32,
			variant: &'static str,
			len: usize,
		) -> Result<Variant<Vec<Value>>, Error>
		{
			Ok(Variant { name: variant, members: Vec::with_capacity(len) })
		}

		fn serialize_map(self, _: Option<usize>) -> Result<Object, Error>
		{
			Ok(Object { members: Map::new(), next_key: None })
		}

		fn serialize_struct(self, _: &'static str, _: usize) -> Result<Object, Error>
		{
			self.serialize_map(None)
		}

		fn serialize_struct_variant(
			self,
			_: &'static str,
			_: u32,
			variant: &'static str,
			_: usize,
		) -> Result<Variant<Map<String, Value>>, Error>
		{
			Ok(Variant { name: variant, members: Map::new() })
		}
	}

	struct Seq(Vec<Value>);

	impl ser::SerializeSeq for Seq
	{
		type Ok = Value;
		type Error = Error;

		fn serialize_element<T>(&mut self, value: &T) -> Result<(), Error>
		where
			T: Serialize + ?Sized,
		{
			self.0.push(member(value));
			Ok(())
		}

		fn end(self) -> Result<Value, Error>
		{
			Ok(Value::Array(self.0))
		}
	}

	impl ser::SerializeTuple for Seq
	{
		type Ok = Value;
		type Error = Error;

		fn serialize_element<T>(&mut self, value: &T) -> Result<(), Error>
		where
			T: Serialize + ?Sized,
		{
			ser::SerializeSeq::serialize_element(self, value)
		}

		fn end(self) -> Result<Value, Error>
		{
			ser::SerializeSeq::end(self)
		}
	}

	impl ser::SerializeTupleStruct for Seq
	{
		type Ok = Value;
		type Error = Error;

		fn serialize_field<T>(&mut self, value: &T) -> Result<(), Error>
		where
			T: Serialize + ?Sized,
		{
			ser::SerializeSeq::serialize_element(self, value)
		}

		fn end(self) -> Result<Value, Error>
		{
			ser::SerializeSeq::end(self)
		}
	}

	struct Object
	{
		members: Map<String, Value>,
		next_key: Option<String>,
	}

	impl ser::SerializeMap for Object
	{
		type Ok = Value;
		type Error = Error;

		fn serialize_key<T>(&mut self, key: &T) -> Result<(), Error>
		where
			T: Serialize + ?Sized,
		{
			// JSON object keys are strings; numbers and the like use their JSON text
			self.next_key = Some(match key.serialize(Lossy)? {
				Value::String(key) => key,
				key => key.to_string(),
			});

			Ok(())
		}

		fn serialize_value<T>(&mut self, value: &T) -> Result<(), Error>
		where
			T: Serialize + ?Sized,
		{
			let Some(key) = self.next_key.take() else {
				return Err(ser::Error::custom("map value serialized before its key"));
			};

			self.members.insert(key, member(value));
			Ok(())
		}

		fn end(self) -> Result<Value, Error>
		{
			Ok(Value::Object(self.members))
		}
	}

	impl ser::SerializeStruct for Object
	{
		type Ok = Value;
		type Error = Error;

		fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), Error>
		where
			T: Serialize + ?Sized,
		{
			self.members.insert(key.to_owned(), member(value));
			Ok(())
		}

		fn end(self) -> Result<Value, Error>
		{
			Ok(Value::Object(self.members))
		}
	}

	struct Variant<M>
	{
		name: &'static str,
		members: M,
	}

	impl<M> Variant<M>
	{
		fn wrap(name: &'static str, value: Value) -> Value
		{
			let mut object = Map::new();
			object.insert(name.to_owned(), value);
			Value::Object(object)
		}
	}

	impl ser::SerializeTupleVariant for Variant<Vec<Value>>
	{
		type Ok = Value;
		type Error = Error;

		fn serialize_field<T>(&mut self, value: &T) -> Result<(), Error>
		where
			T: Serialize + ?Sized,
		{
			self.members.push(member(value));
			Ok(())
		}

		fn end(self) -> Result<Value, Error>
		{
			Ok(Self::wrap(self.name, Value::Array(self.members)))
		}
	}

	impl ser::SerializeStructVariant for Variant<Map<String, Value>>
	{
		type Ok = Value;
		type Error = Error;

		fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), Error>
		where
			T: Serialize + ?Sized,
		{
			self.members.insert(key.to_owned(), member(value));
			Ok(())
		}

		fn end(self) -> Result<Value, Error>
		{
			Ok(Self::wrap(self.name, Value::Object(self.members)))
		}
	}
}

#[cfg(test)]
mod tests
{
	use {
		super::*,
		crate::testing::{Result, assert_eq},
		serde::ser,
		serde_json::json,
	};

	/// Something with a `Serialize` impl that always fails.
	struct Opaque;

	impl Serialize for Opaque
	{
		fn serialize<S>(&self, _: S) -> Result<S::Ok, S::Error>
		where
			S: Serializer,
		{
			Err(ser::Error::custom("not representable"))
		}
	}

	impl fmt::Display for Opaque
	{
		fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result
		{
			fmt.write_str("<opaque>")
		}
	}

	#[test]
	fn issues_are_serialized() -> Result
	{
		let error = RequestValidationError::new()
			.with(&ValidationIssue::new("missing", ["query", "name"], "Field required"));

		assert_eq!(
			error.errors(),
			&[json!({
				"type": "missing",
				"loc": ["query", "name"],
				"msg": "Field required",
				"input": null,
			})][..]
		);

		Ok(())
	}

	#[test]
	fn unserializable_issues_fall_back_to_strings() -> Result
	{
		let error = RequestValidationError::new().with(&Opaque);

		assert_eq!(error.errors(), &[json!("<opaque>")][..]);
		assert_eq!(error.to_string(), "request validation failed with 1 error");

		Ok(())
	}

	#[derive(Serialize)]
	struct CustomIssue
	{
		loc: (&'static str, u32),
		msg: &'static str,
		input: Vec<Opaque>,
	}

	impl fmt::Display for CustomIssue
	{
		fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result
		{
			fmt.write_str(self.msg)
		}
	}

	#[test]
	fn unserializable_members_are_coerced_individually() -> Result
	{
		let issue = CustomIssue {
			loc: ("body", 3),
			msg: "Input should be valid",
			input: vec![Opaque],
		};
		let error = RequestValidationError::new().with(&issue);

		assert_eq!(
			error.errors(),
			&[json!({
				"loc": ["body", 3],
				"msg": "Input should be valid",
				"input": ["not representable"],
			})][..]
		);

		Ok(())
	}
}
