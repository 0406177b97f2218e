//! Utilities for unit tests.

use {
	crate::{exception::Exception, logger::Logger},
	http::request,
	serde_json::Value,
	std::{
		error::Error as StdError,
		sync::{Mutex, PoisonError},
	},
};

mod macros;

#[allow(unused_imports)]
pub(crate) use macros::*;

pub type Error = anyhow::Error;
pub type Result<T = (), E = Error> = std::result::Result<T, E>;

/// Builds the head of a `GET` request.
pub fn request_parts(path: &str, headers: &[(&str, &str)]) -> Result<request::Parts>
{
	let mut request = http::Request::get(path);

	for &(name, value) in headers {
		request = request.header(name, value);
	}

	Ok(request.body(())?.into_parts().0)
}

/// Something a [`RecordingLogger`] was told.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record
{
	Exception
	{
		title: String,
		type_name: &'static str,
	},

	HandlerFailed
	{
		stage: String,
		failure: String,
	},

	StrippingDebug,
	Removed(String),
}

/// A [`Logger`] that remembers every call.
#[derive(Debug, Default)]
pub struct RecordingLogger
{
	records: Mutex<Vec<Record>>,
}

impl RecordingLogger
{
	pub fn records(&self) -> Vec<Record>
	{
		self.records.lock().unwrap_or_else(PoisonError::into_inner).clone()
	}

	/// The number of `error`-level records.
	pub fn errors(&self) -> usize
	{
		self.records()
			.iter()
			.filter(|record| {
				matches!(record, Record::Exception { .. } | Record::HandlerFailed { .. })
			})
			.count()
	}

	fn push(&self, record: Record)
	{
		self.records
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.push(record);
	}
}

impl Logger for RecordingLogger
{
	fn exception(&self, title: &str, exception: &Exception)
	{
		self.push(Record::Exception { title: title.to_owned(), type_name: exception.type_name() });
	}

	fn handler_failed(&self, stage: &str, failure: &(dyn StdError + 'static), _: &Exception)
	{
		self.push(Record::HandlerFailed { stage: stage.to_owned(), failure: failure.to_string() });
	}

	fn stripping_debug(&self, _: &Exception)
	{
		self.push(Record::StrippingDebug);
	}

	fn removed(&self, key: &str, value: &Value)
	{
		self.push(Record::Removed(format!("{key}: {value}")));
	}
}
