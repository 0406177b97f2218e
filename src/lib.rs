//! Turns errors raised while serving HTTP requests into [RFC 9457] problem responses.
//!
//! The center of this crate is the [`ExceptionHandler`]. It receives an [`Exception`] together
//! with the request that caused it and produces a [`ProblemResponse`]:
//!
//!    1. pre-hooks observe the request and the exception
//!    2. the first conversion handler whose [`TypeTag`] matches builds the problem; if none does,
//!       the [unhandled wrappers] or the generic "Unhandled exception occurred." problem are used
//!    3. domain errors ([`Problem`]s) always win over whatever dispatch produced
//!    4. server errors are logged, debug members are stripped if configured, and the body is
//!       serialized
//!    5. post-hooks (CORS, stripping extension members, ...) adjust the final response
//!
//! The [`http`](crate::http) module plugs this into [`axum`], and [`openapi`] documents the
//! responses.
//!
//! [RFC 9457]: https://www.rfc-editor.org/rfc/rfc9457.html
//! [unhandled wrappers]: UnhandledWrappers

/*
 * problem-responder
 *
 * Copyright (C) 2024  AlphaKeks <alphakeks@dawn>
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see https://www.gnu.org/licenses.
 */

#[macro_use]
extern crate tracing as _;

#[macro_use]
extern crate derive_more as _;

#[cfg(test)]
mod testing;

mod exception;
mod registry;
mod wrappers;
mod handler;
mod response;
mod logger;

pub mod hooks;
pub mod config;
pub mod telemetry;
pub mod http;
pub mod openapi;

pub use {
	self::{
		config::{Config, ConfigError},
		exception::{
			BoxError,
			Exception,
			ExceptionKind,
			HttpException,
			Panicked,
			Problem,
			RequestValidationError,
			StatusProblem,
			ValidationIssue,
		},
		handler::{
			ExceptionHandler,
			VALIDATION_TITLE,
			VALIDATION_TYPE,
			http_exception_handler,
			request_validation_handler,
		},
		logger::{Logger, TracingLogger},
		registry::{Handled, HandlerFn, HandlerRegistry, TypeTag},
		response::ProblemResponse,
		wrappers::{
			InvalidWrapperKey,
			ProblemConstructor,
			ProblemTemplate,
			UnhandledWrappers,
			WrapperKey,
		},
	},
	problem_details,
};
