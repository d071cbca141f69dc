// Copyright (C) 2022 Michael Herstine <sp1ff@pobox.com>
//
// This file is part of gelf-tracing.
//
// gelf-tracing is free software: you can redistribute it and/or modify it under the terms of the
// GNU General Public License as published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// gelf-tracing is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without
// even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
// General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with gelf-tracing.  If
// not, see <http://www.gnu.org/licenses/>.
//! Ship log records to [Graylog] (or anything else that speaks [GELF]) over TCP or HTTP.
//!
//! [Graylog]: https://graylog.org
//! [GELF]: https://go2docs.graylog.org/current/getting_in_log_data/gelf.html
//!
//! # Introduction
//!
//! GELF, the Graylog Extended Log Format, is a JSON schema for log messages: a handful of
//! required fields (`version`, `host`, `short_message`, `timestamp`...) plus any number of
//! "additional" fields whose names begin with an underscore. A GELF input will accept such
//! documents over UDP (chunked), over TCP (NUL-delimited) or via HTTP POST.
//!
//! This crate implements the latter two. It is organized around the [`Appender`] trait, the
//! contract between a logging framework and a delivery channel:
//!
//! - [`GelfTcpAppender`] keeps a single TCP stream open, re-establishing it on demand
//! - [`GelfHttpAppender`] POSTs each message on its own
//!
//! Both build their messages through [`GelfFormatter`], configured by a [`GelfConfig`]. Delivery is
//! best-effort: if the endpoint is down, records are dropped (with a warning) rather than
//! buffered, and the caller is never blocked for longer than the configured timeout.
//!
//! [`Appender`]: crate::appender::Appender
//! [`GelfTcpAppender`]: crate::tcp::GelfTcpAppender
//! [`GelfHttpAppender`]: crate::http::GelfHttpAppender
//! [`GelfFormatter`]: crate::message::GelfFormatter
//! [`GelfConfig`]: crate::config::GelfConfig
//!
//! # Usage
//!
//! Hosts with their own event model drive an appender directly:
//!
//! ```no_run
//! use gelf_tracing::appender::Appender;
//! use gelf_tracing::context::{DiagnosticContext, CLIENT_IP};
//! use gelf_tracing::event::LogEvent;
//! use gelf_tracing::level::Level;
//! use gelf_tracing::tcp::GelfTcpAppender;
//!
//! let mut appender = GelfTcpAppender::default(); // 127.0.0.1:12201
//! appender.set_host("192.168.1.100");
//! appender.set_facility("myApplicationName");
//! appender.activate_options();
//!
//! let mut ctx = DiagnosticContext::new();
//! ctx.put(CLIENT_IP, "10.0.0.7");
//! appender
//!     .append(&LogEvent::new(Level::Info, "app.web", "Hello, world!"), &ctx)
//!     .unwrap();
//! appender.close();
//! ```
//!
//! [`tracing`] users can instead stack a [`GelfLayer`] onto their subscriber:
//!
//! [`tracing`]: https://docs.rs/tracing/latest/tracing/index.html
//! [`GelfLayer`]: crate::layer::GelfLayer
//!
//! ```no_run
//! use gelf_tracing::{http::GelfHttpAppender, layer::GelfLayer};
//! use tracing::info;
//! use tracing_subscriber::layer::SubscriberExt; // Needed to get `with()`
//! use tracing_subscriber::registry::Registry;
//!
//! let subscriber = Registry::default().with(GelfLayer::new(GelfHttpAppender::default()));
//! let _guard = tracing::subscriber::set_default(subscriber);
//!
//! info!("Hello, world!");
//! ```

pub mod appender;
pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod http;
pub mod layer;
pub mod level;
pub mod message;
pub mod tcp;
pub mod transport;
