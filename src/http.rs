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

//! Shipping GELF messages over HTTP.
//!
//! [`GelfHttpAppender`] POSTs each message, on its own, to `http://{host}:{port}/gelf`. There's no
//! connection to manage: [`Appender::activate_options`] & [`Appender::close`] do nothing. Transport
//! failures & error statuses (>= 400) produce a warning; the record is dropped and never retried.

use crate::{
    appender::{default_warning_sink, Appender, WarningSink},
    config::GelfConfig,
    context::DiagnosticContext,
    error::{Error, Result},
    event::LogEvent,
    message::GelfFormatter,
};

use backtrace::Backtrace;
use ureq::{Agent, AgentBuilder};

/// An [`Appender`] POSTing GELF to an HTTP input.
pub struct GelfHttpAppender {
    config: GelfConfig,
    formatter: GelfFormatter,
    agent: Agent,
    warn: WarningSink,
}

fn build_agent(config: &GelfConfig) -> Agent {
    AgentBuilder::new()
        .timeout(config.timeout())
        .max_idle_connections(0)
        .build()
}

impl std::default::Default for GelfHttpAppender {
    /// Target `http://127.0.0.1:12201/gelf`
    fn default() -> Self {
        GelfHttpAppender::new(GelfConfig::default())
    }
}

impl GelfHttpAppender {
    pub fn new(config: GelfConfig) -> Self {
        GelfHttpAppender {
            agent: build_agent(&config),
            config,
            formatter: GelfFormatter::default(),
            warn: default_warning_sink(),
        }
    }
    pub fn with_formatter(mut self, formatter: GelfFormatter) -> Self {
        self.formatter = formatter;
        self
    }
    pub fn with_warning_sink<F: Fn(&str) + Send + Sync + 'static>(mut self, sink: F) -> Self {
        self.warn = Box::new(sink);
        self
    }
    pub fn url(&self) -> String {
        format!("http://{}:{}/gelf", self.config.host, self.config.port)
    }

    fn post(&self, body: &[u8]) -> Result<()> {
        let rsp = self
            .agent
            .post(&self.url())
            .set("Content-Type", "application/json")
            .set("Content-Length", &body.len().to_string())
            .send_bytes(body);
        match rsp {
            Ok(_) => Ok(()),
            Err(ureq::Error::Status(status, _)) => Err(Error::HttpStatus {
                status,
                back: Backtrace::new(),
            }),
            Err(err) => Err(Error::Http {
                source: Box::new(err),
                back: Backtrace::new(),
            }),
        }
    }
}

impl Appender for GelfHttpAppender {
    fn activate_options(&mut self) {}

    fn append(&mut self, event: &LogEvent, ctx: &DiagnosticContext) -> Result<()> {
        let body = self
            .formatter
            .format(&self.config, event, ctx, None)
            .to_json()?;
        if let Err(err) = self.post(&body) {
            (self.warn)(&format!("{}", err));
        }
        Ok(())
    }

    fn close(&mut self) {}

    fn config(&self) -> &GelfConfig {
        &self.config
    }
    fn config_mut(&mut self) -> &mut GelfConfig {
        &mut self.config
    }
}
