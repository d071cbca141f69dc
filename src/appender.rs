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
//! The contract between a host logging framework & a GELF delivery channel.
//!
//! A host configures an [`Appender`] (via the setters, or by handing it a
//! [`GelfConfig`](crate::config::GelfConfig)), calls [`Appender::activate_options`] once
//! configuration is complete, then [`Appender::append`] for every log record, and finally
//! [`Appender::close`] on shutdown.
//!
//! Delivery problems never reach the host: appenders report them through a [`WarningSink`] and
//! drop the record. The default sink forwards to [`tracing::warn!`].

use crate::{config::GelfConfig, context::DiagnosticContext, error::Result, event::LogEvent};

/// Where an appender reports delivery trouble.
pub type WarningSink = Box<dyn Fn(&str) + Send + Sync>;

pub(crate) fn default_warning_sink() -> WarningSink {
    Box::new(|msg: &str| ::tracing::warn!("{}", msg))
}

/// Operations every GELF delivery channel supports.
pub trait Appender {
    /// Called once the configuration is in place.
    fn activate_options(&mut self);
    /// Format & ship one record.
    ///
    /// Only a failure to serialize the message is returned; connection & transport trouble is
    /// reported through the appender's [`WarningSink`] and the record is dropped.
    fn append(&mut self, event: &LogEvent, ctx: &DiagnosticContext) -> Result<()>;
    /// Release any resources held. Idempotent.
    fn close(&mut self);

    fn config(&self) -> &GelfConfig;
    fn config_mut(&mut self) -> &mut GelfConfig;

    /// Takes effect at the next connection attempt; an open connection is left alone.
    fn set_host(&mut self, host: &str) {
        self.config_mut().host = host.to_string();
    }
    /// Takes effect at the next connection attempt; an open connection is left alone.
    fn set_port(&mut self, port: u16) {
        self.config_mut().port = port;
    }
    fn set_facility(&mut self, facility: &str) {
        self.config_mut().facility = facility.to_string();
    }
    fn set_application(&mut self, application: Option<&str>) {
        self.config_mut().application = application.map(str::to_string);
    }
}
