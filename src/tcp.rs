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

//! Shipping GELF messages over a persistent TCP stream.
//!
//! [`GelfTcpAppender`] is a two-state machine: it's either connected (it holds a stream) or it
//! isn't. Connection is attempted eagerly by [`Appender::activate_options`] and lazily by
//! [`Appender::append`] whenever there's no stream. Delivery is best-effort & at-most-once:
//!
//! - if no connection can be established, the record is dropped (after a warning)
//! - if a write fails or comes up short, a warning is issued, the stream is torn down and a single
//!   reconnection is attempted; the record that failed is _not_ re-sent
//!
//! Every network operation is bounded by [`GelfConfig::timeout`].

use crate::{
    appender::{default_warning_sink, Appender, WarningSink},
    config::GelfConfig,
    context::DiagnosticContext,
    error::{Error, Result},
    event::LogEvent,
    message::GelfFormatter,
    transport::{frame, write_frame, Connect, TcpConnector},
};

use backtrace::Backtrace;

/// An [`Appender`] writing NUL-delimited GELF over TCP.
pub struct GelfTcpAppender<C: Connect = TcpConnector> {
    config: GelfConfig,
    formatter: GelfFormatter,
    connector: C,
    stream: Option<C::Stream>,
    warn: WarningSink,
}

impl GelfTcpAppender<TcpConnector> {
    pub fn new(config: GelfConfig) -> Self {
        GelfTcpAppender::with_connector(config, TcpConnector)
    }
}

impl std::default::Default for GelfTcpAppender<TcpConnector> {
    /// Target `127.0.0.1:12201`
    fn default() -> Self {
        GelfTcpAppender::new(GelfConfig::default())
    }
}

impl<C: Connect> GelfTcpAppender<C> {
    pub fn with_connector(config: GelfConfig, connector: C) -> Self {
        GelfTcpAppender {
            config,
            formatter: GelfFormatter::default(),
            connector,
            stream: None,
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
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Drop any existing stream & try to open a new one. Returns true on success.
    fn connect(&mut self) -> bool {
        self.close();
        match self
            .connector
            .connect(&self.config.host, self.config.port, self.config.timeout())
        {
            Ok(stream) => {
                ::tracing::debug!("connected to GELF endpoint {}", self.config.endpoint());
                self.stream = Some(stream);
                true
            }
            Err(err) => {
                let err = Error::Connect {
                    host: self.config.host.clone(),
                    port: self.config.port,
                    source: err,
                    back: Backtrace::new(),
                };
                (self.warn)(&format!("{}", err));
                false
            }
        }
    }
}

impl<C: Connect> Appender for GelfTcpAppender<C> {
    fn activate_options(&mut self) {
        self.connect();
    }

    fn append(&mut self, event: &LogEvent, ctx: &DiagnosticContext) -> Result<()> {
        if !self.is_connected() && !self.connect() {
            return Ok(());
        }

        let buf = frame(
            self.formatter
                .format(&self.config, event, ctx, None)
                .to_json()?,
        );

        let sent = match self.stream.as_mut() {
            Some(stream) => write_frame(stream, &buf),
            None => return Ok(()),
        };
        if let Err(err) = sent {
            (self.warn)(&format!(
                "Error sending GELF message to {}: {}. Reconnecting...",
                self.config.endpoint(),
                err
            ));
            self.connect();
        }
        Ok(())
    }

    fn close(&mut self) {
        // Dropping the stream closes the socket.
        self.stream = None;
    }

    fn config(&self) -> &GelfConfig {
        &self.config
    }
    fn config_mut(&mut self) -> &mut GelfConfig {
        &mut self.config
    }
}

impl<C: Connect> Drop for GelfTcpAppender<C> {
    fn drop(&mut self) {
        self.close();
    }
}
