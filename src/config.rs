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
//! Appender configuration.
//!
//! [`GelfConfig`] gathers everything an appender needs to know: where the GELF input lives, how
//! to label our messages, and which of the message dialects to speak. It derives
//! [`serde::Deserialize`] (every field has a default) so hosts can pull it out of whatever
//! configuration format they already use; it can also be put together in code:
//!
//! ```rust
//! use gelf_tracing::config::GelfConfig;
//! use gelf_tracing::level::SeverityEncoding;
//!
//! let config = GelfConfig::builder()
//!     .host("graylog.local")
//!     .port(12201)
//!     .facility("billing")
//!     .severity(SeverityEncoding::Textual)
//!     .build();
//! assert_eq!(config.endpoint(), "graylog.local:12201");
//! ```

use crate::{
    level::SeverityEncoding,
    message::{FieldNaming, ShortMessage},
};

use serde::Deserialize;

use std::time::Duration;

/// Default GELF port, for both TCP & HTTP inputs
pub const DEFAULT_PORT: u16 = 12201;
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_FACILITY: &str = "gelf-tracing";
/// Connect, read/write & HTTP request timeout
pub const DEFAULT_TIMEOUT_MS: u64 = 2000;

/// Everything an appender needs to know.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GelfConfig {
    pub host: String,
    pub port: u16,
    pub facility: String,
    /// Sent as `_application` (or `application`); omitted when `None`
    pub application: Option<String>,
    pub severity: SeverityEncoding,
    pub short_message: ShortMessage,
    pub field_naming: FieldNaming,
    pub timeout_ms: u64,
}

/// Attempt to figure-out an application name.
///
/// This implementation relies on [`std::env::current_exe`]; if for any reason that can't be
/// retrieved, we send no application name at all.
fn default_application() -> Option<String> {
    std::env::current_exe()
        .ok()
        .and_then(|pbuf| pbuf.file_name().map(|s| s.to_string_lossy().into_owned()))
        .filter(|s| !s.is_empty())
}

impl std::default::Default for GelfConfig {
    fn default() -> Self {
        GelfConfig {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            facility: DEFAULT_FACILITY.to_string(),
            application: default_application(),
            severity: SeverityEncoding::default(),
            short_message: ShortMessage::default(),
            field_naming: FieldNaming::default(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl GelfConfig {
    pub fn builder() -> GelfConfigBuilder {
        GelfConfigBuilder {
            imp: GelfConfig::default(),
        }
    }
    /// `host:port`, for display & diagnostics
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
    /// The network timeout; never zero.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.max(1))
    }
}

pub struct GelfConfigBuilder {
    imp: GelfConfig,
}

impl GelfConfigBuilder {
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.imp.host = host.into();
        self
    }
    pub fn port(mut self, port: u16) -> Self {
        self.imp.port = port;
        self
    }
    pub fn facility<S: Into<String>>(mut self, facility: S) -> Self {
        self.imp.facility = facility.into();
        self
    }
    pub fn application<S: Into<String>>(mut self, application: Option<S>) -> Self {
        self.imp.application = application.map(Into::into);
        self
    }
    pub fn severity(mut self, severity: SeverityEncoding) -> Self {
        self.imp.severity = severity;
        self
    }
    pub fn short_message(mut self, short_message: ShortMessage) -> Self {
        self.imp.short_message = short_message;
        self
    }
    pub fn field_naming(mut self, field_naming: FieldNaming) -> Self {
        self.imp.field_naming = field_naming;
        self
    }
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.imp.timeout_ms = timeout.as_millis() as u64;
        self
    }
    pub fn build(self) -> GelfConfig {
        self.imp
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn defaults() {
        let config = GelfConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 12201);
        assert_eq!(config.facility, "gelf-tracing");
        assert_eq!(config.severity, SeverityEncoding::Numeric);
        assert_eq!(config.short_message, ShortMessage::Truncated);
        assert_eq!(config.field_naming, FieldNaming::Standard);
        assert_eq!(config.timeout(), Duration::from_secs(2));
    }

    #[test]
    fn deserialize_partial() {
        let config: GelfConfig = serde_json::from_str(
            r#"{"host": "10.1.2.3", "facility": "shop", "application": null,
                "severity": "textual", "short_message": "synthetic", "field_naming": "source"}"#,
        )
        .unwrap();
        assert_eq!(config.host, "10.1.2.3");
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.facility, "shop");
        assert_eq!(config.application, None);
        assert_eq!(config.severity, SeverityEncoding::Textual);
        assert_eq!(config.short_message, ShortMessage::Synthetic);
        assert_eq!(config.field_naming, FieldNaming::Source);
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn builder_and_zero_timeout() {
        let config = GelfConfig::builder()
            .host("graylog")
            .port(5555)
            .application(Some("myApp"))
            .timeout(Duration::ZERO)
            .build();
        assert_eq!(config.endpoint(), "graylog:5555");
        assert_eq!(config.application.as_deref(), Some("myApp"));
        assert_eq!(config.timeout(), Duration::from_millis(1));
    }
}
