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
//! GELF message construction.
//!
//! [`GelfFormatter`] turns a [`LogEvent`] plus its [`DiagnosticContext`] into a [`GelfMessage`],
//! which in turn knows how to render itself as compact JSON. The shape of the message depends on
//! the [`GelfConfig`] in force:
//!
//! - [`SeverityEncoding`] picks between the numeric `level` field & the textual `_severity` field
//! - [`ShortMessage`] picks between a truncated copy of the message text & a synthetic summary
//! - [`FieldNaming`] picks between `host`/`_application` and `_source`/`application`
//!
//! Whatever the dialect, `version`, `short_message`, `full_message`, `timestamp`, `facility` and
//! `_logger` are always present; `_client_ip` & `_logged_user` only when the context has them.
//!
//! [`SeverityEncoding`]: crate::level::SeverityEncoding

use crate::{
    config::GelfConfig,
    context::{DiagnosticContext, CLIENT_IP, LOGGED_USER},
    error::{Error, Result},
    event::LogEvent,
    level::Severity,
};

use backtrace::Backtrace;
use chrono::prelude::*;
use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};

use std::borrow::Cow;

type StdResult<T, E> = std::result::Result<T, E>;

pub const GELF_VERSION: &str = "1.1";
/// `short_message` never exceeds this many characters
pub const SHORT_MESSAGE_MAX: usize = 250;
const ELLIPSIS: &str = "...";

/// How `short_message` is derived.
#[derive(Copy, Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ShortMessage {
    /// The message text, cut to [`SHORT_MESSAGE_MAX`] characters
    #[default]
    Truncated,
    /// `"Log <severity>"`, regardless of the message text
    Synthetic,
}

/// Names used for the source host & application fields.
#[derive(Copy, Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldNaming {
    /// `host` & `_application`
    #[default]
    Standard,
    /// `_source` & `application`
    Source,
}

impl FieldNaming {
    fn host_key(&self) -> &'static str {
        match self {
            FieldNaming::Standard => "host",
            FieldNaming::Source => "_source",
        }
    }
    fn application_key(&self) -> &'static str {
        match self {
            FieldNaming::Standard => "_application",
            FieldNaming::Source => "application",
        }
    }
}

/// Cut `text` down to at most [`SHORT_MESSAGE_MAX`] characters.
///
/// Text that's already short enough is returned as-is; anything longer keeps its first 247
/// characters followed by "...". Lengths are counted in `char`s, so a multi-byte sequence is
/// never split.
pub fn truncate_short_message(text: &str) -> Cow<'_, str> {
    if text.char_indices().nth(SHORT_MESSAGE_MAX).is_none() {
        return Cow::Borrowed(text);
    }
    let end = text
        .char_indices()
        .nth(SHORT_MESSAGE_MAX - ELLIPSIS.len())
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    Cow::Owned(format!("{}{}", &text[..end], ELLIPSIS))
}

/// A GELF message, ready to go on the wire.
#[derive(Clone, Debug, PartialEq)]
pub struct GelfMessage {
    pub host: String,
    pub short_message: String,
    pub full_message: String,
    /// Seconds since the epoch, with microsecond resolution
    pub timestamp: f64,
    pub severity: Severity,
    pub facility: String,
    pub application: Option<String>,
    pub logger: String,
    pub client_ip: Option<String>,
    pub logged_user: Option<String>,
    pub naming: FieldNaming,
}

impl GelfMessage {
    /// Render this message as compact JSON.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|err| Error::Serialize {
            source: err,
            back: Backtrace::new(),
        })
    }
}

impl Serialize for GelfMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> StdResult<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("version", GELF_VERSION)?;
        map.serialize_entry(self.naming.host_key(), &self.host)?;
        map.serialize_entry("short_message", &self.short_message)?;
        map.serialize_entry("full_message", &self.full_message)?;
        map.serialize_entry("timestamp", &self.timestamp)?;
        match self.severity {
            Severity::Numeric(n) => map.serialize_entry("level", &n)?,
            Severity::Textual(s) => map.serialize_entry("_severity", s)?,
        }
        map.serialize_entry("facility", &self.facility)?;
        if let Some(application) = &self.application {
            map.serialize_entry(self.naming.application_key(), application)?;
        }
        map.serialize_entry("_logger", &self.logger)?;
        if let Some(client_ip) = &self.client_ip {
            map.serialize_entry("_client_ip", client_ip)?;
        }
        if let Some(logged_user) = &self.logged_user {
            map.serialize_entry("_logged_user", logged_user)?;
        }
        map.end()
    }
}

/// Attempt to figure-out the name under which our messages should be filed.
///
/// We first try [gethostname()]; failing that, the local IP address; failing _that_, "-".
///
/// [gethostname()]: https://man7.org/linux/man-pages/man2/gethostname.2.html
fn resolve_hostname() -> String {
    hostname::get()
        .ok()
        .and_then(|hn| hn.into_string().ok())
        .filter(|hn| !hn.is_empty())
        .or_else(|| local_ip_address::local_ip().ok().map(|ip| ip.to_string()))
        .unwrap_or_else(|| "-".to_string())
}

/// Builds [`GelfMessage`]s from [`LogEvent`]s.
pub struct GelfFormatter {
    hostname: String,
}

impl std::default::Default for GelfFormatter {
    fn default() -> Self {
        GelfFormatter {
            hostname: resolve_hostname(),
        }
    }
}

impl GelfFormatter {
    pub fn with_hostname<S: Into<String>>(hostname: S) -> GelfFormatter {
        GelfFormatter {
            hostname: hostname.into(),
        }
    }
    pub fn hostname(&self) -> &str {
        &self.hostname
    }
    /// Build the message for `event`; `timestamp` defaults to now.
    pub fn format(
        &self,
        config: &GelfConfig,
        event: &LogEvent,
        ctx: &DiagnosticContext,
        timestamp: Option<DateTime<Utc>>,
    ) -> GelfMessage {
        let now = timestamp.unwrap_or_else(Utc::now);
        let short_message = match config.short_message {
            ShortMessage::Truncated => truncate_short_message(&event.message).into_owned(),
            ShortMessage::Synthetic => format!("Log {}", event.level.severity_name()),
        };
        GelfMessage {
            host: self.hostname.clone(),
            short_message,
            full_message: event.message.clone(),
            timestamp: now.timestamp() as f64 + now.timestamp_subsec_micros() as f64 / 1e6,
            severity: config.severity.map(event.level),
            facility: config.facility.clone(),
            application: config.application.clone(),
            logger: event.logger.clone(),
            client_ip: ctx.get(CLIENT_IP).map(str::to_string),
            logged_user: ctx.get(LOGGED_USER).map(str::to_string),
            naming: config.field_naming,
        }
    }
}

#[cfg(test)]
mod test {

    use super::*;

    use crate::level::{Level, SeverityEncoding};

    use serde_json::Value;

    fn config() -> GelfConfig {
        GelfConfig::builder()
            .facility("unit-tests")
            .application(Some("myApp"))
            .build()
    }

    fn render(config: &GelfConfig, event: &LogEvent, ctx: &DiagnosticContext) -> Value {
        let msg = GelfFormatter::with_hostname("bree.local").format(
            config,
            event,
            ctx,
            Some(std::time::UNIX_EPOCH.into()),
        );
        serde_json::from_slice(&msg.to_json().unwrap()).unwrap()
    }

    #[test]
    fn short_text_is_untouched() {
        let text = "x".repeat(250);
        assert_eq!(truncate_short_message(&text), text.as_str());
        assert_eq!(truncate_short_message(""), "");
    }

    #[test]
    fn long_text_is_cut_to_250() {
        let text = "y".repeat(251);
        let short = truncate_short_message(&text);
        assert_eq!(short.chars().count(), 250);
        assert!(short.ends_with("..."));
        assert_eq!(&short[..247], &text[..247]);
    }

    #[test]
    fn truncation_counts_chars() {
        let text = "世".repeat(300);
        let short = truncate_short_message(&text);
        assert_eq!(short.chars().count(), 250);
        assert!(short.starts_with(&"世".repeat(247)));
        assert!(short.ends_with("..."));
    }

    #[test]
    fn three_hundred_as_at_error() {
        let text = "A".repeat(300);
        let event = LogEvent::new(Level::Error, "app.billing", text.clone());
        let v = render(&config(), &event, &DiagnosticContext::new());

        assert_eq!(v["version"], "1.1");
        assert_eq!(v["host"], "bree.local");
        assert_eq!(v["level"], 3);
        assert_eq!(v["short_message"], format!("{}...", "A".repeat(247)));
        assert_eq!(v["full_message"], text);
        assert_eq!(v["facility"], "unit-tests");
        assert_eq!(v["_application"], "myApp");
        assert_eq!(v["_logger"], "app.billing");
        assert_eq!(v["timestamp"], 0.0);
        assert!(v.get("_client_ip").is_none());
        assert!(v.get("_logged_user").is_none());
        assert!(v.get("_severity").is_none());
    }

    #[test]
    fn textual_source_dialect() {
        let config = GelfConfig::builder()
            .severity(SeverityEncoding::Textual)
            .field_naming(FieldNaming::Source)
            .application(Some("myApp"))
            .build();
        let event = LogEvent::new(Level::Error, "root", "A".repeat(300));
        let v = render(&config, &event, &DiagnosticContext::new());

        assert_eq!(v["_severity"], "Error");
        assert_eq!(v["_source"], "bree.local");
        assert_eq!(v["application"], "myApp");
        assert!(v.get("level").is_none());
        assert!(v.get("host").is_none());
        assert!(v.get("_application").is_none());
    }

    #[test]
    fn synthetic_short_message() {
        let config = GelfConfig::builder()
            .short_message(ShortMessage::Synthetic)
            .build();
        let event = LogEvent::new(Level::Warn, "root", "disk is 93% full");
        let v = render(&config, &event, &DiagnosticContext::new());
        assert_eq!(v["short_message"], "Log Warning");
        assert_eq!(v["full_message"], "disk is 93% full");
        assert_eq!(v["level"], 4);
    }

    #[test]
    fn context_fields_carried_verbatim() {
        let mut ctx = DiagnosticContext::new();
        ctx.put(CLIENT_IP, "192.168.1.17");
        ctx.put(LOGGED_USER, "user #42");
        let event = LogEvent::new(Level::Info, "web", "GET /");
        let v = render(&config(), &event, &ctx);
        assert_eq!(v["_client_ip"], "192.168.1.17");
        assert_eq!(v["_logged_user"], "user #42");
        assert_eq!(v["short_message"], v["full_message"]);
    }

    #[test]
    fn no_application() {
        let config = GelfConfig::builder().application(None::<String>).build();
        let event = LogEvent::new(Level::Debug, "root", "hi");
        let v = render(&config, &event, &DiagnosticContext::new());
        assert!(v.get("_application").is_none());
        assert!(v.get("application").is_none());
        assert_eq!(v["level"], 7);
    }

    #[test]
    fn fractional_timestamp() {
        let ts = Utc.timestamp_opt(1_700_000_000, 250_000_000).unwrap();
        let event = LogEvent::new(Level::Info, "root", "tick");
        let msg = GelfFormatter::with_hostname("h").format(
            &config(),
            &event,
            &DiagnosticContext::new(),
            Some(ts),
        );
        assert!((msg.timestamp - 1_700_000_000.25).abs() < 1e-6);
    }

    #[test]
    fn field_order_is_stable() {
        let event = LogEvent::new(Level::Info, "root", "hello");
        let msg = GelfFormatter::with_hostname("h").format(
            &config(),
            &event,
            &DiagnosticContext::new(),
            Some(std::time::UNIX_EPOCH.into()),
        );
        let json = String::from_utf8(msg.to_json().unwrap()).unwrap();
        assert_eq!(
            json,
            r#"{"version":"1.1","host":"h","short_message":"hello","full_message":"hello","timestamp":0.0,"level":6,"facility":"unit-tests","_application":"myApp","_logger":"root"}"#
        );
    }
}
