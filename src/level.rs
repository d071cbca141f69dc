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
//! Host levels & GELF severities.
//!
//! [`Level`] models the severity scale of the logging framework feeding us events; it follows the
//! log4j family (FATAL through TRACE, plus the ALL & OFF sentinels) since that's what most hosts
//! speak. [`SeverityEncoding`] picks how a [`Level`] is rendered into a GELF message: as a numeric
//! syslog severity in the standard `level` field, or as a name in an additional `_severity` field.
//!
//! The mapping is total; anything without a dedicated code lands on syslog "alert" (1).

use serde::Deserialize;

type StdResult<T, E> = std::result::Result<T, E>;

/// The host framework's view of how important an event is.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Level {
    Off,
    Fatal,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
    All,
    /// A level value this crate has no name for
    Other(i32),
}

impl Level {
    /// Decode the integer representation used by log4j & its ports (log4php, log4net, ...).
    pub fn from_int(level: i32) -> Level {
        match level {
            i32::MAX => Level::Off,
            50000 => Level::Fatal,
            40000 => Level::Error,
            30000 => Level::Warn,
            20000 => Level::Info,
            10000 => Level::Debug,
            5000 => Level::Trace,
            i32::MIN => Level::All,
            n => Level::Other(n),
        }
    }

    /// Syslog severity for this level, as carried in the GELF `level` field.
    pub fn syslog_severity(&self) -> u8 {
        match self {
            Level::Fatal => 2, // critical
            Level::Error => 3,
            Level::Warn => 4,
            Level::Info => 6,
            Level::Debug => 7,
            _ => 1, // alert
        }
    }

    /// Human-readable severity, as carried in the `_severity` additional field.
    pub fn severity_name(&self) -> &'static str {
        match self {
            Level::Fatal => "Fatal",
            Level::Error => "Error",
            Level::Warn => "Warning",
            Level::Info => "Info",
            Level::Debug => "Debug",
            _ => "Alert",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> StdResult<(), std::fmt::Error> {
        match self {
            Level::Off => write!(f, "OFF"),
            Level::Fatal => write!(f, "FATAL"),
            Level::Error => write!(f, "ERROR"),
            Level::Warn => write!(f, "WARN"),
            Level::Info => write!(f, "INFO"),
            Level::Debug => write!(f, "DEBUG"),
            Level::Trace => write!(f, "TRACE"),
            Level::All => write!(f, "ALL"),
            Level::Other(n) => write!(f, "LEVEL({})", n),
        }
    }
}

impl std::convert::From<&tracing::Level> for Level {
    fn from(level: &tracing::Level) -> Self {
        match *level {
            tracing::Level::ERROR => Level::Error,
            tracing::Level::WARN => Level::Warn,
            tracing::Level::INFO => Level::Info,
            tracing::Level::DEBUG => Level::Debug,
            tracing::Level::TRACE => Level::Trace,
        }
    }
}

/// How severities are written into outgoing messages.
#[derive(Copy, Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SeverityEncoding {
    /// `"level": 3`
    #[default]
    Numeric,
    /// `"_severity": "Error"`
    Textual,
}

/// A mapped severity, ready for serialization.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Severity {
    Numeric(u8),
    Textual(&'static str),
}

impl SeverityEncoding {
    pub fn map(&self, level: Level) -> Severity {
        match self {
            SeverityEncoding::Numeric => Severity::Numeric(level.syslog_severity()),
            SeverityEncoding::Textual => Severity::Textual(level.severity_name()),
        }
    }
}

#[cfg(test)]
mod level_tests {
    use super::*;

    #[test]
    fn numeric_scale() {
        assert_eq!(2, Level::Fatal.syslog_severity());
        assert_eq!(3, Level::Error.syslog_severity());
        assert_eq!(4, Level::Warn.syslog_severity());
        assert_eq!(6, Level::Info.syslog_severity());
        assert_eq!(7, Level::Debug.syslog_severity());
        for level in [Level::Trace, Level::All, Level::Off, Level::Other(42)] {
            assert_eq!(1, level.syslog_severity(), "{}", level);
        }
    }

    #[test]
    fn textual_scale() {
        assert_eq!(
            SeverityEncoding::Textual.map(Level::Warn),
            Severity::Textual("Warning")
        );
        assert_eq!(
            SeverityEncoding::Textual.map(Level::Fatal),
            Severity::Textual("Fatal")
        );
        assert_eq!(
            SeverityEncoding::Textual.map(Level::Other(-7)),
            Severity::Textual("Alert")
        );
        assert_eq!(
            SeverityEncoding::Numeric.map(Level::Info),
            Severity::Numeric(6)
        );
    }

    #[test]
    fn log4j_integers() {
        assert_eq!(Level::from_int(40000), Level::Error);
        assert_eq!(Level::from_int(5000), Level::Trace);
        assert_eq!(Level::from_int(i32::MAX), Level::Off);
        assert_eq!(Level::from_int(12345), Level::Other(12345));
        assert_eq!(Level::from_int(12345).syslog_severity(), 1);
        assert_eq!(format!("{}", Level::from_int(30000)), "WARN");
    }

    #[test]
    fn from_tracing() {
        assert_eq!(Level::from(&tracing::Level::ERROR), Level::Error);
        assert_eq!(Level::from(&tracing::Level::TRACE).severity_name(), "Alert");
    }
}
