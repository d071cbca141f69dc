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
//! The log record appenders consume.

use crate::level::Level;

use chrono::prelude::*;

/// One log record, as handed over by the host framework.
///
/// Note that the GELF `timestamp` is taken when the message is built, not from
/// [`LogEvent::timestamp`]; the latter is carried for hosts that want it.
#[derive(Clone, Debug)]
pub struct LogEvent {
    pub message: String,
    pub level: Level,
    pub logger: String,
    pub timestamp: DateTime<Utc>,
}

impl LogEvent {
    /// Construct an event stamped with the current time.
    pub fn new<L: Into<String>, M: Into<String>>(level: Level, logger: L, message: M) -> LogEvent {
        LogEvent {
            message: message.into(),
            level,
            logger: logger.into(),
            timestamp: Utc::now(),
        }
    }
}
