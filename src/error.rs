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
//! [gelf-tracing](crate) errors

use backtrace::Backtrace;

/// [gelf-tracing](crate) error type
///
/// [gelf-tracing](crate) eschews libraries like [thiserror], [anyhow] & [Snafu] in favor of
/// a straightforward enumeration with a few match arms chosen on the basis what the caller will
/// need to repond.
///
/// Most of these never reach the caller: connection, write & HTTP failures are reported through
/// the appender's warning sink and the offending message is dropped. Only [`Error::Serialize`]
/// propagates out of [`Appender::append`](crate::appender::Appender::append).
///
/// [thiserror]: https://docs.rs/thiserror
/// [anyhow]: https://docs.rs/anyhow
/// [Snafu]: https://docs.rs/snafu/latest/snafu
#[non_exhaustive]
pub enum Error {
    /// Failed to open a TCP stream to the GELF endpoint
    Connect {
        host: String,
        port: u16,
        source: std::io::Error,
        back: Backtrace,
    },
    /// Writing a frame to an open stream failed outright
    Write {
        source: std::io::Error,
        back: Backtrace,
    },
    /// The stream accepted fewer bytes than the frame holds
    ShortWrite {
        written: usize,
        expected: usize,
        back: Backtrace,
    },
    /// HTTP request never got a response (DNS, refused, timed-out...)
    Http {
        source: Box<ureq::Error>,
        back: Backtrace,
    },
    /// The GELF HTTP input answered with a status >= 400
    HttpStatus { status: u16, back: Backtrace },
    /// A GELF message couldn't be rendered to JSON
    Serialize {
        source: serde_json::Error,
        back: Backtrace,
    },
    /// A tracing Event had no message field
    NoMessageField {
        name: &'static str,
        back: Backtrace,
    },
}

impl std::fmt::Display for Error {
    // `Error` is non-exhaustive so that adding variants won't be a breaking change to our
    // callers. That means the compiler won't catch us if we miss a variant here, so we
    // always include a `_` arm.
    #[allow(unreachable_patterns)]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Connect {
                host, port, source, ..
            } => match source.raw_os_error() {
                Some(errno) => write!(
                    f,
                    "Can not connect to GELF endpoint ({}:{}): {} ({})",
                    host, port, source, errno
                ),
                None => write!(
                    f,
                    "Can not connect to GELF endpoint ({}:{}): {}",
                    host, port, source
                ),
            },
            Error::Write { source, .. } => write!(f, "While writing a GELF frame, got {}", source),
            Error::ShortWrite {
                written, expected, ..
            } => write!(
                f,
                "Short write on GELF stream: {} of {} bytes sent",
                written, expected
            ),
            Error::Http { source, .. } => write!(f, "While POSTing a GELF message, got {}", source),
            Error::HttpStatus { status, .. } => {
                write!(f, "GELF HTTP endpoint rejected the message: status {}", status)
            }
            Error::Serialize { source, .. } => {
                write!(f, "While serializing a GELF message, got {}", source)
            }
            Error::NoMessageField { name, .. } => write!(
                f,
                "Event '{}' had no message field, and so was not forwarded to the GELF endpoint",
                name
            ),
            _ => write!(f, "Other gelf-tracing error"),
        }
    }
}

impl std::fmt::Debug for Error {
    #[allow(unreachable_patterns)]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Connect { back, .. } => write!(f, "{}\n{:#?}", self, back),
            Error::Write { back, .. } => write!(f, "{}\n{:#?}", self, back),
            Error::ShortWrite { back, .. } => write!(f, "{}\n{:#?}", self, back),
            Error::Http { back, .. } => write!(f, "{}\n{:#?}", self, back),
            Error::HttpStatus { back, .. } => write!(f, "{}\n{:#?}", self, back),
            Error::Serialize { back, .. } => write!(f, "{}\n{:#?}", self, back),
            Error::NoMessageField { back, .. } => write!(f, "{}\n{:#?}", self, back),
            err => write!(f, "gelf-tracing error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Connect { source, .. } | Error::Write { source, .. } => Some(source),
            Error::Http { source, .. } => Some(source.as_ref()),
            Error::Serialize { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
