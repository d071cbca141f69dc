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

//! The GELF TCP transport layer.
//!
//! GELF over TCP is a plain byte stream of JSON documents, each terminated by a single NUL byte
//! (the receiver splits on `\0`; there's no length prefix). This module provides the framing
//! primitives and the [`Connect`] trait through which
//! [`GelfTcpAppender`](crate::tcp::GelfTcpAppender) obtains its streams.
//!
//! # Examples
//!
//! ```rust
//! use gelf_tracing::transport::frame;
//! assert_eq!(frame(b"{}".to_vec()), b"{}\0".to_vec());
//! ```

use crate::error::{Error, Result};

use backtrace::Backtrace;
use bytes::buf::BufMut;

use std::{
    io::{self, Write},
    net::{TcpStream, ToSocketAddrs},
    time::Duration,
};

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                      transport mechanisms                                      //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// Something that can open a byte stream to a GELF input.
///
/// [`TcpConnector`] is the real thing; the trait exists so that the connection state machine can
/// be driven against other streams (in-memory ones, in particular).
pub trait Connect {
    type Stream: Write;
    /// Open a stream to `host`:`port`, giving up after `timeout`. Implementations should apply the
    /// same `timeout` to subsequent reads & writes.
    fn connect(&self, host: &str, port: u16, timeout: Duration) -> io::Result<Self::Stream>;
}

/// Opens plain [`TcpStream`]s.
#[derive(Clone, Copy, Debug, Default)]
pub struct TcpConnector;

impl Connect for TcpConnector {
    type Stream = TcpStream;
    fn connect(&self, host: &str, port: u16, timeout: Duration) -> io::Result<TcpStream> {
        let mut last_err = None;
        for addr in (host, port).to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, timeout) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(timeout))?;
                    stream.set_write_timeout(Some(timeout))?;
                    return Ok(stream);
                }
                Err(err) => last_err = Some(err),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("{}:{} resolved to no addresses", host, port),
            )
        }))
    }
}

/// Terminate a serialized message with the GELF-TCP frame delimiter.
pub fn frame(mut json: Vec<u8>) -> Vec<u8> {
    json.put_u8(0);
    json
}

/// Write `buf` to `writer` in a single call.
///
/// Anything short of the whole frame is an error; the remainder is not written.
pub fn write_frame<W: Write>(writer: &mut W, buf: &[u8]) -> Result<()> {
    let written = writer.write(buf).map_err(|err| Error::Write {
        source: err,
        back: Backtrace::new(),
    })?;
    if written < buf.len() {
        return Err(Error::ShortWrite {
            written,
            expected: buf.len(),
            back: Backtrace::new(),
        });
    }
    writer.flush().map_err(|err| Error::Write {
        source: err,
        back: Backtrace::new(),
    })
}
