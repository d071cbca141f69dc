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

//! Send a few messages to a GELF TCP input on port 12201 of the local host.

use gelf_tracing::{config::GelfConfig, layer::GelfLayer, tcp::GelfTcpAppender};
use tracing::{debug, error, info, info_span, trace, warn};
use tracing_subscriber::{
    layer::SubscriberExt, // Needed to get `with()`
    registry::Registry,
};

pub fn main() {
    // Setup the real subsriber...
    let subscriber = Registry::default().with(GelfLayer::new(GelfTcpAppender::new(
        GelfConfig::builder().facility("tcp-test").build(),
    )));
    // and install it.
    let _guard = tracing::subscriber::set_default(subscriber);

    trace!("你好, TCP socket.");
    debug!("你好, TCP socket.");
    info!("你好, TCP socket.");
    warn!("你好, TCP socket.");
    error!("你好, TCP socket.");

    info_span!("request", client_ip = "127.0.0.1", logged_user = "tcp-test").in_scope(|| {
        info!("你好, TCP socket, from within a request.");
    });
}
