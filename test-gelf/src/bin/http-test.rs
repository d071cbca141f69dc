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

//! POST a few messages to a GELF HTTP input on port 12201 of the local host.

use gelf_tracing::{
    config::GelfConfig, http::GelfHttpAppender, layer::GelfLayer, level::SeverityEncoding,
    message::ShortMessage,
};
use tracing::{debug, error, info, trace, warn};
use tracing_subscriber::{
    layer::SubscriberExt, // Needed to get `with()`
    registry::Registry,
};

pub fn main() {
    let config = GelfConfig::builder()
        .facility("http-test")
        .severity(SeverityEncoding::Textual)
        .short_message(ShortMessage::Synthetic)
        .build();
    let subscriber = Registry::default().with(GelfLayer::new(GelfHttpAppender::new(config)));
    let _guard = tracing::subscriber::set_default(subscriber);

    trace!("你好, HTTP.");
    debug!("你好, HTTP.");
    info!("你好, HTTP.");
    warn!("你好, HTTP.");
    error!("{}", "你好, HTTP. ".repeat(40));
}
