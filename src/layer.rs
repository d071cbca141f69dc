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

//! [gelf-tracing](crate) [`Layer`] implementation.
//!
//! [`Layer`]: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/layer/trait.Layer.html
//!
//! [`GelfLayer`] plugs any [`Appender`] into a [`tracing-subscriber`] stack. For each [`Event`] it:
//!
//! 1. takes the event's "message" field as the record text (events without one are skipped)
//! 2. uses the event's target as the logger name, and maps its level via [`Level`]
//! 3. gathers a [`DiagnosticContext`] from the `client_ip` & `logged_user` fields of the enclosing
//!    spans (outermost first, so inner spans win), and finally of the event itself
//! 4. hands the lot to the appender
//!
//! [`tracing-subscriber`]: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/index.html
//! [`Event`]: https://docs.rs/tracing/0.1.35/tracing/struct.Event.html
//!
//! Appenders report their troubles via `tracing` themselves, so events originating in this crate
//! are ignored here.
//!
//! ```no_run
//! use gelf_tracing::{config::GelfConfig, layer::GelfLayer, tcp::GelfTcpAppender};
//! use tracing::{info, info_span};
//! use tracing_subscriber::layer::SubscriberExt; // Needed to get `with()`
//! use tracing_subscriber::registry::Registry;
//!
//! let appender = GelfTcpAppender::new(GelfConfig::builder().host("graylog.local").build());
//! let subscriber = Registry::default().with(GelfLayer::new(appender));
//! let _guard = tracing::subscriber::set_default(subscriber);
//!
//! let span = info_span!("request", client_ip = "10.0.0.7", logged_user = "frodo");
//! let _enter = span.enter();
//! info!("Hello, world!");
//! ```

use crate::{
    appender::Appender,
    context::{DiagnosticContext, CLIENT_IP, LOGGED_USER},
    error::Error,
    event::LogEvent,
    level::Level,
};

use backtrace::Backtrace;
use parking_lot::Mutex;
use tracing::{
    field::{Field, Visit},
    span::{Attributes, Id, Record},
    Event,
};
use tracing_subscriber::{layer::Context, registry::LookupSpan};

const OWN_TARGET: &str = env!("CARGO_CRATE_NAME");

fn is_own_target(target: &str) -> bool {
    target
        .strip_prefix(OWN_TARGET)
        .map_or(false, |rest| rest.is_empty() || rest.starts_with("::"))
}

fn is_context_key(name: &str) -> bool {
    name == CLIENT_IP || name == LOGGED_USER
}

/// Collects the diagnostic context fields off a span or event.
struct ContextVisitor<'a>(&'a mut DiagnosticContext);

impl<'a> Visit for ContextVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if is_context_key(field.name()) {
            self.0.put(field.name(), value);
        }
    }
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if is_context_key(field.name()) {
            self.0.put(field.name(), format!("{:?}", value));
        }
    }
}

/// Pulls the "message" field (and any context fields) off an event.
struct EventVisitor<'a> {
    message: Option<String>,
    ctx: ContextVisitor<'a>,
}

impl<'a> Visit for EventVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.ctx.record_str(field, value);
        }
    }
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            // The tracing macros "pre-format" the message field so that `value` refers to a
            // `std::fmt::Arguments` instance, which prints without enclosing double-quotes.
            self.message = Some(format!("{:?}", value));
        } else {
            self.ctx.record_debug(field, value);
        }
    }
}

/// A [`tracing-subscriber`]-compliant [`Layer`] implementation that forwards [`Event`]s to an
/// [`Appender`].
///
/// The appender is held behind a mutex, so a single appender is never driven from two threads at
/// once.
///
/// [`tracing-subscriber`]: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/index.html
/// [`Layer`]: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/layer/trait.Layer.html
/// [`Event`]: https://docs.rs/tracing/0.1.35/tracing/struct.Event.html
pub struct GelfLayer<A: Appender> {
    appender: Mutex<A>,
}

impl<A: Appender> GelfLayer<A> {
    /// Activate `appender` & wrap it up in a [`Layer`].
    ///
    /// [`Layer`]: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/layer/trait.Layer.html
    pub fn new(mut appender: A) -> Self {
        appender.activate_options();
        GelfLayer {
            appender: Mutex::new(appender),
        }
    }
    /// Run `f` against the underlying appender, e.g. to reconfigure it.
    pub fn with_appender<R, F: FnOnce(&mut A) -> R>(&self, f: F) -> R {
        f(&mut *self.appender.lock())
    }
}

impl<A: Appender> Drop for GelfLayer<A> {
    fn drop(&mut self) {
        self.appender.get_mut().close();
    }
}

impl<S, A> tracing_subscriber::layer::Layer<S> for GelfLayer<A>
where
    S: tracing_core::subscriber::Subscriber + for<'a> LookupSpan<'a>,
    A: Appender + Send + 'static,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let mut dc = DiagnosticContext::new();
        attrs.record(&mut ContextVisitor(&mut dc));
        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(dc);
        }
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(id) {
            let mut extensions = span.extensions_mut();
            match extensions.get_mut::<DiagnosticContext>() {
                Some(dc) => values.record(&mut ContextVisitor(dc)),
                None => {
                    let mut dc = DiagnosticContext::new();
                    values.record(&mut ContextVisitor(&mut dc));
                    extensions.insert(dc);
                }
            }
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let meta = event.metadata();
        if is_own_target(meta.target()) {
            return;
        }

        let mut dc = DiagnosticContext::new();
        if let Some(scope) = ctx.event_scope(event) {
            for span in scope.from_root() {
                if let Some(span_dc) = span.extensions().get::<DiagnosticContext>() {
                    dc.merge(span_dc);
                }
            }
        }

        let mut visitor = EventVisitor {
            message: None,
            ctx: ContextVisitor(&mut dc),
        };
        event.record(&mut visitor);
        let message = match visitor.message {
            Some(message) => message,
            None => {
                let err = Error::NoMessageField {
                    name: meta.name(),
                    back: Backtrace::new(),
                };
                ::tracing::warn!("{}", err);
                return;
            }
        };

        let record = LogEvent::new(Level::from(meta.level()), meta.target(), message);
        if let Err(err) = self.appender.lock().append(&record, &dc) {
            ::tracing::error!("{}", err);
        }
    }
}

#[cfg(test)]
mod test {

    use super::*;

    use crate::config::GelfConfig;

    use std::sync::Arc;

    use tracing::{info, info_span, warn};
    use tracing_subscriber::{layer::SubscriberExt, registry::Registry};

    #[derive(Default)]
    struct Tape {
        activations: usize,
        closes: usize,
        records: Vec<(LogEvent, DiagnosticContext)>,
    }

    /// An [`Appender`] that just writes down what it's asked to do.
    struct Recorder {
        config: GelfConfig,
        tape: Arc<Mutex<Tape>>,
    }

    impl Appender for Recorder {
        fn activate_options(&mut self) {
            self.tape.lock().activations += 1;
        }
        fn append(&mut self, event: &LogEvent, ctx: &DiagnosticContext) -> crate::error::Result<()> {
            self.tape.lock().records.push((event.clone(), ctx.clone()));
            Ok(())
        }
        fn close(&mut self) {
            self.tape.lock().closes += 1;
        }
        fn config(&self) -> &GelfConfig {
            &self.config
        }
        fn config_mut(&mut self) -> &mut GelfConfig {
            &mut self.config
        }
    }

    fn recorder() -> (Recorder, Arc<Mutex<Tape>>) {
        let tape = Arc::new(Mutex::new(Tape::default()));
        (
            Recorder {
                config: GelfConfig::default(),
                tape: tape.clone(),
            },
            tape,
        )
    }

    #[test]
    fn lifecycle() {
        let (rec, tape) = recorder();
        let layer = GelfLayer::new(rec);
        assert_eq!(tape.lock().activations, 1);
        layer.with_appender(|a| a.set_facility("billing"));
        assert_eq!(layer.with_appender(|a| a.config().facility.clone()), "billing");
        drop(layer);
        assert_eq!(tape.lock().closes, 1);
    }

    #[test]
    fn events_become_records() {
        let (rec, tape) = recorder();
        let subscriber = Registry::default().with(GelfLayer::new(rec));
        tracing::subscriber::with_default(subscriber, || {
            info!(target: "app::web", "Hello, {}!", "世界");
            warn!(target: "app::db", "slow query");
        });

        let tape = tape.lock();
        assert_eq!(tape.records.len(), 2);
        let (first, ctx) = &tape.records[0];
        assert_eq!(first.message, "Hello, 世界!");
        assert_eq!(first.logger, "app::web");
        assert_eq!(first.level, Level::Info);
        assert!(ctx.is_empty());
        assert_eq!(tape.records[1].0.level, Level::Warn);
    }

    #[test]
    fn span_fields_become_context() {
        let (rec, tape) = recorder();
        let subscriber = Registry::default().with(GelfLayer::new(rec));
        tracing::subscriber::with_default(subscriber, || {
            let outer = info_span!(
                target: "app",
                "request",
                client_ip = "10.0.0.7",
                logged_user = tracing::field::Empty
            );
            outer.in_scope(|| {
                info!(target: "app", "anonymous");
                outer.record("logged_user", "sam");
                info!(target: "app", "signed in");
                info_span!(target: "app", "sudo", logged_user = "frodo").in_scope(|| {
                    info!(target: "app", "elevated");
                    info!(target: "app", client_ip = "10.9.9.9", "proxied");
                });
            });
            info!(target: "app", "outside");
        });

        let tape = tape.lock();
        let ctxs: Vec<(&str, Option<&str>, Option<&str>)> = tape
            .records
            .iter()
            .map(|(e, c)| (e.message.as_str(), c.get(CLIENT_IP), c.get(LOGGED_USER)))
            .collect();
        assert_eq!(
            ctxs,
            vec![
                ("anonymous", Some("10.0.0.7"), None),
                ("signed in", Some("10.0.0.7"), Some("sam")),
                ("elevated", Some("10.0.0.7"), Some("frodo")),
                ("proxied", Some("10.9.9.9"), Some("frodo")),
                ("outside", None, None),
            ]
        );
    }

    #[test]
    fn own_and_messageless_events_are_skipped() {
        let (rec, tape) = recorder();
        let subscriber = Registry::default().with(GelfLayer::new(rec));
        tracing::subscriber::with_default(subscriber, || {
            warn!(target: "gelf_tracing::tcp", "Can not connect");
            info!(target: "app", answer = 42);
            info!(target: "gelf_tracing_fan", "not us");
        });

        let tape = tape.lock();
        assert_eq!(tape.records.len(), 1);
        assert_eq!(tape.records[0].0.logger, "gelf_tracing_fan");
    }

    #[test]
    fn own_target_matching() {
        assert!(is_own_target("gelf_tracing"));
        assert!(is_own_target("gelf_tracing::layer"));
        assert!(!is_own_target("gelf_tracing_fan"));
        assert!(!is_own_target("app"));
    }
}
