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
//! Per-request diagnostic context.
//!
//! Hosts typically keep a thread- or request-scoped map of auxiliary data (the client's address,
//! the logged-in user). Rather than reaching into global state, [gelf-tracing](crate) has the
//! caller hand that map to [`Appender::append`](crate::appender::Appender::append) explicitly.

use std::collections::HashMap;

/// Key under which the client's IP address is stored
pub const CLIENT_IP: &str = "client_ip";
/// Key under which the authenticated user is stored
pub const LOGGED_USER: &str = "logged_user";

/// A string-to-string map of ambient, per-request data.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiagnosticContext {
    entries: HashMap<String, String>,
}

impl DiagnosticContext {
    pub fn new() -> DiagnosticContext {
        DiagnosticContext::default()
    }
    pub fn put<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.entries.insert(key.into(), value.into());
    }
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }
    /// Look up `key`; empty values are treated as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    /// Overlay `other` onto `self`; `other` wins on conflicts.
    pub fn merge(&mut self, other: &DiagnosticContext) {
        for (k, v) in &other.entries {
            self.entries.insert(k.clone(), v.clone());
        }
    }
}

impl<K: Into<String>, V: Into<String>> std::iter::FromIterator<(K, V)> for DiagnosticContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        DiagnosticContext {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn empty_values_are_absent() {
        let mut ctx = DiagnosticContext::new();
        ctx.put(CLIENT_IP, "");
        ctx.put(LOGGED_USER, "frodo");
        assert_eq!(ctx.get(CLIENT_IP), None);
        assert_eq!(ctx.get(LOGGED_USER), Some("frodo"));
        assert_eq!(ctx.get("nope"), None);
    }

    #[test]
    fn merge_overrides() {
        let mut outer: DiagnosticContext =
            [(CLIENT_IP, "10.0.0.1"), (LOGGED_USER, "sam")].into_iter().collect();
        let inner: DiagnosticContext = [(LOGGED_USER, "frodo")].into_iter().collect();
        outer.merge(&inner);
        assert_eq!(outer.get(CLIENT_IP), Some("10.0.0.1"));
        assert_eq!(outer.get(LOGGED_USER), Some("frodo"));
        assert_eq!(outer.remove(CLIENT_IP), Some("10.0.0.1".to_string()));
        assert_eq!(outer.get(CLIENT_IP), None);
    }
}
