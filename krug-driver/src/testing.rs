//! Test utilities for driving the pipeline without a compiler service.
//!
//! This module is only available when the `testing` feature is enabled
//! or during tests.

use std::{
    collections::{HashMap, VecDeque},
    time::Duration,
};

use krug_api::{RequestEnvelope, ResponseEnvelope};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    client::Transport,
    error::{Error, Result},
    output::Output,
};

/// Encode a value the way the service would encode a stage payload.
pub fn payload<T: Serialize + ?Sized>(value: &T) -> Vec<u8> {
    rmp_serde::to_vec_named(value).expect("test payload should encode")
}

/// A request the scripted transport received.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub url: String,
    pub route: String,
    pub request: RequestEnvelope,
}

impl RecordedCall {
    /// Decode the request payload.
    pub fn decode<T: DeserializeOwned>(&self) -> T {
        rmp_serde::from_slice(&self.request.data).expect("recorded request should decode")
    }
}

/// Transport that answers from a script and records every request.
///
/// Responses are queued per route. The last queued response for a route keeps
/// answering once the queue is down to it. Unscripted routes answer HTTP 404,
/// as do routes scripted with an empty queue.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: HashMap<String, VecDeque<ResponseEnvelope>>,
    calls: Vec<RecordedCall>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `route` with `response`, replacing anything scripted before.
    pub fn respond(self, route: &str, response: ResponseEnvelope) -> Self {
        self.respond_in_turn(route, [response])
    }

    /// Answer successive calls to `route` with `responses`, in order.
    ///
    /// Replaces anything scripted before for that route.
    pub fn respond_in_turn(
        mut self,
        route: &str,
        responses: impl IntoIterator<Item = ResponseEnvelope>,
    ) -> Self {
        self.responses
            .insert(route.to_string(), responses.into_iter().collect());
        self
    }

    /// Every request received so far, in order.
    pub fn calls(&self) -> &[RecordedCall] {
        &self.calls
    }

    /// Routes called so far, in order.
    pub fn routes(&self) -> Vec<&str> {
        self.calls.iter().map(|c| c.route.as_str()).collect()
    }

    fn next_response(&mut self, route: &str) -> Option<ResponseEnvelope> {
        let queue = self.responses.get_mut(route)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

impl Transport for ScriptedTransport {
    fn post(&mut self, url: &str, body: Vec<u8>) -> Result<Vec<u8>> {
        let route = route_of(url).to_string();
        let request: RequestEnvelope =
            serde_json::from_slice(&body).expect("driver should send a JSON envelope");
        self.calls.push(RecordedCall {
            url: url.to_string(),
            route: route.clone(),
            request,
        });

        match self.next_response(&route) {
            Some(response) => Ok(serde_json::to_vec(&response).expect("response should encode")),
            None => Err(Box::new(Error::Status {
                url: url.to_string(),
                status: 404,
            })),
        }
    }
}

fn route_of(url: &str) -> &str {
    let rest = url.strip_prefix("http://").unwrap_or(url);
    rest.find('/').map_or("", |idx| &rest[idx..])
}

/// One rendered event, as captured by [`RecordingOutput`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Stage(String),
    Diagnostic(String),
    Excerpt(String),
    Token(String),
    Module(String),
    Generated(String),
    Total,
}

/// Output that records events instead of printing them.
#[derive(Debug, Default)]
pub struct RecordingOutput {
    pub events: Vec<Event>,
}

impl RecordingOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Titles of every diagnostic rendered, in order.
    pub fn diagnostics(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Diagnostic(title) => Some(title.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Every source excerpt rendered, in order.
    pub fn excerpts(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Excerpt(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Output for RecordingOutput {
    fn stage_timing(&mut self, url: &str, _elapsed: Duration) {
        self.events.push(Event::Stage(url.to_string()));
    }

    fn diagnostic(&mut self, title: &str) {
        self.events.push(Event::Diagnostic(title.to_string()));
    }

    fn source_excerpt(&mut self, excerpt: &str) {
        self.events.push(Event::Excerpt(excerpt.to_string()));
    }

    fn token(&mut self, token: &str) {
        self.events.push(Event::Token(token.to_string()));
    }

    fn module(&mut self, module: &str) {
        self.events.push(Event::Module(module.to_string()));
    }

    fn generated_source(&mut self, source: &str) {
        self.events.push(Event::Generated(source.to_string()));
    }

    fn total_time(&mut self, _elapsed: Duration) {
        self.events.push(Event::Total);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_of() {
        assert_eq!(route_of("http://127.0.0.1:8001/mid/resolve/type"), "/mid/resolve/type");
        assert_eq!(route_of("http://host"), "");
    }

    #[test]
    fn test_last_response_is_sticky() {
        let mut transport = ScriptedTransport::new().respond_in_turn(
            "/a",
            [
                ResponseEnvelope::new(vec![1], Vec::new()),
                ResponseEnvelope::new(vec![2], Vec::new()),
            ],
        );

        assert_eq!(transport.next_response("/a").unwrap().data, vec![1]);
        assert_eq!(transport.next_response("/a").unwrap().data, vec![2]);
        assert_eq!(transport.next_response("/a").unwrap().data, vec![2]);
        assert!(transport.next_response("/b").is_none());
    }

    #[test]
    fn test_respond_replaces_script() {
        let mut transport = ScriptedTransport::new()
            .respond("/a", ResponseEnvelope::new(vec![1], Vec::new()))
            .respond("/a", ResponseEnvelope::new(vec![2], Vec::new()));

        assert_eq!(transport.next_response("/a").unwrap().data, vec![2]);
    }
}
