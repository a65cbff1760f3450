//! Stage client: one request to one remote stage.

use std::time::{Duration, Instant};

use krug_api::CompilerError;
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    envelope,
    error::{Error, Result},
};

/// Carries a JSON body to a URL and returns the JSON response body.
///
/// This is the only seam between the driver and the network.
pub trait Transport {
    /// POST `body` to `url`.
    ///
    /// # Errors
    ///
    /// Any failure to reach the service or a non-success status. These are
    /// never retried.
    fn post(&mut self, url: &str, body: Vec<u8>) -> Result<Vec<u8>>;
}

/// Blocking HTTP transport.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Create a transport. `timeout` of `None` waits on the service indefinitely.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| {
                Box::new(Error::Transport {
                    url: String::new(),
                    source,
                })
            })?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn post(&mut self, url: &str, body: Vec<u8>) -> Result<Vec<u8>> {
        let transport_err = |source| {
            Box::new(Error::Transport {
                url: url.to_string(),
                source,
            })
        };

        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .map_err(transport_err)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Box::new(Error::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }));
        }

        let bytes = response.bytes().map_err(transport_err)?;
        Ok(bytes.to_vec())
    }
}

/// The decoded result of one stage call.
#[derive(Debug)]
pub struct StageResponse {
    /// Route that was called, e.g. `/front/lex`.
    pub route: String,
    /// Full URL that was called.
    pub url: String,
    /// Wall-clock latency of the exchange.
    pub elapsed: Duration,
    /// Raw inner payload.
    pub payload: Vec<u8>,
    /// Diagnostics the stage reported.
    pub diagnostics: Vec<CompilerError>,
}

impl StageResponse {
    /// Decode the payload into the stage's output type.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        envelope::decode(&self.route, &self.payload)
    }
}

/// Issues stage requests against one compiler service.
pub struct StageClient<T> {
    transport: T,
    server: String,
}

impl<T: Transport> StageClient<T> {
    pub fn new(transport: T, server: impl Into<String>) -> Self {
        Self {
            transport,
            server: server.into(),
        }
    }

    /// The `host:port` this client talks to.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Build the URL for a route.
    pub fn url(&self, route: &str) -> String {
        format!("http://{}{}", self.server, route)
    }

    /// Send `input` to `route` and wait for the stage's answer.
    pub fn call<V>(&mut self, route: &str, input: &V) -> Result<StageResponse>
    where
        V: Serialize + ?Sized,
    {
        let start = Instant::now();
        let url = self.url(route);

        let request = envelope::encode(route, input)?;
        let body = envelope::to_json(route, &request)?;
        tracing::debug!(%url, bytes = request.data.len(), "sending stage request");

        let response = self.transport.post(&url, body)?;
        let (payload, diagnostics) = envelope::from_json(&url, &response)?.into_parts();

        let elapsed = start.elapsed();
        tracing::debug!(
            %url,
            bytes = payload.len(),
            diagnostics = diagnostics.len(),
            ?elapsed,
            "stage responded"
        );

        Ok(StageResponse {
            route: route.to_string(),
            url,
            elapsed,
            payload,
            diagnostics,
        })
    }
}

#[cfg(test)]
mod tests {
    use krug_api::{CompilationUnit, ResponseEnvelope, TokenStream};

    use super::*;
    use crate::testing::{ScriptedTransport, payload};

    #[test]
    fn test_call_builds_url_and_decodes() {
        let transport = ScriptedTransport::new().respond(
            "/front/lex",
            ResponseEnvelope::new(payload(&TokenStream::default()), Vec::new()),
        );
        let mut client = StageClient::new(transport, "127.0.0.1:8001");

        let resp = client
            .call("/front/lex", &CompilationUnit::new("a.krug", "fn"))
            .unwrap();

        assert_eq!(resp.url, "http://127.0.0.1:8001/front/lex");
        assert!(resp.diagnostics.is_empty());
        assert!(resp.decode::<TokenStream>().unwrap().is_empty());
    }

    #[test]
    fn test_call_sends_encoded_input() {
        let transport = ScriptedTransport::new().respond("/front/lex", ResponseEnvelope::default());
        let mut client = StageClient::new(transport, "svc:9");
        let unit = CompilationUnit::new("a.krug", "fn main() {}");

        client.call("/front/lex", &unit).unwrap();

        let calls = client.transport().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].url, "http://svc:9/front/lex");
        assert_eq!(calls[0].decode::<CompilationUnit>(), unit);
    }

    #[test]
    fn test_call_returns_diagnostics() {
        let transport = ScriptedTransport::new().respond(
            "/mid/resolve/type",
            ResponseEnvelope::new(Vec::new(), vec![CompilerError::fatal("mismatched types")]),
        );
        let mut client = StageClient::new(transport, "svc:9");

        let resp = client.call("/mid/resolve/type", &()).unwrap();

        assert_eq!(resp.diagnostics, vec![CompilerError::fatal("mismatched types")]);
    }

    #[test]
    fn test_transport_failure_propagates() {
        let mut client = StageClient::new(ScriptedTransport::new(), "svc:9");
        let err = client.call("/front/lex", &()).unwrap_err();
        assert!(matches!(*err, Error::Status { status: 404, .. }));
    }

    #[test]
    fn test_undecodable_payload() {
        let transport = ScriptedTransport::new().respond(
            "/ir/build",
            ResponseEnvelope::new(vec![0xc1], Vec::new()),
        );
        let mut client = StageClient::new(transport, "svc:9");

        let resp = client.call("/ir/build", &()).unwrap();
        let err = resp.decode::<TokenStream>().unwrap_err();

        assert!(matches!(*err, Error::Decode { .. }));
    }
}
