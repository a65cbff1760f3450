//! Two-layer serialization for stage payloads.
//!
//! Payloads are MessagePack with named fields so nested and recursive values
//! survive intact. The MessagePack bytes then ride inside a JSON envelope as a
//! base64 string, which keeps the outer framing readable on the wire.

use krug_api::{RequestEnvelope, ResponseEnvelope};
use serde::{Serialize, de::DeserializeOwned};

use crate::error::{Error, Result};

/// Encode a value into a request envelope.
pub fn encode<T>(route: &str, value: &T) -> Result<RequestEnvelope>
where
    T: Serialize + ?Sized,
{
    let data = rmp_serde::to_vec_named(value).map_err(|source| {
        Box::new(Error::Encode {
            route: route.to_string(),
            source,
        })
    })?;
    Ok(RequestEnvelope::new(data))
}

/// Decode a response payload into the stage's output type.
pub fn decode<T>(route: &str, payload: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    rmp_serde::from_slice(payload).map_err(|source| {
        Box::new(Error::Decode {
            route: route.to_string(),
            source,
        })
    })
}

/// Render a request envelope as its JSON body.
pub fn to_json(route: &str, envelope: &RequestEnvelope) -> Result<Vec<u8>> {
    serde_json::to_vec(envelope).map_err(|source| {
        Box::new(Error::Envelope {
            url: route.to_string(),
            source,
        })
    })
}

/// Parse a JSON response body.
pub fn from_json(url: &str, body: &[u8]) -> Result<ResponseEnvelope> {
    serde_json::from_slice(body).map_err(|source| {
        Box::new(Error::Envelope {
            url: url.to_string(),
            source,
        })
    })
}

#[cfg(test)]
mod tests {
    use krug_api::{CompilationUnit, CompilerError, Module};
    use rmpv::Value;

    use super::*;

    #[test]
    fn test_unit_round_trip() {
        let unit = CompilationUnit::new("a.krug", "fn main() {}");

        let req = encode("/front/lex", &unit).unwrap();
        let decoded: CompilationUnit = decode("/front/lex", &req.data).unwrap();

        assert_eq!(decoded, unit);
    }

    #[test]
    fn test_payload_uses_named_fields() {
        let unit = CompilationUnit::new("a.krug", "");
        let req = encode("/front/lex", &unit).unwrap();

        let raw: Value = rmp_serde::from_slice(&req.data).unwrap();
        let keys: Vec<_> = raw
            .as_map()
            .unwrap()
            .iter()
            .filter_map(|(k, _)| k.as_str())
            .collect();
        assert_eq!(keys, vec!["Name", "Code"]);
    }

    #[test]
    fn test_empty_sequence_round_trip() {
        let modules: Vec<Module> = Vec::new();
        let req = encode("/ir/build", &modules).unwrap();
        let decoded: Vec<Module> = decode("/ir/build", &req.data).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_decode_garbage_is_error() {
        let err = decode::<CompilationUnit>("/front/lex", &[0xc1, 0x00]).unwrap_err();
        assert!(matches!(*err, Error::Decode { ref route, .. } if route == "/front/lex"));
    }

    #[test]
    fn test_outer_json_round_trip() {
        let req = encode("/front/lex", &CompilationUnit::new("a.krug", "x")).unwrap();
        let body = to_json("/front/lex", &req).unwrap();

        let echoed = ResponseEnvelope::new(req.data.clone(), vec![CompilerError::warning("w")]);
        let echoed_body = serde_json::to_vec(&echoed).unwrap();
        let parsed = from_json("http://host/front/lex", &echoed_body).unwrap();

        assert!(body.starts_with(br#"{"Data":""#));
        assert_eq!(parsed.data, req.data);
        assert_eq!(parsed.errors.len(), 1);
    }

    #[test]
    fn test_malformed_outer_json() {
        let err = from_json("http://host/ir/build", b"<html>502</html>").unwrap_err();
        assert!(matches!(*err, Error::Envelope { .. }));
    }
}
