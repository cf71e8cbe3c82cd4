//! Lenient request-body extractors.
//!
//! These mirror handlers that prefer an empty payload over a rejected
//! request: decode failures are logged and collapsed to an empty value,
//! and the extractors themselves never reject.

use std::convert::Infallible;

use axum::extract::{FromRequest, Request};
use serde_json::{Map, Value};

use super::xml::{self, Element};

/// Upper bound on bodies read by the lenient extractors.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// JSON object body; empty on any decode failure. Non-object JSON (arrays,
/// scalars) is also treated as empty.
#[derive(Debug, Default)]
pub struct LenientJson(pub Map<String, Value>);

impl<S> FromRequest<S> for LenientJson
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let bytes = match axum::body::to_bytes(req.into_body(), MAX_BODY_BYTES).await {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::error!("failed to read request body: {err}");
                return Ok(Self::default());
            }
        };

        let params = match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(map)) => map,
            Ok(_) => Map::new(),
            Err(err) => {
                tracing::error!("invalid JSON body: {err}");
                Map::new()
            }
        };

        Ok(Self(params))
    }
}

/// XML body; `None` on any parse failure.
#[derive(Debug, Default)]
pub struct XmlBody(pub Option<Element>);

impl<S> FromRequest<S> for XmlBody
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let bytes = match axum::body::to_bytes(req.into_body(), MAX_BODY_BYTES).await {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::error!("failed to read request body: {err}");
                return Ok(Self(None));
            }
        };

        let text = String::from_utf8_lossy(&bytes);
        match xml::parse(&text) {
            Ok(root) => Ok(Self(Some(root))),
            Err(err) => {
                tracing::error!("invalid XML body: {err}");
                Ok(Self(None))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request(body: &str) -> Request {
        Request::builder()
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    #[tokio::test]
    async fn json_object_is_extracted() {
        let LenientJson(params) = LenientJson::from_request(request(r#"{"a":1,"b":"x"}"#), &())
            .await
            .unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params["a"], 1);
    }

    #[tokio::test]
    async fn garbage_json_yields_empty_object() {
        let LenientJson(params) = LenientJson::from_request(request("not json"), &())
            .await
            .unwrap();
        assert!(params.is_empty());
    }

    #[tokio::test]
    async fn non_object_json_yields_empty_object() {
        let LenientJson(params) = LenientJson::from_request(request("[1,2,3]"), &())
            .await
            .unwrap();
        assert!(params.is_empty());
    }

    #[tokio::test]
    async fn xml_body_is_parsed() {
        let XmlBody(doc) = XmlBody::from_request(request("<req><id>7</id></req>"), &())
            .await
            .unwrap();
        let doc = doc.expect("document parses");
        assert_eq!(doc.child("id").unwrap().text, "7");
    }

    #[tokio::test]
    async fn garbage_xml_yields_none() {
        let XmlBody(doc) = XmlBody::from_request(request("<open>"), &()).await.unwrap();
        assert!(doc.is_none());
    }
}
