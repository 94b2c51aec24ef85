//! Encoding of application payloads for publish and invoke calls.

use bytes::Bytes;
use serde::Serialize;

use crate::error::Error;
use crate::types::DataContent;

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const TEXT_CONTENT_TYPE: &str = "text/plain";
pub const OCTET_STREAM_CONTENT_TYPE: &str = "application/octet-stream";

/// Something that can be turned into wire bytes.
///
/// An encode failure surfaces as [`Error::Serialization`] and no RPC is made.
pub trait Payload {
    fn content_type(&self) -> &str;

    fn encode(&self) -> Result<Bytes, Error>;
}

/// Serialize any `Serialize` value as JSON.
///
/// ```ignore
/// #[derive(Serialize)]
/// struct Greeting { message: String }
///
/// client.publish_event_from_content("messagebus", "demo", &Json(Greeting {
///     message: "hello".into(),
/// }))?;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T: Serialize> Payload for Json<T> {
    fn content_type(&self) -> &str {
        JSON_CONTENT_TYPE
    }

    fn encode(&self) -> Result<Bytes, Error> {
        serde_json::to_vec(&self.0)
            .map(Bytes::from)
            .map_err(Error::serialization)
    }
}

impl Payload for DataContent {
    fn content_type(&self) -> &str {
        &self.content_type
    }

    fn encode(&self) -> Result<Bytes, Error> {
        Ok(self.data.clone())
    }
}

impl Payload for Bytes {
    fn content_type(&self) -> &str {
        OCTET_STREAM_CONTENT_TYPE
    }

    fn encode(&self) -> Result<Bytes, Error> {
        Ok(self.clone())
    }
}

impl Payload for Vec<u8> {
    fn content_type(&self) -> &str {
        OCTET_STREAM_CONTENT_TYPE
    }

    fn encode(&self) -> Result<Bytes, Error> {
        Ok(Bytes::copy_from_slice(self))
    }
}

impl Payload for String {
    fn content_type(&self) -> &str {
        TEXT_CONTENT_TYPE
    }

    fn encode(&self) -> Result<Bytes, Error> {
        Ok(Bytes::copy_from_slice(self.as_bytes()))
    }
}

impl Payload for &str {
    fn content_type(&self) -> &str {
        TEXT_CONTENT_TYPE
    }

    fn encode(&self) -> Result<Bytes, Error> {
        Ok(Bytes::copy_from_slice(self.as_bytes()))
    }
}
