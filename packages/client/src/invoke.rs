use std::collections::HashMap;

use bytes::Bytes;
use prost_types::Any;

use dapr_proto::common::v1::http_extension::Verb;
use dapr_proto::common::v1::{HttpExtension, InvokeRequest};
use dapr_proto::runtime::v1::InvokeServiceRequest;

use crate::client::{unexpected_response, Client};
use crate::error::{Error, Operation};
use crate::payload::Payload;
use crate::transport::{RuntimeRequest, RuntimeResponse};
use crate::types::{DataContent, HttpVerb};
use crate::validate::require;

impl Client {
    /// Call `method` on another app without a body and return the raw
    /// response body.
    ///
    /// `verb` is forwarded as the HTTP verb when the target app speaks HTTP.
    /// Unknown verbs are sent as none.
    pub fn invoke_method(&self, app_id: &str, method: &str, verb: &str) -> Result<Bytes, Error> {
        require(app_id, "app id")?;
        require(method, "method name")?;
        self.invoke(app_id, method, verb, None)
    }

    pub fn invoke_method_with_content(
        &self,
        app_id: &str,
        method: &str,
        verb: &str,
        content: &DataContent,
    ) -> Result<Bytes, Error> {
        self.invoke_method_with_custom_content(app_id, method, verb, content)
    }

    /// Encode `content` and send it as the request body.
    pub fn invoke_method_with_custom_content(
        &self,
        app_id: &str,
        method: &str,
        verb: &str,
        content: &impl Payload,
    ) -> Result<Bytes, Error> {
        require(app_id, "app id")?;
        require(method, "method name")?;
        let data = content.encode()?;
        self.invoke(
            app_id,
            method,
            verb,
            Some((data, content.content_type().to_string())),
        )
    }

    fn invoke(
        &self,
        app_id: &str,
        method: &str,
        verb: &str,
        body: Option<(Bytes, String)>,
    ) -> Result<Bytes, Error> {
        let operation = Operation::InvokeService {
            app_id: app_id.to_string(),
            method: method.to_string(),
        };

        let (data, content_type) = match body {
            Some((data, content_type)) => (
                Some(Any {
                    type_url: String::new(),
                    value: data.to_vec(),
                }),
                content_type,
            ),
            None => (None, String::new()),
        };
        let request = InvokeServiceRequest {
            id: app_id.to_string(),
            message: Some(InvokeRequest {
                method: method.to_string(),
                data,
                content_type,
                http_extension: Some(http_extension(verb)),
            }),
        };

        match self.call(&operation, RuntimeRequest::InvokeService(request))? {
            RuntimeResponse::InvokeService(response) => Ok(response
                .data
                .map(|any| Bytes::from(any.value))
                .unwrap_or_default()),
            _ => Err(unexpected_response(&operation, "InvokeResponse")),
        }
    }
}

fn http_extension(verb: &str) -> HttpExtension {
    HttpExtension {
        verb: Verb::from(HttpVerb::parse(verb)) as i32,
        querystring: HashMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::error::ErrorKind;
    use crate::payload::Json;
    use crate::testing::InMemoryRuntime;

    fn client() -> (Client, InMemoryRuntime) {
        let runtime = InMemoryRuntime::new();
        let client = Client::with_transport(runtime.clone(), &ClientConfig::default());
        (client, runtime)
    }

    fn sent(runtime: &InMemoryRuntime) -> InvokeServiceRequest {
        match &runtime.calls()[0].request {
            RuntimeRequest::InvokeService(request) => request.clone(),
            other => panic!("unexpected request: {:?}", other),
        }
    }

    #[test]
    fn content_is_wrapped_in_any_and_echoed_back() {
        let (client, runtime) = client();
        let content = DataContent::new("text/plain", "hellow");

        let response = client
            .invoke_method_with_content("serving", "echo", "post", &content)
            .unwrap();

        assert_eq!(response, Bytes::from_static(b"hellow"));

        let request = sent(&runtime);
        assert_eq!(request.id, "serving");
        let message = request.message.unwrap();
        assert_eq!(message.method, "echo");
        assert_eq!(message.content_type, "text/plain");
        assert_eq!(message.http_extension.unwrap().verb(), Verb::Post);
        assert_eq!(message.data.unwrap().value, b"hellow".to_vec());
    }

    #[test]
    fn bodyless_invoke_sends_no_data() {
        let (client, runtime) = client();

        let response = client.invoke_method("serving", "health", "get").unwrap();

        assert!(response.is_empty());
        let message = sent(&runtime).message.unwrap();
        assert!(message.data.is_none());
        assert_eq!(message.http_extension.unwrap().verb(), Verb::Get);
    }

    #[test]
    fn unknown_verb_is_sent_as_none() {
        let (client, runtime) = client();
        client.invoke_method("serving", "echo", "brew").unwrap();
        let message = sent(&runtime).message.unwrap();
        assert_eq!(message.http_extension.unwrap().verb(), Verb::None);
    }

    #[test]
    fn custom_content_is_json_encoded() {
        let (client, runtime) = client();
        client
            .invoke_method_with_custom_content("serving", "echo", "post", &Json(vec![1, 2, 3]))
            .unwrap();
        let message = sent(&runtime).message.unwrap();
        assert_eq!(message.content_type, "application/json");
        assert_eq!(message.data.unwrap().value, b"[1,2,3]".to_vec());
    }

    #[test]
    fn missing_method_is_rejected_locally() {
        let (client, runtime) = client();
        let err = client.invoke_method("serving", "", "get").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(runtime.call_count(), 0);
    }
}
