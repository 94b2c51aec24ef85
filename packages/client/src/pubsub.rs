use std::collections::HashMap;

use bytes::Bytes;

use dapr_proto::runtime::v1::PublishEventRequest;

use crate::client::{unexpected_response, Client};
use crate::error::{Error, Operation};
use crate::payload::Payload;
use crate::transport::{RuntimeRequest, RuntimeResponse};
use crate::validate::require;

impl Client {
    /// Publish raw bytes onto `topic`. The content type is left to the
    /// runtime.
    pub fn publish_event(
        &self,
        pubsub: &str,
        topic: &str,
        data: impl Into<Bytes>,
    ) -> Result<(), Error> {
        require(pubsub, "pubsub name")?;
        require(topic, "topic name")?;
        self.publish(pubsub, topic, data.into(), String::new())
    }

    /// Encode `content` and publish it with its content type.
    ///
    /// ```ignore
    /// client.publish_event_from_content("messagebus", "demo", &Json(&order))?;
    /// ```
    pub fn publish_event_from_content(
        &self,
        pubsub: &str,
        topic: &str,
        content: &impl Payload,
    ) -> Result<(), Error> {
        require(pubsub, "pubsub name")?;
        require(topic, "topic name")?;
        let data = content.encode()?;
        self.publish(pubsub, topic, data, content.content_type().to_string())
    }

    fn publish(
        &self,
        pubsub: &str,
        topic: &str,
        data: Bytes,
        content_type: String,
    ) -> Result<(), Error> {
        let operation = Operation::PublishEvent {
            pubsub: pubsub.to_string(),
            topic: topic.to_string(),
        };
        let request = PublishEventRequest {
            pubsub_name: pubsub.to_string(),
            topic: topic.to_string(),
            data,
            data_content_type: content_type,
            metadata: HashMap::new(),
        };

        match self.call(&operation, RuntimeRequest::PublishEvent(request))? {
            RuntimeResponse::Empty => Ok(()),
            _ => Err(unexpected_response(&operation, "Empty")),
        }
    }
}
