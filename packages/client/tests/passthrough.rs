use std::collections::HashMap;
use std::time::Duration;

use bytes::Bytes;
use serde::Serialize;

use dapr_client::connection::API_TOKEN_HEADER;
use dapr_client::testing::InMemoryRuntime;
use dapr_client::{
    BindingInvocation, CallContext, CancellationToken, Client, ClientConfig, DataContent,
    ErrorKind, Json, Operation, StateConcurrency, StateConsistency, StateItem, StateOptions,
};

#[derive(Serialize)]
struct Greeting {
    message: String,
}

fn connect() -> (Client, InMemoryRuntime) {
    let runtime = InMemoryRuntime::new();
    let client = Client::with_transport(runtime.clone(), &ClientConfig::default());
    (client, runtime)
}

#[test]
fn test_walkthrough() {
    let (client, runtime) = connect();
    let data = r#"{ "message": "hello" }"#;

    client.publish_event("messagebus", "demo", data).unwrap();

    client.save_state("statestore", "key1", data).unwrap();
    let item = client.get_state("statestore", "key1").unwrap();
    assert_eq!(item.value_str(), Some(data));
    assert!(!item.etag.is_empty());

    let with_options = StateItem::new(item.key.clone(), item.value.clone())
        .with_etag("2")
        .with_metadata("created-on", "2020-01-01")
        .with_options(StateOptions::new(
            StateConcurrency::LastWrite,
            StateConsistency::Strong,
        ));
    client.save_bulk_state("statestore", vec![with_options]).unwrap();

    client.delete_state("statestore", "key1").unwrap();
    let gone = client.get_state("statestore", "key1").unwrap();
    assert!(gone.value.is_empty());
    assert!(gone.etag.is_empty());

    let content = DataContent::new("text/plain", "hellow");
    let response = client
        .invoke_method_with_content("serving", "echo", "post", &content)
        .unwrap();
    assert_eq!(response, Bytes::from_static(b"hellow"));

    client
        .invoke_output_binding(&BindingInvocation::new("example-http-binding", "create"))
        .unwrap();

    let published = runtime.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].topic, "demo");

    client.close();
}

#[test]
fn test_close_twice_is_harmless() {
    let (client, runtime) = connect();

    client.close();
    client.close();

    assert!(client.is_closed());
    assert_eq!(runtime.close_count(), 1);
}

#[test]
fn test_calls_after_close_fail_without_reaching_runtime() {
    let (client, runtime) = connect();
    client.close();

    let err = client.save_state("statestore", "key1", "v").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Remote);
    assert_eq!(
        err.status().map(|s| s.code()),
        Some(tonic::Code::Unavailable)
    );
    assert_eq!(runtime.call_count(), 0);
}

#[test]
fn test_clones_share_the_connection() {
    let (client, runtime) = connect();
    let clone = client.clone();

    drop(client);
    clone.publish_event("messagebus", "demo", "still open").unwrap();

    assert_eq!(runtime.close_count(), 0);
    drop(clone);
    assert_eq!(runtime.close_count(), 1);
}

#[test]
fn test_token_is_attached_to_every_call() {
    let runtime = InMemoryRuntime::new();
    let config = ClientConfig::default().with_api_token("secret");
    let client = Client::with_transport(runtime.clone(), &config);

    client.publish_event("messagebus", "demo", "x").unwrap();
    client.save_state("statestore", "key1", "v").unwrap();
    client.get_state("statestore", "key1").unwrap();
    client.get_bulk_state("statestore", ["key1"]).unwrap();
    client.delete_state("statestore", "key1").unwrap();
    client.invoke_method("serving", "echo", "get").unwrap();
    client
        .invoke_binding(&BindingInvocation::new("example-http-binding", "create"))
        .unwrap();

    let calls = runtime.calls();
    assert_eq!(calls.len(), 7);
    for call in &calls {
        assert_eq!(
            call.metadata.get(API_TOKEN_HEADER).map(String::as_str),
            Some("secret"),
            "{} lacks the token",
            call.method()
        );
    }
}

#[test]
fn test_no_token_means_no_metadata() {
    let (client, runtime) = connect();

    client.publish_event("messagebus", "demo", "x").unwrap();
    client.get_state("statestore", "key1").unwrap();

    for call in runtime.calls() {
        assert!(call.metadata.is_empty());
    }
}

#[test]
fn test_token_from_config_source() {
    let runtime = InMemoryRuntime::new();
    let source: HashMap<String, String> = [("DAPR_API_TOKEN".to_string(), "from-env".to_string())]
        .into_iter()
        .collect();
    let client = Client::with_transport(runtime.clone(), &ClientConfig::from_source(&source));

    client.get_state("statestore", "key1").unwrap();

    assert_eq!(
        runtime.calls()[0]
            .metadata
            .get(API_TOKEN_HEADER)
            .map(String::as_str),
        Some("from-env")
    );
}

#[test]
fn test_serialization_failure_performs_no_rpc() {
    let (client, runtime) = connect();

    // JSON object keys must be strings.
    let mut unencodable = HashMap::new();
    unencodable.insert((1, 2), "tuple key");

    let publish = client
        .publish_event_from_content("messagebus", "demo", &Json(&unencodable))
        .unwrap_err();
    let invoke = client
        .invoke_method_with_custom_content("serving", "echo", "post", &Json(&unencodable))
        .unwrap_err();

    assert_eq!(publish.kind(), ErrorKind::Serialization);
    assert_eq!(invoke.kind(), ErrorKind::Serialization);
    assert_eq!(runtime.call_count(), 0);
}

#[test]
fn test_publish_json_content() {
    let (client, runtime) = connect();

    client
        .publish_event_from_content(
            "messagebus",
            "demo",
            &Json(Greeting {
                message: "hello".to_string(),
            }),
        )
        .unwrap();

    let published = runtime.published();
    assert_eq!(published[0].data_content_type, "application/json");
    assert_eq!(
        published[0].data,
        Bytes::from_static(br#"{"message":"hello"}"#)
    );
}

#[test]
fn test_remote_errors_name_their_target() {
    let runtime = InMemoryRuntime::new().fail_with(tonic::Status::internal("boom"));
    let client = Client::with_transport(runtime, &ClientConfig::default());

    let publish = client.publish_event("messagebus", "demo", "x").unwrap_err();
    assert!(publish.to_string().contains("demo"));

    let invoke = client.invoke_method("serving", "echo", "get").unwrap_err();
    assert!(matches!(
        invoke.operation(),
        Some(Operation::InvokeService { app_id, method }) if app_id == "serving" && method == "echo"
    ));

    let binding = client
        .invoke_output_binding(&BindingInvocation::new("example-http-binding", "create"))
        .unwrap_err();
    assert!(binding.to_string().contains("example-http-binding"));

    let state = client.get_state("statestore", "key1").unwrap_err();
    assert!(state.to_string().contains("key1"));
    assert!(state.to_string().contains("statestore"));
    assert!(state.to_string().contains("boom"));
}

#[test]
fn test_context_metadata_and_timeout_reach_the_runtime() {
    let (client, runtime) = connect();
    let scoped = client.with_context(
        CallContext::new()
            .with_metadata("traceparent", "00-abc-01")
            .with_timeout(Duration::from_secs(1)),
    );

    scoped.get_state("statestore", "key1").unwrap();

    assert_eq!(
        runtime.calls()[0]
            .metadata
            .get("traceparent")
            .map(String::as_str),
        Some("00-abc-01")
    );
}

#[test]
fn test_cancelled_context_fails_as_cancelled() {
    let (client, runtime) = connect();
    let token = CancellationToken::new();
    let scoped = client.with_context(CallContext::new().with_cancellation(token.clone()));

    token.cancel();
    let err = scoped.get_state("statestore", "key1").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Remote);
    assert_eq!(err.status().map(|s| s.code()), Some(tonic::Code::Cancelled));
    assert_eq!(runtime.call_count(), 0);
}

#[test]
fn test_client_is_usable_across_threads() {
    let (client, runtime) = connect();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let client = client.clone();
            std::thread::spawn(move || {
                client
                    .save_state("statestore", &format!("key{}", i), "v")
                    .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(runtime.call_count(), 4);
}
