use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;

use dapr_client::{
    BindingInvocation, Client, DataContent, Error, StateConcurrency, StateConsistency, StateItem,
    StateOptions,
};

/// Exercise each building block once against a running sidecar.
#[derive(Parser, Debug)]
#[command(name = "dapr-demo")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Sidecar gRPC address (host:port). Defaults to DAPR_GRPC_PORT on localhost.
    #[arg(long)]
    address: Option<String>,

    /// State store component
    #[arg(long, default_value = "statestore")]
    store: String,

    /// Pub/sub component
    #[arg(long, default_value = "messagebus")]
    pubsub: String,

    #[arg(long, default_value = "demo")]
    topic: String,

    /// App hosting the `echo` method
    #[arg(long, default_value = "serving")]
    app_id: String,

    /// Output binding component
    #[arg(long, default_value = "example-http-binding")]
    binding: String,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Error> {
    let data = r#"{ "message": "hello" }"#;

    let client = match &args.address {
        Some(address) => Client::with_address(address.clone())?,
        None => Client::new()?,
    };

    client.publish_event(&args.pubsub, &args.topic, data)?;
    println!("data published");

    println!("saving data: {}", data);
    client.save_state(&args.store, "key1", data)?;
    println!("data saved");

    let item = client.get_state(&args.store, "key1")?;
    println!(
        "data retrieved [key:{} etag:{}]: {}",
        item.key,
        item.etag,
        String::from_utf8_lossy(&item.value)
    );

    let created_on = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let item2 = StateItem::new(item.key.clone(), item.value.clone())
        .with_etag("2")
        .with_metadata("created-on", created_on.to_string())
        .with_options(StateOptions::new(
            StateConcurrency::LastWrite,
            StateConsistency::Strong,
        ));
    client.save_bulk_state(&args.store, vec![item2])?;
    println!("data item saved");

    client.delete_state(&args.store, "key1")?;
    println!("data deleted");

    let content = DataContent::new("text/plain", "hellow");
    let response = client.invoke_method_with_content(&args.app_id, "echo", "post", &content)?;
    println!(
        "service method invoked, response: {}",
        String::from_utf8_lossy(&response)
    );

    client.invoke_output_binding(&BindingInvocation::new(args.binding.clone(), "create"))?;
    println!("output binding invoked");

    client.close();
    log::info!("walkthrough complete");
    println!("DONE");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_sample_components() {
        let args = Args::parse_from(["dapr-demo"]);
        assert!(args.address.is_none());
        assert_eq!(args.store, "statestore");
        assert_eq!(args.pubsub, "messagebus");
        assert_eq!(args.topic, "demo");
        assert_eq!(args.app_id, "serving");
        assert_eq!(args.binding, "example-http-binding");
    }

    #[test]
    fn flags_override_defaults() {
        let args = Args::parse_from([
            "dapr-demo",
            "--address",
            "10.0.0.5:50001",
            "--store",
            "redis",
            "--app-id",
            "orders",
        ]);
        assert_eq!(args.address.as_deref(), Some("10.0.0.5:50001"));
        assert_eq!(args.store, "redis");
        assert_eq!(args.app_id, "orders");
    }
}
