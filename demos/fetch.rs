use std::time::Duration;

use cross_request::callback::build_jq_xhr;
use cross_request::config::init_logging;
use cross_request::{Bridge, BridgeConfig, BridgeError, HttpTransport, LogLevel, RequestOptions};

#[tokio::main]
async fn main() -> Result<(), BridgeError> {
    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://httpbin.org/json".to_string());

    // Configure the bridge through the config builder. Invalid values are
    // rejected here rather than when the first request goes out.
    let config = BridgeConfig::builder()
        .default_timeout(Duration::from_secs(10))
        .log_level(LogLevel::Debug)
        .build()?;

    init_logging(config.log_level).expect("logger already initialised");

    let transport = HttpTransport::new(&config)?;
    let (bridge, tasks) = Bridge::start(config, transport)?;

    let res = bridge
        .fetch(RequestOptions::new(url).header("X-Requested-With", "XMLHttpRequest"))
        .await?;

    println!("{} {}", res.status, res.status_text);
    println!("{}", serde_json::to_string_pretty(&res).unwrap_or_default());

    // What a jQuery caller would see
    let jq_xhr = build_jq_xhr(&res);
    println!("--- headers ---\n{}", jq_xhr.get_all_response_headers());

    bridge.shutdown();
    tasks.join().await.expect("bridge tasks panicked");

    Ok(())
}
