//! Walk-through of the three consumers against a placeholder endpoint.
//!
//! Replace SA_URL with the data collection URI from your admin console to
//! see real responses; against the placeholder every transmission fails
//! with a connection error, which the demo prints and moves on.

use chrono::Utc;
use sensors_analytics_sdk::prelude::*;
use std::sync::Arc;

const DISTINCT_ID: &str = "abcdefg";
const SA_URL: &str = "http://sa_host.com:8006/sa?token=xxx";

async fn debug_mode_demo() -> Result<()> {
    // Dry-run: the server validates but does not import.
    let consumer = DebugConsumer::new(SA_URL, false)?;
    let sa = SensorsAnalytics::new(Arc::new(consumer));

    let properties = Properties::new()
        .with("sex", "male")
        .with("age", 123)
        .with("$time", Utc::now())
        .with("event_time", Utc::now());
    // Expects 'valid message...'
    if let Err(e) = sa.track(DISTINCT_ID, "RustDemoStart", properties).await {
        println!("Unexpected exception: '{e}'");
    }

    // write_data set: validated records are imported as well.
    let consumer = DebugConsumer::new(SA_URL, true)?;
    let sa = SensorsAnalytics::new(Arc::new(consumer));

    let properties = Properties::new().with("sex", "male").with("age", 123);
    if let Err(e) = sa.track(DISTINCT_ID, "RustDemoStart", properties).await {
        println!("Unexpected exception: '{e}'");
    }

    // A string where the server schema has a number; expects 'invalid message...'
    let properties = Properties::new().with("age", "123");
    if let Err(e) = sa.track(DISTINCT_ID, "RustDemoStart", properties).await {
        println!("Expected exception: '{e}'");
    }

    sa.profile_set(DISTINCT_ID, Properties::new().with("sex", "male").with("age", 123)).await?;
    sa.profile_increment(DISTINCT_ID, Properties::new().with("age", 10)).await?;
    sa.profile_set_once(DISTINCT_ID, Properties::new().with("sex", "female")).await?;
    sa.profile_append(DISTINCT_ID, Properties::new().with("songs", vec!["aaa", "bbb"])).await?;
    sa.profile_unset(DISTINCT_ID, ["songs", "sex"]).await?;

    Ok(())
}

async fn default_consumer_demo() {
    let consumer = DefaultConsumer::new(SA_URL);
    let sa = SensorsAnalytics::new(Arc::new(consumer));

    let properties = Properties::new().with("sex", "male").with("age", 123);
    if let Err(e) = sa.track(DISTINCT_ID, "RustDemoStart", properties).await {
        println!("Unexpected exception: '{e}'");
    }

    // Empty distinct id.
    if let Err(e) = sa.track("", "RustDemoStart", Properties::new()).await {
        println!("Expected exception: '{e}'");
    }

    // Reserved event name.
    if let Err(e) = sa.track(DISTINCT_ID, "event", Properties::new()).await {
        println!("Expected exception: '{e}'");
    }

    // Reserved property key.
    let properties = Properties::new().with("id", "123");
    if let Err(e) = sa.track(DISTINCT_ID, "RustDemoStart", properties).await {
        println!("Expected exception: '{e}'");
    }
}

async fn batch_consumer_demo() {
    let consumer = Arc::new(BatchConsumer::with_flush_bulk(SA_URL, 10));
    let sa = SensorsAnalytics::new(consumer.clone());

    // The flush threshold is 10, so ten events go out in one request here
    // and the remaining six wait for the explicit flush below.
    for i in 0..16 {
        let properties = Properties::new().with("sex", "male").with("age", 123).with("sort", i);
        if let Err(e) = sa.track(DISTINCT_ID, "RustDemoStart", properties).await {
            println!("Unexpected exception: '{e}'");
        }
    }

    if let Err(e) = consumer.flush().await {
        println!("Unexpected exception: '{e}'");
    }
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Debug mode
    if let Err(e) = debug_mode_demo().await {
        println!("Unexpected exception: '{e}'");
    }
    // Immediate mode
    default_consumer_demo().await;
    // Batched mode
    batch_consumer_demo().await;
}
