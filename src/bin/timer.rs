//! One-shot timer: fires once after twenty seconds.

use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const TIMER_DELAY: Duration = Duration::from_secs(20);

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new("info"))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(delay = ?TIMER_DELAY, "Timer armed");

    let timer = tokio::time::sleep(TIMER_DELAY);
    timer.await;

    tracing::info!("Timer expired!");
}
