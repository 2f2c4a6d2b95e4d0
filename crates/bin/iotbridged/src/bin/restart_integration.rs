//! Ask the orchestrator to restart one integration instance.
//!
//! Publishes `"true"` on `/orchestrator/integration/{id}/stop`, then the id on
//! `/orchestrator/integration/start`, then exits.

use std::time::Duration;

use anyhow::{Context, bail};
use tracing::info;

use iotbridge_adapter_mqtt::MqttSession;
use iotbridge_app::ports::{SessionEvent, Transport};
use iotbridge_domain::topic;
use iotbridged::config::Config;
use iotbridged::logging;

const CLIENT_ID: &str = "restart-integration";
const STEP_DELAY: Duration = Duration::from_millis(100);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    logging::init(&config.logging.filter);

    let Some(id) = std::env::args().nth(1).filter(|id| !id.trim().is_empty()) else {
        bail!("usage: restart-integration <id>");
    };

    let (session, mut events) = MqttSession::new(&config.mqtt, CLIENT_ID);
    session.connect().await?;
    tokio::time::timeout(CONNECT_TIMEOUT, async {
        while let Some(event) = events.recv().await {
            if event == SessionEvent::Connected {
                return;
            }
        }
    })
    .await
    .context("broker did not acknowledge the connection")?;

    session.publish(&topic::stop(&id), "true".to_string()).await?;
    tokio::time::sleep(STEP_DELAY).await;
    session.publish(topic::START, id.clone()).await?;
    tokio::time::sleep(STEP_DELAY).await;
    session.disconnect().await?;

    info!(%id, "restart requested");
    Ok(())
}
