use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};

use iotbridge_adapter_mqtt::MqttSession;
use iotbridge_adapter_schema_file::FileSchemaStore;
use iotbridge_app::runtime::Runtime;
use iotbridge_domain::exit::ExitStatus;
use iotbridged::config::Config;
use iotbridged::{launch, logging};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("iotbridged: {err}");
            return exit_code(ExitStatus::Unknown);
        }
    };
    logging::init(&config.logging.filter);

    let status = match run(config).await {
        Ok(status) => status,
        Err(err) => {
            error!("adapter failed to start: {err:#}");
            ExitStatus::Unknown
        }
    };
    info!(code = status.code(), reason = status.description(), "exiting");
    exit_code(status)
}

async fn run(config: Config) -> anyhow::Result<ExitStatus> {
    let launch = launch::parse_launch_config(std::env::args().nth(1).as_deref())?;
    let (identity, params) = launch.into_parts().context("invalid adapter identity")?;
    let registry = launch::load_registry(&config.runtime.definitions_path)?;

    info!(
        id = %identity.id,
        integration = %identity.integration_name,
        broker = %format!("{}:{}", config.mqtt.broker_host, config.mqtt.broker_port),
        "starting adapter"
    );

    let (session, events) = MqttSession::new(&config.mqtt, &identity.id);
    let store = FileSchemaStore::new(&config.runtime.schema_dir);
    let mut runtime = Runtime::new(
        identity,
        params,
        Arc::new(session),
        registry,
        store,
        config.runtime.options(),
    );

    iotbridge_adapter_virtual::register(&runtime.handle());

    runtime
        .connect()
        .await
        .context("failed to start the bus session")?;
    Ok(runtime.run(events, shutdown_signal()).await)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(%err, "unable to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(%err, "unable to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received ctrl-c"),
        () = terminate => info!("received SIGTERM"),
    }
}

fn exit_code(status: ExitStatus) -> ExitCode {
    u8::try_from(status.code()).map_or(ExitCode::FAILURE, ExitCode::from)
}
