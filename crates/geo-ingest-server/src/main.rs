//! geo-ingest server - main entry point

use anyhow::Result;
use geo_ingest_common::{
    env,
    logging::{init_logging, LogConfig},
};
use geo_ingest_server::{api, config::Config};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    env::load_dotenv();

    let log_config = LogConfig::builder()
        .log_file_prefix("geo-ingest-server")
        .filter_directives("geo_ingest=debug,geo_ingest_server=debug,tower_http=debug,aws_smithy_runtime=warn")
        .build()
        .merge_env()?;

    let _log_guard = init_logging(&log_config)?;

    info!("Starting geo-ingest server");

    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    api::serve(config).await
}
