//! JHA webserver entry point

use clap::Parser;
use shared::logging;
use tokio::signal;
use tracing::info;

use webserver::{Args, RealJhaRepository, ServerConfig, WebServer, WebServerResult};

#[tokio::main]
async fn main() -> WebServerResult<()> {
    // A missing .env is fine; flags and the real environment still apply
    dotenv::dotenv().ok();

    let args = Args::parse();
    logging::init_tracing(Some(&args.log_level));

    let config = match ServerConfig::try_from(args) {
        Ok(config) => config,
        Err(e) => {
            logging::log_error("Configuration", &e);
            return Err(e);
        }
    };

    logging::log_startup(&format!(
        "JHA webserver on {} (database: {:?})",
        config.bind_address, config.store.location
    ));

    let repository = RealJhaRepository::open(config.store.clone()).await?;
    info!("🗄️ Store ready, schema migrated");

    let server = WebServer::new(config.bind_address, repository);

    let shutdown = async {
        if let Err(e) = signal::ctrl_c().await {
            logging::log_error("Signal handler", &e);
        }
        logging::log_shutdown("Ctrl+C received");
    };

    if let Err(e) = server.run(shutdown).await {
        logging::log_error("WebServer", &e);
        return Err(e);
    }

    logging::log_success("WebServer stopped cleanly");
    Ok(())
}
