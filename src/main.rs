mod config;
mod expense;
mod http;
mod pod;
mod rdf;

use anyhow::{Context, Result};
use tokio::runtime::Handle;
use tracing::info;

use crate::config::Config;
use crate::expense::ExpenseService;
use crate::pod::SolidClient;

mod flags {
    use std::path::PathBuf;

    xflags::xflags! {
        /// Keep expense records on a Solid Pod.
        cmd expense-pod {
            /// Path to a TOML config file.
            optional -c, --config config: PathBuf
            /// Port to listen on, overriding the config file.
            optional -p, --port port: u16
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let flags = flags::ExpensePod::from_env_or_exit();
    let mut config = Config::load(flags.config.as_deref())?;
    if let Some(port) = flags.port {
        config.server.http_port = port;
    }
    if config.pod.access_token.is_none() {
        info!(target: "config", "no access token configured; only public resources are reachable");
    }

    let client =
        SolidClient::new(&config.pod, Handle::current()).context("unable to build pod client")?;
    http::serve(&config.server, ExpenseService::new(client)).await
}
