use crate::config::AppConfig;
use crate::propertydata::PropertyDataClient;
use crate::router::handle;
use crate::state::AppState;
use astra::Server;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

mod address;
mod bulk;
mod config;
mod domain;
mod errors;
mod propertydata;
mod responses;
mod router;
mod services;
mod spreadsheets;
mod state;
mod templates;

#[cfg(test)]
mod tests;

fn main() {
    // RUST_LOG overrides, default INFO
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_target(false)
        .init();

    // 1️⃣ Configuration from the environment
    let config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };
    if config.api_key.is_none() {
        tracing::warn!("PROPERTY_DATA_API_KEY is not set, every lookup will fail");
    }

    // 2️⃣ Upstream client
    let client = match PropertyDataClient::new(
        config.base_url.clone(),
        config.api_key.clone(),
        config.request_timeout,
    ) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "failed to build property data client");
            std::process::exit(1);
        }
    };

    // 3️⃣ Start the server
    let addr = config.bind_addr;
    let server = Server::bind(&addr).max_workers(config.max_workers);
    let state = AppState::new(config, Box::new(client));
    tracing::info!(%addr, "starting server at http://{addr}");

    // 4️⃣ Serve requests, sharing the state with every worker
    let result = server.serve(move |req: astra::Request, _info: astra::ConnectionInfo| {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        match handle(req, &state) {
            Ok(resp) => resp,
            Err(err) => {
                if err.status() >= 500 {
                    tracing::error!(%method, path = %path, error = %err, "request failed");
                } else {
                    tracing::debug!(%method, path = %path, error = %err, "request rejected");
                }
                templates::html_error_response(err)
            }
        }
    });

    if let Err(e) = result {
        tracing::error!(error = %e, "server ended with error");
    }

    tracing::info!("server shut down cleanly");
}
