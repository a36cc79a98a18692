use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use bandwidth_proxy::config::{load_config, validate_config, AppConfig, ConfigError};
use bandwidth_proxy::lifecycle::{spawn_signal_listener, Shutdown};
use bandwidth_proxy::observability::{logging, metrics};
use bandwidth_proxy::HttpServer;

/// Serve the /gpt0 origin, the /limited-gpt0 quota proxy, or both.
#[derive(Parser, Debug)]
#[command(name = "bandwidth-proxy", version)]
struct Args {
    /// Enable the /gpt0 endpoint
    #[arg(long)]
    gpt0: bool,

    /// Enable the /limited-gpt0 endpoint
    #[arg(long)]
    limited: bool,

    /// Port to run the server on
    #[arg(long)]
    port: Option<u16>,

    /// Host to run the server on
    #[arg(long)]
    host: Option<String>,

    /// URL of the GPT0 service (e.g., http://localhost:8000)
    #[arg(long = "gpt0-url")]
    gpt0_url: Option<String>,

    /// Bandwidth limit in bytes for the limited endpoint
    #[arg(long = "bandwidth-limit")]
    bandwidth_limit: Option<u64>,

    /// Artificial delay in seconds for GPT0 responses
    #[arg(long = "response-delay")]
    response_delay: Option<f64>,

    /// Optional TOML config file; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl Args {
    /// Overlay flags on a base config. With neither endpoint flag, the base selection stands.
    fn apply(self, mut config: AppConfig) -> AppConfig {
        if self.gpt0 || self.limited {
            config.endpoints.gpt0 = self.gpt0;
            config.endpoints.limited = self.limited;
        }
        if let Some(host) = self.host {
            config.listener.host = host;
        }
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(url) = self.gpt0_url {
            config.proxy.origin_url = url;
        }
        if let Some(limit) = self.bandwidth_limit {
            config.proxy.bandwidth_limit_bytes = limit;
        }
        if let Some(delay) = self.response_delay {
            config.origin.response_delay_secs = delay;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration: file (if any), then flags
    let mut args = Args::parse();

    let base = match args.config.take() {
        Some(path) => load_config(&path)?,
        None => AppConfig::default(),
    };
    let config = args.apply(base);
    validate_config(&config).map_err(ConfigError::Validation)?;

    // Initialize tracing subscriber
    logging::init_logging(&config.observability.log_level);
    tracing::info!("bandwidth-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address(),
        gpt0 = config.endpoints.gpt0,
        limited = config.endpoints.limited,
        origin_url = %config.proxy.origin_url,
        bandwidth_limit_bytes = config.proxy.bandwidth_limit_bytes,
        response_delay_secs = config.origin.response_delay_secs,
        "Configuration loaded"
    );

    // Initialize metrics server
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // Bind TCP listener
    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    // Create and run HTTP server
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    let server_shutdown = shutdown.subscribe();
    spawn_signal_listener(shutdown);

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> AppConfig {
        let mut all = vec!["bandwidth-proxy"];
        all.extend_from_slice(argv);
        Args::parse_from(all).apply(AppConfig::default())
    }

    #[test]
    fn test_no_endpoint_flags_enables_both() {
        let config = parse(&[]);
        assert!(config.endpoints.gpt0);
        assert!(config.endpoints.limited);
        assert_eq!(config.proxy.bandwidth_limit_bytes, 1000);
        assert_eq!(config.origin.response_delay_secs, 0.0);
    }

    #[test]
    fn test_single_endpoint_flag() {
        let config = parse(&["--gpt0", "--port", "9100", "--response-delay", "0.5"]);
        assert!(config.endpoints.gpt0);
        assert!(!config.endpoints.limited);
        assert_eq!(config.listener.port, 9100);
        assert_eq!(config.origin.response_delay_secs, 0.5);
    }

    #[test]
    fn test_limited_flags() {
        let config = parse(&[
            "--limited",
            "--gpt0-url",
            "http://127.0.0.1:9000",
            "--bandwidth-limit",
            "50",
            "--host",
            "127.0.0.1",
        ]);
        assert!(!config.endpoints.gpt0);
        assert!(config.endpoints.limited);
        assert_eq!(config.proxy.origin_url, "http://127.0.0.1:9000");
        assert_eq!(config.proxy.bandwidth_limit_bytes, 50);
        assert_eq!(config.listener.bind_address(), "127.0.0.1:8000");
    }
}
