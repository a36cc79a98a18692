use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use reqwest::StatusCode;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "gpt0-cli")]
#[command(about = "Client for the gpt0 origin and its bandwidth-limited proxy", long_about = None)]
struct Cli {
    /// Base URL of the server to talk to
    #[arg(short, long, default_value = "http://localhost:8000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// GET /gpt0
    Fetch,
    /// GET /limited-gpt0
    Limited,
    /// Show the remaining bandwidth budget
    Status,
    /// Time N sequential requests, stopping at the first failure
    Bench {
        #[arg(short = 'n', long, default_value_t = 100)]
        requests: u32,

        #[arg(short, long, default_value = "/gpt0")]
        path: String,
    },
    /// Call /limited-gpt0 until the budget runs out
    Drain {
        #[arg(long, default_value_t = 1000)]
        max_requests: u32,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Fetch => {
            let res = client.get(format!("{}/gpt0", base)).send().await?;
            print_text(res).await?;
        }
        Commands::Limited => {
            let res = client.get(format!("{}/limited-gpt0", base)).send().await?;
            print_text(res).await?;
        }
        Commands::Status => {
            let res = client.get(format!("{}/quota", base)).send().await?;
            print_json(res).await?;
        }
        Commands::Bench { requests, path } => {
            let url = format!("{}{}", base, path);
            let elapsed = bench(&client, &url, requests).await?;
            println!("{} took {:.4}s for {} requests", path, elapsed.as_secs_f64(), requests);
        }
        Commands::Drain { max_requests } => {
            let url = format!("{}/limited-gpt0", base);
            for count in 1..=max_requests {
                let res = client.get(&url).send().await?;
                match res.status() {
                    StatusCode::OK => continue,
                    StatusCode::TOO_MANY_REQUESTS => {
                        println!("Bandwidth limit hit after {} requests", count);
                        return Ok(());
                    }
                    status => {
                        return Err(format!("Unexpected status code: {}", status).into());
                    }
                }
            }
            return Err(format!("Made {} requests without hitting bandwidth limit", max_requests).into());
        }
    }

    Ok(())
}

async fn bench(
    client: &reqwest::Client,
    url: &str,
    requests: u32,
) -> Result<Duration, Box<dyn std::error::Error>> {
    let start = Instant::now();
    for i in 0..requests {
        let res = client.get(url).send().await?;
        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(format!(
                "Request failed with status {}: {} (after {} requests)",
                status,
                text,
                i + 1
            )
            .into());
        }
    }
    Ok(start.elapsed())
}

async fn print_text(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if status.is_success() {
        println!("{}", text);
    } else {
        eprintln!("Error: server returned status {}", status);
        eprintln!("Response: {}", text);
    }
    Ok(())
}

async fn print_json(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
