use clap::{Parser, ValueEnum};
use reqwest::StatusCode;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "filters-cli")]
#[command(about = "Exercise the authorization filter endpoints", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// How many requests to send.
    #[arg(short, long, default_value_t = 1)]
    times: u32,

    #[arg(value_enum)]
    check: Check,
}

#[derive(Clone, Copy, ValueEnum)]
enum Check {
    /// Sync filter, no parameter
    Sync,
    /// Async filter, no parameter
    Async,
    /// Async filter with a parameter
    Parameter,
    /// Async filter with a parameter and an injected logger
    Dependency,
    /// Filter resolved from the service registry
    Service,
    /// Filter attached through the declarative wrapper
    Attribute,
}

impl Check {
    fn path(self) -> &'static str {
        match self {
            Check::Sync => "check-authorizationfilter-without-parameter",
            Check::Async => "check-async-authorizationfilter-without-parameter",
            Check::Parameter => "check-async-authorizationfilter-with-parameter",
            Check::Dependency => "check-async-authorizationfilter-with-parameter-and-dependency",
            Check::Service => "check-access-with-servicefilter",
            Check::Attribute => "check-access-with-attribute",
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Granted,
    Denied,
}

/// The endpoints only ever answer 200 or 403; anything else is a failure.
fn classify(status: StatusCode) -> Result<Outcome, String> {
    match status {
        StatusCode::OK => Ok(Outcome::Granted),
        StatusCode::FORBIDDEN => Ok(Outcome::Denied),
        other => Err(format!("unexpected status {}", other)),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let url = format!(
        "{}/api/authorizationfilter/{}",
        cli.url.trim_end_matches('/'),
        cli.check.path()
    );

    let mut granted = 0u32;
    let mut denied = 0u32;
    let mut last_denial: Option<Value> = None;

    for _ in 0..cli.times {
        let res = client.get(&url).send().await?;
        match classify(res.status()) {
            Ok(Outcome::Granted) => granted += 1,
            Ok(Outcome::Denied) => {
                denied += 1;
                last_denial = Some(res.json().await?);
            }
            Err(message) => {
                if let Ok(text) = res.text().await {
                    eprintln!("Response: {}", text);
                }
                return Err(format!("{} from {}", message, url).into());
            }
        }
    }

    println!("{}: granted={} denied={}", url, granted, denied);
    if let Some(body) = last_denial {
        println!("{}", serde_json::to_string_pretty(&body)?);
    }
    Ok(())
}
