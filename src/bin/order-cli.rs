use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "order-cli")]
#[command(about = "Query the order and customer services", long_about = None)]
struct Cli {
    /// Order service base URL
    #[arg(long, default_value = "http://localhost:8080")]
    orders_url: String,

    /// Customer service base URL
    #[arg(long, default_value = "http://localhost:8081")]
    customers_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch an order, enriched with its customer
    Order { id: String },
    /// Fetch a customer
    Customer { id: String },
    /// Check both services are up
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Order { id } => {
            let res = client
                .get(format!("{}/api/orders/{}", cli.orders_url, id))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Customer { id } => {
            let res = client
                .get(format!("{}/api/customers/{}", cli.customers_url, id))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Health => {
            for url in [
                format!("{}/api/orders/health", cli.orders_url),
                format!("{}/api/customers/health", cli.customers_url),
            ] {
                match client.get(&url).send().await {
                    Ok(res) if res.status().is_success() => println!("{}", res.text().await?),
                    Ok(res) => eprintln!("{url}: status {}", res.status()),
                    Err(e) => eprintln!("{url}: {e}"),
                }
            }
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: service returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
