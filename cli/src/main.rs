use clap::{Parser, Subcommand};
use orderbook::{OrderType, Side};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "hftx-cli")]
#[command(about = "Exchange CLI - command line client for the matching engine service")]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    server: String,
    #[arg(long, default_value = "1")]
    user_id: i64,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a new order.
    Submit {
        #[arg(short = 's', long)]
        symbol: String,
        #[arg(long, value_parser = parse_side)]
        side: Side,
        #[arg(short = 'p', long)]
        price: i64,
        #[arg(short = 'q', long)]
        quantity: i64,
        #[arg(long, value_parser = parse_order_type, default_value = "limit")]
        order_type: OrderType,
    },
    /// Modify a resting order's price and/or quantity.
    Modify {
        #[arg(short = 's', long)]
        symbol: String,
        #[arg(long, value_parser = parse_side)]
        side: Side,
        #[arg(short = 'o', long)]
        order_id: String,
        #[arg(short = 'p', long)]
        price: i64,
        #[arg(short = 'q', long)]
        quantity: i64,
    },
    /// Cancel a resting order.
    Cancel {
        #[arg(short = 's', long)]
        symbol: String,
        #[arg(long, value_parser = parse_side)]
        side: Side,
        #[arg(short = 'o', long)]
        order_id: String,
    },
    /// List the symbols the exchange knows about.
    Symbols,
    /// Show a single symbol's reference data.
    Symbol {
        symbol: String,
    },
    /// Show top-of-book depth for a symbol.
    Depth {
        #[arg(short, long)]
        symbol: String,
        #[arg(short, long, default_value = "10")]
        levels: usize,
    },
    /// Show the most recent trades printed for a symbol today.
    Trades {
        #[arg(short, long)]
        symbol: String,
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Service health check.
    Health,
}

#[derive(Serialize)]
struct SubmitBody {
    order_type: Option<OrderType>,
    price: i64,
    quantity: i64,
}

#[derive(Serialize)]
struct ModifyBody {
    order_id: String,
    price: i64,
    quantity: i64,
}

#[derive(Serialize)]
struct CancelBody {
    order_id: String,
}

#[derive(Deserialize)]
struct SymbolsResponse {
    symbols: Vec<String>,
}

#[derive(Deserialize)]
struct PriceLevel {
    price: i64,
    quantity: i64,
}

#[derive(Deserialize)]
struct DepthSnapshot {
    symbol: String,
    bids: Vec<PriceLevel>,
    asks: Vec<PriceLevel>,
}

fn parse_side(s: &str) -> Result<Side, String> {
    match s.to_lowercase().as_str() {
        "buy" => Ok(Side::Buy),
        "sell" => Ok(Side::Sell),
        _ => Err(format!("invalid side: {s}. use 'buy' or 'sell'")),
    }
}

fn parse_order_type(s: &str) -> Result<OrderType, String> {
    match s.to_lowercase().as_str() {
        "limit" => Ok(OrderType::Limit),
        "market" => Ok(OrderType::Market),
        _ => Err(format!("invalid order type: {s}. use 'limit' or 'market'")),
    }
}

fn side_path(side: Side) -> &'static str {
    match side {
        Side::Buy => "buy",
        Side::Sell => "sell",
    }
}

async fn print_response(response: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = response.status();
    let body: serde_json::Value = response.json().await?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    if !status.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Submit { symbol, side, price, quantity, order_type } => {
            let body = SubmitBody { order_type: Some(order_type), price, quantity };
            let response = client
                .post(format!("{}/symbols/{}/orders/{}", cli.server, symbol, side_path(side)))
                .header("x-user-id", cli.user_id.to_string())
                .json(&body)
                .send()
                .await?;
            print_response(response).await?;
        }

        Commands::Modify { symbol, side, order_id, price, quantity } => {
            let body = ModifyBody { order_id: order_id.clone(), price, quantity };
            let response = client
                .patch(format!("{}/symbols/{}/orders/{}/{}", cli.server, symbol, side_path(side), order_id))
                .header("x-user-id", cli.user_id.to_string())
                .json(&body)
                .send()
                .await?;
            print_response(response).await?;
        }

        Commands::Cancel { symbol, side, order_id } => {
            let body = CancelBody { order_id: order_id.clone() };
            let _ = &body; // cancel ignores the body server-side; kept for symmetry
            let response = client
                .delete(format!("{}/symbols/{}/orders/{}/{}", cli.server, symbol, side_path(side), order_id))
                .header("x-user-id", cli.user_id.to_string())
                .send()
                .await?;
            print_response(response).await?;
        }

        Commands::Symbols => {
            let response = client.get(format!("{}/symbols", cli.server)).send().await?;
            let symbols: SymbolsResponse = response.json().await?;
            for symbol in symbols.symbols {
                println!("{symbol}");
            }
        }

        Commands::Symbol { symbol } => {
            let response = client.get(format!("{}/symbols/{}", cli.server, symbol)).send().await?;
            print_response(response).await?;
        }

        Commands::Depth { symbol, levels } => {
            let response = client
                .get(format!("{}/symbols/{}/depth?levels={}", cli.server, symbol, levels))
                .send()
                .await?;
            let depth: DepthSnapshot = response.json().await?;

            println!("Market depth for {}", depth.symbol);
            println!("\nAsks:");
            for (i, level) in depth.asks.iter().enumerate().rev() {
                println!("  {}: {} @ {}", i + 1, level.quantity, level.price);
            }
            println!("\nBids:");
            for (i, level) in depth.bids.iter().enumerate() {
                println!("  {}: {} @ {}", i + 1, level.quantity, level.price);
            }
        }

        Commands::Trades { symbol, limit } => {
            let response = client
                .get(format!("{}/symbols/{}/trades?limit={}", cli.server, symbol, limit))
                .send()
                .await?;
            print_response(response).await?;
        }

        Commands::Health => {
            let response = client.get(format!("{}/health", cli.server)).send().await?;
            print_response(response).await?;
        }
    }

    Ok(())
}
