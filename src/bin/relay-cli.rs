use clap::{Parser, Subcommand};
use reqwest::Method;
use serde_json::Value;

use cors_relay::client::{ApiClient, ClientError, Registration};

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Call the backend API through the CORS relay", long_about = None)]
struct Cli {
    /// API base URL (the relay's public prefix).
    #[arg(short, long, default_value = "http://localhost:8080/api")]
    url: String,

    /// Token sent as `Authorization: Token <value>`.
    #[arg(short, long, env = "RELAY_API_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// GET an endpoint
    Get { endpoint: String },
    /// Send a request with an optional JSON body
    Send {
        method: String,
        endpoint: String,
        #[arg(short, long)]
        data: Option<String>,
    },
    /// Issue a CORS preflight and print the allowed methods/headers
    Preflight { endpoint: String },
    /// Look up a user's report
    Report { id_number: String },
    /// Register a user
    Register {
        #[arg(long)]
        id_number: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        city: String,
        #[arg(long)]
        photo: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = ApiClient::new(cli.url.clone(), cli.token)?;

    let result = match cli.command {
        Commands::Get { endpoint } => match client.request(Method::GET, &endpoint, None).await {
            Ok(res) => print_response(res).await,
            Err(e) => Err(e),
        },
        Commands::Send { method, endpoint, data } => {
            let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())?;
            let body: Option<Value> = data.as_deref().map(serde_json::from_str).transpose()?;
            match client.request(method, &endpoint, body.as_ref()).await {
                Ok(res) => print_response(res).await,
                Err(e) => Err(e),
            }
        }
        Commands::Preflight { endpoint } => {
            let res = reqwest::Client::new()
                .request(Method::OPTIONS, format!("{}{}", cli.url.trim_end_matches('/'), endpoint))
                .send()
                .await?;
            println!("Status: {}", res.status());
            for (name, value) in res.headers() {
                if name.as_str().starts_with("access-control-") {
                    println!("{}: {}", name, value.to_str().unwrap_or("<binary>"));
                }
            }
            Ok(())
        }
        Commands::Report { id_number } => client.get_report(&id_number).await.map(print_json),
        Commands::Register {
            id_number,
            name,
            phone,
            city,
            photo,
        } => {
            let registration = Registration {
                id_number,
                name,
                phone,
                city,
                photo,
            };
            client.register_user(&registration).await.map(print_json)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        if let ClientError::Status { data, .. } = &e {
            eprintln!("Response: {}", data);
        }
        std::process::exit(1);
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), ClientError> {
    let text = res.text().await?;
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => print_json(json),
        Err(_) => println!("{}", text),
    }
    Ok(())
}

fn print_json(json: Value) {
    match serde_json::to_string_pretty(&json) {
        Ok(pretty) => println!("{}", pretty),
        Err(_) => println!("{}", json),
    }
}
