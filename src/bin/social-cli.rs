use clap::{Parser, Subcommand, ValueEnum};
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;

#[derive(Parser)]
#[command(name = "social-cli")]
#[command(about = "Send requests to the social gateway REST endpoint", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080/social/rest")]
    url: String,

    /// Security token passed as the `st` parameter.
    #[arg(short, long)]
    token: Option<String>,

    /// Response format to ask for.
    #[arg(short, long, value_enum)]
    format: Option<WireFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum WireFormat {
    Json,
    Xml,
    Atom,
}

impl WireFormat {
    fn as_str(self) -> &'static str {
        match self {
            WireFormat::Json => "json",
            WireFormat::Xml => "xml",
            WireFormat::Atom => "atom",
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a resource, e.g. `people/@me/@self`
    Get { path: String },
    /// Create a resource from a JSON body
    Post { path: String, body: String },
    /// Update a resource from a JSON body
    Put { path: String, body: String },
    /// Delete a resource
    Delete { path: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let (method, path, body) = match cli.command {
        Commands::Get { path } => (Method::GET, path, None),
        Commands::Post { path, body } => (Method::POST, path, Some(body)),
        Commands::Put { path, body } => (Method::PUT, path, Some(body)),
        Commands::Delete { path } => (Method::DELETE, path, None),
    };

    let url = format!(
        "{}/{}",
        cli.url.trim_end_matches('/'),
        path.trim_start_matches('/')
    );

    let mut query: Vec<(&str, &str)> = Vec::new();
    if let Some(token) = cli.token.as_deref() {
        query.push(("st", token));
    }
    if let Some(format) = cli.format {
        query.push(("format", format.as_str()));
    }

    let mut request = client.request(method, url).query(&query);
    if let Some(body) = body {
        request = request.header(CONTENT_TYPE, "application/json").body(body);
    }

    let res = request.send().await?;
    let status = res.status();
    let text = res.text().await?;

    if status.is_success() {
        match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
            Err(_) => println!("{text}"),
        }
    } else {
        eprintln!("Error: gateway returned status {status}");
        eprintln!("{text}");
    }

    Ok(())
}
