use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("missing admin token; run `login` and set FESTIVAL_ADMIN_TOKEN or pass --token")]
    MissingToken,
    #[error("missing admin password; pass --password or set FESTIVAL_ADMIN_PASSWORD")]
    MissingPassword,
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
    #[error("server returned HTTP {status}: {message}")]
    ServerError { status: u16, message: String },
    #[error("missing expected field `{0}`")]
    MissingField(&'static str),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("cannot read {path}: {message}")]
    Io { path: String, message: String },
    #[error("unsupported image type for {0}; use png, jpg, webp or gif")]
    UnsupportedImage(String),
}

#[derive(Parser, Debug)]
#[command(name = "festival-cli", about = "Sports festival admin CLI")]
struct Cli {
    #[arg(long, env = "FESTIVAL_BASE_URL", default_value = "http://127.0.0.1:3000")]
    base_url: String,

    #[arg(long, env = "FESTIVAL_ADMIN_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone)]
struct CliContext {
    base_url: String,
    token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Entity {
    Sports,
    Teams,
    Matches,
    Medals,
    Rules,
    News,
}

impl Entity {
    fn path(self) -> &'static str {
        match self {
            Self::Sports => "sports",
            Self::Teams => "teams",
            Self::Matches => "matches",
            Self::Medals => "medals",
            Self::Rules => "rules",
            Self::News => "news",
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check the server is up.
    Ping,
    /// Log in and print a session token for FESTIVAL_ADMIN_TOKEN.
    Login {
        #[arg(long, env = "FESTIVAL_ADMIN_PASSWORD")]
        password: Option<String>,
    },
    List {
        entity: Entity,
        #[arg(long)]
        sport_id: Option<Uuid>,
        #[arg(long)]
        team_id: Option<Uuid>,
        #[arg(long, help = "upcoming, ongoing or past (matches only)")]
        status: Option<String>,
    },
    Get {
        entity: Entity,
        id: Uuid,
    },
    Create {
        entity: Entity,
        #[arg(long)]
        data: String,
    },
    /// Create one row per line of a JSONL file (or stdin).
    Import {
        entity: Entity,
        #[arg(long, default_value = "-", help = "Input file path, or - for stdin")]
        input: String,
    },
    Update {
        entity: Entity,
        id: Uuid,
        #[arg(long)]
        data: String,
    },
    Delete {
        entity: Entity,
        id: Uuid,
    },
    /// Upload an image and print its public URL.
    Upload {
        file: PathBuf,
        #[arg(long, default_value = "misc")]
        folder: String,
    },
    /// Print the medal table.
    Tally {
        #[arg(long)]
        sport_id: Option<Uuid>,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let ctx = CliContext { base_url: cli.base_url, token: cli.token };

    match cli.command {
        Command::Ping => run_ping(&ctx).await,
        Command::Login { password } => run_login(&ctx, password).await,
        Command::List { entity, sport_id, team_id, status } => {
            let mut query = Vec::new();
            if let Some(sport_id) = sport_id {
                query.push(format!("sport_id={sport_id}"));
            }
            if let Some(team_id) = team_id {
                query.push(format!("team_id={team_id}"));
            }
            if let Some(status) = status {
                query.push(format!("status={status}"));
            }
            let path = with_query(&format!("/api/{}", entity.path()), &query);
            let json = api_request(&ctx, reqwest::Method::GET, &path, None, false).await?;
            print_json(&json)
        }
        Command::Get { entity, id } => {
            let path = format!("/api/{}/{id}", entity.path());
            let json = api_request(&ctx, reqwest::Method::GET, &path, None, false).await?;
            print_json(&json)
        }
        Command::Create { entity, data } => {
            let body = serde_json::from_str::<Value>(&data)?;
            let path = format!("/api/admin/{}", entity.path());
            let json = api_request(&ctx, reqwest::Method::POST, &path, Some(body), true).await?;
            print_json(&json)
        }
        Command::Import { entity, input } => run_import(&ctx, entity, &input).await,
        Command::Update { entity, id, data } => {
            let body = serde_json::from_str::<Value>(&data)?;
            let path = format!("/api/admin/{}/{id}", entity.path());
            let json = api_request(&ctx, reqwest::Method::PATCH, &path, Some(body), true).await?;
            print_json(&json)
        }
        Command::Delete { entity, id } => {
            let path = format!("/api/admin/{}/{id}", entity.path());
            let json = api_request(&ctx, reqwest::Method::DELETE, &path, None, true).await?;
            print_json(&json)
        }
        Command::Upload { file, folder } => run_upload(&ctx, &file, &folder).await,
        Command::Tally { sport_id } => {
            let query: Vec<String> = sport_id.map(|id| format!("sport_id={id}")).into_iter().collect();
            let path = with_query("/api/medals/tally", &query);
            let json = api_request(&ctx, reqwest::Method::GET, &path, None, false).await?;
            print_tally(&json);
            Ok(())
        }
    }
}

async fn run_ping(cli: &CliContext) -> Result<(), CliError> {
    let client = reqwest::Client::new();
    let url = format!("{}/healthz", cli.base_url.trim_end_matches('/'));
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CliError::ServerError {
            status: status.as_u16(),
            message: "health check failed".to_owned(),
        });
    }
    println!("ok");
    Ok(())
}

async fn run_login(cli: &CliContext, password: Option<String>) -> Result<(), CliError> {
    let password = password.ok_or(CliError::MissingPassword)?;
    let body = serde_json::json!({ "password": password });
    let json = api_request(cli, reqwest::Method::POST, "/api/admin/login", Some(body), false).await?;
    let token = json
        .get("token")
        .and_then(Value::as_str)
        .ok_or(CliError::MissingField("token"))?;
    if let Some(expires_at) = json.get("expires_at").and_then(Value::as_str) {
        eprintln!("session expires at {expires_at}");
    }
    println!("{token}");
    Ok(())
}

async fn run_import(cli: &CliContext, entity: Entity, input: &str) -> Result<(), CliError> {
    let io_error = |error: io::Error| CliError::Io { path: input.to_owned(), message: error.to_string() };
    let reader: Box<dyn BufRead> = if input == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        Box::new(BufReader::new(std::fs::File::open(input).map_err(io_error)?))
    };

    let path = format!("/api/admin/{}", entity.path());
    let mut created = 0_usize;
    let mut skipped = 0_usize;
    for line in reader.lines() {
        let line = line.map_err(io_error)?;
        let Some(payload) = parse_jsonl_line(&line)? else {
            skipped = skipped.saturating_add(1);
            continue;
        };
        let json = api_request(cli, reqwest::Method::POST, &path, Some(payload), true).await?;
        if let Some(id) = json.get("id").and_then(Value::as_str) {
            println!("{id}");
        }
        created = created.saturating_add(1);
    }

    eprintln!("import complete: entity={} created={created} skipped={skipped}", entity.path());
    Ok(())
}

async fn run_upload(cli: &CliContext, file: &Path, folder: &str) -> Result<(), CliError> {
    let display = file.display().to_string();
    let content_type = content_type_for(file).ok_or_else(|| CliError::UnsupportedImage(display.clone()))?;
    let bytes = tokio::fs::read(file)
        .await
        .map_err(|error| CliError::Io { path: display, message: error.to_string() })?;

    let client = admin_client(cli)?;
    let url = format!("{}/api/admin/images?folder={folder}", cli.base_url.trim_end_matches('/'));
    let response = client
        .post(url)
        .header(CONTENT_TYPE, content_type)
        .body(bytes)
        .send()
        .await?;
    let json = read_response(response).await?;
    print_json(&json)
}

fn admin_client(cli: &CliContext) -> Result<reqwest::Client, CliError> {
    let token = cli.token.as_deref().ok_or(CliError::MissingToken)?;
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}"))?);
    Ok(reqwest::Client::builder().default_headers(headers).build()?)
}

async fn api_request(
    cli: &CliContext,
    method: reqwest::Method,
    path: &str,
    body: Option<Value>,
    admin: bool,
) -> Result<Value, CliError> {
    let client = if admin { admin_client(cli)? } else { reqwest::Client::new() };
    let url = format!("{}{}", cli.base_url.trim_end_matches('/'), path);
    let request = client.request(method, &url);
    let request = if let Some(json) = body { request.json(&json) } else { request };

    let response = request.send().await?;
    read_response(response).await
}

async fn read_response(response: reqwest::Response) -> Result<Value, CliError> {
    let status = response.status();
    let value = response.json::<Value>().await.unwrap_or(Value::Null);

    if !status.is_success() {
        let message = value
            .get("error")
            .and_then(Value::as_str)
            .map_or_else(|| value.to_string(), ToOwned::to_owned);
        return Err(CliError::ServerError { status: status.as_u16(), message });
    }

    Ok(value)
}

fn with_query(path: &str, query: &[String]) -> String {
    if query.is_empty() { path.to_owned() } else { format!("{path}?{}", query.join("&")) }
}

fn content_type_for(file: &Path) -> Option<&'static str> {
    let ext = file.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

fn print_tally(value: &Value) {
    println!("{:>4}  {:<28} {:>4} {:>4} {:>4} {:>5}", "#", "team", "G", "S", "B", "total");
    for row in value.as_array().into_iter().flatten() {
        let count = |key: &str| row.get(key).and_then(Value::as_i64).unwrap_or(0);
        println!(
            "{:>4}  {:<28} {:>4} {:>4} {:>4} {:>5}",
            count("rank"),
            row.get("team_name").and_then(Value::as_str).unwrap_or("?"),
            count("gold"),
            count("silver"),
            count("bronze"),
            count("total"),
        );
    }
}

/// One create payload per non-blank line; exported ids and timestamps are dropped.
fn parse_jsonl_line(line: &str) -> Result<Option<Value>, CliError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let mut value = serde_json::from_str::<Value>(trimmed)?;
    let Some(map) = value.as_object_mut() else {
        return Ok(None);
    };
    map.remove("id");
    map.remove("created_at");
    if map.is_empty() {
        return Ok(None);
    }
    Ok(Some(value))
}
