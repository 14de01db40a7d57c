//! discoctl
//!
//! Command-line interface for calling REST APIs described by a discovery
//! document.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use discovery_client::{
    CallArgs, ClientConfig, Collection, DiscoveryClient, DiscoveryDoc, DiscoveryParser,
    HttpTransport, Node, RawResponse, RequestBody,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "discoctl")]
#[command(version, about = "Call REST APIs described by a discovery document", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// YAML configuration file
    #[arg(short, long, global = true, env = "DISCOCTL_CONFIG")]
    config: Option<PathBuf>,

    /// Service root URL (overrides the config file and the document's rootUrl)
    #[arg(long, global = true, env = "DISCOCTL_ROOT_URL")]
    root_url: Option<String>,

    /// Discovery document path relative to the root URL
    #[arg(long, global = true)]
    discovery_path: Option<String>,

    /// Read the discovery document from a local file instead of fetching it
    #[arg(long, global = true)]
    document: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resources and methods of the service
    #[command(after_help = "EXAMPLES:\n  \
        # Fetch from the default fleet endpoint\n  \
        discoctl tree\n\n  \
        # Use a local discovery document\n  \
        discoctl tree --document fleet-v1.json")]
    Tree,

    /// Show the parameters of one method
    #[command(after_help = "EXAMPLES:\n  \
        discoctl describe Units.Get")]
    Describe {
        /// Dotted method path (e.g., Units.Get)
        method: String,
    },

    /// Invoke a method and print the response
    #[command(after_help = "EXAMPLES:\n  \
        # List machines\n  \
        discoctl call Machines.List\n\n  \
        # Get a unit (path parameter)\n  \
        discoctl call Units.Get -p unitName=hello.service\n\n  \
        # Filter unit states (query parameters)\n  \
        discoctl call UnitState.List -p machineID=c31e44e1 -p unitName=hello.service\n\n  \
        # Create a unit with a JSON body from a file\n  \
        discoctl call Units.Set -p unitName=hello.service --body @hello.json")]
    Call {
        /// Dotted method path (e.g., Units.Get)
        method: String,

        /// Parameter as key=value (repeatable)
        #[arg(short, long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,

        /// Request body as JSON, or @file to read it from a file
        #[arg(short, long)]
        body: Option<String>,

        /// Print the response body without pretty-printing
        #[arg(long)]
        raw: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli)?;

    if cli.verbose {
        println!("{} Verbose mode enabled", "→".cyan());
        println!("  Root URL: {}", config.effective_root_url());
        println!("  Discovery path: {}", config.discovery_path);
        println!("  Timeout: {}s", config.timeout_secs);
    }

    let client = build_client(&config, cli.document.as_deref()).await?;

    match cli.command {
        Commands::Tree => tree_command(&client, cli.verbose),
        Commands::Describe { method } => describe_command(&client, &method),
        Commands::Call {
            method,
            params,
            body,
            raw,
        } => call_command(&client, &method, &params, body.as_deref(), raw).await,
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Config file values, overridden by command-line flags
fn load_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ClientConfig::default(),
    };

    if let Some(root_url) = &cli.root_url {
        config.root_url = Some(root_url.clone());
    }
    if let Some(discovery_path) = &cli.discovery_path {
        config.discovery_path = discovery_path.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

async fn build_client(
    config: &ClientConfig,
    document: Option<&Path>,
) -> Result<DiscoveryClient<HttpTransport>> {
    match document {
        Some(path) => {
            println!("{} Loading discovery document: {}", "→".cyan(), path.display());
            let doc: DiscoveryDoc = DiscoveryParser::from_file(path)
                .context("Failed to load discovery document")?
                .into_doc();
            let transport = HttpTransport::new(config).context("Failed to create transport")?;
            DiscoveryClient::from_config(&doc, config, transport)
                .context("Failed to build client")
        }
        None => {
            let url = config.discovery_url()?;
            println!("{} Fetching discovery document: {}", "→".cyan(), url);
            DiscoveryClient::connect(config)
                .await
                .context("Failed to fetch discovery document")
        }
    }
}

fn tree_command(client: &DiscoveryClient<HttpTransport>, verbose: bool) -> Result<()> {
    let root = client.root();
    println!("\n{}", "Service:".bold());
    println!("  Base URI: {}", client.base_uri().as_str().yellow());
    println!("  Resources: {}", root.collection_count());
    println!("  Methods: {}", root.method_count());
    println!();
    print_collection(root, 1, verbose);
    Ok(())
}

fn print_collection(collection: &Collection, depth: usize, verbose: bool) {
    let indent = "  ".repeat(depth);
    for (name, node) in collection {
        match node {
            Node::Collection(child) => {
                println!("{}• {}", indent, name.cyan());
                print_collection(child, depth + 1, verbose);
            }
            Node::Method(method) => {
                let descriptor = method.descriptor();
                println!(
                    "{}{} {} {}",
                    indent,
                    name.green(),
                    descriptor.http_method.yellow(),
                    descriptor.path
                );
                if verbose {
                    if let Some(description) = &descriptor.description {
                        println!("{}  {}", indent, description.dimmed());
                    }
                }
            }
        }
    }
}

fn describe_command(client: &DiscoveryClient<HttpTransport>, path: &str) -> Result<()> {
    let method = client.method(path)?;
    let descriptor = method.descriptor();

    println!("\n{}", path.bold());
    if let Some(id) = &descriptor.id {
        println!("  ID: {}", id);
    }
    println!("  HTTP: {} {}", descriptor.http_method.yellow(), descriptor.path);
    if let Some(description) = &descriptor.description {
        println!("  Description: {}", description);
    }
    if let Some(request) = &descriptor.request {
        println!("  Body: {}", request.ref_schema);
    }
    if let Some(response) = &descriptor.response {
        println!("  Returns: {}", response.ref_schema);
    }

    let required_args = method.required_arguments();
    let undeclared: Vec<&str> = required_args
        .iter()
        .filter(|name| !descriptor.parameters.contains_key(name.as_str()))
        .map(String::as_str)
        .collect();
    if !undeclared.is_empty() {
        println!("  Template variables: {} (required)", undeclared.join(", "));
    }

    if descriptor.parameters.is_empty() {
        println!("  Parameters: none");
        return Ok(());
    }

    println!("\n{}", "Parameters:".bold());
    for (name, param) in &descriptor.parameters {
        let location = param.location.as_deref().unwrap_or("query");
        let required = if param.required || required_args.contains(name) {
            " (required)".red().to_string()
        } else {
            String::new()
        };
        println!(
            "  {} [{}]{}{}",
            name.cyan(),
            location,
            param
                .param_type
                .as_deref()
                .map(|t| format!(" {}", t))
                .unwrap_or_default(),
            required
        );
        if let Some(description) = &param.description {
            println!("    {}", description);
        }
    }

    Ok(())
}

async fn call_command(
    client: &DiscoveryClient<HttpTransport>,
    path: &str,
    params: &[String],
    body: Option<&str>,
    raw: bool,
) -> Result<()> {
    let mut args = CallArgs::new();
    for param in params {
        let (key, value) = parse_param(param)?;
        args.insert(key, value);
    }
    if let Some(body) = body {
        args.set_body(parse_body(body)?);
    }

    println!("{} Calling {}", "→".cyan(), path.yellow());
    let response = client.call(path, args).await?;
    print_response(&response, raw);

    if !response.is_success() {
        bail!("{} returned HTTP {}", path, response.status);
    }
    Ok(())
}

/// Split `key=value`; the value may itself contain `=`
fn parse_param(param: &str) -> Result<(&str, &str)> {
    param
        .split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| anyhow!("Invalid parameter '{}', expected KEY=VALUE", param))
}

/// Inline JSON, or `@path` to read the body from a file
fn parse_body(body: &str) -> Result<RequestBody> {
    let content = match body.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read body file {}", path))?,
        None => body.to_string(),
    };
    let value: serde_json::Value =
        serde_json::from_str(&content).context("Request body is not valid JSON")?;
    Ok(RequestBody::Json(value))
}

fn print_response(response: &RawResponse, raw: bool) {
    let status = response.status.to_string();
    if response.is_success() {
        println!("{} HTTP {}", "✓".green(), status.green().bold());
    } else {
        println!("{} HTTP {}", "✗".red(), status.red().bold());
    }

    if response.body.is_empty() {
        return;
    }

    let pretty = if raw {
        None
    } else {
        response
            .json::<serde_json::Value>()
            .ok()
            .and_then(|v| serde_json::to_string_pretty(&v).ok())
    };
    println!("{}", pretty.unwrap_or_else(|| response.text()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_param() {
        assert_eq!(parse_param("unitName=a.service").unwrap(), ("unitName", "a.service"));
        assert_eq!(parse_param("filter=a=b").unwrap(), ("filter", "a=b"));
        assert_eq!(parse_param("empty=").unwrap(), ("empty", ""));
        assert!(parse_param("novalue").is_err());
        assert!(parse_param("=value").is_err());
    }

    #[test]
    fn test_parse_inline_body() {
        let body = parse_body(r#"{"desiredState":"launched"}"#).unwrap();
        assert_eq!(
            body,
            RequestBody::Json(serde_json::json!({"desiredState": "launched"}))
        );
        assert!(parse_body("not json").is_err());
    }

    #[test]
    fn test_parse_body_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unit.json");
        std::fs::write(&path, r#"{"name":"hello.service"}"#).unwrap();

        let body = parse_body(&format!("@{}", path.display())).unwrap();
        assert_eq!(
            body,
            RequestBody::Json(serde_json::json!({"name": "hello.service"}))
        );
        assert!(parse_body("@/nonexistent/unit.json").is_err());
    }

    #[test]
    fn test_cli_parses_call() {
        let cli = Cli::try_parse_from([
            "discoctl",
            "--root-url",
            "http://127.0.0.1:49153/",
            "call",
            "Units.Get",
            "-p",
            "unitName=hello.service",
        ])
        .unwrap();

        assert_eq!(cli.root_url.as_deref(), Some("http://127.0.0.1:49153/"));
        match cli.command {
            Commands::Call { method, params, .. } => {
                assert_eq!(method, "Units.Get");
                assert_eq!(params, vec!["unitName=hello.service"]);
            }
            _ => panic!("expected call command"),
        }
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("discoctl.yaml");
        std::fs::write(&path, "root_url: http://from-file:8080/\ntimeout_secs: 5\n").unwrap();

        let cli = Cli::try_parse_from([
            "discoctl",
            "--config",
            path.to_str().unwrap(),
            "--timeout",
            "9",
            "tree",
        ])
        .unwrap();
        let config = load_config(&cli).unwrap();

        assert_eq!(config.root_url.as_deref(), Some("http://from-file:8080/"));
        assert_eq!(config.timeout_secs, 9);
    }
}
