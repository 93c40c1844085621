//! apiscope CLI - explore an API through the relay

mod render;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use apiscope_core::{
    ApiSchema, Catalog, Config, ExploreError, Language, SNIPPET_ERROR, build_request, classify,
    to_http,
};
use apiscope_relay::{Explorer, HttpRelay};

#[derive(Parser)]
#[command(name = "apiscope")]
#[command(about = "Explore an API: send requests through a relay and view code snippets")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, global = true, default_value = "terminal")]
    output: OutputFormat,

    /// Config file (default: .apiscope.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Schema file, overrides the config
    #[arg(short, long, global = true)]
    schema: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List endpoints and check the schema
    Endpoints,

    /// Send one request through the relay
    Send {
        /// Endpoint index or label, e.g. 0 or "GET /users/{id}"
        endpoint: String,

        /// Path parameter value (repeatable)
        #[arg(short = 'p', long = "path", value_parser = parse_pair)]
        path: Vec<(String, String)>,

        /// Query parameter value (repeatable)
        #[arg(short = 'q', long = "query", value_parser = parse_pair)]
        query: Vec<(String, String)>,

        /// JSON body text (POST, PUT, PATCH)
        #[arg(long, conflicts_with = "body_file")]
        body: Option<String>,

        /// Read the JSON body from a file
        #[arg(long)]
        body_file: Option<PathBuf>,

        /// Show the request without sending it
        #[arg(long)]
        dry_run: bool,
    },

    /// Show a code snippet reproducing an endpoint call
    Snippet {
        /// Endpoint index or label
        endpoint: String,

        /// Snippet language (default: from config)
        #[arg(short, long)]
        language: Option<LanguageArg>,

        /// Print without colours
        #[arg(long)]
        plain: bool,
    },

    /// Colour code from a file or stdin
    Highlight {
        /// Input file (default: stdin)
        file: Option<PathBuf>,
    },

    /// Turn a documentation URL into a schema
    Parse {
        /// Documentation page URL
        url: String,

        /// Write the schema to this file instead of stdout
        #[arg(short = 'o', long = "out")]
        out: Option<PathBuf>,
    },

    /// Initialize config file
    Init,

    /// Export JSON Schema for the schema file format
    Schema,

    /// Show usage guide
    Guide,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LanguageArg {
    Python,
    #[value(aliases = ["nodejs", "js"])]
    Javascript,
    Curl,
}

impl From<LanguageArg> for Language {
    fn from(arg: LanguageArg) -> Self {
        match arg {
            LanguageArg::Python => Language::Python,
            LanguageArg::Javascript => Language::Javascript,
            LanguageArg::Curl => Language::Curl,
        }
    }
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputFormat {
    Terminal,
    Json,
    Silent,
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))?;
    if key.is_empty() {
        return Err(format!("empty name in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: cannot start runtime: {e}");
            return ExitCode::from(3);
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(3)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(p) => Config::load(p)?,
        None => Config::load_default()?,
    };
    Ok(config)
}

fn load_schema(config: &Config, path: Option<&Path>) -> Result<ApiSchema> {
    let path = path.unwrap_or(config.schema.as_path());
    ApiSchema::load(path).with_context(|| {
        format!(
            "no usable schema at {} (run `apiscope parse <url> -o {}`)",
            path.display(),
            path.display()
        )
    })
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(p) => std::fs::read_to_string(p).with_context(|| format!("cannot read {}", p.display())),
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

/// Failures that mean the invocation itself was wrong (exit 3) rather than
/// the action failing (exit 1).
fn is_tool_error(error: &ExploreError) -> bool {
    matches!(error, ExploreError::EmptyState(_))
}

async fn run(cli: Cli) -> Result<u8> {
    match cli.command {
        Commands::Endpoints => {
            let cfg = load_config(cli.config.as_deref())?;
            let schema = load_schema(&cfg, cli.schema.as_deref())?;
            let catalog = Catalog::from_schema(&schema);
            match cli.output {
                OutputFormat::Terminal => println!("{}", catalog.to_terminal()),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&catalog)?),
                OutputFormat::Silent => {}
            }
            Ok(u8::from(catalog.has_errors()))
        }

        Commands::Send {
            endpoint,
            path,
            query,
            body,
            body_file,
            dry_run,
        } => {
            let cfg = load_config(cli.config.as_deref())?;
            let schema = load_schema(&cfg, cli.schema.as_deref())?;
            let (index, _) = schema
                .select(&endpoint)
                .with_context(|| format!("no endpoint matches '{endpoint}'"))?;
            let body = match (body, body_file) {
                (Some(text), _) => Some(text),
                (None, Some(p)) => Some(read_input(Some(p.as_path()))?),
                (None, None) => None,
            };

            let mut explorer = Explorer::from_config(HttpRelay::new(&cfg.relay_url)?, &cfg);
            explorer.load_schema(schema);

            let panel = explorer.open_panel(index)?;
            for (name, value) in path {
                panel.set_path_value(name, value);
            }
            for (name, value) in query {
                panel.set_query_value(name, value);
            }
            if let Some(text) = body {
                if !panel.accepts_body() {
                    warn!(method = %panel.endpoint().method, "body ignored for this method");
                }
                panel.set_body(text);
            }

            if dry_run {
                let panel = explorer.panel(index).context("endpoint panel not open")?;
                let request = match build_request(
                    panel.endpoint(),
                    explorer.base_url(),
                    panel.input(),
                ) {
                    Ok(r) => r,
                    Err(e) => {
                        eprintln!("Error: {e}");
                        return Ok(1);
                    }
                };
                match cli.output {
                    OutputFormat::Terminal => {
                        let label = panel.endpoint().label();
                        println!("{}", to_http(&request, Some(&label)));
                    }
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&request)?),
                    OutputFormat::Silent => {}
                }
                return Ok(0);
            }

            match explorer.send(index).await {
                Ok(result) => {
                    match cli.output {
                        OutputFormat::Terminal => println!("{}", render::response(&result)),
                        OutputFormat::Json => {
                            println!("{}", serde_json::to_string_pretty(&result)?);
                        }
                        OutputFormat::Silent => {}
                    }
                    Ok(u8::from(!result.is_healthy))
                }
                Err(e) if is_tool_error(&e) => Err(e.into()),
                Err(e) => {
                    if cli.output == OutputFormat::Json {
                        println!("{}", serde_json::json!({"error": e.to_string()}));
                    }
                    eprintln!("Error: {e}");
                    Ok(1)
                }
            }
        }

        Commands::Snippet {
            endpoint,
            language,
            plain,
        } => {
            let cfg = load_config(cli.config.as_deref())?;
            let schema = load_schema(&cfg, cli.schema.as_deref())?;
            let (index, _) = schema
                .select(&endpoint)
                .with_context(|| format!("no endpoint matches '{endpoint}'"))?;
            let language = language.map_or(cfg.language, Language::from);

            let mut explorer = Explorer::from_config(HttpRelay::new(&cfg.relay_url)?, &cfg);
            explorer.load_schema(schema);

            match explorer.show_snippet(index, language).await {
                Ok(code) => {
                    match cli.output {
                        OutputFormat::Terminal if plain => println!("{code}"),
                        OutputFormat::Terminal => {
                            eprintln!("# {}", language.label());
                            println!("{}", render::highlight(&code));
                        }
                        OutputFormat::Json => println!(
                            "{}",
                            serde_json::to_string_pretty(&serde_json::json!({
                                "language": language,
                                "snippet": code,
                            }))?
                        ),
                        OutputFormat::Silent => {}
                    }
                    Ok(0)
                }
                Err(e) if is_tool_error(&e) => Err(e.into()),
                Err(e) => {
                    eprintln!("{SNIPPET_ERROR}: {e}");
                    Ok(1)
                }
            }
        }

        Commands::Highlight { file } => {
            let code = read_input(file.as_deref())?;
            match cli.output {
                OutputFormat::Terminal => print!("{}", render::highlight(&code)),
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&classify(&code))?);
                }
                OutputFormat::Silent => {}
            }
            Ok(0)
        }

        Commands::Parse { url, out } => {
            let cfg = load_config(cli.config.as_deref())?;
            let mut explorer = Explorer::from_config(HttpRelay::new(&cfg.relay_url)?, &cfg);

            let schema = match explorer.parse_documentation(&url).await {
                Ok(schema) => schema,
                Err(e) => {
                    eprintln!("Error: {e}");
                    return Ok(1);
                }
            };
            let json = serde_json::to_string_pretty(schema)?;

            match out {
                Some(path) => {
                    std::fs::write(&path, format!("{json}\n"))
                        .with_context(|| format!("cannot write {}", path.display()))?;
                    if cli.output == OutputFormat::Terminal {
                        println!("Wrote {}", path.display());
                        println!("{}", Catalog::from_schema(schema).to_terminal());
                    }
                }
                None if cli.output == OutputFormat::Silent => {}
                None => println!("{json}"),
            }
            Ok(0)
        }

        Commands::Init => {
            let config_path = ".apiscope.toml";
            if Path::new(config_path).exists() {
                eprintln!("{config_path} already exists");
                return Ok(1);
            }

            std::fs::write(config_path, Config::example())?;
            println!("Created {config_path}");
            println!("\nEdit the file to configure:");
            println!("  - relay_url: backend relay address");
            println!("  - schema: API schema file (see `apiscope parse`)");
            println!("  - path_params / query_params: values pre-filled for every endpoint");
            Ok(0)
        }

        Commands::Schema => {
            let schema = apiscope_core::schema::generate_schema();
            println!("{schema}");
            Ok(0)
        }

        Commands::Guide => {
            print!("{}", include_str!("../docs/GUIDE.md"));
            Ok(0)
        }
    }
}
