//! `docforge` — crawl, upload, and search documentation as ranked code
//! snippets. `serve` runs the HTTP+MCP transports; `crawl` and `search` are
//! thin CLI wrappers over the same application services, for local use
//! without standing up the server.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use docforge_domain::entities::JobKind;
use docforge_domain::error::Error;
use docforge_domain::value_objects::{CrawlConfig, JobId, SearchFilters, SearchMode};
use docforge_infrastructure::config::AppConfig;
use docforge_infrastructure::init_tracing;

#[derive(Parser)]
#[command(name = "docforge")]
#[command(about = "Crawl, upload, and search documentation as ranked code snippets")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Path to a TOML config file, layered under defaults and DOCFORGE__ env vars.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP and MCP servers
    Serve {
        /// Override the configured bind address
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
    /// Start a crawl job and wait for it to finish
    Crawl {
        #[arg(long)]
        name: String,
        #[arg(long = "start-url", required = true)]
        start_urls: Vec<String>,
        #[arg(long, default_value_t = 2)]
        max_depth: u32,
        #[arg(long)]
        version: Option<String>,
    },
    /// Search a library's indexed snippets
    Search {
        #[arg(long)]
        library_id: JobId,
        #[arg(long)]
        query: String,
        #[arg(long, default_value_t = 20)]
        limit: u32,
        #[arg(long)]
        enhanced: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return ExitCode::from(2);
        }
    };
    init_tracing(&config.logging.level, config.logging.json);

    let app = match docforge::build_app(&config).await {
        Ok(app) => app,
        Err(e @ Error::Database { .. }) => {
            tracing::error!(error = %e, "database unreachable on startup");
            return ExitCode::from(3);
        }
        Err(e) => {
            tracing::error!(error = %e, "startup failed");
            return ExitCode::from(2);
        }
    };

    let result = match cli.command {
        Commands::Serve { bind } => run_serve(app, &config, bind).await,
        Commands::Crawl {
            name,
            start_urls,
            max_depth,
            version,
        } => run_crawl(app, name, start_urls, max_depth, version).await,
        Commands::Search {
            library_id,
            query,
            limit,
            enhanced,
        } => run_search(app, library_id, query, limit, enhanced).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            ExitCode::from(2)
        }
    }
}

async fn run_serve(app: docforge::App, config: &AppConfig, bind: Option<SocketAddr>) -> docforge_domain::error::Result<()> {
    let addr = bind.unwrap_or_else(|| {
        config
            .server
            .bind_address
            .parse()
            .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], 8787)))
    });

    let router = docforge_server::build_router(app.state.clone());
    let mcp_service = std::sync::Arc::new(app.mcp);
    let mcp_addr = SocketAddr::new(addr.ip(), addr.port() + 1);

    tracing::info!(%addr, %mcp_addr, "starting docforge");

    let http = tokio::spawn(async move {
        let listener = tokio::net::TcpListener::bind(addr).await.expect("bind HTTP listener");
        axum::serve(listener, router).await.expect("HTTP server");
    });

    let mcp = tokio::spawn(async move {
        let service = rmcp::transport::streamable_http_server::StreamableHttpService::new(
            move || Ok((*mcp_service).clone()),
            std::sync::Arc::new(rmcp::transport::streamable_http_server::session::local::LocalSessionManager::default()),
            Default::default(),
        );
        let router = axum::Router::new().nest_service("/mcp", service);
        let listener = tokio::net::TcpListener::bind(mcp_addr).await.expect("bind MCP listener");
        axum::serve(listener, router).await.expect("MCP server");
    });

    let _ = tokio::join!(http, mcp);
    Ok(())
}

async fn run_crawl(
    app: docforge::App,
    name: String,
    start_urls: Vec<String>,
    max_depth: u32,
    version: Option<String>,
) -> docforge_domain::error::Result<()> {
    let config = CrawlConfig {
        start_urls,
        max_depth,
        domain_filter: None,
        url_patterns: None,
        max_concurrent: app.state.config.default_max_concurrent,
        ignore_hash: false,
        metadata: serde_json::json!({}),
    };
    let config_value = serde_json::to_value(&config).map_err(|e| Error::internal(e.to_string()))?;
    let job = app.state.scheduler.create_job(JobKind::Crawl, name, version, config_value, false).await?;
    println!("job {} started", job.id);

    let driver = app.state.new_crawl_driver();
    let cancel = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
    driver.run(job, config, cancel).await?;
    println!("crawl finished");
    Ok(())
}

async fn run_search(app: docforge::App, library_id: JobId, query: String, limit: u32, enhanced: bool) -> docforge_domain::error::Result<()> {
    let filters = SearchFilters {
        language: None,
        source_job_id: Some(library_id),
    };
    let mode = if enhanced { SearchMode::Enhanced } else { SearchMode::Code };
    let hits = app.state.searcher.get_content(&query, &filters, mode, limit).await?;
    println!("{}", serde_json::to_string_pretty(&hits).map_err(|e| Error::internal(e.to_string()))?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crawl_requires_at_least_one_start_url() {
        let result = Cli::try_parse_from(["docforge", "crawl", "--name", "rust-docs"]);
        assert!(result.is_err());
    }

    #[test]
    fn crawl_parses_repeated_start_url_flags() {
        let cli = Cli::try_parse_from([
            "docforge",
            "crawl",
            "--name",
            "rust-docs",
            "--start-url",
            "https://doc.rust-lang.org/",
            "--start-url",
            "https://doc.rust-lang.org/std/",
            "--max-depth",
            "3",
        ])
        .expect("valid crawl invocation");

        match cli.command {
            Commands::Crawl { name, start_urls, max_depth, version } => {
                assert_eq!(name, "rust-docs");
                assert_eq!(start_urls.len(), 2);
                assert_eq!(max_depth, 3);
                assert_eq!(version, None);
            }
            other => panic!("expected Crawl, got {other:?}"),
        }
    }

    #[test]
    fn crawl_defaults_max_depth_to_two() {
        let cli = Cli::try_parse_from(["docforge", "crawl", "--name", "x", "--start-url", "https://example.com"]).unwrap();
        match cli.command {
            Commands::Crawl { max_depth, .. } => assert_eq!(max_depth, 2),
            other => panic!("expected Crawl, got {other:?}"),
        }
    }

    #[test]
    fn search_rejects_invalid_library_id() {
        let result = Cli::try_parse_from(["docforge", "search", "--library-id", "not-a-uuid", "--query", "foo"]);
        assert!(result.is_err());
    }

    #[test]
    fn search_parses_valid_invocation_with_defaults() {
        let job_id = JobId::new();
        let cli = Cli::try_parse_from(["docforge", "search", "--library-id", &job_id.to_string(), "--query", "tokio spawn"]).unwrap();
        match cli.command {
            Commands::Search { library_id, query, limit, enhanced } => {
                assert_eq!(library_id, job_id);
                assert_eq!(query, "tokio spawn");
                assert_eq!(limit, 20);
                assert!(!enhanced);
            }
            other => panic!("expected Search, got {other:?}"),
        }
    }

    #[test]
    fn serve_accepts_optional_bind_override() {
        let cli = Cli::try_parse_from(["docforge", "serve", "--bind", "127.0.0.1:9000"]).unwrap();
        match cli.command {
            Commands::Serve { bind } => assert_eq!(bind, Some("127.0.0.1:9000".parse().unwrap())),
            other => panic!("expected Serve, got {other:?}"),
        }
    }

    #[test]
    fn global_config_flag_applies_to_every_subcommand() {
        let cli = Cli::try_parse_from(["docforge", "--config", "docforge.toml", "serve"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("docforge.toml")));
    }
}
