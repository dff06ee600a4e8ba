mod cli;

use mediabot::{
    config,
    metadata::Backends,
    monitor::{self, PerformanceMonitor},
    reply::ReplyFormatter,
    server::{self, auth},
};
use mediabot_common::SystemClock;
use mediabot_parser::TitleParser;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;
use std::sync::Arc;

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    // Override host/port from CLI if specified
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting MediaBot");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );
    tracing::info!(
        enabled = config.bot.enabled,
        backend = ?config.cache.backend,
        forum = %config.forum.base_url,
        "Bot configuration loaded"
    );

    server::start_server(config, config_path.map(Path::to_path_buf)).await
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "mediabot=trace,mediabot_parser=debug,mediabot_db=debug,tower_http=debug".to_string()
        } else {
            "mediabot=info,mediabot_db=warn,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Lookup { text, tags, locale } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(lookup(&text, &tags, locale, cli.config.as_deref()))
        }
        Commands::Parse { text, tags } => parse(&text, &tags, cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("mediabot {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::GenerateSecret => generate_secret(),
    }
}

async fn lookup(
    text: &str,
    tags: &[String],
    locale: Option<String>,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let locale = locale.unwrap_or_else(|| config.locale.resolve(None));

    let Some(parsed) = TitleParser::new().parse(text, tags, None) else {
        anyhow::bail!("No title reference found in input");
    };
    let request = parsed.into_request(locale.as_str());
    tracing::info!(
        media_type = %request.media_type,
        title = %request.title,
        year = ?request.year,
        locale = %request.locale,
        "Looking up title"
    );

    let clock = Arc::new(SystemClock);
    let backends = Backends::from_config(&config, clock.clone())?;
    let fetcher = backends.fetcher(&config, Arc::new(PerformanceMonitor::new(clock)))?;

    let record = match fetcher.fetch(&request).await {
        Ok(record) => record,
        Err(e) => {
            eprintln!("{}", monitor::user_message(&e, &locale));
            return Err(e.into());
        }
    };

    let reply = ReplyFormatter::new(config.display.clone()).format(record.as_ref(), &locale);
    println!("{}", reply);
    Ok(())
}

fn parse(text: &str, tags: &[String], config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let locale = config.locale.resolve(None);

    match TitleParser::new().parse(text, tags, None) {
        Some(parsed) => {
            let request = parsed.into_request(locale);
            println!("{}", serde_json::to_string_pretty(&request)?);
            Ok(())
        }
        None => anyhow::bail!("No title reference found in input"),
    }
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  Bot enabled: {}", config.bot.enabled);
            println!("  Forum: {}", config.forum.base_url);
            println!("  Enabled tags: {}", config.bot.enabled_tags.join(", "));
            println!("  Cache backend: {:?}", config.cache.backend);
            for service in mediabot_common::Service::ALL {
                let settings = config.services.resolve(service);
                println!(
                    "  {}: {} ({} requests / {}s)",
                    service,
                    if settings.api_key.is_some() {
                        "configured"
                    } else {
                        "no API key"
                    },
                    settings.budget,
                    settings.window.as_secs()
                );
            }
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Server: {}:{}", config.server.host, config.server.port);
        }
    }

    Ok(())
}

fn generate_secret() -> Result<()> {
    let secret = auth::generate_secret();
    println!("{}", secret);
    Ok(())
}
