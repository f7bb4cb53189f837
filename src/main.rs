#[cfg(feature = "ssr")]
mod cli {
    use std::sync::Arc;

    use anyhow::Context;
    use clap::{Parser, Subcommand};
    use folio::app::{build_router, AppState};
    use folio::auth::token::JwtAuthenticator;
    use folio::config::SiteConfig;
    use folio::db::repository::MongoPageStore;

    #[derive(Parser)]
    #[command(name = "folio", version, about = "Folio page server")]
    pub struct Cli {
        /// Path to a config file (defaults to ./folio.toml when present)
        #[arg(short, long, global = true)]
        config: Option<String>,

        #[command(subcommand)]
        command: Option<Command>,
    }

    #[derive(Subcommand)]
    enum Command {
        /// Serve the site (default)
        Serve {
            /// Directory served under /assets
            #[arg(long)]
            assets: Option<String>,
        },
        /// Print the path segments of every published page as JSON
        StaticParams,
        /// Insert the demo page tree
        Seed {
            /// Delete previously seeded pages first
            #[arg(long)]
            reset: bool,
        },
    }

    async fn connect(config: &SiteConfig) -> anyhow::Result<MongoPageStore> {
        let client = mongodb::Client::with_uri_str(&config.mongodb_uri)
            .await
            .context("Failed to connect to MongoDB")?;
        let db = client.database(&config.mongodb_database);
        tracing::info!("Connected to MongoDB database '{}'", config.mongodb_database);
        Ok(MongoPageStore::new(&db))
    }

    pub async fn run(cli: Cli) -> anyhow::Result<()> {
        let config = SiteConfig::load(cli.config.as_deref())?;
        let store = connect(&config).await?;

        match cli.command.unwrap_or(Command::Serve { assets: None }) {
            Command::Serve { assets } => {
                let addr = config.listen_addr.clone();
                let state = AppState {
                    authenticator: Arc::new(JwtAuthenticator::new(config.token_secret.clone())),
                    page_store: Arc::new(store),
                    config: Arc::new(config),
                };
                let app = build_router(state, assets.as_deref());

                tracing::info!("Listening on http://{}", addr);
                let listener = tokio::net::TcpListener::bind(&addr)
                    .await
                    .with_context(|| format!("Failed to bind {}", addr))?;
                axum::serve(listener, app.into_make_service()).await?;
            }
            Command::StaticParams => {
                let paths = folio::resolver::fetch_page_paths(&store, &config).await?;
                println!("{}", serde_json::to_string_pretty(&paths)?);
            }
            Command::Seed { reset } => {
                let report = folio::seed::seed_demo_data(&store, reset).await?;
                for path in &report.stale_paths {
                    tracing::info!("Stale path: {}", path);
                }
            }
        }

        Ok(())
    }
}

#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use clap::Parser;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio=info,tower_http=info".into()),
        )
        // stdout carries `static-params` output
        .with_writer(std::io::stderr)
        .init();

    cli::run(cli::Cli::parse()).await
}

#[cfg(not(feature = "ssr"))]
fn main() {}
