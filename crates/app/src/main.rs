mod api;

use book_search_core::{Author, Book, BookRepository, ElasticsearchStore};
use chrono::Utc;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "book-search-api", version)]
struct Cli {
    /// Address the HTTP server binds to.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:8080")]
    addr: String,

    /// Elasticsearch base URL.
    #[arg(long, env = "ELASTICSEARCH_URL", default_value = "http://localhost:9200")]
    elasticsearch_url: String,

    /// Elasticsearch index name.
    #[arg(long, env = "ELASTICSEARCH_INDEX", default_value = "books")]
    elasticsearch_index: String,

    /// Seed the index with a few sample books at boot.
    #[arg(long, default_value_t = false)]
    populate: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();

    let store = ElasticsearchStore::new(&cli.elasticsearch_url, &cli.elasticsearch_index);
    store
        .ensure_index()
        .await
        .map_err(|error| anyhow::anyhow!(error.to_string()))?;

    let repository = BookRepository::new(store);

    if cli.populate {
        let report = repository
            .insert_many(&sample_books())
            .await
            .map_err(|error| anyhow::anyhow!(error.to_string()))?;

        if report.failed > 0 {
            warn!(
                indexed = report.indexed,
                failed = report.failed,
                "seeded book index with errors"
            );
        } else {
            info!(indexed = report.indexed, "seeded book index");
        }
    }

    info!(
        version = app_version,
        addr = %cli.addr,
        index = %cli.elasticsearch_index,
        "book-search-api boot"
    );

    let listener = tokio::net::TcpListener::bind(&cli.addr).await?;
    axum::serve(listener, api::router(repository)).await?;

    Ok(())
}

fn sample_books() -> Vec<Book> {
    let entries = [
        ("Foo", "Lorem ipsum foo", "F", "Oo"),
        ("Bar", "Lorem ipsum bar", "B", "Ar"),
        ("Baz", "Lorem ipsum baz but with foo also", "B", "Az"),
    ];

    entries
        .into_iter()
        .map(|(title, summary, firstname, lastname)| Book {
            id: None,
            created_at: Utc::now(),
            title: title.to_string(),
            summary: summary.to_string(),
            author: Author {
                firstname: firstname.to_string(),
                lastname: lastname.to_string(),
            },
        })
        .collect()
}
