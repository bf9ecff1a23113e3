//! Libros Reader CLI
//!
//! Opens a document for the configured user, renders one page to PNG and
//! closes the session, saving progress.
//!
//! ```text
//! LIBROS_USER=ana libros-reader <document-id> [page] [output.png]
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use libros_reader::{
    Config, IdentityProvider, Library, MupdfLoader, ReadingEngine, StaticIdentity,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "libros_reader=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = Config::from_env();

    let mut args = std::env::args().skip(1);
    let Some(document_id) = args.next() else {
        bail!("usage: libros-reader <document-id> [page] [output.png]");
    };
    let requested_page: Option<usize> = args
        .next()
        .map(|p| p.parse().context("page must be a positive number"))
        .transpose()?;
    let output = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(format!("{}.png", document_id)));

    let identity = StaticIdentity::new(Config::user_from_env());
    let Some(user_id) = identity.current_user_id() else {
        bail!("LIBROS_USER is not set");
    };

    tracing::info!("Starting Libros Reader v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Data directory: {}", config.storage.data_dir.display());

    let library = Library::open(&config.storage.data_dir);
    let engine = ReadingEngine::from_library(&library, Arc::new(MupdfLoader), config);

    let mut session = engine.open(&user_id, &document_id).await?;
    let page = requested_page.unwrap_or_else(|| session.current_page());

    let rendered = match session.go_to_page(page).await {
        Ok(rendered) => rendered,
        Err(e) => {
            session.close().await.ok();
            return Err(e.into());
        }
    };
    if let Some(e) = &rendered.save_error {
        tracing::warn!("Progress not saved: {}", e);
    }

    rendered
        .image
        .save(&output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    tracing::info!(
        "Wrote page {} of {} to {}",
        rendered.page,
        session.document().total_pages,
        output.display()
    );

    session.close().await?;
    Ok(())
}
