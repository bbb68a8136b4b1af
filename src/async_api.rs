//! Async API for non-blocking document processing.
//!
//! Enable the `async` feature to use these APIs:
//!
//! ```toml
//! [dependencies]
//! unartifact = { version = "0.1", features = ["async"] }
//! ```
//!
//! File access goes through `tokio::fs`; loading, cleaning and scanning are
//! CPU-bound and run on the blocking pool.

use crate::cleanup::{CleanupOptions, CleanupReport};
use crate::error::{Error, Result};
use crate::model::Document;
use crate::parse_options::ParseOptions;
use crate::render::{OutputFormat, RenderOptions};
use crate::scan::{PageScan, ScanOptions};
use crate::FormatType;
use std::path::Path;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt};

async fn blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))?
}

/// Asynchronously loads a document from a file path.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> unartifact::Result<()> {
/// let document = unartifact::async_api::load_file("viewer.html").await?;
/// println!("Pages: {}", document.page_count());
/// # Ok(())
/// # }
/// ```
pub async fn load_file(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref().to_path_buf();
    let data = fs::read(&path).await?;
    let format = detect_format_for(&path, &data)?;

    let mut document = blocking(move || {
        let input = std::str::from_utf8(&data)?;
        crate::load_str(input.trim_start_matches('\u{FEFF}'), format, &ParseOptions::default())
    })
    .await?;
    if document.metadata.source.is_none() {
        document.metadata.source = Some(path.display().to_string());
    }
    Ok(document)
}

/// Asynchronously loads a document from an async reader, sniffing the format.
pub async fn load_reader<R: AsyncRead + Unpin>(mut reader: R) -> Result<Document> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data).await?;
    blocking(move || crate::load_bytes(&data, &ParseOptions::default())).await
}

/// Asynchronously loads and cleans a document file.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> unartifact::Result<()> {
/// use unartifact::CleanupOptions;
///
/// let (document, report) =
///     unartifact::async_api::clean_file("viewer.html", &CleanupOptions::default()).await?;
/// println!("{} removed", report.removed());
/// # Ok(())
/// # }
/// ```
pub async fn clean_file(
    path: impl AsRef<Path>,
    options: &CleanupOptions,
) -> Result<(Document, CleanupReport)> {
    options.validate()?;
    let mut document = load_file(path).await?;
    let options = options.clone();

    blocking(move || {
        let report = crate::cleanup::clean_document(&mut document, &options);
        Ok((document, report))
    })
    .await
}

/// Asynchronously loads a document file and scans every page.
pub async fn scan_file(path: impl AsRef<Path>, options: &ScanOptions) -> Result<Vec<PageScan>> {
    let document = load_file(path).await?;
    let options = options.clone();
    blocking(move || Ok(crate::scan::scan_document(&document, &options))).await
}

/// Asynchronously renders a document and writes it to a file, choosing the
/// format from the file extension.
pub async fn render_to_file(
    document: &Document,
    path: impl AsRef<Path>,
    options: &RenderOptions,
) -> Result<()> {
    let format = OutputFormat::from_path(path.as_ref())?;
    let document = document.clone();
    let options = options.clone();

    let content = blocking(move || crate::render::render(&document, format, &options)).await?;
    fs::write(path, content).await?;
    Ok(())
}

/// Asynchronously detects the format of a file.
pub async fn detect_format(path: impl AsRef<Path>) -> Result<FormatType> {
    let path = path.as_ref();
    let data = fs::read(path).await?;
    detect_format_for(path, &data)
}

fn detect_format_for(path: &Path, data: &[u8]) -> Result<FormatType> {
    match crate::detect::detect_format_from_extension(path) {
        Some(format) => Ok(format),
        None => crate::detect_format_from_bytes(data),
    }
}
