use url::form_urlencoded::byte_serialize;

use crate::config::SiteConfig;
use crate::db::models::DocumentSummary;

/// Path of the preview endpoint, relative to the site origin.
pub const PREVIEW_PATH: &str = "/next/preview/id";

fn encode(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}

/// Build the signed preview link for `doc` in `collection`.
///
/// Returns an empty string (never a half-built url) when the document or its id is
/// missing; callers treat that as "no preview available".
pub fn generate_preview_by_id(
    config: &SiteConfig,
    collection: &str,
    doc: Option<&DocumentSummary>,
) -> String {
    let Some(id) = doc.map(|d| d.id.as_str()).filter(|id| !id.is_empty()) else {
        tracing::error!("Missing document ID for preview path generation");
        return String::new();
    };

    format!(
        "{}{}?id={}&collection={}&secret={}",
        config.server_url,
        PREVIEW_PATH,
        encode(id),
        encode(collection),
        encode(&config.preview_secret)
    )
}
