use chrono::Utc;

use crate::db::models::{Breadcrumb, Page, PageStatus};
use crate::schema::collection::Operation;

/// Turn a title or user-entered slug into a url segment.
pub fn format_slug(value: &str) -> String {
    value
        .trim()
        .replace(' ', "-")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect::<String>()
        .to_lowercase()
}

/// Normalise the slug, deriving it from the title when it is locked or absent.
pub fn format_slug_hook(page: &mut Page, _operation: Operation) {
    let source = match (&page.slug, page.slug_lock) {
        (Some(slug), false) if !slug.is_empty() => slug.clone(),
        _ => page.title.clone(),
    };
    page.slug = Some(format_slug(&source));
}

pub fn populate_published_at(page: &mut Page, _operation: Operation) {
    if page.published_at.is_none() {
        page.published_at = Some(Utc::now());
    }
}

/// Breadcrumb trail for `page` given its parent's (already computed) trail.
///
/// Each step's url is the parent's url followed by the step's slug; the label is the
/// title.
pub fn build_breadcrumbs(page: &Page, parent: Option<&Page>) -> Vec<Breadcrumb> {
    let mut trail = parent
        .and_then(|p| p.breadcrumbs.clone())
        .unwrap_or_default();

    let parent_url = trail
        .last()
        .and_then(|crumb| crumb.url.clone())
        .unwrap_or_default();

    trail.push(Breadcrumb {
        url: Some(format!(
            "{}/{}",
            parent_url,
            page.slug.as_deref().unwrap_or_default()
        )),
        label: Some(page.title.clone()),
        doc: Some(page.id.clone()),
    });

    trail
}

/// Public path a page is served at. The `home` page is the site root.
pub fn public_path(page: &Page) -> String {
    if page.slug.as_deref() == Some("home") {
        return "/".to_string();
    }
    match (page.canonical_path(), page.slug.as_deref()) {
        (Some(path), _) => path.to_string(),
        (None, Some(slug)) => format!("/{}", slug),
        (None, None) => "/".to_string(),
    }
}

pub fn revalidate_page(page: &Page, previous: Option<&Page>) -> Vec<String> {
    let mut paths = Vec::new();

    if page.status == PageStatus::Published {
        let path = public_path(page);
        tracing::info!("Revalidating page at path: {}", path);
        paths.push(path);
    }

    if let Some(previous) = previous {
        if previous.status == PageStatus::Published && page.status != PageStatus::Published {
            let old_path = public_path(previous);
            tracing::info!("Revalidating old page at path: {}", old_path);
            paths.push(old_path);
        }
    }

    paths
}

pub fn revalidate_delete(page: &Page) -> Vec<String> {
    let path = public_path(page);
    tracing::info!("Revalidating deleted page at path: {}", path);
    vec![path]
}
