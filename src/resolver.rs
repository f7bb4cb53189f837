//! Maps request paths to pages.
//!
//! A page is addressed by its full path, but stored under its last segment (`slug`).
//! Several pages can share a slug under different parents, so candidates are narrowed
//! down by comparing the requested path with each candidate's breadcrumb trail.

use percent_encoding::percent_decode_str;

use crate::config::SiteConfig;
use crate::db::models::{
    Block, Breadcrumb, CallToActionBlock, Column, ColumnSize, ContentBlock, Hero, HeroKind, Link,
    LinkItem, Page, PageMeta, PageStatus,
};
use crate::db::repository::{PageStore, SlugQuery, StatusFilter};
use crate::error::AppError;
use crate::schema::pages::pages_collection;

/// Slug of the page served at `/`.
pub const HOME_SLUG: &str = "home";

/// Relation depth for page queries; deep enough for the renderer's nested relations.
pub const PAGE_QUERY_DEPTH: u8 = 2;

/// Upper bound on pages enumerated for static generation.
pub const STATIC_PATHS_LIMIT: i64 = 1000;

/// The segments to resolve, `["home"]` when the request had none.
pub fn normalize_segments(segments: &[String]) -> Vec<String> {
    let segments: Vec<String> = segments
        .iter()
        .filter(|s| !s.is_empty())
        .cloned()
        .collect();

    if segments.is_empty() {
        vec![HOME_SLUG.to_string()]
    } else {
        segments
    }
}

/// Split a request path (`/about/team/`) into segments.
pub fn path_segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Split a request path into percent-decoded segments.
///
/// `None` when a segment does not decode to valid UTF-8.
pub fn decode_path_segments(path: &str) -> Option<Vec<String>> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(|s| {
            percent_decode_str(s)
                .decode_utf8()
                .ok()
                .map(|decoded| decoded.into_owned())
        })
        .collect()
}

pub fn page_path(segments: &[String]) -> String {
    format!("/{}", segments.join("/"))
}

/// Whether the page's breadcrumb trail ends at `path`. Pages with a missing or
/// malformed trail never match.
fn matches_path(page: &Page, path: &str) -> bool {
    let trail = match page.breadcrumbs.as_deref() {
        Some(trail) if !trail.is_empty() => trail,
        _ => {
            tracing::warn!(page_id = %page.id, "No breadcrumbs found for page");
            return false;
        }
    };

    match trail.last().and_then(|crumb| crumb.url.as_deref()) {
        Some(url) => url == path,
        None => {
            tracing::warn!(page_id = %page.id, "Invalid breadcrumb structure: {:?}", trail);
            false
        }
    }
}

/// Resolve a full path to the one page whose breadcrumb trail ends at it.
///
/// Outside draft mode only published pages are considered.
pub async fn fetch_page(
    store: &dyn PageStore,
    segments: &[String],
    draft: bool,
) -> Result<Option<Page>, AppError> {
    let segments = normalize_segments(segments);
    let slug = segments.last().cloned().unwrap_or_else(|| HOME_SLUG.to_string());
    let path = page_path(&segments);

    let candidates = store
        .find_pages_by_slug(SlugQuery {
            slug,
            status: StatusFilter::for_draft_mode(draft),
            depth: PAGE_QUERY_DEPTH,
            limit: None,
        })
        .await?;

    Ok(candidates
        .into_iter()
        .filter(|page| draft || page.status == PageStatus::Published)
        .find(|page| matches_path(page, &path)))
}

/// Look a page up by its slug alone, ignoring the breadcrumb trail. Used for document
/// metadata.
///
/// In draft mode read access is overridden; otherwise the collection's read rule for
/// an anonymous visitor applies.
pub async fn query_page_by_slug(
    store: &dyn PageStore,
    slug: &str,
    draft: bool,
) -> Result<Option<Page>, AppError> {
    let status = if draft {
        StatusFilter::Any
    } else {
        pages_collection().access.read.status_filter(None)
    };

    let pages = store
        .find_pages_by_slug(SlugQuery {
            slug: slug.to_string(),
            status,
            depth: PAGE_QUERY_DEPTH,
            limit: Some(1),
        })
        .await?;

    Ok(pages.into_iter().next())
}

/// Path segments of every published page, for static generation.
pub async fn fetch_page_paths(
    store: &dyn PageStore,
    config: &SiteConfig,
) -> Result<Vec<Vec<String>>, AppError> {
    let docs = store
        .list_published_breadcrumbs(&config.excluded_slug, STATIC_PATHS_LIMIT)
        .await?;

    Ok(docs
        .iter()
        .filter_map(|doc| doc.canonical_path())
        .map(|url| path_segments(url.trim_matches('/')))
        .collect())
}

/// Placeholder served at `/` until the store has been seeded.
///
/// Temporary bootstrap affordance: once a real `home` page exists it always wins, and
/// this should be removed when every deployment is seeded.
pub fn home_static() -> Page {
    Page {
        id: "home-static".to_string(),
        title: "Home".to_string(),
        slug: Some(HOME_SLUG.to_string()),
        slug_lock: false,
        hero: Hero {
            kind: HeroKind::HomeGradient,
            rich_text: Some(
                "# Your site is almost ready\n\nThis placeholder is shown because no pages have been published yet. Seed the database or publish a page with the slug `home` to replace it."
                    .to_string(),
            ),
            links: vec![LinkItem {
                link: Link {
                    label: Some("Read the docs".to_string()),
                    url: Some("https://github.com/folio-site/folio".to_string()),
                    new_tab: true,
                    ..Default::default()
                },
            }],
            media: None,
        },
        layout: vec![
            Block::Content(ContentBlock {
                columns: vec![Column {
                    size: ColumnSize::Full,
                    rich_text: Some(
                        "## Seed your database\n\nRun `folio seed` to create a home page and a small page tree."
                            .to_string(),
                    ),
                    enable_link: false,
                    link: None,
                }],
            }),
            Block::CallToAction(CallToActionBlock {
                rich_text: Some("Editors can preview drafts before they go live.".to_string()),
                links: vec![],
            }),
        ],
        status: PageStatus::Published,
        published_at: None,
        breadcrumbs: Some(vec![Breadcrumb {
            url: Some(format!("/{}", HOME_SLUG)),
            label: Some("Home".to_string()),
            doc: None,
        }]),
        parent: None,
        meta: PageMeta {
            title: Some("Home".to_string()),
            description: Some("A website built with Folio.".to_string()),
            image: None,
        },
        created_at: None,
        updated_at: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::{page_at, InMemoryStore};

    fn segs(path: &str) -> Vec<String> {
        path_segments(path)
    }

    #[test]
    fn test_normalize_segments() {
        assert_eq!(normalize_segments(&[]), vec!["home"]);
        assert_eq!(normalize_segments(&["".to_string()]), vec!["home"]);
        assert_eq!(normalize_segments(&segs("/a/b")), vec!["a", "b"]);
    }

    #[test]
    fn test_decode_path_segments() {
        assert_eq!(
            decode_path_segments("/caf%C3%A9/about%20us/").unwrap(),
            vec!["café", "about us"]
        );
        assert_eq!(decode_path_segments("/about/team").unwrap(), vec!["about", "team"]);
        assert!(decode_path_segments("/").unwrap().is_empty());
        assert!(decode_path_segments("/bad%FF").is_none());
    }

    #[test]
    fn test_page_path() {
        assert_eq!(page_path(&segs("a/b")), "/a/b");
        assert_eq!(page_path(&["home".to_string()]), "/home");
    }

    #[tokio::test]
    async fn test_fetch_page_matches_full_path() {
        let store = InMemoryStore::new(vec![
            page_at("1", "/about/team", PageStatus::Published),
            page_at("2", "/careers/team", PageStatus::Published),
        ]);

        let page = fetch_page(&store, &segs("/careers/team"), false).await.unwrap().unwrap();
        assert_eq!(page.id, "2");

        let page = fetch_page(&store, &segs("/about/team"), false).await.unwrap().unwrap();
        assert_eq!(page.id, "1");

        assert!(fetch_page(&store, &segs("/team"), false).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fetch_page_queries_last_segment_at_depth_two() {
        let store = InMemoryStore::new(vec![]);
        fetch_page(&store, &segs("/about/team"), false).await.unwrap();

        let queries = store.slug_queries.lock().unwrap();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].slug, "team");
        assert_eq!(queries[0].depth, 2);
        assert_eq!(queries[0].status, StatusFilter::PublishedOnly);
    }

    #[tokio::test]
    async fn test_fetch_page_defaults_to_home() {
        let store = InMemoryStore::new(vec![page_at("h", "/home", PageStatus::Published)]);
        let page = fetch_page(&store, &[], false).await.unwrap().unwrap();
        assert_eq!(page.id, "h");
    }

    #[tokio::test]
    async fn test_drafts_hidden_outside_draft_mode() {
        let store = InMemoryStore::new(vec![page_at("1", "/launch", PageStatus::Draft)]);

        assert!(fetch_page(&store, &segs("/launch"), false).await.unwrap().is_none());

        let page = fetch_page(&store, &segs("/launch"), true).await.unwrap().unwrap();
        assert_eq!(page.status, PageStatus::Draft);
    }

    #[tokio::test]
    async fn test_malformed_breadcrumbs_are_skipped() {
        let mut no_trail = page_at("1", "/about", PageStatus::Published);
        no_trail.breadcrumbs = None;

        let mut empty_trail = page_at("2", "/about", PageStatus::Published);
        empty_trail.breadcrumbs = Some(vec![]);

        let mut bad_url = page_at("3", "/about", PageStatus::Published);
        bad_url.breadcrumbs = Some(vec![Breadcrumb::default()]);

        let good = page_at("4", "/about", PageStatus::Published);

        let store = InMemoryStore::new(vec![no_trail, empty_trail, bad_url, good]);
        let page = fetch_page(&store, &segs("/about"), false).await.unwrap().unwrap();
        assert_eq!(page.id, "4");
    }

    #[tokio::test]
    async fn test_resolved_page_always_matches_requested_path() {
        let store = InMemoryStore::new(vec![
            page_at("1", "/a", PageStatus::Published),
            page_at("2", "/a/b", PageStatus::Published),
            page_at("3", "/x/b", PageStatus::Published),
            page_at("4", "/a/b/c", PageStatus::Draft),
        ]);

        for path in ["/a", "/a/b", "/x/b", "/a/b/c", "/b", "/c", "/x", "/a/x/b"] {
            for draft in [false, true] {
                if let Some(page) = fetch_page(&store, &segs(path), draft).await.unwrap() {
                    assert_eq!(page.canonical_path(), Some(path));
                    if !draft {
                        assert_eq!(page.status, PageStatus::Published);
                    }
                }
            }
        }
    }

    #[tokio::test]
    async fn test_query_page_by_slug_ignores_path() {
        let store = InMemoryStore::new(vec![
            page_at("1", "/about/team", PageStatus::Published),
            page_at("2", "/careers/team", PageStatus::Published),
        ]);

        let page = query_page_by_slug(&store, "team", false).await.unwrap().unwrap();
        assert_eq!(page.id, "1");

        let queries = store.slug_queries.lock().unwrap();
        assert_eq!(queries[0].limit, Some(1));
    }

    #[tokio::test]
    async fn test_query_page_by_slug_respects_draft_mode() {
        let store = InMemoryStore::new(vec![page_at("1", "/soon", PageStatus::Draft)]);

        assert!(query_page_by_slug(&store, "soon", false).await.unwrap().is_none());
        assert!(query_page_by_slug(&store, "soon", true).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_fetch_page_paths() {
        let mut no_trail = page_at("5", "/orphan", PageStatus::Published);
        no_trail.breadcrumbs = None;

        let store = InMemoryStore::new(vec![
            page_at("1", "/home", PageStatus::Published),
            page_at("2", "/about/team", PageStatus::Published),
            page_at("3", "/cloud", PageStatus::Published),
            page_at("4", "/draft", PageStatus::Draft),
            no_trail,
        ]);

        let paths = fetch_page_paths(&store, &SiteConfig::default()).await.unwrap();
        assert_eq!(paths, vec![vec!["home".to_string()], vec!["about".to_string(), "team".to_string()]]);
    }

    #[test]
    fn test_home_static_is_published_home() {
        let home = home_static();
        assert_eq!(home.slug.as_deref(), Some(HOME_SLUG));
        assert_eq!(home.status, PageStatus::Published);
        assert_eq!(home.canonical_path(), Some("/home"));
        assert!(pages_collection().validate(&home).is_ok());
    }
}
