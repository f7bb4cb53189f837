use crate::config::SiteConfig;
use crate::db::models::Page;
use crate::schema::hooks::public_path;

/// `<head>` metadata for a rendered page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentMeta {
    pub title: String,
    pub description: Option<String>,
    /// Absolute url of the Open Graph image.
    pub image: Option<String>,
    /// Absolute url of the page itself.
    pub url: Option<String>,
}

fn absolute_url(config: &SiteConfig, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("{}/{}", config.server_url, url.trim_start_matches('/'))
    }
}

/// Build document metadata from a page's SEO fields.
///
/// The title is `"{meta.title} | {site_name}"`, or just the site name when the page has
/// no SEO title.
pub fn generate_meta(page: Option<&Page>, config: &SiteConfig) -> DocumentMeta {
    let Some(page) = page else {
        return DocumentMeta {
            title: config.site_name.clone(),
            ..Default::default()
        };
    };

    let title = match page.meta.title.as_deref().filter(|t| !t.trim().is_empty()) {
        Some(title) => format!("{} | {}", title, config.site_name),
        None => config.site_name.clone(),
    };

    let image = page
        .meta
        .image
        .as_ref()
        .and_then(|image| image.populated())
        .and_then(|media| media.url.as_deref())
        .map(|url| absolute_url(config, url));

    DocumentMeta {
        title,
        description: page.meta.description.clone(),
        image,
        url: Some(absolute_url(config, &public_path(page))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{Media, PageMeta, PageStatus, Relation};
    use crate::db::testing::page_at;

    fn config() -> SiteConfig {
        SiteConfig {
            server_url: "https://example.com".into(),
            site_name: "Acme".into(),
            ..SiteConfig::default()
        }
    }

    #[test]
    fn test_title_with_site_name() {
        let mut page = page_at("1", "/about", PageStatus::Published);
        page.meta.title = Some("About us".into());

        let meta = generate_meta(Some(&page), &config());
        assert_eq!(meta.title, "About us | Acme");
        assert_eq!(meta.url.as_deref(), Some("https://example.com/about"));
    }

    #[test]
    fn test_home_url_is_site_root() {
        let page = page_at("1", "/home", PageStatus::Published);
        let meta = generate_meta(Some(&page), &config());
        assert_eq!(meta.url.as_deref(), Some("https://example.com/"));
    }

    #[test]
    fn test_missing_title_falls_back_to_site_name() {
        let page = page_at("1", "/about", PageStatus::Published);
        assert_eq!(generate_meta(Some(&page), &config()).title, "Acme");
        assert_eq!(generate_meta(None, &config()).title, "Acme");
    }

    #[test]
    fn test_image_url_made_absolute() {
        let mut page = page_at("1", "/about", PageStatus::Published);
        page.meta = PageMeta {
            title: None,
            description: Some("Who we are".into()),
            image: Some(Relation::Populated(Box::new(Media {
                id: "m1".into(),
                url: Some("/media/team.jpg".into()),
                ..Default::default()
            }))),
        };

        let meta = generate_meta(Some(&page), &config());
        assert_eq!(meta.image.as_deref(), Some("https://example.com/media/team.jpg"));
        assert_eq!(meta.description.as_deref(), Some("Who we are"));
    }

    #[test]
    fn test_unpopulated_image_is_skipped() {
        let mut page = page_at("1", "/about", PageStatus::Published);
        page.meta.image = Some(Relation::Id("m1".into()));
        assert!(generate_meta(Some(&page), &config()).image.is_none());
    }
}
