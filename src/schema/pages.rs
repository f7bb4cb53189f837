use std::sync::OnceLock;
use std::time::Duration;

use crate::preview::url::generate_preview_by_id;
use crate::config::SiteConfig;
use crate::db::models::DocumentSummary;
use crate::schema::collection::{
    AccessRule, AdminConfig, CollectionAccess, CollectionConfig, CollectionHooks, DraftsConfig,
    Field, FieldKind, Tab, VersionsConfig,
};
use crate::schema::hooks::{
    format_slug_hook, populate_published_at, revalidate_delete, revalidate_page,
};

pub const PAGES_SLUG: &str = "pages";

/// Blocks an editor may place in a page layout.
pub const LAYOUT_BLOCKS: &[&str] = &["cta", "content", "mediaBlock", "archive", "formBlock"];

fn preview_page(config: &SiteConfig, doc: Option<&DocumentSummary>) -> String {
    generate_preview_by_id(config, PAGES_SLUG, doc)
}

fn link_group(name: &'static str) -> Field {
    Field::new(
        name,
        FieldKind::Group(vec![
            Field::new("type", FieldKind::Text),
            Field::new("label", FieldKind::Text),
            Field::new("url", FieldKind::Text),
            Field::new("reference", FieldKind::Relationship { relation_to: "pages" }),
            Field::new("newTab", FieldKind::Checkbox),
            Field::new("appearance", FieldKind::Text),
        ]),
    )
}

fn hero_field() -> Field {
    Field::new(
        "hero",
        FieldKind::Group(vec![
            Field::new("type", FieldKind::Text).required(),
            Field::new("richText", FieldKind::Text),
            Field::new("links", FieldKind::Group(vec![link_group("link")])),
            Field::new("media", FieldKind::Upload { relation_to: "media" }),
        ]),
    )
}

fn seo_fields() -> Vec<Field> {
    vec![
        Field::new("overview", FieldKind::UiOnly),
        Field::new("title", FieldKind::Text),
        Field::new("image", FieldKind::Upload { relation_to: "media" }),
        Field::new("description", FieldKind::Text),
        Field::new("preview", FieldKind::UiOnly),
    ]
}

fn build_pages_collection() -> CollectionConfig {
    CollectionConfig {
        slug: PAGES_SLUG,
        access: CollectionAccess {
            create: AccessRule::Authenticated,
            read: AccessRule::AuthenticatedOrPublished,
            update: AccessRule::Authenticated,
            delete: AccessRule::Authenticated,
        },
        default_populate: &["title", "slug"],
        admin: AdminConfig {
            default_columns: &["title", "slug", "updatedAt"],
            use_as_title: "title",
            live_preview: preview_page,
            preview: preview_page,
        },
        fields: vec![
            Field::new("title", FieldKind::Text).required(),
            Field::new("breadcrumbs", FieldKind::Breadcrumbs { collection: PAGES_SLUG }).disabled(),
            Field::new(
                "",
                FieldKind::Tabs(vec![
                    Tab {
                        name: None,
                        label: "Hero",
                        fields: vec![hero_field()],
                    },
                    Tab {
                        name: None,
                        label: "Content",
                        fields: vec![Field::new("layout", FieldKind::Blocks(LAYOUT_BLOCKS.to_vec()))
                            .required()
                            .collapsed()],
                    },
                    Tab {
                        name: Some("meta"),
                        label: "SEO",
                        fields: seo_fields(),
                    },
                ]),
            ),
            Field::new("publishedAt", FieldKind::Date).sidebar(),
            Field::new("parent", FieldKind::Relationship { relation_to: PAGES_SLUG })
                .sidebar()
                .describe("Select a parent page to create a hierarchical structure"),
            Field::new("slug", FieldKind::Text).indexed().sidebar(),
            Field::new("slugLock", FieldKind::Checkbox).sidebar(),
        ],
        hooks: CollectionHooks {
            before_change: vec![format_slug_hook, populate_published_at],
            after_change: vec![revalidate_page],
            after_delete: vec![revalidate_delete],
        },
        versions: VersionsConfig {
            drafts: Some(DraftsConfig {
                autosave_interval: Some(Duration::from_millis(100)),
                schedule_publish: true,
            }),
            max_per_doc: 50,
        },
    }
}

/// The `pages` collection declaration.
pub fn pages_collection() -> &'static CollectionConfig {
    static PAGES: OnceLock<CollectionConfig> = OnceLock::new();
    PAGES.get_or_init(build_pages_collection)
}
