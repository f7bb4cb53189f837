use chrono::Utc;

use crate::db::models::{
    Block, CallToActionBlock, Column, ColumnSize, ContentBlock, Hero, HeroKind, Link,
    LinkAppearance, LinkItem, Page, PageMeta, PageStatus, RedirectKind, RedirectRule,
    RedirectTarget, Relation,
};
use crate::db::repository::PageWriter;
use crate::error::AppError;
use crate::schema::collection::Operation;
use crate::schema::hooks::build_breadcrumbs;
use crate::schema::pages::pages_collection;

/// What a seeding run wrote.
#[derive(Debug, Default)]
pub struct SeedReport {
    pub pages: usize,
    pub deleted: usize,
    pub redirects: usize,
    /// Public paths whose rendered output is stale after the run.
    pub stale_paths: Vec<String>,
}

impl SeedReport {
    fn mark_stale(&mut self, paths: Vec<String>) {
        for path in paths {
            if !self.stale_paths.contains(&path) {
                self.stale_paths.push(path);
            }
        }
    }
}

/// Run the collection's write pipeline for `page` and store it.
///
/// A page without an id gets a fresh one. Applies `beforeChange` hooks, links the parent
/// and rebuilds the breadcrumb trail, validates required fields, writes, then runs
/// `afterChange` hooks. Returns the stored page and the paths the hooks reported as stale.
pub async fn save_page(
    writer: &dyn PageWriter,
    mut page: Page,
    parent: Option<&Page>,
    previous: Option<&Page>,
) -> Result<(Page, Vec<String>), AppError> {
    let collection = pages_collection();
    let operation = if previous.is_some() {
        Operation::Update
    } else {
        Operation::Create
    };

    if page.id.is_empty() {
        page.id = uuid::Uuid::new_v4().to_string();
    }
    collection.run_before_change(&mut page, operation);

    page.parent = parent.map(|p| Relation::Id(p.id.clone()));
    page.breadcrumbs = Some(build_breadcrumbs(&page, parent));

    let now = Utc::now();
    page.created_at = previous.and_then(|p| p.created_at).or(Some(now));
    page.updated_at = Some(now);

    collection.validate(&page)?;
    writer.upsert_page(&page).await?;

    let stale = collection.run_after_change(&page, previous);
    Ok((page, stale))
}

/// Delete a page and run the collection's `afterDelete` hooks.
pub async fn delete_page(writer: &dyn PageWriter, id: &str) -> Result<Option<Vec<String>>, AppError> {
    match writer.delete_page(id).await? {
        Some(deleted) => Ok(Some(pages_collection().run_after_delete(&deleted))),
        None => Ok(None),
    }
}

struct SeedPage {
    page: Page,
    parent: Option<&'static str>,
}

fn rich_text(markdown: &str) -> Option<String> {
    Some(markdown.to_string())
}

fn link(label: &str, url: &str, appearance: LinkAppearance) -> LinkItem {
    LinkItem {
        link: Link {
            label: Some(label.to_string()),
            url: Some(url.to_string()),
            appearance,
            ..Default::default()
        },
    }
}

fn intro(markdown: &str) -> Vec<Block> {
    vec![Block::Content(ContentBlock {
        columns: vec![Column {
            size: ColumnSize::Full,
            rich_text: rich_text(markdown),
            enable_link: false,
            link: None,
        }],
    })]
}

fn new_page(id: &str, title: &str, slug: &str, status: PageStatus) -> Page {
    Page {
        id: id.to_string(),
        title: title.to_string(),
        slug: Some(slug.to_string()),
        slug_lock: false,
        hero: Hero::default(),
        layout: intro(&format!("## {}", title)),
        status,
        published_at: None,
        breadcrumbs: None,
        parent: None,
        meta: PageMeta {
            title: Some(title.to_string()),
            description: None,
            image: None,
        },
        created_at: None,
        updated_at: None,
    }
}

/// The demo page tree, parents before children.
fn demo_pages() -> Vec<SeedPage> {
    let mut home = new_page("seed-home", "Home", "home", PageStatus::Published);
    home.hero = Hero {
        kind: HeroKind::HighImpact,
        rich_text: rich_text("# Welcome to Folio\n\nPages, drafts and previews, served from MongoDB."),
        links: vec![
            link("About us", "/about", LinkAppearance::Default),
            link("Meet the team", "/about/team", LinkAppearance::Outline),
        ],
        media: None,
    };
    home.layout = vec![
        Block::Content(ContentBlock {
            columns: vec![
                Column {
                    size: ColumnSize::Half,
                    rich_text: rich_text("## Nested pages\n\nEvery page can have a parent; its url follows the breadcrumb trail."),
                    enable_link: false,
                    link: None,
                },
                Column {
                    size: ColumnSize::Half,
                    rich_text: rich_text("## Drafts\n\nEditors can preview unpublished changes before they go live."),
                    enable_link: false,
                    link: None,
                },
            ],
        }),
        Block::CallToAction(CallToActionBlock {
            rich_text: rich_text("Ready to write your own pages?"),
            links: vec![link("Read more", "/about", LinkAppearance::Default)],
        }),
    ];
    home.meta.description = Some("The Folio demo site.".to_string());

    let mut about = new_page("seed-about", "About", "about", PageStatus::Published);
    about.hero = Hero {
        kind: HeroKind::MediumImpact,
        rich_text: rich_text("# About\n\nA small demo company."),
        ..Default::default()
    };
    about.layout = intro("We build small, fast websites for people who write a lot of pages.");

    let mut team = new_page("seed-team", "Team", "team", PageStatus::Published);
    team.hero = Hero {
        kind: HeroKind::LowImpact,
        rich_text: rich_text("# Team\n\nThe people behind the demo."),
        ..Default::default()
    };
    team.layout = intro("Three editors, one developer and a lot of drafts.");

    let mut careers = new_page("seed-careers", "Careers", "careers", PageStatus::Draft);
    careers.hero = Hero {
        kind: HeroKind::LowImpact,
        rich_text: rich_text("# Careers\n\nComing soon."),
        ..Default::default()
    };
    careers.layout = intro("No open positions yet.");

    vec![
        SeedPage { page: home, parent: None },
        SeedPage { page: about, parent: None },
        SeedPage { page: team, parent: Some("seed-about") },
        SeedPage { page: careers, parent: Some("seed-about") },
    ]
}

fn demo_redirects() -> Vec<RedirectRule> {
    vec![RedirectRule {
        id: "seed-redirect-company".to_string(),
        from: "/company".to_string(),
        to: RedirectTarget {
            kind: RedirectKind::Custom,
            url: Some("/about".to_string()),
            reference: None,
        },
    }]
}

/// Insert the demo page tree and redirect rules. With `reset`, previously seeded pages
/// are deleted first.
pub async fn seed_demo_data(writer: &dyn PageWriter, reset: bool) -> Result<SeedReport, AppError> {
    tracing::info!("Starting demo data seeding...");

    let seeds = demo_pages();
    let mut report = SeedReport::default();

    if reset {
        // children first
        for seed in seeds.iter().rev() {
            if let Some(stale) = delete_page(writer, &seed.page.id).await? {
                tracing::info!("Deleted seeded page '{}'", seed.page.title);
                report.deleted += 1;
                report.mark_stale(stale);
            }
        }
    }

    let mut saved: Vec<Page> = Vec::with_capacity(seeds.len());
    for seed in seeds {
        let parent = match seed.parent {
            Some(parent_id) => Some(
                saved
                    .iter()
                    .find(|p| p.id == parent_id)
                    .ok_or_else(|| {
                        AppError::Internal(format!("Seed parent '{}' not found", parent_id))
                    })?
                    .clone(),
            ),
            None => None,
        };

        let (page, stale) = save_page(writer, seed.page, parent.as_ref(), None).await?;
        tracing::info!(
            "Seeded page '{}' at {}",
            page.title,
            page.canonical_path().unwrap_or("?")
        );
        report.pages += 1;
        report.mark_stale(stale);
        saved.push(page);
    }

    for rule in demo_redirects() {
        writer.upsert_redirect(&rule).await?;
        report.redirects += 1;
    }

    tracing::info!(
        pages = report.pages,
        redirects = report.redirects,
        "Demo data seeding complete"
    );
    Ok(report)
}
