use std::sync::Mutex;

use async_trait::async_trait;

use crate::db::models::{
    Breadcrumb, DocumentSummary, Hero, Page, PageMeta, PageStatus, RedirectRule,
};
use crate::db::repository::{PageStore, PageWriter, SlugQuery, StatusFilter};
use crate::error::AppError;

/// In-memory `PageStore` honouring the same filters as the MongoDB implementation.
pub struct InMemoryStore {
    pub pages: Mutex<Vec<Page>>,
    pub posts: Mutex<Vec<DocumentSummary>>,
    pub redirects: Mutex<Vec<RedirectRule>>,
    pub slug_queries: Mutex<Vec<SlugQuery>>,
}

impl InMemoryStore {
    pub fn new(pages: Vec<Page>) -> Self {
        Self {
            pages: Mutex::new(pages),
            posts: Mutex::new(vec![]),
            redirects: Mutex::new(vec![]),
            slug_queries: Mutex::new(vec![]),
        }
    }
}

fn visible(page: &Page, status: StatusFilter) -> bool {
    status == StatusFilter::Any || page.status == PageStatus::Published
}

#[async_trait]
impl PageStore for InMemoryStore {
    async fn find_pages_by_slug(&self, query: SlugQuery) -> Result<Vec<Page>, AppError> {
        self.slug_queries.lock().unwrap().push(query.clone());
        let pages: Vec<Page> = self
            .pages
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.slug.as_deref() == Some(query.slug.as_str()))
            .filter(|p| visible(p, query.status))
            .take(query.limit.map(|l| l as usize).unwrap_or(usize::MAX))
            .cloned()
            .collect();
        Ok(pages)
    }

    async fn find_by_id(
        &self,
        collection: &str,
        id: &str,
        draft: bool,
    ) -> Result<Option<DocumentSummary>, AppError> {
        let status = StatusFilter::for_draft_mode(draft);
        match collection {
            "pages" => Ok(self
                .pages
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.id == id && visible(p, status))
                .map(DocumentSummary::from)),
            "posts" => Ok(self.posts.lock().unwrap().iter().find(|p| p.id == id).cloned()),
            _ => Ok(None),
        }
    }

    async fn list_published_breadcrumbs(
        &self,
        exclude_slug: &str,
        limit: i64,
    ) -> Result<Vec<DocumentSummary>, AppError> {
        Ok(self
            .pages
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.status == PageStatus::Published)
            .filter(|p| p.slug.as_deref() != Some(exclude_slug))
            .take(limit as usize)
            .map(|p| DocumentSummary {
                id: p.id.clone(),
                slug: None,
                breadcrumbs: p.breadcrumbs.clone(),
            })
            .collect())
    }

    async fn find_redirect(&self, from: &str) -> Result<Option<RedirectRule>, AppError> {
        Ok(self
            .redirects
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.from == from)
            .cloned())
    }
}

#[async_trait]
impl PageWriter for InMemoryStore {
    async fn upsert_page(&self, page: &Page) -> Result<(), AppError> {
        let mut pages = self.pages.lock().unwrap();
        pages.retain(|p| p.id != page.id);
        pages.push(page.clone());
        Ok(())
    }

    async fn delete_page(&self, id: &str) -> Result<Option<Page>, AppError> {
        let mut pages = self.pages.lock().unwrap();
        let index = pages.iter().position(|p| p.id == id);
        Ok(index.map(|i| pages.remove(i)))
    }

    async fn upsert_redirect(&self, rule: &RedirectRule) -> Result<(), AppError> {
        let mut redirects = self.redirects.lock().unwrap();
        redirects.retain(|r| r.from != rule.from);
        redirects.push(rule.clone());
        Ok(())
    }
}

/// A page at `path` (e.g. `/about/team`) whose slug is the last segment.
pub fn page_at(id: &str, path: &str, status: PageStatus) -> Page {
    let slug = path.rsplit('/').next().unwrap_or_default().to_string();
    Page {
        id: id.to_string(),
        title: slug.clone(),
        slug: Some(slug),
        slug_lock: false,
        hero: Hero::default(),
        layout: vec![],
        status,
        published_at: None,
        breadcrumbs: Some(vec![Breadcrumb {
            url: Some(path.to_string()),
            label: None,
            doc: Some(id.to_string()),
        }]),
        parent: None,
        meta: PageMeta::default(),
        created_at: None,
        updated_at: None,
    }
}
