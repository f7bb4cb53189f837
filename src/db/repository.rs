use async_trait::async_trait;

use crate::db::models::{DocumentSummary, Page, RedirectRule};
use crate::error::AppError;

/// Which publication states a query may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    /// Drafts and published documents alike.
    Any,
    /// Only documents whose `_status` is `published`. Collections without versioning
    /// (no `_status` field) always match.
    PublishedOnly,
}

impl StatusFilter {
    pub fn for_draft_mode(draft: bool) -> Self {
        if draft {
            StatusFilter::Any
        } else {
            StatusFilter::PublishedOnly
        }
    }
}

/// A slug lookup against the `pages` collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugQuery {
    pub slug: String,
    pub status: StatusFilter,
    /// How many levels of relations to populate.
    pub depth: u8,
    pub limit: Option<i64>,
}

/// Read access to the content store.
///
/// Only the query shapes the site issues are exposed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageStore: Send + Sync {
    /// Pages whose `slug` equals `query.slug`, filtered by status.
    async fn find_pages_by_slug(&self, query: SlugQuery) -> Result<Vec<Page>, AppError>;

    /// A single document of any collection by id. With `draft` set, unpublished
    /// documents are visible too.
    ///
    /// Only the `slug` and `breadcrumbs` projection is loaded. No relations are
    /// populated, so there is no depth to choose: the preview redirect reads nothing
    /// beyond those two fields, which a depth-2 fetch would return unchanged.
    async fn find_by_id(
        &self,
        collection: &str,
        id: &str,
        draft: bool,
    ) -> Result<Option<DocumentSummary>, AppError>;

    /// Breadcrumb-only projection of every published page, excluding `exclude_slug`.
    /// Relations are not populated.
    async fn list_published_breadcrumbs(
        &self,
        exclude_slug: &str,
        limit: i64,
    ) -> Result<Vec<DocumentSummary>, AppError>;

    /// The redirect rule registered for `from`, if any.
    async fn find_redirect(&self, from: &str) -> Result<Option<RedirectRule>, AppError>;
}

/// Write access used by the seeder.
#[async_trait]
pub trait PageWriter: Send + Sync {
    /// Insert or replace a page (matched by id).
    async fn upsert_page(&self, page: &Page) -> Result<(), AppError>;

    /// Delete a page by id, returning the deleted document.
    async fn delete_page(&self, id: &str) -> Result<Option<Page>, AppError>;

    /// Insert or replace a redirect rule (matched by `from`).
    async fn upsert_redirect(&self, rule: &RedirectRule) -> Result<(), AppError>;
}

/// Collection names come from request parameters; only plain identifiers may reach
/// the database.
pub fn is_valid_collection_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with("system")
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// MongoDB implementation of the PageStore.
///
/// This is only available when the `ssr` feature is enabled (i.e., server-side).
#[cfg(feature = "ssr")]
pub struct MongoPageStore {
    db: mongodb::Database,
}

#[cfg(feature = "ssr")]
mod mongo {
    use futures::future::BoxFuture;
    use futures::TryStreamExt;
    use mongodb::bson::{doc, Document as BsonDocument};
    use mongodb::options::{FindOneOptions, FindOptions, ReplaceOptions};

    use super::*;
    use crate::db::models::{
        Block, DocumentReference, Form, Media, ReferencedDoc, Relation,
    };

    pub(super) const PAGES: &str = "pages";
    pub(super) const MEDIA: &str = "media";
    pub(super) const FORMS: &str = "forms";
    pub(super) const REDIRECTS: &str = "redirects";

    pub(super) fn status_clause(status: StatusFilter) -> Option<BsonDocument> {
        match status {
            StatusFilter::Any => None,
            StatusFilter::PublishedOnly => Some(doc! {
                "$or": [
                    { "_status": { "$exists": false } },
                    { "_status": "published" }
                ]
            }),
        }
    }

    pub(super) fn and_filter(mut clauses: Vec<BsonDocument>) -> BsonDocument {
        if clauses.len() == 1 {
            clauses.remove(0)
        } else {
            doc! { "$and": clauses }
        }
    }

    fn media_relations_mut(page: &mut Page) -> Vec<&mut Relation<Media>> {
        let mut relations = Vec::new();
        if let Some(media) = page.hero.media.as_mut() {
            relations.push(media);
        }
        if let Some(image) = page.meta.image.as_mut() {
            relations.push(image);
        }
        for block in page.layout.iter_mut() {
            if let Block::MediaBlock(block) = block {
                if let Some(media) = block.media.as_mut() {
                    relations.push(media);
                }
            }
        }
        relations
    }

    fn form_relations_mut(page: &mut Page) -> Vec<&mut Relation<Form>> {
        page.layout
            .iter_mut()
            .filter_map(|block| match block {
                Block::Form(block) => block.form.as_mut(),
                _ => None,
            })
            .collect()
    }

    fn references_mut(page: &mut Page) -> Vec<&mut DocumentReference> {
        let mut refs = Vec::new();
        for item in page.hero.links.iter_mut() {
            if let Some(reference) = item.link.reference.as_mut() {
                refs.push(reference);
            }
        }
        for block in page.layout.iter_mut() {
            match block {
                Block::CallToAction(cta) => {
                    for item in cta.links.iter_mut() {
                        if let Some(reference) = item.link.reference.as_mut() {
                            refs.push(reference);
                        }
                    }
                }
                Block::Content(content) => {
                    for column in content.columns.iter_mut() {
                        if let Some(reference) =
                            column.link.as_mut().and_then(|l| l.reference.as_mut())
                        {
                            refs.push(reference);
                        }
                    }
                }
                Block::Archive(archive) => refs.extend(archive.selected_docs.iter_mut()),
                Block::MediaBlock(_) | Block::Form(_) => {}
            }
        }
        refs
    }

    impl MongoPageStore {
        pub fn new(db: &mongodb::Database) -> Self {
            Self { db: db.clone() }
        }

        fn pages(&self) -> mongodb::Collection<Page> {
            self.db.collection(PAGES)
        }

        async fn find_page_by_id(&self, id: &str) -> Result<Option<Page>, AppError> {
            Ok(self.pages().find_one(doc! { "_id": id }).await?)
        }

        /// Replace id-only relations with the referenced documents, `depth` levels deep.
        pub(super) fn populate<'a>(
            &'a self,
            page: &'a mut Page,
            depth: u8,
        ) -> BoxFuture<'a, Result<(), AppError>> {
            Box::pin(async move {
                if depth == 0 {
                    return Ok(());
                }

                if let Some(Relation::Id(parent_id)) = page.parent.clone() {
                    if let Some(mut parent) = self.find_page_by_id(&parent_id).await? {
                        self.populate(&mut parent, depth - 1).await?;
                        page.parent = Some(Relation::Populated(Box::new(parent)));
                    }
                }

                let media = self.db.collection::<Media>(MEDIA);
                for relation in media_relations_mut(page) {
                    if let Relation::Id(id) = relation {
                        if let Some(found) = media.find_one(doc! { "_id": id.as_str() }).await? {
                            *relation = Relation::Populated(Box::new(found));
                        }
                    }
                }

                let forms = self.db.collection::<Form>(FORMS);
                for relation in form_relations_mut(page) {
                    if let Relation::Id(id) = relation {
                        if let Some(found) = forms.find_one(doc! { "_id": id.as_str() }).await? {
                            *relation = Relation::Populated(Box::new(found));
                        }
                    }
                }

                let projection = FindOneOptions::builder()
                    .projection(doc! { "slug": 1, "title": 1 })
                    .build();
                for reference in references_mut(page) {
                    if !is_valid_collection_name(&reference.relation_to) {
                        continue;
                    }
                    if let Relation::Id(id) = &reference.value {
                        let found = self
                            .db
                            .collection::<ReferencedDoc>(&reference.relation_to)
                            .find_one(doc! { "_id": id.as_str() })
                            .with_options(projection.clone())
                            .await?;
                        if let Some(found) = found {
                            reference.value = Relation::Populated(Box::new(found));
                        }
                    }
                }

                Ok(())
            })
        }
    }

    #[async_trait]
    impl PageStore for MongoPageStore {
        async fn find_pages_by_slug(&self, query: SlugQuery) -> Result<Vec<Page>, AppError> {
            let mut clauses = vec![doc! { "slug": &query.slug }];
            clauses.extend(status_clause(query.status));

            let options = FindOptions::builder().limit(query.limit).build();

            let mut cursor = self
                .pages()
                .find(and_filter(clauses))
                .with_options(options)
                .await?;

            let mut pages = Vec::new();
            while let Some(mut page) = cursor.try_next().await? {
                self.populate(&mut page, query.depth).await?;
                pages.push(page);
            }

            Ok(pages)
        }

        async fn find_by_id(
            &self,
            collection: &str,
            id: &str,
            draft: bool,
        ) -> Result<Option<DocumentSummary>, AppError> {
            if !is_valid_collection_name(collection) {
                return Ok(None);
            }

            let mut clauses = vec![doc! { "_id": id }];
            clauses.extend(status_clause(StatusFilter::for_draft_mode(draft)));

            let options = FindOneOptions::builder()
                .projection(doc! { "slug": 1, "breadcrumbs": 1 })
                .build();

            Ok(self
                .db
                .collection::<DocumentSummary>(collection)
                .find_one(and_filter(clauses))
                .with_options(options)
                .await?)
        }

        async fn list_published_breadcrumbs(
            &self,
            exclude_slug: &str,
            limit: i64,
        ) -> Result<Vec<DocumentSummary>, AppError> {
            let mut clauses = vec![doc! { "slug": { "$ne": exclude_slug } }];
            clauses.extend(status_clause(StatusFilter::PublishedOnly));
            let filter = and_filter(clauses);

            let options = FindOptions::builder()
                .projection(doc! { "breadcrumbs": 1 })
                .limit(limit)
                .build();

            let cursor = self
                .db
                .collection::<DocumentSummary>(PAGES)
                .find(filter)
                .with_options(options)
                .await?;

            let summaries: Vec<DocumentSummary> = cursor.try_collect().await?;
            Ok(summaries)
        }

        async fn find_redirect(&self, from: &str) -> Result<Option<RedirectRule>, AppError> {
            let redirects = self.db.collection::<RedirectRule>(REDIRECTS);
            let Some(mut rule) = redirects.find_one(doc! { "from": from }).await? else {
                return Ok(None);
            };

            if let Some(reference) = rule.to.reference.as_mut() {
                if let Relation::Id(id) = &reference.value {
                    if is_valid_collection_name(&reference.relation_to) {
                        let options = FindOneOptions::builder()
                            .projection(doc! { "slug": 1, "title": 1 })
                            .build();
                        let found = self
                            .db
                            .collection::<ReferencedDoc>(&reference.relation_to)
                            .find_one(doc! { "_id": id.as_str() })
                            .with_options(options)
                            .await?;
                        if let Some(found) = found {
                            reference.value = Relation::Populated(Box::new(found));
                        }
                    }
                }
            }

            Ok(Some(rule))
        }
    }

    #[async_trait]
    impl PageWriter for MongoPageStore {
        async fn upsert_page(&self, page: &Page) -> Result<(), AppError> {
            let options = ReplaceOptions::builder().upsert(true).build();

            self.pages()
                .replace_one(doc! { "_id": &page.id }, page)
                .with_options(options)
                .await?;

            Ok(())
        }

        async fn delete_page(&self, id: &str) -> Result<Option<Page>, AppError> {
            Ok(self.pages().find_one_and_delete(doc! { "_id": id }).await?)
        }

        async fn upsert_redirect(&self, rule: &RedirectRule) -> Result<(), AppError> {
            let options = ReplaceOptions::builder().upsert(true).build();

            self.db
                .collection::<RedirectRule>(REDIRECTS)
                .replace_one(doc! { "from": &rule.from }, rule)
                .with_options(options)
                .await?;

            Ok(())
        }
    }
}
