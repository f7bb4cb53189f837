use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Publication status of a versioned document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageStatus {
    #[default]
    Draft,
    Published,
}

impl PageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageStatus::Draft => "draft",
            PageStatus::Published => "published",
        }
    }
}

/// A reference to another document: either the bare id or the populated document,
/// depending on the depth the query was run with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Relation<T> {
    Id(String),
    Populated(Box<T>),
}

impl<T> Relation<T> {
    pub fn populated(&self) -> Option<&T> {
        match self {
            Relation::Populated(doc) => Some(doc),
            Relation::Id(_) => None,
        }
    }
}

/// One step of a page's ancestor trail. The last entry describes the page itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Breadcrumb {
    /// Canonical path of the step. Non-string values in stored data read as `None`.
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Id of the page this step points at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        _ => None,
    })
}

/// Url of the last breadcrumb, if the trail exists and ends in a string url.
pub fn last_breadcrumb_url(breadcrumbs: Option<&[Breadcrumb]>) -> Option<&str> {
    breadcrumbs?.last()?.url.as_deref()
}

/// An uploaded media item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Media {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    /// Markdown caption.
    #[serde(default)]
    pub caption: Option<String>,
}

/// Minimal view of a referenced document, enough to build a link to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferencedDoc {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// A polymorphic relationship to a document in `relation_to`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentReference {
    pub relation_to: String,
    pub value: Relation<ReferencedDoc>,
}

impl DocumentReference {
    /// Public path of the referenced document. Pages live at the root, every other
    /// collection under its own prefix. `None` when the reference is not populated.
    pub fn href(&self) -> Option<String> {
        let slug = self.value.populated()?.slug.as_deref()?;
        if self.relation_to == "pages" {
            Some(format!("/{}", slug))
        } else {
            Some(format!("/{}/{}", self.relation_to, slug))
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Reference,
    #[default]
    Custom,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkAppearance {
    #[default]
    Default,
    Outline,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    #[serde(rename = "type", default)]
    pub kind: LinkKind,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub reference: Option<DocumentReference>,
    #[serde(default)]
    pub new_tab: bool,
    #[serde(default)]
    pub appearance: LinkAppearance,
}

impl Link {
    pub fn href(&self) -> Option<String> {
        match self.kind {
            LinkKind::Reference => self.reference.as_ref().and_then(DocumentReference::href),
            LinkKind::Custom => self.url.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkItem {
    pub link: Link,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HeroKind {
    #[default]
    None,
    HighImpact,
    MediumImpact,
    LowImpact,
    HomeGradient,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hero {
    #[serde(rename = "type", default)]
    pub kind: HeroKind,
    /// Markdown.
    #[serde(default)]
    pub rich_text: Option<String>,
    #[serde(default)]
    pub links: Vec<LinkItem>,
    #[serde(default)]
    pub media: Option<Relation<Media>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToActionBlock {
    #[serde(default)]
    pub rich_text: Option<String>,
    #[serde(default)]
    pub links: Vec<LinkItem>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnSize {
    OneThird,
    Half,
    TwoThirds,
    #[default]
    Full,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    #[serde(default)]
    pub size: ColumnSize,
    #[serde(default)]
    pub rich_text: Option<String>,
    #[serde(default)]
    pub enable_link: bool,
    #[serde(default)]
    pub link: Option<Link>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(default)]
    pub columns: Vec<Column>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaBlock {
    #[serde(default)]
    pub media: Option<Relation<Media>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PopulateBy {
    #[default]
    Collection,
    Selection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveBlock {
    #[serde(default)]
    pub intro_content: Option<String>,
    #[serde(default)]
    pub populate_by: PopulateBy,
    #[serde(default)]
    pub relation_to: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub selected_docs: Vec<DocumentReference>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    /// Input kind (`text`, `email`, `textarea`, ...).
    #[serde(rename = "blockType", default = "default_field_type")]
    pub field_type: String,
    #[serde(default)]
    pub required: bool,
}

fn default_field_type() -> String {
    "text".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub fields: Vec<FormField>,
    #[serde(default)]
    pub submit_button_label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormBlock {
    #[serde(default)]
    pub form: Option<Relation<Form>>,
    #[serde(default)]
    pub enable_intro: bool,
    #[serde(default)]
    pub intro_content: Option<String>,
}

/// A layout block, discriminated by `blockType`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "blockType")]
pub enum Block {
    #[serde(rename = "cta")]
    CallToAction(CallToActionBlock),
    #[serde(rename = "content")]
    Content(ContentBlock),
    #[serde(rename = "mediaBlock")]
    MediaBlock(MediaBlock),
    #[serde(rename = "archive")]
    Archive(ArchiveBlock),
    #[serde(rename = "formBlock")]
    Form(FormBlock),
}

impl Block {
    pub fn slug(&self) -> &'static str {
        match self {
            Block::CallToAction(_) => "cta",
            Block::Content(_) => "content",
            Block::MediaBlock(_) => "mediaBlock",
            Block::Archive(_) => "archive",
            Block::Form(_) => "formBlock",
        }
    }
}

/// SEO metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<Relation<Media>>,
}

/// A document in the `pages` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    /// Last path segment of the page's url.
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub slug_lock: bool,
    #[serde(default)]
    pub hero: Hero,
    #[serde(default)]
    pub layout: Vec<Block>,
    #[serde(rename = "_status", default)]
    pub status: PageStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breadcrumbs: Option<Vec<Breadcrumb>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Relation<Page>>,
    #[serde(default)]
    pub meta: PageMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Page {
    /// The page's canonical path, as recorded by its breadcrumb trail.
    pub fn canonical_path(&self) -> Option<&str> {
        last_breadcrumb_url(self.breadcrumbs.as_deref())
    }

    pub fn parent_id(&self) -> Option<&str> {
        match self.parent.as_ref()? {
            Relation::Id(id) => Some(id),
            Relation::Populated(page) => Some(&page.id),
        }
    }
}

/// Projection used by preview redirects and static route enumeration: any document with
/// an id, an optional slug and an optional breadcrumb trail.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub slug: Option<String>,
    #[serde(default)]
    pub breadcrumbs: Option<Vec<Breadcrumb>>,
}

impl DocumentSummary {
    pub fn canonical_path(&self) -> Option<&str> {
        last_breadcrumb_url(self.breadcrumbs.as_deref())
    }
}

impl From<&Page> for DocumentSummary {
    fn from(page: &Page) -> Self {
        Self {
            id: page.id.clone(),
            slug: page.slug.clone(),
            breadcrumbs: page.breadcrumbs.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedirectKind {
    Reference,
    #[default]
    Custom,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RedirectTarget {
    #[serde(rename = "type", default)]
    pub kind: RedirectKind,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub reference: Option<DocumentReference>,
}

/// An editor-managed redirect from one path to another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedirectRule {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub from: String,
    pub to: RedirectTarget,
}

impl RedirectRule {
    /// Destination path, or `None` if the rule points nowhere usable.
    pub fn destination(&self) -> Option<String> {
        match self.to.kind {
            RedirectKind::Reference => self.to.reference.as_ref().and_then(DocumentReference::href),
            RedirectKind::Custom => self.to.url.clone().filter(|u| !u.is_empty()),
        }
    }
}
