//! Declarative collection configuration.
//!
//! A [`CollectionConfig`] describes a collection the way an editor sees it (fields, tabs,
//! sidebar placement), who may touch it, how it is versioned and which hooks run around
//! writes. The declaration is data; the helpers here evaluate the parts the site
//! needs at runtime (read access, required-field validation, hook dispatch).

use std::time::Duration;

use crate::auth::models::AuthenticatedUser;
use crate::config::SiteConfig;
use crate::db::models::{DocumentSummary, Page};
use crate::db::repository::StatusFilter;
use crate::error::AppError;

/// An access rule attached to one operation of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessRule {
    Anyone,
    Authenticated,
    /// Authenticated users see everything, anonymous readers only published documents.
    AuthenticatedOrPublished,
}

impl AccessRule {
    /// Whether `user` may perform the operation at all.
    pub fn allows(&self, user: Option<&AuthenticatedUser>) -> bool {
        match self {
            AccessRule::Anyone | AccessRule::AuthenticatedOrPublished => true,
            AccessRule::Authenticated => user.is_some(),
        }
    }

    /// Status restriction a read by `user` is subject to.
    pub fn status_filter(&self, user: Option<&AuthenticatedUser>) -> StatusFilter {
        match (self, user) {
            (AccessRule::AuthenticatedOrPublished, None) => StatusFilter::PublishedOnly,
            _ => StatusFilter::Any,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionAccess {
    pub create: AccessRule,
    pub read: AccessRule,
    pub update: AccessRule,
    pub delete: AccessRule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminPosition {
    Main,
    Sidebar,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldAdmin {
    pub position: AdminPosition,
    pub disabled: bool,
    pub init_collapsed: bool,
    pub description: Option<&'static str>,
}

impl Default for FieldAdmin {
    fn default() -> Self {
        Self {
            position: AdminPosition::Main,
            disabled: false,
            init_collapsed: false,
            description: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    /// Named tabs nest their fields under `name`; unnamed tabs are presentational only.
    pub name: Option<&'static str>,
    pub label: &'static str,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Checkbox,
    Date,
    Group(Vec<Field>),
    Tabs(Vec<Tab>),
    /// Polymorphic block list; the allowed block slugs.
    Blocks(Vec<&'static str>),
    Relationship { relation_to: &'static str },
    Upload { relation_to: &'static str },
    /// Ancestor trail maintained from the parent chain.
    Breadcrumbs { collection: &'static str },
    /// SEO preview widgets that render other fields; no stored value.
    UiOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub index: bool,
    pub admin: FieldAdmin,
}

impl Field {
    pub fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            index: false,
            admin: FieldAdmin::default(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn indexed(mut self) -> Self {
        self.index = true;
        self
    }

    pub fn sidebar(mut self) -> Self {
        self.admin.position = AdminPosition::Sidebar;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.admin.disabled = true;
        self
    }

    pub fn collapsed(mut self) -> Self {
        self.admin.init_collapsed = true;
        self
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.admin.description = Some(description);
        self
    }
}

/// Builds a preview link for a document of this collection.
pub type PreviewFn = fn(&SiteConfig, Option<&DocumentSummary>) -> String;

pub struct AdminConfig {
    pub default_columns: &'static [&'static str],
    pub use_as_title: &'static str,
    pub live_preview: PreviewFn,
    pub preview: PreviewFn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DraftsConfig {
    pub autosave_interval: Option<Duration>,
    pub schedule_publish: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionsConfig {
    pub drafts: Option<DraftsConfig>,
    pub max_per_doc: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
}

/// Mutates the incoming document before it is written.
pub type BeforeChangeHook = fn(&mut Page, Operation);
/// Runs after a write with the new and previous document; returns the public paths
/// whose rendered output is now stale.
pub type AfterChangeHook = fn(&Page, Option<&Page>) -> Vec<String>;
/// Runs after a delete; returns the stale public paths.
pub type AfterDeleteHook = fn(&Page) -> Vec<String>;

#[derive(Default)]
pub struct CollectionHooks {
    pub before_change: Vec<BeforeChangeHook>,
    pub after_change: Vec<AfterChangeHook>,
    pub after_delete: Vec<AfterDeleteHook>,
}

pub struct CollectionConfig {
    pub slug: &'static str,
    pub access: CollectionAccess,
    /// Fields returned when a document of this collection is referenced.
    pub default_populate: &'static [&'static str],
    pub admin: AdminConfig,
    pub fields: Vec<Field>,
    pub hooks: CollectionHooks,
    pub versions: VersionsConfig,
}

impl CollectionConfig {
    pub fn drafts_enabled(&self) -> bool {
        self.versions.drafts.is_some()
    }

    /// Top-level field by name, looking through unnamed tabs.
    pub fn field(&self, name: &str) -> Option<&Field> {
        find_field(&self.fields, name)
    }

    pub fn preview_url(&self, config: &SiteConfig, doc: Option<&DocumentSummary>) -> String {
        (self.admin.preview)(config, doc)
    }

    pub fn live_preview_url(&self, config: &SiteConfig, doc: Option<&DocumentSummary>) -> String {
        (self.admin.live_preview)(config, doc)
    }

    /// Reject documents missing a required field.
    pub fn validate(&self, page: &Page) -> Result<(), AppError> {
        let value = serde_json::to_value(page)
            .map_err(|e| AppError::Internal(format!("Failed to serialize page: {}", e)))?;
        let mut missing = Vec::new();
        collect_missing(&self.fields, &value, "", &mut missing);

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::BadRequest(format!(
                "Missing required fields in {}: {}",
                self.slug,
                missing.join(", ")
            )))
        }
    }

    pub fn run_before_change(&self, page: &mut Page, operation: Operation) {
        for hook in &self.hooks.before_change {
            hook(page, operation);
        }
    }

    pub fn run_after_change(&self, page: &Page, previous: Option<&Page>) -> Vec<String> {
        let mut paths = Vec::new();
        for hook in &self.hooks.after_change {
            for path in hook(page, previous) {
                if !paths.contains(&path) {
                    paths.push(path);
                }
            }
        }
        paths
    }

    pub fn run_after_delete(&self, page: &Page) -> Vec<String> {
        let mut paths = Vec::new();
        for hook in &self.hooks.after_delete {
            for path in hook(page) {
                if !paths.contains(&path) {
                    paths.push(path);
                }
            }
        }
        paths
    }
}

fn find_field<'a>(fields: &'a [Field], name: &str) -> Option<&'a Field> {
    fields.iter().find_map(|field| {
        if field.name == name {
            return Some(field);
        }
        match &field.kind {
            FieldKind::Tabs(tabs) => tabs
                .iter()
                .filter(|tab| tab.name.is_none())
                .find_map(|tab| find_field(&tab.fields, name)),
            _ => None,
        }
    })
}

fn is_empty_value(value: Option<&serde_json::Value>) -> bool {
    match value {
        None | Some(serde_json::Value::Null) => true,
        Some(serde_json::Value::String(s)) => s.trim().is_empty(),
        Some(serde_json::Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

fn collect_missing(
    fields: &[Field],
    value: &serde_json::Value,
    prefix: &str,
    missing: &mut Vec<String>,
) {
    for field in fields {
        match &field.kind {
            FieldKind::Tabs(tabs) => {
                for tab in tabs {
                    match tab.name {
                        Some(name) => {
                            let nested = value.get(name).cloned().unwrap_or_default();
                            collect_missing(&tab.fields, &nested, &format!("{prefix}{name}."), missing);
                        }
                        None => collect_missing(&tab.fields, value, prefix, missing),
                    }
                }
            }
            FieldKind::Group(children) => {
                let nested = value.get(field.name).cloned().unwrap_or_default();
                collect_missing(children, &nested, &format!("{prefix}{}.", field.name), missing);
            }
            _ => {
                if field.required && is_empty_value(value.get(field.name)) {
                    missing.push(format!("{prefix}{}", field.name));
                }
            }
        }
    }
}
