use leptos::prelude::*;

use crate::db::models::{
    ArchiveBlock, Block, CallToActionBlock, Column, ColumnSize, ContentBlock, Form, FormBlock,
    FormField, Hero, HeroKind, Link, LinkAppearance, LinkItem, Media, MediaBlock, Page,
    PopulateBy, Relation,
};
use crate::rendering::markdown::render_rich_text;
use crate::rendering::meta::DocumentMeta;

/// Render a page as a complete HTML document.
pub fn render_document(page: &Page, meta: &DocumentMeta, draft: bool) -> String {
    let page = page.clone();
    let meta = meta.clone();

    let owner = Owner::new();
    let html = owner.with(move || view! { <Document page=page meta=meta draft=draft/> }.to_html());

    format!("<!DOCTYPE html>{html}")
}

#[component]
fn Document(page: Page, meta: DocumentMeta, draft: bool) -> impl IntoView {
    let og_title = meta.title.clone();

    view! {
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <title>{meta.title}</title>
                {meta.description.clone().map(|d| view! { <meta name="description" content=d/> })}
                {leptos::html::meta().attr("property", "og:title").attr("content", og_title)}
                {meta.description.map(|d| leptos::html::meta().attr("property", "og:description").attr("content", d))}
                {meta.image.map(|url| leptos::html::meta().attr("property", "og:image").attr("content", url))}
                {meta.url.map(|url| leptos::html::meta().attr("property", "og:url").attr("content", url))}
                <link rel="stylesheet" href="/assets/folio.css"/>
            </head>
            <body>
                {draft.then(|| view! { <DraftBanner/> })}
                <article class="page" data-page-id=page.id>
                    <HeroSection hero=page.hero/>
                    <Blocks blocks=page.layout/>
                </article>
            </body>
        </html>
    }
}

#[component]
fn DraftBanner() -> impl IntoView {
    view! {
        <div class="draft-banner">
            <span>"You are viewing draft content."</span>
            <form method="post" action="/next/exit-preview">
                <button type="submit">"Exit preview"</button>
            </form>
        </div>
    }
}

#[component]
pub fn RichText(content: Option<String>, #[prop(optional)] class: &'static str) -> impl IntoView {
    content.filter(|c| !c.trim().is_empty()).map(|c| {
        let html = render_rich_text(&c);
        let class = if class.is_empty() {
            "rich-text".to_string()
        } else {
            format!("rich-text {class}")
        };
        view! { <div class=class inner_html=html></div> }
    })
}

#[component]
pub fn CmsLink(link: Link) -> impl IntoView {
    let class = match link.appearance {
        LinkAppearance::Default => "button",
        LinkAppearance::Outline => "button button--outline",
    };
    let target = link.new_tab.then_some("_blank");
    let rel = link.new_tab.then_some("noopener noreferrer");

    link.href().map(|href| {
        let label = link.label.clone().unwrap_or_else(|| href.clone());
        view! { <a href=href class=class target=target rel=rel>{label}</a> }
    })
}

fn link_group(links: Vec<LinkItem>) -> impl IntoView {
    (!links.is_empty()).then(|| {
        view! {
            <ul class="link-group">
                {links
                    .into_iter()
                    .map(|item| view! { <li><CmsLink link=item.link/></li> })
                    .collect_view()}
            </ul>
        }
    })
}

#[component]
pub fn MediaView(media: Option<Relation<Media>>, #[prop(optional)] class: &'static str) -> impl IntoView {
    let media = media
        .as_ref()
        .and_then(Relation::populated)
        .filter(|m| m.url.is_some())
        .cloned();

    media.map(|media| {
        let src = media.url.unwrap_or_default();
        let alt = media.alt.unwrap_or_default();
        let width = media.width.map(|w| w.to_string());
        let height = media.height.map(|h| h.to_string());

        view! {
            <figure class=format!("media {class}")>
                <img src=src alt=alt width=width height=height loading="lazy"/>
                {media.caption.map(|caption| view! { <figcaption>{caption}</figcaption> })}
            </figure>
        }
    })
}

#[component]
pub fn HeroSection(hero: Hero) -> impl IntoView {
    match hero.kind {
        HeroKind::None => ().into_any(),
        HeroKind::HighImpact => view! {
            <section class="hero hero--high-impact">
                <MediaView media=hero.media class="hero__background"/>
                <div class="hero__content">
                    <RichText content=hero.rich_text/>
                    {link_group(hero.links)}
                </div>
            </section>
        }
        .into_any(),
        HeroKind::MediumImpact => view! {
            <section class="hero hero--medium-impact">
                <div class="hero__content">
                    <RichText content=hero.rich_text/>
                    {link_group(hero.links)}
                </div>
                <MediaView media=hero.media/>
            </section>
        }
        .into_any(),
        HeroKind::LowImpact => view! {
            <section class="hero hero--low-impact">
                <RichText content=hero.rich_text/>
            </section>
        }
        .into_any(),
        HeroKind::HomeGradient => view! {
            <section class="hero hero--home-gradient">
                <div class="hero__content">
                    <RichText content=hero.rich_text/>
                    {link_group(hero.links)}
                </div>
            </section>
        }
        .into_any(),
    }
}

#[component]
pub fn Blocks(blocks: Vec<Block>) -> impl IntoView {
    (!blocks.is_empty()).then(|| {
        view! {
            <div class="blocks">
                {blocks.into_iter().map(render_block).collect_view()}
            </div>
        }
    })
}

fn render_block(block: Block) -> AnyView {
    let slug = block.slug();
    let inner = match block {
        Block::CallToAction(cta) => call_to_action(cta).into_any(),
        Block::Content(content) => content_block(content).into_any(),
        Block::MediaBlock(media) => media_block(media).into_any(),
        Block::Archive(archive) => archive_block(archive).into_any(),
        Block::Form(form) => form_block(form).into_any(),
    };

    view! { <section class="block" data-block-type=slug>{inner}</section> }.into_any()
}

fn call_to_action(cta: CallToActionBlock) -> impl IntoView {
    view! {
        <div class="cta">
            <RichText content=cta.rich_text/>
            {link_group(cta.links)}
        </div>
    }
}

fn column_class(size: ColumnSize) -> &'static str {
    match size {
        ColumnSize::OneThird => "column column--one-third",
        ColumnSize::Half => "column column--half",
        ColumnSize::TwoThirds => "column column--two-thirds",
        ColumnSize::Full => "column column--full",
    }
}

fn content_block(content: ContentBlock) -> impl IntoView {
    view! {
        <div class="columns">
            {content.columns.into_iter().map(column).collect_view()}
        </div>
    }
}

fn column(column: Column) -> impl IntoView {
    let link = column.link.filter(|_| column.enable_link);
    view! {
        <div class=column_class(column.size)>
            <RichText content=column.rich_text/>
            {link.map(|link| view! { <CmsLink link=link/> })}
        </div>
    }
}

fn media_block(block: MediaBlock) -> impl IntoView {
    view! { <MediaView media=block.media/> }
}

fn archive_block(archive: ArchiveBlock) -> impl IntoView {
    let docs = match archive.populate_by {
        PopulateBy::Selection => archive.selected_docs,
        PopulateBy::Collection => vec![],
    };

    view! {
        <div class="archive" data-relation-to=archive.relation_to>
            <RichText content=archive.intro_content/>
            {(!docs.is_empty()).then(|| view! {
                <ul class="archive__items">
                    {docs
                        .into_iter()
                        .filter_map(|doc| {
                            let href = doc.href()?;
                            let label = doc
                                .value
                                .populated()
                                .and_then(|d| d.title.clone().or_else(|| d.slug.clone()))
                                .unwrap_or_else(|| href.clone());
                            Some(view! { <li><a href=href>{label}</a></li> })
                        })
                        .collect_view()}
                </ul>
            })}
        </div>
    }
}

fn form_field(field: FormField) -> AnyView {
    let label = field.label.clone().unwrap_or_else(|| field.name.clone());
    let id = format!("field-{}", field.name);

    let input = match field.field_type.as_str() {
        "textarea" => view! {
            <textarea id=id.clone() name=field.name required=field.required></textarea>
        }
        .into_any(),
        "checkbox" => view! {
            <input id=id.clone() type="checkbox" name=field.name required=field.required/>
        }
        .into_any(),
        kind => {
            let kind = match kind {
                "email" | "number" => kind.to_string(),
                _ => "text".to_string(),
            };
            view! { <input id=id.clone() type=kind name=field.name required=field.required/> }
                .into_any()
        }
    };

    view! {
        <div class="form__field">
            <label for=id>{label}</label>
            {input}
        </div>
    }
    .into_any()
}

fn form_view(form: Form) -> impl IntoView {
    let submit = form
        .submit_button_label
        .clone()
        .unwrap_or_else(|| "Submit".to_string());

    view! {
        <form class="form" data-form-id=form.id method="post">
            {form.fields.into_iter().map(form_field).collect_view()}
            <button type="submit">{submit}</button>
        </form>
    }
}

fn form_block(block: FormBlock) -> impl IntoView {
    let intro = block.intro_content.filter(|_| block.enable_intro);
    let form = block.form.as_ref().and_then(Relation::populated).cloned();

    view! {
        <div class="form-block">
            <RichText content=intro/>
            {form.map(form_view)}
        </div>
    }
}
