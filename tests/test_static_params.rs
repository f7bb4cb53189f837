mod common;

use folio::db::models::PageStatus;
use folio::db::repository::PageWriter;
use folio::resolver::fetch_page_paths;
use folio::seed::save_page;

fn page(id: &str, title: &str, slug: &str, status: PageStatus) -> folio::db::models::Page {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "title": title,
        "slug": slug,
        "_status": status.as_str(),
        "layout": [{
            "blockType": "content",
            "columns": [{ "size": "full", "richText": title }],
        }],
    }))
    .unwrap()
}

#[tokio::test]
async fn enumerates_published_paths() {
    let env = common::TestEnv::start().await;
    env.seed().await;

    let mut paths = fetch_page_paths(env.store.as_ref(), &env.config).await.unwrap();
    paths.sort();

    assert_eq!(
        paths,
        vec![
            vec!["about".to_string()],
            vec!["about".to_string(), "team".to_string()],
            vec!["home".to_string()],
        ]
    );
}

#[tokio::test]
async fn excludes_reserved_slug() {
    let env = common::TestEnv::start().await;

    let cloud = page("cloud", "Cloud", "cloud", PageStatus::Published);
    save_page(env.store.as_ref(), cloud, None, None).await.unwrap();
    let pricing = page("pricing", "Pricing", "pricing", PageStatus::Published);
    save_page(env.store.as_ref(), pricing, None, None).await.unwrap();

    let paths = fetch_page_paths(env.store.as_ref(), &env.config).await.unwrap();
    assert_eq!(paths, vec![vec!["pricing".to_string()]]);
}

#[tokio::test]
async fn deleted_pages_disappear() {
    let env = common::TestEnv::start().await;
    env.seed().await;

    env.store.delete_page("seed-team").await.unwrap();

    let paths = fetch_page_paths(env.store.as_ref(), &env.config).await.unwrap();
    assert!(!paths.contains(&vec!["about".to_string(), "team".to_string()]));
}
