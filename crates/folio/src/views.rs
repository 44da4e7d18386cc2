//! Built-in views for a WordPress REST API upstream.
//!
//! Post and page payloads follow the `wp/v2` shape: `title.rendered`,
//! `content.rendered`, `excerpt.rendered` and `slug`. Rendered fields are
//! already HTML and are inserted as-is.

use async_trait::async_trait;
use folio_ssr::{
    DocumentRegistry, HeadTag, Loadable, RenderContext, RenderScope, View, ViewError,
    ViewRegistry,
};
use folio_ssr_core::{escape_html, DocumentContext, DocumentTemplate};
use futures_util::FutureExt;
use serde_json::Value;

const GLOBAL_STYLES: &str = "body{margin:0;font-family:system-ui,sans-serif;line-height:1.5}";

/// Views referenced by the built-in routes.
pub fn default_views() -> ViewRegistry {
    let mut views = ViewRegistry::new();
    views
        .register("home", HomeView)
        .register("post", PostView::new())
        .register("archive", ArchiveView)
        .register("page", PageView);
    views
}

/// Documents routes can select with `customDocument`.
pub fn default_documents() -> DocumentRegistry {
    let mut documents = DocumentRegistry::new();
    documents.register("bare", BareDocument);
    documents
}

fn rendered<'a>(item: &'a Value, field: &str) -> &'a str {
    item[field]["rendered"].as_str().unwrap_or_default()
}

fn first_item(ctx: &RenderContext) -> Result<&Value, ViewError> {
    match &ctx.data {
        Some(Value::Array(items)) => items
            .first()
            .ok_or_else(|| ViewError::new("upstream returned no items")),
        Some(item @ Value::Object(_)) => Ok(item),
        _ => Err(ViewError::new("view requires upstream data")),
    }
}

fn post_list(items: &[Value], scope: &mut RenderScope) -> String {
    if items.is_empty() {
        return "<p>No posts yet.</p>".to_string();
    }

    let class = scope.styles.insert("list-style:none;padding:0;");
    let entries: String = items
        .iter()
        .map(|item| {
            let slug = escape_html(item["slug"].as_str().unwrap_or_default());
            format!(
                "<li><a href=\"/posts/{slug}\">{}</a>{}</li>",
                rendered(item, "title"),
                rendered(item, "excerpt")
            )
        })
        .collect();

    format!("<ul class=\"{class}\">{entries}</ul>")
}

fn items(ctx: &RenderContext) -> &[Value] {
    ctx.data
        .as_ref()
        .and_then(Value::as_array)
        .map_or(&[], Vec::as_slice)
}

struct HomeView;

impl View for HomeView {
    fn render(&self, ctx: &RenderContext, scope: &mut RenderScope) -> Result<String, ViewError> {
        scope.styles.insert_global(GLOBAL_STYLES);
        scope.head.set_title("Home");
        scope
            .head
            .add_meta(HeadTag::new([("name", "viewport"), ("content", "width=device-width, initial-scale=1")]));

        let list = post_list(items(ctx), scope);
        Ok(format!("<main><h1>Latest posts</h1>{list}</main>"))
    }
}

/// A post with a lazily loaded share bar.
struct PostView {
    share_bar: Loadable<String>,
}

impl PostView {
    fn new() -> Self {
        Self {
            share_bar: Loadable::new("share-bar", || {
                async {
                    Ok::<_, ViewError>(concat!(
                        "<nav aria-label=\"Share\">",
                        "<a data-share=\"copy\" href=\"#\">Copy link</a>",
                        "</nav>"
                    )
                    .to_string())
                }
                .boxed()
            }),
        }
    }
}

#[async_trait]
impl View for PostView {
    async fn preload(&self, _ctx: &RenderContext) -> Result<(), ViewError> {
        self.share_bar.load().await.map(|_| ())
    }

    fn render(&self, ctx: &RenderContext, scope: &mut RenderScope) -> Result<String, ViewError> {
        let post = first_item(ctx)?;
        let title = rendered(post, "title");

        scope.styles.insert_global(GLOBAL_STYLES);
        let article = scope.styles.insert("max-width:42rem;margin:0 auto;padding:1rem;");
        scope.head.set_title_html(title);
        if let Some(slug) = ctx.params.get("slug") {
            scope.head.add_link(HeadTag::new([
                ("rel", "canonical".to_string()),
                ("href", format!("/posts/{slug}")),
            ]));
        }

        Ok(format!(
            "<article class=\"{article}\"><h1>{title}</h1>{}{}</article>",
            rendered(post, "content"),
            self.share_bar.get()?
        ))
    }
}

struct ArchiveView;

impl View for ArchiveView {
    fn render(&self, ctx: &RenderContext, scope: &mut RenderScope) -> Result<String, ViewError> {
        let slug = ctx.params.get("slug").map_or("", String::as_str);
        let page = ctx.params.get("page").map_or("1", String::as_str);

        scope.styles.insert_global(GLOBAL_STYLES);
        scope.head.set_title(format!("Category: {slug}"));

        let list = post_list(items(ctx), scope);
        Ok(format!(
            "<main><h1>{}</h1><p>Page {}</p>{list}</main>",
            escape_html(slug),
            escape_html(page)
        ))
    }
}

struct PageView;

impl View for PageView {
    fn render(&self, ctx: &RenderContext, scope: &mut RenderScope) -> Result<String, ViewError> {
        let page = first_item(ctx)?;
        let title = rendered(page, "title");

        scope.styles.insert_global(GLOBAL_STYLES);
        scope.head.set_title_html(title);

        Ok(format!(
            "<main><h1>{title}</h1>{}</main>",
            rendered(page, "content")
        ))
    }
}

/// Markup and styles only: no favicon, bootstrap data or client bundle.
struct BareDocument;

impl DocumentTemplate for BareDocument {
    fn render(&self, ctx: &DocumentContext<'_>) -> folio_ssr_core::Result<String> {
        Ok(format!(
            "<html lang=\"{}\"><head>{}<style>{}</style></head><body>{}</body></html>",
            escape_html(ctx.head.lang()),
            ctx.head.tags_markup(),
            ctx.css,
            ctx.markup
        ))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn ctx(data: Value, params: &[(&str, &str)]) -> RenderContext {
        RenderContext {
            data: Some(data),
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_post_view() {
        let view = PostView::new();
        let ctx = ctx(
            json!([{
                "slug": "hello-world",
                "title": {"rendered": "Hello World"},
                "content": {"rendered": "<p>Welcome</p>"}
            }]),
            &[("slug", "hello-world")],
        );
        let mut scope = RenderScope::default();

        view.preload(&ctx).await.unwrap();
        let html = view.render(&ctx, &mut scope).unwrap();

        assert!(html.contains("<h1>Hello World</h1><p>Welcome</p>"));
        assert!(html.contains("Copy link"));
        assert_eq!(scope.head.title.as_deref(), Some("Hello World"));
        assert!(scope.head.title_is_html);
        assert_eq!(scope.head.link.len(), 1);
    }

    #[test]
    fn test_post_view_requires_preload() {
        let view = PostView::new();
        let ctx = ctx(json!([{"title": {"rendered": "x"}}]), &[]);
        let mut scope = RenderScope::default();

        assert!(view.render(&ctx, &mut scope).is_err());
    }

    #[test]
    fn test_home_view_empty() {
        let ctx = ctx(json!([]), &[]);
        let mut scope = RenderScope::default();

        let html = HomeView.render(&ctx, &mut scope).unwrap();

        assert!(html.contains("No posts yet."));
    }

    #[test]
    fn test_home_view_lists_posts() {
        let ctx = ctx(
            json!([
                {"slug": "a", "title": {"rendered": "A"}, "excerpt": {"rendered": ""}},
                {"slug": "b\"", "title": {"rendered": "B"}, "excerpt": {"rendered": ""}}
            ]),
            &[],
        );
        let mut scope = RenderScope::default();

        let html = HomeView.render(&ctx, &mut scope).unwrap();

        assert!(html.contains("<a href=\"/posts/a\">A</a>"));
        assert!(html.contains("<a href=\"/posts/b&quot;\">B</a>"));
        assert_eq!(scope.styles.len(), 1);
    }

    #[test]
    fn test_archive_view_page_param() {
        let ctx = ctx(json!([]), &[("slug", "news"), ("page", "2")]);
        let mut scope = RenderScope::default();

        let html = ArchiveView.render(&ctx, &mut scope).unwrap();

        assert!(html.contains("<h1>news</h1><p>Page 2</p>"));
    }

    #[test]
    fn test_page_view_title_keeps_entities() {
        let ctx = ctx(
            json!([{
                "title": {"rendered": "It&#8217;s &amp; about"},
                "content": {"rendered": "<p>Us</p>"}
            }]),
            &[],
        );
        let mut scope = RenderScope::default();

        let html = PageView.render(&ctx, &mut scope).unwrap();

        assert!(html.contains("<h1>It&#8217;s &amp; about</h1>"));
        assert_eq!(
            scope.head.tags_markup(),
            "<title>It&#8217;s &amp; about</title>"
        );
    }

    #[test]
    fn test_page_view_without_data() {
        let mut scope = RenderScope::default();
        let error = PageView
            .render(&RenderContext::default(), &mut scope)
            .unwrap_err();

        assert_eq!(error.to_string(), "view requires upstream data");
    }

    #[test]
    fn test_default_registries() {
        let views = default_views();
        for id in ["home", "post", "archive", "page"] {
            assert!(views.contains(id), "missing view {id}");
        }
        assert!(default_documents().contains("bare"));
    }
}
