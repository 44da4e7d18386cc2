//! The render state machine.
//!
//! `ResolvingRoute -> FetchingData -> PreloadingSubcomponents -> Rendering ->
//! ExtractingStyles -> AssemblingDocument -> Done`, failing with a
//! [`RenderError`] from any stage.

use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;

use folio_core::cache::CacheHandle;
use folio_core::fetch::{ensure_non_empty, DataFetcher};
use folio_core::routing::RouteTable;
use folio_ssr_core::{
    assemble, extract_critical, AssetManifest, Document, DocumentParts, DocumentRegistry,
    PipelineConfig,
};
use serde_json::Value;

use crate::error::{PipelineBuildError, RenderError, Result};
use crate::stage::Stage;
use crate::view::{RenderContext, RenderScope, ViewRegistry};

/// An incoming page request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub path: String,
    pub query: BTreeMap<String, String>,
}

impl PageRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: BTreeMap::new(),
        }
    }
}

/// Caching directive attached to a rendered page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheControl {
    pub max_age: u64,
}

impl CacheControl {
    pub fn new(max_age: u64) -> Self {
        Self { max_age }
    }

    pub fn header_value(&self) -> String {
        if self.max_age == 0 {
            "no-cache".to_string()
        } else {
            format!("max-age={}, must-revalidate, public", self.max_age)
        }
    }
}

/// Successful render output.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub document: Document,
    pub cache_control: CacheControl,
    /// Stages visited, in order, ending with [`Stage::Done`].
    pub stages: Vec<Stage>,
}

/// Renders pages. Shared read-only across requests; the cache handle is the
/// only shared mutable state it touches.
pub struct Pipeline {
    routes: RouteTable,
    views: ViewRegistry,
    documents: DocumentRegistry,
    fetcher: Arc<dyn DataFetcher>,
    cache: Option<CacheHandle>,
    manifest_path: Option<PathBuf>,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn builder(config: PipelineConfig, fetcher: Arc<dyn DataFetcher>) -> PipelineBuilder {
        PipelineBuilder {
            config,
            fetcher,
            routes: RouteTable::default(),
            views: ViewRegistry::new(),
            documents: DocumentRegistry::new(),
            cache: None,
            manifest_path: None,
        }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn cache(&self) -> Option<&CacheHandle> {
        self.cache.as_ref()
    }

    /// Runs one request through every stage.
    pub async fn render(&self, request: &PageRequest) -> Result<RenderedPage> {
        let mut stages = Vec::with_capacity(7);

        enter(&mut stages, Stage::ResolvingRoute, &request.path);
        let matched = self.routes.resolve(&request.path)?;
        let options = matched.options().clone();

        let view = self.views.get(matched.view()).ok_or_else(|| {
            RenderError::Render(format!("view {:?} is not registered", matched.view()))
        })?;

        let data = match matched.endpoint() {
            Some(endpoint) => {
                let url = self.config.api_url(&endpoint);
                Some(
                    self.fetch_data(&url, options.allow_empty_result, &mut stages, &request.path)
                        .await?,
                )
            }
            None => None,
        };

        let ctx = RenderContext {
            path: matched_path(&request.path).to_string(),
            params: matched.params.clone(),
            query: request.query.clone(),
            data,
            options,
        };

        enter(&mut stages, Stage::PreloadingSubcomponents, &request.path);
        view.preload(&ctx).await.map_err(RenderError::Preload)?;

        enter(&mut stages, Stage::Rendering, &request.path);
        let mut scope = RenderScope::default();
        let markup = match catch_unwind(AssertUnwindSafe(|| view.render(&ctx, &mut scope))) {
            Ok(Ok(markup)) => markup,
            Ok(Err(err)) => return Err(RenderError::Render(err.to_string())),
            Err(panic) => return Err(RenderError::Render(panic_message(panic.as_ref()))),
        };

        enter(&mut stages, Stage::ExtractingStyles, &request.path);
        let styles = extract_critical(&markup, &scope.styles);

        enter(&mut stages, Stage::AssemblingDocument, &request.path);
        let template = self.documents.get(ctx.options.custom_document.as_deref())?;
        let parts = DocumentParts {
            markup,
            styles,
            head: scope.head,
            bootstrap_data: ctx.data,
            client_script: self.client_script().await,
        };
        let document = assemble(parts, template, ctx.options.disable_doctype)?;

        enter(&mut stages, Stage::Done, &request.path);
        let max_age = ctx
            .options
            .cache_max_age
            .unwrap_or(self.config.cache_control_max_age);

        Ok(RenderedPage {
            document,
            cache_control: CacheControl::new(max_age),
            stages,
        })
    }

    /// Returns cached data for `url` or fetches it. Only successful fetches
    /// are cached.
    async fn fetch_data(
        &self,
        url: &str,
        allow_empty_result: bool,
        stages: &mut Vec<Stage>,
        path: &str,
    ) -> Result<Value> {
        if let Some(cache) = &self.cache {
            if let Some(value) = cache.get_json::<Value>(url).await {
                tracing::debug!(url, "Upstream cache hit");
                // Routes sharing an endpoint may disagree on empty results.
                return ensure_non_empty(value, allow_empty_result).map_err(|source| {
                    RenderError::Upstream {
                        url: url.to_string(),
                        source,
                    }
                });
            }
        }

        enter(stages, Stage::FetchingData, path);
        let value = self
            .fetcher
            .fetch(url, allow_empty_result)
            .await
            .map_err(|source| RenderError::Upstream {
                url: url.to_string(),
                source,
            })?;

        if let Some(cache) = &self.cache {
            cache.set_json(url, &value, None).await;
        }

        Ok(value)
    }

    /// Reads the asset manifest and looks up the client bundle. Failures are
    /// logged and the script is omitted.
    async fn client_script(&self) -> Option<String> {
        let path = self.manifest_path.as_ref()?;

        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "Failed to read asset manifest");
                return None;
            }
        };

        match AssetManifest::parse(&contents) {
            Ok(manifest) => {
                let script = manifest.get(&self.config.client_bundle).map(str::to_string);
                if script.is_none() {
                    tracing::warn!(
                        bundle = %self.config.client_bundle,
                        "Client bundle missing from asset manifest"
                    );
                }
                script
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "Failed to parse asset manifest");
                None
            }
        }
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("routes", &self.routes.len())
            .field("views", &self.views)
            .field("documents", &self.documents)
            .field("cache", &self.cache)
            .field("manifest_path", &self.manifest_path)
            .field("config", &self.config)
            .finish()
    }
}

fn enter(stages: &mut Vec<Stage>, stage: Stage, path: &str) {
    tracing::debug!(stage = %stage, path, "Render stage");
    stages.push(stage);
}

fn matched_path(path: &str) -> &str {
    path.split_once('?').map_or(path, |(path, _)| path)
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("view panicked: {message}")
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("view panicked: {message}")
    } else {
        "view panicked".to_string()
    }
}

/// Assembles a [`Pipeline`], validating routes against views and documents.
pub struct PipelineBuilder {
    config: PipelineConfig,
    fetcher: Arc<dyn DataFetcher>,
    routes: RouteTable,
    views: ViewRegistry,
    documents: DocumentRegistry,
    cache: Option<CacheHandle>,
    manifest_path: Option<PathBuf>,
}

impl PipelineBuilder {
    pub fn routes(mut self, routes: RouteTable) -> Self {
        self.routes = routes;
        self
    }

    pub fn views(mut self, views: ViewRegistry) -> Self {
        self.views = views;
        self
    }

    pub fn documents(mut self, documents: DocumentRegistry) -> Self {
        self.documents = documents;
        self
    }

    /// Cache for upstream responses, keyed by URL.
    pub fn cache(mut self, cache: CacheHandle) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn manifest_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest_path = Some(path.into());
        self
    }

    pub fn build(self) -> std::result::Result<Pipeline, PipelineBuildError> {
        for entry in self.routes.iter() {
            if !self.views.contains(entry.view()) {
                return Err(PipelineBuildError::UnknownView {
                    route: entry.pattern().to_string(),
                    view: entry.view().to_string(),
                });
            }
            if let Some(document) = &entry.options().custom_document {
                if !self.documents.contains(document) {
                    return Err(PipelineBuildError::UnknownDocument {
                        route: entry.pattern().to_string(),
                        document: document.clone(),
                    });
                }
            }
        }

        tracing::info!(
            routes = self.routes.len(),
            views = self.views.len(),
            cache = self.cache.as_ref().map(CacheHandle::name),
            "Render pipeline initialized"
        );

        Ok(Pipeline {
            routes: self.routes,
            views: self.views,
            documents: self.documents,
            fetcher: self.fetcher,
            cache: self.cache,
            manifest_path: self.manifest_path,
            config: self.config,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use folio_core::cache::Cache;
    use folio_core::fetch::{ensure_non_empty, FetchError};
    use folio_core::routing::{EndpointTemplate, RouteEntry, RouteOptions, RoutingError};
    use folio_ssr_core::{DocumentContext, DocumentTemplate};
    use futures_util::FutureExt;
    use serde_json::json;

    use super::*;
    use crate::loadable::Loadable;
    use crate::view::{View, ViewError};

    const SITE: &str = "https://example.com";

    #[derive(Default)]
    struct StubFetcher {
        responses: HashMap<String, Value>,
        calls: AtomicUsize,
    }

    impl StubFetcher {
        fn with(mut self, endpoint: &str, value: Value) -> Self {
            self.responses
                .insert(format!("{SITE}/wp-json/wp/v2/{endpoint}"), value);
            self
        }
    }

    #[async_trait]
    impl DataFetcher for StubFetcher {
        async fn fetch(
            &self,
            url: &str,
            allow_empty_result: bool,
        ) -> folio_core::fetch::Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.responses.get(url) {
                Some(value) => ensure_non_empty(value.clone(), allow_empty_result),
                None => Err(FetchError::Http {
                    status: 404,
                    status_text: "Not Found".to_string(),
                }),
            }
        }
    }

    #[derive(Default)]
    struct MapCache {
        entries: Mutex<HashMap<String, Vec<u8>>>,
    }

    #[async_trait]
    impl Cache for MapCache {
        async fn get(&self, key: &str) -> folio_core::cache::Result<Option<Vec<u8>>> {
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }

        async fn set(
            &self,
            key: &str,
            value: &[u8],
            _ttl: Option<Duration>,
        ) -> folio_core::cache::Result<()> {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_vec());
            Ok(())
        }

        async fn delete(&self, key: &str) -> folio_core::cache::Result<()> {
            self.entries.lock().unwrap().remove(key);
            Ok(())
        }

        async fn reset(&self) -> folio_core::cache::Result<()> {
            self.entries.lock().unwrap().clear();
            Ok(())
        }
    }

    struct HomeView;

    impl View for HomeView {
        fn render(&self, _ctx: &RenderContext, scope: &mut RenderScope) -> std::result::Result<String, ViewError> {
            scope.head.set_title("Home");
            Ok("<h1>Home</h1>".to_string())
        }
    }

    struct PostView {
        comments: Loadable<String>,
    }

    impl PostView {
        fn new() -> Self {
            Self {
                comments: Loadable::new("comments", || {
                    async { Ok::<_, ViewError>("<ul class=\"comments\"></ul>".to_string()) }.boxed()
                }),
            }
        }
    }

    #[async_trait]
    impl View for PostView {
        async fn preload(&self, _ctx: &RenderContext) -> std::result::Result<(), ViewError> {
            self.comments.load().await.map(|_| ())
        }

        fn render(&self, ctx: &RenderContext, scope: &mut RenderScope) -> std::result::Result<String, ViewError> {
            let title = ctx
                .data
                .as_ref()
                .and_then(|data| data[0]["title"].as_str())
                .ok_or_else(|| ViewError::new("post has no title"))?;
            scope.head.set_title(title);
            let class = scope.styles.insert("font-size:2rem;");
            let _unused = scope.styles.insert("color:blue;");
            Ok(format!(
                "<article><h1 class=\"{class}\">{title}</h1>{}</article>",
                self.comments.get()?
            ))
        }
    }

    struct PanickingView;

    impl View for PanickingView {
        fn render(&self, _ctx: &RenderContext, _scope: &mut RenderScope) -> std::result::Result<String, ViewError> {
            panic!("boom");
        }
    }

    struct PlainDocument;

    impl DocumentTemplate for PlainDocument {
        fn render(&self, ctx: &DocumentContext<'_>) -> folio_ssr_core::Result<String> {
            Ok(format!("<plain>{}</plain>", ctx.markup))
        }
    }

    fn views() -> ViewRegistry {
        let mut views = ViewRegistry::new();
        views
            .register("home", HomeView)
            .register("post", PostView::new())
            .register("boom", PanickingView);
        views
    }

    fn routes() -> RouteTable {
        RouteTable::new(vec![
            RouteEntry::new("/", "home").unwrap(),
            RouteEntry::new("/posts/:slug", "post")
                .unwrap()
                .with_endpoint(EndpointTemplate::parse("posts?slug={slug}").unwrap())
                .unwrap()
                .with_options(RouteOptions {
                    cache_max_age: Some(60),
                    ..Default::default()
                }),
            RouteEntry::new("/boom", "boom").unwrap(),
            RouteEntry::new("/plain", "home")
                .unwrap()
                .with_options(RouteOptions {
                    custom_document: Some("plain".to_string()),
                    disable_doctype: true,
                    ..Default::default()
                }),
        ])
    }

    fn fetcher() -> Arc<StubFetcher> {
        Arc::new(
            StubFetcher::default()
                .with("posts?slug=hello-world", json!([{"title": "Hello World"}]))
                .with("posts?slug=missing", json!([])),
        )
    }

    fn pipeline(fetcher: Arc<StubFetcher>) -> PipelineBuilder {
        let mut documents = DocumentRegistry::new();
        documents.register("plain", PlainDocument);

        Pipeline::builder(PipelineConfig::with_defaults(SITE).unwrap(), fetcher)
            .routes(routes())
            .views(views())
            .documents(documents)
    }

    #[tokio::test]
    async fn test_render_post_end_to_end() {
        let pipeline = pipeline(fetcher()).build().unwrap();

        let page = pipeline
            .render(&PageRequest::new("/posts/hello-world"))
            .await
            .unwrap();

        assert_eq!(
            page.stages,
            vec![
                Stage::ResolvingRoute,
                Stage::FetchingData,
                Stage::PreloadingSubcomponents,
                Stage::Rendering,
                Stage::ExtractingStyles,
                Stage::AssemblingDocument,
                Stage::Done,
            ]
        );

        let document = &page.document;
        assert!(document.markup.starts_with("<!doctype html>"));
        assert!(document.markup.contains("<title>Hello World</title>"));
        assert!(document.markup.contains("<ul class=\"comments\"></ul>"));
        assert!(document
            .markup
            .contains(r#"window.__BOOTSTRAP_DATA__ = [{"title":"Hello World"}]"#));
        assert_eq!(document.ids.len(), 1);
        assert!(document.css.contains("font-size:2rem;"));
        assert!(!document.css.contains("color:blue;"));
        assert_eq!(
            page.cache_control.header_value(),
            "max-age=60, must-revalidate, public"
        );
    }

    #[tokio::test]
    async fn test_route_without_endpoint_skips_fetch() {
        let fetcher = fetcher();
        let pipeline = pipeline(Arc::clone(&fetcher)).build().unwrap();

        let page = pipeline.render(&PageRequest::new("/")).await.unwrap();

        assert!(!page.stages.contains(&Stage::FetchingData));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
        assert!(!page.document.markup.contains("__BOOTSTRAP_DATA__"));
        assert_eq!(page.cache_control.header_value(), "no-cache");
    }

    #[tokio::test]
    async fn test_empty_upstream_is_404() {
        let pipeline = pipeline(fetcher()).build().unwrap();

        let error = pipeline
            .render(&PageRequest::new("/posts/missing"))
            .await
            .unwrap_err();

        assert!(matches!(
            &error,
            RenderError::Upstream {
                source: FetchError::EmptyResult,
                ..
            }
        ));
        assert_eq!(crate::render_error_to_status_code(&error), 404);
        assert_eq!(error.stage(), Stage::FetchingData);
    }

    #[tokio::test]
    async fn test_unknown_path_is_routing_error() {
        let pipeline = pipeline(fetcher()).build().unwrap();

        let error = pipeline
            .render(&PageRequest::new("/does-not-exist"))
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            RenderError::Routing(RoutingError::NoMatch { ref path }) if path == "/does-not-exist"
        ));
    }

    #[tokio::test]
    async fn test_cache_hit_skips_fetch_but_preloads() {
        let fetcher = fetcher();
        let cache = CacheHandle::new("api", Arc::new(MapCache::default()), Duration::from_secs(1));
        let pipeline = pipeline(Arc::clone(&fetcher))
            .cache(cache.clone())
            .build()
            .unwrap();
        let request = PageRequest::new("/posts/hello-world");

        let first = pipeline.render(&request).await.unwrap();
        let second = pipeline.render(&request).await.unwrap();

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert!(first.stages.contains(&Stage::FetchingData));
        assert!(!second.stages.contains(&Stage::FetchingData));
        assert!(second.stages.contains(&Stage::PreloadingSubcomponents));
        assert_eq!(first.document.markup, second.document.markup);

        let url = format!("{SITE}/wp-json/wp/v2/posts?slug=hello-world");
        assert!(cache.get(&url).await.is_some());
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let cache = CacheHandle::new("api", Arc::new(MapCache::default()), Duration::from_secs(1));
        let pipeline = pipeline(fetcher()).cache(cache.clone()).build().unwrap();

        assert!(pipeline
            .render(&PageRequest::new("/posts/missing"))
            .await
            .is_err());

        let url = format!("{SITE}/wp-json/wp/v2/posts?slug=missing");
        assert!(cache.get(&url).await.is_none());
    }

    #[tokio::test]
    async fn test_cached_empty_result_respects_route_policy() {
        let fetcher = Arc::new(StubFetcher::default().with("posts", json!([])));
        let cache = CacheHandle::new("api", Arc::new(MapCache::default()), Duration::from_secs(1));
        let shared = || EndpointTemplate::parse("posts").unwrap();
        let routes = RouteTable::new(vec![
            RouteEntry::new("/list", "home")
                .unwrap()
                .with_endpoint(shared())
                .unwrap()
                .with_options(RouteOptions {
                    allow_empty_result: true,
                    ..Default::default()
                }),
            RouteEntry::new("/strict", "home")
                .unwrap()
                .with_endpoint(shared())
                .unwrap(),
        ]);
        let pipeline = pipeline(Arc::clone(&fetcher))
            .routes(routes)
            .cache(cache)
            .build()
            .unwrap();

        pipeline.render(&PageRequest::new("/list")).await.unwrap();
        let error = pipeline
            .render(&PageRequest::new("/strict"))
            .await
            .unwrap_err();

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert!(matches!(
            &error,
            RenderError::Upstream {
                source: FetchError::EmptyResult,
                ..
            }
        ));
        assert_eq!(crate::render_error_to_status_code(&error), 404);
    }

    #[tokio::test]
    async fn test_panicking_view_is_render_error() {
        let pipeline = pipeline(fetcher()).build().unwrap();

        let error = pipeline
            .render(&PageRequest::new("/boom"))
            .await
            .unwrap_err();

        assert!(matches!(&error, RenderError::Render(message) if message.contains("boom")));
        assert_eq!(crate::render_error_to_status_code(&error), 500);
    }

    #[tokio::test]
    async fn test_custom_document_without_doctype() {
        let pipeline = pipeline(fetcher()).build().unwrap();

        let page = pipeline.render(&PageRequest::new("/plain")).await.unwrap();

        assert_eq!(page.document.markup, "<plain><h1>Home</h1></plain>");
    }

    #[tokio::test]
    async fn test_client_script_from_manifest() {
        let path = std::env::temp_dir().join(format!("folio-manifest-{}.json", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, r#"{"client.js": "/static/js/client.abc123.js"}"#)
            .await
            .unwrap();

        let pipeline = pipeline(fetcher()).manifest_path(&path).build().unwrap();
        let page = pipeline.render(&PageRequest::new("/")).await.unwrap();

        assert!(page
            .document
            .markup
            .contains(r#"<script defer src="/static/js/client.abc123.js"></script>"#));

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_manifest_is_not_fatal() {
        let path = std::env::temp_dir().join(format!("folio-missing-{}.json", uuid::Uuid::new_v4()));
        let pipeline = pipeline(fetcher()).manifest_path(path).build().unwrap();

        let page = pipeline.render(&PageRequest::new("/")).await.unwrap();

        assert!(!page.document.markup.contains("<script"));
    }

    #[test]
    fn test_build_rejects_unknown_view() {
        let routes = RouteTable::new(vec![RouteEntry::new("/x", "missing").unwrap()]);
        let result = pipeline(fetcher()).routes(routes).build();

        assert_eq!(
            result.unwrap_err(),
            PipelineBuildError::UnknownView {
                route: "/x".to_string(),
                view: "missing".to_string(),
            }
        );
    }

    #[test]
    fn test_build_rejects_unknown_document() {
        let routes = RouteTable::new(vec![RouteEntry::new("/x", "home")
            .unwrap()
            .with_options(RouteOptions {
                custom_document: Some("fancy".to_string()),
                ..Default::default()
            })]);
        let result = pipeline(fetcher()).routes(routes).build();

        assert!(matches!(
            result,
            Err(PipelineBuildError::UnknownDocument { document, .. }) if document == "fancy"
        ));
    }

    #[test]
    fn test_cache_control_header() {
        assert_eq!(CacheControl::new(0).header_value(), "no-cache");
        assert_eq!(
            CacheControl::new(300).header_value(),
            "max-age=300, must-revalidate, public"
        );
    }
}
