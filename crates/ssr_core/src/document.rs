//! Document templates and assembly of the final page markup.

use std::collections::HashMap;
use std::sync::Arc;

use askama::Template;

use crate::config::BootstrapPayload;
use crate::error::{Result, SsrCoreError};
use crate::head::HeadMetadata;
use crate::styles::CriticalStyles;

const DOCTYPE: &str = "<!doctype html>";

/// Everything a render produced, before it is wrapped in a document.
#[derive(Debug, Clone, Default)]
pub struct DocumentParts {
    /// Markup of the rendered view.
    pub markup: String,
    pub styles: CriticalStyles,
    pub head: HeadMetadata,
    /// Data the client needs to hydrate; `None` and `null` are omitted.
    pub bootstrap_data: Option<serde_json::Value>,
    /// URL of the client bundle, when an asset manifest provided one.
    pub client_script: Option<String>,
}

/// Inputs handed to a [`DocumentTemplate`].
#[derive(Debug, Clone, Copy)]
pub struct DocumentContext<'a> {
    pub markup: &'a str,
    pub css: &'a str,
    pub ids: &'a [String],
    pub head: &'a HeadMetadata,
    /// Bootstrap data already serialized and escaped for a `<script>` element.
    pub bootstrap_json: Option<&'a str>,
    pub client_script: Option<&'a str>,
}

/// Produces the `<html>` element around a rendered view.
pub trait DocumentTemplate: Send + Sync {
    fn render(&self, ctx: &DocumentContext<'_>) -> Result<String>;
}

#[derive(Template)]
#[template(path = "document.html")]
struct DefaultDocumentTemplate<'a> {
    lang: &'a str,
    html_attributes: String,
    head_tags: String,
    css: &'a str,
    markup: &'a str,
    bootstrap_data: Option<&'a str>,
    client_script: Option<&'a str>,
}

/// The built-in document.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDocument;

impl DocumentTemplate for DefaultDocument {
    fn render(&self, ctx: &DocumentContext<'_>) -> Result<String> {
        DefaultDocumentTemplate {
            lang: ctx.head.lang(),
            html_attributes: ctx.head.html_attributes_markup(),
            head_tags: ctx.head.tags_markup(),
            css: ctx.css,
            markup: ctx.markup,
            bootstrap_data: ctx.bootstrap_json,
            client_script: ctx.client_script,
        }
        .render()
        .map_err(|e| SsrCoreError::Template(e.to_string()))
    }
}

/// An assembled page. Consumed once, by writing [`Document::markup`] out.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Markup of the rendered view alone.
    pub html: String,
    pub css: String,
    pub ids: Vec<String>,
    pub head: HeadMetadata,
    pub bootstrap_data: Option<BootstrapPayload>,
    /// The complete page.
    pub markup: String,
}

impl Document {
    pub fn into_markup(self) -> String {
        self.markup
    }
}

/// Wraps render output in `template`, prefixing the doctype unless disabled.
pub fn assemble(
    parts: DocumentParts,
    template: &dyn DocumentTemplate,
    disable_doctype: bool,
) -> Result<Document> {
    let bootstrap_data = parts
        .bootstrap_data
        .filter(|data| !data.is_null())
        .map(BootstrapPayload::new)
        .transpose()?;
    let bootstrap_json = bootstrap_data
        .as_ref()
        .map(BootstrapPayload::to_script_json)
        .transpose()?;

    let body = template.render(&DocumentContext {
        markup: &parts.markup,
        css: &parts.styles.css,
        ids: &parts.styles.ids,
        head: &parts.head,
        bootstrap_json: bootstrap_json.as_deref(),
        client_script: parts.client_script.as_deref(),
    })?;

    let markup = if disable_doctype {
        body
    } else {
        format!("{DOCTYPE}{body}")
    };

    Ok(Document {
        html: parts.markup,
        css: parts.styles.css,
        ids: parts.styles.ids,
        head: parts.head,
        bootstrap_data,
        markup,
    })
}

/// Named document templates a route can select instead of the default.
#[derive(Clone)]
pub struct DocumentRegistry {
    default: Arc<dyn DocumentTemplate>,
    documents: HashMap<String, Arc<dyn DocumentTemplate>>,
}

impl Default for DocumentRegistry {
    fn default() -> Self {
        Self {
            default: Arc::new(DefaultDocument),
            documents: HashMap::new(),
        }
    }
}

impl DocumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        id: impl Into<String>,
        document: impl DocumentTemplate + 'static,
    ) -> &mut Self {
        self.documents.insert(id.into(), Arc::new(document));
        self
    }

    pub fn contains(&self, id: &str) -> bool {
        self.documents.contains_key(id)
    }

    /// Looks up `custom` or falls back to the default document.
    pub fn get(&self, custom: Option<&str>) -> Result<&dyn DocumentTemplate> {
        match custom {
            None => Ok(self.default.as_ref()),
            Some(id) => self
                .documents
                .get(id)
                .map(|document| document.as_ref())
                .ok_or_else(|| SsrCoreError::UnknownDocument(id.to_string())),
        }
    }
}

impl std::fmt::Debug for DocumentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<_> = self.documents.keys().collect();
        ids.sort();
        f.debug_struct("DocumentRegistry")
            .field("documents", &ids)
            .finish()
    }
}
