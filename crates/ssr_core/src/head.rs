//! Per-request head metadata collected while a view renders.

use serde::Serialize;

use crate::escape::escape_html;

/// An element in `<head>` described by its attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HeadTag {
    pub attributes: Vec<(String, String)>,
}

impl HeadTag {
    pub fn new<K, V>(attributes: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            attributes: attributes
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    fn render_attributes(&self) -> String {
        render_attributes(&self.attributes)
    }
}

/// Title, attributes and tags a view wants in the document head.
///
/// Owned by a single render, so concurrent requests never see each other's
/// metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HeadMetadata {
    pub html_attributes: Vec<(String, String)>,
    pub title: Option<String>,
    /// The title is already HTML text, with character references intact.
    pub title_is_html: bool,
    pub base: Option<HeadTag>,
    pub meta: Vec<HeadTag>,
    pub link: Vec<HeadTag>,
    pub script: Vec<HeadTag>,
}

impl HeadMetadata {
    pub fn set_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = Some(title.into());
        self.title_is_html = false;
        self
    }

    /// Sets a title that is already HTML text, such as a WordPress
    /// `title.rendered` field. Character references like `&#8217;` are kept;
    /// only markup is neutralized.
    pub fn set_title_html(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = Some(title.into());
        self.title_is_html = true;
        self
    }

    /// Sets an attribute on `<html>`, replacing a previous value for the name.
    pub fn set_html_attribute(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        let name = name.into();
        let value = value.into();
        match self.html_attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(existing) => existing.1 = value,
            None => self.html_attributes.push((name, value)),
        }
        self
    }

    pub fn set_base(&mut self, tag: HeadTag) -> &mut Self {
        self.base = Some(tag);
        self
    }

    pub fn add_meta(&mut self, tag: HeadTag) -> &mut Self {
        self.meta.push(tag);
        self
    }

    pub fn add_link(&mut self, tag: HeadTag) -> &mut Self {
        self.link.push(tag);
        self
    }

    pub fn add_script(&mut self, tag: HeadTag) -> &mut Self {
        self.script.push(tag);
        self
    }

    /// Attributes for the `<html>` element, with a leading space when non-empty.
    /// `lang` is written by the document itself and is skipped here.
    pub fn html_attributes_markup(&self) -> String {
        let attributes: Vec<_> = self
            .html_attributes
            .iter()
            .filter(|(name, _)| name != "lang")
            .cloned()
            .collect();
        render_attributes(&attributes)
    }

    /// Language for `<html lang>`, defaulting to `en`.
    pub fn lang(&self) -> &str {
        self.html_attributes
            .iter()
            .find(|(name, _)| name == "lang")
            .map_or("en", |(_, value)| value.as_str())
    }

    /// Renders title, base, meta, link and script tags in that order.
    pub fn tags_markup(&self) -> String {
        let mut out = String::new();

        if let Some(title) = &self.title {
            out.push_str("<title>");
            if self.title_is_html {
                out.push_str(&title.replace('<', "&lt;").replace('>', "&gt;"));
            } else {
                out.push_str(&escape_html(title));
            }
            out.push_str("</title>");
        }
        if let Some(base) = &self.base {
            out.push_str(&format!("<base{}>", base.render_attributes()));
        }
        for tag in &self.meta {
            out.push_str(&format!("<meta{}>", tag.render_attributes()));
        }
        for tag in &self.link {
            out.push_str(&format!("<link{}>", tag.render_attributes()));
        }
        for tag in &self.script {
            out.push_str(&format!("<script{}></script>", tag.render_attributes()));
        }

        out
    }
}

fn render_attributes(attributes: &[(String, String)]) -> String {
    attributes
        .iter()
        .map(|(name, value)| format!(" {}=\"{}\"", escape_html(name), escape_html(value)))
        .collect()
}
