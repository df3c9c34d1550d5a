//! Form-to-API bridge.
//!
//! Mirrors the submit cycle of the service's index page: read the form's
//! fields, derive the endpoint from the form identifier, issue a GET, and
//! overwrite the bound display surface with the outcome. The binding table
//! is passed in explicitly so pages and transports can be swapped out.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::Result;

/// Pairing of a submittable form with its response container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    /// Form identifier; its prefix selects the endpoint.
    pub form: &'static str,
    /// Identifier of the surface results render into.
    pub container: &'static str,
}

/// The four bindings the stock page carries.
pub const BINDINGS: [Binding; 4] = [
    Binding {
        form: "src-form",
        container: "src-response",
    },
    Binding {
        form: "search-form",
        container: "search-response",
    },
    Binding {
        form: "download-links-form",
        container: "download-links-response",
    },
    Binding {
        form: "final-links-form",
        container: "final-links-response",
    },
];

/// Overwrite-only text display.
pub trait Surface: Send + Sync {
    /// Replace the displayed text. Never appends.
    fn set_text(&self, text: &str);
}

/// Page collaborator: which forms exist, and where results render.
pub trait Page: Send + Sync {
    /// Whether a form with this identifier is present.
    fn has_form(&self, id: &str) -> bool;
    /// Surface for the given container identifier.
    fn surface(&self, id: &str) -> Option<Arc<dyn Surface>>;
}

/// GET transport with fetch semantics: any completed exchange yields the
/// response body whatever the status code; an error means no response was
/// obtained at all.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Issue a GET for an origin-relative URL and return the body text.
    async fn get(&self, url: &str) -> Result<String>;
}

/// Endpoint path for a form identifier: the segment before the first
/// hyphen, or the whole identifier when it has none.
pub fn endpoint_for(form_id: &str) -> String {
    let prefix = form_id.split('-').next().unwrap_or(form_id);
    format!("/api/{}", prefix)
}

/// URL-encode field name/value pairs in order; repeated names are kept as
/// repeated parameters.
pub fn encode_fields(fields: &[(String, String)]) -> String {
    serde_urlencoded::to_string(fields).unwrap_or_default()
}

struct Bound {
    form: &'static str,
    surface: Arc<dyn Surface>,
}

/// Wires a binding list to a page and a transport.
pub struct FormBridge {
    bound: Vec<Bound>,
    fetch: Arc<dyn Fetch>,
}

impl FormBridge {
    /// Bind each configured form that exists on the page.
    ///
    /// A binding whose form or surface is missing is skipped silently;
    /// pages may carry any subset of the forms.
    pub fn attach(
        bindings: impl IntoIterator<Item = Binding>,
        page: &dyn Page,
        fetch: Arc<dyn Fetch>,
    ) -> Self {
        let bound = bindings
            .into_iter()
            .filter(|binding| page.has_form(binding.form))
            .filter_map(|binding| {
                let surface = page.surface(binding.container)?;
                Some(Bound {
                    form: binding.form,
                    surface,
                })
            })
            .collect();

        Self { bound, fetch }
    }

    /// Identifiers of the forms that were actually bound.
    pub fn bound_forms(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.bound.iter().map(|bound| bound.form)
    }

    /// Run one submit cycle for the named form.
    ///
    /// Unbound identifiers are ignored. The surface shows `Loading...`
    /// before the request goes out, then the pretty-printed JSON response
    /// or `Error: ` plus the failure's message. Overlapping calls for the
    /// same form race on the surface; whichever resolves last wins, as on
    /// the page. No timeout, no retry.
    pub async fn submit(&self, form_id: &str, fields: &[(String, String)]) {
        let Some(bound) = self.bound.iter().find(|b| b.form == form_id) else {
            return;
        };

        let url = format!("{}?{}", endpoint_for(form_id), encode_fields(fields));
        bound.surface.set_text("Loading...");

        let outcome = match self.fetch.get(&url).await {
            Ok(body) => match serde_json::from_str::<serde_json::Value>(&body) {
                Ok(value) => pretty(&value),
                Err(err) => format!("Error: {}", err),
            },
            Err(err) => format!("Error: {}", err),
        };

        bound.surface.set_text(&outcome);
    }
}

fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Shared text cell; the in-memory [`Surface`].
#[derive(Default)]
pub struct TextCell(Mutex<String>);

impl TextCell {
    /// Create an empty cell.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Current text.
    pub fn text(&self) -> String {
        self.0.lock().unwrap_or_else(|err| err.into_inner()).clone()
    }
}

impl Surface for TextCell {
    fn set_text(&self, text: &str) {
        *self.0.lock().unwrap_or_else(|err| err.into_inner()) = text.to_string();
    }
}

/// Page assembled from explicit form and surface registrations.
#[derive(Default)]
pub struct StaticPage {
    forms: Vec<String>,
    surfaces: HashMap<String, Arc<dyn Surface>>,
}

impl StaticPage {
    /// Create an empty page.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a form as present.
    pub fn add_form(&mut self, id: &str) {
        self.forms.push(id.to_string());
    }

    /// Register a surface under a container identifier.
    pub fn add_surface(&mut self, id: &str, surface: Arc<dyn Surface>) {
        self.surfaces.insert(id.to_string(), surface);
    }
}

impl Page for StaticPage {
    fn has_form(&self, id: &str) -> bool {
        self.forms.iter().any(|form| form == id)
    }

    fn surface(&self, id: &str) -> Option<Arc<dyn Surface>> {
        self.surfaces.get(id).map(Arc::clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    /// Replies with a scripted body and records what the surface showed
    /// at the moment the request went out.
    struct ScriptedFetch {
        reply: std::result::Result<String, String>,
        cell: Arc<TextCell>,
        requests: Mutex<Vec<String>>,
        observed: Mutex<Option<String>>,
    }

    impl ScriptedFetch {
        fn new(reply: std::result::Result<&str, &str>, cell: Arc<TextCell>) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.map(str::to_string).map_err(str::to_string),
                cell,
                requests: Mutex::new(Vec::new()),
                observed: Mutex::new(None),
            })
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }

        fn observed(&self) -> Option<String> {
            self.observed.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetch for ScriptedFetch {
        async fn get(&self, url: &str) -> Result<String> {
            self.requests.lock().unwrap().push(url.to_string());
            *self.observed.lock().unwrap() = Some(self.cell.text());
            self.reply.clone().map_err(Error::from)
        }
    }

    fn full_page() -> (StaticPage, HashMap<&'static str, Arc<TextCell>>) {
        let mut page = StaticPage::new();
        let mut cells = HashMap::new();
        for binding in BINDINGS {
            let cell = TextCell::new();
            page.add_form(binding.form);
            page.add_surface(binding.container, cell.clone());
            cells.insert(binding.form, cell);
        }
        (page, cells)
    }

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn endpoint_derivation() {
        assert_eq!(endpoint_for("src-form"), "/api/src");
        assert_eq!(endpoint_for("search-form"), "/api/search");
        assert_eq!(endpoint_for("download-links-form"), "/api/download");
        assert_eq!(endpoint_for("final-links-form"), "/api/final");
        assert_eq!(endpoint_for("plain"), "/api/plain");
    }

    #[test]
    fn encoding_rules() {
        assert_eq!(encode_fields(&[]), "");
        assert_eq!(
            encode_fields(&pairs(&[("query", "the matrix")])),
            "query=the+matrix"
        );
        assert_eq!(
            encode_fields(&pairs(&[("tag", "a"), ("tag", "b")])),
            "tag=a&tag=b"
        );
        assert_eq!(
            encode_fields(&pairs(&[("url", "https://x.y/?a=1&b=2")])),
            "url=https%3A%2F%2Fx.y%2F%3Fa%3D1%26b%3D2"
        );
    }

    #[test]
    fn attach_skips_absent_forms() {
        let mut page = StaticPage::new();
        let cell = TextCell::new();
        page.add_form("search-form");
        page.add_surface("search-response", cell.clone());

        let fetch = ScriptedFetch::new(Ok("{}"), cell);
        let bridge = FormBridge::attach(BINDINGS, &page, fetch);
        assert_eq!(bridge.bound_forms().collect::<Vec<_>>(), vec!["search-form"]);
    }

    #[tokio::test]
    async fn submit_to_unbound_form_is_a_noop() {
        let (page, cells) = full_page();
        let cell = cells["search-form"].clone();
        let fetch = ScriptedFetch::new(Ok("{}"), cell);
        let bridge = FormBridge::attach(BINDINGS, &page, fetch.clone());

        bridge.submit("unknown-form", &[]).await;
        assert!(fetch.requests().is_empty());
        for cell in cells.values() {
            assert_eq!(cell.text(), "");
        }
    }

    #[tokio::test]
    async fn loading_shows_before_the_request_resolves() {
        let (page, cells) = full_page();
        let cell = cells["search-form"].clone();
        let fetch = ScriptedFetch::new(Ok(r#"{"a":1}"#), cell);
        let bridge = FormBridge::attach(BINDINGS, &page, fetch.clone());

        bridge
            .submit("search-form", &pairs(&[("query", "dune")]))
            .await;

        assert_eq!(fetch.observed().as_deref(), Some("Loading..."));
        assert_eq!(fetch.requests(), vec!["/api/search?query=dune"]);
    }

    #[tokio::test]
    async fn success_pretty_prints_json() {
        let (page, cells) = full_page();
        let cell = cells["src-form"].clone();
        let fetch = ScriptedFetch::new(Ok(r#"{"a":1}"#), cell.clone());
        let bridge = FormBridge::attach(BINDINGS, &page, fetch);

        bridge.submit("src-form", &pairs(&[("query", "dune")])).await;
        assert_eq!(cell.text(), "{\n  \"a\": 1\n}");
    }

    #[tokio::test]
    async fn transport_failure_renders_error_text() {
        let (page, cells) = full_page();
        let cell = cells["download-links-form"].clone();
        let fetch = ScriptedFetch::new(Err("Failed to fetch"), cell.clone());
        let bridge = FormBridge::attach(BINDINGS, &page, fetch.clone());

        bridge
            .submit("download-links-form", &pairs(&[("url", "https://x")]))
            .await;

        assert_eq!(cell.text(), "Error: Failed to fetch");
        assert_eq!(
            fetch.requests(),
            vec!["/api/download?url=https%3A%2F%2Fx"]
        );
    }

    #[tokio::test]
    async fn non_json_body_renders_error_text() {
        let (page, cells) = full_page();
        let cell = cells["final-links-form"].clone();
        let fetch = ScriptedFetch::new(Ok("<html>not json</html>"), cell.clone());
        let bridge = FormBridge::attach(BINDINGS, &page, fetch);

        bridge.submit("final-links-form", &[]).await;
        assert!(cell.text().starts_with("Error: "));
    }

    #[tokio::test]
    async fn empty_fields_hit_the_endpoint_with_empty_query() {
        let (page, cells) = full_page();
        let cell = cells["final-links-form"].clone();
        let fetch = ScriptedFetch::new(Ok("{}"), cell);
        let bridge = FormBridge::attach(BINDINGS, &page, fetch.clone());

        bridge.submit("final-links-form", &[]).await;
        assert_eq!(fetch.requests(), vec!["/api/final?"]);
    }

    #[tokio::test]
    async fn each_submission_overwrites_the_surface() {
        let (page, cells) = full_page();
        let cell = cells["search-form"].clone();
        let fetch = ScriptedFetch::new(Ok(r#"{"b":2}"#), cell.clone());
        let bridge = FormBridge::attach(BINDINGS, &page, fetch);

        bridge.submit("search-form", &[]).await;
        let first = cell.text();
        bridge.submit("search-form", &[]).await;
        assert_eq!(cell.text(), first);
        assert_eq!(cell.text(), "{\n  \"b\": 2\n}");
    }
}
