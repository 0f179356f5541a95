//! The page being recorded: its URL and its document

use dom::{DomArena, DomService};
use serde_json::Value;
use url::Url;

use crate::error::Result;

#[derive(Debug, Clone)]
pub struct Page {
    url: Url,
    document: DomArena,
}

impl Page {
    pub fn new(url: &str, document: DomArena) -> Result<Self> {
        Ok(Self {
            url: Url::parse(url)?,
            document,
        })
    }

    /// Build the page from a CDP `DOM.getDocument` response
    pub fn from_cdp(url: &str, dom_tree: &Value) -> Result<Self> {
        let mut service = DomService::new();
        service.parse_cdp_dom_tree(dom_tree)?;
        Self::new(url, service.into_arena())
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Host name, empty for host-less URLs (`file:`, `data:`, ...)
    pub fn hostname(&self) -> &str {
        self.url.host_str().unwrap_or("")
    }

    pub fn document(&self) -> &DomArena {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut DomArena {
        &mut self.document
    }

    /// Resolve an `href` attribute the way `HTMLAnchorElement.href` does.
    /// Unresolvable values come back unchanged.
    pub fn resolve_href(&self, href: &str) -> String {
        self.url
            .join(href)
            .map(String::from)
            .unwrap_or_else(|_| href.to_string())
    }
}
