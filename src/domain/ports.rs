use crate::utils::error::Result;

/// Raw bytes of a fetched source with the size announced by the transport.
#[derive(Debug, Clone)]
pub struct FetchedBytes {
    pub declared_size: Option<u64>,
    pub bytes: Vec<u8>,
}

/// Retrieves raw bytes for a locator (URL or file path).
pub trait ByteFetcher: Send + Sync {
    /// Turns a link found in the upstream document into an absolute locator.
    fn resolve(&self, href: &str) -> Result<String>;

    fn fetch(&self, locator: &str) -> Result<FetchedBytes>;
}

/// Decodes spreadsheet bytes into a grid of string cells.
pub trait GridDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8], encoding: &str) -> Result<Vec<Vec<String>>>;
}

/// Extracts `(label, href)` pairs from the upstream document.
pub trait LinkLister: Send + Sync {
    fn list_links(&self, document: &str) -> Result<Vec<(String, String)>>;
}
