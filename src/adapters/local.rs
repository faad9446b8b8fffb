use crate::domain::ports::{ByteFetcher, FetchedBytes};
use crate::utils::error::{MenuError, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Reads the menu page and sheets from a local directory (mirror or export).
#[derive(Debug, Clone)]
pub struct LocalFetcher {
    base_path: PathBuf,
}

impl LocalFetcher {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }
}

impl ByteFetcher for LocalFetcher {
    fn resolve(&self, href: &str) -> Result<String> {
        // 網頁上的連結以 / 開頭，一律視為相對於基準目錄
        let mut full_path = self.base_path.clone();
        for component in Path::new(href.trim_start_matches('/')).components() {
            match component {
                Component::Normal(part) => full_path.push(part),
                Component::CurDir => {}
                _ => {
                    return Err(MenuError::FetchError {
                        locator: href.to_string(),
                        reason: "link leaves the base directory".to_string(),
                    })
                }
            }
        }
        Ok(full_path.to_string_lossy().into_owned())
    }

    fn fetch(&self, locator: &str) -> Result<FetchedBytes> {
        let to_fetch_error = |e: std::io::Error| MenuError::FetchError {
            locator: locator.to_string(),
            reason: e.to_string(),
        };

        let metadata = fs::metadata(locator).map_err(to_fetch_error)?;
        if !metadata.is_file() {
            return Err(MenuError::FetchError {
                locator: locator.to_string(),
                reason: "not a regular file".to_string(),
            });
        }

        let bytes = fs::read(locator).map_err(to_fetch_error)?;
        Ok(FetchedBytes {
            declared_size: Some(metadata.len()),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_joins_base_path() {
        let fetcher = LocalFetcher::new("/srv/menus");
        assert_eq!(fetcher.resolve("/sheets/mars.csv").unwrap(), "/srv/menus/sheets/mars.csv");
        assert_eq!(fetcher.resolve("avril.csv").unwrap(), "/srv/menus/avril.csv");
    }

    #[test]
    fn test_resolve_rejects_parent_links() {
        let fetcher = LocalFetcher::new("/srv/menus");
        for href in ["/../../etc/passwd", "sheets/../../secret.csv", ".."] {
            assert!(
                matches!(fetcher.resolve(href), Err(MenuError::FetchError { .. })),
                "expected {:?} to be rejected",
                href
            );
        }
        assert_eq!(fetcher.resolve("./mai.csv").unwrap(), "/srv/menus/mai.csv");
    }

    #[test]
    fn test_fetch_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("week.csv"), b"a,b,c").unwrap();

        let fetcher = LocalFetcher::new(temp_dir.path());
        let locator = fetcher.resolve("week.csv").unwrap();
        let fetched = fetcher.fetch(&locator).unwrap();

        assert_eq!(fetched.declared_size, Some(5));
        assert_eq!(fetched.bytes, b"a,b,c");
    }

    #[test]
    fn test_fetch_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = LocalFetcher::new(temp_dir.path());
        let locator = fetcher.resolve("missing.csv").unwrap();

        assert!(matches!(
            fetcher.fetch(&locator),
            Err(MenuError::FetchError { .. })
        ));
        assert!(matches!(
            fetcher.fetch(&temp_dir.path().to_string_lossy()),
            Err(MenuError::FetchError { .. })
        ));
    }
}
