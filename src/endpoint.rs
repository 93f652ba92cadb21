//! Composition of final request URLs from a root, a resource path and a query set.

use crate::{query::QueryParams, Error, Result};
use url::Url;

/// Ensures `root` ends with exactly one trailing `/`, so that resource paths
/// are resolved beneath it rather than replacing its last segment.
pub fn normalize_root(mut root: Url) -> Url {
    let trimmed = root.path().trim_end_matches('/').to_string();
    root.set_path(&format!("{trimmed}/"));
    root
}

/// Builds the URL for `resource_path`.
///
/// A single leading `/` is stripped from the path, so it always resolves
/// beneath `root`. Any query string embedded in the path is parsed and merged
/// with `query`; values from `query` win on collision. When the merged set is
/// empty the path is used unchanged.
///
/// # Errors
///
/// Returns [`Error::ConfigurationError`] for a relative path without a root,
/// and [`Error::InvalidUrl`] when the path cannot be resolved.
///
/// # Examples
///
/// ```
/// use restling::{endpoint::build_endpoint, query::QueryParams};
/// use url::Url;
///
/// let root = Url::parse("https://api.test/").unwrap();
/// let query: QueryParams = [("sort", "name")].into_iter().collect();
///
/// let url = build_endpoint(Some(&root), "/users?active=true", &query).unwrap();
/// assert_eq!(url.as_str(), "https://api.test/users?active=true&sort=name");
/// ```
pub fn build_endpoint(root: Option<&Url>, resource_path: &str, query: &QueryParams) -> Result<Url> {
    let path = resource_path.strip_prefix('/').unwrap_or(resource_path);

    let (bare_path, inline) = match path.split_once('?') {
        Some((bare, inline)) => (bare, QueryParams::parse(inline)),
        None => (path, QueryParams::new()),
    };

    let mut merged = inline;
    merged.merge(query);

    if merged.is_empty() {
        return resolve(root, path);
    }

    let mut url = resolve(root, bare_path)?;
    url.set_query(Some(&merged.to_query_string()));
    Ok(url)
}

fn resolve(root: Option<&Url>, path: &str) -> Result<Url> {
    match root {
        Some(root) => Ok(normalize_root(root.clone()).join(path)?),
        None => Url::parse(path).map_err(|err| match err {
            url::ParseError::RelativeUrlWithoutBase => Error::ConfigurationError(format!(
                "relative path `{path}` requires a root url"
            )),
            other => Error::InvalidUrl(other),
        }),
    }
}
