//! Identifier extraction from request paths.

/// Returns the resource-local identifier of `path` under `base_url`.
///
/// The empty string means "the collection". Paths that do not sit under
/// `base_url` degrade to the empty string instead of failing, and only the
/// first segment after the base is used:
///
/// ```
/// use tastyroot_core::extract_id;
///
/// assert_eq!(extract_id("/cats/7/toys", "/cats"), "7");
/// assert_eq!(extract_id("/cats/", "/cats"), "");
/// assert_eq!(extract_id("/dogs/7", "/cats"), "");
/// ```
pub fn extract_id<'a>(path: &'a str, base_url: &str) -> &'a str {
    let Some(rest) = path.strip_prefix(base_url) else {
        return "";
    };
    if rest.is_empty() {
        return "";
    }

    // "/catalog" is not under "/cat"; "/cats/" bases already end on a boundary.
    let rest = match rest.strip_prefix('/') {
        Some(rest) => rest,
        None if base_url.ends_with('/') => rest,
        None => return "",
    };
    rest.split('/').next().unwrap_or("")
}
