//! Image URL rewriting.
//!
//! Markup refers to images by file path, relative to the markup directory.
//! [`UrlInterceptor`] turns those references into `image://<provider>/<id>`
//! URLs so they load through a registered [`ImageProvider`] rather than the
//! filesystem, with `<id>` relative to the root of the resource provider.
//!
//! [`ImageProvider`]: crate::image::ImageProvider

/// Provider name used when none is configured.
pub const DEFAULT_PROVIDER: &str = "nya_provider";

const IMAGE_SCHEME: &str = "image://";

/// What a URL is about to be used for.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum UrlKind {
    /// A string property such as an image `source`.
    UrlString,
    /// A markup document to load.
    MarkupFile,
    ScriptFile,
    /// A directory index listing importable documents.
    IndexFile,
}

/// Rewrites image URLs to address a named image provider.
#[derive(Debug, Clone)]
pub struct UrlInterceptor {
    base: String,
    provider: String,
    extensions: Vec<String>,
}

impl Default for UrlInterceptor {
    fn default() -> Self {
        Self::new()
    }
}

impl UrlInterceptor {
    pub fn new() -> Self {
        Self {
            base: "/".to_string(),
            provider: DEFAULT_PROVIDER.to_string(),
            extensions: vec!["png".to_string()],
        }
    }

    pub fn with_provider(mut self, name: impl Into<String>) -> Self {
        self.provider = name.into();
        self
    }

    /// Replaces the recognized extensions (matched exactly, no dot).
    pub fn with_extensions<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = exts
            .into_iter()
            .map(|e| e.into().trim_start_matches('.').to_string())
            .collect();
        self
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Records the directory image paths are resolved against and stripped of.
    ///
    /// Stored as `"/" + dir` with repeated leading slashes collapsed, so both
    /// `root` and `/root` record `/root`.
    pub fn set_base_url(&mut self, dir: &str) {
        let dir = dir.replace('\\', "/");
        let trimmed = dir.trim_start_matches('/').trim_end_matches('/');
        self.base = format!("/{trimmed}");
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// Rewrites `url` if it names an image under the base URL.
    ///
    /// Anything else is returned unchanged: other kinds, `image://` URLs, URLs
    /// not ending in a recognized extension and paths outside the base.
    pub fn intercept(&self, url: &str, kind: UrlKind) -> String {
        if kind != UrlKind::UrlString || !self.is_image(url) {
            return url.to_string();
        }

        let Some(path) = self.absolute_path(url) else {
            return url.to_string();
        };

        match self.strip_base(&path) {
            Some(rel) => {
                let rewritten = format!("{IMAGE_SCHEME}{}/{rel}", self.provider);
                log::debug!("url: {url} -> {rewritten}");
                rewritten
            }
            None => {
                log::warn!("url: {url} is outside base {}; left unchanged", self.base);
                url.to_string()
            }
        }
    }

    /// The whole URL must end in `.<ext>`; a query or fragment after the
    /// extension means no match.
    fn is_image(&self, url: &str) -> bool {
        let Some((_, ext)) = url.rsplit_once('.') else {
            return false;
        };
        !ext.contains('/') && self.extensions.iter().any(|e| e == ext)
    }

    /// Absolute path of `url`: the path after the host for `scheme://host/path`
    /// URLs, the URL itself for absolute paths, or the URL resolved against the
    /// base. `None` for `image://` URLs and hosts without a path.
    fn absolute_path(&self, url: &str) -> Option<String> {
        if url.starts_with(IMAGE_SCHEME) {
            return None;
        }
        if let Some((_, rest)) = url.split_once("://") {
            // `file:///path` has an empty host.
            return rest.find('/').map(|i| rest[i..].to_string());
        }
        if url.starts_with('/') {
            return Some(url.to_string());
        }
        let rel = url.trim_start_matches("./");
        Some(if self.base == "/" {
            format!("/{rel}")
        } else {
            format!("{}/{rel}", self.base)
        })
    }

    /// Path relative to the base, without a leading slash. The base must be a
    /// prefix ending on a path boundary.
    fn strip_base<'p>(&self, path: &'p str) -> Option<&'p str> {
        let rest = path.strip_prefix(self.base.as_str())?;
        let rest = if self.base == "/" {
            rest
        } else {
            rest.strip_prefix('/')?
        };
        (!rest.is_empty()).then_some(rest)
    }
}

/// Splits `image://<provider>/<id>` into `(provider, id)`.
pub fn parse_image_url(url: &str) -> Option<(&str, &str)> {
    let rest = url.strip_prefix(IMAGE_SCHEME)?;
    let (provider, id) = rest.split_once('/')?;
    (!provider.is_empty() && !id.is_empty()).then_some((provider, id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rooted(base: &str) -> UrlInterceptor {
        let mut i = UrlInterceptor::new();
        i.set_base_url(base);
        i
    }

    // ── base url ──────────────────────────────────────────────────────────

    #[test]
    fn base_url_collapses_leading_slashes() {
        assert_eq!(rooted("root").base_url(), "/root");
        assert_eq!(rooted("/root").base_url(), "/root");
        assert_eq!(rooted("//root/ui/").base_url(), "/root/ui");
        assert_eq!(UrlInterceptor::new().base_url(), "/");
    }

    // ── rewriting ─────────────────────────────────────────────────────────

    #[test]
    fn strips_base_and_addresses_provider() {
        let i = rooted("/root");
        assert_eq!(i.intercept("/root/tex/a.png", UrlKind::UrlString), "image://nya_provider/tex/a.png");
        assert_eq!(i.intercept("file:///root/tex/a.png", UrlKind::UrlString), "image://nya_provider/tex/a.png");
    }

    #[test]
    fn relative_paths_resolve_against_base() {
        let i = rooted("/root/ui");
        assert_eq!(i.intercept("images/logo.png", UrlKind::UrlString), "image://nya_provider/images/logo.png");
        assert_eq!(i.intercept("./logo.png", UrlKind::UrlString), "image://nya_provider/logo.png");
    }

    #[test]
    fn custom_provider_and_extensions() {
        let i = UrlInterceptor::new().with_provider("assets").with_extensions([".jpg", "png"]);
        assert_eq!(i.intercept("/a/b.jpg", UrlKind::UrlString), "image://assets/a/b.jpg");
        assert_eq!(i.intercept("/a/b.png", UrlKind::UrlString), "image://assets/a/b.png");
    }

    #[test]
    fn extension_match_is_exact() {
        let i = rooted("/root");
        for url in ["/root/tex/A.PNG", "/root/tex/a.Png", "/root/tex/a.png?v=1", "/root/tex/a.png#top"] {
            assert_eq!(i.intercept(url, UrlKind::UrlString), url);
        }
    }

    // ── pass-through ──────────────────────────────────────────────────────

    #[test]
    fn non_image_urls_pass_unchanged() {
        let i = rooted("/root");
        for url in ["/root/main.mkml", "/root/tex/a.png.bak", "/root/dir.png/file", "/root/noext"] {
            assert_eq!(i.intercept(url, UrlKind::UrlString), url);
        }
    }

    #[test]
    fn other_kinds_pass_unchanged() {
        let i = rooted("/root");
        assert_eq!(i.intercept("/root/a.png", UrlKind::MarkupFile), "/root/a.png");
        assert_eq!(i.intercept("/root/a.png", UrlKind::IndexFile), "/root/a.png");
    }

    #[test]
    fn other_schemes_rewrite_by_path() {
        let i = rooted("/root");
        assert_eq!(i.intercept("http://host/root/a.png", UrlKind::UrlString), "image://nya_provider/a.png");
        assert_eq!(i.intercept("https://x.org/other/a.png", UrlKind::UrlString), "https://x.org/other/a.png");
        assert_eq!(i.intercept("https://x.org", UrlKind::UrlString), "https://x.org");
    }

    #[test]
    fn image_urls_are_not_rewritten_twice() {
        let i = rooted("/");
        assert_eq!(i.intercept("image://p/a.png", UrlKind::UrlString), "image://p/a.png");
    }

    #[test]
    fn paths_outside_base_are_not_rewritten() {
        let i = rooted("/root/ui");
        // Shorter than the base.
        assert_eq!(i.intercept("/a.png", UrlKind::UrlString), "/a.png");
        // Shares a prefix but not a path boundary.
        assert_eq!(i.intercept("/root/uix/a.png", UrlKind::UrlString), "/root/uix/a.png");
    }

    // ── parse_image_url ───────────────────────────────────────────────────

    #[test]
    fn parse_splits_provider_and_id() {
        assert_eq!(parse_image_url("image://nya_provider/tex/a.png"), Some(("nya_provider", "tex/a.png")));
        assert_eq!(parse_image_url("image://nya_provider/"), None);
        assert_eq!(parse_image_url("file:///a.png"), None);
    }
}
