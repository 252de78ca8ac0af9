//! URL-like string decomposition for path rewriting.
//!
//! Paths handled by the server are usually relative (`/app/home?x=1#top`),
//! which `url::Url` refuses to parse without a base. Absolute URLs go
//! through `url`; everything else is split by hand.

use url::{ParseError, Url};

/// Components of a URL-like string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UrlParts {
    /// Scheme without the trailing `:`.
    pub scheme: Option<String>,
    /// Everything between `//` and the path of an absolute URL.
    /// May be empty (`file:///etc`). Always `None` without a scheme.
    pub authority: Option<String>,
    pub pathname: String,
    /// Query without the leading `?`.
    pub query: Option<String>,
    /// Fragment without the leading `#`.
    pub fragment: Option<String>,
}

impl UrlParts {
    /// Split `input` into parts. Returns `None` for strings that look
    /// absolute but are not valid URLs.
    pub fn parse(input: &str) -> Option<Self> {
        match Url::parse(input) {
            Ok(url) => Some(Self::from_absolute(&url)),
            Err(ParseError::RelativeUrlWithoutBase) => Some(Self::from_relative(input)),
            Err(_) => None,
        }
    }

    fn from_absolute(url: &Url) -> Self {
        let authority = url.has_authority().then(|| {
            let mut authority = String::new();
            if !url.username().is_empty() {
                authority.push_str(url.username());
                if let Some(password) = url.password() {
                    authority.push(':');
                    authority.push_str(password);
                }
                authority.push('@');
            }
            authority.push_str(url.host_str().unwrap_or(""));
            if let Some(port) = url.port() {
                authority.push(':');
                authority.push_str(&port.to_string());
            }
            authority
        });

        Self {
            scheme: Some(url.scheme().to_string()),
            authority,
            pathname: url.path().to_string(),
            query: url.query().map(str::to_string),
            fragment: url.fragment().map(str::to_string),
        }
    }

    fn from_relative(input: &str) -> Self {
        let (rest, fragment) = match input.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment.to_string())),
            None => (input, None),
        };
        let (rest, query) = match rest.split_once('?') {
            Some((rest, query)) => (rest, Some(query.to_string())),
            None => (rest, None),
        };

        // Without a scheme a leading `//` stays part of the path
        Self {
            scheme: None,
            authority: None,
            pathname: rest.to_string(),
            query,
            fragment,
        }
    }

    /// Host portion of the authority, without credentials or port.
    /// `None` when there is no authority or it names no host.
    pub fn hostname(&self) -> Option<&str> {
        let authority = self.authority.as_deref()?;
        let host = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
        let host = if host.starts_with('[') {
            // IPv6 literal keeps its colons
            host.split_once(']').map_or(host, |(inner, _)| inner).trim_start_matches('[')
        } else {
            host.split_once(':').map_or(host, |(name, _)| name)
        };
        (!host.is_empty()).then_some(host)
    }

    /// Reassemble the parts into a string.
    pub fn format(&self) -> String {
        let mut out = String::new();
        if let Some(scheme) = &self.scheme {
            out.push_str(scheme);
            out.push(':');
        }
        if let Some(authority) = &self.authority {
            out.push_str("//");
            out.push_str(authority);
        }
        out.push_str(&self.pathname);
        if let Some(query) = &self.query {
            out.push('?');
            out.push_str(query);
        }
        if let Some(fragment) = &self.fragment {
            out.push('#');
            out.push_str(fragment);
        }
        out
    }
}

/// Parse `input`, let `block` edit the parts, and serialize them back.
///
/// The input is returned untouched when it cannot be parsed or when `block`
/// makes no change, so unrelated URLs are never re-normalized.
pub fn modify_url(input: &str, block: impl FnOnce(&mut UrlParts)) -> String {
    let Some(original) = UrlParts::parse(input) else {
        return input.to_string();
    };

    let mut parts = original.clone();
    block(&mut parts);

    if parts == original {
        input.to_string()
    } else {
        parts.format()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_path_with_query_and_fragment() {
        let parts = UrlParts::parse("/app/home?x=1&y=2#top").unwrap();
        assert_eq!(parts.scheme, None);
        assert_eq!(parts.authority, None);
        assert_eq!(parts.pathname, "/app/home");
        assert_eq!(parts.query.as_deref(), Some("x=1&y=2"));
        assert_eq!(parts.fragment.as_deref(), Some("top"));
        assert_eq!(parts.format(), "/app/home?x=1&y=2#top");
    }

    #[test]
    fn question_mark_inside_fragment_stays_in_fragment() {
        let parts = UrlParts::parse("/a#b?c").unwrap();
        assert_eq!(parts.pathname, "/a");
        assert_eq!(parts.query, None);
        assert_eq!(parts.fragment.as_deref(), Some("b?c"));
    }

    #[test]
    fn leading_double_slash_without_scheme_is_a_path() {
        let parts = UrlParts::parse("//cdn.example.com/lib.js?v=1").unwrap();
        assert_eq!(parts.authority, None);
        assert_eq!(parts.hostname(), None);
        assert_eq!(parts.pathname, "//cdn.example.com/lib.js");
        assert_eq!(parts.query.as_deref(), Some("v=1"));
        assert_eq!(parts.format(), "//cdn.example.com/lib.js?v=1");
    }

    #[test]
    fn absolute_url_has_host() {
        let parts = UrlParts::parse("https://user:pw@example.com:8443/a?b#c").unwrap();
        assert_eq!(parts.scheme.as_deref(), Some("https"));
        assert_eq!(parts.authority.as_deref(), Some("user:pw@example.com:8443"));
        assert_eq!(parts.hostname(), Some("example.com"));
        assert_eq!(parts.pathname, "/a");
        assert_eq!(parts.query.as_deref(), Some("b"));
        assert_eq!(parts.fragment.as_deref(), Some("c"));
    }

    #[test]
    fn ipv6_hostname() {
        let parts = UrlParts::parse("http://[::1]:5601/app").unwrap();
        assert_eq!(parts.hostname(), Some("::1"));
    }

    #[test]
    fn file_url_has_empty_authority() {
        let parts = UrlParts::parse("file:///etc/hosts").unwrap();
        assert_eq!(parts.authority.as_deref(), Some(""));
        assert_eq!(parts.hostname(), None);
        assert_eq!(parts.pathname, "/etc/hosts");
    }

    #[test]
    fn invalid_absolute_url_does_not_parse() {
        assert!(UrlParts::parse("http://example.com:99999/").is_none());
    }

    #[test]
    fn unchanged_parts_return_input_verbatim() {
        // `url` would normalize this to "http://example.com/"
        assert_eq!(modify_url("http://example.com", |_| {}), "http://example.com");
    }

    #[test]
    fn modified_pathname_is_reassembled() {
        let out = modify_url("/s/marketing/app?x=1", |parts| {
            parts.pathname = "/app".into();
        });
        assert_eq!(out, "/app?x=1");
    }

    #[test]
    fn unparseable_input_passes_through() {
        let out = modify_url("http://example.com:99999/", |parts| {
            parts.pathname = "/changed".into();
        });
        assert_eq!(out, "http://example.com:99999/");
    }
}
