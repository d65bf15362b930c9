//! Route pattern compilation and matching.
//!
//! A path template mixes literal text with `{name}` placeholders, each
//! matching one or more non-slash characters. Templates compile to anchored
//! regexes with named capture groups at registration time; matching a path
//! extracts the captured parameters in template declaration order.

use std::fmt;
use std::fmt::Write as _;

use once_cell::sync::Lazy;
use regex::Regex;

use trellis_core::{TrellisError, TrellisResult};

/// Matches a `{name}` placeholder whose name is a valid identifier.
/// Braced segments with invalid names (e.g. `{1x}`) stay literal text.
static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder regex is valid"));

/// Parameters extracted from a matched path, in template declaration order.
///
/// Contains exactly the named placeholders of the matched template: no
/// extras, none missing.
///
/// # Examples
///
/// ```
/// use trellis_http::routing::pattern::RoutePattern;
///
/// let pattern = RoutePattern::compile("/post/{year}/{slug}").unwrap();
/// let params = pattern.matches("/post/2024/hello-world").unwrap();
/// assert_eq!(params.len(), 2);
/// assert_eq!(params.get("year"), Some("2024"));
/// assert_eq!(params.get("slug"), Some("hello-world"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(Vec<(String, String)>);

impl PathParams {
    /// Creates an empty parameter mapping.
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Returns the value for the named parameter, or `None` if absent.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the number of parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no parameters were captured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Returns the parameter names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(n, _)| n.as_str())
    }

    fn push(&mut self, name: &str, value: &str) {
        self.0.push((name.to_string(), value.to_string()));
    }
}

/// A compiled route pattern.
///
/// Built from a path template at registration time. The template is
/// normalized to a single leading slash with trailing slashes trimmed, then
/// `{name}` placeholders become named captures matching `[^/]+`. Everything
/// else passes through into the regex verbatim, and the result is anchored
/// at both ends.
#[derive(Clone)]
pub struct RoutePattern {
    template: String,
    regex: Regex,
    param_names: Vec<String>,
}

impl fmt::Debug for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutePattern")
            .field("template", &self.template)
            .field("regex", &self.regex.as_str())
            .field("param_names", &self.param_names)
            .finish()
    }
}

impl RoutePattern {
    /// Compiles a path template into a matchable pattern.
    ///
    /// # Errors
    ///
    /// Returns [`TrellisError::EmptyRoutePath`] for an empty template, and
    /// [`TrellisError::ImproperlyConfigured`] when the resulting regex is
    /// invalid (for example, duplicate placeholder names — the regex engine
    /// rejects duplicate group names, so the conflict surfaces at
    /// registration rather than producing ambiguous captures).
    pub fn compile(template: &str) -> TrellisResult<Self> {
        if template.is_empty() {
            return Err(TrellisError::EmptyRoutePath);
        }

        let normalized = format!("/{}", template.trim_matches('/'));

        let mut regex_source = String::from("^");
        let mut param_names = Vec::new();
        let mut last_end = 0;

        for caps in PLACEHOLDER.captures_iter(&normalized) {
            let whole = caps.get(0).expect("capture 0 always present");
            let name = &caps[1];

            regex_source.push_str(&normalized[last_end..whole.start()]);
            write!(regex_source, "(?P<{name}>[^/]+)").ok();
            param_names.push(name.to_string());
            last_end = whole.end();
        }
        regex_source.push_str(&normalized[last_end..]);
        regex_source.push('$');

        let regex = Regex::new(&regex_source).map_err(|e| {
            TrellisError::ImproperlyConfigured(format!(
                "Invalid route pattern {template:?}: {e}"
            ))
        })?;

        Ok(Self {
            template: normalized,
            regex,
            param_names,
        })
    }

    /// Returns the normalized template this pattern was compiled from.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Returns the compiled regex source. Used as the identity key for
    /// last-write-wins re-registration.
    pub fn pattern_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Returns the placeholder names in declaration order.
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Attempts an anchored match of the given path against this pattern.
    ///
    /// Returns the captured parameters in declaration order on success, or
    /// `None` if the path does not match.
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        let captures = self.regex.captures(path)?;

        let mut params = PathParams::new();
        for name in &self.param_names {
            if let Some(m) = captures.name(name) {
                params.push(name, m.as_str());
            }
        }
        Some(params)
    }
}
