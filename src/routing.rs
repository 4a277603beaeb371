//! Route Table
//!
//! Maps client navigation paths to pages. The table is built once at
//! startup and never mutated; entries are checked in declaration order
//! and the first match wins.
//!
//! A pattern is a `/`-separated list of segments. A segment written as
//! `:name` captures one non-empty path segment as a parameter.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Pages the client can render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Page {
    MainMenu,
    MetalCalculate,
    UploadItems,
    ItemList,
    ItemDetail,
    Login,
    CsvEditor,
}

impl Page {
    /// Human readable page title
    pub fn title(&self) -> &'static str {
        match self {
            Page::MainMenu => "Main menu",
            Page::MetalCalculate => "Metal calculation",
            Page::UploadItems => "Item upload",
            Page::ItemList => "Item list",
            Page::ItemDetail => "Item detail",
            Page::Login => "Login",
            Page::CsvEditor => "CSV editor",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Route table errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("Invalid route pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Duplicate route path: {0}")]
    DuplicatePath(String),

    #[error("Duplicate route name: {0}")]
    DuplicateName(String),

    #[error("Unknown route name: {0}")]
    UnknownName(String),

    #[error("Missing parameter {param:?} for route {name}")]
    MissingParam { name: String, param: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A single route: pattern, unique name and target page
#[derive(Debug, Clone)]
pub struct RouteEntry {
    path: String,
    name: String,
    page: Page,
    segments: Vec<Segment>,
}

impl RouteEntry {
    /// Parse a route entry. Fails on malformed patterns.
    pub fn new(path: &str, name: &str, page: Page) -> Result<Self, RouteError> {
        let invalid = |reason: &str| RouteError::InvalidPattern {
            pattern: path.to_string(),
            reason: reason.to_string(),
        };

        if !path.starts_with('/') {
            return Err(invalid("must start with '/'"));
        }

        let mut segments = Vec::new();
        for raw in split_segments(path) {
            if raw.is_empty() {
                return Err(invalid("empty segment"));
            }
            match raw.strip_prefix(':') {
                Some("") => return Err(invalid("empty parameter name")),
                Some(param) => segments.push(Segment::Param(param.to_string())),
                None => segments.push(Segment::Literal(raw.to_string())),
            }
        }

        let params = segments
            .iter()
            .filter(|s| matches!(s, Segment::Param(_)))
            .count();
        if params > 1 {
            return Err(invalid("at most one parameter segment is allowed"));
        }

        Ok(Self {
            path: path.to_string(),
            name: name.to_string(),
            page,
            segments,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn page(&self) -> Page {
        self.page
    }

    /// Name of the parameter segment, if the pattern has one
    pub fn param_name(&self) -> Option<&str> {
        self.segments.iter().find_map(|s| match s {
            Segment::Param(p) => Some(p.as_str()),
            Segment::Literal(_) => None,
        })
    }

    fn matches(&self, segments: &[&str]) -> Option<Vec<(String, String)>> {
        if segments.len() != self.segments.len() {
            return None;
        }

        let mut params = Vec::new();
        for (pattern, actual) in self.segments.iter().zip(segments) {
            match pattern {
                Segment::Literal(lit) if lit == actual => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => {
                    if actual.is_empty() {
                        return None;
                    }
                    let value = urlencoding::decode(actual)
                        .map(|v| v.into_owned())
                        .unwrap_or_else(|_| (*actual).to_string());
                    params.push((name.clone(), value));
                }
            }
        }
        Some(params)
    }
}

/// Result of resolving a navigation path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteMatch {
    pub name: String,
    pub page: Page,
    pub params: Vec<(String, String)>,
}

impl RouteMatch {
    /// Get a captured parameter by name
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Pages of the application in declaration order
const STANDARD_ROUTES: [(&str, &str, Page); 7] = [
    ("/", "MainMenu", Page::MainMenu),
    ("/calculate", "MetalCalculatePage", Page::MetalCalculate),
    ("/upload-items", "UploadItemPage", Page::UploadItems),
    ("/item-list", "ItemList", Page::ItemList),
    ("/items/:id", "ItemDetail", Page::ItemDetail),
    ("/login", "LoginPage", Page::Login),
    ("/csv", "CsvEditor", Page::CsvEditor),
];

/// Ordered, immutable route table
#[derive(Debug, Clone)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    /// Build a table, rejecting duplicate paths and names
    pub fn new(entries: Vec<RouteEntry>) -> Result<Self, RouteError> {
        let mut paths = HashSet::new();
        let mut names = HashSet::new();

        for entry in &entries {
            if !paths.insert(entry.path.clone()) {
                return Err(RouteError::DuplicatePath(entry.path.clone()));
            }
            if !names.insert(entry.name.clone()) {
                return Err(RouteError::DuplicateName(entry.name.clone()));
            }
        }

        Ok(Self { entries })
    }

    /// The application's route table
    pub fn standard() -> Self {
        Self::from_patterns(&STANDARD_ROUTES).expect("standard routes are valid")
    }

    /// Build a table from `(pattern, name, page)` triples
    pub fn from_patterns(patterns: &[(&str, &str, Page)]) -> Result<Self, RouteError> {
        let entries = patterns
            .iter()
            .map(|(path, name, page)| RouteEntry::new(path, name, *page))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(entries)
    }

    /// Entries in declaration order
    pub fn entries(&self) -> impl Iterator<Item = &RouteEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn by_name(&self, name: &str) -> Option<&RouteEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Resolve a navigation path to the first matching entry.
    ///
    /// Query string and fragment are ignored, as is a single trailing
    /// slash. `None` means no page exists for the path.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch> {
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        if !path.starts_with('/') {
            return None;
        }

        let trimmed = if path.len() > 1 {
            path.strip_suffix('/').unwrap_or(path)
        } else {
            path
        };
        let segments: Vec<&str> = split_segments(trimmed).collect();

        self.entries.iter().find_map(|entry| {
            entry.matches(&segments).map(|params| RouteMatch {
                name: entry.name.clone(),
                page: entry.page,
                params,
            })
        })
    }

    /// Build a concrete path for a named route
    pub fn href(&self, name: &str, params: &[(&str, &str)]) -> Result<String, RouteError> {
        let entry = self
            .by_name(name)
            .ok_or_else(|| RouteError::UnknownName(name.to_string()))?;

        if entry.segments.is_empty() {
            return Ok("/".to_string());
        }

        let mut out = String::new();
        for segment in &entry.segments {
            out.push('/');
            match segment {
                Segment::Literal(lit) => out.push_str(lit),
                Segment::Param(param) => {
                    let value = params
                        .iter()
                        .find(|(k, _)| k == param)
                        .map(|(_, v)| *v)
                        .ok_or_else(|| RouteError::MissingParam {
                            name: name.to_string(),
                            param: param.clone(),
                        })?;
                    out.push_str(&urlencoding::encode(value));
                }
            }
        }
        Ok(out)
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Split a path into segments, treating "/" as zero segments
fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    let body = path.strip_prefix('/').unwrap_or(path);
    body.split('/').filter(move |_| !body.is_empty())
}
