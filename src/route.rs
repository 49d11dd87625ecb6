use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{error::RouteError, models::MenuItem};

/// RouteMeta
///
/// Access requirements attached to a route. A child route inherits the
/// requirements of its group: if any matched record requires it, the route does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RouteMeta {
    pub requires_auth: bool,
    pub requires_admin: bool,
}

impl RouteMeta {
    pub const fn public() -> Self {
        Self {
            requires_auth: false,
            requires_admin: false,
        }
    }

    pub const fn authenticated() -> Self {
        Self {
            requires_auth: true,
            requires_admin: false,
        }
    }

    /// Admin routes always require a login as well.
    pub const fn admin() -> Self {
        Self {
            requires_auth: true,
            requires_admin: true,
        }
    }

    pub const fn merge(self, other: Self) -> Self {
        Self {
            requires_auth: self.requires_auth || other.requires_auth,
            requires_admin: self.requires_admin || other.requires_admin,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
    CatchAll,
}

/// PathPattern
///
/// A parsed route path such as `/snack/:id` or `/*`. `:name` captures exactly
/// one non-empty segment; `*` captures the remainder and must come last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(raw: &str) -> Result<Self, RouteError> {
        if !raw.starts_with('/') {
            return Err(RouteError::InvalidPattern(raw.to_string()));
        }

        let parts: Vec<&str> = raw.split('/').filter(|part| !part.is_empty()).collect();
        let mut segments = Vec::with_capacity(parts.len());

        for (index, part) in parts.iter().enumerate() {
            let segment = if *part == "*" {
                if index + 1 != parts.len() {
                    return Err(RouteError::MisplacedCatchAll(raw.to_string()));
                }
                Segment::CatchAll
            } else if let Some(name) = part.strip_prefix(':') {
                if name.is_empty() {
                    return Err(RouteError::UnnamedParam(raw.to_string()));
                }
                Segment::Param(name.to_string())
            } else {
                Segment::Static(part.to_string())
            };
            segments.push(segment);
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Matches a normalised path, returning the captured parameters.
    pub fn matches(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let parts: Vec<&str> = path.split('/').filter(|part| !part.is_empty()).collect();
        let mut params = BTreeMap::new();

        for (index, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::CatchAll => {
                    params.insert("pathMatch".to_string(), parts[index.min(parts.len())..].join("/"));
                    return Some(params);
                }
                Segment::Static(expected) => {
                    if parts.get(index) != Some(&expected.as_str()) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let value = parts.get(index)?;
                    params.insert(name.clone(), decode_component(value));
                }
            }
        }

        (parts.len() == self.segments.len()).then_some(params)
    }
}

/// RouteKind
///
/// Pages are rendered; redirect records rewrite the navigation target before
/// any guard runs (legacy aliases, layout roots, the catch-all).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteKind {
    Page,
    Redirect(String),
}

/// RouteDef
///
/// Declarative description of one route, relative to its group when nested.
#[derive(Debug, Clone)]
pub struct RouteDef {
    path: String,
    name: Option<String>,
    title: Option<String>,
    icon: Option<String>,
    meta: RouteMeta,
    kind: RouteKind,
}

impl RouteDef {
    pub fn page(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: None,
            title: None,
            icon: None,
            meta: RouteMeta::public(),
            kind: RouteKind::Page,
        }
    }

    pub fn redirect(path: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            kind: RouteKind::Redirect(target.into()),
            ..Self::page(path)
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn meta(mut self, meta: RouteMeta) -> Self {
        self.meta = meta;
        self
    }
}

/// RouteGroup
///
/// A layout prefix (such as `/back`) whose meta applies to every child.
/// An optional redirect sends the bare prefix to a default child.
#[derive(Debug, Clone)]
pub struct RouteGroup {
    prefix: String,
    meta: RouteMeta,
    redirect: Option<String>,
    children: Vec<RouteDef>,
}

impl RouteGroup {
    pub fn new(prefix: impl Into<String>, meta: RouteMeta) -> Self {
        Self {
            prefix: prefix.into(),
            meta,
            redirect: None,
            children: Vec::new(),
        }
    }

    pub fn redirect_to(mut self, target: impl Into<String>) -> Self {
        self.redirect = Some(target.into());
        self
    }

    pub fn child(mut self, def: RouteDef) -> Self {
        self.children.push(def);
        self
    }

    fn flatten(self) -> Vec<RouteDef> {
        let mut defs = Vec::with_capacity(self.children.len() + 1);
        if let Some(target) = self.redirect {
            defs.push(RouteDef::redirect(self.prefix.clone(), target).meta(self.meta));
        }
        for child in self.children {
            let path = join_path(&self.prefix, &child.path);
            let meta = self.meta.merge(child.meta);
            defs.push(RouteDef { path, meta, ..child });
        }
        defs
    }
}

/// RouteRecord
///
/// A registered route with its parsed pattern.
#[derive(Debug, Clone)]
pub struct RouteRecord {
    pub pattern: PathPattern,
    pub name: Option<String>,
    pub title: Option<String>,
    pub icon: Option<String>,
    pub meta: RouteMeta,
    pub kind: RouteKind,
}

impl TryFrom<RouteDef> for RouteRecord {
    type Error = RouteError;

    fn try_from(def: RouteDef) -> Result<Self, Self::Error> {
        Ok(Self {
            pattern: PathPattern::parse(&def.path)?,
            name: def.name,
            title: def.title,
            icon: def.icon,
            meta: def.meta,
            kind: def.kind,
        })
    }
}

/// ResolvedRoute
///
/// The concrete navigation target: the matched page record plus the path,
/// query and params of this particular navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    pub name: Option<String>,
    pub title: Option<String>,
    pub path: String,
    pub full_path: String,
    pub query: BTreeMap<String, String>,
    pub params: BTreeMap<String, String>,
    pub meta: RouteMeta,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Matched(ResolvedRoute),
    /// A redirect record matched; the payload is the new full path.
    Redirect(String),
    Unmatched,
}

/// RouteTable
///
/// The static, ordered route registry. The first record whose pattern
/// matches wins, so the catch-all belongs at the end.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    records: Vec<RouteRecord>,
}

#[derive(Debug, Default)]
pub struct RouteTableBuilder {
    defs: Vec<RouteDef>,
}

impl RouteTableBuilder {
    pub fn route(mut self, def: RouteDef) -> Self {
        self.defs.push(def);
        self
    }

    pub fn routes(mut self, defs: impl IntoIterator<Item = RouteDef>) -> Self {
        self.defs.extend(defs);
        self
    }

    pub fn group(mut self, group: RouteGroup) -> Self {
        self.defs.extend(group.flatten());
        self
    }

    pub fn build(self) -> Result<RouteTable, RouteError> {
        let records = self
            .defs
            .into_iter()
            .map(RouteRecord::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RouteTable { records })
    }
}

impl RouteTable {
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::default()
    }

    pub fn records(&self) -> &[RouteRecord] {
        &self.records
    }

    /// resolve
    ///
    /// Maps a full path (path, optional `?query`, optional `#hash`) onto the
    /// table. Redirect records keep the original query and hash unless their
    /// target carries its own.
    pub fn resolve(&self, full_path: &str) -> Resolution {
        let (path, query, hash) = split_full_path(full_path);

        let Some((record, params)) = self
            .records
            .iter()
            .find_map(|record| record.pattern.matches(&path).map(|params| (record, params)))
        else {
            return Resolution::Unmatched;
        };

        match &record.kind {
            RouteKind::Redirect(target) => {
                let mut next = target.clone();
                if !target.contains('?') {
                    if let Some(query) = query {
                        next.push('?');
                        next.push_str(query);
                    }
                }
                if !target.contains('#') {
                    if let Some(hash) = hash {
                        next.push('#');
                        next.push_str(hash);
                    }
                }
                Resolution::Redirect(next)
            }
            RouteKind::Page => Resolution::Matched(ResolvedRoute {
                name: record.name.clone(),
                title: record.title.clone(),
                full_path: compose_full_path(&path, query, hash),
                query: query.map(parse_query).unwrap_or_default(),
                params,
                path,
                meta: record.meta,
            }),
        }
    }

    /// Titled admin-console pages, in registration order.
    pub fn menu(&self) -> Vec<MenuItem> {
        self.records
            .iter()
            .filter(|record| record.kind == RouteKind::Page && record.meta.requires_admin)
            .filter_map(|record| {
                Some(MenuItem {
                    path: record.pattern.as_str().to_string(),
                    title: record.title.clone()?,
                    icon: record.icon.clone()?,
                })
            })
            .collect()
    }
}

fn join_path(prefix: &str, child: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let child = child.trim_start_matches('/');
    if child.is_empty() {
        if prefix.is_empty() { "/".to_string() } else { prefix.to_string() }
    } else {
        format!("{prefix}/{child}")
    }
}

/// Splits `full_path` into a normalised path, a raw query and a raw hash.
pub(crate) fn split_full_path(full_path: &str) -> (String, Option<&str>, Option<&str>) {
    let (before_hash, hash) = match full_path.split_once('#') {
        Some((before, hash)) => (before, Some(hash)),
        None => (full_path, None),
    };
    let (path, query) = match before_hash.split_once('?') {
        Some((path, query)) => (path, Some(query).filter(|q| !q.is_empty())),
        None => (before_hash, None),
    };
    (normalize_path(path), query, hash.filter(|h| !h.is_empty()))
}

/// Leading slash, no trailing slash, no empty segments. This is the same
/// segment view `PathPattern::matches` works on.
fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

fn compose_full_path(path: &str, query: Option<&str>, hash: Option<&str>) -> String {
    let mut full = path.to_string();
    if let Some(query) = query {
        full.push('?');
        full.push_str(query);
    }
    if let Some(hash) = hash {
        full.push('#');
        full.push_str(hash);
    }
    full
}

fn parse_query(query: &str) -> BTreeMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (decode_component(key), decode_component(value)),
            None => (decode_component(pair), String::new()),
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}
