//! Search, filter and pagination for list endpoints.
//!
//! A [`ListQuery`] is built from the raw query-string parameters of a request and refined with chained calls:
//!
//! ```rust,ignore
//! let query = ListQuery::new(params)
//!     .search(&["name"])
//!     .filter(&["price", "stock", "category_id"])?
//!     .pagination(20);
//! let products = catalog_api.search_products(&query).await?;
//! ```
//!
//! * `keyword=mug` becomes a substring match over the search fields.
//! * `price[gte]=100&price[lte]=500` becomes a range over `price`. Plain `field=value` is an equality match.
//! * `page=3` (1-based) is converted to an offset. A missing or unparseable page is page 1.
//!
//! Field names are checked against the allow-lists passed to `search` and `filter`, since they end up in SQL.
use std::{collections::HashMap, fmt::Display};

use serde::{Deserialize, Serialize};
use shopdesk_common::helpers::parse_positive;

use crate::ledger_api::errors::ListQueryError;

pub const KEYWORD_PARAM: &str = "keyword";
pub const PAGE_PARAM: &str = "page";
pub const LIMIT_PARAM: &str = "limit";
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl FilterOp {
    pub fn sql(&self) -> &'static str {
        match self {
            FilterOp::Eq => " = ",
            FilterOp::Gt => " > ",
            FilterOp::Gte => " >= ",
            FilterOp::Lt => " < ",
            FilterOp::Lte => " <= ",
        }
    }

    fn parse(s: &str) -> Result<Self, ListQueryError> {
        match s {
            "eq" => Ok(FilterOp::Eq),
            "gt" => Ok(FilterOp::Gt),
            "gte" => Ok(FilterOp::Gte),
            "lt" => Ok(FilterOp::Lt),
            "lte" => Ok(FilterOp::Lte),
            op => Err(ListQueryError::UnknownOperator(op.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFilter {
    pub field: String,
    pub op: FilterOp,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Search {
    pub fields: Vec<String>,
    pub keyword: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub limit: u32,
    pub offset: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    params: HashMap<String, String>,
    search: Option<Search>,
    filters: Vec<FieldFilter>,
    page: Option<Page>,
}

impl ListQuery {
    pub fn new(params: HashMap<String, String>) -> Self {
        Self { params, ..Default::default() }
    }

    /// Adds a substring match of the `keyword` parameter over `fields`. Does nothing if there is no keyword.
    pub fn search(mut self, fields: &[&str]) -> Self {
        let keyword = self.params.get(KEYWORD_PARAM).map(|k| k.trim().to_string()).filter(|k| !k.is_empty());
        if let Some(keyword) = keyword {
            let fields = fields.iter().map(|f| f.to_string()).collect();
            self.search = Some(Search { fields, keyword });
        }
        self
    }

    /// Turns every parameter other than `keyword`, `page` and `limit` into a field filter. Keys take the form `field`
    /// or `field[op]`, where `op` is one of `eq`, `gt`, `gte`, `lt` or `lte`.
    pub fn filter(mut self, allowed_fields: &[&str]) -> Result<Self, ListQueryError> {
        let mut keys = self
            .params
            .keys()
            .filter(|k| ![KEYWORD_PARAM, PAGE_PARAM, LIMIT_PARAM].contains(&k.as_str()))
            .cloned()
            .collect::<Vec<String>>();
        // deterministic SQL for identical requests
        keys.sort();
        for key in keys {
            let (field, op) = split_operator(&key)?;
            if !allowed_fields.contains(&field) {
                return Err(ListQueryError::UnknownField(field.to_string()));
            }
            let value = self.params.get(&key).cloned().unwrap_or_default();
            self.filters.push(FieldFilter { field: field.to_string(), op, value });
        }
        Ok(self)
    }

    /// Limits the result to one page. The `limit` parameter, if present, overrides `page_size` up to
    /// [`MAX_PAGE_SIZE`].
    pub fn pagination(mut self, page_size: u32) -> Self {
        let limit = parse_positive(self.params.get(LIMIT_PARAM).map(String::as_str))
            .unwrap_or(page_size)
            .clamp(1, MAX_PAGE_SIZE);
        let page = parse_positive(self.params.get(PAGE_PARAM).map(String::as_str)).unwrap_or(1);
        let offset = u64::from(limit) * u64::from(page - 1);
        self.page = Some(Page { limit, offset });
        self
    }

    pub fn search_terms(&self) -> Option<&Search> {
        self.search.as_ref()
    }

    pub fn filters(&self) -> &[FieldFilter] {
        &self.filters
    }

    pub fn page(&self) -> Option<Page> {
        self.page
    }

    pub fn has_conditions(&self) -> bool {
        self.search.is_some() || !self.filters.is_empty()
    }
}

fn split_operator(key: &str) -> Result<(&str, FilterOp), ListQueryError> {
    match key.split_once('[') {
        Some((field, rest)) => {
            let op = rest.strip_suffix(']').ok_or_else(|| ListQueryError::MalformedKey(key.to_string()))?;
            Ok((field, FilterOp::parse(op)?))
        },
        None => Ok((key, FilterOp::Eq)),
    }
}

/// Escape `LIKE` wildcards so that a keyword is matched literally. Use with `ESCAPE '\'`.
pub fn escape_like(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len() + 2);
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    format!("%{escaped}%")
}

impl Display for ListQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.has_conditions() && self.page.is_none() {
            return write!(f, "No filters.");
        }
        if let Some(search) = &self.search {
            write!(f, "'{}' in [{}]. ", search.keyword, search.fields.join(","))?;
        }
        for filter in &self.filters {
            write!(f, "{}{}{}. ", filter.field, filter.op.sql().trim(), filter.value)?;
        }
        if let Some(page) = &self.page {
            write!(f, "limit {} offset {}.", page.limit, page.offset)?;
        }
        Ok(())
    }
}
