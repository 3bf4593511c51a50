//! OData query options for list endpoints.
//!
//! [`QueryOptions`] translates into `$top`, `$skip`, `$orderby` and `$filter`
//! query parameters. Raw filter strings go through a purely textual operator
//! rewrite (`=` → ` eq `, `>` → ` gt `, `<` → ` lt `) that knows nothing about
//! quoting, so a `=` inside a string literal is rewritten as well:
//!
//! ```
//! use insightly::QueryOptions;
//!
//! let params = QueryOptions::new().filter("EMAIL='a=b'").to_params();
//! assert_eq!(params[0].1, "EMAIL eq 'a eq b'");
//! ```
//!
//! Use [`Filter`] when the value may contain operator characters.

use std::fmt;

/// Query parameter pairs, in emission order
pub type Params = Vec<(String, String)>;

/// Rewrite the comparison operators of a raw filter expression.
pub fn rewrite_filter(filter: &str) -> String {
    let mut out = String::with_capacity(filter.len() + 8);
    for c in filter.chars() {
        match c {
            '=' => out.push_str(" eq "),
            '>' => out.push_str(" gt "),
            '<' => out.push_str(" lt "),
            _ => out.push(c),
        }
    }
    out
}

/// Comparison operator of a structured filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gt,
    Lt,
}

impl FilterOp {
    /// OData keyword for the operator
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Gt => "gt",
            FilterOp::Lt => "lt",
        }
    }
}

/// Right-hand side of a structured filter
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            FilterValue::Integer(i) => write!(f, "{}", i),
            FilterValue::Float(x) => write!(f, "{}", x),
            FilterValue::Bool(b) => write!(f, "{}", b),
            FilterValue::Null => f.write_str("null"),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::String(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        FilterValue::String(s)
    }
}

impl From<i64> for FilterValue {
    fn from(i: i64) -> Self {
        FilterValue::Integer(i)
    }
}

impl From<i32> for FilterValue {
    fn from(i: i32) -> Self {
        FilterValue::Integer(i.into())
    }
}

impl From<f64> for FilterValue {
    fn from(x: f64) -> Self {
        FilterValue::Float(x)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        FilterValue::Bool(b)
    }
}

/// A structured `<field> <op> <value>` filter expression.
///
/// Rendered as-is, without the textual operator rewrite.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: FilterValue,
}

impl Filter {
    /// Build a filter from its three parts
    pub fn new(field: impl Into<String>, op: FilterOp, value: impl Into<FilterValue>) -> Self {
        Filter {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// `<field> eq <value>`
    pub fn eq(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Filter::new(field, FilterOp::Eq, value)
    }

    /// `<field> gt <value>`
    pub fn gt(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Filter::new(field, FilterOp::Gt, value)
    }

    /// `<field> lt <value>`
    pub fn lt(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Filter::new(field, FilterOp::Lt, value)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.op.as_str(), self.value)
    }
}

/// One `$filter` clause
#[derive(Debug, Clone, PartialEq)]
pub enum FilterClause {
    /// Raw expression using `=`, `>` and `<`, rewritten textually
    Raw(String),
    /// Structured expression, rendered verbatim
    Expr(Filter),
}

impl FilterClause {
    /// Render the `$filter` value, or `None` for an empty raw expression
    pub fn render(&self) -> Option<String> {
        match self {
            FilterClause::Raw(raw) if raw.trim().is_empty() => None,
            FilterClause::Raw(raw) => Some(rewrite_filter(raw)),
            FilterClause::Expr(filter) => Some(filter.to_string()),
        }
    }
}

/// OData paging, ordering and filtering options
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    pub top: Option<u32>,
    pub skip: Option<u32>,
    /// Passed through verbatim, e.g. `"FIRST_NAME desc"`
    pub orderby: Option<String>,
    /// Each clause becomes its own `$filter` parameter; they are not joined with `and`
    pub filters: Vec<FilterClause>,
}

impl QueryOptions {
    /// Empty options, producing no query parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Maximum number of records to return (`$top`)
    pub fn top(mut self, top: u32) -> Self {
        self.top = Some(top);
        self
    }

    /// Number of records to skip (`$skip`)
    pub fn skip(mut self, skip: u32) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Sort expression such as `"FIRST_NAME desc"` (`$orderby`)
    pub fn orderby(mut self, orderby: impl Into<String>) -> Self {
        self.orderby = Some(orderby.into());
        self
    }

    /// Add a raw filter expression such as `FIRST_NAME='Brian'`
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filters.push(FilterClause::Raw(filter.into()));
        self
    }

    /// Add a structured filter expression
    pub fn filter_expr(mut self, filter: Filter) -> Self {
        self.filters.push(FilterClause::Expr(filter));
        self
    }

    /// Whether no parameter would be emitted
    pub fn is_empty(&self) -> bool {
        self.to_params().is_empty()
    }

    /// Translate into query parameters: `$top`, `$skip`, `$orderby`, then one
    /// `$filter` per clause
    pub fn to_params(&self) -> Params {
        let mut params = Params::new();

        if let Some(top) = self.top {
            params.push(("$top".to_string(), top.to_string()));
        }
        if let Some(skip) = self.skip {
            params.push(("$skip".to_string(), skip.to_string()));
        }
        if let Some(ref orderby) = self.orderby {
            if !orderby.trim().is_empty() {
                params.push(("$orderby".to_string(), orderby.clone()));
            }
        }
        for clause in &self.filters {
            if let Some(value) = clause.render() {
                params.push(("$filter".to_string(), value));
            }
        }

        params
    }
}

/// OData options plus resource-specific list parameters.
///
/// Resource parameters are appended after the OData parameters, in the
/// order they were added.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListOptions {
    pub query: QueryOptions,
    pub params: Params,
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// See [`QueryOptions::top`]
    pub fn top(mut self, top: u32) -> Self {
        self.query = self.query.top(top);
        self
    }

    /// See [`QueryOptions::skip`]
    pub fn skip(mut self, skip: u32) -> Self {
        self.query = self.query.skip(skip);
        self
    }

    /// See [`QueryOptions::orderby`]
    pub fn orderby(mut self, orderby: impl Into<String>) -> Self {
        self.query = self.query.orderby(orderby);
        self
    }

    /// Add a raw filter expression, rewritten like [`QueryOptions::filter`]
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.query = self.query.filter(filter);
        self
    }

    /// Add a structured filter expression
    pub fn filter_expr(mut self, filter: Filter) -> Self {
        self.query = self.query.filter_expr(filter);
        self
    }

    /// Filter by email address
    pub fn email(self, email: impl Into<String>) -> Self {
        self.param("email", email)
    }

    /// Filter by tag name
    pub fn tag(self, tag: impl Into<String>) -> Self {
        self.param("tag", tag)
    }

    /// Filter organisations by email domain
    pub fn email_domain(self, domain: impl Into<String>) -> Self {
        self.param("email_domain", domain)
    }

    /// Restrict to the given record ids, sent comma-joined
    pub fn ids(self, ids: &[i64]) -> Self {
        let joined = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.param("ids", joined)
    }

    /// Add an arbitrary resource parameter
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    /// All query parameters, OData first
    pub fn to_params(&self) -> Params {
        let mut params = self.query.to_params();
        params.extend(self.params.iter().cloned());
        params
    }
}

impl From<QueryOptions> for ListOptions {
    fn from(query: QueryOptions) -> Self {
        ListOptions {
            query,
            params: Params::new(),
        }
    }
}
