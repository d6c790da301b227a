// ── Query composition ──
//
// `QueryIntent` is what the user asked for, straight from flags.
// `compile` turns it into a validated `QuerySpec`; nothing else in the
// workspace decides how shortcuts and explicit filters combine.

use std::str::FromStr;

use crate::error::QueryBuildError;
use crate::filter::{FilterClause, FilterExpression, FilterMode, FilterOperator};
use crate::record::DeviceRecord;

/// Page size used when the caller doesn't pick one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;
/// Largest page the engine will request.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// User-level list intent, before validation.
///
/// Pagination values are signed so that negative input can be reported
/// as a query error instead of being rejected by the argument parser.
#[derive(Debug, Clone, Default)]
pub struct QueryIntent {
    /// `--active`: shortcut on the `active` field.
    pub active: Option<bool>,
    /// Repeated `--model`: any of these models.
    pub models: Vec<String>,
    /// Repeated `--name`: any of these names.
    pub names: Vec<String>,
    /// Raw `--filter field:operator:value` entries, in order.
    pub filters: Vec<String>,
    pub filter_mode: FilterMode,
    pub sort_by: Option<String>,
    pub descending: bool,
    pub page_size: Option<i64>,
    pub start_index: Option<i64>,
    pub total_count: bool,
    pub location_id: Option<i64>,
}

/// Sort order for the list endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub descending: bool,
}

/// A validated, wire-ready list query.
///
/// Invariants: `page_size` is in `1..=MAX_PAGE_SIZE`; a descending flag
/// without a sort field has been dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    filters: Vec<FilterExpression>,
    filter_mode: FilterMode,
    sort: Option<SortSpec>,
    page_size: u32,
    start_index: u64,
    total_count_required: bool,
    location_id: Option<i64>,
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            filter_mode: FilterMode::And,
            sort: None,
            page_size: DEFAULT_PAGE_SIZE,
            start_index: 0,
            total_count_required: false,
            location_id: None,
        }
    }
}

impl QuerySpec {
    pub fn filters(&self) -> &[FilterExpression] {
        &self.filters
    }

    pub fn filter_mode(&self) -> FilterMode {
        self.filter_mode
    }

    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn start_index(&self) -> u64 {
        self.start_index
    }

    pub fn total_count_required(&self) -> bool {
        self.total_count_required
    }

    pub fn location_id(&self) -> Option<i64> {
        self.location_id
    }

    /// The same query, positioned at another offset.
    pub fn with_start_index(&self, start_index: u64) -> Self {
        Self {
            start_index,
            ..self.clone()
        }
    }

    /// Every clause in order, shortcut groups expanded.
    pub fn clauses(&self) -> Vec<FilterClause> {
        self.filters.iter().flat_map(FilterExpression::clauses).collect()
    }

    /// Evaluate the query's predicate against a record locally.
    pub fn matches(&self, record: &DeviceRecord) -> bool {
        if self.filters.is_empty() {
            return true;
        }
        match self.filter_mode {
            FilterMode::And => self.filters.iter().all(|f| f.matches(record)),
            FilterMode::Or => self.filters.iter().any(|f| f.matches(record)),
        }
    }

    /// Query parameters for `GET /manageddevices/aps`.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("startindex", self.start_index.to_string()),
            ("pagesize", self.page_size.to_string()),
            ("totalcountrequired", self.total_count_required.to_string()),
        ];

        if let Some(sort) = &self.sort {
            params.push(("sortby", sort.field.clone()));
            params.push(("ascending", (!sort.descending).to_string()));
        }

        params.push(("fetchradios", "true".into()));
        params.push(("populatemeshinfo", "false".into()));
        params.push(("populatewiredinterfaces", "false".into()));

        if let Some(location) = self.location_id {
            params.push(("locationid", location.to_string()));
        }

        if !self.filters.is_empty() {
            params.push(("operator", self.filter_mode.to_string()));
            params.extend(self.filters.iter().map(|f| ("filter", f.to_wire())));
        }

        params
    }
}

/// Compile user intent into a `QuerySpec`.
///
/// Shortcut flags become one `AnyOf` group per field, so repeated values
/// are OR-combined whatever the global mode says. Each explicit `--filter`
/// entry becomes its own clause and combines with everything else under
/// the global mode, even when several entries share a field.
pub fn compile(intent: &QueryIntent) -> Result<QuerySpec, QueryBuildError> {
    let page_size = match intent.page_size {
        None => DEFAULT_PAGE_SIZE,
        Some(n) => u32::try_from(n)
            .ok()
            .filter(|n| (1..=MAX_PAGE_SIZE).contains(n))
            .ok_or(QueryBuildError::PageSize(n))?,
    };
    let start_index = match intent.start_index {
        None => 0,
        Some(n) => u64::try_from(n).map_err(|_| QueryBuildError::StartIndex(n))?,
    };

    let sort = match &intent.sort_by {
        None => None,
        Some(field) if field.trim().is_empty() => return Err(QueryBuildError::EmptySortField),
        Some(field) => Some(SortSpec {
            field: field.trim().to_owned(),
            descending: intent.descending,
        }),
    };

    let mut filters = Vec::new();

    if let Some(active) = intent.active {
        filters.push(FilterExpression::AnyOf {
            field: "active".into(),
            values: vec![active.to_string()],
        });
    }
    for (field, values) in [("model", &intent.models), ("name", &intent.names)] {
        if !values.is_empty() {
            filters.push(FilterExpression::AnyOf {
                field: field.into(),
                values: values.clone(),
            });
        }
    }

    for raw in &intent.filters {
        filters.push(FilterExpression::Clause(parse_filter(raw)?));
    }

    Ok(QuerySpec {
        filters,
        filter_mode: intent.filter_mode,
        sort,
        page_size,
        start_index,
        total_count_required: intent.total_count,
        location_id: intent.location_id,
    })
}

/// Parse one `field:operator:value` entry. The value keeps any further
/// colons, so MAC fragments like `5D:BF` survive.
pub fn parse_filter(input: &str) -> Result<FilterClause, QueryBuildError> {
    let malformed = || QueryBuildError::MalformedFilter {
        input: input.to_owned(),
    };

    let mut parts = input.splitn(3, ':');
    let (Some(field), Some(operator), Some(value)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(malformed());
    };
    let field = field.trim();
    if field.is_empty() || value.is_empty() {
        return Err(malformed());
    }

    let operator =
        FilterOperator::from_str(operator.trim()).map_err(|_| QueryBuildError::UnknownOperator {
            operator: operator.to_owned(),
            input: input.to_owned(),
            valid: FilterOperator::valid_names(),
        })?;

    Ok(FilterClause::new(field, operator, value))
}
