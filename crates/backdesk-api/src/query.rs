// Query builder.
//
// Turns an abstract list request (1-indexed page, sort, filter map) into the
// `skip` / `limit` / `sort_by` / `order` vocabulary the REST API expects.
// Pure functions only; the transport appends the result verbatim.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;
use crate::record::RecordId;

/// Outgoing query parameters, in emission order.
pub type QueryParams = Vec<(String, String)>;

/// Filter name -> value. `""` and `null` mean "absent".
pub type Filters = BTreeMap<String, Value>;

// ── Pagination ───────────────────────────────────────────────────────

/// 1-indexed page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPagination")]
pub struct Pagination {
    page: u32,
    per_page: u32,
}

impl Pagination {
    pub const DEFAULT_PAGE: u32 = 1;
    pub const DEFAULT_PER_PAGE: u32 = 10;

    pub fn new(page: u32, per_page: u32) -> Result<Self, Error> {
        if page == 0 || per_page == 0 {
            return Err(Error::InvalidPagination { page, per_page });
        }
        Ok(Self { page, per_page })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Zero-indexed offset of the first record on this page.
    pub fn skip(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.per_page)
    }

    pub fn limit(&self) -> u32 {
        self.per_page
    }
}

/// Unchecked wire shape; deserialization goes through `Pagination::new`.
#[derive(Deserialize)]
struct RawPagination {
    page: u32,
    per_page: u32,
}

impl TryFrom<RawPagination> for Pagination {
    type Error = Error;

    fn try_from(raw: RawPagination) -> Result<Self, Self::Error> {
        Self::new(raw.page, raw.per_page)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: Self::DEFAULT_PAGE,
            per_page: Self::DEFAULT_PER_PAGE,
        }
    }
}

// ── Sorting ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Lowercase wire form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(Error::InvalidSortOrder(s.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    pub order: SortOrder,
}

impl Sort {
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }

    /// A sort spec exists only when both a non-empty field and a direction
    /// are supplied.
    pub fn from_parts(field: Option<&str>, order: Option<SortOrder>) -> Option<Self> {
        match (field, order) {
            (Some(field), Some(order)) if !field.is_empty() => Some(Self::new(field, order)),
            _ => None,
        }
    }
}

// ── Request shapes ───────────────────────────────────────────────────

/// Parameters for a list-shaped call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListParams {
    pub pagination: Pagination,
    pub sort: Option<Sort>,
    pub filter: Filters,
}

impl ListParams {
    pub fn new(pagination: Pagination) -> Self {
        Self {
            pagination,
            ..Self::default()
        }
    }

    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter.insert(key.into(), value.into());
        self
    }
}

/// Parameters for "records referencing an anchor" lookups.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceParams {
    /// Foreign-key field on the referencing resource (e.g. `user_id`).
    pub target: String,
    /// Id of the anchor record.
    pub id: RecordId,
    pub list: ListParams,
}

impl ReferenceParams {
    pub fn new(target: impl Into<String>, id: impl Into<RecordId>) -> Self {
        Self {
            target: target.into(),
            id: id.into(),
            list: ListParams::default(),
        }
    }

    pub fn list(mut self, list: ListParams) -> Self {
        self.list = list;
        self
    }
}

// ── Builders ─────────────────────────────────────────────────────────

/// `true` for values that must never reach the outgoing request.
pub fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Build the query for a list request.
///
/// Emits `skip`, `limit`, then `sort_by` / `order` when a sort with a
/// non-empty field is given, then every present filter under its
/// (possibly renamed) server name.
pub fn build_list_query(
    pagination: Pagination,
    sort: Option<&Sort>,
    filters: &Filters,
    renames: &BTreeMap<String, String>,
) -> QueryParams {
    let mut params: QueryParams = vec![
        ("skip".into(), pagination.skip().to_string()),
        ("limit".into(), pagination.limit().to_string()),
    ];

    if let Some(sort) = sort.filter(|sort| !sort.field.is_empty()) {
        params.push(("sort_by".into(), sort.field.clone()));
        params.push(("order".into(), sort.order.as_str().into()));
    }

    for (key, value) in filters {
        let name = renames.get(key).unwrap_or(key);
        push_filter(&mut params, name, value);
    }

    params
}

/// Build the query for a reference lookup.
///
/// The foreign-key equality goes in first; a present ordinary filter with
/// the same key replaces it. Absent filters never displace it.
pub fn build_reference_query(
    reference: &ReferenceParams,
    renames: &BTreeMap<String, String>,
) -> QueryParams {
    let mut filters = Filters::new();
    filters.insert(reference.target.clone(), reference.id.to_value());
    filters.extend(
        reference
            .list
            .filter
            .iter()
            .filter(|(_, v)| !is_absent(v))
            .map(|(k, v)| (k.clone(), v.clone())),
    );

    build_list_query(
        reference.list.pagination,
        reference.list.sort.as_ref(),
        &filters,
        renames,
    )
}

fn push_filter(params: &mut QueryParams, name: &str, value: &Value) {
    match value {
        v if is_absent(v) => {}
        Value::String(s) => params.push((name.to_owned(), s.clone())),
        Value::Array(items) => {
            for item in items {
                push_filter(params, name, item);
            }
        }
        // Nested arrays are flattened above; objects go out as compact JSON.
        Value::Object(_) => params.push((name.to_owned(), value.to_string())),
        Value::Bool(_) | Value::Number(_) | Value::Null => {
            params.push((name.to_owned(), value.to_string()));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn no_renames() -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    fn has(params: &QueryParams, key: &str, value: &str) -> bool {
        params.iter().any(|(k, v)| k == key && v == value)
    }

    fn has_key(params: &QueryParams, key: &str) -> bool {
        params.iter().any(|(k, _)| k == key)
    }

    #[test]
    fn pagination_defaults() {
        let p = Pagination::default();
        assert_eq!((p.page(), p.per_page()), (1, 10));
        assert_eq!(p.skip(), 0);
        assert_eq!(p.limit(), 10);
    }

    #[test]
    fn pagination_rejects_zero() {
        assert!(matches!(
            Pagination::new(0, 10),
            Err(Error::InvalidPagination { page: 0, .. })
        ));
        assert!(Pagination::new(1, 0).is_err());
    }

    #[test]
    fn skip_is_zero_indexed_offset() {
        for (page, per_page) in [(1, 1), (2, 25), (3, 10), (7, 50), (100, 200)] {
            let p = Pagination::new(page, per_page).unwrap();
            assert_eq!(p.skip(), u64::from((page - 1) * per_page));
            assert_eq!(p.limit(), per_page);
        }
    }

    #[test]
    fn deserialized_pagination_is_validated() {
        let p: Pagination = serde_json::from_value(json!({ "page": 3, "per_page": 20 })).unwrap();
        assert_eq!(p.skip(), 40);

        assert!(serde_json::from_value::<Pagination>(json!({ "page": 0, "per_page": 10 })).is_err());
        assert!(serde_json::from_value::<Pagination>(json!({ "page": 1, "per_page": 0 })).is_err());
    }

    #[test]
    fn skip_does_not_overflow_u32() {
        let p = Pagination::new(u32::MAX, u32::MAX).unwrap();
        assert_eq!(p.skip(), u64::from(u32::MAX - 1) * u64::from(u32::MAX));
    }

    #[test]
    fn sort_order_parses_case_insensitively() {
        assert_eq!("ASC".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert_eq!("Desc".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert!("sideways".parse::<SortOrder>().is_err());
    }

    #[test]
    fn sort_requires_both_parts() {
        assert!(Sort::from_parts(Some("id"), None).is_none());
        assert!(Sort::from_parts(None, Some(SortOrder::Asc)).is_none());
        assert!(Sort::from_parts(Some(""), Some(SortOrder::Asc)).is_none());
        assert_eq!(
            Sort::from_parts(Some("id"), Some(SortOrder::Desc)),
            Some(Sort::new("id", SortOrder::Desc))
        );
    }

    #[test]
    fn emits_sort_params_lowercase() {
        let sort = Sort::new("created_at", "DESC".parse().unwrap());
        let params = build_list_query(
            Pagination::default(),
            Some(&sort),
            &Filters::new(),
            &no_renames(),
        );
        assert!(has(&params, "sort_by", "created_at"));
        assert!(has(&params, "order", "desc"));
    }

    #[test]
    fn omits_sort_params_without_sort() {
        let params = build_list_query(
            Pagination::default(),
            None,
            &Filters::new(),
            &no_renames(),
        );
        assert_eq!(
            params,
            vec![
                ("skip".to_owned(), "0".to_owned()),
                ("limit".to_owned(), "10".to_owned()),
            ]
        );
    }

    #[test]
    fn empty_sort_field_emits_no_sort_params() {
        let sort = Sort::new("", SortOrder::Asc);
        let params = build_list_query(
            Pagination::default(),
            Some(&sort),
            &Filters::new(),
            &no_renames(),
        );
        assert!(!has_key(&params, "sort_by"));
        assert!(!has_key(&params, "order"));
    }

    #[test]
    fn drops_absent_filter_values() {
        let mut filters = Filters::new();
        filters.insert("status".into(), json!(""));
        filters.insert("notes".into(), json!(null));
        filters.insert("name".into(), json!("Massage"));

        let params = build_list_query(Pagination::default(), None, &filters, &no_renames());
        assert!(!has_key(&params, "status"));
        assert!(!has_key(&params, "notes"));
        assert!(has(&params, "name", "Massage"));
    }

    #[test]
    fn renames_filter_keys() {
        let mut renames = BTreeMap::new();
        renames.insert("status".to_owned(), "status_filter".to_owned());
        let mut filters = Filters::new();
        filters.insert("status".into(), json!("pending"));
        filters.insert("date_from".into(), json!("2024-01-01"));

        let params = build_list_query(Pagination::default(), None, &filters, &renames);
        assert!(has(&params, "status_filter", "pending"));
        assert!(!has_key(&params, "status"));
        assert!(has(&params, "date_from", "2024-01-01"));
    }

    #[test]
    fn encodes_non_string_values() {
        let mut filters = Filters::new();
        filters.insert("include_inactive".into(), json!(true));
        filters.insert("user_id".into(), json!(7));
        filters.insert("ids".into(), json!([1, "", 2]));
        filters.insert("range".into(), json!({"gte": 1}));

        let params = build_list_query(Pagination::default(), None, &filters, &no_renames());
        assert!(has(&params, "include_inactive", "true"));
        assert!(has(&params, "user_id", "7"));
        assert!(has(&params, "ids", "1"));
        assert!(has(&params, "ids", "2"));
        assert_eq!(params.iter().filter(|(k, _)| k == "ids").count(), 2);
        assert!(has(&params, "range", r#"{"gte":1}"#));
    }

    #[test]
    fn reference_query_injects_foreign_key() {
        let reference = ReferenceParams::new("user_id", 9);
        let params = build_reference_query(&reference, &no_renames());
        assert!(has(&params, "user_id", "9"));
        assert!(has(&params, "skip", "0"));
    }

    #[test]
    fn reference_filter_overrides_foreign_key() {
        let reference = ReferenceParams::new("user_id", 9)
            .list(ListParams::default().filter("user_id", 10));
        let params = build_reference_query(&reference, &no_renames());
        assert!(has(&params, "user_id", "10"));
        assert!(!has(&params, "user_id", "9"));
    }

    #[test]
    fn absent_filter_keeps_foreign_key() {
        for absent in [json!(""), json!(null)] {
            let reference = ReferenceParams::new("user_id", 9)
                .list(ListParams::default().filter("user_id", absent));
            let params = build_reference_query(&reference, &no_renames());
            assert!(has(&params, "user_id", "9"), "{params:?}");
        }
    }
}
