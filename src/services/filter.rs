//! Turns the optional `date`, `month`/`year` and `branch` query parameters into
//! a `WHERE` predicate with positional placeholders.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::database::executor::SqlParam;
use crate::errors::ValidationError;
use crate::services::validation::parse_event_date;

/// Branch value meaning "every branch".
pub const ALL_BRANCHES: &str = "All";

const MATCH_ALL: &str = "1=1";

#[derive(Debug, Default, Clone, Deserialize)]
pub struct FilterParams {
    pub date: Option<String>,
    pub month: Option<String>,
    pub year: Option<String>,
    pub branch: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_month_year(month: &str, year: &str) -> Result<(i64, i64), ValidationError> {
    let month: i64 = month.parse().map_err(|_| ValidationError::InvalidMonthYear)?;
    let year: i64 = year.parse().map_err(|_| ValidationError::InvalidMonthYear)?;

    if !(1..=12).contains(&month) || year < 1000 {
        return Err(ValidationError::InvalidMonthYear);
    }
    Ok((month, year))
}

/// Builds the predicate and its parameters. Parameters are pushed in the
/// same order as their `?` placeholders appear.
pub fn build_filter(params: &FilterParams) -> Result<(String, Vec<SqlParam>), ValidationError> {
    let mut clauses: Vec<&str> = Vec::new();
    let mut values = Vec::new();

    if let Some(date) = present(&params.date) {
        let date: NaiveDate = parse_event_date(date)?;
        clauses.push("eventDate = ?");
        values.push(SqlParam::Date(date));
    } else if let (Some(month), Some(year)) = (present(&params.month), present(&params.year)) {
        let (month, year) = parse_month_year(month, year)?;
        clauses.push("MONTH(eventDate) = ? AND YEAR(eventDate) = ?");
        values.push(SqlParam::Int(month));
        values.push(SqlParam::Int(year));
    }

    if let Some(branch) = present(&params.branch) {
        if branch != ALL_BRANCHES {
            clauses.push("branch = ?");
            values.push(SqlParam::Text(branch.to_string()));
        }
    }

    if clauses.is_empty() {
        return Ok((MATCH_ALL.to_string(), values));
    }
    Ok((clauses.join(" AND "), values))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(date: Option<&str>, month: Option<&str>, year: Option<&str>, branch: Option<&str>) -> FilterParams {
        FilterParams {
            date: date.map(String::from),
            month: month.map(String::from),
            year: year.map(String::from),
            branch: branch.map(String::from),
        }
    }

    fn placeholders(predicate: &str) -> usize {
        predicate.matches('?').count()
    }

    #[test]
    fn no_filters_match_everything() {
        let (predicate, values) = build_filter(&FilterParams::default()).unwrap();
        assert_eq!(predicate, "1=1");
        assert!(values.is_empty());
    }

    #[test]
    fn exact_date_filter() {
        let (predicate, values) = build_filter(&params(Some("2025-03-10"), None, None, None)).unwrap();
        assert_eq!(predicate, "eventDate = ?");
        assert_eq!(
            values,
            vec![SqlParam::Date(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap())]
        );
    }

    #[test]
    fn date_takes_precedence_over_month_and_year() {
        let (predicate, values) =
            build_filter(&params(Some("2025-03-10"), Some("7"), Some("2024"), None)).unwrap();
        assert_eq!(predicate, "eventDate = ?");
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn malformed_date_is_rejected() {
        for bad in ["10-03-2025", "2025/03/10", "2025-3-10", "tomorrow", "2025-02-30"] {
            assert_eq!(
                build_filter(&params(Some(bad), None, None, None)).unwrap_err(),
                ValidationError::InvalidDate,
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn month_and_year_filter() {
        let (predicate, values) = build_filter(&params(None, Some("3"), Some("2025"), None)).unwrap();
        assert_eq!(predicate, "MONTH(eventDate) = ? AND YEAR(eventDate) = ?");
        assert_eq!(values, vec![SqlParam::Int(3), SqlParam::Int(2025)]);
    }

    #[test]
    fn month_or_year_alone_is_ignored() {
        let (predicate, _) = build_filter(&params(None, Some("3"), None, None)).unwrap();
        assert_eq!(predicate, "1=1");

        let (predicate, _) = build_filter(&params(None, None, Some("2025"), None)).unwrap();
        assert_eq!(predicate, "1=1");
    }

    #[test]
    fn out_of_range_month_or_year_is_rejected() {
        for (month, year) in [("0", "2025"), ("13", "2025"), ("3", "999"), ("march", "2025"), ("3", "20x5")] {
            assert_eq!(
                build_filter(&params(None, Some(month), Some(year), None)).unwrap_err(),
                ValidationError::InvalidMonthYear,
                "{month}/{year} should be rejected"
            );
        }
    }

    #[test]
    fn branch_all_is_the_same_as_no_branch() {
        let (with_all, values) = build_filter(&params(None, None, None, Some("All"))).unwrap();
        let (without, _) = build_filter(&FilterParams::default()).unwrap();
        assert_eq!(with_all, without);
        assert!(values.is_empty());
    }

    #[test]
    fn branch_combines_with_date_in_placeholder_order() {
        let (predicate, values) =
            build_filter(&params(Some("2025-03-10"), None, None, Some("Downtown"))).unwrap();
        assert_eq!(predicate, "eventDate = ? AND branch = ?");
        assert_eq!(values.len(), placeholders(&predicate));
        assert_eq!(values[1], SqlParam::Text("Downtown".into()));
    }

    #[test]
    fn branch_combines_with_month_and_year_in_placeholder_order() {
        let (predicate, values) =
            build_filter(&params(None, Some("12"), Some("2025"), Some("Lakeside"))).unwrap();
        assert_eq!(
            predicate,
            "MONTH(eventDate) = ? AND YEAR(eventDate) = ? AND branch = ?"
        );
        assert_eq!(
            values,
            vec![
                SqlParam::Int(12),
                SqlParam::Int(2025),
                SqlParam::Text("Lakeside".into())
            ]
        );
    }

    #[test]
    fn blank_parameters_count_as_absent() {
        let (predicate, values) = build_filter(&params(Some(""), Some(" "), Some(""), Some(""))).unwrap();
        assert_eq!(predicate, "1=1");
        assert!(values.is_empty());
    }

    #[test]
    fn branch_value_is_never_inlined() {
        let (predicate, values) =
            build_filter(&params(None, None, None, Some("x' OR '1'='1"))).unwrap();
        assert_eq!(predicate, "branch = ?");
        assert_eq!(values, vec![SqlParam::Text("x' OR '1'='1".into())]);
    }
}
