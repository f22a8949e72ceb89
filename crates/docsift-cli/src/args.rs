//! Parsers for the compact `FIELD:OP:VALUE` style arguments.

use docsift::{Dir, FieldType, FilterCondition, FilterOp, QueryCondition, SortKey};

/// Parses `FIELD:OPERATOR[:VALUE]` into a filter condition.
///
/// The value may itself contain colons. Without a value the condition only
/// makes sense for the null checks.
pub fn parse_filter(spec: &str) -> Result<FilterCondition, String> {
    let mut parts = spec.splitn(3, ':');
    let field = parts.next().unwrap_or_default().trim();
    let operator = parts
        .next()
        .map(str::trim)
        .filter(|op| !op.is_empty())
        .ok_or_else(|| format!("expected FIELD:OPERATOR[:VALUE], got `{spec}`"))?;
    if field.is_empty() {
        return Err(format!("missing field name in `{spec}`"));
    }
    let op = FilterOp::parse(operator);
    if !op.is_known() {
        return Err(format!("unknown operator `{operator}`"));
    }
    Ok(match parts.next() {
        Some(value) => FilterCondition::new(field, op, value),
        // The null checks ignore the value but still need one to be active.
        None if op.is_null_check() || matches!(op, FilterOp::IsNotNull | FilterOp::IsNotEmpty) => {
            FilterCondition::new(field, op, "-")
        }
        None => FilterCondition::unary(field, op),
    })
}

/// Parses `FIELD=TYPE`.
pub fn parse_type(spec: &str) -> Result<(String, FieldType), String> {
    let (field, ty) = spec
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=TYPE, got `{spec}`"))?;
    let ty = ty.trim();
    let field_type = FieldType::parse(ty);
    if field_type == FieldType::String && !ty.eq_ignore_ascii_case("string") {
        return Err(format!(
            "unknown type `{ty}` (expected string, number, boolean, date, array, null or object)"
        ));
    }
    Ok((field.trim().to_owned(), field_type))
}

/// Parses `FIELD[:DIRECTION]`; the direction defaults to ascending.
pub fn parse_sort(spec: &str) -> Result<SortKey, String> {
    let (field, dir) = match spec.rsplit_once(':') {
        Some((field, dir)) => (field, Dir::parse(dir)),
        None => (spec, Dir::Asc),
    };
    let field = field.trim();
    if field.is_empty() {
        return Err(format!("missing field name in `{spec}`"));
    }
    Ok(SortKey::new(field, dir))
}

/// Parses `FIELD:$OP:VALUE` into a query-builder row.
pub fn parse_where(spec: &str) -> Result<QueryCondition, String> {
    let mut parts = spec.splitn(3, ':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(field), Some(op), Some(value)) if !field.trim().is_empty() => {
            let op = op.trim();
            let op = if op.starts_with('$') {
                op.to_owned()
            } else {
                format!("${op}")
            };
            Ok(QueryCondition::new(field.trim(), op, value))
        }
        _ => Err(format!("expected FIELD:$OPERATOR:VALUE, got `{spec}`")),
    }
}

/// Splits a comma-separated field list, dropping blanks.
pub fn parse_field_list(spec: &str) -> Vec<String> {
    spec.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn filters() {
        let cond = parse_filter("age:greaterThan:30").unwrap();
        assert_eq!(cond.field, "age");
        assert_eq!(cond.operator, FilterOp::GreaterThan);
        assert_eq!(cond.value, Some(json!("30")));

        let url = parse_filter("site:startsWith:https://x").unwrap();
        assert_eq!(url.value, Some(json!("https://x")));

        let alias = parse_filter("n:>=:1").unwrap();
        assert_eq!(alias.operator, FilterOp::GreaterThanOrEqual);

        let null = parse_filter("email:isNull").unwrap();
        assert!(!null.is_vacuous());
        assert!(parse_filter("email:contains").unwrap().is_vacuous());

        assert!(parse_filter("age").is_err());
        assert!(parse_filter(":equals:1").is_err());
        assert!(parse_filter("age:near:1").is_err());
    }

    #[test]
    fn types() {
        assert_eq!(parse_type("age=number").unwrap(), ("age".to_string(), FieldType::Number));
        assert_eq!(parse_type("at = Date").unwrap(), ("at".to_string(), FieldType::Date));
        assert!(parse_type("age=integer").is_err());
        assert!(parse_type("age").is_err());
    }

    #[test]
    fn sorts() {
        assert_eq!(parse_sort("age").unwrap(), SortKey::asc("age"));
        assert_eq!(parse_sort("age:desc").unwrap(), SortKey::desc("age"));
        assert_eq!(parse_sort("age:ASCENDING").unwrap(), SortKey::asc("age"));
        assert!(parse_sort(":desc").is_err());
    }

    #[test]
    fn wheres() {
        assert_eq!(
            parse_where("age:$gt:25").unwrap(),
            QueryCondition::new("age", "$gt", "25")
        );
        assert_eq!(
            parse_where("tags:in:a,b").unwrap(),
            QueryCondition::new("tags", "$in", "a,b")
        );
        assert_eq!(
            parse_where("at:$gte:2024-01-01T10:00").unwrap().value,
            "2024-01-01T10:00"
        );
        assert!(parse_where("age:$gt").is_err());
    }

    #[test]
    fn field_lists() {
        assert_eq!(parse_field_list("a, b,,c "), vec!["a", "b", "c"]);
        assert!(parse_field_list("").is_empty());
    }
}
