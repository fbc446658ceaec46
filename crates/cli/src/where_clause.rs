// --where parsing: `Column=value` equality clauses

use sheetsift_recon::{FilterChain, Table};

use crate::CliError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhereClause {
    pub column: String,
    /// Quote-stripped; empty matches empty cells
    pub value: String,
}

pub fn parse_where(expr: &str) -> Result<WhereClause, CliError> {
    let Some((col, raw_value)) = expr.split_once('=') else {
        return Err(CliError::args(format!("no '=' found in --where {:?}", expr))
            .with_hint("syntax: --where 'Column=value'"));
    };

    let column = col.trim();
    if column.is_empty() {
        return Err(CliError::args(format!("empty column name in --where {:?}", expr)));
    }

    Ok(WhereClause {
        column: column.to_string(),
        value: strip_quotes(raw_value.trim()).to_string(),
    })
}

/// Strip one layer of surrounding quotes
fn strip_quotes(value: &str) -> &str {
    let quoted = value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')));
    if quoted {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Turn clauses into a chain whose values compare equal to the table's
/// cells: `25` matches a numeric cell in a numeric column, text otherwise.
pub fn resolve_chain(table: &Table, clauses: &[WhereClause]) -> Result<FilterChain, CliError> {
    let schema = table.schema();
    let mut chain = FilterChain::new();
    for clause in clauses {
        let descriptor = schema
            .column(&clause.column)
            .map_err(|e| CliError::recon(e, Some(table)))?;
        chain.insert(clause.column.clone(), descriptor.coerce(&clause.value));
    }
    Ok(chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit_codes::{EXIT_COLUMN, EXIT_USAGE};
    use sheetsift_recon::Value;

    #[test]
    fn parses_and_strips_quotes() {
        let clause = parse_where("City = 'São Paulo'").unwrap();
        assert_eq!(clause.column, "City");
        assert_eq!(clause.value, "São Paulo");

        assert_eq!(parse_where("Note=\"a=b\"").unwrap().value, "a=b");
        assert_eq!(parse_where("Note=").unwrap().value, "");
        assert_eq!(parse_where("Note=\"").unwrap().value, "\"");
    }

    #[test]
    fn rejects_malformed_clauses() {
        assert_eq!(parse_where("City").unwrap_err().code, EXIT_USAGE);
        assert_eq!(parse_where(" =Paris").unwrap_err().code, EXIT_USAGE);
    }

    #[test]
    fn values_follow_column_type() {
        let table = Table::new(
            vec!["Age".into(), "Code".into()],
            vec![vec![Value::Number(25.0), Value::text("25")]],
        )
        .unwrap();
        let clauses = [parse_where("Age=25").unwrap(), parse_where("Code=25").unwrap()];
        let chain = resolve_chain(&table, &clauses).unwrap();
        assert_eq!(chain.get("Age"), Some(&Value::Number(25.0)));
        assert_eq!(chain.get("Code"), Some(&Value::text("25")));
    }

    #[test]
    fn unknown_column_lists_available() {
        let table = Table::new(vec!["Age".into()], vec![]).unwrap();
        let err = resolve_chain(&table, &[parse_where("age=1").unwrap()]).unwrap_err();
        assert_eq!(err.code, EXIT_COLUMN);
        assert_eq!(err.hint.as_deref(), Some("available columns: Age"));
    }
}
