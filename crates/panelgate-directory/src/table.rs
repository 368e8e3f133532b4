//! Parsing the directory's delimiter-separated table.
//!
//! The first non-empty line is the header. Each following non-blank line is
//! split on a single-character delimiter and values are trimmed. There is no
//! quoting or escaping: a value containing the delimiter shifts every later
//! column of its row.

use panelgate_contracts::{
    error::{GateError, GateResult},
    role::{DirectoryRow, Role},
};

/// Parse `text` into directory rows.
///
/// Fails if the payload is empty or the header lacks an `email` or `role`
/// column. Rows with an empty email are dropped; missing trailing values are
/// treated as empty.
pub fn parse_table(text: &str, delimiter: char) -> GateResult<Vec<DirectoryRow>> {
    let mut lines = text.trim().lines();

    let header: Vec<String> = match lines.next() {
        Some(line) if !line.trim().is_empty() => line.split(delimiter).map(|h| h.trim().to_string()).collect(),
        _ => {
            return Err(GateError::Directory {
                reason: "directory table is empty".to_string(),
            })
        }
    };

    let column = |name: &str| {
        header.iter().position(|h| h == name).ok_or_else(|| GateError::Directory {
            reason: format!("directory table has no '{name}' column"),
        })
    };
    let email_col = column("email")?;
    let role_col = column("role")?;

    let rows = lines
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let values: Vec<&str> = line.split(delimiter).map(str::trim).collect();
            let email = values.get(email_col).copied().unwrap_or_default();
            if email.is_empty() {
                return None;
            }
            let role = Role::parse_lenient(values.get(role_col).copied().unwrap_or_default());
            Some(DirectoryRow {
                email: email.to_string(),
                role,
            })
        })
        .collect();

    Ok(rows)
}

/// The role of the first row whose email matches, ignoring case.
pub fn find_role(rows: &[DirectoryRow], email: &str) -> Option<Role> {
    rows.iter().find(|row| row.matches_email(email)).map(|row| row.role)
}
