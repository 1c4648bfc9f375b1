/// `[A-Za-z_][A-Za-z0-9_$#]*`, the identifier subset accepted for table names.
pub(crate) fn is_safe_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else { return false };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$' || c == '#')
}

/// `table` or `schema.table`.
pub(crate) fn is_safe_table_ref(s: &str) -> bool {
    let mut parts = s.split('.');
    let Some(first) = parts.next() else { return false };
    if !is_safe_identifier(first) {
        return false;
    }
    match parts.next() {
        None => true,
        Some(second) => parts.next().is_none() && is_safe_identifier(second),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_and_qualified_names() {
        assert!(is_safe_table_ref("employees"));
        assert!(is_safe_table_ref("hr.employees"));
        assert!(is_safe_table_ref("_tmp$1"));
    }

    #[test]
    fn rejects_anything_else() {
        assert!(!is_safe_table_ref(""));
        assert!(!is_safe_table_ref("1emp"));
        assert!(!is_safe_table_ref("a.b.c"));
        assert!(!is_safe_table_ref("emp; drop table x"));
        assert!(!is_safe_table_ref("hr."));
    }
}
