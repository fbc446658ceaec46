// Header row cleanup shared by the CSV and spreadsheet loaders

use std::collections::HashSet;

/// Make a raw header row usable as Table columns: blank cells become
/// `Unnamed: <index>`, repeated names get `.1`, `.2`, ... suffixes.
pub fn clean_headers<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let names: Vec<String> = raw
        .into_iter()
        .enumerate()
        .map(|(i, s)| {
            let trimmed = s.as_ref().trim();
            if trimmed.is_empty() {
                format!("Unnamed: {i}")
            } else {
                trimmed.to_string()
            }
        })
        .collect();

    // Reserve every original name first so a suffix never steals one.
    let mut taken: HashSet<String> = names.iter().cloned().collect();
    let mut seen: HashSet<&str> = HashSet::with_capacity(names.len());
    let mut out = Vec::with_capacity(names.len());
    for name in &names {
        if seen.insert(name.as_str()) {
            out.push(name.clone());
            continue;
        }
        let mut n = 1;
        let mut candidate = format!("{name}.{n}");
        while taken.contains(&candidate) {
            n += 1;
            candidate = format!("{name}.{n}");
        }
        taken.insert(candidate.clone());
        out.push(candidate);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_headers_get_positional_names() {
        assert_eq!(clean_headers(["CPF", "", "  "]), ["CPF", "Unnamed: 1", "Unnamed: 2"]);
    }

    #[test]
    fn duplicates_get_numbered() {
        assert_eq!(
            clean_headers(["Name", "Name", "CPF", "Name"]),
            ["Name", "Name.1", "CPF", "Name.2"]
        );
    }

    #[test]
    fn suffix_skips_existing_names() {
        assert_eq!(clean_headers(["A", "A", "A.1"]), ["A", "A.2", "A.1"]);
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert_eq!(clean_headers([" CPF "]), ["CPF"]);
    }
}
