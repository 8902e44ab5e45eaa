//! Pure transforms applied to remote lookup tables.

use std::collections::HashMap;

/// Build the composite product id used to join billing rows against the
/// product-type lookup: `<parent>-<child>`.
pub fn compose_product_id(parent: Option<&str>, child: Option<&str>) -> String {
    format!("{}-{}", parent.unwrap_or(""), child.unwrap_or(""))
}

/// Explode comma-separated `PRODUCT_LIMS_ID` lists into one entry per
/// trimmed id. Empty ids are dropped; on duplicates the first row wins.
pub fn explode_product_ids<I>(rows: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut map = HashMap::new();
    for (ids, name) in rows {
        for id in ids.split(',') {
            let id = id.trim();
            if id.is_empty() {
                continue;
            }
            map.entry(id.to_string()).or_insert_with(|| name.clone());
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_handles_missing_parts() {
        assert_eq!(compose_product_id(Some("7"), Some("12")), "7-12");
        assert_eq!(compose_product_id(None, Some("12")), "-12");
        assert_eq!(compose_product_id(Some("7"), None), "7-");
    }

    #[test]
    fn explode_splits_trims_and_drops_empties() {
        let map = explode_product_ids(vec![
            ("7-12, 7-13 ,".to_string(), "WGS".to_string()),
            ("".to_string(), "Empty".to_string()),
        ]);
        assert_eq!(map.get("7-12").map(String::as_str), Some("WGS"));
        assert_eq!(map.get("7-13").map(String::as_str), Some("WGS"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn explode_keeps_first_occurrence_on_duplicates() {
        let map = explode_product_ids(vec![
            ("1-1".to_string(), "First".to_string()),
            ("1-1".to_string(), "Second".to_string()),
        ]);
        assert_eq!(map.get("1-1").map(String::as_str), Some("First"));
    }
}
