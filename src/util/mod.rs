/// Split an action URL into the request URL and its query parameters.
///
/// Rules:
/// - Everything after the first `?` is the query; a `#fragment` is dropped.
/// - Parameters are separated by `&` or `;`; empty segments are skipped.
/// - A parameter splits on its first `=`; without one the value is empty.
/// - Keys and values are percent-decoded, keeping the raw text if decoding fails.
pub(crate) fn split_url_query(url: &str) -> (String, Vec<(String, String)>) {
    let url = url.split('#').next().unwrap_or_default();

    let Some((base, query)) = url.split_once('?') else {
        return (url.to_string(), Vec::new());
    };

    let params = query
        .split(['&', ';'])
        .filter(|seg| !seg.is_empty())
        .map(|seg| {
            let (k, v) = seg.split_once('=').unwrap_or((seg, ""));
            (decode_component(k), decode_component(v))
        })
        .collect();

    (base.to_string(), params)
}

fn decode_component(raw: &str) -> String {
    // Form encoding uses `+` for spaces.
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    }
}

/// Insert or replace `key` in an ordered parameter list.
pub(crate) fn merge_param(params: &mut Vec<(String, String)>, key: String, value: String) {
    if let Some(slot) = params.iter_mut().find(|(k, _)| *k == key) {
        slot.1 = value;
    } else {
        params.push((key, value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_split_url_without_query() {
        let (base, params) = split_url_query("/bin/rest/BookmakerPlugin/add");
        assert_eq!(base, "/bin/rest/BookmakerPlugin/add");
        assert!(params.is_empty());
    }

    #[test]
    fn test_split_url_with_ampersand_and_semicolon() {
        let (base, params) = split_url_query("/rest/add?a=1&b=2;c=3");
        assert_eq!(base, "/rest/add");
        assert_eq!(params, pairs(&[("a", "1"), ("b", "2"), ("c", "3")]));
    }

    #[test]
    fn test_split_on_first_equals_only() {
        let (_, params) = split_url_query("/x?expr=a=b&flag");
        assert_eq!(params, pairs(&[("expr", "a=b"), ("flag", "")]));
    }

    #[test]
    fn test_split_skips_empty_segments_and_fragment() {
        let (base, params) = split_url_query("/x?&a=1;;b=2&#top");
        assert_eq!(base, "/x");
        assert_eq!(params, pairs(&[("a", "1"), ("b", "2")]));
    }

    #[test]
    fn test_split_decodes_components() {
        let (_, params) = split_url_query("/x?topic=Web.My%20Topic&title=A+B&bad=%E0%A4%A");
        assert_eq!(
            params,
            pairs(&[
                ("topic", "Web.My Topic"),
                ("title", "A B"),
                ("bad", "%E0%A4%A"),
            ])
        );
    }

    #[test]
    fn test_undecodable_component_keeps_plus_signs() {
        let (_, params) = split_url_query("/x?bad=a+%E0&ok=a+b");
        assert_eq!(params, pairs(&[("bad", "a+%E0"), ("ok", "a b")]));
    }

    #[test]
    fn test_merge_param_replaces_existing_key_in_place() {
        let mut params = pairs(&[("validation_key", "k1"), ("a", "1")]);
        merge_param(&mut params, "validation_key".to_string(), "k2".to_string());
        merge_param(&mut params, "b".to_string(), "2".to_string());
        assert_eq!(
            params,
            pairs(&[("validation_key", "k2"), ("a", "1"), ("b", "2")])
        );
    }
}
