//! ABOUTME: Synonym-expanded query variants, up to 5 total (spec §4.E)

use docbro_config::synonyms::SynonymMap;

const MAX_VARIANTS: usize = 5;

/// `original` plus up to 4 single-token synonym substitutions, in the order
/// encountered. If `synonyms` is `None`, returns just `[original]`.
#[must_use]
pub fn expand_query(query: &str, synonyms: Option<&SynonymMap>) -> Vec<String> {
    let mut variants = vec![query.to_string()];
    let Some(map) = synonyms else { return variants };

    'tokens: for token in query.split_whitespace() {
        let lower = token.to_lowercase();
        for synonym in map.synonyms_for(&lower) {
            if variants.len() >= MAX_VARIANTS {
                break 'tokens;
            }
            let variant = query.replacen(token, synonym, 1);
            if !variants.contains(&variant) {
                variants.push(variant);
            }
        }
    }

    variants.truncate(MAX_VARIANTS);
    variants
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expansion_disabled_yields_only_original() {
        assert_eq!(expand_query("install docs", None), vec!["install docs".to_string()]);
    }

    #[test]
    fn expands_up_to_five_variants() {
        let mut map = SynonymMap::default();
        map.entries.insert("install".to_string(), vec!["setup".to_string(), "configure".to_string()]);
        let variants = expand_query("install docs", Some(&map));
        assert_eq!(variants[0], "install docs");
        assert!(variants.contains(&"setup docs".to_string()));
        assert!(variants.contains(&"configure docs".to_string()));
        assert!(variants.len() <= 5);
    }

    #[test]
    fn never_exceeds_five_variants() {
        let mut map = SynonymMap::default();
        map.entries.insert(
            "install".to_string(),
            vec!["a".to_string(), "b".to_string(), "c".to_string(), "d".to_string(), "e".to_string()],
        );
        let variants = expand_query("install", Some(&map));
        assert_eq!(variants.len(), 5);
    }
}
