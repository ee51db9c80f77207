use serde::Deserialize;
use utoipa::IntoParams;

/// Query parameters for the main recipe listing. Each id list is
/// comma-separated; every listed id must match (see `query::filtered`).
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListRecipesParams {
    /// Comma-separated tag ids; a recipe must carry every one
    pub tags: Option<String>,
    /// Comma-separated ingredient ids; a recipe must carry every one
    pub ingredients: Option<String>,
}

/// Query parameters for the user-recipes and liked-recipes listings. Here
/// the id lists match any-of (see `query::owned_filtered`).
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct SearchRecipesParams {
    /// Case-insensitive substring match on the title
    pub search: Option<String>,
    /// Comma-separated tag ids; a recipe matching any one qualifies
    pub tags: Option<String>,
    /// Comma-separated ingredient ids; a recipe matching any one qualifies
    pub ingredients: Option<String>,
}

/// Parse a comma-separated id filter. A missing or empty parameter means
/// "no filter"; any non-integer token is a caller error.
pub fn parse_id_filter(param: Option<&str>) -> Result<Vec<i32>, String> {
    let raw = match param {
        Some(s) if !s.is_empty() => s,
        _ => return Ok(Vec::new()),
    };

    raw.split(',')
        .map(|token| {
            let token = token.trim();
            token
                .parse::<i32>()
                .map_err(|_| format!("Invalid id in filter: '{}'", token))
        })
        .collect()
}

/// Build an ILIKE pattern for substring search, escaping the LIKE
/// metacharacters in the user's input.
pub fn like_pattern(search: &str) -> String {
    format!(
        "%{}%",
        search.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_ids() {
        assert_eq!(parse_id_filter(Some("1,2,3")), Ok(vec![1, 2, 3]));
    }

    #[test]
    fn tolerates_spaces_around_ids() {
        assert_eq!(parse_id_filter(Some("1, 2")), Ok(vec![1, 2]));
    }

    #[test]
    fn missing_or_empty_means_no_filter() {
        assert_eq!(parse_id_filter(None), Ok(vec![]));
        assert_eq!(parse_id_filter(Some("")), Ok(vec![]));
    }

    #[test]
    fn rejects_non_integer_tokens() {
        assert!(parse_id_filter(Some("1,x")).is_err());
        assert!(parse_id_filter(Some("1,,2")).is_err());
        assert!(parse_id_filter(Some("1.5")).is_err());
    }

    #[test]
    fn like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("cur%ry"), "%cur\\%ry%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("plain"), "%plain%");
    }
}
