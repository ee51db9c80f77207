//! Query parameters shared by the tag and ingredient listings.

use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListAttrsParams {
    /// 0 or 1. Accepted for API compatibility; the listing does not
    /// restrict to attributes assigned to a recipe (see the listing
    /// handlers' query tests).
    pub assigned_only: Option<String>,
}

/// Parse the `assigned_only` flag: any integer is accepted, zero is
/// false, everything else is true.
pub fn parse_assigned_only(param: Option<&str>) -> Result<bool, String> {
    match param {
        None => Ok(false),
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map(|n| n != 0)
            .map_err(|_| format!("Invalid assigned_only value: '{}'", raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_defaults_to_false() {
        assert_eq!(parse_assigned_only(None), Ok(false));
    }

    #[test]
    fn zero_and_one_parse() {
        assert_eq!(parse_assigned_only(Some("0")), Ok(false));
        assert_eq!(parse_assigned_only(Some("1")), Ok(true));
    }

    #[test]
    fn any_nonzero_integer_is_true() {
        assert_eq!(parse_assigned_only(Some("2")), Ok(true));
    }

    #[test]
    fn non_integer_is_rejected() {
        assert!(parse_assigned_only(Some("yes")).is_err());
        assert!(parse_assigned_only(Some("")).is_err());
    }
}
