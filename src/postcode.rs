//! Postcode to region resolution
//!
//! Ranges compare as plain strings: "2000" < "999" because '2' < '9'.
//! Callers that want numeric order must pad postcodes to equal width.

use crate::region::{PostcodeRange, Region};

/// First region, in list order, with a rule that accepts `postcode`.
///
/// Per region the exact list is tried first, then ranges, then wildcards.
pub fn find_region<'a>(regions: &'a [Region], postcode: &str) -> Option<&'a Region> {
    regions.iter().find(|region| region_matches(region, postcode))
}

/// Whether any postcode rule of `region` accepts `postcode`
pub fn region_matches(region: &Region, postcode: &str) -> bool {
    region.postcodes.iter().any(|p| p == postcode)
        || region.postcode_ranges.iter().any(|r| match_range(r, postcode))
        || region.wildcard_postcodes.iter().any(|w| match_wildcard(w, postcode))
}

/// Inclusive lexical range check
pub fn match_range(range: &PostcodeRange, postcode: &str) -> bool {
    range.from.as_str() <= postcode && postcode <= range.to.as_str()
}

/// Match a pattern holding one `*`.
///
/// Trailing `*` is a prefix match, leading `*` a suffix match, and an
/// interior `*` requires both prefix and suffix independently (so they may
/// overlap on short postcodes). A pattern without `*` never matches.
pub fn match_wildcard(pattern: &str, postcode: &str) -> bool {
    let Some(star) = pattern.find('*') else {
        return false;
    };
    let prefix = &pattern[..star];
    let suffix = &pattern[star + 1..];

    if star == pattern.len() - 1 {
        postcode.starts_with(prefix)
    } else if star == 0 {
        postcode.ends_with(suffix)
    } else {
        postcode.starts_with(prefix) && postcode.ends_with(suffix)
    }
}
