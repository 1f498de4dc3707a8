//! Display labels for language tags, credit roles and parental ratings

/// Language tag → display name
pub const LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("de", "Deutsch"),
    ("fi", "Suomi"),
    ("zh", "Chinese"),
];

/// TV-Anytime / MPEG-7 role href → credit label
pub const CREDIT_ROLES: &[(&str, &str)] = &[
    ("urn:tva:metadata:cs:TVARoleCS:2011:V20", "Production Company"),
    ("urn:tva:metadata:cs:TVARoleCS:2011:AD6", "Presenter"),
    ("urn:mpeg:mpeg7:cs:RoleCS:2001:ACTOR", "Actor"),
];

pub const RATING_NO_PARENTAL_CONTROLS: &str = "urn:fvc:metadata:cs:ContentRatingCS:2014-07:no_parental_controls";
pub const RATING_FIFTEEN: &str = "urn:fvc:metadata:cs:ContentRatingCS:2014-07:fifteen";

fn lookup(table: &'static [(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, label)| *label)
}

pub fn language_name(lang: &str) -> Option<&'static str> {
    lookup(LANGUAGES, lang)
}

pub fn role_name(href: &str) -> Option<&'static str> {
    lookup(CREDIT_ROLES, href)
}

/// Parental rating href → short label, `Unknown` for anything unlisted
pub fn parental_rating(href: &str) -> &'static str {
    match href {
        RATING_NO_PARENTAL_CONTROLS => "None",
        RATING_FIFTEEN => "15",
        _ => "Unknown",
    }
}
