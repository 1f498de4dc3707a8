//! XML entity decoding

/// Resolve a single entity name (the part between `&` and `;`).
///
/// Handles the five predefined entities, `nbsp`, and decimal/hex
/// character references. Unknown names yield `None`.
pub fn decode_entity(name: &str) -> Option<String> {
    match name {
        "amp" => Some("&".to_string()),
        "lt" => Some("<".to_string()),
        "gt" => Some(">".to_string()),
        "quot" => Some("\"".to_string()),
        "apos" => Some("'".to_string()),
        "nbsp" => Some(" ".to_string()),
        _ => {
            let num = name.strip_prefix('#')?;
            // Check for hex (&#x...) or decimal (&#...)
            let code = if let Some(hex) = num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                num.parse::<u32>().ok()?
            };
            char::from_u32(code).map(|c| c.to_string())
        }
    }
}

/// Decode XML entities back to normal characters.
///
/// Single pass, so `&amp;lt;` becomes `&lt;` and not `<`. Malformed or
/// unknown references are kept verbatim.
pub fn decode_xml_entities(s: &str) -> String {
    // Fast path: no entities
    if !s.contains('&') {
        return s.to_string();
    }

    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(amp) = rest.find('&') {
        result.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];

        // Entity names are short; don't scan the whole remainder
        let decoded = after
            .find(';')
            .filter(|&end| end > 0 && end <= 10)
            .and_then(|end| decode_entity(&after[..end]).map(|text| (text, end)));

        match decoded {
            Some((text, end)) => {
                result.push_str(&text);
                rest = &after[end + 1..];
            }
            None => {
                result.push('&');
                rest = after;
            }
        }
    }
    result.push_str(rest);

    result
}
