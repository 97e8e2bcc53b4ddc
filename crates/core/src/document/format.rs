//! Escaping and display formatting for interpolated clinical data.
//!
//! Every value that reaches the document, header or footer markup passes through
//! [`escape_html`]; clinical fields are clinician-typed and must never be interpreted as
//! markup.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Escapes text for use in HTML element content and quoted attribute values.
///
/// Escaping rules:
/// - `&` → `&amp;`
/// - `<` → `&lt;`, `>` → `&gt;`
/// - `"` → `&quot;`, `'` → `&#39;`
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Formats a stored date as `dd/mm/yyyy`.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps and `YYYY-MM-DD HH:MM:SS`. Anything else is
/// returned unchanged; empty input stays empty.
pub fn format_date(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        });

    match date {
        Some(date) => date.format("%d/%m/%Y").to_string(),
        None => raw.to_string(),
    }
}

/// Formats a generation timestamp as `dd/mm/yyyy - HH:MM:SS`.
pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format("%d/%m/%Y - %H:%M:%S").to_string()
}

/// Request identifier printed in the page header (`SOL-000042`, `SOL-NOVA`).
pub fn request_code(id: Option<u64>) -> String {
    match id {
        Some(id) => format!("SOL-{id:06}"),
        None => "SOL-NOVA".to_string(),
    }
}

/// Appends a unit suffix to a non-empty value (`1.72` → `1.72 m²`).
pub fn with_unit(value: &str, unit: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        String::new()
    } else {
        format!("{value} {unit}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape_html(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#39;y&#39;&lt;/script&gt;"
        );
        assert_eq!(escape_html("Dose ≥ 2ª linha"), "Dose ≥ 2ª linha");
    }

    #[test]
    fn formats_stored_dates() {
        assert_eq!(format_date("2024-05-02"), "02/05/2024");
        assert_eq!(format_date("2024-05-02T00:00:00.000Z"), "02/05/2024");
        assert_eq!(format_date("2024-05-02 13:45:00"), "02/05/2024");
        assert_eq!(format_date("ontem"), "ontem");
        assert_eq!(format_date(""), "");
    }

    #[test]
    fn pads_request_code() {
        assert_eq!(request_code(Some(42)), "SOL-000042");
        assert_eq!(request_code(Some(1234567)), "SOL-1234567");
        assert_eq!(request_code(None), "SOL-NOVA");
    }

    #[test]
    fn unit_only_for_present_values() {
        assert_eq!(with_unit("68.5", "kg"), "68.5 kg");
        assert_eq!(with_unit(" ", "kg"), "");
    }

    #[test]
    fn formats_generation_timestamp() {
        let at = NaiveDate::from_ymd_opt(2024, 5, 2)
            .and_then(|d| d.and_hms_opt(9, 5, 7))
            .unwrap();
        assert_eq!(format_timestamp(at), "02/05/2024 - 09:05:07");
    }
}
