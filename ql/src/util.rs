use num_format::{CustomFormat, Grouping, ToFormattedString};

pub fn number_format() -> CustomFormat {
    CustomFormat::builder()
        .grouping(Grouping::Standard)
        .minus_sign("-")
        .separator("_")
        .build()
        .expect("static number format should be valid")
}

/// Formats a count for log output, e.g. `250000` => `250_000`
pub fn fmt_count(value: usize) -> String {
    value.to_formatted_string(&number_format())
}
