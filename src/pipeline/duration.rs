// Parsing of the `PT<h>H<m>M` duration subset used by the source data.

const PREFIX: &str = "PT";

/// Convert a duration such as `PT1H30M` into whole minutes.
///
/// Only the hours (`H`) and minutes (`M`) components are read; either may be
/// missing. Anything that cannot be parsed contributes 0, and an absent field
/// yields 0 as well, so callers cannot tell "no data" apart from "zero
/// minutes" by looking at the result.
///
/// # Examples
/// ```
/// use recipes_etl::pipeline::parse_minutes;
///
/// assert_eq!(parse_minutes(Some("PT1H30M")), 90);
/// assert_eq!(parse_minutes(Some("PT45M")), 45);
/// assert_eq!(parse_minutes(None), 0);
/// ```
pub fn parse_minutes(duration: Option<&str>) -> u32 {
    let Some(body) = duration.and_then(strip_prefix) else {
        return 0;
    };

    let hours = component(body, 'H');
    let minutes = component(body, 'M');
    hours.saturating_mul(60).saturating_add(minutes)
}

/// Sum of the normalized prep and cook durations
pub fn total_minutes(prep_time: Option<&str>, cook_time: Option<&str>) -> u32 {
    parse_minutes(prep_time).saturating_add(parse_minutes(cook_time))
}

/// Text between the first `PT` and the next one, if the prefix is present
fn strip_prefix(duration: &str) -> Option<&str> {
    duration.split(PREFIX).nth(1)
}

/// Digits directly in front of the first `designator`, or 0
fn component(body: &str, designator: char) -> u32 {
    let Some(pos) = body.find(designator) else {
        return 0;
    };

    let head = &body[..pos];
    let start = head
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map_or(pos, |(i, _)| i);

    head[start..].parse().unwrap_or(0)
}
