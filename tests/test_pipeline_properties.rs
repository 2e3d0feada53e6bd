use recipes_etl::pipeline::{classify, filter_by_ingredient, parse_minutes, transform};
use recipes_etl::{Difficulty, Recipe};

#[test]
fn test_hours_and_minutes_grid() {
    for h in [0u32, 1, 2, 9, 10, 23, 48] {
        for m in [0u32, 1, 15, 30, 59, 90] {
            let text = format!("PT{h}H{m}M");
            assert_eq!(parse_minutes(Some(text.as_str())), h * 60 + m, "{text}");
        }
    }
}

#[test]
fn test_missing_component_contributes_zero() {
    for n in [0u32, 7, 45, 120] {
        assert_eq!(parse_minutes(Some(format!("PT{n}M").as_str())), n);
        assert_eq!(parse_minutes(Some(format!("PT{n}H").as_str())), n * 60);
    }
}

#[test]
fn test_classify_is_total_over_parsed_durations() {
    for h in 0..=5 {
        for m in 0..60 {
            let total = parse_minutes(Some(format!("PT{h}H{m}M").as_str()));
            assert_ne!(classify(i64::from(total)), Difficulty::Unknown);
        }
    }
}

#[test]
fn test_filter_idempotent_on_mixed_collection() {
    let records: Vec<Recipe> = [
        Some("beef"),
        None,
        Some("Roast BEEF"),
        Some("salmon"),
        Some("beefy broth"),
        Some(""),
    ]
    .into_iter()
    .map(|ingredients| Recipe::new(ingredients, None, None))
    .collect();

    let once = filter_by_ingredient(records, "beef");
    assert_eq!(once.len(), 3);
    assert_eq!(filter_by_ingredient(once.clone(), "beef"), once);
}

#[test]
fn test_every_retained_record_is_enriched() {
    let records = vec![
        Recipe::new(Some("beef"), None, None),
        Recipe::new(Some("beef"), Some("garbage"), Some("PT")),
        Recipe::new(Some("beef"), Some("PT2H"), Some("PT30M")),
    ];

    let enriched = transform(records, "beef");
    let summary: Vec<(u32, Difficulty)> = enriched
        .iter()
        .map(|r| (r.total_time_minutes, r.difficulty))
        .collect();

    assert_eq!(
        summary,
        vec![
            (0, Difficulty::Easy),
            (0, Difficulty::Easy),
            (150, Difficulty::Hard),
        ]
    );
}
