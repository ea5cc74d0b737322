use factbook::metrics::{
    self, DeriveOptions, DisplayPrecision, decline_pct, growth_since, percent_change, top_shares,
};
use factbook::{ReportError, Series, YearRecord};

fn totals(rows: &[(i32, f64)]) -> Series {
    Series::new(
        rows.iter()
            .map(|(y, t)| YearRecord::total_only(*y, *t))
            .collect(),
    )
    .unwrap()
}

fn sectors() -> Series {
    Series::new(vec![
        YearRecord::from_values(2020, [("oil_gas", 60.0), ("electricity", 30.0), ("other", 10.0)]),
        YearRecord::from_values(2021, [("oil_gas", 90.0), ("electricity", 40.0), ("other", 20.0)]),
        YearRecord::from_values(2022, [("oil_gas", 60.0), ("electricity", 40.0), ("other", 20.0)]),
    ])
    .unwrap()
}

#[test]
fn peak_decline_scenario() {
    let s = totals(&[(2020, 100.0), (2021, 150.0), (2022, 120.0)]);
    let m = metrics::derive::<&str>(&s, &[], &DeriveOptions::default()).unwrap();
    assert_eq!(m.peak.year, 2021);
    assert_eq!(m.latest.year, 2022);
    assert_eq!(m.trough.year, 2020);
    assert_eq!(m.decline_pct, Some(20.0));
    // No reference year configured: the latest year is its own baseline.
    assert_eq!(m.reference.year, 2022);
    assert_eq!(m.rebound_pct, Some(0.0));
}

#[test]
fn ties_resolve_to_the_first_occurrence() {
    let s = totals(&[(2018, 5.0), (2019, 9.0), (2020, 9.0), (2021, 5.0)]);
    assert_eq!(metrics::peak(&s).unwrap().year, 2019);
    assert_eq!(metrics::trough(&s).unwrap().year, 2018);
}

#[test]
fn missing_reference_year_falls_back_to_latest() {
    let s = totals(&[(2020, 100.0), (2021, 150.0)]);
    assert_eq!(metrics::reference_year(&s, 1999).unwrap().year, 2021);
    assert_eq!(metrics::reference_year(&s, 2020).unwrap().year, 2020);

    let opts = DeriveOptions {
        reference_year: Some(2020),
        ..Default::default()
    };
    let m = metrics::derive::<&str>(&s, &[], &opts).unwrap();
    assert_eq!(m.rebound_pct, Some(50.0));
}

#[test]
fn zero_denominators_are_not_applicable() {
    assert!(matches!(
        percent_change(0.0, 5.0),
        Err(ReportError::DivisionUndefined)
    ));
    assert!(matches!(
        decline_pct(0.0, 0.0),
        Err(ReportError::DivisionUndefined)
    ));

    let s = totals(&[(2020, 0.0), (2021, 0.0)]);
    let opts = DeriveOptions {
        reference_year: Some(2020),
        ..Default::default()
    };
    let m = metrics::derive::<&str>(&s, &[], &opts).unwrap();
    assert_eq!(m.decline_pct, None);
    assert_eq!(m.rebound_pct, None);
}

#[test]
fn empty_series_has_no_data() {
    let s = Series::new(Vec::new()).unwrap();
    assert!(matches!(
        metrics::derive::<&str>(&s, &[], &DeriveOptions::default()),
        Err(ReportError::NoDataAvailable)
    ));
    assert!(matches!(
        metrics::latest(&s),
        Err(ReportError::NoDataAvailable)
    ));
}

#[test]
fn display_precision_drives_the_percentages() {
    // 149.96 and 120.04 billion display as 150.0 and 120.0.
    let s = totals(&[(2021, 149_960_000.0), (2022, 120_040_000.0)]);
    let raw = metrics::derive::<&str>(&s, &[], &DeriveOptions::default()).unwrap();
    let raw_decline = raw.decline_pct.unwrap();
    assert!((raw_decline - 19.952).abs() < 0.001, "{raw_decline}");

    let opts = DeriveOptions {
        display: Some(DisplayPrecision {
            divisor: 1_000_000.0,
            decimals: 1,
        }),
        ..Default::default()
    };
    let shown = metrics::derive::<&str>(&s, &[], &opts).unwrap();
    assert_eq!(shown.decline_pct, Some(20.0));
}

#[test]
fn top_shares_rank_descending_with_stable_ties() {
    let s = sectors();
    let rec = s.get(2022).unwrap();
    let top = top_shares(rec, &["other", "electricity", "oil_gas"], 6).unwrap();
    let keys: Vec<&str> = top.iter().map(|t| t.key.as_str()).collect();
    assert_eq!(keys, ["oil_gas", "electricity", "other"]);
    assert_eq!(top[0].rank, 1);
    assert_eq!(top[0].share_pct, 50.0);

    let tied = Series::new(vec![YearRecord::from_values(
        2020,
        [("b", 10.0), ("a", 10.0), ("c", 5.0)],
    )])
    .unwrap();
    let top = top_shares(tied.get(2020).unwrap(), &["b", "a", "c"], 2).unwrap();
    let keys: Vec<&str> = top.iter().map(|t| t.key.as_str()).collect();
    assert_eq!(keys, ["b", "a"]);
}

#[test]
fn shares_keep_key_order_and_carry_ranks() {
    let s = sectors();
    let opts = DeriveOptions {
        selected_year: Some(2020),
        ..Default::default()
    };
    let m = metrics::derive(&s, &["other", "oil_gas", "electricity"], &opts).unwrap();
    assert_eq!(m.selected.year, 2020);
    let got: Vec<(&str, usize)> = m.shares.iter().map(|c| (c.key.as_str(), c.rank)).collect();
    assert_eq!(got, [("other", 3), ("oil_gas", 1), ("electricity", 2)]);
    let sum: f64 = m.shares.iter().map(|c| c.share_pct).sum();
    assert!((sum - 100.0).abs() < 1e-9);
}

#[test]
fn unknown_category_is_an_error_not_zero() {
    let s = sectors();
    let err = top_shares(s.get(2020).unwrap(), &["hydrogen"], 6).unwrap_err();
    assert!(matches!(err, ReportError::MissingCategory { year: 2020, .. }));
}

#[test]
fn zero_total_gives_zero_shares() {
    let s = Series::new(vec![YearRecord::from_values(2020, [("a", 0.0), ("b", 0.0)])]).unwrap();
    let top = top_shares(s.get(2020).unwrap(), &["a", "b"], 6).unwrap();
    assert!(top.iter().all(|t| t.share_pct == 0.0));
}

#[test]
fn growth_since_base_year() {
    let s = totals(&[(2005, 200.0), (2010, 250.0), (2015, 150.0)]);
    assert_eq!(growth_since(&s, 2005).unwrap(), vec![(2010, 25.0), (2015, -25.0)]);
    assert!(matches!(
        growth_since(&s, 2000),
        Err(ReportError::MissingYear(2000))
    ));

    let zero = totals(&[(2005, 0.0), (2010, 1.0)]);
    assert!(matches!(
        growth_since(&zero, 2005),
        Err(ReportError::DivisionUndefined)
    ));
}

#[test]
fn series_rejects_unordered_duplicate_and_negative_input() {
    let dup = Series::new(vec![
        YearRecord::total_only(2020, 1.0),
        YearRecord::total_only(2020, 2.0),
    ]);
    assert!(matches!(dup, Err(ReportError::DuplicateYear(2020))));

    let unordered = Series::new(vec![
        YearRecord::total_only(2021, 1.0),
        YearRecord::total_only(2020, 2.0),
    ]);
    assert!(matches!(
        unordered,
        Err(ReportError::UnorderedYears {
            prev: 2021,
            next: 2020
        })
    ));

    let negative = Series::new(vec![YearRecord::new(2020, [("a", -1.0)], 0.0)]);
    assert!(matches!(negative, Err(ReportError::InvalidValue { .. })));

    let nan = Series::new(vec![YearRecord::total_only(2020, f64::NAN)]);
    assert!(matches!(nan, Err(ReportError::InvalidValue { .. })));
}

#[test]
fn series_json_round_trip_validates() {
    let s = sectors();
    let json = serde_json::to_string(&s).unwrap();
    let back: Series = serde_json::from_str(&json).unwrap();
    assert_eq!(back, s);

    let bad = r#"[{"year":2021,"total":1.0},{"year":2020,"total":1.0}]"#;
    assert!(serde_json::from_str::<Series>(bad).is_err());
}
