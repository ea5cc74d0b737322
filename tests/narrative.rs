use factbook::narrative::{Slot, TextCatalog, TextLookup, render_template};
use factbook::{Locale, ReportError};

fn decline_slots() -> Vec<(&'static str, Slot)> {
    vec![
        ("title", Slot::Text("Capital spending".into())),
        (
            "peak_value",
            Slot::Currency {
                thousands: 150_000_000.0,
                decimals: 1,
            },
        ),
        ("peak_year", Slot::Year(2021)),
        ("latest_year", Slot::Year(2022)),
        ("decline_pct", Slot::Percent(Some(20.0))),
        (
            "latest_value",
            Slot::Currency {
                thousands: 120_000_000.0,
                decimals: 1,
            },
        ),
    ]
}

#[test]
fn english_decline_sentence() {
    let cat = TextCatalog::builtin();
    let s = render_template(&cat, "narrative.decline", Locale::En, &decline_slots()).unwrap();
    assert_eq!(
        s,
        "Capital spending peaked at $150.0 billion in 2021. By 2022, it had declined 20% to $120.0 billion."
    );
}

#[test]
fn french_orders_fragments_independently() {
    let cat = TextCatalog::builtin();
    let s = render_template(&cat, "narrative.decline", Locale::Fr, &decline_slots()).unwrap();
    assert!(s.starts_with("C'est en 2021 que Capital spending"), "{s}");
    assert!(s.contains("150,0\u{a0}milliards\u{a0}$"), "{s}");
    assert!(s.contains("20\u{a0}%"), "{s}");
    // Year comes before the value in French, after it in English.
    let year = s.find("2021").unwrap();
    let value = s.find("150,0").unwrap();
    assert!(year < value);
}

#[test]
fn not_applicable_percent_renders_per_locale() {
    let cat = TextCatalog::builtin();
    let slots = [
        ("reference_year", Slot::Year(2019)),
        ("rebound_pct", Slot::Percent(None)),
    ];
    assert_eq!(
        render_template(&cat, "narrative.rebound", Locale::En, &slots).unwrap(),
        "Compared with 2019, the total changed by n/a."
    );
    assert_eq!(
        render_template(&cat, "narrative.rebound", Locale::Fr, &slots).unwrap(),
        "Par rapport à 2019, le total a varié de s.o."
    );
    let growth = [
        ("base_year", Slot::Year(2005)),
        ("latest_year", Slot::Year(2021)),
        ("growth_pct", Slot::Percent(None)),
    ];
    let fr = render_template(&cat, "narrative.growth", Locale::Fr, &growth).unwrap();
    assert!(!fr.contains(".."), "{fr}");
}

#[test]
fn toml_overrides_replace_one_locale() {
    let cat = TextCatalog::from_toml_str(
        r#"
[en]
"narrative.rebound" = "Versus {reference_year}: {rebound_pct}."
"#,
    )
    .unwrap();
    let slots = [
        ("reference_year", Slot::Year(2019)),
        ("rebound_pct", Slot::Percent(Some(12.4))),
    ];
    assert_eq!(
        render_template(&cat, "narrative.rebound", Locale::En, &slots).unwrap(),
        "Versus 2019: 12%."
    );
    // French keeps the built-in template.
    assert!(
        render_template(&cat, "narrative.rebound", Locale::Fr, &slots)
            .unwrap()
            .starts_with("Par rapport à 2019")
    );
}

#[test]
fn unknown_keys_and_placeholders_fail() {
    let cat = TextCatalog::builtin();
    assert!(matches!(
        cat.text("narrative.nope", Locale::En),
        Err(ReportError::MissingText { .. })
    ));

    let mut cat = TextCatalog::builtin();
    cat.insert(Locale::En, "custom", "Hello {who}");
    let err = render_template(&cat, "custom", Locale::En, &[("name", Slot::Text("x".into()))])
        .unwrap_err();
    match err {
        ReportError::UnknownPlaceholder {
            template,
            placeholder,
        } => {
            assert_eq!(template, "custom");
            assert_eq!(placeholder, "who");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn slots_render_typed_values() {
    assert_eq!(Slot::Ordinal(3).render(Locale::En), "3rd");
    assert_eq!(Slot::Ordinal(1).render(Locale::Fr), "1er");
    assert_eq!(
        Slot::Number {
            value: 1234.56,
            decimals: 1
        }
        .render(Locale::Fr),
        "1\u{a0}234,6"
    );
    assert_eq!(Slot::PercentDetail(Some(57.142)).render(Locale::En), "57.1%");
}

#[test]
fn empty_catalog_has_nothing() {
    let cat = TextCatalog::empty();
    assert!(cat.text("year", Locale::En).is_err());
}
