use factbook::format::{UnitKind, parse_number};
use factbook::narrative::TextCatalog;
use factbook::projection::{Projector, ValueFormat};
use factbook::view_state::DIMMED_OPACITY;
use factbook::{Category, Locale, Localized, Series, ViewState, YearRecord};

const KEYS: [&str; 3] = ["oil_gas", "electricity", "other"];

fn categories() -> Vec<Category> {
    vec![
        Category::new("oil_gas", Localized::new("Oil and gas", "Pétrole et gaz")),
        Category::new("electricity", Localized::new("Electricity", "Électricité")),
        Category::new("other", Localized::new("Other", "Autres")),
    ]
}

fn billions() -> ValueFormat {
    ValueFormat {
        divisor: 1_000_000.0,
        decimals: 1,
        kind: UnitKind::CurrencyBillions,
        suffix: Localized::new("($ billions)", "(milliards $)"),
    }
}

fn series() -> Series {
    Series::new(vec![
        YearRecord::from_values(
            2020,
            [("oil_gas", 1_000_000.0), ("electricity", 500_000.0), ("other", 250_000.0)],
        ),
        YearRecord::from_values(
            2021,
            [("oil_gas", 1_200_000.0), ("electricity", 600_000.0), ("other", 300_000.0)],
        ),
        YearRecord::from_values(
            2022,
            [("oil_gas", 900_000.0), ("electricity", 650_000.0), ("other", 350_000.0)],
        ),
    ])
    .unwrap()
}

fn projector<'a>(
    cats: &'a [Category],
    format: &'a ValueFormat,
    text: &'a TextCatalog,
    locale: Locale,
) -> Projector<'a> {
    Projector {
        title: "Capital expenditures",
        categories: cats,
        format,
        include_total: true,
        text,
        locale,
    }
}

#[test]
fn table_headers_carry_the_unit_suffix() {
    let (cats, fmt, text) = (categories(), billions(), TextCatalog::builtin());
    let table = projector(&cats, &fmt, &text, Locale::En).table(&series()).unwrap();
    assert_eq!(
        table.headers,
        [
            "Year",
            "Oil and gas ($ billions)",
            "Electricity ($ billions)",
            "Other ($ billions)",
            "Total ($ billions)"
        ]
    );
    let row = &table.rows[1];
    assert_eq!(row.header, "2021");
    let cells: Vec<&str> = row.cells.iter().map(|c| c.display.as_str()).collect();
    assert_eq!(cells, ["1.2", "0.6", "0.3", "2.1"]);
    assert_eq!(row.cells[0].aria_label, "Oil and gas, 2021: $1.2 billion");

    let fr = projector(&cats, &fmt, &text, Locale::Fr).table(&series()).unwrap();
    assert_eq!(fr.headers[0], "Année");
    assert_eq!(fr.rows[1].cells[0].display, "1,2");
}

#[test]
fn hover_text_has_value_and_share() {
    let (cats, fmt, text) = (categories(), billions(), TextCatalog::builtin());
    let chart = projector(&cats, &fmt, &text, Locale::En)
        .chart_series(&series(), &ViewState::new())
        .unwrap();
    let p = &chart[0].points[1];
    assert_eq!(p.hover, "Oil and gas (2021): $1.2 billion (57.1%)");
    assert_eq!(p.y, 1.2);
    assert!(chart.iter().all(|s| s.color.starts_with('#')));
}

#[test]
fn isolate_twice_restores_everything_and_clears_selection() {
    let mut view = ViewState::new();
    view.isolate("oil_gas", &KEYS);
    assert!(view.is_isolated("oil_gas", &KEYS));
    assert!(view.toggle_point("oil_gas", 0));
    assert!(view.selection().active().is_some());

    view.isolate("oil_gas", &KEYS);
    assert!(KEYS.iter().all(|k| view.is_visible(k)));
    assert!(view.selection().active().is_none());
}

#[test]
fn isolating_another_category_switches_focus() {
    let mut view = ViewState::new();
    view.isolate("oil_gas", &KEYS);
    view.isolate("other", &KEYS);
    assert!(view.is_isolated("other", &KEYS));
    assert!(!view.is_visible("oil_gas"));
}

#[test]
fn hiding_a_category_only_changes_the_chart() {
    let (cats, fmt, text) = (categories(), billions(), TextCatalog::builtin());
    let p = projector(&cats, &fmt, &text, Locale::En);
    let s = series();
    let before = p.project(&s, &ViewState::new()).unwrap();

    let mut view = ViewState::new();
    assert!(!view.toggle_category("oil_gas"));
    let after = p.project(&s, &view).unwrap();

    let visible: Vec<String> = p
        .visible_series(&s, &view)
        .unwrap()
        .into_iter()
        .map(|c| c.key)
        .collect();
    assert_eq!(visible, ["electricity", "other"]);
    assert_eq!(after.chart.len(), 3);
    assert!(!after.chart[0].visible);
    assert_eq!(after.table, before.table);
    assert_eq!(after.export, before.export);
}

#[test]
fn selection_dims_other_points_until_cleared() {
    let (cats, fmt, text) = (categories(), billions(), TextCatalog::builtin());
    let p = projector(&cats, &fmt, &text, Locale::En);
    let s = series();

    let mut view = ViewState::new();
    assert!(view.toggle_point("oil_gas", 1));
    let chart = p.chart_series(&s, &view).unwrap();
    assert_eq!(chart[0].points[1].opacity, 1.0);
    assert_eq!(chart[0].points[0].opacity, DIMMED_OPACITY);
    assert_eq!(chart[1].points[1].opacity, DIMMED_OPACITY);

    assert!(!view.toggle_point("oil_gas", 1));
    assert!(view.selection().active().is_none());

    view.toggle_point("other", 0);
    view.toggle_point("oil_gas", 2);
    view.clear_selection();
    let chart = p.chart_series(&s, &view).unwrap();
    assert!(chart.iter().flat_map(|c| &c.points).all(|pt| pt.opacity == 1.0));
}

#[test]
fn hidden_categories_cannot_hold_a_selection() {
    let mut view = ViewState::new();
    view.toggle_point("electricity", 2);
    view.set_visible("electricity", false);
    assert!(view.selection().is_empty());
    assert!(!view.toggle_point("electricity", 2));
    assert_eq!(view.hidden().collect::<Vec<_>>(), ["electricity"]);
}

#[test]
fn donut_follows_the_selected_year() {
    let (cats, fmt, text) = (categories(), billions(), TextCatalog::builtin());
    let p = projector(&cats, &fmt, &text, Locale::En);
    let s = series();
    let mut view = ViewState::new();

    let latest = p.donut(&s, &view).unwrap();
    assert!(latest.iter().all(|d| d.year == 2022));

    assert!(view.select_year(2020, &s));
    assert!(!view.select_year(1990, &s));
    let donut = p.donut(&s, &view).unwrap();
    assert_eq!(donut.len(), 3);
    assert!(donut.iter().all(|d| d.year == 2020));
    let sum: f64 = donut.iter().map(|d| d.share_pct).sum();
    assert!((sum - 100.0).abs() < 1e-9);
}

#[test]
fn export_cells_parse_back_to_table_values() {
    let (cats, fmt, text) = (categories(), billions(), TextCatalog::builtin());
    for locale in Locale::ALL {
        let proj = projector(&cats, &fmt, &text, locale)
            .project(&series(), &ViewState::new())
            .unwrap();
        assert_eq!(proj.export.headers, proj.table.headers);
        for (row, out) in proj.table.rows.iter().zip(&proj.export.rows) {
            assert_eq!(out[0], row.header);
            for (cell, text) in row.cells.iter().zip(&out[1..]) {
                assert_eq!(parse_number(text, locale), Some(cell.value), "{locale} {text}");
            }
        }
    }
}

#[test]
fn total_only_series_projects_a_single_total() {
    let fmt = ValueFormat {
        decimals: 2,
        ..ValueFormat::default()
    };
    let text = TextCatalog::builtin();
    let p = projector(&[], &fmt, &text, Locale::En);
    let s = Series::new(vec![
        YearRecord::total_only(2020, 100.0),
        YearRecord::total_only(2021, 150.0),
        YearRecord::total_only(2022, 120.0),
    ])
    .unwrap();
    let proj = p.project(&s, &ViewState::new()).unwrap();
    assert_eq!(proj.chart.len(), 1);
    assert_eq!(proj.chart[0].key, "total");
    assert!(proj.donut.is_empty());
    assert_eq!(proj.export.headers, ["Year", "Total"]);
    assert_eq!(proj.export.rows[1], ["2021", "150.00"]);
}

#[test]
fn panels_toggle_independently() {
    let mut view = ViewState::new();
    assert!(!view.is_panel_open("table"));
    assert!(view.toggle_panel("table"));
    assert!(!view.is_panel_open("notes"));
    assert!(!view.toggle_panel("table"));
}

#[test]
fn integer_cells_round_like_their_values() {
    let fmt = ValueFormat {
        divisor: 1000.0,
        decimals: 1,
        kind: UnitKind::Integer,
        suffix: Localized::same("(thousands)"),
    };
    let text = TextCatalog::builtin();
    let s = Series::new(vec![
        YearRecord::total_only(2020, 2500.0),
        YearRecord::total_only(2021, 3500.0),
        YearRecord::total_only(2022, 500.0),
    ])
    .unwrap();
    let p = projector(&[], &fmt, &text, Locale::En);
    let proj = p.project(&s, &ViewState::new()).unwrap();
    for (row, out) in proj.table.rows.iter().zip(&proj.export.rows) {
        let cell = &row.cells[0];
        assert_eq!(parse_number(&cell.display, Locale::En), Some(cell.value));
        assert_eq!(parse_number(&out[1], Locale::En), Some(cell.value));
    }

    let opts = factbook::metrics::DeriveOptions {
        display: Some(fmt.precision()),
        ..Default::default()
    };
    let m = factbook::metrics::derive::<&str>(&s, &[], &opts).unwrap();
    let shown = |year: i32| {
        let row = proj.table.rows.iter().find(|r| r.year == year).unwrap();
        parse_number(&row.cells[0].display, Locale::En).unwrap()
    };
    let reader = (shown(m.peak.year) - shown(m.latest.year)) / shown(m.peak.year) * 100.0;
    assert_eq!(m.decline_pct, Some(reader));
}
