use factbook::format::UnitKind;
use factbook::narrative::TextCatalog;
use factbook::projection::{Projection, Projector, ValueFormat};
use factbook::viz::{self, ChartKind, ChartRequest};
use factbook::{Category, Locale, Localized, Series, ViewState, YearRecord};

fn projection(view: &ViewState) -> Projection {
    let cats = vec![
        Category::new("oil_gas", Localized::new("Oil and gas", "Pétrole et gaz")),
        Category::new("electricity", Localized::new("Electricity", "Électricité")),
    ];
    let fmt = ValueFormat {
        divisor: 1_000_000.0,
        decimals: 1,
        kind: UnitKind::CurrencyBillions,
        suffix: Localized::new("($ billions)", "(milliards $)"),
    };
    let text = TextCatalog::builtin();
    let s = Series::new(vec![
        YearRecord::from_values(2019, [("oil_gas", 30_000_000.0), ("electricity", 12_000_000.0)]),
        YearRecord::from_values(2020, [("oil_gas", 22_000_000.0), ("electricity", 13_000_000.0)]),
        YearRecord::from_values(2021, [("oil_gas", 25_000_000.0), ("electricity", 14_500_000.0)]),
    ])
    .unwrap();
    Projector {
        title: "Capital expenditures",
        categories: &cats,
        format: &fmt,
        include_total: true,
        text: &text,
        locale: Locale::En,
    }
    .project(&s, view)
    .unwrap()
}

fn request<'a>(p: &'a Projection, kind: ChartKind, width: u32, height: u32) -> ChartRequest<'a> {
    ChartRequest {
        kind,
        title: "Capital expenditures",
        series: &p.chart,
        donut: &p.donut,
        width,
        height,
        locale: Locale::En,
        font: None,
    }
}

fn png_size(bytes: &[u8]) -> (u32, u32) {
    let w = u32::from_be_bytes(bytes[16..20].try_into().unwrap());
    let h = u32::from_be_bytes(bytes[20..24].try_into().unwrap());
    (w, h)
}

#[test]
fn png_has_signature_and_requested_size() {
    let p = projection(&ViewState::new());
    let bytes = viz::render_png(&request(&p, ChartKind::StackedBar, 800, 480)).unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    assert_eq!(&bytes[12..16], b"IHDR");
    assert_eq!(png_size(&bytes), (800, 480));
}

#[test]
fn donut_png_renders() {
    let mut view = ViewState::new();
    view.toggle_point("electricity", 1);
    let p = projection(&view);
    let bytes = viz::render_png(&request(&p, ChartKind::Donut, 640, 480)).unwrap();
    assert_eq!(png_size(&bytes), (640, 480));
}

#[test]
fn svg_is_decorated_once() {
    let mut view = ViewState::new();
    view.set_visible("oil_gas", false);
    let p = projection(&view);
    let svg = viz::render_svg(&request(&p, ChartKind::StackedBar, 960, 540)).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains("width=\"960\""));

    let decorated = viz::decorate_svg(&svg, "capex-chart", "Capital expenditures", "Bars").unwrap();
    let again = viz::decorate_svg(&decorated, "capex-chart", "Capital expenditures", "Bars").unwrap();
    assert_eq!(decorated, again);
    assert_eq!(decorated.matches("role=\"img\"").count(), 1);
    assert!(decorated.contains("aria-labelledby=\"capex-chart-title capex-chart-desc\""));
}

#[test]
fn tiny_charts_are_rejected() {
    let p = projection(&ViewState::new());
    assert!(viz::render_png(&request(&p, ChartKind::StackedBar, 20, 20)).is_err());
    assert!(viz::render_svg(&request(&p, ChartKind::Donut, 300, 100)).is_err());
}

#[test]
fn everything_hidden_still_renders_a_frame() {
    let mut view = ViewState::new();
    view.set_visible("oil_gas", false);
    view.set_visible("electricity", false);
    let p = projection(&view);
    let svg = viz::render_svg(&request(&p, ChartKind::Donut, 480, 360)).unwrap();
    assert!(svg.contains("</svg>"));
}
