use std::path::Path;

use console::Style;
use starscope_core::io::{FitsHeader, ImageGeometry};
use starscope_core::FrameAnalysis;

/// Tracking error above this is flagged.
const TRACKING_WARN: f64 = 2.0;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    good: Style,
    bad: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            good: Style::new().green(),
            bad: Style::new().red().bold(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

fn underline(text: &str) -> String {
    "\u{2550}".repeat(text.chars().count())
}

pub fn print_frame_analysis(path: &Path, result: &FrameAnalysis, show_tiles: bool) {
    let s = Styles::new();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    println!();
    println!("  {}", s.title.apply_to(&name));
    println!("  {}", s.title.apply_to(underline(&name)));
    println!();

    println!(
        "  {:<16}{}",
        s.label.apply_to("Path"),
        s.path.apply_to(path.display())
    );
    println!(
        "  {:<16}{}",
        s.label.apply_to("Stars"),
        s.value.apply_to(result.star_count)
    );

    if result.star_count == 0 {
        println!(
            "  {:<16}{}",
            s.label.apply_to("FWHM"),
            s.disabled.apply_to("no stars detected")
        );
    } else {
        println!(
            "  {:<16}{}",
            s.label.apply_to("FWHM"),
            s.value.apply_to(format!("{:.2} px", result.fwhm))
        );
    }
    println!(
        "  {:<16}{}",
        s.label.apply_to("Elongation p90"),
        s.value.apply_to(format!("{:.3}", result.star_elongation_p90))
    );
    println!(
        "  {:<16}{}",
        s.label.apply_to("Elongation max"),
        s.value.apply_to(format!("{:.3}", result.star_elongation_max))
    );
    println!(
        "  {:<16}{}",
        s.label.apply_to("Noise"),
        s.value.apply_to(format!("{:.4}", result.background_noise))
    );

    let tracking = format!("{:.2}", result.tracking_error);
    let tracking_style = if result.tracking_error > TRACKING_WARN {
        &s.bad
    } else {
        &s.good
    };
    println!(
        "  {:<16}{}",
        s.label.apply_to("Tracking error"),
        tracking_style.apply_to(tracking)
    );

    if show_tiles {
        println!();
        println!("  {}", s.header.apply_to("Tiles"));
        println!(
            "    {:>6} {:>6} {:>6} {:>6}  {:>6}  {:>8}  {:>8}",
            "x", "y", "w", "h", "stars", "p90", "max"
        );
        for t in &result.tiles {
            println!(
                "    {:>6} {:>6} {:>6} {:>6}  {:>6}  {:>8.3}  {:>8.3}",
                t.x, t.y, t.w, t.h, t.star_count, t.p90_elongation, t.max_elongation
            );
        }
    }
    println!();
}

pub fn print_failure(path: &Path, err: &anyhow::Error) {
    let s = Styles::new();
    eprintln!(
        "  {} {}: {:#}",
        s.bad.apply_to("error"),
        s.path.apply_to(path.display()),
        err
    );
}

pub fn print_header(path: &Path, header: &FitsHeader, geometry: Option<&ImageGeometry>) {
    let s = Styles::new();

    println!();
    println!(
        "  {:<14}{}",
        s.label.apply_to("File"),
        s.path.apply_to(path.display())
    );
    if let Some(g) = geometry {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Dimensions"),
            s.value.apply_to(format!("{}x{}", g.width, g.height))
        );
        println!(
            "  {:<14}{}",
            s.label.apply_to("Pixel type"),
            s.value.apply_to(format!("{} (BITPIX {})", g.bitpix, g.bitpix.code()))
        );
        if g.bscale != 1.0 || g.bzero != 0.0 {
            println!(
                "  {:<14}{}",
                s.label.apply_to("Scaling"),
                s.value.apply_to(format!("x{} + {}", g.bscale, g.bzero))
            );
        }
    }
    for (key, label) in [
        ("OBJECT", "Object"),
        ("TELESCOP", "Telescope"),
        ("INSTRUME", "Instrument"),
        ("DATE-OBS", "Observed"),
    ] {
        if let Some(text) = header.text(key) {
            println!("  {:<14}{}", s.label.apply_to(label), s.value.apply_to(text));
        }
    }
    println!(
        "  {:<14}{}",
        s.label.apply_to("Data offset"),
        s.value.apply_to(header.data_offset())
    );
    println!();

    println!("  {}", s.header.apply_to(format!("Cards ({})", header.len())));
    for (key, value) in header.iter() {
        println!("    {:<10}{}", s.label.apply_to(key), value);
    }
    println!();
}
