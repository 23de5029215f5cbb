use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::{debug, info};

use crate::models::{ChartOptions, Dataset};
use crate::utils::PlotError;

/// One symbol's line as it will be drawn
#[derive(Debug, Clone, PartialEq)]
pub struct PlottedLine {
    pub label: String,
    /// Index into `Palette99`
    pub color_index: usize,
    pub points: Vec<(DateTime<Utc>, f64)>,
}

/// Everything the renderer needs, computed up front from a `Dataset`
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayPlan {
    pub lines: Vec<PlottedLine>,
    pub x_range: Range<DateTime<Utc>>,
    pub y_range: Range<f64>,
}

impl OverlayPlan {
    /// Legend labels, in draw order
    pub fn legend_entries(&self) -> Vec<&str> {
        self.lines.iter().map(|l| l.label.as_str()).collect()
    }
}

/// Lay out one line per non-empty series on shared axes
///
/// Series keep the dataset's order and their own sample order; nothing is
/// re-sorted. Empty series are skipped.
pub fn plan_overlay(dataset: &Dataset) -> OverlayPlan {
    let lines: Vec<PlottedLine> = dataset
        .iter()
        .filter(|s| !s.is_empty())
        .enumerate()
        .map(|(i, s)| PlottedLine {
            label: s.symbol.clone(),
            color_index: i,
            points: s.points.iter().map(|p| (p.timestamp, p.price)).collect(),
        })
        .collect();

    let mut samples = lines.iter().flat_map(|l| l.points.iter());
    let Some(&(first_ts, first_price)) = samples.next() else {
        let epoch = DateTime::<Utc>::UNIX_EPOCH;
        return OverlayPlan {
            lines,
            x_range: epoch..epoch + Duration::days(1),
            y_range: 0.0..1.0,
        };
    };

    let (mut x_min, mut x_max) = (first_ts, first_ts);
    let (mut min_price, mut max_price) = (first_price, first_price);
    for &(ts, price) in samples {
        x_min = x_min.min(ts);
        x_max = x_max.max(ts);
        min_price = min_price.min(price);
        max_price = max_price.max(price);
    }

    if x_min == x_max {
        x_min = x_min - Duration::hours(1);
        x_max = x_max + Duration::hours(1);
    }

    // Add some padding to the price range
    let price_range = (max_price - min_price).max(1e-8); // Avoid division by zero
    let padding = price_range * 0.1;
    let y_min = (min_price - padding).max(0.0);
    let y_max = max_price + padding;

    OverlayPlan {
        lines,
        x_range: x_min..x_max,
        y_range: y_min..y_max,
    }
}

/// Tick label layout for the time axis
fn tick_format(range: &Range<DateTime<Utc>>) -> &'static str {
    let span = range.end - range.start;
    if span > Duration::days(730) {
        "%Y"
    } else if span > Duration::days(60) {
        "%Y-%m"
    } else if span > Duration::days(2) {
        "%m-%d"
    } else {
        "%m-%d %H:%M"
    }
}

fn render_error(what: &str, e: impl std::fmt::Display) -> PlotError {
    PlotError::Render(format!("Failed to {}: {}", what, e))
}

/// Draw the overlay chart onto any plotters drawing area
pub fn draw_overlay<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    plan: &OverlayPlan,
    options: &ChartOptions,
) -> Result<(), PlotError> {
    root.fill(&WHITE).map_err(|e| render_error("fill canvas", e))?;

    let mut chart = ChartBuilder::on(root)
        .caption(&options.title, ("sans-serif", 28.0).into_font())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(plan.x_range.clone(), plan.y_range.clone())
        .map_err(|e| render_error("build chart", e))?;

    let date_format = tick_format(&plan.x_range);
    chart
        .configure_mesh()
        .x_desc(options.x_label.as_str())
        .y_desc(options.y_label.as_str())
        .x_label_formatter(&|t: &DateTime<Utc>| t.format(date_format).to_string())
        .bold_line_style(BLACK.mix(0.3))
        .light_line_style(BLACK.mix(0.05))
        .draw()
        .map_err(|e| render_error("draw mesh", e))?;

    for line in &plan.lines {
        debug!("Drawing {} ({} points)", line.label, line.points.len());
        let color = Palette99::pick(line.color_index).to_rgba();
        chart
            .draw_series(LineSeries::new(
                line.points.iter().copied(),
                color.stroke_width(2),
            ))
            .map_err(|e| render_error("draw line", e))?;
    }

    // An empty legend box has nothing to show
    if !plan.lines.is_empty() {
        draw_legend(&chart.plotting_area().strip_coord_spec(), &plan.lines)?;
    }

    root.present().map_err(|e| render_error("render chart", e))?;
    Ok(())
}

/// Legend box in the upper left corner of the plotting area
///
/// Text is measured through the drawing area so any backend can size it.
fn draw_legend<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    lines: &[PlottedLine],
) -> Result<(), PlotError> {
    const ORIGIN: (i32, i32) = (10, 10);
    const PAD: i32 = 6;
    const SAMPLE: i32 = 20;

    let font = TextStyle::from(("sans-serif", 14.0).into_font());
    let (mut label_width, mut row_height) = (0i32, 0i32);
    for line in lines {
        let (w, h) = area
            .estimate_text_size(&line.label, &font)
            .map_err(|e| render_error("measure legend", e))?;
        label_width = label_width.max(w as i32);
        row_height = row_height.max(h as i32 + 4);
    }

    let (x0, y0) = ORIGIN;
    let x1 = x0 + PAD * 3 + SAMPLE + label_width;
    let y1 = y0 + PAD * 2 + row_height * lines.len() as i32;
    area.draw(&Rectangle::new([(x0, y0), (x1, y1)], WHITE.mix(0.8).filled()))
        .map_err(|e| render_error("draw legend", e))?;
    area.draw(&Rectangle::new([(x0, y0), (x1, y1)], BLACK))
        .map_err(|e| render_error("draw legend", e))?;

    for (i, line) in lines.iter().enumerate() {
        let color = Palette99::pick(line.color_index).to_rgba();
        let top = y0 + PAD + row_height * i as i32;
        let mid = top + row_height / 2;
        area.draw(&PathElement::new(
            vec![(x0 + PAD, mid), (x0 + PAD + SAMPLE, mid)],
            color.stroke_width(2),
        ))
        .map_err(|e| render_error("draw legend", e))?;
        area.draw(&Text::new(
            line.label.as_str(),
            (x0 + PAD * 2 + SAMPLE, top + 2),
            font.clone(),
        ))
        .map_err(|e| render_error("draw legend", e))?;
    }

    Ok(())
}

/// Sibling path the image is rendered to before it replaces `output`
fn temp_path_for(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "chart".to_string());
    let ext = output
        .extension()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "png".to_string());
    output.with_file_name(format!(".{}.{}.tmp.{}", stem, std::process::id(), ext))
}

fn draw_to_file(plan: &OverlayPlan, options: &ChartOptions, path: &Path) -> Result<(), PlotError> {
    let root = BitMapBackend::new(path, (options.width, options.height)).into_drawing_area();
    draw_overlay(&root, plan, options)
}

/// Render the plan to an image file, replacing any existing file
///
/// The image is drawn to a temporary sibling first and renamed into place,
/// so a failed render leaves `output` as it was.
pub fn render_chart(plan: &OverlayPlan, options: &ChartOptions, output: &Path) -> Result<(), PlotError> {
    let temp_file = temp_path_for(output);

    if let Err(e) = draw_to_file(plan, options, &temp_file) {
        let _ = fs::remove_file(&temp_file);
        return Err(e);
    }

    if let Err(e) = fs::rename(&temp_file, output) {
        let _ = fs::remove_file(&temp_file);
        return Err(e.into());
    }

    info!(
        "Wrote {} ({} lines, {}x{})",
        output.display(),
        plan.lines.len(),
        options.width,
        options.height
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PricePoint;
    use chrono::TimeZone;
    use plotters_backend::{BackendColor, BackendCoord, BackendStyle, BackendTextStyle, DrawingErrorKind};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, d, 0, 0, 0).unwrap()
    }

    fn dataset(entries: Vec<(&str, Vec<(u32, f64)>)>) -> Dataset {
        let mut dataset = Dataset::new();
        for (symbol, points) in entries {
            dataset.insert_series(crate::models::Series::new(symbol));
            for (d, price) in points {
                dataset.push(symbol, PricePoint::new(day(d), price));
            }
        }
        dataset
    }

    #[derive(Default)]
    struct Recording {
        texts: Vec<String>,
        paths: Vec<((u8, u8, u8), Vec<BackendCoord>)>,
    }

    /// Records text and paths; measures text without loading fonts
    struct RecordingBackend {
        log: Rc<RefCell<Recording>>,
    }

    impl DrawingBackend for RecordingBackend {
        type ErrorType = std::io::Error;

        fn get_size(&self) -> (u32, u32) {
            (1200, 600)
        }

        fn ensure_prepared(&mut self) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
            Ok(())
        }

        fn present(&mut self) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
            Ok(())
        }

        fn draw_pixel(
            &mut self,
            _point: BackendCoord,
            _color: BackendColor,
        ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
            Ok(())
        }

        fn draw_line<S: BackendStyle>(
            &mut self,
            _from: BackendCoord,
            _to: BackendCoord,
            _style: &S,
        ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
            Ok(())
        }

        fn draw_rect<S: BackendStyle>(
            &mut self,
            _upper_left: BackendCoord,
            _bottom_right: BackendCoord,
            _style: &S,
            _fill: bool,
        ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
            Ok(())
        }

        fn draw_path<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
            &mut self,
            path: I,
            style: &S,
        ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
            let points = path.into_iter().collect();
            self.log.borrow_mut().paths.push((style.color().rgb, points));
            Ok(())
        }

        fn draw_circle<S: BackendStyle>(
            &mut self,
            _center: BackendCoord,
            _radius: u32,
            _style: &S,
            _fill: bool,
        ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
            Ok(())
        }

        fn fill_polygon<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
            &mut self,
            _vert: I,
            _style: &S,
        ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
            Ok(())
        }

        fn draw_text<TStyle: BackendTextStyle>(
            &mut self,
            text: &str,
            _style: &TStyle,
            _pos: BackendCoord,
        ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
            self.log.borrow_mut().texts.push(text.to_string());
            Ok(())
        }

        fn estimate_text_size<TStyle: BackendTextStyle>(
            &self,
            text: &str,
            _style: &TStyle,
        ) -> Result<(u32, u32), DrawingErrorKind<Self::ErrorType>> {
            Ok((text.len() as u32 * 7, 12))
        }
    }

    fn record(plan: &OverlayPlan) -> Recording {
        let log = Rc::new(RefCell::new(Recording::default()));
        let root = RecordingBackend { log: log.clone() }.into_drawing_area();
        draw_overlay(&root, plan, &ChartOptions::default()).unwrap();
        drop(root);
        Rc::try_unwrap(log).ok().unwrap().into_inner()
    }

    fn palette_rgb(index: usize) -> (u8, u8, u8) {
        Palette99::pick(index).to_backend_color().rgb
    }

    fn paths_in(recording: &Recording, rgb: (u8, u8, u8)) -> Vec<&Vec<BackendCoord>> {
        recording
            .paths
            .iter()
            .filter(|(c, _)| *c == rgb)
            .map(|(_, p)| p)
            .collect()
    }

    #[test]
    fn test_plan_single_series() {
        let plan = plan_overlay(&dataset(vec![("AAA", vec![(1, 10.0), (2, 12.0)])]));

        assert_eq!(plan.legend_entries(), vec!["AAA"]);
        assert_eq!(plan.lines[0].points, vec![(day(1), 10.0), (day(2), 12.0)]);
        assert_eq!(plan.x_range, day(1)..day(2));
        assert!((plan.y_range.start - 9.8).abs() < 1e-9);
        assert!((plan.y_range.end - 12.2).abs() < 1e-9);
    }

    #[test]
    fn test_plan_skips_empty_series_and_keeps_order() {
        let plan = plan_overlay(&dataset(vec![
            ("ZZZ", vec![(1, 1.0)]),
            ("EMPTY", vec![]),
            ("AAA", vec![(1, 2.0)]),
        ]));

        assert_eq!(plan.legend_entries(), vec!["ZZZ", "AAA"]);
        assert_eq!(plan.lines[1].color_index, 1);
    }

    #[test]
    fn test_plan_does_not_resort() {
        let plan = plan_overlay(&dataset(vec![("AAA", vec![(3, 1.0), (1, 2.0), (2, 3.0)])]));

        let days: Vec<_> = plan.lines[0].points.iter().map(|p| p.0).collect();
        assert_eq!(days, vec![day(3), day(1), day(2)]);
        assert_eq!(plan.x_range, day(1)..day(3));
    }

    #[test]
    fn test_plan_degenerate_ranges() {
        let plan = plan_overlay(&dataset(vec![("AAA", vec![(1, 0.0)])]));
        assert_eq!(plan.x_range, day(1) - Duration::hours(1)..day(1) + Duration::hours(1));
        assert_eq!(plan.y_range.start, 0.0);
        assert!(plan.y_range.end > 0.0);

        let empty = plan_overlay(&Dataset::new());
        assert!(empty.lines.is_empty());
        assert!(empty.x_range.start < empty.x_range.end);
        assert_eq!(empty.y_range, 0.0..1.0);
    }

    #[test]
    fn test_tick_format_follows_span() {
        assert_eq!(tick_format(&(day(1)..day(1) + Duration::days(3650))), "%Y");
        assert_eq!(tick_format(&(day(1)..day(1) + Duration::days(90))), "%Y-%m");
        assert_eq!(tick_format(&(day(1)..day(10))), "%m-%d");
        assert_eq!(tick_format(&(day(1)..day(2))), "%m-%d %H:%M");
    }

    #[test]
    fn test_draw_one_line_with_legend() {
        let plan = plan_overlay(&dataset(vec![("AAA", vec![(1, 10.0), (2, 12.0)])]));
        let recording = record(&plan);

        // the series line plus its legend sample
        let paths = paths_in(&recording, palette_rgb(0));
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| p.len() == 2));

        assert_eq!(recording.texts.iter().filter(|t| *t == "AAA").count(), 1);
        assert!(recording.texts.iter().any(|t| t == &ChartOptions::default().title));
    }

    #[test]
    fn test_one_legend_entry_per_symbol() {
        let plan = plan_overlay(&dataset(vec![
            ("AAA", vec![(1, 1.0), (2, 2.0)]),
            ("BBB", vec![(1, 3.0), (2, 1.0)]),
            ("CCC", vec![]),
        ]));
        let recording = record(&plan);

        for symbol in ["AAA", "BBB"] {
            assert_eq!(recording.texts.iter().filter(|t| *t == symbol).count(), 1);
        }
        assert!(!recording.texts.iter().any(|t| t == "CCC"));
        assert_eq!(paths_in(&recording, palette_rgb(1)).len(), 2);
    }

    #[test]
    fn test_vertices_follow_input_order() {
        let plan = plan_overlay(&dataset(vec![("AAA", vec![(1, 10.0), (2, 30.0), (3, 20.0)])]));
        let recording = record(&plan);

        let line = paths_in(&recording, palette_rgb(0))
            .into_iter()
            .find(|p| p.len() == 3)
            .expect("series line");
        assert!(line[0].0 < line[1].0 && line[1].0 < line[2].0);
        // higher prices sit higher on the canvas
        assert!(line[1].1 < line[2].1 && line[2].1 < line[0].1);
    }

    #[test]
    fn test_unsorted_input_renders_sawtooth() {
        let plan = plan_overlay(&dataset(vec![("AAA", vec![(2, 1.0), (1, 2.0), (3, 3.0)])]));
        let recording = record(&plan);

        let line = paths_in(&recording, palette_rgb(0))
            .into_iter()
            .find(|p| p.len() == 3)
            .expect("series line");
        assert!(line[0].0 > line[1].0);
        assert!(line[2].0 > line[0].0);
    }

    #[test]
    fn test_draw_empty_dataset() {
        let plan = plan_overlay(&Dataset::new());
        let recording = record(&plan);

        assert!(paths_in(&recording, palette_rgb(0)).is_empty());
        assert!(recording.texts.iter().any(|t| t == "Year"));
        assert!(recording.texts.iter().any(|t| t == "Price ($)"));
    }

    #[test]
    fn test_temp_path_is_hidden_sibling() {
        let temp = temp_path_for(Path::new("out/market_simulation.png"));
        assert_eq!(temp.parent(), Some(Path::new("out")));
        let name = temp.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(".market_simulation."));
        assert!(name.ends_with(".tmp.png"));
    }

    #[test]
    fn test_failed_render_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("missing").join("market_simulation.png");
        let plan = plan_overlay(&dataset(vec![("AAA", vec![(1, 10.0), (2, 12.0)])]));

        assert!(render_chart(&plan, &ChartOptions::default(), &output).is_err());
        assert!(!output.exists());
        assert!(!temp_path_for(&output).exists());
    }

    const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

    #[test]
    fn test_render_replaces_existing_chart() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("market_simulation.png");
        fs::write(&output, b"previous").unwrap();
        let plan = plan_overlay(&dataset(vec![("AAA", vec![(1, 10.0), (2, 12.0), (3, 11.0)])]));

        render_chart(&plan, &ChartOptions::default(), &output).unwrap();

        let bytes = fs::read(&output).unwrap();
        assert!(bytes.starts_with(&PNG_SIGNATURE));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_render_empty_dataset_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("market_simulation.png");
        fs::write(&output, b"previous").unwrap();
        let plan = plan_overlay(&Dataset::new());

        render_chart(&plan, &ChartOptions::default(), &output).unwrap();

        assert!(fs::read(&output).unwrap().starts_with(&PNG_SIGNATURE));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
