//! Evaluation-over-time chart. The layout is an SVG template, rasterized to
//! PNG when written to disk.
//!
//! The curve is White's evaluation in pawns, clamped to ±[`LIMIT_PAWNS`].
//! The area above the zero line is filled white and the area below it
//! black, so the colour on each side of the line shows who is better.

use std::path::{Path, PathBuf};

use askama::Template;
use chess_analysis::{GameAnalysis, MoveQuality};
use resvg::{tiny_skia, usvg};

use super::{RenderError, ReportRenderer};

/// Evaluations beyond this many pawns (and all mates) are drawn at the edge.
pub const LIMIT_PAWNS: f64 = 10.0;

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 400.0;
const MARGIN_LEFT: f64 = 50.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 55.0;
const MARGIN_BOTTOM: f64 = 35.0;
const MOVES_PER_X_TICK: usize = 10;

/// A labelled axis position.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub pos: String,
    pub label: String,
}

/// A dot marking a blunder or mistake.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub x: String,
    pub y: String,
    pub class: &'static str,
    pub label: String,
}

#[derive(Template)]
#[template(path = "chart.svg", escape = "html")]
pub struct ChartTemplate {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub subtitle: String,
    pub plot_left: String,
    pub plot_right: String,
    pub plot_top: String,
    pub plot_width: String,
    pub plot_height: String,
    pub axis_label_x: String,
    pub x_label_y: String,
    pub zero_y: String,
    pub y_ticks: Vec<Tick>,
    pub x_ticks: Vec<Tick>,
    pub white_area: String,
    pub black_area: String,
    pub trace: String,
    pub markers: Vec<Marker>,
}

/// Maps plies and pawn values onto the plot area.
struct Plot {
    plies: usize,
}

impl Plot {
    fn width() -> f64 {
        WIDTH - MARGIN_LEFT - MARGIN_RIGHT
    }

    fn height() -> f64 {
        HEIGHT - MARGIN_TOP - MARGIN_BOTTOM
    }

    fn x(&self, ply: f64) -> f64 {
        MARGIN_LEFT + ply / self.plies.max(1) as f64 * Self::width()
    }

    fn y(&self, pawns: f64) -> f64 {
        MARGIN_TOP + (LIMIT_PAWNS - pawns) / (2.0 * LIMIT_PAWNS) * Self::height()
    }
}

fn coord(value: f64) -> String {
    format!("{:.1}", value)
}

fn points(plot: &Plot, samples: &[(f64, f64)]) -> String {
    samples
        .iter()
        .map(|&(ply, pawns)| format!("{},{}", coord(plot.x(ply)), coord(plot.y(pawns))))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Insert a sample wherever the curve crosses zero, so the two filled
/// areas meet exactly on the zero line.
fn with_zero_crossings(values: &[f64]) -> Vec<(f64, f64)> {
    let mut samples = Vec::with_capacity(values.len() * 2);
    for (i, &value) in values.iter().enumerate() {
        if i > 0 {
            let prev = values[i - 1];
            if prev * value < 0.0 {
                let t = prev / (prev - value);
                samples.push(((i - 1) as f64 + t, 0.0));
            }
        }
        samples.push((i as f64, value));
    }
    samples
}

/// Closed polygon between the curve (mapped through `side`) and zero.
fn area(plot: &Plot, samples: &[(f64, f64)], side: impl Fn(f64) -> f64) -> String {
    let (Some(first), Some(last)) = (samples.first(), samples.last()) else {
        return String::new();
    };
    let mut outline = Vec::with_capacity(samples.len() + 2);
    outline.push((first.0, 0.0));
    outline.extend(samples.iter().map(|&(ply, pawns)| (ply, side(pawns))));
    outline.push((last.0, 0.0));
    points(plot, &outline)
}

impl ChartTemplate {
    pub fn from_analysis(analysis: &GameAnalysis) -> Self {
        let values: Vec<f64> = analysis
            .evaluation_series()
            .into_iter()
            .map(|eval| eval.pawns_clamped(LIMIT_PAWNS))
            .collect();
        let plot = Plot {
            plies: values.len().saturating_sub(1),
        };
        let samples = with_zero_crossings(&values);

        let y_ticks = [-10.0, -5.0, 0.0, 5.0, 10.0]
            .iter()
            .map(|&pawns: &f64| Tick {
                pos: coord(plot.y(pawns)),
                label: format!("{:+}", pawns as i32),
            })
            .collect();

        let x_ticks = (MOVES_PER_X_TICK..=plot.plies / 2)
            .step_by(MOVES_PER_X_TICK)
            .map(|number| Tick {
                pos: coord(plot.x((number * 2) as f64)),
                label: number.to_string(),
            })
            .collect();

        let markers = analysis
            .moves
            .iter()
            .filter_map(|m| {
                let class = match m.quality {
                    MoveQuality::Blunder => "blunder",
                    MoveQuality::Mistake => "mistake",
                    _ => return None,
                };
                let ply = (m.ply + 1) as f64;
                Some(Marker {
                    x: coord(plot.x(ply)),
                    y: coord(plot.y(m.eval_after.pawns_clamped(LIMIT_PAWNS))),
                    class,
                    label: format!("{} ({})", m.notation(), m.quality),
                })
            })
            .collect();

        Self {
            width: WIDTH as u32,
            height: HEIGHT as u32,
            title: analysis.headers.summary(),
            subtitle: format!("Evaluation in pawns, White's view, depth {}", analysis.depth),
            plot_left: coord(MARGIN_LEFT),
            plot_right: coord(WIDTH - MARGIN_RIGHT),
            plot_top: coord(MARGIN_TOP),
            plot_width: coord(Plot::width()),
            plot_height: coord(Plot::height()),
            axis_label_x: coord(MARGIN_LEFT - 6.0),
            x_label_y: coord(HEIGHT - MARGIN_BOTTOM + 16.0),
            zero_y: coord(plot.y(0.0)),
            y_ticks,
            x_ticks,
            white_area: area(&plot, &samples, |pawns| pawns.max(0.0)),
            black_area: area(&plot, &samples, |pawns| pawns.min(0.0)),
            trace: points(&plot, &samples),
            markers,
        }
    }
}

/// Rasterize an SVG document to PNG bytes. Text is drawn with the system
/// fonts; without any installed it is left out.
fn rasterize(svg: &str) -> Result<Vec<u8>, RenderError> {
    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &options)
        .map_err(|e| RenderError::Raster(e.to_string()))?;
    let size = tree.size().to_int_size();
    let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| RenderError::Raster("chart has no area".to_string()))?;
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| RenderError::Raster(e.to_string()))
}

/// Writes the chart to a PNG file.
pub struct ChartRenderer {
    path: PathBuf,
}

impl ChartRenderer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportRenderer for ChartRenderer {
    fn render(&mut self, analysis: &GameAnalysis) -> Result<(), RenderError> {
        let svg = ChartTemplate::from_analysis(analysis).render()?;
        std::fs::write(&self.path, rasterize(&svg)?)?;
        Ok(())
    }
}
