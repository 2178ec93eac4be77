//! Grouped bar charts rendered to SVG.

use std::path::Path;

use anyhow::{anyhow, Result};
use plotters::prelude::*;

/// Bars grouped by category, one bar per series in each group.
/// `series[i].1[j]` is the value of series `i` in category `j`; `None` leaves a gap.
#[derive(Debug, Clone)]
pub struct BarChart {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    pub categories: Vec<String>,
    pub series: Vec<(String, Vec<Option<f64>>)>,
}

const SIZE: (u32, u32) = (1000, 600);
const GROUP_WIDTH: f64 = 0.8;

impl BarChart {
    fn y_max(&self) -> f64 {
        let max = self
            .series
            .iter()
            .flat_map(|(_, values)| values.iter().flatten())
            .fold(0.0f64, |acc, v| acc.max(*v));
        if max > 0.0 {
            max * 1.1
        } else {
            1.0
        }
    }

    /// Category whose group is centred on `x`; tick positions between groups get no label.
    fn category_at(&self, x: f64) -> Option<String> {
        let i = x.round();
        if (x - i).abs() > 1e-6 || i < 0.0 {
            return None;
        }
        self.categories.get(i as usize).cloned()
    }

    /// Horizontal extent of bar `series` in group `category`.
    fn bar_span(&self, category: usize, series: usize) -> (f64, f64) {
        let width = GROUP_WIDTH / self.series.len() as f64;
        let left = category as f64 - GROUP_WIDTH / 2.0 + series as f64 * width;
        (left, left + width)
    }
}

pub fn render_grouped_bars(path: &Path, chart: &BarChart) -> Result<()> {
    if chart.categories.is_empty() || chart.series.is_empty() {
        return Err(anyhow!("nothing to plot for {}", path.display()));
    }
    let n = chart.categories.len();

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut ctx = ChartBuilder::on(&root)
        .caption(&chart.title, ("sans-serif", 22))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5f64..n as f64 - 0.5, 0f64..chart.y_max())?;

    let label_at = |x: &f64| chart.category_at(*x).unwrap_or_default();
    ctx.configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_desc(chart.x_desc.as_str())
        .y_desc(chart.y_desc.as_str())
        .x_label_formatter(&label_at)
        .draw()?;

    for (s, (name, values)) in chart.series.iter().enumerate() {
        let color = Palette99::pick(s).to_rgba();
        let bars = values.iter().enumerate().filter_map(|(c, v)| {
            v.map(|v| {
                let (x0, x1) = chart.bar_span(c, s);
                Rectangle::new([(x0, 0.0), (x1, v)], color.filled())
            })
        });
        ctx.draw_series(bars)?
            .label(name.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled()));
    }

    ctx.configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
