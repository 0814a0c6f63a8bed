// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use crate::config::ChartConfigSection;
use crate::error::ChartError;
use crate::records::ScoredPair;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::error::Error;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Fixed so charts from different runs share one scale.
pub const Y_RANGE: Range<f64> = -1.1..1.1;

const TITLE: &str = "Sentiment Viz";
const HUMAN_SERIES: &str = "human messages";
const AI_SERIES: &str = "ai messages";

const BACKGROUND: RGBColor = RGBColor(0xF8, 0xF9, 0xFA);
const HUMAN_LINE: RGBColor = RGBColor(0xB8, 0x7C, 0x4C);
const AI_LINE: RGBColor = RGBColor(0x91, 0xC4, 0xC3);
const HUMAN_ANNOTATION: RGBColor = RGBColor(0x2E, 0x86, 0xAB);
const AI_ANNOTATION: RGBColor = RGBColor(0xA2, 0x3B, 0x72);

/// Plot-ready projection of the scored series.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    pub positions: Vec<i32>,
    pub tick_labels: Vec<String>,
    pub human: Vec<(i32, f64)>,
    pub ai: Vec<(i32, f64)>,
}

impl ChartLayout {
    pub fn from_pairs(pairs: &[ScoredPair]) -> Option<Self> {
        if pairs.is_empty() {
            return None;
        }
        let positions: Vec<i32> = (1..=pairs.len())
            .map(|p| i32::try_from(p).unwrap_or(i32::MAX))
            .collect();
        let tick_labels = positions.iter().map(ToString::to_string).collect();
        let human = positions
            .iter()
            .zip(pairs)
            .map(|(&x, p)| (x, p.user_sentiment))
            .collect();
        let ai = positions
            .iter()
            .zip(pairs)
            .map(|(&x, p)| (x, p.ai_sentiment))
            .collect();
        Some(Self {
            positions,
            tick_labels,
            human,
            ai,
        })
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Half a step of padding on each side of `1..=N`.
    pub fn x_range(&self) -> Range<i32> {
        0..self.positions.last().map_or(1, |last| last.saturating_add(1))
    }

    /// Tick text for an axis position; the padding positions have none.
    pub fn tick_label(&self, x: i32) -> Option<&str> {
        let idx = usize::try_from(x.checked_sub(1)?).ok()?;
        self.tick_labels.get(idx).map(String::as_str)
    }

    pub fn annotations(&self) -> (Vec<String>, Vec<String>) {
        let fmt = |series: &[(i32, f64)]| -> Vec<String> { series.iter().map(|(_, y)| format!("{y:.2}")).collect() };
        (fmt(&self.human), fmt(&self.ai))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ChartRenderer {
    width: u32,
    height: u32,
}

impl ChartRenderer {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const fn from_config(config: &ChartConfigSection) -> Self {
        Self::new(config.width, config.height)
    }

    pub fn render(&self, pairs: &[ScoredPair], path: &Path) -> Result<Option<PathBuf>, ChartError> {
        let Some(layout) = ChartLayout::from_pairs(pairs) else {
            debug!("not enough data for chart");
            return Ok(None);
        };
        if self.width == 0 || self.height == 0 {
            return Err(ChartError::InvalidCanvas {
                width: self.width,
                height: self.height,
            });
        }
        self.draw(&layout, path)
            .map_err(|e| ChartError::Render {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        info!(path = %path.display(), points = layout.len(), "sentiment chart rendered");
        Ok(Some(path.to_path_buf()))
    }

    fn draw(&self, layout: &ChartLayout, path: &Path) -> Result<(), Box<dyn Error>> {
        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&BACKGROUND)?;

        let x_range = layout.x_range();
        let mut chart = ChartBuilder::on(&root)
            .caption(TITLE, ("sans-serif", 26, FontStyle::Bold))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(x_range.clone(), Y_RANGE)?;

        chart
            .configure_mesh()
            .x_desc("Message")
            .y_desc("Sentiment Score")
            .axis_desc_style(("sans-serif", 18, FontStyle::Bold))
            .x_labels(x_range.len())
            .x_label_formatter(&|x| layout.tick_label(*x).unwrap_or_default().to_string())
            .label_style(("sans-serif", 14))
            .bold_line_style(BLACK.mix(0.2))
            .light_line_style(BLACK.mix(0.05))
            .draw()?;

        chart.draw_series(DashedLineSeries::new(
            [(x_range.start, 0.0), (x_range.end, 0.0)],
            8_u32,
            6_u32,
            RGBColor(0x80, 0x80, 0x80).mix(0.5).stroke_width(2),
        ))?;

        let band = RGBColor(0x80, 0x80, 0x80);
        chart.draw_series(layout.human.windows(2).zip(layout.ai.windows(2)).map(|(h, a)| {
            Polygon::new(vec![h[0], h[1], a[1], a[0]], band.mix(0.1).filled())
        }))?;
        chart.draw_series(
            layout
                .human
                .iter()
                .zip(&layout.ai)
                .map(|(&h, &a)| PathElement::new(vec![h, a], band.mix(0.25).stroke_width(6))),
        )?;

        chart
            .draw_series(
                LineSeries::new(layout.human.clone(), HUMAN_LINE.mix(0.85).stroke_width(3))
                    .point_size(5),
            )?
            .label(HUMAN_SERIES)
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], HUMAN_LINE.stroke_width(3)));
        chart
            .draw_series(
                LineSeries::new(layout.ai.clone(), AI_LINE.mix(0.85).stroke_width(3)).point_size(5),
            )?
            .label(AI_SERIES)
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], AI_LINE.stroke_width(3)));

        let above = ("sans-serif", 13, FontStyle::Bold)
            .into_font()
            .color(&HUMAN_ANNOTATION)
            .pos(Pos::new(HPos::Center, VPos::Bottom));
        let below = ("sans-serif", 13, FontStyle::Bold)
            .into_font()
            .color(&AI_ANNOTATION)
            .pos(Pos::new(HPos::Center, VPos::Top));
        let (human_labels, ai_labels) = layout.annotations();
        chart.draw_series(layout.human.iter().zip(human_labels).map(|(&point, label)| {
            EmptyElement::at(point) + Text::new(label, (0, -10), above.clone())
        }))?;
        chart.draw_series(layout.ai.iter().zip(ai_labels).map(|(&point, label)| {
            EmptyElement::at(point) + Text::new(label, (0, 10), below.clone())
        }))?;

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .label_font(("sans-serif", 16))
            .background_style(WHITE.mix(0.95))
            .border_style(BLACK.mix(0.3))
            .draw()?;

        root.present()?;
        Ok(())
    }
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self::from_config(&ChartConfigSection::default())
    }
}
