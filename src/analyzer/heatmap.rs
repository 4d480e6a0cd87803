use crate::models::DailyReport;
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;

pub const DEFAULT_WINDOW_DAYS: u32 = 28;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatTier {
    NoData,
    Low,
    Moderate,
    Good,
    Excellent,
}

impl HeatTier {
    pub fn from_productivity(productivity: f64) -> Self {
        if productivity >= 80.0 {
            Self::Excellent
        } else if productivity >= 60.0 {
            Self::Good
        } else if productivity >= 40.0 {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Self::NoData => "#2d333b",
            Self::Low => "#7f1d1d",
            Self::Moderate => "#b45309",
            Self::Good => "#4d7c0f",
            Self::Excellent => "#15803d",
        }
    }

    pub fn glyph(self) -> char {
        match self {
            Self::NoData => '·',
            Self::Low => '░',
            Self::Moderate => '▒',
            Self::Good => '▓',
            Self::Excellent => '█',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapCell {
    pub date: NaiveDate,
    pub productivity: Option<f64>,
    pub tier: HeatTier,
    pub color: &'static str,
}

/// Trailing `days`-long window ending at `today`, oldest first.
pub fn build_heatmap(reports: &[DailyReport], today: NaiveDate, days: u32) -> Vec<HeatmapCell> {
    // First report wins when a date is duplicated, mirroring `report_by_date`.
    let by_date = reports.iter().fold(HashMap::new(), |mut acc, report| {
        acc.entry(report.date)
            .or_insert(report.productivity_percent);
        acc
    });

    (0..i64::from(days))
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset);
            let productivity = by_date.get(&date).copied();
            let tier = productivity
                .map(HeatTier::from_productivity)
                .unwrap_or(HeatTier::NoData);

            HeatmapCell {
                date,
                productivity,
                tier,
                color: tier.color(),
            }
        })
        .collect()
}

/// Rows of seven glyphs for terminal display.
pub fn render_rows(cells: &[HeatmapCell]) -> Vec<String> {
    cells
        .chunks(7)
        .map(|week| week.iter().map(|cell| cell.tier.glyph()).collect::<String>())
        .collect()
}
