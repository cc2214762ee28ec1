//! 判斷每張圖表是否有足夠的資料可畫，不足時給出一個原因。

use crate::domain::report::{ChartEntry, SeriesPoint};

pub const MIN_BATCH_SIZE: usize = 3;
pub const MIN_RANKED_SKILLS: usize = 3;
pub const MIN_EXPERIENCE_BINS: usize = 2;
pub const MIN_CATEGORIES: usize = 3;
pub const MIN_DENSITY_YEARS: usize = 2;

pub const NO_DATA_REASON: &str = "No job data received";
const BATCH_REASON: &str = "Insufficient job postings (minimum 3 required)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    SkillDemand,
    ExperienceDistribution,
    SkillCategories,
    ExperienceDemandCurve,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::SkillDemand,
        ChartKind::ExperienceDistribution,
        ChartKind::SkillCategories,
        ChartKind::ExperienceDemandCurve,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            ChartKind::SkillDemand => "chart_1",
            ChartKind::ExperienceDistribution => "chart_2",
            ChartKind::SkillCategories => "chart_3",
            ChartKind::ExperienceDemandCurve => "chart_4",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChartKind::SkillDemand => "Skill Demand",
            ChartKind::ExperienceDistribution => "Experience Distribution",
            ChartKind::SkillCategories => "Skill Category Distribution",
            ChartKind::ExperienceDemandCurve => "Experience Demand Curve",
        }
    }

    pub fn chart_type(&self) -> &'static str {
        match self {
            ChartKind::SkillDemand => "Horizontal Bar",
            ChartKind::ExperienceDistribution => "Bar",
            ChartKind::SkillCategories => "Pie",
            ChartKind::ExperienceDemandCurve => "Area",
        }
    }
}

/// 判斷所需的聚合基數
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GateInputs {
    pub total_jobs: usize,
    pub ranked_skills: usize,
    pub experience_bins: usize,
    pub categories: usize,
    pub intervals: usize,
    pub density_years: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateDecision {
    pub chart: ChartKind,
    pub generated: bool,
    pub reason: Option<&'static str>,
}

impl GateDecision {
    fn pass(chart: ChartKind) -> Self {
        Self {
            chart,
            generated: true,
            reason: None,
        }
    }

    fn fail(chart: ChartKind, reason: &'static str) -> Self {
        Self {
            chart,
            generated: false,
            reason: Some(reason),
        }
    }

    pub fn into_entry(self, series: Vec<SeriesPoint>) -> ChartEntry {
        ChartEntry {
            chart_id: self.chart.id().to_string(),
            chart_name: self.chart.name().to_string(),
            chart_type: self.chart.chart_type().to_string(),
            generated: self.generated,
            reason: self.reason.map(str::to_string),
            series: if self.generated { series } else { Vec::new() },
        }
    }
}

/// 批次大小不足的原因優先於各圖表自己的條件
pub fn evaluate(chart: ChartKind, inputs: &GateInputs) -> GateDecision {
    if inputs.total_jobs < MIN_BATCH_SIZE {
        return GateDecision::fail(chart, BATCH_REASON);
    }

    let view_failure = match chart {
        ChartKind::SkillDemand => (inputs.ranked_skills < MIN_RANKED_SKILLS)
            .then_some("Fewer than 3 unique skills detected"),
        ChartKind::ExperienceDistribution => (inputs.experience_bins < MIN_EXPERIENCE_BINS)
            .then_some("Fewer than 2 experience bins with data"),
        ChartKind::SkillCategories => (inputs.categories < MIN_CATEGORIES)
            .then_some("Fewer than 3 skill categories detected"),
        ChartKind::ExperienceDemandCurve => {
            if inputs.intervals == 0 {
                Some("No parseable experience ranges found")
            } else if inputs.density_years < MIN_DENSITY_YEARS {
                Some("Fewer than 2 years with demand data")
            } else {
                None
            }
        }
    };

    match view_failure {
        Some(reason) => GateDecision::fail(chart, reason),
        None => GateDecision::pass(chart),
    }
}

pub fn evaluate_all(inputs: &GateInputs) -> Vec<GateDecision> {
    ChartKind::ALL.iter().map(|c| evaluate(*c, inputs)).collect()
}

/// 空批次時的圖表清單：全部不產生
pub fn empty_manifest() -> Vec<ChartEntry> {
    ChartKind::ALL
        .iter()
        .map(|c| GateDecision::fail(*c, NO_DATA_REASON).into_entry(Vec::new()))
        .collect()
}
