//! 職缺批次分析：去重 → 逐筆解析 → 聚合 → 圖表判斷。
//!
//! `MarketAnalyzer::analyze` 是純函式，同一批資料永遠得到同樣的結果。

use crate::domain::model::{ExperienceInterval, JobRecord, Skill};
use crate::domain::report::{
    AggregateResult, AnalysisDocument, AnalysisReport, ChartEntry, DataQuality, OrderedMap,
    SeriesPoint,
};
use crate::domain::services::aggregation::{self, SkillFrequency};
use crate::domain::services::experience::{parse_interval, parse_point};
use crate::domain::services::scoring;
use crate::domain::services::skills::SkillExtractor;
use crate::domain::services::sufficiency::{self, ChartKind, GateInputs, NO_DATA_REASON};
use crate::domain::services::vocabulary::Vocabulary;
use std::collections::HashSet;
use std::sync::Arc;

const UNKNOWN_ROLE: &str = "Unknown Role";
const SKILL_COUNTS_REPORTED: usize = 10;
const SKILL_CHART_BARS: usize = 12;
const CATEGORY_CHART_SLICES: usize = 6;
const TITLES_REPORTED: usize = 5;
const MAX_COMPANIES: usize = 8;
const COMPANIES_REPORTED: usize = 5;
const MAX_LOCATIONS: usize = 5;
const LOCATIONS_REPORTED: usize = 3;

/// 有 `job_id` 時依 id 去重 (保留第一筆)；沒有 id 的職缺全部保留
pub fn deduplicate(records: &[JobRecord]) -> Vec<&JobRecord> {
    if !records.iter().any(|r| r.has_text("job_id")) {
        return records.iter().collect();
    }

    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|r| match r.text("job_id") {
            Some(id) => seen.insert(id.into_owned()),
            None => true,
        })
        .collect()
}

/// 保留首次出現順序的不重複值，最多 `limit` 個
fn distinct_values(records: &[&JobRecord], field: &str, limit: usize) -> Vec<String> {
    let mut values: Vec<String> = Vec::new();
    for value in records.iter().filter_map(|r| r.text(field)) {
        if values.len() >= limit {
            break;
        }
        if !values.iter().any(|v| *v == value) {
            values.push(value.into_owned());
        }
    }
    values
}

fn count_distinct(records: &[&JobRecord], field: &str) -> usize {
    records
        .iter()
        .filter_map(|r| r.text(field))
        .collect::<HashSet<_>>()
        .len()
}

fn limitations(
    total_jobs: usize,
    completeness: f64,
    unique_skills: usize,
    points: usize,
    intervals: usize,
) -> Vec<String> {
    let mut limitations = Vec::new();
    if total_jobs < 10 {
        limitations.push("Small sample size - findings are directional only".to_string());
    }
    if completeness < 60.0 {
        limitations.push("Low data completeness - some fields missing".to_string());
    }
    if unique_skills < 5 {
        limitations.push("Limited skill variety detected".to_string());
    }
    if points < 3 && intervals < 3 {
        limitations.push("Insufficient experience data for patterns".to_string());
    }
    limitations
}

fn points<'a, I>(pairs: I) -> Vec<SeriesPoint>
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    pairs
        .into_iter()
        .map(|(label, value)| SeriesPoint {
            label: label.to_string(),
            value,
        })
        .collect()
}

pub struct MarketAnalyzer {
    vocabulary: Arc<Vocabulary>,
    extractor: SkillExtractor,
}

impl MarketAnalyzer {
    pub fn new(vocabulary: Vocabulary) -> Self {
        let vocabulary = Arc::new(vocabulary);
        Self {
            extractor: SkillExtractor::new(Arc::clone(&vocabulary)),
            vocabulary,
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn extractor(&self) -> &SkillExtractor {
        &self.extractor
    }

    /// 空批次回傳 `has_data = false` 的固定結果
    pub fn analyze(&self, records: &[JobRecord]) -> AnalysisReport {
        if records.is_empty() {
            return AnalysisReport {
                document: AnalysisDocument {
                    has_data: false,
                    error: Some(NO_DATA_REASON.to_string()),
                    analysis: None,
                },
                chart_manifest: sufficiency::empty_manifest(),
            };
        }

        let unique = deduplicate(records);
        let total_jobs = unique.len();
        tracing::debug!(
            "Analyzing {} unique postings ({} duplicates removed)",
            total_jobs,
            records.len() - total_jobs
        );

        // 逐筆解析；只有技能欄位存在的職缺才列入技能統計
        let skills_per_record: Vec<Vec<Skill>> = unique
            .iter()
            .filter_map(|r| r.text("skills"))
            .map(|text| self.extractor.extract(Some(&*text)))
            .collect();
        let experience_fields: Vec<_> = unique.iter().filter_map(|r| r.text("experience")).collect();
        let point_values: Vec<f64> = experience_fields
            .iter()
            .filter_map(|e| parse_point(Some(&**e)))
            .collect();
        let intervals: Vec<ExperienceInterval> = experience_fields
            .iter()
            .filter_map(|e| parse_interval(Some(&**e)))
            .collect();

        let has_description = unique.iter().filter(|r| r.has_text("description")).count();
        let has_skills = skills_per_record.len();
        let has_experience = experience_fields.len();
        let completeness =
            scoring::completeness(has_description, has_skills, has_experience, total_jobs);
        let data_quality = DataQuality {
            total_raw: records.len(),
            total_unique: total_jobs,
            duplicates_removed: records.len() - total_jobs,
            has_description,
            has_skills,
            has_experience,
            has_salary: unique.iter().filter(|r| r.has_text("salary")).count(),
            companies_count: count_distinct(&unique, "company"),
            locations_count: count_distinct(&unique, "location"),
            completeness,
        };
        let (quality_grade, quality_desc) = scoring::quality_grade(total_jobs, completeness);

        let frequency = SkillFrequency::from_records(&skills_per_record);
        let dominance = aggregation::skill_dominance(&frequency);
        let categories = aggregation::category_distribution(&frequency, &self.vocabulary);
        let cooccurrence = aggregation::skill_cooccurrence(&skills_per_record);
        let experience_distribution = aggregation::experience_distribution(&point_values);
        let dominant_experience = aggregation::dominant_experience(&experience_distribution);
        let range_analytics = aggregation::experience_range_analytics(&intervals);

        let mut ad_hoc_skills: Vec<String> = Vec::new();
        for skill in skills_per_record.iter().flatten().filter(|s| s.is_ad_hoc()) {
            if !ad_hoc_skills.contains(&skill.name) {
                ad_hoc_skills.push(skill.name.clone());
            }
        }

        let titles = distinct_values(&unique, "title", scoring::MAX_TITLES);
        let companies = distinct_values(&unique, "company", MAX_COMPANIES);
        let locations = distinct_values(&unique, "location", MAX_LOCATIONS);
        let avg_similarity = scoring::average_adjacent_similarity(&skills_per_record);

        let limitations = limitations(
            total_jobs,
            completeness,
            frequency.unique(),
            point_values.len(),
            intervals.len(),
        );

        let gate_inputs = GateInputs {
            total_jobs,
            ranked_skills: frequency.working_set().len(),
            experience_bins: experience_distribution.len(),
            categories: categories.len(),
            intervals: intervals.len(),
            density_years: range_analytics.year_demand_density.len(),
        };
        let chart_manifest: Vec<ChartEntry> = sufficiency::evaluate_all(&gate_inputs)
            .into_iter()
            .map(|decision| {
                let series = match decision.chart {
                    ChartKind::SkillDemand => points(
                        frequency
                            .top(SKILL_CHART_BARS)
                            .iter()
                            .map(|(s, c)| (s.as_str(), *c as f64)),
                    ),
                    ChartKind::ExperienceDistribution => points(
                        experience_distribution
                            .iter()
                            .map(|(label, c)| (label, *c as f64)),
                    ),
                    ChartKind::SkillCategories => points(
                        categories
                            .iter()
                            .take(CATEGORY_CHART_SLICES)
                            .map(|(label, share)| (label, share.count as f64)),
                    ),
                    ChartKind::ExperienceDemandCurve => range_analytics
                        .year_demand_density
                        .iter()
                        .map(|(year, count)| SeriesPoint {
                            label: year.to_string(),
                            value: *count as f64,
                        })
                        .collect(),
                };
                decision.into_entry(series)
            })
            .collect();

        tracing::debug!(
            "Skills: {} unique / {} mentions, intervals: {}, charts: {}",
            frequency.unique(),
            frequency.total_mentions,
            intervals.len(),
            chart_manifest.iter().filter(|c| c.generated).count()
        );

        let analysis = AggregateResult {
            role_name: unique
                .first()
                .and_then(|r| r.text("role"))
                .map(|r| r.into_owned())
                .unwrap_or_else(|| UNKNOWN_ROLE.to_string()),
            total_jobs,
            data_quality,
            quality_grade,
            quality_desc: quality_desc.to_string(),
            core_skills: frequency.core(),
            secondary_skills: frequency.secondary(),
            skill_counts: OrderedMap(frequency.top(SKILL_COUNTS_REPORTED).to_vec()),
            experience_distribution,
            dominant_experience,
            title_clarity: scoring::title_clarity(titles.len()),
            titles: titles.into_iter().take(TITLES_REPORTED).collect(),
            companies: companies.into_iter().take(COMPANIES_REPORTED).collect(),
            locations: locations.into_iter().take(LOCATIONS_REPORTED).collect(),
            market_consistency: scoring::market_consistency(avg_similarity),
            similarity_score: aggregation::round_to(avg_similarity * 100.0, 1),
            skills_normalized: true,
            ad_hoc_skills,
            skill_dominance: dominance,
            skill_categories: categories,
            skill_cooccurrence: cooccurrence,
            has_limitations: !limitations.is_empty(),
            limitations,
            experience_range_analytics: range_analytics,
        };

        AnalysisReport {
            document: AnalysisDocument {
                has_data: true,
                error: None,
                analysis: Some(analysis),
            },
            chart_manifest,
        }
    }
}

impl Default for MarketAnalyzer {
    fn default() -> Self {
        Self::new(Vocabulary::builtin())
    }
}
