//! 分析結果的輸出型別。欄位名稱即輸出文件的欄位名稱。

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// 依插入順序序列化成 JSON 物件的 (標籤, 值) 列表
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V>(pub Vec<(String, V)>);

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<V> OrderedMap<V> {
    pub fn get(&self, label: &str) -> Option<&V> {
        self.0.iter().find(|(l, _)| l == label).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(l, v)| (l.as_str(), v))
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, value) in &self.0 {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    High,
    Medium,
    Low,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Level::High => "HIGH",
            Level::Medium => "MEDIUM",
            Level::Low => "LOW",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Flexibility {
    Narrow,
    Moderate,
    Flexible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExperienceBand {
    #[serde(rename = "Entry Level (0-2 yrs)")]
    EntryLevel,
    #[serde(rename = "Early Career (3-5 yrs)")]
    EarlyCareer,
    #[serde(rename = "Mid Career (6-8 yrs)")]
    MidCareer,
    #[serde(rename = "Senior (9-12 yrs)")]
    Senior,
    #[serde(rename = "Expert (12+ yrs)")]
    Expert,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataQuality {
    pub total_raw: usize,
    pub total_unique: usize,
    pub duplicates_removed: usize,
    pub has_description: usize,
    pub has_skills: usize,
    pub has_experience: usize,
    pub has_salary: usize,
    pub companies_count: usize,
    pub locations_count: usize,
    /// 百分比，小數一位
    pub completeness: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillDominance {
    pub top1_skill: Option<String>,
    pub top1_share: f64,
    pub top3_share: f64,
    pub top5_share: f64,
    pub long_tail_share: f64,
    pub dominance_ratio: f64,
    pub total_unique_skills: usize,
    pub total_skill_mentions: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillPair {
    pub pair: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperienceRangeAnalytics {
    pub has_range_data: bool,
    pub ranges_parsed: usize,
    pub min_experience_observed: Option<u32>,
    pub max_experience_observed: Option<u32>,
    pub peak_demand_year: Option<u32>,
    pub peak_demand_count: usize,
    pub dominant_band: Option<ExperienceBand>,
    pub avg_range_width: Option<f64>,
    pub experience_flexibility: Option<Flexibility>,
    pub year_demand_density: BTreeMap<u32, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    pub role_name: String,
    pub total_jobs: usize,
    pub data_quality: DataQuality,
    pub quality_grade: Level,
    pub quality_desc: String,
    pub core_skills: Vec<String>,
    pub secondary_skills: Vec<String>,
    pub skill_counts: OrderedMap<usize>,
    pub experience_distribution: OrderedMap<usize>,
    pub dominant_experience: String,
    pub titles: Vec<String>,
    pub title_clarity: Level,
    pub companies: Vec<String>,
    pub locations: Vec<String>,
    pub market_consistency: Level,
    pub similarity_score: f64,
    pub skills_normalized: bool,
    /// 未經詞彙表確認的技能名稱
    pub ad_hoc_skills: Vec<String>,
    pub skill_dominance: Option<SkillDominance>,
    pub skill_categories: OrderedMap<CategoryShare>,
    pub skill_cooccurrence: Vec<SkillPair>,
    pub limitations: Vec<String>,
    pub has_limitations: bool,
    pub experience_range_analytics: ExperienceRangeAnalytics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

/// 圖表清單中的一項：是否產生，不產生時的原因，以及繪圖用的資料點
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartEntry {
    pub chart_id: String,
    pub chart_name: String,
    pub chart_type: String,
    pub generated: bool,
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub series: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisDocument {
    pub has_data: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub analysis: Option<AggregateResult>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub document: AnalysisDocument,
    pub chart_manifest: Vec<ChartEntry>,
}

impl AnalysisReport {
    pub fn has_data(&self) -> bool {
        self.document.has_data
    }

    pub fn analysis(&self) -> Option<&AggregateResult> {
        self.document.analysis.as_ref()
    }

    pub fn chart(&self, chart_id: &str) -> Option<&ChartEntry> {
        self.chart_manifest.iter().find(|c| c.chart_id == chart_id)
    }

    pub fn generated_charts(&self) -> impl Iterator<Item = &ChartEntry> {
        self.chart_manifest.iter().filter(|c| c.generated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordered_map_keeps_insertion_order() {
        let map = OrderedMap(vec![
            ("3-5 yrs".to_string(), 4usize),
            ("0-2 yrs".to_string(), 9),
            ("12+ yrs".to_string(), 1),
        ]);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"3-5 yrs":4,"0-2 yrs":9,"12+ yrs":1}"#);
        assert_eq!(map.get("0-2 yrs"), Some(&9));
    }

    #[test]
    fn test_band_and_level_labels() {
        assert_eq!(
            serde_json::to_string(&ExperienceBand::MidCareer).unwrap(),
            r#""Mid Career (6-8 yrs)""#
        );
        assert_eq!(serde_json::to_string(&Level::Medium).unwrap(), r#""MEDIUM""#);
        assert_eq!(serde_json::to_string(&Flexibility::Narrow).unwrap(), r#""NARROW""#);
    }

    #[test]
    fn test_sentinel_document_has_no_analysis_fields() {
        let doc = AnalysisDocument {
            has_data: false,
            error: Some("No job data received".to_string()),
            analysis: None,
        };
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["has_data"], false);
        assert_eq!(value["error"], "No job data received");
        assert!(value.get("core_skills").is_none());
    }
}
