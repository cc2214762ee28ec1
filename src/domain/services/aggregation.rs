//! 批次聚合：技能頻率、集中度、類別、共現、經驗分布與逐年需求密度。
//!
//! 每個函式都是輸入的純函式；分母為零時回傳零值或以 1 代替。

use crate::domain::model::{ExperienceInterval, Skill, MAX_EXPERIENCE_YEARS};
use crate::domain::report::{
    CategoryShare, ExperienceBand, ExperienceRangeAnalytics, Flexibility, OrderedMap,
    SkillDominance, SkillPair,
};
use crate::domain::services::vocabulary::Vocabulary;
use std::collections::{BTreeMap, HashMap};

pub const WORKING_SET: usize = 15;
pub const CORE_SKILLS: usize = 5;
pub const SECONDARY_SKILLS: usize = 5;
pub const TOP_PAIRS: usize = 10;
pub const MIN_PAIR_COUNT: usize = 2;

pub const EXPERIENCE_BIN_LABELS: [&str; 5] = ["0-2 yrs", "3-5 yrs", "6-8 yrs", "9-12 yrs", "12+ yrs"];
/// 各分箱的右端點 (含)
const EXPERIENCE_BIN_EDGES: [f64; 5] = [2.0, 5.0, 8.0, 12.0, 25.0];

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// 依首次出現順序計數
fn tally<'a, I>(items: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for item in items {
        match index.get(item) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(item, counts.len());
                counts.push((item, 1));
            }
        }
    }
    counts.into_iter().map(|(s, c)| (s.to_string(), c)).collect()
}

/// 由多到少；穩定排序，同次數保持原順序
fn ranked(mut counts: Vec<(String, usize)>) -> Vec<(String, usize)> {
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SkillFrequency {
    /// 全部技能，依首次出現順序
    pub encountered: Vec<(String, usize)>,
    /// 全部技能，依次數排序
    pub ranked: Vec<(String, usize)>,
    pub total_mentions: usize,
}

impl SkillFrequency {
    pub fn from_records(skills_per_record: &[Vec<Skill>]) -> Self {
        let encountered = tally(
            skills_per_record
                .iter()
                .flatten()
                .map(|s| s.name.as_str()),
        );
        let total_mentions = encountered.iter().map(|(_, c)| c).sum();
        Self {
            ranked: ranked(encountered.clone()),
            encountered,
            total_mentions,
        }
    }

    pub fn working_set(&self) -> &[(String, usize)] {
        &self.ranked[..self.ranked.len().min(WORKING_SET)]
    }

    pub fn top(&self, n: usize) -> &[(String, usize)] {
        &self.ranked[..self.ranked.len().min(n)]
    }

    pub fn core(&self) -> Vec<String> {
        self.top(CORE_SKILLS).iter().map(|(s, _)| s.clone()).collect()
    }

    pub fn secondary(&self) -> Vec<String> {
        self.working_set()
            .iter()
            .skip(CORE_SKILLS)
            .take(SECONDARY_SKILLS)
            .map(|(s, _)| s.clone())
            .collect()
    }

    pub fn unique(&self) -> usize {
        self.ranked.len()
    }

    fn sum_top(&self, n: usize) -> usize {
        self.top(n).iter().map(|(_, c)| c).sum()
    }
}

pub fn skill_dominance(frequency: &SkillFrequency) -> Option<SkillDominance> {
    let total = frequency.total_mentions;
    if total == 0 {
        return None;
    }

    let top1 = frequency.sum_top(1);
    let top3 = frequency.sum_top(3);
    let top5 = frequency.sum_top(CORE_SKILLS);
    // long tail 只計工作集 (前 15 名) 中第 6 名之後的技能
    let long_tail: usize = frequency
        .working_set()
        .iter()
        .skip(CORE_SKILLS)
        .map(|(_, c)| c)
        .sum();
    let share = |count: usize| round_to(count as f64 / total as f64 * 100.0, 1);

    Some(SkillDominance {
        top1_skill: frequency.ranked.first().map(|(s, _)| s.clone()),
        top1_share: share(top1),
        top3_share: share(top3),
        top5_share: share(top5),
        long_tail_share: share(long_tail),
        dominance_ratio: round_to(top5 as f64 / long_tail.max(1) as f64, 2),
        total_unique_skills: frequency.unique(),
        total_skill_mentions: total,
    })
}

pub fn category_distribution(
    frequency: &SkillFrequency,
    vocabulary: &Vocabulary,
) -> OrderedMap<CategoryShare> {
    let total = frequency.total_mentions;
    if total == 0 {
        return OrderedMap::default();
    }

    // 依技能首次出現的順序累加類別
    let mut sums: Vec<(&str, usize)> = Vec::new();
    for (skill, count) in &frequency.encountered {
        let category = vocabulary.category_of(skill);
        match sums.iter_mut().find(|(c, _)| *c == category) {
            Some(entry) => entry.1 += count,
            None => sums.push((category, *count)),
        }
    }
    sums.sort_by(|a, b| b.1.cmp(&a.1));

    OrderedMap(
        sums.into_iter()
            .map(|(category, count)| {
                (
                    category.to_string(),
                    CategoryShare {
                        count,
                        percentage: round_to(count as f64 / total as f64 * 100.0, 1),
                    },
                )
            })
            .collect(),
    )
}

pub fn skill_cooccurrence(skills_per_record: &[Vec<Skill>]) -> Vec<SkillPair> {
    let records_with_skills = skills_per_record.iter().filter(|s| !s.is_empty()).count();

    let mut pairs: Vec<String> = Vec::new();
    for skills in skills_per_record.iter().filter(|s| s.len() >= 2) {
        let mut names: Vec<&str> = skills.iter().map(|s| s.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        for (i, first) in names.iter().enumerate() {
            for second in &names[i + 1..] {
                pairs.push(format!("{} + {}", first, second));
            }
        }
    }

    let denominator = records_with_skills.max(1) as f64;
    ranked(tally(pairs.iter().map(String::as_str)))
        .into_iter()
        .take(TOP_PAIRS)
        .filter(|(_, count)| *count >= MIN_PAIR_COUNT)
        .map(|(pair, count)| SkillPair {
            pair,
            count,
            percentage: round_to(count as f64 / denominator * 100.0, 1),
        })
        .collect()
}

fn bin_index(years: f64) -> Option<usize> {
    if !(0.0..=MAX_EXPERIENCE_YEARS as f64).contains(&years) {
        return None;
    }
    EXPERIENCE_BIN_EDGES.iter().position(|edge| years <= *edge)
}

/// 代表值分箱 (右端點含)，空箱不列出，保持分箱順序
pub fn experience_distribution(points: &[f64]) -> OrderedMap<usize> {
    let mut counts = [0usize; EXPERIENCE_BIN_LABELS.len()];
    for index in points.iter().filter_map(|p| bin_index(*p)) {
        counts[index] += 1;
    }
    OrderedMap(
        EXPERIENCE_BIN_LABELS
            .iter()
            .zip(counts)
            .filter(|(_, count)| *count > 0)
            .map(|(label, count)| (label.to_string(), count))
            .collect(),
    )
}

pub fn dominant_experience(distribution: &OrderedMap<usize>) -> String {
    let mut best: Option<(&str, usize)> = None;
    for (label, count) in distribution.iter() {
        if best.map_or(true, |(_, c)| *count > c) {
            best = Some((label, *count));
        }
    }
    best.map(|(l, _)| l.to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

pub fn band_for_year(year: u32) -> ExperienceBand {
    match year {
        0..=2 => ExperienceBand::EntryLevel,
        3..=5 => ExperienceBand::EarlyCareer,
        6..=8 => ExperienceBand::MidCareer,
        9..=12 => ExperienceBand::Senior,
        _ => ExperienceBand::Expert,
    }
}

pub fn flexibility_for_width(avg_width: f64) -> Flexibility {
    if avg_width <= 2.0 {
        Flexibility::Narrow
    } else if avg_width <= 5.0 {
        Flexibility::Moderate
    } else {
        Flexibility::Flexible
    }
}

/// 每個區間涵蓋的每一年加一
pub fn year_demand_density(intervals: &[ExperienceInterval]) -> BTreeMap<u32, usize> {
    let mut density = BTreeMap::new();
    for interval in intervals {
        for year in interval.years().filter(|y| *y <= MAX_EXPERIENCE_YEARS) {
            *density.entry(year).or_insert(0) += 1;
        }
    }
    density
}

/// 需求最高的年份；同票取較小的年份
pub fn peak_year(density: &BTreeMap<u32, usize>) -> Option<(u32, usize)> {
    let mut peak: Option<(u32, usize)> = None;
    for (&year, &count) in density {
        if peak.map_or(true, |(_, c)| count > c) {
            peak = Some((year, count));
        }
    }
    peak
}

pub fn experience_range_analytics(intervals: &[ExperienceInterval]) -> ExperienceRangeAnalytics {
    if intervals.is_empty() {
        return ExperienceRangeAnalytics {
            has_range_data: false,
            ranges_parsed: 0,
            min_experience_observed: None,
            max_experience_observed: None,
            peak_demand_year: None,
            peak_demand_count: 0,
            dominant_band: None,
            avg_range_width: None,
            experience_flexibility: None,
            year_demand_density: BTreeMap::new(),
        };
    }

    let density = year_demand_density(intervals);
    let peak = peak_year(&density);
    let avg_width = intervals.iter().map(|i| f64::from(i.width())).sum::<f64>()
        / intervals.len() as f64;

    ExperienceRangeAnalytics {
        has_range_data: true,
        ranges_parsed: intervals.len(),
        min_experience_observed: intervals.iter().map(|i| i.min_years()).min(),
        max_experience_observed: intervals.iter().map(|i| i.max_years()).max(),
        peak_demand_year: peak.map(|(y, _)| y),
        peak_demand_count: peak.map_or(0, |(_, c)| c),
        dominant_band: peak.map(|(y, _)| band_for_year(y)),
        avg_range_width: Some(round_to(avg_width, 1)),
        experience_flexibility: Some(flexibility_for_width(avg_width)),
        year_demand_density: density,
    }
}
