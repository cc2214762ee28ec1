//! 市場一致性、職稱清晰度與資料品質分級

use crate::domain::model::Skill;
use crate::domain::report::Level;
use std::collections::HashSet;

pub const MAX_TITLES: usize = 10;

/// 相鄰 (依批次順序) 且都有技能的職缺之 Jaccard 相似度平均值
pub fn average_adjacent_similarity(skills_per_record: &[Vec<Skill>]) -> f64 {
    let sets: Vec<HashSet<&str>> = skills_per_record
        .iter()
        .filter(|s| !s.is_empty())
        .map(|s| s.iter().map(|k| k.name.as_str()).collect())
        .collect();

    let similarities: Vec<f64> = sets
        .windows(2)
        .filter_map(|pair| {
            let union = pair[0].union(&pair[1]).count();
            (union > 0).then(|| pair[0].intersection(&pair[1]).count() as f64 / union as f64)
        })
        .collect();

    if similarities.is_empty() {
        0.0
    } else {
        similarities.iter().sum::<f64>() / similarities.len() as f64
    }
}

pub fn market_consistency(avg_similarity: f64) -> Level {
    if avg_similarity > 0.4 {
        Level::High
    } else if avg_similarity > 0.2 {
        Level::Medium
    } else {
        Level::Low
    }
}

/// 不同職稱越多，角色定義越不清楚
pub fn title_clarity(distinct_titles: usize) -> Level {
    if distinct_titles > 5 {
        Level::Low
    } else if distinct_titles > 2 {
        Level::Medium
    } else {
        Level::High
    }
}

pub fn completeness(
    has_description: usize,
    has_skills: usize,
    has_experience: usize,
    total_jobs: usize,
) -> f64 {
    if total_jobs == 0 {
        return 0.0;
    }
    let filled = (has_description + has_skills + has_experience) as f64;
    crate::domain::services::aggregation::round_to(filled / (total_jobs * 3) as f64 * 100.0, 1)
}

pub fn quality_grade(total_jobs: usize, completeness: f64) -> (Level, &'static str) {
    if total_jobs >= 20 && completeness >= 80.0 {
        (Level::High, "Robust dataset suitable for comprehensive analysis")
    } else if total_jobs >= 10 && completeness >= 60.0 {
        (Level::Medium, "Adequate data for directional insights")
    } else {
        (Level::Low, "Limited data; findings are indicative only")
    }
}
