use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;

use crate::domain::report::AnalysisReport;

/// 經驗年數上限 (年)
pub const MAX_EXPERIENCE_YEARS: u32 = 25;

/// 一筆原始職缺資料：欄位名稱 → 值，缺少的欄位視為不存在
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub data: HashMap<String, serde_json::Value>,
}

impl JobRecord {
    pub fn new(data: HashMap<String, serde_json::Value>) -> Self {
        Self { data }
    }

    /// 讀取欄位的文字內容。`null`、空白字串、陣列與物件都視為不存在，
    /// 數字與布林值以文字形式讀取。
    pub fn text(&self, field: &str) -> Option<Cow<'_, str>> {
        match self.data.get(field)? {
            serde_json::Value::String(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then_some(Cow::Borrowed(trimmed))
            }
            serde_json::Value::Number(n) => Some(Cow::Owned(n.to_string())),
            serde_json::Value::Bool(b) => Some(Cow::Owned(b.to_string())),
            _ => None,
        }
    }

    pub fn has_text(&self, field: &str) -> bool {
        self.text(field).is_some()
    }
}

impl<K: Into<String>, V: Into<serde_json::Value>> FromIterator<(K, V)> for JobRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            data: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// 技能名稱的來源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillOrigin {
    /// 由詞彙表別名比對而來
    Vocabulary,
    /// 比對後剩下的詞，未經詞彙表確認
    AdHoc,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub origin: SkillOrigin,
}

impl Skill {
    pub fn canonical(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            origin: SkillOrigin::Vocabulary,
        }
    }

    pub fn ad_hoc(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            origin: SkillOrigin::AdHoc,
        }
    }

    pub fn is_ad_hoc(&self) -> bool {
        self.origin == SkillOrigin::AdHoc
    }
}

/// 經驗年數區間。建構時保證 `min_years <= max_years <= MAX_EXPERIENCE_YEARS`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ExperienceInterval {
    min_years: u32,
    max_years: u32,
}

impl ExperienceInterval {
    /// 反向的輸入會被交換，兩端都截在上限
    pub fn new(a: u32, b: u32) -> Self {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        Self {
            min_years: lo.min(MAX_EXPERIENCE_YEARS),
            max_years: hi.min(MAX_EXPERIENCE_YEARS),
        }
    }

    pub fn point(years: u32) -> Self {
        Self::new(years, years)
    }

    pub fn min_years(&self) -> u32 {
        self.min_years
    }

    pub fn max_years(&self) -> u32 {
        self.max_years
    }

    pub fn width(&self) -> u32 {
        self.max_years - self.min_years
    }

    pub fn years(&self) -> std::ops::RangeInclusive<u32> {
        self.min_years..=self.max_years
    }
}

/// 職缺資料的來源
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    File {
        path: String,
    },
    Api {
        endpoint: String,
        timeout_seconds: Option<u64>,
        headers: HashMap<String, String>,
    },
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub records_received: usize,
    pub report: AnalysisReport,
}
