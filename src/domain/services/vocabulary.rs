//! 技能詞彙表：小寫別名 → 標準名稱，以及標準名稱 → 類別。
//!
//! 詞彙表是設定資料，由外部注入 `SkillExtractor` 與聚合計算；
//! `Vocabulary::builtin()` 提供預設內容，也可以從 TOML 檔載入或擴充。

use crate::utils::error::{EtlError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

pub const OTHER_CATEGORY: &str = "Other";

const BUILTIN_ALIASES: &[(&str, &str)] = &[
    ("powerbi", "Power BI"),
    ("power bi", "Power BI"),
    ("power-bi", "Power BI"),
    ("pbi", "Power BI"),
    ("postgres", "PostgreSQL"),
    ("postgresql", "PostgreSQL"),
    ("pg", "PostgreSQL"),
    ("gcp", "GCP"),
    ("google cloud platform", "GCP"),
    ("google cloud", "GCP"),
    ("aws", "AWS"),
    ("amazon web services", "AWS"),
    ("azure", "Azure"),
    ("microsoft azure", "Azure"),
    ("sql", "SQL"),
    ("mysql", "MySQL"),
    ("mssql", "SQL Server"),
    ("sql server", "SQL Server"),
    ("python", "Python"),
    ("python3", "Python"),
    ("py", "Python"),
    ("javascript", "JavaScript"),
    ("js", "JavaScript"),
    ("node.js", "Node.js"),
    ("nodejs", "Node.js"),
    ("java", "Java"),
    ("excel", "Excel"),
    ("ms excel", "Excel"),
    ("microsoft excel", "Excel"),
    ("tableau", "Tableau"),
    ("machine learning", "Machine Learning"),
    ("ml", "Machine Learning"),
    ("ai", "AI"),
    ("artificial intelligence", "AI"),
    ("data science", "Data Science"),
    ("datascience", "Data Science"),
    ("data analysis", "Data Analysis"),
    ("data analytics", "Data Analytics"),
    ("etl", "ETL"),
    ("agile", "Agile"),
    ("scrum", "Scrum"),
    ("jira", "Jira"),
    ("confluence", "Confluence"),
    ("docker", "Docker"),
    ("kubernetes", "Kubernetes"),
    ("k8s", "Kubernetes"),
    ("git", "Git"),
    ("github", "GitHub"),
    ("gitlab", "GitLab"),
    ("spark", "Spark"),
    ("apache spark", "Spark"),
    ("hadoop", "Hadoop"),
    ("bigquery", "BigQuery"),
    ("snowflake", "Snowflake"),
    ("databricks", "Databricks"),
    ("salesforce", "Salesforce"),
    ("crm", "CRM"),
    ("erp", "ERP"),
    ("sap", "SAP"),
    ("oracle", "Oracle"),
    ("communication", "Communication"),
    ("collaboration", "Collaboration"),
    ("project management", "Project Management"),
    ("pm", "Project Management"),
    ("business analyst", "Business Analysis"),
    ("business analysis", "Business Analysis"),
    ("process mapping", "Process Mapping"),
    ("business processes", "Business Processes"),
    ("api", "API"),
    ("linux", "Linux"),
    ("ci/cd", "CI/CD"),
    ("mongodb", "MongoDB"),
    ("nosql", "NoSQL"),
    ("kafka", "Kafka"),
    ("data warehousing", "Data Warehousing"),
    ("data engineering", "Data Engineering"),
    ("data quality", "Data Quality"),
    ("advanced analytics", "Advanced Analytics"),
    ("analytics", "Analytics"),
    ("analytical", "Analytical"),
    ("finance", "Finance"),
    ("operations", "Operations"),
    ("management", "Management"),
    ("compliance", "Compliance"),
    ("design", "Design"),
];

const BUILTIN_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Technical / Programming",
        &[
            "Python", "Java", "JavaScript", "Node.js", "SQL", "MySQL", "PostgreSQL", "SQL Server",
            "MongoDB", "NoSQL", "API", "Linux", "CI/CD", "Git", "GitHub", "GitLab",
        ],
    ),
    (
        "Data & Analytics",
        &[
            "Data Analysis", "Data Analytics", "Data Science", "Machine Learning", "AI", "ETL",
            "Data Warehousing", "Data Engineering", "Data Quality", "Advanced Analytics",
            "Analytics", "Analytical", "Business Analysis",
        ],
    ),
    (
        "Cloud & Infrastructure",
        &[
            "AWS", "Azure", "GCP", "Docker", "Kubernetes", "Spark", "Hadoop", "Kafka", "BigQuery",
            "Snowflake", "Databricks",
        ],
    ),
    (
        "Business / Process",
        &[
            "Business Processes", "Process Mapping", "Project Management", "Finance",
            "Operations", "Management", "Compliance",
        ],
    ),
    (
        "Tools & Platforms",
        &[
            "Excel", "Tableau", "Power BI", "Jira", "Confluence", "Salesforce", "CRM", "ERP",
            "SAP", "Oracle",
        ],
    ),
    (
        "Soft / Collaboration",
        &["Communication", "Collaboration", "Agile", "Scrum", "Design"],
    ),
];

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub skills: Vec<String>,
}

/// 詞彙檔格式
#[derive(Debug, Deserialize)]
struct VocabularyFile {
    #[serde(default)]
    aliases: BTreeMap<String, String>,
    #[serde(default)]
    categories: Vec<Category>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Vocabulary {
    /// 依別名長度由長到短排序，同長度依字母順序
    aliases: Vec<(String, String)>,
    categories: Vec<Category>,
}

impl Vocabulary {
    pub fn new<I, A, C>(aliases: I, categories: Vec<Category>) -> Result<Self>
    where
        I: IntoIterator<Item = (A, C)>,
        A: AsRef<str>,
        C: Into<String>,
    {
        let mut table = BTreeMap::new();
        for (alias, canonical) in aliases {
            let alias = alias.as_ref().trim().to_lowercase();
            let canonical = canonical.into();
            if alias.is_empty() {
                return Err(EtlError::VocabularyError {
                    message: format!("empty alias for '{}'", canonical),
                });
            }
            if canonical.trim().is_empty() {
                return Err(EtlError::VocabularyError {
                    message: format!("alias '{}' maps to an empty name", alias),
                });
            }
            table.insert(alias, canonical);
        }
        for category in &categories {
            if category.name.trim().is_empty() {
                return Err(EtlError::VocabularyError {
                    message: "category with an empty name".to_string(),
                });
            }
        }

        Ok(Self::from_table(table, categories))
    }

    pub fn builtin() -> Self {
        let table = BUILTIN_ALIASES
            .iter()
            .map(|(alias, canonical)| (alias.to_string(), canonical.to_string()))
            .collect();
        let categories = BUILTIN_CATEGORIES
            .iter()
            .map(|(name, skills)| Category {
                name: name.to_string(),
                skills: skills.iter().map(|s| s.to_string()).collect(),
            })
            .collect();
        Self::from_table(table, categories)
    }

    /// 從 TOML 字串載入詞彙表
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: VocabularyFile =
            toml::from_str(content).map_err(|e| EtlError::VocabularyError {
                message: format!("TOML parsing error: {}", e),
            })?;
        Self::new(file.aliases, file.categories)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 合併另一份詞彙表：別名以 `other` 為準，同名類別補上新技能，新類別附加在後面
    pub fn extend(self, other: Vocabulary) -> Self {
        let mut table: BTreeMap<String, String> = self.aliases.into_iter().collect();
        table.extend(other.aliases);

        let mut categories = self.categories;
        for incoming in other.categories {
            match categories.iter_mut().find(|c| c.name == incoming.name) {
                Some(existing) => {
                    for skill in incoming.skills {
                        if !existing.skills.contains(&skill) {
                            existing.skills.push(skill);
                        }
                    }
                }
                None => categories.push(incoming),
            }
        }

        Self::from_table(table, categories)
    }

    fn from_table(table: BTreeMap<String, String>, categories: Vec<Category>) -> Self {
        let mut aliases: Vec<(String, String)> = table.into_iter().collect();
        // BTreeMap 已依字母排序；穩定排序後同長度保持字母順序
        aliases.sort_by_key(|(alias, _)| std::cmp::Reverse(alias.chars().count()));
        Self {
            aliases,
            categories,
        }
    }

    pub fn canonical(&self, alias: &str) -> Option<&str> {
        let alias = alias.trim().to_lowercase();
        self.aliases
            .iter()
            .find(|(a, _)| *a == alias)
            .map(|(_, c)| c.as_str())
    }

    /// 第一個包含該技能的類別；都沒有時為 `"Other"`
    pub fn category_of(&self, skill: &str) -> &str {
        self.categories
            .iter()
            .find(|c| c.skills.iter().any(|s| s == skill))
            .map(|c| c.name.as_str())
            .unwrap_or(OTHER_CATEGORY)
    }

    pub fn aliases_longest_first(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases.iter().map(|(a, c)| (a.as_str(), c.as_str()))
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup_is_case_insensitive() {
        let vocab = Vocabulary::builtin();
        assert_eq!(vocab.canonical("PostgreSQL"), Some("PostgreSQL"));
        assert_eq!(vocab.canonical(" K8S "), Some("Kubernetes"));
        assert_eq!(vocab.canonical("rust"), None);
    }

    #[test]
    fn test_category_fallback_is_other() {
        let vocab = Vocabulary::builtin();
        assert_eq!(vocab.category_of("Power BI"), "Tools & Platforms");
        assert_eq!(vocab.category_of("Stakeholder"), OTHER_CATEGORY);
    }

    #[test]
    fn test_first_category_wins() {
        let vocab = Vocabulary::new(
            [("sql", "SQL")],
            vec![
                Category {
                    name: "Databases".to_string(),
                    skills: vec!["SQL".to_string()],
                },
                Category {
                    name: "Languages".to_string(),
                    skills: vec!["SQL".to_string()],
                },
            ],
        )
        .unwrap();
        assert_eq!(vocab.category_of("SQL"), "Databases");
    }

    #[test]
    fn test_aliases_sorted_longest_first() {
        let vocab = Vocabulary::new([("bi", "BI"), ("power bi", "Power BI"), ("pbi", "Power BI")], vec![])
            .unwrap();
        let order: Vec<&str> = vocab.aliases_longest_first().map(|(a, _)| a).collect();
        assert_eq!(order, vec!["power bi", "pbi", "bi"]);
    }

    #[test]
    fn test_from_toml_and_extend() {
        let fixture = r#"
[aliases]
"Rust Lang" = "Rust"
rust = "Rust"

[[categories]]
name = "Technical / Programming"
skills = ["Rust"]

[[categories]]
name = "Embedded"
skills = ["RTOS"]
"#;
        let extra = Vocabulary::from_toml_str(fixture).unwrap();
        assert_eq!(extra.canonical("rust lang"), Some("Rust"));

        let merged = Vocabulary::builtin().extend(extra);
        assert_eq!(merged.canonical("rust"), Some("Rust"));
        assert_eq!(merged.canonical("python"), Some("Python"));
        assert_eq!(merged.category_of("Rust"), "Technical / Programming");
        assert_eq!(merged.categories().last().map(|c| c.name.as_str()), Some("Embedded"));
    }

    #[test]
    fn test_empty_alias_is_rejected() {
        let err = Vocabulary::new([("  ", "Nothing")], vec![]).unwrap_err();
        assert!(matches!(err, EtlError::VocabularyError { .. }));

        let bad_toml = Vocabulary::from_toml_str("[aliases\n").unwrap_err();
        assert!(matches!(bad_toml, EtlError::VocabularyError { .. }));
    }
}
