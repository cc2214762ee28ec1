//! 技能欄位解析：把沒有可靠分隔符號的自由文字比對成標準技能名稱。

use crate::domain::model::Skill;
use crate::domain::services::vocabulary::Vocabulary;
use std::ops::Range;
use std::sync::Arc;

const STOPWORDS: &[&str] = &["yrs", "years", "the", "and", "for", "with"];
const MIN_RESIDUAL_CHARS: usize = 4;
const MAX_AD_HOC_PER_RECORD: usize = 3;

pub struct SkillExtractor {
    vocabulary: Arc<Vocabulary>,
}

impl SkillExtractor {
    pub fn new(vocabulary: Arc<Vocabulary>) -> Self {
        Self { vocabulary }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// 由長到短走訪別名；已被較長別名佔用的位置不會再被比對。
    /// 比對完剩下的詞取前三個當作 ad-hoc 技能。
    pub fn extract(&self, field: Option<&str>) -> Vec<Skill> {
        let text = match field.map(|f| f.trim().to_lowercase()) {
            Some(t) if !t.is_empty() => t,
            _ => return Vec::new(),
        };

        let mut consumed: Vec<Range<usize>> = Vec::new();
        let mut skills: Vec<Skill> = Vec::new();

        for (alias, canonical) in self.vocabulary.aliases_longest_first() {
            let mut matched = false;
            let mut start = 0;
            while let Some(offset) = text[start..].find(alias) {
                let begin = start + offset;
                let span = begin..begin + alias.len();
                if overlaps(&consumed, &span) {
                    // 往後移一個字元再找
                    start = begin + text[begin..].chars().next().map_or(1, char::len_utf8);
                } else {
                    start = span.end;
                    consumed.push(span);
                    matched = true;
                }
            }
            if matched && !skills.iter().any(|s| s.name == canonical) {
                skills.push(Skill::canonical(canonical));
            }
        }

        let residual = residual_text(&text, &mut consumed);
        let leftover = residual
            .split_whitespace()
            .filter(|w| w.chars().count() >= MIN_RESIDUAL_CHARS && !STOPWORDS.contains(w))
            .take(MAX_AD_HOC_PER_RECORD);
        for word in leftover {
            let name = title_case(word);
            if !skills.iter().any(|s| s.name == name) {
                skills.push(Skill::ad_hoc(name));
            }
        }

        skills
    }
}

fn overlaps(consumed: &[Range<usize>], span: &Range<usize>) -> bool {
    consumed
        .iter()
        .any(|c| c.start < span.end && span.start < c.end)
}

/// 每段已比對的範圍以一個空白取代
fn residual_text(text: &str, consumed: &mut [Range<usize>]) -> String {
    consumed.sort_by_key(|r| r.start);
    let mut residual = String::with_capacity(text.len());
    let mut cursor = 0;
    for span in consumed.iter() {
        residual.push_str(&text[cursor..span.start]);
        residual.push(' ');
        cursor = span.end;
    }
    residual.push_str(&text[cursor..]);
    residual
}

/// 字母前面不是字母時大寫，其餘小寫
pub fn title_case(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut prev_alpha = false;
    for ch in word.chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::SkillOrigin;

    fn builtin() -> SkillExtractor {
        SkillExtractor::new(Arc::new(Vocabulary::builtin()))
    }

    fn names(skills: &[Skill]) -> Vec<&str> {
        skills.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_empty_and_missing_fields() {
        let extractor = builtin();
        assert!(extractor.extract(None).is_empty());
        assert!(extractor.extract(Some("   ")).is_empty());
        assert!(extractor.extract(Some("the and for yrs")).is_empty());
    }

    #[test]
    fn test_longest_alias_wins_over_fragment() {
        let vocab = Vocabulary::new(
            [("power bi", "Power BI"), ("bi", "BI"), ("power", "Power")],
            vec![],
        )
        .unwrap();
        let extractor = SkillExtractor::new(Arc::new(vocab));

        let skills = extractor.extract(Some("Power BI"));
        assert_eq!(names(&skills), vec!["Power BI"]);

        let skills = extractor.extract(Some("power bi and bi tools"));
        assert_eq!(names(&skills), vec!["Power BI", "BI", "Tools"]);
    }

    #[test]
    fn test_aliases_map_to_one_canonical_name() {
        let skills = builtin().extract(Some("Postgres, PostgreSQL and pg admin"));
        assert_eq!(names(&skills), vec!["PostgreSQL", "Admin"]);
        assert_eq!(skills[1].origin, SkillOrigin::AdHoc);
    }

    #[test]
    fn test_no_duplicates_for_repeated_mentions() {
        let skills = builtin().extract(Some("python, Python3, PYTHON, sql, SQL"));
        let listed = names(&skills);
        assert_eq!(listed, vec!["Python", "SQL"]);
    }

    #[test]
    fn test_leftover_words_are_capped_and_title_cased() {
        let skills = builtin().extract(Some("python stakeholder negotiation budgeting forecasting"));
        assert_eq!(
            names(&skills),
            vec!["Python", "Stakeholder", "Negotiation", "Budgeting"]
        );
        assert!(skills[1..].iter().all(Skill::is_ad_hoc));
    }

    #[test]
    fn test_matched_text_does_not_leak_into_leftovers() {
        // "machine learning" 被比對後不會留下 "machine" / "learning"
        let skills = builtin().extract(Some("machine learning with tensorflow"));
        assert_eq!(names(&skills), vec!["Machine Learning", "Tensorflow"]);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("tensorflow"), "Tensorflow");
        assert_eq!(title_case("scikit-learn"), "Scikit-Learn");
        assert_eq!(title_case("3d-modeling"), "3D-Modeling");
    }
}
