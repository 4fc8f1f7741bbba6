use crate::models::{Suggestion, WasteEntry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use strsim::{jaro_winkler, normalized_levenshtein};

/// 相似度评分接口, 输入均为已规范化的字符串, 返回 [0,1]
pub trait Similarity {
    fn score(&self, query: &str, label: &str) -> f64;
}

/// 加权比率: 编辑距离比率 + token 排序/集合比率, 长度悬殊时使用局部比率
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedRatio;

/// 归一化 Levenshtein
#[derive(Debug, Clone, Copy, Default)]
pub struct Levenshtein;

#[derive(Debug, Clone, Copy, Default)]
pub struct JaroWinkler;

const TOKEN_SCALE: f64 = 0.95;
const PARTIAL_LEN_RATIO: f64 = 1.5;
const LONG_LEN_RATIO: f64 = 8.0;

impl Similarity for WeightedRatio {
    fn score(&self, query: &str, label: &str) -> f64 {
        if query.is_empty() || label.is_empty() {
            return 0.0;
        }

        let (qlen, llen) = (query.chars().count(), label.chars().count());
        let len_ratio = qlen.max(llen) as f64 / qlen.min(llen) as f64;
        let base = ratio(query, label);

        if len_ratio < PARTIAL_LEN_RATIO {
            return base
                .max(token_sort_ratio(query, label) * TOKEN_SCALE)
                .max(token_set_ratio(query, label) * TOKEN_SCALE);
        }

        let partial_scale = if len_ratio < LONG_LEN_RATIO { 0.9 } else { 0.6 };
        base.max(partial_ratio(query, label) * partial_scale)
            .max(token_set_ratio(query, label) * TOKEN_SCALE * partial_scale)
    }
}

impl Similarity for Levenshtein {
    fn score(&self, query: &str, label: &str) -> f64 {
        if query.is_empty() || label.is_empty() {
            return 0.0;
        }
        normalized_levenshtein(query, label)
    }
}

impl Similarity for JaroWinkler {
    fn score(&self, query: &str, label: &str) -> f64 {
        if query.is_empty() || label.is_empty() {
            return 0.0;
        }
        jaro_winkler(query, label)
    }
}

/// 评分算法选择 (配置项)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorerKind {
    #[default]
    Weighted,
    Levenshtein,
    JaroWinkler,
}

impl ScorerKind {
    pub fn scorer(self) -> &'static (dyn Similarity + Send + Sync) {
        match self {
            ScorerKind::Weighted => &WeightedRatio,
            ScorerKind::Levenshtein => &Levenshtein,
            ScorerKind::JaroWinkler => &JaroWinkler,
        }
    }
}

/// 匹配结果
#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult<'a> {
    Found { entry: &'a WasteEntry, score: f64 },
    /// 未达到阈值, 附带最高分 (空查询为 0)
    NoMatch { best_score: f64 },
}

impl<'a> MatchResult<'a> {
    pub fn entry(&self) -> Option<&'a WasteEntry> {
        match self {
            MatchResult::Found { entry, .. } => Some(*entry),
            MatchResult::NoMatch { .. } => None,
        }
    }

    pub fn score(&self) -> f64 {
        match self {
            MatchResult::Found { score, .. } => *score,
            MatchResult::NoMatch { best_score } => *best_score,
        }
    }
}

/// 规范化: 小写, 去首尾空白, 合并连续空白
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// 对每个条目评分一次, 保持原始顺序; 空查询返回空列表
pub fn score_entries<'a, S>(query: &str, entries: &'a [WasteEntry], scorer: &S) -> Vec<(&'a WasteEntry, f64)>
where
    S: Similarity + ?Sized,
{
    let query = normalize(query);
    if query.is_empty() {
        return Vec::new();
    }

    entries
        .iter()
        .map(|e| (e, scorer.score(&query, &normalize(&e.label))))
        .collect()
}

/// 从已评分列表中取最高分, 同分时取原始顺序中的第一个
pub fn pick_best<'a>(scored: &[(&'a WasteEntry, f64)], threshold: f64) -> MatchResult<'a> {
    let mut best: Option<(&'a WasteEntry, f64)> = None;
    for &(entry, score) in scored {
        let is_better = match best {
            None => true,
            Some((_, best_score)) => score > best_score,
        };
        if is_better {
            best = Some((entry, score));
        }
    }

    match best {
        Some((entry, score)) if score >= threshold.clamp(0.0, 1.0) => {
            MatchResult::Found { entry, score }
        }
        Some((_, score)) => MatchResult::NoMatch { best_score: score },
        None => MatchResult::NoMatch { best_score: 0.0 },
    }
}

/// 按分数降序取前 limit 个, 同分保持原始顺序
pub fn top_suggestions(scored: &[(&WasteEntry, f64)], limit: usize) -> Vec<Suggestion> {
    let mut ranked: Vec<Suggestion> = scored
        .iter()
        .map(|(e, score)| Suggestion {
            label: e.label.clone(),
            score: *score,
        })
        .collect();

    // sort_by 是稳定排序
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(limit);
    ranked
}

/// 在参考集中查找最佳匹配
pub fn best_match<'a, S>(
    query: &str,
    entries: &'a [WasteEntry],
    threshold: f64,
    scorer: &S,
) -> MatchResult<'a>
where
    S: Similarity + ?Sized,
{
    pick_best(&score_entries(query, entries, scorer), threshold)
}

/// 按分数降序返回前 limit 个候选
pub fn suggest<S>(query: &str, entries: &[WasteEntry], limit: usize, scorer: &S) -> Vec<Suggestion>
where
    S: Similarity + ?Sized,
{
    top_suggestions(&score_entries(query, entries, scorer), limit)
}

fn ratio(a: &str, b: &str) -> f64 {
    normalized_levenshtein(a, b)
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

/// 一方 token 是另一方子集时视为完全匹配
fn token_set_ratio(a: &str, b: &str) -> f64 {
    let ta: BTreeSet<&str> = a.split_whitespace().collect();
    let tb: BTreeSet<&str> = b.split_whitespace().collect();

    let inter: Vec<&str> = ta.intersection(&tb).copied().collect();
    let diff_ab: Vec<&str> = ta.difference(&tb).copied().collect();
    let diff_ba: Vec<&str> = tb.difference(&ta).copied().collect();

    if !inter.is_empty() && (diff_ab.is_empty() || diff_ba.is_empty()) {
        return 1.0;
    }

    let sect = inter.join(" ");
    let combined_ab = inter.iter().chain(diff_ab.iter()).copied().collect::<Vec<_>>().join(" ");
    let combined_ba = inter.iter().chain(diff_ba.iter()).copied().collect::<Vec<_>>().join(" ");

    let mut best = ratio(&combined_ab, &combined_ba);
    if !sect.is_empty() {
        best = best
            .max(ratio(&sect, &combined_ab))
            .max(ratio(&sect, &combined_ba));
    }
    best
}

/// 短串与长串中等长窗口的最佳比率
fn partial_ratio(a: &str, b: &str) -> f64 {
    let (short, long): (Vec<char>, Vec<char>) = {
        let (ac, bc): (Vec<char>, Vec<char>) = (a.chars().collect(), b.chars().collect());
        if ac.len() <= bc.len() {
            (ac, bc)
        } else {
            (bc, ac)
        }
    };

    if short.is_empty() {
        return 0.0;
    }

    let short: String = short.into_iter().collect();
    long.windows(short.chars().count())
        .map(|w| ratio(&short, &w.iter().collect::<String>()))
        .fold(0.0, f64::max)
}
