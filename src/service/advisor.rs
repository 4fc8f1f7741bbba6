use crate::config::AppConfig;
use crate::dataset::{append_entry, WasteCatalog};
use crate::error::{AdvisorError, Result};
use crate::models::waste::{COL_COMPOST_TIME, COL_NUTRIENT, COL_TIPS};
use crate::models::{
    Advice, AdviceRequest, CompostEstimate, MatchedWaste, NewWasteEntry, Report, WasteEntry,
};
use crate::service::matcher::{self, MatchResult};
use chrono::Local;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// 建议服务: 只读数据集 + 匹配器 + 配置
pub struct AdvisorService {
    catalog: Arc<WasteCatalog>,
    config: AppConfig,
    dataset_path: PathBuf,
    /// 串行化 CSV 写入
    write_lock: Mutex<()>,
}

impl AdvisorService {
    pub fn new(catalog: Arc<WasteCatalog>, config: AppConfig) -> Self {
        let dataset_path = PathBuf::from(&config.dataset.path);
        Self {
            catalog,
            config,
            dataset_path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn catalog(&self) -> &WasteCatalog {
        &self.catalog
    }

    /// 处理建议请求
    pub fn advise(&self, req: &AdviceRequest) -> Result<Advice> {
        let matcher_cfg = &self.config.matcher;
        let scorer = matcher_cfg.scorer.scorer();

        let selected = req.selected.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let query = req.query.as_deref().map(str::trim).filter(|s| !s.is_empty());

        if let Some(q) = query {
            let chars = q.chars().count();
            if chars > matcher_cfg.max_query_chars {
                return Err(AdvisorError::InvalidInput(format!(
                    "Query is too long ({} characters, at most {}).",
                    chars, matcher_cfg.max_query_chars
                )));
            }
        }

        // 评分只计算一次, 未命中时候选复用同一结果
        let mut scored = Vec::new();
        let matched = if let Some(label) = selected {
            let entry = self
                .catalog
                .get(label)
                .ok_or_else(|| AdvisorError::UnknownWasteType(label.to_string()))?;
            MatchResult::Found { entry, score: 1.0 }
        } else if let Some(q) = query {
            scored = matcher::score_entries(q, self.catalog.entries(), scorer);
            matcher::pick_best(&scored, matcher_cfg.threshold)
        } else {
            MatchResult::NoMatch { best_score: 0.0 }
        };

        let advice = match matched {
            MatchResult::Found { entry, score } => {
                tracing::info!("Matched '{}' (score {:.3})", entry.label, score);
                Advice::Matched {
                    matched: MatchedWaste {
                        entry: entry.clone(),
                        score,
                    },
                    estimate: self.estimate(entry, req.quantity_kg),
                }
            }
            MatchResult::NoMatch { best_score } => {
                if let Some(q) = query {
                    tracing::info!("No confident match for '{}' (best score {:.3})", q, best_score);
                }
                Advice::NoMatch {
                    best_score,
                    suggestions: matcher::top_suggestions(&scored, matcher_cfg.suggestion_limit),
                }
            }
        };

        Ok(advice)
    }

    /// 堆肥产出估算, 数量 <= 0 时不估算
    fn estimate(&self, entry: &WasteEntry, quantity_kg: Option<f64>) -> Option<CompostEstimate> {
        let qty = quantity_kg.filter(|q| q.is_finite() && *q > 0.0)?;
        let yield_pct = entry
            .yield_pct()
            .unwrap_or(self.config.advice.default_yield_pct);
        Some(CompostEstimate::new(qty, yield_pct))
    }

    /// 生成可下载的文本报告
    pub fn report(&self, req: &AdviceRequest) -> Result<Report> {
        let advice = self.advise(req)?;
        let Advice::Matched { matched, estimate } = advice else {
            let text = req
                .query
                .as_deref()
                .or(req.selected.as_deref())
                .unwrap_or_default();
            return Err(AdvisorError::NoMatch(text.trim().to_string()));
        };

        Ok(Report {
            file_name: report_file_name(&matched.entry.label),
            body: format_report(&matched.entry, estimate.as_ref()),
        })
    }

    /// 新增废弃物类型, 写入 CSV; 内存数据集保持不变, 重启后生效
    pub async fn add_waste_type(&self, new: NewWasteEntry) -> Result<WasteEntry> {
        if new.waste_type.trim().is_empty() {
            return Err(AdvisorError::InvalidInput("Enter a waste type name.".to_string()));
        }
        // 空推荐的行在加载时会被跳过
        if new.best_use.trim().is_empty() {
            return Err(AdvisorError::InvalidInput("Enter a best use.".to_string()));
        }
        if self.catalog.contains(&new.waste_type) {
            return Err(AdvisorError::DuplicateWasteType(new.waste_type.trim().to_string()));
        }

        let entry = new.into_entry();
        let _guard = self.write_lock.lock().await;

        // 同名检查在 append_entry 中基于文件内容完成
        let path = self.dataset_path.clone();
        let row = entry.clone();
        tokio::task::spawn_blocking(move || append_entry(&path, &row))
            .await
            .map_err(|e| AdvisorError::Io(std::io::Error::other(e)))??;
        Ok(entry)
    }
}

/// 报告文件名: 仅保留 ASCII 字母数字与 `-`, 其余替换为 `_`
fn report_file_name(label: &str) -> String {
    let stem: String = label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!("fert_advice_{}.txt", stem)
}

fn format_report(entry: &WasteEntry, estimate: Option<&CompostEstimate>) -> String {
    let field = |key: &str| entry.attribute(key).unwrap_or_default().to_string();

    let mut lines = vec![
        "Farm Waste -> Fertilizer Advisor Report".to_string(),
        format!("Generated: {}", Local::now().format("%Y-%m-%d %H:%M:%S")),
        String::new(),
        format!("Waste Type: {}", entry.label),
        format!("Best Use: {}", entry.recommendation),
        format!("Compost Time: {}", field(COL_COMPOST_TIME)),
        format!("Nutrient: {}", field(COL_NUTRIENT)),
        format!("Tips: {}", field(COL_TIPS)),
    ];

    if let Some(est) = estimate {
        lines.push(String::new());
        lines.push(format!("Input Quantity: {:.2} kg", est.input_kg));
        lines.push(format!("Estimated Compost Output: {:.2} kg", est.output_kg));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::waste::COL_YIELD_PCT;

    fn service() -> AdvisorService {
        let catalog = WasteCatalog::from_entries(vec![
            WasteEntry::new("cow manure", "compost with straw")
                .with_attribute(COL_COMPOST_TIME, "2-3 months")
                .with_attribute(COL_NUTRIENT, "Nitrogen")
                .with_attribute(COL_TIPS, "Turn weekly")
                .with_attribute(COL_YIELD_PCT, "50"),
            WasteEntry::new("banana peels", "vermicompost"),
        ]);
        AdvisorService::new(Arc::new(catalog), AppConfig::default())
    }

    fn query(q: &str, qty: Option<f64>) -> AdviceRequest {
        AdviceRequest {
            query: Some(q.to_string()),
            selected: None,
            quantity_kg: qty,
        }
    }

    #[test]
    fn test_estimate_uses_dataset_yield() {
        let advice = service().advise(&query("Cow Manure", Some(10.0))).unwrap();
        let Advice::Matched { estimate, .. } = advice else {
            panic!("expected a match");
        };
        let est = estimate.unwrap();
        assert!((est.yield_pct - 50.0).abs() < 1e-9);
        assert!((est.output_kg - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_estimate_falls_back_to_default_yield() {
        let advice = service().advise(&query("banana peel", Some(2.5))).unwrap();
        let Advice::Matched { estimate, .. } = advice else {
            panic!("expected a match");
        };
        let est = estimate.unwrap();
        assert!((est.yield_pct - 40.0).abs() < 1e-9);
        assert!((est.output_kg - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_quantity_skips_estimate() {
        let advice = service().advise(&query("cow manure", Some(0.0))).unwrap();
        assert!(matches!(advice, Advice::Matched { estimate: None, .. }));
    }

    #[test]
    fn test_selection_wins_over_query() {
        let req = AdviceRequest {
            query: Some("cow manure".to_string()),
            selected: Some("banana peels".to_string()),
            quantity_kg: None,
        };
        let advice = service().advise(&req).unwrap();
        let matched = advice.matched().unwrap();
        assert_eq!(matched.entry.label, "banana peels");
        assert_eq!(matched.score, 1.0);
    }

    #[test]
    fn test_unknown_selection_is_error() {
        let req = AdviceRequest {
            selected: Some("plastic".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            service().advise(&req),
            Err(AdvisorError::UnknownWasteType(_))
        ));
    }

    #[test]
    fn test_no_match_returns_suggestions() {
        let advice = service().advise(&query("plastic bottle", None)).unwrap();
        let Advice::NoMatch { suggestions, best_score } = advice else {
            panic!("expected no match");
        };
        assert!(best_score < 0.5);
        assert_eq!(suggestions.len(), 2);
    }

    #[test]
    fn test_empty_request_is_no_match_without_suggestions() {
        let advice = service().advise(&AdviceRequest::default()).unwrap();
        assert!(matches!(
            advice,
            Advice::NoMatch { best_score, ref suggestions } if best_score == 0.0 && suggestions.is_empty()
        ));
    }

    #[test]
    fn test_report_contents() {
        let report = service().report(&query("cow manur", Some(4.0))).unwrap();
        assert_eq!(report.file_name, "fert_advice_cow_manure.txt");
        assert!(report.body.starts_with("Farm Waste -> Fertilizer Advisor Report\nGenerated: "));
        assert!(report.body.contains("Best Use: compost with straw"));
        assert!(report.body.contains("Compost Time: 2-3 months"));
        assert!(report.body.contains("Input Quantity: 4.00 kg"));
        assert!(report.body.contains("Estimated Compost Output: 2.00 kg"));
    }

    #[test]
    fn test_report_without_match_is_error() {
        assert!(matches!(
            service().report(&query("plastic bottle", None)),
            Err(AdvisorError::NoMatch(_))
        ));
    }

    #[test]
    fn test_overlong_query_is_rejected() {
        let svc = service();
        let limit = AppConfig::default().matcher.max_query_chars;

        let ok = svc.advise(&query(&"x".repeat(limit), None));
        assert!(ok.is_ok());

        let long = svc.advise(&query(&"x".repeat(limit + 1), None));
        assert!(matches!(long, Err(AdvisorError::InvalidInput(_))));
    }

    #[test]
    fn test_report_file_name_is_header_safe() {
        assert_eq!(report_file_name("cow manure"), "fert_advice_cow_manure.txt");
        assert_eq!(report_file_name("12\" \"pipe\"\\x"), "fert_advice_12___pipe__x.txt");
        assert_eq!(report_file_name("café"), "fert_advice_caf_.txt");
    }

    fn service_at(path: &std::path::Path) -> AdvisorService {
        let catalog = WasteCatalog::from_entries(vec![WasteEntry::new("cow manure", "compost")]);
        let mut config = AppConfig::default();
        config.dataset.path = path.display().to_string();
        AdvisorService::new(Arc::new(catalog), config)
    }

    fn new_entry(name: &str, best_use: &str) -> NewWasteEntry {
        NewWasteEntry {
            waste_type: name.to_string(),
            best_use: best_use.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_add_rejects_blank_best_use() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("waste_data.csv");
        let svc = service_at(&path);

        let result = svc.add_waste_type(new_entry("wood ash", "  ")).await;
        assert!(matches!(result, Err(AdvisorError::InvalidInput(_))));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_add_same_label_twice_before_restart() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("waste_data.csv");
        let svc = service_at(&path);

        let first = svc.add_waste_type(new_entry("wood ash", "sprinkle lightly")).await;
        assert!(first.is_ok());

        let second = svc.add_waste_type(new_entry("Wood  Ash", "again")).await;
        assert!(matches!(second, Err(AdvisorError::DuplicateWasteType(_))));

        let catalog = crate::dataset::load_catalog(&path).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("wood ash").unwrap().recommendation, "sprinkle lightly");
    }
}
