use crate::error::{AdvisorError, Result};
use crate::models::waste::{COL_BEST_USE, COL_WASTE_TYPE};
use crate::models::WasteEntry;
use crate::service::matcher::normalize;
use indexmap::{IndexMap, IndexSet};
use std::path::Path;
use tracing::{info, warn};

/// 只读参考数据集, 启动时加载一次
#[derive(Debug, Clone, Default)]
pub struct WasteCatalog {
    entries: Vec<WasteEntry>,
    /// 规范化名称, 与 entries 同序
    labels: IndexSet<String>,
}

impl WasteCatalog {
    /// 从内存条目构建, 跳过空名称/空推荐/重复名称
    pub fn from_entries(entries: impl IntoIterator<Item = WasteEntry>) -> Self {
        let mut catalog = Self::default();
        for entry in entries {
            catalog.push(entry);
        }
        catalog
    }

    fn push(&mut self, entry: WasteEntry) -> bool {
        let key = normalize(&entry.label);
        if key.is_empty() {
            warn!("Skipping waste entry with empty label");
            return false;
        }
        if entry.recommendation.trim().is_empty() {
            warn!("Skipping waste entry '{}' without recommendation", entry.label);
            return false;
        }
        if !self.labels.insert(key) {
            warn!("Skipping duplicate waste entry '{}'", entry.label);
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub fn entries(&self) -> &[WasteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 按规范化名称精确查找 (列表选择)
    pub fn get(&self, label: &str) -> Option<&WasteEntry> {
        self.labels
            .get_index_of(&normalize(label))
            .map(|idx| &self.entries[idx])
    }

    pub fn contains(&self, label: &str) -> bool {
        self.get(label).is_some()
    }
}

/// 从 CSV 加载数据集
pub fn load_catalog(path: &Path) -> Result<WasteCatalog> {
    if !path.exists() {
        return Err(AdvisorError::DatasetNotFound(path.display().to_string()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| AdvisorError::MissingColumn(name.to_string()))
    };
    let label_idx = column(COL_WASTE_TYPE)?;
    let rec_idx = column(COL_BEST_USE)?;

    let mut catalog = WasteCatalog::default();
    let mut skipped = 0usize;

    for (row, record) in reader.records().enumerate() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                warn!("Skipping malformed row {} in {}: {}", row + 2, path.display(), e);
                skipped += 1;
                continue;
            }
        };

        let label = record.get(label_idx).unwrap_or_default();
        let recommendation = record.get(rec_idx).unwrap_or_default();

        let attributes: IndexMap<String, String> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != label_idx && *i != rec_idx)
            .map(|(i, h)| (h.to_string(), record.get(i).unwrap_or_default().to_string()))
            .collect();

        let entry = WasteEntry {
            label: label.to_string(),
            recommendation: recommendation.to_string(),
            attributes,
        };
        if !catalog.push(entry) {
            skipped += 1;
        }
    }

    if catalog.is_empty() {
        return Err(AdvisorError::EmptyDataset(path.display().to_string()));
    }

    info!(
        "Loaded {} waste types from {} ({} rows skipped)",
        catalog.len(),
        path.display(),
        skipped
    );
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_entries_skips_invalid_and_duplicates() {
        let catalog = WasteCatalog::from_entries(vec![
            WasteEntry::new("Cow Manure", "compost with straw"),
            WasteEntry::new("  ", "nothing"),
            WasteEntry::new("banana peels", ""),
            WasteEntry::new("cow   manure", "duplicate"),
            WasteEntry::new("rice straw", "mulch"),
        ]);

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.entries()[0].recommendation, "compost with straw");
        assert_eq!(catalog.entries()[1].label, "rice straw");
    }

    #[test]
    fn test_get_is_case_and_whitespace_insensitive() {
        let catalog = WasteCatalog::from_entries(vec![
            WasteEntry::new("Cow Manure", "compost with straw"),
            WasteEntry::new("rice straw", "mulch"),
        ]);
        assert_eq!(catalog.get(" RICE   straw").map(|e| e.recommendation.as_str()), Some("mulch"));
        assert!(catalog.contains("cow manure"));
        assert!(!catalog.contains("cow"));
    }
}
