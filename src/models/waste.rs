use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// 数据集列名
pub const COL_WASTE_TYPE: &str = "Waste Type";
pub const COL_BEST_USE: &str = "Best Use";
pub const COL_COMPOST_TIME: &str = "Compost Time";
pub const COL_NUTRIENT: &str = "Nutrient";
pub const COL_TIPS: &str = "Tips";
pub const COL_YIELD_PCT: &str = "Yield_pct";

/// 废弃物条目 (数据集中的一行)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WasteEntry {
    /// 规范名称 (Waste Type)
    pub label: String,
    /// 推荐用途 (Best Use)
    pub recommendation: String,
    /// 其余列, 保持文件中的列顺序
    #[serde(default)]
    pub attributes: IndexMap<String, String>,
}

impl WasteEntry {
    pub fn new(label: impl Into<String>, recommendation: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            recommendation: recommendation.into(),
            attributes: IndexMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// 数据集中的产出率 (%), 无法解析时返回 None
    pub fn yield_pct(&self) -> Option<f64> {
        self.attribute(COL_YIELD_PCT)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
    }
}

/// 用户提交的新废弃物类型
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewWasteEntry {
    pub waste_type: String,
    #[serde(default)]
    pub best_use: String,
    #[serde(default)]
    pub compost_time: String,
    #[serde(default)]
    pub nutrient: String,
    #[serde(default)]
    pub tips: String,
    #[serde(default)]
    pub yield_pct: Option<String>,
}

impl NewWasteEntry {
    /// 转为数据集条目; 产出率无法解析时直接丢弃
    pub fn into_entry(self) -> WasteEntry {
        let mut entry = WasteEntry::new(self.waste_type.trim(), self.best_use.trim())
            .with_attribute(COL_COMPOST_TIME, self.compost_time.trim())
            .with_attribute(COL_NUTRIENT, self.nutrient.trim())
            .with_attribute(COL_TIPS, self.tips.trim());

        if let Some(pct) = self
            .yield_pct
            .as_deref()
            .map(str::trim)
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite())
        {
            entry.attributes.insert(COL_YIELD_PCT.to_string(), pct.to_string());
        }

        entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yield_pct_parsing() {
        let entry = WasteEntry::new("cow manure", "compost").with_attribute(COL_YIELD_PCT, " 35.5 ");
        assert_eq!(entry.yield_pct(), Some(35.5));

        let entry = WasteEntry::new("cow manure", "compost").with_attribute(COL_YIELD_PCT, "lots");
        assert_eq!(entry.yield_pct(), None);

        let entry = WasteEntry::new("cow manure", "compost");
        assert_eq!(entry.yield_pct(), None);
    }

    #[test]
    fn test_blank_attribute_is_absent() {
        let entry = WasteEntry::new("rice straw", "mulch").with_attribute(COL_TIPS, "   ");
        assert_eq!(entry.attribute(COL_TIPS), None);
    }

    #[test]
    fn test_new_entry_drops_bad_yield() {
        let new = NewWasteEntry {
            waste_type: "  goat manure ".to_string(),
            best_use: "hot compost".to_string(),
            yield_pct: Some("abc".to_string()),
            ..Default::default()
        };
        let entry = new.into_entry();
        assert_eq!(entry.label, "goat manure");
        assert_eq!(entry.recommendation, "hot compost");
        assert!(!entry.attributes.contains_key(COL_YIELD_PCT));

        let new = NewWasteEntry {
            waste_type: "goat manure".to_string(),
            yield_pct: Some("45".to_string()),
            ..Default::default()
        };
        assert_eq!(new.into_entry().yield_pct(), Some(45.0));
    }
}
