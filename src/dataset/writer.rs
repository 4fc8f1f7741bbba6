use crate::error::{AdvisorError, Result};
use crate::models::waste::{COL_BEST_USE, COL_WASTE_TYPE};
use crate::models::WasteEntry;
use crate::service::matcher::normalize;
use csv::{ReaderBuilder, StringRecord, Writer};
use std::fs::File;
use std::path::Path;

/// 追加一条记录到数据集 CSV (不影响已加载的内存数据集)
///
/// 文件中已有同名 (规范化后) 行时返回 `DuplicateWasteType`。
/// 条目包含文件中没有的列时扩展表头, 旧行补空。
/// 无法解析的旧行与加载时一样跳过。
/// 先写临时文件再 rename。
pub fn append_entry(path: &Path, entry: &WasteEntry) -> Result<()> {
    let (mut headers, rows) = if path.exists() {
        read_raw(path)?
    } else {
        (vec![COL_WASTE_TYPE.to_string(), COL_BEST_USE.to_string()], Vec::new())
    };

    if let Some(label_idx) = headers.iter().position(|h| h == COL_WASTE_TYPE) {
        let key = normalize(&entry.label);
        let exists = rows
            .iter()
            .any(|row| normalize(row.get(label_idx).unwrap_or_default()) == key);
        if exists {
            return Err(AdvisorError::DuplicateWasteType(entry.label.clone()));
        }
    }

    for required in [COL_WASTE_TYPE, COL_BEST_USE] {
        if !headers.iter().any(|h| h == required) {
            headers.push(required.to_string());
        }
    }
    for key in entry.attributes.keys() {
        if !headers.iter().any(|h| h == key) {
            headers.push(key.clone());
        }
    }

    let new_row: Vec<String> = headers
        .iter()
        .map(|h| match h.as_str() {
            COL_WASTE_TYPE => entry.label.clone(),
            COL_BEST_USE => entry.recommendation.clone(),
            other => entry.attributes.get(other).cloned().unwrap_or_default(),
        })
        .collect();

    let tmp_path = path.with_extension("csv.tmp");
    {
        let file = File::create(&tmp_path)?;
        let mut writer = Writer::from_writer(file);
        writer.write_record(&headers)?;
        for row in &rows {
            let padded: Vec<&str> = (0..headers.len())
                .map(|i| row.get(i).unwrap_or_default())
                .collect();
            writer.write_record(&padded)?;
        }
        writer.write_record(&new_row)?;
        writer.flush()?;
    }
    std::fs::rename(&tmp_path, path)?;

    tracing::info!("Appended waste type '{}' to {}", entry.label, path.display());
    Ok(())
}

fn read_raw(path: &Path) -> Result<(Vec<String>, Vec<StringRecord>)> {
    let mut reader = ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();

    let mut rows = Vec::new();
    for (row, record) in reader.records().enumerate() {
        match record {
            Ok(r) => rows.push(r),
            Err(e) => {
                tracing::warn!("Dropping malformed row {} in {}: {}", row + 2, path.display(), e)
            }
        }
    }
    Ok((headers, rows))
}
