// ==========================================
// 灌装线排产系统 - 主数据 CSV 导入
// ==========================================
// 文件格式（首行为表头，列顺序不限）:
//   products.csv : productId,name,articleNo,viscosity,makeTimeMinPerL,fillFactor
//   lines.csv    : lineId,name,rate250,rate500,rate1000,rate5000（空值 = 未配置）
//   stirrers.csv : rwId,name
// 输出: MasterData（整体替换用）
// ==========================================

use crate::domain::master_data::{Line, MasterData, Product, Stirrer};
use crate::domain::types::PackSize;
use crate::importer::error::{ImportError, ImportResult};
use csv::ReaderBuilder;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const PRODUCTS: &str = "products";
const LINES: &str = "lines";
const STIRRERS: &str = "stirrers";

/// 行定位（表名 + 文件行号）
#[derive(Debug, Clone, Copy)]
struct RowRef {
    table: &'static str,
    row: usize,
}

struct CsvRow {
    at: RowRef,
    cells: HashMap<String, String>,
}

impl CsvRow {
    fn text(&self, field: &str) -> Option<String> {
        self.cells.get(field).filter(|v| !v.is_empty()).cloned()
    }

    fn required(&self, field: &str) -> ImportResult<String> {
        self.text(field).ok_or_else(|| self.missing(field))
    }

    fn missing(&self, field: &str) -> ImportError {
        ImportError::MissingValue {
            table: self.at.table,
            row: self.at.row,
            field: field.to_string(),
        }
    }

    /// 数字列；接受小数逗号（0,8）
    fn number(&self, field: &str) -> ImportResult<Option<f64>> {
        let Some(raw) = self.text(field) else {
            return Ok(None);
        };
        match raw.replace(',', ".").parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Some(v)),
            _ => Err(ImportError::InvalidNumber {
                table: self.at.table,
                row: self.at.row,
                field: field.to_string(),
                raw,
            }),
        }
    }

    fn out_of_range(&self, field: &str, value: f64, constraint: &'static str) -> ImportError {
        ImportError::OutOfRange {
            table: self.at.table,
            row: self.at.row,
            field: field.to_string(),
            value,
            constraint,
        }
    }
}

/// 读取整张表；完全空白的行跳过
fn read_table<R: Read>(table: &'static str, source: R, required: &[&str]) -> ImportResult<Vec<CsvRow>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(source);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
        .collect();

    if let Some(missing) = required.iter().find(|col| !headers.iter().any(|h| h.as_str() == **col)) {
        return Err(ImportError::MissingColumn {
            table,
            column: missing.to_string(),
        });
    }

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        let cells: HashMap<String, String> = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.clone(), v.trim().to_string()))
            .collect();
        if cells.values().all(|v| v.is_empty()) {
            continue;
        }
        rows.push(CsvRow {
            at: RowRef { table, row: idx + 2 },
            cells,
        });
    }
    Ok(rows)
}

fn open_csv(path: &Path) -> ImportResult<File> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    if let Some(ext) = path.extension().filter(|ext| !ext.eq_ignore_ascii_case("csv")) {
        return Err(ImportError::UnsupportedFormat(ext.to_string_lossy().to_string()));
    }
    Ok(File::open(path)?)
}

/// 主键去重
struct KeySet {
    field: &'static str,
    seen: HashSet<String>,
}

impl KeySet {
    fn new(field: &'static str) -> Self {
        Self {
            field,
            seen: HashSet::new(),
        }
    }

    fn take(&mut self, row: &CsvRow) -> ImportResult<String> {
        let key = row.required(self.field)?;
        if !self.seen.insert(key.clone()) {
            return Err(ImportError::DuplicateKey {
                table: row.at.table,
                row: row.at.row,
                field: self.field.to_string(),
                value: key,
            });
        }
        Ok(key)
    }
}

// ==========================================
// MasterDataCsvLoader - 主数据 CSV 加载器
// ==========================================
pub struct MasterDataCsvLoader;

impl MasterDataCsvLoader {
    /// 读取三个 CSV 文件组成完整主数据
    pub fn load(
        &self,
        products_path: &Path,
        lines_path: &Path,
        stirrers_path: &Path,
    ) -> ImportResult<MasterData> {
        let master_data = MasterData {
            products: self.load_products_from_reader(open_csv(products_path)?)?,
            lines: self.load_lines_from_reader(open_csv(lines_path)?)?,
            stirrers: self.load_stirrers_from_reader(open_csv(stirrers_path)?)?,
        };
        tracing::info!(
            products = master_data.products.len(),
            lines = master_data.lines.len(),
            stirrers = master_data.stirrers.len(),
            "主数据 CSV 读取完成"
        );
        Ok(master_data)
    }

    pub fn load_products_from_reader<R: Read>(&self, source: R) -> ImportResult<Vec<Product>> {
        let rows = read_table(PRODUCTS, source, &["productId", "name", "makeTimeMinPerL"])?;
        let mut keys = KeySet::new("productId");
        let mut products = Vec::with_capacity(rows.len());

        for row in rows {
            let product_id = keys.take(&row)?;

            let make_time = match row.number("makeTimeMinPerL")? {
                Some(v) if v < 0.0 => return Err(row.out_of_range("makeTimeMinPerL", v, "不能为负")),
                Some(v) => v,
                None => return Err(row.missing("makeTimeMinPerL")),
            };

            let fill_factor = row.number("fillFactor")?;
            if let Some(factor) = fill_factor.filter(|f| *f <= 0.0) {
                return Err(row.out_of_range("fillFactor", factor, "必须大于 0"));
            }

            products.push(Product {
                name: row.text("name").unwrap_or_else(|| product_id.clone()),
                article_no: row.text("articleNo").unwrap_or_default(),
                viscosity: row.text("viscosity"),
                make_time_min_per_l: make_time,
                fill_factor,
                product_id,
            });
        }
        Ok(products)
    }

    pub fn load_lines_from_reader<R: Read>(&self, source: R) -> ImportResult<Vec<Line>> {
        let rows = read_table(LINES, source, &["lineId", "name"])?;
        let mut keys = KeySet::new("lineId");
        let mut lines = Vec::with_capacity(rows.len());

        for row in rows {
            let line_id = keys.take(&row)?;

            let mut fill_rates = BTreeMap::new();
            for pack_size in PackSize::ALL {
                let field = format!("rate{}", pack_size.ml());
                match row.number(&field)? {
                    Some(rate) if rate <= 0.0 => {
                        return Err(row.out_of_range(&field, rate, "必须大于 0"));
                    }
                    Some(rate) => {
                        fill_rates.insert(pack_size, rate);
                    }
                    None => {}
                }
            }

            lines.push(Line {
                name: row.text("name").unwrap_or_else(|| line_id.clone()),
                line_id,
                fill_rates,
            });
        }
        Ok(lines)
    }

    pub fn load_stirrers_from_reader<R: Read>(&self, source: R) -> ImportResult<Vec<Stirrer>> {
        let rows = read_table(STIRRERS, source, &["rwId"])?;
        let mut keys = KeySet::new("rwId");
        let mut stirrers = Vec::with_capacity(rows.len());

        for row in rows {
            let rw_id = keys.take(&row)?;
            stirrers.push(Stirrer {
                name: row.text("name").unwrap_or_else(|| rw_id.clone()),
                rw_id,
            });
        }
        Ok(stirrers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_with_partial_rates() {
        let csv = "lineId,name,rate250,rate500,rate1000,rate5000\nL9,Linie 9,,5.5,10,\n";
        let lines = MasterDataCsvLoader
            .load_lines_from_reader(csv.as_bytes())
            .unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].fill_rate(PackSize::Ml500), Some(5.5));
        assert_eq!(lines[0].fill_rate(PackSize::Ml250), None);
    }

    #[test]
    fn test_missing_column() {
        let err = MasterDataCsvLoader
            .load_stirrers_from_reader("name\nRührwerk\n".as_bytes())
            .unwrap_err();
        assert!(matches!(
            err,
            ImportError::MissingColumn { table: "stirrers", ref column } if column == "rwId"
        ));
    }

    #[test]
    fn test_decimal_comma_accepted() {
        let csv = "productId,name,makeTimeMinPerL,fillFactor\nP-1,Test,\"0,8\",1\n";
        let products = MasterDataCsvLoader
            .load_products_from_reader(csv.as_bytes())
            .unwrap();
        assert_eq!(products[0].make_time_min_per_l, 0.8);
    }

    #[test]
    fn test_error_message_names_table_and_row() {
        let err = MasterDataCsvLoader
            .load_lines_from_reader("lineId,name,rate1000\nL1,Linie,schnell\n".as_bytes())
            .unwrap_err();
        assert_eq!(err.to_string(), "[lines] 第 2 行: rate1000 无法解析为数字: schnell");
    }
}
