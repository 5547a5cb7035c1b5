// ==========================================
// 灌装线排产系统 - 主数据领域模型
// ==========================================
// 职责: 产品 / 灌装线 / 搅拌器
// 红线: 主数据视为已校验输入，引擎只读取不维护
// ==========================================

use crate::domain::types::PackSize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// Product - 产品
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub product_id: String,              // 产品ID
    pub name: String,                    // 产品名称
    pub article_no: String,              // 物料号
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viscosity: Option<String>,       // 黏度描述（仅展示）
    pub make_time_min_per_l: f64,        // 每升搅拌时间（分钟）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_factor: Option<f64>,        // 灌装速率系数（默认 1）
}

impl Product {
    /// 有效灌装系数（缺省为 1）
    pub fn effective_fill_factor(&self) -> f64 {
        self.fill_factor.unwrap_or(1.0)
    }
}

// ==========================================
// Line - 灌装线
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    pub line_id: String,                    // 灌装线ID
    pub name: String,                       // 名称
    #[serde(default)]
    pub fill_rates: BTreeMap<PackSize, f64>, // 包装规格 → 灌装速率（升/分钟）
}

impl Line {
    /// 查询某包装规格的灌装速率（未配置返回 None）
    pub fn fill_rate(&self, pack_size: PackSize) -> Option<f64> {
        self.fill_rates.get(&pack_size).copied()
    }
}

// ==========================================
// Stirrer - 搅拌器 (Rührwerk)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stirrer {
    pub rw_id: String, // 搅拌器ID
    pub name: String,  // 名称
}

// ==========================================
// MasterData - 主数据集合
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterData {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub lines: Vec<Line>,
    #[serde(default)]
    pub stirrers: Vec<Stirrer>,
}

impl MasterData {
    pub fn find_product(&self, product_id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.product_id == product_id)
    }

    pub fn find_line(&self, line_id: &str) -> Option<&Line> {
        self.lines.iter().find(|l| l.line_id == line_id)
    }

    pub fn find_stirrer(&self, rw_id: &str) -> Option<&Stirrer> {
        self.stirrers.iter().find(|s| s.rw_id == rw_id)
    }

    /// 新建工作区的初始主数据
    ///
    /// 一个基础产品、四条灌装线（L1-L4）、两台搅拌器（RW1/RW2）
    pub fn seed() -> Self {
        fn line(line_id: &str, rates: [f64; 4]) -> Line {
            Line {
                line_id: line_id.to_string(),
                name: format!("Linie {}", line_id),
                fill_rates: PackSize::ALL.into_iter().zip(rates).collect(),
            }
        }

        Self {
            products: vec![Product {
                product_id: "P-100".to_string(),
                name: "Basisreiniger Blau".to_string(),
                article_no: "BR-100".to_string(),
                viscosity: None,
                make_time_min_per_l: 0.8,
                fill_factor: Some(1.0),
            }],
            lines: vec![
                line("L1", [4.0, 6.0, 10.0, 20.0]),
                line("L2", [3.5, 5.5, 9.5, 18.0]),
                line("L3", [3.0, 5.0, 8.0, 16.0]),
                line("L4", [4.5, 6.5, 11.0, 21.0]),
            ],
            stirrers: vec![
                Stirrer {
                    rw_id: "RW1".to_string(),
                    name: "Rührwerk 1".to_string(),
                },
                Stirrer {
                    rw_id: "RW2".to_string(),
                    name: "Rührwerk 2".to_string(),
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_lookup() {
        let md = MasterData::seed();
        assert_eq!(md.lines.len(), 4);
        assert_eq!(md.find_line("L1").unwrap().fill_rate(PackSize::Ml1000), Some(10.0));
        assert_eq!(md.find_line("L4").unwrap().fill_rate(PackSize::Ml5000), Some(21.0));
        assert!(md.find_product("P-100").is_some());
        assert!(md.find_stirrer("RW3").is_none());
    }

    #[test]
    fn test_fill_rates_use_ml_keys_in_json() {
        let json = serde_json::to_value(MasterData::seed().lines[0].clone()).unwrap();
        assert_eq!(json["fillRates"]["1000"], serde_json::json!(10.0));

        let parsed: Line = serde_json::from_str(
            r#"{"lineId":"LX","name":"X","fillRates":{"500":5.5}}"#,
        )
        .unwrap();
        assert_eq!(parsed.fill_rate(PackSize::Ml500), Some(5.5));
        assert_eq!(parsed.fill_rate(PackSize::Ml250), None);
    }

    #[test]
    fn test_fill_factor_defaults_to_one() {
        let p: Product = serde_json::from_str(
            r#"{"productId":"P","name":"n","articleNo":"a","makeTimeMinPerL":1.5}"#,
        )
        .unwrap();
        assert_eq!(p.effective_fill_factor(), 1.0);
    }
}
