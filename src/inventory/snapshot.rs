//! 库存快照解析 - 将原始 JSON 载荷转为类型化快照
//!
//! 解析策略：
//! - 文档整体不合法 → `MalformedPayload`
//! - 顶层计数字段缺失或非数字 → 计数按 0 处理，不报错
//! - 单个车辆字段缺失或类型不符 → 该字段取默认值，车辆条目保留

use crate::error::MalformedPayload;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// VIN 缺失时的占位符
pub const VIN_PLACEHOLDER: &str = "******";

/// 一次轮询得到的库存快照
///
/// 每轮新建，构建后不再修改。`listings` 保持 API 返回顺序，
/// 靠前的条目相关度更高。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventorySnapshot {
    /// 匹配的库存总数
    pub total_count: u32,
    /// 车辆条目（API 顺序）
    pub listings: Vec<VehicleListing>,
}

/// 一台在售车辆的条目
///
/// 所有 `Option` 字段以 `None` 表示"未知"，缺失不是错误。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleListing {
    /// 车型年份
    pub year: Option<u16>,
    /// 原始数字价格（不含货币单位）
    pub price: Option<u64>,
    /// 车漆代码（如 PPSW）
    pub paint_code: Option<String>,
    /// 内饰代码（如 IBW2）
    pub interior_code: Option<String>,
    /// 轮毂代码（如 WT20）
    pub wheel_code: Option<String>,
    /// 辅助驾驶代码（如 APBS）
    pub autopilot_code: Option<String>,
    /// 预计交付窗口（原样字符串）
    pub delivery_window: Option<String>,
    /// VIN 后 6 位，缺失时为占位符
    pub vin_suffix: String,
    /// 是否为展示车
    pub is_demo: bool,
}

/// 解析原始载荷为库存快照
///
/// 只有文档整体无法解析时才失败；参见模块级说明。
pub fn parse_snapshot(raw: &str) -> Result<InventorySnapshot, MalformedPayload> {
    let doc: Value = serde_json::from_str(raw)
        .map_err(|e| MalformedPayload::new(format!("不是合法 JSON: {}", e)))?;

    if !doc.is_object() {
        return Err(MalformedPayload::new("根节点不是对象"));
    }

    let total_count = doc
        .get("total_matches_found")
        .and_then(as_count)
        .unwrap_or(0);

    let listings = doc
        .get("results")
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().map(parse_listing).collect())
        .unwrap_or_default();

    Ok(InventorySnapshot {
        total_count,
        listings,
    })
}

/// 解析单个车辆条目，字段逐个独立提取
fn parse_listing(item: &Value) -> VehicleListing {
    VehicleListing {
        year: item
            .get("Year")
            .and_then(|v| v.as_u64())
            .and_then(|y| u16::try_from(y).ok()),
        price: item.get("Price").and_then(as_count64),
        paint_code: first_option_code(item, "PAINT"),
        interior_code: first_option_code(item, "INTERIOR"),
        wheel_code: first_option_code(item, "WHEELS"),
        autopilot_code: first_option_code(item, "AUTOPILOT"),
        delivery_window: item
            .get("ActualGADateRange")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        vin_suffix: item
            .get("VIN")
            .and_then(|v| v.as_str())
            .map(vin_suffix)
            .unwrap_or_else(|| VIN_PLACEHOLDER.to_string()),
        is_demo: item
            .get("IsDemo")
            .and_then(|v| v.as_bool())
            .unwrap_or(false),
    }
}

/// 选配字段在载荷里是代码数组，取第一个；偶尔也见裸字符串
fn first_option_code(item: &Value, key: &str) -> Option<String> {
    let value = item.get(key)?;
    match value {
        Value::Array(arr) => arr.first().and_then(|v| v.as_str()),
        Value::String(s) => Some(s.as_str()),
        _ => None,
    }
    .filter(|s| !s.is_empty())
    .map(str::to_string)
}

/// 取 VIN 的后 6 位
fn vin_suffix(vin: &str) -> String {
    if vin.is_empty() {
        return VIN_PLACEHOLDER.to_string();
    }
    let start = vin.len().saturating_sub(6);
    vin.get(start..)
        .map(str::to_string)
        .unwrap_or_else(|| VIN_PLACEHOLDER.to_string())
}

/// 数字或整数值浮点都接受，其余类型视为非数字
fn as_count(v: &Value) -> Option<u32> {
    as_count64(v).and_then(|n| u32::try_from(n).ok())
}

fn as_count64(v: &Value) -> Option<u64> {
    v.as_u64()
        .or_else(|| v.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rejects_invalid_json() {
        let result = parse_snapshot("<html>blocked</html>");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_rejects_non_object_root() {
        assert!(parse_snapshot("[1, 2, 3]").is_err());
        assert!(parse_snapshot("42").is_err());
    }

    #[test]
    fn test_missing_count_defaults_to_zero() {
        // 计数字段缺失不报错，按 0 处理
        let snapshot = parse_snapshot(r#"{"results": []}"#).unwrap();
        assert_eq!(snapshot.total_count, 0);
    }

    #[test]
    fn test_non_numeric_count_defaults_to_zero() {
        let snapshot = parse_snapshot(r#"{"total_matches_found": "many"}"#).unwrap();
        assert_eq!(snapshot.total_count, 0);
    }

    #[test]
    fn test_non_array_results_yields_empty_listings() {
        let snapshot =
            parse_snapshot(r#"{"total_matches_found": 3, "results": "oops"}"#).unwrap();
        assert_eq!(snapshot.total_count, 3);
        assert!(snapshot.listings.is_empty());
    }

    #[test]
    fn test_full_listing_parsed() {
        let raw = r#"{
            "total_matches_found": 1,
            "results": [{
                "Year": 2024,
                "Price": 263900,
                "PAINT": ["PPSW"],
                "INTERIOR": ["IBW2"],
                "WHEELS": ["WT20"],
                "AUTOPILOT": ["APBS"],
                "ActualGADateRange": "2024-12-01 - 2024-12-15",
                "VIN": "LRW3E7FA1PC123456",
                "IsDemo": true
            }]
        }"#;
        let snapshot = parse_snapshot(raw).unwrap();
        assert_eq!(snapshot.total_count, 1);

        let listing = &snapshot.listings[0];
        assert_eq!(listing.year, Some(2024));
        assert_eq!(listing.price, Some(263900));
        assert_eq!(listing.paint_code.as_deref(), Some("PPSW"));
        assert_eq!(listing.interior_code.as_deref(), Some("IBW2"));
        assert_eq!(listing.wheel_code.as_deref(), Some("WT20"));
        assert_eq!(listing.autopilot_code.as_deref(), Some("APBS"));
        assert_eq!(
            listing.delivery_window.as_deref(),
            Some("2024-12-01 - 2024-12-15")
        );
        assert_eq!(listing.vin_suffix, "123456");
        assert!(listing.is_demo);
    }

    #[test]
    fn test_partial_listing_degrades_field_by_field() {
        // 缺字段或类型不符的条目不会被丢弃
        let raw = r#"{
            "total_matches_found": 2,
            "results": [
                {"Year": "not a number", "Price": 199900, "PAINT": 7},
                {}
            ]
        }"#;
        let snapshot = parse_snapshot(raw).unwrap();
        assert_eq!(snapshot.listings.len(), 2);

        let first = &snapshot.listings[0];
        assert_eq!(first.year, None);
        assert_eq!(first.price, Some(199900));
        assert_eq!(first.paint_code, None);

        let second = &snapshot.listings[1];
        assert_eq!(second.vin_suffix, VIN_PLACEHOLDER);
        assert!(!second.is_demo);
        assert_eq!(second.delivery_window, None);
    }

    #[test]
    fn test_vin_suffix_is_last_six_chars() {
        let raw = r#"{"total_matches_found": 1, "results": [{"VIN": "LRW3E7FA1PC654321"}]}"#;
        let snapshot = parse_snapshot(raw).unwrap();
        assert_eq!(snapshot.listings[0].vin_suffix, "654321");
    }

    #[test]
    fn test_short_vin_kept_whole() {
        let raw = r#"{"total_matches_found": 1, "results": [{"VIN": "1234"}]}"#;
        let snapshot = parse_snapshot(raw).unwrap();
        assert_eq!(snapshot.listings[0].vin_suffix, "1234");
    }

    #[test]
    fn test_bare_string_option_code_accepted() {
        let raw = r#"{"total_matches_found": 1, "results": [{"PAINT": "PBSB"}]}"#;
        let snapshot = parse_snapshot(raw).unwrap();
        assert_eq!(snapshot.listings[0].paint_code.as_deref(), Some("PBSB"));
    }
}
