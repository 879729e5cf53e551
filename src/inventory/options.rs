//! 选配代码解码 - 厂商代码到展示名称的纯查表
//!
//! 规则：已知代码 → 展示名称；未知代码 → 原样返回代码本身；
//! 代码缺失 → 各类别的默认标签。匹配不区分大小写。

/// 车漆代码 → 展示名称
pub fn decode_paint(code: Option<&str>) -> String {
    decode(code, "未知颜色", |code| match code {
        "PBSB" => Some("纯黑色"),
        "PMNG" => Some("午夜银金属漆"),
        "PMTG" => Some("星空灰金属漆"),
        "PPSB" => Some("深海蓝金属漆"),
        "PPMR" => Some("中国红多层车漆"),
        "PPSR" => Some("冷光银金属漆"),
        "PPBW" | "PPSW" => Some("珍珠白多层车漆"),
        _ => None,
    })
}

/// 内饰代码 → 展示名称
pub fn decode_interior(code: Option<&str>) -> String {
    decode(code, "标准内饰", |code| match code {
        "IWW2" => Some("白色内饰"),
        "IBW2" => Some("黑色内饰"),
        "ICW2" => Some("奶油色内饰"),
        "IBC2" => Some("黑红双色内饰"),
        _ => None,
    })
}

/// 轮毂代码 → 展示名称
pub fn decode_wheels(code: Option<&str>) -> String {
    decode(code, "标准轮毂", |code| match code {
        "WTAB" => Some("19 英寸 Gemini 轮毂"),
        "WTAS" => Some("19 英寸 Apollo 轮毂"),
        "WT20" => Some("20 英寸 Induction 轮毂"),
        "WTAE" => Some("21 英寸 Überturbine 轮毂"),
        _ => None,
    })
}

/// 辅助驾驶代码 → 展示名称
pub fn decode_autopilot(code: Option<&str>) -> String {
    decode(code, "基础版辅助驾驶", |code| match code {
        "APBS" => Some("基础版辅助驾驶"),
        "APPA" => Some("增强版自动辅助驾驶"),
        "APFB" => Some("完全自动驾驶能力"),
        _ => None,
    })
}

fn decode(
    code: Option<&str>,
    fallback: &str,
    lookup: impl Fn(&str) -> Option<&'static str>,
) -> String {
    match code {
        Some(raw) => lookup(raw.to_uppercase().as_str())
            .map(str::to_string)
            .unwrap_or_else(|| raw.to_string()),
        None => fallback.to_string(),
    }
}
