// ==========================================
// 学校课表排课系统 - 生成器响应解析
// ==========================================
// 生成器返回自由文本, 可能夹带说明文字、代码围栏或不规范 JSON
// 清洗步骤（顺序固定）:
// 1. 去除代码围栏标记
// 2. 截取第一个 '[' 到最后一个 ']'（找不到时保留全文）
// 3. 去除控制字符（保留换行/制表符, 留给第5步）
// 4. 删除 '}' / ']' 前的多余逗号
// 5. 换行/制表符替换为空格
// ==========================================
// 错误: 非数组 -> StructuralMismatch（不可重试）
//       其它解析失败 -> Parse（可重试）
// ==========================================

use crate::domain::routine::ClassRoutine;
use crate::engine::error::{TimetableError, TimetableResult};
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseParser;

impl ResponseParser {
    pub fn new() -> Self {
        Self
    }

    /// 解析生成器响应为班级课表列表
    pub fn parse(&self, raw: &str) -> TimetableResult<Vec<ClassRoutine>> {
        let cleaned = sanitize(raw);
        if cleaned.trim().is_empty() {
            return Err(TimetableError::Parse("响应为空".to_string()));
        }

        let value: Value = serde_json::from_str(&cleaned)
            .map_err(|e| TimetableError::Parse(format!("JSON 语法错误: {}", e)))?;

        if !value.is_array() {
            return Err(TimetableError::StructuralMismatch {
                found: json_kind(&value).to_string(),
            });
        }

        let mut routines: Vec<ClassRoutine> = serde_json::from_value(value)
            .map_err(|e| TimetableError::Parse(format!("班级课表字段不符: {}", e)))?;

        for routine in &mut routines {
            routine.class_name = routine.class_name.trim().to_string();
        }

        debug!(classes = routines.len(), "生成器响应解析完成");
        Ok(routines)
    }
}

/// 响应文本清洗
pub fn sanitize(raw: &str) -> String {
    let unfenced = strip_code_fences(raw);
    let sliced = slice_array(&unfenced);
    let visible: String = sliced
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
        .collect();
    let without_commas = remove_trailing_commas(&visible);
    without_commas
        .chars()
        .map(|c| if matches!(c, '\n' | '\r' | '\t') { ' ' } else { c })
        .collect()
}

fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "")
        .replace("```JSON", "")
        .replace("```", "")
}

fn slice_array(text: &str) -> &str {
    match (text.find('['), text.rfind(']')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    }
}

/// 删除紧跟 '}' 或 ']' 的逗号（忽略字符串字面量内部）
fn remove_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' => {
                let next = chars[i + 1..].iter().find(|n| !n.is_whitespace());
                if !matches!(next, Some('}') | Some(']')) {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }

    out
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
