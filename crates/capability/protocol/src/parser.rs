//! 秤终端响应报文解析
//!
//! 纯函数，无状态、无 I/O。
//!
//! ## 报文格式
//!
//! - 主格式：`ST,GS,+,0004567kg\r\n`，紧跟前缀的 7 位数字为重量（千克）
//! - 兼容格式：主格式缺失时，定位标记 `99`，从标记起始位置 +3 处取 7 个字符解析
//!
//! 都无法解析时返回 `None`（无读数），不会 panic。

const PRIMARY_PREFIX: &str = "ST,GS,+,";
const UNIT_SUFFIX: &str = "kg";
const WEIGHT_DIGITS: usize = 7;
const FALLBACK_MARKER: &str = "99";
const FALLBACK_OFFSET: usize = 3;

/// 从原始字节中解析重量（千克）
///
/// 字节按 ASCII 解释（高位被清除）。`Some(0)` 是合法的零读数，
/// 与 `None`（无读数）区分。
pub fn parse_weight(data: &[u8]) -> Option<u32> {
    let text: String = data.iter().map(|b| char::from(b & 0x7f)).collect();
    parse_primary(&text).or_else(|| parse_fallback(&text))
}

/// 主格式：`ST,GS,+,` + 7 位数字 + `kg`
fn parse_primary(text: &str) -> Option<u32> {
    text.match_indices(PRIMARY_PREFIX).find_map(|(idx, _)| {
        let rest = &text[idx + PRIMARY_PREFIX.len()..];
        let digits = rest.get(..WEIGHT_DIGITS)?;
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if !rest[WEIGHT_DIGITS..].starts_with(UNIT_SUFFIX) {
            return None;
        }
        digits.parse().ok()
    })
}

/// 兼容格式：`99` 标记后偏移取值
fn parse_fallback(text: &str) -> Option<u32> {
    let idx = text.to_ascii_uppercase().find(FALLBACK_MARKER)?;
    let start = (idx + FALLBACK_OFFSET).min(text.len());
    let end = (start + WEIGHT_DIGITS).min(text.len());
    parse_leading_integer(&text[start..end])
}

/// 解析前导整数：忽略前导空白，允许 `+`，读到第一个非数字为止
fn parse_leading_integer(value: &str) -> Option<u32> {
    let value = value.trim_start();
    let value = value.strip_prefix('+').unwrap_or(value);
    let len = value.bytes().take_while(u8::is_ascii_digit).count();
    if len == 0 {
        return None;
    }
    value[..len].parse().ok()
}
