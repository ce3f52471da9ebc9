//! data URI 解析：`data:image/<subtype>;base64,<payload>`
use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, general_purpose};
use once_cell::sync::Lazy;
use regex::Regex;

use super::models::SkipReason;

/// 只接受图片类 data URI
pub const DATA_IMAGE_PREFIX: &str = "data:image/";
/// 头部无法识别时使用的 MIME
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";
/// MIME 无子类型时使用的扩展名
pub const DEFAULT_EXTENSION: &str = "jpg";

static HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^data:(image/[a-zA-Z+]+);base64$").expect("静态正则必然合法"));

/// 标准字母表，填充可有可无，末尾多余的比特直接丢弃
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    general_purpose::PAD
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// 校验通过、尚未解码的图片 data URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri<'a> {
    /// 例如 `image/png`
    pub mime_type: String,
    /// 逗号之后的 base64 文本
    pub payload: &'a str,
}

impl DataUri<'_> {
    /// 由 MIME 子类型推导文件扩展名
    pub fn extension(&self) -> &str {
        self.mime_type
            .split_once('/')
            .map(|(_, sub)| sub)
            .filter(|sub| !sub.is_empty())
            .unwrap_or(DEFAULT_EXTENSION)
    }

    /// 解码负载：忽略空白与换行，URL 安全字母表（`-` `_`）按标准字母表处理。
    /// 只有非 base64 字符或长度不可能成立时才返回错误。
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        let normalized: String = self
            .payload
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .map(|c| match c {
                '-' => '+',
                '_' => '/',
                c => c,
            })
            .collect();
        PAYLOAD_ENGINE.decode(normalized)
    }
}

/// 解析单条输入；不合格的输入返回跳过原因而不是错误，由调用方决定是否继续整批处理。
pub fn parse(input: &str) -> Result<DataUri<'_>, SkipReason> {
    if input.is_empty() {
        return Err(SkipReason::Empty);
    }
    if !input.starts_with(DATA_IMAGE_PREFIX) {
        return Err(SkipReason::NotImageDataUri);
    }

    // 必须恰好包含一个逗号
    let Some((header, payload)) = input.split_once(',') else {
        return Err(SkipReason::Malformed);
    };
    if payload.contains(',') {
        return Err(SkipReason::Malformed);
    }

    let mime_type = HEADER_RE
        .captures(header)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());

    Ok(DataUri { mime_type, payload })
}

/// 把原始字节编码为 data URI（本地工具与测试使用）
pub fn encode(mime_type: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime_type,
        general_purpose::STANDARD.encode(bytes)
    )
}

/// 日志用的输入预览（最多 100 个字符，避免把整张图片打进日志）
pub fn preview(input: &str) -> &str {
    match input.char_indices().nth(100) {
        Some((idx, _)) => &input[..idx],
        None => input,
    }
}
