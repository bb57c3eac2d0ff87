use thiserror::Error;

/// 解码/编码过程中的错误类型
#[derive(Debug, Error)]
pub enum Error {
    #[error("数据不足: 偏移 {offset:#x} 处需要 {need} 字节, 仅剩 {have}")]
    UnexpectedEof {
        offset: usize,
        need: usize,
        have: usize,
    },

    #[error("无效 magic: 期望 {expected:?}, 实际 {found:?}")]
    InvalidMagic { expected: String, found: String },

    #[error("section {magic:?} 长度不一致: 声明 {declared}, 实际已读 {actual}")]
    SectionLengthMismatch {
        magic: String,
        declared: u32,
        actual: u32,
    },

    #[error("命令缓冲区截断: 第 {index} 个字处缺少参数")]
    TruncatedCommand { index: usize },

    #[error("字符串不是有效 UTF-8 (偏移 {offset:#x})")]
    InvalidString { offset: usize },

    #[error("结构不合法: {context}")]
    Malformed { context: &'static str },

    #[error("无法识别的文件格式")]
    UnrecognizedFormat,
}

pub type Result<T> = std::result::Result<T, Error>;
