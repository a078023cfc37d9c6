//! 协议错误类型定义

/// 协议通信错误
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// 连接错误（拒绝、重置、DNS、对端关闭）
    #[error("connection error: {0}")]
    Connection(String),

    /// IO 错误
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// 超时错误（仅单次称重请求）
    #[error("Operation timed out")]
    Timeout,

    /// 通道关闭
    #[error("channel closed")]
    ChannelClosed,
}

impl ProtocolError {
    /// 是否为超时错误
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}

// io::Error 不可 Clone，按 kind + 消息重建，以便同一错误事件分发给多个订阅者。
impl Clone for ProtocolError {
    fn clone(&self) -> Self {
        match self {
            Self::Connection(message) => Self::Connection(message.clone()),
            Self::Io(err) => Self::Io(std::io::Error::new(err.kind(), err.to_string())),
            Self::Timeout => Self::Timeout,
            Self::ChannelClosed => Self::ChannelClosed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_keeps_io_kind_and_message() {
        let err = ProtocolError::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "reset by peer",
        ));
        let cloned = err.clone();
        match cloned {
            ProtocolError::Io(inner) => {
                assert_eq!(inner.kind(), std::io::ErrorKind::ConnectionReset);
                assert_eq!(inner.to_string(), "reset by peer");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn timeout_message() {
        assert_eq!(ProtocolError::Timeout.to_string(), "Operation timed out");
        assert!(ProtocolError::Timeout.is_timeout());
    }
}
