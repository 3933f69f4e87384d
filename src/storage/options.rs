use std::time::Duration;

/// 轮询的默认间隔（秒）
pub const DEFAULT_INTERVAL: i64 = 300;

/// 存储器与消费方之间通道的默认容量
pub const DEFAULT_BUFF_SIZE: i64 = 1024;

/// 解析后的轮询参数，所有驱动共用同一套默认值规则
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    pub interval: Duration,
    pub buff_size: usize,
}

impl PollOptions {
    /// interval 小于 1 秒时使用 [`DEFAULT_INTERVAL`]，buff_size 不大于 0 时使用 [`DEFAULT_BUFF_SIZE`]
    pub fn resolve(interval: i64, buff_size: i64) -> Self {
        let interval = if interval < 1 { DEFAULT_INTERVAL } else { interval };
        let buff_size = if buff_size <= 0 { DEFAULT_BUFF_SIZE } else { buff_size };

        Self {
            interval: Duration::from_secs(interval as u64),
            buff_size: buff_size as usize,
        }
    }
}

impl Default for PollOptions {
    fn default() -> Self {
        Self::resolve(0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults() {
        let opts = PollOptions::default();
        assert_eq!(opts.interval, Duration::from_secs(300));
        assert_eq!(opts.buff_size, 1024);

        let opts = PollOptions::resolve(-5, -1);
        assert_eq!(opts, PollOptions::default());
    }

    #[test]
    fn test_resolve_explicit() {
        let opts = PollOptions::resolve(1, 2);
        assert_eq!(opts.interval, Duration::from_secs(1));
        assert_eq!(opts.buff_size, 2);
    }
}
