//! 分数换算服务 - 业务能力层
//!
//! 把整卷原始分（0-28）换算为 0-200 的标准分。
//! 换算表就是测试覆盖的对象：每一行是 (原始分上限（含）, 标准分)。

use tracing::debug;

use crate::error::InvalidError;

pub use crate::models::MAX_RAW_SCORE;

/// 标准分上限
pub const MAX_SCALED_SCORE: f64 = 200.0;

const SUM_EPSILON: f64 = 1e-9;

/// 换算表，按原始分上限升序排列
pub const SCALE_TABLE: &[(f64, f64)] = &[
    (0.0, 0.0),
    (2.0, 10.0),
    (4.0, 20.0),
    (6.0, 40.0),
    (8.0, 60.0),
    (10.0, 80.0),
    (12.0, 100.0),
    (14.0, 110.0),
    (16.0, 120.0),
    (18.0, 130.0),
    (19.0, 140.0),
    (21.0, 150.0),
    (23.0, 170.0),
    (25.0, 180.0),
    (27.0, 190.0),
    (MAX_RAW_SCORE, MAX_SCALED_SCORE),
];

/// 分数换算器
#[derive(Debug, Clone, Copy)]
pub struct ScaleConverter {
    table: &'static [(f64, f64)],
}

impl Default for ScaleConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl ScaleConverter {
    /// 使用标准换算表
    pub fn new() -> Self {
        Self { table: SCALE_TABLE }
    }

    /// 原始分 → 标准分
    ///
    /// 取第一个上限 >= 原始分的档位，结果限制在 [0, 200] 并四舍五入到整数
    pub fn convert(&self, raw_score: f64) -> Result<f64, InvalidError> {
        // 浮点累加误差
        let raw_score = if (raw_score - MAX_RAW_SCORE).abs() < SUM_EPSILON {
            MAX_RAW_SCORE
        } else {
            raw_score
        };

        if raw_score.is_nan() || !(0.0..=MAX_RAW_SCORE).contains(&raw_score) {
            return Err(InvalidError::RawScoreOutOfRange {
                raw: raw_score,
                max: MAX_RAW_SCORE,
            });
        }

        let scaled = self
            .table
            .iter()
            .find(|(upper, _)| raw_score <= *upper)
            .map(|(_, scaled)| *scaled)
            .unwrap_or(MAX_SCALED_SCORE);

        let result = scaled.clamp(0.0, MAX_SCALED_SCORE).round();
        debug!("分数换算: 原始分 {} → 标准分 {}", raw_score, result);

        Ok(result)
    }

    /// 可选原始分的换算，越界时记录警告并返回 None
    pub fn convert_optional(&self, raw_score: Option<f64>) -> Option<f64> {
        let raw = raw_score?;
        match self.convert(raw) {
            Ok(scaled) => Some(scaled),
            Err(e) => {
                tracing::warn!("⚠️ 无法换算标准分: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_ordered_and_monotonic() {
        for pair in SCALE_TABLE.windows(2) {
            assert!(pair[0].0 < pair[1].0, "上限必须严格递增: {:?}", pair);
            assert!(pair[0].1 <= pair[1].1, "标准分必须单调不减: {:?}", pair);
        }
        assert_eq!(SCALE_TABLE.first(), Some(&(0.0, 0.0)));
        assert_eq!(SCALE_TABLE.last(), Some(&(MAX_RAW_SCORE, MAX_SCALED_SCORE)));
    }

    #[test]
    fn test_endpoints() {
        let converter = ScaleConverter::new();
        assert_eq!(converter.convert(0.0).unwrap(), 0.0);
        assert_eq!(converter.convert(28.0).unwrap(), 200.0);
        assert_eq!(converter.convert(28.0 + 1e-12).unwrap(), 200.0);
    }

    #[test]
    fn test_breakpoints() {
        let converter = ScaleConverter::new();
        assert_eq!(converter.convert(0.5).unwrap(), 10.0);
        assert_eq!(converter.convert(2.0).unwrap(), 10.0);
        assert_eq!(converter.convert(2.01).unwrap(), 20.0);
        assert_eq!(converter.convert(12.0).unwrap(), 100.0);
        assert_eq!(converter.convert(18.8).unwrap(), 140.0);
        assert_eq!(converter.convert(22.0).unwrap(), 170.0);
        assert_eq!(converter.convert(27.0).unwrap(), 190.0);
        assert_eq!(converter.convert(27.5).unwrap(), 200.0);
    }

    #[test]
    fn test_monotonic_over_fine_grid() {
        let converter = ScaleConverter::new();
        let mut previous = 0.0;
        for step in 0..=280 {
            let raw = step as f64 / 10.0;
            let scaled = converter.convert(raw).unwrap();
            assert!(scaled >= previous, "raw {} → {} < {}", raw, scaled, previous);
            assert!((0.0..=MAX_SCALED_SCORE).contains(&scaled));
            previous = scaled;
        }
    }

    #[test]
    fn test_out_of_range() {
        let converter = ScaleConverter::new();
        assert!(converter.convert(-0.1).is_err());
        assert!(converter.convert(28.01).is_err());
        assert!(converter.convert(f64::NAN).is_err());
        assert_eq!(converter.convert_optional(Some(30.0)), None);
        assert_eq!(converter.convert_optional(None), None);
        assert_eq!(converter.convert_optional(Some(14.0)), Some(110.0));
    }
}
