use serde::{Deserialize, Serialize};

use crate::error::{InvalidError, ScoringError};

pub type QuestionId = u64;

/// 题型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    /// 看图写句（题 1-5）
    SentencePicture,
    /// 回复邮件（题 6-7）
    EmailResponse,
    /// 观点作文（题 8）
    OpinionEssay,
}

impl QuestionType {
    /// 获取标准名称
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::SentencePicture => "sentence_picture",
            QuestionType::EmailResponse => "email_response",
            QuestionType::OpinionEssay => "opinion_essay",
        }
    }
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 题目
///
/// 从编排层的角度看是只读的，评分任务之间共享同一份快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    #[serde(default)]
    pub test_id: u64,
    pub title: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    /// 在试卷中的位置（从1开始，试卷内唯一）
    pub order_in_test: u32,
    /// 满分；<= 0 表示未配置，按题号回退
    #[serde(default)]
    pub max_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_word1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_word2: Option<String>,
}

impl Question {
    /// 实际使用的满分
    ///
    /// 数据中的满分不可用时，按标准 8 题结构回退：
    /// 第 1-5 题 3 分，第 6-7 题 4 分，第 8 题 5 分
    pub fn effective_max_score(&self) -> Result<f64, ScoringError> {
        if self.max_score > 0.0 {
            return Ok(self.max_score);
        }
        match self.order_in_test {
            1..=5 => Ok(3.0),
            6 | 7 => Ok(4.0),
            8 => Ok(5.0),
            order => Err(ScoringError::UnknownMaxScore {
                question_id: self.id,
                order_in_test: order,
            }),
        }
    }

    /// 把分数限制在 [0, 满分] 之间，非有限数视为无法使用的评分结果
    pub fn clamp_score(&self, score: f64) -> Result<f64, ScoringError> {
        let max = self.effective_max_score()?;
        if !score.is_finite() {
            return Err(ScoringError::Unparseable {
                reason: format!("分数不是有限数 (题目 {})", self.id),
                response: score.to_string(),
            });
        }
        Ok(score.clamp(0.0, max))
    }

    /// 校验题型相关字段
    pub fn validate(&self) -> Result<(), InvalidError> {
        let fail = |reason: &str| InvalidError::MalformedQuestion {
            question_id: self.id,
            reason: reason.to_string(),
        };

        if self.order_in_test == 0 {
            return Err(fail("order_in_test 必须从 1 开始"));
        }

        match self.question_type {
            QuestionType::SentencePicture => {
                if is_blank(self.image_url.as_deref()) {
                    return Err(fail("看图写句题缺少 image_url"));
                }
                if is_blank(self.given_word1.as_deref()) || is_blank(self.given_word2.as_deref()) {
                    return Err(fail("看图写句题必须提供两个关键词"));
                }
            }
            QuestionType::EmailResponse | QuestionType::OpinionEssay => {
                if self.prompt.trim().is_empty() {
                    return Err(fail("题目缺少 prompt"));
                }
            }
        }

        Ok(())
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map(|v| v.trim().is_empty()).unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn picture(order: u32) -> Question {
        Question {
            id: order as u64,
            test_id: 1,
            title: format!("Q{}", order),
            prompt: "Write one sentence.".to_string(),
            question_type: QuestionType::SentencePicture,
            order_in_test: order,
            max_score: 0.0,
            image_url: Some("https://img.example.com/park.png".to_string()),
            given_word1: Some("bench".to_string()),
            given_word2: Some("while".to_string()),
        }
    }

    #[test]
    fn test_effective_max_score_falls_back_by_order() {
        assert_eq!(picture(1).effective_max_score().unwrap(), 3.0);
        assert_eq!(picture(5).effective_max_score().unwrap(), 3.0);
        assert_eq!(picture(6).effective_max_score().unwrap(), 4.0);
        assert_eq!(picture(8).effective_max_score().unwrap(), 5.0);
        assert!(picture(9).effective_max_score().is_err());

        let mut q = picture(9);
        q.max_score = 2.5;
        assert_eq!(q.effective_max_score().unwrap(), 2.5);
    }

    #[test]
    fn test_clamp_score() {
        let q = picture(2);
        assert_eq!(q.clamp_score(4.2).unwrap(), 3.0);
        assert_eq!(q.clamp_score(-1.0).unwrap(), 0.0);
        assert_eq!(q.clamp_score(2.5).unwrap(), 2.5);
        assert!(matches!(
            q.clamp_score(f64::NAN),
            Err(ScoringError::Unparseable { .. })
        ));
        assert!(q.clamp_score(f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_picture_requires_anchors() {
        assert!(picture(1).validate().is_ok());

        let mut q = picture(1);
        q.given_word2 = Some("  ".to_string());
        assert!(q.validate().is_err());

        let mut q = picture(1);
        q.image_url = None;
        assert!(q.validate().is_err());
    }

    #[test]
    fn test_question_type_serde_names() {
        let json = serde_json::to_string(&QuestionType::OpinionEssay).unwrap();
        assert_eq!(json, "\"opinion_essay\"");
        let parsed: QuestionType = serde_json::from_str("\"email_response\"").unwrap();
        assert_eq!(parsed, QuestionType::EmailResponse);
    }
}
