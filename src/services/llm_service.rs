//! LLM 评分服务 - 业务能力层
//!
//! 只负责"LLM 评分"能力，不关心流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Azure, Gemini, Doubao 等）

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
        ChatCompletionRequestMessageContentPartText, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
        ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequestArgs, ImageDetail,
        ImageUrl,
    },
    Client,
};
use futures::future::{BoxFuture, FutureExt};
use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::ScoringError;
use crate::models::{Question, QuestionType};
use crate::services::answer_scorer::{AnswerScorer, ScoreOutcome};

const SYSTEM_MESSAGE: &str = "You are an expert TOEIC Writing Test instructor with deep knowledge \
of the TOEIC Writing Test format and scoring criteria. You grade strictly and give constructive, \
concrete feedback.";

/// LLM 评分服务
///
/// 职责：
/// - 为单道题构建评分提示词并调用 LLM
/// - 解析 "Score:" / "Feedback:" 格式的回复
/// - 只处理单个作答
/// - 不出现 Attempt / answer 顺序
/// - 不关心存储
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
    max_retries: usize,
    retry_delay: Duration,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.llm_model_name.clone(),
            max_retries: config.llm_max_retries.max(1),
            retry_delay: Duration::from_millis(config.llm_retry_delay_ms),
        }
    }

    /// 通用的 LLM 调用函数
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    /// - `imgs`: 图片 URL 列表（可选），会追加到用户消息中
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（字符串）；调用失败会按配置重试
    pub async fn send_to_llm(
        &self,
        user_message: &str,
        system_message: Option<&str>,
        imgs: Option<&[String]>,
    ) -> Result<String, ScoringError> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        let messages = build_messages(user_message, system_message, imgs)?;

        // 构建请求
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(0.3)
            .max_tokens(2048u32)
            .build()
            .map_err(|e| ScoringError::RequestBuild(e.to_string()))?;

        let mut last_error = String::new();
        for attempt in 1..=self.max_retries {
            match self.client.chat().create(request.clone()).await {
                Ok(response) => {
                    debug!("LLM API 调用成功 (第 {} 次尝试)", attempt);

                    // 提取响应内容
                    let content = response
                        .choices
                        .first()
                        .and_then(|choice| choice.message.content.clone())
                        .filter(|c| !c.trim().is_empty())
                        .ok_or_else(|| ScoringError::EmptyContent {
                            model: self.model_name.clone(),
                        })?;

                    return Ok(content.trim().to_string());
                }
                Err(e) => {
                    warn!(
                        "LLM API 调用失败 (尝试 {}/{}): {}",
                        attempt, self.max_retries, e
                    );
                    last_error = e.to_string();
                    if attempt < self.max_retries {
                        sleep(self.retry_delay).await;
                    }
                }
            }
        }

        Err(ScoringError::api_failed(
            &self.model_name,
            self.max_retries,
            last_error,
        ))
    }

    /// 为一道题的作答评分
    ///
    /// 看图写句题会把图片 URL 作为 Vision 内容一并发送
    pub async fn score_answer(
        &self,
        question: &Question,
        user_answer: &str,
    ) -> Result<ScoreOutcome, ScoringError> {
        let max_score = question.effective_max_score()?;

        debug!(
            "开始 LLM 评分，题目: {} ({}), 满分: {}",
            question.id, question.question_type, max_score
        );

        let user_message = build_scoring_prompt(question, user_answer, max_score);
        let imgs: Option<Vec<String>> = match question.question_type {
            QuestionType::SentencePicture => question.image_url.clone().map(|url| vec![url]),
            _ => None,
        };

        let response = self
            .send_to_llm(&user_message, Some(SYSTEM_MESSAGE), imgs.as_deref())
            .await?;

        let (score, feedback) = parse_score_response(&response)?;
        let clamped = question.clamp_score(score)?;
        if clamped != score {
            warn!(
                "LLM 返回的分数 {} 超出范围 [0, {}]，已限制为 {}",
                score, max_score, clamped
            );
        }

        Ok(ScoreOutcome {
            feedback,
            score: clamped,
        })
    }
}

impl AnswerScorer for LlmService {
    fn score<'a>(
        &'a self,
        question: &'a Question,
        user_answer: &'a str,
    ) -> BoxFuture<'a, Result<ScoreOutcome, ScoringError>> {
        self.score_answer(question, user_answer).boxed()
    }
}

/// 构建消息列表（支持图片）
fn build_messages(
    user_message: &str,
    system_message: Option<&str>,
    imgs: Option<&[String]>,
) -> Result<Vec<ChatCompletionRequestMessage>, ScoringError> {
    let build_err = |e: async_openai::error::OpenAIError| ScoringError::RequestBuild(e.to_string());
    let mut messages = Vec::new();

    // 添加系统消息（如果提供）
    if let Some(sys_msg) = system_message {
        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(sys_msg)
            .build()
            .map_err(build_err)?;
        messages.push(ChatCompletionRequestMessage::System(system_msg));
    }

    let user_msg = match imgs {
        Some(img_urls) if !img_urls.is_empty() => {
            // 使用 Vision API：构建包含文本和图片的内容
            let mut content_parts = vec![ChatCompletionRequestUserMessageContentPart::Text(
                ChatCompletionRequestMessageContentPartText {
                    text: user_message.to_string(),
                },
            )];

            for url in img_urls {
                content_parts.push(ChatCompletionRequestUserMessageContentPart::ImageUrl(
                    ChatCompletionRequestMessageContentPartImage {
                        image_url: ImageUrl {
                            url: url.clone(),
                            detail: Some(ImageDetail::Auto),
                        },
                    },
                ));
            }

            debug!("使用 Vision API，包含 {} 张图片", img_urls.len());

            ChatCompletionRequestUserMessageArgs::default()
                .content(ChatCompletionRequestUserMessageContent::Array(content_parts))
                .build()
                .map_err(build_err)?
        }
        _ => ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(build_err)?,
    };

    messages.push(ChatCompletionRequestMessage::User(user_msg));
    Ok(messages)
}

/// 构建评分提示词
fn build_scoring_prompt(question: &Question, user_answer: &str, max_score: f64) -> String {
    let mut prompt = String::from("Please evaluate the following user's TOEIC writing response.\n\n");

    match question.question_type {
        QuestionType::SentencePicture => {
            let word1 = question.given_word1.as_deref().unwrap_or("N/A");
            let word2 = question.given_word2.as_deref().unwrap_or("N/A");
            if question.image_url.is_some() {
                prompt.push_str("The user was shown the attached picture and ");
            } else {
                prompt.push_str("The user was shown a picture (not available to you) and ");
            }
            prompt.push_str(&format!(
                "given two words/phrases: \"{}\" and \"{}\".\n\
                 They were asked to write ONE grammatically correct sentence that describes the picture using both words/phrases.\n\n\
                 Task prompt:\n{}\n\n\
                 Criteria: grammar, appropriate use of both given words, relevance to the picture, exactly one sentence.\n\n",
                word1, word2, question.prompt
            ));
        }
        QuestionType::EmailResponse => {
            prompt.push_str(&format!(
                "The user was asked to respond to the following email.\n---\n{}\n---\n\n\
                 Criteria: grammar, vocabulary, organization, task completion (every request in the email answered), appropriate tone.\n\n",
                question.prompt
            ));
        }
        QuestionType::OpinionEssay => {
            prompt.push_str(&format!(
                "The user was asked to write an opinion essay on the following prompt.\n---\n{}\n---\n\n\
                 Criteria: clear opinion, supporting reasons and examples, organization, grammar, vocabulary range.\n\
                 After the feedback, also include a revised version of the essay.\n\n",
                question.prompt
            ));
        }
    }

    prompt.push_str(&format!(
        "User's answer:\n---\n{}\n---\n\n\
         Format your response strictly as:\n\
         Score: [a number from 0.0 to {:.1}]\n\
         Feedback:\n[strong points, specific errors with corrections, advice]\n",
        user_answer, max_score
    ));

    prompt
}

fn score_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?im)^[\s*#]*score\s*[*]*\s*:\s*[*]*\s*(-?\d+(?:\.\d+)?)[^\n]*$")
            .expect("score regex is valid")
    })
}

fn feedback_label_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^[\s*#]*feedback\s*[*]*\s*:[*]*\s*").expect("feedback regex is valid")
    })
}

/// 解析评分回复
///
/// 第一处 "Score: <数字>" 给出分数，其后的全部内容作为反馈（去掉开头的 "Feedback:" 标签）
fn parse_score_response(response: &str) -> Result<(f64, String), ScoringError> {
    let captures = score_line_regex()
        .captures(response)
        .ok_or_else(|| ScoringError::Unparseable {
            reason: "缺少 'Score:' 行".to_string(),
            response: response.to_string(),
        })?;

    let score_text = &captures[1];
    let score: f64 = score_text.parse().map_err(|_| ScoringError::Unparseable {
        reason: format!("分数 '{}' 不是数字", score_text),
        response: response.to_string(),
    })?;

    let line_end = captures.get(0).map(|m| m.end()).unwrap_or(response.len());
    let rest = response[line_end..].trim();
    let feedback = feedback_label_regex().replace(rest, "").trim().to_string();

    let feedback = if feedback.is_empty() {
        "（LLM 未给出详细反馈）".to_string()
    } else {
        feedback
    };

    Ok((score, feedback))
}
