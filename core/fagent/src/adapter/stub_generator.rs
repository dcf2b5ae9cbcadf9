//! テスト用: 台本どおりの AiResponse を返す ResponseGenerator 実装

#[cfg(test)]
mod stub {
    use async_trait::async_trait;
    use common::llm::{AiResponse, GenerateOptions};
    use common::ports::outbound::ResponseGenerator;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// テスト用: 呼ばれるたびに次の応答を返す Stub。台本が尽きたら失敗応答
    pub struct StubGenerator {
        responses: Mutex<VecDeque<AiResponse>>,
        /// 受け取ったプロンプトと max_tokens
        pub calls: Mutex<Vec<(String, u32)>>,
    }

    impl StubGenerator {
        pub fn new(responses: Vec<AiResponse>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn text(text: &str) -> Self {
            Self::new(vec![AiResponse::ok("stub-model", text, None)])
        }

        pub fn prompts(&self) -> Vec<String> {
            self.calls.lock().unwrap().iter().map(|(p, _)| p.clone()).collect()
        }
    }

    #[async_trait]
    impl ResponseGenerator for StubGenerator {
        fn provider(&self) -> &str {
            "stub"
        }

        fn model(&self) -> &str {
            "stub-model"
        }

        async fn generate(&self, prompt: &str, options: &GenerateOptions) -> AiResponse {
            self.calls
                .lock()
                .unwrap()
                .push((prompt.to_string(), options.max_tokens));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| AiResponse::failed("stub-model", "script exhausted"))
        }
    }
}

#[cfg(test)]
pub use stub::StubGenerator;
