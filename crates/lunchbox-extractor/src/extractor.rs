//! Core extraction client

use std::fmt::Display;

use chrono::NaiveDate;
use lunchbox_domain::{ExtractionMode, ExtractionOutcome, MenuExtractor};
use lunchbox_llm::ChatProvider;
use tracing::{debug, info, warn};

use crate::config::ExtractorConfig;
use crate::conversation::{Conversation, Step};
use crate::error::ExtractorError;
use crate::parser::parse_menu_response;
use crate::prompt::PromptBuilder;
use crate::tools::price_tool;

/// Extracts a menu from page text through a tool-calling chat model
pub struct MenuExtractionClient<P>
where
    P: ChatProvider,
{
    provider: P,
    config: ExtractorConfig,
}

impl<P> MenuExtractionClient<P>
where
    P: ChatProvider,
    P::Error: Display,
{
    /// Create a new extraction client
    pub fn new(provider: P, config: ExtractorConfig) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;
        Ok(Self { provider, config })
    }

    /// Run the exchange and return the model's final text
    fn converse(&self, conversation: &mut Conversation) -> Result<Option<String>, ExtractorError> {
        loop {
            let request = conversation.next_request();
            let reply = self
                .provider
                .complete(&request)
                .map_err(|e| ExtractorError::Llm(e.to_string()))?;

            if !reply.tool_calls.is_empty() {
                debug!("Model requested {} tool call(s)", reply.tool_calls.len());
            }

            if let Step::Final(content) = conversation.receive(reply) {
                return Ok(content);
            }
        }
    }

    fn page_excerpt<'a>(&self, page_text: &'a str) -> &'a str {
        match page_text.char_indices().nth(self.config.max_page_chars) {
            Some((cut, _)) => &page_text[..cut],
            None => page_text,
        }
    }
}

impl<P> MenuExtractor for MenuExtractionClient<P>
where
    P: ChatProvider,
    P::Error: Display,
{
    type Error = ExtractorError;

    fn extract(
        &self,
        url: &str,
        page_text: &str,
        target_date: NaiveDate,
        mode: ExtractionMode,
    ) -> Result<ExtractionOutcome, Self::Error> {
        info!("Extracting menu from {} for {} ({} mode)", url, target_date, mode);

        let user = PromptBuilder::new(mode, url, target_date)
            .with_page_text(self.page_excerpt(page_text))
            .build();
        debug!("Prompt length: {} chars", user.len());

        let mut conversation =
            Conversation::open(PromptBuilder::system_message(), user, vec![price_tool()]);
        let content = self.converse(&mut conversation)?.unwrap_or_default();

        debug!("Model response length: {} chars", content.len());

        match parse_menu_response(&content) {
            Ok(mut menu) => {
                menu.stamp(url, target_date);
                info!("Extracted {} menu item(s) from {}", menu.menu_items.len(), url);
                Ok(ExtractionOutcome::Menu(menu))
            }
            Err(failure) => {
                warn!("Rejected model output for {}: {}", url, failure.error);
                Ok(ExtractionOutcome::Rejected(failure))
            }
        }
    }
}
