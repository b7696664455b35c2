//! The two-turn exchange with the model
//!
//! The first turn offers the tools. If the model asks for tool calls, they
//! are answered locally and a second turn is sent without tools; whatever
//! that turn returns is final. A first turn without tool calls is final
//! immediately.

use lunchbox_llm::{ChatReply, ChatRequest, Message, ToolChoice, ToolDefinition};
use tracing::debug;

use crate::tools::run_tool_call;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Opening,
    ToolsAnswered,
}

/// What to do after a reply has been received
#[derive(Debug, PartialEq)]
pub(crate) enum Step {
    /// Send `next_request()` again
    Continue,
    /// The exchange is over; this is the model's final text
    Final(Option<String>),
}

/// Conversation state for one extraction attempt
#[derive(Debug)]
pub(crate) struct Conversation {
    messages: Vec<Message>,
    tools: Vec<ToolDefinition>,
    phase: Phase,
}

impl Conversation {
    pub(crate) fn open(system: String, user: String, tools: Vec<ToolDefinition>) -> Self {
        Self {
            messages: vec![Message::system(system), Message::user(user)],
            tools,
            phase: Phase::Opening,
        }
    }

    /// The request for the current phase
    pub(crate) fn next_request(&self) -> ChatRequest {
        let request = ChatRequest::new(self.messages.clone());
        match self.phase {
            Phase::Opening => request.with_tools(self.tools.clone(), ToolChoice::Auto),
            Phase::ToolsAnswered => request,
        }
    }

    /// Record the model's reply and decide whether another turn is needed
    pub(crate) fn receive(&mut self, reply: ChatReply) -> Step {
        if self.phase == Phase::ToolsAnswered || !reply.wants_tools() {
            return Step::Final(reply.content);
        }

        let results: Vec<Message> = reply
            .tool_calls
            .iter()
            .map(|call| {
                let result = run_tool_call(call);
                debug!("Tool call {} ({}) -> {}", call.id, call.name, result);
                Message::tool_result(call.id.clone(), call.name.clone(), result.to_string())
            })
            .collect();

        self.messages
            .push(Message::assistant_with_tool_calls(reply.content, reply.tool_calls));
        self.messages.extend(results);
        self.phase = Phase::ToolsAnswered;

        Step::Continue
    }

    #[cfg(test)]
    pub(crate) fn messages(&self) -> &[Message] {
        &self.messages
    }
}
