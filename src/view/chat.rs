use crate::chat::{ChatClient, task_context};
use crate::core::views::sort_for_display;
use crate::store::SqliteStore;

const GREETING: &str = "Hello! How can I help you with your tasks today?";
const FAILURE_REPLY: &str = "Sorry, something went wrong. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub text: String,
    pub from_user: bool,
}

/// State behind the assistant screen: the transcript, the draft being
/// typed, and the in-flight flag that blocks concurrent sends.
pub struct ChatView {
    store: SqliteStore,
    user_id: String,
    client: ChatClient,
    messages: Vec<ChatMessage>,
    draft: String,
    awaiting_reply: bool,
}

impl ChatView {
    pub fn open(store: &SqliteStore, user_id: impl Into<String>, client: ChatClient) -> Self {
        Self {
            store: store.clone(),
            user_id: user_id.into(),
            client,
            messages: vec![ChatMessage {
                text: GREETING.to_string(),
                from_user: false,
            }],
            draft: String::new(),
            awaiting_reply: false,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn awaiting_reply(&self) -> bool {
        self.awaiting_reply
    }

    pub fn draft_changed(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Send the draft: snapshot the user's tasks in display order, render
    /// them as context, and ask the assistant. A blank draft or an
    /// already-pending send is a no-op. Failures append a generic apology
    /// and keep the rest of the transcript intact for retry.
    pub async fn send(&mut self) {
        if self.draft.trim().is_empty() || self.awaiting_reply {
            return;
        }
        let outgoing = std::mem::take(&mut self.draft);
        self.messages.push(ChatMessage {
            text: outgoing.clone(),
            from_user: true,
        });
        self.awaiting_reply = true;

        let reply = match self.store.tasks_for_user(&self.user_id) {
            Ok(tasks) => {
                let context = task_context(&sort_for_display(tasks));
                self.client.complete(&outgoing, &context).await
            }
            Err(e) => Err(e.to_string()),
        };

        let text = reply.unwrap_or_else(|e| {
            log::warn!("assistant reply failed: {e}");
            FAILURE_REPLY.to_string()
        });
        self.messages.push(ChatMessage {
            text,
            from_user: false,
        });
        self.awaiting_reply = false;
    }
}
