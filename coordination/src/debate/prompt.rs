//! Debate prompt: critique every anonymized answer, then rank them.
//!
//! The ranking block format here and the parser in
//! [`ranking`](super::ranking) form one protocol; change them together.

use super::anonymizer::{AnonymizedResponses, RESPONSE_PREFIX};
use super::ranking::FINAL_RANKING_ANCHOR;
use crate::council::Message;

/// Render the single user message sent to every council member.
pub fn build_debate_prompt(user_query: &str, responses: &AnonymizedResponses) -> Message {
    let responses_text = responses.responses_text();
    let anchor = FINAL_RANKING_ANCHOR;
    let prefix = RESPONSE_PREFIX;

    let content = format!(
        "You are participating in a rigorous debate to answer the following question:

Question: {user_query}

Here are the proposed answers from other participants (anonymized):

{responses_text}

Your task is to CRITIQUE these responses.
1. Identify any factual errors, logical fallacies, or missing context in each response.
2. Compare them directly. Which one offers the best evidence? Which one is the most helpful?
3. Be critical but constructive.

AFTER your critique, you must provide a FINAL RANKING based on your analysis, from best to worst.

IMPORTANT: Your final ranking MUST be formatted EXACTLY as follows at the very end:
{anchor}
1. {prefix} X
2. {prefix} Y
...

Now, provide your critique and ranking:"
    );

    Message::user(content)
}
