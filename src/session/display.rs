use crate::hub::LoadError;
use crate::tokenizer::TokenizationResult;

pub const WELCOME: &str = "🤗 Welcome to the Hugging Face Tokenizer CLI! 🤗";
pub const EXITING: &str = "\nExiting.";
pub const GOODBYE: &str = "\n👋 Goodbye!";
pub const EMPTY_TEXT_HINT: &str = "💬 Please enter some text to tokenize.";
pub const LOADED: &str = "✅ Tokenizer loaded successfully.";

const RESULT_RULE_WIDTH: usize = 25;
const ROUND_RULE_WIDTH: usize = 20;

pub fn round_separator() -> String {
    format!("\n{}", "-".repeat(ROUND_RULE_WIDTH))
}

pub fn loading(repo_id: &str) -> String {
    format!("\n⏳ Loading tokenizer for '{}'...", repo_id)
}

/// One-line report for a failed load. Unexpected failures get their own lead-in.
pub fn load_failure(error: &LoadError) -> String {
    match error {
        LoadError::Malformed { .. } => format!("❌ An unexpected error occurred: {}", error),
        _ => format!("❌ Error: {}", error),
    }
}

pub fn tokenize_failure(detail: &str) -> String {
    format!("❌ Error during tokenization: {}", detail)
}

/// Echo of the text about to be tokenized, printed whether or not tokenizing succeeds
pub fn input_echo(text: &str) -> String {
    format!("\n💬 Input Text:\n'{}'", text)
}

/// The id list and the token list, in that order, index-aligned.
///
/// ```text
///
/// ✨ Tokenization Results ✨
/// -------------------------
/// 🔹 Token IDs:  [1, 2, 3]
/// 🔹 Tokens:     ['Hello', 'World', '!']
/// -------------------------
/// ```
pub fn render_result(result: &TokenizationResult) -> String {
    let rule = "-".repeat(RESULT_RULE_WIDTH);
    let ids = result
        .ids()
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    let tokens = result
        .tokens()
        .iter()
        .map(|t| quote(t))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "\n✨ Tokenization Results ✨\n{rule}\n🔹 Token IDs:  [{}]\n🔹 Tokens:     [{}]\n{rule}",
        ids, tokens
    )
}

/// Quotes a token the way a Python list of strings prints it: single quotes,
/// switching to double quotes only when that avoids escaping.
pub fn quote(token: &str) -> String {
    let delimiter = if token.contains('\'') && !token.contains('"') { '"' } else { '\'' };

    let mut quoted = String::with_capacity(token.len() + 2);
    quoted.push(delimiter);
    for c in token.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c if c == delimiter => {
                quoted.push('\\');
                quoted.push(c);
            }
            c => quoted.push(c),
        }
    }
    quoted.push(delimiter);
    quoted
}
