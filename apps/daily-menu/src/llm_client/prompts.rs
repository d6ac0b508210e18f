// Shared prompt fragments for model calls.
// Feature prompts live next to the feature (see suggestion/prompt.rs).

/// Appended to every structured-output prompt.
pub const JSON_ONLY_INSTRUCTION: &str = "\
    出力はJSONオブジェクトのみとし、それ以外の文章やコードブロック記法は含めないでください。";
