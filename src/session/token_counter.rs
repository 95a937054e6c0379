// Token counting utilities

use std::sync::OnceLock;
use tiktoken_rs::{cl100k_base, CoreBPE};

fn tokenizer() -> Option<&'static CoreBPE> {
	static TOKENIZER: OnceLock<Option<CoreBPE>> = OnceLock::new();
	TOKENIZER.get_or_init(|| cl100k_base().ok()).as_ref()
}

// Simple token counter that uses tiktoken to estimate token counts
pub fn estimate_tokens(text: &str) -> u64 {
	if text.is_empty() {
		return 0;
	}
	match tokenizer() {
		Some(bpe) => bpe.encode_ordinary(text).len() as u64,
		None => (text.len() / 4) as u64, // Fallback to rough approximation
	}
}
