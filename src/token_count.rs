#[cfg(feature = "tokenizer-tiktoken")]
mod imp {
    use once_cell::sync::Lazy;
    use tiktoken_rs::{cl100k_base, o200k_base, CoreBPE};

    //  Prefer o200k_base for newer models; fall back to cl100k_base if needed
    static BPE: Lazy<CoreBPE> = Lazy::new(|| {
        o200k_base()
            .or_else(|_| cl100k_base())
            .expect("tiktoken-rs encodings unavailable")
    });

    pub fn count_tokens(text: &str) -> usize {
        //  include special tokens to bias the count conservatively for chat wrappers
        BPE.encode_with_special_tokens(text).len()
    }
}

#[cfg(all(feature = "tokenizer-gpt-tokenizer", not(feature = "tokenizer-tiktoken")))]
mod imp {
    use gpt_tokenizer::DefaultTokenizer;
    use once_cell::sync::Lazy;

    static TOK: Lazy<DefaultTokenizer> = Lazy::new(DefaultTokenizer::new);

    pub fn count_tokens(text: &str) -> usize {
        TOK.encode(text).len()
    }
}

#[cfg(not(any(feature = "tokenizer-tiktoken", feature = "tokenizer-gpt-tokenizer")))]
mod imp {
    //  chars/4 approximation when no tokenizer feature is enabled
    pub fn count_tokens(text: &str) -> usize {
        text.chars().count().div_ceil(4)
    }
}

pub use imp::count_tokens;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_has_no_tokens() {
        assert_eq!(count_tokens(""), 0);
    }

    #[test]
    fn longer_text_costs_more() {
        let short = count_tokens("fn main() {}");
        let long = count_tokens(&"fn main() {}\n".repeat(50));
        assert!(short > 0);
        assert!(long > short);
    }
}
