//! Comment text cleaning and tokenization

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Inline media embeds such as `![gif](giphy|3o7TKSjR)` or `![img](abc123)`
    static ref MEDIA_MARKUP: Regex = Regex::new(r"!\[(?:gif|img)\]\([^)]*\)").unwrap();
    static ref NON_WORD: Regex = Regex::new(r"\W+").unwrap();
}

/// Strip inline media markup from a raw comment body
pub fn clean_comment(body: &str) -> String {
    MEDIA_MARKUP.replace_all(body, "").into_owned()
}

/// Split on runs of non-word characters and uppercase every token.
///
/// `"BTC, to the moon!"` becomes `["BTC", "TO", "THE", "MOON"]`.
pub fn tokenize(text: &str) -> Vec<String> {
    NON_WORD
        .split(text)
        .filter(|token| !token.is_empty())
        .map(|token| token.to_uppercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_gif_markup() {
        let cleaned = clean_comment("ETH pumping ![gif](giphy|3o7TKSjRrfIPjeiVyM) let's go");
        assert_eq!(cleaned, "ETH pumping  let's go");
    }

    #[test]
    fn test_clean_keeps_following_text() {
        let cleaned = clean_comment("![gif](giphy|abc|downsized) (BTC) is fine");
        assert_eq!(cleaned, " (BTC) is fine");
    }

    #[test]
    fn test_clean_img_markup() {
        assert_eq!(clean_comment("look ![img](x9fk2)"), "look ");
    }

    #[test]
    fn test_clean_plain_text_unchanged() {
        let text = "No media here [link](https://example.com)";
        assert_eq!(clean_comment(text), text);
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("BTC, to the moon!"),
            vec!["BTC", "TO", "THE", "MOON"]
        );
        assert_eq!(tokenize("BITCOINX-is_a scam"), vec!["BITCOINX", "IS_A", "SCAM"]);
        assert!(tokenize("  ... !!").is_empty());
    }
}
