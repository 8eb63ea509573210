/// Remove every occurrence of each mention token, then trim surrounding whitespace.
///
/// Discord's mention forms (`<@42>`, `<@!42>`) never contain one another, so
/// removal order does not matter.
#[must_use]
pub fn strip_mentions(text: &str, tokens: &[String]) -> String {
    tokens
        .iter()
        .filter(|t| !t.is_empty())
        .fold(text.to_string(), |acc, token| acc.replace(token.as_str(), ""))
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> Vec<String> {
        vec!["<@42>".into(), "<@!42>".into()]
    }

    #[test]
    fn strips_leading_mention() {
        assert_eq!(strip_mentions("<@42> hi there", &tokens()), "hi there");
    }

    #[test]
    fn strips_every_occurrence() {
        assert_eq!(strip_mentions("<@42> a <@!42> b <@42>", &tokens()), "a  b");
    }

    #[test]
    fn leaves_other_users_alone() {
        assert_eq!(strip_mentions("<@7> hi <@42>", &tokens()), "<@7> hi");
    }

    #[test]
    fn mention_only_becomes_empty() {
        assert_eq!(strip_mentions("  <@42>\n", &tokens()), "");
    }

    #[test]
    fn token_order_does_not_matter() {
        let reversed: Vec<String> = tokens().into_iter().rev().collect();
        let text = "<@!42> x <@42> y";
        assert_eq!(strip_mentions(text, &reversed), strip_mentions(text, &tokens()));
        assert_eq!(strip_mentions(text, &reversed), "x  y");
    }

    #[test]
    fn empty_token_is_ignored() {
        assert_eq!(strip_mentions(" hi ", &[String::new()]), "hi");
    }

    #[test]
    fn no_tokens_only_trims() {
        assert_eq!(strip_mentions("  hello ", &[]), "hello");
    }
}
