/**
 * Digest Tests
 *
 * Tests for the canonical message serialization and the MD5 based ids
 */

#[path = "../util/mod.rs"]
mod utils;

#[cfg(test)]
mod tests {
    use super::utils::{build_html, build_text, try_build_text};
    use i18n_extractor::i18n::digest::{canonical_string, digest, md5_hex, DigestOptions};
    use i18n_extractor::{EscapingContext, HtmlWhitespace};

    fn raw() -> DigestOptions {
        DigestOptions::new(EscapingContext::Raw, HtmlWhitespace::Collapse)
    }

    fn html() -> DigestOptions {
        DigestOptions::new(EscapingContext::Html, HtmlWhitespace::Collapse)
    }

    #[test]
    fn should_match_md5_test_suite() {
        assert_eq!(md5_hex(b"a"), "0cc175b9c0f1b6a831c399e269772661");
        assert_eq!(md5_hex(b"message digest"), "f96b697d7cb7938d525a2f31aaf161d0");
        assert_eq!(
            md5_hex(b"abcdefghijklmnopqrstuvwxyz"),
            "c3fcd3d76192e4007dfb496cca67e13b"
        );
        assert_eq!(
            md5_hex(
                b"12345678901234567890123456789012345678901234567890123456789012345678901234567890"
            ),
            "57edf4a22be3c955ac49da2e2107b67a"
        );
    }

    #[test]
    fn should_serialize_text_then_sorted_placeholders() {
        let message = build_text("Hi {{name}}, {{count}} new");
        assert_eq!(
            canonical_string(None, message.parts(), raw()),
            "\u{10}'Hi \u{10}.\u{10}', \u{10}.\u{10}' new\u{10}.\
             \u{10}XEXPRESSION,Expression\u{10}.\u{10}XEXPRESSION_1,Expression\u{10}."
        );
    }

    #[test]
    fn should_serialize_tag_pairs_with_begin_and_end_markers() {
        let message = build_html("<b>x</b>");
        assert_eq!(
            canonical_string(None, message.parts(), html()),
            "\u{10}<B_BEGIN,HtmlTagPair\u{10}.\u{10}'x\u{10}.\u{10}>B_END,HtmlTagPair\u{10}."
        );
    }

    #[test]
    fn should_collect_placeholders_per_level() {
        let message = build_html("{{a}}<b>{{b}}</b>");
        assert_eq!(
            canonical_string(None, message.parts(), html()),
            "\u{10}<B_BEGIN,HtmlTagPair\u{10}.\u{10}XEXPRESSION_1,Expression\u{10}.\
             \u{10}>B_END,HtmlTagPair\u{10}.\u{10}XEXPRESSION,Expression\u{10}."
        );
    }

    #[test]
    fn should_prefix_meaning_and_ignore_comment() {
        let with_meaning = try_build_text("Save", "verb|Button label").unwrap();
        let other_comment = try_build_text("Save", "verb|Toolbar").unwrap();
        let noun = try_build_text("Save", "noun|Button label").unwrap();
        assert!(canonical_string(with_meaning.meaning(), with_meaning.parts(), raw())
            .starts_with("verb\u{10}'"));
        assert_eq!(with_meaning.id(), other_comment.id());
        assert_ne!(with_meaning.id(), noun.id());
    }

    #[test]
    fn should_double_the_sentinel_in_text() {
        let message = build_text("a\u{10}b");
        assert_eq!(
            canonical_string(None, message.parts(), raw()),
            "\u{10}'a\u{10}\u{10}b\u{10}."
        );
    }

    #[test]
    fn should_trim_and_collapse_html_text() {
        let message = build_html("\n   Hello   <b> big </b>\n world  \n");
        assert_eq!(
            canonical_string(None, message.parts(), html()),
            "\u{10}'Hello \u{10}.\u{10}<B_BEGIN,HtmlTagPair\u{10}.\u{10}' big \u{10}.\
             \u{10}>B_END,HtmlTagPair\u{10}.\u{10}' world\u{10}."
        );
    }

    #[test]
    fn should_skip_whitespace_only_edges() {
        let message = build_html("  <b>x</b>  ");
        assert_eq!(
            canonical_string(None, message.parts(), html()),
            canonical_string(None, build_html("<b>x</b>").parts(), html())
        );
    }

    #[test]
    fn should_render_ids_as_lowercase_hex() {
        let message = build_text("Hello");
        assert_eq!(message.id().len(), 32);
        assert!(message
            .id()
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        assert_eq!(message.id(), md5_hex("\u{10}'Hello\u{10}.".as_bytes()));
    }

    #[test]
    fn should_recompute_the_same_id() {
        let message = build_html("Click <a href=\"/x\">here</a> {{n}}");
        assert_eq!(digest(&message, HtmlWhitespace::Collapse), message.id());
    }
}
