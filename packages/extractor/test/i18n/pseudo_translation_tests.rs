/**
 * Pseudo Translation Tests
 *
 * Tests for the word mutating pseudo-translator
 */

#[path = "../util/mod.rs"]
mod utils;

#[cfg(test)]
mod tests {
    use super::utils::{build_html, build_text, describe_parts};
    use i18n_extractor::i18n::pseudo_translation::{pseudo_translate_text, pseudo_translate_word};
    use i18n_extractor::{pseudo_translate, EscapingContext, Part};

    #[test]
    fn should_double_each_word_with_umlauts() {
        assert_eq!(pseudo_translate_word("Hi"), "Hi H\u{308}i\u{308}");
        assert_eq!(pseudo_translate_word("42"), "42 4\u{308}2\u{308}");
    }

    #[test]
    fn should_leave_separators_alone() {
        assert_eq!(pseudo_translate_text(" - "), " - ");
        assert_eq!(pseudo_translate_text(""), "");
        assert_eq!(
            pseudo_translate_text("a-b"),
            "a a\u{308}-b b\u{308}"
        );
    }

    #[test]
    fn should_translate_only_text_parts() {
        let source = build_html("Hi <b>{{name}}</b> friend");
        let translated = pseudo_translate(&source);
        assert_eq!(translated.id(), source.id());
        assert_eq!(translated.placeholders_by_name(), source.placeholders_by_name());
        assert_eq!(
            describe_parts(translated.parts()),
            "Hi H\u{308}i\u{308} [B_BEGIN][EXPRESSION][B_END] friend f\u{308}r\u{308}i\u{308}e\u{308}n\u{308}d\u{308}"
        );
    }

    #[test]
    fn should_keep_tag_pair_structure() {
        let source = build_html(r#"<a href="/x">Go</a>"#);
        let translated = pseudo_translate(&source);
        let (Part::TagPair(before), Part::TagPair(after)) = (&source.parts()[0], &translated.parts()[0])
        else {
            panic!("expected tag pairs");
        };
        assert_eq!(before.begin, after.begin);
        assert_eq!(before.canonical_key, after.canonical_key);
        assert_eq!(after.parts, vec![Part::Text("Go G\u{308}o\u{308}".to_string())]);
        assert_eq!(
            translated.render(EscapingContext::Html),
            "<a href=\"/x\">Go G\u{308}o\u{308}</a>"
        );
    }

    #[test]
    fn should_translate_embedded_messages() {
        let source = build_html(r#"<img alt="Cat" i18n-alt>"#);
        let translated = pseudo_translate(&source);
        let alt = &translated.embedded_messages()[0];
        assert_eq!(alt.id(), source.embedded_messages()[0].id());
        assert_eq!(describe_parts(alt.parts()), "Cat C\u{308}a\u{308}t\u{308}");
    }

    #[test]
    fn should_keep_placeholder_only_messages() {
        let source = build_text("{{a}}");
        assert_eq!(pseudo_translate(&source), source);
    }
}
