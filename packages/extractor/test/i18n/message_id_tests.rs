/**
 * Message Id Tests
 *
 * Properties of message ids: what changes an id and what must not
 */

#[path = "../util/mod.rs"]
mod utils;

#[cfg(test)]
mod tests {
    use super::utils::{
        build_html, build_text, describe_parts, first_element, try_build_element, try_build_text,
    };
    use i18n_extractor::{
        EscapingContext, ExtractorConfig, HtmlWhitespace, I18nError, LintError, MessageBuilder,
    };
    use std::collections::HashSet;

    #[test]
    fn should_be_deterministic() {
        let content = "Hi <b>{{user}}</b>, you have {{n // i18n-ph(COUNT)}} messages";
        let first = build_html(content);
        let second = build_html(content);
        assert_eq!(first.id(), second.id());
        assert_eq!(first.placeholders_by_name(), second.placeholders_by_name());
        assert_eq!(first.parts(), second.parts());
    }

    #[test]
    fn should_ignore_order_of_simple_placeholders() {
        let forward = build_text("{{a}} and {{b}}");
        let backward = build_text("{{b}} and {{a}}");
        assert_eq!(forward.id(), backward.id());
        assert_ne!(forward.parts(), backward.parts());
    }

    #[test]
    fn should_merge_repeated_expression() {
        let twice = build_text("{{a}} and {{a}}");
        assert_eq!(twice.placeholders_by_name().len(), 1);
        assert_eq!(describe_parts(twice.parts()), "[EXPRESSION] and [EXPRESSION]");
    }

    #[test]
    fn should_depend_on_tag_names() {
        assert_ne!(build_html("<b>hi</b>").id(), build_html("<i>hi</i>").id());
    }

    #[test]
    fn should_depend_on_nesting() {
        assert_ne!(
            build_html("<b>hi <i>there</i></b>").id(),
            build_html("<b><i>hi there</i></b>").id()
        );
        assert_ne!(
            build_html("<b><i>x</i></b>y").id(),
            build_html("<b><i>x</i>y</b>").id()
        );
    }

    #[test]
    fn should_depend_on_text() {
        assert_ne!(build_text("Hello").id(), build_text("Hello!").id());
    }

    #[test]
    fn should_depend_on_explicit_names() {
        assert_ne!(
            build_text("{{x}}").id(),
            build_text("{{x // i18n-ph(COUNT)}}").id()
        );
    }

    #[test]
    fn should_depend_on_meaning_but_not_comment() {
        let base = try_build_text("Open", "verb|Menu item").unwrap();
        assert_eq!(base.id(), try_build_text("Open", "verb|Toolbar").unwrap().id());
        assert_eq!(base.id(), try_build_text("Open", "verb|").unwrap().id());
        assert_ne!(base.id(), try_build_text("Open", "adjective|Menu item").unwrap().id());
        assert_ne!(base.id(), build_text("Open").id());
    }

    #[test]
    fn should_ignore_whitespace_runs_in_html() {
        assert_eq!(
            build_html("Hello   <b>big</b>\n   world").id(),
            build_html("Hello <b>big</b> world").id()
        );
        assert_eq!(
            build_html("\n    Hello\n  ").id(),
            build_html("Hello").id()
        );
        assert_eq!(
            build_html("<b>  two\t words </b>").id(),
            build_html("<b> two words </b>").id()
        );
    }

    #[test]
    fn should_keep_whitespace_in_raw_text() {
        assert_ne!(build_text("a  b").id(), build_text("a b").id());
        assert_ne!(build_text(" a").id(), build_text("a").id());
    }

    #[test]
    fn should_keep_whitespace_when_preserving() {
        let config = ExtractorConfig::default().with_html_whitespace(HtmlWhitespace::Preserve);
        let spaced = try_build_element("<p i18n>a   b</p>", &config).unwrap();
        let tight = try_build_element("<p i18n>a b</p>", &config).unwrap();
        assert_ne!(spaced.id(), tight.id());
    }

    #[test]
    fn should_match_across_escaping_contexts() {
        let config = ExtractorConfig::default();
        let content = first_element(r#"<p i18n>1,"2",3</p>"#);
        let in_html = MessageBuilder::from_element(&config, "", &content)
            .unwrap()
            .build()
            .unwrap();
        let in_attr =
            MessageBuilder::from_text(&config, "", r#"1,"2",3"#, EscapingContext::AttributeValue)
                .unwrap()
                .build()
                .unwrap();
        assert_eq!(in_html.id(), in_attr.id());
        assert_ne!(in_html.context(), in_attr.context());
    }

    #[test]
    fn should_not_merge_identical_tags() {
        let message = build_html("<b>x</b><b>x</b>");
        assert_eq!(
            describe_parts(message.parts()),
            "[B_BEGIN]x[B_END][B_BEGIN_1]x[B_END_1]"
        );
    }

    #[test]
    fn should_keep_names_unique() {
        let message = build_html(
            r#"<b>{{a}}</b><b>{{b}}</b><i>{{a}}</i> {{c // i18n-ph(B_BEGIN_2)}} <img alt="{{d}}" i18n-alt>"#,
        );
        let names: Vec<&String> = message.placeholders_by_name().keys().collect();
        let unique: HashSet<&String> = names.iter().copied().collect();
        assert_eq!(names.len(), unique.len());
        // Three tag pairs plus the img, each with two anchors, and four expressions.
        assert_eq!(names.len(), 4 * 2 + 4);
        assert!(unique.contains(&"B_BEGIN_2".to_string()));
        for placeholder in message.placeholders_by_name().values() {
            assert_eq!(
                message.placeholder(&placeholder.name).map(|ph| &ph.name),
                Some(&placeholder.name)
            );
        }
    }

    #[test]
    fn should_reject_conflicting_explicit_names() {
        let err = try_build_text("{{x // i18n-ph(FOO)}} and {{x // i18n-ph(BAR)}}", "").unwrap_err();
        assert!(matches!(
            err,
            I18nError::Lint(LintError::ConflictingPlaceholderNames { ref text, .. }) if text == "x"
        ));
    }
}
