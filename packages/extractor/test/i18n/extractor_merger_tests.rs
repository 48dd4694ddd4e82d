/**
 * Extractor Merger Tests
 *
 * Tests for the document walker and for merging translations back
 */

#[path = "../util/mod.rs"]
mod utils;

#[cfg(test)]
mod tests {
    use super::utils::{describe_parts, parse};
    use i18n_extractor::i18n::extractor_merger::{
        descendant_elements, extract_messages, extract_messages_with, merge_translations, OnParse,
    };
    use i18n_extractor::i18n::i18n_parser::build_text_message;
    use i18n_extractor::i18n::{pseudo_translate, MissingTranslationStrategy, TranslationBundle};
    use i18n_extractor::ml_parser::Element;
    use i18n_extractor::{
        ErrorPolicy, EscapingContext, ExtractorConfig, I18nError, LintError, Message,
        MessageBuilder,
    };

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl OnParse for Recorder {
        fn on_attribute_message(&mut self, message: &Message, element: &Element, attr: &str) {
            self.events.push(format!(
                "attr {}[{}]: {}",
                element.name,
                attr,
                describe_parts(message.parts())
            ));
        }

        fn on_node_message(&mut self, message: &Message, element: &Element) {
            self.events
                .push(format!("node {}: {}", element.name, describe_parts(message.parts())));
        }
    }

    fn extract(html: &str) -> Vec<String> {
        extract_messages(&parse(html), &ExtractorConfig::default())
            .unwrap()
            .messages
            .values()
            .map(|message| describe_parts(message.parts()))
            .collect()
    }

    fn source_message(html: &str) -> Message {
        extract_messages(&parse(html), &ExtractorConfig::default())
            .unwrap()
            .messages
            .into_values()
            .next()
            .unwrap()
    }

    fn html_translation(content: &str) -> Message {
        let el = super::utils::first_element(&format!("<div>{}</div>", content));
        MessageBuilder::from_element(&ExtractorConfig::default(), "", &el)
            .unwrap()
            .build()
            .unwrap()
    }

    fn text_translation(text: &str) -> Message {
        build_text_message(
            &ExtractorConfig::default(),
            "",
            text,
            EscapingContext::AttributeValue,
        )
        .unwrap()
    }

    fn merge(html: &str, bundle: &TranslationBundle) -> String {
        merge_translations(&parse(html), bundle, &ExtractorConfig::default()).unwrap()
    }

    #[test]
    fn should_extract_in_breadth_first_order() {
        let html = r#"<html><body>
            <div><span i18n>Deep {{value}}</span></div>
            <h1 i18n="title|Page title">Welcome</h1>
            <p>Not marked</p>
            <img src="logo.png" alt="Logo" i18n-alt="Company logo">
        </body></html>"#;
        assert_eq!(extract(html), vec!["Welcome", "Logo", "Deep [EXPRESSION]"]);
    }

    #[test]
    fn should_not_descend_into_node_messages() {
        let messages = extract("<div i18n>outer <span i18n>inner</span></div>");
        assert_eq!(messages, vec!["outer [SPAN_BEGIN]inner[SPAN_END]"]);
    }

    #[test]
    fn should_extract_attributes_of_marked_nodes() {
        let messages = extract(r#"<p title="Tip" i18n-title i18n>Body</p>"#);
        assert_eq!(messages, vec!["Tip", "Body"]);
    }

    #[test]
    fn should_use_attribute_value_context() {
        let html = r#"<img alt="Logo" i18n-alt="brand|Company logo">"#;
        let message = source_message(html);
        assert_eq!(message.context(), EscapingContext::AttributeValue);
        assert_eq!(message.meaning(), Some("brand"));
        assert_eq!(message.comment(), "Company logo");
    }

    #[test]
    fn should_report_messages_through_callbacks() {
        let html = r#"<section title="S" i18n-title><p i18n>See <img alt="Cat" i18n-alt></p></section>"#;
        let mut recorder = Recorder::default();
        let result =
            extract_messages_with(&parse(html), &ExtractorConfig::default(), &mut recorder).unwrap();
        assert_eq!(
            recorder.events,
            vec![
                "attr section[title]: S",
                "node p: See [IMG_BEGIN][IMG_END]",
                "attr img[alt]: Cat",
            ]
        );
        let collected: Vec<String> = result
            .messages
            .values()
            .map(|message| describe_parts(message.parts()))
            .collect();
        assert_eq!(collected, vec!["S", "See [IMG_BEGIN][IMG_END]", "Cat"]);
    }

    #[test]
    fn should_replace_duplicate_ids() {
        let result = extract_messages(
            &parse("<p i18n>Same</p><div i18n>Same</div>"),
            &ExtractorConfig::default(),
        )
        .unwrap();
        assert_eq!(result.messages.len(), 1);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn should_abort_on_first_error_by_default() {
        let err = extract_messages(
            &parse(r#"<p i18n="|no meaning">a</p><p i18n>b</p>"#),
            &ExtractorConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, I18nError::Lint(LintError::EmptyMeaning)));
    }

    #[test]
    fn should_skip_failing_messages_when_asked() {
        let config = ExtractorConfig::default().with_error_policy(ErrorPolicy::Skip);
        let result = extract_messages(
            &parse(r#"<p i18n="|no meaning">a</p><img i18n-alt><p i18n>b</p>"#),
            &config,
        )
        .unwrap();
        let texts: Vec<String> = result
            .messages
            .values()
            .map(|message| describe_parts(message.parts()))
            .collect();
        assert_eq!(texts, vec!["b"]);
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors.iter().all(I18nError::is_lint));
        assert!(matches!(
            result.errors[1],
            I18nError::Lint(LintError::MissingMarkedAttribute { .. })
        ));
    }

    #[test]
    fn should_support_custom_markers() {
        let config = ExtractorConfig::default()
            .with_node_marker("translate")
            .with_attribute_marker_prefix("translate-");
        let html = r#"<p translate>One</p><p i18n>Two</p><img alt="Three" translate-alt>"#;
        let result = extract_messages(&parse(html), &config).unwrap();
        let texts: Vec<String> = result
            .messages
            .values()
            .map(|message| describe_parts(message.parts()))
            .collect();
        assert_eq!(texts, vec!["One", "Three"]);
    }

    #[test]
    fn should_list_descendants_in_document_order() {
        let doc = parse("<div><a><b></b></a><c></c></div>");
        let div = doc[0].as_element().unwrap();
        let names: Vec<&str> = descendant_elements(div)
            .iter()
            .map(|el| el.name.as_str())
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn should_merge_node_translation() {
        let html = r#"<h1 i18n="Greeting" class="big">Hello <b>world</b></h1>"#;
        let source = source_message(html);
        let mut bundle = TranslationBundle::default();
        bundle.insert(source.id(), html_translation("<b>Welt</b>, hallo"));
        assert_eq!(merge(html, &bundle), r#"<h1 class="big"><b>Welt</b>, hallo</h1>"#);
    }

    #[test]
    fn should_keep_source_markup_for_tags() {
        let html = r#"<p i18n>Read <a href="/docs">docs</a></p>"#;
        let source = source_message(html);
        let mut bundle = TranslationBundle::default();
        bundle.insert(source.id(), html_translation(r#"Lies <a href="/evil">Doku</a>"#));
        assert_eq!(merge(html, &bundle), r#"<p>Lies <a href="/docs">Doku</a></p>"#);
    }

    #[test]
    fn should_substitute_placeholders_from_source() {
        let html = "<p i18n>{{count}} items</p>";
        let source = source_message(html);
        let mut bundle = TranslationBundle::default();
        bundle.insert(source.id(), html_translation("{{other}} Dinge"));
        assert_eq!(merge(html, &bundle), "<p>{{count}} Dinge</p>");
    }

    #[test]
    fn should_merge_attribute_translation() {
        let html = r#"<img alt="Logo" i18n-alt src="logo.png">"#;
        let source = source_message(html);
        let mut bundle = TranslationBundle::default();
        bundle.insert(source.id(), text_translation(r#"Das "Logo""#));
        assert_eq!(merge(html, &bundle), r#"<img alt='Das "Logo"' src="logo.png">"#);
    }

    #[test]
    fn should_keep_source_when_translation_missing() {
        let html = r#"<!DOCTYPE html><p i18n>Untranslated &amp; kept</p><!--c-->"#;
        let bundle = TranslationBundle::new(MissingTranslationStrategy::Ignore);
        assert_eq!(
            merge(html, &bundle),
            "<!DOCTYPE html><p>Untranslated &amp; kept</p><!--c-->"
        );
    }

    #[test]
    fn should_fail_on_missing_translation_when_strict() {
        let bundle = TranslationBundle::new(MissingTranslationStrategy::Error).with_locale("de");
        let err = merge_translations(
            &parse("<p i18n>Hello</p>"),
            &bundle,
            &ExtractorConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, I18nError::MissingTranslation { .. }));
    }

    #[test]
    fn should_reject_incompatible_translation() {
        let html = "<p i18n>Hello</p>";
        let source = source_message(html);
        let mut bundle = TranslationBundle::default();
        bundle.insert(source.id(), html_translation("Hallo {{name}}"));

        let err = merge_translations(&parse(html), &bundle, &ExtractorConfig::default())
            .unwrap_err();
        assert!(matches!(err, I18nError::IncompatibleTranslation { .. }));

        let lenient = ExtractorConfig::default().with_error_policy(ErrorPolicy::Skip);
        assert_eq!(
            merge_translations(&parse(html), &bundle, &lenient).unwrap(),
            "<p>Hello</p>"
        );
    }

    #[test]
    fn should_merge_pseudo_translation_with_embedded_attributes() {
        let html = r#"<p i18n>See <img alt="Cat" i18n-alt></p>"#;
        let config = ExtractorConfig::default();
        let result = extract_messages(&parse(html), &config).unwrap();
        let mut bundle = TranslationBundle::default();
        for message in result.messages.values() {
            bundle.add(pseudo_translate(message));
        }
        assert_eq!(
            merge(html, &bundle),
            "<p>See S\u{308}e\u{308}e\u{308} <img alt=\"Cat C\u{308}a\u{308}t\u{308}\"></p>"
        );
    }

    #[test]
    fn should_leave_unmarked_documents_alone() {
        let html = r#"<div class="a"><p>1 &lt; 2</p><br><script>if (a < b) {}</script></div>"#;
        assert_eq!(merge(html, &TranslationBundle::default()), html);
    }

    #[test]
    fn should_escape_title_and_textarea_text_on_merge() {
        let html = "<title>A &amp; B</title><textarea>&lt;b&gt;</textarea><style>a > b {}</style>";
        assert_eq!(merge(html, &TranslationBundle::default()), html);
    }
}
