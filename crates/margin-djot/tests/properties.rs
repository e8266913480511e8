//! Property-based tests for document metrics.

use margin_djot::{slugify, table_of_contents, Doc, Node, NodeKind, ReadingStats};
use proptest::prelude::*;

proptest! {
    /// Adding words, images or code blocks never lowers the estimate.
    #[test]
    fn reading_time_is_monotonic(
        words in 0usize..5000,
        images in 0usize..50,
        code_blocks in 0usize..50,
        extra in 1usize..500,
    ) {
        let base = ReadingStats { words, images, code_blocks };

        let more_words = ReadingStats { words: words + extra, ..base };
        let more_images = ReadingStats { images: images + extra, ..base };
        let more_code = ReadingStats { code_blocks: code_blocks + extra, ..base };

        prop_assert!(more_words.minutes() >= base.minutes());
        prop_assert!(more_images.minutes() >= base.minutes());
        prop_assert!(more_code.minutes() >= base.minutes());
    }

    /// Slugs only contain word characters and single interior hyphens.
    #[test]
    fn slugs_are_url_safe(text in "\\PC{0,80}") {
        let slug = slugify(&text);

        prop_assert!(!slug.starts_with('-'));
        prop_assert!(!slug.ends_with('-'));
        prop_assert!(!slug.contains("--"));
        prop_assert!(!slug.chars().any(char::is_whitespace));
    }

    /// Identical heading text yields identical ids wherever it appears.
    #[test]
    fn toc_ids_are_deterministic(title in "[A-Za-z][A-Za-z0-9 ,.!?()-]{0,40}") {
        let heading = |level| {
            Node::new(NodeKind::Heading { level }).with_children(vec![Node::str(title.clone())])
        };
        let doc = Doc::new(vec![
            heading(2),
            Node::new(NodeKind::Section).with_children(vec![heading(4)]),
        ]);

        let toc = table_of_contents(&doc);

        prop_assert_eq!(toc.titles.len(), 2);
        prop_assert_eq!(&toc.titles[0].id, &toc.titles[1].id);
        prop_assert_eq!(&toc.titles[0].id, &slugify(title.trim()));
    }
}
