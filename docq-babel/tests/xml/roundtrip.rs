//! Decoding the output of the encoder gives back the tree that was encoded, comments
//! included once the first decode has settled them into their slots.

use docq_babel::tree::CompareOptions;
use docq_babel::{EncoderPreferences, FormatRegistry, Preferences};
use proptest::prelude::*;

#[derive(Debug, Clone)]
struct Element {
    name: &'static str,
    attributes: Vec<(&'static str, String)>,
    text: Option<String>,
    children: Vec<Element>,
    head: Option<String>,
    inner: Option<String>,
    foot: Option<String>,
}

fn render_comment(comment: &Option<String>, out: &mut String) {
    if let Some(comment) = comment {
        out.push_str(&format!("<!-- {comment} -->"));
    }
}

impl Element {
    fn render(&self, out: &mut String) {
        render_comment(&self.head, out);
        out.push('<');
        out.push_str(self.name);
        for (name, value) in &self.attributes {
            out.push_str(&format!(" {name}=\"{value}\""));
        }
        out.push('>');
        render_comment(&self.inner, out);
        if let Some(text) = &self.text {
            out.push_str(text);
        }
        for child in &self.children {
            child.render(out);
        }
        out.push_str("</");
        out.push_str(self.name);
        out.push('>');
        render_comment(&self.foot, out);
    }
}

fn words() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z0-9]{1,4}", 1..3).prop_map(|words| words.join(" "))
}

/// Head, inner and foot comments, each present now and then.
fn comments() -> impl Strategy<Value = (Option<String>, Option<String>, Option<String>)> {
    let comment = || prop::option::weighted(0.3, words());
    (comment(), comment(), comment())
}

fn element() -> impl Strategy<Value = Element> {
    let name = prop::sample::select(vec!["a", "b", "c"]).boxed();
    let attributes = prop::sample::subsequence(vec!["x", "y"], 0..=2)
        .prop_flat_map(|names| {
            let count = names.len();
            (Just(names), prop::collection::vec(words(), count))
        })
        .prop_map(|(names, values)| names.into_iter().zip(values).collect::<Vec<_>>())
        .boxed();
    let leaf = (
        name.clone(),
        attributes.clone(),
        prop::option::of(words()),
        comments(),
    )
        .prop_map(|(name, attributes, text, (head, inner, foot))| Element {
            name,
            attributes,
            text,
            children: Vec::new(),
            head,
            inner,
            foot,
        });
    leaf.prop_recursive(3, 24, 4, move |child| {
        (
            name.clone(),
            attributes.clone(),
            prop::option::of(words()),
            prop::collection::vec(child, 0..4),
            comments(),
        )
            .prop_map(
                |(name, attributes, text, children, (head, inner, foot))| Element {
                    name,
                    attributes,
                    text,
                    children,
                    head,
                    inner,
                    foot,
                },
            )
    })
}

proptest! {
    #[test]
    fn decode_encode_decode_is_stable(
        roots in prop::collection::vec(element(), 1..3),
        indent in 0usize..3,
    ) {
        let mut xml = String::new();
        for root in &roots {
            root.render(&mut xml);
        }

        let registry = FormatRegistry::with_defaults();
        let prefs = Preferences::default();
        let first = registry.decode_all(&xml, "xml", &prefs).unwrap();
        let encoded = registry
            .encode_all(&first, &EncoderPreferences::new("xml").with_indent(indent), &prefs)
            .unwrap();
        let second = registry.decode_all(&encoded, "xml", &prefs).unwrap();

        prop_assert_eq!(first.len(), 1);
        prop_assert_eq!(second.len(), 1);
        prop_assert!(
            first[0].tree.same_shape(
                first[0].root,
                &second[0].tree,
                second[0].root,
                CompareOptions::default(),
            ),
            "{} re-encoded as {}",
            xml,
            encoded
        );
    }
}
