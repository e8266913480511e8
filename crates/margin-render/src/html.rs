//! Small HTML writing helpers shared by the renderer.

use margin_djot::Attributes;
use margin_highlight::push_escaped;

/// Append ` key="value"` for every attribute.
pub fn push_attrs(out: &mut String, attrs: &Attributes) {
    for (key, value) in attrs.iter() {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        push_escaped(out, value);
        out.push('"');
    }
}

/// `<tag attrs>` without a trailing newline.
pub fn open_tag(tag: &str, attrs: &Attributes) -> String {
    let mut out = format!("<{tag}");
    push_attrs(&mut out, attrs);
    out.push('>');
    out
}

/// Block container: the opening and closing tags sit on their own lines.
pub fn block(tag: &str, attrs: &Attributes, inner: &str) -> String {
    format!("{}\n{inner}</{tag}>\n", open_tag(tag, attrs))
}

/// Block leaf: content inline with the tags, newline after.
pub fn leaf(tag: &str, attrs: &Attributes, inner: &str) -> String {
    format!("{}{inner}</{tag}>\n", open_tag(tag, attrs))
}

/// Inline element.
pub fn inline(tag: &str, attrs: &Attributes, inner: &str) -> String {
    format!("{}{inner}</{tag}>", open_tag(tag, attrs))
}

/// Attributes led by a fixed `class`, followed by `attrs` minus `class` and `skip`.
pub fn with_leading_class(class: &str, attrs: &Attributes, skip: &[&str]) -> Attributes {
    let mut out = Attributes::new();
    out.insert("class", class);
    for (key, value) in attrs.iter() {
        if key != "class" && !skip.contains(&key) {
            out.insert(key, value);
        }
    }
    out
}
