//! Chapter markup as a tree of typed nodes.
//!
//! EPUB chapters arrive as XHTML-ish tag soup. We parse them into a small
//! closed element set so the renderer can match exhaustively, and we keep the
//! parser lenient: unknown tags become [`Tag::Other`], stray close tags are
//! ignored, and anything the event reader chokes on is reported to the caller
//! so it can fall back to plain-text extraction.

use quick_xml::events::Event;
use quick_xml::Reader;

/// The element vocabulary the renderer understands.
///
/// Everything else maps to [`Tag::Other`], which renders transparently
/// (children only, no context change).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tag {
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    P,
    Blockquote,
    Pre,
    Code,
    Em,
    Strong,
    Br,
    Hr,
    Ul,
    Ol,
    Li,
    Div,
    Span,
    A,
    Other,
}

impl Tag {
    /// Maps a (lowercased, namespace-stripped) element name to a tag.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "h1" => Tag::H1,
            "h2" => Tag::H2,
            "h3" => Tag::H3,
            "h4" => Tag::H4,
            "h5" => Tag::H5,
            "h6" => Tag::H6,
            "p" => Tag::P,
            "blockquote" => Tag::Blockquote,
            "pre" => Tag::Pre,
            "code" => Tag::Code,
            "em" | "i" => Tag::Em,
            "strong" | "b" => Tag::Strong,
            "br" => Tag::Br,
            "hr" => Tag::Hr,
            "ul" => Tag::Ul,
            "ol" => Tag::Ol,
            "li" => Tag::Li,
            "div" => Tag::Div,
            "span" => Tag::Span,
            "a" => Tag::A,
            _ => Tag::Other,
        }
    }

    /// Heading depth for `h1`..`h6`, `None` for everything else.
    #[must_use]
    pub fn heading_level(self) -> Option<u8> {
        match self {
            Tag::H1 => Some(1),
            Tag::H2 => Some(2),
            Tag::H3 => Some(3),
            Tag::H4 => Some(4),
            Tag::H5 => Some(5),
            Tag::H6 => Some(6),
            _ => None,
        }
    }

    /// Elements that never carry children (`<br>`, `<hr>` written without a
    /// close tag).
    fn is_void(self) -> bool {
        matches!(self, Tag::Br | Tag::Hr)
    }
}

/// One node of a parsed chapter. Owned by the render pass that consumes it.
#[derive(Clone, PartialEq, Debug)]
pub enum Node {
    /// Root of a parsed chapter.
    Document(Vec<Node>),
    /// An element with its ordered children.
    Element {
        /// Which element this is.
        tag: Tag,
        /// Children in document order.
        children: Vec<Node>,
    },
    /// A run of character data, whitespace preserved as parsed.
    Text(String),
}

struct Frame {
    tag: Tag,
    name: String,
    children: Vec<Node>,
}

/// Parses chapter markup into a [`Node::Document`].
///
/// # Errors
///
/// Returns the underlying reader error when the input is not tokenizable at
/// all; callers degrade to [`strip_markup`] in that case.
pub fn parse(markup: &str) -> Result<Node, quick_xml::Error> {
    let mut reader = Reader::from_str(markup);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Vec<Node> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = local_name(e.name().as_ref());
                let tag = Tag::from_name(&name);
                if tag.is_void() {
                    append(
                        &mut stack,
                        &mut root,
                        Node::Element {
                            tag,
                            children: Vec::new(),
                        },
                    );
                } else {
                    stack.push(Frame {
                        tag,
                        name,
                        children: Vec::new(),
                    });
                }
            }
            Ok(Event::Empty(e)) => {
                let tag = Tag::from_name(&local_name(e.name().as_ref()));
                append(
                    &mut stack,
                    &mut root,
                    Node::Element {
                        tag,
                        children: Vec::new(),
                    },
                );
            }
            Ok(Event::End(e)) => {
                let name = local_name(e.name().as_ref());
                // Close intervening unclosed frames too; ignore a close tag
                // that matches nothing open.
                if let Some(pos) = stack.iter().rposition(|f| f.name == name) {
                    while stack.len() > pos {
                        let frame = stack.pop().unwrap_or_else(|| unreachable!());
                        let node = Node::Element {
                            tag: frame.tag,
                            children: frame.children,
                        };
                        append(&mut stack, &mut root, node);
                    }
                }
            }
            Ok(Event::Text(t)) => {
                let text = String::from_utf8_lossy(t.as_ref()).into_owned();
                if !text.is_empty() {
                    append(&mut stack, &mut root, Node::Text(text));
                }
            }
            Ok(Event::GeneralRef(e)) => {
                let resolved = match e.resolve_char_ref() {
                    Ok(Some(c)) => c.to_string(),
                    _ => resolve_entity(&String::from_utf8_lossy(e.as_ref())),
                };
                append(&mut stack, &mut root, Node::Text(resolved));
            }
            Ok(Event::CData(t)) => {
                let text = String::from_utf8_lossy(t.as_ref()).into_owned();
                if !text.is_empty() {
                    append(&mut stack, &mut root, Node::Text(text));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(e),
        }
    }

    // Unclosed elements at EOF still become part of the tree.
    while let Some(frame) = stack.pop() {
        let node = Node::Element {
            tag: frame.tag,
            children: frame.children,
        };
        append(&mut stack, &mut root, node);
    }

    Ok(Node::Document(root))
}

/// Appends a node to the innermost open element (or the document root),
/// coalescing adjacent text runs so entity references do not split words.
fn append(stack: &mut Vec<Frame>, root: &mut Vec<Node>, node: Node) {
    let children = match stack.last_mut() {
        Some(frame) => &mut frame.children,
        None => root,
    };
    if let Node::Text(ref s) = node {
        if let Some(Node::Text(prev)) = children.last_mut() {
            prev.push_str(s);
            return;
        }
    }
    children.push(node);
}

fn local_name(raw: &[u8]) -> String {
    let name = String::from_utf8_lossy(raw).to_ascii_lowercase();
    match name.rsplit_once(':') {
        Some((_, local)) => local.to_string(),
        None => name,
    }
}

/// Resolves the named entities that show up in real book markup. Unknown
/// names are kept literally so no text is silently dropped.
pub(crate) fn resolve_entity(name: &str) -> String {
    let known = match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => "\u{a0}",
        "shy" => "",
        "mdash" => "\u{2014}",
        "ndash" => "\u{2013}",
        "hellip" => "\u{2026}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "laquo" => "\u{ab}",
        "raquo" => "\u{bb}",
        "copy" => "\u{a9}",
        "reg" => "\u{ae}",
        "trade" => "\u{2122}",
        "deg" => "\u{b0}",
        "middot" => "\u{b7}",
        "bull" => "\u{2022}",
        _ => return format!("&{name};"),
    };
    known.to_string()
}

/// Line-oriented plain-text extraction used when structured parsing fails or
/// produces nothing visible. Block-level close tags become line breaks, all
/// other tags are stripped, and blank lines are collapsed.
#[must_use]
pub fn strip_markup(markup: &str) -> String {
    let mut result = markup.to_string();

    let block_closers = [
        "</p>", "</div>", "</h1>", "</h2>", "</h3>", "</h4>", "</h5>", "</h6>", "<br>", "<br/>",
        "</li>",
    ];
    for closer in block_closers {
        result = result.replace(closer, &format!("{closer}\n"));
    }

    let stripped = strip_tags(&result);

    let cleaned: Vec<&str> = stripped
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    cleaned.join("\n\n")
}

/// Removes everything between `<` and `>`, keeping the rest verbatim.
#[must_use]
pub fn strip_tags(markup: &str) -> String {
    let mut in_tag = false;
    let mut result = String::with_capacity(markup.len());

    for c in markup.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }

    result
}

#[cfg(test)]
#[path = "tests/markup.rs"]
mod tests;
