//! Template tokenizer.
//!
//! Splits raw template text into an alternating sequence of literal
//! text chunks and tag tokens for one configurable delimiter character.
//! Concatenating the chunk texts in order reproduces the input exactly;
//! the compiler relies on that to keep line numbers honest.

/// Tag token kinds, parameterized by the configured delimiter `D`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    /// `<D` opens a statement directive.
    OpenEval,
    /// `<D_` opens a statement directive and slurps preceding spaces/tabs.
    OpenSlurp,
    /// `<D=` opens an escaped-output directive.
    OpenEscaped,
    /// `<D-` opens a raw-output directive.
    OpenRaw,
    /// `<D#` opens a comment directive.
    OpenComment,
    /// `<DD` emits a literal `<D`.
    OpenLiteral,
    /// `D>` closes the open directive.
    Close,
    /// `-D>` closes and suppresses one trailing line terminator.
    CloseTrim,
    /// `_D>` closes and slurps following spaces/tabs.
    CloseSlurp,
}

impl Tag {
    /// Every tag kind, three-character tokens first. Match order matters:
    /// `<DD` is a prefix extension of `<D` and must win at the same
    /// position, likewise `-D>`/`_D>` over `D>`.
    pub const ALL: [Tag; 9] = [
        Tag::OpenLiteral,
        Tag::OpenSlurp,
        Tag::OpenEscaped,
        Tag::OpenRaw,
        Tag::OpenComment,
        Tag::CloseTrim,
        Tag::CloseSlurp,
        Tag::OpenEval,
        Tag::Close,
    ];

    /// The literal token text for this tag under delimiter `d`.
    pub fn text(self, d: char) -> String {
        match self {
            Tag::OpenEval => format!("<{d}"),
            Tag::OpenSlurp => format!("<{d}_"),
            Tag::OpenEscaped => format!("<{d}="),
            Tag::OpenRaw => format!("<{d}-"),
            Tag::OpenComment => format!("<{d}#"),
            Tag::OpenLiteral => format!("<{d}{d}"),
            Tag::Close => format!("{d}>"),
            Tag::CloseTrim => format!("-{d}>"),
            Tag::CloseSlurp => format!("_{d}>"),
        }
    }

    pub fn is_open(self) -> bool {
        matches!(
            self,
            Tag::OpenEval
                | Tag::OpenSlurp
                | Tag::OpenEscaped
                | Tag::OpenRaw
                | Tag::OpenComment
                | Tag::OpenLiteral
        )
    }

    pub fn is_close(self) -> bool {
        matches!(self, Tag::Close | Tag::CloseTrim | Tag::CloseSlurp)
    }
}

/// One tokenizer output: a literal run of template text or a tag token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chunk<'a> {
    Text(&'a str),
    Tag(Tag),
}

/// Lazy tokenizer over one template string.
///
/// Leftmost match wins; at equal positions the three-character tokens
/// are tried before their two-character prefixes. Empty text chunks are
/// never yielded.
pub struct TokenStream<'a> {
    source: &'a str,
    pos: usize,
    tokens: Vec<(String, Tag)>,
}

impl<'a> TokenStream<'a> {
    pub fn new(source: &'a str, delimiter: char) -> Self {
        let tokens = Tag::ALL
            .iter()
            .map(|&tag| (tag.text(delimiter), tag))
            .collect();
        Self {
            source,
            pos: 0,
            tokens,
        }
    }

    fn tag_at(&self, pos: usize) -> Option<(usize, Tag)> {
        let rest = &self.source[pos..];
        self.tokens
            .iter()
            .find(|(text, _)| rest.starts_with(text.as_str()))
            .map(|(text, tag)| (text.len(), *tag))
    }
}

impl<'a> Iterator for TokenStream<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Chunk<'a>> {
        let source = self.source;
        if self.pos >= source.len() {
            return None;
        }
        for (offset, _) in source[self.pos..].char_indices() {
            let at = self.pos + offset;
            if let Some((len, tag)) = self.tag_at(at) {
                if at > self.pos {
                    let text = &source[self.pos..at];
                    self.pos = at;
                    return Some(Chunk::Text(text));
                }
                self.pos = at + len;
                return Some(Chunk::Tag(tag));
            }
        }
        let text = &source[self.pos..];
        self.pos = source.len();
        Some(Chunk::Text(text))
    }
}
