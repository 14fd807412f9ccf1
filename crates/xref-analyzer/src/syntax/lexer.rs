use std::ops::Range;

use logos::Logos;

/// Raw C-family token kinds used for spelled-token buffers and prefix scans.
///
/// Only the keywords the resolvers inspect get their own variant; every other
/// reserved word lexes as [`TokenKind::Keyword`].
#[derive(Logos, Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[logos(error = ())]
pub enum TokenKind {
    #[regex(r"[ \t\r\n\f]+")]
    #[regex(r"\\\r?\n")]
    Whitespace,

    #[regex(r"//.*", allow_greedy = true)]
    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    Comment,

    #[token("##")]
    HashHash,
    #[token("#")]
    Hash,

    #[token("::")]
    ColonColon,
    #[token(":")]
    Colon,
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,
    #[token("->")]
    Arrow,
    #[token(".")]
    Period,
    #[token("~")]
    Tilde,
    #[token("@")]
    At,
    #[regex(r"[-+*/%=!&|^?]=?")]
    #[token("<<")]
    #[token(">>")]
    #[token("<=")]
    #[token(">=")]
    #[token("&&")]
    #[token("||")]
    #[token("++")]
    #[token("--")]
    #[token("...")]
    #[token("->*")]
    #[token(".*")]
    Operator,

    #[token("auto")]
    KwAuto,
    #[token("decltype")]
    KwDecltype,
    #[token("namespace")]
    KwNamespace,
    #[token("using")]
    KwUsing,
    #[token("inline")]
    KwInline,
    #[token("alignas")]
    #[token("alignof")]
    #[token("asm")]
    #[token("bool")]
    #[token("break")]
    #[token("case")]
    #[token("catch")]
    #[token("char")]
    #[token("class")]
    #[token("const")]
    #[token("consteval")]
    #[token("constexpr")]
    #[token("constinit")]
    #[token("const_cast")]
    #[token("continue")]
    #[token("default")]
    #[token("delete")]
    #[token("do")]
    #[token("double")]
    #[token("dynamic_cast")]
    #[token("else")]
    #[token("enum")]
    #[token("explicit")]
    #[token("export")]
    #[token("extern")]
    #[token("false")]
    #[token("float")]
    #[token("for")]
    #[token("friend")]
    #[token("goto")]
    #[token("if")]
    #[token("int")]
    #[token("long")]
    #[token("mutable")]
    #[token("new")]
    #[token("noexcept")]
    #[token("nullptr")]
    #[token("operator")]
    #[token("private")]
    #[token("protected")]
    #[token("public")]
    #[token("register")]
    #[token("reinterpret_cast")]
    #[token("return")]
    #[token("short")]
    #[token("signed")]
    #[token("sizeof")]
    #[token("static")]
    #[token("static_assert")]
    #[token("static_cast")]
    #[token("struct")]
    #[token("switch")]
    #[token("template")]
    #[token("this")]
    #[token("thread_local")]
    #[token("throw")]
    #[token("true")]
    #[token("try")]
    #[token("typedef")]
    #[token("typeid")]
    #[token("typename")]
    #[token("union")]
    #[token("unsigned")]
    #[token("virtual")]
    #[token("void")]
    #[token("volatile")]
    #[token("wchar_t")]
    #[token("while")]
    #[token("concept")]
    #[token("requires")]
    #[token("co_await")]
    #[token("co_return")]
    #[token("co_yield")]
    Keyword,

    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*")]
    Identifier,
    #[regex(r#"(u8|u|U|L)?'([^'\\\n]|\\.)*'"#)]
    CharLiteral,
    #[regex(r#"(u8|u|U|L)?"([^"\\\n]|\\.)*""#)]
    #[regex(r#"(u8|u|U|L)?R"\(([^)]|\)[^"])*\)""#)]
    StringLiteral,
    #[regex(r"[0-9][0-9a-zA-Z_.']*")]
    #[regex(r"\.[0-9][0-9a-zA-Z_.']*")]
    Number,

    Unknown,
}

impl TokenKind {
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::Comment)
    }

    pub fn is_string_literal(self) -> bool {
        matches!(self, TokenKind::StringLiteral)
    }

    /// Identifier-shaped keywords: words whose spelling would otherwise lex as an identifier.
    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::Keyword
                | TokenKind::KwAuto
                | TokenKind::KwDecltype
                | TokenKind::KwNamespace
                | TokenKind::KwUsing
                | TokenKind::KwInline
        )
    }
}

/// A lexer that wraps `logos::Lexer` to produce kinds with byte spans.
pub struct Lexer<'a> {
    inner: logos::SpannedIter<'a, TokenKind>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: TokenKind::lexer(input).spanned(),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = (TokenKind, Range<usize>);

    fn next(&mut self) -> Option<Self::Item> {
        let (token_result, span) = self.inner.next()?;
        let kind = token_result.unwrap_or(TokenKind::Unknown);
        Some((kind, span))
    }
}

/// Lexes `input`, dropping whitespace and comments.
pub fn significant_tokens(input: &str) -> impl Iterator<Item = (TokenKind, Range<usize>)> + '_ {
    Lexer::new(input).filter(|(kind, _)| !kind.is_trivia())
}

/// Whether `word` spells a reserved word rather than an identifier.
pub fn is_keyword_spelling(word: &str) -> bool {
    let mut lexer = Lexer::new(word);
    match (lexer.next(), lexer.next()) {
        (Some((kind, span)), None) => span.len() == word.len() && kind.is_keyword(),
        _ => false,
    }
}

#[cfg(test)]
#[path = "../../tests/src/syntax/lexer_tests.rs"]
mod tests;
