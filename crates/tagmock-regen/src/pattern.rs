use rand::Rng;
use rand::distr::Distribution;
use regex_syntax::ast::{
    self, AssertionKind, Ast, ClassAscii, ClassAsciiKind, ClassBracketed, ClassPerlKind, ClassSet,
    ClassSetItem, RepetitionKind, RepetitionRange,
};
use regex_syntax::hir::{self, Hir, HirKind, translate::Translator};

use crate::DEFAULT_MAX_REPEAT;
use crate::errors::PatternError;

const PRINTABLE_MIN: u8 = 32;
const PRINTABLE_MAX: u8 = 126;
const NON_WORD: &[u8] = b" !\"#$%&'()*+,-./:;<=>?@[\\]^`{|}~";
const SURROGATE_LOW: u32 = 0xD800;
const SURROGATE_HIGH: u32 = 0xDFFF;
const WORD: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz_";

#[derive(Debug, Clone)]
enum Node {
    Empty,
    Literal(char),
    Star(Box<Node>),
    Quest(Box<Node>),
    Plus(Box<Node>),
    Repeat {
        min: u32,
        max: Option<u32>,
        sub: Box<Node>,
    },
    Class(Vec<(char, char)>),
    Concat(Vec<Node>),
    Alternate(Vec<Node>),
    AnyChar,
    WordBoundary,
    NoWordBoundary,
}

/// A compiled pattern that produces matching strings.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    root: Node,
    max_repeat: u32,
}

impl Pattern {
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        let ast = ast::parse::Parser::new().parse(pattern)?;
        let root = lower(pattern, &ast)?;
        Ok(Self {
            source: pattern.to_string(),
            root,
            max_repeat: DEFAULT_MAX_REPEAT,
        })
    }

    /// Overrides the bound used for `*`, `+` and `{m,}`. Clamped to at least 1.
    pub fn with_max_repeat(mut self, max_repeat: u32) -> Self {
        self.max_repeat = max_repeat.max(1);
        self
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let mut out = String::new();
        emit(&self.root, self.max_repeat, rng, &mut out);
        out
    }
}

impl Distribution<String> for Pattern {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        self.generate(rng)
    }
}

fn lower(pattern: &str, ast: &Ast) -> Result<Node, PatternError> {
    let node = match ast {
        Ast::Empty(_) | Ast::Flags(_) => Node::Empty,
        Ast::Literal(literal) => Node::Literal(literal.c),
        Ast::Dot(_) => Node::AnyChar,
        Ast::Assertion(assertion) => match assertion.kind {
            AssertionKind::WordBoundary => Node::WordBoundary,
            AssertionKind::NotWordBoundary => Node::NoWordBoundary,
            _ => Node::Empty,
        },
        Ast::ClassPerl(class) => {
            let item = ClassSetItem::Perl(ast::ClassPerl::clone(class));
            Node::Class(class_ranges(pattern, class.span, false, ClassSet::Item(item))?)
        }
        Ast::ClassUnicode(class) => {
            let item = ClassSetItem::Unicode(ast::ClassUnicode::clone(class));
            Node::Class(class_ranges(pattern, class.span, false, ClassSet::Item(item))?)
        }
        Ast::ClassBracketed(class) => Node::Class(class_ranges(
            pattern,
            class.span,
            class.negated,
            class.kind.clone(),
        )?),
        Ast::Repetition(repetition) => {
            let sub = Box::new(lower(pattern, &repetition.ast)?);
            match &repetition.op.kind {
                RepetitionKind::ZeroOrOne => Node::Quest(sub),
                RepetitionKind::ZeroOrMore => Node::Star(sub),
                RepetitionKind::OneOrMore => Node::Plus(sub),
                RepetitionKind::Range(RepetitionRange::Exactly(n)) => Node::Repeat {
                    min: *n,
                    max: Some(*n),
                    sub,
                },
                RepetitionKind::Range(RepetitionRange::AtLeast(min)) => Node::Repeat {
                    min: *min,
                    max: None,
                    sub,
                },
                RepetitionKind::Range(RepetitionRange::Bounded(min, max)) => Node::Repeat {
                    min: *min,
                    max: Some(*max),
                    sub,
                },
            }
        }
        Ast::Group(group) => lower(pattern, &group.ast)?,
        Ast::Alternation(alternation) => Node::Alternate(
            alternation
                .asts
                .iter()
                .map(|ast| lower(pattern, ast))
                .collect::<Result<_, _>>()?,
        ),
        Ast::Concat(concat) => Node::Concat(
            concat
                .asts
                .iter()
                .map(|ast| lower(pattern, ast))
                .collect::<Result<_, _>>()?,
        ),
    };
    Ok(node)
}

/// Resolves a class into inclusive char ranges. Perl classes use ASCII
/// semantics; everything else goes through the `regex-syntax` translator.
fn class_ranges(
    pattern: &str,
    span: ast::Span,
    negated: bool,
    mut set: ClassSet,
) -> Result<Vec<(char, char)>, PatternError> {
    asciify(&mut set);
    let class = Ast::class_bracketed(ClassBracketed {
        span,
        negated,
        kind: set,
    });
    let hir = Translator::new()
        .translate(pattern, &class)
        .map_err(|err| PatternError::Class(err.to_string()))?;
    Ok(hir_ranges(&hir))
}

fn asciify(set: &mut ClassSet) {
    match set {
        ClassSet::Item(item) => asciify_item(item),
        ClassSet::BinaryOp(op) => {
            asciify(&mut op.lhs);
            asciify(&mut op.rhs);
        }
    }
}

fn asciify_item(item: &mut ClassSetItem) {
    match item {
        ClassSetItem::Perl(perl) => {
            let kind = match perl.kind {
                ClassPerlKind::Digit => ClassAsciiKind::Digit,
                ClassPerlKind::Space => ClassAsciiKind::Space,
                ClassPerlKind::Word => ClassAsciiKind::Word,
            };
            let ascii = ClassAscii {
                span: perl.span,
                kind,
                negated: perl.negated,
            };
            *item = ClassSetItem::Ascii(ascii);
        }
        ClassSetItem::Bracketed(inner) => asciify(&mut inner.kind),
        ClassSetItem::Union(union) => union.items.iter_mut().for_each(asciify_item),
        _ => {}
    }
}

fn hir_ranges(hir: &Hir) -> Vec<(char, char)> {
    match hir.kind() {
        HirKind::Class(hir::Class::Unicode(class)) => class
            .ranges()
            .iter()
            .map(|range| (range.start(), range.end()))
            .collect(),
        HirKind::Class(hir::Class::Bytes(class)) => class
            .ranges()
            .iter()
            .map(|range| (char::from(range.start()), char::from(range.end())))
            .collect(),
        // single-member classes are folded into literals by the translator
        HirKind::Literal(hir::Literal(bytes)) => std::str::from_utf8(bytes)
            .ok()
            .and_then(|text| text.chars().next())
            .map(|ch| vec![(ch, ch)])
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn emit<R: Rng + ?Sized>(node: &Node, max_repeat: u32, rng: &mut R, out: &mut String) {
    match node {
        Node::Empty => {}
        Node::Literal(ch) => out.push(*ch),
        Node::Star(sub) => {
            let times = rng.random_range(0..max_repeat);
            emit_times(sub, times, max_repeat, rng, out);
        }
        Node::Quest(sub) => {
            let times = rng.random_range(0..=1);
            emit_times(sub, times, max_repeat, rng, out);
        }
        Node::Plus(sub) => {
            let times = 1 + rng.random_range(0..max_repeat);
            emit_times(sub, times, max_repeat, rng, out);
        }
        Node::Repeat { min, max, sub } => {
            let max = max.unwrap_or_else(|| min.saturating_add(max_repeat));
            let times = rng.random_range(*min..=max);
            emit_times(sub, times, max_repeat, rng, out);
        }
        Node::Class(ranges) => {
            if ranges.is_empty() {
                return;
            }
            let (start, end) = ranges[rng.random_range(0..ranges.len())];
            out.push(pick_char(start, end, rng));
        }
        Node::Concat(nodes) => {
            for sub in nodes {
                emit(sub, max_repeat, rng, out);
            }
        }
        Node::Alternate(nodes) => {
            if nodes.is_empty() {
                return;
            }
            let branch = &nodes[rng.random_range(0..nodes.len())];
            emit(branch, max_repeat, rng, out);
        }
        Node::AnyChar => {
            out.push(char::from(rng.random_range(PRINTABLE_MIN..=PRINTABLE_MAX)));
        }
        Node::WordBoundary => out.push(pick_byte(NON_WORD, rng)),
        Node::NoWordBoundary => out.push(pick_byte(WORD, rng)),
    }
}

fn emit_times<R: Rng + ?Sized>(
    node: &Node,
    times: u32,
    max_repeat: u32,
    rng: &mut R,
    out: &mut String,
) {
    for _ in 0..times {
        emit(node, max_repeat, rng, out);
    }
}

/// Uniform scalar value in `start..=end`. A range spanning the surrogate
/// block is drawn over its scalar values only.
fn pick_char<R: Rng + ?Sized>(start: char, end: char, rng: &mut R) -> char {
    let (low, high) = (u32::from(start), u32::from(end));
    let gap = if low < SURROGATE_LOW && high > SURROGATE_HIGH {
        SURROGATE_HIGH - SURROGATE_LOW + 1
    } else {
        0
    };
    let mut code = rng.random_range(low..=high - gap);
    if gap > 0 && code >= SURROGATE_LOW {
        code += gap;
    }
    char::from_u32(code).unwrap_or(start)
}

fn pick_byte<R: Rng + ?Sized>(set: &[u8], rng: &mut R) -> char {
    char::from(set[rng.random_range(0..set.len())])
}
