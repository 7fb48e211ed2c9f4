//! Per-line statement classification.
//!
//! Order matters: function declaration, loop, conditional, variable
//! declaration, call, return. The first matching rule wins.

use crate::core::{ContainerKind, IterationPattern, LoopKind, NodeKind};
use once_cell::sync::Lazy;
use regex::Regex;

static KEYWORD_FN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:pub(?:\([^)]*\))?\s+)?(?:export\s+)?(?:async\s+)?(?:unsafe\s+)?(?:const\s+)?(?:fn|def|function|func)\s+([A-Za-z_]\w*)",
    )
    .unwrap()
});

static C_STYLE_FN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:(?:static|inline|public|private|protected|virtual|final|synchronized|override|extern)\s+)*[A-Za-z_][\w:<>,\[\]]*(?:\s*[*&]+\s*|\s+)([A-Za-z_]\w*)\s*\([^;]*\)\s*(?:const\s*)?(?:throws\s+[\w,\s]+)?\{?\s*$",
    )
    .unwrap()
});

static ARROW_FN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:export\s+)?(?:const|let|var)\s+([A-Za-z_]\w*)\s*=\s*(?:async\s*)?(?:\([^)]*\)|[A-Za-z_]\w*)\s*=>")
        .unwrap()
});

static LOOP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\}\s*)?(for|while|loop|do)\b").unwrap());

static CONDITIONAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\}\s*)?(?:else\s+)?(if|elif|switch|match)\b").unwrap());

static VARIABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:let\s+(?:mut\s+)?|var\s+|const\s+|auto\s*[&*]?\s+|(?:unsigned\s+)?(?:int|long|short|float|double|char|bool|boolean|size_t|usize|String|string)\s*[*&]?\s+|(?:std::)?(?:vector|map|unordered_map|set|unordered_set|deque|queue|stack|list|priority_queue|pair)\s*<.*>\s*[&*]?\s*|(?:List|ArrayList|Map|HashMap|Set|HashSet|Deque|ArrayDeque|Queue)\s*<.*>\s+)([A-Za-z_]\w*)",
    )
    .unwrap()
});

static ASSIGNMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z_]\w*)\s*(?::\s*[\w\[\], .]+)?\s*=\s*[^=]").unwrap()
});

static CALL: Lazy<Regex> = Lazy::new(|| Regex::new(r"([A-Za-z_]\w*)\s*\(").unwrap());

static RETURN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^return\b").unwrap());

static MATRIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[\s*\[|vec!\[\s*vec!|vector\s*<\s*vector|\]\s*\[[^\]]*\]\s*(?:=|;)|\w+\[\]\[\]")
        .unwrap()
});

static MAP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"HashMap|BTreeMap|unordered_map|\bmap\s*<|\bMap\s*<|\bdict\s*\(|=\s*\{\s*\}|defaultdict|new\s+Map\b|Counter\(")
        .unwrap()
});

static SET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"HashSet|BTreeSet|unordered_set|\bset\s*<|\bSet\s*<|\bset\s*\(|new\s+Set\b").unwrap()
});

static SEQUENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"vec!|Vec::|Vec<|\bvector\s*<|ArrayList|LinkedList|VecDeque|\bdeque\s*[<(]|\blist\s*\(|=\s*\[|new\s+\w+\s*\[|new\s+Array|\.to_vec\(\)|\.collect\b|\b\w+\[\s*\w*\s*:\s*\w*\s*\]|\[\s*\w*\s*\.\.\s*\w*\s*\]\.to|^[\w:<>]+\s+\w+\s*\[[^\]]*\]\s*(?:=|;)|\.copy\(\)|\.slice\(",
    )
    .unwrap()
});

const CONTROL_WORDS: &[&str] = &[
    "if", "else", "for", "while", "switch", "match", "return", "catch", "do", "loop", "elif",
    "sizeof", "new", "delete", "throw", "case", "print", "println", "assert", "await", "yield",
    "raise", "not", "and", "or", "in", "del", "lambda", "echo", "puts",
];

/// Result of classifying one logical line.
#[derive(Debug, Clone, PartialEq)]
pub struct Classified {
    pub kind: NodeKind,
    pub name: Option<String>,
}

impl Classified {
    fn new(kind: NodeKind, name: Option<&str>) -> Self {
        Self {
            kind,
            name: name.map(str::to_string),
        }
    }
}

/// Classify a normalized line; `None` means the line is skipped.
pub fn classify_line(code: &str) -> Option<Classified> {
    let code = code.trim();
    if code.is_empty() || is_do_while_tail(code) {
        return None;
    }

    if let Some(name) = function_name(code) {
        return Some(Classified::new(NodeKind::Function, Some(&name)));
    }
    if let Some(caps) = LOOP.captures(code) {
        return Some(Classified::new(NodeKind::Loop, caps.get(1).map(|m| m.as_str())));
    }
    if let Some(caps) = CONDITIONAL.captures(code) {
        return Some(Classified::new(
            NodeKind::Conditional,
            caps.get(1).map(|m| m.as_str()),
        ));
    }
    if let Some(name) = variable_name(code) {
        return Some(Classified::new(NodeKind::Variable, Some(&name)));
    }
    if let Some(name) = call_name(code) {
        return Some(Classified::new(NodeKind::Call, Some(&name)));
    }
    if RETURN.is_match(code) {
        return Some(Classified::new(NodeKind::Return, None));
    }
    None
}

/// Name of the function declared on this line, if any.
pub fn function_name(code: &str) -> Option<String> {
    let code = code.trim();
    for re in [&*KEYWORD_FN, &*ARROW_FN] {
        if let Some(caps) = re.captures(code) {
            return caps.get(1).map(|m| m.as_str().to_string());
        }
    }

    let caps = C_STYLE_FN.captures(code)?;
    let name = caps.get(1)?.as_str();
    let first_word = code.split(|c: char| !c.is_alphanumeric() && c != '_').next()?;
    let is_control = |w: &str| CONTROL_WORDS.contains(&w);
    if is_control(name) || is_control(first_word) || code.contains('=') {
        return None;
    }
    Some(name.to_string())
}

fn variable_name(code: &str) -> Option<String> {
    if let Some(caps) = VARIABLE.captures(code) {
        return caps.get(1).map(|m| m.as_str().to_string());
    }
    let caps = ASSIGNMENT.captures(code)?;
    let name = caps.get(1)?.as_str();
    (!CONTROL_WORDS.contains(&name)).then(|| name.to_string())
}

fn call_name(code: &str) -> Option<String> {
    CALL.captures_iter(code)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .find(|name| !CONTROL_WORDS.contains(name))
        .map(str::to_string)
}

fn is_do_while_tail(code: &str) -> bool {
    code.starts_with('}') && code.contains("while") && code.ends_with(';')
}

/// Container kind allocated by a declaration line.
pub fn container_kind(code: &str) -> Option<ContainerKind> {
    if MATRIX.is_match(code) {
        Some(ContainerKind::Matrix)
    } else if MAP.is_match(code) {
        Some(ContainerKind::Map)
    } else if SET.is_match(code) {
        Some(ContainerKind::Set)
    } else if SEQUENCE.is_match(code) {
        Some(ContainerKind::Sequence)
    } else {
        None
    }
}

static FOREACH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^for\s*\(?\s*(?:(?:const|let|var|auto|final)\s*[&*]?\s*)?[\w&*\s,()]*?\b\w+\s*(?:\bin\b|\bof\b|:[^:])").unwrap()
});

static COUNTING_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bin\s+(?:range\s*\(|\(?\s*[\w.]+\s*\.\.)|;[^;]*(?:<|>|!=)[^;]*;").unwrap()
});

static LITERAL_BOUND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"range\s*\(\s*\d+\s*\)|range\s*\(\s*\d+\s*,\s*\d+\s*\)|\bin\s+\(?\d+\s*\.\.=?\s*\d+\)?\s*\{?\s*$|;\s*\w+\s*(?:<|<=|>|>=|!=)\s*\d+\s*;")
        .unwrap()
});

static HALVING_COMPOUND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\w+)\s*(?:/=|>>=|\*=|<<=|//=)\s*[12]\b").unwrap());

static HALVING_ASSIGN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\w+)\s*=\s*(\w+)\s*(?:/|>>|\*|//|<<)\s*[12]\b").unwrap()
});

static MIDPOINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:mid\w*|middle|half\w*|m)\s*=\s*[^;]*(?:/\s*2|//\s*2|>>\s*1)").unwrap()
});

static BOUNDS_CONDITION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:left|low|lo|l|start|begin|first)\s*(?:<|<=)\s*(?:right|high|hi|r|end|last)\b")
        .unwrap()
});

static SQRT_BOUND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\w+)\s*\*\s*(\w+)\s*<=?\s*\w+").unwrap());

static QUADRATIC_BOUND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:<|<=|range\s*\()\s*(?:\w+\s*,\s*)?\w+\s*(?:\*\s*\w+|\*\*\s*2|\^\s*2)|\.\.=?\s*\w+\s*\*\s*\w+")
        .unwrap()
});

/// Loop shape derived from its header line.
pub fn loop_kind(header: &str) -> LoopKind {
    let header = header.trim().trim_start_matches('}').trim_start();
    if header.starts_with("loop") || header.contains("while (true)") || header.contains("while true")
        || header.contains("while(true)") || header.contains("while True")
        || header.contains("while 1")
    {
        LoopKind::Unbounded
    } else if header.starts_with("do") {
        LoopKind::DoWhile
    } else if header.starts_with("while") {
        LoopKind::While
    } else if COUNTING_RANGE.is_match(header) {
        LoopKind::Counting
    } else if FOREACH.is_match(header) {
        LoopKind::ForEach
    } else {
        LoopKind::Counting
    }
}

/// Induction variable of a loop header when one can be named.
pub fn loop_variable(header: &str) -> Option<String> {
    static VAR: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^for\s*\(?\s*(?:(?:int|let|var|auto|size_t|long|mut|const)\s*[&*]?\s+)*(?:mut\s+)?([A-Za-z_]\w*)").unwrap()
    });
    let header = header.trim().trim_start_matches('}').trim_start();
    VAR.captures(header)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|v| !CONTROL_WORDS.contains(&v.as_str()))
}

/// Iteration pattern of a loop given its header, direct body and the
/// induction variables of enclosing loops.
pub fn iteration_pattern(header: &str, body: &[&str], outer_vars: &[String]) -> IterationPattern {
    let header = header.trim();

    if halved_variable(header).is_some() {
        return IterationPattern::Halving;
    }
    if header.contains("while") {
        let halves_in_body = body
            .iter()
            .filter_map(|line| halved_variable(line))
            .any(|var| mentions(header, &var));
        let bisects = BOUNDS_CONDITION.is_match(header) && body.iter().any(|l| MIDPOINT.is_match(l));
        if halves_in_body || bisects {
            return IterationPattern::Halving;
        }
    }
    if let Some(caps) = SQRT_BOUND.captures(header) {
        if caps.get(1).map(|m| m.as_str()) == caps.get(2).map(|m| m.as_str()) {
            return IterationPattern::SquareRoot;
        }
    }
    if QUADRATIC_BOUND.is_match(header) {
        return IterationPattern::QuadraticBound;
    }
    if LITERAL_BOUND.is_match(header) {
        return IterationPattern::Constant;
    }
    if depends_on_outer(header, outer_vars) {
        return IterationPattern::DependentIndex;
    }
    IterationPattern::Linear
}

/// Variable halved or doubled in place on this line.
pub fn halved_variable(code: &str) -> Option<String> {
    if let Some(caps) = HALVING_COMPOUND.captures(code) {
        return caps.get(1).map(|m| m.as_str().to_string());
    }
    HALVING_ASSIGN
        .captures_iter(code)
        .find(|caps| caps.get(1).map(|m| m.as_str()) == caps.get(2).map(|m| m.as_str()))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn mentions(code: &str, ident: &str) -> bool {
    code.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .any(|tok| tok == ident)
}

fn depends_on_outer(header: &str, outer_vars: &[String]) -> bool {
    let own = loop_variable(header);
    let condition = header
        .split(';')
        .nth(1)
        .or_else(|| header.split(" in ").nth(1))
        .unwrap_or_default();
    outer_vars
        .iter()
        .filter(|v| Some(*v) != own.as_ref())
        .any(|v| mentions(condition, v))
}

static INLINE_ITERATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[[^\]]*\bfor\b[^\]]*\bin\b|\.(?:map|filter|for_each|forEach|reduce|fold)\s*\(").unwrap()
});

/// Comprehensions and iterator adapters that walk a whole collection.
pub fn has_inline_iteration(code: &str) -> bool {
    INLINE_ITERATION.is_match(code)
}

/// `mid = (lo + hi) / 2` style midpoint computation.
pub fn has_midpoint(code: &str) -> bool {
    MIDPOINT.is_match(code)
}

/// `while lo <= hi` style header of a bisection loop.
pub fn is_bisection_header(code: &str) -> bool {
    code.contains("while") && BOUNDS_CONDITION.is_match(code)
}

/// Library calls with a known cost.
pub fn library_call_growth(code: &str) -> Option<crate::core::GrowthClass> {
    static SORT_CALL: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"\.sort(?:_unstable)?(?:_by(?:_key)?)?\s*\(|\bsorted\s*\(|\bsort\s*\(|Arrays\.sort|Collections\.sort|qsort\s*\(")
            .unwrap()
    });
    SORT_CALL
        .is_match(code)
        .then_some(crate::core::GrowthClass::Linearithmic)
}
