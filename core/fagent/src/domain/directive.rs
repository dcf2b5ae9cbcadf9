//! AI 応答に埋め込まれた `EXECUTE: name(args)` ディレクティブ
//!
//! 走査は引用符を考慮する（引用符内の `)` では終わらない、閉じ括弧まで複数行にまたがってよい）。
//! 引数は 3 段階で解釈する: リテラル列 → 引用文字列の拾い出し → 素朴なカンマ分割。

use std::ops::Range;

pub const MARKER: &str = "EXECUTE:";

/// 引数の値
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Str(String),
    /// 数値リテラル（表記のまま）
    Num(String),
    Bool(bool),
    /// None / null
    Null,
}

/// 引数 1 つ（`name=value` なら keyword あり）
#[derive(Debug, Clone, PartialEq)]
pub struct DirectiveArg {
    pub keyword: Option<String>,
    pub value: ArgValue,
}

impl DirectiveArg {
    fn positional(value: ArgValue) -> Self {
        Self {
            keyword: None,
            value,
        }
    }
}

/// 抽出されたディレクティブ
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub name: String,
    /// 括弧の内側（未解釈）
    pub raw_args: String,
    /// 元テキスト中の範囲（表示テキストから取り除く部分）
    pub span: Range<usize>,
}

impl Directive {
    pub fn args(&self) -> Vec<DirectiveArg> {
        parse_args(&self.raw_args)
    }
}

/// テキスト中のディレクティブを出現順に返す
pub fn scan(text: &str) -> Vec<Directive> {
    let mut out = Vec::new();
    let mut from = 0;
    while let Some(rel) = text[from..].find(MARKER) {
        let start = from + rel;
        let after = start + MARKER.len();
        match parse_call(text, after) {
            Some((name, args, end)) => {
                let span = widen_backticks(text, start..end);
                out.push(Directive {
                    name,
                    raw_args: text[args].to_string(),
                    span,
                });
                from = end;
            }
            None => from = after,
        }
    }
    out
}

/// ディレクティブ部分を取り除く。取り除いた結果空になった行は行ごと消す
pub fn strip(text: &str, directives: &[Directive]) -> String {
    const CUT: char = '\u{0}';
    let mut marked = String::with_capacity(text.len());
    let mut last = 0;
    for d in directives {
        if d.span.start < last {
            continue;
        }
        marked.push_str(&text[last..d.span.start]);
        marked.push(CUT);
        last = d.span.end;
    }
    marked.push_str(&text[last..]);

    let lines: Vec<String> = marked
        .lines()
        .filter_map(|line| {
            if line.contains(CUT) {
                let rest = line.replace(CUT, "");
                if rest.trim().is_empty() {
                    None
                } else {
                    Some(rest.trim_end().to_string())
                }
            } else {
                Some(line.to_string())
            }
        })
        .collect();
    lines.join("\n").trim().to_string()
}

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// `name(args)` を pos から読む。戻り値は (name, 引数の範囲, 閉じ括弧の次の位置)
fn parse_call(text: &str, pos: usize) -> Option<(String, Range<usize>, usize)> {
    let rest = &text[pos..];
    let name_start = pos + (rest.len() - rest.trim_start_matches(is_blank).len());
    let name_part = &text[name_start..];
    let name_len = name_part
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
        .map(|(i, _)| i)
        .unwrap_or(name_part.len());
    if name_len == 0 || name_part.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    let name = &text[name_start..name_start + name_len];

    let after_name = &text[name_start + name_len..];
    let trimmed = after_name.trim_start_matches(is_blank);
    if !trimmed.starts_with('(') {
        return None;
    }
    let args_start = name_start + name_len + (after_name.len() - trimmed.len()) + 1;

    let close = find_close_quoted(&text[args_start..])
        .or_else(|| text[args_start..].find(')'))?;
    Some((
        name.to_string(),
        args_start..args_start + close,
        args_start + close + 1,
    ))
}

/// 引用符と入れ子の括弧を考慮して対応する `)` を探す。閉じていなければ None
fn find_close_quoted(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' => depth += 1,
            ')' if depth == 0 => return Some(i),
            ')' => depth -= 1,
            _ => {}
        }
    }
    None
}

/// `` `EXECUTE: ...` `` のようにバッククォートで囲まれていれば含めて取り除く
fn widen_backticks(text: &str, span: Range<usize>) -> Range<usize> {
    if text[..span.start].ends_with('`') && text[span.end..].starts_with('`') {
        span.start - 1..span.end + 1
    } else {
        span
    }
}

/// 引数列を解釈する（3 段階）
pub fn parse_args(raw: &str) -> Vec<DirectiveArg> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    if let Some(args) = parse_literal_list(raw) {
        return args;
    }
    if let Some(quoted) = harvest_quoted(raw) {
        return quoted
            .into_iter()
            .map(|s| DirectiveArg::positional(ArgValue::Str(s)))
            .collect();
    }
    naive_split(raw)
}

/// 1 段目: `"a", 'b', true, 3, name="x"` のようなリテラル列。1 つでも崩れていれば None
fn parse_literal_list(raw: &str) -> Option<Vec<DirectiveArg>> {
    let chars: Vec<char> = raw.chars().collect();
    let mut i = 0;
    let mut out = Vec::new();

    let skip_ws = |i: &mut usize| {
        while *i < chars.len() && chars[*i].is_whitespace() {
            *i += 1;
        }
    };

    loop {
        skip_ws(&mut i);
        if i >= chars.len() {
            break;
        }

        let mut keyword = None;
        if chars[i].is_ascii_alphabetic() || chars[i] == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            let mut j = i;
            skip_ws(&mut j);
            if j < chars.len() && chars[j] == '=' {
                keyword = Some(word);
                i = j + 1;
                skip_ws(&mut i);
            } else {
                i = start;
            }
        }

        let value = read_literal(&chars, &mut i)?;
        out.push(DirectiveArg { keyword, value });

        skip_ws(&mut i);
        if i >= chars.len() {
            break;
        }
        if chars[i] != ',' {
            return None;
        }
        i += 1;
    }
    Some(out)
}

fn read_literal(chars: &[char], i: &mut usize) -> Option<ArgValue> {
    let c = *chars.get(*i)?;
    if c == '"' || c == '\'' {
        *i += 1;
        let mut s = String::new();
        while *i < chars.len() {
            let ch = chars[*i];
            *i += 1;
            if ch == c {
                return Some(ArgValue::Str(s));
            }
            if ch == '\\' {
                let esc = *chars.get(*i)?;
                *i += 1;
                match esc {
                    'n' => s.push('\n'),
                    't' => s.push('\t'),
                    'r' => s.push('\r'),
                    '0' => s.push('\0'),
                    other => s.push(other),
                }
            } else {
                s.push(ch);
            }
        }
        return None;
    }
    if c == '-' || c == '+' || c.is_ascii_digit() {
        let start = *i;
        *i += 1;
        while *i < chars.len() && (chars[*i].is_ascii_digit() || chars[*i] == '.') {
            *i += 1;
        }
        let num: String = chars[start..*i].iter().collect();
        return num.parse::<f64>().ok().map(|_| ArgValue::Num(num));
    }
    if c.is_ascii_alphabetic() {
        let start = *i;
        while *i < chars.len() && chars[*i].is_ascii_alphanumeric() {
            *i += 1;
        }
        let word: String = chars[start..*i].iter().collect();
        return match word.as_str() {
            "True" | "true" => Some(ArgValue::Bool(true)),
            "False" | "false" => Some(ArgValue::Bool(false)),
            "None" | "null" => Some(ArgValue::Null),
            _ => None,
        };
    }
    None
}

/// 2 段目: 引用符で囲まれた部分を順に拾う（“...” も可）。
/// 引用の外に空白・カンマ以外が残る、または閉じていない引用があれば None（3 段目に回す）
fn harvest_quoted(raw: &str) -> Option<Vec<String>> {
    let mut out = Vec::new();
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        let close = match c {
            '"' => '"',
            '\'' => '\'',
            '“' => '”',
            '‘' => '’',
            c if c.is_whitespace() || c == ',' => continue,
            _ => return None,
        };
        let mut s = String::new();
        let mut closed = false;
        for ch in chars.by_ref() {
            if ch == close {
                closed = true;
                break;
            }
            s.push(ch);
        }
        if !closed {
            return None;
        }
        out.push(s);
    }
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

/// 引用の外にあるカンマで分割する。
/// 引用符は要素の先頭（空白・カンマ・`=` の直後）にあるときだけ開きとみなす（`don't` を壊さない）
fn split_outside_quotes(raw: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut close: Option<char> = None;
    let mut prev: Option<char> = None;
    for (i, c) in raw.char_indices() {
        match close {
            Some(q) => {
                if c == q {
                    close = None;
                }
            }
            None => {
                let at_boundary = prev.map_or(true, |p| p.is_whitespace() || p == ',' || p == '=');
                match c {
                    ',' => {
                        pieces.push(&raw[start..i]);
                        start = i + c.len_utf8();
                    }
                    '"' | '\'' if at_boundary => close = Some(c),
                    '“' if at_boundary => close = Some('”'),
                    '‘' if at_boundary => close = Some('’'),
                    _ => {}
                }
            }
        }
        prev = Some(c);
    }
    pieces.push(&raw[start..]);
    pieces
}

/// 3 段目: 引用の外のカンマで分割して前後の空白・引用符を落とす。`name=value` は keyword として扱う
fn naive_split(raw: &str) -> Vec<DirectiveArg> {
    split_outside_quotes(raw)
        .into_iter()
        .map(|part| {
            let part = part.trim();
            let (keyword, value) = match part.split_once('=') {
                Some((k, v))
                    if !k.trim().is_empty()
                        && k.trim().chars().all(|c| c.is_ascii_alphanumeric() || c == '_') =>
                {
                    (Some(k.trim().to_string()), v.trim())
                }
                _ => (None, part),
            };
            let value = value.trim_matches(|c| matches!(c, '"' | '\'' | '“' | '”' | '‘' | '’'));
            DirectiveArg {
                keyword,
                value: ArgValue::Str(value.to_string()),
            }
        })
        .collect()
}
