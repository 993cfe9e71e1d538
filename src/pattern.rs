//! Exclusion patterns: rsync-style globs compiled to regular expressions.
//!
//! Users exclude folders from album creation with glob patterns such as
//! `/trip/*` or `*.{tmp,bak}`. Each pattern is translated character by
//! character into a regular expression and compiled with the `regex` crate.
//! Matching is unanchored: a pattern matches if it occurs anywhere in the
//! candidate path.
//!
//! ## Syntax
//!
//! | Glob | Regexp | Meaning |
//! |------|--------|---------|
//! | `?` | `.` | exactly one character |
//! | `*` | `.*` | any run of characters (one star only; `**` is an error) |
//! | `[...]` | `[...]` | character class, copied verbatim |
//! | `{a,b}` | `(a\|b)` | alternation |
//! | `{{re}}` | `(re)` | raw regular expression, copied verbatim |
//! | `\c` | `\c` | escaped character |
//! | `. + ( ) \| ^ $` | `\.` etc. | matched literally |
//!
//! The raw-regexp escape lets callers embed anything the glob syntax cannot
//! express, e.g. `/{{\d{8}}}` for a folder named by an eight digit date.
//!
//! ## Translation
//!
//! [`glob_to_regex`] is a single-pass state machine over a `Mode` enum. Bracket,
//! brace and raw-regexp regions each suppress the special meaning of the
//! other characters while active, which is why they are modes rather than
//! nested parsers.

use regex::Regex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PatternError {
    #[error("too many stars in {0:?}")]
    TooManyStars(String),
    #[error("mismatched ']' in glob {0:?}")]
    StrayBracket(String),
    #[error("mismatched '[' and ']' in glob {0:?}")]
    UnclosedBracket(String),
    #[error("can't nest '{{' '}}' in glob {0:?}")]
    NestedBraces(String),
    #[error("mismatched '{{' and '}}' in glob {0:?}")]
    MismatchedBrace(String),
    #[error("mismatched '{{{{' and '}}}}' in glob {0:?}")]
    UnclosedRegex(String),
    #[error("bad glob pattern {glob:?} (regexp {regex:?}): {source}")]
    BadPattern {
        glob: String,
        regex: String,
        #[source]
        source: regex::Error,
    },
}

/// Region the translator returns to after an escape or a bracket class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    Plain,
    Braces,
}

/// Translator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Outside any special region.
    Plain,
    /// Inside `{...}`: commas become alternation.
    Braces,
    /// Inside `[...]`, possibly nested as in `[[:alpha:]]`.
    Brackets { depth: usize, region: Region },
    /// The previous character was a backslash.
    Escaped(Region),
    /// Inside `{{...}}`: characters are copied verbatim.
    Regex,
    /// Saw the closing `}}`; further `}` still belong to the raw regexp.
    RegexClosing,
}

impl Region {
    fn mode(self) -> Mode {
        match self {
            Region::Plain => Mode::Plain,
            Region::Braces => Mode::Braces,
        }
    }
}

/// Translate an rsync-style glob into a regular expression string.
///
/// The result is not compiled; see [`Pattern::compile`].
pub fn glob_to_regex(glob: &str) -> Result<String, PatternError> {
    let mut re = String::with_capacity(glob.len() * 2);
    let mut mode = Mode::Plain;
    let mut stars = 0usize;
    let mut last: Option<char> = None;

    for c in glob.chars() {
        let prev = last.replace(c);

        if mode == Mode::RegexClosing {
            if c == '}' {
                // `}}}`: the raw regexp ended with `}`, keep the longest run.
                re.pop();
                re.push('}');
                re.push(')');
                continue;
            }
            mode = Mode::Plain;
        }

        match mode {
            Mode::Escaped(region) => {
                re.push(c);
                mode = region.mode();
            }
            Mode::Regex => {
                if c == '}' && prev == Some('}') {
                    re.pop();
                    re.push(')');
                    mode = Mode::RegexClosing;
                } else {
                    re.push(c);
                }
            }
            Mode::Brackets { depth, region } => {
                flush_stars(&mut re, &mut stars, glob)?;
                re.push(c);
                mode = match c {
                    '[' => Mode::Brackets {
                        depth: depth + 1,
                        region,
                    },
                    ']' if depth == 1 => region.mode(),
                    ']' => Mode::Brackets {
                        depth: depth - 1,
                        region,
                    },
                    _ => mode,
                };
            }
            Mode::Plain | Mode::Braces | Mode::RegexClosing => {
                let region = if mode == Mode::Braces {
                    Region::Braces
                } else {
                    Region::Plain
                };
                if c != '*' {
                    flush_stars(&mut re, &mut stars, glob)?;
                }
                match c {
                    '\\' => {
                        re.push(c);
                        mode = Mode::Escaped(region);
                    }
                    '*' => stars += 1,
                    '?' => re.push('.'),
                    '[' => {
                        re.push(c);
                        mode = Mode::Brackets { depth: 1, region };
                    }
                    ']' => return Err(PatternError::StrayBracket(glob.to_string())),
                    '{' if region == Region::Braces => {
                        // `{{` opens a raw regexp; the `(` written for the
                        // first brace becomes its group.
                        if prev == Some('{') {
                            mode = Mode::Regex;
                        } else {
                            return Err(PatternError::NestedBraces(glob.to_string()));
                        }
                    }
                    '{' => {
                        re.push('(');
                        mode = Mode::Braces;
                    }
                    '}' if region == Region::Braces => {
                        re.push(')');
                        mode = Mode::Plain;
                    }
                    '}' => return Err(PatternError::MismatchedBrace(glob.to_string())),
                    ',' if region == Region::Braces => re.push('|'),
                    '.' | '+' | '(' | ')' | '|' | '^' | '$' => {
                        re.push('\\');
                        re.push(c);
                    }
                    _ => re.push(c),
                }
            }
        }
    }

    flush_stars(&mut re, &mut stars, glob)?;

    match mode {
        Mode::Brackets { .. } => Err(PatternError::UnclosedBracket(glob.to_string())),
        Mode::Braces => Err(PatternError::MismatchedBrace(glob.to_string())),
        Mode::Regex => Err(PatternError::UnclosedRegex(glob.to_string())),
        _ => Ok(re),
    }
}

/// Emit the pending run of `*`. Only a single star is allowed.
fn flush_stars(re: &mut String, stars: &mut usize, glob: &str) -> Result<(), PatternError> {
    match *stars {
        0 => {}
        1 => re.push_str(".*"),
        _ => return Err(PatternError::TooManyStars(glob.to_string())),
    }
    *stars = 0;
    Ok(())
}

/// A compiled exclusion pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    glob: String,
    regex: Regex,
}

impl Pattern {
    /// Translate and compile a glob.
    pub fn compile(glob: &str) -> Result<Self, PatternError> {
        let translated = glob_to_regex(glob)?;
        let regex = Regex::new(&translated).map_err(|source| PatternError::BadPattern {
            glob: glob.to_string(),
            regex: translated.clone(),
            source,
        })?;
        Ok(Self {
            glob: glob.to_string(),
            regex,
        })
    }

    /// The glob as the user wrote it.
    pub fn glob(&self) -> &str {
        &self.glob
    }

    /// The translated regular expression.
    pub fn as_regex_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }
}

/// A set of exclusion patterns; a path is excluded if any pattern matches.
#[derive(Debug, Clone, Default)]
pub struct ExcludeFilter {
    patterns: Vec<Pattern>,
}

impl ExcludeFilter {
    /// Compile every pattern in order. The first failure aborts the build and
    /// later patterns are not attempted.
    pub fn new<S: AsRef<str>>(globs: &[S]) -> Result<Self, PatternError> {
        let patterns = globs
            .iter()
            .map(|g| Pattern::compile(g.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// The first pattern matching `path`, if the path is excluded.
    pub fn matching(&self, path: &str) -> Option<&Pattern> {
        self.patterns.iter().find(|p| p.is_match(path))
    }
}
