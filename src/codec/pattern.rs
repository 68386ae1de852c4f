//! Token classification for the instruction-data mini-language
//!
//! A token is classified exactly once into a closed [`TokenPattern`]
//! variant; encoding then dispatches over that variant. The grammar rules
//! are checked in a fixed precedence order (function-call forms before bare
//! variable forms) because the patterns are not fully disjoint — the order
//! is a correctness contract.

use std::sync::OnceLock;

use regex::Regex;

use crate::codec::TypeTag;
use crate::error::{Error, Result};

/// A token classified against the grammar
#[derive(Debug, Clone, PartialEq)]
pub enum TokenPattern {
    /// `sighash(<name>)` — 8-byte instruction discriminator
    Sighash {
        /// Instruction name, snake-cased before digesting
        name: String,
    },
    /// `$<name>:<tag>` — environment variable with type tag
    Variable {
        /// Variable name without the sigil
        name: String,
        /// Declared type tag
        tag: TypeTag,
    },
    /// `bytes(n0,n1,...)` — literal byte list
    Bytes {
        /// Raw parsed entries; range checking happens at encode time so
        /// strict/lenient handling stays configurable
        values: Vec<i64>,
    },
    /// `fromBase64(<payload>)` — base64 literal
    FromBase64 {
        /// The undecoded payload
        payload: String,
    },
    /// `hex(<payload>)` — hex literal
    Hex {
        /// The undecoded payload
        payload: String,
    },
    /// `usize(<lit>)` / `u32(<lit>)` — scalar literal call, no environment
    ScalarCall {
        /// Target tag
        tag: TypeTag,
        /// The numeric literal, verbatim
        literal: String,
    },
}

/// Dry classification of a token, used to drive interactive prompting
/// without a live environment
#[derive(Debug, Clone, PartialEq)]
pub struct VariableInfo {
    /// True when the token references an environment variable
    pub is_variable: bool,
    /// Variable name for variable tokens, the whole token otherwise
    pub name: String,
    /// Declared type tag for variable and scalar-call tokens
    pub tag: Option<TypeTag>,
    /// Literal value for tokens that carry one
    pub default_value: Option<String>,
}

fn sighash_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^sighash\(([A-Za-z0-9_]+)\)$").unwrap())
}

fn variable_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\$([A-Za-z0-9_]+):([A-Za-z0-9]+)$").unwrap())
}

fn bytes_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^bytes\(([0-9,\s\-]*)\)$").unwrap())
}

fn base64_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^fromBase64\(([A-Za-z0-9+/=]+)\)$").unwrap())
}

fn hex_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^hex\(([0-9a-fA-F]*)\)$").unwrap())
}

fn scalar_call_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(usize|u32)\(([0-9]+)\)$").unwrap())
}

/// Classifies a token against the grammar, first match wins.
///
/// Anything that matches no rule fails with [`Error::SyntaxError`] naming
/// the offending token.
pub fn classify(token: &str) -> Result<TokenPattern> {
    let token = token.trim();

    if let Some(caps) = sighash_re().captures(token) {
        return Ok(TokenPattern::Sighash {
            name: caps[1].to_string(),
        });
    }

    if let Some(caps) = variable_re().captures(token) {
        if let Some(tag) = TypeTag::parse(&caps[2]) {
            return Ok(TokenPattern::Variable {
                name: caps[1].to_string(),
                tag,
            });
        }
        // A sigil with an unknown tag is still a syntax error, not a
        // fall-through to later rules
        return Err(Error::SyntaxError {
            token: token.to_string(),
        });
    }

    if let Some(caps) = bytes_re().captures(token) {
        let mut values = Vec::new();
        for part in caps[1].split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let n = part.parse::<i64>().map_err(|_| Error::SyntaxError {
                token: token.to_string(),
            })?;
            values.push(n);
        }
        return Ok(TokenPattern::Bytes { values });
    }

    if let Some(caps) = base64_re().captures(token) {
        return Ok(TokenPattern::FromBase64 {
            payload: caps[1].to_string(),
        });
    }

    if let Some(caps) = hex_re().captures(token) {
        return Ok(TokenPattern::Hex {
            payload: caps[1].to_string(),
        });
    }

    if let Some(caps) = scalar_call_re().captures(token) {
        // The regex alternation only admits tags TypeTag knows
        let tag = TypeTag::parse(&caps[1]).unwrap();
        return Ok(TokenPattern::ScalarCall {
            tag,
            literal: caps[2].to_string(),
        });
    }

    Err(Error::SyntaxError {
        token: token.to_string(),
    })
}

/// Classifies a token without an environment, for prompting
pub fn variable_info(token: &str) -> Result<VariableInfo> {
    let pattern = classify(token)?;
    Ok(match pattern {
        TokenPattern::Variable { name, tag } => VariableInfo {
            is_variable: true,
            name,
            tag: Some(tag),
            default_value: None,
        },
        TokenPattern::ScalarCall { tag, literal } => VariableInfo {
            is_variable: false,
            name: token.trim().to_string(),
            tag: Some(tag),
            default_value: Some(literal),
        },
        _ => VariableInfo {
            is_variable: false,
            name: token.trim().to_string(),
            tag: None,
            default_value: None,
        },
    })
}

/// Parsed account-meta token: `"<source>[,signer][,mut]"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountToken {
    /// Position 0 of the comma list: a `$variable` or a literal address
    pub source: String,
    /// True when a `signer` flag is present
    pub is_signer: bool,
    /// True when a `mut` flag is present
    pub is_writable: bool,
}

impl AccountToken {
    /// Splits an account token into its address source and flags
    pub fn parse(token: &str) -> Self {
        let mut parts = token.split(',').map(str::trim);
        let source = parts.next().unwrap_or("").to_string();
        let flags: Vec<&str> = parts.collect();
        AccountToken {
            source,
            is_signer: flags.contains(&"signer"),
            is_writable: flags.contains(&"mut"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_sighash() {
        let pattern = classify("sighash(initialize)").unwrap();
        assert_eq!(
            pattern,
            TokenPattern::Sighash {
                name: "initialize".to_string()
            }
        );
    }

    #[test]
    fn test_classify_variable() {
        let pattern = classify("$amount:u64").unwrap();
        assert_eq!(
            pattern,
            TokenPattern::Variable {
                name: "amount".to_string(),
                tag: TypeTag::U64,
            }
        );
    }

    #[test]
    fn test_classify_bytes() {
        let pattern = classify("bytes(0, 1,255)").unwrap();
        assert_eq!(
            pattern,
            TokenPattern::Bytes {
                values: vec![0, 1, 255]
            }
        );
    }

    #[test]
    fn test_function_call_forms_win_over_variable_forms() {
        // "u32(7)" must classify as a scalar call, never as anything else
        let pattern = classify("u32(7)").unwrap();
        assert!(matches!(pattern, TokenPattern::ScalarCall { .. }));
    }

    #[test]
    fn test_unknown_token_is_syntax_error() {
        let err = classify("$amount").unwrap_err();
        assert!(err.to_string().contains("$amount"));
    }

    #[test]
    fn test_unknown_tag_is_syntax_error() {
        assert!(classify("$amount:f64").is_err());
    }

    #[test]
    fn test_variable_info_dry() {
        let info = variable_info("$owner:pubkey").unwrap();
        assert!(info.is_variable);
        assert_eq!(info.name, "owner");
        assert_eq!(info.tag, Some(TypeTag::Pubkey));

        let info = variable_info("usize(10)").unwrap();
        assert!(!info.is_variable);
        assert_eq!(info.default_value.as_deref(), Some("10"));
    }

    #[test]
    fn test_account_token_flags() {
        let t = AccountToken::parse("$payer, signer, mut");
        assert_eq!(t.source, "$payer");
        assert!(t.is_signer);
        assert!(t.is_writable);

        let t = AccountToken::parse("11111111111111111111111111111111");
        assert!(!t.is_signer);
        assert!(!t.is_writable);
    }
}
