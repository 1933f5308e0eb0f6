//! Placeholder substitution for message templates.
//!
//! A template is plain text with `{...}` spans. Each span holds a small
//! expression evaluated against a fixed symbol table:
//!
//! ```text
//! expr := term ('+' term)*
//! term := ident ('.' ident)? | 'text' | "text" | integer
//! ```
//!
//! Symbols: `name`, `title`, `game`, `message` (the event name), `nl`, `tb`,
//! `dq`, `sq`, `time` (with `.year`, `.month`, `.day`, `.hour`, `.minute`,
//! `.second`, `.date`, `.clock`), plus any extras a channel adds.
//!
//! A stray `}` is literal text; an unclosed `{` is an error.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Local, Timelike};

use super::entity::EntitySnapshot;
use super::event::EventType;
use crate::error::TemplateError;

/// Values available to template expressions.
#[derive(Debug, Clone)]
pub struct TemplateContext {
    vars: HashMap<&'static str, String>,
    now: DateTime<Local>,
}

impl TemplateContext {
    /// Context with only the utility symbols defined.
    #[must_use]
    pub fn new() -> Self {
        let vars = HashMap::from([
            ("nl", "\n".to_string()),
            ("tb", "\t".to_string()),
            ("dq", "\"".to_string()),
            ("sq", "'".to_string()),
        ]);
        Self {
            vars,
            now: Local::now(),
        }
    }

    /// Context for one alert about `entity`.
    #[must_use]
    pub fn for_alert(entity: &EntitySnapshot, event: EventType) -> Self {
        Self::new()
            .with("name", entity.name.clone())
            .with("title", entity.title.clone())
            .with("game", entity.game.clone())
            .with("message", event.as_str())
    }

    /// Add or replace a symbol.
    #[must_use]
    pub fn with(mut self, symbol: &'static str, value: impl Into<String>) -> Self {
        self.vars.insert(symbol, value.into());
        self
    }

    /// Pin the clock used by `time`.
    #[must_use]
    pub fn at(mut self, now: DateTime<Local>) -> Self {
        self.now = now;
        self
    }

    fn lookup(&self, symbol: &str, attribute: Option<&str>) -> Result<String, TemplateError> {
        if symbol == "time" {
            return self.time(attribute);
        }
        let unknown = || {
            let full = match attribute {
                Some(attr) => format!("{symbol}.{attr}"),
                None => symbol.to_string(),
            };
            TemplateError::UnknownSymbol(full)
        };
        if attribute.is_some() {
            return Err(unknown());
        }
        self.vars.get(symbol).cloned().ok_or_else(unknown)
    }

    fn time(&self, attribute: Option<&str>) -> Result<String, TemplateError> {
        let now = &self.now;
        let value = match attribute {
            None => now.format("%Y-%m-%d %H:%M:%S").to_string(),
            Some("date") => now.format("%Y-%m-%d").to_string(),
            Some("clock") => now.format("%H:%M:%S").to_string(),
            Some("year") => now.year().to_string(),
            Some("month") => now.month().to_string(),
            Some("day") => now.day().to_string(),
            Some("hour") => now.hour().to_string(),
            Some("minute") => now.minute().to_string(),
            Some("second") => now.second().to_string(),
            Some(other) => return Err(TemplateError::UnknownSymbol(format!("time.{other}"))),
        };
        Ok(value)
    }
}

impl Default for TemplateContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Substitute every `{...}` span in `template`.
pub fn render(template: &str, ctx: &TemplateContext) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut offset = 0;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after.find('}').ok_or(TemplateError::Unclosed {
            position: offset + open,
        })?;

        out.push_str(&evaluate(&after[..close], ctx)?);

        let consumed = open + 1 + close + 1;
        rest = &rest[consumed..];
        offset += consumed;
    }

    out.push_str(rest);
    Ok(out)
}

#[derive(Debug, Clone, PartialEq)]
enum Token<'a> {
    Ident(&'a str),
    Text(&'a str),
    Number(&'a str),
    Dot,
    Plus,
}

fn tokenize(expression: &str) -> Result<Vec<Token<'_>>, TemplateError> {
    let syntax = |reason: &str| TemplateError::Syntax {
        expression: expression.to_string(),
        reason: reason.to_string(),
    };

    let mut tokens = Vec::new();
    let bytes = expression.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        match c {
            b' ' | b'\t' => i += 1,
            b'+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            b'.' => {
                tokens.push(Token::Dot);
                i += 1;
            }
            b'\'' | b'"' => {
                let end = expression[i + 1..]
                    .find(c as char)
                    .ok_or_else(|| syntax("unterminated string"))?;
                tokens.push(Token::Text(&expression[i + 1..i + 1 + end]));
                i += end + 2;
            }
            b'0'..=b'9' => {
                let start = i;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
                tokens.push(Token::Number(&expression[start..i]));
            }
            c if c == b'_' || c.is_ascii_alphabetic() => {
                let start = i;
                while i < bytes.len() && (bytes[i] == b'_' || bytes[i].is_ascii_alphanumeric()) {
                    i += 1;
                }
                tokens.push(Token::Ident(&expression[start..i]));
            }
            _ => return Err(syntax("unexpected character")),
        }
    }

    Ok(tokens)
}

struct Parser<'t, 'a> {
    tokens: &'t [Token<'a>],
    pos: usize,
    expression: &'a str,
}

impl<'t, 'a> Parser<'t, 'a> {
    fn syntax(&self, reason: &str) -> TemplateError {
        TemplateError::Syntax {
            expression: self.expression.to_string(),
            reason: reason.to_string(),
        }
    }

    fn next(&mut self) -> Option<&'t Token<'a>> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    fn expr(&mut self, ctx: &TemplateContext) -> Result<String, TemplateError> {
        let mut value = self.term(ctx)?;
        while let Some(token) = self.next() {
            if *token != Token::Plus {
                return Err(self.syntax("expected '+'"));
            }
            value.push_str(&self.term(ctx)?);
        }
        Ok(value)
    }

    fn term(&mut self, ctx: &TemplateContext) -> Result<String, TemplateError> {
        match self.next() {
            Some(Token::Text(text)) => Ok((*text).to_string()),
            Some(Token::Number(digits)) => Ok((*digits).to_string()),
            Some(Token::Ident(symbol)) => {
                let attribute = if self.tokens.get(self.pos) == Some(&Token::Dot) {
                    self.pos += 1;
                    match self.next() {
                        Some(Token::Ident(attr)) => Some(*attr),
                        _ => return Err(self.syntax("expected attribute name after '.'")),
                    }
                } else {
                    None
                };
                ctx.lookup(symbol, attribute)
            }
            Some(_) => Err(self.syntax("expected a value")),
            None => Err(self.syntax("empty expression")),
        }
    }
}

fn evaluate(expression: &str, ctx: &TemplateContext) -> Result<String, TemplateError> {
    let tokens = tokenize(expression)?;
    Parser {
        tokens: &tokens,
        pos: 0,
        expression,
    }
    .expr(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::domain::entity::EntityId;

    fn ctx() -> TemplateContext {
        let entity = EntitySnapshot::unknown(EntityId::new("alice"))
            .with_title("Speedruns all day")
            .with_game("Celeste");
        let now = Local
            .with_ymd_and_hms(2024, 3, 9, 18, 5, 7)
            .single()
            .expect("valid local time");
        TemplateContext::for_alert(&entity, EventType::Live).at(now)
    }

    #[test]
    fn test_plain_text_passes_through() {
        assert_eq!(render("no placeholders", &ctx()).unwrap(), "no placeholders");
        assert_eq!(render("", &ctx()).unwrap(), "");
    }

    #[test]
    fn test_substitutes_symbols() {
        let out = render("{name} is {message}: {title} ({game})", &ctx()).unwrap();
        assert_eq!(out, "alice is live: Speedruns all day (Celeste)");
    }

    #[test]
    fn test_utility_symbols() {
        let out = render("a{nl}b{tb}c{dq}d{sq}", &ctx()).unwrap();
        assert_eq!(out, "a\nb\tc\"d'");
    }

    #[test]
    fn test_concatenation_and_literals() {
        let out = render("{name + ' @ ' + \"here\" + 42}", &ctx()).unwrap();
        assert_eq!(out, "alice @ here42");
    }

    #[test]
    fn test_time_attributes() {
        let ctx = ctx();
        assert_eq!(render("{time}", &ctx).unwrap(), "2024-03-09 18:05:07");
        assert_eq!(render("{time.clock}", &ctx).unwrap(), "18:05:07");
        assert_eq!(render("{time.hour}:{time.minute}", &ctx).unwrap(), "18:5");
    }

    #[test]
    fn test_stray_close_brace_is_literal() {
        assert_eq!(render("}{name}}", &ctx()).unwrap(), "}alice}");
    }

    #[test]
    fn test_unclosed_brace_is_error() {
        assert_eq!(
            render("ok {name} {title", &ctx()),
            Err(TemplateError::Unclosed { position: 10 })
        );
    }

    #[test]
    fn test_unknown_symbol_is_error() {
        assert_eq!(
            render("{viewers}", &ctx()),
            Err(TemplateError::UnknownSymbol("viewers".into()))
        );
        assert!(matches!(
            render("{name.upper}", &ctx()),
            Err(TemplateError::UnknownSymbol(_))
        ));
    }

    #[test]
    fn test_malformed_expressions() {
        for bad in ["{}", "{name title}", "{'open}", "{name +}", "{time.}", "{a-b}"] {
            assert!(
                matches!(render(bad, &ctx()), Err(TemplateError::Syntax { .. }) | Err(TemplateError::UnknownSymbol(_))),
                "{bad} should fail"
            );
        }
    }

    #[test]
    fn test_channel_extras() {
        let ctx = ctx().with("discord_id", "<@123>");
        assert_eq!(render("{discord_id} {name}", &ctx).unwrap(), "<@123> alice");
    }
}
