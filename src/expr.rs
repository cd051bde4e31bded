//! Expression evaluator for the `p` and `px` commands.
//!
//! Expressions are 32-bit unsigned arithmetic over decimal and hex literals,
//! registers (`$pc`, `$a0`, `$0`) and memory dereferences (`*addr`).
//!
//! Precedence, lowest first:
//! ```text
//! &&
//! == !=
//! + -
//! * /
//! unary - *
//! ```
use crate::error::Error;
use crate::machine::{Evaluator, Machine};
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    Space,
    Hex,
    Num,
    Reg,
    Eq,
    Neq,
    And,
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Num(u32),
    Reg(String),
    Op(Rule),
}

/// Rules are tried in order at each position; the first match wins.
#[rustfmt::skip]
static RULES: &[(&str, Rule)] = &[
    (r"^ +", Rule::Space),
    (r"^0[xX][0-9a-fA-F]+", Rule::Hex),
    (r"^[0-9]+", Rule::Num),
    (r"^\$[a-z0-9$]+", Rule::Reg),
    (r"^==", Rule::Eq),
    (r"^!=", Rule::Neq),
    (r"^&&", Rule::And),
    (r"^\+", Rule::Plus),
    (r"^-", Rule::Minus),
    (r"^\*", Rule::Star),
    (r"^/", Rule::Slash),
    (r"^\(", Rule::LParen),
    (r"^\)", Rule::RParen),
];

/// Holds the compiled token rules.
pub struct Expr {
    rules: Vec<(Regex, Rule)>,
}

impl Expr {
    /// Compiles the token rules.
    pub fn new() -> Result<Expr, Error> {
        let mut rules = Vec::with_capacity(RULES.len());
        for (pattern, rule) in RULES {
            let re = Regex::new(pattern)
                .map_err(|e| general_err!(format!("regex compilation failed: {}\n{}", e, pattern)))?;
            rules.push((re, *rule));
        }
        Ok(Expr { rules })
    }

    fn tokenize(&self, text: &str) -> Result<Vec<Token>, Error> {
        let mut tokens = Vec::new();
        let mut pos = 0;
        'scan: while pos < text.len() {
            let rest = &text[pos..];
            for (re, rule) in &self.rules {
                if let Some(m) = re.find(rest) {
                    let lexeme = m.as_str();
                    pos += m.end();
                    match rule {
                        Rule::Space => {}
                        Rule::Hex => tokens.push(Token::Num(
                            u32::from_str_radix(&lexeme[2..], 16)
                                .map_err(|_| syntax_err!("hex literal out of range: {}", lexeme))?,
                        )),
                        Rule::Num => tokens.push(Token::Num(
                            lexeme
                                .parse()
                                .map_err(|_| syntax_err!("decimal literal out of range: {}", lexeme))?,
                        )),
                        Rule::Reg => tokens.push(Token::Reg(lexeme[1..].to_string())),
                        op => tokens.push(Token::Op(*op)),
                    }
                    continue 'scan;
                }
            }
            let caret = format!("{}^", " ".repeat(pos));
            return Err(syntax_err!("no match at position {}\n{}\n{}", pos, text, caret));
        }
        Ok(tokens)
    }

    pub fn eval(&self, machine: &dyn Machine, text: &str) -> Result<u32, Error> {
        let tokens = self.tokenize(text)?;
        if tokens.is_empty() {
            return Err(syntax_err!("empty expression"));
        }
        let mut parser = Parser {
            tokens: &tokens,
            pos: 0,
            depth: 0,
            machine,
        };
        let val = parser.and()?;
        if parser.pos != tokens.len() {
            return Err(syntax_err!("unexpected token {:?}", tokens[parser.pos]));
        }
        Ok(val)
    }
}

impl Evaluator for Expr {
    fn expr(&self, machine: &dyn Machine, text: &str) -> Result<u32, Error> { self.eval(machine, text) }
}

/// Deepest nesting of prefix operators and parentheses the parser accepts.
const MAX_DEPTH: usize = 256;

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
    machine: &'a dyn Machine,
}

impl Parser<'_> {
    fn peek_op(&self) -> Option<Rule> {
        match self.tokens.get(self.pos) {
            Some(Token::Op(op)) => Some(*op),
            _ => None,
        }
    }
    fn eat(&mut self, rule: Rule) -> bool {
        if self.peek_op() == Some(rule) {
            self.pos += 1;
            true
        } else {
            false
        }
    }
    fn and(&mut self) -> Result<u32, Error> {
        let mut lhs = self.equality()?;
        while self.eat(Rule::And) {
            let rhs = self.equality()?;
            lhs = (lhs != 0 && rhs != 0) as u32;
        }
        Ok(lhs)
    }
    fn equality(&mut self) -> Result<u32, Error> {
        let mut lhs = self.additive()?;
        loop {
            if self.eat(Rule::Eq) {
                lhs = (lhs == self.additive()?) as u32;
            } else if self.eat(Rule::Neq) {
                lhs = (lhs != self.additive()?) as u32;
            } else {
                return Ok(lhs);
            }
        }
    }
    fn additive(&mut self) -> Result<u32, Error> {
        let mut lhs = self.term()?;
        loop {
            if self.eat(Rule::Plus) {
                lhs = lhs.wrapping_add(self.term()?);
            } else if self.eat(Rule::Minus) {
                lhs = lhs.wrapping_sub(self.term()?);
            } else {
                return Ok(lhs);
            }
        }
    }
    fn term(&mut self) -> Result<u32, Error> {
        let mut lhs = self.unary()?;
        loop {
            if self.eat(Rule::Star) {
                lhs = lhs.wrapping_mul(self.unary()?);
            } else if self.eat(Rule::Slash) {
                let rhs = self.unary()?;
                if rhs == 0 {
                    return Err(syntax_err!("division by zero"));
                }
                lhs /= rhs;
            } else {
                return Ok(lhs);
            }
        }
    }
    /// Runs `f` one nesting level deeper.
    fn nested(&mut self, f: fn(&mut Self) -> Result<u32, Error>) -> Result<u32, Error> {
        if self.depth == MAX_DEPTH {
            return Err(syntax_err!("expression nested deeper than {} levels", MAX_DEPTH));
        }
        self.depth += 1;
        let val = f(self);
        self.depth -= 1;
        val
    }
    fn unary(&mut self) -> Result<u32, Error> {
        if self.eat(Rule::Minus) {
            return Ok(self.nested(Self::unary)?.wrapping_neg());
        }
        if self.eat(Rule::Star) {
            let addr = self.nested(Self::unary)?;
            return self.machine.paddr_read(addr, 4);
        }
        self.primary()
    }
    fn primary(&mut self) -> Result<u32, Error> {
        let token = self.tokens.get(self.pos).ok_or_else(|| syntax_err!("unexpected end of expression"))?;
        self.pos += 1;
        match token {
            Token::Num(n) => Ok(*n),
            Token::Reg(name) => self
                .machine
                .reg_value(name)
                .ok_or_else(|| syntax_err!("unknown register ${}", name)),
            Token::Op(Rule::LParen) => {
                let val = self.nested(Self::and)?;
                if !self.eat(Rule::RParen) {
                    return Err(syntax_err!("missing ')'"));
                }
                Ok(val)
            }
            Token::Op(op) => Err(syntax_err!("unexpected operator {:?}", op)),
        }
    }
}
