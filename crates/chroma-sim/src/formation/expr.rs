//! Probability expressions: a tiny arithmetic language over `f64` with one
//! variable, `wave`.
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('-' | '+') unary | primary
//! primary := number | 'wave' | func '(' expr (',' expr)* ')' | '(' expr ')'
//! ```
//!
//! Functions may be written with a `Math.` prefix.

use chroma_core::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    Max,
    Min,
    Abs,
    Floor,
    Ceil,
    Round,
    Sqrt,
    Pow,
}

impl Func {
    fn lookup(name: &str) -> Option<Self> {
        let name = name.strip_prefix("Math.").unwrap_or(name);
        Some(match name {
            "max" => Self::Max,
            "min" => Self::Min,
            "abs" => Self::Abs,
            "floor" => Self::Floor,
            "ceil" => Self::Ceil,
            "round" => Self::Round,
            "sqrt" => Self::Sqrt,
            "pow" => Self::Pow,
            _ => return None,
        })
    }

    fn arity_ok(self, n: usize) -> bool {
        match self {
            Self::Max | Self::Min => n >= 1,
            Self::Pow => n == 2,
            _ => n == 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Num(f64),
    Wave,
    Neg(Box<Expr>),
    Bin(BinOp, Box<Expr>, Box<Expr>),
    Call(Func, Vec<Expr>),
}

impl Expr {
    pub fn parse(source: &str) -> Result<Self, ConfigError> {
        let err = |message: String| ConfigError::Expression {
            expression: source.to_string(),
            message,
        };
        let tokens = tokenize(source).map_err(err)?;
        let mut parser = Parser { tokens, pos: 0 };
        let expr = parser.expr().map_err(err)?;
        match parser.peek() {
            None => Ok(expr),
            Some(tok) => Err(err(format!("unexpected {tok:?}"))),
        }
    }

    pub fn eval(&self, wave: f64) -> f64 {
        match self {
            Self::Num(n) => *n,
            Self::Wave => wave,
            Self::Neg(e) => -e.eval(wave),
            Self::Bin(op, a, b) => {
                let (a, b) = (a.eval(wave), b.eval(wave));
                match op {
                    BinOp::Add => a + b,
                    BinOp::Sub => a - b,
                    BinOp::Mul => a * b,
                    BinOp::Div => a / b,
                }
            }
            Self::Call(func, args) => {
                let mut vals = args.iter().map(|a| a.eval(wave));
                match func {
                    Func::Max => vals.fold(f64::NEG_INFINITY, f64::max),
                    Func::Min => vals.fold(f64::INFINITY, f64::min),
                    Func::Abs => vals.next().unwrap_or(f64::NAN).abs(),
                    Func::Floor => vals.next().unwrap_or(f64::NAN).floor(),
                    Func::Ceil => vals.next().unwrap_or(f64::NAN).ceil(),
                    // Halves round toward +inf.
                    Func::Round => (vals.next().unwrap_or(f64::NAN) + 0.5).floor(),
                    Func::Sqrt => vals.next().unwrap_or(f64::NAN).sqrt(),
                    Func::Pow => {
                        let base = vals.next().unwrap_or(f64::NAN);
                        base.powf(vals.next().unwrap_or(f64::NAN))
                    }
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Ident(String),
    Op(char),
    LParen,
    RParen,
    Comma,
}

fn tokenize(src: &str) -> Result<Vec<Token>, String> {
    let chars: Vec<char> = src.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '+' | '-' | '*' | '/' => {
                tokens.push(Token::Op(c));
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                if i < chars.len() && matches!(chars[i], 'e' | 'E') {
                    i += 1;
                    if i < chars.len() && matches!(chars[i], '+' | '-') {
                        i += 1;
                    }
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                }
                let text: String = chars[start..i].iter().collect();
                let n = text
                    .parse::<f64>()
                    .map_err(|_| format!("bad number `{text}`"))?;
                tokens.push(Token::Num(n));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len()
                    && (chars[i].is_ascii_alphanumeric() || chars[i] == '_' || chars[i] == '.')
                {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            other => return Err(format!("unexpected character `{other}`")),
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        tok
    }

    fn expect(&mut self, want: Token) -> Result<(), String> {
        match self.next() {
            Some(tok) if tok == want => Ok(()),
            Some(tok) => Err(format!("expected {want:?}, found {tok:?}")),
            None => Err(format!("expected {want:?}, found end of input")),
        }
    }

    fn expr(&mut self) -> Result<Expr, String> {
        let mut lhs = self.term()?;
        while let Some(Token::Op(op @ ('+' | '-'))) = self.peek().cloned() {
            self.pos += 1;
            let rhs = self.term()?;
            let op = if op == '+' { BinOp::Add } else { BinOp::Sub };
            lhs = Expr::Bin(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Expr, String> {
        let mut lhs = self.unary()?;
        while let Some(Token::Op(op @ ('*' | '/'))) = self.peek().cloned() {
            self.pos += 1;
            let rhs = self.unary()?;
            let op = if op == '*' { BinOp::Mul } else { BinOp::Div };
            lhs = Expr::Bin(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, String> {
        match self.peek() {
            Some(Token::Op('-')) => {
                self.pos += 1;
                Ok(Expr::Neg(Box::new(self.unary()?)))
            }
            Some(Token::Op('+')) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Expr, String> {
        match self.next() {
            Some(Token::Num(n)) => Ok(Expr::Num(n)),
            Some(Token::LParen) => {
                let inner = self.expr()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Ident(name)) if name == "wave" => Ok(Expr::Wave),
            Some(Token::Ident(name)) => {
                let func = Func::lookup(&name).ok_or_else(|| format!("unknown name `{name}`"))?;
                self.expect(Token::LParen)?;
                let mut args = vec![self.expr()?];
                while self.peek() == Some(&Token::Comma) {
                    self.pos += 1;
                    args.push(self.expr()?);
                }
                self.expect(Token::RParen)?;
                if !func.arity_ok(args.len()) {
                    return Err(format!("`{name}` does not take {} argument(s)", args.len()));
                }
                Ok(Expr::Call(func, args))
            }
            Some(tok) => Err(format!("unexpected {tok:?}")),
            None => Err("unexpected end of input".to_string()),
        }
    }
}
