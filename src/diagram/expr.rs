//! Parser and evaluator for the function strings that arrive in diagram
//! descriptors. The surface syntax is what the problem bank and the models
//! actually emit: JS-style expressions in one variable with `Math.`-prefixed
//! calls, `^` or `**` exponents, and implicit products like `2x`.
//!
//! Evaluation is total: anything the grammar does not cover (or any domain
//! error at eval time) becomes NaN, which the sampler treats as a gap.

const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    Comma,
}

/// Whitelisted functions. `log` is the natural log, as in JS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sqrt,
    Exp,
    Log,
    Abs,
    Floor,
    Ceil,
    Pow,
}

impl Func {
    fn from_name(name: &str) -> Option<Func> {
        let name = name.strip_prefix("Math.").unwrap_or(name);
        match name {
            "sin" => Some(Func::Sin),
            "cos" => Some(Func::Cos),
            "tan" => Some(Func::Tan),
            "asin" => Some(Func::Asin),
            "acos" => Some(Func::Acos),
            "atan" => Some(Func::Atan),
            "sqrt" => Some(Func::Sqrt),
            "exp" => Some(Func::Exp),
            "log" => Some(Func::Log),
            "abs" => Some(Func::Abs),
            "floor" => Some(Func::Floor),
            "ceil" => Some(Func::Ceil),
            "pow" => Some(Func::Pow),
            _ => None,
        }
    }

    fn arity(self) -> usize {
        match self {
            Func::Pow => 2,
            _ => 1,
        }
    }
}

/// Parsed expression tree. Build once with [`parse`], evaluate per sample.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Variable,
    Neg(Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Pow(Box<Expr>, Box<Expr>),
    Call(Func, Vec<Expr>),
}

impl Expr {
    pub fn eval(&self, x: f64) -> f64 {
        match self {
            Expr::Number(n) => *n,
            Expr::Variable => x,
            Expr::Neg(e) => -e.eval(x),
            Expr::Add(a, b) => a.eval(x) + b.eval(x),
            Expr::Sub(a, b) => a.eval(x) - b.eval(x),
            Expr::Mul(a, b) => a.eval(x) * b.eval(x),
            Expr::Div(a, b) => {
                let d = b.eval(x);
                if d == 0.0 { f64::NAN } else { a.eval(x) / d }
            }
            Expr::Pow(a, b) => a.eval(x).powf(b.eval(x)),
            Expr::Call(f, args) => {
                let a = args[0].eval(x);
                match f {
                    Func::Sin => a.sin(),
                    Func::Cos => a.cos(),
                    Func::Tan => a.tan(),
                    Func::Asin => a.asin(),
                    Func::Acos => a.acos(),
                    Func::Atan => a.atan(),
                    Func::Sqrt => a.sqrt(),
                    Func::Exp => a.exp(),
                    Func::Log => a.ln(),
                    Func::Abs => a.abs(),
                    Func::Floor => a.floor(),
                    Func::Ceil => a.ceil(),
                    Func::Pow => a.powf(args[1].eval(x)),
                }
            }
        }
    }
}

fn tokenize(source: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = source.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        if c.is_ascii_digit() || c == '.' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            let text: String = chars[start..i].iter().collect();
            let value: f64 = text
                .parse()
                .map_err(|_| format!("Invalid number '{}'", text))?;
            tokens.push(Token::Number(value));
            continue;
        }
        if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len()
                && (chars[i].is_ascii_alphanumeric() || chars[i] == '_' || chars[i] == '.')
            {
                i += 1;
            }
            tokens.push(Token::Ident(chars[start..i].iter().collect()));
            continue;
        }
        let token = match c {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => {
                if chars.get(i + 1) == Some(&'*') {
                    i += 1;
                    Token::Caret
                } else {
                    Token::Star
                }
            }
            '/' => Token::Slash,
            '^' => Token::Caret,
            '(' => Token::LParen,
            ')' => Token::RParen,
            ',' => Token::Comma,
            _ => return Err(format!("Unexpected character '{}'", c)),
        };
        tokens.push(token);
        i += 1;
    }

    Ok(insert_implicit_products(tokens))
}

/// `2x` and `3(x+1)` mean multiplication. Only a number on the left
/// qualifies; an identifier before `(` is call syntax.
fn insert_implicit_products(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    for token in tokens {
        if matches!(out.last(), Some(Token::Number(_)))
            && matches!(token, Token::Ident(_) | Token::LParen)
        {
            out.push(Token::Star);
        }
        out.push(token);
    }
    out
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: &Token) -> Result<(), String> {
        match self.advance() {
            Some(ref token) if token == expected => Ok(()),
            Some(token) => Err(format!("Expected {:?}, found {:?}", expected, token)),
            None => Err(format!("Expected {:?}, found end of input", expected)),
        }
    }

    fn parse_expr(&mut self, depth: usize) -> Result<Expr, String> {
        if depth > MAX_DEPTH {
            return Err("Expression too deeply nested".to_string());
        }
        let mut lhs = self.parse_term(depth + 1)?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.advance();
                    let rhs = self.parse_term(depth + 1)?;
                    lhs = Expr::Add(Box::new(lhs), Box::new(rhs));
                }
                Some(Token::Minus) => {
                    self.advance();
                    let rhs = self.parse_term(depth + 1)?;
                    lhs = Expr::Sub(Box::new(lhs), Box::new(rhs));
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn parse_term(&mut self, depth: usize) -> Result<Expr, String> {
        if depth > MAX_DEPTH {
            return Err("Expression too deeply nested".to_string());
        }
        let mut lhs = self.parse_unary(depth + 1)?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.advance();
                    let rhs = self.parse_unary(depth + 1)?;
                    lhs = Expr::Mul(Box::new(lhs), Box::new(rhs));
                }
                Some(Token::Slash) => {
                    self.advance();
                    let rhs = self.parse_unary(depth + 1)?;
                    lhs = Expr::Div(Box::new(lhs), Box::new(rhs));
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn parse_unary(&mut self, depth: usize) -> Result<Expr, String> {
        if depth > MAX_DEPTH {
            return Err("Expression too deeply nested".to_string());
        }
        match self.peek() {
            Some(Token::Minus) => {
                self.advance();
                Ok(Expr::Neg(Box::new(self.parse_unary(depth + 1)?)))
            }
            Some(Token::Plus) => {
                self.advance();
                self.parse_unary(depth + 1)
            }
            _ => self.parse_power(depth + 1),
        }
    }

    /// Exponentiation is right-associative and its exponent may carry a sign:
    /// `2^3^2` is `2^(3^2)` and `2^-1` is `0.5`.
    fn parse_power(&mut self, depth: usize) -> Result<Expr, String> {
        if depth > MAX_DEPTH {
            return Err("Expression too deeply nested".to_string());
        }
        let base = self.parse_atom(depth + 1)?;
        if matches!(self.peek(), Some(Token::Caret)) {
            self.advance();
            let exponent = self.parse_unary(depth + 1)?;
            return Ok(Expr::Pow(Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn parse_atom(&mut self, depth: usize) -> Result<Expr, String> {
        match self.advance() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::LParen) => {
                let inner = self.parse_expr(depth + 1)?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Ident(name)) => self.parse_ident(&name, depth),
            Some(token) => Err(format!("Unexpected token {:?}", token)),
            None => Err("Unexpected end of input".to_string()),
        }
    }

    fn parse_ident(&mut self, name: &str, depth: usize) -> Result<Expr, String> {
        if matches!(self.peek(), Some(Token::LParen)) {
            let func = Func::from_name(name)
                .ok_or_else(|| format!("Unknown function '{}'", name))?;
            self.advance();
            let mut args = vec![self.parse_expr(depth + 1)?];
            while matches!(self.peek(), Some(Token::Comma)) {
                self.advance();
                args.push(self.parse_expr(depth + 1)?);
            }
            self.expect(&Token::RParen)?;
            if args.len() != func.arity() {
                return Err(format!(
                    "Function '{}' takes {} argument(s), found {}",
                    name,
                    func.arity(),
                    args.len()
                ));
            }
            return Ok(Expr::Call(func, args));
        }

        match name {
            "x" => Ok(Expr::Variable),
            "PI" | "Math.PI" => Ok(Expr::Number(std::f64::consts::PI)),
            "E" | "Math.E" => Ok(Expr::Number(std::f64::consts::E)),
            _ => Err(format!("Unknown identifier '{}'", name)),
        }
    }
}

/// Parse a function-of-x source string into an expression tree.
pub fn parse(source: &str) -> Result<Expr, String> {
    let tokens = tokenize(source)?;
    if tokens.is_empty() {
        return Err("Empty expression".to_string());
    }
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_expr(0)?;
    if parser.pos != parser.tokens.len() {
        return Err(format!(
            "Unexpected trailing input at token {:?}",
            parser.tokens[parser.pos]
        ));
    }
    Ok(expr)
}

/// Evaluate a source string at x. Total: parse or evaluation failure is NaN.
pub fn evaluate(source: &str, x: f64) -> f64 {
    match parse(source) {
        Ok(expr) => expr.eval(x),
        Err(_) => f64::NAN,
    }
}
