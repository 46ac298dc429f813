use super::ast::{
    Argument, BinaryOp, CompoundStmt, Decor, Expr, ExprKind, FuncDecl, Id, ParamDecl, Program,
    Stmt, StmtKind, TypeAst, TypeAstKind, UnaryOp, VarDecl,
};
use super::parsercore::Parser;
use super::token::{Token, TokenKind, TokenKind::*};
use crate::error::Error;
use crate::{check, expect, optional, repeat};

impl<I: Iterator<Item = Token>> Parser<I> {
    pub fn parse(mut self) -> Result<Program, Error> {
        let program = self.parse_program()?;
        tracing::debug!("parsed {} functions", program.funcs.len());
        Ok(program)
    }
}

impl<I: Iterator<Item = Token>> Parser<I> {
    /// program = { func-decl } EOF
    fn parse_program(&mut self) -> Result<Program, Error> {
        let start = self.start();
        let funcs = repeat!(self, self.parse_func_decl(), Eof);
        let span = self.span_from(start);
        expect!(self, Eof, "end of input")?;
        Ok(Program { funcs, span })
    }

    /// func-decl = "func" ident "(" [ param { "," param } ] ")" [ ":" type ] compound
    fn parse_func_decl(&mut self) -> Result<FuncDecl, Error> {
        let start = self.start();
        expect!(self, KwFunc, "'func'")?;
        let id = self.parse_id()?;
        expect!(self, LParen, "'('")?;
        let params = repeat!(self, self.parse_param(), Comma, RParen);
        expect!(self, RParen, "')'")?;
        let ret = match optional!(self, Colon, self.parse_type()?) {
            Some(ret) => ret,
            None => TypeAst::new(TypeAstKind::Void, self.here()),
        };
        let body = self.parse_compound()?;
        Ok(FuncDecl {
            id,
            params,
            ret,
            body,
            span: self.span_from(start),
            scope: Decor::default(),
            ty: Decor::default(),
        })
    }

    /// param = ident ":" type
    fn parse_param(&mut self) -> Result<ParamDecl, Error> {
        let start = self.start();
        let id = self.parse_id()?;
        expect!(self, Colon, "':'")?;
        let type_ast = self.parse_type()?;
        Ok(ParamDecl {
            id,
            type_ast,
            span: self.span_from(start),
            ty: Decor::default(),
        })
    }

    /// var-decl = "var" ident ":" type [ ";" ]
    fn parse_var_decl(&mut self) -> Result<VarDecl, Error> {
        let start = self.start();
        expect!(self, KwVar, "'var'")?;
        let id = self.parse_id()?;
        expect!(self, Colon, "':'")?;
        let type_ast = self.parse_type()?;
        let span = self.span_from(start);
        optional!(self, Semicolon);
        Ok(VarDecl {
            id,
            type_ast,
            span,
            ty: Decor::default(),
        })
    }

    /// type = "int" | "bool" | "void" | "[" int "]" type
    fn parse_type(&mut self) -> Result<TypeAst, Error> {
        let start = self.start();
        let kind = match self.peek().map(|token| token.kind) {
            Some(KwInt) => {
                self.next();
                TypeAstKind::Int
            }
            Some(KwBool) => {
                self.next();
                TypeAstKind::Bool
            }
            Some(KwVoid) => {
                self.next();
                TypeAstKind::Void
            }
            Some(LBracket) => {
                self.next();
                let size = expect!(self, TokenKind::Int, "array size")?;
                let count = size
                    .value
                    .parse::<usize>()
                    .map_err(|_| Error::parse("array size is out of range", size.span))?;
                expect!(self, RBracket, "']'")?;
                let elem = self.parse_type()?;
                TypeAstKind::Array(count, Box::new(elem))
            }
            _ => return Err(self.unexpected("a type")),
        };
        Ok(TypeAst::new(kind, self.span_from(start)))
    }

    /// compound = "{" { var-decl } { stmt } "}"
    fn parse_compound(&mut self) -> Result<CompoundStmt, Error> {
        let start = self.start();
        expect!(self, LCurly, "'{'")?;
        let mut decls = Vec::new();
        while check!(self, KwVar) {
            decls.push(self.parse_var_decl()?);
        }
        let stmts = repeat!(self, self.parse_stmt(), RCurly);
        expect!(self, RCurly, "'}'")?;
        Ok(CompoundStmt::new(decls, stmts, self.span_from(start)))
    }

    fn parse_stmt(&mut self) -> Result<Stmt, Error> {
        let start = self.start();
        let kind = match self.peek().map(|token| token.kind) {
            // Block statement: compound
            Some(LCurly) => StmtKind::Compound(self.parse_compound()?),

            // Conditional statement: "if" expr compound [ "else" compound ]
            Some(KwIf) => {
                self.next();
                let cond = self.parse_expr()?;
                let then = self.parse_compound()?;
                let other = optional!(self, KwElse, self.parse_compound()?);
                StmtKind::If(cond, then, other)
            }

            // Loop statement: "while" expr compound
            Some(KwWhile) => {
                self.next();
                let cond = self.parse_expr()?;
                let body = self.parse_compound()?;
                StmtKind::While(cond, body)
            }

            // Print statement: "print" expr [ ";" ]
            Some(KwPrint) => {
                self.next();
                let expr = self.parse_expr()?;
                StmtKind::Print(expr)
            }

            // Return statement: "return" [ expr ] [ ";" ]
            Some(KwReturn) => {
                self.next();
                let expr = if check!(self, Semicolon | RCurly) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                StmtKind::Return(expr)
            }

            // Call statement: "call" postfix-expr
            Some(KwCall) => {
                self.next();
                let expr = self.parse_postfix_expr()?;
                if !matches!(expr.kind, ExprKind::Call(..)) {
                    return Err(Error::parse("expected a function call", expr.span));
                }
                StmtKind::Call(expr)
            }

            _ => {
                let expr = self.parse_expr()?;
                if optional!(self, Equal).is_some() {
                    // Assignment statement: expr "=" expr
                    let rhs = self.parse_expr()?;
                    StmtKind::Assign(expr, rhs)
                } else if matches!(expr.kind, ExprKind::Call(..)) {
                    // Call statement without the keyword
                    StmtKind::Call(expr)
                } else {
                    return Err(Error::parse(
                        "expression statement must be a function call",
                        expr.span,
                    ));
                }
            }
        };
        let span = self.span_from(start);
        optional!(self, Semicolon);
        Ok(Stmt::new(kind, span))
    }

    /// expr = or-expr
    fn parse_expr(&mut self) -> Result<Expr, Error> {
        self.parse_or_expr()
    }

    /// or-expr = and-expr { "or" and-expr }
    fn parse_or_expr(&mut self) -> Result<Expr, Error> {
        let mut lhs = self.parse_and_expr()?;
        while optional!(self, KwOr).is_some() {
            let rhs = self.parse_and_expr()?;
            lhs = binary(BinaryOp::Or, lhs, rhs);
        }
        Ok(lhs)
    }

    /// and-expr = cmp-expr { "and" cmp-expr }
    fn parse_and_expr(&mut self) -> Result<Expr, Error> {
        let mut lhs = self.parse_cmp_expr()?;
        while optional!(self, KwAnd).is_some() {
            let rhs = self.parse_cmp_expr()?;
            lhs = binary(BinaryOp::And, lhs, rhs);
        }
        Ok(lhs)
    }

    /// cmp-expr = add-expr [ ( "==" | "!=" | "<" | "<=" | ">" | ">=" ) add-expr ]
    fn parse_cmp_expr(&mut self) -> Result<Expr, Error> {
        let lhs = self.parse_add_expr()?;
        let op = match self.peek().map(|token| token.kind) {
            Some(EqualEqual) => BinaryOp::Eq,
            Some(ExclEqual) => BinaryOp::Ne,
            Some(LAngle) => BinaryOp::Lt,
            Some(LAngleEqual) => BinaryOp::Le,
            Some(RAngle) => BinaryOp::Gt,
            Some(RAngleEqual) => BinaryOp::Ge,
            _ => return Ok(lhs),
        };
        self.next();
        let rhs = self.parse_add_expr()?;
        Ok(binary(op, lhs, rhs))
    }

    /// add-expr = mul-expr { ( "+" | "-" ) mul-expr }
    fn parse_add_expr(&mut self) -> Result<Expr, Error> {
        let mut lhs = self.parse_mul_expr()?;
        loop {
            let op = match self.peek().map(|token| token.kind) {
                Some(Plus) => BinaryOp::Add,
                Some(Minus) => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.next();
            let rhs = self.parse_mul_expr()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    /// mul-expr = unary-expr { ( "*" | "/" | "%" ) unary-expr }
    fn parse_mul_expr(&mut self) -> Result<Expr, Error> {
        let mut lhs = self.parse_unary_expr()?;
        loop {
            let op = match self.peek().map(|token| token.kind) {
                Some(Star) => BinaryOp::Mul,
                Some(Slash) => BinaryOp::Div,
                Some(Percent) => BinaryOp::Mod,
                _ => return Ok(lhs),
            };
            self.next();
            let rhs = self.parse_unary_expr()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    /// unary-expr = ( "not" | "-" ) unary-expr | postfix-expr
    fn parse_unary_expr(&mut self) -> Result<Expr, Error> {
        let start = self.start();
        let op = match self.peek().map(|token| token.kind) {
            Some(KwNot) => UnaryOp::Not,
            Some(Minus) => UnaryOp::Neg,
            _ => return self.parse_postfix_expr(),
        };
        self.next();
        let operand = self.parse_unary_expr()?;
        let span = self.span_from(start);
        Ok(Expr::new(ExprKind::Unary(op, Box::new(operand)), span))
    }

    /// postfix-expr = prim-expr { "(" [ arg { "," arg } ] ")" | "[" expr "]" }
    fn parse_postfix_expr(&mut self) -> Result<Expr, Error> {
        let start = self.start();
        let mut expr = self.parse_prim_expr()?;
        loop {
            // Function call: expr "(" [ expr { "," expr } ] ")"
            if optional!(self, LParen).is_some() {
                let args = repeat!(self, self.parse_argument(), Comma, RParen);
                expect!(self, RParen, "')'")?;
                let span = self.span_from(start);
                expr = Expr::new(ExprKind::Call(Box::new(expr), args), span);
                continue;
            }

            // Array indexing: expr "[" expr "]"
            if optional!(self, LBracket).is_some() {
                let index = self.parse_expr()?;
                expect!(self, RBracket, "']'")?;
                let span = self.span_from(start);
                expr = Expr::new(ExprKind::ArrayCell(Box::new(expr), Box::new(index)), span);
                continue;
            }

            break;
        }
        Ok(expr)
    }

    /// prim-expr = ident | int-lit | "true" | "false" | "(" expr ")"
    fn parse_prim_expr(&mut self) -> Result<Expr, Error> {
        match self.peek().map(|token| token.kind) {
            Some(TokenKind::Id) => {
                let id = self.parse_id()?;
                let span = id.span;
                Ok(Expr::new(ExprKind::Id(id), span))
            }
            Some(TokenKind::Int) => {
                let token = expect!(self, TokenKind::Int, "integer literal")?;
                let val = token
                    .value
                    .parse::<i64>()
                    .map_err(|_| Error::parse("integer literal is out of range", token.span))?;
                Ok(Expr::new(ExprKind::Int(val), token.span))
            }
            Some(KwTrue) | Some(KwFalse) => {
                let token = expect!(self, KwTrue | KwFalse, "boolean literal")?;
                let val = token.kind == KwTrue;
                Ok(Expr::new(ExprKind::Bool(val), token.span))
            }
            Some(LParen) => {
                let start = self.start();
                self.next();
                let mut inner = self.parse_expr()?;
                expect!(self, RParen, "')'")?;
                inner.span = self.span_from(start);
                Ok(inner)
            }
            _ => Err(self.unexpected("an expression")),
        }
    }

    fn parse_argument(&mut self) -> Result<Argument, Error> {
        let expr = self.parse_expr()?;
        Ok(Argument {
            span: expr.span,
            expr,
            ty: Decor::default(),
        })
    }

    /// ident = ( "A".."Z" | "a".."z" | "_" ) { "0".."9" | "A".."Z" | "a".."z" | "_" }
    fn parse_id(&mut self) -> Result<Id, Error> {
        let token = expect!(self, TokenKind::Id, "an identifier")?;
        Ok(Id::new(token.value, token.span))
    }
}

fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    let span = lhs.span.to(rhs.span);
    Expr::new(ExprKind::Binary(op, Box::new(lhs), Box::new(rhs)), span)
}
