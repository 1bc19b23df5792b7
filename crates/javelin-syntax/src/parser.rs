use std::collections::VecDeque;

use javelin_types::{CompileAbort, Diagnostic, DiagnosticCategory, Span};

use crate::ast::*;
use crate::javadoc::parse_javadoc;
use crate::lexer;
use crate::token::{Token, TokenKind};

/// Options that influence parsing. Passed explicitly; there is no ambient
/// mutable knob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Minimum run length of same-operator binary expressions before the
    /// parser collapses the run into a [`CombinedBinaryExpression`].
    pub combine_threshold: usize,
    /// Eagerly fold adjacent string literal concatenations into one
    /// [`ExtendedStringLiteral`]. When off, adjacent literals are retained as
    /// a [`StringLiteralConcatenation`] so visitors observe each literal.
    pub fold_string_literals: bool,
    /// Attach parsed javadoc structure to declarations.
    pub doc_comment_support: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            combine_threshold: 20,
            fold_string_literals: true,
            doc_comment_support: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutcome {
    pub unit: CompilationUnit,
    pub diagnostics: Vec<Diagnostic>,
}

pub fn parse(source: &str, config: &ParserConfig) -> Result<ParseOutcome, CompileAbort> {
    let _guard = tracing::debug_span!("parse", len = source.len()).entered();

    let (tokens, lex_errors) = lexer::lex_with_errors(source);
    let mut parser = Parser::new(source, config, tokens);
    for err in lex_errors {
        parser.diagnostics.push(Diagnostic::error(
            DiagnosticCategory::Syntax,
            err.message,
            err.span,
        ));
    }

    let unit = parser.parse_compilation_unit()?;
    tracing::debug!(
        types = unit.types.len(),
        problems = parser.diagnostics.len(),
        "parsed compilation unit"
    );
    Ok(ParseOutcome {
        unit,
        diagnostics: parser.diagnostics,
    })
}

struct Parser<'a> {
    source: &'a str,
    config: &'a ParserConfig,
    tokens: VecDeque<Token>,
    diagnostics: Vec<Diagnostic>,
    /// Span of the last consumed non-trivia token; insertion fix-its anchor
    /// after it.
    last_span: Span,
    /// Doc comment waiting to be attached to the next declaration.
    pending_doc: Option<Span>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, config: &'a ParserConfig, tokens: Vec<Token>) -> Self {
        Self {
            source,
            config,
            tokens: VecDeque::from(tokens),
            diagnostics: Vec::new(),
            last_span: Span::new(0, 0),
            pending_doc: None,
        }
    }

    // === compilation unit ===

    fn parse_compilation_unit(&mut self) -> Result<CompilationUnit, CompileAbort> {
        let mut package = None;
        let mut imports = Vec::new();
        let mut types = Vec::new();

        if self.at(TokenKind::PackageKw) {
            package = Some(self.parse_package_decl());
        }
        while self.at(TokenKind::ImportKw) {
            imports.push(self.parse_import_decl());
        }

        while !self.at(TokenKind::Eof) {
            let before = self.tokens.len();
            if self.at_type_decl_start() {
                if let Some(decl) = self.parse_type_declaration() {
                    types.push(decl);
                }
            } else {
                self.report_delete_current();
                self.recover_to(&[
                    TokenKind::ClassKw,
                    TokenKind::InterfaceKw,
                    TokenKind::PublicKw,
                    TokenKind::At,
                    TokenKind::Eof,
                ]);
            }
            if self.tokens.len() == before {
                return Err(CompileAbort::new(
                    "parser made no progress at top level; no recovery token found",
                ));
            }
        }

        Ok(CompilationUnit {
            package,
            imports,
            types,
            span: Span::new(0, self.source.len()),
        })
    }

    fn parse_package_decl(&mut self) -> PackageDeclaration {
        let start = self.current_span().start;
        self.bump(); // package
        let name = self.parse_dotted_name();
        self.expect_semicolon("CompilationUnit");
        PackageDeclaration {
            name,
            span: Span::new(start, self.last_span.end),
        }
    }

    fn parse_import_decl(&mut self) -> ImportDeclaration {
        let start = self.current_span().start;
        self.bump(); // import
        let is_static = if self.at(TokenKind::StaticKw) {
            self.bump();
            true
        } else {
            false
        };
        let mut path = self.parse_dotted_name();
        let mut on_demand = false;
        if self.at(TokenKind::Dot) && self.nth(1) == Some(TokenKind::Star) {
            self.bump();
            self.bump();
            path.push_str(".*");
            on_demand = true;
        }
        self.expect_semicolon("CompilationUnit");
        ImportDeclaration {
            path,
            is_static,
            on_demand,
            span: Span::new(start, self.last_span.end),
        }
    }

    // === type declarations ===

    fn at_type_decl_start(&mut self) -> bool {
        matches!(
            self.current(),
            TokenKind::ClassKw | TokenKind::InterfaceKw | TokenKind::At
        ) || self.current().is_modifier_keyword()
    }

    fn parse_type_declaration(&mut self) -> Option<TypeDeclaration> {
        let javadoc = self.take_javadoc();
        let start = self.current_span().start;
        let annotations = self.parse_modifiers();

        let kind = match self.current() {
            TokenKind::ClassKw => TypeKind::Class,
            TokenKind::InterfaceKw => TypeKind::Interface,
            _ => {
                self.report_delete_current();
                self.recover_to(&[
                    TokenKind::ClassKw,
                    TokenKind::InterfaceKw,
                    TokenKind::RBrace,
                    TokenKind::Eof,
                ]);
                return None;
            }
        };
        self.bump();

        let (name, name_span) = self.expect_identifier("ClassHeader");

        let mut superclass = None;
        let mut superinterfaces = Vec::new();
        if self.at(TokenKind::ExtendsKw) {
            self.bump();
            if kind == TypeKind::Class {
                superclass = Some(self.parse_type_reference());
            } else {
                // Interfaces extend a list.
                superinterfaces.push(self.parse_type_reference());
                while self.at(TokenKind::Comma) {
                    self.bump();
                    superinterfaces.push(self.parse_type_reference());
                }
            }
        }
        if self.at(TokenKind::ImplementsKw) {
            self.bump();
            superinterfaces.push(self.parse_type_reference());
            while self.at(TokenKind::Comma) {
                self.bump();
                superinterfaces.push(self.parse_type_reference());
            }
        }

        let members = self.parse_class_body(&name);

        Some(TypeDeclaration {
            kind,
            javadoc,
            annotations,
            name,
            name_span,
            superclass,
            superinterfaces,
            members,
            span: Span::new(start, self.last_span.end),
        })
    }

    fn parse_class_body(&mut self, type_name: &str) -> Vec<Member> {
        let mut members = Vec::new();
        if !self.expect(TokenKind::LBrace, "ClassBody") {
            return members;
        }
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            let before = self.tokens.len();
            self.parse_class_member(type_name, &mut members);
            if self.tokens.len() == before {
                // No member production consumed anything; force progress.
                self.report_delete_current();
                self.bump_any();
            }
        }
        self.expect(TokenKind::RBrace, "ClassBody");
        members
    }

    fn parse_class_member(&mut self, type_name: &str, members: &mut Vec<Member>) {
        if self.at(TokenKind::Semicolon) {
            self.bump();
            return;
        }

        let javadoc = self.take_javadoc();
        let start = self.current_span().start;
        let annotations = self.parse_modifiers();

        // Constructor: TypeName '('
        if self.at_identifier()
            && self.nth(1) == Some(TokenKind::LParen)
            && self.current_text() == type_name
        {
            let (name, name_span) = self.expect_identifier("ConstructorDeclaration");
            let arguments = self.parse_parameter_list();
            let thrown = self.parse_throws_opt();
            let body = Some(self.parse_block());
            members.push(Member::Method(MethodDeclaration {
                javadoc,
                annotations,
                return_type: None,
                name,
                name_span,
                arguments,
                thrown,
                body,
                span: Span::new(start, self.last_span.end),
            }));
            return;
        }

        // Method or field: both start with a type (or `void`).
        let return_type = if self.at(TokenKind::VoidKw) {
            let span = self.current_span();
            self.bump();
            TypeReference {
                text: "void".to_string(),
                span,
            }
        } else if self.at_type_start() {
            self.parse_type_reference()
        } else {
            self.report_delete_current();
            self.recover_to_class_member_boundary();
            return;
        };

        if !self.at_identifier() {
            self.report_insert_here("Identifier", "ClassBodyDeclarations");
            self.recover_to_class_member_boundary();
            return;
        }

        if self.nth(1) == Some(TokenKind::LParen) {
            let (name, name_span) = self.expect_identifier("MethodDeclaration");
            let arguments = self.parse_parameter_list();
            let thrown = self.parse_throws_opt();
            let body = if self.at(TokenKind::LBrace) {
                Some(self.parse_block())
            } else {
                self.expect_semicolon("MethodDeclaration");
                None
            };
            members.push(Member::Method(MethodDeclaration {
                javadoc,
                annotations,
                return_type: Some(return_type),
                name,
                name_span,
                arguments,
                thrown,
                body,
                span: Span::new(start, self.last_span.end),
            }));
            return;
        }

        // Field declaration, possibly with a declarator list; each declarator
        // becomes its own field node sharing the declared type.
        let mut first = true;
        loop {
            let (name, name_span) = self.expect_identifier("FieldDeclaration");
            let initializer = if self.at(TokenKind::Eq) {
                self.bump();
                Some(self.parse_expression(0))
            } else {
                None
            };
            members.push(Member::Field(FieldDeclaration {
                javadoc: if first { javadoc.clone() } else { None },
                annotations: if first { annotations.clone() } else { Vec::new() },
                ty: return_type.clone(),
                name,
                name_span,
                initializer,
                span: Span::new(if first { start } else { name_span.start }, self.last_span.end),
            }));
            first = false;
            if self.at(TokenKind::Comma) {
                self.bump();
                continue;
            }
            break;
        }
        self.expect_semicolon("FieldDeclaration");
    }

    fn parse_throws_opt(&mut self) -> Vec<TypeReference> {
        let mut thrown = Vec::new();
        if !self.at(TokenKind::ThrowsKw) {
            return thrown;
        }
        self.bump();
        thrown.push(self.parse_type_reference());
        while self.at(TokenKind::Comma) {
            self.bump();
            thrown.push(self.parse_type_reference());
        }
        thrown
    }

    fn parse_parameter_list(&mut self) -> Vec<Argument> {
        let mut arguments = Vec::new();
        self.expect(TokenKind::LParen, "MethodDeclaration");
        while !self.at(TokenKind::RParen) && !self.at(TokenKind::Eof) {
            arguments.push(self.parse_argument());
            if self.at(TokenKind::Comma) {
                self.bump();
                continue;
            }
            break;
        }
        self.expect(TokenKind::RParen, "MethodDeclaration");
        arguments
    }

    fn parse_argument(&mut self) -> Argument {
        let start = self.current_span().start;
        let annotations = self.parse_modifiers();
        let ty = if self.at_type_start() {
            self.parse_type_reference()
        } else {
            self.report_insert_here("Type", "FormalParameter");
            TypeReference {
                text: String::new(),
                span: self.current_span(),
            }
        };
        let (name, name_span) = self.expect_identifier("FormalParameter");
        Argument {
            annotations,
            ty,
            name,
            name_span,
            span: Span::new(start, self.last_span.end),
        }
    }

    /// Annotations and modifier keywords. Modifier keywords are consumed but
    /// not recorded; only annotations shape downstream analysis.
    fn parse_modifiers(&mut self) -> Vec<Annotation> {
        let mut annotations = Vec::new();
        loop {
            if self.at(TokenKind::At) {
                annotations.push(self.parse_annotation());
                continue;
            }
            if self.current().is_modifier_keyword() {
                self.bump();
                continue;
            }
            break;
        }
        annotations
    }

    fn parse_annotation(&mut self) -> Annotation {
        let start = self.current_span().start;
        self.bump(); // @
        let name = self.parse_dotted_name();

        if !self.at(TokenKind::LParen) {
            return Annotation::Marker(MarkerAnnotation {
                name,
                span: Span::new(start, self.last_span.end),
            });
        }
        self.bump(); // (

        // `@A()` and `@A(x = 1, ...)` are normal annotations; a bare value is
        // the implicit single `value` member.
        if self.at(TokenKind::RParen) {
            self.bump();
            return Annotation::Normal(NormalAnnotation {
                name,
                pairs: Vec::new(),
                span: Span::new(start, self.last_span.end),
            });
        }

        if self.at_identifier() && self.nth(1) == Some(TokenKind::Eq) {
            let mut pairs = Vec::new();
            loop {
                let pair_start = self.current_span().start;
                let (pair_name, name_span) = self.expect_identifier("Annotation");
                self.expect(TokenKind::Eq, "Annotation");
                let value = self.parse_expression(2);
                pairs.push(MemberValuePair {
                    name: pair_name,
                    name_span,
                    value,
                    span: Span::new(pair_start, self.last_span.end),
                });
                if self.at(TokenKind::Comma) {
                    self.bump();
                    continue;
                }
                break;
            }
            self.expect(TokenKind::RParen, "Annotation");
            return Annotation::Normal(NormalAnnotation {
                name,
                pairs,
                span: Span::new(start, self.last_span.end),
            });
        }

        let value = self.parse_expression(2);
        self.expect(TokenKind::RParen, "Annotation");
        Annotation::SingleMember(SingleMemberAnnotation {
            name,
            value,
            span: Span::new(start, self.last_span.end),
        })
    }

    // === statements ===

    fn parse_block(&mut self) -> Block {
        let start = self.current_span().start;
        self.expect(TokenKind::LBrace, "Block");
        let mut statements = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            let before = self.tokens.len();
            statements.push(self.parse_statement());
            if self.tokens.len() == before {
                self.report_delete_current();
                self.bump_any();
            }
        }
        self.expect(TokenKind::RBrace, "Block");
        Block {
            statements,
            span: Span::new(start, self.last_span.end),
        }
    }

    fn parse_statement(&mut self) -> Statement {
        let start = self.current_span().start;
        match self.current() {
            TokenKind::LBrace => Statement::Block(self.parse_block()),
            TokenKind::IfKw => {
                self.bump();
                self.expect(TokenKind::LParen, "IfStatement");
                let condition = self.parse_expression(0);
                self.expect(TokenKind::RParen, "IfStatement");
                let then_branch = Box::new(self.parse_statement());
                let else_branch = if self.at(TokenKind::ElseKw) {
                    self.bump();
                    Some(Box::new(self.parse_statement()))
                } else {
                    None
                };
                Statement::If {
                    condition,
                    then_branch,
                    else_branch,
                    span: Span::new(start, self.last_span.end),
                }
            }
            TokenKind::WhileKw => {
                self.bump();
                self.expect(TokenKind::LParen, "WhileStatement");
                let condition = self.parse_expression(0);
                self.expect(TokenKind::RParen, "WhileStatement");
                let body = Box::new(self.parse_statement());
                Statement::While {
                    condition,
                    body,
                    span: Span::new(start, self.last_span.end),
                }
            }
            TokenKind::DoKw => {
                self.bump();
                let body = Box::new(self.parse_statement());
                self.expect(TokenKind::WhileKw, "DoStatement");
                self.expect(TokenKind::LParen, "DoStatement");
                let condition = self.parse_expression(0);
                self.expect(TokenKind::RParen, "DoStatement");
                self.expect_semicolon("DoStatement");
                Statement::Do {
                    body,
                    condition,
                    span: Span::new(start, self.last_span.end),
                }
            }
            TokenKind::ForKw => self.parse_for_statement(start),
            TokenKind::TryKw => self.parse_try_statement(start),
            TokenKind::ReturnKw => {
                self.bump();
                let value = if self.at(TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expression(0))
                };
                self.expect_semicolon("ReturnStatement");
                Statement::Return {
                    value,
                    span: Span::new(start, self.last_span.end),
                }
            }
            TokenKind::ThrowKw => {
                self.bump();
                let value = self.parse_expression(0);
                self.expect_semicolon("ThrowStatement");
                Statement::Throw {
                    value,
                    span: Span::new(start, self.last_span.end),
                }
            }
            TokenKind::BreakKw => {
                self.bump();
                self.expect_semicolon("BreakStatement");
                Statement::Break {
                    span: Span::new(start, self.last_span.end),
                }
            }
            TokenKind::ContinueKw => {
                self.bump();
                self.expect_semicolon("ContinueStatement");
                Statement::Continue {
                    span: Span::new(start, self.last_span.end),
                }
            }
            TokenKind::Semicolon => {
                self.bump();
                Statement::Empty {
                    span: Span::new(start, self.last_span.end),
                }
            }
            _ => {
                if self.at_local_var_decl_start() {
                    let local = self.parse_local_declaration();
                    self.expect_semicolon("LocalVariableDeclarationStatement");
                    Statement::Local(local)
                } else {
                    let expression = self.parse_expression(0);
                    self.expect_semicolon("Statement");
                    Statement::Expression {
                        expression,
                        span: Span::new(start, self.last_span.end),
                    }
                }
            }
        }
    }

    fn parse_local_declaration(&mut self) -> LocalDeclaration {
        let start = self.current_span().start;
        let annotations = self.parse_modifiers();
        let ty = self.parse_type_reference();
        let (name, name_span) = self.expect_identifier("LocalVariableDeclaration");
        let initializer = if self.at(TokenKind::Eq) {
            self.bump();
            Some(self.parse_expression(0))
        } else {
            None
        };
        LocalDeclaration {
            annotations,
            ty,
            name,
            name_span,
            initializer,
            span: Span::new(start, self.last_span.end),
        }
    }

    fn parse_for_statement(&mut self, start: usize) -> Statement {
        self.bump(); // for
        self.expect(TokenKind::LParen, "ForStatement");

        let mut init = Vec::new();
        if !self.at(TokenKind::Semicolon) {
            if self.at_local_var_decl_start() {
                init.push(Statement::Local(self.parse_local_declaration()));
            } else {
                let expr_start = self.current_span().start;
                let expression = self.parse_expression(0);
                init.push(Statement::Expression {
                    expression,
                    span: Span::new(expr_start, self.last_span.end),
                });
            }
        }
        self.expect(TokenKind::Semicolon, "ForStatement");

        let condition = if self.at(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression(0))
        };
        self.expect(TokenKind::Semicolon, "ForStatement");

        let mut update = Vec::new();
        if !self.at(TokenKind::RParen) {
            update.push(self.parse_expression(0));
            while self.at(TokenKind::Comma) {
                self.bump();
                update.push(self.parse_expression(0));
            }
        }
        self.expect(TokenKind::RParen, "ForStatement");

        let body = Box::new(self.parse_statement());
        Statement::For {
            init,
            condition,
            update,
            body,
            span: Span::new(start, self.last_span.end),
        }
    }

    fn parse_try_statement(&mut self, start: usize) -> Statement {
        self.bump(); // try
        let body = self.parse_block();
        let mut catches = Vec::new();
        while self.at(TokenKind::CatchKw) {
            let catch_start = self.current_span().start;
            self.bump();
            self.expect(TokenKind::LParen, "CatchClause");
            let parameter = self.parse_argument();
            self.expect(TokenKind::RParen, "CatchClause");
            let catch_body = self.parse_block();
            catches.push(CatchClause {
                parameter,
                body: catch_body,
                span: Span::new(catch_start, self.last_span.end),
            });
        }
        let finally = if self.at(TokenKind::FinallyKw) {
            self.bump();
            Some(self.parse_block())
        } else {
            None
        };
        Statement::Try {
            body,
            catches,
            finally,
            span: Span::new(start, self.last_span.end),
        }
    }

    // === expressions ===

    fn parse_expression(&mut self, min_bp: u8) -> Expression {
        let mut lhs = self.parse_primary();

        loop {
            let op = self.current();

            // Postfix: call, member access, array access, ++/--.
            match op {
                TokenKind::Dot if min_bp <= 120 => {
                    if self.nth(1) == Some(TokenKind::Identifier) {
                        lhs = self.parse_selector(lhs);
                        continue;
                    }
                    break;
                }
                TokenKind::LBracket if min_bp <= 120 => {
                    let start = lhs.span().start;
                    self.bump();
                    let index = self.parse_expression(0);
                    self.expect(TokenKind::RBracket, "ArrayAccess");
                    lhs = Expression::ArrayAccess(ArrayAccess {
                        array: Box::new(lhs),
                        index: Box::new(index),
                        span: Span::new(start, self.last_span.end),
                    });
                    continue;
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus if min_bp <= 120 => {
                    let operator = if op == TokenKind::PlusPlus {
                        UnaryOperator::PostIncrement
                    } else {
                        UnaryOperator::PostDecrement
                    };
                    let start = lhs.span().start;
                    self.bump();
                    lhs = Expression::Unary(UnaryExpression {
                        operator,
                        operand: Box::new(lhs),
                        span: Span::new(start, self.last_span.end),
                    });
                    continue;
                }
                _ => {}
            }

            if op == TokenKind::InstanceofKw {
                let (l_bp, _) = (50u8, 51u8);
                if l_bp < min_bp {
                    break;
                }
                let start = lhs.span().start;
                self.bump();
                let ty = self.parse_type_reference();
                lhs = Expression::InstanceOf(InstanceOfExpression {
                    operand: Box::new(lhs),
                    ty,
                    span: Span::new(start, self.last_span.end),
                });
                continue;
            }

            if let Some((l_bp, r_bp, operator)) = infix_binding_power(op) {
                if l_bp < min_bp {
                    break;
                }
                self.bump();
                let rhs = self.parse_expression(r_bp);
                lhs = self.build_binary(lhs, operator, rhs);
                continue;
            }

            if let Some(operator) = assignment_operator(op) {
                let (l_bp, r_bp) = (1u8, 0u8);
                if l_bp < min_bp {
                    break;
                }
                let start = lhs.span().start;
                self.bump();
                let value = self.parse_expression(r_bp);
                lhs = Expression::Assignment(Assignment {
                    target: Box::new(lhs),
                    operator,
                    value: Box::new(value),
                    span: Span::new(start, self.last_span.end),
                });
                continue;
            }

            if op == TokenKind::Question {
                let (l_bp, r_bp) = (2u8, 1u8);
                if l_bp < min_bp {
                    break;
                }
                let start = lhs.span().start;
                self.bump();
                let then_value = self.parse_expression(0);
                self.expect(TokenKind::Colon, "ConditionalExpression");
                let else_value = self.parse_expression(r_bp);
                lhs = Expression::Conditional(ConditionalExpression {
                    condition: Box::new(lhs),
                    then_value: Box::new(then_value),
                    else_value: Box::new(else_value),
                    span: Span::new(start, self.last_span.end),
                });
                continue;
            }

            break;
        }

        lhs
    }

    fn parse_selector(&mut self, receiver: Expression) -> Expression {
        let start = receiver.span().start;
        self.bump(); // .
        let name_span = self.current_span();
        let name = self.current_text().to_string();
        self.bump(); // identifier

        if self.at(TokenKind::LParen) {
            let arguments = self.parse_argument_expressions();
            return Expression::MethodCall(MethodCall {
                receiver: Some(Box::new(receiver)),
                name,
                name_span,
                arguments,
                span: Span::new(start, self.last_span.end),
            });
        }

        // Plain name chains stay name references; anything else is a field
        // access off a computed receiver.
        match receiver {
            Expression::SingleName(base) => {
                Expression::QualifiedName(QualifiedNameReference {
                    path: format!("{}.{name}", base.name),
                    span: Span::new(start, name_span.end),
                })
            }
            Expression::QualifiedName(base) => {
                Expression::QualifiedName(QualifiedNameReference {
                    path: format!("{}.{name}", base.path),
                    span: Span::new(start, name_span.end),
                })
            }
            other => Expression::FieldAccess(FieldAccess {
                receiver: Box::new(other),
                name,
                name_span,
                span: Span::new(start, name_span.end),
            }),
        }
    }

    fn parse_argument_expressions(&mut self) -> Vec<Expression> {
        let mut arguments = Vec::new();
        self.expect(TokenKind::LParen, "MethodInvocation");
        while !self.at(TokenKind::RParen) && !self.at(TokenKind::Eof) {
            arguments.push(self.parse_expression(2));
            if self.at(TokenKind::Comma) {
                self.bump();
                continue;
            }
            break;
        }
        self.expect(TokenKind::RParen, "MethodInvocation");
        arguments
    }

    fn parse_primary(&mut self) -> Expression {
        let span = self.current_span();
        match self.current() {
            TokenKind::StringLiteral => {
                let value = crate::literals::unescape_string_literal(self.current_text())
                    .unwrap_or_default();
                self.bump();
                Expression::StringLiteral(StringLiteral { value, span })
            }
            TokenKind::CharLiteral => {
                let value =
                    crate::literals::unescape_char_literal(self.current_text()).unwrap_or('\0');
                self.bump();
                Expression::CharLiteral(CharLiteral { value, span })
            }
            TokenKind::IntLiteral => {
                let text = self.current_text().to_string();
                self.bump();
                Expression::IntLiteral(IntLiteral { text, span })
            }
            TokenKind::TrueKw | TokenKind::FalseKw => {
                let value = self.at(TokenKind::TrueKw);
                self.bump();
                Expression::BoolLiteral(BoolLiteral { value, span })
            }
            TokenKind::NullKw => {
                self.bump();
                Expression::NullLiteral(NullLiteral { span })
            }
            TokenKind::ThisKw => {
                self.bump();
                Expression::This(ThisReference { span })
            }
            TokenKind::NewKw => {
                self.bump();
                let ty = self.parse_type_reference();
                let arguments = if self.at(TokenKind::LParen) {
                    self.parse_argument_expressions()
                } else {
                    Vec::new()
                };
                Expression::New(AllocationExpression {
                    ty,
                    arguments,
                    span: Span::new(span.start, self.last_span.end),
                })
            }
            TokenKind::Identifier => {
                let name = self.current_text().to_string();
                self.bump();
                if self.at(TokenKind::LParen) {
                    let arguments = self.parse_argument_expressions();
                    Expression::MethodCall(MethodCall {
                        receiver: None,
                        name,
                        name_span: span,
                        arguments,
                        span: Span::new(span.start, self.last_span.end),
                    })
                } else {
                    Expression::SingleName(SingleNameReference { name, span })
                }
            }
            TokenKind::LParen => {
                self.bump();
                let inner = self.parse_expression(0);
                self.expect(TokenKind::RParen, "Expression");
                Expression::Parenthesized(ParenthesizedExpression {
                    inner: Box::new(inner),
                    span: Span::new(span.start, self.last_span.end),
                })
            }
            TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Bang
            | TokenKind::Tilde
            | TokenKind::PlusPlus
            | TokenKind::MinusMinus => {
                let operator = match self.current() {
                    TokenKind::Plus => UnaryOperator::Plus,
                    TokenKind::Minus => UnaryOperator::Minus,
                    TokenKind::Bang => UnaryOperator::Not,
                    TokenKind::Tilde => UnaryOperator::BitNot,
                    TokenKind::PlusPlus => UnaryOperator::PreIncrement,
                    _ => UnaryOperator::PreDecrement,
                };
                self.bump();
                let operand = self.parse_expression(100);
                Expression::Unary(UnaryExpression {
                    operator,
                    operand: Box::new(operand),
                    span: Span::new(span.start, self.last_span.end),
                })
            }
            _ => {
                // No expression can start here; report and consume one token
                // so the caller keeps making progress.
                self.report_delete_current();
                if !self.at(TokenKind::Eof) {
                    self.bump_any();
                }
                Expression::SingleName(SingleNameReference {
                    name: String::new(),
                    span,
                })
            }
        }
    }

    /// Construct a binary node, applying string-literal folding and the
    /// combined-expression compaction policy.
    fn build_binary(
        &mut self,
        left: Expression,
        operator: BinaryOperator,
        right: Expression,
    ) -> Expression {
        let span = left.span().cover(right.span());

        if operator == BinaryOperator::Plus {
            if self.config.fold_string_literals {
                let folded_value = match (&left, &right) {
                    (Expression::StringLiteral(l), Expression::StringLiteral(r)) => {
                        Some(format!("{}{}", l.value, r.value))
                    }
                    (Expression::ExtendedStringLiteral(l), Expression::StringLiteral(r)) => {
                        Some(format!("{}{}", l.value, r.value))
                    }
                    _ => None,
                };
                if let Some(value) = folded_value {
                    return Expression::ExtendedStringLiteral(ExtendedStringLiteral {
                        value,
                        span,
                    });
                }
            } else {
                match (left, right) {
                    (Expression::StringLiteral(l), Expression::StringLiteral(r)) => {
                        return Expression::StringConcatenation(StringLiteralConcatenation {
                            literals: vec![l, r],
                            span,
                        });
                    }
                    (
                        Expression::StringConcatenation(mut chain),
                        Expression::StringLiteral(r),
                    ) => {
                        chain.literals.push(r);
                        chain.span = span;
                        return Expression::StringConcatenation(chain);
                    }
                    (l, r) => {
                        return self.maybe_combine(BinaryExpression {
                            left: Box::new(l),
                            operator,
                            right: Box::new(r),
                            span,
                        });
                    }
                }
            }
        }

        self.maybe_combine(BinaryExpression {
            left: Box::new(left),
            operator,
            right: Box::new(right),
            span,
        })
    }

    /// Collapse the tail of a left-nested same-operator run into one
    /// [`CombinedBinaryExpression`] once the run reaches the configured
    /// threshold. The run counter implicitly resets at every collapse: a
    /// combined node never extends an existing run, it heads the next one.
    fn maybe_combine(&mut self, binary: BinaryExpression) -> Expression {
        let operator = binary.operator;
        if !operator.is_combinable() || self.config.combine_threshold == 0 {
            return Expression::Binary(binary);
        }

        let mut run = 1usize;
        let mut cursor: &Expression = &binary.left;
        while let Expression::Binary(inner) = cursor {
            if inner.operator != operator {
                break;
            }
            run += 1;
            cursor = &inner.left;
        }
        if run < self.config.combine_threshold {
            return Expression::Binary(binary);
        }

        let span = binary.span;
        let mut rights = Vec::with_capacity(run);
        let mut cur = Expression::Binary(binary);
        let head = loop {
            cur = match cur {
                Expression::Binary(b) if b.operator == operator => {
                    rights.push(*b.right);
                    *b.left
                }
                other => break other,
            };
        };
        rights.reverse();

        // A constant chain head cannot start a combinable run by itself; the
        // resulting node is degenerate and excluded from combined dispatch.
        let degenerate = head.is_constant_literal();

        let mut references = Vec::with_capacity(rights.len());
        let mut cover = head.span();
        let mut operands = Vec::with_capacity(rights.len() + 1);
        operands.push(head);
        for right in rights {
            cover = cover.cover(right.span());
            references.push(cover);
            operands.push(right);
        }

        Expression::CombinedBinary(CombinedBinaryExpression {
            operator,
            operands,
            references: if degenerate { None } else { Some(references) },
            span,
        })
    }

    // === types & names ===

    fn at_type_start(&mut self) -> bool {
        self.current().is_primitive_type() || self.at_identifier()
    }

    fn parse_type_reference(&mut self) -> TypeReference {
        let start = self.current_span().start;
        let mut text = String::new();

        if self.current().is_primitive_type() {
            text.push_str(self.current_text());
            self.bump();
        } else if self.at_identifier() {
            text.push_str(self.current_text());
            self.bump();
            while self.at(TokenKind::Dot) && self.nth(1) == Some(TokenKind::Identifier) {
                self.bump();
                text.push('.');
                text.push_str(self.current_text());
                self.bump();
            }
        } else {
            self.report_insert_here("Type", "Type");
            return TypeReference {
                text,
                span: self.current_span(),
            };
        }

        while self.at(TokenKind::LBracket) && self.nth(1) == Some(TokenKind::RBracket) {
            self.bump();
            self.bump();
            text.push_str("[]");
        }

        TypeReference {
            text,
            span: Span::new(start, self.last_span.end),
        }
    }

    fn parse_dotted_name(&mut self) -> String {
        let mut name = String::new();
        if self.at_identifier() {
            name.push_str(self.current_text());
            self.bump();
            while self.at(TokenKind::Dot) && self.nth(1) == Some(TokenKind::Identifier) {
                self.bump();
                name.push('.');
                name.push_str(self.current_text());
                self.bump();
            }
        } else {
            self.report_insert_here("Identifier", "Name");
        }
        name
    }

    fn at_local_var_decl_start(&mut self) -> bool {
        let mut i = self.skip_trivia_from(0);

        // Local modifiers: `final` and annotations (skipped loosely).
        loop {
            match self.token_kind_at(i) {
                Some(TokenKind::FinalKw) => i = self.skip_trivia_from(i + 1),
                Some(TokenKind::At) => {
                    i = self.skip_trivia_from(i + 1);
                    while matches!(
                        self.token_kind_at(i),
                        Some(TokenKind::Identifier) | Some(TokenKind::Dot)
                    ) {
                        i += 1;
                    }
                    i = self.skip_trivia_from(i);
                    if self.token_kind_at(i) == Some(TokenKind::LParen) {
                        i = self.skip_balanced_parens(i);
                    }
                    i = self.skip_trivia_from(i);
                }
                _ => break,
            }
        }

        let Some(first) = self.token_kind_at(i) else {
            return false;
        };

        if first.is_primitive_type() {
            i = self.skip_trivia_from(i + 1);
        } else if first == TokenKind::Identifier {
            i = self.skip_trivia_from(i + 1);
            loop {
                if self.token_kind_at(i) != Some(TokenKind::Dot) {
                    break;
                }
                let seg = self.skip_trivia_from(i + 1);
                if self.token_kind_at(seg) != Some(TokenKind::Identifier) {
                    break;
                }
                i = self.skip_trivia_from(seg + 1);
            }
        } else {
            return false;
        }

        // Array dims.
        loop {
            if self.token_kind_at(i) != Some(TokenKind::LBracket) {
                break;
            }
            let close = self.skip_trivia_from(i + 1);
            if self.token_kind_at(close) != Some(TokenKind::RBracket) {
                return false;
            }
            i = self.skip_trivia_from(close + 1);
        }

        self.token_kind_at(i) == Some(TokenKind::Identifier)
    }

    // === cursor helpers ===

    fn token_kind_at(&self, idx: usize) -> Option<TokenKind> {
        self.tokens.get(idx).map(|t| t.kind)
    }

    fn skip_trivia_from(&self, mut idx: usize) -> usize {
        while self
            .tokens
            .get(idx)
            .map_or(false, |t| t.kind.is_trivia())
        {
            idx += 1;
        }
        idx
    }

    fn skip_balanced_parens(&self, mut idx: usize) -> usize {
        let mut depth = 0usize;
        while let Some(tok) = self.tokens.get(idx) {
            match tok.kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return idx + 1;
                    }
                }
                TokenKind::Eof => break,
                _ => {}
            }
            idx += 1;
        }
        idx
    }

    fn current(&mut self) -> TokenKind {
        self.eat_trivia();
        self.tokens.front().map(|t| t.kind).unwrap_or(TokenKind::Eof)
    }

    fn current_span(&mut self) -> Span {
        self.eat_trivia();
        self.tokens
            .front()
            .map(|t| t.span)
            .unwrap_or_else(|| Span::new(self.source.len(), self.source.len()))
    }

    fn current_text(&mut self) -> &'a str {
        self.eat_trivia();
        match self.tokens.front() {
            Some(tok) => &self.source[tok.span.start..tok.span.end],
            None => "",
        }
    }

    fn nth(&mut self, n: usize) -> Option<TokenKind> {
        self.eat_trivia();
        let mut idx = 0usize;
        let mut remaining = n;
        while let Some(tok) = self.tokens.get(idx) {
            if tok.kind.is_trivia() {
                idx += 1;
                continue;
            }
            if remaining == 0 {
                return Some(tok.kind);
            }
            remaining -= 1;
            idx += 1;
        }
        None
    }

    fn at(&mut self, kind: TokenKind) -> bool {
        self.current() == kind
    }

    fn at_identifier(&mut self) -> bool {
        self.current() == TokenKind::Identifier
    }

    fn eat_trivia(&mut self) {
        while let Some(tok) = self.tokens.front() {
            if !tok.kind.is_trivia() {
                break;
            }
            if self.config.doc_comment_support && tok.kind.is_doc_comment() {
                // Runs of `///` lines merge into one doc block.
                let span = tok.span;
                self.pending_doc = match self.pending_doc.take() {
                    Some(prev) if tok.kind == TokenKind::MarkdownDocComment => {
                        Some(prev.cover(span))
                    }
                    _ => Some(span),
                };
            }
            self.tokens.pop_front();
        }
    }

    fn take_javadoc(&mut self) -> Option<Javadoc> {
        self.eat_trivia();
        let span = self.pending_doc.take()?;
        Some(parse_javadoc(self.source, span))
    }

    fn bump(&mut self) {
        self.eat_trivia();
        self.bump_any();
    }

    fn bump_any(&mut self) {
        if let Some(tok) = self.tokens.pop_front() {
            if !tok.kind.is_trivia() {
                self.last_span = tok.span;
            }
        }
    }

    fn expect(&mut self, kind: TokenKind, context: &str) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            self.report_insert_here(token_display(kind), context);
            false
        }
    }

    fn expect_semicolon(&mut self, context: &str) {
        self.expect(TokenKind::Semicolon, context);
    }

    fn expect_identifier(&mut self, context: &str) -> (String, Span) {
        if self.at_identifier() {
            let span = self.current_span();
            let name = self.current_text().to_string();
            self.bump();
            (name, span)
        } else {
            self.report_insert_here("Identifier", context);
            (String::new(), self.current_span())
        }
    }

    /// `Syntax error, insert "X" to complete Y`, caret on the token after
    /// which the synthetic token is inserted.
    fn report_insert_here(&mut self, inserted: &str, context: &str) {
        let anchor = if self.last_span.is_empty() && self.last_span.start == 0 {
            self.current_span()
        } else {
            self.last_span
        };
        self.diagnostics.push(Diagnostic::error(
            DiagnosticCategory::Syntax,
            format!("Syntax error, insert \"{inserted}\" to complete {context}"),
            anchor,
        ));
    }

    /// `Syntax error on token "X", delete this token` at the current token.
    fn report_delete_current(&mut self) {
        let span = self.current_span();
        let text = self.current_text().to_string();
        self.diagnostics.push(Diagnostic::error(
            DiagnosticCategory::Syntax,
            format!("Syntax error on token \"{text}\", delete this token"),
            span,
        ));
    }

    fn recover_to(&mut self, recovery: &[TokenKind]) {
        while !self.at(TokenKind::Eof) {
            if recovery.contains(&self.current()) {
                break;
            }
            self.bump_any();
        }
    }

    fn recover_to_class_member_boundary(&mut self) {
        self.recover_to(&[
            TokenKind::Semicolon,
            TokenKind::RBrace,
            TokenKind::PublicKw,
            TokenKind::PrivateKw,
            TokenKind::ProtectedKw,
            TokenKind::StaticKw,
            TokenKind::FinalKw,
            TokenKind::At,
        ]);
        if self.at(TokenKind::Semicolon) {
            self.bump();
        }
    }
}

fn token_display(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Semicolon => ";",
        TokenKind::Comma => ",",
        TokenKind::LParen => "(",
        TokenKind::RParen => ")",
        TokenKind::LBrace => "{",
        TokenKind::RBrace => "}",
        TokenKind::LBracket => "[",
        TokenKind::RBracket => "]",
        TokenKind::Colon => ":",
        TokenKind::Eq => "=",
        TokenKind::WhileKw => "while",
        TokenKind::Eof => "EOF",
        _ => "?",
    }
}

fn infix_binding_power(op: TokenKind) -> Option<(u8, u8, BinaryOperator)> {
    // Larger = tighter binding; right bp one above left for left associativity.
    let (l, r, operator) = match op {
        TokenKind::Star => (70, 71, BinaryOperator::Times),
        TokenKind::Slash => (70, 71, BinaryOperator::Divide),
        TokenKind::Percent => (70, 71, BinaryOperator::Remainder),
        TokenKind::Plus => (60, 61, BinaryOperator::Plus),
        TokenKind::Minus => (60, 61, BinaryOperator::Minus),
        TokenKind::LeftShift => (55, 56, BinaryOperator::LeftShift),
        TokenKind::RightShift => (55, 56, BinaryOperator::RightShift),
        TokenKind::UnsignedRightShift => (55, 56, BinaryOperator::UnsignedRightShift),
        TokenKind::Less => (50, 51, BinaryOperator::Less),
        TokenKind::LessEq => (50, 51, BinaryOperator::LessEquals),
        TokenKind::Greater => (50, 51, BinaryOperator::Greater),
        TokenKind::GreaterEq => (50, 51, BinaryOperator::GreaterEquals),
        TokenKind::EqEq => (45, 46, BinaryOperator::Equals),
        TokenKind::BangEq => (45, 46, BinaryOperator::NotEquals),
        TokenKind::Amp => (40, 41, BinaryOperator::And),
        TokenKind::Caret => (39, 40, BinaryOperator::Xor),
        TokenKind::Pipe => (38, 39, BinaryOperator::Or),
        TokenKind::AmpAmp => (30, 31, BinaryOperator::AndAnd),
        TokenKind::PipePipe => (20, 21, BinaryOperator::OrOr),
        _ => return None,
    };
    Some((l, r, operator))
}

fn assignment_operator(op: TokenKind) -> Option<AssignmentOperator> {
    Some(match op {
        TokenKind::Eq => AssignmentOperator::Assign,
        TokenKind::PlusEq => AssignmentOperator::PlusAssign,
        TokenKind::MinusEq => AssignmentOperator::MinusAssign,
        TokenKind::StarEq => AssignmentOperator::TimesAssign,
        TokenKind::SlashEq => AssignmentOperator::DivideAssign,
        TokenKind::PercentEq => AssignmentOperator::RemainderAssign,
        _ => return None,
    })
}
