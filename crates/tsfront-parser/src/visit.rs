//! The visit pass.
//!
//! Runs once over the parsed statements. It binds every identifier reference
//! to a symbol, counts uses, and lowers the TypeScript value constructs the
//! parser left in place: namespace and enum bodies (see `lower_ts.rs`),
//! parameter properties, `export =`, and unused `import =` / import items.

use crate::ast::*;
use crate::const_fold;
use crate::error::{ParseError, Result};
use crate::parser::ParseContext;
use crate::span::Span;
use crate::symbols::{Ref, ScopeId, ScopeMember, ScopeTree, SymbolKind};
use rustc_hash::{FxHashMap, FxHashSet};
use std::mem;
use tracing::debug;

/// What is known about a member exported from a namespace or enum.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum MemberValue {
    /// Accessed as a property of the closure argument.
    Property,
    /// A folded enum value, inlined at every read.
    Number(f64),
    String(String),
}

impl MemberValue {
    fn literal(&self) -> Option<ExprKind> {
        match self {
            Self::Property => None,
            Self::Number(value) => Some(ExprKind::Number(*value)),
            Self::String(value) => Some(ExprKind::String(value.clone())),
        }
    }
}

/// A declaration that lives on its namespace object rather than in a local.
#[derive(Debug, Clone)]
pub(crate) struct NamespaceMember {
    /// Canonical symbol of the namespace or enum.
    pub ns: Ref,
    /// Closure argument of the block that declared it.
    pub arg: Ref,
    pub name: String,
}

enum Resolved {
    Symbol(Ref),
    /// Exported by another block of an enclosing namespace.
    Member {
        arg: Ref,
        name: String,
        value: MemberValue,
    },
}

pub(crate) struct Visitor<'a> {
    pub(crate) ctx: &'a mut ParseContext,
    typescript: bool,
    pub(crate) current_scope: ScopeId,
    /// Closure argument of the namespace whose body is being visited.
    pub(crate) enclosing_ns: Option<Ref>,
    /// Exported members of every namespace and enum, by canonical symbol.
    pub(crate) ns_members: FxHashMap<Ref, FxHashMap<String, MemberValue>>,
    /// Namespace and enum body scopes: canonical symbol and closure argument.
    pub(crate) entry_scopes: FxHashMap<ScopeId, (Ref, Ref)>,
    /// Exported variables and enum members, read through their namespace.
    pub(crate) member_refs: FxHashMap<Ref, NamespaceMember>,
    /// Closure argument to the canonical symbol it stands for.
    pub(crate) arg_owner: FxHashMap<Ref, Ref>,
    /// Canonical symbols whose `var`/`let` has already been emitted.
    pub(crate) emitted_vars: FxHashSet<Ref>,
    /// Members-table key of each exported nested namespace or enum, by
    /// parent canonical symbol and name.
    pub(crate) nested_members: FxHashMap<(Ref, String), Ref>,
}

/// Bind and lower a parsed module.
pub fn visit_program(
    stmts: Vec<Stmt>,
    ctx: &mut ParseContext,
    typescript: bool,
) -> Result<Vec<Stmt>> {
    let mut visitor = Visitor::new(ctx, typescript);
    let mut stmts = visitor.visit_stmts(stmts)?;
    visitor.elide_unused_imports(&mut stmts);
    Ok(stmts)
}

impl<'a> Visitor<'a> {
    pub(crate) fn new(ctx: &'a mut ParseContext, typescript: bool) -> Self {
        Self {
            ctx,
            typescript,
            current_scope: ScopeTree::MODULE,
            enclosing_ns: None,
            ns_members: FxHashMap::default(),
            entry_scopes: FxHashMap::default(),
            member_refs: FxHashMap::default(),
            arg_owner: FxHashMap::default(),
            emitted_vars: FxHashSet::default(),
            nested_members: FxHashMap::default(),
        }
    }

    fn declaration_error<T>(&mut self, message: impl Into<String>, span: Span) -> Result<T> {
        Err(self.ctx.log.report(ParseError::declaration(message, span)))
    }

    /// A counted reference to a known symbol.
    pub(crate) fn symbol_ref(&mut self, symbol: Ref, span: Span) -> Expr {
        self.ctx.symbols.record_usage(symbol);
        Expr::ident(&self.ctx.symbols, symbol, span)
    }

    /// A counted reference to a global such as `module`.
    fn global_ref(&mut self, name: &str, span: Span) -> Expr {
        let symbol = match self.ctx.scopes.find(name, ScopeTree::MODULE) {
            Some((_, member)) => member.symbol,
            None => self.declare_unbound(name),
        };
        self.symbol_ref(symbol, span)
    }

    fn declare_unbound(&mut self, name: &str) -> Ref {
        let symbol = self.ctx.symbols.new_symbol(SymbolKind::Unbound, name);
        self.ctx.scopes.get_mut(ScopeTree::MODULE).members.insert(
            name.to_string(),
            ScopeMember {
                symbol,
                span: Span::empty(0),
            },
        );
        symbol
    }

    // =========================================================================
    // Name resolution
    // =========================================================================

    fn resolve(&mut self, name: &str) -> Resolved {
        let mut cur = Some(self.current_scope);
        while let Some(id) = cur {
            let scope = self.ctx.scopes.get(id);
            if let Some(member) = scope.members.get(name) {
                return Resolved::Symbol(member.symbol);
            }
            if let Some(&(ns, arg)) = self.entry_scopes.get(&id) {
                if let Some(value) = self.ns_members.get(&ns).and_then(|m| m.get(name)) {
                    return Resolved::Member {
                        arg,
                        name: name.to_string(),
                        value: value.clone(),
                    };
                }
            }
            cur = scope.parent;
        }
        Resolved::Symbol(self.declare_unbound(name))
    }

    /// Bind an identifier reference. Returns a replacement when the name
    /// reads a namespace property or an inlined enum value.
    fn visit_ident(
        &mut self,
        ident: &mut Ident,
        span: Span,
        is_target: bool,
    ) -> Result<Option<ExprKind>> {
        let (arg, name, value) = match self.resolve(&ident.name) {
            Resolved::Symbol(symbol) => match self.member_refs.get(&symbol).cloned() {
                Some(member) => {
                    let value = self
                        .ns_members
                        .get(&member.ns)
                        .and_then(|m| m.get(&member.name))
                        .cloned()
                        .unwrap_or(MemberValue::Property);
                    (member.arg, member.name, value)
                }
                None => {
                    if is_target && self.ctx.symbols.get(symbol).is_import_equals {
                        return self.declaration_error(
                            format!("Cannot assign to import \"{}\"", ident.name),
                            span,
                        );
                    }
                    self.ctx.symbols.record_usage(symbol);
                    ident.symbol = Some(symbol);
                    return Ok(None);
                }
            },
            Resolved::Member { arg, name, value } => (arg, name, value),
        };

        if !is_target {
            if let Some(literal) = value.literal() {
                return Ok(Some(literal));
            }
        }
        let target = self.symbol_ref(arg, span);
        Ok(Some(Expr::dot(target, name, span).kind))
    }

    /// The folded value of `target.name` when `target` is an enum.
    fn known_member(&mut self, target: &Expr, name: &str) -> Option<ExprKind> {
        let ExprKind::Ident(Ident {
            symbol: Some(symbol),
            ..
        }) = &target.kind
        else {
            return None;
        };
        let ns = match self.arg_owner.get(symbol) {
            Some(owner) => *owner,
            None => self.ctx.symbols.resolve(*symbol),
        };
        let literal = self.ns_members.get(&ns)?.get(name)?.literal()?;
        self.ctx.symbols.ignore_usage(*symbol);
        Some(literal)
    }

    // =========================================================================
    // Statements
    // =========================================================================

    /// Visit a statement list, lowering as it goes.
    pub(crate) fn visit_stmts(&mut self, stmts: Vec<Stmt>) -> Result<Vec<Stmt>> {
        let mut out = Vec::with_capacity(stmts.len());
        for stmt in stmts {
            self.visit_stmt(stmt, &mut out)?;
        }
        self.elide_unused_import_equals(&mut out);
        Ok(out)
    }

    /// A statement in single-statement position, such as a loop body.
    fn visit_single_stmt(&mut self, stmt: Box<Stmt>) -> Result<Box<Stmt>> {
        let span = stmt.span;
        let mut out = Vec::new();
        self.visit_stmt(*stmt, &mut out)?;
        let stmt = match out.len() {
            0 => Stmt::new(StmtKind::Empty, span),
            1 => out.remove(0),
            _ => Stmt::new(
                StmtKind::Block(FnBody {
                    stmts: out,
                    scope: self.current_scope,
                }),
                span,
            ),
        };
        Ok(Box::new(stmt))
    }

    fn visit_stmt(&mut self, mut stmt: Stmt, out: &mut Vec<Stmt>) -> Result<()> {
        let span = stmt.span;
        match &mut stmt.kind {
            StmtKind::TypeScript => return Ok(()),
            StmtKind::Expr(expr) | StmtKind::Throw(expr) => self.visit_expr(expr)?,
            StmtKind::Return(value) => {
                if let Some(value) = value {
                    self.visit_expr(value)?;
                }
            }
            StmtKind::Local(local) => {
                self.visit_local(local)?;
                if let (true, Some(arg)) = (local.is_export, self.enclosing_ns) {
                    let local = mem::replace(local, empty_local());
                    self.lower_exported_local(local, arg, out);
                    return Ok(());
                }
            }
            StmtKind::Function { func, is_export } => {
                self.visit_fn(func)?;
                if let (true, Some(arg)) = (*is_export, self.enclosing_ns) {
                    *is_export = false;
                    let name = func.name;
                    out.push(stmt);
                    self.export_to_namespace(name, arg, span, out);
                    return Ok(());
                }
            }
            StmtKind::Class { class, is_export } => {
                self.visit_class(class)?;
                if let (true, Some(arg)) = (*is_export, self.enclosing_ns) {
                    *is_export = false;
                    let name = class.name;
                    out.push(stmt);
                    self.export_to_namespace(name, arg, span, out);
                    return Ok(());
                }
            }
            StmtKind::Block(body) => self.visit_body(body)?,
            StmtKind::If {
                test,
                consequent,
                alternate,
            } => {
                self.visit_expr(test)?;
                *consequent = self.visit_single_stmt(take_stmt(consequent))?;
                if let Some(alternate) = alternate {
                    *alternate = self.visit_single_stmt(take_stmt(alternate))?;
                }
            }
            StmtKind::For {
                init,
                test,
                update,
                body,
                scope,
            } => {
                let old = mem::replace(&mut self.current_scope, *scope);
                if let Some(init) = init {
                    *init = self.visit_single_stmt(take_stmt(init))?;
                }
                if let Some(test) = test {
                    self.visit_expr(test)?;
                }
                if let Some(update) = update {
                    self.visit_expr(update)?;
                }
                *body = self.visit_single_stmt(take_stmt(body))?;
                self.current_scope = old;
            }
            StmtKind::ForIn {
                left,
                right,
                body,
                scope,
            }
            | StmtKind::ForOf {
                left,
                right,
                body,
                scope,
                ..
            } => {
                let old = mem::replace(&mut self.current_scope, *scope);
                match &mut left.kind {
                    StmtKind::Expr(target) => self.visit_assign_target(target)?,
                    StmtKind::Local(local) => self.visit_local(local)?,
                    _ => {}
                }
                self.visit_expr(right)?;
                *body = self.visit_single_stmt(take_stmt(body))?;
                self.current_scope = old;
            }
            StmtKind::While { test, body } | StmtKind::DoWhile { body, test } => {
                self.visit_expr(test)?;
                *body = self.visit_single_stmt(take_stmt(body))?;
            }
            StmtKind::Labeled { body, .. } => {
                *body = self.visit_single_stmt(take_stmt(body))?;
            }
            StmtKind::Switch {
                discriminant,
                cases,
                scope,
            } => {
                self.visit_expr(discriminant)?;
                let old = mem::replace(&mut self.current_scope, *scope);
                for case in cases.iter_mut() {
                    if let Some(test) = &mut case.test {
                        self.visit_expr(test)?;
                    }
                    case.body = self.visit_stmts(mem::take(&mut case.body))?;
                }
                self.current_scope = old;
            }
            StmtKind::Try {
                block,
                handler,
                finalizer,
            } => {
                self.visit_body(block)?;
                if let Some(handler) = handler {
                    let old = mem::replace(&mut self.current_scope, handler.body.scope);
                    if let Some(param) = &mut handler.param {
                        self.visit_binding(param)?;
                    }
                    handler.body.stmts = self.visit_stmts(mem::take(&mut handler.body.stmts))?;
                    self.current_scope = old;
                }
                if let Some(finalizer) = finalizer {
                    self.visit_body(finalizer)?;
                }
            }
            StmtKind::With {
                object,
                body,
                scope,
            } => {
                self.visit_expr(object)?;
                let old = mem::replace(&mut self.current_scope, *scope);
                *body = self.visit_single_stmt(take_stmt(body))?;
                self.current_scope = old;
            }
            StmtKind::Empty
            | StmtKind::Debugger
            | StmtKind::Break(_)
            | StmtKind::Continue(_)
            | StmtKind::Import(_)
            | StmtKind::ExportStar { .. } => {}
            StmtKind::ExportClause { items, source } => {
                if source.is_none() && !self.visit_export_items(items) {
                    debug!("dropping export clause of type-only names");
                    return Ok(());
                }
            }
            StmtKind::ExportDefault(default) => match default {
                ExportDefault::Expr(expr) => {
                    if self.is_local_type_ref(expr) {
                        return Ok(());
                    }
                    self.visit_expr(expr)?;
                }
                ExportDefault::Function(func) => self.visit_fn(func)?,
                ExportDefault::Class(class) => self.visit_class(class)?,
            },
            StmtKind::ExportEquals(value) => {
                // "export = x" becomes "module.exports = x"
                self.visit_expr(value)?;
                let value = mem::replace(value, Expr::new(ExprKind::Missing, span));
                let module = self.global_ref("module", span);
                let target = Expr::dot(module, "exports", span);
                out.push(Stmt::new(StmtKind::Expr(Expr::assign(target, value)), span));
                return Ok(());
            }
            StmtKind::Namespace(_) | StmtKind::Enum(_) => {
                match stmt.kind {
                    StmtKind::Namespace(ns) => self.lower_namespace(ns, span, out)?,
                    StmtKind::Enum(e) => self.lower_enum(e, span, out)?,
                    _ => {}
                }
                return Ok(());
            }
        }
        out.push(stmt);
        Ok(())
    }

    fn visit_body(&mut self, body: &mut FnBody) -> Result<()> {
        let old = mem::replace(&mut self.current_scope, body.scope);
        body.stmts = self.visit_stmts(mem::take(&mut body.stmts))?;
        self.current_scope = old;
        Ok(())
    }

    fn visit_local(&mut self, local: &mut Local) -> Result<()> {
        for decl in &mut local.decls {
            self.visit_binding(&mut decl.binding)?;
            if let Some(value) = &mut decl.value {
                self.visit_expr(value)?;
            }
        }
        Ok(())
    }

    /// Default values and computed keys inside a binding pattern.
    fn visit_binding(&mut self, binding: &mut Binding) -> Result<()> {
        match &mut binding.kind {
            BindingKind::Array { items, .. } => {
                for item in items {
                    self.visit_binding(&mut item.binding)?;
                    if let Some(default) = &mut item.default {
                        self.visit_expr(default)?;
                    }
                }
            }
            BindingKind::Object { props } => {
                for prop in props {
                    self.visit_property_key(&mut prop.key)?;
                    self.visit_binding(&mut prop.value)?;
                    if let Some(default) = &mut prop.default {
                        self.visit_expr(default)?;
                    }
                }
            }
            BindingKind::Ident(_) | BindingKind::Missing => {}
        }
        Ok(())
    }

    fn visit_property_key(&mut self, key: &mut PropertyKey) -> Result<()> {
        if let PropertyKey::Computed(expr) = key {
            self.visit_expr(expr)?;
        }
        Ok(())
    }

    /// Bind the local names of `export { ... }`. In TypeScript, names that
    /// are not declared in this file are types and are dropped. Returns
    /// false when nothing is left.
    fn visit_export_items(&mut self, items: &mut Vec<ExportItem>) -> bool {
        let had_items = !items.is_empty();
        let mut kept = Vec::with_capacity(items.len());
        for mut item in mem::take(items) {
            let found = self
                .ctx
                .scopes
                .find(&item.local.name, self.current_scope)
                .map(|(_, member)| member.symbol)
                .filter(|symbol| self.ctx.symbols.get(*symbol).kind != SymbolKind::Unbound);
            let symbol = match found {
                Some(symbol) => symbol,
                None if self.typescript => continue,
                None => self.declare_unbound(&item.local.name),
            };
            self.ctx.symbols.record_usage(symbol);
            item.local.symbol = Some(symbol);
            kept.push(item);
        }
        *items = kept;
        !had_items || !items.is_empty()
    }

    /// `export default T` where `T` only names a type.
    fn is_local_type_ref(&self, expr: &Expr) -> bool {
        let ExprKind::Ident(ident) = &expr.kind else {
            return false;
        };
        self.typescript
            && self.ctx.local_type_names.contains(&ident.name)
            && self
                .ctx
                .scopes
                .find(&ident.name, self.current_scope)
                .map_or(true, |(_, m)| {
                    self.ctx.symbols.get(m.symbol).kind == SymbolKind::Unbound
                })
    }

    // =========================================================================
    // Functions and classes
    // =========================================================================

    fn visit_params(&mut self, params: &mut [Param]) -> Result<()> {
        for param in params {
            for decorator in &mut param.decorators {
                self.visit_expr(decorator)?;
            }
            self.visit_binding(&mut param.binding)?;
            if let Some(default) = &mut param.default {
                self.visit_expr(default)?;
            }
        }
        Ok(())
    }

    fn visit_fn(&mut self, func: &mut Function) -> Result<()> {
        let old = mem::replace(&mut self.current_scope, func.args_scope);
        self.visit_params(&mut func.params)?;
        self.visit_body(&mut func.body)?;
        self.current_scope = old;
        Ok(())
    }

    fn visit_arrow(&mut self, arrow: &mut Arrow) -> Result<()> {
        let old = mem::replace(&mut self.current_scope, arrow.args_scope);
        self.visit_params(&mut arrow.params)?;
        self.visit_body(&mut arrow.body)?;
        self.current_scope = old;
        Ok(())
    }

    fn visit_class(&mut self, class: &mut Class) -> Result<()> {
        for decorator in &mut class.decorators {
            self.visit_expr(decorator)?;
        }
        let old = mem::replace(&mut self.current_scope, class.scope);
        if let Some(extends) = &mut class.extends {
            self.visit_expr(extends)?;
        }
        for member in &mut class.members {
            match member {
                ClassMember::Method {
                    kind,
                    key,
                    func,
                    decorators,
                    ..
                } => {
                    for decorator in decorators.iter_mut() {
                        self.visit_expr(decorator)?;
                    }
                    self.visit_property_key(key)?;
                    self.visit_fn(func)?;
                    if *kind == MethodKind::Constructor {
                        self.lower_parameter_properties(func);
                    }
                }
                ClassMember::Field {
                    key,
                    value,
                    decorators,
                    ..
                } => {
                    for decorator in decorators.iter_mut() {
                        self.visit_expr(decorator)?;
                    }
                    self.visit_property_key(key)?;
                    if let Some(value) = value {
                        self.visit_expr(value)?;
                    }
                }
                ClassMember::StaticBlock { body, .. } => self.visit_body(body)?,
            }
        }
        self.current_scope = old;
        Ok(())
    }

    /// `constructor(public x)` assigns `this.x = x` after the first top-level
    /// `super()` call, or first thing when there is none.
    fn lower_parameter_properties(&mut self, func: &mut Function) {
        let props: Vec<(Ref, Span)> = func
            .params
            .iter()
            .filter(|param| param.is_parameter_property)
            .filter_map(|param| match param.binding.kind {
                BindingKind::Ident(symbol) => Some((symbol, param.binding.span)),
                _ => None,
            })
            .collect();
        if props.is_empty() {
            return;
        }

        let assigns: Vec<Stmt> = props
            .into_iter()
            .map(|(symbol, span)| {
                let name = self.ctx.symbols.name(symbol).to_string();
                let target = Expr::dot(Expr::new(ExprKind::This, span), name, span);
                Stmt::expr(Expr::assign(target, self.symbol_ref(symbol, span)))
            })
            .collect();
        let at = func
            .body
            .stmts
            .iter()
            .position(is_super_call)
            .map_or(0, |i| i + 1);
        func.body.stmts.splice(at..at, assigns);
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    pub(crate) fn visit_expr(&mut self, expr: &mut Expr) -> Result<()> {
        let span = expr.span;
        let mut replacement = None;
        match &mut expr.kind {
            ExprKind::Null
            | ExprKind::Undefined
            | ExprKind::Bool(_)
            | ExprKind::Number(_)
            | ExprKind::BigInt(_)
            | ExprKind::String(_)
            | ExprKind::Regex { .. }
            | ExprKind::PrivateName(_)
            | ExprKind::This
            | ExprKind::Super
            | ExprKind::NewTarget
            | ExprKind::ImportMeta
            | ExprKind::Missing => {}
            ExprKind::Template { tag, parts, .. } => {
                if let Some(tag) = tag {
                    self.visit_expr(tag)?;
                }
                for part in parts {
                    self.visit_expr(&mut part.expr)?;
                }
            }
            ExprKind::Ident(ident) => replacement = self.visit_ident(ident, span, false)?,
            ExprKind::Array(items) => {
                for item in items {
                    self.visit_expr(item)?;
                }
            }
            ExprKind::Object(props) => {
                for prop in props {
                    self.visit_property_key(&mut prop.key)?;
                    self.visit_expr(&mut prop.value)?;
                    if let Some(init) = &mut prop.initializer {
                        self.visit_expr(init)?;
                    }
                }
            }
            ExprKind::Function(func) => self.visit_fn(func)?,
            ExprKind::Arrow(arrow) => self.visit_arrow(arrow)?,
            ExprKind::Class(class) => self.visit_class(class)?,
            ExprKind::Unary { op, arg } => {
                if matches!(
                    op,
                    UnaryOp::PreInc | UnaryOp::PreDec | UnaryOp::PostInc | UnaryOp::PostDec
                ) {
                    self.visit_assign_target(arg)?;
                } else {
                    self.visit_expr(arg)?;
                }
            }
            ExprKind::Binary { op, left, right } => {
                if op.is_assign() {
                    self.visit_assign_target(left)?;
                } else {
                    self.visit_expr(left)?;
                }
                self.visit_expr(right)?;
            }
            ExprKind::Conditional {
                test,
                consequent,
                alternate,
            } => {
                self.visit_expr(test)?;
                self.visit_expr(consequent)?;
                self.visit_expr(alternate)?;
            }
            ExprKind::Dot {
                target,
                name,
                optional_chain,
            } => {
                self.visit_expr(target)?;
                if *optional_chain == OptionalChain::None {
                    replacement = self.known_member(target, name);
                }
            }
            ExprKind::Index {
                target,
                index,
                optional_chain,
            } => {
                self.visit_expr(target)?;
                self.visit_expr(index)?;
                if let (OptionalChain::None, ExprKind::String(name)) =
                    (*optional_chain, &index.kind)
                {
                    replacement = self.known_member(target, name);
                }
            }
            ExprKind::Call { target, args, .. } | ExprKind::New { target, args } => {
                self.visit_expr(target)?;
                for arg in args {
                    self.visit_expr(arg)?;
                }
            }
            ExprKind::ImportCall { arg, options } => {
                self.visit_expr(arg)?;
                if let Some(options) = options {
                    self.visit_expr(options)?;
                }
            }
            ExprKind::Spread(arg) | ExprKind::Await(arg) => self.visit_expr(arg)?,
            ExprKind::Yield { arg, .. } => {
                if let Some(arg) = arg {
                    self.visit_expr(arg)?;
                }
            }
        }
        if let Some(kind) = replacement {
            expr.kind = kind;
        }
        Ok(())
    }

    /// The left side of an assignment, `++`/`--`, or `for (x of ...)`.
    fn visit_assign_target(&mut self, expr: &mut Expr) -> Result<()> {
        let span = expr.span;
        match &mut expr.kind {
            ExprKind::Ident(ident) => {
                if let Some(kind) = self.visit_ident(ident, span, true)? {
                    expr.kind = kind;
                }
            }
            ExprKind::Array(items) => {
                for item in items {
                    match &mut item.kind {
                        ExprKind::Spread(inner) => self.visit_assign_target(inner)?,
                        _ => self.visit_assign_target(item)?,
                    }
                }
            }
            ExprKind::Object(props) => {
                for prop in props {
                    self.visit_property_key(&mut prop.key)?;
                    self.visit_assign_target(&mut prop.value)?;
                    if let Some(init) = &mut prop.initializer {
                        self.visit_expr(init)?;
                    }
                }
            }
            ExprKind::Binary {
                op: BinaryOp::Assign,
                left,
                right,
            } => {
                // a default inside a destructuring target
                self.visit_assign_target(left)?;
                self.visit_expr(right)?;
            }
            ExprKind::Dot { target, .. } => self.visit_expr(target)?,
            ExprKind::Index { target, index, .. } => {
                self.visit_expr(target)?;
                self.visit_expr(index)?;
            }
            _ => self.visit_expr(expr)?,
        }
        Ok(())
    }

    /// Fold an enum initializer after binding it.
    pub(crate) fn visit_enum_initializer(&mut self, expr: &mut Expr) -> Result<()> {
        self.visit_expr(expr)?;
        const_fold::fold(expr);
        Ok(())
    }

    // =========================================================================
    // Elision
    // =========================================================================

    /// Drop `import x = ...` whose binding is never read. Walking backwards
    /// lets `import a = M; import b = a.b;` drop both when `b` is unused.
    fn elide_unused_import_equals(&mut self, stmts: &mut Vec<Stmt>) {
        if !self.typescript {
            return;
        }
        let mut i = stmts.len();
        while i > 0 {
            i -= 1;
            let StmtKind::Local(local) = &stmts[i].kind else {
                continue;
            };
            if !local.was_import_equals || local.is_export {
                continue;
            }
            let Some(decl) = local.decls.first() else {
                continue;
            };
            let BindingKind::Ident(symbol) = decl.binding.kind else {
                continue;
            };
            if self.ctx.symbols.use_count(symbol) > 0 {
                continue;
            }
            if let Some(root) = decl.value.as_ref().and_then(root_symbol) {
                self.ctx.symbols.ignore_usage(root);
            }
            debug!(name = %self.ctx.symbols.name(symbol), "eliding unused import =");
            stmts.remove(i);
        }
    }

    /// Drop import items that are never used as values. A statement whose
    /// items are all gone is dropped; `import "m"` stays.
    fn elide_unused_imports(&mut self, stmts: &mut Vec<Stmt>) {
        if !self.typescript {
            return;
        }
        let symbols = &self.ctx.symbols;
        let used = |loc: &LocRef| symbols.use_count(loc.symbol) > 0;
        stmts.retain_mut(|stmt| {
            let StmtKind::Import(import) = &mut stmt.kind else {
                return true;
            };
            if import.is_side_effect_only() {
                return true;
            }
            import.default = import.default.filter(|d| used(d));
            import.namespace = import.namespace.filter(|n| used(n));
            if let Some(items) = &mut import.items {
                items.retain(|item| used(&item.local));
                if items.is_empty() {
                    import.items = None;
                }
            }
            let keep = !import.is_side_effect_only();
            if !keep {
                debug!(source = %import.source, "eliding unused import");
            }
            keep
        });
    }
}

fn empty_local() -> Local {
    Local {
        kind: LocalKind::Var,
        decls: Vec::new(),
        is_export: false,
        was_import_equals: false,
    }
}

fn take_stmt(stmt: &mut Box<Stmt>) -> Box<Stmt> {
    mem::replace(stmt, Box::new(Stmt::new(StmtKind::Empty, Span::empty(0))))
}

fn is_super_call(stmt: &Stmt) -> bool {
    matches!(
        &stmt.kind,
        StmtKind::Expr(Expr {
            kind: ExprKind::Call { target, .. },
            ..
        }) if matches!(target.kind, ExprKind::Super)
    )
}

/// The symbol at the root of `a.b.c` or `require("m")`.
fn root_symbol(expr: &Expr) -> Option<Ref> {
    match &expr.kind {
        ExprKind::Ident(ident) => ident.symbol,
        ExprKind::Dot { target, .. } | ExprKind::Call { target, .. } => root_symbol(target),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::options::ParserOptions;
    use crate::parser::Parser;

    fn visit(source: &str) -> Result<(Vec<Stmt>, ParseContext)> {
        let mut parser = Parser::new(source, ParserOptions::default())?;
        let stmts = parser.parse_program()?;
        let mut ctx = parser.into_context();
        let stmts = visit_program(stmts, &mut ctx, true)?;
        Ok((stmts, ctx))
    }

    fn expr_of(stmt: &Stmt) -> &Expr {
        match &stmt.kind {
            StmtKind::Expr(expr) => expr,
            other => panic!("expected expression statement, got {other:?}"),
        }
    }

    #[test]
    fn test_references_bind_and_count() {
        let (stmts, ctx) = visit("let a = 1; a; a; b;").unwrap();
        let ExprKind::Ident(a) = &expr_of(&stmts[1]).kind else {
            panic!("expected identifier");
        };
        let a = a.symbol.unwrap();
        assert_eq!(ctx.symbols.use_count(a), 2);

        let ExprKind::Ident(b) = &expr_of(&stmts[3]).kind else {
            panic!("expected identifier");
        };
        let b = b.symbol.unwrap();
        assert_eq!(ctx.symbols.get(b).kind, SymbolKind::Unbound);
        assert!(ctx.scopes.get(ScopeTree::MODULE).members.contains_key("b"));
    }

    #[test]
    fn test_inner_scope_shadows() {
        let (stmts, ctx) = visit("let x = 1; { let x = 2; x; }").unwrap();
        let StmtKind::Local(outer) = &stmts[0].kind else {
            panic!("expected local");
        };
        let BindingKind::Ident(outer) = outer.decls[0].binding.kind else {
            panic!("expected identifier");
        };
        assert_eq!(ctx.symbols.use_count(outer), 0);
    }

    #[test]
    fn test_type_placeholders_are_dropped() {
        let (stmts, _) =
            visit("type T = 1; interface I {} let x: T = 1; if (x) type U = 2;").unwrap();
        assert_eq!(stmts.len(), 2);
        let StmtKind::If { consequent, .. } = &stmts[1].kind else {
            panic!("expected if");
        };
        assert!(matches!(consequent.kind, StmtKind::Empty));
    }

    #[test]
    fn test_assign_to_import_equals_is_an_error() {
        let err = visit("import x = a.b; x = 1;").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Declaration);
        assert_eq!(err.message, "Cannot assign to import \"x\"");
        assert!(visit("import x = a.b; x++;").is_err());
        assert!(visit("import x = a.b; [x] = [1];").is_err());
    }

    #[test]
    fn test_unused_import_equals_chain_is_elided() {
        let (stmts, _) = visit("import a = M; import b = a.b;").unwrap();
        assert!(stmts.is_empty());

        let (stmts, _) = visit("import a = M; import b = a.b; b;").unwrap();
        assert_eq!(stmts.len(), 3);

        let (stmts, _) = visit("export import c = M.c;").unwrap();
        assert_eq!(stmts.len(), 1);
    }

    #[test]
    fn test_unused_import_items_are_elided() {
        let (stmts, _) = visit(
            "import d, { a, b } from 'x';\nimport * as ns from 'y';\nimport 'z';\nimport {} from 'w';\nb;",
        )
        .unwrap();
        assert_eq!(stmts.len(), 3);
        let StmtKind::Import(first) = &stmts[0].kind else {
            panic!("expected import");
        };
        assert!(first.default.is_none());
        assert_eq!(first.items.as_ref().map(Vec::len), Some(1));
        assert!(matches!(&stmts[1].kind, StmtKind::Import(i) if i.source == "z"));
    }

    #[test]
    fn test_export_clause_drops_type_names() {
        let (stmts, _) =
            visit("interface I {}\nconst v = 1;\nexport { I, v };\nexport { I };").unwrap();
        assert_eq!(stmts.len(), 2);
        let StmtKind::ExportClause { items, .. } = &stmts[1].kind else {
            panic!("expected export clause");
        };
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].exported, "v");
    }

    #[test]
    fn test_export_default_type_is_erased() {
        let (stmts, _) = visit("interface I {}\nexport default I;").unwrap();
        assert!(stmts.is_empty());
        let (stmts, _) = visit("export default I;").unwrap();
        assert_eq!(stmts.len(), 1);
    }

    #[test]
    fn test_export_equals() {
        let (stmts, _) = visit("export = foo;").unwrap();
        let ExprKind::Binary { op, left, .. } = &expr_of(&stmts[0]).kind else {
            panic!("expected assignment");
        };
        assert_eq!(*op, BinaryOp::Assign);
        assert!(matches!(&left.kind, ExprKind::Dot { name, .. } if name == "exports"));
    }

    #[test]
    fn test_parameter_properties_follow_super() {
        let (stmts, _) = visit(
            "class A extends B { constructor(public x, private y = 1) { log(); super(); after(); } }",
        )
        .unwrap();
        let StmtKind::Class { class, .. } = &stmts[0].kind else {
            panic!("expected class");
        };
        let ClassMember::Method { func, .. } = &class.members[0] else {
            panic!("expected constructor");
        };
        let stmts = &func.body.stmts;
        assert_eq!(stmts.len(), 5);
        for (i, name) in [(2, "x"), (3, "y")] {
            let ExprKind::Binary { left, .. } = &expr_of(&stmts[i]).kind else {
                panic!("expected assignment");
            };
            assert!(matches!(&left.kind, ExprKind::Dot { name: n, target, .. }
                if n == name && matches!(target.kind, ExprKind::This)));
        }
    }

    #[test]
    fn test_parameter_properties_without_super_go_first() {
        let (stmts, _) = visit("class A { constructor(readonly x) { f(); } }").unwrap();
        let StmtKind::Class { class, .. } = &stmts[0].kind else {
            panic!("expected class");
        };
        let ClassMember::Method { func, .. } = &class.members[0] else {
            panic!("expected constructor");
        };
        let ExprKind::Binary { left, .. } = &expr_of(&func.body.stmts[0]).kind else {
            panic!("expected assignment");
        };
        assert!(matches!(&left.kind, ExprKind::Dot { name, .. } if name == "x"));
    }

    #[test]
    fn test_javascript_keeps_unused_imports() {
        let mut parser =
            Parser::new("import { a } from 'x';", ParserOptions::javascript()).unwrap();
        let stmts = parser.parse_program().unwrap();
        let mut ctx = parser.into_context();
        let stmts = visit_program(stmts, &mut ctx, false).unwrap();
        assert_eq!(stmts.len(), 1);
    }
}
