//! Symbols and scopes.
//!
//! Symbols live in an arena addressed by `Ref`. Merging two declarations of
//! the same name (a namespace with a function, two enum blocks, ...) sets the
//! `link` of one symbol to the other; `SymbolTable::follow` walks those links
//! to the canonical symbol.
//!
//! Scopes form a tree mirroring lexical nesting. The parser creates them and
//! declares bindings into them; the visit pass walks them to resolve
//! identifier references.

use crate::span::Span;
use rustc_hash::FxHashMap;

/// Index of a symbol in the `SymbolTable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ref(u32);

impl Ref {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What kind of declaration introduced a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// Referenced but never declared in this file.
    Unbound,
    /// `var` bindings and function parameters.
    Hoisted,
    /// `function foo() {}`
    HoistedFunction,
    /// `function* foo() {}`, `async function foo() {}`
    GeneratorOrAsyncFunction,
    /// `class Foo {}`
    Class,
    /// `let` bindings.
    BlockScoped,
    /// `const` bindings and `import x = ...`.
    Const,
    /// Import clause bindings.
    Import,
    TsNamespace,
    TsEnum,
    /// `catch (e)`
    CatchIdentifier,
    /// The implicit `arguments` of a function.
    Arguments,
    /// Enum members, labels, class expression names and other
    /// symbols that never merge.
    Other,
}

impl SymbolKind {
    pub fn is_hoisted(self) -> bool {
        matches!(self, Self::Hoisted | Self::HoistedFunction)
    }

    pub fn is_function(self) -> bool {
        matches!(self, Self::HoistedFunction | Self::GeneratorOrAsyncFunction)
    }

    pub fn is_hoisted_or_function(self) -> bool {
        self.is_hoisted() || self == Self::GeneratorOrAsyncFunction
    }
}

/// A declared (or unbound) name.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub kind: SymbolKind,
    pub original_name: String,
    /// Set when this symbol was merged into another one.
    pub link: Option<Ref>,
    /// Number of syntactic references recorded by the visit pass.
    pub use_count: u32,
    /// Bound by `import x = ...`; assignments to it are rejected.
    pub is_import_equals: bool,
}

/// Arena of all symbols in one file.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a symbol that is not yet a member of any scope.
    pub fn new_symbol(&mut self, kind: SymbolKind, name: impl Into<String>) -> Ref {
        let r = Ref(self.symbols.len() as u32);
        self.symbols.push(Symbol {
            kind,
            original_name: name.into(),
            link: None,
            use_count: 0,
            is_import_equals: false,
        });
        r
    }

    pub fn get(&self, r: Ref) -> &Symbol {
        &self.symbols[r.index()]
    }

    pub fn get_mut(&mut self, r: Ref) -> &mut Symbol {
        &mut self.symbols[r.index()]
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Forget every symbol allocated after the first `len`.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.symbols.truncate(len);
    }

    /// Follow links to the canonical symbol without mutating the table.
    pub fn resolve(&self, mut r: Ref) -> Ref {
        while let Some(next) = self.symbols[r.index()].link {
            r = next;
        }
        r
    }

    /// Follow links to the canonical symbol, compressing the path so every
    /// symbol on it points straight at the result.
    pub fn follow(&mut self, r: Ref) -> Ref {
        let root = self.resolve(r);
        let mut cur = r;
        while let Some(next) = self.symbols[cur.index()].link {
            if next != root {
                self.symbols[cur.index()].link = Some(root);
            }
            cur = next;
        }
        root
    }

    /// Make `old` an alias of `new`.
    ///
    /// Linking a symbol to itself (directly or through the chain) is ignored
    /// so chains never form cycles.
    pub fn merge(&mut self, old: Ref, new: Ref) {
        let old_root = self.follow(old);
        let new_root = self.follow(new);
        if old_root != new_root {
            self.symbols[old_root.index()].link = Some(new_root);
        }
    }

    /// The printed name of a symbol (that of its canonical symbol).
    pub fn name(&self, r: Ref) -> &str {
        &self.symbols[self.resolve(r).index()].original_name
    }

    pub fn record_usage(&mut self, r: Ref) {
        let root = self.follow(r);
        self.symbols[root.index()].use_count += 1;
    }

    pub fn ignore_usage(&mut self, r: Ref) {
        let root = self.follow(r);
        let symbol = &mut self.symbols[root.index()];
        symbol.use_count = symbol.use_count.saturating_sub(1);
    }

    pub fn use_count(&self, r: Ref) -> u32 {
        self.symbols[self.resolve(r).index()].use_count
    }
}

/// Index of a scope in the `ScopeTree`.
pub type ScopeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Module,
    Block,
    With,
    Catch,
    Class,
    FunctionArgs,
    FunctionBody,
    /// Body of a namespace or enum.
    Entry,
}

impl ScopeKind {
    /// `var` declarations stop hoisting at scopes of these kinds.
    pub fn stops_hoisting(self) -> bool {
        matches!(self, Self::Module | Self::FunctionBody | Self::Entry)
    }
}

/// A name declared in a scope.
#[derive(Debug, Clone, Copy)]
pub struct ScopeMember {
    pub symbol: Ref,
    pub span: Span,
}

#[derive(Debug)]
pub struct Scope {
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    pub members: FxHashMap<String, ScopeMember>,
    /// Compiler-introduced symbols with no source name, such as the
    /// `_foo` closure argument of a namespace that exports `foo`.
    pub generated: Vec<Ref>,
}

/// The scope tree of one file. Scope 0 is the module scope.
#[derive(Debug)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTree {
    pub const MODULE: ScopeId = 0;

    pub fn new() -> Self {
        Self {
            scopes: vec![Scope {
                kind: ScopeKind::Module,
                parent: None,
                children: Vec::new(),
                members: FxHashMap::default(),
                generated: Vec::new(),
            }],
        }
    }

    /// Create a child scope.
    pub fn push(&mut self, kind: ScopeKind, parent: ScopeId) -> ScopeId {
        let id = self.scopes.len();
        self.scopes.push(Scope {
            kind,
            parent: Some(parent),
            children: Vec::new(),
            members: FxHashMap::default(),
            generated: Vec::new(),
        });
        self.scopes[parent].children.push(id);
        id
    }

    /// Detach a scope from the tree. Its members become unreachable from
    /// every other scope.
    pub fn discard(&mut self, id: ScopeId) {
        if let Some(parent) = self.scopes[id].parent {
            self.scopes[parent].children.retain(|&c| c != id);
        }
    }

    /// Remove a scope that turned out not to be needed, moving its children
    /// up to its parent.
    pub fn flatten(&mut self, id: ScopeId) {
        let Some(parent) = self.scopes[id].parent else {
            return;
        };
        let children = std::mem::take(&mut self.scopes[id].children);
        for &child in &children {
            self.scopes[child].parent = Some(parent);
        }
        let siblings = &mut self.scopes[parent].children;
        if let Some(pos) = siblings.iter().position(|&c| c == id) {
            siblings.splice(pos..=pos, children);
        }
        let members = std::mem::take(&mut self.scopes[id].members);
        for (name, member) in members {
            self.scopes[parent].members.entry(name).or_insert(member);
        }
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Forget every scope created after the first `len`, unlinking them
    /// from their surviving parents.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.scopes.truncate(len);
        for scope in &mut self.scopes {
            scope.children.retain(|&c| c < len);
        }
    }

    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.scopes[id]
    }

    pub fn get_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id]
    }

    /// Look a name up in `from` and its ancestors.
    pub fn find(&self, name: &str, from: ScopeId) -> Option<(ScopeId, ScopeMember)> {
        let mut cur = Some(from);
        while let Some(id) = cur {
            let scope = &self.scopes[id];
            if let Some(member) = scope.members.get(name) {
                return Some((id, *member));
            }
            cur = scope.parent;
        }
        None
    }

    /// The nearest scope at or above `from` where `var` hoisting stops.
    pub fn hoist_target(&self, from: ScopeId) -> ScopeId {
        let mut cur = from;
        loop {
            let scope = &self.scopes[cur];
            if scope.kind.stops_hoisting() {
                return cur;
            }
            match scope.parent {
                Some(p) => cur = p,
                None => return cur,
            }
        }
    }
}

/// How a new declaration interacts with an existing one of the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeResult {
    /// Duplicate declaration error.
    Forbidden,
    /// The new declaration reuses the existing symbol.
    KeepExisting,
    /// The existing symbol becomes a link to the new one.
    ReplaceWithNew,
    /// The new symbol shadows the existing one without linking.
    OverwriteWithNew,
}

/// Decide whether a declaration of kind `new` may coexist with an existing
/// declaration of kind `existing` in a scope of kind `scope`.
pub fn can_merge_symbols(
    scope: ScopeKind,
    existing: SymbolKind,
    new: SymbolKind,
    typescript: bool,
) -> MergeResult {
    use SymbolKind as K;

    if existing == K::Unbound {
        return MergeResult::ReplaceWithNew;
    }

    // Imports may be type-only, so TypeScript lets them collide silently
    if typescript && existing == K::Import {
        return MergeResult::ReplaceWithNew;
    }

    // "enum Foo {} enum Foo {}"
    // "enum Foo {} namespace Foo {}"
    if existing == K::TsEnum && matches!(new, K::TsEnum | K::TsNamespace) {
        return MergeResult::KeepExisting;
    }

    // "namespace Foo {} enum Foo {}"
    // "namespace Foo {} function Foo() {}"
    // "namespace Foo {} class Foo {}"
    if existing == K::TsNamespace
        && matches!(
            new,
            K::TsEnum | K::HoistedFunction | K::GeneratorOrAsyncFunction | K::Class
        )
    {
        return MergeResult::ReplaceWithNew;
    }

    // "namespace Foo {} namespace Foo {}"
    // "function Foo() {} namespace Foo {}"
    // "class Foo {} namespace Foo {}"
    if new == K::TsNamespace
        && matches!(
            existing,
            K::TsNamespace | K::HoistedFunction | K::GeneratorOrAsyncFunction | K::Class
        )
    {
        return MergeResult::KeepExisting;
    }

    // "var foo; var foo;"
    // "var foo; function foo() {}"
    // "function foo() {} var foo;"
    if new.is_hoisted_or_function()
        && existing.is_hoisted_or_function()
        && (matches!(
            scope,
            ScopeKind::Module | ScopeKind::FunctionBody | ScopeKind::FunctionArgs | ScopeKind::Entry
        ) || (new == existing && new.is_hoisted()))
    {
        return MergeResult::ReplaceWithNew;
    }

    // "try {} catch (e) { var e }"
    if existing == K::CatchIdentifier && new == K::Hoisted {
        return MergeResult::ReplaceWithNew;
    }

    // "function() { var arguments }"
    if existing == K::Arguments && new == K::Hoisted {
        return MergeResult::KeepExisting;
    }

    // "function() { let arguments }"
    if existing == K::Arguments {
        return MergeResult::OverwriteWithNew;
    }

    MergeResult::Forbidden
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follow_compresses_chain() {
        let mut symbols = SymbolTable::new();
        let a = symbols.new_symbol(SymbolKind::TsNamespace, "a");
        let b = symbols.new_symbol(SymbolKind::TsNamespace, "a");
        let c = symbols.new_symbol(SymbolKind::HoistedFunction, "a");
        symbols.merge(a, b);
        symbols.merge(b, c);
        assert_eq!(symbols.follow(a), c);
        assert_eq!(symbols.get(a).link, Some(c));
        // Idempotent
        assert_eq!(symbols.follow(a), c);
        assert_eq!(symbols.follow(c), c);
    }

    #[test]
    fn test_merge_never_cycles() {
        let mut symbols = SymbolTable::new();
        let a = symbols.new_symbol(SymbolKind::TsEnum, "e");
        let b = symbols.new_symbol(SymbolKind::TsEnum, "e");
        symbols.merge(a, b);
        symbols.merge(b, a);
        assert_eq!(symbols.resolve(a), b);
        assert_eq!(symbols.resolve(b), b);
    }

    #[test]
    fn test_usage_counts_go_to_canonical_symbol() {
        let mut symbols = SymbolTable::new();
        let a = symbols.new_symbol(SymbolKind::TsNamespace, "n");
        let b = symbols.new_symbol(SymbolKind::Class, "n");
        symbols.merge(a, b);
        symbols.record_usage(a);
        symbols.record_usage(b);
        assert_eq!(symbols.use_count(b), 2);
        symbols.ignore_usage(a);
        assert_eq!(symbols.use_count(a), 1);
    }

    #[test]
    fn test_namespace_merge_table() {
        use SymbolKind as K;
        let m = ScopeKind::Module;
        assert_eq!(
            can_merge_symbols(m, K::HoistedFunction, K::TsNamespace, true),
            MergeResult::KeepExisting
        );
        assert_eq!(
            can_merge_symbols(m, K::Class, K::TsNamespace, true),
            MergeResult::KeepExisting
        );
        assert_eq!(
            can_merge_symbols(m, K::TsNamespace, K::TsNamespace, true),
            MergeResult::KeepExisting
        );
        assert_eq!(
            can_merge_symbols(m, K::TsEnum, K::TsNamespace, true),
            MergeResult::KeepExisting
        );
        assert_eq!(
            can_merge_symbols(m, K::TsNamespace, K::HoistedFunction, true),
            MergeResult::ReplaceWithNew
        );
        assert_eq!(
            can_merge_symbols(m, K::BlockScoped, K::TsNamespace, true),
            MergeResult::Forbidden
        );
        assert_eq!(
            can_merge_symbols(m, K::Hoisted, K::TsNamespace, true),
            MergeResult::Forbidden
        );
        assert_eq!(
            can_merge_symbols(m, K::Const, K::TsNamespace, true),
            MergeResult::Forbidden
        );
    }

    #[test]
    fn test_js_merge_table() {
        use SymbolKind as K;
        assert_eq!(
            can_merge_symbols(ScopeKind::Module, K::Hoisted, K::HoistedFunction, false),
            MergeResult::ReplaceWithNew
        );
        assert_eq!(
            can_merge_symbols(ScopeKind::Block, K::BlockScoped, K::BlockScoped, false),
            MergeResult::Forbidden
        );
        assert_eq!(
            can_merge_symbols(ScopeKind::Module, K::Import, K::Class, false),
            MergeResult::Forbidden
        );
        assert_eq!(
            can_merge_symbols(ScopeKind::Module, K::Import, K::Class, true),
            MergeResult::ReplaceWithNew
        );
        assert_eq!(
            can_merge_symbols(ScopeKind::FunctionBody, K::Arguments, K::Hoisted, false),
            MergeResult::KeepExisting
        );
    }

    #[test]
    fn test_scope_find_and_flatten() {
        let mut symbols = SymbolTable::new();
        let mut scopes = ScopeTree::new();
        let args = scopes.push(ScopeKind::FunctionArgs, ScopeTree::MODULE);
        let inner = scopes.push(ScopeKind::Block, args);
        let x = symbols.new_symbol(SymbolKind::BlockScoped, "x");
        scopes.get_mut(ScopeTree::MODULE).members.insert(
            "x".into(),
            ScopeMember {
                symbol: x,
                span: Span::empty(0),
            },
        );
        assert_eq!(scopes.find("x", inner).map(|(_, m)| m.symbol), Some(x));
        assert!(scopes.find("y", inner).is_none());

        scopes.flatten(args);
        assert_eq!(scopes.get(inner).parent, Some(ScopeTree::MODULE));
        assert_eq!(scopes.get(ScopeTree::MODULE).children, vec![inner]);
    }

    #[test]
    fn test_discard_detaches_scope() {
        let mut scopes = ScopeTree::new();
        let ns = scopes.push(ScopeKind::Entry, ScopeTree::MODULE);
        scopes.discard(ns);
        assert!(scopes.get(ScopeTree::MODULE).children.is_empty());
    }

    #[test]
    fn test_hoist_target() {
        let mut scopes = ScopeTree::new();
        let body = scopes.push(ScopeKind::FunctionBody, ScopeTree::MODULE);
        let block = scopes.push(ScopeKind::Block, body);
        let catch = scopes.push(ScopeKind::Catch, block);
        assert_eq!(scopes.hoist_target(catch), body);
        assert_eq!(scopes.hoist_target(ScopeTree::MODULE), ScopeTree::MODULE);
    }
}
